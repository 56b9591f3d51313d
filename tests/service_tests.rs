use std::sync::Arc;

use fresh_inventory::api_connection::{FakeReply, FakeTransport};
use fresh_inventory::cache::{RequestCache, SessionMemo};
use fresh_inventory::envelope::{AnalysisResult, Envelope, FailureReason, RecipeResult};
use fresh_inventory::food_item::{FoodCategory, StorageInfo};
use fresh_inventory::language::Language;
use fresh_inventory::normalizer::ResponseShape;
use fresh_inventory::prompts::PromptTemplates;
use fresh_inventory::service::{FoodAiService, ImageInput};

const ITEMS_REPLY: &str = r#"```json
{"items": [
  {"name": "사과", "quantity": 3, "unit": "개", "category": "과일", "box_2d": [10, 20, 300, 400]},
  {"name": "우유", "quantity": "1", "unit": "L", "category": "유제품"}
]}
```"#;

const RECIPES_REPLY: &str = r#"Here you go:
{"recipes": [{"name": "계란볶음밥", "ingredients": ["계란 2개", "밥 1공기"], "difficulty": "쉬움", "cookingTime": 15, "instructions": ["1. 볶는다"]}]}"#;

fn fridge() -> ImageInput {
    ImageInput::new("file:///photos/fridge.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

fn ingredients(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn service_with(fake: &Arc<FakeTransport>) -> FoodAiService {
    FoodAiService::new(fake.clone())
}

#[tokio::test]
async fn analysis_is_memoized_per_image_and_language() {
    let fake = Arc::new(FakeTransport::replying(ITEMS_REPLY));
    let service = service_with(&fake);

    let first = service.analyze_image(&fridge(), Language::Korean).await;
    let second = service.analyze_image(&fridge(), Language::Korean).await;
    assert_eq!(first, second);
    assert_eq!(first.items().len(), 2);
    assert_eq!(first.items()[0].bounding_box, Some([10, 20, 300, 400]));
    assert_eq!(fake.calls(), 1);

    service.analyze_image(&fridge(), Language::English).await;
    assert_eq!(fake.calls(), 2);
    assert!(fake.requests()[0].image.is_some());
}

#[tokio::test]
async fn clearing_the_cache_reaches_the_model_again() {
    let fake = Arc::new(FakeTransport::replying(ITEMS_REPLY));
    let service = service_with(&fake);

    service.analyze_image(&fridge(), Language::Korean).await;
    service.clear_cache();
    service.analyze_image(&fridge(), Language::Korean).await;
    assert_eq!(fake.calls(), 2);
}

#[tokio::test]
async fn failures_are_cached_like_successes() {
    let fake = Arc::new(FakeTransport::replying("Invalid JSON"));
    let service = service_with(&fake);

    let first = service.analyze_image(&fridge(), Language::Korean).await;
    assert_eq!(
        first,
        Envelope::Failure(FailureReason::ParseFailure(ResponseShape::FoodItems))
    );
    assert_eq!(first.error().as_deref(), Some("Failed to parse AI response"));

    let second = service.analyze_image(&fridge(), Language::Korean).await;
    assert_eq!(first, second);
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn transport_failure_carries_the_message() {
    let fake = Arc::new(FakeTransport::failing("quota exceeded"));
    let service = service_with(&fake);

    let result = service.analyze_image(&fridge(), Language::Korean).await;
    match result.failure() {
        Some(FailureReason::Transport(message)) => assert!(message.contains("quota exceeded")),
        other => panic!("expected transport failure, got {:?}", other),
    }
    assert!(result.items().is_empty());
}

#[tokio::test]
async fn no_detection_phrasing_is_an_empty_success() {
    let fake = Arc::new(FakeTransport::replying("이미지에서 식재료를 찾을 수 없습니다."));
    let service = service_with(&fake);

    let result = service.analyze_image(&fridge(), Language::Korean).await;
    assert_eq!(result, Envelope::Success(Vec::new()));
}

#[tokio::test]
async fn empty_model_reply_is_no_items_detected() {
    let fake = Arc::new(FakeTransport::replying("   "));
    let service = service_with(&fake);

    let result = service.analyze_image(&fridge(), Language::English).await;
    assert_eq!(result.error().as_deref(), Some("No food items detected"));
}

#[tokio::test]
async fn empty_recipe_reply_names_recipes() {
    let fake = Arc::new(FakeTransport::replying(""));
    let service = service_with(&fake);

    let result = service
        .generate_recipe_suggestions(&ingredients(&["rice"]), None, Language::English)
        .await;
    assert_eq!(
        result,
        Envelope::Failure(FailureReason::NoItemsDetected(ResponseShape::Recipes))
    );
    assert_eq!(result.error().as_deref(), Some("No recipes generated"));
}

#[tokio::test]
async fn empty_ingredients_never_reach_the_model() {
    let fake = Arc::new(FakeTransport::replying(RECIPES_REPLY));
    let service = service_with(&fake);

    let result = service
        .generate_recipe_suggestions(&[], None, Language::Korean)
        .await;
    assert_eq!(result.error().as_deref(), Some("No ingredients provided"));

    let result = service
        .generate_recipe_suggestions(&ingredients(&[" ", ""]), Some("한식"), Language::Korean)
        .await;
    assert_eq!(result, Envelope::Failure(FailureReason::NoIngredients));
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn empty_ingredients_win_over_missing_credential() {
    let service = FoodAiService::unavailable();
    let result = service
        .generate_recipe_suggestions(&[], None, Language::Korean)
        .await;
    assert_eq!(result, Envelope::Failure(FailureReason::NoIngredients));
}

#[tokio::test]
async fn recipes_are_memoized_regardless_of_ingredient_order() {
    let fake = Arc::new(FakeTransport::replying(RECIPES_REPLY));
    let service = service_with(&fake);

    let first = service
        .generate_recipe_suggestions(&ingredients(&["계란", "밥"]), None, Language::Korean)
        .await;
    let second = service
        .generate_recipe_suggestions(&ingredients(&["밥 ", "계란"]), None, Language::Korean)
        .await;
    assert_eq!(first, second);
    assert_eq!(first.items()[0].name, "계란볶음밥");
    assert_eq!(first.items()[0].cooking_time_minutes, Some(15));
    assert_eq!(fake.calls(), 1);

    service
        .generate_recipe_suggestions(&ingredients(&["계란", "밥"]), Some("Italian"), Language::Korean)
        .await;
    assert_eq!(fake.calls(), 2);
    let prompt = fake.last_prompt().unwrap();
    assert!(prompt.contains("\"Italian\" 스타일"));
    assert!(prompt.contains("계란, 밥"));
}

#[tokio::test]
async fn missing_credential_fails_without_touching_the_cache() {
    let memo: Arc<SessionMemo<RecipeResult>> = Arc::new(SessionMemo::new());
    let service = FoodAiService::unavailable().with_caches(
        Box::new(SessionMemo::<AnalysisResult>::new()),
        Box::new(SharedMemo(memo.clone())),
    );

    let result = service
        .generate_recipe_suggestions(&ingredients(&["두부"]), None, Language::English)
        .await;
    assert_eq!(result, Envelope::Failure(FailureReason::ServiceUnavailable));
    assert!(memo.is_empty());

    let analysis = service.analyze_image(&fridge(), Language::English).await;
    assert_eq!(
        analysis.error().as_deref(),
        Some("AI service is not available: API key is not configured")
    );
    let expired = service.detect_expired_items(&fridge(), Language::Korean).await;
    assert_eq!(expired.failure(), Some(&FailureReason::ServiceUnavailable));
}

#[tokio::test]
async fn expired_detection_is_not_memoized() {
    let fake = Arc::new(FakeTransport::replying(
        r#"{"expiredItems": [{"name": "우유", "reason": "변색", "confidence": 0.9}]}"#,
    ));
    let service = service_with(&fake);

    let first = service.detect_expired_items(&fridge(), Language::Korean).await;
    service.detect_expired_items(&fridge(), Language::Korean).await;
    assert_eq!(first.items()[0].confidence, 0.9);
    assert_eq!(fake.calls(), 2);
}

#[tokio::test]
async fn categorize_falls_back_to_other() {
    let fake = Arc::new(
        FakeTransport::failing("boom").then(FakeReply::Text("채소".to_string())),
    );
    let service = service_with(&fake);

    assert_eq!(service.categorize_food("상추", Language::Korean).await, FoodCategory::Vegetable);
    assert_eq!(service.categorize_food("상추", Language::Korean).await, FoodCategory::Other);
}

#[tokio::test]
async fn storage_info_falls_back_to_default() {
    let fake = Arc::new(
        FakeTransport::replying("not json").then(FakeReply::Text(
            r#"{"category": "육류", "name": "소고기", "storage_days": 3, "storage_desc": "2~3일", "storage_method": "냉장"}"#
                .to_string(),
        )),
    );
    let service = service_with(&fake);

    let info = service.storage_info("소고기", Language::Korean).await;
    assert_eq!(info.category, FoodCategory::Meat);
    assert_eq!(info.storage_days, 3);

    let info = service.storage_info("소고기", Language::Korean).await;
    assert_eq!(info, StorageInfo::fallback("소고기", Language::Korean));
}

#[tokio::test]
async fn template_overrides_reach_the_transport() {
    let fake = Arc::new(FakeTransport::replying(RECIPES_REPLY));
    let service = service_with(&fake).with_templates(
        PromptTemplates::new().with_override("recipe_recommendation_en", "Use: {{ingredients}}"),
    );

    service
        .generate_recipe_suggestions(&ingredients(&["rice", "egg"]), None, Language::English)
        .await;
    assert_eq!(fake.last_prompt().as_deref(), Some("Use: rice, egg"));
}

/// Lets a test keep a handle on a cache it has given to the service.
struct SharedMemo<V>(Arc<SessionMemo<V>>);

impl<V: Clone + Send> RequestCache<V> for SharedMemo<V> {
    fn get(&self, key: &str) -> Option<V> {
        self.0.get(key)
    }

    fn set(&self, key: String, value: V) {
        self.0.set(key, value)
    }

    fn clear(&self) {
        self.0.clear()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}
