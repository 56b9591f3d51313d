//! Built-in prompt templates. Placeholders use `{{name}}` syntax.

pub const FOOD_ANALYSIS_KO: &str = r#"다음 이미지에서 식재료를 분석해주세요. 눈에 띄는 모든 식재료를 찾아 한국어로 자세한 정보를 제공해주세요.
box_2d는 [ymin, xmin, ymax, xmax] 형식이며 0-1000 범위로 정규화합니다.

각 식재료에 대해 다음 정보를 포함해주세요:
- name: 식재료 이름 (한글)
- quantity: 수량 (숫자)
- unit: 단위 (개, kg, L 등)
- category: 카테고리 (과일, 채소, 육류, 유제품, 곡물, 음료, 조미료, 냉동, 기타 중 하나)
- box_2d: 바운딩 박스

식재료가 보이지 않으면 "식재료를 찾을 수 없습니다"라고만 답해주세요.

응답 형식:
{
  "items": [
    { "name": "사과", "quantity": 3, "unit": "개", "category": "과일", "box_2d": [100, 200, 500, 600] }
  ]
}"#;

pub const FOOD_ANALYSIS_EN: &str = r#"Analyze the food items in this image. Detect every prominent food item and describe it in English.
box_2d is [ymin, xmin, ymax, xmax] normalized to 0-1000.

For each item include:
- name: item name
- quantity: amount (number)
- unit: unit (pcs, kg, L, ...)
- category: one of fruit, vegetable, meat, dairy, grain, beverage, condiment, frozen, other
- box_2d: bounding box

If no food is visible, answer only "No food detected".

Response format:
{
  "items": [
    { "name": "apple", "quantity": 3, "unit": "pcs", "category": "fruit", "box_2d": [100, 200, 500, 600] }
  ]
}"#;

pub const RECIPE_KO: &str = r#"다음 재료들로 만들 수 있는 한국 요리 레시피를 3개 추천해주세요: {{ingredients}}

각 레시피에 대해 JSON 형식으로 다음 정보를 포함해주세요:
- name: 요리 이름
- ingredients: 필요한 재료 목록 (배열)
- difficulty: 난이도 (쉬움, 보통, 어려움)
- cookingTime: 조리 시간 (분)
- instructions: 조리 방법 (단계별 배열)

응답 형식:
{
  "recipes": [
    {
      "name": "김치찌개",
      "ingredients": ["김치 200g", "돼지고기 150g"],
      "difficulty": "쉬움",
      "cookingTime": 20,
      "instructions": ["1. 재료를 준비한다", "2. 끓인다"]
    }
  ]
}"#;

pub const RECIPE_STYLED_KO: &str = r#"다음 재료들로 만들 수 있는 "{{style}}" 스타일의 요리 레시피를 3개 추천해주세요: {{ingredients}}

요리 스타일 "{{style}}"에 맞는 조리법과 양념을 사용해주세요.

각 레시피에 대해 JSON 형식으로 다음 정보를 포함해주세요:
- name: 요리 이름
- ingredients: 필요한 재료 목록 (배열)
- difficulty: 난이도 (쉬움, 보통, 어려움)
- cookingTime: 조리 시간 (분)
- instructions: 조리 방법 (단계별 배열)

응답 형식:
{
  "recipes": [
    {
      "name": "요리 이름",
      "ingredients": ["재료 100g"],
      "difficulty": "보통",
      "cookingTime": 30,
      "instructions": ["1. 첫 번째 단계"]
    }
  ]
}"#;

pub const RECIPE_EN: &str = r#"Suggest 3 recipes that can be made with these ingredients: {{ingredients}}

For each recipe return JSON with:
- name: dish name
- ingredients: list of required ingredients (array)
- difficulty: easy, medium or hard
- cookingTime: cooking time in minutes
- instructions: step-by-step instructions (array)

Response format:
{
  "recipes": [
    {
      "name": "Vegetable omelette",
      "ingredients": ["eggs 3", "onion 1"],
      "difficulty": "easy",
      "cookingTime": 15,
      "instructions": ["1. Beat the eggs", "2. Cook in a pan"]
    }
  ]
}"#;

pub const RECIPE_STYLED_EN: &str = r#"Suggest 3 {{style}}-style recipes that can be made with these ingredients: {{ingredients}}

Use techniques and seasonings typical of {{style}} cooking.

For each recipe return JSON with:
- name: dish name
- ingredients: list of required ingredients (array)
- difficulty: easy, medium or hard
- cookingTime: cooking time in minutes
- instructions: step-by-step instructions (array)

Response format:
{
  "recipes": [
    {
      "name": "Dish name",
      "ingredients": ["ingredient 100g"],
      "difficulty": "medium",
      "cookingTime": 30,
      "instructions": ["1. First step"]
    }
  ]
}"#;

pub const EXPIRED_KO: &str = r#"이미지에서 상한 것 같거나 유통기한이 지난 것으로 보이는 식재료를 찾아주세요.

JSON 형식으로 반환:
{
  "expiredItems": [
    { "name": "식재료 이름", "reason": "상한 것으로 판단한 이유", "confidence": 0.8 }
  ]
}
confidence는 0.0에서 1.0 사이의 확신도입니다."#;

pub const EXPIRED_EN: &str = r#"Find food items in this image that look spoiled or past their expiry date.

Return JSON:
{
  "expiredItems": [
    { "name": "item name", "reason": "why it looks spoiled", "confidence": 0.8 }
  ]
}
confidence is between 0.0 and 1.0."#;

pub const CATEGORY_KO: &str = r#""{{name}}"는 다음 카테고리 중 어디에 속하나요?
과일, 채소, 육류, 유제품, 곡물, 음료, 조미료, 냉동, 기타
카테고리 이름만 반환해주세요."#;

pub const CATEGORY_EN: &str = r#"Which category does "{{name}}" belong to?
fruit, vegetable, meat, dairy, grain, beverage, condiment, frozen, other
Reply with the category name only."#;

pub const STORAGE_INFO_KO: &str = r#"다음 식재료에 대한 보관 정보를 제공해주세요: "{{name}}"
다음 형식으로 JSON 응답을 제공해주세요:
{
  "category": "카테고리 (채소, 과일, 육류, 유제품, 곡물, 조미료, 기타 중 선택)",
  "name": "{{name}}",
  "storage_days": 7,
  "storage_desc": "보관 기간 설명 (예: 3~5일)",
  "storage_method": "보관 방법 설명"
}

JSON만 반환하고 다른 텍스트는 포함하지 마세요."#;

pub const STORAGE_INFO_EN: &str = r#"Provide storage information for this food item: "{{name}}"
Answer with JSON in this format:
{
  "category": "one of vegetable, fruit, meat, dairy, grain, condiment, other",
  "name": "{{name}}",
  "storage_days": 7,
  "storage_desc": "how long it keeps (e.g. 3-5 days)",
  "storage_method": "how to store it"
}

Return only the JSON, no other text."#;
