pub mod connection;
pub mod endpoints;
pub mod fake;

pub use connection::{
    ApiConnectionError, GeminiClient, GenerationRequest, GenerativeTransport, InlineImage,
};
pub use fake::{FakeReply, FakeTransport};
