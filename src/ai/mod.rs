//! AI service integration for image generation
//!
//! Provides the Gemini `generateContent` client that turns an assembled
//! prompt into generated images, plus a mock for tests.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiImageClient;
pub use mock::MockImageGenerationClient;

use crate::models::{GeneratedImage, PromptRequest};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Run one generation call and return every image in the response.
    ///
    /// An empty vector is a valid answer; it is not an error.
    async fn generate_images(&self, prompt: &PromptRequest) -> Result<Vec<GeneratedImage>>;
}
