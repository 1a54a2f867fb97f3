//! Application orchestration for turning a description into images of Phoebe.

use crate::ai::{GeminiImageClient, ImageGenerationService};
use crate::assets::AssetLoader;
use crate::fanout;
use crate::models::{Config, GeneratedImage};
use crate::{prompts, Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Loads references, assembles the prompt and fans generation out.
pub struct App {
    image_gen: Arc<dyn ImageGenerationService>,
    assets: AssetLoader,
    image_count: usize,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub image_gen: Arc<dyn ImageGenerationService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: AppServices, assets_dir: PathBuf, image_count: usize) -> Self {
        Self {
            image_gen: services.image_gen,
            assets: AssetLoader::new(assets_dir),
            image_count,
        }
    }

    /// Construct an app backed by Gemini from an already-loaded config.
    pub fn new(config: &Config) -> Result<Self> {
        if config.image_count == 0 {
            return Err(Error::Config(
                "Image count must be at least 1".to_string(),
            ));
        }

        info!(
            "Image provider: Gemini (model: {}), {} images per request",
            config.model, config.image_count
        );

        let image_gen = GeminiImageClient::new(
            config.api_key.clone(),
            config.model.clone(),
            config.request_timeout,
        );

        Ok(Self::with_services(
            AppServices {
                image_gen: Arc::new(image_gen),
            },
            config.assets_dir.clone(),
            config.image_count,
        ))
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// Generate variations of Phoebe matching `user_instructions`.
    ///
    /// Fewer than [`App::image_count`] images may come back when the model
    /// answers with text only.
    pub async fn generate(&self, user_instructions: &str) -> Result<Vec<GeneratedImage>> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!("[{}] Generating {} image(s)", run_id, self.image_count);

        let references = self.assets.load().map_err(|e| {
            error!(
                "[{}] Failed to load reference images from {}: {}",
                run_id,
                self.assets.dir().display(),
                e
            );
            e
        })?;
        info!("[{}] Using {} reference image(s)", run_id, references.len());

        let prompt = Arc::new(prompts::assemble(&references, user_instructions));

        let images =
            fanout::fan_out(Arc::clone(&self.image_gen), prompt, self.image_count).await?;

        if images.len() < self.image_count {
            warn!(
                "[{}] Received {} image(s), fewer than the {} requested",
                run_id,
                images.len(),
                self.image_count
            );
        }

        info!(
            "[{}] Generated {} image(s) in {:.1}s",
            run_id,
            images.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::{App, AppServices};
    use crate::ai::MockImageGenerationClient;
    use crate::models::{Config, PromptPart};
    use crate::Error;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn write_references(dir: &Path, count: usize) {
        for idx in 0..count {
            fs::write(dir.join(format!("phoebe_{}.png", idx)), [0x89, 0x50, idx as u8]).unwrap();
        }
    }

    fn build_test_app(assets_dir: &Path, image_gen: MockImageGenerationClient, count: usize) -> App {
        App::with_services(
            AppServices {
                image_gen: Arc::new(image_gen),
            },
            assets_dir.to_path_buf(),
            count,
        )
    }

    #[tokio::test]
    async fn test_generate_sends_references_and_instructions() {
        let dir = tempdir().unwrap();
        write_references(dir.path(), 2);

        let image_gen = MockImageGenerationClient::new();
        let handle = image_gen.clone();
        let app = build_test_app(dir.path(), image_gen, 3);

        let images = app.generate("Phoebe as an astronaut").await.unwrap();
        assert_eq!(images.len(), 3);

        let requests = handle.get_requests();
        assert_eq!(requests.len(), 3);
        let request = &requests[0];
        assert_eq!(request.image_count(), 2);
        assert!(request.task_text().contains("Phoebe as an astronaut"));
        assert!(matches!(request.parts()[0], PromptPart::Text(_)));
    }

    #[tokio::test]
    async fn test_generate_without_references_still_runs() {
        let dir = tempdir().unwrap();

        let image_gen = MockImageGenerationClient::new();
        let handle = image_gen.clone();
        let app = build_test_app(dir.path(), image_gen, 2);

        let images = app.generate("Phoebe at the beach").await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(handle.get_requests()[0].image_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_assets_fail_before_any_call() {
        let dir = tempdir().unwrap();

        let image_gen = MockImageGenerationClient::new();
        let handle = image_gen.clone();
        let app = build_test_app(&dir.path().join("nope"), image_gen, 3);

        let err = app.generate("Phoebe").await.unwrap_err();
        assert!(matches!(err, Error::Assets(_)));
        assert_eq!(handle.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_propagates_worker_failure() {
        let dir = tempdir().unwrap();
        write_references(dir.path(), 1);

        let app = build_test_app(
            dir.path(),
            MockImageGenerationClient::new().with_failure_on_call(1),
            3,
        );

        let err = app.generate("Phoebe").await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[test]
    fn test_new_rejects_zero_image_count() {
        let config = Config {
            api_key: "key".to_string(),
            model: "gemini-2.0-flash-exp-image-generation".to_string(),
            assets_dir: "assets".into(),
            image_count: 0,
            request_timeout: Duration::from_secs(10),
        };

        assert!(matches!(App::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_new_uses_configured_count() {
        let config = Config {
            api_key: "key".to_string(),
            model: "gemini-2.0-flash-exp-image-generation".to_string(),
            assets_dir: "assets".into(),
            image_count: 4,
            request_timeout: Duration::from_secs(10),
        };

        assert_eq!(App::new(&config).unwrap().image_count(), 4);
    }
}
