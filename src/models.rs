//! Data models and structures
//!
//! Defines the per-request values that flow from the asset loader through
//! the prompt assembler to the generation client, plus runtime configuration.

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp-image-generation";
pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const DEFAULT_IMAGE_COUNT: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// MIME type of every reference image on disk.
pub const REFERENCE_MIME_TYPE: &str = "image/png";

/// A picture of the subject read from the assets directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImage {
    pub path: PathBuf,
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    Image { mime_type: String, data: Vec<u8> },
}

/// Multi-part prompt sent identically to every generation call.
///
/// Parts are always ordered intro text, reference images, task text.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    parts: Vec<PromptPart>,
}

impl PromptRequest {
    pub fn new(intro: String, references: &[ReferenceImage], task: String) -> Self {
        let mut parts = Vec::with_capacity(references.len() + 2);
        parts.push(PromptPart::Text(intro));
        parts.extend(references.iter().map(|image| PromptPart::Image {
            mime_type: image.mime_type.to_string(),
            data: image.data.clone(),
        }));
        parts.push(PromptPart::Text(task));
        Self { parts }
    }

    pub fn parts(&self) -> &[PromptPart] {
        &self.parts
    }

    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, PromptPart::Image { .. }))
            .count()
    }

    /// The trailing task block carrying the user's instructions.
    pub fn task_text(&self) -> &str {
        match self.parts.last() {
            Some(PromptPart::Text(text)) => text,
            _ => "",
        }
    }
}

/// One inline image returned by the generation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub assets_dir: PathBuf,
    pub image_count: usize,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, validating every value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("GOOGLE_API_KEY not set".to_string()))?;

        let model = lookup("GEMINI_IMAGE_MODEL")
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());

        let assets_dir = lookup("ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));

        let image_count = match lookup("NUM_IMAGE_GENERATIONS") {
            Some(raw) => parse_image_count(&raw)?,
            None => DEFAULT_IMAGE_COUNT,
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(Error::Config(format!(
                        "REQUEST_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
                        raw
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            api_key,
            model,
            assets_dir,
            image_count,
            request_timeout,
        })
    }
}

/// Parse a fan-out width; zero is rejected.
pub fn parse_image_count(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(Error::Config(format!(
            "Image count must be a positive integer, got '{}'",
            raw
        ))),
        Ok(count) => Ok(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "secret")])).unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert_eq!(config.image_count, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "secret"),
            ("GEMINI_IMAGE_MODEL", "gemini-2.5-flash-image"),
            ("ASSETS_DIR", "/srv/phoebe"),
            ("NUM_IMAGE_GENERATIONS", "5"),
            ("REQUEST_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gemini-2.5-flash-image");
        assert_eq!(config.assets_dir, PathBuf::from("/srv/phoebe"));
        assert_eq!(config.image_count, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("GOOGLE_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_rejects_zero_image_count() {
        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "secret"),
            ("NUM_IMAGE_GENERATIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "secret"),
            ("REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "secret"),
            ("REQUEST_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_prompt_request_orders_parts() {
        let references = vec![
            ReferenceImage {
                path: PathBuf::from("a.png"),
                mime_type: REFERENCE_MIME_TYPE,
                data: vec![1],
            },
            ReferenceImage {
                path: PathBuf::from("b.png"),
                mime_type: REFERENCE_MIME_TYPE,
                data: vec![2],
            },
        ];

        let request = PromptRequest::new("intro".to_string(), &references, "task".to_string());

        assert_eq!(request.parts().len(), 4);
        assert_eq!(request.parts()[0], PromptPart::Text("intro".to_string()));
        assert!(matches!(request.parts()[1], PromptPart::Image { .. }));
        assert!(matches!(request.parts()[2], PromptPart::Image { .. }));
        assert_eq!(request.task_text(), "task");
        assert_eq!(request.image_count(), 2);
    }

    #[test]
    fn test_prompt_request_without_references() {
        let request = PromptRequest::new("intro".to_string(), &[], "task".to_string());
        assert_eq!(request.parts().len(), 2);
        assert_eq!(request.image_count(), 0);
    }
}
