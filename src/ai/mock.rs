use super::ImageGenerationService;
use crate::models::{GeneratedImage, PromptRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tiny valid PNG returned when no responses are configured.
const DEFAULT_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
    0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2, 0x25,
    0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Default)]
struct MockState {
    call_count: usize,
    in_flight: usize,
    max_in_flight: usize,
    requests: Vec<PromptRequest>,
}

/// Scriptable [`ImageGenerationService`] for tests.
///
/// Clones share call counters, so a clone kept by the test can observe calls
/// made through the copy handed to the code under test.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<Vec<Vec<GeneratedImage>>>>,
    state: Arc<Mutex<MockState>>,
    fail_on_call: Option<usize>,
    tag_with_call_index: bool,
    delay: Option<Duration>,
    call_delays: Vec<Duration>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            state: Arc::new(Mutex::new(MockState::default())),
            fail_on_call: None,
            tag_with_call_index: false,
            delay: None,
            call_delays: Vec::new(),
        }
    }

    /// Queue the images returned by one call; queued responses are cycled.
    pub fn with_images_response(self, images: Vec<GeneratedImage>) -> Self {
        self.responses.lock().unwrap().push(images);
        self
    }

    /// Make the call with this zero-based index fail.
    pub fn with_failure_on_call(mut self, call_index: usize) -> Self {
        self.fail_on_call = Some(call_index);
        self
    }

    /// Return a single image per call whose bytes are `image-{call index}`.
    pub fn with_call_index_tags(mut self) -> Self {
        self.tag_with_call_index = true;
        self
    }

    /// Sleep before answering successful calls.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep for `delays[i]` before answering call `i`; calls past the end
    /// fall back to [`Self::with_delay`].
    pub fn with_delays(mut self, delays: Vec<Duration>) -> Self {
        self.call_delays = delays;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.state.lock().unwrap().call_count
    }

    /// Highest number of calls that were running at the same time.
    pub fn get_max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    pub fn get_requests(&self) -> Vec<PromptRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn call_index_tag(call_index: usize) -> Vec<u8> {
        format!("image-{}", call_index).into_bytes()
    }

    fn response_for(&self, call_index: usize) -> Vec<GeneratedImage> {
        if self.tag_with_call_index {
            return vec![GeneratedImage::new(
                "image/png",
                Self::call_index_tag(call_index),
            )];
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            vec![GeneratedImage::new("image/png", DEFAULT_PNG.to_vec())]
        } else {
            responses[call_index % responses.len()].clone()
        }
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_images(&self, prompt: &PromptRequest) -> Result<Vec<GeneratedImage>> {
        let call_index = {
            let mut state = self.state.lock().unwrap();
            let index = state.call_count;
            state.call_count += 1;
            state.requests.push(prompt.clone());
            index
        };

        if self.fail_on_call == Some(call_index) {
            return Err(Error::AiProvider(format!(
                "Mock failure on call {}",
                call_index
            )));
        }

        let delay = self.call_delays.get(call_index).copied().or(self.delay);
        if let Some(delay) = delay {
            {
                let mut state = self.state.lock().unwrap();
                state.in_flight += 1;
                state.max_in_flight = state.max_in_flight.max(state.in_flight);
            }
            tokio::time::sleep(delay).await;
            self.state.lock().unwrap().in_flight -= 1;
        }

        Ok(self.response_for(call_index))
    }
}
