//! Phoebe image generator - AI-generated variations of Phoebe the border terrier
//!
//! Sends reference photos plus a user's description to Gemini several times in
//! parallel and collects every image that comes back.

pub mod ai;
pub mod app;
pub mod assets;
pub mod error;
pub mod fanout;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
