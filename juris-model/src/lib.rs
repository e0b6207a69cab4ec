//! # juris-model
//!
//! Generative model backends for the juris legal assistant.
//!
//! - [`GeminiModel`] - Google's Gemini models over the REST API
//! - [`MockLlm`] - scripted model for tests
//!
//! ```rust,no_run
//! use juris_model::GeminiModel;
//!
//! let api_key = std::env::var("GOOGLE_API_KEY").unwrap();
//! let model = GeminiModel::new(&api_key, "gemini-2.5-flash").unwrap();
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;
pub mod mock;

#[cfg(feature = "gemini")]
pub use gemini::GeminiModel;
pub use mock::MockLlm;
