//! Request-level data models.
//!
//! - `engine`: the vendor selector submitted with the form.
//! - `languages`: the supported target languages and their vendor casing.

pub mod engine;
pub mod languages;

pub use engine::EngineKind;
pub use languages::Language;
