//! Concrete adapters for the external record store and completion service.
//!
//! Both are deliberately thin: the store's filter language and the model
//! call are external capabilities, so these modules only translate between
//! the workflow traits and the wire formats.

mod airtable;
mod gemini;

pub use airtable::AirtableRepository;
pub use gemini::GeminiClient;
