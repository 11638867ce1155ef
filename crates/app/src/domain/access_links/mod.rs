//! Access Links
//!
//! Ephemeral single-use magic links and permanent revocable links for quotes.

pub mod data;
pub mod errors;
pub mod records;
pub mod repository;
pub mod service;
pub mod settings;
pub mod validation;

pub use errors::AccessLinksServiceError;
pub use service::*;
pub use settings::LinkSettings;
