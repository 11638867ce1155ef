//! Quotes

pub mod errors;
pub mod ownership;
pub mod records;
mod repository;
pub mod service;

pub use errors::QuotesServiceError;
pub use ownership::Ownership;
pub use service::*;
