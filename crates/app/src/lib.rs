//! Signed access links for quotes: token primitives, domain services and persistence.

pub mod context;
pub mod database;
pub mod domain;
pub mod tokens;

#[cfg(test)]
mod test;
