//! Quote Link Domain Concerns

pub mod access_links;
pub mod quotes;
