//! HTTP client for the hierarchy service: the production implementation of
//! `stacks_browser::HierarchyService`.

mod client;
mod error;

pub use client::ClientOptions;
pub use client::HttpHierarchyClient;
pub use error::ClientError;
