//! Executor clients
//!
//! Provides the capability the tracker depends on:
//! - `ExecutorClient` - submit / status / list files / delete file
//! - `ContentFetcher` - download stored file content
//!
//! Backends:
//! - `HttpExecutorClient`, `HttpContentFetcher` - REST API over `reqwest`
//! - `MockExecutorClient`, `MockContentFetcher` - scripted, for tests

pub mod http;
pub mod mock;
pub mod r#trait;

pub use http::{HttpContentFetcher, HttpExecutorClient, HttpExecutorConfig};
pub use mock::{MockContentFetcher, MockExecutorClient, StatusStep};
pub use r#trait::{ContentFetcher, ExecutorClient};
