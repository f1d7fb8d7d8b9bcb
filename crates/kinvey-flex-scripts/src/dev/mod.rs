//! Development server module.
//!
//! Runs the flex service locally behind a relay:
//! - launches the bundle (and optionally the build command that produces it)
//! - discovers the registered handlers
//! - relays requests with platform headers injected
//! - restarts the service when the bundle changes

pub mod config;
pub mod discovery;
pub mod headers;
pub mod server;
pub mod service;
pub mod watcher;

// Re-exports
pub use config::DevConfig;
pub use discovery::{discover, discover_with_retry, Discovery, RetryPolicy};
pub use headers::FlexHeaders;
pub use server::{relay_client, router, ProxyServer, ProxyState, SharedProxyState};
pub use service::{ServiceLauncher, ServiceProcess};
pub use watcher::{BundleWatcher, FileChange};
