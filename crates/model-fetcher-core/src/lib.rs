//! Model Fetcher core
//!
//! Saved API profiles and the `/models` fetch client for OpenAI-compatible
//! endpoints.

pub mod client;
pub mod error;
pub mod models;
pub mod paths;
pub mod profile;
pub mod store;
pub mod task;
pub mod view;

pub use client::{validate_url, ModelClient, DEFAULT_TIMEOUT_SECS};
pub use error::{ErrorKind, ExportError, FetchBusy, FetchError, FetchResult, StoreError, StoreResult};
pub use models::ModelRecord;
pub use profile::{Profile, ProfileSet};
pub use store::ProfileStore;
pub use task::{FetchHandle, FetchState, ModelFetcher};
