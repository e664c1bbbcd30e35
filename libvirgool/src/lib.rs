//! Virgool bridge - cross-post local articles to the Virgool publishing API
//!
//! This library provides the API client, link persistence, and orchestration
//! needed to mirror local blog content onto a Virgool account exactly once.

pub mod api;
pub mod config;
pub mod crosspost;
pub mod error;
pub mod links;
pub mod logging;
pub mod mock;
pub mod types;

// Re-export commonly used types
pub use api::{ApiClient, PublishingApi, Session, DEFAULT_BASE_URL};
pub use config::Config;
pub use crosspost::{Credentials, CrossPoster};
pub use error::{ApiError, Result, VirgoolError};
pub use links::LinkStore;
pub use types::{BulkOutcome, ContentItem, PostDraft, PostVisibility, RemotePost};
