//! Virgool REST API client
//!
//! Every operation is a single synchronous request/response pair against the
//! fixed base URL, decoding `{ success: bool, ... }` envelopes into typed
//! results. Authentication is carried by an explicit [`Session`] value
//! returned from [`PublishingApi::login`]; the client itself holds no token
//! state, so concurrent or repeated orchestrations cannot cross-contaminate.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, Result, VirgoolError};
use crate::types::{PostDraft, PostVisibility, RemotePost, UploadResult, UserInfo};

/// Production endpoint of the publishing platform.
pub const DEFAULT_BASE_URL: &str = "https://virgool.io/api/v1.2";

/// Bundled fallback image, uploaded when a primary image path does not exist
/// on local storage.
const PLACEHOLDER_IMAGE: &[u8] = include_bytes!("../assets/placeholder.jpg");

/// Authenticated session returned by a successful login.
///
/// Holds the bearer token for subsequent calls. Sessions are created per
/// cross-post operation and never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Operations offered by the publishing platform.
///
/// The orchestrator works against this trait so tests can swap in
/// [`crate::mock::MockApi`] without a network.
#[async_trait]
pub trait PublishingApi: Send + Sync {
    /// Authenticate and return a session for subsequent calls.
    ///
    /// A single attempt; no retry. Any failure, including transport errors
    /// and malformed responses, surfaces as [`ApiError::LoginFailed`].
    async fn login(&self, username: &str, password: &str) -> Result<Session>;

    /// Retrieve the authenticated account's details.
    ///
    /// The session is not pre-validated locally; an invalid token is rejected
    /// by the remote side and surfaces as
    /// [`ApiError::RetrieveUserInfoFailed`].
    async fn user_info(&self, session: &Session) -> Result<UserInfo>;

    /// List the account's posts with the given visibility.
    async fn user_posts(
        &self,
        session: &Session,
        visibility: PostVisibility,
    ) -> Result<Vec<RemotePost>>;

    /// Create a post from the draft and return the remote representation.
    async fn create_post(
        &self,
        session: &Session,
        draft: &PostDraft,
        visibility: PostVisibility,
    ) -> Result<RemotePost>;

    /// Upload a primary image into the given folder.
    ///
    /// Falls back to a bundled placeholder when `path` does not exist.
    async fn upload_primary_image(
        &self,
        session: &Session,
        path: &Path,
        folder: &str,
    ) -> Result<UploadResult>;
}

/// HTTP client for the publishing platform's REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (self-hosted or test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("virgool-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(construction_error)?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Map an HTTP client construction failure to a local setup error.
///
/// Building the client never talks to the network, so the failure is not an
/// API error of any kind.
fn construction_error(e: impl std::fmt::Display) -> VirgoolError {
    VirgoolError::InvalidInput(format!("failed to build HTTP client: {}", e))
}

/// Decode a `{ success: bool, ... }` envelope.
///
/// Returns the payload only when the body is non-empty, parses as JSON, and
/// carries `success: true`. Everything else collapses to `None` so each
/// endpoint maps it to its own error kind.
fn decode_envelope(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(body).ok()?;
    if value.get("success").and_then(Value::as_bool) == Some(true) {
        Some(value)
    } else {
        None
    }
}

/// Wire payload for the editor endpoint.
///
/// The field set is a fixed whitelist. The service derives the public slug
/// from `hash`; the draft's own slug is never sent, and `post_id` is always
/// empty for newly created posts.
#[derive(Serialize)]
struct EditorPayload<'a> {
    hash: &'a str,
    title: &'a str,
    tag: &'a [String],
    body: &'a str,
    primary_img: &'a str,
    post_id: &'a str,
    og_description: Option<&'a str>,
}

impl<'a> EditorPayload<'a> {
    fn from_draft(draft: &'a PostDraft) -> Self {
        Self {
            hash: &draft.hash,
            title: &draft.title,
            tag: &draft.tags,
            body: &draft.body,
            primary_img: draft.primary_img.as_deref().unwrap_or(""),
            post_id: "",
            og_description: draft.og_description.as_deref(),
        }
    }
}

#[async_trait]
impl PublishingApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        debug!(username, "logging in to {}", self.base_url);

        let response = self
            .http
            .post(format!("{}/login", self.base_url))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| ApiError::LoginFailed(format!("transport error: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::LoginFailed(format!("transport error: {}", e)))?;

        let data = decode_envelope(&body)
            .ok_or_else(|| ApiError::LoginFailed("service rejected the credentials".to_string()))?;

        let token = data
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::LoginFailed("response carried no token".to_string()))?;

        debug!("login succeeded");
        Ok(Session::new(token))
    }

    async fn user_info(&self, session: &Session) -> Result<UserInfo> {
        let response = self
            .http
            .get(format!("{}/user/info", self.base_url))
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await
            .map_err(|e| ApiError::RetrieveUserInfoFailed(format!("transport error: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::RetrieveUserInfoFailed(format!("transport error: {}", e)))?;

        let data = decode_envelope(&body).ok_or_else(|| {
            ApiError::RetrieveUserInfoFailed("service returned no user payload".to_string())
        })?;

        let user = data.get("user").cloned().ok_or_else(|| {
            ApiError::RetrieveUserInfoFailed("response carried no user field".to_string())
        })?;

        Ok(UserInfo::from(user))
    }

    async fn user_posts(
        &self,
        session: &Session,
        visibility: PostVisibility,
    ) -> Result<Vec<RemotePost>> {
        let url = format!("{}/posts/{}", self.base_url, visibility.listing_segment());
        debug!(%url, "listing user posts");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, session.bearer())
            .send()
            .await
            .map_err(|e| ApiError::RetrieveUserPostsFailed(format!("transport error: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::RetrieveUserPostsFailed(format!("transport error: {}", e)))?;

        let data = decode_envelope(&body).ok_or_else(|| {
            ApiError::RetrieveUserPostsFailed("service returned no post list".to_string())
        })?;

        let posts = data
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| {
                ApiError::RetrieveUserPostsFailed("response carried no data field".to_string())
            })?;

        Ok(posts.into_iter().map(RemotePost::from).collect())
    }

    async fn create_post(
        &self,
        session: &Session,
        draft: &PostDraft,
        visibility: PostVisibility,
    ) -> Result<RemotePost> {
        let url = format!("{}/editor/{}", self.base_url, visibility.editor_segment());
        debug!(%url, hash = %draft.hash, "creating user post");

        let payload = EditorPayload::from_draft(draft);

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, session.bearer())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::CreateUserPostFailed(format!("transport error: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::CreateUserPostFailed(format!("transport error: {}", e)))?;

        let data = decode_envelope(&body).ok_or_else(|| {
            ApiError::CreateUserPostFailed("service rejected the post".to_string())
        })?;

        let post = data.get("data").cloned().ok_or_else(|| {
            ApiError::CreateUserPostFailed("response carried no data field".to_string())
        })?;

        Ok(RemotePost::from(post))
    }

    async fn upload_primary_image(
        &self,
        session: &Session,
        path: &Path,
        folder: &str,
    ) -> Result<UploadResult> {
        let (bytes, file_name) = if path.exists() {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                ApiError::UploadFailed(format!("failed to read {}: {}", path.display(), e))
            })?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload.jpg")
                .to_string();
            (bytes, name)
        } else {
            debug!(path = %path.display(), "image not found locally, uploading bundled placeholder");
            (PLACEHOLDER_IMAGE.to_vec(), "placeholder.jpg".to_string())
        };

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")
            .map_err(|e| ApiError::UploadFailed(format!("invalid file part: {}", e)))?;
        let form = multipart::Form::new()
            .text("foldername", folder.to_string())
            .part("upload", part);

        let response = self
            .http
            .post(format!("{}/post/upload/", self.base_url))
            .header(AUTHORIZATION, session.bearer())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::UploadFailed(format!("transport error: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::UploadFailed(format!("transport error: {}", e)))?;

        let data = decode_envelope(&body)
            .ok_or_else(|| ApiError::UploadFailed("service rejected the upload".to_string()))?;

        Ok(UploadResult::from(data))
    }
}
