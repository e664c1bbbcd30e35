//! Mock publishing API for testing
//!
//! A configurable [`PublishingApi`] implementation that simulates successes
//! and failures without network access. Call counts and created drafts are
//! shared through the config handle so tests can inspect them after the mock
//! has been moved into an orchestrator.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::api::{PublishingApi, Session};
use crate::error::{ApiError, Result};
use crate::types::{PostDraft, PostVisibility, RemotePost, UploadResult, UserInfo};

/// Configuration and shared observation state for [`MockApi`].
#[derive(Debug, Clone)]
pub struct MockApiConfig {
    /// Whether login succeeds at all.
    pub login_succeeds: bool,

    /// If set, only the first N logins succeed; later ones fail.
    pub fail_login_after: Option<usize>,

    /// Whether post creation succeeds.
    pub create_succeeds: bool,

    /// Whether image upload succeeds.
    pub upload_succeeds: bool,

    /// Number of times login has been called.
    pub login_calls: Arc<Mutex<usize>>,

    /// Number of times create_post has been called.
    pub create_calls: Arc<Mutex<usize>>,

    /// Number of times upload_primary_image has been called.
    pub upload_calls: Arc<Mutex<usize>>,

    /// Drafts that reached create_post (for verification).
    pub created_drafts: Arc<Mutex<Vec<(PostDraft, PostVisibility)>>>,
}

impl Default for MockApiConfig {
    fn default() -> Self {
        Self {
            login_succeeds: true,
            fail_login_after: None,
            create_succeeds: true,
            upload_succeeds: true,
            login_calls: Arc::new(Mutex::new(0)),
            create_calls: Arc::new(Mutex::new(0)),
            upload_calls: Arc::new(Mutex::new(0)),
            created_drafts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock API for tests
pub struct MockApi {
    config: MockApiConfig,
}

impl MockApi {
    pub fn new(config: MockApiConfig) -> Self {
        Self { config }
    }

    /// Mock where every operation succeeds.
    pub fn success() -> Self {
        Self::new(MockApiConfig::default())
    }

    /// Mock where login is always rejected.
    pub fn login_failure() -> Self {
        Self::new(MockApiConfig {
            login_succeeds: false,
            ..Default::default()
        })
    }

    /// Mock where post creation is rejected.
    pub fn create_failure() -> Self {
        Self::new(MockApiConfig {
            create_succeeds: false,
            ..Default::default()
        })
    }

    /// Mock where image upload is rejected.
    pub fn upload_failure() -> Self {
        Self::new(MockApiConfig {
            upload_succeeds: false,
            ..Default::default()
        })
    }

    /// Clone of the shared config, usable after the mock has been moved.
    pub fn handle(&self) -> MockApiConfig {
        self.config.clone()
    }

    pub fn login_calls(&self) -> usize {
        *self.config.login_calls.lock().unwrap()
    }

    pub fn create_calls(&self) -> usize {
        *self.config.create_calls.lock().unwrap()
    }

    pub fn upload_calls(&self) -> usize {
        *self.config.upload_calls.lock().unwrap()
    }

    pub fn created_drafts(&self) -> Vec<(PostDraft, PostVisibility)> {
        self.config.created_drafts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishingApi for MockApi {
    async fn login(&self, username: &str, _password: &str) -> Result<Session> {
        let calls = {
            let mut calls = self.config.login_calls.lock().unwrap();
            *calls += 1;
            *calls
        };

        if !self.config.login_succeeds {
            return Err(ApiError::LoginFailed("mock login rejected".to_string()).into());
        }
        if let Some(limit) = self.config.fail_login_after {
            if calls > limit {
                return Err(ApiError::LoginFailed("mock login rejected".to_string()).into());
            }
        }

        Ok(Session::new(format!("mock-token-{}-{}", username, calls)))
    }

    async fn user_info(&self, _session: &Session) -> Result<UserInfo> {
        Ok(UserInfo::from(json!({"name": "mock-user"})))
    }

    async fn user_posts(
        &self,
        _session: &Session,
        _visibility: PostVisibility,
    ) -> Result<Vec<RemotePost>> {
        Ok(Vec::new())
    }

    async fn create_post(
        &self,
        _session: &Session,
        draft: &PostDraft,
        visibility: PostVisibility,
    ) -> Result<RemotePost> {
        *self.config.create_calls.lock().unwrap() += 1;

        if !self.config.create_succeeds {
            return Err(ApiError::CreateUserPostFailed("mock create rejected".to_string()).into());
        }

        self.config
            .created_drafts
            .lock()
            .unwrap()
            .push((draft.clone(), visibility));

        Ok(RemotePost::from(json!({
            "id": format!("mock-{}", draft.hash),
            "hash": draft.hash,
            "title": draft.title,
        })))
    }

    async fn upload_primary_image(
        &self,
        _session: &Session,
        path: &Path,
        folder: &str,
    ) -> Result<UploadResult> {
        *self.config.upload_calls.lock().unwrap() += 1;

        if !self.config.upload_succeeds {
            return Err(ApiError::UploadFailed("mock upload rejected".to_string()).into());
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.jpg");
        Ok(UploadResult::from(json!({
            "success": true,
            "url": format!("https://files.example/{}/{}", folder, name),
        })))
    }
}
