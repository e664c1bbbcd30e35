//! Cross-post orchestration
//!
//! Drives one content item through check link -> prepare draft -> login ->
//! upload image -> create post -> persist link, terminal on the first error.
//! A fresh session is created per item; nothing is persisted unless the
//! remote creation succeeds.

use tracing::{info, warn};

use crate::api::PublishingApi;
use crate::error::{Result, VirgoolError};
use crate::links::LinkStore;
use crate::types::{BulkOutcome, ContentItem, PostDraft, PostVisibility, RemotePost};

/// Credentials for the publishing account, resolved by the host.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Orchestrates cross-posting of local content items.
pub struct CrossPoster<A: PublishingApi> {
    api: A,
    links: LinkStore,
    credentials: Credentials,
    visibility: PostVisibility,
    upload_folder: String,
}

impl<A: PublishingApi> CrossPoster<A> {
    pub fn new(
        api: A,
        links: LinkStore,
        credentials: Credentials,
        visibility: PostVisibility,
        upload_folder: impl Into<String>,
    ) -> Self {
        Self {
            api,
            links,
            credentials,
            visibility,
            upload_folder: upload_folder.into(),
        }
    }

    /// Cross-post a single content item.
    ///
    /// At-most-once per item: an existing link short-circuits with
    /// [`VirgoolError::AlreadyLinked`] before any network call, and a link is
    /// only written after the remote creation succeeded.
    pub async fn cross_post(&self, item: &ContentItem) -> Result<RemotePost> {
        if self.links.has_link(&item.id).await? {
            return Err(VirgoolError::AlreadyLinked(item.id.clone()));
        }

        let mut draft = PostDraft::for_content(item);
        info!(id = %item.id, hash = %draft.hash, "cross-posting content item");

        let session = self
            .api
            .login(&self.credentials.username, &self.credentials.password)
            .await?;

        if let Some(image) = &item.primary_image {
            let upload = self
                .api
                .upload_primary_image(&session, image, &self.upload_folder)
                .await?;
            draft.primary_img = upload.url().map(str::to_string);
        }

        let remote = self
            .api
            .create_post(&session, &draft, self.visibility)
            .await?;

        self.links.record_link(&item.id, &remote).await?;
        info!(id = %item.id, remote_id = ?remote.id(), "cross-post link recorded");

        Ok(remote)
    }

    /// Cross-post a batch of items independently.
    ///
    /// Items run one after another; a failure, including a pre-existing link,
    /// is counted and the batch continues.
    pub async fn cross_post_many(&self, items: &[ContentItem]) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();

        for item in items {
            match self.cross_post(item).await {
                Ok(remote) => {
                    info!(id = %item.id, remote_id = ?remote.id(), "bulk item cross-posted");
                    outcome.success_count += 1;
                }
                Err(e) => {
                    warn!(id = %item.id, error = %e, "bulk item failed");
                    outcome.failure_count += 1;
                }
            }
        }

        outcome
    }

    /// Whether the content item was already cross-posted.
    pub async fn has_link(&self, local_post_id: &str) -> Result<bool> {
        self.links.has_link(local_post_id).await
    }
}
