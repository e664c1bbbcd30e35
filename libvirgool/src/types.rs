//! Core types for the cross-posting pipeline

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Maximum length, in characters, of the Open Graph description sent with a draft.
pub const OG_DESCRIPTION_LIMIT: usize = 140;

/// Length of the client-generated draft hash.
pub const HASH_LENGTH: usize = 12;

/// Two-valued publication status shared by local workflow and remote visibility.
///
/// The two endpoints that take a status use different wire values: the editor
/// path wants `draft`/`publish` while the listing path wants
/// `drafts`/`published`. Both mappings live here so no caller ever builds a
/// path segment by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostVisibility {
    Draft,
    Publish,
}

impl PostVisibility {
    /// Path segment for the editor endpoint (`/editor/{segment}`).
    pub fn editor_segment(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
        }
    }

    /// Path segment for the listing endpoint (`/posts/{segment}`).
    pub fn listing_segment(&self) -> &'static str {
        match self {
            Self::Draft => "drafts",
            Self::Publish => "published",
        }
    }
}

impl FromStr for PostVisibility {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "publish" => Ok(Self::Publish),
            other => Err(ApiError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for PostVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.editor_segment())
    }
}

/// A locally authored article, as supplied by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Host-side identifier, used for idempotence tracking.
    pub id: String,
    pub title: String,
    /// HTML or markdown body.
    pub body: String,
    /// Short excerpt; truncated for the Open Graph description.
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    /// URL slug of the source article.
    pub slug: String,
    /// Local path of the primary image to upload, if any.
    pub primary_image: Option<PathBuf>,
}

/// Draft payload prepared for the editor endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub hash: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub slug: String,
    /// URL of the uploaded primary image, when one was uploaded.
    pub primary_img: Option<String>,
    pub og_description: Option<String>,
}

impl PostDraft {
    /// Prepare a draft from host content.
    ///
    /// Generates a fresh hash, derives the slug as `<source-slug>-<hash>`, and
    /// truncates the excerpt to [`OG_DESCRIPTION_LIMIT`] characters. Hash
    /// collisions on the remote side are accepted as negligible; there is no
    /// uniqueness check.
    pub fn for_content(item: &ContentItem) -> Self {
        let hash = generate_hash(HASH_LENGTH);
        Self {
            slug: format!("{}-{}", item.slug, hash),
            hash,
            title: item.title.clone(),
            body: item.body.clone(),
            tags: item.tags.clone(),
            primary_img: None,
            og_description: item
                .excerpt
                .as_deref()
                .map(|excerpt| truncate_chars(excerpt, OG_DESCRIPTION_LIMIT)),
        }
    }
}

/// Generate a random lowercase alphanumeric identifier of the given length.
pub fn generate_hash(length: usize) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Truncate to at most `limit` characters, never splitting a character.
pub fn truncate_chars(input: &str, limit: usize) -> String {
    input.chars().take(limit).collect()
}

/// Post representation returned by the remote service.
///
/// The payload is kept opaque and persisted as-is; nothing beyond a
/// best-effort identifier is read out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemotePost(Value);

impl RemotePost {
    /// Best-effort identifier of the remote post, for display only.
    pub fn id(&self) -> Option<&str> {
        self.0
            .get("id")
            .and_then(Value::as_str)
            .or_else(|| self.0.get("hash").and_then(Value::as_str))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RemotePost {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Account details returned by the user-info endpoint, kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserInfo(Value);

impl UserInfo {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for UserInfo {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Raw payload returned by the image upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadResult(Value);

impl UploadResult {
    /// Best-effort URL of the uploaded image.
    pub fn url(&self) -> Option<&str> {
        self.0
            .get("url")
            .and_then(Value::as_str)
            .or_else(|| {
                self.0
                    .get("data")
                    .and_then(|data| data.get("url"))
                    .and_then(Value::as_str)
            })
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for UploadResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Stored association between a local content item and its remote post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossPostLink {
    pub local_post_id: String,
    pub remote_post: RemotePost,
    pub created_at: i64,
}

/// Aggregate result of a bulk cross-post run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub success_count: usize,
    pub failure_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hash_length() {
        assert_eq!(generate_hash(HASH_LENGTH).len(), 12);
        assert_eq!(generate_hash(20).len(), 20);
        assert_eq!(generate_hash(0).len(), 0);
    }

    #[test]
    fn test_hash_charset_lowercase_alphanumeric() {
        for _ in 0..50 {
            let hash = generate_hash(HASH_LENGTH);
            assert!(
                hash.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
                "unexpected character in hash: {}",
                hash
            );
        }
    }

    #[test]
    fn test_hash_distinct_across_calls() {
        let first = generate_hash(HASH_LENGTH);
        let second = generate_hash(HASH_LENGTH);
        assert_ne!(first, second);
    }

    #[test]
    fn test_visibility_editor_segments() {
        assert_eq!(PostVisibility::Draft.editor_segment(), "draft");
        assert_eq!(PostVisibility::Publish.editor_segment(), "publish");
    }

    #[test]
    fn test_visibility_listing_segments() {
        assert_eq!(PostVisibility::Draft.listing_segment(), "drafts");
        assert_eq!(PostVisibility::Publish.listing_segment(), "published");
    }

    #[test]
    fn test_visibility_segment_asymmetry() {
        // The two endpoints use deliberately different wire values.
        assert_ne!(
            PostVisibility::Draft.editor_segment(),
            PostVisibility::Draft.listing_segment()
        );
        assert_ne!(
            PostVisibility::Publish.editor_segment(),
            PostVisibility::Publish.listing_segment()
        );
    }

    #[test]
    fn test_visibility_from_str_valid() {
        assert_eq!("draft".parse::<PostVisibility>().unwrap(), PostVisibility::Draft);
        assert_eq!("publish".parse::<PostVisibility>().unwrap(), PostVisibility::Publish);
    }

    #[test]
    fn test_visibility_from_str_rejects_out_of_set_values() {
        for status in ["published", "drafts", "pending", "Draft", "PUBLISH", ""] {
            match status.parse::<PostVisibility>() {
                Err(ApiError::InvalidStatus(s)) => assert_eq!(s, status),
                other => panic!("expected InvalidStatus for '{}', got {:?}", status, other),
            }
        }
    }

    #[test]
    fn test_visibility_display_matches_editor_segment() {
        assert_eq!(PostVisibility::Draft.to_string(), "draft");
        assert_eq!(PostVisibility::Publish.to_string(), "publish");
    }

    #[test]
    fn test_truncate_below_limit_unchanged() {
        let input = "a".repeat(139);
        assert_eq!(truncate_chars(&input, OG_DESCRIPTION_LIMIT), input);
    }

    #[test]
    fn test_truncate_at_limit_unchanged() {
        let input = "a".repeat(140);
        assert_eq!(truncate_chars(&input, OG_DESCRIPTION_LIMIT), input);
    }

    #[test]
    fn test_truncate_one_over_limit() {
        let input = "a".repeat(141);
        let truncated = truncate_chars(&input, OG_DESCRIPTION_LIMIT);
        assert_eq!(truncated.chars().count(), 140);
    }

    #[test]
    fn test_truncate_well_over_limit() {
        let input = "b".repeat(200);
        let truncated = truncate_chars(&input, OG_DESCRIPTION_LIMIT);
        assert_eq!(truncated.chars().count(), 140);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        // Each of these is multiple bytes in UTF-8; truncation must not split one.
        let input = "é".repeat(150);
        let truncated = truncate_chars(&input, OG_DESCRIPTION_LIMIT);
        assert_eq!(truncated.chars().count(), 140);
        assert!(truncated.chars().all(|c| c == 'é'));
    }

    fn sample_item() -> ContentItem {
        ContentItem {
            id: "42".to_string(),
            title: "A day in the garden".to_string(),
            body: "<p>Flowers.</p>".to_string(),
            excerpt: Some("x".repeat(200)),
            tags: vec!["garden".to_string(), "spring".to_string()],
            slug: "a-day-in-the-garden".to_string(),
            primary_image: None,
        }
    }

    #[test]
    fn test_draft_slug_derivation() {
        let item = sample_item();
        let draft = PostDraft::for_content(&item);

        assert_eq!(draft.hash.len(), HASH_LENGTH);
        assert_eq!(draft.slug, format!("{}-{}", item.slug, draft.hash));
    }

    #[test]
    fn test_draft_truncates_excerpt() {
        let draft = PostDraft::for_content(&sample_item());
        let og = draft.og_description.expect("excerpt should carry over");
        assert_eq!(og.chars().count(), OG_DESCRIPTION_LIMIT);
    }

    #[test]
    fn test_draft_without_excerpt() {
        let mut item = sample_item();
        item.excerpt = None;
        let draft = PostDraft::for_content(&item);
        assert_eq!(draft.og_description, None);
    }

    #[test]
    fn test_draft_carries_tags_in_order() {
        let draft = PostDraft::for_content(&sample_item());
        assert_eq!(draft.tags, vec!["garden".to_string(), "spring".to_string()]);
    }

    #[test]
    fn test_fresh_hash_per_draft() {
        let item = sample_item();
        let first = PostDraft::for_content(&item);
        let second = PostDraft::for_content(&item);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn test_remote_post_id_extraction() {
        let post = RemotePost::from(json!({"id": "abc123", "title": "x"}));
        assert_eq!(post.id(), Some("abc123"));

        let post = RemotePost::from(json!({"hash": "def456"}));
        assert_eq!(post.id(), Some("def456"));

        let post = RemotePost::from(json!({"title": "no id here"}));
        assert_eq!(post.id(), None);
    }

    #[test]
    fn test_remote_post_serialization_round_trip() {
        let post = RemotePost::from(json!({"id": "abc", "nested": {"k": 1}}));
        let encoded = serde_json::to_string(&post).unwrap();
        let decoded: RemotePost = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, post);
    }

    #[test]
    fn test_upload_result_url_top_level() {
        let result = UploadResult::from(json!({"success": true, "url": "https://files.example/a.jpg"}));
        assert_eq!(result.url(), Some("https://files.example/a.jpg"));
    }

    #[test]
    fn test_upload_result_url_nested_in_data() {
        let result =
            UploadResult::from(json!({"success": true, "data": {"url": "https://files.example/b.jpg"}}));
        assert_eq!(result.url(), Some("https://files.example/b.jpg"));
    }

    #[test]
    fn test_upload_result_url_absent() {
        let result = UploadResult::from(json!({"success": true}));
        assert_eq!(result.url(), None);
    }
}
