//! Content source trait describing the CMS adapter.

use async_trait::async_trait;
use inkpress_content_types::{
    Author, AuthorWithCount, Category, CategoryWithCount, Post, PostPreview, SitemapData,
    TagWithCount,
};
use thiserror::Error;

use crate::application::pagination::PageWindow;
use crate::presentation::views::{search_href, tag_href};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("content source request failed: {0}")]
    Transport(String),
    #[error("content source timed out")]
    Timeout,
    #[error("content source responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode content source response: {0}")]
    Decode(String),
    #[error("invalid content source request: {0}")]
    InvalidRequest(String),
}

impl SourceError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Which published posts a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostScope {
    All,
    Category(String),
    Author(String),
    Tag(String),
    /// Posts whose title, excerpt or body text matches the term.
    Search(String),
}

impl PostScope {
    /// Link to the first listing page for this scope. Free-text parts are
    /// percent-encoded.
    pub fn base_path(&self) -> String {
        match self {
            PostScope::All => "/blog".to_string(),
            PostScope::Category(slug) => format!("/blog/category/{slug}"),
            PostScope::Author(slug) => format!("/blog/author/{slug}"),
            PostScope::Tag(tag) => tag_href(tag),
            PostScope::Search(term) => search_href(term),
        }
    }
}

/// Read access to published content.
///
/// Collection lookups return an empty vector when nothing matches; single
/// lookups return `None`. Only published posts are ever returned.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Posts in `scope`, newest first, restricted to `window`.
    async fn list_posts(
        &self,
        scope: &PostScope,
        window: PageWindow,
    ) -> Result<Vec<PostPreview>, SourceError>;

    async fn count_posts(&self, scope: &PostScope) -> Result<u64, SourceError>;

    /// Newest featured posts, at most `limit`.
    async fn featured_posts(&self, limit: usize) -> Result<Vec<PostPreview>, SourceError>;

    async fn find_post(&self, slug: &str) -> Result<Option<Post>, SourceError>;

    async fn find_category(&self, slug: &str) -> Result<Option<Category>, SourceError>;

    async fn find_author(&self, slug: &str) -> Result<Option<Author>, SourceError>;

    /// Published posts sharing any of `category_ids`, excluding `post_id`.
    async fn related_candidates(
        &self,
        post_id: &str,
        category_ids: &[String],
        limit: usize,
    ) -> Result<Vec<PostPreview>, SourceError>;

    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, SourceError>;

    async fn list_authors(&self) -> Result<Vec<AuthorWithCount>, SourceError>;

    /// Every tag on a published post with its post count, most used first.
    async fn list_tags(&self) -> Result<Vec<TagWithCount>, SourceError>;

    async fn post_slugs(&self) -> Result<Vec<String>, SourceError>;

    async fn sitemap(&self) -> Result<SitemapData, SourceError>;
}
