//! Single-post detail with related posts.

use std::sync::Arc;

use inkpress_content_types::{Post, PostPreview};
use tracing::debug;

use crate::application::error::ServiceError;
use crate::application::metadata::post_meta;
use crate::application::related::select_related;
use crate::application::repos::ContentSource;
use crate::config::{ListingSettings, SiteSettings};
use crate::presentation::views::{PostCard, PostDetailView};

#[derive(Clone)]
pub struct PostService {
    source: Arc<dyn ContentSource>,
    listing: ListingSettings,
    site: SiteSettings,
}

impl PostService {
    pub fn new(
        source: Arc<dyn ContentSource>,
        listing: ListingSettings,
        site: SiteSettings,
    ) -> Self {
        Self {
            source,
            listing,
            site,
        }
    }

    /// Resolve a post by slug, then its related posts.
    ///
    /// The related lookup is keyed by the resolved post's id and categories,
    /// so it only starts once the post itself is known.
    pub async fn post_detail(&self, slug: &str) -> Result<PostDetailView, ServiceError> {
        let post = self
            .source
            .find_post(slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("post", slug))?;

        let related = self.related_posts(&post).await?;

        Ok(PostDetailView {
            meta: post_meta(&self.site, &post),
            related: related.into_iter().map(PostCard::from).collect(),
            post: post.into(),
        })
    }

    pub async fn related_posts(&self, post: &Post) -> Result<Vec<PostPreview>, ServiceError> {
        if post.categories.is_empty() {
            debug!(post_id = %post.id, "post has no categories; skipping related lookup");
            return Ok(Vec::new());
        }

        let category_ids: Vec<String> = post.categories.iter().map(|c| c.id.clone()).collect();
        let max = self.listing.related_max;
        let candidates = self
            .source
            .related_candidates(&post.id, &category_ids, max.get())
            .await?;

        Ok(select_related(post, candidates, max))
    }

    /// Slugs of every published post, for static path generation.
    pub async fn post_slugs(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.source.post_slugs().await?)
    }
}
