//! Category, author and tag directories with published post counts.

use std::sync::Arc;

use crate::application::error::ServiceError;
use crate::application::repos::ContentSource;
use crate::presentation::views::{AuthorView, CategoryView, DirectoryEntry, TagView};

#[derive(Clone)]
pub struct DirectoryService {
    source: Arc<dyn ContentSource>,
}

impl DirectoryService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub async fn categories(&self) -> Result<Vec<DirectoryEntry<CategoryView>>, ServiceError> {
        let categories = self.source.list_categories().await?;
        Ok(categories
            .into_iter()
            .map(|entry| DirectoryEntry {
                entry: CategoryView::from(entry.category),
                post_count: entry.post_count,
            })
            .collect())
    }

    pub async fn authors(&self) -> Result<Vec<DirectoryEntry<AuthorView>>, ServiceError> {
        let authors = self.source.list_authors().await?;
        Ok(authors
            .into_iter()
            .map(|entry| DirectoryEntry {
                entry: AuthorView::from(entry.author),
                post_count: entry.post_count,
            })
            .collect())
    }

    pub async fn tags(&self) -> Result<Vec<DirectoryEntry<TagView>>, ServiceError> {
        let tags = self.source.list_tags().await?;
        Ok(tags.into_iter().map(DirectoryEntry::from).collect())
    }
}
