#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use inkpress::application::pagination::PageWindow;
use inkpress::application::repos::{ContentSource, PostScope, SourceError};
use inkpress::domain::posts::{is_published, tally_tags};
use inkpress_content_types::{
    Author, AuthorSummary, AuthorWithCount, Category, CategorySummary, CategoryWithCount, Post,
    PostPreview, SitemapData, SitemapRow, SlugField, TagWithCount, plain_text,
};
use time::{Duration, OffsetDateTime};

/// In-memory content source holding full posts; previews are derived on read.
#[derive(Default)]
pub struct InMemorySource {
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub authors: Vec<Author>,
    pub fail: bool,
    pub related_calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl InMemorySource {
    pub fn new(posts: Vec<Post>, categories: Vec<Category>, authors: Vec<Author>) -> Self {
        Self {
            posts,
            categories,
            authors,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), SourceError> {
        if self.fail {
            Err(SourceError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    /// Published posts, newest first.
    fn published(&self) -> Vec<&Post> {
        let now = OffsetDateTime::now_utc();
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|post| is_published(post.published_at, now))
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts
    }

    fn in_scope<'a>(&'a self, scope: &PostScope) -> Vec<&'a Post> {
        self.published()
            .into_iter()
            .filter(|post| match scope {
                PostScope::All => true,
                PostScope::Category(slug) => post
                    .categories
                    .iter()
                    .any(|category| category.slug.as_str() == slug),
                PostScope::Author(slug) => post
                    .author
                    .as_ref()
                    .is_some_and(|author| author.slug.as_str() == slug),
                PostScope::Tag(tag) => post.tags.iter().any(|t| t == tag),
                PostScope::Search(term) => {
                    let term = term.to_lowercase();
                    [
                        post.title.to_lowercase(),
                        post.excerpt.to_lowercase(),
                        plain_text(&post.body).to_lowercase(),
                    ]
                    .iter()
                    .any(|text| text.contains(&term))
                }
            })
            .collect()
    }
}

#[async_trait]
impl ContentSource for InMemorySource {
    async fn list_posts(
        &self,
        scope: &PostScope,
        window: PageWindow,
    ) -> Result<Vec<PostPreview>, SourceError> {
        self.check()?;
        Ok(self
            .in_scope(scope)
            .into_iter()
            .skip(window.start as usize)
            .take(window.len() as usize)
            .map(preview_of)
            .collect())
    }

    async fn count_posts(&self, scope: &PostScope) -> Result<u64, SourceError> {
        self.check()?;
        Ok(self.in_scope(scope).len() as u64)
    }

    async fn featured_posts(&self, limit: usize) -> Result<Vec<PostPreview>, SourceError> {
        self.check()?;
        Ok(self
            .published()
            .into_iter()
            .filter(|post| post.featured)
            .take(limit)
            .map(preview_of)
            .collect())
    }

    async fn find_post(&self, slug: &str) -> Result<Option<Post>, SourceError> {
        self.check()?;
        Ok(self
            .published()
            .into_iter()
            .find(|post| post.slug.as_str() == slug)
            .cloned())
    }

    async fn find_category(&self, slug: &str) -> Result<Option<Category>, SourceError> {
        self.check()?;
        Ok(self
            .categories
            .iter()
            .find(|category| category.slug.as_str() == slug)
            .cloned())
    }

    async fn find_author(&self, slug: &str) -> Result<Option<Author>, SourceError> {
        self.check()?;
        Ok(self
            .authors
            .iter()
            .find(|author| author.slug.as_str() == slug)
            .cloned())
    }

    async fn related_candidates(
        &self,
        post_id: &str,
        category_ids: &[String],
        limit: usize,
    ) -> Result<Vec<PostPreview>, SourceError> {
        self.check()?;
        self.related_calls
            .lock()
            .expect("related calls lock")
            .push((post_id.to_string(), category_ids.to_vec()));
        Ok(self
            .published()
            .into_iter()
            .filter(|post| post.id != post_id)
            .filter(|post| {
                post.categories
                    .iter()
                    .any(|category| category_ids.contains(&category.id))
            })
            .take(limit)
            .map(preview_of)
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, SourceError> {
        self.check()?;
        let published = self.published();
        Ok(self
            .categories
            .iter()
            .map(|category| CategoryWithCount {
                post_count: published
                    .iter()
                    .filter(|post| post.categories.iter().any(|c| c.id == category.id))
                    .count() as u64,
                category: category.clone(),
            })
            .collect())
    }

    async fn list_authors(&self) -> Result<Vec<AuthorWithCount>, SourceError> {
        self.check()?;
        let published = self.published();
        Ok(self
            .authors
            .iter()
            .map(|author| AuthorWithCount {
                post_count: published
                    .iter()
                    .filter(|post| post.author.as_ref().is_some_and(|a| a.id == author.id))
                    .count() as u64,
                author: author.clone(),
            })
            .collect())
    }

    async fn list_tags(&self) -> Result<Vec<TagWithCount>, SourceError> {
        self.check()?;
        Ok(tally_tags(self.published().into_iter().map(|post| post.tags.clone())))
    }

    async fn post_slugs(&self) -> Result<Vec<String>, SourceError> {
        self.check()?;
        Ok(self
            .published()
            .into_iter()
            .map(|post| post.slug.current.clone())
            .collect())
    }

    async fn sitemap(&self) -> Result<SitemapData, SourceError> {
        self.check()?;
        Ok(SitemapData {
            posts: self
                .published()
                .into_iter()
                .map(|post| SitemapRow {
                    slug: post.slug.clone(),
                    updated_at: post.updated_at,
                    published_at: post.published_at,
                })
                .collect(),
            categories: self
                .categories
                .iter()
                .map(|category| SitemapRow {
                    slug: category.slug.clone(),
                    updated_at: None,
                    published_at: None,
                })
                .collect(),
            authors: self
                .authors
                .iter()
                .map(|author| SitemapRow {
                    slug: author.slug.clone(),
                    updated_at: None,
                    published_at: None,
                })
                .collect(),
        })
    }
}

pub fn preview_of(post: &Post) -> PostPreview {
    PostPreview {
        id: post.id.clone(),
        title: post.title.clone(),
        slug: post.slug.clone(),
        excerpt: post.excerpt.clone(),
        author: post.author.as_ref().map(|author| AuthorSummary {
            id: author.id.clone(),
            name: author.name.clone(),
            slug: author.slug.clone(),
            image: author.image.clone(),
        }),
        main_image: post.main_image.clone(),
        categories: post
            .categories
            .iter()
            .map(|category| CategorySummary {
                id: category.id.clone(),
                title: category.title.clone(),
                slug: category.slug.clone(),
                color: category.color.clone(),
            })
            .collect(),
        tags: post.tags.clone(),
        published_at: post.published_at,
        featured: post.featured,
        reading_time: post.reading_time,
    }
}

pub fn category(id: &str, title: &str, slug: &str) -> Category {
    Category {
        id: id.to_string(),
        title: title.to_string(),
        slug: SlugField::new(slug),
        description: None,
        color: None,
    }
}

pub fn author(id: &str, name: &str, slug: &str) -> Author {
    Author {
        id: id.to_string(),
        name: name.to_string(),
        slug: SlugField::new(slug),
        image: None,
        bio: Vec::new(),
        email: None,
        website: None,
        twitter: None,
        linkedin: None,
    }
}

/// A post published `days_ago` days before now. Negative values schedule it
/// in the future.
pub fn post(id: &str, slug: &str, days_ago: i64) -> Post {
    Post {
        id: id.to_string(),
        created_at: None,
        updated_at: None,
        title: format!("Post {id}"),
        slug: SlugField::new(slug),
        excerpt: format!("Excerpt for {id}"),
        author: None,
        main_image: None,
        categories: Vec::new(),
        tags: Vec::new(),
        published_at: Some(OffsetDateTime::now_utc() - Duration::days(days_ago)),
        featured: false,
        reading_time: Some(4),
        body: Vec::new(),
        seo: None,
    }
}

pub fn draft(id: &str, slug: &str) -> Post {
    Post {
        published_at: None,
        ..post(id, slug, 0)
    }
}

/// `count` posts `p1..=pN`, newest first.
pub fn numbered_posts(count: usize) -> Vec<Post> {
    (1..=count)
        .map(|n| post(&format!("p{n}"), &format!("post-{n}"), n as i64))
        .collect()
}
