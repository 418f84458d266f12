//! Serializable view models handed to the rendering layer.

use std::num::NonZeroU32;

use inkpress_content_types::{
    Author, AuthorSummary, Block, Category, CategorySummary, ImageRef, Post, PostPreview,
    TagWithCount, plain_text,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use url::form_urlencoded;

use crate::application::metadata::PageMeta;
use crate::application::pagination::{OffsetPage, PaginationToken, render_tokens};
use crate::domain::posts;

/// Everything but RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Serialize)]
pub struct CategoryBadge {
    pub title: String,
    pub href: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorBadge {
    pub name: String,
    pub href: String,
    pub image: Option<ImageRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub id: String,
    pub slug: String,
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub published: Option<String>,
    pub iso_date: Option<String>,
    pub author: Option<AuthorBadge>,
    pub categories: Vec<CategoryBadge>,
    pub tags: Vec<String>,
    pub main_image: Option<ImageRef>,
    pub reading_time: Option<u32>,
    pub featured: bool,
}

impl From<PostPreview> for PostCard {
    fn from(preview: PostPreview) -> Self {
        let (published, iso_date) = format_dates(preview.published_at);
        Self {
            href: post_href(preview.slug.as_str()),
            slug: preview.slug.current,
            id: preview.id,
            title: preview.title,
            excerpt: preview.excerpt,
            published,
            iso_date,
            author: preview.author.map(author_badge),
            categories: preview.categories.iter().map(category_badge).collect(),
            tags: preview.tags,
            main_image: preview.main_image,
            reading_time: preview.reading_time,
            featured: preview.featured,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
    pub page: u64,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PagerItem {
    Page {
        number: u64,
        href: String,
        active: bool,
    },
    Ellipsis,
}

/// Pager control: numbered tokens plus previous/next links.
#[derive(Debug, Clone, Serialize)]
pub struct Pager {
    pub current: u64,
    pub total_pages: u64,
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
    pub items: Vec<PagerItem>,
}

impl Pager {
    /// Build the pager for a listing; `None` when there is nothing to page.
    pub fn build(
        current: u64,
        total_pages: u64,
        base_path: &str,
        visible: NonZeroU32,
    ) -> Option<Self> {
        let tokens = render_tokens(current, total_pages, visible);
        if tokens.is_empty() {
            return None;
        }

        let link = |page: u64| PageLink {
            page,
            href: page_href(base_path, page),
        };

        let items = tokens
            .into_iter()
            .map(|token| match token {
                PaginationToken::Page { number, active } => PagerItem::Page {
                    number,
                    href: page_href(base_path, number),
                    active,
                },
                PaginationToken::Ellipsis => PagerItem::Ellipsis,
            })
            .collect();

        // Past the end, step back to the last real page.
        let previous = match current {
            0 | 1 => None,
            _ if current > total_pages => Some(link(total_pages)),
            _ => Some(link(current - 1)),
        };

        Some(Self {
            current,
            total_pages,
            previous,
            next: (current < total_pages).then(|| link(current + 1)),
            items,
        })
    }
}

/// Page 1 is the bare listing path; later pages add a `page=n` parameter.
pub fn page_href(base_path: &str, page: u64) -> String {
    if page <= 1 {
        base_path.to_string()
    } else if base_path.contains('?') {
        format!("{base_path}&page={page}")
    } else {
        format!("{base_path}?page={page}")
    }
}

pub fn post_href(slug: &str) -> String {
    format!("/blog/{slug}")
}

pub fn category_href(slug: &str) -> String {
    format!("/blog/category/{slug}")
}

pub fn author_href(slug: &str) -> String {
    format!("/blog/author/{slug}")
}

pub fn tag_href(tag: &str) -> String {
    format!("/blog/tag/{}", utf8_percent_encode(tag, PATH_SEGMENT))
}

pub fn search_href(term: &str) -> String {
    let query: String = form_urlencoded::byte_serialize(term.as_bytes()).collect();
    format!("/blog/search?q={query}")
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub page: u32,
    pub page_size: u32,
    pub total_posts: u64,
    pub total_pages: u64,
    pub posts: Vec<PostCard>,
    pub featured: Vec<PostCard>,
    pub pager: Option<Pager>,
    pub empty_message: Option<&'static str>,
}

impl ListingView {
    pub fn new(
        page: OffsetPage<PostPreview>,
        base_path: &str,
        visible_pages: NonZeroU32,
        empty_message: &'static str,
    ) -> Self {
        let pager = Pager::build(
            u64::from(page.page),
            page.total_pages,
            base_path,
            visible_pages,
        );
        let empty = page.is_empty();
        Self {
            page: page.page,
            page_size: page.page_size,
            total_posts: page.total_items,
            total_pages: page.total_pages,
            posts: page.items.into_iter().map(PostCard::from).collect(),
            featured: Vec::new(),
            pager,
            empty_message: empty.then_some(empty_message),
        }
    }

    pub fn with_featured(mut self, featured: Vec<PostPreview>) -> Self {
        self.featured = featured.into_iter().map(PostCard::from).collect();
        self
    }
}

/// Search results page. `query` is the trimmed term; blank terms list nothing.
#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub query: String,
    #[serde(flatten)]
    pub listing: ListingView,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub tag: String,
    pub href: String,
}

impl From<TagWithCount> for DirectoryEntry<TagView> {
    fn from(entry: TagWithCount) -> Self {
        Self {
            entry: TagView {
                href: tag_href(&entry.tag),
                tag: entry.tag,
            },
            post_count: entry.post_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub href: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            href: category_href(category.slug.as_str()),
            slug: category.slug.current,
            id: category.id,
            title: category.title,
            description: category.description,
            color: category.color,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub href: String,
    pub image: Option<ImageRef>,
    pub bio: Vec<Block>,
    pub bio_text: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
}

impl From<Author> for AuthorView {
    fn from(author: Author) -> Self {
        Self {
            href: author_href(author.slug.as_str()),
            slug: author.slug.current,
            bio_text: plain_text(&author.bio),
            id: author.id,
            name: author.name,
            image: author.image,
            bio: author.bio,
            email: author.email,
            website: author.website,
            twitter: author.twitter,
            linkedin: author.linkedin,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListingView {
    pub category: CategoryView,
    pub meta: PageMeta,
    #[serde(flatten)]
    pub listing: ListingView,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorListingView {
    pub author: AuthorView,
    pub meta: PageMeta,
    #[serde(flatten)]
    pub listing: ListingView,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogIndexView {
    pub meta: PageMeta,
    #[serde(flatten)]
    pub listing: ListingView,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub published: Option<String>,
    pub iso_date: Option<String>,
    pub author: Option<AuthorView>,
    pub categories: Vec<CategoryView>,
    pub tags: Vec<String>,
    pub main_image: Option<ImageRef>,
    pub reading_time: Option<u32>,
    pub body: Vec<Block>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        let (published, iso_date) = format_dates(post.published_at);
        Self {
            slug: post.slug.current,
            id: post.id,
            title: post.title,
            excerpt: post.excerpt,
            published,
            iso_date,
            author: post.author.map(AuthorView::from),
            categories: post.categories.into_iter().map(CategoryView::from).collect(),
            tags: post.tags,
            main_image: post.main_image,
            reading_time: post.reading_time,
            body: post.body,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailView {
    pub post: PostView,
    pub meta: PageMeta,
    pub related: Vec<PostCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry<T> {
    #[serde(flatten)]
    pub entry: T,
    pub post_count: u64,
}

fn author_badge(author: AuthorSummary) -> AuthorBadge {
    AuthorBadge {
        href: author_href(author.slug.as_str()),
        name: author.name,
        image: author.image,
    }
}

fn category_badge(category: &CategorySummary) -> CategoryBadge {
    CategoryBadge {
        title: category.title.clone(),
        href: category_href(category.slug.as_str()),
        color: category.color.clone(),
    }
}

fn format_dates(at: Option<time::OffsetDateTime>) -> (Option<String>, Option<String>) {
    match at {
        Some(at) => (
            Some(posts::format_human_date(at)),
            at.format(&time::format_description::well_known::Rfc3339).ok(),
        ),
        None => (None, None),
    }
}
