//! Search-engine and social metadata for public pages.

use inkpress_content_types::{Author, Category, Post};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::config::SiteSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwitterCard {
    pub card: &'static str,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
}

impl PageMeta {
    fn website(site: &SiteSettings, path: &str, title: String, description: String) -> Self {
        let canonical = canonical_url(&site.public_url, path);
        Self {
            open_graph: OpenGraph {
                title: title.clone(),
                description: description.clone(),
                kind: "website",
                url: canonical.clone(),
                published_time: None,
                modified_time: None,
                authors: Vec::new(),
                tags: Vec::new(),
            },
            twitter: TwitterCard {
                card: "summary",
                title: title.clone(),
                description: description.clone(),
            },
            title,
            description,
            canonical,
            keywords: None,
        }
    }
}

pub fn blog_index_meta(site: &SiteSettings) -> PageMeta {
    PageMeta::website(
        site,
        "/blog",
        site.blog_title.clone(),
        site.blog_description.clone(),
    )
}

pub fn category_meta(site: &SiteSettings, category: &Category) -> PageMeta {
    let description = category
        .description
        .clone()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| format!("Posts in the {} category.", category.title));
    PageMeta::website(
        site,
        &format!("/blog/category/{}", category.slug.as_str()),
        format!("{} - Blog Categories", category.title),
        description,
    )
}

pub fn author_meta(site: &SiteSettings, author: &Author) -> PageMeta {
    PageMeta::website(
        site,
        &format!("/blog/author/{}", author.slug.as_str()),
        format!("{} - Blog Authors", author.name),
        format!("Posts by {}", author.name),
    )
}

/// Metadata for a post: SEO overrides win, then title, excerpt and tags.
pub fn post_meta(site: &SiteSettings, post: &Post) -> PageMeta {
    let seo = post.seo.clone().unwrap_or_default();
    let title = non_blank(seo.meta_title).unwrap_or_else(|| post.title.clone());
    let description = non_blank(seo.meta_description).unwrap_or_else(|| post.excerpt.clone());
    let keywords = if seo.keywords.is_empty() {
        &post.tags
    } else {
        &seo.keywords
    };
    let keywords = (!keywords.is_empty()).then(|| keywords.join(", "));

    let canonical = canonical_url(&site.public_url, &format!("/blog/{}", post.slug.as_str()));
    let authors: Vec<String> = post.author.iter().map(|a| a.name.clone()).collect();

    PageMeta {
        open_graph: OpenGraph {
            title: title.clone(),
            description: description.clone(),
            kind: "article",
            url: canonical.clone(),
            published_time: post.published_at.and_then(|at| at.format(&Rfc3339).ok()),
            modified_time: post.updated_at.and_then(|at| at.format(&Rfc3339).ok()),
            authors,
            tags: post.tags.clone(),
        },
        twitter: TwitterCard {
            card: "summary_large_image",
            title: title.clone(),
            description: description.clone(),
        },
        title,
        description,
        canonical,
        keywords,
    }
}

pub(crate) fn canonical_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path == "/" {
        format!("{base}/")
    } else {
        format!("{base}{path}")
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
