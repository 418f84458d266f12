//! GROQ query catalogue for the Sanity content source.
//!
//! Every query only sees posts whose `publishedAt` is set and not in the
//! future. Windows use the exclusive `...` slice so `$start...$end` matches
//! [`PageWindow`](crate::application::pagination::PageWindow) directly.

use crate::application::repos::PostScope;

/// Identifies one predefined query. Used as a metric label and log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryId {
    Posts,
    PostsCount,
    PostsByCategory,
    PostsByCategoryCount,
    PostsByAuthor,
    PostsByAuthorCount,
    PostsByTag,
    PostsByTagCount,
    SearchPosts,
    SearchPostsCount,
    FeaturedPosts,
    Post,
    Category,
    Author,
    RelatedPosts,
    Categories,
    Authors,
    Tags,
    PostPaths,
    Sitemap,
}

impl QueryId {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryId::Posts => "posts",
            QueryId::PostsCount => "posts_count",
            QueryId::PostsByCategory => "posts_by_category",
            QueryId::PostsByCategoryCount => "posts_by_category_count",
            QueryId::PostsByAuthor => "posts_by_author",
            QueryId::PostsByAuthorCount => "posts_by_author_count",
            QueryId::PostsByTag => "posts_by_tag",
            QueryId::PostsByTagCount => "posts_by_tag_count",
            QueryId::SearchPosts => "search_posts",
            QueryId::SearchPostsCount => "search_posts_count",
            QueryId::FeaturedPosts => "featured_posts",
            QueryId::Post => "post",
            QueryId::Category => "category",
            QueryId::Author => "author",
            QueryId::RelatedPosts => "related_posts",
            QueryId::Categories => "categories",
            QueryId::Authors => "authors",
            QueryId::Tags => "tags",
            QueryId::PostPaths => "post_paths",
            QueryId::Sitemap => "sitemap",
        }
    }

    /// Listing query for a scope, paired with its count query.
    pub fn for_scope(scope: &PostScope) -> (QueryId, QueryId) {
        match scope {
            PostScope::All => (QueryId::Posts, QueryId::PostsCount),
            PostScope::Category(_) => (QueryId::PostsByCategory, QueryId::PostsByCategoryCount),
            PostScope::Author(_) => (QueryId::PostsByAuthor, QueryId::PostsByAuthorCount),
            PostScope::Tag(_) => (QueryId::PostsByTag, QueryId::PostsByTagCount),
            PostScope::Search(_) => (QueryId::SearchPosts, QueryId::SearchPostsCount),
        }
    }

    pub fn groq(self) -> String {
        match self {
            QueryId::Posts => listing(ALL_FILTER),
            QueryId::PostsCount => count(ALL_FILTER),
            QueryId::PostsByCategory => listing(CATEGORY_FILTER),
            QueryId::PostsByCategoryCount => count(CATEGORY_FILTER),
            QueryId::PostsByAuthor => listing(AUTHOR_FILTER),
            QueryId::PostsByAuthorCount => count(AUTHOR_FILTER),
            QueryId::PostsByTag => listing(TAG_FILTER),
            QueryId::PostsByTagCount => count(TAG_FILTER),
            QueryId::SearchPosts => listing(SEARCH_FILTER),
            QueryId::SearchPostsCount => count(SEARCH_FILTER),
            QueryId::FeaturedPosts => format!(
                "*[{PUBLISHED} && featured == true] | order(publishedAt desc) [0...$limit] {{{POST_PREVIEW_FIELDS}}}"
            ),
            QueryId::Post => format!(
                "*[{PUBLISHED} && slug.current == $slug][0] {{{POST_FIELDS}}}"
            ),
            QueryId::Category => format!(
                "*[_type == \"category\" && slug.current == $slug][0] {{{CATEGORY_FIELDS}, description}}"
            ),
            QueryId::Author => format!(
                "*[_type == \"author\" && slug.current == $slug][0] {{{AUTHOR_DETAIL_FIELDS}}}"
            ),
            QueryId::RelatedPosts => format!(
                "*[{PUBLISHED} && _id != $postId && count(categories[@._ref in $categoryIds]) > 0] | order(publishedAt desc) [0...$limit] {{{POST_PREVIEW_FIELDS}}}"
            ),
            QueryId::Categories => format!(
                "*[_type == \"category\"] | order(title asc) {{{CATEGORY_FIELDS}, description, \"postCount\": count(*[{PUBLISHED} && ^._id in categories[]._ref])}}"
            ),
            QueryId::Authors => format!(
                "*[_type == \"author\"] | order(name asc) {{{AUTHOR_DETAIL_FIELDS}, \"postCount\": count(*[{PUBLISHED} && author._ref == ^._id])}}"
            ),
            QueryId::Tags => format!("*[{PUBLISHED} && count(tags) > 0].tags"),
            QueryId::PostPaths => format!("*[{PUBLISHED} && defined(slug.current)].slug.current"),
            QueryId::Sitemap => format!(
                "{{\"posts\": *[{PUBLISHED}] {{slug, _updatedAt, publishedAt}}, \"categories\": *[_type == \"category\"] {{slug, _updatedAt}}, \"authors\": *[_type == \"author\"] {{slug, _updatedAt}}}}"
            ),
        }
    }
}

const PUBLISHED: &str = "_type == \"post\" && defined(publishedAt) && publishedAt <= now()";

const ALL_FILTER: &str = "";
const CATEGORY_FILTER: &str = " && $categorySlug in categories[]->slug.current";
const AUTHOR_FILTER: &str = " && author->slug.current == $authorSlug";
const TAG_FILTER: &str = " && $tag in tags";
const SEARCH_FILTER: &str = concat!(
    " && (title match \"*\" + $searchTerm + \"*\"",
    " || excerpt match \"*\" + $searchTerm + \"*\"",
    " || pt::text(body) match \"*\" + $searchTerm + \"*\")"
);

const AUTHOR_FIELDS: &str = "_id, name, slug, image {..., alt}";
const AUTHOR_DETAIL_FIELDS: &str =
    "_id, name, slug, image {..., alt}, bio, email, website, twitter, linkedin";
const CATEGORY_FIELDS: &str = "_id, title, slug, color";

const POST_PREVIEW_FIELDS: &str = concat!(
    "_id, title, slug, excerpt, ",
    "author->{_id, name, slug, image {..., alt}}, ",
    "mainImage {..., alt}, ",
    "categories[]->{_id, title, slug, color}, ",
    "tags, publishedAt, featured, readingTime"
);

const POST_FIELDS: &str = concat!(
    "_id, _createdAt, _updatedAt, title, slug, excerpt, ",
    "author->{_id, name, slug, image {..., alt}, bio, email, website, twitter, linkedin}, ",
    "mainImage {..., alt}, ",
    "categories[]->{_id, title, slug, color, description}, ",
    "tags, publishedAt, featured, readingTime, body, ",
    "seo {metaTitle, metaDescription, keywords}"
);

fn listing(filter: &str) -> String {
    format!(
        "*[{PUBLISHED}{filter}] | order(publishedAt desc) [$start...$end] {{{POST_PREVIEW_FIELDS}}}"
    )
}

fn count(filter: &str) -> String {
    format!("count(*[{PUBLISHED}{filter}])")
}
