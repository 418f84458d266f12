//! Paginated post listings: blog index, category, author, tag and search pages.

use std::sync::Arc;

use inkpress_content_types::PostPreview;
use tokio::try_join;
use tracing::debug;

use crate::application::error::ServiceError;
use crate::application::metadata::{author_meta, blog_index_meta, category_meta};
use crate::application::pagination::{OffsetPage, PageRequest};
use crate::application::repos::{ContentSource, PostScope, SourceError};
use crate::config::{ListingSettings, SiteSettings};
use crate::presentation::views::{
    AuthorListingView, BlogIndexView, CategoryListingView, ListingView, SearchView,
};

const EMPTY_BLOG_MESSAGE: &str = "No posts found. Check back later for new content.";
const EMPTY_CATEGORY_MESSAGE: &str = "No posts have been published in this category yet.";
const EMPTY_AUTHOR_MESSAGE: &str = "This author hasn't published any posts yet.";
const EMPTY_TAG_MESSAGE: &str = "No posts found for this tag.";
const EMPTY_SEARCH_MESSAGE: &str = "No posts matched your search.";
const BLANK_SEARCH_MESSAGE: &str = "Enter a search term to find posts.";

#[derive(Clone)]
pub struct ListingService {
    source: Arc<dyn ContentSource>,
    listing: ListingSettings,
    site: SiteSettings,
}

impl ListingService {
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

    /// Main blog listing. Featured posts are only loaded for the first page.
    pub async fn blog_index(&self, raw_page: Option<&str>) -> Result<BlogIndexView, ServiceError> {
        let request = PageRequest::from_raw(raw_page, self.listing.page_size);
        let scope = PostScope::All;

        let (page, featured) = if request.is_first() {
            try_join!(
                self.load_page(&scope, request),
                self.source.featured_posts(self.listing.featured_count.get()),
            )?
        } else {
            (self.load_page(&scope, request).await?, Vec::new())
        };

        let listing = self.listing_view(page, &scope, EMPTY_BLOG_MESSAGE).with_featured(featured);
        Ok(BlogIndexView {
            meta: blog_index_meta(&self.site),
            listing,
        })
    }

    pub async fn category(
        &self,
        slug: &str,
        raw_page: Option<&str>,
    ) -> Result<CategoryListingView, ServiceError> {
        let request = PageRequest::from_raw(raw_page, self.listing.page_size);
        let scope = PostScope::Category(slug.to_string());

        let (category, page) = try_join!(
            self.source.find_category(slug),
            self.load_page(&scope, request),
        )?;
        let category = category.ok_or_else(|| ServiceError::not_found("category", slug))?;

        Ok(CategoryListingView {
            meta: category_meta(&self.site, &category),
            category: category.into(),
            listing: self.listing_view(page, &scope, EMPTY_CATEGORY_MESSAGE),
        })
    }

    pub async fn author(
        &self,
        slug: &str,
        raw_page: Option<&str>,
    ) -> Result<AuthorListingView, ServiceError> {
        let request = PageRequest::from_raw(raw_page, self.listing.page_size);
        let scope = PostScope::Author(slug.to_string());

        let (author, page) = try_join!(
            self.source.find_author(slug),
            self.load_page(&scope, request),
        )?;
        let author = author.ok_or_else(|| ServiceError::not_found("author", slug))?;

        Ok(AuthorListingView {
            meta: author_meta(&self.site, &author),
            author: author.into(),
            listing: self.listing_view(page, &scope, EMPTY_AUTHOR_MESSAGE),
        })
    }

    /// Posts carrying a free-form tag. Tags are not documents, so a tag with
    /// no published posts is reported as unknown.
    pub async fn tag(
        &self,
        tag: &str,
        raw_page: Option<&str>,
    ) -> Result<ListingView, ServiceError> {
        let request = PageRequest::from_raw(raw_page, self.listing.page_size);
        let scope = PostScope::Tag(tag.to_string());

        let page = self.load_page(&scope, request).await?;
        if page.total_items == 0 {
            return Err(ServiceError::not_found("tag", tag));
        }

        Ok(self.listing_view(page, &scope, EMPTY_TAG_MESSAGE))
    }

    /// Posts matching a search term. A blank term lists nothing and skips the
    /// content source.
    pub async fn search(
        &self,
        raw_term: Option<&str>,
        raw_page: Option<&str>,
    ) -> Result<SearchView, ServiceError> {
        let request = PageRequest::from_raw(raw_page, self.listing.page_size);
        let term = raw_term.map(str::trim).unwrap_or_default();

        if term.is_empty() {
            let page = OffsetPage::new(request, Vec::new(), 0);
            return Ok(SearchView {
                query: String::new(),
                listing: self.listing_view(page, &PostScope::All, BLANK_SEARCH_MESSAGE),
            });
        }

        let scope = PostScope::Search(term.to_string());
        let page = self.load_page(&scope, request).await?;
        Ok(SearchView {
            query: term.to_string(),
            listing: self.listing_view(page, &scope, EMPTY_SEARCH_MESSAGE),
        })
    }

    async fn load_page(
        &self,
        scope: &PostScope,
        request: PageRequest,
    ) -> Result<OffsetPage<PostPreview>, SourceError> {
        let (items, total) = try_join!(
            self.source.list_posts(scope, request.window()),
            self.source.count_posts(scope),
        )?;

        let page = OffsetPage::new(request, items, total);
        if request.is_out_of_range(page.total_pages) {
            debug!(
                scope = ?scope,
                page = request.page.get(),
                total_pages = page.total_pages,
                "requested page is past the last page; serving empty listing"
            );
        }
        Ok(page)
    }

    fn listing_view(
        &self,
        page: OffsetPage<PostPreview>,
        scope: &PostScope,
        empty_message: &'static str,
    ) -> ListingView {
        ListingView::new(
            page,
            &scope.base_path(),
            self.listing.visible_pages,
            empty_message,
        )
    }
}
