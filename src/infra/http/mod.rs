mod middleware;
mod public;

use std::sync::Arc;

pub use middleware::{REQUEST_ID_HEADER, RequestContext};
pub use public::build_router;

use crate::application::{
    directory::DirectoryService, listing::ListingService, post::PostService,
    repos::ContentSource, sitemap::SitemapService,
};
use crate::config::{ListingSettings, SiteSettings};

/// Services shared by every public handler.
#[derive(Clone)]
pub struct HttpState {
    pub listing: Arc<ListingService>,
    pub posts: Arc<PostService>,
    pub directory: Arc<DirectoryService>,
    pub sitemap: Arc<SitemapService>,
}

impl HttpState {
    /// Wire every read service to one content source.
    pub fn new(
        source: Arc<dyn ContentSource>,
        listing: ListingSettings,
        site: SiteSettings,
    ) -> Self {
        Self {
            listing: Arc::new(ListingService::new(source.clone(), listing, site.clone())),
            posts: Arc::new(PostService::new(source.clone(), listing, site.clone())),
            directory: Arc::new(DirectoryService::new(source.clone())),
            sitemap: Arc::new(SitemapService::new(source, site)),
        }
    }
}
