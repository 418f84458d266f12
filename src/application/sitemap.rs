//! Sitemap generation for public listing and detail pages.

use std::sync::Arc;

use inkpress_content_types::SitemapRow;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::application::error::ServiceError;
use crate::application::metadata::canonical_url;
use crate::application::repos::ContentSource;
use crate::config::SiteSettings;

#[derive(Clone)]
pub struct SitemapService {
    source: Arc<dyn ContentSource>,
    site: SiteSettings,
}

impl SitemapService {
    pub fn new(source: Arc<dyn ContentSource>, site: SiteSettings) -> Self {
        Self { source, site }
    }

    /// Generate sitemap.xml content.
    pub async fn sitemap_xml(&self) -> Result<String, ServiceError> {
        let data = self.source.sitemap().await?;
        let base = self.site.public_url.as_str();

        let mut entries = vec![
            sitemap_entry(base, "/", None),
            sitemap_entry(base, "/blog", None),
        ];

        for row in &data.posts {
            entries.push(row_entry(base, "/blog", row));
        }
        for row in &data.categories {
            entries.push(row_entry(base, "/blog/category", row));
        }
        for row in &data.authors {
            entries.push(row_entry(base, "/blog/author", row));
        }

        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for entry in entries {
            xml.push_str(&entry);
        }
        xml.push_str("</urlset>\n");
        Ok(xml)
    }
}

fn row_entry(base: &str, prefix: &str, row: &SitemapRow) -> String {
    let lastmod = row.updated_at.or(row.published_at);
    sitemap_entry(base, &format!("{prefix}/{}", row.slug.as_str()), lastmod)
}

fn sitemap_entry(base: &str, path: &str, lastmod: Option<OffsetDateTime>) -> String {
    let loc = escape_xml(&canonical_url(base, path));
    let lastmod_str = lastmod
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_default();
    if lastmod_str.is_empty() {
        format!("  <url><loc>{loc}</loc></url>\n")
    } else {
        format!("  <url><loc>{loc}</loc><lastmod>{lastmod_str}</lastmod></url>\n")
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
