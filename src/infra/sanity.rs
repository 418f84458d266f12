//! `ContentSource` backed by the Sanity HTTP query API.

use std::time::Instant;

use async_trait::async_trait;
use inkpress_content_types::{
    Author, AuthorWithCount, Category, CategoryWithCount, Post, PostPreview, SitemapData,
    TagWithCount,
};
use metrics::{counter, histogram};
use reqwest::{Client, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::application::pagination::PageWindow;
use crate::application::repos::{ContentSource, PostScope, SourceError};
use crate::config::ContentSourceSettings;
use crate::domain::posts::tally_tags;
use crate::infra::error::InfraError;
use crate::infra::groq::QueryId;
use crate::infra::telemetry::{CONTENT_FETCH_ERROR_TOTAL, CONTENT_FETCH_MS, CONTENT_FETCH_TOTAL};

const ERROR_BODY_LIMIT: usize = 512;

type Params = Vec<(&'static str, Value)>;

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Clone, Debug)]
pub struct SanityClient {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    perspective: &'static str,
}

impl SanityClient {
    pub fn new(settings: &ContentSourceSettings) -> Result<Self, InfraError> {
        let endpoint = endpoint(settings)?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::client(err.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            token: settings.token.clone(),
            perspective: settings.perspective.as_str(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("inkpress/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Run one predefined query and decode the `result` envelope.
    #[instrument(skip(self, params), fields(query = id.as_str()))]
    async fn fetch<T: DeserializeOwned + Send>(
        &self,
        id: QueryId,
        params: Params,
    ) -> Result<T, SourceError> {
        let started_at = Instant::now();
        counter!(CONTENT_FETCH_TOTAL, "query" => id.as_str()).increment(1);

        let result = self.send::<T>(id, params).await;

        histogram!(CONTENT_FETCH_MS, "query" => id.as_str())
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        if let Err(err) = &result {
            counter!(
                CONTENT_FETCH_ERROR_TOTAL,
                "query" => id.as_str(),
                "kind" => error_kind(err)
            )
            .increment(1);
            warn!(error = %err, "content source query failed");
        }
        result
    }

    async fn send<T: DeserializeOwned + Send>(
        &self,
        id: QueryId,
        params: Params,
    ) -> Result<T, SourceError> {
        let url = self.query_url(id, &params)?;

        let mut request = self.client.get(url);
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: truncate_body(&bytes),
            });
        }

        let envelope: QueryResponse<T> =
            serde_json::from_slice(&bytes).map_err(SourceError::decode)?;
        debug!(bytes = bytes.len(), "content source query succeeded");
        Ok(envelope.result)
    }

    fn query_url(&self, id: QueryId, params: &Params) -> Result<Url, SourceError> {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &id.groq());
            for (name, value) in params {
                let encoded = serde_json::to_string(value)
                    .map_err(|err| SourceError::InvalidRequest(err.to_string()))?;
                pairs.append_pair(&format!("${name}"), &encoded);
            }
            pairs.append_pair("perspective", self.perspective);
        }
        Ok(url)
    }

    async fn fetch_list<T: DeserializeOwned + Send>(
        &self,
        id: QueryId,
        params: Params,
    ) -> Result<Vec<T>, SourceError> {
        let rows: Option<Vec<T>> = self.fetch(id, params).await?;
        Ok(rows.unwrap_or_default())
    }
}

#[async_trait]
impl ContentSource for SanityClient {
    async fn list_posts(
        &self,
        scope: &PostScope,
        window: PageWindow,
    ) -> Result<Vec<PostPreview>, SourceError> {
        let (id, _) = QueryId::for_scope(scope);
        let mut params = scope_params(scope);
        params.push(("start", json!(window.start)));
        params.push(("end", json!(window.end)));
        self.fetch_list(id, params).await
    }

    async fn count_posts(&self, scope: &PostScope) -> Result<u64, SourceError> {
        let (_, id) = QueryId::for_scope(scope);
        let count: Option<u64> = self.fetch(id, scope_params(scope)).await?;
        Ok(count.unwrap_or(0))
    }

    async fn featured_posts(&self, limit: usize) -> Result<Vec<PostPreview>, SourceError> {
        self.fetch_list(QueryId::FeaturedPosts, vec![("limit", json!(limit))])
            .await
    }

    async fn find_post(&self, slug: &str) -> Result<Option<Post>, SourceError> {
        self.fetch(QueryId::Post, vec![("slug", json!(slug))]).await
    }

    async fn find_category(&self, slug: &str) -> Result<Option<Category>, SourceError> {
        self.fetch(QueryId::Category, vec![("slug", json!(slug))])
            .await
    }

    async fn find_author(&self, slug: &str) -> Result<Option<Author>, SourceError> {
        self.fetch(QueryId::Author, vec![("slug", json!(slug))]).await
    }

    async fn related_candidates(
        &self,
        post_id: &str,
        category_ids: &[String],
        limit: usize,
    ) -> Result<Vec<PostPreview>, SourceError> {
        self.fetch_list(
            QueryId::RelatedPosts,
            vec![
                ("postId", json!(post_id)),
                ("categoryIds", json!(category_ids)),
                ("limit", json!(limit)),
            ],
        )
        .await
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, SourceError> {
        self.fetch_list(QueryId::Categories, Vec::new()).await
    }

    async fn list_authors(&self) -> Result<Vec<AuthorWithCount>, SourceError> {
        self.fetch_list(QueryId::Authors, Vec::new()).await
    }

    /// GROQ has no group-by, so per-post tag lists are tallied here.
    async fn list_tags(&self) -> Result<Vec<TagWithCount>, SourceError> {
        let tag_lists: Vec<Option<Vec<String>>> =
            self.fetch_list(QueryId::Tags, Vec::new()).await?;
        Ok(tally_tags(tag_lists.into_iter().flatten()))
    }

    async fn post_slugs(&self) -> Result<Vec<String>, SourceError> {
        self.fetch_list(QueryId::PostPaths, Vec::new()).await
    }

    async fn sitemap(&self) -> Result<SitemapData, SourceError> {
        let data: Option<SitemapData> = self.fetch(QueryId::Sitemap, Vec::new()).await?;
        Ok(data.unwrap_or_default())
    }
}

fn endpoint(settings: &ContentSourceSettings) -> Result<Url, InfraError> {
    let mut url = match settings.base_url.as_ref() {
        Some(base) => base.clone(),
        None => {
            let project = settings.project_id.as_deref().ok_or_else(|| {
                InfraError::configuration("`content_source.project_id` is required to serve")
            })?;
            let host = if settings.use_cdn { "apicdn" } else { "api" };
            Url::parse(&format!("https://{project}.{host}.sanity.io/"))
                .map_err(|err| InfraError::configuration(err.to_string()))?
        }
    };

    let version = format!("v{}", settings.api_version);
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            InfraError::configuration("`content_source.base_url` cannot carry a path")
        })?;
        segments
            .pop_if_empty()
            .extend([version.as_str(), "data", "query", settings.dataset.as_str()]);
    }
    Ok(url)
}

fn scope_params(scope: &PostScope) -> Params {
    match scope {
        PostScope::All => Vec::new(),
        PostScope::Category(slug) => vec![("categorySlug", json!(slug))],
        PostScope::Author(slug) => vec![("authorSlug", json!(slug))],
        PostScope::Tag(tag) => vec![("tag", json!(tag))],
        PostScope::Search(term) => vec![("searchTerm", json!(term))],
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout
    } else if err.is_decode() {
        SourceError::decode(err)
    } else {
        SourceError::transport(err)
    }
}

fn truncate_body(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}

fn error_kind(err: &SourceError) -> &'static str {
    match err {
        SourceError::Transport(_) => "transport",
        SourceError::Timeout => "timeout",
        SourceError::Status { .. } => "status",
        SourceError::Decode(_) => "decode",
        SourceError::InvalidRequest(_) => "invalid_request",
    }
}
