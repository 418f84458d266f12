use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header::CONTENT_TYPE},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    application::error::{HttpError, ServiceError},
    domain::slug::{SlugError, derive_slug},
};

use super::{
    HttpState,
    middleware::{log_responses, set_request_context},
};

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/blog", get(blog_index))
        .route("/blog/search", get(search))
        .route("/blog/{slug}", get(post_detail))
        .route("/blog/category/{slug}", get(category_listing))
        .route("/blog/author/{slug}", get(author_listing))
        .route("/blog/tag/{tag}", get(tag_listing))
        .route("/categories", get(categories))
        .route("/authors", get(authors))
        .route("/tags", get(tags))
        .route("/sitemap.xml", get(sitemap))
        .route("/_paths/posts", get(post_paths))
        .route("/_slug", get(slugify))
        .route("/_health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// Raw `page` value; parsing is forgiving and happens in the pagination core.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchQuery {
    q: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SlugQuery {
    title: Option<String>,
}

#[derive(Debug, Serialize)]
struct SlugResponse {
    slug: String,
}

#[derive(Debug, Serialize)]
struct PostPathsResponse {
    slugs: Vec<String>,
}

async fn blog_index(State(state): State<HttpState>, Query(query): Query<PageQuery>) -> Response {
    json_or_error(
        "infra::http::public::blog_index",
        state.listing.blog_index(query.page.as_deref()).await,
    )
}

async fn post_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    json_or_error(
        "infra::http::public::post_detail",
        state.posts.post_detail(&slug).await,
    )
}

async fn category_listing(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    json_or_error(
        "infra::http::public::category_listing",
        state.listing.category(&slug, query.page.as_deref()).await,
    )
}

async fn author_listing(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    json_or_error(
        "infra::http::public::author_listing",
        state.listing.author(&slug, query.page.as_deref()).await,
    )
}

async fn tag_listing(
    State(state): State<HttpState>,
    Path(tag): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    json_or_error(
        "infra::http::public::tag_listing",
        state.listing.tag(&tag, query.page.as_deref()).await,
    )
}

async fn search(State(state): State<HttpState>, Query(query): Query<SearchQuery>) -> Response {
    json_or_error(
        "infra::http::public::search",
        state
            .listing
            .search(query.q.as_deref(), query.page.as_deref())
            .await,
    )
}

async fn categories(State(state): State<HttpState>) -> Response {
    json_or_error(
        "infra::http::public::categories",
        state.directory.categories().await,
    )
}

async fn authors(State(state): State<HttpState>) -> Response {
    json_or_error(
        "infra::http::public::authors",
        state.directory.authors().await,
    )
}

async fn tags(State(state): State<HttpState>) -> Response {
    json_or_error("infra::http::public::tags", state.directory.tags().await)
}

async fn post_paths(State(state): State<HttpState>) -> Response {
    json_or_error(
        "infra::http::public::post_paths",
        state
            .posts
            .post_slugs()
            .await
            .map(|slugs| PostPathsResponse { slugs }),
    )
}

async fn sitemap(State(state): State<HttpState>) -> Response {
    match state.sitemap.sitemap_xml().await {
        Ok(body) => xml_response(body),
        Err(err) => HttpError::from_service("infra::http::public::sitemap", err).into_response(),
    }
}

async fn slugify(Query(query): Query<SlugQuery>) -> Response {
    let title = query.title.unwrap_or_default();
    match derive_slug(&title) {
        Ok(slug) => Json(SlugResponse { slug }).into_response(),
        Err(err @ SlugError::EmptyInput) => HttpError::from_error(
            "infra::http::public::slugify",
            StatusCode::BAD_REQUEST,
            "Title has no sluggable characters",
            &err,
        )
        .into_response(),
        Err(err) => HttpError::from_error(
            "infra::http::public::slugify",
            StatusCode::UNPROCESSABLE_ENTITY,
            "Unable to derive slug",
            &err,
        )
        .into_response(),
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> Response {
    HttpError::new(
        "infra::http::public::fallback",
        StatusCode::NOT_FOUND,
        "Not found",
        "no route matched",
    )
    .into_response()
}

fn json_or_error<T: Serialize>(source: &'static str, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(view) => Json(view).into_response(),
        Err(err) => HttpError::from_service(source, err).into_response(),
    }
}

fn xml_response(body: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/xml")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
