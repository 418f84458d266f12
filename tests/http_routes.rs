mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use inkpress::config::{ListingSettings, SiteSettings};
use inkpress::infra::http::{HttpState, REQUEST_ID_HEADER, build_router};
use serde_json::Value;
use tower::ServiceExt;

use common::{InMemorySource, author, category, draft, numbered_posts, post};

fn router_for(source: Arc<InMemorySource>) -> Router {
    let site = SiteSettings {
        public_url: "https://blog.example.com".to_string(),
        ..Default::default()
    };
    build_router(HttpState::new(source, ListingSettings::default(), site))
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec();
    (status, bytes)
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get(router, uri).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn post_ids(listing: &Value) -> Vec<String> {
    listing["posts"]
        .as_array()
        .expect("posts array")
        .iter()
        .map(|card| card["id"].as_str().expect("id").to_string())
        .collect()
}

#[tokio::test]
async fn blog_index_paginates_newest_first() {
    let source = Arc::new(InMemorySource::new(numbered_posts(30), Vec::new(), Vec::new()));
    let router = router_for(source);

    let (status, body) = get_json(&router, "/blog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_posts"], 30);
    assert_eq!(body["total_pages"], 3);
    let ids = post_ids(&body);
    assert_eq!(ids.len(), 12);
    assert_eq!(ids.first().map(String::as_str), Some("p1"));

    let (_, page3) = get_json(&router, "/blog?page=3").await;
    assert_eq!(post_ids(&page3).len(), 6);
    assert_eq!(page3["pager"]["previous"]["href"], "/blog?page=2");
    assert!(page3["pager"]["next"].is_null());
}

#[tokio::test]
async fn malformed_page_parameter_falls_back_to_first_page() {
    let source = Arc::new(InMemorySource::new(numbered_posts(20), Vec::new(), Vec::new()));
    let router = router_for(source);

    for uri in ["/blog?page=abc", "/blog?page=0", "/blog?page=-2", "/blog?page=1.5"] {
        let (status, body) = get_json(&router, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["page"], 1, "{uri}");
    }
}

#[tokio::test]
async fn out_of_range_page_returns_empty_listing() {
    let source = Arc::new(InMemorySource::new(numbered_posts(5), Vec::new(), Vec::new()));
    let router = router_for(source);

    let (status, body) = get_json(&router, "/blog?page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert!(post_ids(&body).is_empty());
    assert_eq!(body["total_posts"], 5);
    assert_eq!(body["total_pages"], 1);
    assert!(body["empty_message"].is_string());
}

#[tokio::test]
async fn out_of_range_page_links_back_to_last_page() {
    let source = Arc::new(InMemorySource::new(numbered_posts(30), Vec::new(), Vec::new()));
    let router = router_for(source);

    let (status, body) = get_json(&router, "/blog?page=20").await;
    assert_eq!(status, StatusCode::OK);
    assert!(post_ids(&body).is_empty());
    assert_eq!(body["pager"]["previous"]["page"], 3);
    assert_eq!(body["pager"]["previous"]["href"], "/blog?page=3");
    assert!(body["pager"]["next"].is_null());
}

#[tokio::test]
async fn pager_window_matches_reference_layout() {
    // 120 posts at 12 per page gives 10 pages.
    let source = Arc::new(InMemorySource::new(numbered_posts(120), Vec::new(), Vec::new()));
    let router = router_for(source);

    let (_, body) = get_json(&router, "/blog?page=5").await;
    let items = body["pager"]["items"].as_array().expect("items");
    let labels: Vec<String> = items
        .iter()
        .map(|item| match item["kind"].as_str() {
            Some("page") => item["number"].to_string(),
            _ => "...".to_string(),
        })
        .collect();
    assert_eq!(labels, ["1", "...", "3", "4", "5", "6", "7", "...", "10"]);

    let first = &items[0];
    assert_eq!(first["href"], "/blog");
    assert_eq!(items[4]["active"], true);
}

#[tokio::test]
async fn featured_posts_only_on_first_page() {
    let mut posts = numbered_posts(20);
    posts[2].featured = true;
    posts[7].featured = true;
    let source = Arc::new(InMemorySource::new(posts, Vec::new(), Vec::new()));
    let router = router_for(source);

    let (_, first) = get_json(&router, "/blog").await;
    let featured: Vec<&str> = first["featured"]
        .as_array()
        .expect("featured")
        .iter()
        .filter_map(|card| card["id"].as_str())
        .collect();
    assert_eq!(featured, ["p3", "p8"]);

    let (_, second) = get_json(&router, "/blog?page=2").await;
    assert!(second["featured"].as_array().expect("featured").is_empty());
}

#[tokio::test]
async fn drafts_and_scheduled_posts_are_hidden() {
    let posts = vec![post("live", "live", 1), draft("draft", "draft"), post("soon", "soon", -3)];
    let source = Arc::new(InMemorySource::new(posts, Vec::new(), Vec::new()));
    let router = router_for(source);

    let (_, body) = get_json(&router, "/blog").await;
    assert_eq!(post_ids(&body), ["live"]);

    let (status, _) = get(&router, "/blog/draft").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_detail_resolves_related_by_shared_category() {
    let rust = category("cat-rust", "Rust", "rust");
    let web = category("cat-web", "Web", "web");

    let mut target = post("target", "target", 1);
    target.categories = vec![rust.clone()];
    let mut newer = post("newer", "newer", 2);
    newer.categories = vec![rust.clone(), web.clone()];
    let mut older = post("older", "older", 10);
    older.categories = vec![rust.clone()];
    let mut unrelated = post("unrelated", "unrelated", 3);
    unrelated.categories = vec![web.clone()];

    let source = Arc::new(InMemorySource::new(
        vec![target, newer, older, unrelated],
        vec![rust, web],
        Vec::new(),
    ));
    let router = router_for(source.clone());

    let (status, body) = get_json(&router, "/blog/target").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["id"], "target");
    let related: Vec<&str> = body["related"]
        .as_array()
        .expect("related")
        .iter()
        .filter_map(|card| card["id"].as_str())
        .collect();
    assert_eq!(related, ["newer", "older"]);
    assert_eq!(
        body["meta"]["canonical"],
        "https://blog.example.com/blog/target"
    );

    let calls = source.related_calls.lock().expect("lock").clone();
    assert_eq!(
        calls,
        vec![("target".to_string(), vec!["cat-rust".to_string()])]
    );
}

#[tokio::test]
async fn post_without_categories_skips_related_lookup() {
    let source = Arc::new(InMemorySource::new(
        vec![post("solo", "solo", 1), post("other", "other", 2)],
        Vec::new(),
        Vec::new(),
    ));
    let router = router_for(source.clone());

    let (status, body) = get_json(&router, "/blog/solo").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["related"].as_array().expect("related").is_empty());
    assert!(source.related_calls.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn category_listing_and_unknown_category() {
    let rust = category("cat-rust", "Rust", "rust");
    let mut in_rust = post("a", "a", 1);
    in_rust.categories = vec![rust.clone()];
    let source = Arc::new(InMemorySource::new(
        vec![in_rust, post("b", "b", 2)],
        vec![rust],
        Vec::new(),
    ));
    let router = router_for(source);

    let (status, body) = get_json(&router, "/blog/category/rust").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["title"], "Rust");
    assert_eq!(post_ids(&body), ["a"]);
    assert_eq!(body["meta"]["title"], "Rust - Blog Categories");

    let (status, _) = get(&router, "/blog/category/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_listing_shows_empty_message_for_new_author() {
    let ada = author("author-ada", "Ada", "ada");
    let source = Arc::new(InMemorySource::new(
        vec![post("a", "a", 1)],
        Vec::new(),
        vec![ada],
    ));
    let router = router_for(source);

    let (status, body) = get_json(&router, "/blog/author/ada").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author"]["name"], "Ada");
    assert!(post_ids(&body).is_empty());
    assert!(body["pager"].is_null());
    assert!(body["empty_message"].is_string());

    let (status, _) = get(&router, "/blog/author/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tag_listing_requires_a_tagged_post() {
    let mut tagged = post("t", "t", 1);
    tagged.tags = vec!["async".to_string()];
    let source = Arc::new(InMemorySource::new(vec![tagged], Vec::new(), Vec::new()));
    let router = router_for(source);

    let (status, body) = get_json(&router, "/blog/tag/async").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post_ids(&body), ["t"]);

    let (status, _) = get(&router, "/blog/tag/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tag_pager_links_survive_special_characters() {
    let posts = numbered_posts(13)
        .into_iter()
        .map(|mut post| {
            post.tags = vec!["c# & rust".to_string()];
            post
        })
        .collect();
    let source = Arc::new(InMemorySource::new(posts, Vec::new(), Vec::new()));
    let router = router_for(source);

    let (status, first) = get_json(&router, "/blog/tag/c%23%20%26%20rust").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post_ids(&first).len(), 12);
    let next = first["pager"]["next"]["href"].as_str().expect("next href");
    assert_eq!(next, "/blog/tag/c%23%20%26%20rust?page=2");

    let (status, second) = get_json(&router, next).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["page"], 2);
    assert_eq!(post_ids(&second), ["p13"]);
    assert_eq!(second["pager"]["items"][0]["href"], "/blog/tag/c%23%20%26%20rust");
}

#[tokio::test]
async fn search_matches_title_and_excerpt_and_pages_with_the_term() {
    let mut posts = numbered_posts(15);
    for post in posts.iter_mut().take(13) {
        post.title = format!("Taming the Borrow Checker ({})", post.id);
    }
    posts[14].excerpt = "Notes on the borrow checker".to_string();
    let source = Arc::new(InMemorySource::new(posts, Vec::new(), Vec::new()));
    let router = router_for(source);

    let (status, body) = get_json(&router, "/blog/search?q=borrow%20checker").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "borrow checker");
    assert_eq!(body["total_posts"], 14);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["pager"]["next"]["href"], "/blog/search?q=borrow+checker&page=2");

    let (_, second) = get_json(&router, "/blog/search?q=borrow+checker&page=2").await;
    assert_eq!(post_ids(&second), ["p13", "p15"]);
}

#[tokio::test]
async fn blank_search_lists_nothing() {
    let source = Arc::new(InMemorySource::new(numbered_posts(3), Vec::new(), Vec::new()));
    let router = router_for(source);

    for uri in ["/blog/search", "/blog/search?q=", "/blog/search?q=%20%20"] {
        let (status, body) = get_json(&router, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["query"], "", "{uri}");
        assert!(post_ids(&body).is_empty(), "{uri}");
        assert!(body["empty_message"].is_string(), "{uri}");
    }

    let (status, body) = get_json(&router, "/blog/search?q=nothing-like-this").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_posts"], 0);
}

#[tokio::test]
async fn tag_directory_counts_published_posts() {
    let mut a = post("a", "a", 1);
    a.tags = vec!["rust".to_string(), "web dev".to_string()];
    let mut b = post("b", "b", 2);
    b.tags = vec!["rust".to_string()];
    let mut hidden = draft("d", "d");
    hidden.tags = vec!["web dev".to_string(), "secret".to_string()];
    let source = Arc::new(InMemorySource::new(vec![a, b, hidden], Vec::new(), Vec::new()));
    let router = router_for(source);

    let (status, tags) = get_json(&router, "/tags").await;
    assert_eq!(status, StatusCode::OK);
    let tags = tags.as_array().expect("tags array");
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0]["tag"], "rust");
    assert_eq!(tags[0]["post_count"], 2);
    assert_eq!(tags[1]["href"], "/blog/tag/web%20dev");
    assert_eq!(tags[1]["post_count"], 1);
}

#[tokio::test]
async fn directories_report_published_counts() {
    let rust = category("cat-rust", "Rust", "rust");
    let mut a = post("a", "a", 1);
    a.categories = vec![rust.clone()];
    let mut hidden = draft("d", "d");
    hidden.categories = vec![rust.clone()];
    let source = Arc::new(InMemorySource::new(
        vec![a, hidden],
        vec![rust],
        vec![author("author-ada", "Ada", "ada")],
    ));
    let router = router_for(source);

    let (status, categories) = get_json(&router, "/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories[0]["slug"], "rust");
    assert_eq!(categories[0]["post_count"], 1);

    let (status, authors) = get_json(&router, "/authors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(authors[0]["href"], "/blog/author/ada");
    assert_eq!(authors[0]["post_count"], 0);
}

#[tokio::test]
async fn source_failure_maps_to_bad_gateway() {
    let router = router_for(Arc::new(InMemorySource::failing()));

    for uri in [
        "/blog",
        "/blog/anything",
        "/blog/search?q=rust",
        "/categories",
        "/tags",
        "/sitemap.xml",
    ] {
        let (status, _) = get(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY, "{uri}");
    }
}

#[tokio::test]
async fn sitemap_lists_posts_categories_and_authors() {
    let source = Arc::new(InMemorySource::new(
        vec![post("a", "hello", 1)],
        vec![category("c", "Rust", "rust")],
        vec![author("u", "Ada", "ada")],
    ));
    let router = router_for(source);

    let request = Request::builder()
        .uri("/sitemap.xml")
        .body(Body::empty())
        .expect("request");
    let response = router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"application/xml"[..])
    );

    let (_, bytes) = get(&router, "/sitemap.xml").await;
    let xml = String::from_utf8(bytes).expect("utf-8");
    assert!(xml.contains("<loc>https://blog.example.com/blog/hello</loc>"));
    assert!(xml.contains("<loc>https://blog.example.com/blog/category/rust</loc>"));
    assert!(xml.contains("<loc>https://blog.example.com/blog/author/ada</loc>"));
}

#[tokio::test]
async fn post_paths_enumerate_published_slugs() {
    let source = Arc::new(InMemorySource::new(
        vec![post("a", "first", 2), post("b", "second", 1), draft("c", "hidden")],
        Vec::new(),
        Vec::new(),
    ));
    let router = router_for(source);

    let (status, body) = get_json(&router, "/_paths/posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slugs"], serde_json::json!(["second", "first"]));
}

#[tokio::test]
async fn slug_endpoint_normalizes_titles() {
    let router = router_for(Arc::new(InMemorySource::default()));

    let (status, body) = get_json(&router, "/_slug?title=It%27s%20a%20Test!!").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "its-a-test");

    let (status, _) = get(&router, "/_slug?title=---").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let router = router_for(Arc::new(InMemorySource::default()));

    let (status, body) = get(&router, "/_health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");

    let request = Request::builder()
        .uri("/nope")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}
