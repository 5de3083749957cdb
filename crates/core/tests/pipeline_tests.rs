//! End-to-end pipeline tests
use marksift_core::*;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{name}")).unwrap()
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(body.as_bytes())
        .insert_header("Content-Type", "text/html; charset=utf-8")
}

#[test]
fn test_blog_article_through_fallback() {
    let converted = Pipeline::new()
        .convert_html(&fixture("blog_article.html"), &url("https://blog.example.com/ownership"))
        .unwrap();

    assert!(converted.used_fallback);
    assert_eq!(converted.profile, None);
    assert_eq!(converted.title, "Understanding Ownership | Example Blog");

    let md = &converted.markdown;
    assert!(md.starts_with("# Understanding Ownership"), "{md}");
    assert!(md.contains("## Borrowing"));
    assert!(md.contains("```rust"));
    assert!(md.contains("-   One mutable reference"), "{md}");
    assert!(md.contains("![Borrow diagram](https://blog.example.com/img/borrow.png)"));
    assert!(!md.contains("data:image"));
    assert!(!md.contains("Popular posts"));
    assert!(!md.contains("video.example.com"));
}

#[test]
fn test_wechat_post_uses_profile() {
    let converted = Pipeline::new()
        .convert_html(&fixture("wechat_post.html"), &url("https://mp.weixin.qq.com/s/AbCdEf"))
        .unwrap();

    assert_eq!(converted.profile.as_deref(), Some("wechat"));
    assert!(!converted.used_fallback);
    assert_eq!(converted.title, "Notes on async runtimes");
    assert!(converted.markdown.contains("![scheduler](https://mmbiz.qpic.cn/mmbiz_png/abc/640)"));
    assert!(converted.markdown.contains("work-stealing scheduler"));
}

#[test]
fn test_pubmed_abstract_is_composed() {
    let converted = Pipeline::new()
        .convert_html(&fixture("pubmed_abstract.html"), &url("https://pubmed.ncbi.nlm.nih.gov/33333333/"))
        .unwrap();

    assert_eq!(converted.profile.as_deref(), Some("pubmed"));
    let md = &converted.markdown;
    let order = [
        "## Effects of evening coffee on sleep quality",
        "**Authors:** Jane Doe, John Roe",
        "**Source:** Sleep Med.",
        "**PMID:** 33333333",
        "### Abstract",
        "#### Background:",
        "### Conflict of Interest",
        "Copyright © 2021",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| md.find(needle).unwrap_or_else(|| panic!("missing {needle:?} in {md}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "out of order: {md}");
    assert!(!md.contains("PubMed navigation"));
}

#[test]
fn test_chrome_only_page_is_no_content() {
    let err = Pipeline::new()
        .convert_html(&fixture("chrome_only.html"), &url("https://unknown.example.org/"))
        .unwrap_err();

    assert!(matches!(err, MarksiftError::NoContent));
    assert_eq!(err.kind(), ErrorKind::Extraction);
}

#[test]
fn test_user_profiles_take_precedence() {
    let overrides = ProfileTable::parse_json(
        r#"[{
            "name": "blog",
            "matcher": { "host": "blog.example.com" },
            "title": ["article h1"],
            "content": ["article"],
            "repairs": [{ "kind": "remove", "selector": "pre" }]
        }]"#,
    )
    .unwrap();
    let pipeline = Pipeline::builder()
        .profiles(ProfileTable::builtin().with_overrides(overrides))
        .build();

    let converted = pipeline
        .convert_html(&fixture("blog_article.html"), &url("https://blog.example.com/ownership"))
        .unwrap();

    assert_eq!(converted.profile.as_deref(), Some("blog"));
    assert_eq!(converted.title, "Understanding Ownership");
    assert!(!converted.markdown.contains("```"));
}

#[tokio::test]
async fn test_run_fetches_and_converts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/post"))
        .and(header("Cache-Control", "no-cache"))
        .and(header("Upgrade-Insecure-Requests", "1"))
        .respond_with(html_response(&fixture("blog_article.html")))
        .mount(&mock_server)
        .await;

    let converted = Pipeline::new().run(&format!("{}/post", mock_server.uri())).await.unwrap();

    assert!(converted.markdown.starts_with("# Understanding Ownership"));
    assert!(converted.used_fallback);
}

#[tokio::test]
async fn test_run_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("User-Agent", "marksift-test/1.0"))
        .respond_with(html_response("<article><p>Agent accepted</p></article>"))
        .mount(&mock_server)
        .await;

    let pipeline = Pipeline::builder().user_agent("marksift-test/1.0").build();
    let converted = pipeline.run(&mock_server.uri()).await.unwrap();

    assert_eq!(converted.markdown, "Agent accepted");
}

#[tokio::test]
async fn test_run_matches_profile_by_host() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(&fixture("wechat_post.html")))
        .mount(&mock_server)
        .await;

    let local = SiteProfile::new("local", Matcher::host("127.0.0.1"))
        .title(["#activity-name"])
        .content(["#js_content"])
        .repair(Repair::lazy_images());
    let pipeline = Pipeline::builder().profiles(ProfileTable::new(vec![local])).build();

    let converted = pipeline.run(&format!("{}/s/abc", mock_server.uri())).await.unwrap();

    assert_eq!(converted.profile.as_deref(), Some("local"));
    assert!(converted.markdown.contains("https://mmbiz.qpic.cn/mmbiz_png/abc/640"));
}

#[tokio::test]
async fn test_run_http_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let target = format!("{}/missing", mock_server.uri());
    match Pipeline::new().run(&target).await {
        Err(MarksiftError::HttpStatus { status, url }) => {
            assert_eq!(status, 404);
            assert_eq!(url, target);
        }
        other => panic!("Expected HTTP 404 error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response("<article>late</article>").set_delay(std::time::Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let pipeline = Pipeline::builder().timeout(1).build();
    let err = pipeline.run(&mock_server.uri()).await.unwrap_err();

    assert!(matches!(err, MarksiftError::Timeout { timeout: 1 }), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

#[tokio::test]
async fn test_run_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(&fixture("chrome_only.html")))
        .mount(&mock_server)
        .await;

    let err = Pipeline::new().run(&mock_server.uri()).await.unwrap_err();
    assert!(matches!(err, MarksiftError::NoContent));
}
