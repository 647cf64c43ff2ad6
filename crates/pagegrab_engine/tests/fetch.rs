use pagegrab_engine::{
    extract_links, FetchFailureKind, FetchSettings, Fetcher, ReqwestFetcher, BROWSER_USER_AGENT,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn ok_response_is_decoded_with_declared_charset() {
    let server = MockServer::start().await;
    // The mock only matches when the browser User-Agent is sent.
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", BROWSER_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"caf\xe9".to_vec(), "text/html; charset=ISO-8859-1"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::extraction());
    let page = fetcher.fetch(&format!("{}/page", server.uri())).await.unwrap();

    assert_eq!(page.body, "café");
    assert!(page
        .content_type
        .as_deref()
        .unwrap()
        .starts_with("text/html"));
}

#[tokio::test]
async fn non_200_status_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::extraction());
    let err = fetcher
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FetchFailureKind::HttpStatus(404));
}

#[tokio::test]
async fn unparsable_url_never_reaches_the_network() {
    let fetcher = ReqwestFetcher::new(FetchSettings::extraction());
    let err = fetcher.fetch("not a url").await.unwrap_err();
    assert_eq!(err.kind, FetchFailureKind::InvalidUrl);
}

#[tokio::test]
async fn extraction_collects_anchors_from_a_live_page() {
    let server = MockServer::start().await;
    let html = r#"
    <html><body>
        <a href="/first/" title="First">one</a>
        <a href="https://other.org/second">two</a>
    </body></html>
    "#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.as_bytes().to_vec(), "text/html"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::extraction());
    let records = extract_links(&fetcher, &server.uri(), None).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].href.as_deref(), Some("/first/"));
    assert_eq!(records[0].title.as_deref(), Some("First"));
    assert_eq!(records[1].title, None);
}
