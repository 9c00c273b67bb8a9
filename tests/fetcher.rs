use std::time::Duration;

use maint_scraper_lib::{Fetch, HttpFetcher, Settings};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings() -> Settings {
    Settings {
        delay_seconds: 0.0,
        timeout_seconds: 1,
        user_agent: Some("maint-scraper-test/1.0".to_string()),
        ..Settings::default()
    }
}

async fn serve(route: &str, response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn returns_body_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<div class=\"listing-card\"></div>"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&settings()).unwrap();
    let body = fetcher.fetch(&format!("{}/listing", server.uri())).await;
    assert_eq!(body.as_deref(), Some("<div class=\"listing-card\"></div>"));
    fetcher.close();
}

#[tokio::test]
async fn non_200_is_absent() {
    let server = serve("/missing", ResponseTemplate::new(404).set_body_string("not here")).await;
    let fetcher = HttpFetcher::new(&settings()).unwrap();
    assert_eq!(fetcher.fetch(&format!("{}/missing", server.uri())).await, None);

    let server = serve("/moved", ResponseTemplate::new(204)).await;
    assert_eq!(fetcher.fetch(&format!("{}/moved", server.uri())).await, None);
}

#[tokio::test]
async fn empty_body_is_absent() {
    let server = serve("/empty", ResponseTemplate::new(200)).await;
    let fetcher = HttpFetcher::new(&settings()).unwrap();
    assert_eq!(fetcher.fetch(&format!("{}/empty", server.uri())).await, None);
}

#[tokio::test]
async fn timeout_is_absent() {
    let server = serve(
        "/slow",
        ResponseTemplate::new(200)
            .set_body_string("too late")
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let fetcher = HttpFetcher::new(&settings()).unwrap();
    assert_eq!(fetcher.fetch(&format!("{}/slow", server.uri())).await, None);
}

#[tokio::test]
async fn connection_error_is_absent() {
    let fetcher = HttpFetcher::new(&settings()).unwrap();
    assert_eq!(fetcher.fetch("http://127.0.0.1:9/unreachable").await, None);
}
