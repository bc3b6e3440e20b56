use std::time::Duration;

use httpmock::prelude::*;
use phish_trainer::sources::bundled::BundledList;
use phish_trainer::sources::remote::RemoteList;
use phish_trainer::sources::{FallbackSource, SourceKind, UrlSource};

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("phish-trainer-test")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

#[tokio::test]
async fn remote_list_serves_the_feed_in_order() {
    let server = MockServer::start();
    let feed = server.mock(|when, then| {
        when.method(GET).path("/feed.json");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"url":"https://one.example.com/"},"https://two.example.com/"]"#);
    });

    let mut list = RemoteList::new(client(), server.url("/feed.json"), Duration::from_secs(60));
    assert_eq!(list.kind(), SourceKind::Remote);
    assert_eq!(
        list.next_candidate_url().await.as_deref(),
        Some("https://one.example.com/")
    );
    assert_eq!(
        list.next_candidate_url().await.as_deref(),
        Some("https://two.example.com/")
    );
    // Buffer drained and the refetch interval has not passed.
    assert_eq!(list.next_candidate_url().await, None);
    feed.assert_hits(1);
}

#[tokio::test]
async fn plain_text_feed_is_read_line_by_line() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.txt");
        then.status(200)
            .body("# today\nhttps://a.example.com\n\nhttps://b.example.com\n");
    });

    let list = RemoteList::new(client(), server.url("/feed.txt"), Duration::from_secs(60));
    let urls = list.fetch().await.unwrap();
    assert_eq!(urls, vec!["https://a.example.com", "https://b.example.com"]);
}

#[tokio::test]
async fn failing_feed_falls_back_to_bundled() {
    let server = MockServer::start();
    let feed = server.mock(|when, then| {
        when.method(GET).path("/feed.json");
        then.status(503);
    });

    let remote = RemoteList::new(client(), server.url("/feed.json"), Duration::ZERO);
    let bundled = BundledList::new(vec!["https://www.example.com/".to_string()]).cycling();
    let mut source = FallbackSource::new(Box::new(remote), Box::new(bundled));

    for _ in 0..2 {
        assert_eq!(
            source.next_candidate_url().await.as_deref(),
            Some("https://www.example.com/")
        );
    }
    feed.assert_hits(2);
}
