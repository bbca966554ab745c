use std::sync::Arc;

use shrtnr_generator::{SqidsGenerator, SqidsSettings};
use shrtnr_shortener::{ShortCode, ShortenParams, Shortener, ShortenerService};
use shrtnr_storage::{ReadRepository, RedbRepository};
use tempfile::TempDir;

type Service = ShortenerService<RedbRepository, SqidsGenerator>;

fn service_at(dir: &TempDir) -> Service {
    let repository = RedbRepository::open(dir.path().join("shrtnr.db")).unwrap();
    let generator = SqidsGenerator::new(SqidsSettings::default()).unwrap();
    ShortenerService::new(repository, generator)
}

#[tokio::test]
async fn shorten_resolve_count() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_at(&dir);

    let code = service
        .shorten(ShortenParams::new("google.com"))
        .await
        .unwrap();

    // prefix + one or two chars for each of 4 numbers + 3 separators
    let len = code.as_str().len();
    assert!((8..=12).contains(&len), "unexpected length {len} for {code:?}");
    assert!(code.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(service.resolve(&code).await.unwrap(), "google.com");
    assert_eq!(service.total_mappings().await.unwrap(), 1);
}

#[tokio::test]
async fn urls_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_at(&dir);

    let urls = [
        "google.com",
        "https://youtu.be/dQw4w9WgXcQ?si=d1lqXPpbH0N8Pq2h",
        "https://www.example.com/page",
        "http://localhost:8000/some/deep/path?with=query#and-fragment",
    ];

    for url in urls {
        let code = service.shorten(ShortenParams::new(url)).await.unwrap();
        assert_eq!(service.resolve(&code).await.unwrap(), url);
    }
}

#[tokio::test]
async fn same_url_twice_gives_two_mappings() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_at(&dir);

    let before = service.total_mappings().await.unwrap();
    let first = service
        .shorten(ShortenParams::new("https://example.com"))
        .await
        .unwrap();
    let second = service
        .shorten(ShortenParams::new("https://example.com"))
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(service.total_mappings().await.unwrap(), before + 2);
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_at(&dir);

    let err = service
        .resolve(&ShortCode::new("never-written").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn domain_tags() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_at(&dir);

    let code = service
        .shorten(ShortenParams::new("https://www.example.com/page").with_domain_tag(true))
        .await
        .unwrap();
    assert!(code.as_str().starts_with("example-"));
    assert_eq!(
        service.resolve(&code).await.unwrap(),
        "https://www.example.com/page"
    );

    let code = service
        .shorten(ShortenParams::new("https://example.com/a.b.c").with_domain_tag(true))
        .await
        .unwrap();
    assert!(code.as_str().starts_with("b-"));
}

#[tokio::test]
async fn mappings_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let code = {
        let service = service_at(&dir);
        service
            .shorten(ShortenParams::new("https://example.com/persisted"))
            .await
            .unwrap()
    };

    let service = service_at(&dir);
    assert_eq!(
        service.resolve(&code).await.unwrap(),
        "https://example.com/persisted"
    );
    assert_eq!(service.total_mappings().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_shortens_all_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(service_at(&dir));

    let mut handles = vec![];
    for i in 0..40 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let url = format!("https://example.com/{i}");
            let code = service
                .shorten(ShortenParams::new(url.clone()))
                .await
                .unwrap();
            (code, url)
        }));
    }

    let mut created = vec![];
    for handle in handles {
        created.push(handle.await.unwrap());
    }

    for (code, url) in &created {
        assert_eq!(&service.resolve(code).await.unwrap(), url);
    }
    assert_eq!(service.total_mappings().await.unwrap(), 40);
    assert_eq!(service.repository().scan_count().await.unwrap(), 40);
    assert_eq!(service.repository().count().await.unwrap(), 40);
}
