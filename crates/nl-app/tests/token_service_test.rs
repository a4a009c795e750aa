//! Token lifecycle against the real file-backed store.

use std::sync::Arc;

use nl_app::TokenService;
use nl_infra::FileStateStore;
use nl_core::ports::TokenStorePort;
use tempfile::TempDir;

async fn service_in(dir: &TempDir) -> (TokenService, Arc<FileStateStore>) {
    let store = Arc::new(
        FileStateStore::open(dir.path().join("state.json"))
            .await
            .unwrap(),
    );
    (TokenService::new(store.clone()), store)
}

#[tokio::test]
async fn token_is_created_lazily_and_then_stable() {
    let dir = TempDir::new().unwrap();
    let (service, store) = service_in(&dir).await;

    assert!(store.load_token().await.unwrap().is_none());

    let first = service.get_token().await.unwrap();
    assert_eq!(first.as_str().len(), 24);

    let second = service.get_token().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn token_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let first = {
        let (service, _store) = service_in(&dir).await;
        service.get_token().await.unwrap()
    };

    let (service, _store) = service_in(&dir).await;
    assert_eq!(service.get_token().await.unwrap(), first);
}

#[tokio::test]
async fn refresh_replaces_the_token_and_clears_paired() {
    let dir = TempDir::new().unwrap();
    let (service, _store) = service_in(&dir).await;

    let original = service.get_token().await.unwrap();
    service.mark_paired().await.unwrap();
    assert!(service.paired().await.unwrap());

    let rotated = service.refresh().await.unwrap();
    assert_ne!(rotated, original);
    assert!(!service.paired().await.unwrap());
    assert_eq!(service.get_token().await.unwrap(), rotated);
}

#[tokio::test]
async fn hints_reveal_at_most_eight_characters() {
    let dir = TempDir::new().unwrap();
    let (service, _store) = service_in(&dir).await;

    let token = service.get_token().await.unwrap();
    let hint = token.hint();
    assert_eq!(hint.len(), 8);
    assert!(token.as_str().starts_with(&hint[..4]));
    assert!(token.as_str().ends_with(&hint[4..]));
}

#[tokio::test]
async fn concurrent_get_token_creates_exactly_one_token() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(
        FileStateStore::open(dir.path().join("state.json"))
            .await
            .unwrap(),
    );
    let service = Arc::new(TokenService::new(store.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.get_token().await.unwrap() })
        })
        .collect();

    let mut tokens = Vec::new();
    for task in tasks {
        tokens.push(task.await.unwrap());
    }
    tokens.dedup();
    assert_eq!(tokens.len(), 1);
}
