//! The axum front end served on a real socket.

use std::sync::Arc;
use std::time::Duration;

use flashx::config::EngineConfig;
use flashx::{http, Engine, Strategy};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

mod common;

#[tokio::test]
async fn test_serve_forwards_and_blacklists() {
    let backend = common::start_mock_backend("Hello from backend").await;

    let config = EngineConfig::with_backends(Strategy::RoundRobin, [format!("http://{}", backend)]);
    let open = Arc::new(Engine::builder().setup(&config).unwrap());

    let mut closed_config = config.clone();
    closed_config.blacklist = vec!["127.0.0.1".into()];
    let closed = Arc::new(Engine::builder().setup(&closed_config).unwrap());

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let (stop_tx2, stop_rx2) = oneshot::channel::<()>();

    let open_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_addr = open_listener.local_addr().unwrap();
    tokio::spawn(http::serve(open_listener, open.clone(), async move {
        let _ = stop_rx.await;
    }));

    let closed_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_addr = closed_listener.local_addr().unwrap();
    tokio::spawn(http::serve(closed_listener, closed, async move {
        let _ = stop_rx2.await;
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{}/status", open_addr))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "Hello from backend");

    let res = client
        .get(format!("http://{}/status", closed_addr))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 403);

    assert!(open.snapshot().unwrap().iter().all(|(_, c)| *c == 0));

    let _ = stop_tx.send(());
    let _ = stop_tx2.send(());
}

#[tokio::test]
async fn test_rate_limited_requests_all_complete() {
    let backend = common::start_mock_backend("ok").await;

    let mut config = EngineConfig::with_backends(Strategy::None, [format!("http://{}", backend)]);
    config.rate_limit.requests_per_second = 20;
    let engine = Arc::new(Engine::builder().setup(&config).unwrap());

    let start = std::time::Instant::now();
    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let request = axum::http::Request::builder()
                    .uri("/")
                    .body(axum::body::Body::empty())
                    .unwrap();
                engine.dispatch("127.0.0.1", request).await.map(|r| r.status())
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), 200);
    }
    // one token up front, then one every 50ms
    assert!(start.elapsed() >= Duration::from_millis(190));
}
