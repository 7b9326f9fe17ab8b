//! Server tests: real TCP connections against `run_server` on an ephemeral
//! port, covering timeouts, the connection limit and shutdown draining.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1::{self, SendRequest};
use hyper::{Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitehost::config::{AppState, Config};
use sitehost::origin::HttpOrigin;
use sitehost::server::{bind_listener, run_server};
use sitehost::site::{FileEntry, MemoryDirectory, SiteRecord};

struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
    _origin: MockServer,
}

impl Server {
    fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Start a server whose only site serves an index after `origin_delay`
async fn start(config: Config, origin_delay: Duration) -> Server {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u1/index.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="./about.html">about</a>"#, "text/html")
                .set_delay(origin_delay),
        )
        .mount(&origin)
        .await;

    let site = SiteRecord::new(
        "s1",
        vec![FileEntry::new("index.html", format!("{}/u1/index.html", origin.uri()))],
    );
    let directory = Arc::new(MemoryDirectory::from_sites(vec![site]));
    let asset_origin = Arc::new(HttpOrigin::from_config(&config.proxy).unwrap());
    let state = Arc::new(AppState::new(config, directory, asset_origin));

    let listener = bind_listener("127.0.0.1:0".parse().unwrap(), 16).unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(run_server(listener, state, async move {
        let _ = rx.await;
    }));

    Server {
        addr,
        shutdown: Some(tx),
        handle,
        _origin: origin,
    }
}

async fn connect(addr: SocketAddr) -> SendRequest<Full<Bytes>> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
    tokio::spawn(async move {
        let _ = conn.await;
    });
    sender
}

async fn fetch(
    sender: &mut SendRequest<Full<Bytes>>,
    uri: &str,
) -> Result<(StatusCode, Bytes), hyper::Error> {
    let req = Request::get(uri)
        .header("host", "localhost")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let resp = sender.send_request(req).await?;
    let status = resp.status();
    let body = resp.into_body().collect().await?.to_bytes();
    Ok((status, body))
}

#[tokio::test]
async fn test_slow_origin_answers_502_over_tcp() {
    let mut config = Config::default();
    config.proxy.upstream_timeout = 1;
    config.performance.read_timeout = 1;
    config.performance.write_timeout = 1;
    let mut server = start(config, Duration::from_secs(3)).await;

    let mut sender = connect(server.addr).await;
    let (status, body) = fetch(&mut sender, "/proxy/s1").await.unwrap();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Failed to fetch site asset");

    server.shutdown();
}

#[tokio::test]
async fn test_fast_request_passes_header_read_timeout() {
    let mut config = Config::default();
    config.performance.read_timeout = 1;
    let mut server = start(config, Duration::ZERO).await;

    let mut sender = connect(server.addr).await;
    let (status, body) = fetch(&mut sender, "/proxy/s1").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("/proxy/s1/about.html"));

    server.shutdown();
}

#[tokio::test]
async fn test_connections_over_limit_are_dropped() {
    let mut config = Config::default();
    config.performance.max_connections = Some(1);
    let mut server = start(config, Duration::ZERO).await;

    // Hold the only slot with a live keep-alive connection
    let mut first = connect(server.addr).await;
    let (status, _) = fetch(&mut first, "/healthz").await.unwrap();
    assert_eq!(status, StatusCode::OK);

    let mut second = connect(server.addr).await;
    assert!(fetch(&mut second, "/healthz").await.is_err());

    let (status, _) = fetch(&mut first, "/healthz").await.unwrap();
    assert_eq!(status, StatusCode::OK);

    // Closing the first connection frees the slot
    drop(first);
    let mut admitted = false;
    for _ in 0..20 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut retry = connect(server.addr).await;
        if let Ok((StatusCode::OK, _)) = fetch(&mut retry, "/healthz").await {
            admitted = true;
            break;
        }
    }
    assert!(admitted, "slot was not released after the first connection closed");

    server.shutdown();
}

#[tokio::test]
async fn test_shutdown_drains_in_flight_requests() {
    let mut server = start(Config::default(), Duration::from_millis(500)).await;

    let mut sender = connect(server.addr).await;
    let (status, _) = fetch(&mut sender, "/readyz").await.unwrap();
    assert_eq!(status, StatusCode::OK);

    let in_flight = tokio::spawn(async move {
        let result = fetch(&mut sender, "/proxy/s1").await;
        (sender, result)
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    server.shutdown();

    let (mut sender, result) = in_flight.await.unwrap();
    let (status, _) = result.unwrap();
    assert_eq!(status, StatusCode::OK);

    // The listener is closed, but the open connection still reports draining
    assert!(TcpStream::connect(server.addr).await.is_err());
    let (status, body) = fetch(&mut sender, "/readyz").await.unwrap();
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Shutting down");
    assert!(!server.handle.is_finished());

    // Once the last connection closes, the server returns well before the grace period
    drop(sender);
    tokio::time::timeout(Duration::from_secs(5), &mut server.handle)
        .await
        .expect("server did not finish draining")
        .unwrap();
}
