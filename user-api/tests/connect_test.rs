use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Server;
use user_api::{ClientConfig, ConnectError, HealthCheckError, KeepaliveConfig, UsersApi};
use user_proto::UserServiceServer;
use user_service_impl::UserServiceImpl;


async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();

    let addr = listener.local_addr().unwrap();

    let (reporter, health_service) = tonic_health::server::health_reporter();
    reporter
        .set_service_status("userapi", tonic_health::ServingStatus::Serving)
        .await;

    tokio::spawn(async move {
        Server::builder()
            .add_service(UserServiceServer::new(UserServiceImpl::default()))
            .add_service(health_service)
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    addr.to_string()
}

#[tokio::test]
async fn test_connect_with_bare_address() {
    let addr = spawn_server().await;

    let client = UsersApi::connect(ClientConfig::new(addr)).await.unwrap();

    assert_eq!(client.timeout(), Duration::from_secs(60));
    client.health_check().await.unwrap();

    let token = client.sign_up("dave@example.com", b"pw", 0).await.unwrap();
    let user = client.check_auth(&token).await.unwrap();
    assert_eq!(user.email, "dave@example.com");

    client.close().await;
    assert!(client.is_closed().await);
}

#[tokio::test]
async fn test_connect_with_custom_keepalive() {
    let addr = spawn_server().await;

    let config = ClientConfig::new(format!("http://{addr}")).with_keepalive(KeepaliveConfig {
        interval: Duration::from_secs(30),
        timeout: Duration::from_secs(5),
        while_idle: false,
    });

    let client = UsersApi::connect(config).await.unwrap();

    client.health_check().await.unwrap();
}

#[tokio::test]
async fn test_connect_with_connect_timeout() {
    let addr = spawn_server().await;

    let config = ClientConfig::new(addr).with_connect_timeout(Duration::from_secs(2));
    assert_eq!(config.connect_timeout, Some(Duration::from_secs(2)));

    let client = UsersApi::connect(config).await.unwrap();

    client.health_check().await.unwrap();
    client.sign_up("frank@example.com", b"pw", 0).await.unwrap();
}

#[tokio::test]
async fn test_connect_refused() {
    // Grab a free port and release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let result = UsersApi::connect(ClientConfig::new(addr.clone())).await;

    assert!(matches!(result, Err(ConnectError::ConnectionFailed(a, _)) if a == addr));
}

#[tokio::test]
async fn test_connect_empty_address() {
    let result = UsersApi::connect(ClientConfig::new("")).await;

    assert!(matches!(result, Err(ConnectError::EmptyAddress)));
}

#[tokio::test]
async fn test_lazy_client_reports_dial_failure_per_call() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let client = UsersApi::connect_lazy(ClientConfig::new(addr)).unwrap();

    let err = client.sign_in("a@b.com", b"pw").await.unwrap_err();
    assert!(err.status().is_some());
    assert!(!err.is_timeout());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_health_checks() {
    let addr = spawn_server().await;

    let client = Arc::new(UsersApi::connect(ClientConfig::new(addr)).await.unwrap());

    let handles = (0..50).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.health_check().await })
    });

    let results: Vec<Result<(), HealthCheckError>> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.len(), 50);
    assert!(results.iter().all(Result::is_ok));

    // Business calls keep working alongside the health checks.
    client.sign_up("erin@example.com", b"pw", 0).await.unwrap();
}
