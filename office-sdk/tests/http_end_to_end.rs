//! Sync client over the real HTTP transport against a mock backend

use std::time::Duration;

use mockito::Server;
use office_sdk::{RoomId, SyncClient, SyncConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::timeout;

const STATE_BODY: &str = r#"{
    "simulationTime": "2024-01-01T10:00:00",
    "externalTemperature": 3.2,
    "rooms": [{
        "id": "open space/2",
        "name": "Open space",
        "lights": [],
        "motionSensor": {"id": "m1", "roomId": "open space/2", "motionDetected": true},
        "temperatureSensor": {"id": "t1", "roomId": "open space/2", "temperature": 19.0}
    }]
}"#;

fn fast_config(base_url: String) -> SyncConfig {
    SyncConfig::default()
        .with_base_url(base_url)
        .with_state_interval(Duration::from_millis(50))
        .with_alerts_interval(Duration::from_millis(50))
        .with_messages_interval(Duration::from_millis(50))
        .with_heating_interval(Duration::from_millis(50))
}

#[tokio::test]
async fn test_polls_real_http_backend() {
    let mut server = Server::new_async().await;
    let _state = server
        .mock("GET", "/api/environment/state")
        .with_status(200)
        .with_body(STATE_BODY)
        .create_async()
        .await;
    let _alerts = server
        .mock("GET", "/api/environment/alerts")
        .with_status(500)
        .create_async()
        .await;
    let _heating = server
        .mock("GET", "/api/environment/rooms/open%20space%2F2/heating")
        .with_status(200)
        .with_body(r#"{"roomId":"open space/2","heatingActive":true}"#)
        .create_async()
        .await;

    let client = SyncClient::new(fast_config(server.url())).unwrap();
    let mut states = client.observe_state();
    let mut alerts = client.observe_alerts();
    let mut heating = client.observe_heating(RoomId::new("open space/2"));
    client.start().unwrap();

    let wait = Duration::from_secs(5);
    let state = timeout(wait, states.recv()).await.unwrap().unwrap();
    assert_eq!(state.rooms[0].id, RoomId::new("open space/2"));

    let fallback = timeout(wait, alerts.recv()).await.unwrap().unwrap();
    assert!(fallback.is_empty());

    let update = timeout(wait, heating.recv()).await.unwrap().unwrap();
    assert!(update.heating_active);

    client.shutdown().await.unwrap();
    assert!(client.fetch_state().await.is_err());
}

#[tokio::test]
async fn test_shutdown_closes_backend_connections() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // One keep-alive exchange, then wait for the client to hang up
    let backend = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before the request arrived");
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                  content-length: 2\r\nconnection: keep-alive\r\n\r\n[]",
            )
            .await
            .unwrap();
        timeout(Duration::from_secs(3), socket.read(&mut buf)).await
    });

    let client = SyncClient::new(SyncConfig::default().with_base_url(format!("http://{}", addr)))
        .unwrap();
    let alerts = client.fetch_alerts().await.unwrap();
    assert!(alerts.is_empty());

    client.shutdown().await.unwrap();

    let outcome = backend.await.unwrap();
    assert!(
        matches!(outcome, Ok(Ok(0)) | Ok(Err(_))),
        "backend connection still open after shutdown: {:?}",
        outcome
    );
}

#[test]
fn test_invalid_config_is_rejected_before_start() {
    let config = SyncConfig::default().with_state_interval(Duration::ZERO);
    assert!(matches!(
        SyncClient::new(config),
        Err(office_sdk::SdkError::Config(_))
    ));
}
