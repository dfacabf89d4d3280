use alertmesh_relay::{serve, AppState, RelayConfig};
use serde_json::{json, Value};
use time::UtcOffset;
use tokio::net::TcpListener;

async fn start_relay(nickname: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cfg = RelayConfig {
        nickname: nickname.into(),
        ..RelayConfig::default()
    };
    tokio::spawn(serve(listener, AppState::new(cfg, UtcOffset::UTC), std::future::pending()));
    format!("http://{addr}")
}

async fn stored_lines(client: &reqwest::Client, base: &str) -> Vec<String> {
    client
        .get(format!("{base}/messages"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn empty_relay_returns_empty_array() {
    let base = start_relay("You").await;
    let client = reqwest::Client::new();
    assert!(stored_lines(&client, &base).await.is_empty());
}

#[tokio::test]
async fn send_stores_a_formatted_line() {
    let base = start_relay("Aaradhya").await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/send"))
        .json(&json!({ "message": "Hello from the shelter" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let lines = stored_lines(&client, &base).await;
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Received message at "), "{}", lines[0]);
    assert!(lines[0].contains(" +0000 UTC from Aaradhya: "), "{}", lines[0]);
    assert!(lines[0].ends_with(": Hello from the shelter"));
}

#[tokio::test]
async fn bad_bodies_are_rejected() {
    let base = start_relay("You").await;
    let client = reqwest::Client::new();

    for body in ["", "not json", r#"{"message": ""}"#, r#"{"text": "hi"}"#] {
        let resp = client
            .post(format!("{base}/send"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "body {body:?}");
        assert_eq!(resp.text().await.unwrap(), "failed to decode");
    }
    assert!(stored_lines(&client, &base).await.is_empty());

    let health: Value = client
        .get(format!("{base}/system/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["sends_rejected"], 4);
    assert_eq!(health["messages_stored"], 0);
}

#[tokio::test]
async fn inbound_lines_keep_the_peer_nickname() {
    let base = start_relay("You").await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/send"))
        .json(&json!({ "message": "first" }))
        .send()
        .await
        .unwrap();
    let resp = client
        .post(format!("{base}/inbound"))
        .json(&json!({ "from": "Kabir", "message": "medical emergency at block C" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let lines = stored_lines(&client, &base).await;
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("from You: first"));
    assert!(lines[1].ends_with("from Kabir: medical emergency at block C"));

    let resp = client
        .post(format!("{base}/inbound"))
        .json(&json!({ "from": "", "message": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn cors_headers_and_preflight() {
    let base = start_relay("You").await;
    let client = reqwest::Client::new();

    let resp = client
        .request(reqwest::Method::OPTIONS, format!("{base}/send"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert!(resp.text().await.unwrap().is_empty());

    let resp = client.get(format!("{base}/messages")).send().await.unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        resp.headers()["access-control-allow-methods"],
        "GET, POST, OPTIONS"
    );
}

#[tokio::test]
async fn health_endpoints() {
    let base = start_relay("You").await;
    let client = reqwest::Client::new();

    let ok = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(ok.text().await.unwrap(), "ok");

    let health: Value = client
        .get(format!("{base}/system/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["room"], "chat-room");
    assert_eq!(health["nickname"], "You");
    assert_eq!(health["messages_stored"], 0);
}
