//! HTTP boundary tests against a live server on an ephemeral port.

use std::sync::Arc;

use serde_json::{json, Value};

use payment_reconciler::http::HttpServer;
use payment_reconciler::lifecycle::Shutdown;
use payment_reconciler::config::ServerConfig;

mod common;
use common::{build_orchestrator, native_tx, recipient, MockChain, TEST_CHAIN};

async fn start_server(chain: Arc<MockChain>) -> (String, Shutdown) {
    let (orchestrator, _store) = build_orchestrator(chain, 10, 2);
    let server = HttpServer::new(orchestrator, &ServerConfig::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (format!("http://{addr}"), shutdown)
}

fn create_body(reference: &str) -> Value {
    json!({
        "chain_id": TEST_CHAIN,
        "asset": { "symbol": "ETH", "decimals": 18, "kind": "native" },
        "recipient": recipient().to_string(),
        "amount": "100",
        "reference": reference,
        "expires_at": common::far_future(),
    })
}

#[tokio::test]
async fn test_intent_lifecycle_over_http() {
    let chain = Arc::new(MockChain::new(100).with_block(99, vec![native_tx(recipient(), 100)]));
    let (base, shutdown) = start_server(chain).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    // Create
    let res = client
        .post(format!("{base}/intents"))
        .json(&create_body("http-order-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let body: Value = res.json().await.unwrap();
    let id = body["intent"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["intent"]["status"], "PENDING");
    assert!(body["payment_request"]["uri"]
        .as_str()
        .unwrap()
        .starts_with("ethereum:"));

    // Fetch
    let res = client
        .get(format!("{base}/intents/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "PENDING");

    // On-demand verify settles it
    let res = client
        .post(format!("{base}/intents/{id}/verify"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let result: Value = res.json().await.unwrap();
    assert_eq!(result["status"], "CONFIRMED");
    assert_eq!(result["confirmations"], 2);

    let res = client
        .get(format!("{base}/intents/{id}"))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "CONFIRMED");
    assert!(body["tx_hash"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_validation_and_conflict_statuses() {
    let chain = Arc::new(MockChain::new(100));
    let (base, shutdown) = start_server(chain).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    // Malformed recipient → 400 with the taxonomy code.
    let mut bad = create_body("http-order-bad");
    bad["recipient"] = json!("not-an-address");
    let res = client
        .post(format!("{base}/intents"))
        .json(&bad)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // Duplicate reference → 409.
    let ok = create_body("http-order-dup");
    assert_eq!(
        client
            .post(format!("{base}/intents"))
            .json(&ok)
            .send()
            .await
            .unwrap()
            .status(),
        201
    );
    let res = client
        .post(format!("{base}/intents"))
        .json(&ok)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    // Wrong network for this deployment → 400 with CHAIN_MISMATCH.
    let mut wrong_chain = create_body("http-order-chain");
    wrong_chain["chain_id"] = json!("eip155:1");
    let res = client
        .post(format!("{base}/intents"))
        .json(&wrong_chain)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "CHAIN_MISMATCH");

    // Unknown intent → 404.
    let res = client
        .get(format!("{base}/intents/ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let res = client
        .post(format!("{base}/intents/ghost/verify"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_health_reflects_collaborators() {
    let chain = Arc::new(MockChain::new(100));
    let (base, shutdown) = start_server(chain).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["chain_id"], TEST_CHAIN);
    assert_eq!(body["rpc_connected"], true);
    assert_eq!(body["db_status"], "ok");
    shutdown.trigger();

    // A node on the wrong network is unhealthy even though it responds.
    let chain = Arc::new(MockChain::new(100).with_network(1));
    let (base, shutdown) = start_server(chain).await;
    let res = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["rpc_connected"], true);
    shutdown.trigger();
}
