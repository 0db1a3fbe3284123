use std::sync::Arc;
use std::time::Duration;

use dalal_core::auth::AuthorizationExchanger;
use dalal_core::credentials::{CredentialResolver, CredentialStoreTrait, InMemoryCredentialStore};
use dalal_core::gateway::{CredentialStatusState, ProxyGateway};
use dalal_core::poller::{PollerConfig, QuotePoller, QuoteSnapshot, SnapshotOrigin};
use dalal_core::upstox::{ProviderConfig, ProviderSettings, ProviderTransport, UpstoxClient};
use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    store: Arc<dyn CredentialStoreTrait>,
    gateway: ProxyGateway,
    exchanger: AuthorizationExchanger,
}

fn harness(upstox: &MockServer) -> Harness {
    let config = Arc::new(
        ProviderConfig::from_settings(ProviderSettings {
            base_url: Some(upstox.uri()),
            client_id: Some("client-id".into()),
            client_secret: Some("client-secret".into()),
            redirect_uri: Some("http://localhost:3000/callback".into()),
            ..Default::default()
        })
        .unwrap(),
    );
    let transport: Arc<dyn ProviderTransport> = Arc::new(UpstoxClient::new(&config).unwrap());
    let store: Arc<dyn CredentialStoreTrait> = Arc::new(InMemoryCredentialStore::new());
    Harness {
        gateway: ProxyGateway::new(
            CredentialResolver::new(store.clone()),
            config.clone(),
            transport.clone(),
        ),
        exchanger: AuthorizationExchanger::new(config, transport, store.clone()),
        store,
    }
}

async fn next_with_origin(
    rx: &mut watch::Receiver<Option<QuoteSnapshot>>,
    origin: SnapshotOrigin,
) -> QuoteSnapshot {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            rx.changed().await.unwrap();
            if let Some(snapshot) = rx.borrow_and_update().clone() {
                if snapshot.origin == origin {
                    return snapshot;
                }
            }
        }
    })
    .await
    .expect("snapshot with the expected origin")
}

#[tokio::test]
async fn poller_switches_from_demo_to_live_once_authorized() {
    let upstox = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/authorization/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "granted",
            "refresh_token": "refresh",
            "expires_in": 86400
        })))
        .expect(1)
        .mount(&upstox)
        .await;
    let live = json!({"status": "success", "data": {"NSE_EQ:RELIANCE": {"last_price": 2612.0}}});
    Mock::given(method("GET"))
        .and(path("/market-quote/quotes"))
        .and(query_param("symbol", "NSE_EQ|INE002A01018"))
        .and(header("authorization", "Bearer granted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(live.clone()))
        .mount(&upstox)
        .await;

    let h = harness(&upstox);
    assert_eq!(
        h.gateway.credential_status().unwrap().state,
        CredentialStatusState::Absent
    );

    let poller = QuotePoller::spawn(
        Arc::new(h.gateway.clone()),
        PollerConfig::new(["RELIANCE"]).interval(Duration::from_millis(50)),
    );
    let mut notices = poller.notices();
    let mut rx = poller.snapshots();

    let demo = next_with_origin(&mut rx, SnapshotOrigin::Demo).await;
    assert!(demo.data["data"]["NSE_EQ|INE002A01018"].is_object());
    assert_eq!(notices.recv().await.unwrap().kind, "unauthorized_absent");
    let provider_gets = upstox
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(provider_gets, 0);

    let outcome = h.exchanger.exchange_code("redirect-code").await.unwrap();
    assert!(outcome.success);
    let stored = h.store.get_latest().unwrap().unwrap();
    assert_eq!(stored.access_token, "granted");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh"));

    let snapshot = next_with_origin(&mut rx, SnapshotOrigin::Live).await;
    assert_eq!(snapshot.data, live);

    poller.stop().await;
}

#[tokio::test]
async fn second_exchange_replaces_the_first_credential() {
    let upstox = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/authorization/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "first"})))
        .up_to_n_times(1)
        .mount(&upstox)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/authorization/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "second"})))
        .mount(&upstox)
        .await;
    Mock::given(method("GET"))
        .and(path("/market-quote/quotes"))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&upstox)
        .await;

    let h = harness(&upstox);
    h.exchanger.exchange_code("code-1").await.unwrap();
    h.exchanger.exchange_code("code-2").await.unwrap();

    assert_eq!(h.store.get_latest().unwrap().unwrap().access_token, "second");
    h.gateway
        .forward(dalal_core::gateway::QuotesRequest::new(["NSE_EQ|INE002A01018"]))
        .await
        .unwrap();
}
