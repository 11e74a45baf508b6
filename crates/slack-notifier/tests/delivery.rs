//! Integration tests for webhook delivery against a local HTTP endpoint.

use assert_json_diff::assert_json_include;
use cucumber_slack_notifier::{
    DeliveryError, MessageSink, Notifier, NotifierConfig, NotifyError, ProxyConfig, SlackClient,
};
use cucumber_slack_report::{load_file, CucumberResult, RunContext};
use serde_json::json;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request received by the fake webhook.
struct Received {
    head: String,
    body: String,
}

/// Serve exactly one request, answering with `status` and `reply`.
async fn fake_webhook(status: &'static str, reply: &'static str) -> (String, JoinHandle<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/services/T000/B000/XXXX", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let (head, body_start, content_length) = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_string();
                let content_length = head
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                break (head, pos + 4, content_length);
            }
        };
        while buf.len() < body_start + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            buf.extend_from_slice(&chunk[..n]);
        }
        let body =
            String::from_utf8_lossy(&buf[body_start..body_start + content_length]).to_string();

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
            reply.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        Received { head, body }
    });

    (url, handle)
}

/// Webhook on a host that does not resolve, so it is only reachable via a proxy.
const PROXIED_WEBHOOK: &str = "http://hooks.example.invalid/services/T/B/X";

fn run() -> RunContext {
    RunContext::new("http://jenkins:8080/", "job/test-job/1/", 1, "test-job")
}

#[tokio::test]
async fn test_message_is_posted_as_json() {
    let (url, server) = fake_webhook("200 OK", "ok").await;
    let config = NotifierConfig::new(url, "qa", "http://jenkins:8080/");
    let client = SlackClient::new(&config).unwrap();

    let payload =
        cucumber_slack_report::render(&CucumberResult::placeholder(), "qa", &run(), None);
    client.send(&payload).await.unwrap();

    let received = server.await.unwrap();
    assert!(received.head.starts_with("POST /services/T000/B000/XXXX HTTP/1.1"));
    assert!(received
        .head
        .to_ascii_lowercase()
        .contains("content-type: application/json"));

    let body: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert_json_include!(
        actual: body,
        expected: json!({
            "channel": "#qa",
            "color": "good",
            "icon_emoji": ":thumbsup:",
            "username": "test-job"
        })
    );
}

#[tokio::test]
async fn test_non_ok_status_is_a_delivery_error() {
    let (url, server) = fake_webhook("404 Not Found", "channel_not_found").await;
    let config = NotifierConfig::new(url, "missing", "http://jenkins:8080/");
    let notifier = Notifier::new(SlackClient::new(&config).unwrap(), &config);

    let err = notifier.notify_placeholder(&run(), None).await.unwrap_err();
    match err {
        NotifyError::Delivery(DeliveryError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "channel_not_found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_matching_no_proxy_host_bypasses_proxy() {
    let (url, server) = fake_webhook("200 OK", "ok").await;
    let mut config = NotifierConfig::new(url, "qa", "http://jenkins:8080/");
    // Nothing listens on the proxy port; delivery only succeeds directly.
    config.proxy = Some(ProxyConfig {
        host: "127.0.0.1".to_string(),
        port: 9,
        username: None,
        password: None,
        no_proxy_hosts: vec![r"127\.0\.0\.1".to_string()],
    });

    let notifier = Notifier::new(SlackClient::new(&config).unwrap(), &config);
    notifier.notify_placeholder(&run(), None).await.unwrap();
    server.await.unwrap();
}

/// Proxy settings pointing at the fake webhook's listener.
fn proxy_at(listener_url: &str, username: Option<&str>) -> ProxyConfig {
    let addr = listener_url
        .strip_prefix("http://")
        .and_then(|rest| rest.split('/').next())
        .unwrap();
    let (host, port) = addr.rsplit_once(':').unwrap();
    ProxyConfig {
        host: host.to_string(),
        port: port.parse().unwrap(),
        username: username.map(str::to_string),
        password: Some("secret".to_string()),
        no_proxy_hosts: vec![r".*\.internal".to_string()],
    }
}

#[tokio::test]
async fn test_delivery_through_proxy_with_credentials() {
    let (listener_url, proxy) = fake_webhook("200 OK", "ok").await;
    let mut config = NotifierConfig::new(PROXIED_WEBHOOK, "qa", "http://jenkins:8080/");
    config.proxy = Some(proxy_at(&listener_url, Some("ci")));

    let notifier = Notifier::new(SlackClient::new(&config).unwrap(), &config);
    notifier.notify_placeholder(&run(), None).await.unwrap();

    let received = proxy.await.unwrap();
    assert!(
        received.head.starts_with(&format!("POST {PROXIED_WEBHOOK} HTTP/1.1")),
        "{}",
        received.head
    );
    // base64("ci:secret")
    assert!(received
        .head
        .to_ascii_lowercase()
        .contains("proxy-authorization: basic y2k6c2vjcmv0"));
    let body: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert_eq!(body["channel"], "#qa");
}

#[tokio::test]
async fn test_delivery_through_proxy_without_credentials() {
    let (listener_url, proxy) = fake_webhook("200 OK", "ok").await;
    let mut config = NotifierConfig::new(PROXIED_WEBHOOK, "qa", "http://jenkins:8080/");
    config.proxy = Some(proxy_at(&listener_url, Some(" ")));

    let notifier = Notifier::new(SlackClient::new(&config).unwrap(), &config);
    notifier.notify_placeholder(&run(), None).await.unwrap();

    let received = proxy.await.unwrap();
    assert!(received.head.starts_with(&format!("POST {PROXIED_WEBHOOK} HTTP/1.1")));
    assert!(!received
        .head
        .to_ascii_lowercase()
        .contains("proxy-authorization"));
}

#[tokio::test]
async fn test_failed_report_end_to_end() {
    let (url, server) = fake_webhook("200 OK", "ok").await;
    let mut config = NotifierConfig::new(url, "#qa", "http://jenkins:8080");
    config.hide_successful_results = true;
    let notifier = Notifier::new(SlackClient::new(&config).unwrap(), &config);

    let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../slack-report/tests/fixtures/failed-result.json");
    let features = load_file(&fixture).unwrap();
    let payload = notifier.notify(&features, &run(), None).await.unwrap();
    assert_eq!(payload.color, "danger");

    let received = server.await.unwrap();
    let body: serde_json::Value = serde_json::from_str(&received.body).unwrap();
    assert_eq!(
        body["pretext"],
        "Features: 1, Scenarios: 8, Build: <http://jenkins:8080/job/test-job/1/cucumber-html-reports/|1>"
    );
    assert_eq!(body["fields"][3]["value"], "0 %");
    assert_eq!(body["fields"][7]["value"], "87 %");
}
