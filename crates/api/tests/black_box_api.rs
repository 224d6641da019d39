use billzy_api::config::ApiConfig;
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(time_scale: f64) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let config = ApiConfig {
            time_scale,
            ..ApiConfig::instant()
        };
        let app = billzy_api::app::build_app(config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn login(client: &reqwest::Client, server: &TestServer) -> String {
    let res = client
        .post(server.url("/login"))
        .json(&json!({ "email": "owner@example.com", "password": "anything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["screen"], "dashboard");
    body["sessionId"].as_str().unwrap().to_string()
}

async fn wait_for_task(
    client: &reqwest::Client,
    server: &TestServer,
    token: &str,
    task_id: &str,
) -> Value {
    for _ in 0..200 {
        let res = client
            .get(server.url(&format!("/tasks/{task_id}")))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        if body["phase"] != "running" {
            return body;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    panic!("task {task_id} did not finish within timeout");
}

async fn upload_sample(client: &reqwest::Client, server: &TestServer, token: &str) {
    let res = client
        .post(server.url("/uploads"))
        .bearer_auth(token)
        .json(&json!({ "files": ["january.pdf", "notes.txt", "scan.JPG"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["selection"]["accepted"], json!(["january.pdf", "scan.JPG"]));
    assert_eq!(body["selection"]["rejected"], json!(["notes.txt"]));

    let task_id = body["task"]["taskId"].as_str().unwrap().to_string();
    let done = wait_for_task(client, server, token, &task_id).await;
    assert_eq!(done["phase"], "completed");
    assert_eq!(done["percent"], 100);
}

async fn get_json(client: &reqwest::Client, server: &TestServer, token: &str, path: &str) -> Value {
    let res = client
        .get(server.url(path))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK, "GET {path}");
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public_and_everything_else_needs_a_session() {
    let server = TestServer::spawn(0.0).await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(server.url("/invoices")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    let res = client
        .get(server.url("/dashboard"))
        .bearer_auth("not-a-session")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn full_filing_workflow() {
    let server = TestServer::spawn(0.0).await;
    let client = reqwest::Client::new();
    let token = login(&client, &server).await;

    // Nothing but unsupported files.
    let res = client
        .post(server.url("/uploads"))
        .bearer_auth(&token)
        .json(&json!({ "files": ["notes.txt"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    upload_sample(&client, &server, &token).await;

    let screen = get_json(&client, &server, &token, "/screen").await;
    assert_eq!(screen["screen"], "validation");

    let invoices = get_json(&client, &server, &token, "/invoices").await;
    assert_eq!(invoices["invoices"].as_array().unwrap().len(), 5);
    assert_eq!(invoices["counts"]["errors"], 2);
    assert_eq!(invoices["invoices"][2]["status"], "error");

    // Gate holds while errors remain.
    let res = client
        .post(server.url("/invoices/continue"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Please fix all errors before continuing");

    // Manual edit of invoice 3; the total arrives as text.
    let res = client
        .put(server.url("/invoices/3"))
        .bearer_auth(&token)
        .json(&json!({
            "invoiceNo": "INV-2025-003",
            "vendor": "Software Services Inc",
            "gstin": "29SOFTW1234A1Z9",
            "total": "45000.50",
            "date": "2025-01-17"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let edited: Value = res.json().await.unwrap();
    assert_eq!(edited["status"], "validated");
    assert_eq!(edited["total"], 45000.5);
    assert!(edited.get("errors").is_none());

    let res = client
        .put(server.url("/invoices/999"))
        .bearer_auth(&token)
        .json(&json!({
            "invoiceNo": "X", "vendor": "X", "gstin": "X", "total": 1, "date": "2025-01-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Auto-fix handles the remaining one.
    let res = client
        .post(server.url("/invoices/auto-fix"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["fixed"], 1);
    assert_eq!(body["counts"]["errors"], 0);

    let fixed = get_json(&client, &server, &token, "/invoices/5").await;
    assert_eq!(fixed["gstin"], "29ABCDE1234F1Z5");
    assert_eq!(fixed["total"], 10000.0);
    assert_eq!(fixed["status"], "validated");

    let res = client
        .post(server.url("/invoices/continue"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["screen"], "generate");

    // Exports.
    let res = client
        .post(server.url("/exports/pdf"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    for kind in ["tally", "gst"] {
        let res = client
            .post(server.url(&format!("/exports/{kind}")))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        let body: Value = res.json().await.unwrap();
        let done = wait_for_task(&client, &server, &token, body["taskId"].as_str().unwrap()).await;
        assert_eq!(done["phase"], "completed");
    }
    let exports = get_json(&client, &server, &token, "/exports").await;
    let exports = exports["exports"].as_array().unwrap().clone();
    assert_eq!(exports.len(), 2);
    assert!(exports[0]["fileName"].as_str().unwrap().starts_with("tally_export_"));
    assert!(exports[1]["fileName"].as_str().unwrap().ends_with(".json"));

    // Portal.
    let res = client
        .get(server.url("/portal/receipt"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(server.url("/portal/uploads"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await.unwrap();
    wait_for_task(&client, &server, &token, body["taskId"].as_str().unwrap()).await;

    let receipt = get_json(&client, &server, &token, "/portal/receipt").await;
    assert_eq!(receipt["uploaded"], 5);
    assert_eq!(receipt["failed"], 0);

    // Reports.
    let report = get_json(&client, &server, &token, "/reports").await;
    assert_eq!(report["report"]["totalInvoices"], 5);
    assert_eq!(report["report"]["errors"], 0);
    assert_eq!(report["report"]["topVendors"][0]["vendor"], "Software Services Inc");
    assert_eq!(report["downloads"]["exports"].as_array().unwrap().len(), 2);

    let dashboard = get_json(&client, &server, &token, "/dashboard").await;
    assert_eq!(dashboard["invoicesProcessed"], 5);
    assert_eq!(dashboard["email"], "owner@example.com");

    // Logout ends the session.
    let res = client
        .post(server.url("/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url("/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn navigation_is_free_except_back_to_login() {
    let server = TestServer::spawn(0.0).await;
    let client = reqwest::Client::new();
    let token = login(&client, &server).await;

    let res = client
        .post(server.url("/screen"))
        .bearer_auth(&token)
        .json(&json!({ "screen": "gst-upload" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["screen"], "gst-upload");
    assert_eq!(body["nav"].as_array().unwrap().len(), 3);

    for (screen, status) in [("login", StatusCode::BAD_REQUEST), ("settings", StatusCode::BAD_REQUEST)] {
        let res = client
            .post(server.url("/screen"))
            .bearer_auth(&token)
            .json(&json!({ "screen": screen }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), status, "navigate to {screen}");
    }
}

#[tokio::test]
async fn sessions_do_not_share_working_sets() {
    let server = TestServer::spawn(0.0).await;
    let client = reqwest::Client::new();
    let alice = login(&client, &server).await;
    let bob = login(&client, &server).await;
    assert_ne!(alice, bob);

    upload_sample(&client, &server, &alice).await;

    let invoices = get_json(&client, &server, &bob, "/invoices").await;
    assert_eq!(invoices["counts"]["total"], 0);

    let tasks = get_json(&client, &server, &bob, "/tasks").await;
    assert!(tasks["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cancelled_extraction_leaves_working_set_untouched() {
    // Real-time profile so the task is still running when cancelled.
    let server = TestServer::spawn(1.0).await;
    let client = reqwest::Client::new();
    let token = login(&client, &server).await;

    let res = client
        .post(server.url("/uploads"))
        .bearer_auth(&token)
        .json(&json!({ "files": ["january.xlsx"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await.unwrap();
    let task_id = body["task"]["taskId"].as_str().unwrap().to_string();

    let res = client
        .delete(server.url(&format!("/tasks/{task_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let done = wait_for_task(&client, &server, &token, &task_id).await;
    assert_eq!(done["phase"], "cancelled");

    let invoices = get_json(&client, &server, &token, "/invoices").await;
    assert_eq!(invoices["counts"]["total"], 0);
    let screen = get_json(&client, &server, &token, "/screen").await;
    assert_eq!(screen["screen"], "dashboard");
}

/// Reads SSE frames from an open `/stream` response, collecting notice
/// messages until `last` shows up.
async fn collect_notices_until(res: &mut reqwest::Response, last: &str) -> Vec<(String, String)> {
    let mut buffer = String::new();
    let mut notices = Vec::new();
    loop {
        let chunk = res.chunk().await.unwrap().expect("stream closed early");
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());

        while let Some(end) = buffer.find("\n\n") {
            let frame: String = buffer.drain(..end + 2).collect();
            let Some(data) = frame.lines().find_map(|line| line.strip_prefix("data:")) else {
                continue; // keep-alive comment
            };
            let payload: Value = serde_json::from_str(data.trim()).unwrap();
            if let Some(message) = payload["notice"]["message"].as_str() {
                let level = payload["notice"]["level"].as_str().unwrap().to_string();
                notices.push((level, message.to_string()));
                if message == last {
                    return notices;
                }
            }
        }
    }
}

#[tokio::test]
async fn stream_delivers_session_notices_in_order() {
    let server = TestServer::spawn(0.0).await;
    let client = reqwest::Client::new();
    let alice = login(&client, &server).await;
    let bob = login(&client, &server).await;

    let mut stream = client
        .get(server.url("/stream"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);
    assert!(
        stream.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    upload_sample(&client, &server, &alice).await;

    // Bob's activity must not reach Alice's stream.
    upload_sample(&client, &server, &bob).await;
    let res = client
        .post(server.url("/invoices/continue"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .post(server.url("/invoices/continue"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .post(server.url("/invoices/auto-fix"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let notices = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        collect_notices_until(&mut stream, "All errors auto-fixed successfully!"),
    )
    .await
    .expect("notices did not arrive");

    let expected = [
        ("success", "Successfully uploaded 2 file(s)"),
        ("error", "Please fix all errors before continuing"),
        ("success", "All errors auto-fixed successfully!"),
    ];
    let notices: Vec<(&str, &str)> = notices
        .iter()
        .map(|(level, message)| (level.as_str(), message.as_str()))
        .collect();
    assert_eq!(notices, expected);
}
