//! Integration tests for the kolors-rpc JSON-RPC server.
//!
//! Each test seeds a fresh SQLite file, launches the server binary against it
//! and talks to it over HTTP.

use kolors_core::{AppConfig, SqliteStore};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncBufReadExt;

/// Create a temporary database seeded with the given legacy rows.
fn create_test_db(legacy: &[(Option<&str>, Option<&str>)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join(AppConfig::DATABASE_FILENAME);

    let store = SqliteStore::open_at(&db_path).expect("Failed to create test database");
    for (name, hex) in legacy {
        store.insert_legacy(*name, *hex).unwrap();
    }

    (temp_dir, db_path)
}

/// A running `kolors-rpc` process and a client pointed at it.
struct TestServer {
    child: tokio::process::Child,
    port: u16,
    client: reqwest::Client,
    stdout_drain: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Launch the binary against `database` and wait for `/health`.
    async fn launch(database: &Path) -> Result<Self, String> {
        let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_kolors-rpc"))
            .args(["--host", "127.0.0.1", "--port", "0", "--database"])
            .arg(database)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("failed to spawn kolors-rpc: {e}"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| "stdout was not piped".to_string())?;
        let mut lines = tokio::io::BufReader::new(stdout).lines();

        let port = tokio::time::timeout(Duration::from_secs(20), async {
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(port) = line.strip_prefix("RPC_PORT=") {
                    return port.trim().parse::<u16>().ok();
                }
            }
            None
        })
        .await
        .ok()
        .flatten()
        .ok_or_else(|| "kolors-rpc never announced RPC_PORT".to_string())?;

        let stdout_drain =
            tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });

        let server = Self {
            child,
            port,
            client: reqwest::Client::new(),
            stdout_drain: Some(stdout_drain),
        };
        server.wait_until_healthy(Duration::from_secs(15)).await?;
        Ok(server)
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn wait_until_healthy(&self, limit: Duration) -> Result<(), String> {
        let deadline = tokio::time::Instant::now() + limit;
        while tokio::time::Instant::now() < deadline {
            let health = self.client.get(self.url("/health")).send().await;
            if let Ok(response) = health {
                if let Ok(body) = response.json::<Value>().await {
                    if body["status"] == "ok" {
                        return Ok(());
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Err(format!("kolors-rpc on port {} never became healthy", self.port))
    }

    /// Full JSON-RPC envelope for `method`.
    async fn call_raw(&self, method: &str, params: Value) -> Value {
        self.client
            .post(self.url("/rpc"))
            .json(&json!({"jsonrpc": "2.0", "method": method, "params": params, "id": 1}))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .expect("RPC request failed")
            .json()
            .await
            .expect("RPC response was not JSON")
    }

    /// The `result` of a call, or the serialized `error`.
    async fn call(&self, method: &str, params: Value) -> Result<Value, String> {
        let envelope = self.call_raw(method, params).await;
        match envelope.get("error") {
            Some(error) => Err(error.to_string()),
            None => Ok(envelope["result"].clone()),
        }
    }

    async fn stop(mut self) {
        if let Some(drain) = self.stdout_drain.take() {
            drain.abort();
        }
        let _ = self.child.kill().await;
        let _ = self.child.wait().await;
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(drain) = self.stdout_drain.take() {
            drain.abort();
        }
        let _ = self.child.start_kill();
    }
}

#[tokio::test]
async fn test_migration_lifecycle_over_rpc() {
    let (_dir, db_path) = create_test_db(&[
        (Some("Red"), Some("FF0000")),
        (Some("Blue"), Some("0000ff")),
        (Some("Bad"), None),
    ]);
    let server = TestServer::launch(&db_path).await.unwrap();

    let check = server.call("check_legacy_data", json!({})).await.unwrap();
    assert_eq!(check["has_legacy_data"], json!(true));
    assert_eq!(check["migration_needed"], json!(true));

    let run = server.call("migrate_legacy_data", json!({})).await.unwrap();
    assert_eq!(run["success"], json!(false));
    assert_eq!(run["result"]["total_legacy_records"], json!(3));
    assert_eq!(run["result"]["migrated_records"], json!(2));
    assert_eq!(run["result"]["failed_records"], json!(1));

    let status = server.call("get_migration_status", json!({})).await.unwrap();
    assert_eq!(status["status"], json!("COMPLETED_WITH_ERRORS"));
    assert_eq!(status["statistics"]["migrated_record_count"], json!(2));

    let validation = server.call("validate_migration", json!({})).await.unwrap();
    assert_eq!(validation["validation"]["valid"], json!(false));
    assert_eq!(validation["validation"]["legacy_record_count"], json!(3));

    let rerun = server.call("migrate_legacy_data", json!({})).await.unwrap();
    assert_eq!(rerun["result"]["migrated_records"], json!(2));
    assert_eq!(rerun["result"]["warnings"].as_array().unwrap().len(), 2);
    let stats = server
        .call("get_combination_statistics", json!({}))
        .await
        .unwrap();
    assert_eq!(stats["statistics"]["total_combinations"], json!(2));

    let integrity = server.call("validate_migrated_data", json!({})).await.unwrap();
    assert_eq!(integrity["success"], json!(true));

    server.stop().await;
}

#[tokio::test]
async fn test_combination_editing_over_rpc() {
    let (_dir, db_path) = create_test_db(&[]);
    let server = TestServer::launch(&db_path).await.unwrap();

    let created = server
        .call(
            "create_combination",
            json!({"name": "Sunset", "hex_values": ["FF4500", "FF8C00", "FFD700"]}),
        )
        .await
        .unwrap();
    let id = created["combination"]["id"].clone();

    let removed = server
        .call("remove_color", json!({"combinationId": id, "position": 2}))
        .await
        .unwrap();
    let positions: Vec<i64> = removed["combination"]["colors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![1, 2]);

    let next = server
        .call("get_next_position", json!({"combinationId": id}))
        .await
        .unwrap();
    assert_eq!(next["position"], json!(3));

    server.stop().await;
}

#[tokio::test]
async fn test_error_handling() {
    let (_dir, db_path) = create_test_db(&[]);
    let server = TestServer::launch(&db_path).await.unwrap();

    // Call a non-existent method
    assert!(server.call("nonexistent_method", json!({})).await.is_err());

    // Missing required parameter
    let payload = server.call_raw("get_combination", json!({})).await;
    assert_eq!(payload["error"]["code"], json!(-32602));

    // Validation failures carry each message
    let payload = server
        .call_raw(
            "create_combination",
            json!({"name": "X", "hexValues": ["nothex"]}),
        )
        .await;
    assert_eq!(payload["error"]["code"], json!(-32005));
    assert_eq!(payload["error"]["data"]["errors"].as_array().unwrap().len(), 3);

    // Unknown combination
    let payload = server
        .call_raw("delete_combination", json!({"combination_id": 999}))
        .await;
    assert_eq!(payload["error"]["code"], json!(-32002));

    server.stop().await;
}

#[tokio::test]
async fn test_health_check_rpc() {
    let (_dir, db_path) = create_test_db(&[]);
    let server = TestServer::launch(&db_path).await.unwrap();

    let response = server.call("health_check", json!({})).await.unwrap();
    assert_eq!(response.get("status").and_then(|v| v.as_str()), Some("ok"));

    server.stop().await;
}
