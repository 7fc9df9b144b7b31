//! Integration tests for the audit pipeline.
//!
//! These tests wire a real pipeline over file sinks in a temp directory,
//! drive CRUD, request, and external-call capture through it, and
//! re-parse the emitted JSON lines to verify the record shapes.

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use activity_audit::config::{AuditPipeline, Settings};
use activity_audit::context::Principal;
use activity_audit::external::{OutboundRequest, OutboundResponse, Transport, TransportError};
use activity_audit::model::EventKind;
use activity_audit::request::{Outcome, RequestInfo, ResponseInfo};
use activity_audit::serialize::RawValue;

struct TestPipeline {
    pipeline: AuditPipeline,
    temp_dir: TempDir,
}

impl TestPipeline {
    fn start() -> Self {
        // Diagnostic logging for test debugging; ignore double-init.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let mut settings = Settings::default();
        settings.service_name = "review_board".to_string();
        settings.channels.model.path = temp_dir.path().join("audit.log");
        settings.channels.request.path = temp_dir.path().join("api.log");
        settings.channels.login.path = temp_dir.path().join("login.log");
        settings.filters.skip_models = vec!["Session".to_string()];

        let pipeline = AuditPipeline::from_settings(&settings).expect("Failed to build pipeline");

        Self { pipeline, temp_dir }
    }

    fn records(&self, file: &str) -> Vec<Value> {
        let path = self.temp_dir.path().join(file);
        if !path.exists() {
            return Vec::new();
        }
        std::fs::read_to_string(&path)
            .expect("Failed to read log file")
            .lines()
            .map(|line| serde_json::from_str(line).expect("Every line must be valid JSON"))
            .collect()
    }
}

struct Editor;

impl Principal for Editor {
    fn id(&self) -> Option<String> {
        Some("14ab".to_string())
    }
    fn email(&self) -> Option<String> {
        Some("editor@example.com".to_string())
    }
    fn first_name(&self) -> Option<String> {
        Some("Edna".to_string())
    }
}

struct StubHttp;

impl Transport for StubHttp {
    fn protocol(&self) -> &str {
        "http"
    }
    fn perform(&self, request: &OutboundRequest) -> Result<OutboundResponse, TransportError> {
        if request.endpoint.contains("slow") {
            Err(TransportError::Timeout("no response after 30s".to_string()))
        } else {
            Ok(OutboundResponse::new(Some(200), json!({"accepted": true})))
        }
    }
}

#[test]
fn test_crud_event_lands_in_model_log() {
    let t = TestPipeline::start();

    t.pipeline.model().on_change(
        "User",
        EventKind::Create,
        "6f77",
        vec![
            ("name".to_string(), "Test".into()),
            ("is_active".to_string(), true.into()),
        ],
        Some(&Editor),
    );

    let records = t.records("audit.log");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["level"], "AUDIT");
    assert_eq!(record["name"], "audit.model");
    assert_eq!(record["message"], "CREATE event for User (id: 6f77)");
    assert_eq!(record["event_type"], "CREATE");
    assert_eq!(record["instance_id"], "6f77");
    assert_eq!(record["instance_repr"], json!({"name": "Test", "is_active": true}));
    assert_eq!(record["user_id"], "14ab");
    assert_eq!(record["user_info"]["first_name"], "Edna");

    // CRUD events never land in the request log.
    assert!(t.records("api.log").is_empty());
}

#[test]
fn test_internal_request_lands_in_request_log() {
    let t = TestPipeline::start();

    let request = RequestInfo::new("GET", "/api/v1/health/")
        .with_header("Accept", "application/json")
        .with_header("Authorization", "Bearer secret-token");
    let response = ResponseInfo::new(200).with_body(json!({"status": "ok"}));

    let token = t.pipeline.request().begin(&request).unwrap();
    t.pipeline
        .request()
        .end(token, Some(&Editor), Outcome::Completed(&response));

    let records = t.records("api.log");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["level"], "API");
    assert_eq!(record["name"], "audit.request");
    assert_eq!(record["request_type"], "internal");
    assert_eq!(record["service_name"], "review_board");
    assert_eq!(record["response_repr"]["status_code"], 200);
    assert_eq!(record["response_repr"]["body"], json!({"status": "ok"}));
    assert_eq!(record["error_message"], Value::Null);
    assert!(record["execution_time"].as_f64().unwrap() >= 0.0);
    // Credentials never reach the file.
    assert_eq!(record["request_repr"]["headers"]["Authorization"], "[REDACTED]");

    // Timestamp has millisecond precision: "2025-08-16 17:06:32.403".
    let ts = record["timestamp"].as_str().unwrap();
    assert_eq!(ts.len(), 23);
}

#[test]
fn test_failed_handler_is_recorded_and_propagated() {
    let t = TestPipeline::start();
    let request = RequestInfo::new("POST", "/api/v1/orders/");

    let result: Result<ResponseInfo, String> =
        t.pipeline
            .request()
            .observe(&request, None, || Err("upstream unavailable".to_string()));

    assert_eq!(result.unwrap_err(), "upstream unavailable");

    let records = t.records("api.log");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["error_message"], "upstream unavailable");
    assert_eq!(records[0]["response_repr"], Value::Null);
    assert!(records[0]["execution_time"].as_f64().unwrap() >= 0.0);
}

#[test]
fn test_external_calls_share_the_request_log() {
    let t = TestPipeline::start();
    let client = t.pipeline.external_client("apollo", StubHttp);

    client
        .post("https://apollo.internal/v2/sync", json!({"batch": 3}))
        .unwrap();
    let err = client.get("https://apollo.internal/slow").unwrap_err();
    assert!(matches!(err, TransportError::Timeout(_)));

    let records = t.records("api.log");
    assert_eq!(records.len(), 2);

    let ok = &records[0];
    assert_eq!(ok["request_type"], "external");
    assert_eq!(ok["service_name"], "apollo");
    assert_eq!(ok["request_repr"]["endpoint"], "https://apollo.internal/v2/sync");
    assert_eq!(ok["response_repr"]["status_code"], 200);

    let failed = &records[1];
    assert_eq!(failed["error_message"], "Request timed out: no response after 30s");
    assert_eq!(failed["response_repr"], Value::Null);
    assert!(failed["execution_time"].as_f64().unwrap() >= 0.0);
}

#[test]
fn test_login_events_land_in_login_log() {
    let t = TestPipeline::start();

    t.pipeline.usage().record(
        "User login",
        "login",
        true,
        "",
        Some(&Editor),
        vec![("status_code".to_string(), 200i64.into())],
    );
    t.pipeline.usage().record(
        "User login",
        "login",
        false,
        "invalid credentials",
        None,
        Vec::new(),
    );

    let records = t.records("login.log");
    assert_eq!(records.len(), 2);

    let ok = &records[0];
    assert_eq!(ok["level"], "LOGIN");
    assert_eq!(ok["name"], "audit.login");
    assert_eq!(ok["message"], "User login");
    assert_eq!(ok["event"], "login");
    assert_eq!(ok["success"], true);
    assert_eq!(ok["error"], "");
    assert_eq!(ok["user_id"], "14ab");
    assert_eq!(ok["user_info"]["email"], "editor@example.com");
    assert_eq!(ok["extra"]["status_code"], 200);

    let failed = &records[1];
    assert_eq!(failed["success"], false);
    assert_eq!(failed["error"], "invalid credentials");
    assert_eq!(failed["user_id"], Value::Null);

    // Authentication events never land in the other logs.
    assert!(t.records("audit.log").is_empty());
    assert!(t.records("api.log").is_empty());
}

#[test]
fn test_filters_apply_end_to_end() {
    let t = TestPipeline::start();

    // Excluded path: no token, no record.
    assert!(t
        .pipeline
        .request()
        .begin(&RequestInfo::new("GET", "/static/logo.png"))
        .is_none());

    // Skipped model: no record.
    assert!(t
        .pipeline
        .model()
        .on_change("Session", EventKind::Delete, "1", Vec::new(), None)
        .is_none());

    assert!(t.records("api.log").is_empty());
    assert!(t.records("audit.log").is_empty());
}

#[test]
fn test_cyclic_entity_state_never_breaks_emission() {
    let t = TestPipeline::start();

    let node = RawValue::shared(RawValue::Null);
    *node.write().unwrap() = RawValue::Map(vec![
        ("label".to_string(), "root".into()),
        ("parent".to_string(), RawValue::Shared(Arc::clone(&node))),
    ]);

    t.pipeline.model().on_change(
        "Category",
        EventKind::Update,
        "8",
        vec![("tree".to_string(), RawValue::Shared(node))],
        None,
    );

    let records = t.records("audit.log");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["instance_repr"]["tree"]["label"], "root");
    assert_eq!(
        records[0]["instance_repr"]["tree"]["parent"],
        "<circular-reference>"
    );
}

#[test]
fn test_settings_round_trip_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("audit.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
service_name = "review_board"

[channels.model]
path = "{0}/audit.log"

[channels.request]
path = "{0}/api.log"

[channels.login]
path = "{0}/login.log"
"#,
            temp_dir.path().display()
        ),
    )
    .unwrap();

    let settings = Settings::load(&config_path).unwrap();
    let pipeline = AuditPipeline::from_settings(&settings).unwrap();
    assert_eq!(pipeline.service_name(), "review_board");

    pipeline
        .model()
        .on_change("Book", EventKind::Create, "1", Vec::new(), None);
    assert!(temp_dir.path().join("audit.log").exists());
}
