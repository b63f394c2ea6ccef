use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_temp(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("tempfile");
    std::io::Write::write_all(&mut f, contents.as_bytes()).expect("write");
    f
}

fn apichain() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("apichain"));
    cmd.env_remove("APICHAIN_DATABASE_URL")
        .env_remove("DATABASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn validate_accepts_a_well_formed_workflow() {
    let f = write_temp(
        r#"
name: users
steps:
  - order: 1
    name: list
    apiRequest:
      method: GET
      endpoint: https://api.test/users
"#,
    );
    let out = apichain()
        .args(["validate", f.path().to_string_lossy().as_ref()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(String::from_utf8_lossy(&out).contains("ok: `users` is valid"));
}

#[test]
fn validate_rejects_a_workflow_without_steps() {
    let f = write_temp("name: empty\nsteps: []\n");
    apichain()
        .args(["validate", f.path().to_string_lossy().as_ref()])
        .assert()
        .code(2);
}

#[test]
fn validate_reports_violations_as_json() {
    let f = write_temp(
        r#"{"name": "dup", "steps": [
            {"order": 1, "name": "a", "apiRequest": {"method": "GET", "endpoint": "https://x.test"}},
            {"order": 1, "name": "b", "apiRequest": {"method": "GET", "endpoint": "https://x.test"}}
        ]}"#,
    );
    let out = apichain()
        .args(["validate", "--format", "json", f.path().to_string_lossy().as_ref()])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["valid"], false);
    assert!(v["errors"][0].as_str().unwrap().contains("order"));
}

#[test]
fn unparsable_file_is_a_validation_failure() {
    let f = write_temp("name: [unterminated");
    apichain()
        .args(["validate", f.path().to_string_lossy().as_ref()])
        .assert()
        .code(2);
}

#[test]
fn missing_file_is_a_runtime_error() {
    apichain()
        .args(["validate", "/definitely/not/here.yaml"])
        .assert()
        .code(4);
}

#[test]
fn run_by_id_without_database_is_a_runtime_error() {
    apichain()
        .args(["run", "--id", "5d0f7e4e-8a4e-4c8e-9d62-0b7c3f1f2a10"])
        .assert()
        .code(4);
}

#[test]
fn save_without_database_is_a_runtime_error() {
    let f = write_temp(
        r#"{"name": "w", "steps": [{"order": 1, "name": "a", "apiRequest": {"method": "GET", "endpoint": "https://x.test"}}]}"#,
    );
    apichain()
        .args(["save", f.path().to_string_lossy().as_ref()])
        .assert()
        .code(4);
}

#[test]
fn history_rejects_a_malformed_run_id() {
    apichain()
        .args(["history", "not-a-uuid", "--store", "postgres://localhost/none"])
        .assert()
        .code(4);
}

#[tokio::test(flavor = "multi_thread")]
async fn run_chains_values_between_steps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Leanne"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("userId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 10, "userId": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let f = write_temp(
        r#"
name: user posts
steps:
  - order: 1
    name: get user
    apiRequest:
      protocol: rest
      method: GET
      endpoint: /users/1
  - order: 2
    name: get posts
    apiRequest:
      method: GET
      endpoint: /posts
      queryParams:
        userId: "{{userId}}"
    variableMappings:
      - sourceStep: 0
        sourcePath: $.id
        targetVariable: userId
    assertions:
      - type: jsonPath
        path: $[0].userId
        expected: 1
"#,
    );

    let out = apichain()
        .args([
            "run",
            "--format",
            "json",
            "--base-url",
            &server.uri(),
            f.path().to_string_lossy().as_ref(),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["success"], true);
    assert_eq!(v["status"], "completed");
    assert_eq!(v["steps"].as_array().unwrap().len(), 2);
    assert_eq!(v["steps"][1]["request"]["queryParams"]["userId"], "1");
}

#[tokio::test(flavor = "multi_thread")]
async fn halted_run_exits_with_run_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let f = write_temp(&format!(
        r#"
name: broken
steps:
  - order: 1
    name: fails
    apiRequest:
      method: GET
      endpoint: {uri}/broken
  - order: 2
    name: never runs
    apiRequest:
      method: GET
      endpoint: {uri}/other
"#,
        uri = server.uri()
    ));

    let out = apichain()
        .args(["run", "--format", "json", f.path().to_string_lossy().as_ref()])
        .assert()
        .code(3)
        .get_output()
        .stdout
        .clone();
    let v: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["status"], "halted");
    assert_eq!(v["steps"].as_array().unwrap().len(), 1);
    assert_eq!(v["steps"][0]["errorKind"], "REQUEST_FAILED");
}
