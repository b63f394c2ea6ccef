use apichain_core::{
    parse_workflow_str, validate_workflow, ApiRequest, Assertion, DocumentFormat,
};

fn minimal_valid_yaml() -> &'static str {
    r#"
name: user posts
steps:
  - order: 1
    name: get user
    apiRequest:
      protocol: rest
      method: GET
      endpoint: https://jsonplaceholder.typicode.com/users/1
    assertions:
      - type: statusCode
        expected: 200
  - order: 2
    name: get posts
    apiRequest:
      method: GET
      endpoint: "https://jsonplaceholder.typicode.com/posts?userId={{id}}"
    variableMappings:
      - sourceStep: 0
        sourcePath: $.id
        targetVariable: id
    continueOnFailure: true
"#
}

#[test]
fn parse_yaml_and_validate_ok() {
    let parsed = parse_workflow_str(minimal_valid_yaml(), DocumentFormat::Yaml).unwrap();
    validate_workflow(&parsed.workflow).unwrap();

    let steps = &parsed.workflow.steps;
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].api_request.protocol(), "rest");
    assert_eq!(
        steps[0].assertions,
        vec![Assertion::StatusCode { expected: 200 }]
    );
    assert!(steps[1].continue_on_failure);
    assert!(!steps[0].continue_on_failure);
    assert_eq!(steps[1].variable_mappings[0].target_variable, "id");
}

#[test]
fn parse_auto_detects_yaml() {
    let parsed = parse_workflow_str(minimal_valid_yaml(), DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Yaml);
}

#[test]
fn parse_auto_detects_json() {
    let json = r#"{ "name": "w", "steps": [ { "order": 0, "name": "s", "apiRequest": { "protocol": "graphql", "endpoint": "https://x.test/graphql", "query": "{ me { id } }", "variables": { "n": 1 } } } ] }"#;
    let parsed = parse_workflow_str(json, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Json);
    match &parsed.workflow.steps[0].api_request {
        ApiRequest::GraphQl(g) => {
            assert_eq!(g.query, "{ me { id } }");
            assert_eq!(g.variables.as_ref().unwrap()["n"], serde_json::json!(1));
        }
        other => panic!("expected graphql request, got {other:?}"),
    }
}

#[test]
fn parse_grpc_request() {
    let yaml = r#"
name: grpc
steps:
  - order: 1
    name: say hello
    apiRequest:
      protocol: grpc
      endpoint: localhost:50051
      service: helloworld.Greeter
      method: SayHello
      message:
        name: world
"#;
    let parsed = parse_workflow_str(yaml, DocumentFormat::Yaml).unwrap();
    match &parsed.workflow.steps[0].api_request {
        ApiRequest::Grpc(g) => {
            assert_eq!(g.service, "helloworld.Greeter");
            assert_eq!(g.message["name"], serde_json::json!("world"));
        }
        other => panic!("expected grpc request, got {other:?}"),
    }
}

#[test]
fn unsupported_protocol_still_parses() {
    let yaml = r#"
name: legacy
steps:
  - order: 1
    name: soap call
    apiRequest:
      protocol: soap
      endpoint: https://legacy.test/ws
"#;
    let parsed = parse_workflow_str(yaml, DocumentFormat::Yaml).unwrap();
    validate_workflow(&parsed.workflow).unwrap();
    assert_eq!(parsed.workflow.steps[0].api_request.protocol(), "soap");
}

#[test]
fn parse_garbage_is_rejected() {
    let err = parse_workflow_str("not: [valid", DocumentFormat::Auto).unwrap_err();
    assert!(format!("{err}").contains("YAML"));
}

#[test]
fn empty_workflow_is_rejected() {
    let parsed = parse_workflow_str("name: empty\nsteps: []\n", DocumentFormat::Yaml).unwrap();
    let err = validate_workflow(&parsed.workflow).unwrap_err();
    assert!(err.violations.iter().any(|v| v.path == "$.steps"));
}

#[test]
fn duplicate_orders_are_rejected() {
    let bad = minimal_valid_yaml().replace("order: 2", "order: 1");
    let parsed = parse_workflow_str(&bad, DocumentFormat::Yaml).unwrap();
    let err = validate_workflow(&parsed.workflow).unwrap_err();
    assert!(err.violations.iter().any(|v| v.path == "$.steps[1].order"));
}

#[test]
fn invalid_target_variable_is_rejected() {
    let bad = minimal_valid_yaml().replace("targetVariable: id", "targetVariable: \"1id\"");
    let parsed = parse_workflow_str(&bad, DocumentFormat::Yaml).unwrap();
    let err = validate_workflow(&parsed.workflow).unwrap_err();
    assert!(err
        .violations
        .iter()
        .any(|v| v.path == "$.steps[1].variableMappings[0].targetVariable"));
}

#[test]
fn future_source_step_is_not_a_definition_error() {
    let bad = minimal_valid_yaml().replace("sourceStep: 0", "sourceStep: 5");
    let parsed = parse_workflow_str(&bad, DocumentFormat::Yaml).unwrap();
    validate_workflow(&parsed.workflow).unwrap();
}

#[test]
fn ordered_steps_sort_by_order() {
    let yaml = r#"
name: shuffled
steps:
  - order: 3
    name: c
    apiRequest: { method: GET, endpoint: "https://x.test/c" }
  - order: 1
    name: a
    apiRequest: { method: GET, endpoint: "https://x.test/a" }
  - order: 2
    name: b
    apiRequest: { method: GET, endpoint: "https://x.test/b" }
"#;
    let parsed = parse_workflow_str(yaml, DocumentFormat::Yaml).unwrap();
    let names: Vec<&str> = parsed
        .workflow
        .ordered_steps()
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}
