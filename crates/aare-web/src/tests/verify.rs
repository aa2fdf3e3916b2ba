use axum::{
    body::Body,
    http::{Method, StatusCode},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::harness::{
    TestHarness, body_bytes, decode_json, header_value, json_request, raw_post, request,
};

#[tokio::test]
async fn missing_or_empty_llm_output_is_bad_request() {
    let harness = TestHarness::setup();
    for body in [
        json!({"ontology": "mortgage-compliance-v1"}),
        json!({"llm_output": ""}),
    ] {
        let response = harness.send(json_request(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = decode_json(response).await;
        assert_eq!(body, json!({"error": "llm_output is required"}));
    }
}

#[tokio::test]
async fn unparseable_body_is_bad_request() {
    let harness = TestHarness::setup();
    for raw in ["", "{\"llm_output\": ", "{}", "null"] {
        let response = harness.send(raw_post(raw)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body={raw:?}");
        let body: Value = decode_json(response).await;
        assert_eq!(body, json!({"error": "Invalid JSON in request body"}));
    }
}

#[tokio::test]
async fn non_string_ontology_is_bad_request() {
    let harness = TestHarness::setup();
    let response = harness
        .send(json_request(json!({"llm_output": "DTI: 30", "ontology": ["a"]})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = decode_json(response).await;
    assert_eq!(body, json!({"error": "ontology must be a string"}));
}

#[tokio::test]
async fn high_dti_fails_default_ontology() {
    let harness = TestHarness::setup();
    let response = harness
        .send(json_request(
            json!({"llm_output": "DTI: 50%, no compensating factors"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = decode_json(response).await;

    assert_eq!(body["verified"], json!(false));
    assert_eq!(body["ontology"]["name"], "mortgage-compliance-v1");
    assert_eq!(body["ontology"]["version"], "1.0.0");
    assert_eq!(body["ontology"]["constraints_checked"], 5);
    assert_eq!(body["solver"], "Constraint Logic");
    assert_eq!(body["parsed_data"]["dti"], json!(50.0));
    assert_eq!(body["violations"][0]["constraint_id"], "ATR_QM_DTI");
    assert!(body["proof"].is_object());
    assert!(body["execution_time_ms"].is_number());
}

#[tokio::test]
async fn each_response_has_fresh_id_and_current_utc_timestamp() {
    let harness = TestHarness::setup();
    let mut ids = Vec::new();
    for _ in 0..3 {
        let response = harness
            .send(json_request(json!({"llm_output": "credit score 640"})))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = decode_json(response).await;

        let id = body["verification_id"].as_str().expect("id string");
        let parsed = uuid::Uuid::parse_str(id).expect("uuid");
        assert_eq!(parsed.get_version_num(), 4);
        ids.push(id.to_string());

        let stamp = body["timestamp"].as_str().expect("timestamp string");
        let stamp = DateTime::parse_from_rfc3339(stamp).expect("rfc3339 timestamp");
        assert_eq!(stamp.offset().local_minus_utc(), 0);
        let skew = Utc::now().signed_duration_since(stamp.with_timezone(&Utc));
        assert!(skew.num_seconds().abs() < 5);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn stored_ontology_is_loaded_by_name() {
    let harness = TestHarness::setup();
    let response = harness
        .send(json_request(
            json!({"llm_output": "APR: 120", "ontology": "apr-cap-v1"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = decode_json(response).await;
    assert_eq!(body["ontology"]["name"], "apr-cap-v1");
    assert_eq!(body["ontology"]["constraints_checked"], 1);
    assert_eq!(body["verified"], json!(false));
    assert_eq!(body["violations"][0]["error_message"], "APR above 36%");
}

#[tokio::test]
async fn unknown_and_invalid_ontologies_degrade_to_default() {
    let harness = TestHarness::setup();
    for name in ["does-not-exist", "missing-extractors", "../apr-cap-v1"] {
        let response = harness
            .send(json_request(json!({"llm_output": "DTI: 20", "ontology": name})))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "ontology={name}");
        let body: Value = decode_json(response).await;
        assert_eq!(body["ontology"]["name"], "mortgage-compliance-v1");
        assert_eq!(body["ontology"]["constraints_checked"], 5);
        assert_eq!(body["verified"], json!(true));
    }
}

#[tokio::test]
async fn large_llm_output_reaches_the_pipeline() {
    let harness = TestHarness::setup();
    let text = format!("DTI: 50%, {}", "x".repeat(3 * 1024 * 1024));
    let response = harness.send(json_request(json!({"llm_output": text}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = decode_json(response).await;
    assert_eq!(body["verified"], json!(false));
    assert_eq!(body["parsed_data"]["dti"], json!(50.0));
}

#[tokio::test]
async fn oversized_body_is_json_bad_request() {
    let harness = TestHarness::with_body_limit(1024);
    let oversized = serde_json::to_vec(&json!({"llm_output": "x".repeat(4096)}))
        .expect("json request body");

    let response = harness
        .send(request(Method::POST, Some("https://aare.ai"), Body::from(oversized)))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        header_value(response.headers(), "content-type"),
        Some("application/json")
    );
    let body: Value = decode_json(response).await;
    assert_eq!(body, json!({"error": "Request body too large"}));
}

#[tokio::test]
async fn oversized_body_does_not_mask_method_handling() {
    let harness = TestHarness::with_body_limit(1024);
    let oversized = "x".repeat(4096);

    let response = harness
        .send(request(Method::OPTIONS, None, Body::from(oversized.clone())))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());

    let response = harness
        .send(request(Method::GET, None, Body::from(oversized)))
        .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = decode_json(response).await;
    assert_eq!(body, json!({"error": "Method not allowed"}));
}
