use std::time::Duration;

use cleanmails_engine::{
    ApiSettings, FailureKind, JobSnapshot, NetworkCheck, ReqwestVerifierApi, VerifierApi,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer, token: Option<&str>) -> ReqwestVerifierApi {
    ReqwestVerifierApi::new(ApiSettings {
        base_url: server.uri(),
        token: token.map(str::to_string),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(2),
    })
    .unwrap()
}

#[tokio::test]
async fn create_job_posts_emails_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/bulk"))
        .and(header("authorization", "Bearer s3cret"))
        .and(body_json(json!({
            "emails": ["a@example.com", "b@example.com"],
            "level": 1
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"id": "job-42"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server, Some("s3cret"));
    let emails = vec!["a@example.com".to_string(), "b@example.com".to_string()];
    let job_id = api.create_job(&emails, 1).await.unwrap();

    assert_eq!(job_id, "job-42");
}

#[tokio::test]
async fn backend_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/bulk"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"error": "monthly quota exceeded"})),
        )
        .mount(&server)
        .await;

    let api = api_for(&server, None);
    let err = api
        .create_job(&["a@example.com".to_string()], 1)
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(429));
    assert_eq!(err.backend_message.as_deref(), Some("monthly quota exceeded"));
}

#[tokio::test]
async fn error_without_json_body_has_no_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/bulk/job-1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = api_for(&server, None).job_status("job-1").await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(502));
    assert_eq!(err.backend_message, None);
}

#[tokio::test]
async fn job_status_unwraps_job_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/bulk/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job": {"id": "job-1", "status": "processing", "done": 3, "total": 10}
        })))
        .mount(&server)
        .await;

    let snapshot = api_for(&server, None).job_status("job-1").await.unwrap();

    assert_eq!(
        snapshot,
        JobSnapshot {
            status: "processing".to_string(),
            done: 3,
            total: 10,
        }
    );
    assert!(!snapshot.is_terminal());
}

#[test]
fn terminal_status_ignores_case_and_padding() {
    let snapshot = |status: &str| JobSnapshot {
        status: status.to_string(),
        done: 0,
        total: 0,
    };
    assert!(snapshot(" Completed ").is_terminal());
    assert!(snapshot("FAILED").is_terminal());
    assert!(!snapshot("pending").is_terminal());
    assert!(!snapshot("queued").is_terminal());
}

#[tokio::test]
async fn job_results_pass_limit_and_tolerate_null_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/bulk/job-1/results"))
        .and(query_param("limit", "100000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "email": "a@example.com",
                    "result": {
                        "email": "a@example.com",
                        "reachable": "yes",
                        "syntax": {"username": "a", "domain": "example.com", "valid": true},
                        "smtp": {"host_exists": true, "catch_all": false, "deliverable": true},
                        "gravatar": null,
                        "suggestion": "",
                        "disposable": false,
                        "role_account": false,
                        "free": false,
                        "has_mx_records": true
                    }
                },
                {"email": "b@example.com", "result": null}
            ]
        })))
        .mount(&server)
        .await;

    let results = api_for(&server, None)
        .job_results("job-1", 100_000)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    let first = results[0].result.as_ref().unwrap();
    assert_eq!(first.reachable, "yes");
    assert!(first.syntax.valid);
    assert!(first.has_mx_records);
    assert_eq!(first.smtp.map(|smtp| smtp.catch_all), Some(false));
    assert_eq!(results[1].email, "b@example.com");
    assert_eq!(results[1].result, None);
}

#[tokio::test]
async fn missing_results_array_reads_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/bulk/job-1/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let results = api_for(&server, None).job_results("job-1", 10).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/network-check"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = api_for(&server, None).network_check().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn network_check_and_single_verify() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/network-check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"port25": false})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/verify"))
        .and(body_json(json!({"email": "a@example.com", "level": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "a@example.com",
            "reachable": "unknown",
            "syntax": {"valid": true},
            "smtp": null,
            "disposable": false,
            "has_mx_records": true
        })))
        .mount(&server)
        .await;

    let api = api_for(&server, None);
    assert_eq!(
        api.network_check().await.unwrap(),
        NetworkCheck { port25: false }
    );
    let verdict = api.verify("a@example.com", 2).await.unwrap();
    assert_eq!(verdict.reachable, "unknown");
    assert_eq!(verdict.smtp, None);
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/verifier/v1/network-check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"port25": true})))
        .mount(&server)
        .await;

    let api = ReqwestVerifierApi::new(ApiSettings {
        base_url: format!("{}/verifier/", server.uri()),
        ..ApiSettings::default()
    })
    .unwrap();

    assert!(api.network_check().await.unwrap().port25);
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestVerifierApi::new(ApiSettings {
        base_url: "not a url".to_string(),
        ..ApiSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
