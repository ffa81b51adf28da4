use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xpath_core::{JobRequest, ValidationError};
use xpath_engine::{ClientSettings, JobLauncher, ReqwestLauncher, SubmitError};

fn launcher_for(server: &MockServer) -> ReqwestLauncher {
    let settings = ClientSettings {
        server_url: server.uri(),
        ..ClientSettings::default()
    };
    ReqwestLauncher::new(&settings).expect("launcher")
}

#[tokio::test]
async fn submit_posts_form_and_returns_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/searchxpath"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"shortname": "R1", "xpath": "/a/b", "merge": false})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "OK", "msg": "Streaming well started."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let launcher = launcher_for(&server);
    let handle = launcher
        .submit(4, &JobRequest::new(" R1 ", "/a/b ", false))
        .await
        .expect("accepted");

    assert_eq!(handle.job_id, 4);
    assert_eq!(handle.request, JobRequest::new("R1", "/a/b", false));
    assert_eq!(handle.message, "Streaming well started.");
}

#[tokio::test]
async fn non_ok_status_is_server_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/searchxpath"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ERROR", "msg": "router not found"})),
        )
        .mount(&server)
        .await;

    let err = launcher_for(&server)
        .submit(1, &JobRequest::new("R9", "/a", true))
        .await
        .unwrap_err();
    assert_eq!(err, SubmitError::ServerRejected("router not found".to_string()));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn rejection_without_message_names_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/searchxpath"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "NOK"})))
        .mount(&server)
        .await;

    let err = launcher_for(&server)
        .submit(1, &JobRequest::new("R1", "/a", false))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SubmitError::ServerRejected("search rejected by server (NOK)".to_string())
    );
}

#[tokio::test]
async fn invalid_request_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let launcher = launcher_for(&server);
    let err = launcher
        .submit(1, &JobRequest::new("", "/a", false))
        .await
        .unwrap_err();
    assert_eq!(err, SubmitError::Validation(ValidationError::EmptyRouter));

    let err = launcher
        .submit(2, &JobRequest::new("R1", "  ", false))
        .await
        .unwrap_err();
    assert_eq!(err, SubmitError::Validation(ValidationError::EmptyPath));
}

#[tokio::test]
async fn http_error_and_garbage_reply_are_transport_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/searchxpath"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = launcher_for(&server)
        .submit(1, &JobRequest::new("R1", "/a", false))
        .await
        .unwrap_err();
    assert_eq!(err, SubmitError::HttpStatus(500));
    assert!(err.is_transport());

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/searchxpath"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = launcher_for(&server)
        .submit(1, &JobRequest::new("R1", "/a", false))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::MalformedReply(_)));
}

#[tokio::test]
async fn slow_submit_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/searchxpath"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(json!({"status": "OK"})),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        server_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    };
    let err = ReqwestLauncher::new(&settings)
        .expect("launcher")
        .submit(1, &JobRequest::new("R1", "/a", false))
        .await
        .unwrap_err();
    assert_eq!(err, SubmitError::Timeout);
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let settings = ClientSettings {
        // Port 9 (discard) on loopback is expected to refuse connections.
        server_url: "http://127.0.0.1:9".to_string(),
        connect_timeout: Duration::from_millis(500),
        request_timeout: Duration::from_secs(2),
        ..ClientSettings::default()
    };
    let err = ReqwestLauncher::new(&settings)
        .expect("launcher")
        .submit(1, &JobRequest::new("R1", "/a", false))
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn server_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/searchxpath"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings {
        server_url: format!("{}/portal", server.uri()),
        ..ClientSettings::default()
    };
    let handle = ReqwestLauncher::new(&settings)
        .expect("launcher")
        .submit(1, &JobRequest::new("R1", "/a", false))
        .await
        .expect("accepted");
    assert_eq!(handle.message, "");
}

#[test]
fn invalid_server_url_is_rejected() {
    let settings = ClientSettings {
        server_url: "not a url".to_string(),
        ..ClientSettings::default()
    };
    assert!(ReqwestLauncher::new(&settings).is_err());
}
