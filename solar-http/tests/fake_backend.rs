//! Exercises the adapters against a minimal in-process HTTP server.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use solar_core::{
    AdminIdentity, AdminSession, AuthService, ContactService, LoginCredentials,
    NewContactSubmission, ServiceError, SessionCredential,
};
use solar_http::{Backend, DEFAULT_TIMEOUT, HttpAuthService, HttpContactService};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What the fake server saw for one request.
#[derive(Debug, Clone, Default)]
struct Seen {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Seen {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serves exactly one request with `response`, recording what arrived.
async fn serve_once(response: String) -> (String, Arc<Mutex<Seen>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Seen::default()));

    let record = seen.clone();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            assert!(n > 0, "client closed before sending headers");
        };

        let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        while raw.len() < header_end + content_length {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }

        *record.lock().unwrap() = Seen {
            request_line,
            headers,
            body: String::from_utf8_lossy(&raw[header_end..]).to_string(),
        };
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    (base, seen)
}

fn http_response(status: &str, extra_headers: &[&str], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {status}\r\n");
    for header in extra_headers {
        response.push_str(header);
        response.push_str("\r\n");
    }
    response.push_str("Content-Type: application/json\r\n");
    response.push_str(&format!("Content-Length: {}\r\n", body.len()));
    response.push_str("Connection: close\r\n\r\n");
    response.push_str(body);
    response
}

fn session(cookie: &str) -> AdminSession {
    AdminSession::new(
        AdminIdentity {
            id: None,
            email: "admin@sunrise.test".to_string(),
            name: None,
        },
        Some(SessionCredential::new(cookie)),
    )
}

#[tokio::test]
async fn login_posts_credentials_and_captures_cookie() {
    let (base, seen) = serve_once(http_response(
        "200 OK",
        &["Set-Cookie: token=abc123; Path=/; HttpOnly"],
        r#"{"user":{"_id":"66a1","email":"admin@sunrise.test"}}"#,
    ))
    .await;
    let auth = HttpAuthService::new(Backend::new(&base, DEFAULT_TIMEOUT).unwrap());

    let session = auth
        .login(&LoginCredentials::new("admin@sunrise.test", "pw"))
        .await
        .expect("login should succeed");

    assert_eq!(session.identity.email, "admin@sunrise.test");
    assert_eq!(
        session.credential.as_ref().map(SessionCredential::expose),
        Some("token=abc123")
    );
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.request_line, "POST /admin/auth/login HTTP/1.1");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&seen.body).unwrap(),
        serde_json::json!({"email": "admin@sunrise.test", "password": "pw"})
    );
}

#[tokio::test]
async fn rejected_login_maps_to_unauthorized() {
    let (base, _) = serve_once(http_response(
        "401 Unauthorized",
        &[],
        r#"{"message":"Invalid credentials"}"#,
    ))
    .await;
    let auth = HttpAuthService::new(Backend::new(&base, DEFAULT_TIMEOUT).unwrap());

    let result = auth
        .login(&LoginCredentials::new("admin@sunrise.test", "nope"))
        .await;

    assert_eq!(result, Err(ServiceError::Unauthorized));
}

#[tokio::test]
async fn listing_sends_session_cookie() {
    let (base, seen) = serve_once(http_response(
        "200 OK",
        &[],
        r#"{"data":[{"name":"Asha","email":"asha@example.in","phone":"98","message":"Hi","createdAt":"2025-03-04T10:15:00Z"}]}"#,
    ))
    .await;
    let contacts = HttpContactService::new(Backend::new(&base, DEFAULT_TIMEOUT).unwrap());

    let submissions = contacts
        .list_submissions(&session("token=abc123"))
        .await
        .expect("listing should succeed");

    assert_eq!(submissions.len(), 1);
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.request_line, "GET /contact/get-contacts HTTP/1.1");
    assert_eq!(seen.header("cookie"), Some("token=abc123"));
}

#[tokio::test]
async fn expired_session_on_listing_is_unauthorized() {
    let (base, _) = serve_once(http_response("403 Forbidden", &[], "")).await;
    let contacts = HttpContactService::new(Backend::new(&base, DEFAULT_TIMEOUT).unwrap());

    let result = contacts.list_submissions(&session("token=stale")).await;

    assert_eq!(result, Err(ServiceError::Unauthorized));
}

#[tokio::test]
async fn submit_posts_form_fields() {
    let (base, seen) = serve_once(http_response("201 Created", &[], r#"{"success":true}"#)).await;
    let contacts = HttpContactService::new(Backend::new(&base, DEFAULT_TIMEOUT).unwrap());

    contacts
        .submit(&NewContactSubmission {
            name: "Asha".to_string(),
            email: "asha@example.in".to_string(),
            phone: "9800000000".to_string(),
            subject: None,
            message: "Quote please".to_string(),
        })
        .await
        .expect("submit should succeed");

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.request_line, "POST /contact/submit HTTP/1.1");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&seen.body).unwrap(),
        serde_json::json!({
            "name": "Asha",
            "email": "asha@example.in",
            "phone": "9800000000",
            "message": "Quote please"
        })
    );
}

#[tokio::test]
async fn server_error_is_rejected_with_status() {
    let (base, _) = serve_once(http_response(
        "500 Internal Server Error",
        &[],
        r#"{"message":"db down"}"#,
    ))
    .await;
    let contacts = HttpContactService::new(Backend::new(&base, DEFAULT_TIMEOUT).unwrap());

    let result = contacts.list_submissions(&session("token=abc123")).await;

    assert_eq!(
        result,
        Err(ServiceError::Rejected {
            status: 500,
            message: "db down".to_string()
        })
    );
}
