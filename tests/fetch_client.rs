use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde_json::json;

use voltrix_admin::api::{ApiClient, Backend, Method};
use voltrix_admin::session::SessionStore;

/// Serves exactly one canned response and hands back the raw request.
fn one_shot(status: &str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request
    });
    (format!("http://{addr}/"), handle)
}

fn read_request(stream: &mut impl Read) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn signed_in() -> Arc<SessionStore> {
    let session = Arc::new(SessionStore::in_memory());
    session.save("tok-123", "caster").unwrap();
    session
}

#[test]
fn get_sends_bearer_and_no_cache_headers() {
    let (base, server) = one_shot("200 OK", r#"[{"id":1,"tag":"VTX","name":"Voltrix"}]"#);
    let api = ApiClient::new(&base, signed_in()).unwrap();

    let value = api.get("/teams").unwrap();
    assert_eq!(value, json!([{"id": 1, "tag": "VTX", "name": "Voltrix"}]));

    let request = server.join().unwrap().to_ascii_lowercase();
    assert!(request.starts_with("get /teams http/1.1"), "{request}");
    assert!(request.contains("authorization: bearer tok-123"), "{request}");
    assert!(request.contains("cache-control: no-store"), "{request}");
    assert!(request.contains("pragma: no-cache"), "{request}");
}

#[test]
fn missing_token_omits_authorization() {
    let (base, server) = one_shot("200 OK", "");
    let api = ApiClient::new(&base, Arc::new(SessionStore::in_memory())).unwrap();

    assert_eq!(api.get("/players").unwrap(), serde_json::Value::Null);
    let request = server.join().unwrap().to_ascii_lowercase();
    assert!(!request.contains("authorization:"), "{request}");
}

#[test]
fn server_error_becomes_request_failed() {
    let (base, server) = one_shot("500 Internal Server Error", r#"{"message":"db down"}"#);
    let api = ApiClient::new(&base, signed_in()).unwrap();

    let err = api.get("/tournaments").unwrap_err();
    assert_eq!(err.method, Method::Get);
    assert_eq!(err.path, "/tournaments");
    assert_eq!(err.status, Some(500));
    assert!(err.detail.contains("db down"));
    assert_eq!(err.to_string(), "GET /tournaments failed");
    server.join().unwrap();
}

#[test]
fn post_sends_json_body() {
    let (base, server) = one_shot("200 OK", r#"{"id":9,"name":"Finals","order":2,"tournamentId":42}"#);
    let api = ApiClient::new(&base, signed_in()).unwrap();

    let created = api
        .post("/stages/create", &json!({"tournamentId": 42, "name": "Finals"}))
        .unwrap();
    assert_eq!(created["id"], 9);

    let request = server.join().unwrap();
    let lower = request.to_ascii_lowercase();
    assert!(lower.starts_with("post /stages/create http/1.1"), "{request}");
    assert!(lower.contains("content-type: application/json"), "{request}");
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(body, json!({"tournamentId": 42, "name": "Finals"}));
}

#[test]
fn invalid_json_is_a_failure() {
    let (base, server) = one_shot("200 OK", "<html>oops</html>");
    let api = ApiClient::new(&base, signed_in()).unwrap();
    let err = api.get("/teams").unwrap_err();
    assert_eq!(err.status, Some(200));
    server.join().unwrap();
}

#[test]
fn refused_connection_is_request_failed_without_status() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = ApiClient::new(&format!("http://{addr}"), signed_in()).unwrap();

    let err = api.get("/teams").unwrap_err();
    assert_eq!(err.method, Method::Get);
    assert_eq!(err.path, "/teams");
    assert_eq!(err.status, None);
    assert_eq!(err.to_string(), "GET /teams failed");

    let err = api.post("/teams/create", &json!({"tag": "AUR"})).unwrap_err();
    assert_eq!(err.method, Method::Post);
    assert_eq!(err.status, None);
}
