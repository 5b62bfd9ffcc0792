//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port and drives the real
//! `UreqTransport` over HTTP, so URL composition, headers, body encoding and
//! error-payload detection are checked on the wire rather than in isolation.

use std::net::SocketAddr;

use rest_client::{json, Client, ClientError, Query, Value};

/// Start the mock server on a random port and return its address.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn crud_lifecycle() {
    let addr = start_server();
    let client = Client::new(&format!("http://{addr}/")).unwrap();
    assert_eq!(client.base_url(), format!("http://{addr}"));

    // Step 1: list — should be empty.
    let notes = client.get("/notes", None, ()).unwrap();
    assert_eq!(notes, json!([]));

    // Step 2: create two notes.
    let created = client.post("/notes", json!({"title": "Integration test"})).unwrap();
    assert_eq!(created["title"], "Integration test");
    assert_eq!(created["pinned"], false);
    let id = created["id"].as_str().unwrap().to_string();
    client
        .post("/notes", json!({"title": "Second", "pinned": true}))
        .unwrap();

    // Step 3: get the first note.
    let fetched = client.get(&format!("/notes/{id}"), None, ()).unwrap();
    assert_eq!(fetched, created);

    // Step 4: partial update.
    let updated = client.put(&format!("/notes/{id}"), json!({"pinned": true})).unwrap();
    assert_eq!(updated["title"], "Integration test");
    assert_eq!(updated["pinned"], true);

    // Step 5: list with a query.
    let first = client
        .get("/notes", Some(&Query::new().param("limit", 1)), ())
        .unwrap();
    assert_eq!(first, json!([updated]));
    let all = client.get("/notes", Some(&Query::new()), ()).unwrap();
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    // Step 6: delete.
    let deleted = client.delete(&format!("/notes/{id}"), ()).unwrap();
    assert_eq!(deleted, json!({"deleted": id}));

    // Step 7: get after delete — the 404 payload becomes a remote error.
    let err = client.get(&format!("/notes/{id}"), None, ()).unwrap_err();
    let remote = err.as_remote().expect("expected a remote error");
    assert_eq!(remote.code(), &json!("NotFound"));
    assert_eq!(
        remote.message(),
        format!("HTTP Error NotFound: note {id} does not exist")
    );
}

#[test]
fn invalid_payload_is_reported_as_remote_error() {
    let addr = start_server();
    let client = Client::new(&format!("http://{addr}")).unwrap();

    let err = client.post("/notes", json!({"pinned": true})).unwrap_err();
    let remote = err.as_remote().expect("expected a remote error");
    assert_eq!(remote.code(), &json!("InvalidPayload"));
    assert!(remote.message().starts_with("HTTP Error InvalidPayload: "));
}

#[test]
fn credentials_in_server_string_authenticate() {
    let addr = start_server();

    let authed = Client::new(&format!("http://admin:secret@{addr}")).unwrap();
    assert_eq!(authed.authorization(), Some("Basic YWRtaW46c2VjcmV0"));
    assert_eq!(authed.get("/private", None, ()).unwrap(), json!({"user": "admin"}));

    let echoed = authed.get("/echo", None, ()).unwrap();
    assert_eq!(echoed["authorization"], "Basic YWRtaW46c2VjcmV0");

    // Reserved characters reach the header unescaped.
    let raw = Client::new(&format!("http://user:a=b@{addr}")).unwrap();
    let echoed = raw.get("/echo", None, ()).unwrap();
    assert_eq!(echoed["authorization"], "Basic dXNlcjphPWI=");
}

#[test]
fn missing_or_wrong_credentials_yield_remote_error() {
    let addr = start_server();

    for server in [format!("http://{addr}"), format!("http://admin:wrong@{addr}")] {
        let client = Client::new(&server).unwrap();
        let err = client.get("/private", None, ()).unwrap_err();
        let remote = err.as_remote().expect("expected a remote error");
        assert_eq!(remote.code(), &json!(401));
        assert_eq!(remote.message(), "HTTP Error 401: Unauthorized");
    }

    let anonymous = Client::new(&format!("http://{addr}")).unwrap();
    let echoed = anonymous.get("/echo", None, ()).unwrap();
    assert_eq!(echoed["authorization"], Value::Null);
}

#[test]
fn wire_format_matches_request() {
    let addr = start_server();
    let client = Client::new(&format!("http://{addr}")).unwrap();

    let echoed = client.put("/echo", json!(true)).unwrap();
    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["body"], "true");
    assert_eq!(echoed["content_type"], "application/json");
    assert_eq!(echoed["accept"], "application/json;q=1.0");

    let echoed = client.post("/echo", json!({"foo": "bar"})).unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["body"], r#"{"foo":"bar"}"#);

    let echoed = client.delete("/echo", json!(42)).unwrap();
    assert_eq!(echoed["method"], "DELETE");
    assert_eq!(echoed["body"], "42");

    let query = Query::new().param("foo", 42).param("bar", 23);
    let echoed = client.get("/echo", Some(&query), ()).unwrap();
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["query"], "foo=42&bar=23");
    assert_eq!(echoed["body"], "");

    let echoed = client.request("PATCH", "/echo", "raw text").unwrap();
    assert_eq!(echoed["method"], "PATCH");
    assert_eq!(echoed["body"], "raw text");
}

#[test]
fn large_responses_are_read_in_full() {
    let addr = start_server();
    let client = Client::new(&format!("http://{addr}")).unwrap();

    let size = 11 * 1024 * 1024;
    let blob = client
        .get("/blob", Some(&Query::new().param("size", size)), ())
        .unwrap();
    assert_eq!(blob["data"].as_str().map(str::len), Some(size));
}

#[test]
fn repeated_get_is_idempotent() {
    let addr = start_server();
    let client = Client::new(&format!("http://{addr}")).unwrap();
    client.post("/notes", json!({"title": "stable"})).unwrap();

    let first = client.get("/notes", None, ()).unwrap();
    let second = client.get("/notes", None, ()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = Client::new(&format!("http://127.0.0.1:{port}")).unwrap();

    let err = client.get("/notes", None, ()).unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "got {err:?}");
}
