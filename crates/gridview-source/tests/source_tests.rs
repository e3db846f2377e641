// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use gridview_source::{HttpSource, RecordSource};
use gridview_testkit::{PostFaker, posts_json};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
}

#[test]
fn unreachable_endpoint_error_names_the_url() {
    let source = HttpSource::new("http://127.0.0.1:1/posts", Duration::from_millis(50))
        .expect("source should initialize");

    let error = source
        .fetch_records()
        .expect_err("fetch should fail for unreachable endpoint");
    let message = error.to_string();
    assert!(message.contains("127.0.0.1:1/posts"), "got {message}");
    assert!(message.contains("[source]"), "got {message}");
}

#[test]
fn fetch_records_decodes_mock_server_payload() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/posts", server.server_addr());
    let records = PostFaker::new(11).records(23);
    let payload = posts_json(&records);

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/posts");
        let response = Response::from_string(payload)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let source = HttpSource::new(&addr, Duration::from_secs(1))?;
    let fetched = source.fetch_records()?;
    assert_eq!(fetched, records);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fetch_records_surfaces_server_error_message() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/posts", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(r#"{"error":"rate limited"}"#)
            .with_status_code(429)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let source = HttpSource::new(&addr, Duration::from_secs(1))?;
    let error = source
        .fetch_records()
        .expect_err("429 should surface as an error");
    assert_eq!(error.to_string(), "server error (429): rate limited");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fetch_records_rejects_non_array_body() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/posts", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(r#"{"posts":[]}"#)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let source = HttpSource::new(&addr, Duration::from_secs(1))?;
    let error = source
        .fetch_records()
        .expect_err("object body should fail to decode");
    assert!(error.to_string().contains("expected a JSON array"));

    handle.join().expect("server thread should join");
    Ok(())
}
