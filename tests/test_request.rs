use courier::http::request::RequestBuilder;

#[test]
fn test_request_header_retrieval() {
    let req = RequestBuilder::new()
        .method("GET")
        .path("/")
        .header("Host", "example.com")
        .header("Content-Type", "application/json")
        .build()
        .unwrap();

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_lookup_is_case_sensitive() {
    let req = RequestBuilder::new()
        .method("GET")
        .path("/")
        .header("X-Token", "abc")
        .build()
        .unwrap();

    assert_eq!(req.header("x-token"), None);
}

#[test]
fn test_request_method_normalized() {
    let req = RequestBuilder::new().method("post").path("/api").build().unwrap();

    assert_eq!(req.method(), "POST");
}

#[test]
fn test_request_default_version() {
    let req = RequestBuilder::new().method("GET").path("/").build().unwrap();

    assert_eq!(req.version(), "HTTP/1.1");
}

#[test]
fn test_request_with_body() {
    let body_content = b"test body content".to_vec();
    let req = RequestBuilder::new()
        .method("POST")
        .path("/api")
        .body(body_content.clone())
        .build()
        .unwrap();

    assert_eq!(req.body(), body_content.as_slice());
    assert_eq!(req.content_length(), body_content.len());
}

#[test]
fn test_request_content_length_missing_body() {
    let req = RequestBuilder::new().method("GET").path("/").build().unwrap();

    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method("GET").build().is_err());
}

#[test]
fn test_request_builder_rejects_relative_path() {
    let result = RequestBuilder::new().method("GET").path("index.html").build();

    assert!(result.is_err());
}
