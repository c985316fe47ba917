//! Tests for the handler registry

use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use courier::http::request::{Request, RequestBuilder};
use courier::http::response::Response;
use courier::http::writer::ResponseWriter;
use courier::routing::{Handler, HandlerTable};

/// Answers with its own name so lookups can be told apart.
struct Named(String);

#[async_trait]
impl Handler for Named {
    async fn handle(&self, _request: &Request, out: &mut ResponseWriter<'_>) -> anyhow::Result<()> {
        out.send(&Response::ok("text/plain", self.0.clone().into_bytes()))
            .await?;
        Ok(())
    }
}

fn named(name: &str) -> Arc<dyn Handler> {
    Arc::new(Named(name.to_string()))
}

async fn body_of(handler: Arc<dyn Handler>) -> String {
    let request = RequestBuilder::new().method("GET").path("/").build().unwrap();
    let mut sink: Vec<u8> = Vec::new();

    let mut writer = ResponseWriter::new(&mut sink);
    handler.handle(&request, &mut writer).await.unwrap();
    writer.finish().await.unwrap();

    let text = String::from_utf8(sink).unwrap();
    let (_, body) = text.split_once("\r\n\r\n").unwrap();
    body.to_string()
}

#[tokio::test]
async fn test_lookup_after_register() {
    let table = HandlerTable::new();
    table.register("GET", "/hello", named("hello"));

    let handler = table.lookup("GET", "/hello").expect("registered");

    assert_eq!(body_of(handler).await, "hello");
}

#[tokio::test]
async fn test_method_is_case_insensitive() {
    let table = HandlerTable::new();
    table.register("get", "/hello", named("hello"));

    assert!(table.lookup("GET", "/hello").is_some());
    assert!(table.lookup("Get", "/hello").is_some());
    assert!(table.lookup("POST", "/hello").is_none());
}

#[test]
fn test_path_is_case_sensitive_and_exact() {
    let table = HandlerTable::new();
    table.register("GET", "/Hello", named("hello"));

    assert!(table.lookup("GET", "/Hello").is_some());
    assert!(table.lookup("GET", "/hello").is_none());
    assert!(table.lookup("GET", "/Hello/").is_none());
    assert!(table.lookup("GET", "/Hello?x=1").is_none());
}

#[tokio::test]
async fn test_reregister_replaces_handler() {
    let table = HandlerTable::new();
    table.register("GET", "/page", named("old"));
    table.register("get", "/page", named("new"));

    assert_eq!(table.len(), 1);
    assert_eq!(body_of(table.lookup("GET", "/page").unwrap()).await, "new");
}

#[test]
fn test_len_counts_method_path_pairs() {
    let table = HandlerTable::new();
    assert!(table.is_empty());

    table.register("GET", "/a", named("a"));
    table.register("POST", "/a", named("a"));
    table.register("GET", "/b", named("b"));

    assert_eq!(table.len(), 3);
}

#[test]
fn test_clones_share_routes() {
    let table = HandlerTable::new();
    let view = table.clone();

    table.register("GET", "/late", named("late"));

    assert!(view.lookup("GET", "/late").is_some());
}

#[tokio::test]
async fn test_concurrent_register_and_lookup() {
    let table = HandlerTable::new();
    table.register("GET", "/shared", named("v0"));

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let table = table.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    table.register("GET", &format!("/w{}/{}", w, i), named("x"));
                    table.register("GET", "/shared", named(&format!("v{}", w + 1)));
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let table = table.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    assert!(table.lookup("GET", "/shared").is_some());
                }
            })
        })
        .collect();

    for t in writers.into_iter().chain(readers) {
        t.join().unwrap();
    }

    assert_eq!(table.len(), 1 + 4 * 250);

    let last = body_of(table.lookup("GET", "/shared").unwrap()).await;
    assert!(["v1", "v2", "v3", "v4"].contains(&last.as_str()));
}
