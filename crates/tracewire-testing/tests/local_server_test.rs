use futures_util::future::join_all;
use proptest::strategy::Strategy;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracewire_core::{
    CallContext, CallOutcome, Code, EchoService, HelloRequest, HelloResponse, HelloService,
    SequentialIdGenerator, SharedIdGenerator, Traced,
};
use tracewire_testing::{metadata, LocalServer, MetadataBundle};

#[tokio::test]
async fn test_fail_payload_is_aborted() {
    let server = LocalServer::new(EchoService);

    let status = server.client().hello("fail").await.unwrap_err();

    assert_eq!(status.code, Code::Aborted);
    assert_eq!(status.message, "fail");
    assert_eq!(server.recorded()[0].code, Code::Aborted);
}

#[tokio::test]
async fn test_first_metadata_value_is_echoed() {
    let server = LocalServer::new(EchoService);

    let resp = server
        .client()
        .hello_with_metadata("hi", metadata! { "x-req-id" => "abc", "x-req-id" => "def" })
        .await
        .unwrap();

    assert_eq!(resp.payload, "World");
    assert_eq!(resp.metadata.len(), 1);
    assert_eq!(resp.metadata["x-req-id"], "abc");
}

#[tokio::test]
async fn test_missing_metadata_facility() {
    let server = LocalServer::new(EchoService);

    let status = server.client().hello_without_metadata("hi").await.unwrap_err();

    assert_eq!(status.message, "could not parse incoming metadata");
    assert_eq!(status.code, Code::Unknown);
}

#[tokio::test]
async fn test_recorded_calls() {
    let server = LocalServer::new(EchoService);
    let client = server.client();

    client.hello("hi").await.unwrap();
    client.hello_without_metadata("hi").await.unwrap_err();

    let recorded = server.recorded();
    assert_eq!(server.calls(), 2);
    assert_eq!(recorded[0].code, Code::Ok);
    assert_eq!(recorded[0].request, HelloRequest::new("hi"));
    assert!(recorded[0].metadata.is_some());
    assert_eq!(recorded[1].code, Code::Unknown);
    assert!(recorded[1].metadata.is_none());
}

struct Panicking;

impl HelloService for Panicking {
    fn hello(&self, _ctx: &CallContext, _request: HelloRequest) -> CallOutcome<HelloResponse> {
        panic!("handler bug")
    }
}

#[tokio::test]
async fn test_panicking_handler_surfaces_as_internal() {
    let server = LocalServer::new(Panicking);

    let status = server.client().hello("hi").await.unwrap_err();

    assert_eq!(status.code, Code::Internal);
    assert_eq!(server.recorded()[0].code, Code::Internal);
}

#[tokio::test]
async fn test_calls_after_shutdown_are_cancelled() {
    let recorder = Recorder::default();
    let server = LocalServer::new(recorder.clone());
    let client = server.client();

    client.hello("before").await.unwrap();
    server.shutdown();
    let status = client.hello("after").await.unwrap_err();

    assert!(server.is_shut_down());
    assert_eq!(status.code, Code::Cancelled);
    assert_eq!(recorder.payloads(), vec!["before".to_string()]);

    let recorded = server.recorded();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].code, Code::Ok);
    assert_eq!(recorded[1].code, Code::Cancelled);
    assert_eq!(recorded[1].request.payload, "after");
}

/// Remembers the payload of every call that reached it
#[derive(Clone, Default)]
struct Recorder {
    payloads: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }
}

impl HelloService for Recorder {
    fn hello(&self, _ctx: &CallContext, request: HelloRequest) -> CallOutcome<HelloResponse> {
        self.payloads.lock().unwrap().push(request.payload);
        Ok(HelloResponse::default())
    }
}

/// Echoes the span the traced wrapper assigned, so concurrent calls can be
/// compared.
struct SpanEcho;

impl HelloService for SpanEcho {
    fn hello(&self, ctx: &CallContext, _request: HelloRequest) -> CallOutcome<HelloResponse> {
        let span = ctx.span().expect("traced wrapper assigns a span");
        let mut resp = HelloResponse::default();
        resp.metadata.insert("trace-id".into(), span.trace_id.to_string());
        resp.metadata.insert("span-id".into(), span.span_id.to_string());
        Ok(resp)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_get_distinct_ids() {
    let ids = SharedIdGenerator::new(SequentialIdGenerator::new());
    let server = LocalServer::new(Traced::new(SpanEcho, ids.clone()));
    let client = server.client();

    let calls = (0..64).map(|_| {
        let client = client.clone();
        async move { client.hello("hi").await }
    });
    let responses: Vec<_> = join_all(calls)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let traces: HashSet<_> = responses.iter().map(|r| r.metadata["trace-id"].clone()).collect();
    let spans: HashSet<_> = responses.iter().map(|r| r.metadata["span-id"].clone()).collect();
    assert_eq!(traces.len(), 64);
    assert_eq!(spans.len(), 64);
    assert_eq!(server.calls(), 64);

    // Counters advanced exactly once per call.
    assert_eq!(ids.next_trace_id().low, 65);
}

#[tokio::test]
async fn test_b3_context_is_continued_and_echoed() {
    let ids = SharedIdGenerator::new(SequentialIdGenerator::new());
    let server = LocalServer::new(Traced::new(EchoService, ids));

    let resp = server
        .client()
        .hello_with_metadata(
            "hi",
            metadata! {
                "X-B3-TraceId" => "00000000000000aa",
                "X-B3-SpanId" => "00000000000000bb",
            },
        )
        .await
        .unwrap();

    assert_eq!(resp.metadata["x-b3-traceid"], "00000000000000aa");
    assert_eq!(resp.metadata["x-b3-spanid"], "00000000000000bb");
}

proptest::proptest! {
    #[test]
    fn prop_any_other_payload_echoes_first_values(
        payload in "[a-z]{0,8}".prop_filter("not the abort sentinel", |p| p != "fail"),
        values in proptest::collection::vec("[a-z0-9]{1,6}", 1..4),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let server = LocalServer::new(EchoService);
        let md: MetadataBundle = values.iter().map(|v| ("x-req-id", v.as_str())).collect();

        let resp = runtime
            .block_on(server.client().hello_with_metadata(payload, md))
            .unwrap();

        proptest::prop_assert_eq!(resp.payload, "World");
        proptest::prop_assert_eq!(&resp.metadata["x-req-id"], &values[0]);
    }
}
