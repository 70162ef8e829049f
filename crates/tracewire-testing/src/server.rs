use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracewire_core::{
    CallContext, CallOutcome, Code, HelloRequest, HelloResponse, HelloService, MetadataBundle,
    Status,
};

/// An in-process hello server
pub struct LocalServer {
    state: Arc<ServerState>,
}

struct ServerState {
    service: Arc<dyn HelloService>,
    recorded: Mutex<Vec<RecordedCall>>,
    closed: AtomicBool,
}

/// A call as the server saw it, with the status code it ended in
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: HelloRequest,
    pub metadata: Option<MetadataBundle>,
    pub code: Code,
}

impl LocalServer {
    /// Serve `service`
    pub fn new<S: HelloService>(service: S) -> Self {
        Self {
            state: Arc::new(ServerState {
                service: Arc::new(service),
                recorded: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// A client connected to this server
    pub fn client(&self) -> LocalClient {
        LocalClient {
            state: Arc::clone(&self.state),
        }
    }

    /// Calls completed so far, in completion order
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.state.recorded().clone()
    }

    /// Number of completed calls
    pub fn calls(&self) -> usize {
        self.state.recorded().len()
    }

    /// Stop accepting calls. Every call issued afterwards, from any client,
    /// fails with `Cancelled` without reaching the handler.
    pub fn shutdown(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

impl ServerState {
    fn recorded(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle issuing calls to a [`LocalServer`]
#[derive(Clone)]
pub struct LocalClient {
    state: Arc<ServerState>,
}

impl LocalClient {
    /// Issue one call.
    ///
    /// `metadata` of `None` simulates a transport that exposes no metadata
    /// facility. The handler runs on its own task; if that task panics or is
    /// cancelled the call fails with `Internal` or `Cancelled`. Calls on a
    /// shut down server fail with `Cancelled`.
    pub async fn call(
        &self,
        request: HelloRequest,
        metadata: Option<MetadataBundle>,
    ) -> CallOutcome<HelloResponse> {
        let outcome = if self.state.closed.load(Ordering::SeqCst) {
            tracing::debug!(payload = %request.payload, "rejecting call on shut down server");
            Err(Status::cancelled("server is shut down"))
        } else {
            self.dispatch(request.clone(), metadata.clone()).await
        };

        let code = match &outcome {
            Ok(_) => Code::Ok,
            Err(status) => status.code,
        };
        self.state.recorded().push(RecordedCall {
            request,
            metadata,
            code,
        });
        outcome
    }

    async fn dispatch(
        &self,
        request: HelloRequest,
        metadata: Option<MetadataBundle>,
    ) -> CallOutcome<HelloResponse> {
        let service = Arc::clone(&self.state.service);
        tracing::debug!(payload = %request.payload, has_metadata = metadata.is_some(), "dispatching call");

        let ctx = CallContext::from(metadata);
        match tokio::spawn(async move { service.hello(&ctx, request) }).await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => Err(Status::cancelled(err.to_string())),
            Err(err) => Err(Status::internal(err.to_string())),
        }
    }

    /// Call with an empty but present metadata bundle
    pub async fn hello(&self, payload: impl Into<String>) -> CallOutcome<HelloResponse> {
        self.call(HelloRequest::new(payload), Some(MetadataBundle::new()))
            .await
    }

    /// Call with the given metadata
    pub async fn hello_with_metadata(
        &self,
        payload: impl Into<String>,
        metadata: MetadataBundle,
    ) -> CallOutcome<HelloResponse> {
        self.call(HelloRequest::new(payload), Some(metadata)).await
    }

    /// Call over a transport that exposes no metadata
    pub async fn hello_without_metadata(
        &self,
        payload: impl Into<String>,
    ) -> CallOutcome<HelloResponse> {
        self.call(HelloRequest::new(payload), None).await
    }
}
