//! Caller-facing verb surface.

use std::sync::Arc;

use crate::config::schema::DispatchOptions;
use crate::dispatch::error::CallError;
use crate::dispatch::options::{CallOptions, Verb};
use crate::dispatch::target::resolve;
use crate::http::request::RequestContext;
use crate::http::response::Reply;
use crate::observability::logging::{LogSink, TracingSink};
use crate::resilience::Executor;
use crate::transport::{LocalTransport, RemoteTransport, Transport};

struct Inner {
    options: DispatchOptions,
    executor: Executor,
}

/// Dispatches calls to the host's routes or to remote hosts.
///
/// Cheap to clone; clones share transports and options.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Dispatcher over `local` with the default remote client and tracing sink.
    pub fn new(options: DispatchOptions, local: LocalTransport) -> Self {
        Self::builder(options).local(Arc::new(local)).build()
    }

    pub fn builder(options: DispatchOptions) -> DispatcherBuilder {
        DispatcherBuilder {
            options,
            local: None,
            remote: None,
            sink: None,
        }
    }

    /// Plugin-wide options this dispatcher was built with.
    pub fn options(&self) -> &DispatchOptions {
        &self.inner.options
    }

    /// Perform a call, optionally on behalf of an inbound request.
    pub async fn call(
        &self,
        context: Option<&RequestContext>,
        verb: Verb,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        let options = options.into().unwrap_or_default();
        let request = resolve(verb, target, &options, &self.inner.options, context)?;
        self.inner.executor.execute(request, context).await
    }

    pub async fn get(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(None, Verb::Get, target, options).await
    }

    pub async fn post(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(None, Verb::Post, target, options).await
    }

    pub async fn put(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(None, Verb::Put, target, options).await
    }

    pub async fn patch(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(None, Verb::Patch, target, options).await
    }

    pub async fn delete(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(None, Verb::Delete, target, options).await
    }

    /// Verb helpers bound to an inbound request's context.
    pub fn scoped<'a>(&'a self, context: &'a RequestContext) -> ScopedDispatcher<'a> {
        ScopedDispatcher {
            dispatcher: self,
            context,
        }
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    options: DispatchOptions,
    local: Option<Arc<dyn Transport>>,
    remote: Option<Arc<dyn Transport>>,
    sink: Option<Arc<dyn LogSink>>,
}

impl DispatcherBuilder {
    pub fn local(mut self, transport: Arc<dyn Transport>) -> Self {
        self.local = Some(transport);
        self
    }

    pub fn remote(mut self, transport: Arc<dyn Transport>) -> Self {
        self.remote = Some(transport);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Dispatcher {
        let local = self
            .local
            .unwrap_or_else(|| Arc::new(LocalTransport::deferred()));
        let remote = self
            .remote
            .unwrap_or_else(|| Arc::new(RemoteTransport::new()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));

        let executor = Executor::new(local, remote, sink, self.options.name.clone());
        Dispatcher {
            inner: Arc::new(Inner {
                options: self.options,
                executor,
            }),
        }
    }
}

/// A [`Dispatcher`] bound to one inbound request.
///
/// Calls carry the `referrer` and `x-request-id` headers of the inbound
/// request and write into its timing bag.
#[derive(Clone, Copy)]
pub struct ScopedDispatcher<'a> {
    dispatcher: &'a Dispatcher,
    context: &'a RequestContext,
}

impl ScopedDispatcher<'_> {
    pub fn context(&self) -> &RequestContext {
        self.context
    }

    pub async fn call(
        &self,
        verb: Verb,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.dispatcher
            .call(Some(self.context), verb, target, options)
            .await
    }

    pub async fn get(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(Verb::Get, target, options).await
    }

    pub async fn post(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(Verb::Post, target, options).await
    }

    pub async fn put(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(Verb::Put, target, options).await
    }

    pub async fn patch(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(Verb::Patch, target, options).await
    }

    pub async fn delete(
        &self,
        target: &str,
        options: impl Into<Option<CallOptions>>,
    ) -> Result<Reply, CallError> {
        self.call(Verb::Delete, target, options).await
    }
}
