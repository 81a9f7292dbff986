//! The stream handed to the logging side, and the write path behind it.

use crate::config::{ConfigError, StreamConfig};
use crate::domain::{Level, LogRecord, MiddlewareError, StreamError};
use crate::events::{ErrorChannel, ErrorContext};
use crate::layer::SplunkLayer;
use crate::middleware::{Context, Middleware, Pipeline};
use crate::sender::{Delivery, HecClient, HecEvent, Transport};
use std::sync::Arc;
use tracing::{debug, warn};

/// Marks a stream that takes structured records rather than formatted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Raw,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Raw => "raw",
        }
    }
}

/// What happened to one `write` call.
///
/// Returned after the error event (if any) has been delivered.
#[derive(Debug)]
pub enum WriteOutcome {
    /// Nothing was sent: the record was missing or a middleware aborted.
    NotSent,
    /// The collector answered. The acknowledgement may still be a rejection.
    Delivered(Delivery),
    /// The request failed before an acknowledgement was received.
    Failed(StreamError),
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WriteOutcome::Delivered(delivery) if delivery.is_success())
    }

    pub fn delivery(&self) -> Option<&Delivery> {
        match self {
            WriteOutcome::Delivered(delivery) => Some(delivery),
            _ => None,
        }
    }
}

struct StreamInner {
    config: StreamConfig,
    pipeline: Pipeline,
    errors: ErrorChannel,
    transport: Arc<dyn Transport>,
}

/// Writable stream that sends each record to the collector.
///
/// Cheap to clone; clones share configuration, middleware and subscribers.
#[derive(Clone)]
pub struct SplunkStream {
    inner: Arc<StreamInner>,
}

impl SplunkStream {
    pub fn new(config: StreamConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = HecClient::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(client)))
    }

    /// Builds a stream over any transport. Configuration is not validated.
    pub fn with_transport(config: StreamConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(StreamInner {
                config,
                pipeline: Pipeline::new(),
                errors: ErrorChannel::new(),
                transport,
            }),
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.inner.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }

    pub fn use_middleware<M: Middleware + 'static>(&self, middleware: M) {
        self.inner.pipeline.push(middleware);
    }

    pub fn use_fn<F>(&self, handler: F)
    where
        F: Fn(&mut Context) -> Result<(), MiddlewareError> + Send + Sync + 'static,
    {
        self.inner.pipeline.push_fn(handler);
    }

    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&StreamError, Option<&ErrorContext>) + Send + Sync + 'static,
    {
        self.inner.errors.subscribe(handler);
    }

    /// Runs `record` through the middleware and sends it.
    ///
    /// Never fails: every error is delivered to the `on_error` handlers and
    /// the outcome is returned for callers that want to wait on it.
    pub async fn write(&self, record: impl Into<Option<LogRecord>>) -> WriteOutcome {
        let Some(record) = record.into() else {
            self.inner.errors.emit(&StreamError::MissingRecord, None);
            return WriteOutcome::NotSent;
        };

        let mut context = Context::new(record.clone());
        if let Err(err) = self.inner.pipeline.run(&mut context).await {
            self.inner.errors.emit(&StreamError::Middleware(err), None);
            return WriteOutcome::NotSent;
        }

        let event = HecEvent::from_context(&context, &self.inner.config);
        let error_context = ErrorContext { message: record };

        match self.inner.transport.send(event).await {
            Ok(delivery) => {
                if let Some(ack) = delivery.rejection() {
                    warn!(
                        write_id = %context.id(),
                        code = ack.code,
                        "Collector rejected event: {}",
                        ack.text
                    );
                    let err = StreamError::Rejected {
                        message: ack.text.clone(),
                        code: ack.code,
                    };
                    self.inner.errors.emit(&err, Some(&error_context));
                } else {
                    debug!(write_id = %context.id(), status = delivery.status, "Event accepted");
                }
                WriteOutcome::Delivered(delivery)
            }
            Err(err) => {
                warn!(write_id = %context.id(), "Event transmission failed: {}", err);
                let err = StreamError::Transport(err);
                self.inner.errors.emit(&err, Some(&error_context));
                WriteOutcome::Failed(err)
            }
        }
    }
}

impl std::fmt::Debug for SplunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplunkStream")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("pipeline", &self.inner.pipeline)
            .field("errors", &self.inner.errors)
            .finish()
    }
}

/// What the logging side holds on to: a level, a kind and the stream.
#[derive(Debug, Clone)]
pub struct StreamAdapter {
    level: Level,
    stream: SplunkStream,
}

impl StreamAdapter {
    pub fn new(stream: SplunkStream) -> Self {
        Self {
            level: stream.config().level,
            stream,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn kind(&self) -> StreamKind {
        StreamKind::Raw
    }

    pub fn stream(&self) -> &SplunkStream {
        &self.stream
    }

    pub fn use_middleware<M: Middleware + 'static>(&self, middleware: M) {
        self.stream.use_middleware(middleware);
    }

    pub fn use_fn<F>(&self, handler: F)
    where
        F: Fn(&mut Context) -> Result<(), MiddlewareError> + Send + Sync + 'static,
    {
        self.stream.use_fn(handler);
    }

    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&StreamError, Option<&ErrorContext>) + Send + Sync + 'static,
    {
        self.stream.on_error(handler);
    }

    /// A `tracing` layer writing every event at or above `level()`.
    pub fn layer(&self) -> SplunkLayer {
        SplunkLayer::new(self.stream.clone()).with_level(self.level)
    }
}

/// Validates `config` and builds a stream sending to the collector it names.
pub fn create_stream(config: StreamConfig) -> Result<StreamAdapter, ConfigError> {
    if !config.auto_flush {
        warn!("auto_flush = false has no effect: every write is sent immediately");
    }
    let stream = SplunkStream::new(config)?;
    Ok(StreamAdapter::new(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MISSING_RECORD_MESSAGE;
    use crate::sender::{ClientError, HecAck, MockTransport};
    use parking_lot::Mutex;
    use std::time::Duration;

    type Seen = Arc<Mutex<Vec<(String, Option<i64>, Option<ErrorContext>)>>>;

    fn observed(stream: &SplunkStream) -> Seen {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        stream.on_error(move |err, ctx| {
            sink.lock().push((err.to_string(), err.code(), ctx.cloned()));
        });
        seen
    }

    fn ack(text: &str, code: i64) -> Delivery {
        Delivery {
            status: if code == 0 { 200 } else { 403 },
            ack: Some(HecAck {
                text: text.to_string(),
                code,
            }),
            latency: Duration::from_millis(1),
            bytes_sent: 64,
        }
    }

    fn stream_with(transport: MockTransport) -> SplunkStream {
        SplunkStream::with_transport(StreamConfig::new("token"), Arc::new(transport))
    }

    #[tokio::test]
    async fn test_missing_record_emits_error_and_sends_nothing() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let stream = stream_with(transport);
        let seen = observed(&stream);
        let middleware_ran = Arc::new(Mutex::new(false));
        {
            let middleware_ran = Arc::clone(&middleware_ran);
            stream.use_fn(move |_ctx| {
                *middleware_ran.lock() = true;
                Ok(())
            });
        }

        let outcome = stream.write(None).await;

        assert!(matches!(outcome, WriteOutcome::NotSent));
        assert!(!*middleware_ran.lock());
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, MISSING_RECORD_MESSAGE);
        assert!(seen[0].2.is_none());
    }

    #[tokio::test]
    async fn test_middleware_error_stops_the_send() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let stream = stream_with(transport);
        let seen = observed(&stream);
        stream.use_fn(|_ctx| Err(MiddlewareError::new("this is an error!")));
        stream.use_fn(|_ctx| panic!("runs after an abort"));

        let outcome = stream.write(LogRecord::new("something")).await;

        assert!(matches!(outcome, WriteOutcome::NotSent));
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "this is an error!");
        assert!(seen[0].2.is_none());
    }

    #[tokio::test]
    async fn test_success_sends_once_without_error_event() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|event| event.event.message.msg() == Some("something"))
            .times(1)
            .returning(|_| Ok(ack("Success", 0)));
        let stream = stream_with(transport);
        let seen = observed(&stream);

        let outcome = stream.write(LogRecord::new("something")).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.delivery().and_then(|d| d.ack.clone()).map(|a| a.code), Some(0));
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_emits_code_and_original_record() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(ack("Invalid token", 4)));
        let stream = stream_with(transport);
        let seen = observed(&stream);
        stream.use_fn(|ctx| {
            ctx.message.insert("msg", "rewritten");
            Ok(())
        });

        let outcome = stream.write(LogRecord::new("something")).await;

        let delivery = outcome.delivery().expect("raw response is still returned");
        assert_eq!(delivery.status, 403);
        assert!(!outcome.is_success());
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "Invalid token");
        assert_eq!(seen[0].1, Some(4));
        let context = seen[0].2.as_ref().expect("transmission errors carry a context");
        assert_eq!(context.message.msg(), Some("something"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_emitted_with_context() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Err(ClientError::HttpError {
                status: 502,
                message: "bad gateway".into(),
            })
        });
        let stream = stream_with(transport);
        let seen = observed(&stream);

        let outcome = stream.write(LogRecord::new("something")).await;

        assert!(matches!(outcome, WriteOutcome::Failed(StreamError::Transport(_))));
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, None);
        assert_eq!(
            seen[0].2.as_ref().and_then(|c| c.message.msg()),
            Some("something")
        );
    }

    #[tokio::test]
    async fn test_writes_do_not_share_context_state() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|event| event.event.message.get("counter") == Some(&serde_json::json!(1)))
            .times(2)
            .returning(|_| Ok(ack("Success", 0)));
        let stream = stream_with(transport);
        stream.use_fn(|ctx| {
            let next = ctx
                .message
                .get("counter")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0)
                + 1;
            ctx.message.insert("counter", next);
            Ok(())
        });

        let record = LogRecord::new("same");
        assert!(stream.write(record.clone()).await.is_success());
        assert!(stream.write(record).await.is_success());
    }

    #[tokio::test]
    async fn test_errors_without_subscribers_do_not_panic() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let stream = stream_with(transport);

        assert!(matches!(stream.write(None).await, WriteOutcome::NotSent));
    }

    #[test]
    fn test_adapter_exposes_level_kind_and_config() {
        let adapter = create_stream(StreamConfig::new("token-goes-here")).unwrap();

        assert_eq!(adapter.level(), Level::Info);
        assert_eq!(adapter.kind().as_str(), "raw");
        assert_eq!(adapter.stream().config().token, "token-goes-here");
        assert_eq!(adapter.stream().config().port, 8088);
    }

    #[test]
    fn test_create_stream_rejects_empty_token() {
        assert!(create_stream(StreamConfig::new("")).is_err());
    }
}
