//! Middleware pipeline run on every write before the event is sent.
//!
//! ```text
//! write(record) ──► Context ──► stage 1 ──► stage 2 ──► ... ──► send
//!                                  │           │
//!                                  └── Err ────┴──► error event, nothing sent
//! ```
//!
//! Stages run one at a time in registration order. A stage continues the
//! chain by returning `Ok(())` and aborts it by returning an error; the
//! stages after an abort never run.
//!
//! # Example
//!
//! ```ignore
//! stream.use_fn(|ctx| {
//!     ctx.message.insert("env", "prod");
//!     Ok(())
//! });
//! ```

mod context;

pub use context::Context;

use crate::domain::MiddlewareError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

/// One stage of the pipeline.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "middleware"
    }

    /// Inspect or transform the context. Returning an error aborts the write.
    async fn handle(&self, context: &mut Context) -> Result<(), MiddlewareError>;
}

/// Adapts a synchronous closure into a [`Middleware`].
pub struct FnMiddleware<F>
where
    F: Fn(&mut Context) -> Result<(), MiddlewareError> + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(&mut Context) -> Result<(), MiddlewareError> + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self::named("fn", handler)
    }

    pub fn named(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Context) -> Result<(), MiddlewareError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, context: &mut Context) -> Result<(), MiddlewareError> {
        (self.handler)(context)
    }
}

/// Ordered, append-only list of stages shared by every write of a stream.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Arc<RwLock<Vec<Arc<dyn Middleware>>>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage after the ones already registered.
    pub fn push<M: Middleware + 'static>(&self, middleware: M) {
        self.stages.write().push(Arc::new(middleware));
    }

    pub fn push_fn<F>(&self, handler: F)
    where
        F: Fn(&mut Context) -> Result<(), MiddlewareError> + Send + Sync + 'static,
    {
        self.push(FnMiddleware::new(handler));
    }

    /// Runs every stage in order, stopping at the first error.
    pub async fn run(&self, context: &mut Context) -> Result<(), MiddlewareError> {
        // Snapshot so no lock is held across a stage's await points.
        let stages: Vec<Arc<dyn Middleware>> = self.stages.read().clone();

        for (position, stage) in stages.iter().enumerate() {
            trace!(write_id = %context.id(), stage = stage.name(), position, "Running middleware");

            if let Err(err) = stage.handle(context).await {
                debug!(
                    write_id = %context.id(),
                    stage = stage.name(),
                    "Middleware aborted write: {}",
                    err
                );
                return Err(err);
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.read().is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stages = self.stages.read();
        f.debug_list()
            .entries(stages.iter().map(|stage| stage.name()))
            .finish()
    }
}
