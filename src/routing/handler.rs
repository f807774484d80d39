//! Handler and continuation types shared by middleware and terminal handlers.
//!
//! Middleware and terminal handlers have the same shape: they receive the
//! dispatch context, a slice of segments and a [`Next`] continuation. The
//! router decides which slice and which kind of continuation each one gets.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::routing::RouteError;

/// Boxed future returned by every handler.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a middleware or terminal handler.
pub type HandlerResult = Result<(), RouteError>;

/// A middleware or terminal handler registered on a route.
pub trait Handler<C>: Send + Sync {
    fn call<'a>(&'a self, ctx: &'a C, segments: &'a [String], next: Next) -> BoxFuture<'a, HandlerResult>;
}

impl<C, F> Handler<C> for F
where
    F: for<'a> Fn(&'a C, &'a [String], Next) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    fn call<'a>(&'a self, ctx: &'a C, segments: &'a [String], next: Next) -> BoxFuture<'a, HandlerResult> {
        self(ctx, segments, next)
    }
}

/// Shared handle to a registered handler.
pub type BoxedHandler<C> = Arc<dyn Handler<C>>;

/// Box a closure as a handler.
///
/// ```ignore
/// let ping = handler(|ctx: &Ctx, _args, _next| Box::pin(async move {
///     ctx.pong();
///     Ok(())
/// }));
/// ```
pub fn handler<C, F>(f: F) -> BoxedHandler<C>
where
    F: for<'a> Fn(&'a C, &'a [String], Next) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Single-shot continuation handed to each handler.
///
/// Middleware call [`Next::run`] to let dispatch continue; returning without
/// calling it stops the chain. The continuation given to a terminal handler
/// is inert and reports [`RouteError::NoContinuation`].
#[derive(Debug)]
pub struct Next {
    signal: Option<Arc<AtomicBool>>,
}

impl Next {
    /// Continuation for a middleware, plus the flag the router inspects afterwards.
    pub(crate) fn chained() -> (Self, Arc<AtomicBool>) {
        let signal = Arc::new(AtomicBool::new(false));
        (
            Self {
                signal: Some(signal.clone()),
            },
            signal,
        )
    }

    /// Continuation for a terminal handler.
    pub(crate) fn terminal() -> Self {
        Self { signal: None }
    }

    /// Continue the middleware chain.
    pub fn run(self) -> HandlerResult {
        match self.signal {
            Some(signal) => {
                signal.store(true, Ordering::Release);
                Ok(())
            }
            None => Err(RouteError::NoContinuation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chained_next_sets_signal() {
        let (next, signal) = Next::chained();
        assert!(!signal.load(Ordering::Acquire));
        next.run().unwrap();
        assert!(signal.load(Ordering::Acquire));
    }

    #[test]
    fn test_terminal_next_fails() {
        let err = Next::terminal().run().unwrap_err();
        assert!(matches!(err, RouteError::NoContinuation));
    }
}
