//! Segment router and dispatch.
//!
//! # Responsibilities
//! - Store routes keyed by a single command segment
//! - Run a route's middleware in registration order
//! - Delegate to a nested router or invoke the terminal handler
//!
//! # Design Decisions
//! - Exact, case-sensitive key lookup (no prefix matching)
//! - Unknown segments are a silent no-op, not an error
//! - Routers are built at startup and shared immutably behind `Arc`
//! - A nested router is only consulted when a following segment exists and
//!   the nested router knows it; otherwise the terminal handler receives the
//!   remaining segments as free-form arguments

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::routing::handler::{BoxFuture, BoxedHandler, HandlerResult, Next};
use crate::routing::RouteError;

/// Middleware chain, terminal handler and optional nested router for one key.
pub struct Route<C> {
    middleware: Vec<BoxedHandler<C>>,
    handler: BoxedHandler<C>,
    next_router: Option<Arc<Router<C>>>,
}

impl<C> Route<C> {
    /// Number of middleware in front of the handler.
    pub fn middleware_len(&self) -> usize {
        self.middleware.len()
    }

    /// Whether a nested router is bound.
    pub fn has_next_router(&self) -> bool {
        self.next_router.is_some()
    }
}

/// Dispatch table from command segment to [`Route`].
pub struct Router<C> {
    routes: HashMap<String, Route<C>>,
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }
}

impl<C> std::fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("keys", &self.keys()).finish()
    }
}

impl<C> Router<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `functions` under `key`.
    ///
    /// The last function is the terminal handler; the ones before it are
    /// middleware, run in the given order. Registering an existing key
    /// replaces the previous route, including its nested router.
    pub fn register(&mut self, key: impl Into<String>, mut functions: Vec<BoxedHandler<C>>) -> Result<(), RouteError> {
        let key = key.into();
        let handler = functions
            .pop()
            .ok_or_else(|| RouteError::MissingHandler(key.clone()))?;

        tracing::trace!(key = %key, middleware = functions.len(), "Registering route");
        self.routes.insert(
            key,
            Route {
                middleware: functions,
                handler,
                next_router: None,
            },
        );
        Ok(())
    }

    /// Bind `next` as the router for the segment following `key`.
    pub fn register_next_router(&mut self, key: &str, next: Arc<Router<C>>) -> Result<(), RouteError> {
        let route = self
            .routes
            .get_mut(key)
            .ok_or_else(|| RouteError::RouteNotFound(key.to_string()))?;
        route.next_router = Some(next);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.routes.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Route<C>> {
        self.routes.get(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl<C: Send + Sync + 'static> Router<C> {
    /// Dispatch `segments[start..]`.
    ///
    /// Middleware receive the full segment list; the terminal handler receives
    /// every segment after the matched one.
    pub fn route<'a>(&'a self, ctx: &'a C, segments: &'a [String], start: usize) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let Some(route) = segments.get(start).and_then(|segment| self.routes.get(segment)) else {
                return Ok(());
            };

            for (position, middleware) in route.middleware.iter().enumerate() {
                let (next, signal) = Next::chained();
                middleware.call(ctx, segments, next).await?;
                if !signal.load(Ordering::Acquire) {
                    tracing::debug!(
                        segment = %segments[start],
                        middleware = position,
                        "Middleware stopped dispatch"
                    );
                    return Ok(());
                }
            }

            if let Some(next_router) = &route.next_router {
                let has_following = start + 1 < segments.len();
                if has_following && next_router.contains(&segments[start + 1]) {
                    return next_router.route(ctx, segments, start + 1).await;
                }
            }

            route
                .handler
                .call(ctx, &segments[start + 1..], Next::terminal())
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::handler;
    use std::sync::Mutex;

    /// Records handler invocations in order.
    #[derive(Default)]
    struct Log {
        entries: Mutex<Vec<String>>,
    }

    impl Log {
        fn push(&self, entry: impl Into<String>) {
            self.entries.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    fn segments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    fn recorder(name: &'static str) -> BoxedHandler<Log> {
        handler(move |log: &Log, args: &[String], _next: Next| {
            log.push(format!("{}({})", name, args.join(" ")));
            Box::pin(async { Ok(()) })
        })
    }

    fn passing(name: &'static str) -> BoxedHandler<Log> {
        handler(move |log: &Log, _args: &[String], next: Next| {
            log.push(name);
            Box::pin(async move { next.run() })
        })
    }

    fn blocking(name: &'static str) -> BoxedHandler<Log> {
        handler(move |log: &Log, _args: &[String], _next: Next| {
            log.push(name);
            Box::pin(async { Ok(()) })
        })
    }

    #[tokio::test]
    async fn test_routes_registered_key() {
        let mut router = Router::new();
        router.register("!ping", vec![recorder("ping")]).unwrap();

        let log = Log::default();
        router.route(&log, &segments(&["!ping"]), 0).await.unwrap();

        assert_eq!(log.entries(), vec!["ping()"]);
    }

    #[tokio::test]
    async fn test_unknown_key_is_silent() {
        let mut router = Router::new();
        router.register("!ping", vec![recorder("ping")]).unwrap();

        let log = Log::default();
        router.route(&log, &segments(&["!help"]), 0).await.unwrap();
        router.route(&log, &segments(&[]), 0).await.unwrap();
        router.route(&log, &segments(&["!ping"]), 3).await.unwrap();

        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_keys_are_case_sensitive() {
        let mut router = Router::new();
        router.register("ping", vec![recorder("ping")]).unwrap();

        let log = Log::default();
        router.route(&log, &segments(&["PING"]), 0).await.unwrap();

        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_middleware_run_in_order() {
        let mut router = Router::new();
        router
            .register("!ping", vec![passing("m1"), passing("m2"), recorder("ping")])
            .unwrap();

        let log = Log::default();
        router.route(&log, &segments(&["!ping", "a"]), 0).await.unwrap();

        assert_eq!(log.entries(), vec!["m1", "m2", "ping(a)"]);
    }

    #[tokio::test]
    async fn test_middleware_short_circuit() {
        let mut router = Router::new();
        router
            .register("!ping", vec![passing("m1"), blocking("m2"), passing("m3"), recorder("ping")])
            .unwrap();

        let log = Log::default();
        router.route(&log, &segments(&["!ping"]), 0).await.unwrap();

        // m3 and the handler never run
        assert_eq!(log.entries(), vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn test_async_middleware_is_awaited() {
        let delayed = handler(|log: &Log, _args: &[String], next: Next| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                log.push("slow");
                next.run()
            })
        });
        let silent = handler(|log: &Log, _args: &[String], _next: Next| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                log.push("silent");
                Ok(())
            })
        });

        let mut router = Router::new();
        router.register("go", vec![delayed.clone(), delayed, recorder("go")]).unwrap();
        router.register("stop", vec![silent.clone(), silent, recorder("stop")]).unwrap();

        let log = Log::default();
        router.route(&log, &segments(&["go"]), 0).await.unwrap();
        assert_eq!(log.entries(), vec!["slow", "slow", "go()"]);

        let log = Log::default();
        router.route(&log, &segments(&["stop"]), 0).await.unwrap();
        assert_eq!(log.entries(), vec!["silent"]);
    }

    #[tokio::test]
    async fn test_next_called_after_spawn_does_not_count() {
        // A middleware that hands `next` to another task and returns
        // before it runs has not continued the chain.
        let detached = handler(|_log: &Log, _args: &[String], next: Next| {
            Box::pin(async move {
                tokio::spawn(async move {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    let _ = next.run();
                });
                Ok(())
            })
        });

        let mut router = Router::new();
        router.register("x", vec![detached, recorder("x")]).unwrap();

        let log = Log::default();
        router.route(&log, &segments(&["x"]), 0).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(40)).await;

        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_delegates_to_next_router() {
        let mut child = Router::new();
        child.register("b", vec![recorder("b")]).unwrap();

        let mut root = Router::new();
        root.register("a", vec![recorder("a")]).unwrap();
        root.register_next_router("a", Arc::new(child)).unwrap();

        let log = Log::default();
        root.route(&log, &segments(&["a", "b"]), 0).await.unwrap();

        assert_eq!(log.entries(), vec!["b()"]);
    }

    #[tokio::test]
    async fn test_delegation_runs_both_middleware_chains() {
        let mut child = Router::new();
        child.register("song", vec![passing("child-mw"), recorder("song")]).unwrap();

        let mut root = Router::new();
        root.register("!help", vec![passing("root-mw"), recorder("help")]).unwrap();
        root.register_next_router("!help", Arc::new(child)).unwrap();

        let log = Log::default();
        root.route(&log, &segments(&["!help", "song", "x"]), 0).await.unwrap();

        assert_eq!(log.entries(), vec!["root-mw", "child-mw", "song(x)"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_handler_on_child_miss() {
        let mut child = Router::new();
        child.register("b", vec![recorder("b")]).unwrap();

        let mut root = Router::new();
        root.register("a", vec![recorder("a")]).unwrap();
        root.register_next_router("a", Arc::new(child)).unwrap();

        let log = Log::default();
        root.route(&log, &segments(&["a", "c"]), 0).await.unwrap();
        root.route(&log, &segments(&["a"]), 0).await.unwrap();

        assert_eq!(log.entries(), vec!["a(c)", "a()"]);
    }

    #[tokio::test]
    async fn test_route_from_offset() {
        let mut router = Router::new();
        router.register("cmd", vec![recorder("cmd")]).unwrap();

        let log = Log::default();
        router
            .route(&log, &segments(&["!fm", "cmd", "x", "y"]), 1)
            .await
            .unwrap();

        assert_eq!(log.entries(), vec!["cmd(x y)"]);
    }

    #[test]
    fn test_register_next_router_requires_route() {
        let mut router: Router<Log> = Router::new();
        let err = router
            .register_next_router("!help", Arc::new(Router::new()))
            .unwrap_err();

        assert!(matches!(err, RouteError::RouteNotFound(ref key) if key == "!help"));
        assert_eq!(err.to_string(), "router not found: !help");
    }

    #[test]
    fn test_register_requires_handler() {
        let mut router: Router<Log> = Router::new();
        let err = router.register("empty", Vec::new()).unwrap_err();
        assert!(matches!(err, RouteError::MissingHandler(_)));
        assert!(!router.contains("empty"));
    }

    #[tokio::test]
    async fn test_reregister_drops_next_router() {
        let mut child = Router::new();
        child.register("b", vec![recorder("b")]).unwrap();

        let mut root = Router::new();
        root.register("a", vec![recorder("a1")]).unwrap();
        root.register_next_router("a", Arc::new(child)).unwrap();
        root.register("a", vec![recorder("a2")]).unwrap();

        assert!(!root.get("a").unwrap().has_next_router());

        let log = Log::default();
        root.route(&log, &segments(&["a", "b"]), 0).await.unwrap();
        assert_eq!(log.entries(), vec!["a2(b)"]);
    }

    #[tokio::test]
    async fn test_terminal_next_is_an_error() {
        let eager = handler(|_log: &Log, _args: &[String], next: Next| Box::pin(async move { next.run() }));

        let mut router = Router::new();
        router.register("x", vec![eager]).unwrap();

        let err = router
            .route(&Log::default(), &segments(&["x"]), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::NoContinuation));
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let failing = handler(|_log: &Log, _args: &[String], _next: Next| {
            Box::pin(async { Err(RouteError::handler("boom")) })
        });

        let mut router = Router::new();
        router.register("x", vec![passing("m"), failing]).unwrap();

        let err = router
            .route(&Log::default(), &segments(&["x"]), 0)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "handler failed: boom");
    }

    #[test]
    fn test_keys_sorted() {
        let mut router: Router<Log> = Router::new();
        router.register("minViews", vec![recorder("v")]).unwrap();
        router.register("maxDuration", vec![recorder("d")]).unwrap();
        assert_eq!(router.keys(), vec!["maxDuration", "minViews"]);
        assert_eq!(router.get("minViews").unwrap().middleware_len(), 0);
    }
}
