//! Method + path dispatch for the HTTP API.
//!
//! Every route is registered up front in [`build_router`]; the accept loop
//! hands each request to [`Router::route`].  Handlers decide for themselves
//! whether a session cookie is required, so the table carries no auth tiers.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use tracing::{debug, warn};

use shared::types::ErrorResponse;

use crate::AppState;
use crate::handlers::utils::deliver_serialized_json;
use crate::handlers::{auth, index, reviews};

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------

type RouteHandler = Box<
    dyn Fn(
            Request<Incoming>,
            AppState,
        ) -> Pin<
            Box<dyn Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send>,
        > + Send
        + Sync,
>;

struct Route {
    method: Method,
    path: String,
    handler: RouteHandler,
}

pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a GET route.
    pub fn get<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::GET,
            path: path.to_string(),
            handler: Box::new(move |req, state| Box::pin(handler(req, state))),
        });
        self
    }

    /// Register a POST route.
    pub fn post<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        self.routes.push(Route {
            method: Method::POST,
            path: path.to_string(),
            handler: Box::new(move |req, state| Box::pin(handler(req, state))),
        });
        self
    }

    /// Dispatch a request to the first route whose method and path match.
    ///
    /// A path that exists under a different method gets a 405; anything else
    /// falls through to a JSON 404.  Both are envelope errors, never the
    /// HTML error pages a generic server would emit.
    pub async fn route(
        &self,
        req: Request<Incoming>,
        state: AppState,
    ) -> Result<Response<BoxBody<Bytes, Infallible>>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        debug!("Routing {} {}", method, path);

        for route in &self.routes {
            if route.method == method && Self::path_matches(&route.path, &path) {
                return (route.handler)(req, state).await;
            }
        }

        let path_known = self
            .routes
            .iter()
            .any(|route| Self::path_matches(&route.path, &path));
        if path_known {
            warn!("Method {} not allowed for {}", method, path);
            return deliver_serialized_json(
                &ErrorResponse::method_not_allowed(),
                StatusCode::METHOD_NOT_ALLOWED,
            );
        }

        warn!("No route for {} {}", method, path);
        deliver_serialized_json(&ErrorResponse::not_found(&path), StatusCode::NOT_FOUND)
    }

    /// Compare a registered path against a request path, ignoring any query
    /// string on the request side.
    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        let request_path = request_path.split('?').next().unwrap_or(request_path);
        route_path == request_path
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Route registration
// ---------------------------------------------------------------------------

/// Build the full route table for the review service.
///
/// POST routes carry the form-handler endpoints the clients target; the two
/// GET routes under /activate and /remove are followed from emailed links,
/// so they take their input as a query parameter instead of a body.
pub fn build_router() -> Router {
    Router::new()
        // ── Service ─────────────────────────────────────────────────────────
        .get("/", index::handle_index)
        .get("/health", index::handle_health)
        // ── Accounts ────────────────────────────────────────────────────────
        .post("/login", auth::handle_login)
        .post("/register", auth::handle_register)
        .post("/logout", auth::handle_logout)
        .get("/activate", auth::handle_activate)
        // ── Reviews ─────────────────────────────────────────────────────────
        .post("/write", reviews::handle_write)
        .post("/upvote", reviews::handle_upvote)
        .post("/search", reviews::handle_search)
        .post("/report", reviews::handle_report)
        .get("/remove", reviews::handle_remove)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_path_matches() {
        assert!(Router::path_matches("/login", "/login"));
    }

    #[test]
    fn different_paths_do_not_match() {
        assert!(!Router::path_matches("/login", "/logout"));
    }

    #[test]
    fn trailing_slash_is_a_different_path() {
        assert!(!Router::path_matches("/login", "/login/"));
    }

    #[test]
    fn root_path_matches() {
        assert!(Router::path_matches("/", "/"));
    }

    #[test]
    fn query_string_is_ignored() {
        assert!(Router::path_matches("/activate", "/activate?key=abc123"));
        assert!(Router::path_matches("/remove", "/remove?key="));
    }

    #[test]
    fn prefix_is_not_a_match() {
        assert!(!Router::path_matches("/write", "/write/extra"));
    }

    #[test]
    fn router_new_has_no_routes() {
        let router = Router::new();
        assert!(router.routes.is_empty());
    }

    #[test]
    fn get_adds_route_with_method_and_path() {
        let router = Router::new().get("/ping", |_req, _state| async move {
            deliver_serialized_json(&serde_json::json!({"status": "ok"}), StatusCode::OK)
        });
        assert_eq!(router.routes.len(), 1);
        assert_eq!(router.routes[0].method, Method::GET);
        assert_eq!(router.routes[0].path, "/ping");
    }

    #[test]
    fn full_table_registers_every_endpoint() {
        let router = build_router();
        assert_eq!(router.routes.len(), 11);

        let find = |method: &Method, path: &str| {
            router
                .routes
                .iter()
                .any(|r| r.method == *method && r.path == path)
        };
        assert!(find(&Method::POST, "/login"));
        assert!(find(&Method::POST, "/register"));
        assert!(find(&Method::POST, "/logout"));
        assert!(find(&Method::GET, "/activate"));
        assert!(find(&Method::POST, "/write"));
        assert!(find(&Method::POST, "/upvote"));
        assert!(find(&Method::POST, "/search"));
        assert!(find(&Method::POST, "/report"));
        assert!(find(&Method::GET, "/remove"));
        assert!(find(&Method::GET, "/"));
        assert!(find(&Method::GET, "/health"));
    }
}
