//! Per-request dispatch from URL to build-engine artifact.
//!
//! Preflight requests are answered directly. Everything else goes through
//! the artifact route table: each handler asks the engine for one artifact
//! and hands the buffer to the encoder. Handlers never look at the build
//! tracker; a request always fetches fresh from the engine.

use crate::dev::encoder;
use crate::dev::router::{Params, Router};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use kiln_engine::{BuildEngine, EngineResult, Node};
use regex::Regex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Boxed future returned by route handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A route handler.
pub type Handler = Arc<dyn Fn(RequestContext) -> HandlerFuture + Send + Sync>;

/// Everything a handler gets to see about the request.
pub struct RequestContext {
    pub engine: Arc<dyn BuildEngine>,
    pub headers: HeaderMap,
    /// Path plus query, as requested.
    pub url: String,
    pub params: Params,
}

impl RequestContext {
    fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).and_then(|p| p.as_deref())
    }
}

/// Top-level request handler for the dev server.
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<Router<Handler>>,
    engine: Arc<dyn BuildEngine>,
}

impl Dispatcher {
    /// Create a dispatcher serving artifacts from `engine`.
    pub fn new(engine: Arc<dyn BuildEngine>) -> Result<Self, regex::Error> {
        Ok(Self {
            routes: Arc::new(artifact_routes()?),
            engine,
        })
    }

    /// Wrap the dispatcher in an axum service.
    pub fn into_service(self) -> axum::Router {
        axum::Router::new()
            .fallback(handle)
            .layer(TraceLayer::new_for_http())
            .with_state(self)
    }

    /// Answer one request.
    pub async fn dispatch(&self, request: Request) -> Response {
        if request.method() == Method::OPTIONS {
            return preflight();
        }

        let (parts, _body) = request.into_parts();
        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let Some(matched) = self.routes.find(parts.uri.path()) else {
            return not_found("no route");
        };

        tracing::debug!("{} {} ({} captures)", parts.method, url, matched.params.len());
        let context = RequestContext {
            engine: Arc::clone(&self.engine),
            headers: parts.headers,
            url,
            params: matched.params,
        };
        (matched.handler)(context).await
    }
}

async fn handle(State(dispatcher): State<Dispatcher>, request: Request) -> Response {
    dispatcher.dispatch(request).await
}

fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |ctx: RequestContext| -> HandlerFuture { Box::pin(f(ctx)) })
}

/// The artifact route table, in precedence order.
fn artifact_routes() -> Result<Router<Handler>, regex::Error> {
    let mut router = Router::new();

    router
        .route(
            Regex::new(r"^/manifest\.json$")?,
            handler(|ctx| async move {
                let result = ctx.engine.manifest().await;
                respond(result, &ctx.headers, Some("application/json"))
            }),
        )
        .route(
            Regex::new(r"(^|/)(service-worker|sw)\.js$")?,
            handler(|ctx| async move {
                let result = ctx.engine.service_worker().await;
                respond(result, &ctx.headers, Some("application/javascript"))
            }),
        )
        .route(
            Regex::new(r"/([a-zA-Z0-9_-]+)\.js$")?,
            handler(|ctx| async move {
                let Some(name) = ctx.param(1) else {
                    return not_found("script not found");
                };
                let result = ctx.engine.script(name).await;
                respond(result, &ctx.headers, Some("application/javascript"))
            }),
        )
        .route(
            Regex::new(r"/bundle\.css$")?,
            handler(|ctx| async move {
                let result = ctx.engine.style().await;
                respond(result, &ctx.headers, Some("text/css"))
            }),
        )
        .route(
            Regex::new(r"^/assets/(.*)$")?,
            handler(|ctx| async move {
                let name = format!("assets/{}", ctx.param(1).unwrap_or_default());
                let result = ctx.engine.asset(&name).await;
                respond(result, &ctx.headers, None)
            }),
        )
        .default(handler(|ctx| async move {
            let result = ctx.engine.document(&ctx.url).await;
            respond(result, &ctx.headers, Some("text/html"))
        }));

    Ok(router)
}

/// Turn an engine result into a response.
///
/// Any engine failure is a 404 carrying the error message. Without an
/// explicit `content_type` the node's own type is used, if any.
fn respond(result: EngineResult<Node>, headers: &HeaderMap, content_type: Option<&str>) -> Response {
    let node = match result {
        Ok(node) => node,
        Err(e) => return not_found(&e.to_string()),
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CACHE_CONTROL, "no-cache");
    if let Some(content_type) = content_type.or(node.content_type.as_deref()) {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    encoder::deliver(node.buffer, headers, builder)
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message.to_string(),
    )
        .into_response()
}

/// Permissive CORS answer to a preflight request.
fn preflight() -> Response {
    let any = HeaderValue::from_static("*");
    let mut response = Response::new(Body::empty());
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, any.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, any.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, any);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    response
}
