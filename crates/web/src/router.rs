//! Exact-path routing on top of [`matchit`].
//!
//! Every path owns a list of [`RouterItem`]s, each bound to one method or to
//! any method. The first item accepting the request method handles it.
//!
//! ```no_run
//! use std::convert::Infallible;
//! use sockapi_http::handler::make_handler;
//! use sockapi_http::protocol::{ParsedRequest, ResponseSpec};
//! use sockapi_web::router::{Router, get};
//!
//! async fn hello(_request: ParsedRequest) -> Result<ResponseSpec, Infallible> {
//!     Ok(ResponseSpec::ok().body("hello"))
//! }
//!
//! let router = Router::builder().route("/hello", get(make_handler(hello))).build().unwrap();
//! ```

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;

use async_trait::async_trait;
use http::{Method, StatusCode};
use sockapi_http::handler::{BoxError, Handler, make_handler};
use sockapi_http::protocol::{ParsedRequest, ResponseSpec};
use thiserror::Error;
use tracing::debug;

pub(crate) type BoxHandler = Box<dyn Handler>;
type InnerRouter<T> = matchit::Router<T>;

pub const NOT_FOUND_REASON: &str = "We ain't found nothin";

pub struct Router {
    inner_router: InnerRouter<Vec<RouterItem>>,
    not_found: BoxHandler,
}

pub struct RouterItem {
    method: Option<Method>,
    handler: BoxHandler,
}

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("can't register route {path}: {source}")]
    Insert { path: String, source: matchit::InsertError },

    #[error("route {path} already has a {method} handler")]
    DuplicateMethod { path: String, method: String },
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// The items registered for `path`, empty if no route matches.
    pub fn at(&self, path: &str) -> &[RouterItem] {
        self.inner_router.at(path).map(|matched| matched.value.as_slice()).unwrap_or_default()
    }
}

impl RouterItem {
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn accepts(&self, method: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m.as_str() == method)
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

#[async_trait]
impl Handler for Router {
    async fn call(&self, request: ParsedRequest) -> Result<ResponseSpec, BoxError> {
        let items = self.at(request.path());
        if items.is_empty() {
            debug!(path = request.path(), "no route matched");
            return self.not_found.call(request).await;
        }

        match items.iter().find(|item| item.accepts(request.method())) {
            Some(item) => item.handler.call(request).await,
            None => {
                debug!(method = request.method(), path = request.path(), "method not allowed");
                Ok(method_not_allowed(items))
            }
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl fmt::Debug for RouterItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterItem").field("method", &self.method).finish_non_exhaustive()
    }
}

fn method_not_allowed(items: &[RouterItem]) -> ResponseSpec {
    let allow = items.iter().filter_map(|item| item.method.as_ref()).map(Method::as_str).collect::<Vec<_>>().join(", ");
    ResponseSpec::new(StatusCode::METHOD_NOT_ALLOWED).header("Allow", allow)
}

async fn not_found(_request: ParsedRequest) -> Result<ResponseSpec, Infallible> {
    Ok(ResponseSpec::not_found(NOT_FOUND_REASON))
}

pub struct RouterBuilder {
    data: HashMap<String, Vec<RouterItemBuilder>>,
    not_found: Option<BoxHandler>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { data: HashMap::new(), not_found: None }
    }

    pub fn route(mut self, route: impl Into<String>, item_builder: RouterItemBuilder) -> Self {
        self.data.entry(route.into()).or_default().push(item_builder);
        self
    }

    /// Replaces the handler used when no route matches the path.
    pub fn not_found<H>(mut self, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.not_found = Some(boxed(handler));
        self
    }

    pub fn build(self) -> Result<Router, RouterError> {
        let mut inner_router = InnerRouter::new();

        for (path, items) in self.data {
            let mut router_items: Vec<RouterItem> = Vec::with_capacity(items.len());
            for item in items {
                if router_items.iter().any(|existing| existing.method == item.method) {
                    let method = item.method.as_ref().map_or("any", Method::as_str).to_owned();
                    return Err(RouterError::DuplicateMethod { path, method });
                }
                router_items.push(item.build());
            }

            if let Err(source) = inner_router.insert(path.clone(), router_items) {
                return Err(RouterError::Insert { path, source });
            }
        }

        let not_found = self.not_found.unwrap_or_else(|| boxed(make_handler(not_found)));
        Ok(Router { inner_router, not_found })
    }
}

pub struct RouterItemBuilder {
    method: Option<Method>,
    handler: BoxHandler,
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder").field("paths", &self.data.keys().collect::<Vec<_>>()).finish_non_exhaustive()
    }
}

impl fmt::Debug for RouterItemBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterItemBuilder").field("method", &self.method).finish_non_exhaustive()
    }
}

impl RouterItemBuilder {
    fn build(self) -> RouterItem {
        RouterItem { method: self.method, handler: self.handler }
    }
}

pub(crate) fn boxed<H>(handler: H) -> BoxHandler
where
    H: Handler + 'static,
{
    Box::new(handler)
}

macro_rules! method_router {
    ($method:ident, $method_name:ident) => {
        pub fn $method<H>(handler: H) -> RouterItemBuilder
        where
            H: Handler + 'static,
        {
            RouterItemBuilder { method: Some(Method::$method_name), handler: boxed(handler) }
        }
    };
}

method_router!(get, GET);
method_router!(post, POST);
method_router!(put, PUT);
method_router!(delete, DELETE);
method_router!(head, HEAD);
method_router!(options, OPTIONS);
method_router!(patch, PATCH);

pub fn any<H>(handler: H) -> RouterItemBuilder
where
    H: Handler + 'static,
{
    RouterItemBuilder { method: None, handler: boxed(handler) }
}
