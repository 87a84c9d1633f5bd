//! Request handler contract.
//!
//! A handler is the application-supplied collaborator at the dispatch seam:
//! it receives one [`Context`] per request/response cycle and produces a
//! [`Response`]. The context is consumed by the call, so a handler cannot
//! retain the request or the response factory beyond it.

use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::builder::ResponseMaker;
use crate::protocol::{Request, Response};

/// Errors a handler may bubble up. The connection answers `500` and tears
/// itself down when it sees one.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Everything a handler gets for one request/response cycle.
///
/// `S` is the application's read-only globals value, shared by every handler
/// on every connection.
pub struct Context<S> {
    pub request: Request,
    pub response: ResponseMaker,
    pub globals: Arc<S>,
}

#[async_trait]
pub trait Handler<S>: Send + Sync {
    async fn call(&self, ctx: Context<S>) -> Result<Response, HandlerError>;
}

/// Adapter that lets a plain async fn serve as a [`Handler`].
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<S, F, Fut> Handler<S> for HandlerFn<F>
where
    S: Send + Sync + 'static,
    F: Fn(Context<S>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, HandlerError>> + Send,
{
    async fn call(&self, ctx: Context<S>) -> Result<Response, HandlerError> {
        (self.f)(ctx).await
    }
}

pub fn make_handler<S, F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Context<S>) -> Fut,
    Fut: Future<Output = Result<Response, HandlerError>>,
{
    HandlerFn { f }
}
