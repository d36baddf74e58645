//! The seam between the framing core and application code.
//!
//! A [`Handler`] receives one [`ParsedRequest`] and produces one
//! [`ResponseSpec`]. Routing, endpoints and storage all live behind it.

use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::protocol::{ParsedRequest, ResponseSpec};

/// The error every handler reports. The connection answers it with a 500.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: ParsedRequest) -> Result<ResponseSpec, BoxError>;
}

#[async_trait]
impl<H> Handler for Arc<H>
where
    H: Handler + ?Sized,
{
    async fn call(&self, request: ParsedRequest) -> Result<ResponseSpec, BoxError> {
        self.as_ref().call(request).await
    }
}

#[async_trait]
impl<H> Handler for Box<H>
where
    H: Handler + ?Sized,
{
    async fn call(&self, request: ParsedRequest) -> Result<ResponseSpec, BoxError> {
        self.as_ref().call(request).await
    }
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: Fn(ParsedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ResponseSpec, Err>> + Send + 'static,
    Err: Into<BoxError> + 'static,
{
    async fn call(&self, request: ParsedRequest) -> Result<ResponseSpec, BoxError> {
        (self.f)(request).await.map_err(Into::into)
    }
}

pub fn make_handler<F, Fut, Err>(f: F) -> HandlerFn<F>
where
    F: Fn(ParsedRequest) -> Fut,
    Fut: Future<Output = Result<ResponseSpec, Err>>,
    Err: Into<BoxError>,
{
    HandlerFn { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_request;
    use crate::protocol::RawFrame;
    use std::convert::Infallible;

    #[tokio::test]
    async fn closure_handler() {
        let handler = make_handler(|request: ParsedRequest| async move {
            Ok::<_, Infallible>(ResponseSpec::ok().body(request.path().to_owned()))
        });

        let request = parse_request(RawFrame::from("GET /echo HTTP/1.1\r\n\r\n")).unwrap();
        let response = Arc::new(handler).call(request).await.unwrap();

        assert_eq!(&response.body_bytes()[..], b"/echo");
    }

    #[tokio::test]
    async fn errors_are_boxed() {
        let handler: Box<dyn Handler> = Box::new(make_handler(|_request: ParsedRequest| async move {
            Err::<ResponseSpec, _>(std::io::Error::other("disk gone"))
        }));

        let request = parse_request(RawFrame::from("GET / HTTP/1.1\r\n\r\n")).unwrap();
        let e = handler.call(request).await.unwrap_err();

        assert_eq!(e.to_string(), "disk gone");
    }
}
