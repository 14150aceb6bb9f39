//! Response tracing for the HTTP surface.
//!
//! [`Trace`] opens a fresh [`TraceId`] scope around every request and echoes
//! the identifier back in the `trace-id` response header, so a client report
//! can be matched against server logs.
//!
//! Task locals do not cross `tokio::spawn` boundaries. Work spawned from a
//! handler must be wrapped in [`TraceId::scope`] explicitly if it is to log
//! under the request's identifier.

use std::future::{Ready, ready};
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use futures_util::future::LocalBoxFuture;
use tracing::error;

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Request tracing middleware.
///
/// Runs the wrapped service inside a [`TraceId`] scope and stamps the
/// identifier onto the response. Handlers and error conversions read it back
/// through [`TraceId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use crm_backend::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service produced by [`Trace`]; not constructed directly.
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::generate();
        let downstream = self.service.call(req);
        Box::pin(TraceId::scope(trace_id, async move {
            let mut res = downstream.await?;
            stamp(res.response_mut().headers_mut(), trace_id);
            Ok(res)
        }))
    }
}

/// Renders the identifier into the `trace-id` header, logging instead of
/// failing the response if the rendering is not a legal header value.
fn stamp(headers: &mut HeaderMap, trace_id: TraceId) {
    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => {
            error!(
                %error,
                trace_id = %trace_id,
                "trace identifier could not be encoded as a header"
            );
        }
    }
}
