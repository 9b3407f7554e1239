//! Response hardening headers.
//!
//! Every response leaving the router carries:
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options: DENY`
//! - `Referrer-Policy: no-referrer`
//! - `Strict-Transport-Security` built from [`HstsSettings`]

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, Response, header},
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::debug;

use crate::infra::config::HstsSettings;

/// Layer adding the security headers.
#[derive(Clone, Debug)]
pub struct SecurityHeadersLayer {
    hsts: HeaderValue,
}

impl SecurityHeadersLayer {
    pub fn new(settings: &HstsSettings) -> Self {
        Self {
            hsts: Self::build_hsts_value(settings),
        }
    }

    fn build_hsts_value(settings: &HstsSettings) -> HeaderValue {
        HeaderValue::from_str(&settings.header_value())
            .unwrap_or_else(|_| HeaderValue::from_static("max-age=31536000"))
    }
}

impl Default for SecurityHeadersLayer {
    fn default() -> Self {
        Self::new(&HstsSettings::default())
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        debug!(hsts = ?self.hsts, "installing security headers layer");
        SecurityHeaders {
            inner,
            hsts: self.hsts.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SecurityHeaders<S> {
    inner: S,
    hsts: HeaderValue,
}

impl<S> Service<Request<Body>> for SecurityHeaders<S>
where
    S: Service<Request<Body>, Response = Response<Body>>
        + Send
        + Clone
        + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<
        Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Take the service that was driven to readiness and leave the clone.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let hsts = self.hsts.clone();

        Box::pin(async move {
            let mut response = inner.call(req).await?;

            let headers = response.headers_mut();
            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            );
            headers.insert(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            );
            headers.insert(
                header::REFERRER_POLICY,
                HeaderValue::from_static("no-referrer"),
            );
            headers.insert(header::STRICT_TRANSPORT_SECURITY, hsts);

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{ServiceExt, service_fn};

    #[tokio::test]
    async fn adds_headers_to_every_response() {
        let settings = HstsSettings {
            max_age: 600,
            include_subdomains: false,
            preload: true,
        };
        let service = SecurityHeadersLayer::new(&settings).layer(service_fn(
            |_req: Request<Body>| async {
                Ok::<_, Infallible>(Response::new(Body::empty()))
            },
        ));

        let response = service
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap();
        let headers = response.headers();

        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::REFERRER_POLICY], "no-referrer");
        assert_eq!(
            headers[header::STRICT_TRANSPORT_SECURITY],
            "max-age=600; preload"
        );
    }
}
