//! Tower layer that runs the Access Guard in front of a route

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use super::authorization::guard_request_from;
use crate::application::access_guard::AccessGuard;
use crate::domain::authorization::RouteMetadata;

/// Wrap a route so the guard runs before the handler.
///
/// On failure the JSON error is written and the inner service is never called.
pub fn guard(access_guard: &Arc<AccessGuard>, metadata: RouteMetadata) -> AccessGuardLayer {
    AccessGuardLayer::new(Arc::clone(access_guard), metadata)
}

#[derive(Clone)]
pub struct AccessGuardLayer {
    guard: Arc<AccessGuard>,
    metadata: RouteMetadata,
}

impl AccessGuardLayer {
    pub fn new(guard: Arc<AccessGuard>, metadata: RouteMetadata) -> Self {
        Self { guard, metadata }
    }
}

impl<S> Layer<S> for AccessGuardLayer {
    type Service = AccessGuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessGuardService {
            inner,
            guard: Arc::clone(&self.guard),
            metadata: self.metadata,
        }
    }
}

#[derive(Clone)]
pub struct AccessGuardService<S> {
    inner: S,
    guard: Arc<AccessGuard>,
    metadata: RouteMetadata,
}

impl<S> Service<Request> for AccessGuardService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        // The ready service goes into the future; a fresh clone stays behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let guard = Arc::clone(&self.guard);
        let metadata = self.metadata;

        Box::pin(async move {
            let guard_request = guard_request_from(&request);

            match guard.evaluate(&guard_request, &metadata).await {
                Ok(context) => {
                    tracing::debug!(
                        user_id = %context.user_id,
                        role = %context.role,
                        request_id = %context.request_id,
                        "Request authorized"
                    );
                    request.extensions_mut().insert(context);
                    inner.call(request).await
                }
                Err(rejection) => {
                    tracing::info!(
                        path = %guard_request.path,
                        code = rejection.code(),
                        "Request rejected by access guard"
                    );
                    Ok(rejection.into_response())
                }
            }
        })
    }
}
