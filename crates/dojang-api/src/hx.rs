//! Fragment-rendering hints at the HTTP boundary.
//!
//! The `HX-Request` header marks a request that wants a partial fragment
//! rather than a full page context. The hint shapes only the response
//! envelope — the domain layer returns identical data either way. Mutating
//! handlers attach an `HX-Trigger` header as an advisory signal for the
//! presentation layer to refresh cached views; nothing depends on it being
//! observed.

use std::convert::Infallible;

use axum::{
  extract::FromRequestParts,
  http::{HeaderName, HeaderValue, request::Parts},
  response::{IntoResponse, Response},
};

static HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
static HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// `Fragment(true)` when the request came from a fragment swap.
pub struct Fragment(pub bool);

impl<S> FromRequestParts<S> for Fragment
where
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    Ok(Fragment(parts.headers.contains_key(&HX_REQUEST)))
  }
}

/// Attach an `HX-Trigger` event name to a response.
pub fn trigger(event: &'static str, inner: impl IntoResponse) -> Response {
  let mut res = inner.into_response();
  res
    .headers_mut()
    .insert(HX_TRIGGER.clone(), HeaderValue::from_static(event));
  res
}
