//! Request correlation ids.
//!
//! Every response carries an `x-request-id` header. A client-supplied id is echoed back;
//! otherwise a UUID v4 is generated. Relay logs do not include it, but a reverse proxy in front
//! of the service can join its own access logs on the header.

use axum::http::{header::HeaderValue, HeaderName, Request};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request ids for tower-http's request id middleware.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestIdGenerator;

impl MakeRequestId for UuidRequestIdGenerator {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).ok()?))
    }
}

/// Returns the set and propagate layers.
///
/// Apply propagate first and set last so that set runs outermost:
///
/// ```ignore
/// let (set_layer, propagate_layer) = create_request_id_layers();
/// let app = router.layer(propagate_layer).layer(set_layer);
/// ```
#[must_use]
pub fn create_request_id_layers(
) -> (SetRequestIdLayer<UuidRequestIdGenerator>, PropagateRequestIdLayer) {
    (
        SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestIdGenerator),
        PropagateRequestIdLayer::new(X_REQUEST_ID.clone()),
    )
}
