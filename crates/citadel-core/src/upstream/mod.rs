//! Upstream access: the endpoint list, the HTTP fetcher, per-attempt deadlines and the
//! first-success race.

pub mod deadline;
pub mod endpoint;
pub mod errors;
pub mod fetcher;
pub mod http_client;
pub mod race;

pub use deadline::with_deadline;
pub use endpoint::{Endpoint, EndpointSet};
pub use errors::UpstreamError;
pub use fetcher::{HttpNodeFetcher, NodeFetcher};
pub use http_client::{HttpClient, HttpClientConfig};
pub use race::{race_first_ok, RaceFailure};
