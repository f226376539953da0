//! Request handling pipeline.
//!
//! ```text
//! raw bytes
//!     │
//!     ▼
//! ┌──────────────────┐
//! │ ValidatedRequest │ ─── Parse / InvalidRequest ──► 400 envelope
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   ProxyEngine    │  fast tier ──(all failed)──► full tier
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │  RelayResponse   │  upstream body verbatim, or -32603 envelope
//! └──────────────────┘
//! ```

pub mod engine;
pub mod errors;
pub mod response;
pub mod validation;

pub use engine::{ProxyEngine, Tier};
pub use errors::{panic_message, ProxyError};
pub use response::RelayResponse;
pub use validation::ValidatedRequest;
