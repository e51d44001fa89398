//! HTTP adapter over a lamp pool.
//!
//! Enabled with the `server` feature. Exposes:
//!
//! - `GET /api/frame?id=N` - next frame of lamp `N` (default 0)
//! - `GET /api/random?bytes=N&lamp=<id|all>` - combined random bytes, at most
//!   [`MAX_REQUEST_BYTES`](crate::pool::MAX_REQUEST_BYTES)
//! - `GET /metrics` - Prometheus text format
//! - `GET /health` - liveness
//!
//! Binary payloads are returned as lowercase hex.

mod http;

pub use http::{ApiError, ApiServer, FrameResponse, RandomResponse, ServerConfig, ServerError};
