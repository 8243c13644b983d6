/// Transport kernel - panel-agnostic HTTP plumbing
///
/// This module contains only transport logic and generic interfaces; no
/// backend-specific endpoint knowledge lives here.
///
/// - `RestClient`: unified HTTP client interface with per-panel timeouts
/// - `Session` / `SessionProvider`: pluggable authentication, cookie jar or
///   bearer token depending on the backend
///
/// Connectors under `panels/` compose these with their own endpoint maps.
pub mod rest;
pub mod session;

// Re-export key types for convenience
pub use rest::{Payload, RawResponse, ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use session::{Session, SessionProvider};
