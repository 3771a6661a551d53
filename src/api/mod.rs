// =============================================================================
// HTTP API — REST snapshots and the WebSocket push feed
// =============================================================================

pub mod rest;
pub mod ws;

pub use rest::router;
