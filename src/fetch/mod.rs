// src/fetch/mod.rs
// =============================================================================
// Everything that talks to the network.
//
// Submodules:
// - transport: a single HTTP GET (reqwest), behind the Transport trait
// - retry: retry budget and backoff schedule
// - fetcher: retries a transport and hands back bytes or a typed error
// =============================================================================

mod fetcher;
mod retry;
mod transport;

pub use fetcher::{Document, Fetcher};
pub use retry::RetryPolicy;
pub use transport::{Fetched, HttpTransport, SessionConfig, Transport};
