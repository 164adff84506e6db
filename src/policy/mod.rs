// src/policy/mod.rs
// =============================================================================
// Scope decisions: which URLs we may crawl and which ones we download.
//
// Submodules:
// - domain: allow-listed hosts (exact or wildcard)
// - matcher: target file type + domain scope
// - robots: optional robots.txt enforcement
// =============================================================================

mod domain;
mod matcher;
mod robots;

pub use domain::DomainPolicy;
pub use matcher::ResourceMatcher;
pub use robots::RobotsGate;
