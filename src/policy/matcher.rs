// src/policy/matcher.rs
// =============================================================================
// Decides whether a discovered link is a file we should download.
//
// A link is a target when BOTH hold:
// 1. its path ends with the configured extension (".pdf" by default),
//    ignoring case and ignoring the query string
// 2. the domain policy allows its host
// =============================================================================

use super::DomainPolicy;
use url::Url;

#[derive(Debug, Clone)]
pub struct ResourceMatcher {
    /// Lowercase, always starting with '.'
    suffix: String,
    domains: DomainPolicy,
}

impl ResourceMatcher {
    // `extension` may be given as "pdf" or ".pdf"
    pub fn new(extension: &str, domains: DomainPolicy) -> Self {
        let extension = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        Self {
            suffix: format!(".{}", extension),
            domains,
        }
    }

    pub fn is_target_resource(&self, url: &Url) -> bool {
        self.has_target_extension(url) && self.domains.is_allowed_url(url)
    }

    fn has_target_extension(&self, url: &Url) -> bool {
        let path = url.path();
        // "/.pdf" is a hidden file, not a document
        path.len() > self.suffix.len()
            && !path.ends_with(&format!("/{}", self.suffix))
            && path.to_ascii_lowercase().ends_with(&self.suffix)
    }
}
