// src/policy/domain.rs
// =============================================================================
// Decides whether a URL belongs to the crawl's allowed scope.
//
// Allowed domains are configured once at startup and never change. Each entry
// is either:
// - an exact host:      "blackhat.com"   matches only blackhat.com
// - a wildcard suffix:  "*.blackhat.com" matches blackhat.com, www.blackhat.com,
//                       a.b.blackhat.com (but not notblackhat.com)
//
// Anything we cannot parse, or that has no host (mailto:, data:), is simply
// not allowed. This check never fails loudly.
// =============================================================================

use url::Url;

// One entry of the allow list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainPattern {
    Exact(String),
    /// Stored without the leading "*."
    Wildcard(String),
}

impl DomainPattern {
    // Parses "example.com" or "*.example.com" (case-insensitive)
    pub fn parse(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim().trim_end_matches('.').to_ascii_lowercase();

        if let Some(suffix) = pattern.strip_prefix("*.") {
            if suffix.is_empty() || suffix.contains('*') {
                return None;
            }
            return Some(DomainPattern::Wildcard(suffix.to_string()));
        }

        if pattern.is_empty() || pattern.contains('*') || pattern.contains('/') {
            return None;
        }
        Some(DomainPattern::Exact(pattern))
    }

    // `host` must already be lowercase (url::Url guarantees this)
    pub fn matches(&self, host: &str) -> bool {
        match self {
            DomainPattern::Exact(domain) => host == domain,
            DomainPattern::Wildcard(suffix) => {
                host == suffix
                    || host
                        .strip_suffix(suffix.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
        }
    }
}

// The immutable allow list
#[derive(Debug, Clone, Default)]
pub struct DomainPolicy {
    patterns: Vec<DomainPattern>,
}

impl DomainPolicy {
    // Builds a policy from raw strings, returning the first bad entry as error
    pub fn from_patterns<S: AsRef<str>>(raw: &[S]) -> Result<Self, String> {
        let mut patterns = Vec::with_capacity(raw.len());
        for entry in raw {
            let entry = entry.as_ref();
            match DomainPattern::parse(entry) {
                Some(pattern) => patterns.push(pattern),
                None => return Err(format!("invalid domain pattern '{}'", entry)),
            }
        }
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[DomainPattern] {
        &self.patterns
    }

    // Accepts any string; unparseable input is never allowed
    pub fn is_allowed(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => self.is_allowed_url(&parsed),
            Err(_) => false,
        }
    }

    pub fn is_allowed_url(&self, url: &Url) -> bool {
        // Only web URLs can be fetched
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        match url.host_str() {
            Some(host) => {
                let host = host.trim_end_matches('.');
                self.patterns.iter().any(|pattern| pattern.matches(host))
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(raw: &[&str]) -> DomainPolicy {
        DomainPolicy::from_patterns(raw).unwrap()
    }

    #[test]
    fn test_exact_match() {
        let p = policy(&["x.test"]);
        assert!(p.is_allowed("https://x.test/index"));
        assert!(!p.is_allowed("https://www.x.test/index"));
        assert!(!p.is_allowed("https://evil.test/bad.pdf"));
    }

    #[test]
    fn test_wildcard_matches_subdomains_and_apex() {
        let p = policy(&["*.example.com"]);
        assert!(p.is_allowed("https://example.com/"));
        assert!(p.is_allowed("https://a.example.com/"));
        assert!(p.is_allowed("https://a.b.example.com/doc.pdf"));
        assert!(!p.is_allowed("https://badexample.com/"));
        assert!(!p.is_allowed("https://example.com.evil.test/"));
    }

    #[test]
    fn test_host_case_is_ignored() {
        let p = policy(&["Example.COM"]);
        assert!(p.is_allowed("https://EXAMPLE.com/page"));
    }

    #[test]
    fn test_malformed_urls_are_rejected() {
        let p = policy(&["x.test"]);
        assert!(!p.is_allowed("not a url"));
        assert!(!p.is_allowed(""));
        assert!(!p.is_allowed("mailto:someone@x.test"));
        assert!(!p.is_allowed("ftp://x.test/file.pdf"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(DomainPattern::parse("").is_none());
        assert!(DomainPattern::parse("*.").is_none());
        assert!(DomainPattern::parse("a.*.com").is_none());
        assert!(DomainPolicy::from_patterns(&["ok.test", "bad/one"]).is_err());
    }

    #[test]
    fn test_empty_policy_allows_nothing() {
        let p = DomainPolicy::default();
        assert!(!p.is_allowed("https://x.test/"));
    }
}
