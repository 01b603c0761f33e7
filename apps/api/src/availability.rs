use reqwest::Url;
use serde::Serialize;

/// Connection settings for the hosted table backend.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub url: Url,
    pub key: String,
}

/// Which persistence path the process runs with. Decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    Remote,
    Local,
}

impl RemoteSettings {
    /// Returns settings only when both values are present and well-formed.
    pub fn resolve(url: Option<&str>, key: Option<&str>) -> Option<Self> {
        if !is_remote_configured(url, key) {
            return None;
        }
        Some(Self {
            url: parse_base_url(url?)?,
            key: key?.trim().to_string(),
        })
    }
}

/// Pure predicate: is the remote backend configured?
pub fn is_remote_configured(url: Option<&str>, key: Option<&str>) -> bool {
    let url_ok = url.and_then(parse_base_url).is_some();
    let key_ok = key.map(|k| !k.trim().is_empty()).unwrap_or(false);
    url_ok && key_ok
}

fn parse_base_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    let scheme_ok = matches!(url.scheme(), "http" | "https");
    let host_ok = url.host_str().map(|h| !h.is_empty()).unwrap_or(false);
    (scheme_ok && host_ok).then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_present_and_valid() {
        assert!(is_remote_configured(
            Some("https://abc.supabase.co"),
            Some("anon-key")
        ));
    }

    #[test]
    fn test_missing_url_or_key() {
        assert!(!is_remote_configured(None, Some("anon-key")));
        assert!(!is_remote_configured(Some("https://abc.supabase.co"), None));
        assert!(!is_remote_configured(None, None));
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(!is_remote_configured(Some("https://abc.supabase.co"), Some("   ")));
    }

    #[test]
    fn test_malformed_url_rejected() {
        assert!(!is_remote_configured(Some("not a url"), Some("k")));
        assert!(!is_remote_configured(Some("ftp://files.example.com"), Some("k")));
        assert!(!is_remote_configured(Some(""), Some("k")));
    }

    #[test]
    fn test_resolve_agrees_with_predicate() {
        let cases = [
            (Some("https://abc.supabase.co"), Some("k")),
            (Some("https://abc.supabase.co"), Some(" ")),
            (Some("mailto:someone@example.com"), Some("k")),
            (None, Some("k")),
        ];
        for (url, key) in cases {
            assert_eq!(
                RemoteSettings::resolve(url, key).is_some(),
                is_remote_configured(url, key)
            );
        }
    }

    #[test]
    fn test_resolve_trims_key() {
        let settings = RemoteSettings::resolve(Some("http://localhost:54321"), Some(" k1 \n"))
            .expect("settings should resolve");
        assert_eq!(settings.key, "k1");
        assert_eq!(settings.url.host_str(), Some("localhost"));
    }
}
