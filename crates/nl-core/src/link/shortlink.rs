//! Short-link detection for the mapping provider's URL shorteners.

use url::Url;

/// Shortener hosts that require HTTP resolution before the destination
/// can be inspected.
const SHORTENER_HOSTS: &[&str] = &["maps.app.goo.gl", "goo.gl"];

/// True when the URL's host is a known maps link shortener.
pub fn is_short_link(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    match parsed.host_str() {
        Some(host) => SHORTENER_HOSTS
            .iter()
            .any(|candidate| host.eq_ignore_ascii_case(candidate)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_shortener_hosts() {
        assert!(is_short_link("https://maps.app.goo.gl/AbCdEf123"));
        assert!(is_short_link("https://goo.gl/maps/XyZ"));
        assert!(is_short_link("https://MAPS.APP.GOO.GL/AbCdEf123"));
    }

    #[test]
    fn rejects_other_hosts_and_garbage() {
        assert!(!is_short_link("https://www.google.com/maps/search/?api=1&query=x"));
        assert!(!is_short_link("https://example.goo.gl.evil.com/x"));
        assert!(!is_short_link("not a url"));
        assert!(!is_short_link("geo:13.7,100.5"));
    }
}
