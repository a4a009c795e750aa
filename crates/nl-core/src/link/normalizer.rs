//! Turns arbitrary user input into a canonical "open maps" URL.
//!
//! Accepted inputs, in priority order: a `geo:` URI, a navigation-intent
//! URI, an `http(s)` link (passed through), a bare coordinate pair, or
//! free text. Anything unparseable becomes a search-term URL; nothing
//! here panics on malformed input.

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use url::Url;

/// Prefix of the canonical search URL; the query term is appended
/// percent-encoded.
pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Android-style navigation intent scheme, e.g. `google.navigation:q=Siam+Paragon`.
pub const NAVIGATION_SCHEME: &str = "google.navigation";

/// Reserved characters escaped inside the query term. Commas, dots and
/// minus signs stay literal so coordinate pairs survive unchanged.
const QUERY_TERM: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'=')
    .add(b'\x7f');

static COORD_RE: Lazy<Regex> = Lazy::new(|| {
    // Compile-checked pattern; cannot fail at runtime.
    Regex::new(r"^-?\d+(\.\d*)?,-?\d+(\.\d*)?$").expect("coordinate regex")
});

/// True for bare latitude,longitude input such as `13.7563,100.5018`.
pub fn is_coordinate_pair(text: &str) -> bool {
    COORD_RE.is_match(text.trim())
}

/// Normalize arbitrary text or a URI into a canonical maps URL.
///
/// Returns `None` when the input is empty or a recognized scheme carries
/// no usable location (a normalization failure, not an error).
pub fn normalize(raw: &str) -> Option<String> {
    let input = raw.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(uri) = Url::parse(input) {
        match uri.scheme() {
            "geo" => return normalize_geo(&uri),
            NAVIGATION_SCHEME => return navigation_query(&uri).map(|q| search_url(&q)),
            // Already a web link; treated as a maps link and passed through.
            "http" | "https" => return Some(input.to_string()),
            _ => {}
        }
    }

    // Coordinate pair or free text: both become a search-term URL.
    Some(search_url(input))
}

/// Build the canonical search URL for a raw query term.
pub(crate) fn search_url(term: &str) -> String {
    format!("{}{}", MAPS_SEARCH_URL, utf8_percent_encode(term, QUERY_TERM))
}

/// `geo:lat,lng?q=term`: prefer the search term, else the coordinates
/// from the scheme-specific part (anything after `;` is a parameter such
/// as `u=` accuracy and is dropped).
fn normalize_geo(uri: &Url) -> Option<String> {
    if let Some(q) = query_param(uri, "q") {
        return Some(search_url(&q));
    }
    let coords = geo_coordinates(uri)?;
    Some(search_url(&coords))
}

pub(crate) fn geo_coordinates(uri: &Url) -> Option<String> {
    let part = uri.path();
    let coords = part.split(';').next().unwrap_or(part).trim();
    if is_coordinate_pair(coords) {
        Some(coords.to_string())
    } else {
        None
    }
}

/// Extract the `q` parameter from a navigation-intent URI. Intents are
/// written both as `google.navigation:q=term` (no `?`, the parameter
/// lives in the scheme-specific part) and `google.navigation:?q=term`.
pub(crate) fn navigation_query(uri: &Url) -> Option<String> {
    if let Some(q) = query_param(uri, "q") {
        return Some(q);
    }
    let part = uri.path();
    let value = part.strip_prefix("q=")?;
    decode_component(value).filter(|v| !v.is_empty())
}

/// First value of a query parameter, form-decoded.
pub(crate) fn query_param(uri: &Url, name: &str) -> Option<String> {
    uri.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Form-style decode: `+` as space, then percent-unescape.
pub(crate) fn decode_component(value: &str) -> Option<String> {
    let spaced = value.replace('+', " ");
    percent_encoding::percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
