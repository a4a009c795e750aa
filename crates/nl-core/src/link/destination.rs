//! Recovers a single human-readable destination from a stored canonical
//! URL, for building alternate-mode open URLs (e.g. the radio path).

use url::Url;

use super::normalizer::{
    decode_component, geo_coordinates, navigation_query, query_param, NAVIGATION_SCHEME,
};

/// Query parameters that carry the destination in `http(s)` maps URLs,
/// in priority order.
const DESTINATION_PARAMS: &[&str] = &["destination", "daddr", "q", "query"];

/// Path markers whose trailing segment names the destination.
const PATH_MARKERS: &[&str] = &["dir", "place"];

/// Extract a destination string from a canonical maps URL.
///
/// Returns `None` when the URL carries no recognizable destination.
pub fn extract_destination(url: &str) -> Option<String> {
    let uri = Url::parse(url.trim()).ok()?;
    match uri.scheme() {
        NAVIGATION_SCHEME => navigation_query(&uri),
        "geo" => query_param(&uri, "q").or_else(|| geo_coordinates(&uri)),
        "http" | "https" => extract_from_web_url(&uri),
        _ => None,
    }
}

fn extract_from_web_url(uri: &Url) -> Option<String> {
    for param in DESTINATION_PARAMS {
        if let Some(value) = query_param(uri, param) {
            return Some(value);
        }
    }

    let segments: Vec<&str> = uri.path_segments()?.collect();
    let marker_index = segments
        .iter()
        .position(|segment| PATH_MARKERS.contains(segment))?;

    // Everything after the marker is either the destination or routing
    // metadata; scan from the end so the most specific segment wins.
    segments[marker_index + 1..]
        .iter()
        .rev()
        .filter(|segment| !segment.is_empty() && !is_metadata_segment(segment))
        .find_map(|segment| decode_component(segment))
        .filter(|destination| !destination.is_empty())
}

/// Segments such as `@13.74,100.54,17z` or `data=!3m1!4b1` encode camera
/// position and routing state, not the destination.
fn is_metadata_segment(segment: &str) -> bool {
    segment.starts_with('@') || segment.starts_with("data=") || segment.contains('!')
}
