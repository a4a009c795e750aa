//! Destination-link handling: normalization of heterogeneous location
//! inputs into a canonical maps URL, short-link detection, and extraction
//! of a human-readable destination from a stored canonical URL.

pub mod destination;
pub mod normalizer;
pub mod shortlink;

pub use destination::extract_destination;
pub use normalizer::{is_coordinate_pair, normalize, MAPS_SEARCH_URL};
pub use shortlink::is_short_link;
