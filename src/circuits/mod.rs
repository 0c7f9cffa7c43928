// Circuit geography module
// Fetches circuit layouts and static metadata and derives the positions the
// map view needs

pub mod source;
pub mod types;

// Re-export commonly used types
pub use source::{CircuitSource, DEFAULT_CIRCUITS_URL};
pub use types::{CircuitMap, GeoBounds, GeoPoint, country_for_id, find_circuit};
