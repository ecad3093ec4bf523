//! Country geometry: loading, projection, path building and identity.
//!
//! This module turns a bundled boundary dataset into screen-space paths
//! that the map canvas paints and hit-tests.

mod feature;
mod identity;
mod path;
mod projection;
mod renderer;
mod topology;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use feature::{CountryCollection, CountryFeature};
pub use identity::{feature_name, identify, IsoCode, KeyRegistry};
pub use path::{rasterize, DrawPath};
pub use projection::{fit, Fit, Projection};
pub use renderer::{build_path_entries, hit_test, paint_paths, MapStyle, PathEntry};
pub use topology::{load_geojson, load_topology};

/// Errors that can occur while loading boundary geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoError {
    /// The input is not a usable topology or feature collection.
    MalformedTopology(String),
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::MalformedTopology(msg) => write!(f, "Malformed topology: {}", msg),
        }
    }
}

impl std::error::Error for GeoError {}
