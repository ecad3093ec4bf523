//! Country feature data structures.

use super::GeoError;
use geo_types::{Coord, MultiPolygon};

/// Property bag attached to every feature (ISO codes, names, ...).
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A single country boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    /// Feature id from the source data, if any. Numeric ids are kept in
    /// their decimal string form.
    pub id: Option<String>,
    /// Boundary geometry. Plain polygons are stored as one-element multipolygons.
    pub geometry: MultiPolygon<f64>,
    /// Source properties.
    pub properties: Properties,
}

impl CountryFeature {
    pub fn new(id: Option<String>, geometry: MultiPolygon<f64>, properties: Properties) -> Self {
        Self {
            id,
            geometry,
            properties,
        }
    }

    /// Returns a string property, if present and a string.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    /// Iterates every ring of every polygon in input order
    /// (exterior first, then interiors).
    pub fn rings(&self) -> impl Iterator<Item = &[Coord<f64>]> {
        self.geometry.0.iter().flat_map(|polygon| {
            std::iter::once(polygon.exterior().0.as_slice())
                .chain(polygon.interiors().iter().map(|ring| ring.0.as_slice()))
        })
    }

    /// Iterates every vertex of the feature.
    pub fn coords(&self) -> impl Iterator<Item = &Coord<f64>> {
        self.rings().flat_map(|ring| ring.iter())
    }
}

/// Ordered, non-empty set of country features.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCollection {
    features: Vec<CountryFeature>,
}

impl CountryCollection {
    /// Wraps features into a collection, rejecting an empty set.
    pub fn new(features: Vec<CountryFeature>) -> Result<Self, GeoError> {
        if features.is_empty() {
            return Err(GeoError::MalformedTopology(
                "decoding produced no features".to_string(),
            ));
        }
        Ok(Self { features })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryFeature> {
        self.features.iter()
    }

    /// Iterates every vertex of every feature.
    pub fn coords(&self) -> impl Iterator<Item = &Coord<f64>> {
        self.features.iter().flat_map(|f| f.coords())
    }
}

#[cfg(test)]
impl CountryCollection {
    pub fn features(&self) -> &[CountryFeature] {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, LineString, Polygon};

    #[test]
    fn test_empty_collection_rejected() {
        let result = CountryCollection::new(Vec::new());
        assert!(matches!(result, Err(GeoError::MalformedTopology(_))));
    }

    #[test]
    fn test_rings_include_holes() {
        let exterior = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        let hole = LineString::from(vec![(2.0, 2.0), (3.0, 2.0), (3.0, 3.0), (2.0, 2.0)]);
        let with_hole = Polygon::new(exterior, vec![hole]);
        let plain = polygon![(x: 20.0, y: 0.0), (x: 21.0, y: 0.0), (x: 21.0, y: 1.0)];

        let feature = CountryFeature::new(
            None,
            MultiPolygon(vec![with_hole, plain]),
            Properties::new(),
        );

        assert_eq!(feature.rings().count(), 3);
        assert_eq!(feature.rings().next().map(|r| r[1].x), Some(10.0));
    }
}
