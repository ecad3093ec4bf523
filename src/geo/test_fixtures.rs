//! Small hand-made datasets shared by the geometry and state tests.

use super::feature::Properties;
use super::{CountryCollection, CountryFeature};
use geo_types::{LineString, MultiPolygon, Polygon};

/// Axis-aligned lon/lat box as a closed polygon.
pub fn lon_lat_box(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (min_lon, min_lat),
            (max_lon, min_lat),
            (max_lon, max_lat),
            (min_lon, max_lat),
            (min_lon, min_lat),
        ]),
        Vec::new(),
    )
}

pub fn props(pairs: &[(&str, &str)]) -> Properties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect()
}

/// Ukraine, France (coded only through `ISO_A3_EH`) and an unnamed island.
pub fn three_countries() -> CountryCollection {
    CountryCollection::new(vec![
        CountryFeature::new(
            Some("804".to_string()),
            MultiPolygon(vec![lon_lat_box(22.0, 44.0, 40.0, 52.0)]),
            props(&[("ISO_A3", "UKR"), ("ADMIN", "Ukraine")]),
        ),
        CountryFeature::new(
            Some("250".to_string()),
            MultiPolygon(vec![
                lon_lat_box(-5.0, 42.0, 8.0, 51.0),
                lon_lat_box(8.5, 41.4, 9.6, 43.0),
            ]),
            props(&[("ISO_A3", "-99"), ("ISO_A3_EH", "FRA"), ("ADMIN", "France")]),
        ),
        CountryFeature::new(
            None,
            MultiPolygon(vec![lon_lat_box(-20.0, 60.0, -10.0, 66.0)]),
            props(&[("ISO_A3", "-99")]),
        ),
    ])
    .expect("fixture is non-empty")
}
