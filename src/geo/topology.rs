//! Boundary dataset decoding.
//!
//! Country outlines ship as a TopoJSON topology: polygons reference shared,
//! optionally quantized arcs instead of carrying their own coordinates. The
//! loader expands the first named object of the topology into standalone
//! country features.

use super::feature::{CountryCollection, CountryFeature, Properties};
use super::GeoError;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{GeoJson, Value as GeoJsonValue};
use serde::Deserialize;
use serde_json::Value;

/// Quantization transform of a topology.
#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: serde_json::Map<String, Value>,
}

/// Geometry object as it appears inside a topology.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Properties>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        properties: Option<Properties>,
    },
    GeometryCollection {
        #[serde(default)]
        geometries: Vec<Value>,
    },
    #[serde(other)]
    Unsupported,
}

/// Decodes a TopoJSON topology into country features.
///
/// Only the first named object is used. Fails when the topology has no
/// objects, references arcs that do not exist, or yields no polygons.
pub fn load_topology(text: &str) -> Result<CountryCollection, GeoError> {
    let topology: Topology = serde_json::from_str(text)
        .map_err(|e| GeoError::MalformedTopology(format!("invalid JSON: {}", e)))?;

    if topology.kind != "Topology" {
        return Err(GeoError::MalformedTopology(format!(
            "expected a Topology, found {}",
            topology.kind
        )));
    }

    let (name, object) = topology
        .objects
        .iter()
        .next()
        .ok_or_else(|| GeoError::MalformedTopology("topology has no objects".to_string()))?;

    let arcs = decode_arcs(&topology.arcs, topology.transform)?;

    let mut features = Vec::new();
    collect_features(object, &arcs, &mut features)?;

    log::info!(
        "Decoded {} feature(s) from topology object '{}' ({} arcs)",
        features.len(),
        name,
        arcs.len()
    );

    CountryCollection::new(features)
}

/// Loads an already expanded GeoJSON FeatureCollection.
pub fn load_geojson(text: &str) -> Result<CountryCollection, GeoError> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| GeoError::MalformedTopology(format!("Failed to parse GeoJSON: {}", e)))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .filter_map(|feature| {
                let geometry = convert_geojson_geometry(&feature.geometry?.value)?;
                let id = feature.id.map(|id| match id {
                    geojson::feature::Id::String(s) => s,
                    geojson::feature::Id::Number(n) => n.to_string(),
                });
                Some(CountryFeature::new(
                    id,
                    geometry,
                    feature.properties.unwrap_or_default(),
                ))
            })
            .collect(),
        _ => {
            return Err(GeoError::MalformedTopology(
                "expected a FeatureCollection".to_string(),
            ))
        }
    };

    CountryCollection::new(features)
}

fn convert_geojson_geometry(value: &GeoJsonValue) -> Option<MultiPolygon<f64>> {
    let to_polygon = |rings: &Vec<Vec<Vec<f64>>>| -> Option<Polygon<f64>> {
        let mut rings = rings.iter().map(|ring| {
            LineString::from(
                ring.iter()
                    .filter(|c| c.len() >= 2)
                    .map(|c| Coord { x: c[0], y: c[1] })
                    .collect::<Vec<_>>(),
            )
        });
        let exterior = rings.next()?;
        Some(Polygon::new(exterior, rings.collect()))
    };

    match value {
        GeoJsonValue::Polygon(rings) => to_polygon(rings).map(|p| MultiPolygon(vec![p])),
        GeoJsonValue::MultiPolygon(polygons) => {
            let polygons: Vec<Polygon<f64>> = polygons.iter().filter_map(to_polygon).collect();
            if polygons.is_empty() {
                None
            } else {
                Some(MultiPolygon(polygons))
            }
        }
        _ => None,
    }
}

/// Expands every arc into absolute coordinates.
fn decode_arcs(
    raw: &[Vec<Vec<f64>>],
    transform: Option<Transform>,
) -> Result<Vec<Vec<Coord<f64>>>, GeoError> {
    raw.iter()
        .enumerate()
        .map(|(arc_idx, positions)| {
            let mut x = 0.0;
            let mut y = 0.0;
            positions
                .iter()
                .map(|position| {
                    if position.len() < 2 {
                        return Err(GeoError::MalformedTopology(format!(
                            "arc {} has a position with fewer than 2 values",
                            arc_idx
                        )));
                    }
                    match transform {
                        // Quantized arcs are delta-encoded
                        Some(t) => {
                            x += position[0];
                            y += position[1];
                            Ok(Coord {
                                x: x * t.scale[0] + t.translate[0],
                                y: y * t.scale[1] + t.translate[1],
                            })
                        }
                        None => Ok(Coord {
                            x: position[0],
                            y: position[1],
                        }),
                    }
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

/// Stitches arc references into one ring.
///
/// A negative index `i` refers to arc `!i` traversed backwards. Adjacent arcs
/// share their joining point, so it is only emitted once.
fn stitch_ring(refs: &[i64], arcs: &[Vec<Coord<f64>>]) -> Result<Vec<Coord<f64>>, GeoError> {
    let mut ring: Vec<Coord<f64>> = Vec::new();

    for &arc_ref in refs {
        let (index, reversed) = if arc_ref < 0 {
            (!arc_ref, true)
        } else {
            (arc_ref, false)
        };

        let arc = usize::try_from(index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or_else(|| {
                GeoError::MalformedTopology(format!("arc reference {} is out of range", arc_ref))
            })?;

        if !ring.is_empty() {
            ring.pop();
        }

        if reversed {
            ring.extend(arc.iter().rev().copied());
        } else {
            ring.extend(arc.iter().copied());
        }
    }

    Ok(ring)
}

fn build_polygon(
    rings: &[Vec<i64>],
    arcs: &[Vec<Coord<f64>>],
) -> Result<Option<Polygon<f64>>, GeoError> {
    let mut decoded = rings
        .iter()
        .map(|refs| stitch_ring(refs, arcs).map(LineString::from))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();

    Ok(decoded
        .next()
        .map(|exterior| Polygon::new(exterior, decoded.collect())))
}

fn feature_id(id: Option<&Value>) -> Option<String> {
    match id? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn collect_features(
    object: &Value,
    arcs: &[Vec<Coord<f64>>],
    out: &mut Vec<CountryFeature>,
) -> Result<(), GeoError> {
    let geometry = match serde_json::from_value::<TopoGeometry>(object.clone()) {
        Ok(geometry) => geometry,
        Err(e) => {
            log::warn!("Skipping unreadable topology geometry: {}", e);
            return Ok(());
        }
    };

    match geometry {
        TopoGeometry::Polygon {
            arcs: rings,
            id,
            properties,
        } => {
            if let Some(polygon) = build_polygon(&rings, arcs)? {
                out.push(CountryFeature::new(
                    feature_id(id.as_ref()),
                    MultiPolygon(vec![polygon]),
                    properties.unwrap_or_default(),
                ));
            }
        }
        TopoGeometry::MultiPolygon {
            arcs: polygons,
            id,
            properties,
        } => {
            let mut parts = Vec::with_capacity(polygons.len());
            for rings in &polygons {
                if let Some(polygon) = build_polygon(rings, arcs)? {
                    parts.push(polygon);
                }
            }
            if !parts.is_empty() {
                out.push(CountryFeature::new(
                    feature_id(id.as_ref()),
                    MultiPolygon(parts),
                    properties.unwrap_or_default(),
                ));
            }
        }
        TopoGeometry::GeometryCollection { geometries } => {
            for child in &geometries {
                collect_features(child, arcs, out)?;
            }
        }
        TopoGeometry::Unsupported => {}
    }

    Ok(())
}
