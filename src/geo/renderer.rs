//! Country path rendering.
//!
//! Builds one render pass of country paths and paints it to the egui canvas.

use super::{feature_name, identify, rasterize, CountryCollection, DrawPath, IsoCode, KeyRegistry, Projection};
use eframe::egui::{Color32, Mesh, Painter, Pos2, Rect, Shape, Stroke, Vec2};

/// One rendered country: identity, selection code and projected outline.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    pub identity: String,
    pub iso: Option<IsoCode>,
    /// Display name, for hover labels
    pub name: String,
    pub path: DrawPath,
}

/// Colors used to paint the map.
#[derive(Debug, Clone, Copy)]
pub struct MapStyle {
    pub ocean: Color32,
    pub stroke: Color32,
    pub fill_selected: Color32,
    pub fill_unselected: Color32,
    pub stroke_width: f32,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            ocean: Color32::from_rgb(0xE6, 0xF2, 0xFF),
            stroke: Color32::from_rgb(0xBF, 0xC8, 0xD6),
            fill_selected: Color32::from_rgb(0xF4, 0xA2, 0x61),
            fill_unselected: Color32::WHITE,
            stroke_width: 0.5,
        }
    }
}

/// Projects every feature and assigns render-pass identities.
pub fn build_path_entries(collection: &CountryCollection, projection: &Projection) -> Vec<PathEntry> {
    let mut seen = KeyRegistry::new();

    collection
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let identity = identify(feature, index, &mut seen);
            PathEntry {
                identity: identity.key,
                iso: identity.iso,
                name: feature_name(feature).to_string(),
                path: rasterize(feature, projection),
            }
        })
        .collect()
}

/// Finds the topmost entry under `pos` (viewport coordinates).
///
/// Entries are painted in order, so later entries win.
pub fn hit_test(entries: &[PathEntry], pos: Pos2) -> Option<&PathEntry> {
    entries.iter().rev().find(|entry| entry.path.contains(pos))
}

/// Paints all entries. `origin` is the screen position of the viewport's
/// top-left corner.
pub fn paint_paths(
    painter: &Painter,
    entries: &[PathEntry],
    origin: Vec2,
    style: &MapStyle,
    is_selected: impl Fn(&IsoCode) -> bool,
) {
    let clip = painter.clip_rect();
    let stroke = Stroke::new(style.stroke_width, style.stroke);

    for entry in entries {
        if entry.path.is_empty() {
            continue;
        }
        let fill = match &entry.iso {
            Some(iso) if is_selected(iso) => style.fill_selected,
            _ => style.fill_unselected,
        };

        for polygon in entry.path.polygons() {
            let rings: Vec<Vec<Pos2>> = polygon
                .iter()
                .map(|ring| ring.iter().map(|p| *p + origin).collect())
                .collect();
            let Some(exterior) = rings.first() else {
                continue;
            };
            if exterior.len() < 3 || !ring_visible(exterior, clip) {
                continue;
            }
            painter.add(Shape::mesh(fill_polygon(&rings, fill)));
            for ring in rings {
                painter.add(Shape::closed_line(ring, stroke));
            }
        }
    }
}

/// Quick bounding box check for visibility.
fn ring_visible(points: &[Pos2], clip: Rect) -> bool {
    let bounds = Rect::from_points(points);
    bounds.intersects(clip)
}

/// Triangulates one polygon (outer ring, then holes) into a flat-colored mesh.
///
/// Holes are passed to earcut as such and stay unpainted.
fn fill_polygon(rings: &[Vec<Pos2>], color: Color32) -> Mesh {
    let mut mesh = Mesh::default();

    let mut coords: Vec<f32> = Vec::new();
    let mut hole_starts: Vec<usize> = Vec::new();
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            hole_starts.push(coords.len() / 2);
        }
        coords.extend(ring.iter().flat_map(|p| [p.x, p.y]));
    }

    let indices = match earcutr::earcut(&coords, &hole_starts, 2) {
        Ok(ix) => ix,
        Err(_) => {
            log::debug!(
                "Polygon triangulation failed ({} rings, {} points)",
                rings.len(),
                coords.len() / 2
            );
            return mesh;
        }
    };

    for p in rings.iter().flatten() {
        mesh.colored_vertex(*p, color);
    }
    for tri in indices.chunks_exact(3) {
        mesh.add_triangle(tri[0] as u32, tri[1] as u32, tri[2] as u32);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::fit;
    use crate::geo::test_fixtures::three_countries;
    use std::collections::HashSet;

    fn fixture_pass() -> (Projection, Vec<PathEntry>) {
        let fc = three_countries();
        let fit = fit(200.0, 100.0, &fc);
        let projection = Projection::from_fit(&fit, 200.0, 100.0);
        let entries = build_path_entries(&fc, &projection);
        (projection, entries)
    }

    #[test]
    fn test_entries_follow_feature_order() {
        let (_, entries) = fixture_pass();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].identity, "UKR-804-0");
        assert_eq!(entries[1].identity, "FRA-250-1");
        assert_eq!(entries[2].identity, "UNK-x-2");
        assert!(entries[2].iso.is_none());

        let unique: HashSet<&str> = entries.iter().map(|e| e.identity.as_str()).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_hit_test_finds_country() {
        let (projection, entries) = fixture_pass();

        let kyiv = projection.project(geo_types::Coord { x: 30.5, y: 50.4 });
        let hit = hit_test(&entries, kyiv).unwrap();
        assert_eq!(hit.iso.as_ref().unwrap().as_str(), "UKR");

        // Corsica is the second ring of France
        let corsica = projection.project(geo_types::Coord { x: 9.0, y: 42.0 });
        assert_eq!(hit_test(&entries, corsica).unwrap().identity, "FRA-250-1");

        let atlantic = projection.project(geo_types::Coord { x: -30.0, y: 45.0 });
        assert!(hit_test(&entries, atlantic).is_none());
    }

    fn square(min: f32, max: f32) -> Vec<Pos2> {
        vec![
            Pos2::new(min, min),
            Pos2::new(max, min),
            Pos2::new(max, max),
            Pos2::new(min, max),
        ]
    }

    fn triangles(mesh: &Mesh) -> Vec<[Pos2; 3]> {
        mesh.indices
            .chunks_exact(3)
            .map(|t| [0, 1, 2].map(|k| mesh.vertices[t[k] as usize].pos))
            .collect()
    }

    fn area([a, b, c]: [Pos2; 3]) -> f32 {
        ((b - a).x * (c - a).y - (b - a).y * (c - a).x).abs() / 2.0
    }

    #[test]
    fn test_fill_polygon_triangulates_square() {
        let mesh = fill_polygon(&[square(0.0, 10.0)], Color32::WHITE);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn test_fill_polygon_leaves_hole_unpainted() {
        let mesh = fill_polygon(&[square(0.0, 10.0), square(4.0, 6.0)], Color32::WHITE);
        assert_eq!(mesh.vertices.len(), 8);

        let tris = triangles(&mesh);
        let painted: f32 = tris.iter().map(|t| area(*t)).sum();
        assert!((painted - 96.0).abs() < 1e-3, "painted area {}", painted);

        let hole = Rect::from_min_max(Pos2::new(4.0, 4.0), Pos2::new(6.0, 6.0));
        for [a, b, c] in tris {
            let centroid = Pos2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
            assert!(!hole.contains(centroid), "triangle inside hole at {:?}", centroid);
        }
    }
}
