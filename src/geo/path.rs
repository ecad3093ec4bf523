//! Screen-space vector paths for country features.

use super::{CountryFeature, Projection};
use eframe::egui::Pos2;
use geo_types::LineString;
use std::fmt;

/// A single drawing command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Pos2),
    LineTo(Pos2),
    Close,
}

/// Sequence of drawing commands describing one feature on screen.
///
/// Formats as SVG path data (`M x,y L x,y Z`). The projected rings are kept
/// alongside the commands, grouped per polygon with the outer ring first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawPath {
    commands: Vec<PathCommand>,
    polygons: Vec<Vec<Vec<Pos2>>>,
}

impl DrawPath {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Polygons of the path. Each is its outer ring followed by its holes.
    pub fn polygons(&self) -> &[Vec<Vec<Pos2>>] {
        &self.polygons
    }

    /// Iterates every closed ring of screen points.
    pub fn rings(&self) -> impl Iterator<Item = &[Pos2]> {
        self.polygons
            .iter()
            .flat_map(|polygon| polygon.iter().map(|ring| ring.as_slice()))
    }

    /// Even-odd point-in-path test over all rings.
    ///
    /// Holes and overlapping parts cancel each other out, which matches how
    /// the filled path is painted.
    pub fn contains(&self, point: Pos2) -> bool {
        let mut inside = false;
        for ring in self.rings() {
            if ring.len() < 3 {
                continue;
            }
            let mut j = ring.len() - 1;
            for i in 0..ring.len() {
                let (a, b) = (ring[i], ring[j]);
                if (a.y > point.y) != (b.y > point.y)
                    && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
                {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }

    /// Emits the commands for one ring. Returns false for an empty ring.
    fn push_commands(&mut self, ring: &[Pos2]) -> bool {
        let Some((first, rest)) = ring.split_first() else {
            return false;
        };
        self.commands.push(PathCommand::MoveTo(*first));
        self.commands.extend(rest.iter().copied().map(PathCommand::LineTo));
        self.commands.push(PathCommand::Close);
        true
    }
}

impl fmt::Display for DrawPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            match command {
                PathCommand::MoveTo(p) => write!(f, "M{},{}", p.x, p.y)?,
                PathCommand::LineTo(p) => write!(f, "L{},{}", p.x, p.y)?,
                PathCommand::Close => write!(f, "Z")?,
            }
        }
        Ok(())
    }
}

/// Projects every ring of `feature` and emits move/line/close commands.
///
/// Vertices that do not project to finite screen positions are dropped; a
/// feature with nothing left produces an empty path rather than an error.
/// Holes of a polygon whose outer ring vanished are dropped with it.
pub fn rasterize(feature: &CountryFeature, projection: &Projection) -> DrawPath {
    let mut path = DrawPath::default();

    let project = |ring: &LineString<f64>| -> Vec<Pos2> {
        ring.0
            .iter()
            .map(|c| projection.project(*c))
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect()
    };

    for polygon in feature.geometry.iter() {
        let exterior = project(polygon.exterior());
        if !path.push_commands(&exterior) {
            continue;
        }
        let mut rings = vec![exterior];
        for hole in polygon.interiors() {
            let ring = project(hole);
            if path.push_commands(&ring) {
                rings.push(ring);
            }
        }
        path.polygons.push(rings);
    }

    path
}

#[cfg(test)]
impl DrawPath {
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::test_fixtures::{lon_lat_box, three_countries};
    use crate::geo::feature::Properties;
    use crate::geo::fit;
    use eframe::egui::Vec2;
    use geo_types::{LineString, MultiPolygon, Polygon};

    fn unit_projection() -> Projection {
        // One degree maps to one pixel, origin at (100, 100)
        Projection::new(180.0 / std::f64::consts::PI, Vec2::new(100.0, 100.0), 200.0, 200.0)
    }

    #[test]
    fn test_commands_per_ring() {
        let feature = CountryFeature::new(
            None,
            MultiPolygon(vec![lon_lat_box(0.0, 0.0, 10.0, 10.0), lon_lat_box(20.0, 0.0, 30.0, 10.0)]),
            Properties::new(),
        );

        let path = rasterize(&feature, &unit_projection());
        let commands = path.commands();

        // Two closed rings of five vertices each
        assert_eq!(commands.len(), 2 * (5 + 1));
        assert!(matches!(commands[0], PathCommand::MoveTo(_)));
        assert!(matches!(commands[1], PathCommand::LineTo(_)));
        assert_eq!(commands[5], PathCommand::Close);
        assert!(matches!(commands[6], PathCommand::MoveTo(p) if (p.x - 120.0).abs() < 1e-3));
        assert_eq!(path.rings().count(), 2);
        assert_eq!(path.polygons().len(), 2);
    }

    #[test]
    fn test_svg_formatting() {
        let feature = CountryFeature::new(
            None,
            MultiPolygon(vec![lon_lat_box(0.0, 0.0, 10.0, 10.0)]),
            Properties::new(),
        );
        let svg = rasterize(&feature, &unit_projection()).to_string();
        assert!(svg.starts_with("M100,100L110,100"));
        assert!(svg.ends_with('Z'));
    }

    #[test]
    fn test_non_finite_projection_yields_empty_path() {
        let feature = CountryFeature::new(
            None,
            MultiPolygon(vec![lon_lat_box(0.0, 0.0, 10.0, 10.0)]),
            Properties::new(),
        );
        let broken = Projection::new(f64::NAN, Vec2::ZERO, 10.0, 10.0);

        let path = rasterize(&feature, &broken);
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_contains() {
        let feature = CountryFeature::new(
            None,
            MultiPolygon(vec![lon_lat_box(0.0, 0.0, 10.0, 10.0)]),
            Properties::new(),
        );
        let path = rasterize(&feature, &unit_projection());

        // Latitude grows upward, so the box spans y in 90..100
        assert!(path.contains(Pos2::new(105.0, 95.0)));
        assert!(!path.contains(Pos2::new(105.0, 105.0)));
        assert!(!path.contains(Pos2::new(115.0, 95.0)));
    }

    #[test]
    fn test_hole_groups_with_its_polygon() {
        let outer = lon_lat_box(0.0, 0.0, 10.0, 10.0);
        let hole = LineString::from(vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)]);
        let feature = CountryFeature::new(
            None,
            MultiPolygon(vec![
                Polygon::new(outer.exterior().clone(), vec![hole]),
                lon_lat_box(20.0, 0.0, 30.0, 10.0),
            ]),
            Properties::new(),
        );
        let path = rasterize(&feature, &unit_projection());

        let polygons = path.polygons();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].len(), 2);
        assert_eq!(polygons[1].len(), 1);
        assert_eq!(path.rings().count(), 3);

        // Box spans y 90..100 on screen, the hole y 94..96
        assert!(path.contains(Pos2::new(102.0, 95.0)));
        assert!(!path.contains(Pos2::new(105.0, 95.0)));
    }

    #[test]
    fn test_fitted_fixture_paths_are_non_empty() {
        let fc = three_countries();
        let fit = fit(200.0, 100.0, &fc);
        let projection = Projection::from_fit(&fit, 200.0, 100.0);

        for feature in fc.iter() {
            assert!(!rasterize(feature, &projection).to_string().is_empty());
        }
    }
}
