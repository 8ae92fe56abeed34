//! Geographic projection and screen remapping for route lines.
//!
//! Route geometry arrives as WGS84 longitude/latitude pairs. Drawing it takes
//! two steps:
//!
//! 1. [`project`] converts each [`Coordinate`] to Web Mercator (EPSG:3857)
//!    meters so that distances look right at city scale.
//! 2. [`remap_points`] fits the projected points into a pixel rectangle with
//!    padding. Each axis is scaled independently from its own min/max. The
//!    y-axis is inverted because screen y grows downwards while northing grows
//!    upwards.
//!
//! # Degenerate Input
//!
//! An axis whose points all share one value has no spread to scale. Those
//! points land on the rectangle's midline for that axis, the same way a flat
//! sparkline is drawn through the vertical center. Empty input gives empty
//! output.

use embedded_graphics::prelude::{Point, Size};

/// WGS84 semi-major axis in meters, the sphere radius used by Web Mercator.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A geographic position in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self { Self { lon, lat } }
}

/// A 2D point, in projected meters or in pixels depending on the stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

    /// Round to the nearest pixel.
    pub fn to_pixel(self) -> Point { Point::new(self.x.round() as i32, self.y.round() as i32) }
}

/// Project a WGS84 coordinate to Web Mercator meters.
///
/// Latitudes near the poles are not clamped. The projection diverges there,
/// and transit stops never get that far.
pub fn project(coord: Coordinate) -> PlanarPoint {
    let x = EARTH_RADIUS_M * coord.lon.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + coord.lat.to_radians() / 2.0).tan().ln();
    PlanarPoint::new(x, y)
}

/// Inclusive min/max of one axis.
#[derive(Clone, Copy, Debug)]
struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc: Option<Self>, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(b) => Some(Self {
                min: b.min.min(v),
                max: b.max.max(v),
            }),
        })
    }

    /// Position of `v` inside the bounds as 0.0..=1.0, or `None` with zero spread.
    #[inline]
    fn normalize(&self, v: f64) -> Option<f64> {
        let span = self.max - self.min;
        (span > 0.0).then(|| (v - self.min) / span)
    }
}

/// Fit `points` into a `size` rectangle leaving `padding` pixels on every side.
///
/// Output keeps input order and length. Every x lands in
/// `[padding, width - padding]` and every y in `[padding, height - padding]`.
/// The largest input y maps to the top edge (`padding`).
pub fn remap_points(points: &[PlanarPoint], size: Size, padding: f64) -> Vec<PlanarPoint> {
    let (Some(xb), Some(yb)) = (
        Bounds::of(points.iter().map(|p| p.x)),
        Bounds::of(points.iter().map(|p| p.y)),
    ) else {
        return Vec::new();
    };

    let width = f64::from(size.width);
    let height = f64::from(size.height);
    let inner_w = width - 2.0 * padding;
    let inner_h = height - 2.0 * padding;

    points
        .iter()
        .map(|p| {
            let x = xb.normalize(p.x).map_or(width / 2.0, |t| padding + t * inner_w);
            let y = yb.normalize(p.y).map_or(height / 2.0, |t| height - padding - t * inner_h);
            PlanarPoint::new(x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    // -------------------------------------------------------------------------
    // Projection Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_project_origin() {
        let p = project(Coordinate::new(0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_project_known_point() {
        // Tampere central square, reference values from EPSG:3857
        let p = project(Coordinate::new(23.7610, 61.4978));
        assert_relative_eq!(p.x, 2_645_062.4, max_relative = 1e-6);
        assert_relative_eq!(p.y, 8_741_032.2, max_relative = 1e-6);
    }

    #[test]
    fn test_project_is_deterministic() {
        let coord = Coordinate::new(23.85, 61.45);
        assert_eq!(project(coord), project(coord));
    }

    #[test]
    fn test_project_preserves_orientation() {
        let west = project(Coordinate::new(23.0, 61.0));
        let east = project(Coordinate::new(24.0, 61.0));
        let north = project(Coordinate::new(23.0, 62.0));
        assert!(east.x > west.x, "east should have larger x");
        assert!(north.y > west.y, "north should have larger y");
    }

    // -------------------------------------------------------------------------
    // Remap Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_remap_empty() {
        assert!(remap_points(&[], Size::new(100, 100), 10.0).is_empty());
    }

    #[test]
    fn test_remap_corners() {
        let points = [PlanarPoint::new(0.0, 0.0), PlanarPoint::new(50.0, 200.0)];
        let out = remap_points(&points, Size::new(300, 200), 20.0);

        // Min x -> left padding, min y -> bottom (inverted)
        assert_relative_eq!(out[0].x, 20.0);
        assert_relative_eq!(out[0].y, 180.0);
        // Max x -> right padding, max y -> top padding
        assert_relative_eq!(out[1].x, 280.0);
        assert_relative_eq!(out[1].y, 20.0);
    }

    #[test]
    fn test_remap_stays_within_padding() {
        let points: Vec<_> = (0..25)
            .map(|i| {
                let t = f64::from(i);
                PlanarPoint::new(t * 13.7 - 40.0, (t * 0.7).sin() * 500.0)
            })
            .collect();
        let (w, h, pad) = (360.0, 240.0, 24.0);
        let out = remap_points(&points, Size::new(360, 240), pad);

        assert_eq!(out.len(), points.len());
        for p in &out {
            assert!(p.x >= pad - 1e-9 && p.x <= w - pad + 1e-9, "x out of range: {}", p.x);
            assert!(p.y >= pad - 1e-9 && p.y <= h - pad + 1e-9, "y out of range: {}", p.y);
        }
    }

    #[test]
    fn test_remap_preserves_order() {
        let points = [
            PlanarPoint::new(3.0, 1.0),
            PlanarPoint::new(1.0, 2.0),
            PlanarPoint::new(2.0, 3.0),
        ];
        let out = remap_points(&points, Size::new(100, 100), 0.0);
        assert!(out[1].x < out[2].x && out[2].x < out[0].x);
        assert!(out[2].y < out[1].y && out[1].y < out[0].y);
    }

    #[test]
    fn test_remap_flat_x_maps_to_midline() {
        let points = [PlanarPoint::new(5.0, 0.0), PlanarPoint::new(5.0, 10.0)];
        let out = remap_points(&points, Size::new(200, 100), 10.0);
        assert_relative_eq!(out[0].x, 100.0);
        assert_relative_eq!(out[1].x, 100.0);
        assert!(out.iter().all(|p| p.y.is_finite()));
    }

    #[test]
    fn test_remap_single_point_maps_to_center() {
        let out = remap_points(&[PlanarPoint::new(1.0, 1.0)], Size::new(80, 60), 6.0);
        assert_eq!(out, vec![PlanarPoint::new(40.0, 30.0)]);
    }

    #[test]
    fn test_to_pixel_rounds() {
        assert_eq!(PlanarPoint::new(1.4, 2.6).to_pixel(), Point::new(1, 3));
    }
}
