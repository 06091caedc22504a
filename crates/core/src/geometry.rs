//! Coordinate conversion between grid space and floor pixel space
//!
//! Nodes are stored in a normalized grid: both axes run from 0 to 100,
//! origin at the top-left, Y growing downwards. Floor images are shown in
//! a pixel space whose Y axis grows upwards from the bottom edge, so every
//! conversion flips Y.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Upper bound of both grid axes
pub const GRID_MAX: f64 = 100.0;

/// Decimal places kept when converting back into grid space
pub const GRID_PRECISION: u32 = 2;

/// A point in normalized grid space (0-100 on both axes, Y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    /// Create a new grid point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another grid point
    pub fn distance_to(&self, other: &GridPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Whether both axes are inside [0, 100]
    pub fn in_bounds(&self) -> bool {
        (0.0..=GRID_MAX).contains(&self.x) && (0.0..=GRID_MAX).contains(&self.y)
    }

    /// Whether both axes are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// This point constrained to the grid
    pub fn clamped(&self) -> Self {
        clamp_grid_point(*self)
    }
}

/// A point in a floor's native pixel space (Y up from the bottom edge)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapPoint {
    /// Vertical pixel offset from the bottom edge
    pub lat: f64,
    /// Horizontal pixel offset from the left edge
    pub lng: f64,
}

impl MapPoint {
    /// Create a new map point
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both axes are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Native pixel size of a floor image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorDimensions {
    pub width: f64,
    pub height: f64,
}

impl FloorDimensions {
    /// Create new dimensions
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both sides are finite and strictly positive
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

fn usable(
    dimensions: Option<FloorDimensions>,
    operation: &'static str,
) -> GraphResult<FloorDimensions> {
    match dimensions {
        Some(dims) if dims.is_usable() => Ok(dims),
        _ => Err(GraphError::MissingFloorDimensions { operation }),
    }
}

/// Round `value` to `decimals` decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Convert a grid point into the floor's pixel space.
///
/// Fails when the floor has no usable dimensions, rather than producing
/// NaN or infinite coordinates.
pub fn grid_to_map(point: GridPoint, dimensions: Option<FloorDimensions>) -> GraphResult<MapPoint> {
    let dims = usable(dimensions, "grid_to_map")?;
    if !point.is_finite() {
        return Err(GraphError::validation(format!(
            "grid_to_map: ({}, {}) is not a finite point",
            point.x, point.y
        )));
    }
    Ok(MapPoint {
        lng: (point.x / GRID_MAX) * dims.width,
        lat: ((GRID_MAX - point.y) / GRID_MAX) * dims.height,
    })
}

/// Convert a pixel-space point back into grid space.
///
/// The result is rounded to [`GRID_PRECISION`] decimals and is not clamped;
/// clicks outside the image map outside the grid.
pub fn map_to_grid(point: MapPoint, dimensions: Option<FloorDimensions>) -> GraphResult<GridPoint> {
    let dims = usable(dimensions, "map_to_grid")?;
    if !point.is_finite() {
        return Err(GraphError::validation(format!(
            "map_to_grid: ({}, {}) is not a finite point",
            point.lat, point.lng
        )));
    }
    let x = (point.lng / dims.width) * GRID_MAX;
    let y = (1.0 - point.lat / dims.height) * GRID_MAX;
    Ok(GridPoint {
        x: round_to(x, GRID_PRECISION),
        y: round_to(y, GRID_PRECISION),
    })
}

/// Constrain a grid point to [0, 100] on both axes
pub fn clamp_grid_point(point: GridPoint) -> GridPoint {
    GridPoint {
        x: point.x.clamp(0.0, GRID_MAX),
        y: point.y.clamp(0.0, GRID_MAX),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PLAN: Option<FloorDimensions> = Some(FloorDimensions {
        width: 2000.0,
        height: 1000.0,
    });

    #[test]
    fn test_grid_corners_flip_y() {
        let top_left = grid_to_map(GridPoint::new(0.0, 0.0), PLAN).unwrap();
        assert_eq!(top_left, MapPoint::new(1000.0, 0.0));

        let bottom_right = grid_to_map(GridPoint::new(100.0, 100.0), PLAN).unwrap();
        assert_eq!(bottom_right, MapPoint::new(0.0, 2000.0));
    }

    #[test]
    fn test_map_to_grid_rounds_to_two_decimals() {
        let grid = map_to_grid(MapPoint::new(333.3333, 666.6666), PLAN).unwrap();
        assert_eq!(grid, GridPoint::new(33.33, 66.67));
    }

    #[test]
    fn test_missing_dimensions_is_an_error() {
        let err = grid_to_map(GridPoint::new(10.0, 10.0), None).unwrap_err();
        assert!(matches!(
            err,
            GraphError::MissingFloorDimensions {
                operation: "grid_to_map"
            }
        ));

        let zero = Some(FloorDimensions::new(0.0, 500.0));
        assert!(map_to_grid(MapPoint::new(1.0, 1.0), zero).is_err());

        let nan = Some(FloorDimensions::new(f64::NAN, 500.0));
        assert!(grid_to_map(GridPoint::new(1.0, 1.0), nan).is_err());
    }

    #[test]
    fn test_non_finite_points_are_rejected() {
        let err = map_to_grid(MapPoint::new(f64::NAN, 10.0), PLAN).unwrap_err();
        assert!(err.is_validation());
        assert!(map_to_grid(MapPoint::new(10.0, f64::INFINITY), PLAN).is_err());
        assert!(grid_to_map(GridPoint::new(f64::NEG_INFINITY, 1.0), PLAN).is_err());
        assert!(!GridPoint::new(f64::NAN, 1.0).is_finite());
    }

    #[test]
    fn test_clamp_grid_point() {
        assert_eq!(
            clamp_grid_point(GridPoint::new(-5.0, 120.0)),
            GridPoint::new(0.0, 100.0)
        );
        let inside = GridPoint::new(42.5, 0.0);
        assert_eq!(clamp_grid_point(inside), inside);
        assert!(inside.in_bounds());
        assert!(!GridPoint::new(100.01, 3.0).in_bounds());
    }

    #[test]
    fn test_distance_to() {
        let a = GridPoint::new(10.0, 10.0);
        let b = GridPoint::new(13.0, 14.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1.235, 0), 1.0);
    }

    proptest! {
        #[test]
        fn map_to_grid_inverts_grid_to_map(
            x in 0.0f64..=100.0,
            y in 0.0f64..=100.0,
            width in 1.0f64..20_000.0,
            height in 1.0f64..20_000.0,
        ) {
            let dims = Some(FloorDimensions::new(width, height));
            let map = grid_to_map(GridPoint::new(x, y), dims).unwrap();
            let back = map_to_grid(map, dims).unwrap();
            prop_assert!((back.x - x).abs() <= 0.01);
            prop_assert!((back.y - y).abs() <= 0.01);
        }

        #[test]
        fn clamped_points_are_in_bounds(x in -1_000.0f64..1_000.0, y in -1_000.0f64..1_000.0) {
            prop_assert!(clamp_grid_point(GridPoint::new(x, y)).in_bounds());
        }
    }
}
