//! Triangulation of closed contours
//!
//! Polygons with arbitrary shape are handed to `lyon_tessellation`, basic shapes which
//! are known to be convex use fan triangulation instead.
use crate::{Anomaly, Diagnostics, Point, Scalar};
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers, math, path,
};
use std::fmt;

/// Rule used to decide whether a point is inside of a self-intersecting contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FillRule {
    /// Inside if a ray crosses the contour a non-zero number of times, counting direction
    NonZero,
    /// Inside if a ray crosses the contour an odd number of times
    #[default]
    EvenOdd,
}

impl From<FillRule> for lyon_tessellation::FillRule {
    fn from(fill_rule: FillRule) -> Self {
        match fill_rule {
            FillRule::NonZero => lyon_tessellation::FillRule::NonZero,
            FillRule::EvenOdd => lyon_tessellation::FillRule::EvenOdd,
        }
    }
}

/// Triangle of a filled area
#[derive(Clone, Copy, PartialEq)]
pub struct Triangle(pub [Point; 3]);

impl fmt::Debug for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Triangle([p0, p1, p2]) = self;
        write!(f, "Triangle {:?} {:?} {:?}", p0, p1, p2)
    }
}

impl Triangle {
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>, p2: impl Into<Point>) -> Self {
        Self([p0.into(), p1.into(), p2.into()])
    }

    pub fn points(&self) -> [Point; 3] {
        self.0
    }

    /// Shift all vertices by `offset`
    pub fn translate(&mut self, offset: Point) {
        for point in self.0.iter_mut() {
            *point = *point + offset;
        }
    }

    /// Signed area, positive for counter-clockwise winding in y-up coordinates
    pub fn area(&self) -> Scalar {
        let Triangle([p0, p1, p2]) = self;
        let (d1, d2) = (*p1 - *p0, *p2 - *p0);
        (d1.x() * d2.y() - d1.y() * d2.x()) / 2.0
    }
}

/// Contour without the trailing duplicate of its first point
fn open_contour(contour: &[Point]) -> &[Point] {
    match contour {
        [first, rest @ .., last] if !rest.is_empty() && first == last => {
            &contour[..contour.len() - 1]
        }
        _ => contour,
    }
}

/// Triangulate single closed contour with the external tessellator
///
/// Contours with less than 3 points produce no triangles. Tessellator failures are
/// reported to `diag` and also produce no triangles.
pub fn tessellate(
    contour: &[Point],
    fill_rule: FillRule,
    diag: &mut impl Diagnostics,
) -> Vec<Triangle> {
    let contour = open_contour(contour);
    let Some((first, rest)) = contour.split_first() else {
        return Vec::new();
    };
    if contour.len() < 3 {
        return Vec::new();
    }

    let to_lyon = |p: &Point| math::point(p.x() as f32, p.y() as f32);
    let mut builder = path::Path::builder();
    builder.begin(to_lyon(first));
    for point in rest {
        builder.line_to(to_lyon(point));
    }
    builder.end(true);
    let lyon_path = builder.build();

    let mut buffers: VertexBuffers<Point, u32> = VertexBuffers::new();
    let options = FillOptions::default().with_fill_rule(fill_rule.into());
    let result = FillTessellator::new().tessellate_path(
        &lyon_path,
        &options,
        &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
            // lyon works in f32, endpoints are mapped back to the exact contour points
            // so only intersection vertices carry the rounding
            vertex
                .as_endpoint_id()
                .and_then(|id| contour.get(id.to_usize()).copied())
                .unwrap_or_else(|| {
                    let p = vertex.position();
                    Point::new(p.x as Scalar, p.y as Scalar)
                })
        }),
    );
    if let Err(error) = result {
        diag.report(Anomaly::TessellationFailed {
            reason: format!("{:?}", error),
        });
        return Vec::new();
    }

    let vertex = |index: u32| buffers.vertices[index as usize];
    buffers
        .indices
        .chunks_exact(3)
        .map(|tri| Triangle([vertex(tri[0]), vertex(tri[1]), vertex(tri[2])]))
        .collect()
}

/// Fan triangulation `(p0, pi, pi+1)` around the first point
///
/// Only valid for polygons which are star-shaped from the first point (all convex
/// polygons are). Trailing closing duplicate of the first point is ignored.
pub fn fan_triangulate(points: &[Point]) -> Vec<Triangle> {
    let points = open_contour(points);
    let Some((first, rest)) = points.split_first() else {
        return Vec::new();
    };
    rest.windows(2)
        .map(|pair| Triangle([*first, pair[0], pair[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(0.0, 0.0),
        ]
    }

    fn total_area(triangles: &[Triangle]) -> Scalar {
        triangles.iter().map(|tri| tri.area().abs()).sum()
    }

    #[test]
    fn test_fan() {
        let triangles = fan_triangulate(&square());
        assert_eq!(triangles.len(), 2);
        assert_eq!(
            triangles[0],
            Triangle::new((0.0, 0.0), (4.0, 0.0), (4.0, 4.0))
        );
        assert_eq!(
            triangles[1],
            Triangle::new((0.0, 0.0), (4.0, 4.0), (0.0, 4.0))
        );
        assert_approx_eq!(total_area(&triangles), 16.0);

        assert!(fan_triangulate(&[]).is_empty());
        assert!(fan_triangulate(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]).is_empty());
    }

    #[test]
    fn test_tessellate_square() {
        let mut anomalies: Vec<crate::Anomaly> = Vec::new();
        let triangles = tessellate(&square(), FillRule::EvenOdd, &mut anomalies);
        assert!(anomalies.is_empty());
        assert_eq!(triangles.len(), 2);
        assert_approx_eq!(total_area(&triangles), 16.0, 1e-4);
        for point in triangles.iter().flat_map(|tri| tri.points()) {
            assert!(square().contains(&point));
        }
    }

    #[test]
    fn test_tessellate_exact_endpoints() {
        // not representable in f32, triangles still reuse the exact contour points
        let contour = [
            Point::new(100000.1, 100000.3),
            Point::new(200000.7, 100000.3),
            Point::new(200000.7, 200000.9),
            Point::new(100000.1, 200000.9),
        ];
        let triangles = tessellate(&contour, FillRule::EvenOdd, &mut ());
        assert_eq!(triangles.len(), 2);
        for point in triangles.iter().flat_map(|tri| tri.points()) {
            assert!(contour.contains(&point), "{:?} is not a contour point", point);
        }
    }

    #[test]
    fn test_tessellate_concave() {
        // L-shaped polygon, fan from the first vertex would cover the notch
        let contour = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let triangles = tessellate(&contour, FillRule::EvenOdd, &mut ());
        assert_approx_eq!(total_area(&triangles), 12.0, 1e-4);
    }

    #[test]
    fn test_fill_rule() {
        // pentagram, inner pentagon is crossed twice
        let contour: Vec<_> = (0..5)
            .map(|index| {
                let angle = crate::PI / 2.0 + index as Scalar * 4.0 * crate::PI / 5.0;
                Point::new(10.0 * angle.cos(), 10.0 * angle.sin())
            })
            .collect();
        let even_odd = total_area(&tessellate(&contour, FillRule::EvenOdd, &mut ()));
        let non_zero = total_area(&tessellate(&contour, FillRule::NonZero, &mut ()));
        assert!(even_odd > 0.0);
        assert!(non_zero > even_odd + 1.0);
    }

    #[test]
    fn test_tessellate_degenerate() {
        assert!(tessellate(&[], FillRule::EvenOdd, &mut ()).is_empty());
        let line = [Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 0.0)];
        assert!(tessellate(&line, FillRule::EvenOdd, &mut ()).is_empty());
    }
}
