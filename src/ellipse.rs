use crate::{CURVE_SEGMENTS, PI, Point, Scalar};
use std::fmt;

/// Approximated elliptical arc
///
/// This is not the SVG endpoint parameterization. The arc is a half-turn around the
/// midpoint of its end points, starting at the angle of the start point and scaled by
/// the radii. Rotation and large arc flag are kept but do not affect the geometry.
#[derive(Clone, Copy, PartialEq)]
pub struct EllipArc {
    /// midpoint of the end points
    center: Point,
    /// radius along x-axis
    rx: Scalar,
    /// radius along y-axis
    ry: Scalar,
    /// x-axis rotation in degrees (ignored)
    x_axis_rot: Scalar,
    /// large arc flag (ignored)
    large: bool,
    /// angular start
    eta: Scalar,
    /// angular size, `PI` or `-PI` depending on sweep flag
    eta_delta: Scalar,
    /// requested end point
    dst: Point,
}

impl fmt::Debug for EllipArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Arc center:{:?} radius:{:?} eta:{:.3?} eta_delta:{:.3?}",
            self.center,
            Point::new(self.rx, self.ry),
            self.eta,
            self.eta_delta
        )
    }
}

impl EllipArc {
    /// Construct arc from SVG arc arguments
    ///
    /// Zero radii are not special cased, the half-turn collapses onto a line through
    /// the midpoint.
    pub fn new(
        src: Point,
        dst: Point,
        radii: Point,
        x_axis_rot: Scalar,
        large: bool,
        sweep: bool,
    ) -> Self {
        let center = (src + dst) / 2.0;
        let eta = (src - center).angle();
        let eta_delta = if sweep { PI } else { -PI };
        Self {
            center,
            rx: radii.x().abs(),
            ry: radii.y().abs(),
            x_axis_rot,
            large,
            eta,
            eta_delta,
            dst,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radii(&self) -> Point {
        Point::new(self.rx, self.ry)
    }

    pub fn x_axis_rot(&self) -> Scalar {
        self.x_axis_rot
    }

    pub fn large(&self) -> bool {
        self.large
    }

    /// Whether arc is swept in positive angle direction
    pub fn sweep(&self) -> bool {
        self.eta_delta > 0.0
    }

    /// End point requested by the arc command
    pub fn dst(&self) -> Point {
        self.dst
    }

    /// Point at parameter `t` in `0.0..=1.0`
    pub fn at(&self, t: Scalar) -> Point {
        let (angle_sin, angle_cos) = (self.eta + t * self.eta_delta).sin_cos();
        self.center + Point::new(self.rx * angle_cos, self.ry * angle_sin)
    }

    /// `CURVE_SEGMENTS + 1` samples along the arc
    pub fn samples(&self) -> impl ExactSizeIterator<Item = Point> + '_ {
        (0..CURVE_SEGMENTS + 1).map(|index| self.at(index as Scalar / CURVE_SEGMENTS as Scalar))
    }
}

/// Closed polyline approximating axis aligned ellipse.
///
/// Contains `segments + 1` points, the last one is an exact copy of the first.
pub fn ellipse_points(center: Point, rx: Scalar, ry: Scalar, segments: usize) -> Vec<Point> {
    let segments = segments.max(3);
    let mut points: Vec<_> = (0..segments)
        .map(|index| {
            let angle = 2.0 * PI * index as Scalar / segments as Scalar;
            let (sin, cos) = angle.sin_cos();
            center + Point::new(rx * cos, ry * sin)
        })
        .collect();
    points.push(points[0]);
    points
}
