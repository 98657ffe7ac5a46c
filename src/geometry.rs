use crate::utils::M4x4;
use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

pub type Scalar = f64;
pub const EPSILON: f64 = f64::EPSILON;
pub const PI: f64 = std::f64::consts::PI;

/// Format floats in a compact way suitable for SVG path
pub fn scalar_fmt(f: &mut fmt::Formatter<'_>, value: Scalar) -> fmt::Result {
    let value_abs = value.abs();
    if value_abs.fract() < EPSILON {
        write!(f, "{}", value.trunc() as i64)
    } else if value_abs > 9999.0 || value_abs <= 0.0001 {
        write!(f, "{:.3e}", value)
    } else {
        let ten: Scalar = 10.0;
        let round = ten.powi(6 - (value_abs.trunc() + 1.0).log10().ceil() as i32);
        write!(f, "{}", (value * round).round() / round)
    }
}

/// Value representing a 2D point or vector.
///
/// Equality is exact field comparison, use [`Point::is_within`] for tolerant checks.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        scalar_fmt(f, *x)?;
        write!(f, ",")?;
        scalar_fmt(f, *y)?;
        Ok(())
    }
}

impl Point {
    #[inline]
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub fn x(self) -> Scalar {
        self.0[0]
    }

    /// Get `y` compenent of the point
    #[inline]
    pub fn y(self) -> Scalar {
        self.0[1]
    }

    /// Component-wise minimum
    pub fn min(self, other: Self) -> Self {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        Self([x0.min(x1), y0.min(y1)])
    }

    /// Component-wise maximum
    pub fn max(self, other: Self) -> Self {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        Self([x0.max(x1), y0.max(y1)])
    }

    /// Angle of the vector relative to the positive `x` axis
    pub fn angle(self) -> Scalar {
        let Self([x, y]) = self;
        y.atan2(x)
    }

    /// Reflect `self` around `center`
    pub fn reflect(self, center: Point) -> Point {
        2.0 * center - self
    }

    /// Determine if both components differ by no more than `tolerance`
    pub fn is_within(self, other: Point, tolerance: Scalar) -> bool {
        let Self([x0, y0]) = self;
        let Self([x1, y1]) = other;
        (x0 - x1).abs() <= tolerance && (y0 - y1).abs() <= tolerance
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self([xy.0, xy.1])
    }
}

impl From<[Scalar; 2]> for Point {
    #[inline]
    fn from(xy: [Scalar; 2]) -> Self {
        Self(xy)
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline]
    fn mul(self, other: Point) -> Self::Output {
        let Point([x, y]) = other;
        Point([self * x, self * y])
    }
}

impl Div<Scalar> for Point {
    type Output = Point;

    #[inline]
    fn div(self, rhs: Scalar) -> Self::Output {
        let Point([x, y]) = self;
        Point([x / rhs, y / rhs])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 + x1, y0 + y1])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 - x1, y0 - y1])
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Self::Output {
        let Point([x, y]) = self;
        Point([-x, -y])
    }
}

/// 2D affine transformation
///
/// Stored as an array [m00, m01, m02, m10, m11, m12] but semantically corresponds to
/// a matrix:
/// ┌             ┐
/// │ m00 m01 m02 │
/// │ m10 m11 m12 │
/// │   0   0   1 │
/// └             ┘
#[derive(Clone, Copy, PartialEq)]
pub struct Transform([Scalar; 6]);

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self([m00, m01, m02, m10, m11, m12]) = self;
        write!(f, "matrix(")?;
        for (index, value) in [m00, m10, m01, m11, m02, m12].into_iter().enumerate() {
            if index != 0 {
                write!(f, " ")?;
            }
            scalar_fmt(f, *value)?;
        }
        write!(f, ")")
    }
}

impl Transform {
    pub const fn new(
        m00: Scalar,
        m01: Scalar,
        m02: Scalar,
        m10: Scalar,
        m11: Scalar,
        m12: Scalar,
    ) -> Self {
        Self([m00, m01, m02, m10, m11, m12])
    }

    pub const fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    }

    pub fn new_translate(tx: Scalar, ty: Scalar) -> Self {
        Self([1.0, 0.0, tx, 0.0, 1.0, ty])
    }

    pub fn new_scale(sx: Scalar, sy: Scalar) -> Self {
        Self([sx, 0.0, 0.0, 0.0, sy, 0.0])
    }

    /// Rotation by angle `a` (radians) around the origin
    pub fn new_rotate(a: Scalar) -> Self {
        let (sin, cos) = a.sin_cos();
        Self([cos, -sin, 0.0, sin, cos, 0.0])
    }

    /// Skew by angles `ax` and `ay` (radians)
    pub fn new_skew(ax: Scalar, ay: Scalar) -> Self {
        Self([1.0, ax.tan(), 0.0, ay.tan(), 1.0, 0.0])
    }

    /// Build affine transform from a 4x4 homogeneous row-major matrix.
    ///
    /// Only the 2D part is used: `z` row and column as well as the projective row are
    /// ignored.
    pub fn from_homogeneous(matrix: [Scalar; 16]) -> Self {
        let m = M4x4(matrix);
        Self([
            m.at(0, 0),
            m.at(0, 1),
            m.at(0, 3),
            m.at(1, 0),
            m.at(1, 1),
            m.at(1, 3),
        ])
    }

    /// Convert to a 4x4 homogeneous row-major matrix
    pub fn to_homogeneous(&self) -> [Scalar; 16] {
        let Self([m00, m01, m02, m10, m11, m12]) = *self;
        let mut m = M4x4::identity();
        m.0[0] = m00;
        m.0[1] = m01;
        m.0[3] = m02;
        m.0[4] = m10;
        m.0[5] = m11;
        m.0[7] = m12;
        m.0
    }

    /// Apply this transformation to a point
    pub fn apply(&self, point: Point) -> Point {
        let Self([m00, m01, m02, m10, m11, m12]) = self;
        let Point([x, y]) = point;
        Point([x * m00 + y * m01 + m02, x * m10 + y * m11 + m12])
    }

    /// Apply `other` transformation before self
    pub fn pre_concat(&self, other: Self) -> Self {
        self.matmul(other)
    }

    /// Apply translation by `[tx, ty]` before self
    pub fn pre_translate(&self, tx: Scalar, ty: Scalar) -> Self {
        self.matmul(Self::new_translate(tx, ty))
    }

    /// Multiply transformations in matrix form
    pub fn matmul(&self, other: Transform) -> Self {
        let Self([s00, s01, s02, s10, s11, s12]) = self;
        let Self([o00, o01, o02, o10, o11, o12]) = other;

        // s00, s01, s02 | o00, o01, o02
        // s10, s11, s12 | o10, o11, o12
        // 0  , 0  , 1   | 0  , 0  , 1
        Self([
            s00 * o00 + s01 * o10,
            s00 * o01 + s01 * o11,
            s00 * o02 + s01 * o12 + s02,
            s10 * o00 + s11 * o10,
            s10 * o01 + s11 * o11,
            s10 * o02 + s11 * o12 + s12,
        ])
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    fn mul(self, other: Transform) -> Self::Output {
        self.matmul(other)
    }
}

/// Bounding box with sides directed along the axes
#[derive(Clone, Copy, PartialEq)]
pub struct BBox {
    /// Point with minimal x and y values
    min: Point,
    /// Point with maximum x and y values
    max: Point,
}

impl BBox {
    /// Construct bounding box which includes points `p0` and `p1`
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        let p0 = p0.into();
        let p1 = p1.into();
        Self {
            min: p0.min(p1),
            max: p0.max(p1),
        }
    }

    /// Smallest bounding box containing all `points`, `None` if there are no points
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |bbox, point| match bbox {
            None => Some(BBox::new(point, point)),
            Some(bbox) => Some(bbox.extend(point)),
        })
    }

    /// Point with minmum values of x and y coordianetes
    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    /// Point with maximum values of x and y coordianetes
    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    /// `x` coordinate of the point with the minimal value
    #[inline]
    pub fn x(&self) -> Scalar {
        self.min.x()
    }

    /// `y` coordinate of the point with the minimal value
    #[inline]
    pub fn y(&self) -> Scalar {
        self.min.y()
    }

    /// Width of the bounding box
    #[inline]
    pub fn width(&self) -> Scalar {
        self.max.x() - self.min.x()
    }

    /// Hight of the bounding box
    #[inline]
    pub fn height(&self) -> Scalar {
        self.max.y() - self.min.y()
    }

    /// Determine if the point is inside of the bounding box
    pub fn contains(&self, point: Point) -> bool {
        let Point([x, y]) = point;
        self.min.x() <= x && x <= self.max.x() && self.min.y() <= y && y <= self.max.y()
    }

    /// Extend bounding box so it would contains provided point
    pub fn extend(&self, point: Point) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Create bounding box the spans both bbox-es
    pub fn union(&self, other: BBox) -> Self {
        self.extend(other.min).extend(other.max)
    }

    pub fn union_opt(&self, other: Option<BBox>) -> Self {
        match other {
            Some(other) => self.union(other),
            None => *self,
        }
    }
}

impl fmt::Debug for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox x=")?;
        scalar_fmt(f, self.x())?;
        write!(f, ", y=")?;
        scalar_fmt(f, self.y())?;
        write!(f, ", w=")?;
        scalar_fmt(f, self.width())?;
        write!(f, ", h=")?;
        scalar_fmt(f, self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_trasform() {
        let tr = Transform::identity()
            .pre_translate(1.0, 2.0)
            .pre_concat(Transform::new_rotate(PI / 3.0))
            .pre_concat(Transform::new_skew(2.0, 3.0))
            .pre_concat(Transform::new_scale(3.0, 2.0));
        let p1 = tr.apply(Point::new(1.0, 1.0));
        assert_approx_eq!(p1.x(), -1.04674389, 1e-6);
        assert_approx_eq!(p1.y(), 1.59965634, 1e-6);
        assert_eq!(
            Transform::identity()
                .pre_translate(1.0, 2.0)
                .apply(Point::new(0.0, 0.0)),
            Point::new(1.0, 2.0)
        );
    }

    #[test]
    fn test_homogeneous() {
        let tr = Transform::new_translate(5.0, -3.0) * Transform::new_scale(2.0, 4.0);
        let m = tr.to_homogeneous();
        assert_eq!(m[3], 5.0);
        assert_eq!(m[7], -3.0);
        assert_eq!(m[10], 1.0);
        assert_eq!(m[15], 1.0);
        assert_eq!(Transform::from_homogeneous(m), tr);

        let p = tr.apply(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(7.0, 1.0));
    }

    #[test]
    fn test_point_ops() {
        let p = Point::new(1.0, -2.0);
        assert_eq!(p.reflect(Point::new(2.0, 0.0)), Point::new(3.0, 2.0));
        assert_eq!(p.min(Point::new(0.0, 0.0)), Point::new(0.0, -2.0));
        assert_eq!(p.max(Point::new(0.0, 0.0)), Point::new(1.0, 0.0));
        assert_eq!(-p, Point::new(-1.0, 2.0));
        assert!(p.is_within(Point::new(1.0005, -2.0005), 0.001));
        assert!(!p.is_within(Point::new(1.002, -2.0), 0.001));
        assert_approx_eq!(Point::new(0.0, 1.0).angle(), PI / 2.0);
    }

    #[test]
    fn test_bbox() {
        let bbox = BBox::from_points([
            Point::new(1.0, 5.0),
            Point::new(-2.0, 3.0),
            Point::new(4.0, -1.0),
        ])
        .unwrap();
        assert_eq!(bbox.min(), Point::new(-2.0, -1.0));
        assert_eq!(bbox.max(), Point::new(4.0, 5.0));
        assert_approx_eq!(bbox.width(), 6.0);
        assert_approx_eq!(bbox.height(), 6.0);
        assert!(bbox.contains(Point::new(0.0, 0.0)));
        assert!(!bbox.contains(Point::new(5.0, 0.0)));
        assert!(BBox::from_points(std::iter::empty()).is_none());

        let other = BBox::new((10.0, 10.0), (11.0, 12.0));
        let union = bbox.union(other);
        assert_eq!(union.max(), Point::new(11.0, 12.0));
        assert_eq!(bbox.union_opt(None), bbox);
    }
}
