//! Shapes produced from document elements
//!
//! Every shape owns its flattened vertices and knows how to produce a fill
//! contour, fill triangles and stroke segments from them.
use crate::{
    Anomaly, BBox, CurvePoint, Diagnostics, FillRule, Path, Point, Scalar, Style, Transform,
    Triangle, TracingDiagnostics, ellipse_points, fan_triangulate, tessellate,
};
use std::{borrow::Cow, cell::OnceCell, fmt};

/// Number of segments used to approximate circles and ellipses
pub const ELLIPSE_SEGMENTS: usize = 64;

/// Filled contour is closed explicitly when its ends differ by more than this value
pub const CLOSE_TOLERANCE: Scalar = 0.001;

/// Capabilities shared by all shapes
pub trait Outline {
    /// Flattened vertices in the order they were produced
    fn points(&self) -> &[CurvePoint];

    /// Vertex positions used as a fill contour
    fn contour(&self) -> Vec<Point>;

    /// Triangles covering the filled area, empty if the shape is not filled
    ///
    /// Shapes which tessellate lazily report failures to [`TracingDiagnostics`] here,
    /// call [`Outline::prepare_fill`] first to report them elsewhere.
    fn fill_triangles(&self) -> Cow<'_, [Triangle]>;

    /// Compute and cache fill triangles ahead of use, reporting failures to `diag`
    fn prepare_fill(&self, _diag: &mut impl Diagnostics) {}

    /// Apply affine transformation to all vertices and control points
    fn transform(&mut self, tr: Transform);

    /// Shift all vertices, control points and triangles by `offset`
    fn translate(&mut self, offset: Point);

    /// Style used to paint the shape
    fn style(&self) -> &Style;

    /// Every consecutive pair of vertices as an independent line segment
    fn stroke_segments(&self) -> impl Iterator<Item = [Point; 2]> + '_ {
        self.points()
            .windows(2)
            .map(|pair| [pair[0].point, pair[1].point])
    }

    /// Apply transformation given as 4x4 homogeneous row-major matrix
    fn transform_homogeneous(&mut self, matrix: [Scalar; 16]) {
        self.transform(Transform::from_homogeneous(matrix))
    }

    /// Bounding box of vertices, control points and fill triangles
    fn bbox(&self) -> Option<BBox> {
        let points = self.points().iter().flat_map(|p| p.points());
        let triangles = self.fill_triangles();
        let triangles = triangles.iter().flat_map(|tri| tri.points());
        BBox::from_points(points.chain(triangles))
    }
}

// -----------------------------------------------------------------------------
// Basic shapes
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Rect,
    Circle,
    Ellipse,
}

/// Rectangle, circle or ellipse
///
/// Stored as a closed polyline, filled with a fan triangulation from the first vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicShape {
    kind: BasicKind,
    path: Path,
    style: Style,
}

impl BasicShape {
    /// Axis aligned rectangle, four corners followed by the closing duplicate
    pub fn rect(
        x: Scalar,
        y: Scalar,
        width: Scalar,
        height: Scalar,
        diag: &mut impl Diagnostics,
    ) -> Self {
        let valid = [
            valid_position("x", x, diag),
            valid_position("y", y, diag),
            valid_size("width", width, diag),
            valid_size("height", height, diag),
        ];
        let points = if valid.iter().all(|valid| *valid) {
            vec![
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x + width, y + height),
                Point::new(x, y + height),
                Point::new(x, y),
            ]
        } else {
            Vec::new()
        };
        Self::new(BasicKind::Rect, points)
    }

    /// Circle approximated with `segments` segments
    pub fn circle(center: Point, r: Scalar, segments: usize, diag: &mut impl Diagnostics) -> Self {
        let valid = [
            valid_position("cx", center.x(), diag),
            valid_position("cy", center.y(), diag),
            valid_size("r", r, diag),
        ];
        let points = if valid.iter().all(|valid| *valid) {
            ellipse_points(center, r, r, segments)
        } else {
            Vec::new()
        };
        Self::new(BasicKind::Circle, points)
    }

    /// Axis aligned ellipse approximated with `segments` segments
    pub fn ellipse(
        center: Point,
        rx: Scalar,
        ry: Scalar,
        segments: usize,
        diag: &mut impl Diagnostics,
    ) -> Self {
        let valid = [
            valid_position("cx", center.x(), diag),
            valid_position("cy", center.y(), diag),
            valid_size("rx", rx, diag),
            valid_size("ry", ry, diag),
        ];
        let points = if valid.iter().all(|valid| *valid) {
            ellipse_points(center, rx, ry, segments)
        } else {
            Vec::new()
        };
        Self::new(BasicKind::Ellipse, points)
    }

    fn new(kind: BasicKind, points: Vec<Point>) -> Self {
        Self {
            kind,
            path: points.into_iter().map(CurvePoint::new).collect::<Vec<_>>().into(),
            style: Style::default(),
        }
    }

    pub fn with_style(self, style: Style) -> Self {
        Self { style, ..self }
    }

    pub fn kind(&self) -> BasicKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn valid_position(name: &'static str, value: Scalar, diag: &mut impl Diagnostics) -> bool {
    if !value.is_finite() {
        diag.report(Anomaly::InvalidAttribute {
            name,
            reason: format!("expected finite number, got {}", value),
        });
        return false;
    }
    true
}

fn valid_size(name: &'static str, value: Scalar, diag: &mut impl Diagnostics) -> bool {
    if !value.is_finite() || value <= 0.0 {
        diag.report(Anomaly::InvalidAttribute {
            name,
            reason: format!("expected positive size, got {}", value),
        });
        return false;
    }
    true
}

impl Outline for BasicShape {
    fn points(&self) -> &[CurvePoint] {
        self.path.points()
    }

    fn contour(&self) -> Vec<Point> {
        self.path.positions().collect()
    }

    fn fill_triangles(&self) -> Cow<'_, [Triangle]> {
        if self.style.fill_color().is_none() {
            return Cow::Borrowed(&[]);
        }
        Cow::Owned(fan_triangulate(&self.contour()))
    }

    fn transform(&mut self, tr: Transform) {
        self.path.transform(tr)
    }

    fn translate(&mut self, offset: Point) {
        self.path.translate(offset)
    }

    fn style(&self) -> &Style {
        &self.style
    }
}

// -----------------------------------------------------------------------------
// Stroked path
// -----------------------------------------------------------------------------

/// Arbitrary path which is only stroked
#[derive(Debug, Clone, PartialEq)]
pub struct PathShape {
    path: Path,
    style: Style,
}

impl PathShape {
    pub fn new(path: Path, style: Style) -> Self {
        Self { path, style }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Outline for PathShape {
    fn points(&self) -> &[CurvePoint] {
        self.path.points()
    }

    fn contour(&self) -> Vec<Point> {
        self.path.positions().collect()
    }

    fn fill_triangles(&self) -> Cow<'_, [Triangle]> {
        Cow::Borrowed(&[])
    }

    fn transform(&mut self, tr: Transform) {
        self.path.transform(tr)
    }

    fn translate(&mut self, offset: Point) {
        self.path.translate(offset)
    }

    fn style(&self) -> &Style {
        &self.style
    }
}

// -----------------------------------------------------------------------------
// Filled path
// -----------------------------------------------------------------------------

/// Arbitrary path which is filled and stroked
///
/// Fill triangles are computed by the tessellator on first use and cached until the
/// shape is transformed.
#[derive(Clone)]
pub struct FilledPathShape {
    path: Path,
    style: Style,
    fill_rule: FillRule,
    close_tolerance: Scalar,
    triangles: OnceCell<Vec<Triangle>>,
}

impl fmt::Debug for FilledPathShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilledPathShape")
            .field("path", &self.path)
            .field("style", &self.style)
            .field("fill_rule", &self.fill_rule)
            .field("triangles", &self.triangles.get().map(|tris| tris.len()))
            .finish()
    }
}

impl FilledPathShape {
    pub fn new(path: Path, style: Style) -> Self {
        Self {
            path,
            style,
            fill_rule: FillRule::default(),
            close_tolerance: CLOSE_TOLERANCE,
            triangles: OnceCell::new(),
        }
    }

    pub fn with_fill_rule(self, fill_rule: FillRule) -> Self {
        Self {
            fill_rule,
            triangles: OnceCell::new(),
            ..self
        }
    }

    pub fn with_close_tolerance(self, close_tolerance: Scalar) -> Self {
        Self {
            close_tolerance,
            triangles: OnceCell::new(),
            ..self
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// Whether fill triangles are currently cached
    pub fn is_tessellated(&self) -> bool {
        self.triangles.get().is_some()
    }

    /// Compute and cache fill triangles, reporting tessellation failures to `diag`
    pub fn tessellate(&self, diag: &mut impl Diagnostics) -> &[Triangle] {
        self.triangles.get_or_init(|| {
            if self.style.fill_color().is_none() {
                return Vec::new();
            }
            tessellate(&self.contour(), self.fill_rule, diag)
        })
    }
}

impl Outline for FilledPathShape {
    fn points(&self) -> &[CurvePoint] {
        self.path.points()
    }

    /// Vertex positions, closed with a copy of the first point if needed
    fn contour(&self) -> Vec<Point> {
        let mut contour: Vec<_> = self.path.positions().collect();
        if let Some(first) = contour.first().copied() {
            let closed = contour
                .last()
                .is_some_and(|last| last.is_within(first, self.close_tolerance));
            if !closed {
                contour.push(first);
            }
        }
        contour
    }

    fn fill_triangles(&self) -> Cow<'_, [Triangle]> {
        Cow::Borrowed(self.tessellate(&mut TracingDiagnostics))
    }

    fn prepare_fill(&self, diag: &mut impl Diagnostics) {
        self.tessellate(diag);
    }

    fn transform(&mut self, tr: Transform) {
        self.path.transform(tr);
        self.triangles = OnceCell::new();
    }

    fn translate(&mut self, offset: Point) {
        self.path.translate(offset);
        if let Some(triangles) = self.triangles.get_mut() {
            for triangle in triangles.iter_mut() {
                triangle.translate(offset);
            }
        }
    }

    fn style(&self) -> &Style {
        &self.style
    }
}

// -----------------------------------------------------------------------------
// Shape
// -----------------------------------------------------------------------------

/// Any shape of the document
#[derive(Debug, Clone)]
pub enum Shape {
    Basic(BasicShape),
    Path(PathShape),
    FilledPath(FilledPathShape),
}

impl Shape {
    /// Parse path data and create shape matching the style
    ///
    /// Paths with an effective fill color are tessellated, others are only stroked.
    pub fn path(d: &str, style: Style, diag: &mut impl Diagnostics) -> Self {
        Self::from_path(Path::parse(d, diag), style)
    }

    /// Create shape from already built path
    pub fn from_path(path: Path, style: Style) -> Self {
        if style.fill_color().is_some() {
            Shape::FilledPath(FilledPathShape::new(path, style))
        } else {
            Shape::Path(PathShape::new(path, style))
        }
    }
}

impl From<BasicShape> for Shape {
    fn from(shape: BasicShape) -> Self {
        Shape::Basic(shape)
    }
}

impl From<PathShape> for Shape {
    fn from(shape: PathShape) -> Self {
        Shape::Path(shape)
    }
}

impl From<FilledPathShape> for Shape {
    fn from(shape: FilledPathShape) -> Self {
        Shape::FilledPath(shape)
    }
}

impl Outline for Shape {
    fn points(&self) -> &[CurvePoint] {
        match self {
            Shape::Basic(shape) => shape.points(),
            Shape::Path(shape) => shape.points(),
            Shape::FilledPath(shape) => shape.points(),
        }
    }

    fn contour(&self) -> Vec<Point> {
        match self {
            Shape::Basic(shape) => shape.contour(),
            Shape::Path(shape) => shape.contour(),
            Shape::FilledPath(shape) => shape.contour(),
        }
    }

    fn fill_triangles(&self) -> Cow<'_, [Triangle]> {
        match self {
            Shape::Basic(shape) => shape.fill_triangles(),
            Shape::Path(shape) => shape.fill_triangles(),
            Shape::FilledPath(shape) => shape.fill_triangles(),
        }
    }

    fn prepare_fill(&self, diag: &mut impl Diagnostics) {
        if let Shape::FilledPath(shape) = self {
            shape.prepare_fill(diag);
        }
    }

    fn transform(&mut self, tr: Transform) {
        match self {
            Shape::Basic(shape) => shape.transform(tr),
            Shape::Path(shape) => shape.transform(tr),
            Shape::FilledPath(shape) => shape.transform(tr),
        }
    }

    fn translate(&mut self, offset: Point) {
        match self {
            Shape::Basic(shape) => shape.translate(offset),
            Shape::Path(shape) => shape.translate(offset),
            Shape::FilledPath(shape) => shape.translate(offset),
        }
    }

    fn style(&self) -> &Style {
        match self {
            Shape::Basic(shape) => shape.style(),
            Shape::Path(shape) => shape.style(),
            Shape::FilledPath(shape) => shape.style(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnomalyKind, RGBA, assert_approx_eq};

    const RED: RGBA = RGBA::new(255, 0, 0, 255);

    fn area(triangles: &[Triangle]) -> Scalar {
        triangles.iter().map(|tri| tri.area().abs()).sum()
    }

    #[test]
    fn test_rect() {
        let rect = BasicShape::rect(1.0, 2.0, 3.0, 4.0, &mut ()).with_style(Style::fill(RED));
        assert_eq!(rect.kind(), BasicKind::Rect);
        assert_eq!(rect.points().len(), 5);
        assert_eq!(rect.points()[0], rect.points()[4]);
        let triangles = rect.fill_triangles();
        assert_eq!(triangles.len(), 2);
        assert_approx_eq!(area(&triangles), 12.0);
        assert_eq!(rect.stroke_segments().count(), 4);

        // no fill color, no triangles
        let rect = BasicShape::rect(1.0, 2.0, 3.0, 4.0, &mut ());
        assert!(rect.fill_triangles().is_empty());
    }

    #[test]
    fn test_degenerate_basic() {
        let mut anomalies = Vec::new();
        let rect = BasicShape::rect(0.0, 0.0, -1.0, 4.0, &mut anomalies);
        assert!(rect.points().is_empty());
        let circle = BasicShape::circle(Point::new(0.0, 0.0), 0.0, 64, &mut anomalies);
        assert!(circle.points().is_empty());
        let ellipse =
            BasicShape::ellipse(Point::new(Scalar::NAN, 0.0), 1.0, 1.0, 64, &mut anomalies);
        assert!(ellipse.points().is_empty());
        assert!(ellipse.bbox().is_none());
        assert_eq!(anomalies.len(), 3);
        assert!(
            anomalies
                .iter()
                .all(|a| a.kind() == AnomalyKind::MalformedInput)
        );
    }

    #[test]
    fn test_circle() {
        let circle = BasicShape::circle(Point::new(10.0, 10.0), 5.0, ELLIPSE_SEGMENTS, &mut ())
            .with_style(Style::fill(RED));
        assert_eq!(circle.points().len(), ELLIPSE_SEGMENTS + 1);
        let triangles = circle.fill_triangles();
        assert_eq!(triangles.len(), ELLIPSE_SEGMENTS - 2);
        // inscribed polygon area is slightly smaller than the circle
        let expected = 0.5 * ELLIPSE_SEGMENTS as Scalar * 25.0
            * (2.0 * crate::PI / ELLIPSE_SEGMENTS as Scalar).sin();
        assert_approx_eq!(area(&triangles), expected, 1e-9);
        let bbox = circle.bbox().unwrap();
        assert_approx_eq!(bbox.width(), 10.0, 1e-9);
    }

    #[test]
    fn test_path_shape_selection() {
        let shape = Shape::path("M0,0 L10,0 L10,10", Style::fill(RED), &mut ());
        assert!(matches!(shape, Shape::FilledPath(_)));
        let shape = Shape::path("M0,0 L10,0 L10,10", Style::stroke(RED, 1.0), &mut ());
        assert!(matches!(shape, Shape::Path(_)));
        // stroke only paths are never closed or filled
        assert_eq!(shape.contour().len(), 3);
        assert!(shape.fill_triangles().is_empty());
    }

    #[test]
    fn test_filled_contour_closure() {
        let shape =
            FilledPathShape::new(Path::parse("M0,0 L10,0 L10,10", &mut ()), Style::fill(RED));
        let contour = shape.contour();
        assert_eq!(contour.len(), 4);
        assert_eq!(contour[0], contour[3]);

        // already closed within tolerance
        let shape = FilledPathShape::new(
            Path::parse("M0,0 L10,0 L10,10 L0.0005,0", &mut ()),
            Style::fill(RED),
        );
        assert_eq!(shape.contour().len(), 4);
    }

    #[test]
    fn test_triangle_cache() {
        let mut shape = FilledPathShape::new(
            Path::parse("M0,0 L10,0 L10,10 L0,10 Z", &mut ()),
            Style::fill(RED),
        );
        assert!(!shape.is_tessellated());
        assert_approx_eq!(area(&shape.fill_triangles()), 100.0, 1e-3);
        assert!(shape.is_tessellated());

        // translation moves cached triangles
        shape.translate(Point::new(5.0, 5.0));
        assert!(shape.is_tessellated());
        let bbox = shape.bbox().unwrap();
        assert_eq!(bbox.min(), Point::new(5.0, 5.0));
        assert_eq!(bbox.max(), Point::new(15.0, 15.0));

        // transformation invalidates them
        shape.transform(Transform::new_scale(2.0, 2.0));
        assert!(!shape.is_tessellated());
        assert_approx_eq!(area(&shape.fill_triangles()), 400.0, 1e-2);
        let bbox = shape.bbox().unwrap();
        assert_eq!(bbox.min(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_transform_homogeneous() {
        let mut shape: Shape = BasicShape::rect(0.0, 0.0, 1.0, 1.0, &mut ()).into();
        #[rustfmt::skip]
        let matrix = [
            2.0, 0.0, 0.0, 3.0,
            0.0, 2.0, 0.0, 4.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        shape.transform_homogeneous(matrix);
        assert_eq!(shape.points()[2].point, Point::new(5.0, 6.0));
    }

    #[test]
    fn test_stroke_segments_across_subpaths() {
        let shape = Shape::path("M0,0 L1,0 M5,5 L6,5", Style::stroke(RED, 1.0), &mut ());
        let segments: Vec<_> = shape.stroke_segments().collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], [Point::new(1.0, 0.0), Point::new(5.0, 5.0)]);
    }
}
