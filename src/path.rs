use crate::{
    Anomaly, BBox, Cubic, Curve, Diagnostics, EllipArc, PathCmd, Point, Quad, Scalar, Transform,
    parse_path_data,
};
use std::fmt;

/// Vertex of a flattened path.
///
/// Control points are only recorded on the final sample of a bezier segment, they are
/// never rendered and only used to reflect control points of smooth curves.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct CurvePoint {
    pub point: Point,
    /// First control point (cubic) or the only control point (quadratic)
    pub ctrl1: Option<Point>,
    /// Second control point (cubic only)
    pub ctrl2: Option<Point>,
}

impl fmt::Debug for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.point)?;
        if let Some(ctrl1) = self.ctrl1 {
            write!(f, " c1={:?}", ctrl1)?;
        }
        if let Some(ctrl2) = self.ctrl2 {
            write!(f, " c2={:?}", ctrl2)?;
        }
        Ok(())
    }
}

impl CurvePoint {
    /// Plain vertex without control points
    pub fn new(point: impl Into<Point>) -> Self {
        Self {
            point: point.into(),
            ctrl1: None,
            ctrl2: None,
        }
    }

    /// Whether vertex carries any control point
    pub fn has_controls(&self) -> bool {
        self.ctrl1.is_some() || self.ctrl2.is_some()
    }

    /// Position and all present control points
    pub fn points(&self) -> impl Iterator<Item = Point> {
        std::iter::once(self.point)
            .chain(self.ctrl1)
            .chain(self.ctrl2)
    }

    /// Apply transformation to position and present control points
    pub fn transform(&mut self, tr: Transform) {
        self.point = tr.apply(self.point);
        self.ctrl1 = self.ctrl1.map(|p| tr.apply(p));
        self.ctrl2 = self.ctrl2.map(|p| tr.apply(p));
    }

    /// Shift position and present control points
    pub fn translate(&mut self, offset: Point) {
        self.point = self.point + offset;
        self.ctrl1 = self.ctrl1.map(|p| p + offset);
        self.ctrl2 = self.ctrl2.map(|p| p + offset);
    }
}

/// Flattened path, ordered sequence of vertices of all sub-paths
#[derive(Clone, PartialEq, Default)]
pub struct Path {
    points: Vec<CurvePoint>,
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.points.is_empty() {
            return write!(f, "Empty");
        }
        f.debug_list().entries(self.points.iter()).finish()
    }
}

impl Path {
    pub fn new(points: Vec<CurvePoint>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Convenience method to create `PathBuilder`
    pub fn builder() -> PathBuilder {
        PathBuilder::new()
    }

    /// Parse and interpret SVG path data.
    ///
    /// Malformed input is reported to `diag` and skipped, the result contains everything
    /// that could be interpreted.
    pub fn parse(text: &str, diag: &mut impl Diagnostics) -> Self {
        let mut builder = PathBuilder::new();
        builder.append_svg_path(text, diag);
        builder.build()
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [CurvePoint] {
        &mut self.points
    }

    /// Vertex positions without control points
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Point> + '_ {
        self.points.iter().map(|p| p.point)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Apply transformation to the path in place
    pub fn transform(&mut self, tr: Transform) {
        for point in self.points.iter_mut() {
            point.transform(tr);
        }
    }

    /// Shift the path in place
    pub fn translate(&mut self, offset: Point) {
        for point in self.points.iter_mut() {
            point.translate(offset);
        }
    }

    /// Bounding box of all vertices and control points
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(self.points.iter().flat_map(|p| p.points()))
    }
}

impl From<Vec<CurvePoint>> for Path {
    fn from(points: Vec<CurvePoint>) -> Self {
        Self::new(points)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a CurvePoint;
    type IntoIter = std::slice::Iter<'a, CurvePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Path builder similar to Canvas/Cairo interface.
///
/// Every command appends flattened vertices, curves are sampled with a fixed step.
#[derive(Clone, Default)]
pub struct PathBuilder {
    position: Point,
    /// index of the vertex produced by the latest move-to command
    subpath_start: Option<usize>,
    points: Vec<CurvePoint>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build path, builder is reset to its initial state
    pub fn build(&mut self) -> Path {
        let PathBuilder { points, .. } = std::mem::take(self);
        Path::new(points)
    }

    /// Drop all vertices and move current position to the origin
    pub fn clear(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    /// Extend path from string, which is specified in the same format as SVGs path element.
    pub fn append_svg_path(&mut self, text: &str, diag: &mut impl Diagnostics) -> &mut Self {
        let cmds = parse_path_data(text, diag);
        PathInterpreter::new(self).run(&cmds, diag);
        self
    }

    /// Current possition of the builder
    pub fn position(&self) -> Point {
        self.position
    }

    /// Vertices emitted so far
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Index of the vertex which starts current sub-path
    pub fn subpath_start(&self) -> Option<usize> {
        self.subpath_start
    }

    fn push(&mut self, point: CurvePoint) {
        self.position = point.point;
        self.points.push(point);
    }

    /// Start new sub-path at `p`
    pub fn move_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.subpath_start = Some(self.points.len());
        self.push(CurvePoint::new(p));
        self
    }

    /// Add line from the current position to the specified point
    pub fn line_to(&mut self, p: impl Into<Point>) -> &mut Self {
        self.push(CurvePoint::new(p));
        self
    }

    /// Horizontal line to `x`, keeping current `y`
    pub fn horizontal_to(&mut self, x: Scalar) -> &mut Self {
        let y = self.position.y();
        self.line_to((x, y))
    }

    /// Vertical line to `y`, keeping current `x`
    pub fn vertical_to(&mut self, y: Scalar) -> &mut Self {
        let x = self.position.x();
        self.line_to((x, y))
    }

    /// Add quadratic bezier curve
    pub fn quad_to(&mut self, p1: impl Into<Point>, p2: impl Into<Point>) -> &mut Self {
        let quad = Quad::new(self.position, p1, p2);
        self.extend_samples(quad.samples());
        if let Some(last) = self.points.last_mut() {
            last.ctrl1 = Some(quad.control());
        }
        self
    }

    /// Add smooth quadratic bezier curve
    ///
    /// Control point is a reflection of the previous first control point, or
    /// the current position if previous vertex has none.
    pub fn quad_smooth_to(&mut self, p2: impl Into<Point>) -> &mut Self {
        let p1 = match self.points.last().and_then(|p| p.ctrl1) {
            Some(ctrl1) => ctrl1.reflect(self.position),
            None => self.position,
        };
        self.quad_to(p1, p2)
    }

    /// Add cubic beizer curve
    pub fn cubic_to(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> &mut Self {
        let cubic = Cubic::new(self.position, p1, p2, p3);
        self.extend_samples(cubic.samples());
        if let Some(last) = self.points.last_mut() {
            let (ctrl1, ctrl2) = cubic.controls();
            last.ctrl1 = Some(ctrl1);
            last.ctrl2 = Some(ctrl2);
        }
        self
    }

    /// Add smooth cubic bezier curve
    ///
    /// First control point is a reflection of the previous second control point, or
    /// the current position if previous vertex has none.
    pub fn cubic_smooth_to(&mut self, p2: impl Into<Point>, p3: impl Into<Point>) -> &mut Self {
        let p1 = match self.points.last().and_then(|p| p.ctrl2) {
            Some(ctrl2) => ctrl2.reflect(self.position),
            None => self.position,
        };
        self.cubic_to(p1, p2, p3)
    }

    /// Add approximated elliptic arc segment, see [`EllipArc`]
    pub fn arc_to(
        &mut self,
        radii: impl Into<Point>,
        x_axis_rot: Scalar,
        large: bool,
        sweep: bool,
        p: impl Into<Point>,
    ) -> &mut Self {
        let arc = EllipArc::new(self.position, p.into(), radii.into(), x_axis_rot, large, sweep);
        self.extend_samples(arc.samples());
        // following commands continue from the requested end point
        self.position = arc.dst();
        self
    }

    /// Close current sub-path
    ///
    /// Appends the start of the current sub-path (or the first vertex if there was no
    /// move-to) unless current position is already there.
    pub fn close(&mut self) -> &mut Self {
        let start = self
            .subpath_start
            .and_then(|index| self.points.get(index))
            .or_else(|| self.points.first())
            .map(|p| p.point);
        if let Some(start) = start {
            if start != self.position {
                self.push(CurvePoint::new(start));
            }
        }
        self
    }

    fn extend_samples(&mut self, samples: impl Iterator<Item = Point>) {
        for sample in samples {
            self.push(CurvePoint::new(sample));
        }
    }
}

/// Interpreter of parsed path commands
///
/// Resolves relative coordinates and implicit command repetition, and drives
/// [`PathBuilder`].
pub struct PathInterpreter<'a> {
    builder: &'a mut PathBuilder,
}

impl<'a> PathInterpreter<'a> {
    pub fn new(builder: &'a mut PathBuilder) -> Self {
        Self { builder }
    }

    /// Apply all commands to the builder
    pub fn run(&mut self, cmds: &[PathCmd], diag: &mut impl Diagnostics) {
        for cmd in cmds {
            self.apply(cmd, diag);
        }
    }

    /// Apply single command, every complete group of arguments is one invocation
    pub fn apply(&mut self, cmd: &PathCmd, diag: &mut impl Diagnostics) {
        let op = cmd.op;
        let arity = cmd.arity();
        if arity == 0 {
            self.builder.close();
            if !cmd.args.is_empty() {
                diag.report(Anomaly::TrailingArguments {
                    op: op as char,
                    count: cmd.args.len(),
                });
            }
            return;
        }

        let groups = cmd.args.chunks_exact(arity);
        let remainder = groups.remainder().len();
        if remainder != 0 || cmd.args.is_empty() {
            diag.report(Anomaly::InsufficientArguments {
                op: op as char,
                expected: arity,
                found: if cmd.args.is_empty() { 0 } else { remainder },
            });
        }
        for (index, args) in groups.enumerate() {
            // pairs following the first pair of move-to are implicit line-to
            let op = match op {
                b'M' if index > 0 => b'L',
                b'm' if index > 0 => b'l',
                op => op,
            };
            self.invoke(op, cmd.is_relative(), args);
        }
    }

    fn invoke(&mut self, op: u8, relative: bool, args: &[Scalar]) {
        let origin = self.builder.position();
        let point = |x: Scalar, y: Scalar| {
            if relative {
                origin + Point::new(x, y)
            } else {
                Point::new(x, y)
            }
        };
        let builder = &mut *self.builder;
        match (op.to_ascii_uppercase(), args) {
            (b'M', &[x, y]) => {
                builder.move_to(point(x, y));
            }
            (b'L', &[x, y]) => {
                builder.line_to(point(x, y));
            }
            (b'H', &[x]) => {
                builder.horizontal_to(if relative { origin.x() + x } else { x });
            }
            (b'V', &[y]) => {
                builder.vertical_to(if relative { origin.y() + y } else { y });
            }
            (b'C', &[x1, y1, x2, y2, x, y]) => {
                builder.cubic_to(point(x1, y1), point(x2, y2), point(x, y));
            }
            (b'S', &[x2, y2, x, y]) => {
                builder.cubic_smooth_to(point(x2, y2), point(x, y));
            }
            (b'Q', &[x1, y1, x, y]) => {
                builder.quad_to(point(x1, y1), point(x, y));
            }
            (b'T', &[x, y]) => {
                builder.quad_smooth_to(point(x, y));
            }
            (b'A', &[rx, ry, x_axis_rot, large, sweep, x, y]) => {
                builder.arc_to((rx, ry), x_axis_rot, large != 0.0, sweep != 0.0, point(x, y));
            }
            _ => {}
        }
    }
}
