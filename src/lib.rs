//! Flattening of SVG path data into renderer-ready geometry.
//!
//! Main features:
//!  - SVG path data parsing and interpretation
//!  - Flattening of bezier curves and (approximated) elliptic arcs
//!  - Tessellation of filled contours
//!  - Document wide normalization and batching into vertex buffers
//!

mod batch;
mod color;
mod curve;
mod diagnostics;
mod document;
mod ellipse;
mod geometry;
mod normalize;
mod path;
mod shape;
mod style;
mod svg;
mod tessellate;
mod utils;

pub use batch::{BatchedGeometry, VERTEX_FLOATS, Vertex};
pub use color::{ColorError, RGBA};
pub use curve::{CURVE_SEGMENTS, Cubic, Curve, CurveSamples, Quad};
pub use diagnostics::{Anomaly, AnomalyKind, Diagnostics, TracingDiagnostics};
pub use document::{Document, Element, Options};
pub use ellipse::{EllipArc, ellipse_points};
pub use geometry::{BBox, EPSILON, PI, Point, Scalar, Transform, scalar_fmt};
pub use normalize::{min_corner, normalize};
pub use path::{CurvePoint, Path, PathBuilder, PathInterpreter};
pub use shape::{
    BasicKind, BasicShape, CLOSE_TOLERANCE, ELLIPSE_SEGMENTS, FilledPathShape, Outline,
    PathShape, Shape,
};
pub use style::{DEFAULT_STROKE_WIDTH, Paint, Style};
pub use svg::{PathCmd, SvgParserError, cmd_arity, parse_path_data};
pub use tessellate::{FillRule, Triangle, fan_triangulate, tessellate};
