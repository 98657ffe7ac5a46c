//! Document of shapes and the geometry pipeline
//!
//! Elements are converted into shapes as they are added. [`Document::finish`] then
//! tessellates filled paths, normalizes coordinates of the whole document and merges
//! everything into [`BatchedGeometry`].
use crate::{
    Anomaly, BBox, BasicShape, BatchedGeometry, Diagnostics, FillRule, Outline, Path, Point,
    Scalar, Shape, Style, Transform, CLOSE_TOLERANCE, ELLIPSE_SEGMENTS, normalize,
};

/// Geometry building options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct Options {
    /// Fill rule used to tessellate filled paths
    pub fill_rule: FillRule,
    /// Number of segments used for circles and ellipses
    pub ellipse_segments: usize,
    /// Filled path contours are closed when their ends differ by more than this value
    pub close_tolerance: Scalar,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fill_rule: FillRule::EvenOdd,
            ellipse_segments: ELLIPSE_SEGMENTS,
            close_tolerance: CLOSE_TOLERANCE,
        }
    }
}

#[cfg(feature = "serde")]
fn default_opacity() -> Scalar {
    1.0
}

/// Element as handed over by the markup parser
///
/// `style` is a `key:value;key:value` declaration, `opacity` is the element opacity
/// attribute and `transform` an optional SVG transform list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Element {
    Path {
        d: String,
        #[cfg_attr(feature = "serde", serde(default))]
        style: String,
        #[cfg_attr(feature = "serde", serde(default = "default_opacity"))]
        opacity: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        transform: Option<String>,
    },
    Rect {
        #[cfg_attr(feature = "serde", serde(default))]
        x: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        y: Scalar,
        width: Scalar,
        height: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        style: String,
        #[cfg_attr(feature = "serde", serde(default = "default_opacity"))]
        opacity: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        transform: Option<String>,
    },
    Circle {
        #[cfg_attr(feature = "serde", serde(default))]
        cx: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        cy: Scalar,
        r: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        style: String,
        #[cfg_attr(feature = "serde", serde(default = "default_opacity"))]
        opacity: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        transform: Option<String>,
    },
    Ellipse {
        #[cfg_attr(feature = "serde", serde(default))]
        cx: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        cy: Scalar,
        rx: Scalar,
        ry: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        style: String,
        #[cfg_attr(feature = "serde", serde(default = "default_opacity"))]
        opacity: Scalar,
        #[cfg_attr(feature = "serde", serde(default))]
        transform: Option<String>,
    },
}

impl Element {
    pub fn path(d: impl Into<String>, style: impl Into<String>) -> Self {
        Element::Path {
            d: d.into(),
            style: style.into(),
            opacity: 1.0,
            transform: None,
        }
    }

    pub fn rect(
        x: Scalar,
        y: Scalar,
        width: Scalar,
        height: Scalar,
        style: impl Into<String>,
    ) -> Self {
        Element::Rect {
            x,
            y,
            width,
            height,
            style: style.into(),
            opacity: 1.0,
            transform: None,
        }
    }

    pub fn circle(cx: Scalar, cy: Scalar, r: Scalar, style: impl Into<String>) -> Self {
        Element::Circle {
            cx,
            cy,
            r,
            style: style.into(),
            opacity: 1.0,
            transform: None,
        }
    }

    pub fn ellipse(
        cx: Scalar,
        cy: Scalar,
        rx: Scalar,
        ry: Scalar,
        style: impl Into<String>,
    ) -> Self {
        Element::Ellipse {
            cx,
            cy,
            rx,
            ry,
            style: style.into(),
            opacity: 1.0,
            transform: None,
        }
    }

    /// Replace element opacity attribute
    pub fn with_opacity(mut self, value: Scalar) -> Self {
        match &mut self {
            Element::Path { opacity, .. }
            | Element::Rect { opacity, .. }
            | Element::Circle { opacity, .. }
            | Element::Ellipse { opacity, .. } => *opacity = value,
        }
        self
    }

    /// Replace element transform attribute
    pub fn with_transform(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Element::Path { transform, .. }
            | Element::Rect { transform, .. }
            | Element::Circle { transform, .. }
            | Element::Ellipse { transform, .. } => *transform = Some(value.into()),
        }
        self
    }

    /// Style declaration, element opacity and transform shared by all elements
    fn presentation(&self) -> (&str, Scalar, Option<&str>) {
        match self {
            Element::Path {
                style,
                opacity,
                transform,
                ..
            }
            | Element::Rect {
                style,
                opacity,
                transform,
                ..
            }
            | Element::Circle {
                style,
                opacity,
                transform,
                ..
            }
            | Element::Ellipse {
                style,
                opacity,
                transform,
                ..
            } => (style.as_str(), *opacity, transform.as_deref()),
        }
    }
}

/// JSON document: either a list of elements or an object with options
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum DocumentSource {
    Elements(Vec<Element>),
    Full {
        #[serde(default)]
        options: Options,
        elements: Vec<Element>,
    },
}

/// Ordered collection of shapes
#[derive(Debug, Clone, Default)]
pub struct Document {
    shapes: Vec<Shape>,
    options: Options,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            shapes: Vec::new(),
            options,
        }
    }

    /// Build document from elements
    pub fn from_elements<'a>(
        elements: impl IntoIterator<Item = &'a Element>,
        options: Options,
        diag: &mut impl Diagnostics,
    ) -> Self {
        let mut doc = Self::with_options(options);
        for element in elements {
            doc.push(element, diag);
        }
        doc
    }

    /// Parse JSON document, see [`Element`] for the format of a single element
    #[cfg(feature = "serde")]
    pub fn from_json(
        text: &str,
        diag: &mut impl Diagnostics,
    ) -> Result<Self, crate::SvgParserError> {
        let source: DocumentSource =
            tracing::debug_span!("[json]").in_scope(|| serde_json::from_str(text))?;
        let doc = match source {
            DocumentSource::Elements(elements) => {
                Self::from_elements(&elements, Options::default(), diag)
            }
            DocumentSource::Full { options, elements } => {
                Self::from_elements(&elements, options, diag)
            }
        };
        Ok(doc)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Bounding box of all shapes
    pub fn bbox(&self) -> Option<BBox> {
        self.shapes
            .iter()
            .fold(None, |bbox, shape| match shape.bbox() {
                Some(shape_bbox) => Some(shape_bbox.union_opt(bbox)),
                None => bbox,
            })
    }

    /// Add already constructed shape
    pub fn add_shape(&mut self, shape: impl Into<Shape>) -> &mut Self {
        self.shapes.push(shape.into());
        self
    }

    /// Convert element into a shape and add it
    pub fn push(&mut self, element: &Element, diag: &mut impl Diagnostics) -> &mut Self {
        let (decl, opacity, transform) = element.presentation();
        let style = Style::parse(decl, opacity, diag);
        let mut shape = match *element {
            Element::Path { ref d, .. } => self.path_shape(Path::parse(d, diag), style),
            Element::Rect {
                x,
                y,
                width,
                height,
                ..
            } => BasicShape::rect(x, y, width, height, diag)
                .with_style(style)
                .into(),
            Element::Circle { cx, cy, r, .. } => {
                BasicShape::circle(Point::new(cx, cy), r, self.options.ellipse_segments, diag)
                    .with_style(style)
                    .into()
            }
            Element::Ellipse { cx, cy, rx, ry, .. } => BasicShape::ellipse(
                Point::new(cx, cy),
                rx,
                ry,
                self.options.ellipse_segments,
                diag,
            )
            .with_style(style)
            .into(),
        };
        if let Some(transform) = transform {
            match transform.parse::<Transform>() {
                Ok(tr) => shape.transform(tr),
                Err(error) => diag.report(Anomaly::InvalidAttribute {
                    name: "transform",
                    reason: error.to_string(),
                }),
            }
        }
        self.add_shape(shape)
    }

    /// Add path shape from path data
    pub fn add_path(&mut self, d: &str, style: Style, diag: &mut impl Diagnostics) -> &mut Self {
        let shape = self.path_shape(Path::parse(d, diag), style);
        self.add_shape(shape)
    }

    pub fn add_rect(
        &mut self,
        x: Scalar,
        y: Scalar,
        width: Scalar,
        height: Scalar,
        style: Style,
        diag: &mut impl Diagnostics,
    ) -> &mut Self {
        self.add_shape(BasicShape::rect(x, y, width, height, diag).with_style(style))
    }

    pub fn add_circle(
        &mut self,
        center: impl Into<Point>,
        r: Scalar,
        style: Style,
        diag: &mut impl Diagnostics,
    ) -> &mut Self {
        let segments = self.options.ellipse_segments;
        self.add_shape(BasicShape::circle(center.into(), r, segments, diag).with_style(style))
    }

    pub fn add_ellipse(
        &mut self,
        center: impl Into<Point>,
        rx: Scalar,
        ry: Scalar,
        style: Style,
        diag: &mut impl Diagnostics,
    ) -> &mut Self {
        let segments = self.options.ellipse_segments;
        self.add_shape(BasicShape::ellipse(center.into(), rx, ry, segments, diag).with_style(style))
    }

    fn path_shape(&self, path: Path, style: Style) -> Shape {
        match Shape::from_path(path, style) {
            Shape::FilledPath(shape) => shape
                .with_fill_rule(self.options.fill_rule)
                .with_close_tolerance(self.options.close_tolerance)
                .into(),
            shape => shape,
        }
    }

    /// Run the geometry pipeline
    ///
    /// Tessellates filled paths, moves the minimum corner of the document to the
    /// origin and merges all shapes into batched vertex buffers in document order.
    pub fn finish(&mut self, diag: &mut impl Diagnostics) -> BatchedGeometry {
        tracing::debug_span!("[tessellate]", shapes = self.shapes.len()).in_scope(|| {
            for shape in self.shapes.iter() {
                shape.prepare_fill(&mut *diag);
            }
        });
        tracing::debug_span!("[normalize]")
            .in_scope(|| normalize(&mut self.shapes, &mut *diag));
        let batch = tracing::debug_span!("[batch]")
            .in_scope(|| BatchedGeometry::build(&self.shapes, &mut *diag));
        tracing::debug!(
            "[batch:vertex_count] fill={} stroke={}",
            batch.fill_vertex_count(),
            batch.stroke_vertex_count()
        );
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnomalyKind, RGBA, assert_approx_eq};

    #[test]
    fn test_red_triangle_blue_line() {
        let mut doc = Document::new();
        doc.push(&Element::path("M0,0 L10,0 L10,10 Z", "fill:#ff0000"), &mut ())
            .push(
                &Element::path("M0,0 L5,5", "fill:none;stroke:#0000ff;stroke-width:2"),
                &mut (),
            );
        let batch = doc.finish(&mut ());
        assert_eq!(batch.fill_vertex_count(), 3);
        assert_eq!(batch.stroke_vertex_count(), 2);
        assert_eq!(batch.fill_vertices().len(), 21);
        for vertex in batch.fill_vertices().chunks(7) {
            assert_eq!(&vertex[3..], &[1.0, 0.0, 0.0, 1.0]);
        }
        for vertex in batch.stroke_vertices().chunks(7) {
            assert_eq!(&vertex[3..], &[0.0, 0.0, 1.0, 1.0]);
        }
    }

    #[test]
    fn test_finish_normalizes() {
        let mut doc = Document::new();
        doc.add_rect(-4.0, 2.0, 2.0, 2.0, Style::fill(RGBA::new(0, 255, 0, 255)), &mut ())
            .add_circle((10.0, 10.0), 3.0, Style::stroke(RGBA::new(0, 0, 0, 255), 1.0), &mut ())
            .add_path("M0,-6 L3,0 L0,3 Z", Style::fill(RGBA::new(255, 0, 0, 128)), &mut ());
        let batch = doc.finish(&mut ());
        let bbox = doc.bbox().unwrap();
        assert_approx_eq!(bbox.x(), 0.0);
        assert_approx_eq!(bbox.y(), 0.0);
        assert_approx_eq!(bbox.max().x(), 17.0, 1e-9);
        assert_eq!(batch.fill_vertex_count(), 6 + 3);
        assert_eq!(batch.stroke_vertex_count(), 2 * ELLIPSE_SEGMENTS);
        let min = batch
            .fill
            .iter()
            .chain(batch.stroke.iter())
            .fold([f32::INFINITY; 2], |[x, y], v| {
                [x.min(v.position[0]), y.min(v.position[1])]
            });
        assert_eq!(min, [0.0, 0.0]);
        // half transparent red
        assert_approx_eq!(batch.fill[6].color[3], 128.0 / 255.0, 1e-6);
    }

    #[test]
    fn test_element_opacity_and_transform() {
        let mut anomalies = Vec::new();
        let mut doc = Document::new();
        doc.push(
            &Element::rect(0.0, 0.0, 1.0, 1.0, "fill:red;opacity:0.5")
                .with_opacity(0.5)
                .with_transform("translate(10, 20) scale(2)"),
            &mut anomalies,
        );
        assert!(anomalies.is_empty());
        let shape = &doc.shapes()[0];
        assert_approx_eq!(shape.style().opacity, 0.25);
        assert_eq!(shape.points()[2].point, Point::new(12.0, 22.0));

        doc.push(
            &Element::circle(0.0, 0.0, 1.0, "fill:blue").with_transform("shear(1)"),
            &mut anomalies,
        );
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind(), AnomalyKind::MalformedInput);
        // invalid transform is ignored
        assert_approx_eq!(doc.shapes()[1].points()[0].point.x(), 1.0);
    }

    #[test]
    fn test_malformed_elements() {
        let mut anomalies = Vec::new();
        let mut doc = Document::new();
        doc.push(&Element::path("", "stroke:black"), &mut anomalies)
            .push(&Element::path("M0,0 L10,abc", "stroke:black"), &mut anomalies)
            .push(&Element::ellipse(0.0, 0.0, -1.0, 1.0, "fill:black"), &mut anomalies)
            .push(&Element::rect(0.0, 0.0, 1.0, 1.0, "fill:nope"), &mut anomalies);
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.shapes()[1].points().len(), 1);
        let kinds: Vec<_> = anomalies.iter().map(|a| a.kind()).collect();
        assert!(kinds.contains(&AnomalyKind::EmptyOrMissingData));
        assert!(kinds.contains(&AnomalyKind::InsufficientArguments));
        assert!(kinds.contains(&AnomalyKind::MalformedInput));
        assert!(doc.finish(&mut anomalies).is_empty());
    }

    #[test]
    fn test_options() {
        let options = Options {
            ellipse_segments: 8,
            ..Options::default()
        };
        let mut doc = Document::with_options(options);
        doc.add_ellipse((0.0, 0.0), 2.0, 1.0, Style::default(), &mut ());
        assert_eq!(doc.shapes()[0].points().len(), 9);
        assert_eq!(doc.options().fill_rule, FillRule::EvenOdd);

        let mut doc = Document::with_options(Options {
            fill_rule: FillRule::NonZero,
            ..Options::default()
        });
        doc.add_path("M0,0 L1,0 L1,1", Style::fill(RGBA::new(0, 0, 0, 255)), &mut ());
        let Shape::FilledPath(shape) = &doc.shapes()[0] else {
            panic!("filled path expected");
        };
        assert_eq!(shape.fill_rule(), FillRule::NonZero);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() -> Result<(), crate::SvgParserError> {
        let text = r#"[
            {"type": "path", "d": "M0,0 L10,0 L10,10 Z", "style": "fill:#ff0000"},
            {"type": "path", "d": "M0,0 L5,5", "style": "stroke:blue;stroke-width:2", "opacity": 0.5},
            {"type": "rect", "width": 4, "height": 2, "transform": "translate(1,1)"},
            {"type": "circle", "cx": 5, "cy": 5, "r": 1},
            {"type": "ellipse", "rx": 2, "ry": 1}
        ]"#;
        let doc = Document::from_json(text, &mut ())?;
        assert_eq!(doc.len(), 5);
        assert_approx_eq!(doc.shapes()[1].style().opacity, 0.5);
        assert_eq!(doc.shapes()[2].points()[0].point, Point::new(1.0, 1.0));

        let text = r#"{
            "options": {"fill-rule": "non-zero", "ellipse-segments": 16},
            "elements": [{"type": "circle", "r": 1, "style": "fill:red"}]
        }"#;
        let doc = Document::from_json(text, &mut ())?;
        assert_eq!(doc.options().fill_rule, FillRule::NonZero);
        assert_eq!(doc.options().close_tolerance, CLOSE_TOLERANCE);
        assert_eq!(doc.shapes()[0].points().len(), 17);

        assert!(Document::from_json("[{\"type\": \"polygon\"}]", &mut ()).is_err());
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_element_roundtrip() -> Result<(), crate::SvgParserError> {
        let element = Element::ellipse(1.0, 2.0, 3.0, 4.0, "fill:red").with_transform("rotate(45)");
        let json = serde_json::to_string(&element)?;
        assert!(json.contains("\"type\":\"ellipse\""));
        let parsed: Element = serde_json::from_str(&json)?;
        assert_eq!(parsed, element);
        Ok(())
    }
}
