//! Global coordinate normalization
use crate::{Diagnostics, Outline, Point};

/// Minimum corner over all vertices, control points and fill triangles of `shapes`
///
/// Fill triangles which are not cached yet are computed with failures going to the
/// default sink, see [`Outline::fill_triangles`].
pub fn min_corner<'a, S: Outline + 'a>(shapes: impl IntoIterator<Item = &'a S>) -> Option<Point> {
    let mut result: Option<Point> = None;
    let mut fold = |point: Point| {
        result = Some(match result {
            Some(min) => min.min(point),
            None => point,
        });
    };
    for shape in shapes {
        shape.points().iter().flat_map(|p| p.points()).for_each(&mut fold);
        shape
            .fill_triangles()
            .iter()
            .flat_map(|tri| tri.points())
            .for_each(&mut fold);
    }
    result
}

/// Translate all shapes so that the minimum corner of the whole document is at origin
///
/// Fill triangles are prepared first, tessellation failures are reported to `diag`.
/// Then it runs in two full passes: first computes the global minimum, then shifts
/// every shape by the same offset in document order. Returns applied offset, `None`
/// if there is no geometry.
pub fn normalize<S: Outline>(shapes: &mut [S], diag: &mut impl Diagnostics) -> Option<Point> {
    for shape in shapes.iter() {
        shape.prepare_fill(&mut *diag);
    }
    let min = min_corner(shapes.iter())?;
    let offset = -min;
    for shape in shapes.iter_mut() {
        shape.translate(offset);
    }
    tracing::debug!("[normalize:offset] {:?}", offset);
    Some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BasicShape, RGBA, Scalar, Shape, Style, assert_approx_eq};

    fn document() -> Vec<Shape> {
        let red = RGBA::new(255, 0, 0, 255);
        vec![
            Shape::path("M10,20 C-5,30 40,30 30,20", Style::stroke(red, 1.0), &mut ()),
            Shape::path("M15,-3 L25,7 L15,7 Z", Style::fill(red), &mut ()),
            BasicShape::rect(50.0, 50.0, 5.0, 5.0, &mut ())
                .with_style(Style::fill(red))
                .into(),
        ]
    }

    #[test]
    fn test_normalize() {
        let mut shapes = document();
        let before: Vec<_> = shapes.iter().map(|shape| shape.bbox()).collect();

        let offset = normalize(&mut shapes, &mut ()).unwrap();
        // control point of the cubic and the filled triangle define the minimum
        assert_eq!(offset, Point::new(5.0, 3.0));

        let min = min_corner(shapes.iter()).unwrap();
        assert_approx_eq!(min.x(), 0.0);
        assert_approx_eq!(min.y(), 0.0);

        // every shape moved by the same offset
        for (shape, before) in shapes.iter().zip(before) {
            let (before, after) = (before.unwrap(), shape.bbox().unwrap());
            assert_approx_eq!(after.x() - before.x(), 5.0, 1e-9);
            assert_approx_eq!(after.y() - before.y(), 3.0, 1e-9);
        }
    }

    #[test]
    fn test_normalize_tessellated() {
        let mut shapes = document();
        let Shape::FilledPath(filled) = &shapes[1] else {
            panic!("filled path expected");
        };
        assert!(!filled.is_tessellated());

        let mut anomalies: Vec<crate::Anomaly> = Vec::new();
        normalize(&mut shapes, &mut anomalies).unwrap();
        assert!(anomalies.is_empty());
        let Shape::FilledPath(filled) = &shapes[1] else {
            panic!("filled path expected");
        };
        // triangles are computed before normalization and moved with the shape
        assert!(filled.is_tessellated());
        let tri_min = filled
            .fill_triangles()
            .iter()
            .flat_map(|tri| tri.points())
            .fold(Point::new(Scalar::INFINITY, Scalar::INFINITY), Point::min);
        assert_eq!(tri_min, Point::new(20.0, 0.0));
    }

    #[test]
    fn test_normalize_empty() {
        let mut shapes: Vec<Shape> = Vec::new();
        assert_eq!(normalize(&mut shapes, &mut ()), None);
        let mut shapes = vec![Shape::path("", Style::default(), &mut ())];
        assert_eq!(normalize(&mut shapes, &mut ()), None);
    }
}
