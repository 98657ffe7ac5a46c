//! Fixed step flattening of bezier curves

use crate::{Point, Scalar};
use std::fmt;

/// Number of parameter steps used to flatten a single curve segment.
///
/// Flattening emits `CURVE_SEGMENTS + 1` samples, both ends included.
pub const CURVE_SEGMENTS: usize = 32;

/// Set of operations common to all bezier curves.
pub trait Curve: Sized {
    /// Point at which curve starts
    fn start(&self) -> Point;

    /// Point at which curve ends
    fn end(&self) -> Point;

    /// Evaluate curve at parameter value `t` in (0.0..=1.0)
    fn at(&self, t: Scalar) -> Point;

    /// Sample curve at `CURVE_SEGMENTS + 1` evenly spaced parameter values,
    /// first sample is the start and last sample is the end of the curve.
    fn samples(&self) -> CurveSamples<'_, Self> {
        CurveSamples {
            curve: self,
            index: 0,
        }
    }
}

/// Iterator over fixed parameter step samples of a curve
pub struct CurveSamples<'a, C> {
    curve: &'a C,
    index: usize,
}

impl<C: Curve> Iterator for CurveSamples<'_, C> {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index > CURVE_SEGMENTS {
            return None;
        }
        let point = match self.index {
            0 => self.curve.start(),
            CURVE_SEGMENTS => self.curve.end(),
            index => self.curve.at(index as Scalar / CURVE_SEGMENTS as Scalar),
        };
        self.index += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = (CURVE_SEGMENTS + 1).saturating_sub(self.index);
        (size, Some(size))
    }
}

impl<C: Curve> ExactSizeIterator for CurveSamples<'_, C> {}

// -----------------------------------------------------------------------------
// Quadratic bezier curve
// -----------------------------------------------------------------------------

/// Quadratic bezier curve
#[derive(Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 3]);

impl fmt::Debug for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Quad([p0, p1, p2]) = self;
        write!(f, "Quad {:?} {:?} {:?}", p0, p1, p2)
    }
}

impl Quad {
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>, p2: impl Into<Point>) -> Self {
        Self([p0.into(), p1.into(), p2.into()])
    }

    /// Control point of the curve
    pub fn control(&self) -> Point {
        self.0[1]
    }
}

impl Curve for Quad {
    fn start(&self) -> Point {
        self.0[0]
    }

    fn end(&self) -> Point {
        self.0[2]
    }

    fn at(&self, t: Scalar) -> Point {
        // (1 - t) ^ 2 * p0 + 2 * (1 - t) * t * p1 + t ^ 2 * p2
        let Self([p0, p1, p2]) = self;
        let t1 = 1.0 - t;
        (t1 * t1) * *p0 + (2.0 * t1 * t) * *p1 + (t * t) * *p2
    }
}

// -----------------------------------------------------------------------------
// Cubic bezier curve
// -----------------------------------------------------------------------------

/// Cubic bezier curve
#[derive(Clone, Copy, PartialEq)]
pub struct Cubic(pub [Point; 4]);

impl fmt::Debug for Cubic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Cubic([p0, p1, p2, p3]) = self;
        write!(f, "Cubic {:?} {:?} {:?} {:?}", p0, p1, p2, p3)
    }
}

impl Cubic {
    pub fn new(
        p0: impl Into<Point>,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
    ) -> Self {
        Self([p0.into(), p1.into(), p2.into(), p3.into()])
    }

    /// Control points of the curve
    pub fn controls(&self) -> (Point, Point) {
        (self.0[1], self.0[2])
    }
}

impl Curve for Cubic {
    fn start(&self) -> Point {
        self.0[0]
    }

    fn end(&self) -> Point {
        self.0[3]
    }

    fn at(&self, t: Scalar) -> Point {
        // (1 - t) ^ 3 * p0 + 3 * (1 - t) ^ 2 * t * p1 + 3 * (1 - t) * t ^ 2 * p2 + t ^ 3 * p3
        let Self([p0, p1, p2, p3]) = self;
        let (t2, t3) = (t * t, t * t * t);
        let t1 = 1.0 - t;
        let (t12, t13) = (t1 * t1, t1 * t1 * t1);
        t13 * *p0 + (3.0 * t12 * t) * *p1 + (3.0 * t1 * t2) * *p2 + t3 * *p3
    }
}
