//! Utility functions and types used accross the library
use crate::Scalar;

/// Restrict value to a certain interval
#[inline]
pub fn clamp<T>(val: T, min: T, max: T) -> T
where
    T: PartialOrd,
{
    if val < min {
        min
    } else if val > max {
        max
    } else {
        val
    }
}

/// Sqaure 4x4 matrix (row-major)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct M4x4(pub [Scalar; 16]);

impl M4x4 {
    pub(crate) fn identity() -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        M4x4(m)
    }

    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> Scalar {
        self.0[col + 4 * row]
    }
}
