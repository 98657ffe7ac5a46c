//! Batched vertex buffers ready for upload
use crate::{Diagnostics, Outline, Point};
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Number of floats per vertex: position `(x, y, z)` followed by color `(r, g, b, a)`
pub const VERTEX_FLOATS: usize = 7;

/// Vertex with a flat color
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.position;
        let [r, g, b, a] = self.color;
        write!(f, "Vertex({x} {y} {z} | {r} {g} {b} {a})")
    }
}

impl Vertex {
    pub fn new(point: Point, color: [f32; 4]) -> Self {
        Self {
            position: [point.x() as f32, point.y() as f32, 0.0],
            color,
        }
    }
}

/// Geometry of the whole document merged into two vertex streams
///
/// Fill stream is a triangle list (3 vertices per triangle), stroke stream is a line
/// list (2 vertices per segment).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchedGeometry {
    pub fill: Vec<Vertex>,
    pub stroke: Vec<Vertex>,
}

impl BatchedGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge geometry of all shapes in order
    ///
    /// Fill triangles which are not cached yet are computed on the way, with
    /// tessellation failures reported to `diag`.
    pub fn build<'a, S: Outline + 'a>(
        shapes: impl IntoIterator<Item = &'a S>,
        diag: &mut impl Diagnostics,
    ) -> Self {
        let mut batch = Self::new();
        for shape in shapes {
            shape.prepare_fill(&mut *diag);
            batch.push(shape);
        }
        batch
    }

    /// Append geometry of a single shape
    ///
    /// Shapes without effective fill or stroke color contribute nothing to the
    /// corresponding stream.
    pub fn push(&mut self, shape: &impl Outline) {
        let style = shape.style();
        if let Some(color) = style.fill_color() {
            let triangles = shape.fill_triangles();
            self.fill.extend(
                triangles
                    .iter()
                    .flat_map(|tri| tri.points())
                    .map(|point| Vertex::new(point, color)),
            );
        }
        if let Some(color) = style.stroke_color() {
            self.stroke.extend(
                shape
                    .stroke_segments()
                    .flatten()
                    .map(|point| Vertex::new(point, color)),
            );
        }
    }

    /// Flat fill buffer, `VERTEX_FLOATS` floats per vertex
    pub fn fill_vertices(&self) -> &[f32] {
        bytemuck::cast_slice(&self.fill)
    }

    /// Flat stroke buffer, `VERTEX_FLOATS` floats per vertex
    pub fn stroke_vertices(&self) -> &[f32] {
        bytemuck::cast_slice(&self.stroke)
    }

    pub fn fill_vertex_count(&self) -> usize {
        self.fill.len()
    }

    pub fn stroke_vertex_count(&self) -> usize {
        self.stroke.len()
    }

    /// Raw bytes of the fill buffer
    pub fn fill_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.fill)
    }

    /// Raw bytes of the stroke buffer
    pub fn stroke_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.stroke)
    }

    pub fn is_empty(&self) -> bool {
        self.fill.is_empty() && self.stroke.is_empty()
    }

    pub fn clear(&mut self) {
        self.fill.clear();
        self.stroke.clear();
    }
}
