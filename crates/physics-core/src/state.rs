//! Visual-side snapshot types shared with the native frontend.
//!
//! Modules describe what should be on screen as a flat list of shapes in
//! scene coordinates. The renderer never writes back into simulation state.

use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Circle,
}

/// One filled primitive. `size` is the full width/height before rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub center: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub color: [f32; 4],
}

impl Shape {
    pub fn rect(center: Vec2, size: Vec2, color: [f32; 4]) -> Self {
        Self {
            kind: ShapeKind::Rect,
            center,
            size,
            rotation: 0.0,
            color,
        }
    }

    pub fn circle(center: Vec2, radius: f32, color: [f32; 4]) -> Self {
        Self {
            kind: ShapeKind::Circle,
            center,
            size: Vec2::splat(radius * 2.0),
            rotation: 0.0,
            color,
        }
    }

    /// Thin rectangle from `a` to `b`.
    pub fn segment(a: Vec2, b: Vec2, thickness: f32, color: [f32; 4]) -> Self {
        let d = b - a;
        Self {
            kind: ShapeKind::Rect,
            center: (a + b) * 0.5,
            size: Vec2::new(d.length(), thickness),
            rotation: d.y.atan2(d.x),
            color,
        }
    }

    /// Outline of a rectangle as four segments.
    pub fn outline(origin: Vec2, size: Vec2, thickness: f32, color: [f32; 4], out: &mut Vec<Shape>) {
        let tl = origin;
        let tr = origin + Vec2::new(size.x, 0.0);
        let bl = origin + Vec2::new(0.0, size.y);
        let br = origin + size;
        out.push(Shape::segment(tl, tr, thickness, color));
        out.push(Shape::segment(tr, br, thickness, color));
        out.push(Shape::segment(br, bl, thickness, color));
        out.push(Shape::segment(bl, tl, thickness, color));
    }
}
