use glam::Vec2;

/// Pointer phase delivered by the input source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Pointer event in scene coordinates (top-left origin, y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Vec2,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Down,
            position: Vec2::new(x, y),
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Move,
            position: Vec2::new(x, y),
        }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Up,
            position: Vec2::new(x, y),
        }
    }
}

/// Axis-aligned rectangle in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x <= self.origin.x + self.size.x
            && p.y <= self.origin.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }
}

/// Vertical slider track: top of the track is 1.0, bottom is 0.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalSlider {
    pub track: Rect,
}

impl VerticalSlider {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            track: Rect::new(x, y, w, h),
        }
    }

    /// Normalized value for a pointer height, clamped to `[0, 1]`.
    #[inline]
    pub fn normalized_at(&self, y: f32) -> f32 {
        let rel = (y - self.track.origin.y) / self.track.size.y.max(1.0);
        (1.0 - rel).clamp(0.0, 1.0)
    }

    /// Scene y of the handle for a normalized value.
    #[inline]
    pub fn handle_y(&self, normalized: f32) -> f32 {
        self.track.origin.y + self.track.size.y * (1.0 - normalized.clamp(0.0, 1.0))
    }
}

/// Map a window-space pointer position onto the fixed logical scene.
#[inline]
pub fn window_to_scene(x: f32, y: f32, window_w: f32, window_h: f32, scene: Vec2) -> Vec2 {
    let w = window_w.max(1.0);
    let h = window_h.max(1.0);
    Vec2::new(x / w * scene.x, y / h * scene.y)
}
