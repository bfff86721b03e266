//! Debug-visual hook.
//!
//! Processors may describe debug visuals through a [`GizmoSink`].  The host
//! decides how (and whether) to render them; nothing here is called on the
//! production per-frame path.

use marionette_types::Vec3;

/// Receiver for debug primitives.
pub trait GizmoSink {
    fn line(&mut self, from: Vec3, to: Vec3);
    fn point(&mut self, at: Vec3);
}

/// A single recorded debug primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GizmoPrimitive {
    Line { from: Vec3, to: Vec3 },
    Point { at: Vec3 },
}

/// [`GizmoSink`] that simply records every primitive.
#[derive(Debug, Default)]
pub struct GizmoRecorder {
    primitives: Vec<GizmoPrimitive>,
}

impl GizmoRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[GizmoPrimitive] {
        &self.primitives
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }
}

impl GizmoSink for GizmoRecorder {
    fn line(&mut self, from: Vec3, to: Vec3) {
        self.primitives.push(GizmoPrimitive::Line { from, to });
    }

    fn point(&mut self, at: Vec3) {
        self.primitives.push(GizmoPrimitive::Point { at });
    }
}
