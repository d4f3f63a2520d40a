// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/selection.rs
//
// Pointer-driven selection state machine (Idle -> Dragging -> Idle).

use crate::domain::geometry::clamp_origin;
use crate::domain::{CanvasBounds, CropRegion, Point, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropMode {
    /// Drag spans a rectangle from the anchor to the pointer.
    #[default]
    Free,
    /// Square of the given size that can only be moved.
    Fixed(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Free mode: `anchor` is the fixed corner.
    /// Fixed mode: `anchor` is the pointer offset from the selection origin.
    Dragging { anchor: Point },
}

#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    pub selection: Selection,
    pub mode: CropMode,
    pub drag: DragState,
}

impl SelectionTracker {
    pub fn new(initial: Selection) -> Self {
        Self {
            selection: initial,
            mode: CropMode::Free,
            drag: DragState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Switch to fixed mode, resetting the selection to a square at the origin.
    pub fn enter_fixed(&mut self, size: u32) {
        self.mode = CropMode::Fixed(size);
        self.selection = Selection::square(size);
        self.drag = DragState::Idle;
    }

    /// Back to free mode. The current selection is kept.
    pub fn enter_free(&mut self) {
        self.mode = CropMode::Free;
        self.drag = DragState::Idle;
    }

    /// Pull a fixed square back inside `bounds`. No-op in free mode.
    pub fn clamp_to(&mut self, bounds: CanvasBounds) {
        if let CropMode::Fixed(size) = self.mode {
            self.selection.x = clamp_origin(self.selection.x, bounds.width, size);
            self.selection.y = clamp_origin(self.selection.y, bounds.height, size);
        }
    }

    /// Returns true when a drag started.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        match self.mode {
            CropMode::Fixed(_) => {
                if !self.selection.contains(point) {
                    return false;
                }
                let anchor = Point::new(
                    point.x.saturating_sub(self.selection.x),
                    point.y.saturating_sub(self.selection.y),
                );
                self.drag = DragState::Dragging { anchor };
            }
            CropMode::Free => {
                self.drag = DragState::Dragging { anchor: point };
            }
        }
        true
    }

    /// Returns true when the selection changed and a redraw is due.
    pub fn pointer_move(&mut self, point: Point, bounds: CanvasBounds) -> bool {
        let DragState::Dragging { anchor } = self.drag else {
            return false;
        };

        let next = match self.mode {
            CropMode::Fixed(size) => {
                let x = clamp_origin(point.x.saturating_sub(anchor.x), bounds.width, size);
                let y = clamp_origin(point.y.saturating_sub(anchor.y), bounds.height, size);
                Selection { x, y, ..self.selection }
            }
            CropMode::Free => Selection::spanning(anchor, point),
        };

        let changed = next != self.selection;
        self.selection = next;
        changed
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Normalized region the extractor should copy.
    pub fn crop_region(&self, bounds: CanvasBounds) -> CropRegion {
        match self.mode {
            CropMode::Fixed(size) => self.selection.fixed_region(size, bounds),
            CropMode::Free => self.selection.normalized(),
        }
    }
}
