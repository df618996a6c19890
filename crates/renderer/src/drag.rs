//! Drag/position tracking for the overlay handle

use pixel_overlay_ipc::Position;

/// Element a drag started on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// The bar above the image
    Handle,
    /// The image body itself
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragPhase {
    #[default]
    Idle,
    /// Pointer offset from the overlay's top-left at pointer-down
    Dragging { offset_x: i32, offset_y: i32 },
}

/// Two-state drag machine: `Idle` <-> `Dragging`
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    phase: DragPhase,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Pointer down over the overlay whose top-left is at `origin`
    pub fn begin(&mut self, pointer: Position, origin: Position) {
        self.phase = DragPhase::Dragging {
            offset_x: pointer.x - origin.x,
            offset_y: pointer.y - origin.y,
        };
    }

    /// New overlay position for a pointer move, if dragging
    pub fn update(&self, pointer: Position) -> Option<Position> {
        match self.phase {
            DragPhase::Dragging { offset_x, offset_y } => {
                Some(Position::new(pointer.x - offset_x, pointer.y - offset_y))
            }
            DragPhase::Idle => None,
        }
    }

    /// Pointer up anywhere. Returns true if a drag was in progress.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.phase = DragPhase::Idle;
        was_dragging
    }
}
