//! Pointer interaction for the bed preview
//!
//! Turns press/move/release/scroll events into pan and zoom calls on a
//! [`ViewportMapper`]. The controller never touches the mapper's state
//! directly; it is handed the mapper for each event.

use super::viewport::ViewportMapper;
use bedshift_core::{Offset, Point};
use std::fmt;
use tracing::trace;

/// Callback invoked with the new offset after every pan or zoom
pub type OffsetCallback = Box<dyn FnMut(Offset)>;

/// Gesture state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// A drag is in progress; `last` is the most recent pointer position
    Dragging { last: Point },
}

/// Drag-to-pan and scroll-to-zoom state machine
#[derive(Default)]
pub struct InteractionController {
    state: DragState,
    listeners: Vec<OffsetCallback>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Register a listener for offset changes
    pub fn on_offset_changed(&mut self, callback: impl FnMut(Offset) + 'static) {
        self.listeners.push(Box::new(callback));
    }

    /// Start a drag at `pixel`. Pressing again mid-drag re-anchors.
    pub fn press(&mut self, pixel: Point) {
        self.state = DragState::Dragging { last: pixel };
    }

    /// Pointer moved. While dragging, pans by the delta since the last event
    /// and returns the new offset; otherwise does nothing.
    pub fn move_to(&mut self, mapper: &mut ViewportMapper, pixel: Point) -> Option<Offset> {
        let DragState::Dragging { last } = self.state else {
            return None;
        };

        mapper.pan(pixel - last);
        self.state = DragState::Dragging { last: pixel };
        let offset = mapper.current_offset();
        trace!("Drag to ({:.1}, {:.1}), offset {}", pixel.x, pixel.y, offset);
        self.notify(offset);
        Some(offset)
    }

    /// End the current drag, if any.
    pub fn release(&mut self) {
        self.state = DragState::Idle;
    }

    /// Zoom around `pixel`. Valid whether or not a drag is in progress.
    pub fn scroll(&mut self, mapper: &mut ViewportMapper, direction: i32, pixel: Point) -> Offset {
        mapper.zoom(direction, pixel);
        let offset = mapper.current_offset();
        self.notify(offset);
        offset
    }

    fn notify(&mut self, offset: Offset) {
        for listener in &mut self.listeners {
            listener(offset);
        }
    }
}

impl fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionController")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_starts_idle() {
        let ctl = InteractionController::new();
        assert_eq!(ctl.state(), DragState::Idle);
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut ctl = InteractionController::new();
        let mut mapper = ViewportMapper::default();
        assert_eq!(ctl.move_to(&mut mapper, Point::new(10.0, 10.0)), None);
        assert_eq!(mapper.pan_offset(), Point::ORIGIN);
    }

    #[test]
    fn test_drag_pans_incrementally() {
        let mut ctl = InteractionController::new();
        let mut mapper = ViewportMapper::default();

        ctl.press(Point::new(100.0, 100.0));
        ctl.move_to(&mut mapper, Point::new(110.0, 100.0));
        ctl.move_to(&mut mapper, Point::new(120.0, 90.0));
        ctl.release();

        assert_eq!(mapper.pan_offset(), Point::new(20.0, 10.0));
        assert_eq!(ctl.state(), DragState::Idle);

        // Movement after release does nothing
        ctl.move_to(&mut mapper, Point::new(500.0, 500.0));
        assert_eq!(mapper.pan_offset(), Point::new(20.0, 10.0));
    }

    #[test]
    fn test_move_returns_current_offset() {
        let mut ctl = InteractionController::new();
        let mut mapper = ViewportMapper::default();
        ctl.press(Point::new(0.0, 0.0));
        let offset = ctl.move_to(&mut mapper, Point::new(5.0, 5.0));
        assert_eq!(offset, Some(Offset::new(-5.0, 5.0)));
    }

    #[test]
    fn test_listeners_receive_offsets() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut ctl = InteractionController::new();
        ctl.on_offset_changed(move |offset| sink.borrow_mut().push(offset));
        let mut mapper = ViewportMapper::default();

        ctl.press(Point::new(0.0, 0.0));
        ctl.move_to(&mut mapper, Point::new(2.0, 0.0));
        ctl.release();
        ctl.scroll(&mut mapper, 1, Point::new(400.0, 400.0));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], Offset::new(-2.0, 0.0));
    }

    #[test]
    fn test_scroll_works_while_dragging() {
        let mut ctl = InteractionController::new();
        let mut mapper = ViewportMapper::default();
        ctl.press(Point::new(10.0, 10.0));
        ctl.scroll(&mut mapper, -1, Point::new(10.0, 10.0));
        assert!(ctl.is_dragging());
        assert!((mapper.scale_factor() - 1.0 / 1.2).abs() < 1e-12);
    }
}
