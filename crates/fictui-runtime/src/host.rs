//! The seam to the character-rendering layer.
//!
//! Everything that actually paints glyphs — grid cursor math, buffer
//! wrapping and scrollback, the terminal driver — lives outside this
//! crate. The session reaches it through one narrow trait; the default
//! [`NullHost`] discards everything, and [`RecordingHost`] captures the
//! callback sequence for tests and benchmarks.

use std::cell::RefCell;
use std::rc::Rc;

use fictui_core::Rect;

use crate::window::{WindowId, WindowType};

/// Collaborator that realizes computed rectangles and forwarded output
/// as drawn content.
pub trait ContentHost {
    /// A leaf window received a new rectangle from a layout pass.
    fn arrange(&mut self, win: WindowId, kind: WindowType, rect: Rect) {
        let _ = (win, kind, rect);
    }

    /// One unit of output reached a leaf window.
    fn put_char(&mut self, win: WindowId, kind: WindowType, ch: u8) {
        let _ = (win, kind, ch);
    }

    /// Repaint a leaf window inside its last-computed rectangle.
    fn redraw(&mut self, win: WindowId, kind: WindowType, rect: Rect) {
        let _ = (win, kind, rect);
    }

    /// Paint a pair window's divider strip.
    fn draw_border(&mut self, rect: Rect) {
        let _ = rect;
    }
}

/// Host that discards all content callbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl ContentHost for NullHost {}

/// One callback observed by a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// `arrange` callback.
    Arrange {
        /// Window that was laid out.
        win: WindowId,
        /// Its kind.
        kind: WindowType,
        /// Its new rectangle.
        rect: Rect,
    },
    /// `put_char` callback.
    PutChar {
        /// Window that received output.
        win: WindowId,
        /// The forwarded byte.
        ch: u8,
    },
    /// `redraw` callback.
    Redraw {
        /// Window that was repainted.
        win: WindowId,
        /// Its rectangle.
        rect: Rect,
    },
    /// `draw_border` callback.
    Border {
        /// The divider strip.
        rect: Rect,
    },
}

/// Host that records every callback for later inspection.
///
/// Clones share the same event log, so a test can keep one handle and
/// hand another to the session.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    events: Rc<RefCell<Vec<HostEvent>>>,
}

impl RecordingHost {
    /// Create an empty recording host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    /// Bytes forwarded to one window, in order.
    #[must_use]
    pub fn chars_for(&self, win: WindowId) -> Vec<u8> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                HostEvent::PutChar { win: w, ch } if *w == win => Some(*ch),
                _ => None,
            })
            .collect()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl ContentHost for RecordingHost {
    fn arrange(&mut self, win: WindowId, kind: WindowType, rect: Rect) {
        self.events.borrow_mut().push(HostEvent::Arrange { win, kind, rect });
    }

    fn put_char(&mut self, win: WindowId, _kind: WindowType, ch: u8) {
        self.events.borrow_mut().push(HostEvent::PutChar { win, ch });
    }

    fn redraw(&mut self, win: WindowId, _kind: WindowType, rect: Rect) {
        self.events.borrow_mut().push(HostEvent::Redraw { win, rect });
    }

    fn draw_border(&mut self, rect: Rect) {
        self.events.borrow_mut().push(HostEvent::Border { rect });
    }
}
