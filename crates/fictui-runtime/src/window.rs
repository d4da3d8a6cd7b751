//! Window records.

use fictui_core::{Id, Rect};
use fictui_style::{StyleClass, SurfaceKind};

use crate::pair::PairData;
use crate::stream::StreamId;

/// Handle to a [`Window`].
pub type WindowId = Id<Window>;

/// Content-bearing window kinds a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Renders nothing; a spacer.
    Blank,
    /// Fixed character grid.
    TextGrid,
    /// Scrolling text buffer.
    TextBuffer,
}

/// Discriminant of a window, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Internal split node.
    Pair,
    /// Blank spacer.
    Blank,
    /// Fixed character grid.
    TextGrid,
    /// Scrolling text buffer.
    TextBuffer,
}

impl WindowType {
    /// Convert a Fixed-split size magnitude into cells along the split
    /// axis, anchored by this (key window) kind's natural unit size.
    /// Grid and buffer windows occupy one row or column per unit; a
    /// blank window has no natural size.
    #[must_use]
    pub(crate) fn fixed_extent(self, units: u32) -> u16 {
        match self {
            Self::TextGrid | Self::TextBuffer => units.min(u16::MAX as u32) as u16,
            Self::Blank | Self::Pair => 0,
        }
    }
}

/// Stored window state.
#[derive(Debug)]
pub enum WindowKind {
    /// Blank spacer leaf.
    Blank,
    /// Grid leaf; content lives with the rendering collaborator.
    TextGrid,
    /// Buffer leaf; content lives with the rendering collaborator.
    TextBuffer,
    /// Split node.
    Pair(PairData),
}

/// One node of the window tree.
#[derive(Debug)]
pub struct Window {
    /// Client-supplied tag, never interpreted.
    pub rock: u32,
    /// Variant state.
    pub kind: WindowKind,
    /// Rectangle from the last layout pass.
    pub rect: Rect,
    /// Enclosing pair, or `None` for the root.
    pub parent: Option<WindowId>,
    /// The window's own output stream; always present once creation
    /// completes, destroyed with the window.
    pub stream: Option<StreamId>,
    /// Stream mirroring all output written to this window.
    pub echo: Option<StreamId>,
    /// Style applied to subsequent output.
    pub style: StyleClass,
    /// Set while the window waits for a full line of input; writes are
    /// rejected until it clears.
    pub line_request: bool,
    /// Set by layout, cleared by redraw.
    pub damaged: bool,
}

impl Window {
    /// Fresh leaf window; stream and parent are wired by the session.
    #[must_use]
    pub fn new_leaf(kind: LeafKind, rock: u32) -> Self {
        let kind = match kind {
            LeafKind::Blank => WindowKind::Blank,
            LeafKind::TextGrid => WindowKind::TextGrid,
            LeafKind::TextBuffer => WindowKind::TextBuffer,
        };
        Self::new(kind, rock)
    }

    /// Fresh pair window around already-created children.
    #[must_use]
    pub fn new_pair(pair: PairData) -> Self {
        Self::new(WindowKind::Pair(pair), 0)
    }

    fn new(kind: WindowKind, rock: u32) -> Self {
        Self {
            rock,
            kind,
            rect: Rect::default(),
            parent: None,
            stream: None,
            echo: None,
            style: StyleClass::Normal,
            line_request: false,
            damaged: false,
        }
    }

    /// Client-visible discriminant.
    #[must_use]
    pub const fn window_type(&self) -> WindowType {
        match self.kind {
            WindowKind::Blank => WindowType::Blank,
            WindowKind::TextGrid => WindowType::TextGrid,
            WindowKind::TextBuffer => WindowType::TextBuffer,
            WindowKind::Pair(_) => WindowType::Pair,
        }
    }

    /// The style-table family this window resolves against, if it is a
    /// text surface.
    #[must_use]
    pub const fn surface_kind(&self) -> Option<SurfaceKind> {
        match self.kind {
            WindowKind::TextGrid => Some(SurfaceKind::TextGrid),
            WindowKind::TextBuffer => Some(SurfaceKind::TextBuffer),
            WindowKind::Blank | WindowKind::Pair(_) => None,
        }
    }

    /// Whether this is a pair window.
    #[must_use]
    pub const fn is_pair(&self) -> bool {
        matches!(self.kind, WindowKind::Pair(_))
    }

    /// Split state, for pair windows.
    #[must_use]
    pub const fn pair(&self) -> Option<&PairData> {
        match &self.kind {
            WindowKind::Pair(pair) => Some(pair),
            _ => None,
        }
    }

    /// Mutable split state, for pair windows.
    pub fn pair_mut(&mut self) -> Option<&mut PairData> {
        match &mut self.kind {
            WindowKind::Pair(pair) => Some(pair),
            _ => None,
        }
    }

    /// Whether this window's kind contributes a visible divider when
    /// adjoining a split. Blank spacers render no border.
    #[must_use]
    pub const fn draws_border(&self) -> bool {
        !matches!(self.kind, WindowKind::Blank)
    }
}
