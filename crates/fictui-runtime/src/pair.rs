//! Pair windows: the internal split nodes of the window tree.
//!
//! A pair never renders content. It owns exactly two children, a split
//! direction and discipline, and the derived divider position computed
//! on every layout pass.

use fictui_core::Rect;

use crate::window::WindowId;

/// Which side of the split the new (or key) child occupies.
///
/// Left/Above splits put the sized child first in screen order;
/// Right/Below put it last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDir {
    /// New child on the left.
    Left,
    /// New child on the right.
    Right,
    /// New child on top.
    Above,
    /// New child on the bottom.
    Below,
}

impl SplitDir {
    /// Whether the divider runs vertically (columns are split).
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Whether the sized child sits on the origin side of the split.
    #[must_use]
    pub const fn is_backward(self) -> bool {
        matches!(self, Self::Left | Self::Above)
    }
}

/// How a pair's size magnitude is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Division {
    /// Absolute rows or columns, anchored by the key window's natural
    /// unit size when a key is set.
    Fixed,
    /// Percentage of the parent extent.
    Proportional,
}

/// Direction and discipline of a split, supplied together at window
/// creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMethod {
    /// Side the new child occupies.
    pub dir: SplitDir,
    /// Sizing discipline.
    pub division: Division,
}

impl SplitMethod {
    /// Combine a direction and a division.
    #[must_use]
    pub const fn new(dir: SplitDir, division: Division) -> Self {
        Self { dir, division }
    }
}

/// Split state of a pair window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairData {
    /// First child in screen order (closer to the origin).
    pub child1: WindowId,
    /// Second child in screen order.
    pub child2: WindowId,
    /// Side the sized child occupies.
    pub dir: SplitDir,
    /// Sizing discipline.
    pub division: Division,
    /// Size magnitude: cells if Fixed, percent if Proportional.
    pub size: u32,
    /// Leaf descendant anchoring Fixed sizing; `None` means the size is
    /// used literally.
    pub key: Option<WindowId>,
    /// Divider coordinate computed by the last layout pass.
    pub splitpos: u16,
    /// Divider thickness computed by the last layout pass (0 or 1).
    pub splitwidth: u16,
    /// Scratch flag used while tearing down a subtree that contains
    /// this pair's key window.
    pub keydamage: bool,
}

impl PairData {
    /// Create split state for a fresh pair; the divider fields are
    /// filled in by the first layout pass.
    #[must_use]
    pub fn new(
        child1: WindowId,
        child2: WindowId,
        method: SplitMethod,
        size: u32,
        key: Option<WindowId>,
    ) -> Self {
        Self {
            child1,
            child2,
            dir: method.dir,
            division: method.division,
            size,
            key,
            splitpos: 0,
            splitwidth: 0,
            keydamage: false,
        }
    }

    /// The sibling of `child` within this pair, if `child` is one of
    /// the two children.
    #[must_use]
    pub fn sibling_of(&self, child: WindowId) -> Option<WindowId> {
        if child == self.child1 {
            Some(self.child2)
        } else if child == self.child2 {
            Some(self.child1)
        } else {
            None
        }
    }
}

/// Result of slicing a parent rectangle at a divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SplitLayout {
    pub splitpos: u16,
    pub splitwidth: u16,
    pub first: Rect,
    pub second: Rect,
}

/// Slice `rect` for a pair split.
///
/// `want` is the desired extent of the sized child (the one on the
/// `dir` side); `border` selects a one-cell divider when both children
/// draw borders. The divider position is clamped so both children stay
/// inside the parent with non-negative extent, and the two child
/// rectangles plus the divider always partition the parent exactly.
pub(crate) fn compute_split(rect: Rect, dir: SplitDir, want: u16, border: bool) -> SplitLayout {
    let vertical = dir.is_vertical();
    let (low, high) = if vertical {
        (rect.left(), rect.right())
    } else {
        (rect.top(), rect.bottom())
    };
    let extent = high - low;
    let splitwidth = if border { extent.min(1) } else { 0 };
    let limit = high - splitwidth;

    let splitpos = if dir.is_backward() {
        low.saturating_add(want).min(limit)
    } else {
        limit.saturating_sub(want).max(low)
    };

    let (first, second) = if vertical {
        rect.split_x(splitpos, splitwidth)
    } else {
        rect.split_y(splitpos, splitwidth)
    };
    SplitLayout {
        splitpos,
        splitwidth,
        first,
        second,
    }
}
