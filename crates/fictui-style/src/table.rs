//! Mutable style tables, compiled defaults, and hint application.

use tracing::debug;

use crate::color::Rgb;
use crate::font::Font;

/// Number of style classes in a table.
pub const NUM_STYLE_CLASSES: usize = 11;

/// Presentation role a run of output is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StyleClass {
    /// Body text.
    Normal = 0,
    /// Emphasized (typically italic or underlined).
    Emphasized = 1,
    /// Fixed-pitch verbatim text.
    Preformatted = 2,
    /// Section heading.
    Header = 3,
    /// Sub-heading.
    Subheader = 4,
    /// Urgent or warning text.
    Alert = 5,
    /// Side note.
    Note = 6,
    /// Quoted block.
    BlockQuote = 7,
    /// Player input echo.
    Input = 8,
    /// First client-defined role.
    User1 = 9,
    /// Second client-defined role.
    User2 = 10,
}

impl StyleClass {
    const ALL: [Self; NUM_STYLE_CLASSES] = [
        Self::Normal,
        Self::Emphasized,
        Self::Preformatted,
        Self::Header,
        Self::Subheader,
        Self::Alert,
        Self::Note,
        Self::BlockQuote,
        Self::Input,
        Self::User1,
        Self::User2,
    ];

    /// Decode a client-supplied index, clamping out-of-range values to
    /// [`StyleClass::Normal`].
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        if (raw as usize) < NUM_STYLE_CLASSES {
            Self::ALL[raw as usize]
        } else {
            Self::Normal
        }
    }

    /// Decode a client-supplied index, rejecting out-of-range values.
    #[must_use]
    pub const fn checked_from_raw(raw: u32) -> Option<Self> {
        if (raw as usize) < NUM_STYLE_CLASSES {
            Some(Self::ALL[raw as usize])
        } else {
            None
        }
    }

    /// Table index of this class.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The two content-window families, each with its own style table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Fixed character grid.
    TextGrid,
    /// Scrolling text buffer.
    TextBuffer,
}

/// Surface selector for hint calls; `AllTypes` fans out to both
/// concrete kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintScope {
    /// Apply to both surface kinds.
    AllTypes,
    /// Apply to grid surfaces only.
    TextGrid,
    /// Apply to buffer surfaces only.
    TextBuffer,
}

/// Presentation hints a client may set, clear, or measure.
///
/// The first six carry settable state; the last four exist only for
/// measurement queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// Foreground color (packed `0xRRGGBB`).
    TextColor,
    /// Background color (packed `0xRRGGBB`).
    BackColor,
    /// Reverse video.
    ReverseColor,
    /// Proportional vs fixed pitch (buffer surfaces only).
    Proportional,
    /// Bold weight.
    Weight,
    /// Italic slant.
    Oblique,
    /// Left indentation (measure-only).
    Indentation,
    /// First-line indentation (measure-only).
    ParaIndentation,
    /// Text justification (measure-only).
    Justification,
    /// Font size (measure-only).
    Size,
}

/// Justification value reported by measurement queries.
pub const JUSTIFY_LEFT_FLUSH: u32 = 0;

bitflags::bitflags! {
    /// Terminal rendering attributes a style class resolves to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StyleAttrs: u8 {
        /// Bold / increased intensity.
        const BOLD      = 0b0000_0001;
        /// Underlined text.
        const UNDERLINE = 0b0000_0010;
        /// Reverse video (swap fg/bg).
        const REVERSE   = 0b0000_0100;
    }
}

/// Resolved style state for one class on one surface kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRecord {
    /// Font classification.
    pub font: Font,
    /// Foreground color.
    pub fg: Rgb,
    /// The packed foreground value exactly as the client supplied it.
    pub fg_raw: i32,
    /// Background color.
    pub bg: Rgb,
    /// Reverse-video flag.
    pub reverse: bool,
}

impl StyleRecord {
    const fn with_font(font: Font) -> Self {
        Self {
            font,
            fg: Rgb::new(0xff, 0xff, 0xff),
            fg_raw: 0xff_ffff,
            bg: Rgb::new(0x00, 0x00, 0x00),
            reverse: false,
        }
    }
}

/// One full table of style records, indexed by [`StyleClass`].
pub type StyleTable = [StyleRecord; NUM_STYLE_CLASSES];

/// Compiled defaults for buffer surfaces: mono faces throughout on this
/// terminal backend, with weight/slant varying by role.
const BUFFER_DEFAULTS: StyleTable = [
    StyleRecord::with_font(Font::MonoRoman),  // Normal
    StyleRecord::with_font(Font::MonoItalic), // Emphasized
    StyleRecord::with_font(Font::MonoRoman),  // Preformatted
    StyleRecord::with_font(Font::MonoBold),   // Header
    StyleRecord::with_font(Font::MonoBold),   // Subheader
    StyleRecord::with_font(Font::MonoBold),   // Alert
    StyleRecord::with_font(Font::MonoItalic), // Note
    StyleRecord::with_font(Font::MonoRoman),  // BlockQuote
    StyleRecord::with_font(Font::MonoBold),   // Input
    StyleRecord::with_font(Font::MonoRoman),  // User1
    StyleRecord::with_font(Font::MonoRoman),  // User2
];

/// Compiled defaults for grid surfaces: plain mono for every class.
const GRID_DEFAULTS: StyleTable = [StyleRecord::with_font(Font::MonoRoman); NUM_STYLE_CLASSES];

/// Compiled terminal attributes per class, shared by both surface
/// kinds. Distinguish/measure queries consult this table, not the
/// mutable hint tables.
const CLASS_ATTRS: [StyleAttrs; NUM_STYLE_CLASSES] = [
    StyleAttrs::empty(),                                // Normal
    StyleAttrs::UNDERLINE,                              // Emphasized
    StyleAttrs::empty(),                                // Preformatted
    StyleAttrs::BOLD,                                   // Header
    StyleAttrs::BOLD.union(StyleAttrs::UNDERLINE),      // Subheader
    StyleAttrs::BOLD,                                   // Alert
    StyleAttrs::UNDERLINE,                              // Note
    StyleAttrs::empty(),                                // BlockQuote
    StyleAttrs::BOLD,                                   // Input
    StyleAttrs::empty(),                                // User1
    StyleAttrs::empty(),                                // User2
];

/// Process-wide style state: the mutable tables, their compiled
/// defaults, the hint enable switch, and the published display globals
/// the rendering layer reads.
#[derive(Debug, Clone)]
pub struct StyleContext {
    grid: StyleTable,
    buffer: StyleTable,
    grid_defaults: StyleTable,
    buffer_defaults: StyleTable,
    hints_enabled: bool,
    window_color: Rgb,
    caret_color: Rgb,
    more_color: Rgb,
    set_calls: u32,
    clear_calls: u32,
}

impl StyleContext {
    /// Create a context with every table at its compiled defaults and
    /// hints honored.
    #[must_use]
    pub fn new() -> Self {
        let normal = BUFFER_DEFAULTS[StyleClass::Normal.index()];
        Self {
            grid: GRID_DEFAULTS,
            buffer: BUFFER_DEFAULTS,
            grid_defaults: GRID_DEFAULTS,
            buffer_defaults: BUFFER_DEFAULTS,
            hints_enabled: true,
            window_color: normal.bg,
            caret_color: normal.fg,
            more_color: normal.fg,
            set_calls: 0,
            clear_calls: 0,
        }
    }

    /// Whether style hints are currently honored.
    #[must_use]
    pub const fn hints_enabled(&self) -> bool {
        self.hints_enabled
    }

    /// Enable or disable hint application. Calls made while disabled
    /// are still counted but change nothing.
    pub fn set_hints_enabled(&mut self, enabled: bool) {
        self.hints_enabled = enabled;
    }

    /// Published window background color.
    #[must_use]
    pub const fn window_color(&self) -> Rgb {
        self.window_color
    }

    /// Published caret color.
    #[must_use]
    pub const fn caret_color(&self) -> Rgb {
        self.caret_color
    }

    /// Published "more"-prompt color.
    #[must_use]
    pub const fn more_color(&self) -> Rgb {
        self.more_color
    }

    /// Total set-hint calls observed, including fan-out and disabled
    /// calls.
    #[must_use]
    pub const fn set_call_count(&self) -> u32 {
        self.set_calls
    }

    /// Total clear-hint calls observed, including fan-out and disabled
    /// calls.
    #[must_use]
    pub const fn clear_call_count(&self) -> u32 {
        self.clear_calls
    }

    /// The mutable style table for a surface kind.
    #[must_use]
    pub const fn table(&self, kind: SurfaceKind) -> &StyleTable {
        match kind {
            SurfaceKind::TextGrid => &self.grid,
            SurfaceKind::TextBuffer => &self.buffer,
        }
    }

    /// One resolved record.
    #[must_use]
    pub const fn record(&self, kind: SurfaceKind, class: StyleClass) -> &StyleRecord {
        &self.table(kind)[class.index()]
    }

    /// Apply one hint. `AllTypes` fans out to the grid table then the
    /// buffer table; out-of-range classes clamp to `Normal`;
    /// measure-only hints are ignored.
    pub fn set_hint(&mut self, scope: HintScope, class: u32, hint: Hint, val: i32) {
        self.set_calls = self.set_calls.wrapping_add(1);
        debug!(calls = self.set_calls, ?scope, class, ?hint, val, "style hint set");

        let kind = match scope {
            HintScope::AllTypes => {
                self.set_hint(HintScope::TextGrid, class, hint, val);
                self.set_hint(HintScope::TextBuffer, class, hint, val);
                return;
            }
            HintScope::TextGrid => SurfaceKind::TextGrid,
            HintScope::TextBuffer => SurfaceKind::TextBuffer,
        };

        if !self.hints_enabled {
            return;
        }

        let class = StyleClass::from_raw(class);
        let record = &mut self.table_mut(kind)[class.index()];
        match hint {
            Hint::TextColor => {
                record.fg_raw = val;
                record.fg = Rgb::from_packed(val);
            }
            Hint::BackColor => {
                record.bg = Rgb::from_packed(val);
            }
            Hint::ReverseColor => {
                record.reverse = val != 0;
            }
            Hint::Proportional => {
                // Grid surfaces never offer proportional faces.
                if kind == SurfaceKind::TextBuffer {
                    record.font =
                        Font::compose(val > 0, record.font.is_bold(), record.font.is_italic());
                }
            }
            Hint::Weight => {
                record.font =
                    Font::compose(record.font.is_proportional(), val > 0, record.font.is_italic());
            }
            Hint::Oblique => {
                record.font =
                    Font::compose(record.font.is_proportional(), record.font.is_bold(), val > 0);
            }
            // Measure-only hints carry no settable state.
            Hint::Indentation | Hint::ParaIndentation | Hint::Justification | Hint::Size => {}
        }

        // The buffer Normal style feeds the published display globals.
        let record = *self.record(kind, class);
        if kind == SurfaceKind::TextBuffer && class == StyleClass::Normal {
            match hint {
                Hint::BackColor => self.window_color = record.bg,
                Hint::TextColor => {
                    self.caret_color = record.fg;
                    self.more_color = record.fg;
                }
                _ => {}
            }
        }
    }

    /// Restore one hint's field from the compiled defaults, leaving all
    /// other fields untouched.
    pub fn clear_hint(&mut self, scope: HintScope, class: u32, hint: Hint) {
        self.clear_calls = self.clear_calls.wrapping_add(1);
        debug!(calls = self.clear_calls, ?scope, class, ?hint, "style hint cleared");

        let kind = match scope {
            HintScope::AllTypes => {
                self.clear_hint(HintScope::TextGrid, class, hint);
                self.clear_hint(HintScope::TextBuffer, class, hint);
                return;
            }
            HintScope::TextGrid => SurfaceKind::TextGrid,
            HintScope::TextBuffer => SurfaceKind::TextBuffer,
        };

        if !self.hints_enabled {
            return;
        }

        let class = StyleClass::from_raw(class);
        let default = match kind {
            SurfaceKind::TextGrid => self.grid_defaults[class.index()],
            SurfaceKind::TextBuffer => self.buffer_defaults[class.index()],
        };
        let record = &mut self.table_mut(kind)[class.index()];
        match hint {
            Hint::TextColor => {
                record.fg = default.fg;
                record.fg_raw = default.fg_raw;
            }
            Hint::BackColor => {
                record.bg = default.bg;
            }
            Hint::ReverseColor => {
                record.reverse = default.reverse;
            }
            Hint::Proportional | Hint::Weight | Hint::Oblique => {
                record.font = default.font;
            }
            Hint::Indentation | Hint::ParaIndentation | Hint::Justification | Hint::Size => {}
        }
    }

    /// Compiled terminal attributes for a class on a surface kind.
    #[must_use]
    pub const fn resolved_attrs(&self, _kind: SurfaceKind, class: StyleClass) -> StyleAttrs {
        CLASS_ATTRS[class.index()]
    }

    /// Whether two classes resolve to different terminal attributes on
    /// a surface kind. Out-of-range classes are never distinguishable.
    #[must_use]
    pub fn distinguishable(&self, kind: SurfaceKind, class1: u32, class2: u32) -> bool {
        let (Some(class1), Some(class2)) = (
            StyleClass::checked_from_raw(class1),
            StyleClass::checked_from_raw(class2),
        ) else {
            return false;
        };
        self.resolved_attrs(kind, class1) != self.resolved_attrs(kind, class2)
    }

    /// Report a hint's resolved value for a class without mutating
    /// anything. Out-of-range classes and color hints are unmeasurable.
    ///
    /// Proportional always reports 0 here: this terminal backend never
    /// offers proportional faces to measurement, independent of the
    /// font classification state.
    #[must_use]
    pub fn measure(&self, kind: SurfaceKind, class: u32, hint: Hint) -> Option<u32> {
        let class = StyleClass::checked_from_raw(class)?;
        let attrs = self.resolved_attrs(kind, class);
        match hint {
            Hint::Indentation | Hint::ParaIndentation => Some(0),
            Hint::Justification => Some(JUSTIFY_LEFT_FLUSH),
            Hint::Size => Some(1),
            Hint::Weight => Some(u32::from(attrs.contains(StyleAttrs::BOLD))),
            Hint::Oblique => Some(u32::from(attrs.contains(StyleAttrs::UNDERLINE))),
            Hint::Proportional => Some(0),
            Hint::TextColor | Hint::BackColor | Hint::ReverseColor => None,
        }
    }

    fn table_mut(&mut self, kind: SurfaceKind) -> &mut StyleTable {
        match kind {
            SurfaceKind::TextGrid => &mut self.grid,
            SurfaceKind::TextBuffer => &mut self.buffer,
        }
    }
}

impl Default for StyleContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_types_fans_out_to_both_tables() {
        let mut ctx = StyleContext::new();
        ctx.set_hint(HintScope::AllTypes, 0, Hint::BackColor, 0x102030);

        let want = Rgb::new(0x10, 0x20, 0x30);
        assert_eq!(ctx.record(SurfaceKind::TextGrid, StyleClass::Normal).bg, want);
        assert_eq!(ctx.record(SurfaceKind::TextBuffer, StyleClass::Normal).bg, want);
    }

    #[test]
    fn clear_on_one_surface_leaves_the_other() {
        let mut ctx = StyleContext::new();
        ctx.set_hint(HintScope::AllTypes, 0, Hint::BackColor, 0x102030);
        ctx.clear_hint(HintScope::TextGrid, 0, Hint::BackColor);

        assert_eq!(
            ctx.record(SurfaceKind::TextGrid, StyleClass::Normal).bg,
            GRID_DEFAULTS[0].bg
        );
        assert_eq!(
            ctx.record(SurfaceKind::TextBuffer, StyleClass::Normal).bg,
            Rgb::new(0x10, 0x20, 0x30)
        );
    }

    #[test]
    fn clear_restores_compiled_default_bit_for_bit() {
        let mut ctx = StyleContext::new();
        for _ in 0..3 {
            ctx.set_hint(HintScope::TextBuffer, 1, Hint::TextColor, 0x445566);
            ctx.set_hint(HintScope::TextBuffer, 1, Hint::Weight, 1);
            ctx.set_hint(HintScope::TextBuffer, 1, Hint::ReverseColor, 1);
        }
        ctx.clear_hint(HintScope::TextBuffer, 1, Hint::TextColor);
        ctx.clear_hint(HintScope::TextBuffer, 1, Hint::Weight);
        ctx.clear_hint(HintScope::TextBuffer, 1, Hint::ReverseColor);

        assert_eq!(
            *ctx.record(SurfaceKind::TextBuffer, StyleClass::Emphasized),
            BUFFER_DEFAULTS[1]
        );
    }

    #[test]
    fn clear_restores_only_the_named_hint() {
        let mut ctx = StyleContext::new();
        ctx.set_hint(HintScope::TextGrid, 0, Hint::TextColor, 0x111111);
        ctx.set_hint(HintScope::TextGrid, 0, Hint::BackColor, 0x222222);
        ctx.clear_hint(HintScope::TextGrid, 0, Hint::TextColor);

        let record = ctx.record(SurfaceKind::TextGrid, StyleClass::Normal);
        assert_eq!(record.fg, GRID_DEFAULTS[0].fg);
        assert_eq!(record.bg, Rgb::new(0x22, 0x22, 0x22));
    }

    #[test]
    fn buffer_normal_hints_update_published_globals() {
        let mut ctx = StyleContext::new();
        ctx.set_hint(HintScope::TextBuffer, 0, Hint::BackColor, 0x102030);
        assert_eq!(ctx.window_color(), Rgb::new(0x10, 0x20, 0x30));

        ctx.set_hint(HintScope::TextBuffer, 0, Hint::TextColor, 0x99aabb);
        assert_eq!(ctx.caret_color(), Rgb::new(0x99, 0xaa, 0xbb));
        assert_eq!(ctx.more_color(), Rgb::new(0x99, 0xaa, 0xbb));

        // Other classes and surfaces leave the globals alone.
        ctx.set_hint(HintScope::TextGrid, 0, Hint::BackColor, 0x010101);
        ctx.set_hint(HintScope::TextBuffer, 3, Hint::BackColor, 0x020202);
        assert_eq!(ctx.window_color(), Rgb::new(0x10, 0x20, 0x30));
    }

    #[test]
    fn disabled_hints_still_count_but_change_nothing() {
        let mut ctx = StyleContext::new();
        ctx.set_hints_enabled(false);
        ctx.set_hint(HintScope::TextBuffer, 0, Hint::BackColor, 0x102030);
        ctx.clear_hint(HintScope::TextBuffer, 0, Hint::BackColor);

        assert_eq!(ctx.set_call_count(), 1);
        assert_eq!(ctx.clear_call_count(), 1);
        assert_eq!(
            *ctx.record(SurfaceKind::TextBuffer, StyleClass::Normal),
            BUFFER_DEFAULTS[0]
        );
    }

    #[test]
    fn all_types_counts_each_fanned_out_call() {
        let mut ctx = StyleContext::new();
        ctx.set_hint(HintScope::AllTypes, 0, Hint::Weight, 1);
        assert_eq!(ctx.set_call_count(), 3);
    }

    #[test]
    fn out_of_range_class_clamps_to_normal() {
        let mut ctx = StyleContext::new();
        ctx.set_hint(HintScope::TextGrid, 999, Hint::BackColor, 0x304050);
        assert_eq!(
            ctx.record(SurfaceKind::TextGrid, StyleClass::Normal).bg,
            Rgb::new(0x30, 0x40, 0x50)
        );
    }

    #[test]
    fn proportional_hint_ignored_on_grid_surfaces() {
        let mut ctx = StyleContext::new();
        ctx.set_hint(HintScope::TextGrid, 0, Hint::Proportional, 1);
        assert_eq!(
            ctx.record(SurfaceKind::TextGrid, StyleClass::Normal).font,
            Font::MonoRoman
        );

        ctx.set_hint(HintScope::TextBuffer, 0, Hint::Proportional, 1);
        assert_eq!(
            ctx.record(SurfaceKind::TextBuffer, StyleClass::Normal).font,
            Font::PropRoman
        );
    }

    #[test]
    fn weight_and_oblique_preserve_other_axes() {
        let mut ctx = StyleContext::new();
        ctx.set_hint(HintScope::TextBuffer, 0, Hint::Proportional, 1);
        ctx.set_hint(HintScope::TextBuffer, 0, Hint::Weight, 1);
        ctx.set_hint(HintScope::TextBuffer, 0, Hint::Oblique, 1);
        assert_eq!(
            ctx.record(SurfaceKind::TextBuffer, StyleClass::Normal).font,
            Font::PropBoldItalic
        );

        ctx.set_hint(HintScope::TextBuffer, 0, Hint::Weight, 0);
        assert_eq!(
            ctx.record(SurfaceKind::TextBuffer, StyleClass::Normal).font,
            Font::PropItalic
        );
    }

    #[test]
    fn measure_reports_fixed_values() {
        let ctx = StyleContext::new();
        let kind = SurfaceKind::TextBuffer;
        assert_eq!(ctx.measure(kind, 0, Hint::Indentation), Some(0));
        assert_eq!(ctx.measure(kind, 0, Hint::Justification), Some(JUSTIFY_LEFT_FLUSH));
        assert_eq!(ctx.measure(kind, 0, Hint::Size), Some(1));
        assert_eq!(ctx.measure(kind, 3, Hint::Weight), Some(1));
        assert_eq!(ctx.measure(kind, 0, Hint::Weight), Some(0));
        assert_eq!(ctx.measure(kind, 1, Hint::Oblique), Some(1));
        assert_eq!(ctx.measure(kind, 0, Hint::TextColor), None);
        assert_eq!(ctx.measure(kind, 99, Hint::Size), None);
    }

    #[test]
    fn measure_proportional_is_always_false() {
        let mut ctx = StyleContext::new();
        ctx.set_hint(HintScope::TextBuffer, 0, Hint::Proportional, 1);
        assert_eq!(
            ctx.measure(SurfaceKind::TextBuffer, 0, Hint::Proportional),
            Some(0)
        );
    }

    #[test]
    fn distinguishable_by_compiled_attrs() {
        let ctx = StyleContext::new();
        assert!(ctx.distinguishable(SurfaceKind::TextBuffer, 0, 3));
        assert!(!ctx.distinguishable(SurfaceKind::TextBuffer, 0, 2));
        assert!(!ctx.distinguishable(SurfaceKind::TextBuffer, 0, 99));
    }
}
