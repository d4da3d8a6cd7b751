//! Eight-way font classification.
//!
//! Styles resolve to one of eight faces: mono or proportional, crossed
//! with roman, bold, italic, and bold-italic. The three axes are
//! recombined independently when a hint changes just one of them.

/// Resolved font face for a style class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Monospace roman.
    MonoRoman,
    /// Monospace bold.
    MonoBold,
    /// Monospace italic.
    MonoItalic,
    /// Monospace bold italic.
    MonoBoldItalic,
    /// Proportional roman.
    PropRoman,
    /// Proportional bold.
    PropBold,
    /// Proportional italic.
    PropItalic,
    /// Proportional bold italic.
    PropBoldItalic,
}

impl Font {
    /// Whether this face is proportional.
    #[must_use]
    pub const fn is_proportional(self) -> bool {
        matches!(
            self,
            Self::PropRoman | Self::PropBold | Self::PropItalic | Self::PropBoldItalic
        )
    }

    /// Whether this face is bold.
    #[must_use]
    pub const fn is_bold(self) -> bool {
        matches!(
            self,
            Self::MonoBold | Self::MonoBoldItalic | Self::PropBold | Self::PropBoldItalic
        )
    }

    /// Whether this face is italic.
    #[must_use]
    pub const fn is_italic(self) -> bool {
        matches!(
            self,
            Self::MonoItalic | Self::MonoBoldItalic | Self::PropItalic | Self::PropBoldItalic
        )
    }

    /// Recombine the three axes into a face.
    #[must_use]
    pub const fn compose(proportional: bool, bold: bool, italic: bool) -> Self {
        match (proportional, bold, italic) {
            (false, false, false) => Self::MonoRoman,
            (false, false, true) => Self::MonoItalic,
            (false, true, false) => Self::MonoBold,
            (false, true, true) => Self::MonoBoldItalic,
            (true, false, false) => Self::PropRoman,
            (true, false, true) => Self::PropItalic,
            (true, true, false) => Self::PropBold,
            (true, true, true) => Self::PropBoldItalic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Font;

    #[test]
    fn compose_round_trips_all_axes() {
        for prop in [false, true] {
            for bold in [false, true] {
                for italic in [false, true] {
                    let font = Font::compose(prop, bold, italic);
                    assert_eq!(font.is_proportional(), prop);
                    assert_eq!(font.is_bold(), bold);
                    assert_eq!(font.is_italic(), italic);
                }
            }
        }
    }

    #[test]
    fn single_axis_change_preserves_others() {
        let font = Font::MonoBoldItalic;
        let toggled = Font::compose(true, font.is_bold(), font.is_italic());
        assert_eq!(toggled, Font::PropBoldItalic);
    }
}
