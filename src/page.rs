//! Page geometry in points (1/72 inch)
//!
//! A [`PageConfiguration`] pairs a nominal page size with margins and derives
//! the printable rectangle handed to the engine. Margins may be negative: a
//! negative margin grows the printable rectangle past the page edge instead of
//! insetting it, which is what the A4 preset relies on.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Nominal page size in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize { width: 595.22, height: 841.85 };
    pub const LETTER: PageSize = PageSize { width: 612.0, height: 792.0 };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Margins on each side of the page, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Insets {
    /// Default A4 margins. Negative on purpose: content overprints to the
    /// page edge.
    pub const A4: Insets = Insets::uniform(-36.0);
    pub const ZERO: Insets = Insets::uniform(0.0);

    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self { top, left, bottom, right }
    }

    pub const fn uniform(value: f64) -> Self {
        Self { top: value, left: value, bottom: value, right: value }
    }
}

impl Default for Insets {
    fn default() -> Self {
        Insets::A4
    }
}

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Paper and margin model understood by print-to-PDF engines.
///
/// Engines cannot express negative margins, so the negative part of a margin
/// is folded into the paper size. `paper - margins` always equals the
/// printable rectangle of the originating [`PageConfiguration`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintGeometry {
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_left: f64,
    pub margin_bottom: f64,
    pub margin_right: f64,
}

impl PrintGeometry {
    /// Same geometry converted from points to inches
    pub fn to_inches(&self) -> PrintGeometry {
        const POINTS_PER_INCH: f64 = 72.0;
        PrintGeometry {
            paper_width: self.paper_width / POINTS_PER_INCH,
            paper_height: self.paper_height / POINTS_PER_INCH,
            margin_top: self.margin_top / POINTS_PER_INCH,
            margin_left: self.margin_left / POINTS_PER_INCH,
            margin_bottom: self.margin_bottom / POINTS_PER_INCH,
            margin_right: self.margin_right / POINTS_PER_INCH,
        }
    }
}

/// Page size plus margins for one conversion
///
/// # Examples
///
/// ```
/// use html_to_pdf::{Insets, PageConfiguration};
///
/// let page = PageConfiguration::a4(Insets::A4);
/// let rect = page.rect();
/// assert!((rect.width - 667.22).abs() < 1e-9);
/// assert_eq!(rect.x, -36.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageConfiguration {
    pub page_size: PageSize,
    #[serde(default)]
    pub margins: Insets,
}

impl PageConfiguration {
    pub const fn new(page_size: PageSize, margins: Insets) -> Self {
        Self { page_size, margins }
    }

    /// A4 page with the given margins
    pub const fn a4(margins: Insets) -> Self {
        Self::new(PageSize::A4, margins)
    }

    /// Printable rectangle: page size minus margins, origin at (left, top)
    pub fn rect(&self) -> Rect {
        let m = &self.margins;
        Rect {
            x: m.left,
            y: m.top,
            width: self.page_size.width - m.left - m.right,
            height: self.page_size.height - m.top - m.bottom,
        }
    }

    /// Reject configurations whose printable region has no area.
    pub fn validate(&self) -> Result<()> {
        let size = &self.page_size;
        if !(size.width.is_finite() && size.height.is_finite()) || size.width <= 0.0 || size.height <= 0.0 {
            return Err(Error::InvalidPage(format!(
                "page size must be positive, got {}x{}",
                size.width, size.height
            )));
        }

        let rect = self.rect();
        if !(rect.width.is_finite() && rect.height.is_finite()) {
            return Err(Error::InvalidPage("margins must be finite".into()));
        }
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(Error::InvalidPage(format!(
                "printable area {}x{} is empty; margins exceed the page",
                rect.width, rect.height
            )));
        }
        Ok(())
    }

    /// Paper and margins (in points) an engine should print with
    pub fn print_geometry(&self) -> PrintGeometry {
        let m = &self.margins;
        let grow = |v: f64| -v.min(0.0);
        PrintGeometry {
            paper_width: self.page_size.width + grow(m.left) + grow(m.right),
            paper_height: self.page_size.height + grow(m.top) + grow(m.bottom),
            margin_top: m.top.max(0.0),
            margin_left: m.left.max(0.0),
            margin_bottom: m.bottom.max(0.0),
            margin_right: m.right.max(0.0),
        }
    }
}

impl Default for PageConfiguration {
    fn default() -> Self {
        Self::a4(Insets::A4)
    }
}
