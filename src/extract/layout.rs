//! Geometry for the content-shape segmentation fallback.
//!
//! A live page knows where every box is drawn; a saved snapshot usually does
//! not. [`Layout`] abstracts over that, and [`InlineStyleLayout`] reads what a
//! snapshot can tell us from inline `style` attributes.

use scraper::ElementRef;

/// CSS `position` of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Positioning {
    /// Fixed and sticky boxes are page chrome, not conversation.
    pub fn is_pinned(self) -> bool {
        matches!(self, Self::Fixed | Self::Sticky)
    }
}

/// Rendered box of an element. `None` means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Source of rendered geometry.
pub trait Layout {
    fn positioning(&self, element: ElementRef<'_>) -> Positioning;
    fn bounds(&self, element: ElementRef<'_>) -> Bounds;
}

/// Reads `position`, `top`, `width` and `height` from the inline `style`
/// attribute. Only pixel (or unitless) lengths are understood.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineStyleLayout;

impl InlineStyleLayout {
    fn property<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
        let style = element.value().attr("style")?;
        style.split(';').rev().find_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            property
                .trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    fn length(element: ElementRef<'_>, name: &str) -> Option<f64> {
        let value = Self::property(element, name)?;
        let value = value
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        let number = value.strip_suffix("px").unwrap_or(&value).trim();
        number.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

impl Layout for InlineStyleLayout {
    fn positioning(&self, element: ElementRef<'_>) -> Positioning {
        let Some(value) = Self::property(element, "position") else {
            return Positioning::Static;
        };
        match value.trim_end_matches("!important").trim().to_ascii_lowercase().as_str() {
            "relative" => Positioning::Relative,
            "absolute" => Positioning::Absolute,
            "fixed" => Positioning::Fixed,
            "sticky" | "-webkit-sticky" => Positioning::Sticky,
            _ => Positioning::Static,
        }
    }

    fn bounds(&self, element: ElementRef<'_>) -> Bounds {
        Bounds {
            top: Self::length(element, "top"),
            width: Self::length(element, "width"),
            height: Self::length(element, "height"),
        }
    }
}
