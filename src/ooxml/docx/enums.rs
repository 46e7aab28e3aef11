/// Enumerations for Word document elements.
///
/// Values match the VBA `Wd*` enumerations so they interoperate with code
/// written against the Word object model.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an inline shape.
///
/// Corresponds to the VBA `WdInlineShapeType` enumeration; [`value`](Self::value)
/// returns the VBA constant.
///
/// # Examples
///
/// ```rust
/// use longan::ooxml::docx::enums::WdInlineShape;
///
/// assert_eq!(WdInlineShape::Picture.value(), 3);
/// assert_eq!(WdInlineShape::NotImplemented.to_string(), "NOT_IMPLEMENTED");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum WdInlineShape {
    /// Picture embedded in the package.
    Picture = 3,
    /// Picture whose image data is linked from outside the package.
    LinkedPicture = 4,
    /// Chart.
    Chart = 12,
    /// SmartArt diagram.
    SmartArt = 15,
    /// Graphic content this crate does not classify (e.g. a custom payload).
    NotImplemented = -6,
}

impl WdInlineShape {
    #[inline]
    pub const fn value(self) -> i8 {
        self as i8
    }

    /// Inverse of [`value`](Self::value).
    pub fn from_value(value: i8) -> Option<Self> {
        match value {
            3 => Some(Self::Picture),
            4 => Some(Self::LinkedPicture),
            12 => Some(Self::Chart),
            15 => Some(Self::SmartArt),
            -6 => Some(Self::NotImplemented),
            _ => None,
        }
    }

    /// Whether the shape is a picture, linked or embedded.
    #[inline]
    pub const fn is_picture(self) -> bool {
        matches!(self, Self::Picture | Self::LinkedPicture)
    }
}

impl fmt::Display for WdInlineShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Picture => "PICTURE",
            Self::LinkedPicture => "LINKED_PICTURE",
            Self::Chart => "CHART",
            Self::SmartArt => "SMART_ART",
            Self::NotImplemented => "NOT_IMPLEMENTED",
        };
        f.write_str(name)
    }
}

/// Type of break inserted into a run with `w:br`.
///
/// Corresponds to the VBA `WdBreakType` enumeration, restricted to the breaks
/// a `w:br` element can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum WdBreakType {
    /// Line break (text wrapping). No `w:type` attribute.
    #[default]
    Line = 6,
    /// Page break.
    Page = 7,
    /// Column break.
    Column = 8,
}

impl WdBreakType {
    /// Value of the `w:type` attribute, `None` for a plain line break.
    #[inline]
    pub const fn to_xml(self) -> Option<&'static str> {
        match self {
            Self::Line => None,
            Self::Page => Some("page"),
            Self::Column => Some("column"),
        }
    }

    /// Parse the `w:type` attribute of a `w:br`; an absent attribute or
    /// `textWrapping` is a line break.
    #[inline]
    pub fn from_xml(s: Option<&str>) -> Option<Self> {
        match s {
            None | Some("textWrapping") => Some(Self::Line),
            Some("page") => Some(Self::Page),
            Some("column") => Some(Self::Column),
            _ => None,
        }
    }
}

impl fmt::Display for WdBreakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => write!(f, "Line"),
            Self::Page => write!(f, "Page"),
            Self::Column => write!(f, "Column"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_shape_values() {
        for kind in [
            WdInlineShape::Picture,
            WdInlineShape::LinkedPicture,
            WdInlineShape::Chart,
            WdInlineShape::SmartArt,
            WdInlineShape::NotImplemented,
        ] {
            assert_eq!(WdInlineShape::from_value(kind.value()), Some(kind));
        }
        assert_eq!(WdInlineShape::NotImplemented.value(), -6);
        assert_eq!(WdInlineShape::from_value(0), None);
        assert!(WdInlineShape::LinkedPicture.is_picture());
        assert!(!WdInlineShape::Chart.is_picture());
    }

    #[test]
    fn test_inline_shape_display() {
        assert_eq!(WdInlineShape::LinkedPicture.to_string(), "LINKED_PICTURE");
        assert_eq!(WdInlineShape::SmartArt.to_string(), "SMART_ART");
    }

    #[test]
    fn test_break_type_xml() {
        assert_eq!(WdBreakType::Page.to_xml(), Some("page"));
        assert_eq!(WdBreakType::Line.to_xml(), None);
        assert_eq!(WdBreakType::from_xml(None), Some(WdBreakType::Line));
        assert_eq!(WdBreakType::from_xml(Some("column")), Some(WdBreakType::Column));
        assert_eq!(WdBreakType::from_xml(Some("bogus")), None);
        assert_eq!(WdBreakType::default(), WdBreakType::Line);
    }
}
