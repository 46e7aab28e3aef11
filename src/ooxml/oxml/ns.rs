//! Namespace URIs, the conventional prefix map, and qualified tag names.
//!
//! Elements in a part are identified by namespace URI and local name, never by
//! the prefix a producer happened to choose. `QName` carries all three so a
//! freshly created element can be written with the conventional prefix while
//! lookups still compare on `{uri}local`.
use phf::phf_map;
use std::fmt;

/// DrawingML main namespace
pub const DML_MAIN: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// DrawingML chart namespace
pub const DML_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
/// DrawingML diagram (SmartArt) namespace
pub const DML_DIAGRAM: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";
/// DrawingML picture namespace
pub const DML_PICTURE: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
/// DrawingML wordprocessing drawing namespace
pub const DML_WORDPROCESSING_DRAWING: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
/// Office relationships namespace
pub const OFC_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// WordprocessingML main namespace
pub const WML_MAIN: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// The reserved `xml:` namespace
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Conventional prefix for each namespace this crate creates elements in.
pub static NSMAP: phf::Map<&'static str, &'static str> = phf_map! {
    "a" => DML_MAIN,
    "c" => DML_CHART,
    "dgm" => DML_DIAGRAM,
    "pic" => DML_PICTURE,
    "r" => OFC_RELATIONSHIPS,
    "w" => WML_MAIN,
    "wp" => DML_WORDPROCESSING_DRAWING,
    "xml" => XML,
};

/// A namespace-qualified name.
///
/// An empty `uri` denotes a name in no namespace (e.g. the `uri` attribute of
/// `a:graphicData`); such names have an empty prefix as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName {
    prefix: &'static str,
    uri: &'static str,
    local: &'static str,
}

impl QName {
    #[inline]
    pub const fn new(prefix: &'static str, uri: &'static str, local: &'static str) -> Self {
        Self { prefix, uri, local }
    }

    /// A name in no namespace.
    #[inline]
    pub const fn unqualified(local: &'static str) -> Self {
        Self::new("", "", local)
    }

    #[inline]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    #[inline]
    pub const fn uri(&self) -> &'static str {
        self.uri
    }

    #[inline]
    pub const fn local_name(&self) -> &'static str {
        self.local
    }

    /// The name as written in markup, e.g. `w:p`.
    pub fn prefixed(&self) -> String {
        if self.prefix.is_empty() {
            self.local.to_string()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    /// Clark notation, e.g. `{http://...}p`.
    pub fn clark(&self) -> String {
        if self.uri.is_empty() {
            self.local.to_string()
        } else {
            format!("{{{}}}{}", self.uri, self.local)
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefixed())
    }
}

/// Resolve a prefixed tag such as `"w:p"` against [`NSMAP`].
///
/// Returns `None` for an unknown prefix or an unprefixed tag.
pub fn qn(tag: &'static str) -> Option<QName> {
    let (prefix, local) = tag.split_once(':')?;
    let uri = NSMAP.get(prefix)?;
    Some(QName::new(prefix, uri, local))
}

/// `xmlns:` declarations for the given prefixes, space separated.
///
/// Unknown prefixes are skipped.
pub fn nsdecls(prefixes: &[&str]) -> String {
    prefixes
        .iter()
        .filter_map(|p| NSMAP.get(p).map(|uri| format!(r#"xmlns:{}="{}""#, p, uri)))
        .collect::<Vec<_>>()
        .join(" ")
}

// WordprocessingML
pub const W_BODY: QName = QName::new("w", WML_MAIN, "body");
pub const W_BR: QName = QName::new("w", WML_MAIN, "br");
pub const W_CR: QName = QName::new("w", WML_MAIN, "cr");
pub const W_DOCUMENT: QName = QName::new("w", WML_MAIN, "document");
pub const W_DRAWING: QName = QName::new("w", WML_MAIN, "drawing");
pub const W_GRID_COL: QName = QName::new("w", WML_MAIN, "gridCol");
pub const W_P: QName = QName::new("w", WML_MAIN, "p");
pub const W_PG_MAR: QName = QName::new("w", WML_MAIN, "pgMar");
pub const W_PG_SZ: QName = QName::new("w", WML_MAIN, "pgSz");
pub const W_P_PR: QName = QName::new("w", WML_MAIN, "pPr");
pub const W_P_STYLE: QName = QName::new("w", WML_MAIN, "pStyle");
pub const W_R: QName = QName::new("w", WML_MAIN, "r");
pub const W_R_PR: QName = QName::new("w", WML_MAIN, "rPr");
pub const W_SECT_PR: QName = QName::new("w", WML_MAIN, "sectPr");
pub const W_T: QName = QName::new("w", WML_MAIN, "t");
pub const W_TAB: QName = QName::new("w", WML_MAIN, "tab");
pub const W_TBL: QName = QName::new("w", WML_MAIN, "tbl");
pub const W_TBL_GRID: QName = QName::new("w", WML_MAIN, "tblGrid");
pub const W_TBL_PR: QName = QName::new("w", WML_MAIN, "tblPr");
pub const W_TC: QName = QName::new("w", WML_MAIN, "tc");
pub const W_TR: QName = QName::new("w", WML_MAIN, "tr");

// WordprocessingML attributes
pub const W_BOTTOM: QName = QName::new("w", WML_MAIN, "bottom");
pub const W_FOOTER: QName = QName::new("w", WML_MAIN, "footer");
pub const W_GUTTER: QName = QName::new("w", WML_MAIN, "gutter");
pub const W_H: QName = QName::new("w", WML_MAIN, "h");
pub const W_HEADER: QName = QName::new("w", WML_MAIN, "header");
pub const W_LEFT: QName = QName::new("w", WML_MAIN, "left");
pub const W_RIGHT: QName = QName::new("w", WML_MAIN, "right");
pub const W_TOP: QName = QName::new("w", WML_MAIN, "top");
pub const W_TYPE: QName = QName::new("w", WML_MAIN, "type");
pub const W_VAL: QName = QName::new("w", WML_MAIN, "val");
pub const W_W: QName = QName::new("w", WML_MAIN, "w");
pub const XML_SPACE: QName = QName::new("xml", XML, "space");

// DrawingML
pub const A_BLIP: QName = QName::new("a", DML_MAIN, "blip");
pub const A_GRAPHIC: QName = QName::new("a", DML_MAIN, "graphic");
pub const A_GRAPHIC_DATA: QName = QName::new("a", DML_MAIN, "graphicData");
pub const PIC_BLIP_FILL: QName = QName::new("pic", DML_PICTURE, "blipFill");
pub const PIC_PIC: QName = QName::new("pic", DML_PICTURE, "pic");
pub const WP_EXTENT: QName = QName::new("wp", DML_WORDPROCESSING_DRAWING, "extent");
pub const WP_INLINE: QName = QName::new("wp", DML_WORDPROCESSING_DRAWING, "inline");

// DrawingML attributes
pub const ATTR_CX: QName = QName::unqualified("cx");
pub const ATTR_CY: QName = QName::unqualified("cy");
pub const ATTR_URI: QName = QName::unqualified("uri");
pub const R_EMBED: QName = QName::new("r", OFC_RELATIONSHIPS, "embed");
pub const R_ID: QName = QName::new("r", OFC_RELATIONSHIPS, "id");
pub const R_LINK: QName = QName::new("r", OFC_RELATIONSHIPS, "link");
