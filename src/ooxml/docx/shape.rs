/// Inline shapes: graphics anchored in the text flow (`<wp:inline>`).
use crate::ooxml::docx::enums::WdInlineShape;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::oxml::ns::{
    A_BLIP, A_GRAPHIC, A_GRAPHIC_DATA, ATTR_CX, ATTR_CY, ATTR_URI, DML_CHART, DML_DIAGRAM,
    DML_PICTURE, PIC_BLIP_FILL, PIC_PIC, QName, R_EMBED, R_LINK, WP_EXTENT, WP_INLINE,
};
use crate::ooxml::oxml::{NodeId, SharedTree, XmlTree};
use log::warn;
use std::sync::Arc;

/// One inline graphic.
///
/// The kind is derived from the `a:graphicData` payload every time it is
/// asked for; an `InlineShape` stores nothing but its position in the tree.
#[derive(Debug, Clone)]
pub struct InlineShape {
    tree: SharedTree,
    node: NodeId,
}

impl InlineShape {
    pub(crate) fn new(tree: SharedTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// The `wp:inline` element this shape wraps.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Classify the shape. Never fails: unrecognized content is
    /// [`WdInlineShape::NotImplemented`].
    pub fn kind(&self) -> WdInlineShape {
        classify(&self.tree.read(), self.node)
    }

    /// Display width in EMU from `wp:extent/@cx`.
    pub fn width(&self) -> Option<i64> {
        self.extent(&ATTR_CX)
    }

    /// Display height in EMU from `wp:extent/@cy`.
    pub fn height(&self) -> Option<i64> {
        self.extent(&ATTR_CY)
    }

    fn extent(&self, attr: &QName) -> Option<i64> {
        let tree = self.tree.read();
        let extent = tree.first_child_named(self.node, &WP_EXTENT)?;
        atoi_simd::parse::<i64, false, false>(tree.attr(extent, attr)?.as_bytes()).ok()
    }

    /// rId of the image part embedded in the package, for pictures.
    pub fn embed_rid(&self) -> Option<String> {
        self.blip_attr(&R_EMBED)
    }

    /// rId of the external image the picture is linked to.
    pub fn link_rid(&self) -> Option<String> {
        self.blip_attr(&R_LINK)
    }

    fn blip_attr(&self, attr: &QName) -> Option<String> {
        let tree = self.tree.read();
        let blip = picture_blip(&tree, self.node)?;
        tree.attr(blip, attr).map(str::to_string)
    }
}

fn graphic_data(tree: &XmlTree, inline: NodeId) -> Option<NodeId> {
    tree.find_path(inline, &[A_GRAPHIC, A_GRAPHIC_DATA])
}

/// `pic:pic/pic:blipFill/a:blip` under the shape's graphic data.
fn picture_blip(tree: &XmlTree, inline: NodeId) -> Option<NodeId> {
    let data = graphic_data(tree, inline)?;
    tree.find_path(data, &[PIC_PIC, PIC_BLIP_FILL, A_BLIP])
}

/// Shape kind of the `wp:inline` element `inline`.
///
/// Decided by the `uri` of its `a:graphicData`:
///
/// - picture namespace: a blip with an `r:link` is a linked picture (even when
///   it also has an `r:embed`), one with only `r:embed` a picture; no blip or
///   a blip with neither id is not implemented
/// - chart namespace: chart
/// - diagram namespace: SmartArt
/// - anything else, including a missing graphic: not implemented
pub fn classify(tree: &XmlTree, inline: NodeId) -> WdInlineShape {
    let Some(data) = graphic_data(tree, inline) else {
        warn!("inline shape {} has no a:graphic/a:graphicData", inline.index());
        return WdInlineShape::NotImplemented;
    };

    match tree.attr(data, &ATTR_URI).unwrap_or_default() {
        DML_PICTURE => {
            let blip = tree.find_path(data, &[PIC_PIC, PIC_BLIP_FILL, A_BLIP]);
            let has = |attr: &QName| blip.is_some_and(|b| tree.attr(b, attr).is_some());
            if has(&R_LINK) {
                WdInlineShape::LinkedPicture
            } else if has(&R_EMBED) {
                WdInlineShape::Picture
            } else {
                warn!(
                    "picture {} has no blip reference (neither r:embed nor r:link)",
                    inline.index()
                );
                WdInlineShape::NotImplemented
            }
        },
        DML_CHART => WdInlineShape::Chart,
        DML_DIAGRAM => WdInlineShape::SmartArt,
        other => {
            warn!("unrecognized graphic data uri '{}'", other);
            WdInlineShape::NotImplemented
        },
    }
}

/// Every inline shape under a body, at any depth, in document order.
///
/// Not a stored list: each call walks the current tree, so shapes added or
/// removed through other handles are reflected immediately.
#[derive(Debug, Clone)]
pub struct InlineShapes {
    tree: SharedTree,
    body: NodeId,
}

impl InlineShapes {
    pub(crate) fn new(tree: SharedTree, body: NodeId) -> Self {
        Self { tree, body }
    }

    fn nodes(&self) -> Vec<NodeId> {
        let tree = self.tree.read();
        tree.descendants(self.body)
            .filter(|&id| tree.is(id, &WP_INLINE))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape at `index`; negative values count from the end (`-1` is the last).
    ///
    /// # Errors
    ///
    /// [`OoxmlError::IndexOutOfRange`] unless `-len <= index < len`.
    pub fn get(&self, index: isize) -> Result<InlineShape> {
        let nodes = self.nodes();
        let len = nodes.len();
        let out_of_range = || OoxmlError::IndexOutOfRange { index, len };

        let normalized = if index < 0 {
            index.checked_add_unsigned(len).ok_or_else(out_of_range)?
        } else {
            index
        };
        let position = usize::try_from(normalized).map_err(|_| out_of_range())?;
        let node = *nodes.get(position).ok_or_else(out_of_range)?;
        Ok(InlineShape::new(Arc::clone(&self.tree), node))
    }

    /// Iterate over the shapes present at the time of the call.
    pub fn iter(&self) -> std::vec::IntoIter<InlineShape> {
        self.nodes()
            .into_iter()
            .map(|node| InlineShape::new(Arc::clone(&self.tree), node))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl IntoIterator for &InlineShapes {
    type Item = InlineShape;
    type IntoIter = std::vec::IntoIter<InlineShape>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
