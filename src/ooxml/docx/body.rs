/// The document body: ordered block content ending in section properties.
use crate::ooxml::docx::paragraph::Paragraph;
use crate::ooxml::docx::table::{Table, build_table};
use crate::ooxml::error::Result;
use crate::ooxml::oxml::ns::{W_P, W_SECT_PR, W_TBL};
use crate::ooxml::oxml::{NodeId, SharedTree, XmlTree};
use log::{debug, trace};
use smallvec::SmallVec;
use std::sync::Arc;

/// Content model over a `<w:body>` element.
///
/// A body holds paragraphs and tables in reading order, optionally followed
/// by one `<w:sectPr>`. Every operation here keeps that element last: new
/// blocks are inserted in front of it and [`clear_content`](Self::clear_content)
/// leaves it in place.
///
/// `Body` is a thin handle; any number of them may exist over the same body
/// and all see the live tree.
#[derive(Debug, Clone)]
pub struct Body {
    tree: SharedTree,
    node: NodeId,
}

impl Body {
    pub(crate) fn new(tree: SharedTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// The `w:body` element this handle wraps.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Append an empty paragraph.
    pub fn add_paragraph(&self) -> Result<Paragraph> {
        let mut tree = self.tree.write();
        let p = tree.create_element(&W_P);
        insert_block(&mut tree, self.node, p)?;
        debug!("added paragraph {} to body", p.index());
        Ok(Paragraph::new(Arc::clone(&self.tree), p))
    }

    /// Append a `rows` x `cols` table whose cells each hold one empty paragraph.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::InvalidFormat`](crate::ooxml::OoxmlError::InvalidFormat)
    /// when either dimension is zero. The body is left untouched.
    pub fn add_table(&self, rows: usize, cols: usize) -> Result<Table> {
        let mut tree = self.tree.write();
        let tbl = build_table(&mut tree, rows, cols)?;
        insert_block(&mut tree, self.node, tbl)?;
        debug!("added {}x{} table {} to body", rows, cols, tbl.index());
        Ok(Table::new(Arc::clone(&self.tree), tbl))
    }

    /// Remove all content except the section properties. Returns `self` for chaining.
    pub fn clear_content(&self) -> Result<&Self> {
        let mut tree = self.tree.write();
        let content: SmallVec<[NodeId; 32]> = tree
            .children(self.node)
            .iter()
            .copied()
            .filter(|&c| !tree.is(c, &W_SECT_PR))
            .collect();
        for &child in &content {
            tree.detach(child);
        }
        debug!("cleared {} nodes from body", content.len());
        Ok(self)
    }

    /// Direct `w:p` children in document order. Paragraphs inside tables are
    /// not included.
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        let tree = self.tree.read();
        tree.children_named(self.node, &W_P)
            .map(|node| Paragraph::new(Arc::clone(&self.tree), node))
            .collect()
    }

    /// Direct `w:tbl` children in document order.
    pub fn tables(&self) -> Vec<Table> {
        let tree = self.tree.read();
        tree.children_named(self.node, &W_TBL)
            .map(|node| Table::new(Arc::clone(&self.tree), node))
            .collect()
    }
}

/// Insert the detached block `child` as the last content of `body`: right
/// before `w:sectPr` when there is one, at the end otherwise.
pub(crate) fn insert_block(tree: &mut XmlTree, body: NodeId, child: NodeId) -> Result<()> {
    match tree.first_child_named(body, &W_SECT_PR) {
        Some(sect_pr) => {
            trace!("inserting node {} before sectPr {}", child.index(), sect_pr.index());
            tree.insert_before(body, child, sect_pr)
        },
        None => {
            trace!("appending node {} to body", child.index());
            tree.append_child(body, child)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::error::OoxmlError;
    use crate::ooxml::oxml::ns::{W_BODY, W_TC, W_TR, WML_MAIN, nsdecls};
    use crate::ooxml::oxml::{parse, serialize_node};
    use proptest::prelude::*;

    fn body_xml(p_count: usize, tbl: bool, sect_pr: bool) -> String {
        let mut xml = format!("<w:body {}>", nsdecls(&["w"]));
        for _ in 0..p_count {
            xml.push_str("<w:p/>");
        }
        if tbl {
            xml.push_str(
                "<w:tbl><w:tblPr/><w:tblGrid><w:gridCol/></w:tblGrid><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>",
            );
        }
        if sect_pr {
            xml.push_str("<w:sectPr/>");
        }
        xml.push_str("</w:body>");
        xml
    }

    fn body(xml: &str) -> Body {
        let tree = parse(xml.as_bytes()).unwrap();
        let root = tree.root();
        Body::new(tree.into_shared(), root)
    }

    fn markup(body: &Body) -> String {
        let tree = body.tree.read();
        String::from_utf8(serialize_node(&tree, body.node).unwrap()).unwrap()
    }

    fn last_is_sect_pr(body: &Body) -> bool {
        let tree = body.tree.read();
        tree.children(body.node)
            .last()
            .is_some_and(|&c| tree.is(c, &W_SECT_PR))
    }

    #[test]
    fn test_add_paragraph() {
        for (p_count, sect_pr) in [(0, false), (1, false), (0, true), (1, true)] {
            let b = body(&body_xml(p_count, false, sect_pr));
            let p = b.add_paragraph().unwrap();
            assert_eq!(markup(&b), body_xml(p_count + 1, false, sect_pr));
            assert_eq!(b.paragraphs().last().unwrap().node(), p.node());
        }
    }

    #[test]
    fn test_add_table() {
        for (p_count, sect_pr) in [(0, false), (1, false), (0, true), (1, true)] {
            let b = body(&body_xml(p_count, false, sect_pr));
            let table = b.add_table(1, 1).unwrap();
            assert_eq!(markup(&b), body_xml(p_count, true, sect_pr));
            assert_eq!(b.tables().len(), 1);
            assert_eq!(b.tables()[0].node(), table.node());
        }
    }

    #[test]
    fn test_add_table_zero_leaves_body_untouched() {
        let b = body(&body_xml(1, false, true));
        assert!(matches!(b.add_table(0, 2), Err(OoxmlError::InvalidFormat(_))));
        assert_eq!(markup(&b), body_xml(1, false, true));
    }

    #[test]
    fn test_clear_content() {
        for sect_pr in [false, true] {
            let xml = format!(
                "<w:body {}><w:p/><w:tbl/><w:p/>{}</w:body>",
                nsdecls(&["w"]),
                if sect_pr { "<w:sectPr/>" } else { "" }
            );
            let b = body(&xml);
            let same = b.clear_content().unwrap();
            assert_eq!(same.node(), b.node());
            let expected = if sect_pr {
                format!(r#"<w:body xmlns:w="{}"><w:sectPr/></w:body>"#, WML_MAIN)
            } else {
                format!(r#"<w:body xmlns:w="{}"/>"#, WML_MAIN)
            };
            assert_eq!(markup(&b), expected);
        }
    }

    #[test]
    fn test_clear_content_keeps_sect_pr_identity() {
        let b = body(&body_xml(2, true, true));
        let before = {
            let tree = b.tree.read();
            tree.first_child_named(b.node, &W_SECT_PR)
        };
        b.clear_content().unwrap().clear_content().unwrap();
        let tree = b.tree.read();
        assert_eq!(tree.children(b.node), &[before.unwrap()]);
    }

    #[test]
    fn test_paragraphs_skip_table_content() {
        let b = body(&body_xml(2, true, true));
        assert_eq!(b.paragraphs().len(), 2);
        assert_eq!(b.tables().len(), 1);
    }

    #[test]
    fn test_handles_share_tree() {
        let b = body(&body_xml(0, false, true));
        let other = b.clone();
        b.add_paragraph().unwrap();
        assert_eq!(other.paragraphs().len(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Paragraph,
        Table(usize, usize),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => Just(Op::Paragraph),
            2 => (1usize..4, 1usize..4).prop_map(|(r, c)| Op::Table(r, c)),
            1 => Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn prop_sect_pr_stays_last(
            p_count in 0usize..4,
            sect_pr in any::<bool>(),
            ops in proptest::collection::vec(op(), 0..12),
        ) {
            let b = body(&body_xml(p_count, false, sect_pr));
            let mut expected_blocks = p_count;
            for op in &ops {
                match op {
                    Op::Paragraph => {
                        b.add_paragraph().unwrap();
                        expected_blocks += 1;
                    },
                    Op::Table(rows, cols) => {
                        let t = b.add_table(*rows, *cols).unwrap();
                        let tree = b.tree.read();
                        let trs: Vec<_> = tree.children_named(t.node(), &W_TR).collect();
                        prop_assert_eq!(trs.len(), *rows);
                        for tr in trs {
                            prop_assert_eq!(tree.children_named(tr, &W_TC).count(), *cols);
                        }
                        expected_blocks += 1;
                    },
                    Op::Clear => {
                        b.clear_content().unwrap();
                        expected_blocks = 0;
                    },
                }
                if sect_pr {
                    prop_assert!(last_is_sect_pr(&b));
                } else {
                    prop_assert!(!last_is_sect_pr(&b));
                }
            }
            prop_assert_eq!(b.paragraphs().len() + b.tables().len(), expected_blocks);
        }

        #[test]
        fn prop_clear_content_idempotent(p_count in 0usize..5, tbl in any::<bool>(), sect_pr in any::<bool>()) {
            let b = body(&body_xml(p_count, tbl, sect_pr));
            b.clear_content().unwrap();
            let once = markup(&b);
            b.clear_content().unwrap();
            prop_assert_eq!(markup(&b), once);
            prop_assert!(b.paragraphs().is_empty());
            prop_assert!(b.tables().is_empty());
        }
    }

    #[test]
    fn test_body_root_is_body() {
        let b = body(&body_xml(0, false, false));
        let tree = b.tree.read();
        assert!(tree.is(b.node, &W_BODY));
    }
}
