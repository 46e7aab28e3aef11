/// Table, Row, and Cell handles for Word documents.
use crate::ooxml::docx::paragraph::{Paragraph, append_run_content, set_paragraph_style};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::oxml::ns::{
    W_GRID_COL, W_P, W_R, W_TBL, W_TBL_GRID, W_TBL_PR, W_TC, W_TR,
};
use crate::ooxml::oxml::{NodeId, SharedTree, XmlTree};
use smallvec::SmallVec;
use std::sync::Arc;

/// A table in a Word document.
///
/// Represents a `<w:tbl>` element. Tables contain rows, which contain cells,
/// which contain paragraphs.
///
/// # Example
///
/// ```rust,ignore
/// for table in document.tables()? {
///     println!("Table with {} rows", table.row_count());
///     for (row_idx, row) in table.rows().iter().enumerate() {
///         for (col_idx, cell) in row.cells().iter().enumerate() {
///             println!("Cell [{},{}]: {}", row_idx, col_idx, cell.text()?);
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    tree: SharedTree,
    node: NodeId,
}

impl Table {
    pub(crate) fn new(tree: SharedTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Number of `w:tr` rows.
    pub fn row_count(&self) -> usize {
        self.tree.read().children_named(self.node, &W_TR).count()
    }

    /// Number of grid columns declared in `w:tblGrid`.
    pub fn column_count(&self) -> usize {
        let tree = self.tree.read();
        tree.first_child_named(self.node, &W_TBL_GRID)
            .map_or(0, |grid| tree.children_named(grid, &W_GRID_COL).count())
    }

    pub fn rows(&self) -> SmallVec<[Row; 16]> {
        let tree = self.tree.read();
        tree.children_named(self.node, &W_TR)
            .map(|node| Row::new(Arc::clone(&self.tree), node))
            .collect()
    }

    /// Cell at `row`, `col` (zero-based).
    ///
    /// # Errors
    ///
    /// [`OoxmlError::IndexOutOfRange`] when either index is past the end.
    pub fn cell(&self, row: usize, col: usize) -> Result<Cell> {
        let tree = self.tree.read();
        let rows: SmallVec<[NodeId; 16]> = tree.children_named(self.node, &W_TR).collect();
        let tr = *rows.get(row).ok_or(OoxmlError::IndexOutOfRange {
            index: row as isize,
            len: rows.len(),
        })?;
        let cells: SmallVec<[NodeId; 16]> = tree.children_named(tr, &W_TC).collect();
        let tc = *cells.get(col).ok_or(OoxmlError::IndexOutOfRange {
            index: col as isize,
            len: cells.len(),
        })?;
        Ok(Cell::new(Arc::clone(&self.tree), tc))
    }
}

/// A row in a table (`<w:tr>`).
#[derive(Debug, Clone)]
pub struct Row {
    tree: SharedTree,
    node: NodeId,
}

impl Row {
    pub(crate) fn new(tree: SharedTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn cells(&self) -> SmallVec<[Cell; 16]> {
        let tree = self.tree.read();
        tree.children_named(self.node, &W_TC)
            .map(|node| Cell::new(Arc::clone(&self.tree), node))
            .collect()
    }

    pub fn cell_count(&self) -> usize {
        self.tree.read().children_named(self.node, &W_TC).count()
    }
}

/// A cell in a table row (`<w:tc>`).
///
/// A cell always holds at least one block-level element; freshly built cells
/// start with one empty paragraph.
#[derive(Debug, Clone)]
pub struct Cell {
    tree: SharedTree,
    node: NodeId,
}

impl Cell {
    pub(crate) fn new(tree: SharedTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn paragraphs(&self) -> Vec<Paragraph> {
        let tree = self.tree.read();
        tree.children_named(self.node, &W_P)
            .map(|node| Paragraph::new(Arc::clone(&self.tree), node))
            .collect()
    }

    /// Text of the cell's paragraphs, separated by newlines.
    pub fn text(&self) -> Result<String> {
        let texts = self
            .paragraphs()
            .iter()
            .map(Paragraph::text)
            .collect::<Result<Vec<_>>>()?;
        Ok(texts.join("\n"))
    }

    /// Append a paragraph holding `text` (a single run, omitted when empty)
    /// with an optional style id.
    pub fn add_paragraph(&self, text: &str, style: Option<&str>) -> Result<Paragraph> {
        let mut tree = self.tree.write();
        let p = build_paragraph(&mut tree, text, style)?;
        tree.append_child(self.node, p)?;
        Ok(Paragraph::new(Arc::clone(&self.tree), p))
    }
}

/// Build a detached `w:p`, with a run for non-empty `text` and a style when given.
pub(crate) fn build_paragraph(
    tree: &mut XmlTree,
    text: &str,
    style: Option<&str>,
) -> Result<NodeId> {
    let p = tree.create_element(&W_P);
    if style.is_some() {
        set_paragraph_style(tree, p, style)?;
    }
    if !text.is_empty() {
        let r = tree.create_element(&W_R);
        append_run_content(tree, r, text)?;
        tree.append_child(p, r)?;
    }
    Ok(p)
}

/// Build a detached `w:tbl` of `rows` x `cols`: an empty `w:tblPr`, a
/// `w:tblGrid` with one `w:gridCol` per column, then the rows, every cell
/// holding one empty paragraph.
///
/// # Errors
///
/// [`OoxmlError::InvalidFormat`] when either dimension is zero; nothing is
/// created in that case.
pub(crate) fn build_table(tree: &mut XmlTree, rows: usize, cols: usize) -> Result<NodeId> {
    if rows == 0 || cols == 0 {
        return Err(OoxmlError::InvalidFormat(format!(
            "a table needs at least one row and one column, got {}x{}",
            rows, cols
        )));
    }

    let tbl = tree.create_element(&W_TBL);
    let tbl_pr = tree.create_element(&W_TBL_PR);
    tree.append_child(tbl, tbl_pr)?;

    let grid = tree.create_element(&W_TBL_GRID);
    tree.append_child(tbl, grid)?;
    for _ in 0..cols {
        let col = tree.create_element(&W_GRID_COL);
        tree.append_child(grid, col)?;
    }

    for _ in 0..rows {
        let tr = tree.create_element(&W_TR);
        tree.append_child(tbl, tr)?;
        for _ in 0..cols {
            let tc = tree.create_element(&W_TC);
            let p = tree.create_element(&W_P);
            tree.append_child(tc, p)?;
            tree.append_child(tr, tc)?;
        }
    }
    Ok(tbl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::oxml::ns::{W_BODY, WML_MAIN};
    use crate::ooxml::oxml::serialize_node;
    use proptest::prelude::*;

    fn table(rows: usize, cols: usize) -> Table {
        let mut tree = XmlTree::with_root(&W_BODY);
        let root = tree.root();
        let tbl = build_table(&mut tree, rows, cols).unwrap();
        tree.append_child(root, tbl).unwrap();
        Table::new(tree.into_shared(), tbl)
    }

    #[test]
    fn test_build_table_markup() {
        let t = table(1, 1);
        let tree = t.tree.read();
        let xml = String::from_utf8(serialize_node(&tree, t.node).unwrap()).unwrap();
        assert_eq!(
            xml,
            format!(
                r#"<w:tbl xmlns:w="{}"><w:tblPr/><w:tblGrid><w:gridCol/></w:tblGrid><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>"#,
                WML_MAIN
            )
        );
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let mut tree = XmlTree::with_root(&W_BODY);
        let before = tree.len();
        assert!(matches!(
            build_table(&mut tree, 0, 3),
            Err(OoxmlError::InvalidFormat(_))
        ));
        assert!(matches!(
            build_table(&mut tree, 2, 0),
            Err(OoxmlError::InvalidFormat(_))
        ));
        assert_eq!(tree.len(), before);
    }

    #[test]
    fn test_cell_access() {
        let t = table(2, 3);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column_count(), 3);
        assert_eq!(t.rows()[1].cell_count(), 3);

        let cell = t.cell(1, 2).unwrap();
        assert_eq!(cell.node(), t.rows()[1].cells()[2].node());
        assert!(matches!(
            t.cell(2, 0),
            Err(OoxmlError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            t.cell(0, 3),
            Err(OoxmlError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_cell_paragraphs_and_text() {
        let t = table(1, 1);
        let cell = t.cell(0, 0).unwrap();
        assert_eq!(cell.paragraphs().len(), 1);
        assert_eq!(cell.text().unwrap(), "");

        let p = cell.add_paragraph("second", Some("Quote")).unwrap();
        assert_eq!(p.style().unwrap().as_deref(), Some("Quote"));
        assert_eq!(cell.paragraphs().len(), 2);
        assert_eq!(cell.text().unwrap(), "\nsecond");
    }

    proptest! {
        #[test]
        fn prop_table_shape(rows in 1usize..8, cols in 1usize..8) {
            let t = table(rows, cols);
            prop_assert_eq!(t.row_count(), rows);
            prop_assert_eq!(t.column_count(), cols);
            for row in t.rows() {
                let cells = row.cells();
                prop_assert_eq!(cells.len(), cols);
                for cell in cells {
                    prop_assert_eq!(cell.paragraphs().len(), 1);
                }
            }
        }
    }
}
