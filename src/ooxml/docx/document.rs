/// Document - the main API for working with Word document content.
use crate::ooxml::docx::body::{Body, insert_block};
use crate::ooxml::docx::enums::WdBreakType;
use crate::ooxml::docx::paragraph::Paragraph;
use crate::ooxml::docx::parts::DocumentPart;
use crate::ooxml::docx::shape::InlineShapes;
use crate::ooxml::docx::table::{Table, build_paragraph};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::oxml::ns::{W_BR, W_P, W_R, W_TYPE};
use log::debug;
use std::sync::Arc;

/// A Word document.
///
/// Convenience layer over a [`DocumentPart`]: block-level additions land at
/// the end of the body (ahead of the section properties), and reads go
/// through the same live tree.
///
/// # Examples
///
/// ```rust
/// use longan::ooxml::docx::{Document, DocumentPart};
///
/// let mut doc = Document::new(DocumentPart::default_document(())?);
/// doc.add_heading("Report", 0)?;
/// doc.add_paragraph("First line", None)?;
/// let table = doc.add_table(2, 3)?;
/// table.cell(0, 0)?.add_paragraph("A1", None)?;
///
/// assert_eq!(doc.paragraphs()?.len(), 2);
/// let bytes = doc.save_to_bytes()?;
/// assert!(bytes.starts_with(b"<?xml"));
/// # Ok::<(), longan::ooxml::OoxmlError>(())
/// ```
#[derive(Debug)]
pub struct Document<P> {
    part: DocumentPart<P>,
}

impl<P> Document<P> {
    #[inline]
    pub fn new(part: DocumentPart<P>) -> Self {
        Self { part }
    }

    #[inline]
    pub fn part(&self) -> &DocumentPart<P> {
        &self.part
    }

    #[inline]
    pub fn part_mut(&mut self) -> &mut DocumentPart<P> {
        &mut self.part
    }

    #[inline]
    pub fn into_part(self) -> DocumentPart<P> {
        self.part
    }

    /// Content model over the document body.
    pub fn body(&self) -> Result<Body> {
        self.part.body()
    }

    /// Append a paragraph with `text` and an optional paragraph style id.
    ///
    /// The paragraph is fully built before it is inserted, so on error the
    /// body is unchanged.
    pub fn add_paragraph(&mut self, text: &str, style: Option<&str>) -> Result<Paragraph> {
        let body = self.part.body()?;
        let tree = self.part.tree();
        let mut guard = tree.write();
        let p = build_paragraph(&mut guard, text, style)?;
        insert_block(&mut guard, body.node(), p)?;
        debug!("added paragraph {} (style {:?})", p.index(), style);
        Ok(Paragraph::new(Arc::clone(&tree), p))
    }

    /// Append a heading paragraph. Level 0 uses the `Title` style, levels
    /// 1 to 9 use `Heading1` .. `Heading9`.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::InvalidFormat`] for a level above 9.
    pub fn add_heading(&mut self, text: &str, level: u8) -> Result<Paragraph> {
        if level > 9 {
            return Err(OoxmlError::InvalidFormat(format!(
                "heading level must be 0-9, got {}",
                level
            )));
        }
        let style = if level == 0 {
            "Title".to_string()
        } else {
            format!("Heading{}", level)
        };
        self.add_paragraph(text, Some(style.as_str()))
    }

    /// Append a paragraph holding only a page break.
    pub fn add_page_break(&mut self) -> Result<Paragraph> {
        let body = self.part.body()?;
        let tree = self.part.tree();
        let mut guard = tree.write();

        let p = guard.create_element(&W_P);
        let r = guard.create_element(&W_R);
        let br = guard.create_element(&W_BR);
        if let Some(value) = WdBreakType::Page.to_xml() {
            guard.set_attr(br, &W_TYPE, value)?;
        }
        guard.append_child(r, br)?;
        guard.append_child(p, r)?;
        insert_block(&mut guard, body.node(), p)?;
        Ok(Paragraph::new(Arc::clone(&tree), p))
    }

    /// Append a `rows` x `cols` table.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::InvalidFormat`] when either dimension is zero.
    pub fn add_table(&mut self, rows: usize, cols: usize) -> Result<Table> {
        self.part.body()?.add_table(rows, cols)
    }

    pub fn paragraphs(&self) -> Result<Vec<Paragraph>> {
        Ok(self.part.body()?.paragraphs())
    }

    pub fn tables(&self) -> Result<Vec<Table>> {
        Ok(self.part.body()?.tables())
    }

    pub fn inline_shapes(&self) -> Result<InlineShapes> {
        self.part.inline_shapes()
    }

    /// Text of the body paragraphs, one line per paragraph.
    pub fn text(&self) -> Result<String> {
        let texts = self
            .paragraphs()?
            .iter()
            .map(Paragraph::text)
            .collect::<Result<Vec<_>>>()?;
        Ok(texts.join("\n"))
    }

    /// Serialized `document.xml`.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>> {
        self.part.serialize()
    }
}
