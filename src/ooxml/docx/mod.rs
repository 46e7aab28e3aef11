/// Word (.docx) document object model.
///
/// Live, typed views over the element tree of the main document part:
/// - `DocumentPart`: the `/word/document.xml` part, owner of the tree
/// - `Document`: convenience API for building and reading content
/// - `Body`: block content that keeps `w:sectPr` last
/// - `Paragraph` / `Run`: text content
/// - `Table` / `Row` / `Cell`: tables
/// - `InlineShape` / `InlineShapes`: pictures, charts and SmartArt in the flow
///
/// # Example
///
/// ```rust
/// use longan::ooxml::docx::{Document, DocumentPart, WdInlineShape};
/// use longan::ooxml::opc::PackURI;
///
/// let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hi</w:t></w:r></w:p><w:sectPr/></w:body></w:document>"#;
/// let part = DocumentPart::load(
///     PackURI::new("/word/document.xml")?,
///     "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
///     xml,
///     (),
/// )?;
/// let doc = Document::new(part);
///
/// for para in doc.paragraphs()? {
///     println!("Paragraph: {}", para.text()?);
/// }
/// for shape in &doc.inline_shapes()? {
///     if shape.kind() == WdInlineShape::Picture {
///         println!("picture {:?}", shape.embed_rid());
///     }
/// }
/// # Ok::<(), longan::ooxml::OoxmlError>(())
/// ```
pub mod body;
pub mod document;
pub mod enums;
pub mod paragraph;
pub mod parts;
pub mod shape;
pub mod table;

pub use body::Body;
pub use document::Document;
pub use enums::{WdBreakType, WdInlineShape};
pub use paragraph::{Paragraph, Run};
pub use parts::DocumentPart;
pub use shape::{InlineShape, InlineShapes, classify};
pub use table::{Cell, Row, Table};
