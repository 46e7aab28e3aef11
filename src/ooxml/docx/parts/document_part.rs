/// DocumentPart - the main document.xml part of a Word document.
use crate::ooxml::docx::body::Body;
use crate::ooxml::docx::shape::InlineShapes;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{DOCUMENT_MAIN_CONTENT_TYPES, content_type};
use crate::ooxml::opc::packuri::{DOCUMENT_PART_URI, PackURI};
use crate::ooxml::opc::part::{Part, count_rel_refs};
use crate::ooxml::opc::rel::Relationships;
use crate::ooxml::oxml::ns::{
    QName, W_BODY, W_BOTTOM, W_DOCUMENT, W_FOOTER, W_GUTTER, W_H, W_HEADER, W_LEFT, W_PG_MAR,
    W_PG_SZ, W_RIGHT, W_SECT_PR, W_TOP, W_W,
};
use crate::ooxml::oxml::{self, NodeId, SharedTree, XmlTree};
use log::{debug, warn};
use std::borrow::Cow;
use std::sync::Arc;

/// US Letter in twentieths of a point.
const PAGE_SIZE: [(QName, &str); 2] = [(W_W, "12240"), (W_H, "15840")];

/// One-inch margins, half-inch header and footer distance.
const PAGE_MARGINS: [(QName, &str); 7] = [
    (W_TOP, "1440"),
    (W_RIGHT, "1440"),
    (W_BOTTOM, "1440"),
    (W_LEFT, "1440"),
    (W_HEADER, "720"),
    (W_FOOTER, "720"),
    (W_GUTTER, "0"),
];

/// The main document part of a Word document.
///
/// This corresponds to the `/word/document.xml` part in the package. It owns
/// the part's element tree; [`body`](Self::body) and
/// [`inline_shapes`](Self::inline_shapes) hand out fresh views over the
/// `w:body` child on every call, and [`blob`](Part::blob) serializes the tree
/// as it stands.
///
/// `P` is the package the part was loaded from. The part never looks inside
/// it; it is kept so callers can get back to it.
pub struct DocumentPart<P> {
    partname: PackURI,
    content_type: String,
    tree: SharedTree,
    rels: Relationships,
    package: P,
}

impl<P> DocumentPart<P> {
    /// Parse `blob` into a document part.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::Xml`] when the bytes are not well-formed XML or the root
    /// element is not `w:document`.
    pub fn load(partname: PackURI, content_type: &str, blob: &[u8], package: P) -> Result<Self> {
        let tree = oxml::parse(blob)?;
        debug!(
            "loaded {} ({} bytes, {} nodes)",
            partname,
            blob.len(),
            tree.len()
        );
        Self::new(partname, content_type, tree, package)
    }

    /// Wrap an already-built tree.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::Xml`] when the root element is not `w:document`.
    pub fn new(partname: PackURI, content_type: &str, tree: XmlTree, package: P) -> Result<Self> {
        if !tree.is(tree.root(), &W_DOCUMENT) {
            let found = tree
                .element(tree.root())
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            return Err(OoxmlError::Xml(format!(
                "{} is not a document part: root element is '{}'",
                partname, found
            )));
        }
        if !DOCUMENT_MAIN_CONTENT_TYPES.contains(&content_type) {
            warn!(
                "{} has unexpected content type '{}'",
                partname, content_type
            );
        }

        let rels = Relationships::new(partname.base_uri().to_string());
        Ok(Self {
            partname,
            content_type: content_type.to_string(),
            tree: tree.into_shared(),
            rels,
            package,
        })
    }

    /// A new `/word/document.xml` holding an empty body with US Letter
    /// section properties.
    pub fn default_document(package: P) -> Result<Self> {
        let mut tree = XmlTree::with_root(&W_DOCUMENT);
        let root = tree.root();
        let body = tree.create_element(&W_BODY);
        tree.append_child(root, body)?;

        let sect_pr = tree.create_element(&W_SECT_PR);
        let pg_sz = tree.create_element(&W_PG_SZ);
        for (name, value) in &PAGE_SIZE {
            tree.set_attr(pg_sz, name, *value)?;
        }
        let pg_mar = tree.create_element(&W_PG_MAR);
        for (name, value) in &PAGE_MARGINS {
            tree.set_attr(pg_mar, name, *value)?;
        }
        tree.append_child(sect_pr, pg_sz)?;
        tree.append_child(sect_pr, pg_mar)?;
        tree.append_child(body, sect_pr)?;

        let partname = PackURI::new(DOCUMENT_PART_URI)?;
        Self::new(partname, content_type::WML_DOCUMENT_MAIN, tree, package)
    }

    /// The package handle given at load time, untouched.
    #[inline]
    pub fn package(&self) -> &P {
        &self.package
    }

    /// Shared handle to the part's element tree.
    #[inline]
    pub fn tree(&self) -> SharedTree {
        Arc::clone(&self.tree)
    }

    /// Replace the relationships, e.g. with ones read from the part's `.rels`.
    pub fn set_rels(&mut self, rels: Relationships) {
        self.rels = rels;
    }

    fn body_node(&self) -> Result<NodeId> {
        let tree = self.tree.read();
        tree.first_child_named(tree.root(), &W_BODY)
            .ok_or_else(|| OoxmlError::MissingElement(W_BODY.prefixed()))
    }

    /// Content model over `w:body`.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::MissingElement`] when the document has no body.
    pub fn body(&self) -> Result<Body> {
        Ok(Body::new(self.tree(), self.body_node()?))
    }

    /// All inline shapes in the body, in document order.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::MissingElement`] when the document has no body.
    pub fn inline_shapes(&self) -> Result<InlineShapes> {
        Ok(InlineShapes::new(self.tree(), self.body_node()?))
    }

    /// Serialize the current tree.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let bytes = oxml::serialize(&self.tree.read())?;
        debug!("serialized {} ({} bytes)", self.partname, bytes.len());
        Ok(bytes)
    }
}

impl<P> Part for DocumentPart<P> {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> Result<Cow<'_, [u8]>> {
        self.serialize().map(Cow::Owned)
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    fn rel_ref_count(&self, r_id: &str) -> Result<usize> {
        Ok(count_rel_refs(&self.tree.read(), r_id))
    }
}

impl<P> std::fmt::Debug for DocumentPart<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentPart")
            .field("partname", &self.partname)
            .field("content_type", &self.content_type)
            .field("nodes", &self.tree.read().live_len())
            .field("rels", &self.rels.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::enums::WdInlineShape;
    use crate::ooxml::opc::constants::relationship_type as RT;
    use crate::ooxml::oxml::ns::{DML_CHART, nsdecls};

    const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

    #[derive(Debug, PartialEq)]
    struct FakePackage(&'static str);

    fn load(xml: &str) -> Result<DocumentPart<FakePackage>> {
        DocumentPart::load(
            PackURI::new(DOCUMENT_PART_URI).unwrap(),
            content_type::WML_DOCUMENT_MAIN,
            xml.as_bytes(),
            FakePackage("pkg"),
        )
    }

    fn document_xml(body: &str) -> String {
        format!(
            "{}\n<w:document {}>{}</w:document>",
            DECL,
            nsdecls(&["w", "wp", "a", "r"]),
            body
        )
    }

    #[test]
    fn test_load_and_round_trip() {
        let xml = document_xml(
            "<w:body>\n  <w:p><w:r><w:t>Hello</w:t></w:r></w:p>\n  <w:sectPr/>\n</w:body>",
        );
        let part = load(&xml).unwrap();
        assert_eq!(part.package(), &FakePackage("pkg"));
        assert_eq!(part.content_type(), content_type::WML_DOCUMENT_MAIN);
        assert_eq!(part.blob().unwrap().as_ref(), xml.as_bytes());
    }

    #[test]
    fn test_load_rejects_bad_input() {
        assert!(matches!(load("<w:document"), Err(OoxmlError::Xml(_))));
        let other = format!("<w:styles {}/>", nsdecls(&["w"]));
        assert!(matches!(load(&other), Err(OoxmlError::Xml(_))));
        let bogus = document_xml("<w:body><w:p><w:r><w:t>a&bogus;b</w:t></w:r></w:p></w:body>");
        assert!(matches!(load(&bogus), Err(OoxmlError::Xml(_))));
        let control = document_xml("<w:body><w:p><w:r><w:t>a\u{1}b</w:t></w:r></w:p></w:body>");
        assert!(matches!(load(&control), Err(OoxmlError::Xml(_))));
    }

    #[test]
    fn test_missing_body() {
        let part = load(&document_xml("")).unwrap();
        assert!(matches!(part.body(), Err(OoxmlError::MissingElement(_))));
        assert!(matches!(
            part.inline_shapes(),
            Err(OoxmlError::MissingElement(_))
        ));
    }

    #[test]
    fn test_views_share_the_part_tree() {
        let part = load(&document_xml("<w:body><w:sectPr/></w:body>")).unwrap();
        part.body().unwrap().add_paragraph().unwrap();
        assert_eq!(part.body().unwrap().paragraphs().len(), 1);

        let blob = part.blob().unwrap();
        let text = std::str::from_utf8(&blob).unwrap();
        assert!(text.ends_with("<w:body><w:p/><w:sectPr/></w:body></w:document>"));
    }

    #[test]
    fn test_inline_shapes_over_body() {
        let drawing = format!(
            r#"<w:p><w:r><w:drawing><wp:inline><a:graphic><a:graphicData uri="{}"/></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
            DML_CHART
        );
        let part = load(&document_xml(&format!("<w:body>{}</w:body>", drawing))).unwrap();
        let shapes = part.inline_shapes().unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes.get(0).unwrap().kind(), WdInlineShape::Chart);
    }

    #[test]
    fn test_default_document() {
        let part = DocumentPart::default_document(()).unwrap();
        assert_eq!(part.partname().as_str(), "/word/document.xml");
        let blob = part.blob().unwrap();
        let text = std::str::from_utf8(&blob).unwrap();
        assert!(text.starts_with(DECL));
        assert!(text.contains(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
        assert!(text.contains(r#"w:gutter="0"/></w:sectPr></w:body></w:document>"#));
        assert!(part.body().unwrap().paragraphs().is_empty());
        // the serialized form loads back
        assert!(load(text).is_ok());
    }

    #[test]
    fn test_relationships() {
        let mut part = load(&document_xml(
            r#"<w:body><w:p><w:hyperlink r:id="rId1"/><w:hyperlink r:id="rId1"/></w:p></w:body>"#,
        ))
        .unwrap();
        let image = PackURI::new("/word/media/image1.png").unwrap();
        assert_eq!(part.relate_to(&image, RT::IMAGE), "rId1");
        assert_eq!(part.relate_to(&image, RT::IMAGE), "rId1");
        assert_eq!(part.target_ref("rId1").unwrap(), "media/image1.png");
        assert_eq!(
            part.relate_to_ext("http://example.com", RT::HYPERLINK),
            "rId2"
        );
        assert!(part.target_ref("rId9").is_err());

        assert_eq!(part.rel_ref_count("rId1").unwrap(), 2);
        // still referenced twice: kept
        assert!(!part.drop_rel("rId1").unwrap());
        assert!(part.drop_rel("rId2").unwrap());
        assert_eq!(part.rels().len(), 1);
    }

    #[test]
    fn test_debug_reports_live_nodes() {
        let part = load(&document_xml("<w:body><w:p/><w:p/><w:sectPr/></w:body>")).unwrap();
        assert!(format!("{:?}", part).contains("nodes: 5"));
        part.body().unwrap().clear_content().unwrap();
        assert!(format!("{:?}", part).contains("nodes: 3"));
    }

    #[test]
    fn test_rel_refs_counted_by_namespace() {
        let xml = format!(
            r#"<w:document {} xmlns:rel="{}"><w:body><w:p><w:hyperlink rel:id="rId1"/><w:hyperlink rel:id="rId1"/></w:p></w:body></w:document>"#,
            nsdecls(&["w"]),
            crate::ooxml::oxml::ns::OFC_RELATIONSHIPS
        );
        let mut part = load(&xml).unwrap();
        part.relate_to_ext("http://example.com", RT::HYPERLINK);
        assert_eq!(part.rel_ref_count("rId1").unwrap(), 2);
        assert!(!part.drop_rel("rId1").unwrap());
        assert_eq!(part.rels().len(), 1);
    }

    #[test]
    fn test_unexpected_content_type_still_loads() {
        let part = DocumentPart::load(
            PackURI::new(DOCUMENT_PART_URI).unwrap(),
            "application/xml",
            document_xml("<w:body/>").as_bytes(),
            (),
        );
        assert!(part.is_ok());
    }
}
