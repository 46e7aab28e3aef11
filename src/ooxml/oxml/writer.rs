//! [`XmlTree`] back to bytes.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::oxml::tree::{NodeData, NodeId, XmlTree};
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use smallvec::SmallVec;

/// Serialize the whole tree as a standalone UTF-8 document.
///
/// Output starts with `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>`
/// and a newline, followed by the root element. Elements without children are
/// self-closed.
pub fn serialize(tree: &XmlTree) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    writer.get_mut().push(b'\n');

    let mut scopes = NsScopes::default();
    write_node(&mut writer, tree, tree.root(), &mut scopes)?;
    Ok(writer.into_inner())
}

/// Serialize the subtree at `id` without a declaration.
///
/// Namespace declarations made by ancestors of `id` are repeated on the
/// fragment's outermost element as needed, so the result parses on its own.
pub fn serialize_node(tree: &XmlTree, id: NodeId) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    let mut scopes = NsScopes::default();
    write_node(&mut writer, tree, id, &mut scopes)?;
    Ok(writer.into_inner())
}

/// Prefix bindings visible while writing; one frame per open element.
#[derive(Default)]
struct NsScopes {
    frames: Vec<SmallVec<[(String, String); 2]>>,
}

impl NsScopes {
    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Bind `prefix` to `uri` on the current element unless already visible.
    /// Returns true when a new declaration must be written.
    fn require(&mut self, prefix: &str, uri: &str) -> bool {
        if prefix == "xml" || self.lookup(prefix).unwrap_or("") == uri {
            return false;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.push((prefix.to_string(), uri.to_string()));
        }
        true
    }
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    tree: &XmlTree,
    id: NodeId,
    scopes: &mut NsScopes,
) -> Result<()> {
    let event = match tree.data(id) {
        NodeData::Element(element) => {
            let mut frame = SmallVec::new();
            for attr in element.attributes().iter().filter(|a| a.is_ns_decl()) {
                let prefix = attr.name.strip_prefix("xmlns:").unwrap_or("");
                frame.push((prefix.to_string(), attr.value.clone()));
            }
            scopes.frames.push(frame);

            let mut missing: SmallVec<[(String, String); 2]> = SmallVec::new();
            let prefix = element.prefix().unwrap_or("");
            let uri = element.namespace().unwrap_or("");
            if scopes.require(prefix, uri) {
                missing.push((prefix.to_string(), uri.to_string()));
            }
            for attr in element.attributes().iter().filter(|a| !a.is_ns_decl()) {
                if let (Some((prefix, _)), Some(uri)) = (attr.name.split_once(':'), attr.ns.as_deref())
                    && scopes.require(prefix, uri)
                {
                    missing.push((prefix.to_string(), uri.to_string()));
                }
            }

            let mut start = BytesStart::new(element.name());
            for (prefix, uri) in &missing {
                let key = if prefix.is_empty() {
                    "xmlns".to_string()
                } else {
                    format!("xmlns:{}", prefix)
                };
                start.push_attribute((key.as_str(), uri.as_str()));
            }
            for attr in element.attributes() {
                start.push_attribute((attr.name.as_str(), attr.value.as_str()));
            }

            let children = tree.children(id);
            let result = if children.is_empty() {
                writer
                    .write_event(Event::Empty(start))
                    .map_err(|e| OoxmlError::Xml(e.to_string()))
            } else {
                writer
                    .write_event(Event::Start(start))
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                for &child in children {
                    write_node(writer, tree, child, scopes)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new(element.name())))
                    .map_err(|e| OoxmlError::Xml(e.to_string()))
            };
            scopes.frames.pop();
            return result;
        },
        NodeData::Text(raw) => Event::Text(BytesText::from_escaped(raw.as_str())),
        NodeData::CData(data) => Event::CData(BytesCData::new(data.as_str())),
        NodeData::Comment(data) => Event::Comment(BytesText::from_escaped(data.as_str())),
        NodeData::ProcessingInstruction(data) => Event::PI(BytesPI::new(data.as_str())),
    };
    writer
        .write_event(event)
        .map_err(|e| OoxmlError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::oxml::ns::{R_EMBED, W_BODY, W_DOCUMENT, W_P, W_T, WML_MAIN, XML_SPACE};
    use crate::ooxml::oxml::parser::parse;
    use proptest::prelude::*;

    const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

    #[test]
    fn test_round_trip_is_byte_identical() {
        let xml = format!(
            "{}\n<w:document xmlns:w=\"{}\"><w:body><w:p><w:r><w:t xml:space=\"preserve\"> a &amp; b </w:t></w:r></w:p>\n  <w:sectPr/></w:body></w:document>",
            DECL, WML_MAIN
        );
        let tree = parse(xml.as_bytes()).unwrap();
        let out = serialize(&tree).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), xml);
    }

    #[test]
    fn test_declaration_is_normalized() {
        let xml = format!(
            "<?xml version='1.0'?><w:document xmlns:w=\"{}\"/>",
            WML_MAIN
        );
        let out = serialize(&parse(xml.as_bytes()).unwrap()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{}\n<w:document xmlns:w=\"{}\"/>", DECL, WML_MAIN)
        );
    }

    #[test]
    fn test_created_elements_get_declarations() {
        let mut tree = XmlTree::with_root(&W_DOCUMENT);
        let root = tree.root();
        let body = tree.create_element(&W_BODY);
        let p = tree.create_element(&W_P);
        tree.append_child(root, body).unwrap();
        tree.append_child(body, p).unwrap();
        tree.set_attr(p, &R_EMBED, "rId1").unwrap();

        let out = String::from_utf8(serialize(&tree).unwrap()).unwrap();
        assert!(out.contains(&format!("<w:document xmlns:w=\"{}\">", WML_MAIN)));
        // the body inherits w:, the paragraph needs r:
        assert!(out.contains("<w:body><w:p xmlns:r="));
        assert!(parse(out.as_bytes()).is_ok());
    }

    #[test]
    fn test_fragment_repeats_inherited_declarations() {
        let xml = format!(
            "<w:document xmlns:w=\"{}\"><w:body><w:p/></w:body></w:document>",
            WML_MAIN
        );
        let tree = parse(xml.as_bytes()).unwrap();
        let body = tree.first_child_named(tree.root(), &W_BODY).unwrap();
        let out = String::from_utf8(serialize_node(&tree, body).unwrap()).unwrap();
        assert_eq!(out, format!("<w:body xmlns:w=\"{}\"><w:p/></w:body>", WML_MAIN));
    }

    proptest! {
        #[test]
        fn prop_text_survives_round_trip(text in "[ -~\\u{a0}-\\u{ff}]{0,40}") {
            let mut tree = XmlTree::with_root(&W_DOCUMENT);
            let root = tree.root();
            let t = tree.create_element(&W_T);
            tree.append_child(root, t).unwrap();
            tree.set_attr(t, &XML_SPACE, "preserve").unwrap();
            if !text.is_empty() {
                let node = tree.create_text(&text).unwrap();
                tree.append_child(t, node).unwrap();
            }

            let bytes = serialize(&tree).unwrap();
            let reparsed = parse(&bytes).unwrap();
            let t2 = reparsed.first_child_named(reparsed.root(), &W_T).unwrap();
            prop_assert_eq!(reparsed.text(t2).unwrap(), text);
            prop_assert_eq!(serialize(&reparsed).unwrap(), bytes);
        }
    }
}
