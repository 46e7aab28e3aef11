//! Bytes to [`XmlTree`].
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::oxml::ns::XML;
use crate::ooxml::oxml::tree::{Attribute, Element, NodeData, NodeId, XmlTree, is_xml_char};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use smallvec::SmallVec;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Entities every XML processor knows without a DTD.
const PREDEFINED_ENTITIES: [&str; 5] = ["lt", "gt", "amp", "apos", "quot"];

/// Parse a UTF-8 XML document into an element tree.
///
/// The prolog (declaration, DOCTYPE, comments before the root) is dropped and
/// re-generated on serialization. Whitespace inside the root is preserved.
///
/// # Errors
///
/// Returns [`OoxmlError::Xml`] for malformed markup, invalid UTF-8, characters
/// outside the XML `Char` range, references to undeclared entities, a prefix
/// with no namespace declaration in scope, or a document without exactly one
/// root element.
pub fn parse(bytes: &[u8]) -> Result<XmlTree> {
    let bytes = bytes.strip_prefix(&UTF8_BOM[..]).unwrap_or(bytes);
    let xml = std::str::from_utf8(bytes)?;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => builder.start(&e, false)?,
            Ok(Event::Empty(e)) => builder.start(&e, true)?,
            Ok(Event::End(_)) => builder.end(),
            Ok(Event::Text(e)) => builder.text(checked(&e)?)?,
            Ok(Event::GeneralRef(e)) => {
                let name = std::str::from_utf8(&e)?;
                check_reference(name)?;
                builder.text(&format!("&{};", name))?;
            },
            Ok(Event::CData(e)) => {
                let data = checked(&e)?.to_string();
                builder.leaf(NodeData::CData(data))?;
            },
            Ok(Event::Comment(e)) => {
                let data = checked(&e)?.to_string();
                builder.leaf(NodeData::Comment(data))?;
            },
            Ok(Event::PI(e)) => {
                let data = checked(&e)?.to_string();
                builder.leaf(NodeData::ProcessingInstruction(data))?;
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => {
                return Err(OoxmlError::Xml(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            },
        }
    }

    let tree = builder.finish()?;
    log::trace!("parsed XML tree with {} nodes", tree.len());
    Ok(tree)
}

/// UTF-8 content of an event, rejected when it holds a non-`Char` code point.
fn checked(bytes: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(bytes)?;
    check_text(text)?;
    Ok(text)
}

fn check_text(text: &str) -> Result<()> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(OoxmlError::Xml(format!(
            "character U+{:04X} is not allowed in XML",
            c as u32
        ))),
        None => Ok(()),
    }
}

/// Accept `&name;` only for the predefined entities and for character
/// references naming a valid `Char`; the parser reads no DTD.
fn check_reference(name: &str) -> Result<()> {
    let valid = match name.strip_prefix('#') {
        Some(num) => {
            let code = match num.strip_prefix('x') {
                Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                    u32::from_str_radix(hex, 16).ok()
                },
                Some(_) => None,
                None if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) => {
                    atoi_simd::parse::<u32, false, false>(num.as_bytes()).ok()
                },
                None => None,
            };
            code.and_then(char::from_u32).is_some_and(is_xml_char)
        },
        None => PREDEFINED_ENTITIES.contains(&name),
    };
    if valid {
        Ok(())
    } else {
        Err(OoxmlError::Xml(format!("invalid reference '&{};'", name)))
    }
}

/// Namespace declarations made by one element: `(prefix, uri)`, `""` for the default.
type Scope = SmallVec<[(String, String); 2]>;

#[derive(Default)]
struct TreeBuilder {
    tree: Option<XmlTree>,
    stack: Vec<NodeId>,
    scopes: Vec<Scope>,
    root_closed: bool,
}

impl TreeBuilder {
    fn resolve(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML);
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
            // xmlns="" undeclares the default namespace
            .filter(|uri| !uri.is_empty())
    }

    fn resolve_prefixed(&self, prefix: &str, name: &str) -> Result<Option<String>> {
        match self.resolve(prefix) {
            Some(uri) => Ok(Some(uri.to_string())),
            None if prefix.is_empty() => Ok(None),
            None => Err(OoxmlError::Xml(format!(
                "unbound namespace prefix '{}' in '{}'",
                prefix, name
            ))),
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        if self.root_closed {
            return Err(OoxmlError::Xml(
                "content after the root element".to_string(),
            ));
        }

        let name = std::str::from_utf8(e.name().as_ref())?.to_string();

        let mut raw: SmallVec<[(String, String); 4]> = SmallVec::new();
        let mut scope = Scope::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| OoxmlError::Xml(e.to_string()))?
                .into_owned();
            check_text(&value)?;
            if key == "xmlns" {
                scope.push((String::new(), value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.push((prefix.to_string(), value.clone()));
            }
            raw.push((key, value));
        }
        self.scopes.push(scope);

        let prefix = name.split_once(':').map_or("", |(p, _)| p);
        let ns = self.resolve_prefixed(prefix, &name)?;
        let mut element = Element::new(name, ns);

        for (key, value) in raw {
            let ns = if key == "xmlns" || key.starts_with("xmlns:") {
                None
            } else {
                match key.split_once(':') {
                    Some((prefix, _)) => self.resolve_prefixed(prefix, &key)?,
                    None => None,
                }
            };
            element.push_attribute(Attribute {
                name: key,
                ns,
                value,
            });
        }

        let id = match self.tree {
            None => {
                let tree = XmlTree::new(element);
                let root = tree.root();
                self.tree = Some(tree);
                root
            },
            Some(ref mut tree) => {
                let parent = *self.stack.last().ok_or_else(|| {
                    OoxmlError::Xml("more than one root element".to_string())
                })?;
                let id = tree.create_node(NodeData::Element(element));
                tree.append_child(parent, id)?;
                id
            },
        };

        if empty {
            self.scopes.pop();
            if self.stack.is_empty() {
                self.root_closed = true;
            }
        } else {
            self.stack.push(id);
        }
        Ok(())
    }

    fn end(&mut self) {
        self.stack.pop();
        self.scopes.pop();
        if self.stack.is_empty() {
            self.root_closed = true;
        }
    }

    fn text(&mut self, raw: &str) -> Result<()> {
        match (self.tree.as_mut(), self.stack.last()) {
            (Some(tree), Some(&parent)) => tree.append_raw_text(parent, raw),
            _ if raw.trim().is_empty() => Ok(()),
            _ => Err(OoxmlError::Xml(
                "character data outside the root element".to_string(),
            )),
        }
    }

    fn leaf(&mut self, data: NodeData) -> Result<()> {
        if let (Some(tree), Some(&parent)) = (self.tree.as_mut(), self.stack.last()) {
            let id = tree.create_node(data);
            tree.append_child(parent, id)?;
        }
        Ok(())
    }

    fn finish(self) -> Result<XmlTree> {
        if let Some(&open) = self.stack.last() {
            let name = self
                .tree
                .as_ref()
                .and_then(|t| t.element(open))
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            return Err(OoxmlError::Xml(format!(
                "unexpected end of document inside '{}'",
                name
            )));
        }
        self.tree
            .ok_or_else(|| OoxmlError::Xml("document has no root element".to_string()))
    }
}
