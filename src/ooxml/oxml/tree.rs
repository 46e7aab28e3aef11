//! Arena-backed XML element tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Ids stay valid
//! for the lifetime of the tree: detaching a node only unlinks it from its
//! parent, so a handle held by one wrapper never dangles when another wrapper
//! removes content. Detached nodes are not reclaimed.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::oxml::ns::QName;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::sync::Arc;

/// A tree shared between a part and every wrapper handed out over it.
///
/// One lock per part: readers may proceed together, mutations are exclusive.
pub type SharedTree = Arc<RwLock<XmlTree>>;

/// Stable address of a node inside an [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// An attribute as it appears on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written (`r:embed`, `uri`, `xmlns:w`)
    pub name: String,
    /// Resolved namespace URI; `None` for unprefixed attributes and declarations
    pub ns: Option<String>,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    #[inline]
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Whether this attribute is an `xmlns` or `xmlns:*` declaration.
    #[inline]
    pub fn is_ns_decl(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }

    fn matches(&self, qname: &QName) -> bool {
        !self.is_ns_decl()
            && self.local_name() == qname.local_name()
            && self.ns.as_deref().unwrap_or("") == qname.uri()
    }
}

/// Element payload: name, namespace and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    ns: Option<String>,
    attrs: SmallVec<[Attribute; 4]>,
}

impl Element {
    pub fn new(name: impl Into<String>, ns: Option<String>) -> Self {
        Self {
            name: name.into(),
            ns,
            attrs: SmallVec::new(),
        }
    }

    /// Build an element for a qualified name using its conventional prefix.
    pub fn from_qname(qname: &QName) -> Self {
        let ns = (!qname.uri().is_empty()).then(|| qname.uri().to_string());
        Self::new(qname.prefixed(), ns)
    }

    /// Qualified name as written.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(p, _)| p)
    }

    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.ns.as_deref()
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    pub(crate) fn push_attribute(&mut self, attr: Attribute) {
        self.attrs.push(attr);
    }

    /// Whether this element is `{uri}local` of `qname`.
    #[inline]
    pub fn is(&self, qname: &QName) -> bool {
        self.local_name() == qname.local_name() && self.namespace().unwrap_or("") == qname.uri()
    }

    /// Attribute value by namespace and local name.
    pub fn get(&self, qname: &QName) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.matches(qname))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing one with the same expanded name.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::InvalidFormat`] if `value` holds a character XML does not
    /// allow; the element is left unchanged.
    pub fn set(&mut self, qname: &QName, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        check_chars(&value)?;
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.matches(qname)) {
            attr.value = value;
            return Ok(());
        }
        let ns = (!qname.uri().is_empty()).then(|| qname.uri().to_string());
        self.attrs.push(Attribute {
            name: qname.prefixed(),
            ns,
            value,
        });
        Ok(())
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, qname: &QName) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.matches(qname))?;
        Some(self.attrs.remove(pos).value)
    }
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    /// Character data, kept in its escaped form exactly as read
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    data: NodeData,
}

/// An XML document held as an arena of nodes with a single root element.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
}

impl XmlTree {
    /// Create a tree holding only `root`.
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: SmallVec::new(),
                data: NodeData::Element(root),
            }],
        }
    }

    /// Create a tree whose root is a fresh element named `qname`.
    pub fn with_root(qname: &QName) -> Self {
        Self::new(Element::from_qname(qname))
    }

    /// Wrap the tree for sharing between a part and its wrappers.
    pub fn into_shared(self) -> SharedTree {
        Arc::new(RwLock::new(self))
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, detached ones included.
    ///
    /// Detached nodes are never reclaimed, so this only grows; see
    /// [`live_len`](Self::live_len) for the nodes still reachable from the root.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes reachable from the root, the root included.
    pub fn live_len(&self) -> usize {
        1 + self.descendants(self.root()).count()
    }

    /// Always false: a tree has at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    #[inline]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    #[inline]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Whether `id` is an element named `qname`.
    #[inline]
    pub fn is(&self, id: NodeId, qname: &QName) -> bool {
        self.element(id).is_some_and(|e| e.is(qname))
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.element(c).is_some())
    }

    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        qname: &'a QName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.is(c, qname))
    }

    pub fn first_child_named(&self, id: NodeId, qname: &QName) -> Option<NodeId> {
        self.children_named(id, qname).next()
    }

    /// Follow a path of child names from `id`, taking the first match at each step.
    pub fn find_path(&self, id: NodeId, path: &[QName]) -> Option<NodeId> {
        path.iter()
            .try_fold(id, |node, qname| self.first_child_named(node, qname))
    }

    pub fn attr(&self, id: NodeId, qname: &QName) -> Option<&str> {
        self.element(id)?.get(qname)
    }

    pub fn set_attr(&mut self, id: NodeId, qname: &QName, value: impl Into<String>) -> Result<()> {
        self.element_mut(id)
            .ok_or_else(|| OoxmlError::Other(format!("node {} is not an element", id.0)))?
            .set(qname, value)
    }

    /// All nodes below `id` in document order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = self.children(id).iter().rev().copied().collect();
        Descendants { tree: self, stack }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: SmallVec::new(),
            data,
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, qname: &QName) -> NodeId {
        self.push(NodeData::Element(Element::from_qname(qname)))
    }

    pub(crate) fn create_node(&mut self, data: NodeData) -> NodeId {
        self.push(data)
    }

    /// Create a detached text node from unescaped text.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::InvalidFormat`] if `text` holds a character XML does not
    /// allow; no node is created.
    pub fn create_text(&mut self, text: &str) -> Result<NodeId> {
        check_chars(text)?;
        let escaped = quick_xml::escape::partial_escape(text).into_owned();
        Ok(self.push(NodeData::Text(escaped)))
    }

    /// Append already-escaped character data under `parent`, merging with a
    /// trailing text node so adjacent runs of text stay a single node.
    pub(crate) fn append_raw_text(&mut self, parent: NodeId, raw: &str) -> Result<()> {
        if let Some(&last) = self.nodes[parent.0].children.last()
            && let NodeData::Text(existing) = &mut self.nodes[last.0].data
        {
            existing.push_str(raw);
            return Ok(());
        }
        let id = self.push(NodeData::Text(raw.to_string()));
        self.append_child(parent, id)
    }

    /// Unlink `id` from its parent. No-op for a node already detached.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.element(parent).is_none() {
            return Err(OoxmlError::Other(format!(
                "node {} is not an element",
                parent.0
            )));
        }
        if child == self.root() {
            return Err(OoxmlError::Other("cannot move the root element".to_string()));
        }
        // Reject cycles: `parent` must not sit inside `child`.
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(OoxmlError::Other(format!(
                    "node {} cannot become its own descendant",
                    child.0
                )));
            }
            cursor = self.parent(node);
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insertable(parent, child)?;
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Insert `child` immediately before `reference`, which must be a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        self.check_insertable(parent, child)?;
        if self.parent(reference) != Some(parent) {
            return Err(OoxmlError::Other(format!(
                "node {} is not a child of node {}",
                reference.0, parent.0
            )));
        }
        if child == reference {
            return Ok(());
        }
        self.detach(child);
        // Looked up after the detach: `child` may precede `reference` in `parent`.
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == reference)
            .ok_or_else(|| {
                OoxmlError::Other(format!(
                    "node {} is not a child of node {}",
                    reference.0, parent.0
                ))
            })?;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos, child);
        Ok(())
    }

    /// Unescaped concatenation of the text nodes directly under `id`.
    pub fn text(&self, id: NodeId) -> Result<String> {
        let mut out = String::new();
        for &child in self.children(id) {
            match self.data(child) {
                NodeData::Text(raw) => {
                    let text = quick_xml::escape::unescape(raw)
                        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
                    out.push_str(&text);
                },
                NodeData::CData(raw) => out.push_str(raw),
                _ => {},
            }
        }
        Ok(out)
    }
}

/// Pre-order, document-order walk produced by [`XmlTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[inline]
fn local_part(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, local)| local)
}

/// Whether `c` matches the XML 1.0 `Char` production.
#[inline]
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Reject strings that cannot be written as XML character data.
pub(crate) fn check_chars(s: &str) -> Result<()> {
    match s.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(OoxmlError::InvalidFormat(format!(
            "character U+{:04X} is not allowed in XML",
            c as u32
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::oxml::ns::{W_BODY, W_P, W_R, W_SECT_PR, W_T, W_VAL};

    fn body_tree() -> (XmlTree, NodeId, NodeId) {
        let mut tree = XmlTree::with_root(&W_BODY);
        let root = tree.root();
        let p = tree.create_element(&W_P);
        let sect = tree.create_element(&W_SECT_PR);
        tree.append_child(root, p).unwrap();
        tree.append_child(root, sect).unwrap();
        (tree, p, sect)
    }

    #[test]
    fn test_append_and_insert_before() {
        let (mut tree, p, sect) = body_tree();
        let root = tree.root();
        let p2 = tree.create_element(&W_P);
        tree.insert_before(root, p2, sect).unwrap();
        assert_eq!(tree.children(root), &[p, p2, sect]);
        assert_eq!(tree.parent(p2), Some(root));
    }

    #[test]
    fn test_detach_keeps_ids_valid() {
        let (mut tree, p, sect) = body_tree();
        let root = tree.root();
        tree.detach(p);
        assert_eq!(tree.children(root), &[sect]);
        assert_eq!(tree.parent(p), None);
        assert!(tree.is(p, &W_P));
    }

    #[test]
    fn test_append_moves_attached_node() {
        let (mut tree, p, sect) = body_tree();
        let root = tree.root();
        tree.append_child(root, p).unwrap();
        assert_eq!(tree.children(root), &[sect, p]);
    }

    #[test]
    fn test_cycles_rejected() {
        let (mut tree, p, _) = body_tree();
        let r = tree.create_element(&W_R);
        tree.append_child(p, r).unwrap();
        assert!(tree.append_child(r, p).is_err());
        assert!(tree.append_child(p, tree.root()).is_err());
    }

    #[test]
    fn test_insert_before_non_child_fails() {
        let (mut tree, p, _) = body_tree();
        let root = tree.root();
        let stray = tree.create_element(&W_P);
        let new = tree.create_element(&W_P);
        assert!(tree.insert_before(root, new, stray).is_err());
        assert!(tree.children(root).contains(&p));
    }

    #[test]
    fn test_descendants_document_order() {
        let (mut tree, p, sect) = body_tree();
        let r = tree.create_element(&W_R);
        let t = tree.create_element(&W_T);
        tree.append_child(p, r).unwrap();
        tree.append_child(r, t).unwrap();
        let order: Vec<NodeId> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![p, r, t, sect]);
    }

    #[test]
    fn test_attributes_by_expanded_name() {
        let (mut tree, p, _) = body_tree();
        tree.set_attr(p, &W_VAL, "a").unwrap();
        tree.set_attr(p, &W_VAL, "b").unwrap();
        assert_eq!(tree.attr(p, &W_VAL), Some("b"));
        assert_eq!(tree.element(p).unwrap().attributes().len(), 1);
        assert_eq!(tree.element_mut(p).unwrap().remove(&W_VAL).as_deref(), Some("b"));
        assert_eq!(tree.attr(p, &W_VAL), None);
    }

    #[test]
    fn test_text_is_escaped_on_create() {
        let (mut tree, p, _) = body_tree();
        let t = tree.create_element(&W_T);
        let text = tree.create_text("a < b & c").unwrap();
        tree.append_child(p, t).unwrap();
        tree.append_child(t, text).unwrap();
        assert_eq!(tree.data(text), &NodeData::Text("a &lt; b &amp; c".to_string()));
        assert_eq!(tree.text(t).unwrap(), "a < b & c");
    }

    #[test]
    fn test_insert_before_failure_keeps_child_attached() {
        let (mut tree, p, sect) = body_tree();
        let root = tree.root();
        let r = tree.create_element(&W_R);
        tree.append_child(p, r).unwrap();
        // sectPr is a child of the root, not of the paragraph
        assert!(tree.insert_before(p, r, sect).is_err());
        assert!(tree.insert_before(root, r, p).is_ok());
        assert_eq!(tree.children(root), &[r, p, sect]);
        let stray = tree.create_element(&W_P);
        assert!(tree.insert_before(root, p, stray).is_err());
        assert_eq!(tree.parent(p), Some(root));
        assert_eq!(tree.children(root), &[r, p, sect]);
    }

    #[test]
    fn test_invalid_characters_rejected() {
        let (mut tree, p, _) = body_tree();
        let before = tree.len();
        for bad in ["a\u{1}b", "nul\u{0}", "\u{FFFE}", "\u{1B}[0m"] {
            assert!(matches!(
                tree.create_text(bad),
                Err(OoxmlError::InvalidFormat(_))
            ));
            assert!(matches!(
                tree.set_attr(p, &W_VAL, bad),
                Err(OoxmlError::InvalidFormat(_))
            ));
        }
        assert_eq!(tree.len(), before);
        assert_eq!(tree.attr(p, &W_VAL), None);
        assert!(tree.create_text("tab\tnewline\n\u{10348}").is_ok());
    }

    #[test]
    fn test_live_len_skips_detached_nodes() {
        let (mut tree, p, _) = body_tree();
        assert_eq!(tree.live_len(), 3);
        let r = tree.create_element(&W_R);
        tree.append_child(p, r).unwrap();
        assert_eq!(tree.live_len(), 4);
        tree.detach(p);
        assert_eq!(tree.live_len(), 2);
        assert_eq!(tree.len(), 4);
    }
}
