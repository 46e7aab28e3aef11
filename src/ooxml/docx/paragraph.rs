/// Paragraph and Run handles for Word documents.
use crate::ooxml::docx::enums::WdBreakType;
use crate::ooxml::error::Result;
use crate::ooxml::oxml::ns::{
    QName, W_BR, W_CR, W_P_PR, W_P_STYLE, W_R, W_R_PR, W_T, W_TAB, W_TYPE, W_VAL, XML_SPACE,
};
use crate::ooxml::oxml::tree::check_chars;
use crate::ooxml::oxml::{NodeId, SharedTree, XmlTree};
use smallvec::SmallVec;
use std::sync::Arc;

/// A paragraph in a Word document.
///
/// Represents a `<w:p>` element. Paragraphs contain runs which in turn
/// contain the actual text.
///
/// # Example
///
/// ```rust,ignore
/// for para in document.paragraphs()? {
///     println!("[{}] {}", para.style()?.unwrap_or_default(), para.text()?);
///     for run in para.runs() {
///         println!("  Run: {}", run.text()?);
///     }
/// }
/// ```
///
/// A `Paragraph` is a live view: it shares the document's tree, so edits made
/// through it are visible to every other handle on the same document.
#[derive(Debug, Clone)]
pub struct Paragraph {
    tree: SharedTree,
    node: NodeId,
}

impl Paragraph {
    pub(crate) fn new(tree: SharedTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// The `w:p` element this paragraph wraps.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Get the text content of this paragraph.
    ///
    /// Concatenates the text of all runs; tabs read as `\t`, line breaks as `\n`.
    pub fn text(&self) -> Result<String> {
        let tree = self.tree.read();
        let mut text = String::new();
        for run in tree.children_named(self.node, &W_R) {
            push_run_text(&tree, run, &mut text)?;
        }
        Ok(text)
    }

    /// Runs directly under this paragraph, in document order.
    pub fn runs(&self) -> SmallVec<[Run; 8]> {
        let tree = self.tree.read();
        tree.children_named(self.node, &W_R)
            .map(|node| Run::new(Arc::clone(&self.tree), node))
            .collect()
    }

    /// Append a run holding `text`. Tab and newline characters become
    /// `w:tab` and `w:br` elements.
    pub fn add_run(&self, text: &str) -> Result<Run> {
        let mut tree = self.tree.write();
        let run = tree.create_element(&W_R);
        append_run_content(&mut tree, run, text)?;
        tree.append_child(self.node, run)?;
        log::trace!("appended run {} to paragraph {}", run.index(), self.node.index());
        Ok(Run::new(Arc::clone(&self.tree), run))
    }

    /// Style id from `w:pPr/w:pStyle`, `None` when the paragraph uses the default style.
    pub fn style(&self) -> Result<Option<String>> {
        let tree = self.tree.read();
        Ok(tree
            .find_path(self.node, &[W_P_PR, W_P_STYLE])
            .and_then(|style| tree.attr(style, &W_VAL))
            .map(str::to_string))
    }

    /// Set or clear (`None`) the paragraph style id.
    pub fn set_style(&self, style_id: Option<&str>) -> Result<()> {
        let mut tree = self.tree.write();
        set_paragraph_style(&mut tree, self.node, style_id)
    }
}

/// Make `p` use `style_id`, creating `w:pPr` and `w:pStyle` in their schema
/// positions (each the first child of its parent) when absent.
pub(crate) fn set_paragraph_style(
    tree: &mut XmlTree,
    p: NodeId,
    style_id: Option<&str>,
) -> Result<()> {
    let Some(style_id) = style_id else {
        if let Some(style) = tree.find_path(p, &[W_P_PR, W_P_STYLE]) {
            tree.detach(style);
        }
        return Ok(());
    };
    check_chars(style_id)?;

    let ppr = match tree.first_child_named(p, &W_P_PR) {
        Some(ppr) => ppr,
        None => {
            let ppr = tree.create_element(&W_P_PR);
            prepend_child(tree, p, ppr)?;
            ppr
        },
    };
    let style = match tree.first_child_named(ppr, &W_P_STYLE) {
        Some(style) => style,
        None => {
            let style = tree.create_element(&W_P_STYLE);
            prepend_child(tree, ppr, style)?;
            style
        },
    };
    tree.set_attr(style, &W_VAL, style_id)
}

fn prepend_child(tree: &mut XmlTree, parent: NodeId, child: NodeId) -> Result<()> {
    match tree.children(parent).first().copied() {
        Some(first) => tree.insert_before(parent, child, first),
        None => tree.append_child(parent, child),
    }
}

/// A run of text within a paragraph (`<w:r>`).
#[derive(Debug, Clone)]
pub struct Run {
    tree: SharedTree,
    node: NodeId,
}

impl Run {
    pub(crate) fn new(tree: SharedTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Text of the run; `w:tab` reads as `\t`, `w:br` and `w:cr` as `\n`.
    pub fn text(&self) -> Result<String> {
        let tree = self.tree.read();
        let mut text = String::new();
        push_run_text(&tree, self.node, &mut text)?;
        Ok(text)
    }

    /// Append a single `w:t` holding `text` verbatim.
    ///
    /// `xml:space="preserve"` is set when the text starts or ends with
    /// whitespace, otherwise Word would drop it.
    pub fn add_text(&self, text: &str) -> Result<()> {
        let mut tree = self.tree.write();
        let t = build_text(&mut tree, text)?;
        tree.append_child(self.node, t)
    }

    /// Replace the run's content with `text`, keeping its `w:rPr`.
    pub fn set_text(&self, text: &str) -> Result<()> {
        check_chars(text)?;
        let mut tree = self.tree.write();
        let content: SmallVec<[NodeId; 8]> = tree
            .children(self.node)
            .iter()
            .copied()
            .filter(|&c| !tree.is(c, &W_R_PR))
            .collect();
        for child in content {
            tree.detach(child);
        }
        append_run_content(&mut tree, self.node, text)
    }

    /// Append a `w:br` of the given type.
    pub fn add_break(&self, break_type: WdBreakType) -> Result<()> {
        let mut tree = self.tree.write();
        let br = tree.create_element(&W_BR);
        if let Some(value) = break_type.to_xml() {
            tree.set_attr(br, &W_TYPE, value)?;
        }
        tree.append_child(self.node, br)
    }
}

fn build_text(tree: &mut XmlTree, text: &str) -> Result<NodeId> {
    let t = tree.create_element(&W_T);
    if text.trim() != text {
        tree.set_attr(t, &XML_SPACE, "preserve")?;
    }
    if !text.is_empty() {
        let data = tree.create_text(text)?;
        tree.append_child(t, data)?;
    }
    Ok(t)
}

/// Append `text` to run `r`, translating `\t` to `w:tab` and each of `\n`,
/// `\r` and `\r\n` to one `w:br`.
pub(crate) fn append_run_content(tree: &mut XmlTree, r: NodeId, text: &str) -> Result<()> {
    let mut pending = String::new();
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        let special: Option<&QName> = match ch {
            '\t' => Some(&W_TAB),
            '\r' => {
                chars.next_if_eq(&'\n');
                Some(&W_BR)
            },
            '\n' => Some(&W_BR),
            _ => None,
        };
        match special {
            Some(qname) => {
                if !pending.is_empty() {
                    let t = build_text(tree, &pending)?;
                    tree.append_child(r, t)?;
                    pending.clear();
                }
                let node = tree.create_element(qname);
                tree.append_child(r, node)?;
            },
            None => pending.push(ch),
        }
    }
    if !pending.is_empty() {
        let t = build_text(tree, &pending)?;
        tree.append_child(r, t)?;
    }
    Ok(())
}

fn push_run_text(tree: &XmlTree, run: NodeId, out: &mut String) -> Result<()> {
    for child in tree.element_children(run) {
        if tree.is(child, &W_T) {
            out.push_str(&tree.text(child)?);
        } else if tree.is(child, &W_TAB) {
            out.push('\t');
        } else if tree.is(child, &W_CR) {
            out.push('\n');
        } else if tree.is(child, &W_BR) {
            // page and column breaks carry no text
            if WdBreakType::from_xml(tree.attr(child, &W_TYPE)) == Some(WdBreakType::Line) {
                out.push('\n');
            }
        }
    }
    Ok(())
}
