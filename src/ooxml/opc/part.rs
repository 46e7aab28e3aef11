//! The `Part` abstraction: one named, typed unit of a package.
//!
//! Parts own their outgoing relationships. XML parts hold a live element tree
//! and produce their bytes by serializing it, so `blob` may allocate.
use crate::ooxml::error::Result;
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;
use crate::ooxml::oxml::ns::R_ID;
use crate::ooxml::oxml::{self, XmlTree};
use std::borrow::Cow;

/// A part in an OPC package.
pub trait Part {
    fn partname(&self) -> &PackURI;

    fn content_type(&self) -> &str;

    /// Current content of the part. XML parts serialize their tree on each call.
    fn blob(&self) -> Result<Cow<'_, [u8]>>;

    fn rels(&self) -> &Relationships;

    fn rels_mut(&mut self) -> &mut Relationships;

    /// rId of the relationship of `reltype` to `target_partname`, created if
    /// it does not exist yet.
    fn relate_to(&mut self, target_partname: &PackURI, reltype: &str) -> String {
        let target_ref = target_partname.relative_ref(self.partname().base_uri());
        self.rels_mut().get_or_add(reltype, &target_ref)
    }

    /// rId of an external relationship to `target_url`, created if needed.
    fn relate_to_ext(&mut self, target_url: &str, reltype: &str) -> String {
        self.rels_mut().get_or_add_ext_rel(reltype, target_url)
    }

    /// Target reference stored for `r_id`: a relative partname or an external URL.
    fn target_ref(&self, r_id: &str) -> std::result::Result<&str, OpcError> {
        self.rels()
            .get(r_id)
            .map(|rel| rel.target_ref())
            .ok_or_else(|| OpcError::RelationshipNotFound(format!("rId: {}", r_id)))
    }

    /// Number of `r:id` attributes (relationships namespace, any prefix) with
    /// the value `r_id` in the part content.
    ///
    /// The default parses [`blob`](Self::blob); parts holding a live tree
    /// count on it directly.
    fn rel_ref_count(&self, r_id: &str) -> Result<usize> {
        let tree = oxml::parse(&self.blob()?)?;
        Ok(count_rel_refs(&tree, r_id))
    }

    /// Drop the relationship `r_id` when at most one reference to it remains,
    /// i.e. the one the caller is about to remove. Returns whether it was dropped.
    fn drop_rel(&mut self, r_id: &str) -> Result<bool> {
        if self.rel_ref_count(r_id)? < 2 {
            return Ok(self.rels_mut().remove(r_id).is_some());
        }
        Ok(false)
    }
}

/// Count `r:id="<r_id>"` attributes anywhere in `tree`, matched by namespace.
pub(crate) fn count_rel_refs(tree: &XmlTree, r_id: &str) -> usize {
    std::iter::once(tree.root())
        .chain(tree.descendants(tree.root()))
        .filter(|&id| tree.attr(id, &R_ID) == Some(r_id))
        .count()
}
