//! Relationships from a part to the resources its content references.
//!
//! A document part refers to images, charts and hyperlinks through `r:embed`,
//! `r:link` and `r:id` attributes whose values are keys into this collection.
//! The object model never dereferences them itself; callers look targets up
//! explicitly.
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::constants::{namespace, target_mode};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::oxml::ns::QName;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::collections::HashMap;

const RELATIONSHIPS: QName = QName::new("", namespace::OPC_RELATIONSHIPS, "Relationships");
const RELATIONSHIP: QName = QName::new("", namespace::OPC_RELATIONSHIPS, "Relationship");
const ATTR_ID: QName = QName::unqualified("Id");
const ATTR_TYPE: QName = QName::unqualified("Type");
const ATTR_TARGET: QName = QName::unqualified("Target");
const ATTR_TARGET_MODE: QName = QName::unqualified("TargetMode");

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    /// Part reference relative to `base_uri`, or an absolute URL when external
    target_ref: String,
    base_uri: String,
    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Absolute partname of the target.
    ///
    /// # Errors
    ///
    /// [`OpcError::InvalidRelationship`] for an external relationship.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "{} targets an external resource",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref)
    }
}

/// Relationships of one source part, keyed by rId.
#[derive(Debug, Clone)]
pub struct Relationships {
    base_uri: String,
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: HashMap::new(),
        }
    }

    /// Insert a relationship under `r_id`, replacing any existing one.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) -> &Relationship {
        let rel = Relationship::new(
            r_id.clone(),
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        );
        self.rels.entry(r_id).insert_entry(rel).into_mut()
    }

    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    fn find(&self, reltype: &str, target_ref: &str, is_external: bool) -> Option<String> {
        self.rels
            .values()
            .find(|rel| {
                rel.reltype == reltype
                    && rel.target_ref == target_ref
                    && rel.is_external == is_external
            })
            .map(|rel| rel.r_id.clone())
    }

    /// rId of the internal relationship of `reltype` to `target_ref`, added
    /// with the next free rId when none exists yet.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> String {
        if let Some(r_id) = self.find(reltype, target_ref, false) {
            return r_id;
        }
        let r_id = self.next_r_id();
        self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id.clone(), false);
        r_id
    }

    /// External counterpart of [`get_or_add`](Self::get_or_add).
    pub fn get_or_add_ext_rel(&mut self, reltype: &str, target_ref: &str) -> String {
        if let Some(r_id) = self.find(reltype, target_ref, true) {
            return r_id;
        }
        let r_id = self.next_r_id();
        self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id.clone(), true);
        r_id
    }

    /// Lowest `rIdN` not yet taken, filling gaps first.
    fn next_r_id(&self) -> String {
        let mut used: Vec<u32> = self.rels.keys().filter_map(|r_id| r_id_number(r_id)).collect();
        used.sort_unstable();

        let mut next = 1u32;
        for num in used {
            match num.cmp(&next) {
                std::cmp::Ordering::Equal => next += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }
        format!("rId{}", next)
    }

    /// The single relationship of `reltype`.
    ///
    /// # Errors
    ///
    /// [`OpcError::RelationshipNotFound`] when there is none,
    /// [`OpcError::InvalidRelationship`] when there is more than one.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.values().filter(|rel| rel.reltype == reltype);
        match (matching.next(), matching.next()) {
            (Some(rel), None) => Ok(rel),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        self.rels.remove(r_id)
    }

    /// Serialize as a `.rels` part, ordered by rId number.
    pub fn to_xml(&self) -> crate::ooxml::error::Result<Vec<u8>> {
        let mut rels: Vec<&Relationship> = self.rels.values().collect();
        rels.sort_by(|a, b| {
            r_id_number(&a.r_id)
                .cmp(&r_id_number(&b.r_id))
                .then_with(|| a.r_id.cmp(&b.r_id))
        });

        let mut writer = Writer::new(Vec::with_capacity(256 + rels.len() * 160));
        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
        )?;
        writer.get_mut().push(b'\n');

        let mut root = BytesStart::new(RELATIONSHIPS.local_name());
        root.push_attribute(("xmlns", namespace::OPC_RELATIONSHIPS));
        if rels.is_empty() {
            write(&mut writer, Event::Empty(root))?;
            return Ok(writer.into_inner());
        }
        write(&mut writer, Event::Start(root))?;
        for rel in rels {
            let mut elem = BytesStart::new(RELATIONSHIP.local_name());
            elem.push_attribute(("Id", rel.r_id.as_str()));
            elem.push_attribute(("Type", rel.reltype.as_str()));
            elem.push_attribute(("Target", rel.target_ref.as_str()));
            if rel.is_external {
                elem.push_attribute(("TargetMode", target_mode::EXTERNAL));
            }
            write(&mut writer, Event::Empty(elem))?;
        }
        write(
            &mut writer,
            Event::End(BytesEnd::new(RELATIONSHIPS.local_name())),
        )?;
        Ok(writer.into_inner())
    }

    /// Read a `.rels` part. `base_uri` is the directory of the source part.
    ///
    /// # Errors
    ///
    /// [`OoxmlError::Xml`] for malformed XML and
    /// [`OpcError::InvalidRelationship`] when the root is not `Relationships`
    /// or a child is not a complete `Relationship` element.
    pub fn from_xml(base_uri: &str, xml: &[u8]) -> crate::ooxml::error::Result<Self> {
        let tree = crate::ooxml::oxml::parse(xml)?;
        if !tree.is(tree.root(), &RELATIONSHIPS) {
            return Err(OpcError::InvalidRelationship(format!(
                "expected a Relationships root in the {} namespace",
                namespace::OPC_RELATIONSHIPS
            ))
            .into());
        }

        let mut rels = Self::new(base_uri.to_string());
        for id in tree.element_children(tree.root()) {
            if !tree.is(id, &RELATIONSHIP) {
                let name = tree.element(id).map(|e| e.name().to_string()).unwrap_or_default();
                return Err(
                    OpcError::InvalidRelationship(format!("unexpected element '{}'", name)).into(),
                );
            }
            let (Some(r_id), Some(reltype), Some(target)) = (
                tree.attr(id, &ATTR_ID),
                tree.attr(id, &ATTR_TYPE),
                tree.attr(id, &ATTR_TARGET),
            ) else {
                return Err(OpcError::InvalidRelationship(format!(
                    "Relationship element {} lacks Id, Type or Target",
                    id.index()
                ))
                .into());
            };
            let is_external = tree.attr(id, &ATTR_TARGET_MODE) == Some(target_mode::EXTERNAL);
            rels.add_relationship(
                reltype.to_string(),
                target.to_string(),
                r_id.to_string(),
                is_external,
            );
        }
        Ok(rels)
    }
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new("/".to_string())
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> crate::ooxml::error::Result<()> {
    writer
        .write_event(event)
        .map_err(|e| OoxmlError::Xml(e.to_string()))
}

fn r_id_number(r_id: &str) -> Option<u32> {
    let digits = r_id.strip_prefix("rId")?;
    atoi_simd::parse::<u32, false, false>(digits.as_bytes()).ok()
}
