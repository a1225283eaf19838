// SPDX-License-Identifier: MIT OR Apache-2.0

//! The SGF document tree: properties, nodes and game trees
//!
//! Ownership is arena-style: a game tree owns its node vector and its child
//! trees, and "previous node" is simply the preceding vector index. No
//! back-pointers, no reference-count cycles.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use crate::errors::SgfError;
use crate::flavor::{flavor_for, CookContext, Flavor};
use crate::value::{escape_text, CookedValue, Raw};

/// The application identifier injected into every written game tree
fn application_value() -> CookedValue {
    CookedValue::Compose(
        Box::new(CookedValue::SimpleText(env!("CARGO_PKG_NAME").to_string())),
        Box::new(CookedValue::SimpleText(env!("CARGO_PKG_VERSION").to_string())),
    )
}

/// A property's value: raw until cooked, typed afterwards
///
/// The transition is one-way and explicit; cooking an already cooked
/// property is a no-op, which makes the pipeline safely re-entrant.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Uncooked bracket groups as lexed
    Raw(Raw),
    /// Typed value assigned by the flavor
    Cooked(CookedValue),
}

/// One `ID[value]...` occurrence on a node
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    id: String,
    value: PropertyValue,
}

impl Property {
    fn new(id: String) -> Self {
        Self {
            id,
            value: PropertyValue::Raw(Raw::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// The raw value list, if not yet cooked
    pub fn raw(&self) -> Option<&Raw> {
        match &self.value {
            PropertyValue::Raw(raw) => Some(raw),
            PropertyValue::Cooked(_) => None,
        }
    }

    /// The typed value, once cooked
    pub fn cooked(&self) -> Option<&CookedValue> {
        match &self.value {
            PropertyValue::Cooked(value) => Some(value),
            PropertyValue::Raw(_) => None,
        }
    }

    pub fn is_cooked(&self) -> bool {
        matches!(self.value, PropertyValue::Cooked(_))
    }

    fn push_raw(&mut self, text: String) {
        if let PropertyValue::Raw(raw) = &mut self.value {
            raw.push(text);
        }
    }

    /// Run the flavor's conversion, replacing the raw value in place
    ///
    /// Identifiers the flavor does not understand stay raw. Idempotent.
    pub fn cook(&mut self, flavor: &dyn Flavor, ctx: &CookContext) -> Result<(), SgfError> {
        let raw = match &self.value {
            PropertyValue::Cooked(_) => return Ok(()),
            PropertyValue::Raw(raw) => raw,
        };
        if let Some(cooked) = flavor.cook(&self.id, raw, ctx)? {
            self.value = PropertyValue::Cooked(cooked);
        }
        Ok(())
    }

    /// Wire payloads for each bracket group of this property
    fn wire_values(&self) -> Result<Vec<String>, SgfError> {
        match &self.value {
            PropertyValue::Cooked(value) => value.wire_values(),
            PropertyValue::Raw(raw) => {
                Ok(raw.values().map(|v| escape_text(v, false)).collect())
            }
        }
    }
}

/// One ply's set of properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    properties: BTreeMap<String, Property>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.get(id)
    }

    /// Properties in identifier order
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Create a fresh raw property; false if the identifier already exists
    pub(crate) fn insert_new(&mut self, id: &str) -> bool {
        if self.properties.contains_key(id) {
            return false;
        }
        self.properties
            .insert(id.to_string(), Property::new(id.to_string()));
        true
    }

    pub(crate) fn push_raw(&mut self, id: &str, text: String) {
        if let Some(prop) = self.properties.get_mut(id) {
            prop.push_raw(text);
        }
    }

    /// Set a cooked property programmatically, replacing any existing one
    ///
    /// Identifiers must match `[A-Z]+`.
    pub fn set_property(&mut self, id: &str, value: CookedValue) -> Result<(), SgfError> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(SgfError::Usage(format!(
                "invalid property identifier '{}'",
                id
            )));
        }
        self.properties.insert(
            id.to_string(),
            Property {
                id: id.to_string(),
                value: PropertyValue::Cooked(value),
            },
        );
        Ok(())
    }

    pub fn remove_property(&mut self, id: &str) -> Option<Property> {
        self.properties.remove(id)
    }

    fn cook(&mut self, flavor: &dyn Flavor, ctx: &CookContext) -> Result<(), SgfError> {
        for prop in self.properties.values_mut() {
            prop.cook(flavor, ctx)?;
        }
        Ok(())
    }

    /// Write `;` followed by the properties in sorted identifier order
    ///
    /// `ap` substitutes the application identifier on the tree's first node.
    fn write_to<W: Write>(
        &self,
        out: &mut W,
        ap: Option<&CookedValue>,
    ) -> Result<usize, SgfError> {
        let mut written = 1usize;
        out.write_all(b";")?;

        let mut ap_pending = ap;
        for (id, prop) in &self.properties {
            if let Some(value) = ap_pending {
                if id.as_str() > "AP" {
                    written += write_property(out, "AP", &value.wire_values()?)?;
                    ap_pending = None;
                }
            }
            if ap.is_some() && id == "AP" {
                continue; // replaced by the injected value
            }
            written += write_property(out, id, &prop.wire_values()?)?;
        }
        if let Some(value) = ap_pending {
            written += write_property(out, "AP", &value.wire_values()?)?;
        }
        Ok(written)
    }
}

fn write_property<W: Write>(
    out: &mut W,
    id: &str,
    groups: &[String],
) -> Result<usize, SgfError> {
    let mut written = id.len();
    out.write_all(id.as_bytes())?;
    for group in groups {
        out.write_all(b"[")?;
        out.write_all(group.as_bytes())?;
        out.write_all(b"]")?;
        written += group.len() + 2;
    }
    Ok(written)
}

/// One game record: a main line of nodes plus variation subtrees
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameTree {
    nodes: Vec<Node>,
    children: Vec<GameTree>,
}

impl GameTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn children(&self) -> &[GameTree] {
        &self.children
    }

    /// The root node carrying match-wide properties
    pub fn root_node(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn root_node_mut(&mut self) -> Option<&mut Node> {
        self.nodes.first_mut()
    }

    pub fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn push_child(&mut self, child: GameTree) {
        self.children.push(child);
    }

    pub(crate) fn last_node_mut(&mut self) -> Option<&mut Node> {
        self.nodes.last_mut()
    }

    /// Game id from the root node's `GM` property, "0" if absent
    pub fn game_id(&self) -> String {
        let prop = match self.root_node().and_then(|n| n.property("GM")) {
            Some(prop) => prop,
            None => return "0".to_string(),
        };
        match prop.value() {
            PropertyValue::Cooked(CookedValue::Number(n)) => n.to_string(),
            PropertyValue::Raw(raw) => raw.get(0).unwrap_or("0").trim().to_string(),
            _ => "0".to_string(),
        }
    }

    /// Resolve this tree's flavor from its `GM` property
    pub fn flavor(&self) -> Arc<dyn Flavor> {
        flavor_for(&self.game_id())
    }

    /// Charset from this tree's root `CA` property; subtrees do not inherit
    fn charset(&self) -> String {
        let prop = self.root_node().and_then(|n| n.property("CA"));
        match prop.map(|p| p.value()) {
            Some(PropertyValue::Cooked(CookedValue::SimpleText(cs))) => cs.clone(),
            Some(PropertyValue::Raw(raw)) => {
                raw.get(0).unwrap_or("UTF-8").trim().to_string()
            }
            _ => "UTF-8".to_string(),
        }
    }

    /// Cook every property of every node, then the variation subtrees
    ///
    /// Failures surface immediately; properties cooked before the failing
    /// one stay cooked.
    pub fn cook(&mut self) -> Result<(), SgfError> {
        let flavor = self.flavor();
        tracing::debug!(game_id = %flavor.game_id(), "cooking game tree");
        self.cook_with(&*flavor)
    }

    fn cook_with(&mut self, flavor: &dyn Flavor) -> Result<(), SgfError> {
        let charset = self.charset();
        let ctx = CookContext { charset: &charset };
        for node in &mut self.nodes {
            node.cook(flavor, &ctx)?;
        }
        for child in &mut self.children {
            // Same game, same flavor; each subtree derives its own charset.
            child.cook_with(flavor)?;
        }
        Ok(())
    }

    /// Write `( nodes... subtrees... )`, injecting the `AP` identifier
    pub(crate) fn write_to<W: Write>(&self, out: &mut W) -> Result<usize, SgfError> {
        self.write_inner(out, true)
    }

    fn write_inner<W: Write>(&self, out: &mut W, is_root: bool) -> Result<usize, SgfError> {
        let mut written = 1usize;
        out.write_all(b"(")?;
        let ap = application_value();
        for (i, node) in self.nodes.iter().enumerate() {
            let inject = if is_root && i == 0 { Some(&ap) } else { None };
            written += node.write_to(out, inject)?;
        }
        for child in &self.children {
            written += child.write_inner(out, false)?;
        }
        out.write_all(b")")?;
        Ok(written + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Emphasis;

    #[test]
    fn property_identifier_validation() {
        let mut node = Node::new();
        assert!(node
            .set_property("GM", CookedValue::Number(6))
            .is_ok());
        assert!(node.set_property("gm", CookedValue::Number(6)).is_err());
        assert!(node.set_property("", CookedValue::Number(6)).is_err());
    }

    #[test]
    fn node_writes_sorted_with_injected_ap() {
        let mut node = Node::new();
        node.set_property("GM", CookedValue::Number(6)).unwrap();
        node.set_property("AW", CookedValue::SimpleText("x".into()))
            .unwrap();
        node.set_property("AB", CookedValue::SimpleText("y".into()))
            .unwrap();

        let mut tree = GameTree::new();
        tree.push_node(node);
        let mut out = Vec::new();
        let written = tree.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(written, text.len());

        let ab = text.find("AB").unwrap();
        let ap = text.find("AP").unwrap();
        let aw = text.find("AW").unwrap();
        let gm = text.find("GM").unwrap();
        assert!(ab < ap && ap < aw && aw < gm, "{}", text);
    }

    #[test]
    fn existing_ap_is_overwritten_on_write() {
        let mut node = Node::new();
        node.set_property(
            "AP",
            CookedValue::Compose(
                Box::new(CookedValue::SimpleText("other".into())),
                Box::new(CookedValue::SimpleText("9.9".into())),
            ),
        )
        .unwrap();
        let mut tree = GameTree::new();
        tree.push_node(node);
        let mut out = Vec::new();
        tree.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("other"));
        assert!(text.contains(env!("CARGO_PKG_NAME")));
        assert_eq!(text.matches("AP[").count(), 1);
    }

    #[test]
    fn cooking_is_idempotent() {
        let mut node = Node::new();
        assert!(node.insert_new("UC"));
        node.push_raw("UC", "2".to_string());
        let mut tree = GameTree::new();
        tree.push_node(node);
        tree.cook().unwrap();
        tree.cook().unwrap();
        let cooked = tree.nodes()[0].property("UC").unwrap().cooked().unwrap();
        assert_eq!(cooked, &CookedValue::Double(Emphasis::Strong));
    }

    #[test]
    fn game_id_defaults_to_base() {
        let tree = GameTree::new();
        assert_eq!(tree.game_id(), "0");
        assert_eq!(tree.flavor().game_id(), "0");
    }
}
