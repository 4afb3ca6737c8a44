//! Node state store: per-node load state and live component instances.
//!
//! DESIGN
//! ======
//! A side table keyed by node identity. Each entry holds a [`WeakNode`] next
//! to its [`NodeRecord`], so the store never keeps a node alive. Holding the
//! weak handle also pins the node's allocation address, which keeps identity
//! keys unique while the entry exists. Entries whose node is gone are swept
//! on every write and on [`NodeStore::len`]; callers never delete records.
//!
//! Records keep one instance per loaded component name. [`NodeRecord::component`]
//! still answers "the most recently stored instance" for callers that only
//! care about a single slot.
//!
//! TRADE-OFFS
//! ==========
//! An instance that stores a strong [`Node`] handle to its own node forms a
//! cycle through this table. Components should hold [`WeakNode`] if they
//! need to keep a reference.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use crate::dom::{Node, WeakNode};
use crate::registry::ComponentInstance;

pub const DEFAULT_COMPONENT_ATTRIBUTE: &str = "data-component";

/// Component names requested by `node` through `attribute`, in attribute order.
#[must_use]
pub fn requested_names(node: &Node, attribute: &str) -> Vec<String> {
    node.attribute(attribute)
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// NODE RECORD
// =============================================================================

#[derive(Clone, Default)]
pub struct NodeRecord {
    loaded_components: Vec<String>,
    components: Vec<(String, ComponentInstance)>,
}

impl NodeRecord {
    /// Names loaded on this node, in load order.
    #[must_use]
    pub fn loaded_components(&self) -> &[String] {
        &self.loaded_components
    }

    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded_components.iter().any(|n| n == name)
    }

    /// Most recently stored instance.
    #[must_use]
    pub fn component(&self) -> Option<&ComponentInstance> {
        self.components.last().map(|(_, instance)| instance)
    }

    #[must_use]
    pub fn component_named(&self, name: &str) -> Option<&ComponentInstance> {
        self.components
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, instance)| instance)
    }

    fn apply(&mut self, patch: RecordPatch) {
        for name in patch.mark_loaded {
            if !self.is_loaded(&name) {
                self.loaded_components.push(name);
            }
        }
        for (name, instance) in patch.components {
            // Re-storing a name moves it to the most-recent slot.
            self.components.retain(|(n, _)| *n != name);
            self.components.push((name, instance));
        }
    }
}

impl fmt::Debug for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRecord")
            .field("loaded_components", &self.loaded_components)
            .field(
                "components",
                &self.components.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Partial update merged into a node's record by [`NodeStore::set`].
#[derive(Default)]
pub struct RecordPatch {
    mark_loaded: Vec<String>,
    components: Vec<(String, ComponentInstance)>,
}

impl RecordPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mark_loaded(mut self, name: &str) -> Self {
        self.mark_loaded.push(name.to_owned());
        self
    }

    #[must_use]
    pub fn with_component(mut self, name: &str, instance: ComponentInstance) -> Self {
        self.components.push((name.to_owned(), instance));
        self
    }
}

// =============================================================================
// NODE STORE
// =============================================================================

struct Entry {
    node: WeakNode,
    record: NodeRecord,
}

pub struct NodeStore {
    component_attribute: String,
    entries: RefCell<HashMap<usize, Entry>>,
}

impl NodeStore {
    /// Create a store whose `find_*` lookups match `component_attribute`.
    #[must_use]
    pub fn new(component_attribute: &str) -> Self {
        Self {
            component_attribute: component_attribute.to_owned(),
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Snapshot of the record for `node`, if one exists.
    #[must_use]
    pub fn get(&self, node: &Node) -> Option<NodeRecord> {
        self.entries
            .borrow()
            .get(&node.identity())
            .filter(|entry| entry.node.is_alive())
            .map(|entry| entry.record.clone())
    }

    /// Merge `patch` into the record for `node`, creating the record if needed.
    pub fn set(&self, node: &Node, patch: RecordPatch) {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|_, entry| entry.node.is_alive());
        entries
            .entry(node.identity())
            .or_insert_with(|| Entry { node: node.downgrade(), record: NodeRecord::default() })
            .record
            .apply(patch);
    }

    /// Instance of `name` on the first node under `scope` (inclusive) that
    /// requests it.
    #[must_use]
    pub fn find_by_name(&self, scope: &Node, name: &str) -> Option<ComponentInstance> {
        self.matching_nodes(scope, name)
            .next()
            .and_then(|node| self.instance_on(&node, name))
    }

    /// One slot per node under `scope` that requests `name`, in document
    /// order. A slot is `None` while that node has no instance of `name`
    /// (not loaded yet, or its constructor failed).
    #[must_use]
    pub fn find_all_by_name(&self, scope: &Node, name: &str) -> Vec<Option<ComponentInstance>> {
        self.matching_nodes(scope, name)
            .map(|node| self.instance_on(&node, name))
            .collect()
    }

    /// Like [`NodeStore::find_by_name`], restricted to the node whose `id`
    /// attribute equals `id`.
    #[must_use]
    pub fn find_by_name_and_id(&self, scope: &Node, name: &str, id: &str) -> Option<ComponentInstance> {
        self.matching_nodes(scope, name)
            .find(|node| node.id().as_deref() == Some(id))
            .and_then(|node| self.instance_on(&node, name))
    }

    /// Number of records whose node is still alive.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|_, entry| entry.node.is_alive());
        entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching_nodes<'a>(&'a self, scope: &Node, name: &'a str) -> impl Iterator<Item = Node> + 'a {
        scope.descendants().into_iter().filter(move |node| {
            requested_names(node, &self.component_attribute)
                .iter()
                .any(|n| n == name)
        })
    }

    fn instance_on(&self, node: &Node, name: &str) -> Option<ComponentInstance> {
        self.entries
            .borrow()
            .get(&node.identity())
            .and_then(|entry| entry.record.component_named(name).cloned())
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new(DEFAULT_COMPONENT_ATTRIBUTE)
    }
}

impl fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("component_attribute", &self.component_attribute)
            .field("records", &self.entries.borrow().len())
            .finish()
    }
}
