//! Minimal document tree used as the loader's node boundary.
//!
//! DESIGN
//! ======
//! The real document is owned by the host. This module gives the loader a
//! small reference-counted tree with the same surface it needs: attributes,
//! ordered children, a weak parent link, and pointer identity. Nodes are
//! cheap-clone handles; cloning a `Node` shares the underlying element.
//!
//! Parent links are weak so a subtree is reclaimed as soon as the last strong
//! handle to its root goes away.

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

struct NodeData {
    tag: String,
    attributes: RefCell<BTreeMap<String, String>>,
    children: RefCell<Vec<Node>>,
    parent: RefCell<Weak<NodeData>>,
}

/// Shared handle to a document element.
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

/// Non-owning handle to a document element.
#[derive(Clone)]
pub struct WeakNode(Weak<NodeData>);

impl Node {
    /// Create a detached element with the given tag name.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(NodeData {
            tag: tag.to_owned(),
            attributes: RefCell::new(BTreeMap::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
        }))
    }

    /// Builder form of [`Node::set_attribute`].
    #[must_use]
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`Node::append_child`].
    #[must_use]
    pub fn with_child(self, child: Node) -> Self {
        self.append_child(&child);
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    /// Append `child` as the last child of this node, detaching it from any
    /// previous parent.
    pub fn append_child(&self, child: &Node) {
        if let Some(previous) = child.parent() {
            previous
                .0
                .children
                .borrow_mut()
                .retain(|c| !c.ptr_eq(child));
        }
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
    }

    /// Remove `child` from this node's children. Returns `false` when it was
    /// not a direct child.
    pub fn remove_child(&self, child: &Node) -> bool {
        let mut children = self.0.children.borrow_mut();
        let before = children.len();
        children.retain(|c| !c.ptr_eq(child));
        let removed = children.len() != before;
        if removed {
            *child.0.parent.borrow_mut() = Weak::new();
        }
        removed
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.attributes.borrow().contains_key(name)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow_mut().remove(name)
    }

    /// The element's `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    /// Snapshot of the direct children.
    #[must_use]
    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    #[must_use]
    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    /// Topmost ancestor (the node itself when detached).
    #[must_use]
    pub fn root(&self) -> Node {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// This node and all of its descendants in document (pre-)order.
    ///
    /// The result is a snapshot: nodes appended while iterating it are not
    /// visited.
    #[must_use]
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let next = match self.attribute("class") {
            Some(list) if !list.trim().is_empty() => format!("{} {class}", list.trim()),
            _ => class.to_owned(),
        };
        self.set_attribute("class", &next);
    }

    /// Remove `class` from the `class` attribute. Returns whether it was present.
    pub fn remove_class(&self, class: &str) -> bool {
        let Some(list) = self.attribute("class") else {
            return false;
        };
        let kept = list
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>();
        let removed = kept.len() != list.split_whitespace().count();
        if removed {
            self.set_attribute("class", &kept.join(" "));
        }
        removed
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    /// Identity comparison: true when both handles point at the same element.
    #[must_use]
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity key of the shared allocation. Stable for as long as any
    /// strong or weak handle to the node exists.
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("tag", &self.0.tag)
            .field("attributes", &self.0.attributes.borrow())
            .field("children", &self.0.children.borrow().len())
            .finish()
    }
}

impl WeakNode {
    #[must_use]
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakNode")
            .field("alive", &self.is_alive())
            .finish()
    }
}
