//! Component registry: name, dependency list, and constructor per component.
//!
//! DESIGN
//! ======
//! Definitions are built once at startup through [`register`] (or
//! [`ComponentDefinition::new`]) and collected in a [`Registry`], an ordinary
//! name-to-definition map. Definitions are immutable and cheap to clone; the
//! constructor is shared behind an `Rc`.
//!
//! Dependency names are not validated here. A name the loader cannot find,
//! either in the definitions it was handed or in the registry, is skipped.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::dom::Node;
use crate::options::Options;

/// Type-erased component instance. Downcast with [`Rc::downcast`].
pub type ComponentInstance = Rc<dyn Any>;

type Constructor = dyn Fn(&Node, &Options) -> Result<ComponentInstance, ComponentError>;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("component name must not be empty")]
    EmptyName,
}

/// Error a component constructor may return.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ComponentError {
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("{0}")]
    Failed(String),
}

// =============================================================================
// DEFINITION
// =============================================================================

#[derive(Clone)]
pub struct ComponentDefinition {
    name: String,
    dependencies: Vec<String>,
    constructor: Rc<Constructor>,
}

impl ComponentDefinition {
    /// Build a definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] when `name` is empty or blank.
    pub fn new<T, F>(name: &str, dependencies: &[&str], constructor: F) -> Result<Self, RegistryError>
    where
        T: Any,
        F: Fn(&Node, &Options) -> Result<T, ComponentError> + 'static,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        Ok(Self {
            name: name.to_owned(),
            dependencies: dependencies.iter().map(|d| (*d).to_owned()).collect(),
            constructor: Rc::new(move |node: &Node, options: &Options| {
                constructor(node, options).map(|instance| Rc::new(instance) as ComponentInstance)
            }),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Invoke the constructor for `node`.
    ///
    /// # Errors
    ///
    /// Propagates whatever the component's constructor returns.
    pub fn construct(&self, node: &Node, options: &Options) -> Result<ComponentInstance, ComponentError> {
        (self.constructor)(node, options)
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Attach a name and dependency list to a constructor.
///
/// # Errors
///
/// Returns [`RegistryError::EmptyName`] when `name` is empty or blank.
pub fn register<T, F>(name: &str, dependencies: &[&str], constructor: F) -> Result<ComponentDefinition, RegistryError>
where
    T: Any,
    F: Fn(&Node, &Options) -> Result<T, ComponentError> + 'static,
{
    ComponentDefinition::new(name, dependencies, constructor)
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Name-to-definition table built at startup.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    by_name: HashMap<String, ComponentDefinition>,
    order: Vec<String>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. A second definition with the same name replaces the
    /// first and keeps its registration slot.
    pub fn insert(&mut self, definition: ComponentDefinition) {
        let name = definition.name().to_owned();
        if self.by_name.insert(name.clone(), definition).is_some() {
            warn!(component = %name, "component registered twice; last definition wins");
        } else {
            self.order.push(name);
        }
    }

    /// Builder form of [`Registry::insert`].
    #[must_use]
    pub fn with(mut self, definition: ComponentDefinition) -> Self {
        self.insert(definition);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.by_name.get(name)
    }

    /// All definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ComponentDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.by_name.get(name).cloned())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
