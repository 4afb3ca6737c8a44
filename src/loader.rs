//! Component loader: instantiates registered components on annotated nodes.
//!
//! DESIGN
//! ======
//! A load pass walks the subtree under `root` (inclusive, document order).
//! Every node whose component attribute names one or more components is
//! processed name by name:
//!
//! 1. Names without a matching definition are skipped.
//! 2. Declared dependencies are resolved against the definitions passed to
//!    [`Loader::load`], then the registry, and loaded by a nested pass over
//!    the same node's subtree before the dependent is built.
//!    That covers dependencies requested on the node itself and on its
//!    descendants.
//! 3. A name already loaded on the node is skipped; otherwise the options
//!    attribute is parsed, the constructor runs, and the instance is stored.
//!
//! After each matched node the loader defers removal of the loading class
//! from the document root onto its [`TickQueue`].
//!
//! ERROR HANDLING
//! ==============
//! Unknown names, unknown dependencies and malformed options are absorbed.
//! A constructor error is logged with node and component context, recorded in
//! the [`LoadReport`], and the pass moves on to the next component. A
//! component whose dependencies did not all load is not constructed.
//! Dependency cycles are detected with an in-progress stack of
//! `(node, name)` pairs and abort the pass with
//! [`LoadError::CyclicDependency`].

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use tracing::{debug, info, warn};

use crate::config::LoaderConfig;
use crate::dom::Node;
use crate::options::parse_options;
use crate::registry::{ComponentDefinition, ComponentError, Registry};
use crate::store::{NodeStore, RecordPatch, requested_names};
use crate::tick::TickQueue;

// =============================================================================
// ERROR AND REPORT TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("cyclic dependency: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedComponent {
    pub node_id: Option<String>,
    pub component: String,
    /// Loaded by a dependency pass rather than the top-level walk.
    pub as_dependency: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// The constructor returned an error.
    Constructor(ComponentError),
    /// At least one dependency did not load.
    DependencyFailed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadFailure {
    pub node_id: Option<String>,
    pub component: String,
    pub reason: FailureReason,
}

/// Outcome of one load pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<LoadedComponent>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
struct PassState {
    /// Definitions the pass was started with; searched before the registry.
    catalog: Vec<ComponentDefinition>,
    in_progress: Vec<(usize, String)>,
    failed: Vec<(usize, String)>,
    report: LoadReport,
}

impl PassState {
    fn fail(&mut self, node: &Node, key: (usize, String), reason: FailureReason) {
        self.report.failures.push(LoadFailure {
            node_id: node.id(),
            component: key.1.clone(),
            reason,
        });
        self.failed.push(key);
    }
}

// =============================================================================
// LOADER
// =============================================================================

#[derive(Debug)]
pub struct Loader {
    registry: Registry,
    config: LoaderConfig,
    store: NodeStore,
    ticks: TickQueue,
}

impl Loader {
    #[must_use]
    pub fn new(registry: Registry, config: LoaderConfig) -> Self {
        let store = NodeStore::new(&config.component_attribute);
        Self { registry, config, store, ticks: TickQueue::new() }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Deferred work produced by load passes (loading-marker removal).
    #[must_use]
    pub fn ticks(&self) -> &TickQueue {
        &self.ticks
    }

    /// Load every registered component under `root`.
    ///
    /// # Errors
    ///
    /// See [`Loader::load`].
    pub fn load_all(&self, root: &Node) -> Result<LoadReport, LoadError> {
        self.load(root, &self.registry.definitions())
    }

    /// Load `definitions` on every annotated node under `root` (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::CyclicDependency`] when a component depends on
    /// itself, directly or through other components. Components constructed
    /// before the cycle was found stay loaded.
    pub fn load(&self, root: &Node, definitions: &[ComponentDefinition]) -> Result<LoadReport, LoadError> {
        let mut pass = PassState { catalog: definitions.to_vec(), ..PassState::default() };
        self.load_subtree(root, definitions, false, &mut pass)?;
        info!(
            loaded = pass.report.loaded.len(),
            failed = pass.report.failures.len(),
            "component load pass finished"
        );
        Ok(pass.report)
    }

    /// Returns whether every requested component that matched `definitions`
    /// is loaded.
    fn load_subtree(
        &self,
        root: &Node,
        definitions: &[ComponentDefinition],
        as_dependency: bool,
        pass: &mut PassState,
    ) -> Result<bool, LoadError> {
        let mut all_loaded = true;
        for node in root.descendants() {
            let names = requested_names(&node, &self.config.component_attribute);
            if names.is_empty() {
                continue;
            }
            for name in &names {
                let Some(definition) = definitions.iter().find(|d| d.name() == name) else {
                    continue;
                };
                all_loaded &= self.load_component(&node, definition, as_dependency, pass)?;
            }
            self.defer_marker_removal(&node);
        }
        Ok(all_loaded)
    }

    fn load_component(
        &self,
        node: &Node,
        definition: &ComponentDefinition,
        as_dependency: bool,
        pass: &mut PassState,
    ) -> Result<bool, LoadError> {
        let name = definition.name();
        let key = (node.identity(), name.to_owned());

        if let Some(start) = pass.in_progress.iter().position(|k| *k == key) {
            let mut cycle = pass.in_progress[start..]
                .iter()
                .map(|(_, n)| n.clone())
                .collect::<Vec<_>>();
            cycle.push(name.to_owned());
            warn!(cycle = %cycle.join(" -> "), node_id = ?node.id(), "cyclic component dependency");
            return Err(LoadError::CyclicDependency { cycle });
        }
        if pass.failed.contains(&key) {
            return Ok(false);
        }

        if !definition.dependencies().is_empty() {
            let dependencies = self.resolve_dependencies(definition, &pass.catalog);
            pass.in_progress.push(key.clone());
            let outcome = self.load_subtree(node, &dependencies, true, pass);
            pass.in_progress.pop();
            if !outcome? {
                warn!(component = %name, node_id = ?node.id(), "dependency failed; component not loaded");
                pass.fail(node, key, FailureReason::DependencyFailed);
                return Ok(false);
            }
        }

        let record = self.store.get(node).unwrap_or_else(|| {
            self.store.set(node, RecordPatch::new());
            Default::default()
        });
        if record.is_loaded(name) {
            debug!(component = %name, node_id = ?node.id(), "component already loaded");
            return Ok(true);
        }

        let options = parse_options(node.attribute(&self.config.options_attribute).as_deref());
        match definition.construct(node, &options) {
            Ok(instance) => {
                self.store
                    .set(node, RecordPatch::new().mark_loaded(name).with_component(name, instance));
                if as_dependency {
                    debug!(component = %name, node_id = ?node.id(), "component loaded as dependency");
                } else {
                    debug!(component = %name, node_id = ?node.id(), "component loaded");
                }
                pass.report.loaded.push(LoadedComponent {
                    node_id: node.id(),
                    component: name.to_owned(),
                    as_dependency,
                });
                Ok(true)
            }
            Err(error) => {
                warn!(component = %name, node_id = ?node.id(), error = %error, "component failed to load");
                pass.fail(node, key, FailureReason::Constructor(error));
                Ok(false)
            }
        }
    }

    fn resolve_dependencies(
        &self,
        definition: &ComponentDefinition,
        catalog: &[ComponentDefinition],
    ) -> Vec<ComponentDefinition> {
        definition
            .dependencies()
            .iter()
            .filter_map(|name| {
                let found = catalog
                    .iter()
                    .find(|d| d.name() == name)
                    .or_else(|| self.registry.get(name))
                    .cloned();
                if found.is_none() {
                    debug!(component = %definition.name(), dependency = %name, "dependency not defined; skipping");
                }
                found
            })
            .collect()
    }

    fn defer_marker_removal(&self, node: &Node) {
        let root = node.root();
        let class = self.config.loading_class.clone();
        self.ticks.defer(move || {
            if root.remove_class(&class) {
                debug!(class = %class, "loading marker removed");
            }
        });
    }
}
