//! Declarative component loading for rendered document trees.
//!
//! Nodes name the components they want through a `data-component` attribute
//! (comma-separated) and may carry JSON options in `data-component-options`.
//! A [`loader::Loader`] walks a subtree, builds each requested component once
//! per node, builds declared dependencies first, and keeps the live instances
//! in a [`store::NodeStore`] that never outlives its nodes.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`dom`] | Reference-counted document tree the loader walks |
//! | [`registry`] | Component definitions and the name → definition table |
//! | [`options`] | Safe parsing of per-node options |
//! | [`store`] | Weakly keyed per-node load state and instance lookups |
//! | [`loader`] | Dependency-ordered, idempotent load passes |
//! | [`tick`] | Deferred "next tick" work queue |
//! | [`timer`] | Pausable repeating timer |
//! | [`breakpoint`] | Breakpoint table and debounced viewport listener |
//! | [`config`] | Environment-driven settings |

pub mod breakpoint;
pub mod config;
pub mod dom;
pub mod loader;
pub mod options;
pub mod registry;
pub mod store;
pub mod tick;
pub mod timer;
