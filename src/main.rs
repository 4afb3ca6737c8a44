use component_loader::breakpoint::{BreakpointError, BreakpointListener, Breakpoints};
use component_loader::config::{BreakpointConfig, LoaderConfig, env_parse};
use component_loader::dom::Node;
use component_loader::loader::{LoadError, Loader};
use component_loader::options::Options;
use component_loader::registry::{ComponentError, Registry, RegistryError, register};
use tokio::sync::watch;
use tracing::{info, warn};

const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Breakpoints(#[from] BreakpointError),
}

/// Page-level component mounted on `<body>`.
struct Body {
    options: Options,
}

impl Body {
    fn new(node: &Node, options: &Options) -> Result<Self, ComponentError> {
        info!(tag = node.tag(), options = options.len(), "body component ready");
        Ok(Self { options: options.clone() })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StartupError> {
    tracing_subscriber::fmt::init();

    let config = LoaderConfig::from_env();
    let registry = Registry::new().with(register("body", &[], Body::new)?);
    let loader = Loader::new(registry, config.clone());

    let document = demo_document(&config);
    let report = loader.load_all(&document)?;
    for failure in &report.failures {
        warn!(component = %failure.component, node_id = ?failure.node_id, reason = ?failure.reason, "component not loaded");
    }
    if let Some(instance) = loader.store().find_by_name(&document, "body")
        && let Ok(body) = instance.downcast::<Body>()
    {
        info!(options = ?body.options, "body instance registered");
    }

    // Marker removal was deferred; let the runtime turn over before draining.
    tokio::task::yield_now().await;
    let ticks = loader.ticks().run_pending();
    info!(
        ticks,
        loading = document.has_class(&config.loading_class),
        loaded = report.loaded.len(),
        "document ready"
    );

    let breakpoint_config = BreakpointConfig::from_env();
    let breakpoints = match &breakpoint_config.breakpoints_path {
        Some(path) => Breakpoints::from_path(path)?,
        None => Breakpoints::new([("sm", 640), ("md", 768), ("lg", 1024), ("xl", 1280), ("2xl", 1536)]),
    };
    let (viewport_tx, viewport) = watch::channel(env_parse("VIEWPORT_WIDTH", DEFAULT_VIEWPORT_WIDTH));
    let listener = BreakpointListener::spawn(breakpoints, viewport, breakpoint_config.debounce, |change| {
        info!(screen_size = %change.screen_size, has_changed = change.has_changed, "screen size");
    });
    info!(width = listener.window_width(), "viewport observed");
    drop(viewport_tx);

    Ok(())
}

fn demo_document(config: &LoaderConfig) -> Node {
    let body = Node::new("body")
        .with_attribute(&config.component_attribute, "body")
        .with_attribute(&config.options_attribute, r#"{"theme": "light"}"#);
    Node::new("html")
        .with_attribute("class", &config.loading_class)
        .with_child(body)
}
