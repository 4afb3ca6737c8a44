use super::*;

struct Slider {
    speed: i64,
}

fn slider() -> ComponentDefinition {
    register("slider", &["timer"], |_node: &Node, options: &Options| {
        Ok(Slider { speed: options.get("speed").and_then(serde_json::Value::as_i64).unwrap_or(1) })
    })
    .expect("definition")
}

#[test]
fn register_keeps_name_and_dependency_order() {
    let def = register("carousel", &["slider", "timer"], |_: &Node, _: &Options| Ok(()))
        .expect("definition");
    assert_eq!(def.name(), "carousel");
    assert_eq!(def.dependencies(), ["slider".to_owned(), "timer".to_owned()]);
}

#[test]
fn register_rejects_blank_name() {
    let err = register("  ", &[], |_: &Node, _: &Options| Ok(())).expect_err("blank name");
    assert_eq!(err, RegistryError::EmptyName);
}

#[test]
fn construct_returns_downcastable_instance() {
    let mut options = Options::new();
    options.insert("speed".into(), serde_json::json!(7));
    let instance = slider()
        .construct(&Node::new("div"), &options)
        .expect("construct");
    let slider = Rc::downcast::<Slider>(instance).expect("slider instance");
    assert_eq!(slider.speed, 7);
}

#[test]
fn construct_propagates_constructor_error() {
    let def = register("broken", &[], |_: &Node, _: &Options| {
        Err::<(), _>(ComponentError::Failed("boom".into()))
    })
    .expect("definition");
    let err = def
        .construct(&Node::new("div"), &Options::new())
        .expect_err("constructor fails");
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn registry_last_definition_wins_and_keeps_slot() {
    let first = register("a", &[], |_: &Node, _: &Options| Ok(1_u8)).expect("a");
    let second = register("b", &[], |_: &Node, _: &Options| Ok(2_u8)).expect("b");
    let replacement = register("a", &["b"], |_: &Node, _: &Options| Ok(3_u8)).expect("a2");

    let registry = Registry::new().with(first).with(second).with(replacement);

    assert_eq!(registry.len(), 2);
    let names = registry
        .definitions()
        .iter()
        .map(|d| d.name().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(registry.get("a").expect("a").dependencies(), ["b".to_owned()]);
}

#[test]
fn empty_registry_reports_empty() {
    let registry = Registry::new();
    assert!(registry.is_empty());
    assert!(registry.get("slider").is_none());
}
