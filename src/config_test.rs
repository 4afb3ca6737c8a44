use super::*;

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: u64 = env_parse("__TEST_CL_NONEXISTENT_KEY__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__TEST_CL_VALID__", "99") };
    let val: u64 = env_parse("__TEST_CL_VALID__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__TEST_CL_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_CL_INVALID__", "soon") };
    let val: u64 = env_parse("__TEST_CL_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__TEST_CL_INVALID__") };
}

// =============================================================================
// defaults
// =============================================================================

#[test]
fn loader_config_defaults_match_constants() {
    unsafe {
        std::env::remove_var("COMPONENT_ATTRIBUTE");
        std::env::remove_var("COMPONENT_OPTIONS_ATTRIBUTE");
        std::env::remove_var("LOADING_CLASS");
    }
    let config = LoaderConfig::from_env();
    assert_eq!(config, LoaderConfig::default());
    assert_eq!(config.component_attribute, "data-component");
    assert_eq!(config.options_attribute, DEFAULT_OPTIONS_ATTRIBUTE);
    assert_eq!(config.loading_class, DEFAULT_LOADING_CLASS);
}

#[test]
fn breakpoint_config_reads_debounce_and_path() {
    unsafe {
        std::env::set_var("BREAKPOINT_DEBOUNCE_MS", "100");
        std::env::set_var("BREAKPOINTS_PATH", "build/breakpoints.json");
    }
    let config = BreakpointConfig::from_env();
    unsafe {
        std::env::remove_var("BREAKPOINT_DEBOUNCE_MS");
        std::env::remove_var("BREAKPOINTS_PATH");
    }
    assert_eq!(config.debounce, Duration::from_millis(100));
    assert_eq!(config.breakpoints_path, Some(PathBuf::from("build/breakpoints.json")));
}

#[test]
fn breakpoint_config_default_debounce_is_quarter_second() {
    assert_eq!(BreakpointConfig::default().debounce, Duration::from_millis(250));
    assert!(BreakpointConfig::default().breakpoints_path.is_none());
}
