//! Compile-time behavior: registry resolution, syntax errors, configuration

mod common;

use common::{probe, probe_ok, Stage};
use playlist_core::{Action, ActionResult, Completion};
use playlist_engine::{
    create_playlist, create_playlist_from_value, get_actions, register_action, Descriptor,
    EngineConfig, ParallelFailure, PlaylistCompiler, PlaylistError, SyntaxError,
};
use playlist_registry::ActionRegistry;
use serde_json::{json, Value};
use std::sync::Arc;

/// Completes with a fixed value
struct Fixed {
    completion: Completion,
    value: Value,
}

impl Fixed {
    fn new(value: Value) -> Self {
        Self {
            completion: Completion::new(),
            value,
        }
    }
}

impl Action for Fixed {
    fn completion(&self) -> &Completion {
        &self.completion
    }

    fn begin(&self, _input: Value) {
        self.complete(self.value.clone());
    }
}

#[test]
fn test_syntax_errors_surface_before_play() {
    let stage = Stage::new();
    let compiler = stage.compiler();

    let err = compiler
        .compile_value(&json!([probe("a"), {"intro": {"actionName": "modal"}}]))
        .unwrap_err();
    assert_eq!(
        err,
        PlaylistError::Syntax(SyntaxError::UnknownAction {
            path: "$[1].intro".to_string(),
            name: "modal".to_string(),
        })
    );
    assert!(err.is_syntax());
    assert!(stage.begun().is_empty());

    let err = compiler
        .compile_value(&json!([probe("a"), 7]))
        .unwrap_err();
    assert_eq!(
        err,
        PlaylistError::Syntax(SyntaxError::Unclassifiable {
            path: "$[1]".to_string(),
            found: "number".to_string(),
        })
    );

    let err = compiler
        .compile_value(&json!({"actionName": "probe"}))
        .unwrap_err();
    assert!(matches!(
        err,
        PlaylistError::Syntax(SyntaxError::InvalidOptions { ref path, ref name, .. })
            if path == "$" && name == "probe"
    ));

    let err = compiler
        .compile_value(&json!([{"actionName": "wait", "options": {"timeout": "1e30"}}]))
        .unwrap_err();
    assert!(matches!(
        err,
        PlaylistError::Syntax(SyntaxError::InvalidOptions { ref path, ref name, .. })
            if path == "$[0]" && name == "wait"
    ));

    let err = compiler
        .compile_value(&json!({"a": {"actionName": null}}))
        .unwrap_err();
    assert_eq!(
        err,
        PlaylistError::Syntax(SyntaxError::InvalidActionName {
            path: "$.a".to_string()
        })
    );
}

#[tokio::test]
async fn test_reregistering_affects_later_compiles_only() {
    let registry = Arc::new(ActionRegistry::new());
    registry.register("greet", |_options: Value| -> ActionResult<Fixed> {
        Ok(Fixed::new(json!("hello")))
    });
    let compiler = PlaylistCompiler::new(registry.clone());

    let before = compiler
        .compile_value(&json!({"actionName": "greet"}))
        .unwrap();

    registry.register("greet", |_options: Value| -> ActionResult<Fixed> {
        Ok(Fixed::new(json!("bonjour")))
    });
    let after = compiler
        .compile_value(&json!({"actionName": "greet"}))
        .unwrap();

    before.play().unwrap();
    after.play().unwrap();
    assert_eq!(before.completion().await, Ok(json!("hello")));
    assert_eq!(after.completion().await, Ok(json!("bonjour")));
}

#[tokio::test]
async fn test_unregistered_name_fails_after_unregister() {
    let registry = Arc::new(ActionRegistry::new());
    registry.register("greet", |_options: Value| -> ActionResult<Fixed> {
        Ok(Fixed::new(json!("hello")))
    });
    let compiler = PlaylistCompiler::new(registry.clone());
    assert!(compiler.compile_value(&json!([{"actionName": "greet"}])).is_ok());

    registry.unregister("greet");
    assert!(compiler
        .compile_value(&json!([{"actionName": "greet"}]))
        .unwrap_err()
        .is_syntax());
}

#[tokio::test]
async fn test_global_facade() {
    register_action("compile_test.fixed", |options: Value| -> ActionResult<Fixed> {
        Ok(Fixed::new(options))
    });
    assert!(get_actions().contains_key("compile_test.fixed"));

    let descriptor = Descriptor::sequence([
        Descriptor::action("compile_test.fixed", json!({"n": 1})),
        Descriptor::parallel([(
            "x",
            Descriptor::action("compile_test.fixed", json!({"n": 2})),
        )]),
    ]);
    let playlist = create_playlist(&descriptor).unwrap();
    playlist.play().unwrap();
    assert_eq!(playlist.completion().await, Ok(json!({"x": {"n": 2}})));

    let err = create_playlist_from_value(&json!([{"actionName": "compile_test.missing"}]))
        .unwrap_err();
    assert!(err.is_syntax());
}

#[tokio::test]
async fn test_instances_and_references_mix() {
    let stage = Stage::new();
    let descriptor = Descriptor::parallel([
        ("built", Descriptor::instance(Arc::new(Fixed::new(json!("ready"))))),
        ("named", Descriptor::from_value(&probe_ok("named", json!(1))).unwrap()),
    ]);

    let playlist = stage.compiler().compile(&descriptor).unwrap();
    assert_eq!(playlist.descriptor().action_count(), 2);

    playlist.play().unwrap();
    assert_eq!(
        playlist.completion().await,
        Ok(json!({"built": "ready", "named": 1}))
    );
}

#[test]
fn test_config_from_yaml_drives_compiler() {
    let config = EngineConfig::from_yaml_str("parallel_failure: settle_all\nmax_depth: 1\n").unwrap();
    assert_eq!(config.parallel_failure, ParallelFailure::SettleAll);

    let stage = Stage::new();
    let compiler = stage.compiler_with_config(config);

    assert!(compiler.compile_value(&json!([probe("a")])).is_ok());
    assert_eq!(
        compiler
            .compile_value(&json!([[probe("a")]]))
            .unwrap_err(),
        PlaylistError::Syntax(SyntaxError::TooDeep {
            path: "$[0]".to_string(),
            max_depth: 1,
        })
    );
}

#[test]
fn test_yaml_descriptor_compiles() {
    let stage = Stage::new();
    let descriptor = Descriptor::from_yaml_str(
        r#"
- actionName: probe
  options:
    name: first
- menu:
    actionName: wait
    options:
      timeout: "1.5"
  search:
    - actionName: probe
      options:
        name: second
"#,
    )
    .unwrap();

    let playlist = stage.compiler().compile(&descriptor).unwrap();
    assert_eq!(playlist.playlist().step_count(), 2);
    assert_eq!(stage.built(), vec!["first", "second"]);
}
