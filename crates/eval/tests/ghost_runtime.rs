//! End-to-end engine tests over a ghost package laid out on disk.

use std::fs;
use std::path::Path;

use yurei_bus::Signal;
use yurei_core::Value;
use yurei_eval::{ActionResult, RuleEngine};
use yurei_storage::VariableStore;

fn write_script(ghost_dir: &Path, name: &str, contents: &str) {
    let events = ghost_dir.join("ghost").join("events");
    fs::create_dir_all(&events).unwrap();
    fs::write(events.join(name), contents).unwrap();
}

fn store_for(ghost_dir: &Path) -> VariableStore {
    VariableStore::new(ghost_dir.join("save").join("state.json"))
}

#[test]
fn boot_rule_says_and_sets_surface() {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        dir.path(),
        "010_boot.yaml",
        concat!(
            "event: world.boot\n",
            "actions:\n",
            "  - say: \"Hello, ${strings.master}.\"\n",
            "  - set_surface: wave\n",
        ),
    );
    fs::write(
        dir.path().join("ghost").join("strings.yaml"),
        "master: Producer\n",
    )
    .unwrap();

    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();
    let results = engine.handle_signal(&Signal::new("world.boot")).unwrap();
    assert_eq!(
        results,
        vec![
            ActionResult::Say {
                text: "Hello, Producer.".into()
            },
            ActionResult::SetSurface { id: "wave".into() },
        ]
    );
}

#[test]
fn initial_state_merges_without_overwrite_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("ghost")).unwrap();
    fs::write(
        dir.path().join("ghost").join("state.yaml"),
        "name: Aya\nmood: 50\n",
    )
    .unwrap();

    // Pre-seed the store with a saved value the defaults must not clobber.
    let store = store_for(dir.path());
    let mut saved = std::collections::BTreeMap::new();
    saved.insert("mood".to_string(), Value::Int(80));
    store.save(&saved).unwrap();

    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();
    let vars = engine.vars();
    assert_eq!(vars.get("mood"), Some(&Value::Int(80)));
    assert_eq!(vars.get("name"), Some(&Value::Text("Aya".into())));

    // The merge was persisted immediately: a fresh store sees it.
    let reloaded = store_for(dir.path()).load().unwrap();
    assert_eq!(reloaded.get("name"), Some(&Value::Text("Aya".into())));
    assert_eq!(reloaded.get("mood"), Some(&Value::Int(80)));
}

#[test]
fn all_matching_rules_fire_in_load_order() {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        dir.path(),
        "010_any_click.yaml",
        concat!(
            "event: world.input.click\n",
            "actions:\n",
            "  - say: first\n",
            "  - noop: true\n",
        ),
    );
    write_script(
        dir.path(),
        "020_left_click.yaml",
        concat!("event: world.input.click\n", "actions:\n", "  - say: second\n"),
    );

    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();
    let results = engine
        .handle_signal(&Signal::new("world.input.click.left"))
        .unwrap();
    assert_eq!(
        results,
        vec![
            ActionResult::Say {
                text: "first".into()
            },
            ActionResult::Noop,
            ActionResult::Say {
                text: "second".into()
            },
        ]
    );
}

#[test]
fn trigger_prefix_requires_dot_boundary() {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        dir.path(),
        "010_click.yaml",
        concat!("event: world.input.click\n", "actions:\n", "  - say: hit\n"),
    );
    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();

    assert!(engine
        .handle_signal(&Signal::new("world.input"))
        .unwrap()
        .is_empty());
    assert!(engine
        .handle_signal(&Signal::new("world.input.clicked"))
        .unwrap()
        .is_empty());
    assert_eq!(
        engine
            .handle_signal(&Signal::new("world.input.click"))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn counter_persists_after_each_add() {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        dir.path(),
        "010_count.yaml",
        concat!(
            "event: world.input.click\n",
            "actions:\n",
            "  - add_var:\n",
            "    key: count\n",
            "    value: 1\n",
        ),
    );

    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();
    engine
        .handle_signal(&Signal::new("world.input.click"))
        .unwrap();
    assert_eq!(
        store_for(dir.path()).load().unwrap().get("count"),
        Some(&Value::Int(1))
    );
    engine
        .handle_signal(&Signal::new("world.input.click"))
        .unwrap();
    assert_eq!(
        store_for(dir.path()).load().unwrap().get("count"),
        Some(&Value::Int(2))
    );
    assert_eq!(engine.vars().get("count"), Some(&Value::Int(2)));
}

#[test]
fn conditions_gate_on_payload_and_vars() {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        dir.path(),
        "010_head_pat.yaml",
        concat!(
            "event: world.input.click\n",
            "when:\n",
            "  - eq: [\"${hitbox}\", head]\n",
            "  - gt: [\"${vars.mood}\", 40]\n",
            "actions:\n",
            "  - say: \"mood is ${vars.mood}\"\n",
        ),
    );
    fs::write(dir.path().join("ghost").join("state.yaml"), "mood: 50\n").unwrap();

    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();

    let hit = Signal::new("world.input.click").with("hitbox", Value::Text("head".into()));
    assert_eq!(
        engine.handle_signal(&hit).unwrap(),
        vec![ActionResult::Say {
            text: "mood is 50".into()
        }]
    );

    let miss = Signal::new("world.input.click").with("hitbox", Value::Text("tail".into()));
    assert!(engine.handle_signal(&miss).unwrap().is_empty());
}

#[test]
fn set_var_is_visible_to_later_actions_in_the_same_rule() {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        dir.path(),
        "010_boot.yaml",
        concat!(
            "event: world.boot\n",
            "actions:\n",
            "  - set_var:\n",
            "    key: greeted\n",
            "    value: true\n",
            "  - say: \"greeted=${vars.greeted}\"\n",
        ),
    );
    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();
    let results = engine.handle_signal(&Signal::new("world.boot")).unwrap();
    assert_eq!(
        results,
        vec![ActionResult::Say {
            text: "greeted=true".into()
        }]
    );
}

#[test]
fn add_var_on_non_integer_leaves_variable_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        dir.path(),
        "010_bump.yaml",
        concat!(
            "event: tick\n",
            "actions:\n",
            "  - add_var:\n",
            "    key: name\n",
            "    value: 1\n",
        ),
    );
    fs::write(dir.path().join("ghost").join("state.yaml"), "name: Aya\n").unwrap();

    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();
    engine.handle_signal(&Signal::new("tick")).unwrap();
    assert_eq!(engine.vars().get("name"), Some(&Value::Text("Aya".into())));
}

#[test]
fn broken_document_is_skipped_but_others_load() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "010_broken.yaml", "- item\nkey: value\n");
    write_script(
        dir.path(),
        "020_fine.yaml",
        concat!("event: world.boot\n", "actions:\n", "  - say: ok\n"),
    );
    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();
    let results = engine.handle_signal(&Signal::new("world.boot")).unwrap();
    assert_eq!(results, vec![ActionResult::Say { text: "ok".into() }]);
}

#[test]
fn missing_events_dir_means_no_rules() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RuleEngine::load("g", dir.path(), store_for(dir.path())).unwrap();
    assert!(engine
        .handle_signal(&Signal::new("world.boot"))
        .unwrap()
        .is_empty());
}
