//! Ghost lifecycle: scanning installed packages, launching and closing
//! instances, and wiring each instance's engine to the bus and renderer.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use yurei_bus::{Signal, SignalBus, SubscriptionId, WILDCARD};
use yurei_core::Value;
use yurei_eval::{ActionResult, RuleEngine};
use yurei_storage::VariableStore;

use crate::error::HostError;
use crate::manifest::{load_manifest, GhostManifest};
use crate::render::{BalloonWindow, CharacterWindow, Renderer};
use crate::shell::load_shell;

struct GhostInstance {
    manifest: GhostManifest,
    engine: Arc<RuleEngine>,
    character: Arc<CharacterWindow>,
    balloon: Arc<BalloonWindow>,
    subscription: Option<SubscriptionId>,
}

/// Owns every installed and running ghost under one baseware root.
pub struct GhostManager {
    root: PathBuf,
    bus: Arc<SignalBus>,
    renderer: Renderer,
    installed: Mutex<BTreeMap<String, GhostManifest>>,
    running: Mutex<BTreeMap<String, GhostInstance>>,
}

impl GhostManager {
    pub fn new(root: PathBuf, bus: Arc<SignalBus>) -> Self {
        GhostManager {
            root,
            bus,
            renderer: Renderer::new(),
            installed: Mutex::new(BTreeMap::new()),
            running: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Rescans `<root>/ghosts/*/manifest.json`. Unreadable manifests are
    /// skipped with a warning.
    pub fn scan_installed(&self) -> Result<(), HostError> {
        let mut installed = self.installed.lock().expect("ghost registry poisoned");
        installed.clear();
        let ghosts_dir = self.root.join("ghosts");
        if !ghosts_dir.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(&ghosts_dir)? {
            let manifest_path = entry?.path().join("manifest.json");
            if !manifest_path.is_file() {
                continue;
            }
            match load_manifest(&manifest_path) {
                Ok(manifest) => {
                    installed.insert(manifest.id.clone(), manifest);
                }
                Err(err) => {
                    tracing::warn!(path = %manifest_path.display(), error = %err, "skipping unreadable manifest");
                }
            }
        }
        Ok(())
    }

    pub fn installed_ghosts(&self) -> Vec<GhostManifest> {
        self.installed
            .lock()
            .expect("ghost registry poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn running_ghosts(&self) -> Vec<GhostManifest> {
        self.running
            .lock()
            .expect("ghost registry poisoned")
            .values()
            .map(|instance| instance.manifest.clone())
            .collect()
    }

    /// Activates an installed ghost: store, engine, windows, and the
    /// wildcard dispatch subscription. Returns false (with a warning) when
    /// the id is not installed; relaunching a running ghost is a no-op.
    pub fn launch_ghost(&self, ghost_id: &str) -> Result<bool, HostError> {
        if self
            .running
            .lock()
            .expect("ghost registry poisoned")
            .contains_key(ghost_id)
        {
            return Ok(true);
        }
        let manifest = {
            let installed = self.installed.lock().expect("ghost registry poisoned");
            match installed.get(ghost_id) {
                Some(manifest) => manifest.clone(),
                None => {
                    tracing::warn!(ghost = ghost_id, "ghost not installed");
                    return Ok(false);
                }
            }
        };

        let ghost_dir = self.root.join("ghosts").join(ghost_id);
        let shell = load_shell(&ghost_dir.join(&manifest.shell.default), &manifest.shell.surfaces)?;
        let store = VariableStore::new(ghost_dir.join(&manifest.storage.path));
        store.ensure_initialized()?;
        let engine = Arc::new(RuleEngine::load(ghost_id, &ghost_dir, store)?);

        let click_bus = Arc::clone(&self.bus);
        let click_ghost = ghost_id.to_string();
        let character = self.renderer.create_character(
            ghost_id,
            shell,
            move |hitbox, x, y, button| {
                click_bus.publish(
                    &Signal::new("world.input.click")
                        .with("ghost_id", Value::Text(click_ghost.clone()))
                        .with("hitbox", Value::Text(hitbox.to_string()))
                        .with("button", Value::Text(button.to_string()))
                        .with("x", Value::Int(x))
                        .with("y", Value::Int(y)),
                );
            },
        );
        let balloon = self
            .renderer
            .create_balloon(ghost_id, self.load_balloon_style(&manifest)?);

        {
            let mut running = self.running.lock().expect("ghost registry poisoned");
            running.insert(
                ghost_id.to_string(),
                GhostInstance {
                    manifest,
                    engine: Arc::clone(&engine),
                    character: Arc::clone(&character),
                    balloon: Arc::clone(&balloon),
                    subscription: None,
                },
            );
        }
        self.publish_presence();

        // Subscribed after the presence publish, so a ghost does not react
        // to its own launch announcement.
        let dispatch_ghost = ghost_id.to_string();
        let subscription = self.bus.subscribe(WILDCARD, move |signal| {
            match engine.handle_signal(signal) {
                Ok(results) => {
                    for result in results {
                        match result {
                            ActionResult::Say { text } => balloon.say(&text),
                            ActionResult::SetSurface { id } => character.set_surface(&id),
                            ActionResult::Noop => {}
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(ghost = %dispatch_ghost, error = %err, "signal handling failed");
                }
            }
        });
        if let Some(instance) = self
            .running
            .lock()
            .expect("ghost registry poisoned")
            .get_mut(ghost_id)
        {
            instance.subscription = Some(subscription);
        }
        Ok(true)
    }

    /// Deactivates a running ghost and announces the presence change.
    pub fn close_ghost(&self, ghost_id: &str) {
        let instance = self
            .running
            .lock()
            .expect("ghost registry poisoned")
            .remove(ghost_id);
        let Some(instance) = instance else {
            return;
        };
        if let Some(subscription) = instance.subscription {
            self.bus.unsubscribe(WILDCARD, subscription);
        }
        self.renderer.close(ghost_id);
        self.publish_presence();
    }

    /// Closes the ghost if running, then removes its package directory and
    /// registry entry.
    pub fn request_delete(&self, ghost_id: &str) -> Result<(), HostError> {
        self.close_ghost(ghost_id);
        let ghost_dir = self.root.join("ghosts").join(ghost_id);
        if ghost_dir.is_dir() {
            fs::remove_dir_all(&ghost_dir)?;
        }
        self.installed
            .lock()
            .expect("ghost registry poisoned")
            .remove(ghost_id);
        Ok(())
    }

    /// Forwards a synthetic click to a running ghost's character window.
    pub fn simulate_click(&self, ghost_id: &str, x: i64, y: i64) {
        let character = self
            .running
            .lock()
            .expect("ghost registry poisoned")
            .get(ghost_id)
            .map(|instance| Arc::clone(&instance.character));
        match character {
            Some(character) => character.simulate_click(x, y),
            None => tracing::warn!(ghost = ghost_id, "no running ghost to click"),
        }
    }

    /// The running instance's engine, for state inspection.
    pub fn engine(&self, ghost_id: &str) -> Option<Arc<RuleEngine>> {
        self.running
            .lock()
            .expect("ghost registry poisoned")
            .get(ghost_id)
            .map(|instance| Arc::clone(&instance.engine))
    }

    fn publish_presence(&self) {
        let snapshot: Vec<Value> = {
            let running = self.running.lock().expect("ghost registry poisoned");
            running
                .values()
                .map(|instance| {
                    let mut entry = BTreeMap::new();
                    entry.insert(
                        "id".to_string(),
                        Value::Text(instance.manifest.id.clone()),
                    );
                    entry.insert(
                        "name".to_string(),
                        Value::Text(instance.manifest.name.clone()),
                    );
                    Value::Map(entry)
                })
                .collect()
        };
        self.bus.publish(
            &Signal::new("world.presence.changed").with("running", Value::List(snapshot)),
        );
    }

    fn load_balloon_style(
        &self,
        manifest: &GhostManifest,
    ) -> Result<Option<serde_json::Value>, HostError> {
        let balloon_path = self
            .root
            .join("balloons")
            .join(&manifest.balloon.default)
            .join("balloon.json");
        if !balloon_path.is_file() {
            return Ok(None);
        }
        let data: serde_json::Value = serde_json::from_str(&fs::read_to_string(&balloon_path)?)?;
        Ok(data.get("style").cloned())
    }
}
