//! Logging-backed rendering collaborators.
//!
//! A real desktop shell would draw windows here; this renderer records the
//! same state transitions and logs what it would show, keeping the
//! collaborator contract (`set_surface`, `say`, click delivery) intact.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::shell::ShellDefinition;

type ClickHandler = Box<dyn Fn(&str, i64, i64, &str) + Send + Sync>;

/// The character's visual state: current surface plus click hit-testing.
pub struct CharacterWindow {
    ghost_id: String,
    shell: ShellDefinition,
    on_click: ClickHandler,
    current_surface: Mutex<String>,
}

impl CharacterWindow {
    pub fn shell(&self) -> &ShellDefinition {
        &self.shell
    }

    pub fn current_surface(&self) -> String {
        self.current_surface
            .lock()
            .expect("character state poisoned")
            .clone()
    }

    /// Switches to a surface the shell defines; unknown ids are rejected
    /// with a warning and the current surface stays.
    pub fn set_surface(&self, surface_id: &str) {
        if !self.shell.surfaces.contains_key(surface_id) {
            tracing::warn!(ghost = %self.ghost_id, surface = surface_id, "unknown surface");
            return;
        }
        *self
            .current_surface
            .lock()
            .expect("character state poisoned") = surface_id.to_string();
        tracing::info!(ghost = %self.ghost_id, surface = surface_id, "surface changed");
    }

    pub fn simulate_click(&self, x: i64, y: i64) {
        self.click(x, y, "left");
    }

    /// Hit-tests the current surface's hitboxes; the first hit invokes the
    /// click callback, a miss only logs.
    pub fn click(&self, x: i64, y: i64, button: &str) {
        let current = self.current_surface();
        let Some(surface) = self.shell.surfaces.get(&current) else {
            tracing::warn!(ghost = %self.ghost_id, surface = %current, "no surface to click");
            return;
        };
        for hitbox in &surface.hitboxes {
            if hitbox.contains(x, y) {
                (self.on_click)(&hitbox.id, x, y, button);
                return;
            }
        }
        tracing::info!(ghost = %self.ghost_id, x, y, "click missed every hitbox");
    }
}

/// The speech balloon; `say` is the output side of the runtime.
pub struct BalloonWindow {
    ghost_id: String,
    style: Option<serde_json::Value>,
}

impl BalloonWindow {
    pub fn say(&self, text: &str) {
        tracing::info!(ghost = %self.ghost_id, "says: {text}");
    }

    pub fn style(&self) -> Option<&serde_json::Value> {
        self.style.as_ref()
    }
}

/// Registry of live windows, one character and one balloon per running
/// ghost.
#[derive(Default)]
pub struct Renderer {
    characters: Mutex<BTreeMap<String, Arc<CharacterWindow>>>,
    balloons: Mutex<BTreeMap<String, Arc<BalloonWindow>>>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer::default()
    }

    pub fn create_character(
        &self,
        ghost_id: &str,
        shell: ShellDefinition,
        on_click: impl Fn(&str, i64, i64, &str) + Send + Sync + 'static,
    ) -> Arc<CharacterWindow> {
        let character = Arc::new(CharacterWindow {
            ghost_id: ghost_id.to_string(),
            current_surface: Mutex::new(shell.default_surface.clone()),
            shell,
            on_click: Box::new(on_click),
        });
        self.characters
            .lock()
            .expect("renderer registry poisoned")
            .insert(ghost_id.to_string(), Arc::clone(&character));
        character
    }

    pub fn create_balloon(
        &self,
        ghost_id: &str,
        style: Option<serde_json::Value>,
    ) -> Arc<BalloonWindow> {
        let balloon = Arc::new(BalloonWindow {
            ghost_id: ghost_id.to_string(),
            style,
        });
        self.balloons
            .lock()
            .expect("renderer registry poisoned")
            .insert(ghost_id.to_string(), Arc::clone(&balloon));
        balloon
    }

    pub fn character(&self, ghost_id: &str) -> Option<Arc<CharacterWindow>> {
        self.characters
            .lock()
            .expect("renderer registry poisoned")
            .get(ghost_id)
            .cloned()
    }

    pub fn close(&self, ghost_id: &str) {
        self.characters
            .lock()
            .expect("renderer registry poisoned")
            .remove(ghost_id);
        self.balloons
            .lock()
            .expect("renderer registry poisoned")
            .remove(ghost_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{Hitbox, Surface};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn shell_with_head() -> ShellDefinition {
        let mut surfaces = BTreeMap::new();
        surfaces.insert(
            "idle".to_string(),
            Surface {
                id: "idle".into(),
                file: None,
                hitboxes: vec![Hitbox {
                    id: "head".into(),
                    x: 0,
                    y: 0,
                    w: 20,
                    h: 20,
                }],
            },
        );
        surfaces.insert(
            "smile".to_string(),
            Surface {
                id: "smile".into(),
                file: None,
                hitboxes: Vec::new(),
            },
        );
        ShellDefinition {
            default_surface: "idle".into(),
            surfaces,
            bubble_offset: None,
        }
    }

    #[test]
    fn starts_on_default_surface_and_rejects_unknown() {
        let renderer = Renderer::new();
        let character = renderer.create_character("g", shell_with_head(), |_, _, _, _| {});
        assert_eq!(character.current_surface(), "idle");
        character.set_surface("smile");
        assert_eq!(character.current_surface(), "smile");
        character.set_surface("missing");
        assert_eq!(character.current_surface(), "smile");
    }

    #[test]
    fn click_hits_and_misses() {
        let renderer = Renderer::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let character = renderer.create_character("g", shell_with_head(), move |hitbox, _, _, _| {
            assert_eq!(hitbox, "head");
            seen.fetch_add(1, Ordering::SeqCst);
        });
        character.simulate_click(10, 10);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        character.simulate_click(100, 100);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn close_drops_windows() {
        let renderer = Renderer::new();
        renderer.create_character("g", shell_with_head(), |_, _, _, _| {});
        assert!(renderer.character("g").is_some());
        renderer.close("g");
        assert!(renderer.character("g").is_none());
    }
}
