//! Rebindable key table.
//!
//! Keys are browser-style names (`ArrowLeft`, `z`, `" "`) compared without
//! case. Each rebindable action has at most one key and each key at most one
//! action. The table persists as a JSON array of `{action, key}` objects.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::GameAction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub action: GameAction,
    pub key: String,
}

const DEFAULT_BINDINGS: [(GameAction, &str); 8] = [
    (GameAction::MoveLeft, "ArrowLeft"),
    (GameAction::MoveRight, "ArrowRight"),
    (GameAction::RotateCw, "ArrowUp"),
    (GameAction::RotateCcw, "z"),
    (GameAction::SoftDrop, "ArrowDown"),
    (GameAction::HardDrop, " "),
    (GameAction::Hold, "h"),
    (GameAction::Pause, "p"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Lowercased key name -> action
    bindings: BTreeMap<String, GameAction>,
}

impl KeyBindings {
    /// Later entries win when a key or an action appears twice
    pub fn new(bindings: impl IntoIterator<Item = KeyBinding>) -> Self {
        let mut table = Self {
            bindings: BTreeMap::new(),
        };
        for binding in bindings {
            table.bind(binding.action, &binding.key);
        }
        table
    }

    pub fn action_for(&self, key: &str) -> Option<GameAction> {
        self.bindings.get(&key.to_lowercase()).copied()
    }

    pub fn key_for(&self, action: GameAction) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| **bound == action)
            .map(|(key, _)| key.as_str())
    }

    pub fn bindings(&self) -> Vec<KeyBinding> {
        self.bindings
            .iter()
            .map(|(key, action)| KeyBinding {
                action: *action,
                key: key.clone(),
            })
            .collect()
    }

    /// Bind `key` to `action`, dropping whatever the key did before and
    /// whatever key the action had before
    pub fn rebind(&mut self, action: GameAction, key: &str) {
        debug!(action = action.as_str(), key, "key rebound");
        self.bind(action, key);
    }

    fn bind(&mut self, action: GameAction, key: &str) {
        let key = key.to_lowercase();
        self.bindings.remove(&key);
        self.bindings.retain(|_, bound| *bound != action);
        self.bindings.insert(key, action);
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let bindings: Vec<KeyBinding> =
            serde_json::from_str(json).map_err(|e| anyhow!("invalid key bindings: {}", e))?;
        Ok(Self::new(bindings))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.bindings())
            .map_err(|e| anyhow!("serialize key bindings: {}", e))
    }

    /// Read a saved table; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no saved key bindings, using defaults");
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .map_err(|e| anyhow!("read {}: {}", path.display(), e))?;
        Self::from_json(&json).map_err(|e| anyhow!("{}: {}", path.display(), e))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| anyhow!("write {}: {}", path.display(), e))
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new(DEFAULT_BINDINGS.iter().map(|&(action, key)| KeyBinding {
            action,
            key: key.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.action_for("ArrowLeft"), Some(GameAction::MoveLeft));
        assert_eq!(bindings.action_for(" "), Some(GameAction::HardDrop));
        assert_eq!(bindings.action_for("Z"), Some(GameAction::RotateCcw));
        assert_eq!(bindings.action_for("x"), None);
        assert_eq!(bindings.bindings().len(), 8);
    }

    #[test]
    fn test_rebind_replaces_both_sides() {
        let mut bindings = KeyBindings::default();
        // "z" currently rotates counter-clockwise.
        bindings.rebind(GameAction::HardDrop, "Z");

        assert_eq!(bindings.action_for("z"), Some(GameAction::HardDrop));
        assert_eq!(bindings.action_for(" "), None);
        assert_eq!(bindings.key_for(GameAction::RotateCcw), None);
        assert_eq!(bindings.key_for(GameAction::HardDrop), Some("z"));
    }

    #[test]
    fn test_json_shape() {
        let json = KeyBindings::default().to_json().unwrap();
        assert!(json.contains("\"action\": \"moveLeft\""));
        assert!(json.contains("\"key\": \"arrowleft\""));
        assert_eq!(KeyBindings::from_json(&json).unwrap(), KeyBindings::default());
    }

    #[test]
    fn test_loaded_action_keeps_one_key() {
        let json = r#"[
            {"action": "hold", "key": "h"},
            {"action": "hold", "key": "c"},
            {"action": "pause", "key": "C"}
        ]"#;
        let bindings = KeyBindings::from_json(json).unwrap();

        assert_eq!(bindings.bindings().len(), 1);
        assert_eq!(bindings.action_for("h"), None);
        assert_eq!(bindings.action_for("c"), Some(GameAction::Pause));
        assert_eq!(bindings.key_for(GameAction::Hold), None);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(KeyBindings::from_json("{not json").is_err());
        assert!(KeyBindings::from_json(r#"[{"action":"fly","key":"f"}]"#).is_err());
    }
}
