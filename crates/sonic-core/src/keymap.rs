//! Key → action tables, built once from the `[keys]` configuration.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::config::KeysConfig;

/// Terminal-independent key; the front-end translates its events into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Resize,
}

impl Key {
    /// Parse a key name as written in the config file.
    pub fn parse(name: &str) -> Option<Key> {
        let key = match name.to_ascii_lowercase().as_str() {
            "space" => Key::Char(' '),
            "enter" | "return" => Key::Enter,
            "esc" | "escape" => Key::Esc,
            "backspace" => Key::Backspace,
            "tab" => Key::Tab,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "resize" => Key::Resize,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // ── Playback ──────────────────────────────────────────────────────────────
    PlayPause,
    Stop,
    Next,
    Previous,
    Repeat,
    Shuffle,

    // ── Playlist ──────────────────────────────────────────────────────────────
    Add,
    AddAndPlay,
    RemoveOne,
    RemoveAll,

    // ── Views & movement ──────────────────────────────────────────────────────
    MainView,
    PlaylistView,
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,
    Resize,

    // ── Input modes ───────────────────────────────────────────────────────────
    Chord,
    Search,
    SearchNext,
    SearchPrevious,

    Quit,
}

impl Action {
    pub fn from_name(name: &str) -> Option<Action> {
        let action = match name {
            "play_pause" => Action::PlayPause,
            "stop" => Action::Stop,
            "next" => Action::Next,
            "previous" => Action::Previous,
            "repeat" => Action::Repeat,
            "shuffle" => Action::Shuffle,
            "add" => Action::Add,
            "add_and_play" => Action::AddAndPlay,
            "remove_one" => Action::RemoveOne,
            "remove_all" => Action::RemoveAll,
            "main_view" => Action::MainView,
            "playlist_view" => Action::PlaylistView,
            "up" => Action::Up,
            "down" => Action::Down,
            "left" => Action::Left,
            "right" => Action::Right,
            "top" => Action::Top,
            "bottom" => Action::Bottom,
            "resize" => Action::Resize,
            "chord" => Action::Chord,
            "search" => Action::Search,
            "search_next" => Action::SearchNext,
            "search_previous" => Action::SearchPrevious,
            "quit" => Action::Quit,
            _ => return None,
        };
        Some(action)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum KeymapError {
    #[error("unknown action {0:?} in [keys]")]
    UnknownAction(String),
    #[error("unknown key {key:?} bound to {action:?}")]
    UnknownKey { action: String, key: String },
    #[error("key {key:?} bound to both {first:?} and {second:?}")]
    Conflict {
        key: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    keys: HashMap<Key, Action>,
    chords: HashMap<Key, Action>,
}

impl Keymap {
    pub fn from_config(config: &KeysConfig) -> Result<Self, KeymapError> {
        Ok(Self {
            keys: build_table(&config.bindings)?,
            chords: build_table(&config.chords)?,
        })
    }

    pub fn resolve(&self, key: Key) -> Option<Action> {
        self.keys.get(&key).copied()
    }

    /// Resolve the key following a chord prefix.
    pub fn resolve_chord(&self, key: Key) -> Option<Action> {
        self.chords.get(&key).copied()
    }
}

fn build_table(bindings: &BTreeMap<String, Vec<String>>) -> Result<HashMap<Key, Action>, KeymapError> {
    let mut table = HashMap::new();
    let mut owners: HashMap<Key, &str> = HashMap::new();
    for (name, keys) in bindings {
        let action =
            Action::from_name(name).ok_or_else(|| KeymapError::UnknownAction(name.clone()))?;
        for key_name in keys {
            let key = Key::parse(key_name).ok_or_else(|| KeymapError::UnknownKey {
                action: name.clone(),
                key: key_name.clone(),
            })?;
            if let Some(first) = owners.insert(key, name) {
                if first != name.as_str() {
                    return Err(KeymapError::Conflict {
                        key: key_name.clone(),
                        first: first.to_string(),
                        second: name.clone(),
                    });
                }
            }
            table.insert(key, action);
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(Key::parse("space"), Some(Key::Char(' ')));
        assert_eq!(Key::parse("Enter"), Some(Key::Enter));
        assert_eq!(Key::parse("G"), Some(Key::Char('G')));
        assert_eq!(Key::parse(">"), Some(Key::Char('>')));
        assert_eq!(Key::parse("ctrl-x"), None);
        assert_eq!(Key::parse(""), None);
    }

    #[test]
    fn test_default_table() {
        let keymap = Keymap::from_config(&KeysConfig::default()).unwrap();
        assert_eq!(keymap.resolve(Key::Char('p')), Some(Action::PlayPause));
        assert_eq!(keymap.resolve(Key::Char(' ')), Some(Action::Add));
        assert_eq!(keymap.resolve(Key::Enter), Some(Action::AddAndPlay));
        assert_eq!(keymap.resolve(Key::Char('j')), Some(Action::Down));
        assert_eq!(keymap.resolve(Key::Down), Some(Action::Down));
        assert_eq!(keymap.resolve(Key::Char('G')), Some(Action::Bottom));
        assert_eq!(keymap.resolve(Key::Char('g')), Some(Action::Chord));
        assert_eq!(keymap.resolve(Key::Char('N')), Some(Action::SearchPrevious));
        assert_eq!(keymap.resolve(Key::Char('z')), None);
        assert_eq!(keymap.resolve_chord(Key::Char('g')), Some(Action::Top));
        assert_eq!(keymap.resolve_chord(Key::Char('p')), None);
    }

    #[test]
    fn test_config_errors() {
        let mut config = KeysConfig::default();
        config
            .bindings
            .insert("dance".to_string(), vec!["z".to_string()]);
        assert_eq!(
            Keymap::from_config(&config).unwrap_err(),
            KeymapError::UnknownAction("dance".to_string())
        );

        let mut config = KeysConfig::default();
        config
            .bindings
            .insert("stop".to_string(), vec!["F13".to_string()]);
        assert!(matches!(
            Keymap::from_config(&config),
            Err(KeymapError::UnknownKey { .. })
        ));

        let mut config = KeysConfig::default();
        config
            .bindings
            .insert("stop".to_string(), vec!["q".to_string()]);
        assert!(matches!(
            Keymap::from_config(&config),
            Err(KeymapError::Conflict { .. })
        ));
    }

    #[test]
    fn test_rebinding() {
        let mut config = KeysConfig::default();
        config
            .bindings
            .insert("play_pause".to_string(), vec!["P".to_string(), "tab".to_string()]);
        let keymap = Keymap::from_config(&config).unwrap();
        assert_eq!(keymap.resolve(Key::Char('P')), Some(Action::PlayPause));
        assert_eq!(keymap.resolve(Key::Tab), Some(Action::PlayPause));
        assert_eq!(keymap.resolve(Key::Char('p')), None);
    }
}
