use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::platform;
use super::protocol::DEFAULT_API_VERSION;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub state_dump: StateDumpConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keys: KeysConfig,
}

/// Subsonic server connection and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_port")]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_client")]
    pub client: String,
}

/// External audio player invoked for every track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_executable")]
    pub executable: String,
    #[serde(default = "default_flags")]
    pub flags: String,
}

/// Command run on every track start as `<command> "Now playing" "<summary>"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// File rewritten with the playback state on every transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDumpConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event loop tick; elapsed time and auto-advance are sampled this often.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Rows reserved below the panels for progress and status.
    #[serde(default = "default_bottom_space")]
    pub bottom_space: u16,
}

/// Key bindings: action name to the keys that trigger it.
///
/// Key names are single characters or one of `space`, `enter`, `esc`,
/// `backspace`, `tab`, `up`, `down`, `left`, `right`, `resize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default = "default_bindings")]
    pub bindings: BTreeMap<String, Vec<String>>,
    /// Second stroke after the `chord` key.
    #[serde(default = "default_chords")]
    pub chords: BTreeMap<String, Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            port: default_port(),
            user: String::new(),
            password: String::new(),
            version: default_version(),
            client: default_client(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            flags: default_flags(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            bottom_space: default_bottom_space(),
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            bindings: default_bindings(),
            chords: default_chords(),
        }
    }
}

fn default_url() -> String {
    "http://localhost".to_string()
}

fn default_port() -> Option<u16> {
    Some(4533)
}

fn default_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_client() -> String {
    "sksonic".to_string()
}

fn default_executable() -> String {
    "ffplay".to_string()
}

fn default_flags() -> String {
    "-nodisp -autoexit".to_string()
}

fn default_tick_ms() -> u64 {
    500
}

fn default_bottom_space() -> u16 {
    4
}

fn default_bindings() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("play_pause", &["p"]),
        ("stop", &["s"]),
        ("next", &[">"]),
        ("previous", &["<"]),
        ("repeat", &["r"]),
        ("shuffle", &["x"]),
        ("quit", &["q"]),
        ("add", &["space"]),
        ("add_and_play", &["enter"]),
        ("remove_one", &["d"]),
        ("remove_all", &["c"]),
        ("main_view", &["1"]),
        ("playlist_view", &["2"]),
        ("up", &["up", "k"]),
        ("down", &["down", "j"]),
        ("left", &["left", "h"]),
        ("right", &["right", "l"]),
        ("resize", &["resize"]),
        ("bottom", &["G"]),
        ("chord", &["g"]),
        ("search", &["/"]),
        ("search_next", &["n"]),
        ("search_previous", &["N"]),
    ];
    to_table(table)
}

fn default_chords() -> BTreeMap<String, Vec<String>> {
    to_table(&[("top", &["g"])])
}

fn to_table(table: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    table
        .iter()
        .map(|(action, keys)| {
            (
                action.to_string(),
                keys.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read `path`, writing the defaults there first when it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("wrote default config to {}", path.display());
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, Some(4533));
        assert_eq!(config.server.client, "sksonic");
        assert_eq!(config.player.executable, "ffplay");
        assert_eq!(config.player.flags, "-nodisp -autoexit");
        assert!(config.notify.command.is_none());
        assert!(config.state_dump.path.is_none());
        assert_eq!(config.ui.tick_ms, 500);
        assert_eq!(config.keys.bindings["add_and_play"], vec!["enter"]);
        assert_eq!(config.keys.chords["top"], vec!["g"]);
        assert!(Config::config_path().ends_with("sksonic/config.toml"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            url = "https://music.example.org"
            user = "ana"
            password = "secret"

            [notify]
            command = "notify-send"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.url, "https://music.example.org");
        assert_eq!(config.server.port, Some(4533));
        assert_eq!(config.server.version, DEFAULT_API_VERSION);
        assert_eq!(config.notify.command.as_deref(), Some("notify-send"));
        assert_eq!(config.keys.bindings["quit"], vec!["q"]);
    }

    #[test]
    fn test_load_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert!(path.exists());
        let second = Config::load_from(&path).unwrap();
        assert_eq!(first.server.url, second.server.url);
        assert_eq!(first.keys.bindings, second.keys.bindings);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nurl = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
