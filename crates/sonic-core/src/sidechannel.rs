//! Optional outputs for other programs: a notification command run on every
//! track start and a JSON file describing what is playing.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::protocol::PlaybackStatus;

/// Contents of the state-dump file while something is playing or paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub status: PlaybackStatus,
    pub artist: String,
    pub album: String,
    pub song: String,
    /// Song length in seconds.
    pub length: u32,
    /// Seconds played so far.
    pub playtime: u64,
    /// Unix time of the transition.
    pub time: i64,
}

impl NowPlaying {
    pub fn summary(&self) -> String {
        format!("{} - {} - {}", self.artist, self.album, self.song)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Notifier {
    command: Option<String>,
}

impl Notifier {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.command.is_some()
    }

    /// Run `<command> "Now playing" "<summary>"` in the background.
    pub fn notify(&self, summary: &str) {
        let Some(command) = &self.command else {
            return;
        };
        let spawned = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(format!("{} \"$@\"", command))
            .arg("sh")
            .arg("Now playing")
            .arg(summary)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            Err(e) => warn!("notify: failed to run {:?}: {}", command, e),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StateDump {
    path: Option<PathBuf>,
}

impl StateDump {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Overwrite the dump file; `None` writes an empty line.
    pub fn write(&self, state: Option<&NowPlaying>) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut content = match state {
            Some(state) => serde_json::to_string(state)?,
            None => String::new(),
        };
        content.push('\n');
        std::fs::write(path, content)?;
        debug!("state dump written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> NowPlaying {
        NowPlaying {
            status: PlaybackStatus::Playing,
            artist: "Broadcast".to_string(),
            album: "Tender Buttons".to_string(),
            song: "Black Cat".to_string(),
            length: 213,
            playtime: 12,
            time: 1_760_000_000,
        }
    }

    #[test]
    fn test_dump_written_and_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("now-playing.json");
        let dump = StateDump::new(Some(path.clone()));

        dump.write(Some(&playing())).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["status"], "playing");
        assert_eq!(value["artist"], "Broadcast");
        assert_eq!(value["length"], 213);
        assert_eq!(value["playtime"], 12);
        assert_eq!(value["time"], 1_760_000_000i64);

        dump.write(None).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\n");
    }

    #[test]
    fn test_disabled_channels_do_nothing() {
        StateDump::default().write(Some(&playing())).unwrap();
        assert!(!Notifier::new(Some("  ".to_string())).is_enabled());
        Notifier::default().notify("x");
    }

    #[test]
    fn test_summary() {
        assert_eq!(playing().summary(), "Broadcast - Tender Buttons - Black Cat");
    }

    #[tokio::test]
    async fn test_notify_passes_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("notified");
        let notifier = Notifier::new(Some(format!(
            "printf '%s|%s' > '{}'",
            out.display()
        )));
        notifier.notify("A - B - \"C\"");
        for _ in 0..50 {
            if out.exists() && !std::fs::read_to_string(&out).unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "Now playing|A - B - \"C\""
        );
    }
}
