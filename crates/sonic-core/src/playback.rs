//! Playback of queued songs through an external player process.
//!
//! The player has no control channel: it is started with the stream URL on
//! its command line and then driven with signals (stop/continue/terminate).
//! Each launch gets a generation number; the reaper task reports the exit
//! together with that number so exits of replaced or stopped players can be
//! told apart from the one currently playing.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{CatalogError, Connection};
use crate::config::PlayerConfig;
use crate::playlist::Playlist;
use crate::protocol::PlaybackStatus;

/// Sent by the reaper task once a launched player process has exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerExit {
    pub generation: u64,
    pub success: bool,
    pub description: String,
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{signal} to pid {pid} failed: {reason}")]
    Signal {
        signal: &'static str,
        pid: i32,
        reason: String,
    },
    #[error("no player process is tracked")]
    NotTracking,
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no playlist entry at index {index} (length {len})")]
    InvalidIndex { index: usize, len: usize },
    #[error(transparent)]
    Url(#[from] CatalogError),
    #[error("could not start player: {0}")]
    Launch(#[source] PlayerError),
}

/// Control surface of the external player.
pub trait PlayerProcess {
    /// Start playing `url`; the exit is later reported with `generation`.
    fn launch(&mut self, url: &str, generation: u64) -> Result<(), PlayerError>;
    fn suspend(&mut self) -> Result<(), PlayerError>;
    fn resume(&mut self) -> Result<(), PlayerError>;
    fn terminate(&mut self) -> Result<(), PlayerError>;
    fn is_tracking(&self) -> bool;
    /// Drop the tracked process without signalling it.
    fn forget(&mut self);
}

// ── SignalPlayer ──────────────────────────────────────────────────────────────

/// Runs `<executable> <flags> "<url>"` through `sh -c` and controls it with
/// SIGSTOP / SIGCONT / SIGTERM.
#[cfg(unix)]
pub struct SignalPlayer {
    executable: String,
    flags: String,
    pid: Option<i32>,
    suspended: bool,
    exits: mpsc::UnboundedSender<PlayerExit>,
}

#[cfg(unix)]
impl SignalPlayer {
    pub fn new(config: &PlayerConfig, exits: mpsc::UnboundedSender<PlayerExit>) -> Self {
        Self {
            executable: config.executable.clone(),
            flags: config.flags.clone(),
            pid: None,
            suspended: false,
            exits,
        }
    }

    pub fn command_line(&self, url: &str) -> String {
        let mut cmd = format!("exec {}", self.executable);
        if !self.flags.is_empty() {
            cmd.push(' ');
            cmd.push_str(&self.flags);
        }
        cmd.push_str(&format!(" \"{}\" > /dev/null 2>&1", url));
        cmd
    }

    pub fn pid(&self) -> Option<i32> {
        self.pid
    }

    fn signal(&self, signal: nix::sys::signal::Signal) -> Result<(), PlayerError> {
        let pid = self.pid.ok_or(PlayerError::NotTracking)?;
        nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), signal).map_err(|e| {
            PlayerError::Signal {
                signal: signal.as_str(),
                pid,
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(unix)]
impl PlayerProcess for SignalPlayer {
    fn launch(&mut self, url: &str, generation: u64) -> Result<(), PlayerError> {
        use std::process::Stdio;

        let command = self.command_line(url);
        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlayerError::Spawn {
                command: command.clone(),
                source,
            })?;

        let child_pid = child.id().map(|p| p as i32);
        let executable = self.executable.clone();
        let tx = self.exits.clone();
        tokio::spawn(async move {
            let exit = match child.wait().await {
                Ok(status) => PlayerExit {
                    generation,
                    success: status.success(),
                    description: format!("{} exited ({})", executable, status),
                },
                Err(e) => PlayerExit {
                    generation,
                    success: false,
                    description: format!("waiting for {} failed: {}", executable, e),
                },
            };
            let _ = tx.send(exit);
        });

        // The shell execs the player, so the child's pid is the player's.
        // Other processes with the same name are never adopted.
        let pid = child_pid;
        match pid {
            Some(own) if !crate::platform::find_pids(&self.executable).contains(&own) => {
                debug!("player: {} (pid {}) already gone from the process table", self.executable, own);
            }
            Some(_) => {}
            None => warn!("player: no pid for {}", self.executable),
        }
        debug!("player: generation {} pid {:?}", generation, pid);
        self.pid = pid;
        self.suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), PlayerError> {
        self.signal(nix::sys::signal::Signal::SIGSTOP)?;
        self.suspended = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), PlayerError> {
        self.signal(nix::sys::signal::Signal::SIGCONT)?;
        self.suspended = false;
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), PlayerError> {
        self.signal(nix::sys::signal::Signal::SIGTERM)?;
        if self.suspended {
            // A stopped process only acts on SIGTERM once continued.
            self.signal(nix::sys::signal::Signal::SIGCONT)?;
            self.suspended = false;
        }
        Ok(())
    }

    fn is_tracking(&self) -> bool {
        self.pid.is_some()
    }

    fn forget(&mut self) {
        self.pid = None;
        self.suspended = false;
    }
}

// ── PlaybackController ────────────────────────────────────────────────────────

pub struct PlaybackController<P> {
    player: P,
    connection: Connection,
    status: PlaybackStatus,
    elapsed: Duration,
    last_sample: Option<Instant>,
    generation: u64,
}

impl<P: PlayerProcess> PlaybackController<P> {
    pub fn new(player: P, connection: Connection) -> Self {
        Self {
            player,
            connection,
            status: PlaybackStatus::Stopped,
            elapsed: Duration::ZERO,
            last_sample: None,
            generation: 0,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn play_elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Start playing `playlist[index]`, replacing whatever is running.
    ///
    /// The controller only becomes `Playing` once the process was started; a
    /// failed launch leaves it `Stopped`.
    pub fn play(&mut self, playlist: &mut Playlist, index: usize, now: Instant) -> Result<(), PlaybackError> {
        let track = playlist.get(index).ok_or(PlaybackError::InvalidIndex {
            index,
            len: playlist.len(),
        })?;
        let song_id = track.song_id.clone();
        let url = self.connection.stream_url(&song_id)?;

        self.release_player();
        self.generation += 1;
        self.elapsed = Duration::ZERO;

        match self.player.launch(url.as_str(), self.generation) {
            Ok(()) => {
                playlist.set_current_playing(index);
                self.last_sample = Some(now);
                self.status = PlaybackStatus::Playing;
                info!("playback: playing entry {} ({})", index, song_id);
                Ok(())
            }
            Err(e) => {
                self.last_sample = None;
                self.status = PlaybackStatus::Stopped;
                Err(PlaybackError::Launch(e))
            }
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        self.sample(now);
        if let Err(e) = self.player.suspend() {
            warn!("playback: suspend failed: {}", e);
        }
        self.last_sample = None;
        self.status = PlaybackStatus::Paused;
    }

    pub fn resume(&mut self, now: Instant) {
        if self.status != PlaybackStatus::Paused {
            return;
        }
        if let Err(e) = self.player.resume() {
            warn!("playback: resume failed: {}", e);
        }
        self.last_sample = Some(now);
        self.status = PlaybackStatus::Playing;
    }

    /// Playing ↔ Paused; nothing happens while stopped.
    pub fn toggle_pause(&mut self, now: Instant) {
        match self.status {
            PlaybackStatus::Playing => self.pause(now),
            PlaybackStatus::Paused => self.resume(now),
            PlaybackStatus::Stopped => {}
        }
    }

    pub fn stop(&mut self) {
        if self.status == PlaybackStatus::Stopped && !self.player.is_tracking() {
            return;
        }
        self.release_player();
        self.generation += 1;
        self.status = PlaybackStatus::Stopped;
        self.elapsed = Duration::ZERO;
        self.last_sample = None;
        info!("playback: stopped");
    }

    /// Accumulate time played since the last sample.
    pub fn sample(&mut self, now: Instant) -> Duration {
        if self.status == PlaybackStatus::Playing {
            if let Some(last) = self.last_sample {
                self.elapsed += now.saturating_duration_since(last);
            }
            self.last_sample = Some(now);
        }
        self.elapsed
    }

    /// Handle a reaper report. Returns a message worth showing the user when
    /// the current player died on its own.
    pub fn on_player_exit(&mut self, exit: PlayerExit) -> Option<String> {
        if exit.generation != self.generation {
            debug!(
                "playback: ignoring exit of generation {} (current {})",
                exit.generation, self.generation
            );
            return None;
        }
        self.player.forget();
        if exit.success || self.status == PlaybackStatus::Stopped {
            return None;
        }
        warn!("playback: {}", exit.description);
        self.status = PlaybackStatus::Stopped;
        self.last_sample = None;
        Some(format!("Playback stopped: {}", exit.description))
    }

    fn release_player(&mut self) {
        if self.player.is_tracking() {
            if let Err(e) = self.player.terminate() {
                warn!("playback: terminate failed: {}", e);
            }
            self.player.forget();
        }
    }
}
