//! Turns keys into state changes: panel navigation, playlist editing,
//! playback control and incremental search.
//!
//! Every catalog fetch a key needs is awaited before `handle_key` returns, so
//! whatever is drawn next matches the selection the key produced.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::api::{CatalogError, CatalogService};
use crate::catalog::{Album, Artist, CatalogCache, Song};
use crate::keymap::{Action, Key, Keymap};
use crate::playback::{PlaybackController, PlaybackError, PlayerExit, PlayerProcess};
use crate::playlist::{Playlist, TrackRef};
use crate::protocol::{Panel, PlaybackStatus, ShuffleRepeat, View};
use crate::search::{SearchDirection, SearchEngine};
use crate::sidechannel::{Notifier, NowPlaying, StateDump};
use crate::view::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Idle,
    /// The chord prefix was pressed; the next key goes through the chord table.
    AwaitingChord,
    /// Keys edit the search query.
    Searching,
    /// Query committed with Enter; one more action is accepted.
    SearchConfirmed,
}

/// Message for the status area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

/// Selection to restore when a search is cancelled.
#[derive(Debug, Clone)]
enum SearchOrigin {
    Catalog(ViewState),
    Playlist(Option<usize>),
}

pub struct Dispatcher<S, P> {
    cache: CatalogCache<S>,
    playlist: Playlist,
    playback: PlaybackController<P>,
    view: ViewState,
    keymap: Keymap,
    search: SearchEngine,
    mode: InputMode,
    search_origin: Option<SearchOrigin>,
    notifier: Notifier,
    dump: StateDump,
    rng: StdRng,
    notices: Vec<Notice>,
}

impl<S: CatalogService, P: PlayerProcess> Dispatcher<S, P> {
    pub fn new(cache: CatalogCache<S>, playback: PlaybackController<P>, keymap: Keymap) -> Self {
        Self {
            cache,
            playlist: Playlist::new(),
            playback,
            view: ViewState::new(),
            keymap,
            search: SearchEngine::new(),
            mode: InputMode::Idle,
            search_origin: None,
            notifier: Notifier::default(),
            dump: StateDump::default(),
            rng: StdRng::from_entropy(),
            notices: Vec::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_state_dump(mut self, dump: StateDump) -> Self {
        self.dump = dump;
        self
    }

    // ── Read accessors ────────────────────────────────────────────────────────

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn playback(&self) -> &PlaybackController<P> {
        &self.playback
    }

    pub fn cache(&self) -> &CatalogCache<S> {
        &self.cache
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// The query while a search is being typed or was just confirmed.
    pub fn search_query(&self) -> Option<&str> {
        match self.mode {
            InputMode::Searching | InputMode::SearchConfirmed => Some(self.search.query()),
            _ => None,
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn panel_names(&self, panel: Panel) -> Vec<&str> {
        match panel {
            Panel::Artists => self.cache.artists().iter().map(|a| a.name.as_str()).collect(),
            Panel::Albums => self
                .selected_artist()
                .map(|a| a.albums.iter().map(|b| b.name.as_str()).collect())
                .unwrap_or_default(),
            Panel::Songs => self
                .selected_album()
                .map(|b| b.songs.iter().map(|s| s.name.as_str()).collect())
                .unwrap_or_default(),
        }
    }

    pub fn panel_len(&self, panel: Panel) -> usize {
        match panel {
            Panel::Artists => self.cache.artists().len(),
            Panel::Albums => self.selected_artist().map_or(0, |a| a.albums.len()),
            Panel::Songs => self.selected_album().map_or(0, |b| b.songs.len()),
        }
    }

    pub fn panel_selected(&self, panel: Panel) -> Option<usize> {
        self.view.selected(panel, self.panel_len(panel))
    }

    pub fn selected_artist(&self) -> Option<&Artist> {
        self.cache.artist(self.panel_selected(Panel::Artists)?)
    }

    pub fn selected_album(&self) -> Option<&Album> {
        let ai = self.panel_selected(Panel::Artists)?;
        let artist = self.cache.artist(ai)?;
        let bi = self
            .view
            .selected(Panel::Albums, artist.albums.len())?;
        artist.albums.get(bi)
    }

    pub fn resolve(&self, track: &TrackRef) -> Option<(&Artist, &Album, &Song)> {
        self.cache.resolve(track)
    }

    /// The playing or paused song.
    pub fn now_playing(&self) -> Option<(&Artist, &Album, &Song)> {
        if self.playback.status() == PlaybackStatus::Stopped {
            return None;
        }
        self.resolve(self.playlist.get(self.playlist.current_playing())?)
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub async fn handle_key(&mut self, key: Key, now: Instant) -> Result<Flow, CatalogError> {
        match self.mode {
            InputMode::Idle => match self.keymap.resolve(key) {
                Some(action) => self.dispatch(action, now).await,
                None => Ok(Flow::Continue),
            },
            InputMode::AwaitingChord => {
                self.mode = InputMode::Idle;
                match self.keymap.resolve_chord(key) {
                    Some(action) => self.dispatch(action, now).await,
                    None => {
                        debug!("dispatch: unmapped chord key {:?}", key);
                        Ok(Flow::Continue)
                    }
                }
            }
            InputMode::Searching => {
                match key {
                    Key::Esc => self.cancel_search().await?,
                    Key::Enter => self.mode = InputMode::SearchConfirmed,
                    Key::Backspace => {
                        self.search.pop();
                        self.run_search(SearchDirection::Fresh).await?;
                    }
                    Key::Char(c) => {
                        self.search.push(c);
                        self.run_search(SearchDirection::Fresh).await?;
                    }
                    _ => {}
                }
                Ok(Flow::Continue)
            }
            InputMode::SearchConfirmed => match self.keymap.resolve(key) {
                Some(Action::SearchNext) => {
                    self.run_search(SearchDirection::Next).await?;
                    Ok(Flow::Continue)
                }
                Some(Action::SearchPrevious) => {
                    self.run_search(SearchDirection::Previous).await?;
                    Ok(Flow::Continue)
                }
                Some(action) => {
                    self.mode = InputMode::Idle;
                    self.search_origin = None;
                    self.dispatch(action, now).await
                }
                None => Ok(Flow::Continue),
            },
        }
    }

    pub async fn dispatch(&mut self, action: Action, now: Instant) -> Result<Flow, CatalogError> {
        debug!("dispatch: {:?}", action);
        match action {
            Action::PlayPause => {
                self.playback.toggle_pause(now);
                self.write_dump();
            }
            Action::Stop => {
                self.playback.stop();
                self.write_dump();
            }
            Action::Next => {
                let next = self.playlist.current_playing() + 1;
                if next < self.playlist.len() {
                    self.play(next, now);
                }
            }
            Action::Previous => {
                if let Some(prev) = self.playlist.current_playing().checked_sub(1) {
                    if prev < self.playlist.len() {
                        self.play(prev, now);
                    }
                }
            }
            Action::Repeat => {
                self.playlist.toggle_repeat();
                self.announce_mode();
            }
            Action::Shuffle => {
                self.playlist.toggle_shuffle();
                self.announce_mode();
            }
            // Queues the catalog selection from either view.
            Action::Add => {
                self.add_to_playlist().await?;
            }
            Action::AddAndPlay => match self.view.current_view {
                View::Info => {
                    let first = self.add_to_playlist().await?;
                    if first < self.playlist.len() {
                        self.play(first, now);
                    }
                }
                View::Playlist => {
                    if let Some(sel) = self.playlist.selected() {
                        self.play(sel, now);
                    }
                }
            },
            Action::RemoveOne => {
                if self.view.current_view == View::Playlist {
                    self.remove_selected();
                }
            }
            Action::RemoveAll => {
                if self.view.current_view == View::Playlist {
                    self.remove_all();
                }
            }
            Action::MainView => self.view.current_view = View::Info,
            Action::PlaylistView => self.view.current_view = View::Playlist,
            Action::Up
            | Action::Down
            | Action::Left
            | Action::Right
            | Action::Top
            | Action::Bottom => self.apply_movement(action).await?,
            Action::Resize => {}
            Action::Chord => self.mode = InputMode::AwaitingChord,
            Action::Search => self.begin_search(),
            Action::SearchNext => self.run_search(SearchDirection::Next).await?,
            Action::SearchPrevious => self.run_search(SearchDirection::Previous).await?,
            Action::Quit => {
                if self.playback.status() != PlaybackStatus::Stopped {
                    self.playback.stop();
                    self.write_dump();
                }
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    // ── Playback timing ───────────────────────────────────────────────────────

    /// Called once per loop iteration: accumulate elapsed time and move on
    /// when the current song has run its length.
    pub fn tick(&mut self, now: Instant) {
        if self.playback.status() != PlaybackStatus::Playing {
            return;
        }
        let elapsed = self.playback.sample(now);
        let Some(length) = self.current_length() else {
            return;
        };
        // Unknown lengths finish when the player exits instead.
        if length > 0 && elapsed >= Duration::from_secs(length as u64) {
            self.advance(now);
        }
    }

    pub fn player_exited(&mut self, exit: PlayerExit, now: Instant) {
        let finished_unknown_length = exit.success
            && exit.generation == self.playback.generation()
            && self.playback.status() == PlaybackStatus::Playing
            && self.current_length() == Some(0);
        if let Some(message) = self.playback.on_player_exit(exit) {
            self.notices.push(Notice::Warning(message));
            self.write_dump();
        }
        if finished_unknown_length {
            self.advance(now);
        }
    }

    fn current_length(&self) -> Option<u32> {
        let track = self.playlist.get(self.playlist.current_playing())?;
        self.cache.resolve(track).map(|(_, _, song)| song.duration_secs)
    }

    fn advance(&mut self, now: Instant) {
        match self.playlist.advance(&mut self.rng) {
            Some(index) => self.play(index, now),
            None => {
                self.playback.stop();
                self.write_dump();
            }
        }
    }

    fn play(&mut self, index: usize, now: Instant) {
        match self.playback.play(&mut self.playlist, index, now) {
            Ok(()) => {
                if let Some(state) = self.snapshot() {
                    self.notifier.notify(&state.summary());
                }
                self.write_dump();
            }
            Err(PlaybackError::InvalidIndex { index, len }) => {
                debug!("dispatch: ignoring play of {} (length {})", index, len);
            }
            Err(e) => {
                warn!("dispatch: {}", e);
                self.notices.push(Notice::Error(e.to_string()));
                self.write_dump();
            }
        }
    }

    fn announce_mode(&mut self) {
        let text = match self.playlist.mode() {
            ShuffleRepeat::None => "Shuffle and repeat off",
            ShuffleRepeat::Shuffle => "Shuffle on",
            ShuffleRepeat::Repeat => "Repeat on",
        };
        self.notices.push(Notice::Info(text.to_string()));
    }

    fn snapshot(&self) -> Option<NowPlaying> {
        let (artist, album, song) = self.now_playing()?;
        Some(NowPlaying {
            status: self.playback.status(),
            artist: artist.name.clone(),
            album: album.name.clone(),
            song: song.name.clone(),
            length: song.duration_secs,
            playtime: self.playback.play_elapsed_secs(),
            time: chrono::Utc::now().timestamp(),
        })
    }

    fn write_dump(&self) {
        if let Err(e) = self.dump.write(self.snapshot().as_ref()) {
            warn!("state dump: {}", e);
        }
    }

    // ── Playlist editing ──────────────────────────────────────────────────────

    /// Queue whatever the active panel points at. Returns the index of the
    /// first queued entry.
    async fn add_to_playlist(&mut self) -> Result<usize, CatalogError> {
        let first = self.playlist.len();
        let Some(ai) = self.panel_selected(Panel::Artists) else {
            return Ok(first);
        };
        let artist_id = self.cache.artists()[ai].id.clone();

        let album_ids: Vec<String> = match self.view.current_panel {
            Panel::Artists => {
                self.cache.ensure_albums(&artist_id).await?;
                self.cache
                    .artist(ai)
                    .map(|a| a.albums.iter().map(|b| b.id.clone()).collect())
                    .unwrap_or_default()
            }
            Panel::Albums | Panel::Songs => self
                .selected_album()
                .map(|b| vec![b.id.clone()])
                .unwrap_or_default(),
        };

        for album_id in album_ids {
            self.cache.ensure_songs(&artist_id, &album_id).await?;
            let Some(bi) = self.cache.find_album(ai, &album_id) else {
                continue;
            };
            let Some(album) = self.cache.album(ai, bi) else {
                continue;
            };
            let songs: Vec<&Song> = match self.view.current_panel {
                Panel::Songs => self
                    .view
                    .selected(Panel::Songs, album.songs.len())
                    .and_then(|si| album.songs.get(si))
                    .into_iter()
                    .collect(),
                _ => album.songs.iter().collect(),
            };
            for song in songs {
                self.playlist
                    .add(TrackRef::new(&artist_id, &album_id, &song.id));
            }
        }
        debug!("dispatch: queued {} entries", self.playlist.len() - first);
        Ok(first)
    }

    fn remove_selected(&mut self) {
        let Some(sel) = self.playlist.selected() else {
            return;
        };
        if sel == self.playlist.current_playing()
            && self.playback.status() != PlaybackStatus::Stopped
        {
            self.playback.stop();
            self.write_dump();
        }
        self.playlist.remove_selected();
    }

    fn remove_all(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        if self.playback.status() != PlaybackStatus::Stopped {
            self.playback.stop();
            self.write_dump();
        }
        self.playlist.remove_all();
    }

    // ── Navigation ────────────────────────────────────────────────────────────

    async fn apply_movement(&mut self, action: Action) -> Result<(), CatalogError> {
        if self.view.current_view == View::Playlist {
            match action {
                Action::Up => self.playlist.select_up(),
                Action::Down => self.playlist.select_down(),
                Action::Top => self.playlist.select_first(),
                Action::Bottom => self.playlist.select_last(),
                _ => {}
            }
            return Ok(());
        }

        match action {
            Action::Left => self.view.focus_left(),
            Action::Right => self.view.focus_right(),
            _ => {
                let panel = self.view.current_panel;
                let count = self.panel_len(panel);
                if let Some(cur) = self.view.selected(panel, count) {
                    let target = match action {
                        Action::Up => cur.saturating_sub(1),
                        Action::Down => (cur + 1).min(count - 1),
                        Action::Top => 0,
                        Action::Bottom => count - 1,
                        _ => cur,
                    };
                    self.view.set_cursor(panel, target);
                }
            }
        }
        self.ensure_selection().await
    }

    /// Load the albums of the selected artist and the songs of the selected
    /// album, then pull the cursors back into range.
    pub async fn ensure_selection(&mut self) -> Result<(), CatalogError> {
        if let Some(ai) = self.panel_selected(Panel::Artists) {
            let artist_id = self.cache.artists()[ai].id.clone();
            self.cache.ensure_albums(&artist_id).await?;
            if let Some(album_id) = self.selected_album().map(|b| b.id.clone()) {
                self.cache.ensure_songs(&artist_id, &album_id).await?;
            }
        }
        let counts = Panel::ALL.map(|panel| self.panel_len(panel));
        self.view.clamp(counts);
        Ok(())
    }

    // ── Search ────────────────────────────────────────────────────────────────

    fn begin_search(&mut self) {
        self.search_origin = Some(match self.view.current_view {
            View::Info => SearchOrigin::Catalog(self.view.clone()),
            View::Playlist => SearchOrigin::Playlist(self.playlist.selected()),
        });
        self.search.clear();
        self.mode = InputMode::Searching;
    }

    async fn cancel_search(&mut self) -> Result<(), CatalogError> {
        self.mode = InputMode::Idle;
        self.search.clear();
        match self.search_origin.take() {
            Some(SearchOrigin::Catalog(view)) => {
                self.view = view;
                self.ensure_selection().await?;
            }
            Some(SearchOrigin::Playlist(Some(sel))) => self.playlist.select(sel),
            Some(SearchOrigin::Playlist(None)) | None => {}
        }
        Ok(())
    }

    fn visible_names(&self) -> Vec<String> {
        match self.view.current_view {
            View::Playlist => self
                .playlist
                .entries()
                .iter()
                .map(|track| match self.cache.resolve(track) {
                    Some((_, _, song)) => song.name.clone(),
                    None => track.song_id.clone(),
                })
                .collect(),
            View::Info => self
                .panel_names(self.view.current_panel)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    async fn run_search(&mut self, direction: SearchDirection) -> Result<(), CatalogError> {
        let names = self.visible_names();
        let Some(hit) = self.search.search(&names, direction) else {
            return Ok(());
        };
        match self.view.current_view {
            View::Playlist => self.playlist.select(hit),
            View::Info => {
                let panel = self.view.current_panel;
                self.view.set_cursor(panel, hit);
                self.ensure_selection().await?;
            }
        }
        Ok(())
    }
}
