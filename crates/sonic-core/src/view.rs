use crate::protocol::{Panel, View};

/// What the renderer shows: active view, active panel and the three panel
/// cursors.
///
/// Cursors are stored unconditionally; `selected` maps them to `None` when
/// the panel is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub current_view: View,
    pub current_panel: Panel,
    artist_idx: usize,
    album_idx: usize,
    song_idx: usize,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self, panel: Panel) -> usize {
        match panel {
            Panel::Artists => self.artist_idx,
            Panel::Albums => self.album_idx,
            Panel::Songs => self.song_idx,
        }
    }

    /// Cursor for a panel showing `count` items.
    pub fn selected(&self, panel: Panel, count: usize) -> Option<usize> {
        (count > 0).then(|| self.cursor(panel).min(count - 1))
    }

    /// Move a panel cursor. When it actually changes, the panels to its
    /// right go back to their first item. Returns whether it changed.
    pub fn set_cursor(&mut self, panel: Panel, index: usize) -> bool {
        if self.cursor(panel) == index {
            return false;
        }
        match panel {
            Panel::Artists => {
                self.artist_idx = index;
                self.album_idx = 0;
                self.song_idx = 0;
            }
            Panel::Albums => {
                self.album_idx = index;
                self.song_idx = 0;
            }
            Panel::Songs => self.song_idx = index,
        }
        true
    }

    /// Pull every cursor back into range for the given item counts
    /// (artists, albums, songs).
    pub fn clamp(&mut self, counts: [usize; 3]) {
        let [artists, albums, songs] = counts;
        self.artist_idx = self.artist_idx.min(artists.saturating_sub(1));
        self.album_idx = self.album_idx.min(albums.saturating_sub(1));
        self.song_idx = self.song_idx.min(songs.saturating_sub(1));
    }

    pub fn focus_left(&mut self) {
        self.current_panel = self.current_panel.left();
    }

    pub fn focus_right(&mut self) {
        self.current_panel = self.current_panel.right();
    }
}
