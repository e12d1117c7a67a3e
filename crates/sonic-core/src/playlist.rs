//! Playback queue with selection and shuffle/repeat handling.

use rand::Rng;

use crate::protocol::ShuffleRepeat;

/// Smallest capacity the queue ever reports.
pub const MIN_CAPACITY: usize = 10;

/// Stable identity of a queued song; display data is looked up in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackRef {
    pub artist_id: String,
    pub album_id: String,
    pub song_id: String,
}

impl TrackRef {
    pub fn new(artist_id: impl Into<String>, album_id: impl Into<String>, song_id: impl Into<String>) -> Self {
        Self {
            artist_id: artist_id.into(),
            album_id: album_id.into(),
            song_id: song_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Playlist {
    entries: Vec<TrackRef>,
    capacity: usize,
    current_playing: usize,
    selected: Option<usize>,
    mode: ShuffleRepeat,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MIN_CAPACITY),
            capacity: MIN_CAPACITY,
            current_playing: 0,
            selected: None,
            mode: ShuffleRepeat::None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[TrackRef] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TrackRef> {
        self.entries.get(index)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn current_playing(&self) -> usize {
        self.current_playing
    }

    pub fn set_current_playing(&mut self, index: usize) {
        self.current_playing = index;
    }

    pub fn mode(&self) -> ShuffleRepeat {
        self.mode
    }

    pub fn add(&mut self, track: TrackRef) {
        if self.entries.len() == self.capacity {
            self.capacity *= 2;
            self.entries
                .reserve_exact(self.capacity - self.entries.len());
        }
        self.entries.push(track);
        if self.selected.is_none() {
            self.selected = Some(0);
        }
    }

    /// Remove the selected entry. The caller stops playback first when it is
    /// the one playing.
    pub fn remove_selected(&mut self) -> Option<TrackRef> {
        let sel = self.selected?;
        let removed = self.entries.remove(sel);

        if sel < self.current_playing {
            self.current_playing -= 1;
        }

        if self.entries.len() * 4 < self.capacity && self.capacity > MIN_CAPACITY {
            self.capacity = (self.capacity / 2).max(MIN_CAPACITY);
            self.entries.shrink_to(self.capacity);
        }

        self.selected = match self.entries.len() {
            0 => None,
            len if sel >= len => Some(len - 1),
            _ => Some(sel),
        };
        Some(removed)
    }

    pub fn remove_all(&mut self) {
        self.selected = (!self.entries.is_empty()).then_some(0);
        while self.remove_selected().is_some() {}
    }

    pub fn toggle_shuffle(&mut self) {
        self.mode = match self.mode {
            ShuffleRepeat::Shuffle => ShuffleRepeat::None,
            _ => ShuffleRepeat::Shuffle,
        };
    }

    pub fn toggle_repeat(&mut self) {
        self.mode = match self.mode {
            ShuffleRepeat::Repeat => ShuffleRepeat::None,
            _ => ShuffleRepeat::Repeat,
        };
    }

    /// Pick the entry to play after the current one finishes. `None` means
    /// playback should stop.
    pub fn advance(&mut self, rng: &mut impl Rng) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let next = match self.mode {
            ShuffleRepeat::None => {
                let next = self.current_playing + 1;
                if next >= self.entries.len() {
                    return None;
                }
                next
            }
            ShuffleRepeat::Shuffle => rng.gen_range(0..self.entries.len()),
            ShuffleRepeat::Repeat => self.current_playing.min(self.entries.len() - 1),
        };
        self.current_playing = next;
        Some(next)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.selected = Some(index);
        }
    }

    pub fn select_up(&mut self) {
        if let Some(sel) = self.selected {
            self.selected = Some(sel.saturating_sub(1));
        }
    }

    pub fn select_down(&mut self) {
        if let Some(sel) = self.selected {
            if sel + 1 < self.entries.len() {
                self.selected = Some(sel + 1);
            }
        }
    }

    pub fn select_first(&mut self) {
        if !self.entries.is_empty() {
            self.selected = Some(0);
        }
    }

    pub fn select_last(&mut self) {
        if let Some(last) = self.entries.len().checked_sub(1) {
            self.selected = Some(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn track(n: usize) -> TrackRef {
        TrackRef::new("ar", "al", format!("so-{}", n))
    }

    fn filled(n: usize) -> Playlist {
        let mut pl = Playlist::new();
        for i in 0..n {
            pl.add(track(i));
        }
        pl
    }

    #[test]
    fn test_empty_has_no_selection() {
        let pl = Playlist::new();
        assert_eq!(pl.selected(), None);
        assert_eq!(pl.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn test_first_add_selects_zero() {
        let mut pl = Playlist::new();
        pl.add(track(0));
        assert_eq!(pl.selected(), Some(0));
        pl.add(track(1));
        assert_eq!(pl.selected(), Some(0));
    }

    #[test]
    fn test_capacity_doubles_on_eleventh_add() {
        let mut pl = filled(10);
        assert_eq!(pl.capacity(), 10);
        pl.add(track(10));
        assert_eq!(pl.capacity(), 20);
        assert_eq!(pl.len(), 11);
    }

    #[test]
    fn test_capacity_halves_and_floors() {
        let mut pl = filled(11);
        assert_eq!(pl.capacity(), 20);
        pl.select(0);
        while pl.len() > 5 {
            pl.remove_selected();
        }
        assert_eq!(pl.capacity(), 20);
        pl.remove_selected();
        assert_eq!(pl.len(), 4);
        assert_eq!(pl.capacity(), 10);
        while pl.remove_selected().is_some() {}
        assert_eq!(pl.capacity(), 10);
        assert_eq!(pl.selected(), None);
    }

    #[test]
    fn test_remove_last_moves_selection_back() {
        let mut pl = filled(3);
        pl.select_last();
        let removed = pl.remove_selected().unwrap();
        assert_eq!(removed.song_id, "so-2");
        assert_eq!(pl.selected(), Some(1));
    }

    #[test]
    fn test_remove_without_selection_is_noop() {
        let mut pl = Playlist::new();
        assert!(pl.remove_selected().is_none());
        assert_eq!(pl.len(), 0);
    }

    #[test]
    fn test_remove_before_playing_keeps_song() {
        let mut pl = filled(5);
        pl.set_current_playing(3);
        pl.select(1);
        pl.remove_selected();
        assert_eq!(pl.current_playing(), 2);
        assert_eq!(pl.get(2).unwrap().song_id, "so-3");

        pl.select(3);
        pl.remove_selected();
        assert_eq!(pl.current_playing(), 2);
    }

    #[test]
    fn test_remove_all() {
        let mut pl = filled(25);
        pl.select(12);
        pl.remove_all();
        assert!(pl.is_empty());
        assert_eq!(pl.selected(), None);
        assert_eq!(pl.capacity(), MIN_CAPACITY);
    }

    #[test]
    fn test_modes_are_exclusive() {
        let mut pl = Playlist::new();
        pl.toggle_shuffle();
        assert_eq!(pl.mode(), ShuffleRepeat::Shuffle);
        pl.toggle_repeat();
        assert_eq!(pl.mode(), ShuffleRepeat::Repeat);
        pl.toggle_repeat();
        assert_eq!(pl.mode(), ShuffleRepeat::None);
        pl.toggle_shuffle();
        pl.toggle_shuffle();
        assert_eq!(pl.mode(), ShuffleRepeat::None);
    }

    #[test]
    fn test_advance_policies() {
        let mut rng = StdRng::seed_from_u64(7);

        let mut pl = filled(3);
        pl.set_current_playing(1);
        assert_eq!(pl.advance(&mut rng), Some(2));
        assert_eq!(pl.advance(&mut rng), None);
        assert_eq!(pl.current_playing(), 2);

        pl.toggle_repeat();
        assert_eq!(pl.advance(&mut rng), Some(2));
        assert_eq!(pl.advance(&mut rng), Some(2));

        let mut single = filled(1);
        single.toggle_shuffle();
        for _ in 0..5 {
            assert_eq!(single.advance(&mut rng), Some(0));
        }

        let mut many = filled(4);
        many.toggle_shuffle();
        for _ in 0..20 {
            assert!(many.advance(&mut rng).unwrap() < 4);
        }

        assert_eq!(Playlist::new().advance(&mut rng), None);
    }

    #[test]
    fn test_cursor_moves_are_bounded() {
        let mut pl = filled(3);
        pl.select_up();
        assert_eq!(pl.selected(), Some(0));
        pl.select_down();
        pl.select_down();
        pl.select_down();
        assert_eq!(pl.selected(), Some(2));
        pl.select_first();
        assert_eq!(pl.selected(), Some(0));
        pl.select(9);
        assert_eq!(pl.selected(), Some(0));
    }

    #[test]
    fn test_grow_then_shrink_scenario() {
        let mut pl = filled(11);
        assert_eq!(pl.capacity(), 20);

        pl.select(0);
        for _ in 0..8 {
            pl.remove_selected();
        }
        assert_eq!(pl.len(), 3);
        assert_eq!(pl.capacity(), 10);
        assert_eq!(pl.selected(), Some(0));
        assert_eq!(pl.get(0).unwrap().song_id, "so-8");

        for _ in 0..3 {
            pl.remove_selected();
        }
        assert!(pl.is_empty());
        assert_eq!(pl.selected(), None);
        assert_eq!(pl.capacity(), 10);
    }
}
