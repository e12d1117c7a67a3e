use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Subsonic API version sent with every request unless overridden.
pub const DEFAULT_API_VERSION: &str = "1.16.1";

/// Playback state of the external player as tracked by the controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Shuffle and repeat share one field; at most one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShuffleRepeat {
    #[default]
    None,
    Shuffle,
    Repeat,
}

impl ShuffleRepeat {
    /// Status-line indicator: "X" for shuffle, "R" for repeat.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::None => " ",
            Self::Shuffle => "X",
            Self::Repeat => "R",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Info,
    Playlist,
}

/// The three catalog browsing columns, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Artists,
    Albums,
    Songs,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Artists, Panel::Albums, Panel::Songs];

    /// Panel to the left, clamped at Artists.
    pub fn left(self) -> Self {
        match self {
            Self::Artists | Self::Albums => Self::Artists,
            Self::Songs => Self::Albums,
        }
    }

    /// Panel to the right, clamped at Songs.
    pub fn right(self) -> Self {
        match self {
            Self::Artists => Self::Albums,
            Self::Albums | Self::Songs => Self::Songs,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Artists => "Artists",
            Self::Albums => "Albums",
            Self::Songs => "Songs",
        }
    }
}

/// Remote catalog operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Ping,
    ListArtists,
    GetArtist,
    GetAlbum,
    Stream,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Self::Ping => "rest/ping.view",
            Self::ListArtists => "rest/getArtists",
            Self::GetArtist => "rest/getArtist",
            Self::GetAlbum => "rest/getAlbum",
            Self::Stream => "rest/stream",
        }
    }
}

// ── response bodies (inside "subsonic-response") ──────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistsBody {
    pub artists: ArtistIndexes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistIndexes {
    #[serde(default)]
    pub index: Vec<ArtistIndex>,
}

/// One alphabetical group of the artist listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistIndex {
    #[serde(default)]
    pub artist: Vec<ArtistEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistEntry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistBody {
    pub artist: ArtistDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistDetail {
    #[serde(default)]
    pub album: Vec<AlbumEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumEntry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumBody {
    pub album: AlbumDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumDetail {
    #[serde(default)]
    pub song: Vec<SongEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SongEntry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, rename = "bitRate")]
    pub bit_rate: Option<u32>,
}

impl SongEntry {
    /// Reported duration, or `size * 8 / bitRate / 1000` when the server
    /// leaves it out.
    pub fn duration_secs(&self) -> u32 {
        if let Some(d) = self.duration {
            return d;
        }
        match (self.size, self.bit_rate) {
            (Some(size), Some(rate)) if rate > 0 => (size * 8 / rate as u64 / 1000) as u32,
            _ => 0,
        }
    }
}

/// Some servers send numeric ids.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}
