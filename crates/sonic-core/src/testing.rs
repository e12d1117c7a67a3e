//! In-memory stand-ins for the remote catalog and the player process.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::api::{CatalogError, CatalogService};
use crate::playback::{PlayerError, PlayerProcess};
use crate::protocol::Operation;

type SongRow = (&'static str, &'static str, u32);
type AlbumRow = (&'static str, &'static str, Vec<SongRow>);
type ArtistRow = (&'static str, &'static str, Vec<AlbumRow>);

pub struct FakeCatalog {
    groups: Vec<Vec<ArtistRow>>,
    failing: Option<Operation>,
    calls: Mutex<Vec<(Operation, Option<String>)>>,
}

impl FakeCatalog {
    /// Three artists in two index groups:
    ///
    /// - Autechre: Tri Repetae (Dael, Clipper)
    /// - Boards of Canada: Music Has the Right to Children (3 songs), Geogaddi (2 songs)
    /// - Broadcast: Tender Buttons (2 songs)
    pub fn sample() -> Self {
        Self {
            groups: vec![
                vec![("ar-ae", "Autechre", vec![(
                    "al-tri",
                    "Tri Repetae",
                    vec![("so-dael", "Dael", 400), ("so-clipper", "Clipper", 527)],
                )])],
                vec![
                    ("ar-boc", "Boards of Canada", vec![
                        ("al-mhtrtc", "Music Has the Right to Children", vec![
                            ("so-wildlife", "Wildlife Analysis", 77),
                            ("so-eagle", "An Eagle in Your Mind", 383),
                            ("so-roygbiv", "Roygbiv", 151),
                        ]),
                        ("al-geogaddi", "Geogaddi", vec![
                            ("so-ready", "Ready Lets Go", 59),
                            ("so-music-is-math", "Music Is Math", 321),
                        ]),
                    ]),
                    ("ar-broadcast", "Broadcast", vec![(
                        "al-tender",
                        "Tender Buttons",
                        vec![("so-found", "I Found the F", 130), ("so-black-cat", "Black Cat", 213)],
                    )]),
                ],
            ],
            failing: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `op` with a `"failed"` envelope.
    pub fn failing(mut self, op: Operation) -> Self {
        self.failing = Some(op);
        self
    }

    /// Override one song's length; 0 stands for a length the server did not report.
    pub fn with_duration(mut self, song_id: &str, secs: u32) -> Self {
        for (_, _, albums) in self.groups.iter_mut().flatten() {
            for (_, _, songs) in albums.iter_mut() {
                for song in songs.iter_mut().filter(|song| song.0 == song_id) {
                    song.2 = secs;
                }
            }
        }
        self
    }

    pub fn calls(&self) -> Vec<(Operation, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Operation) -> usize {
        self.calls.lock().unwrap().iter().filter(|(o, _)| *o == op).count()
    }

    fn artists(&self) -> impl Iterator<Item = &ArtistRow> {
        self.groups.iter().flatten()
    }

    fn body(&self, op: Operation, id: Option<&str>) -> Value {
        match op {
            Operation::Ping | Operation::Stream => json!({}),
            Operation::ListArtists => {
                let index: Vec<Value> = self
                    .groups
                    .iter()
                    .map(|group| {
                        let artists: Vec<Value> = group
                            .iter()
                            .map(|(id, name, _)| json!({ "id": id, "name": name }))
                            .collect();
                        json!({ "name": "", "artist": artists })
                    })
                    .collect();
                json!({ "artists": { "index": index } })
            }
            Operation::GetArtist => {
                let albums: Vec<Value> = self
                    .artists()
                    .filter(|(aid, _, _)| Some(*aid) == id)
                    .flat_map(|(_, _, albums)| albums.iter())
                    .map(|(id, name, _)| json!({ "id": id, "name": name }))
                    .collect();
                json!({ "artist": { "id": id, "album": albums } })
            }
            Operation::GetAlbum => {
                let songs: Vec<Value> = self
                    .artists()
                    .flat_map(|(_, _, albums)| albums.iter())
                    .filter(|(bid, _, _)| Some(*bid) == id)
                    .flat_map(|(_, _, songs)| songs.iter())
                    .map(|(id, title, duration)| json!({ "id": id, "title": title, "duration": duration }))
                    .collect();
                json!({ "album": { "id": id, "song": songs } })
            }
        }
    }
}

impl CatalogService for FakeCatalog {
    async fn call(&self, op: Operation, id: Option<&str>) -> Result<Value, CatalogError> {
        self.calls.lock().unwrap().push((op, id.map(str::to_string)));
        if self.failing == Some(op) {
            return Ok(json!({ "subsonic-response": {
                "status": "failed",
                "error": { "code": 70, "message": "The requested data was not found" }
            }}));
        }
        let mut body = self.body(op, id);
        body["status"] = json!("ok");
        Ok(json!({ "subsonic-response": body }))
    }
}

/// Records control calls instead of touching processes.
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    pub calls: Vec<String>,
    pub launched: Vec<String>,
    pub fail_launch: bool,
    tracking: bool,
}

impl PlayerProcess for RecordingPlayer {
    fn launch(&mut self, url: &str, _generation: u64) -> Result<(), PlayerError> {
        self.calls.push("launch".to_string());
        if self.fail_launch {
            return Err(PlayerError::Spawn {
                command: format!("ffplay \"{}\"", url),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        self.launched.push(url.to_string());
        self.tracking = true;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), PlayerError> {
        self.calls.push("suspend".to_string());
        Ok(())
    }

    fn resume(&mut self) -> Result<(), PlayerError> {
        self.calls.push("resume".to_string());
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), PlayerError> {
        self.calls.push("terminate".to_string());
        Ok(())
    }

    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn forget(&mut self) {
        self.tracking = false;
    }
}
