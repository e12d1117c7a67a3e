//! Lazily populated mirror of the remote Artist → Album → Song hierarchy.
//!
//! The artist list is fetched once at startup.  Albums and songs are fetched
//! on first demand and never again for the rest of the run.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{unwrap_envelope, CatalogError, CatalogService};
use crate::playlist::TrackRef;
use crate::protocol::{AlbumBody, ArtistBody, ArtistsBody, Operation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: String,
    pub name: String,
    pub duration_secs: u32,
}

#[derive(Debug, Clone)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub songs: Vec<Song>,
    pub populated: bool,
}

#[derive(Debug, Clone)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub albums: Vec<Album>,
    pub populated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub artists: Vec<Artist>,
}

pub struct CatalogCache<S> {
    service: S,
    catalog: Catalog,
}

fn parse<T: DeserializeOwned>(doc: Value) -> Result<T, CatalogError> {
    let body = unwrap_envelope(doc)?;
    serde_json::from_value(body).map_err(|e| CatalogError::Malformed(e.to_string()))
}

impl<S: CatalogService> CatalogCache<S> {
    /// Fetch the artist list and build the top level of the catalog.
    pub async fn load(service: S) -> Result<Self, CatalogError> {
        let doc = service.call(Operation::ListArtists, None).await?;
        let body: ArtistsBody = parse(doc)?;
        let artists: Vec<Artist> = body
            .artists
            .index
            .into_iter()
            .flat_map(|group| group.artist)
            .map(|a| Artist {
                id: a.id,
                name: a.name,
                albums: Vec::new(),
                populated: false,
            })
            .collect();
        debug!("catalog: {} artists", artists.len());
        Ok(Self {
            service,
            catalog: Catalog { artists },
        })
    }

    pub async fn ensure_albums(&mut self, artist_id: &str) -> Result<(), CatalogError> {
        let Some(ai) = self.find_artist(artist_id) else {
            warn!("catalog: unknown artist {}", artist_id);
            return Ok(());
        };
        let artist = &self.catalog.artists[ai];
        if artist.populated {
            return Ok(());
        }
        let doc = self
            .service
            .call(Operation::GetArtist, Some(&artist.id))
            .await?;
        let body: ArtistBody = parse(doc)?;

        let artist = &mut self.catalog.artists[ai];
        artist.albums = body
            .artist
            .album
            .into_iter()
            .map(|a| Album {
                id: a.id,
                name: a.name,
                songs: Vec::new(),
                populated: false,
            })
            .collect();
        artist.populated = true;
        debug!("catalog: {} albums for {}", artist.albums.len(), artist.name);
        Ok(())
    }

    pub async fn ensure_songs(&mut self, artist_id: &str, album_id: &str) -> Result<(), CatalogError> {
        let Some((ai, bi)) = self
            .find_artist(artist_id)
            .and_then(|ai| Some((ai, self.find_album(ai, album_id)?)))
        else {
            warn!("catalog: unknown album {}/{}", artist_id, album_id);
            return Ok(());
        };
        let album = &self.catalog.artists[ai].albums[bi];
        if album.populated {
            return Ok(());
        }
        let doc = self
            .service
            .call(Operation::GetAlbum, Some(&album.id))
            .await?;
        let body: AlbumBody = parse(doc)?;

        let album = &mut self.catalog.artists[ai].albums[bi];
        album.songs = body
            .album
            .song
            .into_iter()
            .map(|s| Song {
                duration_secs: s.duration_secs(),
                id: s.id,
                name: s.title,
            })
            .collect();
        album.populated = true;
        debug!("catalog: {} songs for {}", album.songs.len(), album.name);
        Ok(())
    }
}

impl<S> CatalogCache<S> {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn artists(&self) -> &[Artist] {
        &self.catalog.artists
    }

    pub fn artist(&self, artist_idx: usize) -> Option<&Artist> {
        self.catalog.artists.get(artist_idx)
    }

    pub fn album(&self, artist_idx: usize, album_idx: usize) -> Option<&Album> {
        self.artist(artist_idx)?.albums.get(album_idx)
    }

    pub fn find_artist(&self, artist_id: &str) -> Option<usize> {
        self.catalog.artists.iter().position(|a| a.id == artist_id)
    }

    pub fn find_album(&self, artist_idx: usize, album_id: &str) -> Option<usize> {
        self.artist(artist_idx)?
            .albums
            .iter()
            .position(|a| a.id == album_id)
    }

    pub fn find_song(&self, artist_idx: usize, album_idx: usize, song_id: &str) -> Option<usize> {
        self.album(artist_idx, album_idx)?
            .songs
            .iter()
            .position(|s| s.id == song_id)
    }

    pub fn resolve(&self, track: &TrackRef) -> Option<(&Artist, &Album, &Song)> {
        let artist = self
            .catalog
            .artists
            .iter()
            .find(|a| a.id == track.artist_id)?;
        let album = artist.albums.iter().find(|a| a.id == track.album_id)?;
        let song = album.songs.iter().find(|s| s.id == track.song_id)?;
        Some((artist, album, song))
    }
}
