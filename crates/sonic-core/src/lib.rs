//! Terminal-independent core of the sksonic Subsonic client.

pub mod api;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod keymap;
pub mod platform;
pub mod playback;
pub mod playlist;
pub mod protocol;
pub mod search;
pub mod sidechannel;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{CatalogError, CatalogService, Connection, SubsonicClient};
pub use catalog::CatalogCache;
pub use config::Config;
pub use dispatcher::{Dispatcher, Flow, InputMode, Notice};
pub use keymap::{Action, Key, Keymap};
pub use playback::{PlaybackController, PlayerExit, PlayerProcess};
#[cfg(unix)]
pub use playback::SignalPlayer;
pub use protocol::{Panel, PlaybackStatus, ShuffleRepeat, View};
