//! Registre des pistes audio par application, globale et boutique.

mod store;
mod types;

pub use store::TrackStore;
pub use types::{TrackRecord, TrackScope, GLOBAL_TRACK_KEY, STORE_TRACK_KEY};
