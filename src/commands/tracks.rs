use std::collections::BTreeMap;

use crate::config::Settings;
use crate::error::Result;
use crate::tracks::{TrackRecord, TrackScope, TrackStore};

fn load(settings: &Settings) -> TrackStore {
    TrackStore::load(&settings.tracks_file)
}

pub fn get_tracks(settings: &Settings) -> BTreeMap<String, TrackRecord> {
    load(settings).all().clone()
}

pub fn get_track(settings: &Settings, scope: TrackScope) -> Option<TrackRecord> {
    load(settings).get(scope).cloned()
}

pub fn set_track(settings: &Settings, scope: TrackScope, path: &str, filename: &str) -> Result<TrackRecord> {
    let mut store = load(settings);
    let record = store.set(scope, path, filename, &settings.home_dir).cloned();
    if let Err(e) = &record {
        log::error!("set_track failed {} path={}: {}", scope, path, e);
    }
    record
}

pub fn set_volume(settings: &Settings, scope: TrackScope, volume: f64) -> Result<TrackRecord> {
    load(settings).set_volume(scope, volume).cloned()
}

pub fn set_start_offset(settings: &Settings, scope: TrackScope, start_offset: f64) -> Result<TrackRecord> {
    load(settings).set_start_offset(scope, start_offset).cloned()
}

pub fn set_loop(settings: &Settings, scope: TrackScope, loop_enabled: bool) -> Result<TrackRecord> {
    load(settings).set_loop(scope, loop_enabled).cloned()
}

/// Retire la piste et retourne le registre restant.
pub fn remove_track(settings: &Settings, scope: TrackScope) -> Result<BTreeMap<String, TrackRecord>> {
    let mut store = load(settings);
    store.remove(scope)?;
    Ok(store.all().clone())
}
