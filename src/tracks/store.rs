use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::utils::path::resolve_path;
use crate::utils::temp_file::TempFileGuard;

use super::types::{TrackRecord, TrackScope, MAX_START_OFFSET_SECS};

/// Registre des pistes persisté dans `tracks.json`.
#[derive(Debug)]
pub struct TrackStore {
    file: PathBuf,
    tracks: BTreeMap<String, TrackRecord>,
    /// Entrées illisibles, conservées telles quelles et réécrites à chaque sauvegarde.
    unparsed: BTreeMap<String, Value>,
}

impl TrackStore {
    /// Charge le registre; un fichier absent ou illisible donne un registre vide.
    ///
    /// Les pistes sans champ `loop` reçoivent `true` et le fichier est réécrit.
    pub fn load(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let mut store = Self {
            file,
            tracks: BTreeMap::new(),
            unparsed: BTreeMap::new(),
        };
        if !store.file.exists() {
            return store;
        }

        let raw: BTreeMap<String, Value> = match fs::read_to_string(&store.file)
            .map_err(Error::from)
            .and_then(|text| serde_json::from_str(&text).map_err(Error::from))
        {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Failed to read {}: {}", store.file.display(), e);
                return store;
            }
        };

        let mut changed = false;
        for (key, mut value) in raw {
            if let Some(object) = value.as_object_mut() {
                if !object.contains_key("loop") {
                    object.insert("loop".to_string(), Value::Bool(true));
                    changed = true;
                }
            }
            match serde_json::from_value::<TrackRecord>(value.clone()) {
                Ok(record) => {
                    store.tracks.insert(key, record);
                }
                Err(e) => {
                    log::warn!("Keeping malformed track '{}' untouched: {}", key, e);
                    store.unparsed.insert(key, value);
                }
            }
        }

        if changed {
            if let Err(e) = store.save() {
                log::error!("Failed to save {}: {}", store.file.display(), e);
            }
        }
        store
    }

    pub fn all(&self) -> &BTreeMap<String, TrackRecord> {
        &self.tracks
    }

    pub fn get(&self, scope: TrackScope) -> Option<&TrackRecord> {
        self.tracks.get(&scope.key())
    }

    /// Associe un fichier audio à la portée en conservant ses réglages.
    pub fn set(&mut self, scope: TrackScope, path: &str, filename: &str, home: &Path) -> Result<&TrackRecord> {
        log::info!("set_track request {} path={}", scope, path);
        let resolved = resolve_track_file(path, home)?;
        let key = scope.key();
        let record = TrackRecord::new(
            scope,
            resolved.to_string_lossy().to_string(),
            filename.to_string(),
            self.tracks.get(&key),
        );
        self.tracks.insert(key.clone(), record);
        self.unparsed.remove(&key);
        self.save()?;
        log::info!("set_track stored {} path={}", scope, resolved.display());
        self.tracks
            .get(&key)
            .ok_or_else(|| Error::TrackNotFound(scope.to_string()))
    }

    pub fn set_volume(&mut self, scope: TrackScope, volume: f64) -> Result<&TrackRecord> {
        let volume = finite(volume, "Volume")?.clamp(0.0, 1.0);
        self.update(scope, |track| track.volume = volume)
    }

    pub fn set_start_offset(&mut self, scope: TrackScope, start_offset: f64) -> Result<&TrackRecord> {
        let start_offset = finite(start_offset, "Start offset")?.clamp(0.0, MAX_START_OFFSET_SECS);
        self.update(scope, |track| track.start_offset = start_offset)
    }

    pub fn set_loop(&mut self, scope: TrackScope, loop_enabled: bool) -> Result<&TrackRecord> {
        self.update(scope, |track| track.loop_enabled = loop_enabled)
    }

    /// Retire la piste si elle existe; sans effet sinon.
    pub fn remove(&mut self, scope: TrackScope) -> Result<()> {
        let key = scope.key();
        self.tracks.remove(&key);
        self.unparsed.remove(&key);
        self.save()
    }

    fn update(&mut self, scope: TrackScope, apply: impl FnOnce(&mut TrackRecord)) -> Result<&TrackRecord> {
        let key = scope.key();
        let track = self
            .tracks
            .get_mut(&key)
            .ok_or_else(|| Error::TrackNotFound(scope.to_string()))?;
        apply(track);
        self.save()?;
        self.tracks
            .get(&key)
            .ok_or_else(|| Error::TrackNotFound(scope.to_string()))
    }

    /// Écrit dans un temporaire voisin puis renomme.
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut entries = self.unparsed.clone();
        for (key, track) in &self.tracks {
            entries.insert(key.clone(), serde_json::to_value(track)?);
        }
        let json = serde_json::to_string_pretty(&entries)?;
        let temp = TempFileGuard::new(self.file.with_extension("json.tmp"));
        fs::write(temp.path(), json)?;
        fs::rename(temp.path(), &self.file)?;
        Ok(())
    }
}

fn finite(value: f64, label: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidTrack(format!("{} must be a finite number", label)))
    }
}

/// Résout le chemin et vérifie qu'il désigne un fichier lisible.
fn resolve_track_file(path: &str, home: &Path) -> Result<PathBuf> {
    let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let resolved = resolve_path(path, &base, home);
    if !resolved.is_file() {
        return Err(Error::InvalidTrack(format!(
            "File not found or inaccessible: {}",
            resolved.display()
        )));
    }
    match File::open(&resolved) {
        Ok(_) => Ok(resolved),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(Error::InvalidTrack(format!(
            "Permission denied: {}",
            resolved.display()
        ))),
        Err(e) => Err(e.into()),
    }
}
