use std::fmt;

use serde::{Deserialize, Serialize};

/// Clé de la piste globale.
pub const GLOBAL_TRACK_KEY: &str = "__global__";
/// Clé de la piste de la boutique.
pub const STORE_TRACK_KEY: &str = "__store__";

pub const DEFAULT_VOLUME: f64 = 1.0;
pub const MAX_START_OFFSET_SECS: f64 = 30.0;

/// Portée d'une piste: une application, l'accueil global ou la boutique.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackScope {
    App(i64),
    Global,
    Store,
}

impl TrackScope {
    pub fn key(&self) -> String {
        match self {
            Self::App(app_id) => app_id.to_string(),
            Self::Global => GLOBAL_TRACK_KEY.to_string(),
            Self::Store => STORE_TRACK_KEY.to_string(),
        }
    }

    /// Valeur du champ `scope` persisté (absent pour une application).
    fn scope_label(&self) -> Option<String> {
        match self {
            Self::App(_) => None,
            Self::Global => Some("global".to_string()),
            Self::Store => Some("store".to_string()),
        }
    }
}

impl fmt::Display for TrackScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App(app_id) => write!(f, "app {}", app_id),
            Self::Global => write!(f, "global track"),
            Self::Store => write!(f, "store track"),
        }
    }
}

fn default_volume() -> f64 {
    DEFAULT_VOLUME
}

fn default_loop() -> bool {
    true
}

/// Piste associée à une portée, telle qu'écrite dans `tracks.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub path: String,
    pub filename: String,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub start_offset: f64,
    #[serde(rename = "loop", default = "default_loop")]
    pub loop_enabled: bool,
}

impl TrackRecord {
    /// Nouvelle piste qui reprend les réglages d'une éventuelle piste précédente.
    pub fn new(scope: TrackScope, path: String, filename: String, previous: Option<&TrackRecord>) -> Self {
        Self {
            app_id: match scope {
                TrackScope::App(app_id) => Some(app_id),
                _ => None,
            },
            scope: scope.scope_label(),
            path,
            filename,
            volume: previous.map_or(DEFAULT_VOLUME, |track| track.volume),
            start_offset: previous.map_or(0.0, |track| track.start_offset),
            loop_enabled: previous.map_or(true, |track| track.loop_enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_by_scope() {
        assert_eq!(TrackScope::App(440).key(), "440");
        assert_eq!(TrackScope::Global.key(), GLOBAL_TRACK_KEY);
        assert_eq!(TrackScope::Store.key(), STORE_TRACK_KEY);
    }

    #[test]
    fn serializes_loop_field_name() {
        let record = TrackRecord::new(TrackScope::Global, "/m/a.mp3".into(), "a.mp3".into(), None);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["loop"], true);
        assert_eq!(json["scope"], "global");
        assert!(json.get("app_id").is_none());
    }

    #[test]
    fn keeps_previous_settings() {
        let mut previous = TrackRecord::new(TrackScope::App(7), "/a.mp3".into(), "a.mp3".into(), None);
        previous.volume = 0.4;
        previous.start_offset = 12.0;
        previous.loop_enabled = false;
        let next = TrackRecord::new(TrackScope::App(7), "/b.mp3".into(), "b.mp3".into(), Some(&previous));
        assert_eq!(next.app_id, Some(7));
        assert_eq!(next.volume, 0.4);
        assert_eq!(next.start_offset, 12.0);
        assert!(!next.loop_enabled);
    }
}
