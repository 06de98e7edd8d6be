use std::path::Path;

use serde::Serialize;

use crate::utils::path::lowercase_extension;

/// Extensions audio acceptées pour une piste.
pub const SUPPORTED_AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "aac", "flac", "ogg", "wav", "m4a"];

/// Durée maximale d'un résultat de recherche (15 minutes).
pub const MAX_TRACK_DURATION_SECS: u64 = 15 * 60;

/// Nombre maximal de résultats par recherche.
pub const MAX_SEARCH_LIMIT: u32 = 25;

/// Hôtes YouTube acceptés, sans préfixe `www.`.
pub const ALLOWED_HOSTS: [&str; 4] = [
    "youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

/// Préfixes reconnus pour une URL saisie sans schéma.
pub const SCHEMELESS_PREFIXES: [&str; 5] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Résultat de recherche YouTube.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub uploader: String,
    /// Durée en secondes, absente si yt-dlp ne la connaît pas.
    pub duration: Option<u64>,
    pub webpage_url: String,
}

/// Fichier audio obtenu après téléchargement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub path: String,
    pub filename: String,
}

/// Indique si le chemin porte une extension audio supportée.
pub fn has_supported_audio_extension(path: &Path) -> bool {
    lowercase_extension(path)
        .is_some_and(|ext| SUPPORTED_AUDIO_EXTENSIONS.contains(&ext.as_str()))
}
