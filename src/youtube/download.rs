use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::utils::path::resolve_path;

use super::types::has_supported_audio_extension;

/// Gabarit de nom de fichier: titre tronqué à 150 octets puis identifiant.
pub const OUTPUT_TEMPLATE: &str = "%(title).150B [%(id)s].%(ext)s";

/// Arguments d'extraction audio mp3 vers `dest_dir`.
pub fn audio_download_args(dest_dir: &Path, url: &str) -> Vec<String> {
    [
        "--no-warnings",
        "--no-check-certificate",
        "--no-playlist",
        "--extract-audio",
        "--audio-format",
        "mp3",
        "--audio-quality",
        "0",
        "--restrict-filenames",
        "--force-overwrites",
        "--paths",
    ]
    .into_iter()
    .map(str::to_string)
    .chain([
        dest_dir.to_string_lossy().to_string(),
        "-o".to_string(),
        OUTPUT_TEMPLATE.to_string(),
        "--print".to_string(),
        "after_move:filepath".to_string(),
        url.to_string(),
    ])
    .collect()
}

fn is_audio_file(path: &Path) -> bool {
    path.is_file() && has_supported_audio_extension(path)
}

/// Cherche, de la dernière à la première ligne, un chemin audio existant.
pub fn extract_downloaded_path(stdout: &str, base_dir: &Path, home: &Path) -> Option<PathBuf> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| resolve_path(line, base_dir, home))
        .find(|candidate| is_audio_file(candidate))
}

/// Retourne le fichier audio le plus récemment modifié du dossier.
pub fn find_latest_audio_file(directory: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(directory).ok()?;
    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_audio_file(path))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|metadata| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}
