use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Taille minimale (exclue) d'un binaire crédible.
const MIN_BINARY_SIZE: u64 = 64;
/// Au-delà, un fichier sans signature reconnue est accepté.
const LARGE_BINARY_SIZE: u64 = 1024 * 1024;
/// Taille de l'en-tête inspectée.
const HEAD_SIZE: usize = 4096;

const HTML_MARKERS: [&[u8]; 2] = [b"<!doctype html", b"<html"];
const SIGNATURES: [&[u8]; 3] = [b"\x7fELF", b"#!", b"MZ"];

/// Vérifie qu'un fichier téléchargé ressemble à un yt-dlp exécutable.
///
/// Rejette les pages d'erreur HTML servies avec un statut 200 et les petits
/// corps JSON/texte enregistrés sous le nom attendu.
pub fn is_valid_yt_dlp_binary(path: &Path) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };
    let Ok(size) = file.metadata().map(|metadata| metadata.len()) else {
        return false;
    };
    if size <= MIN_BINARY_SIZE {
        return false;
    }

    let mut head = Vec::with_capacity(HEAD_SIZE);
    if (&mut file)
        .take(HEAD_SIZE as u64)
        .read_to_end(&mut head)
        .is_err()
    {
        return false;
    }

    let lowered = head.to_ascii_lowercase();
    if HTML_MARKERS
        .iter()
        .any(|marker| contains(&lowered, marker))
    {
        return false;
    }

    SIGNATURES.iter().any(|signature| head.starts_with(signature)) || size > LARGE_BINARY_SIZE
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
