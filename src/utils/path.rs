use std::path::{Path, PathBuf};

/// Développe un `~` initial vers le dossier utilisateur.
pub fn expand_user(raw: &str, home: &Path) -> PathBuf {
    let trimmed = raw.trim();
    if trimmed == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home.join(rest);
    }
    PathBuf::from(trimmed)
}

/// Développe puis canonicalise un chemin, relatif à `base` s'il n'est pas absolu.
pub fn resolve_path(raw: &str, base: &Path, home: &Path) -> PathBuf {
    let expanded = expand_user(raw, home);
    let candidate = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };
    candidate.canonicalize().unwrap_or(candidate)
}

/// Retourne l'extension en minuscules, sans le point.
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_home_prefix() {
        let home = Path::new("/home/deck");
        assert_eq!(expand_user("~/Music/a.mp3", home), PathBuf::from("/home/deck/Music/a.mp3"));
        assert_eq!(expand_user("~", home), PathBuf::from("/home/deck"));
        assert_eq!(expand_user(" /abs/b.ogg ", home), PathBuf::from("/abs/b.ogg"));
    }

    #[test]
    fn resolves_relative_against_base() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("song.mp3"), b"id3").unwrap();
        let resolved = resolve_path("song.mp3", temp.path(), Path::new("/home/deck"));
        assert_eq!(resolved, temp.path().join("song.mp3").canonicalize().unwrap());
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(lowercase_extension(Path::new("a/B.MP3")).as_deref(), Some("mp3"));
        assert_eq!(lowercase_extension(Path::new("noext")), None);
    }
}
