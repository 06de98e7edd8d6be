use url::Url;

use crate::error::{Error, Result};

use super::types::{ALLOWED_HOSTS, SCHEMELESS_PREFIXES, WATCH_URL_PREFIX};

/// Normalise une saisie utilisateur en URL YouTube sûre à passer à yt-dlp.
///
/// Accepte un identifiant de vidéo nu, un hôte YouTube sans schéma ou une URL
/// complète. Tout hôte hors de la liste autorisée est refusé.
pub fn normalize_youtube_url(value: &str) -> Result<String> {
    let mut candidate = value.trim().to_string();
    if candidate.is_empty() {
        return Err(Error::UnsupportedHost("YouTube URL is required".to_string()));
    }

    if !candidate.contains("://") {
        if SCHEMELESS_PREFIXES
            .iter()
            .any(|prefix| candidate.starts_with(prefix))
        {
            candidate = format!("https://{}", candidate);
        } else if !candidate.contains('/') && !candidate.contains(' ') {
            candidate = format!("{}{}", WATCH_URL_PREFIX, candidate);
        }
    }

    let host = Url::parse(&candidate)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if !ALLOWED_HOSTS.contains(&host) {
        return Err(Error::UnsupportedHost(
            "Only YouTube links are supported".to_string(),
        ));
    }
    Ok(candidate)
}
