use super::types::{SearchHit, MAX_SEARCH_LIMIT, MAX_TRACK_DURATION_SECS, WATCH_URL_PREFIX};

/// Gabarit `--print` produisant une ligne tabulée par résultat.
pub const SEARCH_PRINT_TEMPLATE: &str = "%(id)s\t%(title)s\t%(uploader)s\t%(duration)s\t%(url)s";

/// Valeur imprimée par yt-dlp pour un champ inconnu.
const MISSING_FIELD: &str = "NA";

/// Borne la limite demandée à l'intervalle accepté.
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_SEARCH_LIMIT)
}

fn is_absolute_http(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Interprète une durée textuelle (`"213"`, `"213.5"`, `"NA"`).
fn parse_duration(raw: &str) -> Option<u64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.trunc() as u64)
}

/// Interprète une ligne `id\ttitle\tuploader\tduration\turl`.
///
/// Retourne `None` pour une ligne malformée ou une vidéo trop longue.
fn parse_search_line(line: &str) -> Option<SearchHit> {
    let parts: Vec<&str> = line.split('\t').map(str::trim).collect();
    if parts.len() < 2 {
        return None;
    }
    let id = parts[0];
    if id.is_empty() {
        return None;
    }

    let duration = parts.get(3).and_then(|raw| parse_duration(raw));
    if duration.is_some_and(|seconds| seconds > MAX_TRACK_DURATION_SECS) {
        return None;
    }

    let title = if parts[1].is_empty() { id } else { parts[1] };
    let uploader = parts
        .get(2)
        .copied()
        .filter(|uploader| *uploader != MISSING_FIELD)
        .unwrap_or_default();
    let webpage_url = match parts.get(4) {
        Some(url) if is_absolute_http(url) => url.to_string(),
        _ => format!("{}{}", WATCH_URL_PREFIX, id),
    };

    Some(SearchHit {
        id: id.to_string(),
        title: title.to_string(),
        uploader: uploader.to_string(),
        duration,
        webpage_url,
    })
}

/// Convertit la sortie de recherche de yt-dlp en résultats filtrés.
pub fn parse_search_output(stdout: &str) -> Vec<SearchHit> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_search_line)
        .collect()
}

/// Retourne la première URL http(s) imprimée par `--get-url`.
pub fn first_stream_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| is_absolute_http(line))
        .map(str::to_string)
}
