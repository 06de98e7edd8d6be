//! Recherche, pré-écoute et téléchargement audio YouTube via yt-dlp.

mod client;
mod download;
mod search;
/// Types et constantes du domaine YouTube.
pub mod types;
mod url;

pub use client::YtDlp;
pub use download::{extract_downloaded_path, find_latest_audio_file};
pub use search::parse_search_output;
pub use types::{DownloadOutcome, SearchHit};
pub use url::normalize_youtube_url;
