use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Settings;
use crate::error::Result;
use crate::tracks::{TrackRecord, TrackScope, TrackStore};
use crate::youtube::{SearchHit, YtDlp};

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub struct PreviewStream {
    pub stream_url: String,
}

/// Piste téléchargée et registre mis à jour.
#[derive(Debug, Serialize)]
pub struct DownloadedTrack {
    pub tracks: BTreeMap<String, TrackRecord>,
    pub path: String,
    pub filename: String,
}

pub async fn search_youtube(settings: &Settings, query: &str, limit: u32) -> Result<SearchResults> {
    match YtDlp::new(settings).search(query, limit).await {
        Ok(results) => Ok(SearchResults { results }),
        Err(e) => {
            log::error!("search_youtube failed query={:?}: {}", query, e);
            Err(e)
        }
    }
}

pub async fn get_youtube_preview_stream(settings: &Settings, video_url: &str) -> Result<PreviewStream> {
    let stream_url = YtDlp::new(settings).preview_stream(video_url).await?;
    Ok(PreviewStream { stream_url })
}

/// Télécharge l'audio puis l'enregistre comme piste de l'application.
pub async fn download_youtube_audio(
    settings: &Settings,
    app_id: i64,
    video_url: &str,
) -> Result<DownloadedTrack> {
    let outcome = YtDlp::new(settings).download_audio(app_id, video_url).await?;
    let mut store = TrackStore::load(&settings.tracks_file);
    store.set(
        TrackScope::App(app_id),
        &outcome.path,
        &outcome.filename,
        &settings.home_dir,
    )?;
    Ok(DownloadedTrack {
        tracks: store.all().clone(),
        path: outcome.path,
        filename: outcome.filename,
    })
}
