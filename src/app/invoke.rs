use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::commands;
use crate::config::Settings;
use crate::error::Result;

use super::cli::{Command, TrackAction};

fn to_payload<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Exécute une sous-commande et retourne sa charge utile JSON.
pub async fn dispatch(command: Command, settings: &Settings) -> Result<Value> {
    match command {
        Command::Status => to_payload(commands::tools::get_yt_dlp_status(settings).await),
        Command::Update => to_payload(commands::tools::update_yt_dlp(settings).await?),
        Command::Search { query, limit } => {
            to_payload(commands::youtube::search_youtube(settings, &query, limit).await?)
        }
        Command::Preview { url } => {
            to_payload(commands::youtube::get_youtube_preview_stream(settings, &url).await?)
        }
        Command::Download { app_id, url } => {
            to_payload(commands::youtube::download_youtube_audio(settings, app_id, &url).await?)
        }
        Command::AppIds => to_payload(commands::steam::get_localconfig_app_ids(settings).await?),
        Command::AppNames { app_ids } => {
            to_payload(commands::steam::resolve_store_app_names(&app_ids).await?)
        }
        Command::Tracks => to_payload(commands::tracks::get_tracks(settings)),
        Command::Track { action } => dispatch_track(action, settings),
    }
}

fn dispatch_track(action: TrackAction, settings: &Settings) -> Result<Value> {
    match action {
        TrackAction::Get(scope) => to_payload(commands::tracks::get_track(settings, scope.scope())),
        TrackAction::Set {
            scope,
            path,
            filename,
        } => {
            let filename = filename.unwrap_or_else(|| {
                Path::new(&path)
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default()
            });
            to_payload(commands::tracks::set_track(settings, scope.scope(), &path, &filename)?)
        }
        TrackAction::Volume { scope, volume } => {
            to_payload(commands::tracks::set_volume(settings, scope.scope(), volume)?)
        }
        TrackAction::Offset { scope, seconds } => {
            to_payload(commands::tracks::set_start_offset(settings, scope.scope(), seconds)?)
        }
        TrackAction::Loop { scope, enabled } => {
            to_payload(commands::tracks::set_loop(settings, scope.scope(), enabled)?)
        }
        TrackAction::Remove(scope) => to_payload(commands::tracks::remove_track(settings, scope.scope())?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::cli::ScopeArgs;
    use clap::Parser;
    use std::fs;

    fn parse_track(args: &[&str]) -> TrackAction {
        let mut argv = vec!["themedeck", "track"];
        argv.extend_from_slice(args);
        match crate::app::cli::Cli::try_parse_from(argv).unwrap().command {
            Command::Track { action } => action,
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn track_commands_round_through_json() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::new(temp.path().join("settings"), temp.path());
        let audio = temp.path().join("boss.flac");
        fs::write(&audio, b"fLaC").unwrap();
        let audio = audio.to_string_lossy().to_string();

        let stored = dispatch(
            Command::Track {
                action: parse_track(&["set", "--global", audio.as_str()]),
            },
            &settings,
        )
        .await
        .unwrap();
        assert_eq!(stored["filename"], "boss.flac");
        assert_eq!(stored["scope"], "global");
        assert_eq!(stored["loop"], true);

        let missing = dispatch(
            Command::Track {
                action: parse_track(&["volume", "--app", "440", "0.3"]),
            },
            &settings,
        )
        .await
        .unwrap_err();
        assert_eq!(missing.to_string(), "No track found for app 440");

        let all = dispatch(Command::Tracks, &settings).await.unwrap();
        assert!(all.get("__global__").is_some());
    }

    #[tokio::test]
    async fn get_of_unknown_scope_is_null() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::new(temp.path().join("settings"), temp.path());
        let scope: ScopeArgs = match parse_track(&["get", "--store"]) {
            TrackAction::Get(scope) => scope,
            other => panic!("unexpected: {other:?}"),
        };
        let value = dispatch(Command::Track { action: TrackAction::Get(scope) }, &settings)
            .await
            .unwrap();
        assert!(value.is_null());
    }
}
