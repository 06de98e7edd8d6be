use std::path::PathBuf;

use crate::binaries::{InvocationDescriptor, ToolLayout, ToolLocator};
use crate::config::{Settings, DOWNLOAD_TIMEOUT, QUERY_TIMEOUT, VERSION_TIMEOUT};
use crate::error::{Error, Result};
use crate::utils::process::{command_error, run_command, ProcessOutput};

use super::download::{audio_download_args, extract_downloaded_path, find_latest_audio_file};
use super::search::{clamp_limit, first_stream_url, parse_search_output, SEARCH_PRINT_TEMPLATE};
use super::types::{DownloadOutcome, SearchHit};
use super::url::normalize_youtube_url;

/// Opérations média adossées à yt-dlp.
///
/// L'invocation est relocalisée à chaque appel pour voir une installation
/// terminée entre deux requêtes.
#[derive(Clone, Debug)]
pub struct YtDlp {
    locator: ToolLocator,
    settings: Settings,
}

impl YtDlp {
    pub fn new(settings: &Settings) -> Self {
        Self::with_locator(ToolLocator::new(ToolLayout::from_settings(settings)), settings)
    }

    pub fn with_locator(locator: ToolLocator, settings: &Settings) -> Self {
        Self {
            locator,
            settings: settings.clone(),
        }
    }

    pub fn locator(&self) -> &ToolLocator {
        &self.locator
    }

    async fn run(
        &self,
        invocation: &InvocationDescriptor,
        args: Vec<String>,
        timeout: std::time::Duration,
    ) -> Result<ProcessOutput> {
        run_command(&invocation.command_with(args), timeout, invocation.env.as_ref()).await
    }

    /// Première ligne de `--version`, ou `None` si yt-dlp ne répond pas.
    pub async fn version(&self, invocation: &InvocationDescriptor) -> Option<String> {
        let output = match self
            .run(invocation, vec!["--version".to_string()], VERSION_TIMEOUT)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                log::error!("yt-dlp version query failed: {}", e);
                return None;
            }
        };
        if !output.success() {
            return None;
        }
        output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }

    /// Recherche YouTube, limitée à 25 résultats de 15 minutes au plus.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchHit>> {
        let cleaned_query = query.trim();
        if cleaned_query.is_empty() {
            return Err(Error::InvalidQuery("Search query is required".to_string()));
        }

        let invocation = self.locator.require()?;
        let safe_limit = clamp_limit(limit);
        let args = vec![
            "--no-warnings".to_string(),
            "--no-check-certificate".to_string(),
            "--skip-download".to_string(),
            "--flat-playlist".to_string(),
            "--print".to_string(),
            SEARCH_PRINT_TEMPLATE.to_string(),
            format!("ytsearch{}:{}", safe_limit, cleaned_query),
        ];
        let output = self.run(&invocation, args, QUERY_TIMEOUT).await?;
        if !output.success() {
            return Err(Error::ExecutionFailed(command_error(&output, "YouTube search failed")));
        }
        Ok(parse_search_output(&output.stdout))
    }

    /// Résout une URL de flux audio éphémère pour la pré-écoute.
    pub async fn preview_stream(&self, video_url: &str) -> Result<String> {
        let normalized_url = normalize_youtube_url(video_url)?;
        let invocation = self.locator.require()?;
        let args = vec![
            "--no-warnings".to_string(),
            "--no-check-certificate".to_string(),
            "--no-playlist".to_string(),
            "--get-url".to_string(),
            "-f".to_string(),
            "ba[ext=m4a]/bestaudio/best".to_string(),
            normalized_url,
        ];
        let output = self.run(&invocation, args, QUERY_TIMEOUT).await?;
        if !output.success() {
            return Err(Error::ExecutionFailed(command_error(
                &output,
                "Failed to resolve preview stream",
            )));
        }
        first_stream_url(&output.stdout).ok_or(Error::NoPlayableStream)
    }

    /// Télécharge l'audio en mp3 dans `downloads/<app_id>/`.
    pub async fn download_audio(&self, app_id: i64, video_url: &str) -> Result<DownloadOutcome> {
        if app_id <= 0 {
            return Err(Error::InvalidAppId(app_id));
        }
        let normalized_url = normalize_youtube_url(video_url)?;
        let invocation = self.locator.require()?;

        let app_download_dir = self.settings.app_download_dir(app_id);
        tokio::fs::create_dir_all(&app_download_dir).await?;

        let args = audio_download_args(&app_download_dir, &normalized_url);
        let output = self.run(&invocation, args, DOWNLOAD_TIMEOUT).await?;
        if !output.success() {
            return Err(Error::ExecutionFailed(command_error(&output, "YouTube download failed")));
        }

        let home = self.settings.home_dir.clone();
        let downloaded: Option<PathBuf> = tokio::task::spawn_blocking(move || {
            extract_downloaded_path(&output.stdout, &app_download_dir, &home)
                .or_else(|| find_latest_audio_file(&app_download_dir))
        })
        .await
        .map_err(std::io::Error::other)?;

        let path = downloaded.ok_or(Error::DownloadIncomplete)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        log::info!("Downloaded audio for app {} to {}", app_id, path.display());
        Ok(DownloadOutcome {
            path: path.to_string_lossy().to_string(),
            filename,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Installe un faux yt-dlp (script shell) comme binaire local.
    fn fake_tool(temp: &tempfile::TempDir, script: &str) -> YtDlp {
        let settings = Settings::new(temp.path().join("settings"), temp.path().join("home"));
        let empty = temp.path().join("empty-path");
        fs::create_dir_all(&empty).unwrap();
        let layout = ToolLayout {
            search_path: Some(empty.into_os_string()),
            ..ToolLayout::from_settings(&settings)
        };
        let binary = layout.local_yt_dlp();
        fs::create_dir_all(binary.parent().unwrap()).unwrap();
        fs::write(&binary, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();
        YtDlp::with_locator(ToolLocator::new(layout), &settings)
    }

    fn missing_tool(temp: &tempfile::TempDir) -> YtDlp {
        let settings = Settings::new(temp.path().join("settings"), temp.path().join("home"));
        let empty = temp.path().join("empty-path");
        fs::create_dir_all(&empty).unwrap();
        let layout = ToolLayout {
            search_path: Some(empty.into_os_string()),
            ..ToolLayout::from_settings(&settings)
        };
        YtDlp::with_locator(ToolLocator::new(layout), &settings)
    }

    #[tokio::test]
    async fn reports_first_version_line() {
        let temp = tempfile::tempdir().unwrap();
        let yt = fake_tool(&temp, "echo 2025.06.30; echo extra");
        let invocation = yt.locator().require().unwrap();
        assert_eq!(yt.version(&invocation).await.as_deref(), Some("2025.06.30"));
    }

    #[tokio::test]
    async fn version_is_none_on_failure() {
        let temp = tempfile::tempdir().unwrap();
        let yt = fake_tool(&temp, "echo broken >&2; exit 1");
        let invocation = yt.locator().require().unwrap();
        assert_eq!(yt.version(&invocation).await, None);
    }

    #[tokio::test]
    async fn search_filters_and_parses_tool_output() {
        let temp = tempfile::tempdir().unwrap();
        let yt = fake_tool(
            &temp,
            r#"printf 'a1\tTheme\tComposer\t120\tNA\nb2\tFull OST\tComposer\t5400\tNA\n'"#,
        );
        let hits = yt.search("zelda theme", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].webpage_url, "https://www.youtube.com/watch?v=a1");
    }

    #[tokio::test]
    async fn search_rejects_blank_query_before_locating() {
        let temp = tempfile::tempdir().unwrap();
        let err = missing_tool(&temp).search("   ", 5).await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn search_without_tool_is_unavailable() {
        let temp = tempfile::tempdir().unwrap();
        let err = missing_tool(&temp).search("halo", 5).await.unwrap_err();
        assert!(matches!(err, Error::ToolUnavailable(_)));
    }

    #[tokio::test]
    async fn search_failure_surfaces_last_stderr_line() {
        let temp = tempfile::tempdir().unwrap();
        let yt = fake_tool(&temp, "echo 'WARNING: slow' >&2; echo 'ERROR: Unable to reach YouTube' >&2; exit 1");
        match yt.search("halo", 5).await {
            Err(Error::ExecutionFailed(message)) => assert_eq!(message, "ERROR: Unable to reach YouTube"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn preview_without_stream_fails() {
        let temp = tempfile::tempdir().unwrap();
        let yt = fake_tool(&temp, "echo 'no url here'");
        let err = yt.preview_stream("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, Error::NoPlayableStream));
    }

    #[tokio::test]
    async fn preview_returns_stream_url() {
        let temp = tempfile::tempdir().unwrap();
        let yt = fake_tool(&temp, "echo 'https://rr3.googlevideo.com/videoplayback?id=1'");
        let url = yt.preview_stream("https://youtu.be/dQw4w9WgXcQ").await.unwrap();
        assert!(url.starts_with("https://rr3.googlevideo.com/"));
    }

    #[tokio::test]
    async fn download_rejects_bad_input() {
        let temp = tempfile::tempdir().unwrap();
        let yt = missing_tool(&temp);
        assert!(matches!(
            yt.download_audio(0, "dQw4w9WgXcQ").await,
            Err(Error::InvalidAppId(0))
        ));
        assert!(matches!(
            yt.download_audio(440, "https://vimeo.com/1").await,
            Err(Error::UnsupportedHost(_))
        ));
    }

    #[tokio::test]
    async fn download_uses_printed_path() {
        let temp = tempfile::tempdir().unwrap();
        // Le faux outil écrit le fichier dans le dossier passé à --paths.
        let yt = fake_tool(
            &temp,
            r#"while [ "$1" != "--paths" ]; do shift; done; dir="$2"
touch "$dir/Theme_Song [a1].mp3"
echo "$dir/Theme_Song [a1].mp3""#,
        );
        let outcome = yt.download_audio(440, "a1").await.unwrap();
        assert_eq!(outcome.filename, "Theme_Song [a1].mp3");
        assert!(Path::new(&outcome.path).is_file());
        assert!(outcome.path.contains("downloads/440"));
    }

    #[tokio::test]
    async fn download_without_file_is_incomplete() {
        let temp = tempfile::tempdir().unwrap();
        let yt = fake_tool(&temp, "echo '[download] done'");
        let err = yt.download_audio(440, "a1").await.unwrap_err();
        assert!(matches!(err, Error::DownloadIncomplete));
    }
}
