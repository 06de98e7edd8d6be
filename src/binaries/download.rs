use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::{ACCEPT, USER_AGENT};

use crate::config::{HTTP_DOWNLOAD_TIMEOUT, TRANSFER_TIMEOUT, VERSION_TIMEOUT};
use crate::utils::process::{command_error, run_command, trim_message};
use crate::utils::temp_file::TempFileGuard;

use super::resolver::{ensure_executable, ToolLayout};
use super::validation::is_valid_yt_dlp_binary;

/// Emplacements de release essayés dans l'ordre.
pub const YTDLP_RELEASE_URLS: [&str; 3] = [
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp",
    "https://yt-dlp.org/downloads/latest/yt-dlp",
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp_linux",
];

const DOWNLOAD_USER_AGENT: &str = "ThemeDeck/2.5 (+Decky Loader)";
const HTTP_MAX_TRIES: usize = 2;
const DOWNLOAD_ERROR_LIMIT: usize = 280;

/// Moyen de transfert d'un binaire, du plus rapide au plus portable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transport {
    Curl,
    Wget,
    Http,
}

const TRANSPORTS: [Transport; 3] = [Transport::Curl, Transport::Wget, Transport::Http];

impl Transport {
    fn label(&self) -> &'static str {
        match self {
            Self::Curl => "curl",
            Self::Wget => "wget",
            Self::Http => "http",
        }
    }

    /// Le client intégré est toujours disponible; curl et wget doivent être sur le `PATH`.
    fn available(&self, layout: &ToolLayout) -> bool {
        matches!(self, Self::Http) || layout.which(self.label()).is_some()
    }

    /// Ligne de commande du transfert externe, `None` pour le client intégré.
    fn command(&self, program: &Path, target: &Path, url: &str) -> Option<Vec<String>> {
        let program = program.to_string_lossy().to_string();
        let target = target.to_string_lossy().to_string();
        let args: Vec<&str> = match self {
            Self::Curl => vec![
                "-fsSL",
                "-k",
                "--http1.1",
                "--retry",
                "3",
                "--retry-delay",
                "1",
                "--connect-timeout",
                "20",
                "--max-time",
                "180",
                "-A",
                DOWNLOAD_USER_AGENT,
                "-o",
                target.as_str(),
                url,
            ],
            Self::Wget => vec![
                "--quiet",
                "--tries=3",
                "--timeout=20",
                "--no-check-certificate",
                "-O",
                target.as_str(),
                url,
            ],
            Self::Http => return None,
        };
        let mut command = vec![program];
        command.extend(args.into_iter().map(str::to_string));
        Some(command)
    }

    /// Transfère `url` vers `target`; le fichier n'est pas encore valide.
    async fn fetch(&self, layout: &ToolLayout, target: &Path, url: &str) -> Result<(), String> {
        if let Transport::Http = self {
            return http_download(url, target).await;
        }

        let program = layout
            .which(self.label())
            .ok_or_else(|| format!("{} not found", self.label()))?;
        let command = self
            .command(&program, target, url)
            .ok_or_else(|| "unsupported transport".to_string())?;
        let output = run_command(&command, TRANSFER_TIMEOUT, None)
            .await
            .map_err(|e| e.to_string())?;
        if output.success() {
            Ok(())
        } else {
            Err(command_error(&output, "download failed"))
        }
    }
}

/// Télécharge via le client HTTP intégré, avec un nombre d'essais borné.
async fn http_download(url: &str, target: &Path) -> Result<(), String> {
    // Les appareils cibles ont parfois un magasin de certificats incomplet.
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(20))
        .timeout(HTTP_DOWNLOAD_TIMEOUT)
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let mut last_error = String::new();
    for attempt in 1..=HTTP_MAX_TRIES {
        let response = match client
            .get(url)
            .header(USER_AGENT, DOWNLOAD_USER_AGENT)
            .header(ACCEPT, "*/*")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                last_error = format!("request failed (attempt {}/{}): {}", attempt, HTTP_MAX_TRIES, e);
                continue;
            }
        };
        if !response.status().is_success() {
            last_error = format!("HTTP {} (attempt {}/{})", response.status(), attempt, HTTP_MAX_TRIES);
            continue;
        }
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                last_error = format!("read failed (attempt {}/{}): {}", attempt, HTTP_MAX_TRIES, e);
                continue;
            }
        };
        if body.is_empty() {
            return Err("no data returned".to_string());
        }
        return tokio::fs::write(target, &body)
            .await
            .map_err(|e| format!("Failed to write '{}': {}", target.display(), e));
    }
    Err(last_error)
}

/// Essaie chaque URL avec chaque transport et installe le premier binaire valide.
///
/// Le fichier est écrit dans un temporaire de `bin/`, validé, rendu
/// exécutable puis renommé atomiquement en `bin/yt-dlp`.
pub(crate) async fn download_yt_dlp_binary(layout: &ToolLayout) -> Result<(), String> {
    download_from_mirrors(layout, &YTDLP_RELEASE_URLS, &TRANSPORTS).await
}

async fn download_from_mirrors(
    layout: &ToolLayout,
    urls: &[&str],
    transports: &[Transport],
) -> Result<(), String> {
    fs::create_dir_all(&layout.bin_dir)
        .map_err(|e| format!("Failed to create '{}': {}", layout.bin_dir.display(), e))?;

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let temp = TempFileGuard::new(
        layout
            .bin_dir
            .join(format!("yt-dlp-{}-{}.part", std::process::id(), stamp)),
    );

    let mut errors: Vec<String> = Vec::new();
    for &url in urls {
        for transport in transports {
            if !transport.available(layout) {
                continue;
            }
            match transport.fetch(layout, temp.path(), url).await {
                Ok(()) if is_valid_yt_dlp_binary(temp.path()) => {
                    log::info!("Downloaded yt-dlp from {} via {}", url, transport.label());
                    return install_candidate(layout, temp.path()).await;
                }
                Ok(()) => errors.push(format!(
                    "{} {}: downloaded file was not a valid yt-dlp binary",
                    transport.label(),
                    url
                )),
                Err(e) => errors.push(format!("{} {}: {}", transport.label(), url, e)),
            }
            temp.discard();
        }
    }

    let summary = if errors.is_empty() {
        "unknown download error".to_string()
    } else {
        errors.join("; ")
    };
    Err(trim_message(&summary, DOWNLOAD_ERROR_LIMIT))
}

/// Rend le candidat exécutable, le met en place et vérifie qu'il répond.
async fn install_candidate(layout: &ToolLayout, candidate: &Path) -> Result<(), String> {
    let destination = layout.local_yt_dlp();
    ensure_executable(candidate)
        .map_err(|e| format!("Failed to mark '{}' executable: {}", candidate.display(), e))?;
    fs::rename(candidate, &destination)
        .map_err(|e| format!("Failed to install '{}': {}", destination.display(), e))?;

    let command = vec![
        destination.to_string_lossy().to_string(),
        "--version".to_string(),
    ];
    match run_command(&command, VERSION_TIMEOUT, None).await {
        Ok(output) if output.success() && !output.stdout.trim().is_empty() => {
            log::info!(
                "yt-dlp updated successfully ({})",
                output.stdout.lines().next().unwrap_or_default().trim()
            );
            Ok(())
        }
        Ok(_) | Err(_) => Err(format!(
            "Installed file is not executable: {}",
            destination.display()
        )),
    }
}
