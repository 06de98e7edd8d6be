use crate::binaries::{AcquisitionChain, ToolStatus};
use crate::config::Settings;
use crate::error::Result;
use crate::youtube::YtDlp;

/// État courant de yt-dlp; ne modifie rien.
pub async fn get_yt_dlp_status(settings: &Settings) -> ToolStatus {
    let yt_dlp = YtDlp::new(settings);
    let Some(invocation) = yt_dlp.locator().locate() else {
        return ToolStatus::missing();
    };
    let version = yt_dlp.version(&invocation).await.unwrap_or_default();
    ToolStatus {
        installed: true,
        path: invocation.path,
        source: invocation.source,
        version,
    }
}

/// Installe ou met à jour yt-dlp par la chaîne complète, puis retourne l'état.
pub async fn update_yt_dlp(settings: &Settings) -> Result<ToolStatus> {
    tokio::fs::create_dir_all(&settings.bin_dir).await?;
    let yt_dlp = YtDlp::new(settings);
    let chain = AcquisitionChain::standard(yt_dlp.locator().clone());
    if let Err(e) = chain.ensure_installed().await {
        log::error!("Failed to update yt-dlp: {}", e);
        return Err(e);
    }
    let status = get_yt_dlp_status(settings).await;
    if !status.version.is_empty() {
        log::info!("yt-dlp available via {} ({})", status.source.as_key(), status.version);
    }
    Ok(status)
}
