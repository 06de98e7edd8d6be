use async_trait::async_trait;

use crate::error::{Error, Result};

use super::diagnostics::{summarize_attempts, AcquisitionAttempt};
use super::download::download_yt_dlp_binary;
use super::python_env::{install_yt_dlp_in_venv, install_yt_dlp_with_pip};
use super::resolver::{InvocationDescriptor, ToolLayout, ToolLocator};

/// Une façon autonome de rendre yt-dlp disponible.
#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    /// Nom court repris dans le résumé d'échec.
    fn name(&self) -> &'static str;

    /// Tente l'installation; l'erreur est un message déjà lisible.
    async fn attempt(&self, layout: &ToolLayout) -> std::result::Result<(), String>;
}

/// Venv Python privé sous la racine des réglages.
pub struct VenvStrategy;

#[async_trait]
impl AcquisitionStrategy for VenvStrategy {
    fn name(&self) -> &'static str {
        "venv"
    }

    async fn attempt(&self, layout: &ToolLayout) -> std::result::Result<(), String> {
        install_yt_dlp_in_venv(layout).await
    }
}

/// Binaire autonome téléchargé depuis les miroirs de release.
pub struct BinaryDownloadStrategy;

#[async_trait]
impl AcquisitionStrategy for BinaryDownloadStrategy {
    fn name(&self) -> &'static str {
        "download"
    }

    async fn attempt(&self, layout: &ToolLayout) -> std::result::Result<(), String> {
        download_yt_dlp_binary(layout).await
    }
}

/// Paquet utilisateur installé par le pip système.
pub struct UserPipStrategy;

#[async_trait]
impl AcquisitionStrategy for UserPipStrategy {
    fn name(&self) -> &'static str {
        "pip"
    }

    async fn attempt(&self, layout: &ToolLayout) -> std::result::Result<(), String> {
        install_yt_dlp_with_pip(layout).await
    }
}

/// Chaîne ordonnée de stratégies d'installation, évaluée jusqu'au premier succès.
pub struct AcquisitionChain {
    locator: ToolLocator,
    strategies: Vec<Box<dyn AcquisitionStrategy>>,
}

impl AcquisitionChain {
    pub fn new(locator: ToolLocator, strategies: Vec<Box<dyn AcquisitionStrategy>>) -> Self {
        Self {
            locator,
            strategies,
        }
    }

    /// Chaîne complète: venv, puis binaire téléchargé, puis pip utilisateur.
    pub fn standard(locator: ToolLocator) -> Self {
        Self::new(
            locator,
            vec![
                Box::new(VenvStrategy),
                Box::new(BinaryDownloadStrategy),
                Box::new(UserPipStrategy),
            ],
        )
    }

    /// Installe ou met à jour yt-dlp; échoue seulement si rien n'est localisable ensuite.
    pub async fn ensure_installed(&self) -> Result<InvocationDescriptor> {
        let layout = self.locator.layout();
        let mut attempts: Vec<AcquisitionAttempt> = Vec::new();

        for strategy in &self.strategies {
            log::info!("Trying yt-dlp installation strategy '{}'", strategy.name());
            match strategy.attempt(layout).await {
                Ok(()) => {
                    log::info!("yt-dlp installation strategy '{}' succeeded", strategy.name());
                    break;
                }
                Err(error) => {
                    log::error!(
                        "yt-dlp installation strategy '{}' failed: {}",
                        strategy.name(),
                        error
                    );
                    attempts.push(AcquisitionAttempt::new(strategy.name(), &error));
                }
            }
        }

        if let Some(invocation) = self.locator.locate() {
            log::info!(
                "yt-dlp available via {} ({})",
                invocation.source.as_key(),
                invocation.path
            );
            return Ok(invocation);
        }

        if attempts.len() < self.strategies.len() {
            return Err(Error::AcquisitionFailed(
                "yt-dlp installation completed but executable was not found".to_string(),
            ));
        }
        Err(Error::AcquisitionFailed(format!(
            "Failed to install yt-dlp: {}",
            summarize_attempts(&attempts)
        )))
    }
}
