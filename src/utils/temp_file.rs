use std::fs;
use std::path::{Path, PathBuf};

/// Garde RAII qui supprime un fichier temporaire encore présent à la sortie de scope.
///
/// Une fois le fichier renommé à sa place définitive, la suppression échoue
/// silencieusement: la garde n'a rien à nettoyer.
pub struct TempFileGuard(PathBuf);

impl TempFileGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Supprime le fichier maintenant, sans attendre la fin du scope.
    pub fn discard(&self) {
        if self.0.exists() {
            if let Err(e) = fs::remove_file(&self.0) {
                log::warn!("Failed to remove temp file {}: {}", self.0.display(), e);
            }
        }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        self.discard();
    }
}
