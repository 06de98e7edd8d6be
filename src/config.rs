//! Configuration du backend: racine des réglages, chemins dérivés et délais.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Variable d'environnement fournissant la racine des réglages (équivalent hôte).
pub const SETTINGS_DIR_ENV: &str = "THEMEDECK_SETTINGS_DIR";

/// Délai d'une requête `--version`.
pub const VERSION_TIMEOUT: Duration = Duration::from_secs(20);
/// Délai d'une recherche ou d'une résolution de flux.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(90);
/// Délai d'un téléchargement audio complet.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(900);
/// Délai de création du venv privé.
pub const VENV_CREATE_TIMEOUT: Duration = Duration::from_secs(180);
/// Délai d'une installation pip.
pub const PIP_INSTALL_TIMEOUT: Duration = Duration::from_secs(300);
/// Délai d'un transfert curl/wget du binaire.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(220);
/// Délai du client HTTP intégré pour le binaire.
pub const HTTP_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(90);
/// Délai des appels de métadonnées Steam.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Chemins persistants du backend, tous dérivés de la racine fournie par l'hôte.
#[derive(Clone, Debug)]
pub struct Settings {
    pub settings_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub venv_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub tracks_file: PathBuf,
    pub home_dir: PathBuf,
}

impl Settings {
    /// Construit les chemins à partir d'une racine et d'un dossier utilisateur explicites.
    pub fn new(settings_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        let settings_dir = settings_dir.into();
        Self {
            bin_dir: settings_dir.join("bin"),
            venv_dir: settings_dir.join("ytvenv"),
            downloads_dir: settings_dir.join("downloads"),
            tracks_file: settings_dir.join("tracks.json"),
            home_dir: home_dir.into(),
            settings_dir,
        }
    }

    /// Résout la racine: argument explicite, puis variable d'environnement, puis dossier de données.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let settings_dir = explicit
            .or_else(|| {
                std::env::var_os(SETTINGS_DIR_ENV)
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| dirs::data_dir().map(|dir| dir.join("themedeck")))
            .unwrap_or_else(|| home_dir.join(".themedeck"));
        Self::new(settings_dir, home_dir)
    }

    /// Crée les dossiers attendus au démarrage.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.settings_dir, &self.bin_dir, &self.downloads_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Dossier de téléchargement propre à une application.
    pub fn app_download_dir(&self, app_id: i64) -> PathBuf {
        self.downloads_dir.join(app_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_layout_from_root() {
        let settings = Settings::new("/data/themedeck", "/home/deck");
        assert_eq!(settings.bin_dir, PathBuf::from("/data/themedeck/bin"));
        assert_eq!(settings.venv_dir, PathBuf::from("/data/themedeck/ytvenv"));
        assert_eq!(
            settings.app_download_dir(440),
            PathBuf::from("/data/themedeck/downloads/440")
        );
        assert_eq!(settings.tracks_file, PathBuf::from("/data/themedeck/tracks.json"));
    }

    #[test]
    fn explicit_root_wins() {
        let settings = Settings::resolve(Some(PathBuf::from("/tmp/explicit-root")));
        assert_eq!(settings.settings_dir, PathBuf::from("/tmp/explicit-root"));
    }

    #[test]
    fn ensure_dirs_creates_layout() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::new(temp.path().join("root"), temp.path());
        settings.ensure_dirs().unwrap();
        assert!(settings.bin_dir.is_dir());
        assert!(settings.downloads_dir.is_dir());
    }
}
