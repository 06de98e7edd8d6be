use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Settings;
use crate::error::{Error, Result};

/// Nom du binaire recherché.
pub const YT_DLP: &str = "yt-dlp";

/// Message renvoyé au frontend quand aucun yt-dlp n'est disponible.
pub const TOOL_UNAVAILABLE_HINT: &str =
    "yt-dlp is not available. Use the ThemeDeck install/update button.";

/// Origine du yt-dlp retenu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Environnement Python privé du plugin.
    Venv,
    /// `PATH` système.
    System,
    /// Installation utilisateur (`~/.local/bin`).
    User,
    /// Binaire autonome téléchargé par le plugin.
    Local,
    None,
}

impl Provenance {
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Venv => "venv",
            Self::System => "system",
            Self::User => "user",
            Self::Local => "local",
            Self::None => "none",
        }
    }
}

/// Ligne de commande et environnement nécessaires pour lancer yt-dlp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationDescriptor {
    pub command: Vec<String>,
    pub env: Option<HashMap<String, String>>,
    pub source: Provenance,
    pub path: String,
}

impl InvocationDescriptor {
    fn from_path(path: &Path, source: Provenance) -> Self {
        let path = path.to_string_lossy().to_string();
        Self {
            command: vec![path.clone()],
            env: None,
            source,
            path,
        }
    }

    /// Construit la ligne de commande complète en ajoutant `args`.
    pub fn command_with<I, S>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut command = self.command.clone();
        command.extend(args.into_iter().map(Into::into));
        command
    }
}

/// Emplacements connus où yt-dlp peut se trouver.
#[derive(Clone, Debug)]
pub struct ToolLayout {
    pub venv_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub home_dir: PathBuf,
    /// Chemin de recherche à utiliser à la place de `PATH` (tests).
    pub search_path: Option<OsString>,
}

impl ToolLayout {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            venv_dir: settings.venv_dir.clone(),
            bin_dir: settings.bin_dir.clone(),
            home_dir: settings.home_dir.clone(),
            search_path: None,
        }
    }

    pub fn venv_bin_dir(&self) -> PathBuf {
        if cfg!(target_os = "windows") {
            self.venv_dir.join("Scripts")
        } else {
            self.venv_dir.join("bin")
        }
    }

    pub fn venv_python(&self) -> PathBuf {
        self.venv_bin_dir().join(exe_name("python"))
    }

    pub fn venv_yt_dlp(&self) -> PathBuf {
        self.venv_bin_dir().join(exe_name(YT_DLP))
    }

    pub fn user_yt_dlp(&self) -> PathBuf {
        self.home_dir.join(".local").join("bin").join(exe_name(YT_DLP))
    }

    pub fn local_yt_dlp(&self) -> PathBuf {
        self.bin_dir.join(exe_name(YT_DLP))
    }

    /// Cherche un exécutable sur le chemin de recherche configuré.
    pub fn which(&self, name: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
                which::which_in(name, Some(paths), cwd).ok()
            }
            None => which::which(name).ok(),
        }
    }
}

pub(crate) fn exe_name(base: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{base}.exe")
    } else {
        base.to_string()
    }
}

/// Indique si le chemin est un fichier exécutable.
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Ajoute les bits d'exécution au fichier si absents.
#[cfg(unix)]
pub fn ensure_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    let mode = permissions.mode();
    if mode & 0o111 == 0 {
        permissions.set_mode(mode | 0o755);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn ensure_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Une sonde de localisation, évaluée dans l'ordre de `PROBE_ORDER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    Venv,
    SystemPath,
    UserLocal,
    LocalBinary,
}

const PROBE_ORDER: [Probe; 4] = [
    Probe::Venv,
    Probe::SystemPath,
    Probe::UserLocal,
    Probe::LocalBinary,
];

impl Probe {
    fn run(self, layout: &ToolLayout) -> Option<InvocationDescriptor> {
        let (path, source) = match self {
            Self::Venv => (layout.venv_yt_dlp(), Provenance::Venv),
            Self::SystemPath => {
                let found = layout.which(YT_DLP)?;
                return Some(InvocationDescriptor::from_path(&found, Provenance::System));
            }
            Self::UserLocal => (layout.user_yt_dlp(), Provenance::User),
            Self::LocalBinary => (layout.local_yt_dlp(), Provenance::Local),
        };
        is_executable(&path).then(|| InvocationDescriptor::from_path(&path, source))
    }
}

/// Localise yt-dlp sans jamais rien installer ni écrire.
#[derive(Clone, Debug)]
pub struct ToolLocator {
    layout: ToolLayout,
}

impl ToolLocator {
    pub fn new(layout: ToolLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ToolLayout {
        &self.layout
    }

    /// Retourne la première invocation trouvée, recalculée à chaque appel.
    pub fn locate(&self) -> Option<InvocationDescriptor> {
        PROBE_ORDER.iter().find_map(|probe| probe.run(&self.layout))
    }

    /// Comme `locate`, mais échoue avec un message actionnable.
    pub fn require(&self) -> Result<InvocationDescriptor> {
        self.locate()
            .ok_or_else(|| Error::ToolUnavailable(TOOL_UNAVAILABLE_HINT.to_string()))
    }
}
