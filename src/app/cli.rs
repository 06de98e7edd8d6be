use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::SETTINGS_DIR_ENV;
use crate::tracks::TrackScope;

/// ThemeDeck backend: musiques par jeu et récupération audio YouTube.
#[derive(Parser, Debug)]
#[command(name = "themedeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Racine des réglages (par défaut le dossier de données utilisateur)
    #[arg(long, global = true, value_name = "PATH", env = SETTINGS_DIR_ENV)]
    pub settings_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// État de yt-dlp (chemin, origine, version)
    Status,
    /// Installe ou met à jour yt-dlp
    Update,
    /// Recherche des vidéos YouTube
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Résout l'URL du flux audio de pré-écoute
    Preview { url: String },
    /// Télécharge l'audio d'une vidéo comme piste d'une application
    Download {
        #[arg(allow_negative_numbers = true)]
        app_id: i64,
        url: String,
    },
    /// Liste les ids d'applications des profils Steam locaux
    AppIds,
    /// Résout les noms d'applications
    AppNames {
        #[arg(required = true, allow_negative_numbers = true)]
        app_ids: Vec<i64>,
    },
    /// Affiche toutes les pistes
    Tracks,
    /// Gère une piste
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TrackAction {
    Get(ScopeArgs),
    Set {
        #[command(flatten)]
        scope: ScopeArgs,
        path: String,
        /// Nom affiché (par défaut le nom du fichier)
        #[arg(long)]
        filename: Option<String>,
    },
    Volume {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(allow_negative_numbers = true)]
        volume: f64,
    },
    Offset {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },
    Loop {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    Remove(ScopeArgs),
}

/// Portée visée: exactement une option parmi `--app`, `--global`, `--store`.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = true, multiple = false)]
pub struct ScopeArgs {
    #[arg(long, value_name = "APP_ID")]
    app: Option<i64>,
    #[arg(long)]
    global: bool,
    #[arg(long)]
    store: bool,
}

impl ScopeArgs {
    pub fn scope(&self) -> TrackScope {
        match (self.app, self.store) {
            (Some(app_id), _) => TrackScope::App(app_id),
            (None, true) => TrackScope::Store,
            (None, false) => TrackScope::Global,
        }
    }
}
