//! Backend ThemeDeck: pistes musicales par jeu Steam et récupération audio YouTube.
//!
//! Le binaire `themedeck` reste mince: il délègue à `app::run()`, qui analyse
//! la ligne de commande puis appelle les opérations de `commands`.

mod app;
pub mod binaries;
pub mod commands;
pub mod config;
pub mod error;
pub mod steam;
pub mod tracks;
pub mod utils;
pub mod youtube;

pub use error::{Error, Result};

/// Lance le backend en ligne de commande.
pub fn run() -> std::process::ExitCode {
    app::run()
}
