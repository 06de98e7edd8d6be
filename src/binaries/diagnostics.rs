use serde::Serialize;

use crate::utils::process::trim_message;

use super::resolver::Provenance;

/// Longueur maximale d'une tentative dans le résumé final.
pub const ATTEMPT_ERROR_LIMIT: usize = 220;
/// Longueur maximale du résumé complet.
pub const SUMMARY_LIMIT: usize = 280;
const SEPARATOR: &str = "; ";

/// Décrit une tentative d'installation ratée.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AcquisitionAttempt {
    /// Nom de la stratégie (`venv`, `download`, `pip`).
    pub strategy: String,
    /// Raison de l'échec, déjà bornée.
    pub error: String,
}

impl AcquisitionAttempt {
    pub fn new(strategy: &str, error: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            error: trim_message(error, ATTEMPT_ERROR_LIMIT),
        }
    }
}

/// Joint les tentatives en un résumé borné qui conserve chaque nom de stratégie.
pub fn summarize_attempts(attempts: &[AcquisitionAttempt]) -> String {
    if attempts.is_empty() {
        return "no installation strategy was attempted".to_string();
    }

    let separators = SEPARATOR.len() * (attempts.len() - 1);
    let budget = (SUMMARY_LIMIT.saturating_sub(separators) / attempts.len()).min(ATTEMPT_ERROR_LIMIT);
    attempts
        .iter()
        .map(|attempt| {
            let prefix = format!("{}: ", attempt.strategy);
            let room = budget.saturating_sub(prefix.chars().count()).max(4);
            format!("{}{}", prefix, trim_message(&attempt.error, room))
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// État de yt-dlp exposé au frontend.
#[derive(Clone, Debug, Serialize)]
pub struct ToolStatus {
    pub installed: bool,
    pub path: String,
    pub source: Provenance,
    pub version: String,
}

impl ToolStatus {
    pub fn missing() -> Self {
        Self {
            installed: false,
            path: String::new(),
            source: Provenance::None,
            version: String::new(),
        }
    }
}
