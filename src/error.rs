//! Type d'erreur unique du backend.
//!
//! Chaque variante porte un message court, directement affichable côté
//! frontend. Les échecs intermédiaires de la chaîne d'installation ne
//! remontent jamais seuls: ils sont agrégés dans `AcquisitionFailed`.

/// Erreur du backend ThemeDeck.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Aucun yt-dlp utilisable n'a été trouvé.
    #[error("{0}")]
    ToolUnavailable(String),

    /// Toutes les stratégies d'installation ont échoué.
    #[error("{0}")]
    AcquisitionFailed(String),

    #[error("Command timed out after {seconds}s: {command}")]
    Timeout { command: String, seconds: u64 },

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("{0}")]
    InvalidQuery(String),

    #[error("Invalid app id: {0}")]
    InvalidAppId(i64),

    #[error("{0}")]
    UnsupportedHost(String),

    #[error("yt-dlp did not return a playable preview stream URL")]
    NoPlayableStream,

    #[error("Download completed but no audio file was found")]
    DownloadIncomplete,

    #[error("No track found for {0}")]
    TrackNotFound(String),

    #[error("{0}")]
    InvalidTrack(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidAppId(-4);
        assert_eq!(err.to_string(), "Invalid app id: -4");

        let err = Error::Timeout {
            command: "yt-dlp --version".to_string(),
            seconds: 20,
        };
        assert_eq!(err.to_string(), "Command timed out after 20s: yt-dlp --version");

        let err = Error::UnsupportedHost("Only YouTube links are supported".to_string());
        assert_eq!(err.to_string(), "Only YouTube links are supported");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
