/// État et mise à jour de yt-dlp.
pub mod tools;
/// Recherche, pré-écoute et téléchargement YouTube.
pub mod youtube;
/// Ids et noms d'applications Steam.
pub mod steam;
/// Registre des pistes.
pub mod tracks;
