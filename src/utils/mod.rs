/// Utilitaires transverses de normalisation de chemins.
pub mod path;
/// Lanceur de process externes avec environnement assaini et délai.
pub mod process;
/// Utilitaires transverses de gestion de fichiers temporaires.
pub mod temp_file;
