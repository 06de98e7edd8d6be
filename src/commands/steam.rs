use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Settings;
use crate::error::Result;
use crate::steam::{read_localconfig_app_ids, StoreClient};

#[derive(Debug, Serialize)]
pub struct LocalConfigApps {
    pub app_ids: Vec<u32>,
}

/// Ids d'applications lus dans tous les `localconfig.vdf` locaux.
pub async fn get_localconfig_app_ids(settings: &Settings) -> Result<LocalConfigApps> {
    let home = settings.home_dir.clone();
    let app_ids = tokio::task::spawn_blocking(move || read_localconfig_app_ids(&home))
        .await
        .map_err(std::io::Error::other)?;
    Ok(LocalConfigApps { app_ids })
}

/// Noms d'affichage des applications, indexés par id en texte.
pub async fn resolve_store_app_names(app_ids: &[i64]) -> Result<BTreeMap<String, String>> {
    let client = StoreClient::new()?;
    Ok(client.resolve_names(app_ids).await)
}
