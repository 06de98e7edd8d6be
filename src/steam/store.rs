use std::collections::{BTreeMap, BTreeSet};

use futures_util::stream::{self, StreamExt};
use lazy_static::lazy_static;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::METADATA_TIMEOUT;
use crate::error::Result;

const APPDETAILS_URL: &str = "https://store.steampowered.com/api/appdetails";
const COMMUNITY_APP_URL: &str = "https://steamcommunity.com/app";
const STORE_USER_AGENT: &str = "ThemeDeck/2.5.0 (+Decky Loader)";
const COMMUNITY_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) ThemeDeck/2.5.0";
const CHUNK_SIZE: usize = 20;
const COMMUNITY_CONCURRENCY: usize = 2;

/// Titres de pages d'erreur à ne jamais retenir comme nom.
const PLACEHOLDER_TITLES: [&str; 3] = ["steam community", "error", "access denied"];

lazy_static! {
    static ref CANONICAL_APP: Regex = Regex::new(r"(?i)/app/(\d+)").unwrap();
    static ref OG_TITLE: Regex = Regex::new(
        r#"(?i)<meta[^>]+property=["']og:title["'][^>]+content=["']([^"']+)["']"#
    )
    .unwrap();
    static ref HTML_TITLE: Regex = Regex::new(r"(?is)<title>(.*?)</title>").unwrap();
    static ref COMMUNITY_PREFIX: Regex = Regex::new(r"(?i)^\s*Steam Community\s*::\s*").unwrap();
    static ref ON_STEAM_SUFFIX: Regex = Regex::new(r"(?i)\s+on\s+Steam\s*$").unwrap();
    static ref COMMUNITY_SUFFIX: Regex = Regex::new(r"(?i)\s*::\s*Steam Community\s*$").unwrap();
    static ref HTML_ENTITY: Regex = Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap();
}

/// Nom d'application dans une réponse `appdetails` (`{"<id>": {"success", "data": {"name"}}}`).
pub fn parse_appdetails_name(payload: &Value, app_id: u32) -> Option<String> {
    let entry = payload.get(app_id.to_string())?;
    if !entry.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    let name = entry.get("data")?.get("name")?.as_str()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Id canonique présent dans l'URL finale après redirection.
pub fn canonical_app_id(final_url: &str) -> Option<u32> {
    CANONICAL_APP
        .captures(final_url)
        .and_then(|captures| captures[1].parse::<u32>().ok())
        .filter(|id| *id > 0)
}

/// Décode chaque entité HTML isolément; une entité inconnue reste telle quelle.
fn unescape_html(text: &str) -> String {
    HTML_ENTITY
        .replace_all(text, |captures: &Captures| {
            let entity = &captures[0];
            match unescape_with(entity, resolve_html5_entity) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => entity.to_string(),
            }
        })
        .into_owned()
}

/// Nettoie un titre de page communautaire; `None` pour une page d'erreur.
pub fn clean_community_title(raw: &str) -> Option<String> {
    let title = unescape_html(raw);
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    let cleaned = COMMUNITY_PREFIX.replace(title, "");
    let cleaned = ON_STEAM_SUFFIX.replace(&cleaned, "");
    let cleaned = COMMUNITY_SUFFIX.replace(&cleaned, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || PLACEHOLDER_TITLES.contains(&cleaned.to_lowercase().as_str()) {
        return None;
    }
    Some(cleaned.to_string())
}

/// Titre d'une page communautaire: `og:title`, sinon `<title>`.
pub fn extract_community_title(html: &str) -> Option<String> {
    let raw = OG_TITLE
        .captures(html)
        .or_else(|| HTML_TITLE.captures(html))
        .map(|captures| captures[1].to_string())?;
    clean_community_title(&raw)
}

/// Ids uniques, positifs et triés.
pub fn normalize_app_ids(app_ids: &[i64]) -> Vec<u32> {
    app_ids
        .iter()
        .filter_map(|id| u32::try_from(*id).ok())
        .filter(|id| *id > 0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Client des métadonnées Steam (boutique puis communauté).
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    appdetails_url: String,
    community_url: String,
}

impl StoreClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoints(APPDETAILS_URL, COMMUNITY_APP_URL)
    }

    /// Client pointé vers d'autres points d'accès (miroir, serveur local).
    pub fn with_endpoints(appdetails_url: &str, community_url: &str) -> Result<Self> {
        // Les appareils cibles ont parfois un magasin de certificats incomplet.
        let http = reqwest::Client::builder()
            .timeout(METADATA_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            http,
            appdetails_url: appdetails_url.trim_end_matches('/').to_string(),
            community_url: community_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_appdetails_name(&self, app_id: u32) -> Result<Option<String>> {
        let app_id_param = app_id.to_string();
        let payload: Value = self
            .http
            .get(&self.appdetails_url)
            .query(&[
                ("appids", app_id_param.as_str()),
                ("filters", "basic"),
                ("l", "english"),
            ])
            .header(USER_AGENT, STORE_USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_appdetails_name(&payload, app_id))
    }

    /// Nom boutique d'un id; toute erreur réseau vaut "non résolu".
    async fn store_name(&self, app_id: u32) -> Option<String> {
        match self.fetch_appdetails_name(app_id).await {
            Ok(name) => name,
            Err(e) => {
                log::debug!("appdetails lookup failed ({}): {}", app_id, e);
                None
            }
        }
    }

    async fn resolve_chunk(&self, chunk: &[u32]) -> BTreeMap<String, String> {
        let mut resolved = BTreeMap::new();
        for app_id in chunk {
            if let Some(name) = self.store_name(*app_id).await {
                resolved.insert(app_id.to_string(), name);
            }
        }
        resolved
    }

    /// Repli par la page communautaire; un 429 est ignoré silencieusement.
    async fn community_name(&self, app_id: u32) -> Result<Option<String>> {
        let response = self
            .http
            .get(format!("{}/{}/", self.community_url, app_id))
            .query(&[("l", "english")])
            .header(USER_AGENT, COMMUNITY_USER_AGENT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        let final_url = response.url().to_string();
        let html = response.text().await?;

        // Un id alias redirige vers l'application canonique.
        if let Some(canonical) = canonical_app_id(&final_url) {
            if let Some(name) = self.store_name(canonical).await {
                return Ok(Some(name));
            }
        }
        Ok(extract_community_title(&html))
    }

    /// Résout les noms d'applications, clé = id en texte; les ids non résolus sont absents.
    pub async fn resolve_names(&self, app_ids: &[i64]) -> BTreeMap<String, String> {
        let unique_ids = normalize_app_ids(app_ids);
        let mut resolved = BTreeMap::new();
        if unique_ids.is_empty() {
            return resolved;
        }

        for chunk in unique_ids.chunks(CHUNK_SIZE) {
            let found = self.resolve_chunk(chunk).await;
            if found.len() < chunk.len() {
                log::debug!(
                    "appdetails chunk {}..{} resolved {}/{}",
                    chunk[0],
                    chunk[chunk.len() - 1],
                    found.len(),
                    chunk.len()
                );
            }
            resolved.extend(found);
        }

        let unresolved: Vec<u32> = unique_ids
            .into_iter()
            .filter(|id| !resolved.contains_key(&id.to_string()))
            .collect();
        if unresolved.is_empty() {
            return resolved;
        }
        log::info!(
            "resolve_store_app_names falling back for {} app ids",
            unresolved.len()
        );

        let community: Vec<(u32, Option<String>)> = stream::iter(unresolved)
            .map(|app_id| async move {
                match self.community_name(app_id).await {
                    Ok(name) => (app_id, name),
                    Err(e) => {
                        log::error!("community name lookup failed ({}): {}", app_id, e);
                        (app_id, None)
                    }
                }
            })
            .buffer_unordered(COMMUNITY_CONCURRENCY)
            .collect()
            .await;
        for (app_id, name) in community {
            if let Some(name) = name {
                resolved.insert(app_id.to_string(), name);
            }
        }
        resolved
    }
}
