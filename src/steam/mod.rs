//! Données Steam locales et résolution des noms d'applications.

mod localconfig;
mod store;

pub use localconfig::{read_localconfig_app_ids, scan_localconfig, step, userdata_roots, ScanState};
pub use store::{
    canonical_app_id, clean_community_title, extract_community_title, normalize_app_ids,
    parse_appdetails_name, StoreClient,
};
