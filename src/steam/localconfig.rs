use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

/// Seule section considérée fiable; `apptickets` contient des alias.
const TARGET_SECTION: &str = "apps";

lazy_static! {
    static ref SECTION_NAME: Regex = Regex::new(r#"^"([^"]+)"$"#).unwrap();
    static ref APP_ENTRY: Regex = Regex::new(r#"^"(\d{1,7})""#).unwrap();
}

/// Position du scanner dans le texte VDF.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    /// Hors de la section cible.
    Outside,
    /// Nom de section vu, accolade ouvrante attendue.
    Pending,
    /// Dans la section, `depth` accolades ouvertes.
    Inside { depth: u32 },
}

fn is_target_header(line: &str) -> bool {
    SECTION_NAME
        .captures(line)
        .and_then(|captures| captures.get(1))
        .is_some_and(|name| name.as_str().eq_ignore_ascii_case(TARGET_SECTION))
}

/// Avance d'une ligne déjà nettoyée; retourne le nouvel état et l'id éventuel.
pub fn step(state: ScanState, line: &str) -> (ScanState, Option<u32>) {
    match state {
        ScanState::Outside | ScanState::Pending if is_target_header(line) => {
            (ScanState::Pending, None)
        }
        ScanState::Pending if line == "{" => (ScanState::Inside { depth: 1 }, None),
        ScanState::Outside | ScanState::Pending => (ScanState::Outside, None),
        ScanState::Inside { depth } => match line {
            "{" => (ScanState::Inside { depth: depth + 1 }, None),
            "}" if depth <= 1 => (ScanState::Outside, None),
            "}" => (ScanState::Inside { depth: depth - 1 }, None),
            _ if depth == 1 => {
                let app_id = APP_ENTRY
                    .captures(line)
                    .and_then(|captures| captures.get(1))
                    .and_then(|id| id.as_str().parse::<u32>().ok())
                    .filter(|id| *id > 0);
                (state, app_id)
            }
            _ => (state, None),
        },
    }
}

/// Extrait les ids d'application des entrées directes de la section `apps`.
pub fn scan_localconfig(text: &str) -> BTreeSet<u32> {
    let mut state = ScanState::Outside;
    let mut app_ids = BTreeSet::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let (next, app_id) = step(state, line);
        state = next;
        app_ids.extend(app_id);
    }
    app_ids
}

/// Racines `userdata` connues de Steam sous Linux.
pub fn userdata_roots(home: &Path) -> [PathBuf; 2] {
    [
        home.join(".local").join("share").join("Steam").join("userdata"),
        home.join(".steam").join("steam").join("userdata"),
    ]
}

fn scan_file(path: &Path) -> BTreeSet<u32> {
    match fs::read(path) {
        Ok(bytes) => scan_localconfig(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            log::error!("Failed reading localconfig {}: {}", path.display(), e);
            BTreeSet::new()
        }
    }
}

fn scan_root(root: &Path) -> std::io::Result<BTreeSet<u32>> {
    let mut app_ids = BTreeSet::new();
    for entry in fs::read_dir(root)?.flatten() {
        let user_dir = entry.path();
        if !user_dir.is_dir() {
            continue;
        }
        let localconfig = user_dir.join("config").join("localconfig.vdf");
        if localconfig.is_file() {
            app_ids.extend(scan_file(&localconfig));
        }
    }
    Ok(app_ids)
}

/// Union triée des ids de tous les profils Steam locaux.
pub fn read_localconfig_app_ids(home: &Path) -> Vec<u32> {
    let mut app_ids = BTreeSet::new();
    for root in userdata_roots(home) {
        if !root.exists() {
            continue;
        }
        match scan_root(&root) {
            Ok(found) => app_ids.extend(found),
            Err(e) => log::error!("Failed scanning localconfig under {}: {}", root.display(), e),
        }
    }
    app_ids.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
"UserLocalConfigStore"
{
	"Software"
	{
		"Valve"
		{
			"Steam"
			{
				"apps"
				{
					"440"
					{
						"LastPlayed"		"1700000000"
						"1234"		"nested value"
					}
					"570"
					{
					}
				}
				"apptickets"
				{
					"9999"		"ticket"
				}
			}
		}
	}
}
"#;

    #[test]
    fn only_direct_apps_entries_are_collected() {
        let ids: Vec<u32> = scan_localconfig(SAMPLE).into_iter().collect();
        assert_eq!(ids, vec![440, 570]);
    }

    #[test]
    fn header_is_case_insensitive() {
        let text = "\"Apps\"\n{\n\"10\"\n{\n}\n}\n";
        assert_eq!(scan_localconfig(text).into_iter().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn header_without_brace_is_dropped() {
        let text = "\"apps\"\n\"440\"\n{\n\"20\"\n}\n";
        assert!(scan_localconfig(text).is_empty());
    }

    #[test]
    fn zero_and_long_ids_are_ignored() {
        let text = "\"apps\"\n{\n\"0\"\n\"12345678\"\n\"7\"\t\"x\"\n}\n";
        assert_eq!(scan_localconfig(text).into_iter().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn step_transitions() {
        assert_eq!(step(ScanState::Outside, "\"apps\""), (ScanState::Pending, None));
        assert_eq!(step(ScanState::Pending, "\"apps\""), (ScanState::Pending, None));
        assert_eq!(step(ScanState::Pending, "\"other\""), (ScanState::Outside, None));
        assert_eq!(step(ScanState::Pending, "{"), (ScanState::Inside { depth: 1 }, None));
        assert_eq!(
            step(ScanState::Inside { depth: 1 }, "\"440\""),
            (ScanState::Inside { depth: 1 }, Some(440))
        );
        assert_eq!(
            step(ScanState::Inside { depth: 2 }, "\"440\""),
            (ScanState::Inside { depth: 2 }, None)
        );
        assert_eq!(step(ScanState::Inside { depth: 1 }, "}"), (ScanState::Outside, None));
    }

    #[test]
    fn unions_profiles_across_roots() {
        let home = tempfile::tempdir().unwrap();
        let [first, second] = userdata_roots(home.path());
        for (root, user, body) in [
            (&first, "111", "\"apps\"\n{\n\"440\"\n{\n}\n}\n"),
            (&first, "222", "\"apps\"\n{\n\"570\"\n{\n}\n}\n"),
            (&second, "333", "\"apps\"\n{\n\"440\"\n{\n}\n\"20\"\n{\n}\n}\n"),
        ] {
            let config = root.join(user).join("config");
            fs::create_dir_all(&config).unwrap();
            fs::write(config.join("localconfig.vdf"), body).unwrap();
        }
        fs::create_dir_all(first.join("444")).unwrap();

        assert_eq!(read_localconfig_app_ids(home.path()), vec![20, 440, 570]);
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let home = tempfile::tempdir().unwrap();
        let config = userdata_roots(home.path())[0].join("1").join("config");
        fs::create_dir_all(&config).unwrap();
        let mut body = b"\"apps\"\n{\n\"\xff\xfe\"\n\"440\"\n{\n}\n}\n".to_vec();
        body.push(b'\n');
        fs::write(config.join("localconfig.vdf"), body).unwrap();
        assert_eq!(read_localconfig_app_ids(home.path()), vec![440]);
    }

    #[test]
    fn missing_roots_yield_nothing() {
        let home = tempfile::tempdir().unwrap();
        assert!(read_localconfig_app_ids(home.path()).is_empty());
    }
}
