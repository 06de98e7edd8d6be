use std::fs;
use std::path::Path;

use crate::config::{PIP_INSTALL_TIMEOUT, VENV_CREATE_TIMEOUT};
use crate::utils::process::{command_error, run_command};

use super::resolver::ToolLayout;

/// Hôtes pip approuvés explicitement (certificats parfois absents sur la cible).
const PIP_TRUSTED_HOSTS: [&str; 2] = ["pypi.org", "files.pythonhosted.org"];

/// Retourne le nom de la commande Python système selon l'OS.
pub(crate) fn get_system_python_cmd() -> &'static str {
    if cfg!(target_os = "windows") {
        "python"
    } else {
        "python3"
    }
}

/// Résout l'interpréteur Python système sur le chemin de recherche.
fn resolve_system_python(layout: &ToolLayout) -> Result<String, String> {
    let name = get_system_python_cmd();
    layout
        .which(name)
        .map(|path| path.to_string_lossy().to_string())
        .ok_or_else(|| format!("{} not found", name))
}

fn trusted_host_args() -> Vec<String> {
    PIP_TRUSTED_HOSTS
        .iter()
        .flat_map(|host| ["--trusted-host".to_string(), host.to_string()])
        .collect()
}

/// Lance une commande et convertit un échec en message de tentative.
async fn run_step(command: Vec<String>, timeout: std::time::Duration, context: &str) -> Result<(), String> {
    let output = run_command(&command, timeout, None)
        .await
        .map_err(|e| format!("{}: {}", context, e))?;
    if output.success() {
        Ok(())
    } else {
        Err(command_error(&output, context))
    }
}

/// Crée le venv privé puis y installe yt-dlp via son propre pip.
pub(crate) async fn install_yt_dlp_in_venv(layout: &ToolLayout) -> Result<(), String> {
    let system_python = resolve_system_python(layout)?;
    if let Some(parent) = layout.venv_dir.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }

    run_step(
        vec![
            system_python,
            "-m".to_string(),
            "venv".to_string(),
            layout.venv_dir.to_string_lossy().to_string(),
        ],
        VENV_CREATE_TIMEOUT,
        "venv creation failed",
    )
    .await?;

    let venv_python = layout.venv_python();
    if !venv_python.exists() {
        return Err(format!("venv python not found at {}", venv_python.display()));
    }

    let mut install = vec![
        venv_python.to_string_lossy().to_string(),
        "-m".to_string(),
        "pip".to_string(),
        "install".to_string(),
        "--upgrade".to_string(),
        "pip".to_string(),
        "yt-dlp".to_string(),
    ];
    install.extend(trusted_host_args());
    run_step(install, PIP_INSTALL_TIMEOUT, "venv pip install failed").await?;

    expect_file(&layout.venv_yt_dlp())
}

/// Installe yt-dlp dans le site utilisateur via le pip système.
pub(crate) async fn install_yt_dlp_with_pip(layout: &ToolLayout) -> Result<(), String> {
    let system_python = resolve_system_python(layout)?;
    let mut install = vec![
        system_python,
        "-m".to_string(),
        "pip".to_string(),
        "install".to_string(),
        "--upgrade".to_string(),
        "--user".to_string(),
        "yt-dlp".to_string(),
    ];
    install.extend(trusted_host_args());
    run_step(install, PIP_INSTALL_TIMEOUT, "pip install failed").await
}

fn expect_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        Ok(())
    } else {
        Err(format!("yt-dlp not found at {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_layout(temp: &tempfile::TempDir) -> ToolLayout {
        let empty_path = temp.path().join("empty-path");
        fs::create_dir_all(&empty_path).unwrap();
        ToolLayout {
            venv_dir: temp.path().join("ytvenv"),
            bin_dir: temp.path().join("bin"),
            home_dir: temp.path().join("home"),
            search_path: Some(empty_path.into_os_string()),
        }
    }

    #[test]
    fn trusted_hosts_are_paired() {
        assert_eq!(
            trusted_host_args(),
            vec![
                "--trusted-host",
                "pypi.org",
                "--trusted-host",
                "files.pythonhosted.org"
            ]
        );
    }

    #[tokio::test]
    async fn venv_install_reports_missing_python() {
        let temp = tempfile::tempdir().unwrap();
        let err = install_yt_dlp_in_venv(&empty_layout(&temp)).await.unwrap_err();
        assert!(err.ends_with("not found"));
        assert!(!temp.path().join("ytvenv").exists());
    }

    #[tokio::test]
    async fn pip_install_reports_missing_python() {
        let temp = tempfile::tempdir().unwrap();
        let err = install_yt_dlp_with_pip(&empty_layout(&temp)).await.unwrap_err();
        assert_eq!(err, format!("{} not found", get_system_python_cmd()));
    }
}
