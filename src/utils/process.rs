use std::collections::HashMap;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Variables héritées de l'hôte qui redirigent les recherches de bibliothèques
/// ou d'interpréteur vers ses propres paquets.
const POISONED_ENV_VARS: [&str; 3] = ["LD_LIBRARY_PATH", "PYTHONHOME", "PYTHONPATH"];

/// Longueur maximale d'un message d'erreur extrait d'une sortie de process.
pub const COMMAND_ERROR_LIMIT: usize = 220;

/// Résultat complet d'un process externe.
#[derive(Clone, Debug, Default)]
pub struct ProcessOutput {
    /// Code de sortie, `-1` si le process a été tué par un signal.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Configure la commande pour éviter l'ouverture d'une fenêtre console sur Windows.
pub fn configure_command_no_window(cmd: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(target_os = "windows"))]
    {
        let _ = cmd;
    }
}

/// Classe une erreur de lancement de process en message lisible.
fn describe_spawn_error(program: &str, error: &std::io::Error) -> String {
    match error.kind() {
        ErrorKind::NotFound => format!("Unable to execute {}: binary not found", program),
        ErrorKind::PermissionDenied => {
            format!("Unable to execute {}: permission denied", program)
        }
        _ => format!("Unable to execute {}: {}", program, error),
    }
}

/// Exécute une commande avec un environnement assaini et un délai maximal.
///
/// Un code de sortie non nul n'est pas une erreur: il est journalisé et
/// renvoyé tel quel, l'appelant décide. Seuls le dépassement de délai et
/// l'impossibilité de lancer le binaire échouent.
pub async fn run_command(
    command: &[String],
    timeout: Duration,
    env: Option<&HashMap<String, String>>,
) -> Result<ProcessOutput> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| Error::ExecutionFailed("Unable to execute an empty command".to_string()))?;
    let command_line = command.join(" ");
    log::info!("Executing command: {}", command_line);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for key in POISONED_ENV_VARS {
        cmd.env_remove(key);
    }
    if let Some(overrides) = env {
        cmd.envs(overrides);
    }
    configure_command_no_window(&mut cmd);

    let child = cmd
        .spawn()
        .map_err(|e| Error::ExecutionFailed(describe_spawn_error(program, &e)))?;

    // Le child est tué à l'abandon du futur si le délai expire.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result
            .map_err(|e| Error::ExecutionFailed(describe_spawn_error(program, &e)))?,
        Err(_) => {
            log::error!(
                "Command timed out after {}s: {}",
                timeout.as_secs(),
                command_line
            );
            return Err(Error::Timeout {
                command: trim_message(&command_line, COMMAND_ERROR_LIMIT),
                seconds: timeout.as_secs(),
            });
        }
    };

    let result = ProcessOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !result.success() {
        log::error!("Command failed rc={}: {}", result.code, command_line);
        if !result.stderr.is_empty() {
            log::error!("stderr: {}", result.stderr);
        }
        if !result.stdout.is_empty() {
            log::error!("stdout: {}", result.stdout);
        }
    }
    Ok(result)
}

/// Retourne la dernière ligne non vide d'un texte.
fn last_non_empty_line(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
}

/// Extrait un message d'erreur lisible depuis la sortie d'un process.
pub fn command_error(output: &ProcessOutput, fallback: &str) -> String {
    last_non_empty_line(&output.stderr)
        .or_else(|| last_non_empty_line(&output.stdout))
        .map(|line| trim_message(line, COMMAND_ERROR_LIMIT))
        .unwrap_or_else(|| fallback.to_string())
}

/// Compacte les espaces et tronque un message à `limit` caractères.
pub fn trim_message(message: &str, limit: usize) -> String {
    let cleaned = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= limit {
        return cleaned;
    }
    let kept: String = cleaned.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn trim_message_collapses_and_truncates() {
        assert_eq!(trim_message("  a \n b\tc ", 20), "a b c");
        let long = "x".repeat(300);
        let trimmed = trim_message(&long, 220);
        assert_eq!(trimmed.chars().count(), 220);
        assert!(trimmed.ends_with("..."));
    }

    #[test]
    fn trim_message_respects_char_boundaries() {
        let text = "é".repeat(50);
        let trimmed = trim_message(&text, 10);
        assert_eq!(trimmed, format!("{}...", "é".repeat(7)));
    }

    #[test]
    fn command_error_prefers_last_stderr_line() {
        let output = ProcessOutput {
            code: 1,
            stdout: "progress\nlast stdout\n".to_string(),
            stderr: "WARNING: x\nERROR: Video unavailable\n\n".to_string(),
        };
        assert_eq!(command_error(&output, "fallback"), "ERROR: Video unavailable");

        let output = ProcessOutput {
            code: 1,
            stdout: "only stdout\n".to_string(),
            stderr: "   \n".to_string(),
        };
        assert_eq!(command_error(&output, "fallback"), "only stdout");

        let output = ProcessOutput {
            code: 1,
            ..Default::default()
        };
        assert_eq!(command_error(&output, "search failed"), "search failed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_streams_and_nonzero_exit() {
        let output = run_command(
            &argv(&["sh", "-c", "echo out; echo err >&2; exit 3"]),
            Duration::from_secs(10),
            None,
        )
        .await
        .unwrap();
        assert_eq!(output.code, 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn applies_env_overrides() {
        let mut env = HashMap::new();
        env.insert("THEMEDECK_PROBE".to_string(), "42".to_string());
        let output = run_command(
            &argv(&["sh", "-c", "echo $THEMEDECK_PROBE"]),
            Duration::from_secs(10),
            Some(&env),
        )
        .await
        .unwrap();
        assert_eq!(output.stdout.trim(), "42");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn strips_poisoned_interpreter_paths() {
        std::env::set_var("PYTHONHOME", "/opt/host/python-home");
        let output = run_command(
            &argv(&["sh", "-c", "echo ${PYTHONHOME:-unset}"]),
            Duration::from_secs(10),
            None,
        )
        .await
        .unwrap();
        std::env::remove_var("PYTHONHOME");
        assert_eq!(output.stdout.trim(), "unset");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn times_out_long_commands() {
        let err = run_command(&argv(&["sleep", "5"]), Duration::from_millis(200), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_binary_is_execution_failure() {
        let err = run_command(
            &argv(&["themedeck-definitely-missing-binary"]),
            Duration::from_secs(5),
            None,
        )
        .await
        .unwrap_err();
        match err {
            Error::ExecutionFailed(message) => assert!(message.contains("not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let err = run_command(&[], Duration::from_secs(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExecutionFailed(_)));
    }
}
