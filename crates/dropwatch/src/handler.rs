use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::config::HandlerCommand;

/// Build the handler command with the configured leading args plus the
/// item's positional args. Handlers run with null stdio; they own their own
/// progress reporting and retries.
fn build_command(handler: &HandlerCommand, item_args: &[&str]) -> Command {
    let mut command = Command::new(&handler.program);
    command
        .args(&handler.args)
        .args(item_args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

/// Run a handler to completion, blocking the caller until it exits.
pub fn run_blocking(handler: &HandlerCommand, item_args: &[&str]) -> std::io::Result<ExitStatus> {
    build_command(handler, item_args).status()
}

/// Launch a handler as a detached subprocess and hand back its child handle.
pub fn spawn_detached(handler: &HandlerCommand, item_args: &[&str]) -> std::io::Result<Child> {
    build_command(handler, item_args).spawn()
}

/// Resolve a handler program the way the shell would: an explicit path is
/// checked directly, a bare name is searched on PATH.
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|full| full.is_file())
}
