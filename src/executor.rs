//! Spawning parsed commands as child processes.
//!
//! The executor resolves the program name, wires the requested output
//! redirection onto the child before it starts, and either waits for the
//! child (foreground) or hands its handle back to the caller (background)
//! so the shell loop can reap it later.

use crate::command::{Command, ExitCode, Redirect};
use crate::env::Environment;
use crate::external::find_executable;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, ExitStatus, Stdio};
use thiserror::Error;

/// Upper bound on the output captured by a reverse redirect.
///
/// Output beyond the bound is drained from the pipe and discarded, so the
/// child can run to completion instead of blocking on a full pipe, and the
/// reversed bytes written to the target are truncated to this size.
pub const REVERSE_BUF_LIMIT: u64 = 64 * 1024;

/// Failures local to one command execution; the shell loop reports them
/// and keeps running.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command not found: {0}")]
    NotFound(String),
    #[error("cannot open `{path}` for redirection: {source}")]
    RedirectTarget { path: PathBuf, source: io::Error },
    #[error("failed to start `{program}`: {source}")]
    Spawn { program: PathBuf, source: io::Error },
    #[error("failed to capture command output: {0}")]
    Pipe(io::Error),
    #[error("failed to wait for command: {0}")]
    Wait(io::Error),
}

/// What became of a spawned command.
pub enum ExitDisposition {
    /// Foreground command that ran to completion.
    Exited(ExitCode),
    /// Background command; the handle is returned unreaped.
    Background(Child),
}

/// Resolves and spawns `cmd`, honoring its redirect and background flags.
///
/// Foreground commands are waited on, including the full relay chain of a
/// reverse redirect. Background commands return immediately with the child
/// handle; for a background reverse redirect the relay keeps running on a
/// detached thread until the pipe closes.
pub fn execute(cmd: &Command, env: &Environment) -> Result<ExitDisposition, ExecError> {
    let Some(name) = cmd.name() else {
        // Only operators on the line; nothing to run.
        return Ok(ExitDisposition::Exited(0));
    };
    let program = find_executable(&env.search_dirs, name)
        .ok_or_else(|| ExecError::NotFound(name.to_string()))?;

    let mut child_cmd = std::process::Command::new(&program);
    child_cmd
        .args(&cmd.arguments[1..])
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir);

    match &cmd.redirect {
        Redirect::None => {}
        Redirect::Output(path) => {
            let target = env.current_dir.join(path);
            let file = File::create(&target).map_err(|source| ExecError::RedirectTarget {
                path: target.clone(),
                source,
            })?;
            child_cmd.stdout(file);
        }
        Redirect::Append(path) => {
            let target = env.current_dir.join(path);
            let file = open_append(&target)?;
            child_cmd.stdout(file);
        }
        Redirect::Reverse(_) => {
            child_cmd.stdout(Stdio::piped());
        }
    }

    let mut child = child_cmd.spawn().map_err(|source| ExecError::Spawn {
        program: program.clone(),
        source,
    })?;

    if let Redirect::Reverse(path) = &cmd.redirect {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecError::Pipe(io::Error::other("child stdout was not captured")))?;
        let target = env.current_dir.join(path);

        if cmd.background {
            std::thread::spawn(move || {
                if let Err(err) = relay_reversed(stdout, &target) {
                    log::warn!("reverse redirect relay failed: {err}");
                }
            });
            return Ok(ExitDisposition::Background(child));
        }
        if let Err(err) = relay_reversed(stdout, &target) {
            // The child is already running; reap it so a failed relay does
            // not leave a zombie behind.
            let _ = child.wait();
            return Err(err);
        }
    }

    if cmd.background {
        return Ok(ExitDisposition::Background(child));
    }
    let status = child.wait().map_err(ExecError::Wait)?;
    Ok(ExitDisposition::Exited(exit_code(status)))
}

/// Reads the child's entire output from the pipe, reverses the captured
/// bytes, and appends them to `target`.
///
/// `"Hello World"` becomes `"dlroW olleH"`: a full-buffer byte reversal,
/// not a reversal of line order.
fn relay_reversed(stdout: ChildStdout, target: &Path) -> Result<(), ExecError> {
    let mut captured = Vec::new();
    let mut limited = stdout.take(REVERSE_BUF_LIMIT);
    limited.read_to_end(&mut captured).map_err(ExecError::Pipe)?;
    // Drain anything past the cap so the child sees EOF-side pressure
    // relieved and can exit.
    io::copy(&mut limited.into_inner(), &mut io::sink()).map_err(ExecError::Pipe)?;

    captured.reverse();

    let mut file = open_append(target)?;
    file.write_all(&captured)
        .map_err(|source| ExecError::RedirectTarget {
            path: target.to_path_buf(),
            source,
        })?;
    Ok(())
}

fn open_append(target: &Path) -> Result<File, ExecError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(target)
        .map_err(|source| ExecError::RedirectTarget {
            path: target.to_path_buf(),
            source,
        })
}

fn exit_code(status: ExitStatus) -> ExitCode {
    status.code().unwrap_or_else(|| terminated_by_signal(status))
}

#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&status) {
        128 + signal
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> ExitCode {
    -1
}
