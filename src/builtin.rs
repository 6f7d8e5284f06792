//! Built-in commands executed in-process.
//!
//! Builtins are parsed with [`argh`] (`FromArgs`) and write to a caller
//! provided stream, so their output can participate in redirection the
//! same way an external command's standard output does.

use crate::command::ExitCode;
use crate::env::Environment;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use chrono::Local;
use std::io::Write;

/// Built-in commands known to the shell at compile time.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "bello".
    fn name() -> &'static str;

    /// Executes the command, writing its output to `stdout`.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero
    /// for failure.
    fn execute(
        self,
        stdout: &mut dyn Write,
        env: &Environment,
        last_command: Option<&str>,
    ) -> Result<ExitCode>;
}

/// Runs a builtin when `name` matches one, returning `None` otherwise.
///
/// Argument errors from argh (including `--help` output) are written to
/// `stdout` instead of aborting the shell, the way an external command
/// would print its own usage.
pub(crate) fn try_run(
    name: &str,
    args: &[&str],
    stdout: &mut dyn Write,
    env: &Environment,
    last_command: Option<&str>,
) -> Option<Result<ExitCode>> {
    if name != Bello::name() {
        return None;
    }
    Some(match Bello::from_args(&[name], args) {
        Ok(cmd) => cmd.execute(stdout, env, last_command),
        Err(EarlyExit { output, status }) => {
            let code = if status.is_err() { 1 } else { 0 };
            match writeln!(stdout, "{output}") {
                Ok(()) => Ok(code),
                Err(err) => Err(err.into()),
            }
        }
    })
}

#[derive(FromArgs)]
/// Display information about the user and the current session.
pub(crate) struct Bello {}

impl BuiltinCommand for Bello {
    fn name() -> &'static str {
        "bello"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        env: &Environment,
        last_command: Option<&str>,
    ) -> Result<ExitCode> {
        writeln!(stdout, "Username: {}", env.username())?;
        writeln!(stdout, "Hostname: {}", env.hostname())?;
        writeln!(
            stdout,
            "Last Executed Command: {}",
            last_command.unwrap_or("(none)")
        )?;
        writeln!(
            stdout,
            "Current Shell Name: {}",
            env.get_var("SHELL").unwrap_or_else(|| "unknown".to_string())
        )?;
        writeln!(
            stdout,
            "Home Location: {}",
            env.get_var("HOME").unwrap_or_else(|| "unknown".to_string())
        )?;
        writeln!(
            stdout,
            "Current Time and Date: {}",
            Local::now().format("%a %b %e %T %Y")
        )?;
        writeln!(stdout, "Number of Processes: {}", process_count())?;
        Ok(0)
    }
}

/// Counts live processes by running `ps -e` and counting its output lines,
/// minus the header. Zero when `ps` is unavailable.
fn process_count() -> usize {
    let output = match std::process::Command::new("ps").arg("-e").output() {
        Ok(output) => output,
        Err(err) => {
            log::warn!("failed to run ps: {err}");
            return 0;
        }
    };
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .count()
        .saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bello_reports_session_fields() {
        let mut env = Environment::from_process();
        env.set_var("USER", "tester");
        env.set_var("SHELL", "/bin/myshell");
        env.set_var("HOME", "/home/tester");

        let mut out = Vec::new();
        let code = try_run("bello", &[], &mut out, &env, Some("ls -la"))
            .expect("bello is a builtin")
            .expect("bello succeeds");
        assert_eq!(code, 0);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Username: tester"));
        assert!(text.contains("Last Executed Command: ls -la"));
        assert!(text.contains("Current Shell Name: /bin/myshell"));
        assert!(text.contains("Home Location: /home/tester"));
    }

    #[test]
    fn unknown_name_is_not_a_builtin() {
        let env = Environment::from_process();
        let mut out = Vec::new();
        assert!(try_run("ls", &[], &mut out, &env, None).is_none());
    }

    #[test]
    fn unexpected_argument_reports_without_running() {
        let env = Environment::from_process();
        let mut out = Vec::new();
        let code = try_run("bello", &["--bogus"], &mut out, &env, None)
            .expect("bello is a builtin")
            .expect("argument errors are reported, not fatal");
        assert_eq!(code, 1);
        assert!(!out.is_empty());
    }
}
