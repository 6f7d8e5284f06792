use crate::alias::AliasStore;
use crate::builtin;
use crate::command::{Command, Operation, Redirect};
use crate::env::Environment;
use crate::executor::{self, ExitDisposition};
use crate::lexer;
use crate::parser;
use anyhow::{Context, Result, bail};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs;
use std::io::{self, Write};
use std::process::Child;

/// The interactive shell: a read-eval loop over single commands.
///
/// Each line goes through alias expansion, tokenization, and parsing, then
/// dispatches on the parsed operation. Failures are reported and scoped to
/// the iteration; only `exit` or end of input leaves the loop.
pub struct Shell {
    env: Environment,
    aliases: AliasStore,
    jobs: Vec<Child>,
    last_command: Option<String>,
}

impl Shell {
    pub fn new(env: Environment) -> Self {
        let aliases = AliasStore::new(env.alias_file.clone());
        Shell {
            env,
            aliases,
            jobs: Vec::new(),
            last_command: None,
        }
    }

    /// Runs the interactive loop until `exit`, end of input, or Ctrl-C.
    pub fn run(&mut self) -> Result<()> {
        self.aliases
            .ensure_exists()
            .context("preparing alias store")?;
        fs::write(&self.env.history_file, "").context("preparing history file")?;

        let mut rl = DefaultEditor::new()?;
        while !self.env.should_exit {
            self.reap_jobs();
            match rl.readline(&self.prompt()) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    self.process_line(&line);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("myshell: {err}");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Processes one raw input line: expand, tokenize, parse, dispatch.
    ///
    /// Public so the shell can be driven non-interactively.
    pub fn process_line(&mut self, line: &str) {
        let expanded = self.aliases.expand(line);
        let tokens = lexer::tokenize(&expanded);
        log::debug!("tokens: {tokens:?}");
        if tokens.is_empty() {
            return;
        }

        match parser::parse(&tokens) {
            Ok(cmd) => {
                log::debug!("parsed: {cmd:?}");
                self.dispatch(&cmd, &tokens);
                // Recorded as typed, before alias expansion; lines that
                // failed to parse are not recorded.
                self.last_command = Some(line.to_string());
                self.save_history(line);
            }
            Err(err) => eprintln!("myshell: {err}"),
        }
    }

    fn dispatch(&mut self, cmd: &Command, tokens: &[String]) {
        match cmd.operation {
            Operation::NoOp => {}
            Operation::Exit => self.env.should_exit = true,
            Operation::Alias => {
                if let Err(err) = self.define_alias(tokens) {
                    eprintln!("myshell: {err}");
                }
            }
            Operation::Other => self.execute(cmd),
        }
    }

    /// Handles `alias <name> = <expansion...>`.
    ///
    /// Works on the raw token sequence, not the parsed arguments: every
    /// token after the `=` belongs to the expansion verbatim, including
    /// `&` and redirect operators, rejoined with single spaces. The quotes
    /// a user wrapped the expansion in were already stripped by the lexer.
    fn define_alias(&mut self, tokens: &[String]) -> Result<()> {
        if tokens.len() < 4 || tokens[2] != "=" {
            bail!("usage: alias <name> = <command>");
        }
        let name = &tokens[1];
        let expansion = tokens[3..].join(" ");
        self.aliases.upsert(name, &expansion)?;
        Ok(())
    }

    fn execute(&mut self, cmd: &Command) {
        let Some(name) = cmd.name() else {
            return;
        };

        // Builtins run in-process; their output is buffered so it can be
        // disposed of per the command's redirect like a child's stdout.
        let args: Vec<&str> = cmd.arguments[1..].iter().map(String::as_str).collect();
        let mut buffered = Vec::new();
        if let Some(result) = builtin::try_run(
            name,
            &args,
            &mut buffered,
            &self.env,
            self.last_command.as_deref(),
        ) {
            let outcome =
                result.and_then(|_| self.dispose_builtin_output(&buffered, &cmd.redirect));
            if let Err(err) = outcome {
                eprintln!("myshell: {err}");
            }
            return;
        }

        match executor::execute(cmd, &self.env) {
            Ok(ExitDisposition::Exited(code)) => {
                // A child's failure never becomes the shell's own.
                log::debug!("command exited with code {code}");
            }
            Ok(ExitDisposition::Background(child)) => {
                log::debug!("background job started: pid {}", child.id());
                self.jobs.push(child);
            }
            Err(err) => eprintln!("myshell: {err}"),
        }
    }

    fn dispose_builtin_output(&self, bytes: &[u8], redirect: &Redirect) -> Result<()> {
        match redirect {
            Redirect::None => io::stdout().write_all(bytes)?,
            Redirect::Output(path) => fs::write(self.env.current_dir.join(path), bytes)?,
            Redirect::Append(path) => {
                let mut file = fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(self.env.current_dir.join(path))?;
                file.write_all(bytes)?;
            }
            Redirect::Reverse(path) => {
                let mut reversed = bytes.to_vec();
                reversed.reverse();
                let mut file = fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(self.env.current_dir.join(path))?;
                file.write_all(&reversed)?;
            }
        }
        Ok(())
    }

    /// Polls background jobs and drops the finished ones, so completed
    /// children do not linger as zombies between prompts.
    fn reap_jobs(&mut self) {
        self.jobs.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("reaped background job: {status}");
                false
            }
            Ok(None) => true,
            Err(err) => {
                log::warn!("failed to poll background job: {err}");
                false
            }
        });
    }

    fn prompt(&self) -> String {
        format!(
            "{}@{} {} --- ",
            self.env.username(),
            self.env.hostname(),
            self.env.current_dir.display()
        )
    }

    /// Rewrites the history file with the most recent command.
    fn save_history(&self, line: &str) {
        if let Err(err) = fs::write(&self.env.history_file, format!("{line}\n")) {
            eprintln!("myshell: failed to write history: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn shell_in(dir: &Path) -> Shell {
        let mut env = Environment::from_process();
        env.current_dir = dir.to_path_buf();
        env.alias_file = dir.join(".aliases");
        env.history_file = dir.join(".history");
        Shell::new(env)
    }

    #[test]
    fn exit_sets_the_flag() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        assert!(!shell.env.should_exit);
        shell.process_line("exit");
        assert!(shell.env.should_exit);
    }

    #[test]
    fn blank_line_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("   ");
        assert!(shell.last_command.is_none());
        assert!(!dir.path().join(".history").exists());
    }

    #[test]
    fn alias_command_persists_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("alias ll = ls -la");
        assert_eq!(
            shell.aliases.lookup("ll").unwrap(),
            Some("ls -la".to_string())
        );
    }

    #[test]
    fn alias_expansion_applies_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("alias greet = \"echo hello\"");

        #[cfg(unix)]
        {
            shell.process_line("greet world > out.txt");
            let contents = fs::read_to_string(dir.path().join("out.txt")).unwrap();
            assert_eq!(contents, "hello world\n");
        }
    }

    #[test]
    fn history_records_the_raw_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("alias g = git status");
        shell.process_line("not-a-real-command-xyz");
        assert_eq!(
            fs::read_to_string(dir.path().join(".history")).unwrap(),
            "not-a-real-command-xyz\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn external_command_with_append_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("echo one > log.txt");
        shell.process_line("echo two >> log.txt");
        assert_eq!(
            fs::read_to_string(dir.path().join("log.txt")).unwrap(),
            "one\ntwo\n"
        );
    }

    #[test]
    #[cfg(unix)]
    fn reverse_redirect_via_the_full_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("printf \"Hello World\" >>> rev.txt");
        assert_eq!(
            fs::read_to_string(dir.path().join("rev.txt")).unwrap(),
            "dlroW olleH"
        );
    }

    #[test]
    #[cfg(unix)]
    fn bello_builtin_honors_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("echo warm-up");
        shell.process_line("bello > info.txt");
        let contents = fs::read_to_string(dir.path().join("info.txt")).unwrap();
        assert!(contents.contains("Username:"));
        assert!(contents.contains("Last Executed Command: echo warm-up"));
    }

    #[test]
    #[cfg(unix)]
    fn background_job_is_tracked_and_reaped() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("sleep 0.05 &");
        assert_eq!(shell.jobs.len(), 1);
        std::thread::sleep(std::time::Duration::from_millis(200));
        shell.reap_jobs();
        assert!(shell.jobs.is_empty());
    }

    #[test]
    fn alias_expansion_keeps_operator_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        // Unquoted operators after `=` are part of the stored expansion,
        // not modifiers of the alias command itself.
        shell.process_line("alias x = echo hi > f");
        assert_eq!(
            shell.aliases.lookup("x").unwrap(),
            Some("echo hi > f".to_string())
        );
        shell.process_line("alias bg = sleep 1 &");
        assert_eq!(
            shell.aliases.lookup("bg").unwrap(),
            Some("sleep 1 &".to_string())
        );
    }

    #[test]
    fn unparseable_line_is_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("echo hi >");
        assert!(shell.last_command.is_none());
        assert!(!dir.path().join(".history").exists());

        shell.process_line("echo hi");
        assert_eq!(shell.last_command.as_deref(), Some("echo hi"));
    }

    #[test]
    fn malformed_alias_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = shell_in(dir.path());
        shell.process_line("alias broken");
        assert_eq!(shell.aliases.lookup("broken").unwrap(), None);
        assert!(!shell.env.should_exit);
    }
}
