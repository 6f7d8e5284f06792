use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Default name of the alias file, created in the starting directory.
pub const DEFAULT_ALIAS_FILE: &str = ".aliases";
/// Default name of the last-command history file.
pub const DEFAULT_HISTORY_FILE: &str = ".history";

/// Mutable, user-level view of the process environment used by the shell.
///
/// All ambient state is captured once at construction: the variable map,
/// the working directory, and the ordered executable search list derived
/// from `PATH`. Components receive this struct explicitly instead of
/// consulting `std::env` themselves, which keeps them testable with a
/// hand-built environment.
///
/// Note: fields are public for simplicity; the struct is plain data.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of variables handed to executed commands.
    pub vars: HashMap<String, String>,
    /// Ordered list of directories searched for executables.
    pub search_dirs: Vec<PathBuf>,
    /// The working directory for command execution.
    pub current_dir: PathBuf,
    /// Location of the alias store file.
    pub alias_file: PathBuf,
    /// Location of the last-command history file.
    pub history_file: PathBuf,
    /// When set to true, the interactive loop terminates.
    pub should_exit: bool,
}

impl Environment {
    /// Captures the current process state into a new `Environment`.
    ///
    /// Variables come from `std::env::vars()` and the search list from
    /// splitting `PATH`. A `bin` directory under the starting working
    /// directory is appended to the search list (and to the `PATH` seen by
    /// children), so locally built helpers resolve without installation.
    pub fn from_process() -> Self {
        let mut vars: HashMap<String, String> = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        let mut search_dirs: Vec<PathBuf> = vars
            .get("PATH")
            .map(|path| stdenv::split_paths(path).collect())
            .unwrap_or_default();
        search_dirs.push(current_dir.join("bin"));

        if let Ok(joined) = stdenv::join_paths(&search_dirs) {
            vars.insert("PATH".to_string(), joined.to_string_lossy().into_owned());
        }

        Self {
            vars,
            search_dirs,
            alias_file: current_dir.join(DEFAULT_ALIAS_FILE),
            history_file: current_dir.join(DEFAULT_HISTORY_FILE),
            current_dir,
            should_exit: false,
        }
    }

    /// Gets the value of a variable from the captured map.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Sets or overrides a variable in the captured map.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The login name used in the prompt, with a placeholder fallback.
    pub fn username(&self) -> String {
        self.get_var("USER")
            .or_else(|| self.get_var("LOGNAME"))
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// The machine's hostname, with a placeholder fallback.
    pub fn hostname(&self) -> String {
        #[cfg(target_os = "linux")]
        if let Ok(name) = std::fs::read_to_string("/proc/sys/kernel/hostname") {
            let name = name.trim();
            if !name.is_empty() {
                return name.to_string();
            }
        }
        self.get_var("HOSTNAME")
            .unwrap_or_else(|| "localhost".to_string())
    }
}
