use argh::FromArgs;
use myshell::Shell;
use myshell::env::Environment;
use std::path::PathBuf;

#[derive(FromArgs)]
/// An interactive command shell with aliases, output redirection, and
/// background execution.
struct Options {
    /// path of the alias file (defaults to .aliases in the working directory)
    #[argh(option)]
    alias_file: Option<PathBuf>,
    /// path of the last-command history file (defaults to .history)
    #[argh(option)]
    history_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let options: Options = argh::from_env();

    let mut env = Environment::from_process();
    if let Some(path) = options.alias_file {
        env.alias_file = path;
    }
    if let Some(path) = options.history_file {
        env.history_file = path;
    }

    Shell::new(env).run()
}
