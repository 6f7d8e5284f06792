use std::path::PathBuf;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure,
/// mirroring the convention used by POSIX shells.
pub type ExitCode = i32;

/// Classification of one input line, decided solely by its first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Blank or whitespace-only input; nothing to do.
    NoOp,
    /// The literal `exit` command: terminates the interactive loop.
    Exit,
    /// The literal `alias` command: defines or updates an alias.
    Alias,
    /// Anything else: resolved and executed as an external program.
    Other,
}

/// Disposition of a command's standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Inherit the shell's standard output.
    None,
    /// `> file`: overwrite the file with the command's output.
    Output(PathBuf),
    /// `>> file`: append the command's output to the file.
    Append(PathBuf),
    /// `>>> file`: append the command's output to the file with its byte
    /// sequence reversed.
    Reverse(PathBuf),
}

impl Redirect {
    /// The redirect's target file, when there is one.
    pub fn target(&self) -> Option<&PathBuf> {
        match self {
            Redirect::None => None,
            Redirect::Output(path) | Redirect::Append(path) | Redirect::Reverse(path) => {
                Some(path)
            }
        }
    }
}

/// The parsed intent of one input line.
///
/// Invariant: `arguments` never contains `&`, a redirect operator, or a
/// redirect target filename; those are lifted into `background` and
/// `redirect` during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub operation: Operation,
    /// The program name followed by its positional arguments, in order.
    pub arguments: Vec<String>,
    /// True when the line carried a `&` token.
    pub background: bool,
    pub redirect: Redirect,
}

impl Command {
    /// The command for a blank line.
    pub fn no_op() -> Self {
        Command {
            operation: Operation::NoOp,
            arguments: Vec::new(),
            background: false,
            redirect: Redirect::None,
        }
    }

    /// The program name, i.e. the first argument.
    pub fn name(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }
}
