//! A small interactive command shell.
//!
//! The pipeline for each input line is: alias expansion on the raw text,
//! quote-aware tokenization, single-pass parsing into a [`command::Command`],
//! then dispatch — builtins run in-process, everything else is resolved
//! against a search list and spawned as a child process with optional
//! output redirection (`>`, `>>`, and the byte-reversing `>>>`) and
//! background execution (`&`).
//!
//! The main entry point is [`Shell`]; the public modules expose the
//! individual pipeline stages for reuse and testing.

mod builtin;
mod interpreter;
pub mod alias;
pub mod command;
pub mod env;
pub mod executor;
pub mod external;
pub mod lexer;
pub mod parser;

/// Just a convenient re-export of the interactive loop.
pub use interpreter::Shell;
