//! Turning a token sequence into a [`Command`].
//!
//! The walk is a single left-to-right pass with one decision per token:
//! `&` sets the background flag, a redirect operator binds the token after
//! it as the target file, and everything else becomes an argument.

use crate::command::{Command, Operation, Redirect};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while classifying a token sequence.
///
/// Malformed input otherwise degrades to a best-effort command; the one
/// thing that cannot be coerced is a redirect with nowhere to go.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A redirect operator appeared as the final token, so there is no
    /// target filename to bind.
    #[error("redirect operator `{0}` is missing a target file")]
    MissingRedirectTarget(String),
}

fn is_redirect_operator(token: &str) -> bool {
    matches!(token, ">" | ">>" | ">>>")
}

/// Parses a token sequence into a [`Command`].
///
/// An empty sequence maps to [`Operation::NoOp`]. The operation is decided
/// by the first token's literal text alone (`exit`, `alias`, otherwise
/// `Other`). The first redirect operator encountered wins; any later
/// operator and its target are consumed and dropped so that `arguments`
/// never carries operator tokens or redirect filenames.
pub fn parse(tokens: &[String]) -> Result<Command, ParseError> {
    let Some(first) = tokens.first() else {
        return Ok(Command::no_op());
    };

    let operation = match first.as_str() {
        "exit" => Operation::Exit,
        "alias" => Operation::Alias,
        _ => Operation::Other,
    };

    let mut arguments = Vec::new();
    let mut background = false;
    let mut redirect = Redirect::None;

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();

        if token == "&" {
            background = true;
            i += 1;
            continue;
        }

        if is_redirect_operator(token) {
            let Some(target) = tokens.get(i + 1) else {
                return Err(ParseError::MissingRedirectTarget(token.to_string()));
            };
            // First operator wins; later ones are swallowed together with
            // their targets to keep the arguments invariant.
            if redirect == Redirect::None {
                let target = PathBuf::from(target);
                redirect = match token {
                    ">" => Redirect::Output(target),
                    ">>" => Redirect::Append(target),
                    _ => Redirect::Reverse(target),
                };
            }
            i += 2;
            continue;
        }

        arguments.push(tokens[i].clone());
        i += 1;
    }

    Ok(Command {
        operation,
        arguments,
        background,
        redirect,
    })
}
