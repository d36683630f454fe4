// File: args.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::model::HeaderSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

static NUMERIC_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]*\.?[0-9]*$").expect("numeric literal pattern is valid"));

static FUNCTION_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("function name pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("unterminated quoted argument starting at argument {0}")]
    UnterminatedQuote(usize),
    #[error("argument {0} is empty")]
    EmptyArgument(usize),
    #[error("unexpected character '{found}' after argument {position}")]
    UnexpectedCharacter { found: char, position: usize },
    #[error("malformed function call `{0}`; expected name(arg, ...)")]
    MalformedCall(String),
    #[error("dynamic header {0} must declare exactly one of `function` or `call`")]
    AmbiguousDeclaration(String),
}

/// One argument passed to a header function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Quoted string or numeric literal; never substituted.
    Literal(String),
    /// Bare word; replaced by the header of the same name when one exists.
    Ref(String),
}

impl Arg {
    pub fn raw(&self) -> &str {
        match self {
            Arg::Literal(text) | Arg::Ref(text) => text,
        }
    }

    pub fn resolve<'a>(&'a self, headers: &'a HeaderSet) -> &'a str {
        match self {
            Arg::Literal(text) => text,
            Arg::Ref(name) => headers.get(name).map_or(name.as_str(), String::as_str),
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Ref(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Ref(value)
    }
}

/// Splits `name(arg, ...)` into the function name and its arguments.
pub fn parse_call(expr: &str) -> Result<(String, Vec<Arg>), ArgError> {
    let expr = expr.trim();
    let malformed = || ArgError::MalformedCall(expr.to_string());

    let open = expr.find('(').ok_or_else(malformed)?;
    let inner = expr[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
    let name = expr[..open].trim();
    if !FUNCTION_NAME.is_match(name) {
        return Err(malformed());
    }

    Ok((name.to_string(), parse_args(inner)?))
}

/// Splits a comma separated argument list. Quotes (single or double) group
/// text containing commas; a backslash inside quotes escapes the next char.
pub fn parse_args(raw: &str) -> Result<Vec<Arg>, ArgError> {
    let mut args = Vec::new();
    if raw.trim().is_empty() {
        return Ok(args);
    }

    let mut chars = raw.chars().peekable();
    loop {
        skip_whitespace(&mut chars);
        let arg = match chars.peek() {
            Some(&quote) if quote == '"' || quote == '\'' => {
                chars.next();
                Arg::Literal(read_quoted(&mut chars, quote, args.len())?)
            }
            _ => read_bare(&mut chars, args.len())?,
        };
        args.push(arg);

        skip_whitespace(&mut chars);
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(found) => {
                return Err(ArgError::UnexpectedCharacter {
                    found,
                    position: args.len() - 1,
                })
            }
        }
    }

    Ok(args)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn read_quoted(
    chars: &mut Peekable<Chars<'_>>,
    quote: char,
    position: usize,
) -> Result<String, ArgError> {
    let mut text = String::new();
    loop {
        match chars.next() {
            None => return Err(ArgError::UnterminatedQuote(position)),
            Some('\\') => match chars.next() {
                Some(escaped) => text.push(escaped),
                None => return Err(ArgError::UnterminatedQuote(position)),
            },
            Some(c) if c == quote => return Ok(text),
            Some(c) => text.push(c),
        }
    }
}

fn read_bare(chars: &mut Peekable<Chars<'_>>, position: usize) -> Result<Arg, ArgError> {
    let mut text = String::new();
    while let Some(c) = chars.next_if(|c| *c != ',') {
        text.push(c);
    }

    let token = text.trim();
    if token.is_empty() {
        return Err(ArgError::EmptyArgument(position));
    }
    if NUMERIC_LITERAL.is_match(token) {
        Ok(Arg::Literal(token.to_string()))
    } else {
        Ok(Arg::Ref(token.to_string()))
    }
}
