//! Input tokenizer producing [`ParsedCommand`].
//!
//! A raw line is normalised (slashes become spaces, ASCII is lower-cased) and split
//! into at most [COMMAND_MAX] word tokens. Double quotes group words into one
//! token. A purely numeric token after the first word becomes the numeric value of
//! the word before it (`get sword 2`), and so does a digit run glued to the end of
//! a later word (`kill orc2`). Every word defaults to the value 1.
use serde::{Deserialize, Serialize};

use super::namespace::NamespaceKind;

pub const COMMAND_MAX: usize = 6;
pub const MAX_TOKEN_SIZE: usize = 50;

/// Which entry the dispatcher bound to this input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommand {
    pub namespace: NamespaceKind,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// Word tokens; `words[0]` is the command token.
    pub words: Vec<String>,
    /// Numeric value per word (parallel to `words`).
    pub values: Vec<i64>,
    /// The line as typed, before normalisation.
    pub full: String,
    /// Status or return code written by the dispatcher.
    pub ret: i32,
    pub resolved: Option<ResolvedCommand>,
}

impl ParsedCommand {
    pub fn command_word(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// Numeric value for a word; 1 when the word is absent or carried none.
    pub fn value(&self, index: usize) -> i64 {
        self.values.get(index).copied().unwrap_or(1)
    }

    pub fn num(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Raw text following the first `skip` whitespace-separated words of the
    /// original line, trimmed. Used by bodies that take free text (`say`, `pcast`).
    pub fn rest_after(&self, skip: usize) -> &str {
        let mut rest = self.full.trim_start();
        for _ in 0..skip {
            match rest.find(char::is_whitespace) {
                Some(pos) => rest = rest[pos..].trim_start(),
                None => return "",
            }
        }
        rest.trim_end()
    }
}

fn normalise(line: &str) -> String {
    line.chars()
        .map(|c| if c == '/' { ' ' } else { c.to_ascii_lowercase() })
        .collect()
}

fn truncate_token(token: &str) -> String {
    token.chars().take(MAX_TOKEN_SIZE - 1).collect()
}

fn is_numeric_token(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Parse the leading integer of a token the way `atol` would: digits up to the
/// first non-digit, 0 when nothing parses.
fn leading_int(token: &str) -> i64 {
    let (sign, digits) = match token.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, token),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|v| v * sign).unwrap_or(0)
}

/// Split `orc2` into (`orc`, 2). Words that are all digits or carry no trailing
/// digits are returned unchanged.
fn split_suffix(token: &str) -> (&str, Option<i64>) {
    let stem = token.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.is_empty() || stem.len() == token.len() {
        return (token, None);
    }
    (stem, token[stem.len()..].parse().ok())
}

/// Tokenize one input line.
pub fn parse(line: &str) -> ParsedCommand {
    let mut cmd = ParsedCommand {
        full: line.to_string(),
        ..Default::default()
    };
    let text = normalise(line);
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let quoted = ch == '"';
        let token_start = if quoted {
            chars.next();
            start + 1
        } else {
            start
        };
        let mut end = text.len();
        for (i, c) in chars.by_ref() {
            if (quoted && c == '"') || (!quoted && c.is_whitespace()) {
                end = i;
                break;
            }
        }
        let token = &text[token_start.min(end)..end];
        if token.is_empty() {
            continue;
        }

        if quoted || cmd.words.is_empty() {
            cmd.words.push(truncate_token(token));
            cmd.values.push(1);
        } else if is_numeric_token(token) {
            if let Some(last) = cmd.values.last_mut() {
                *last = leading_int(token);
            }
        } else {
            let (stem, value) = split_suffix(token);
            cmd.words.push(truncate_token(stem));
            cmd.values.push(value.unwrap_or(1));
        }

        if cmd.words.len() >= COMMAND_MAX {
            break;
        }
    }

    cmd
}
