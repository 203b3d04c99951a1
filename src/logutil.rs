//! Helpers for putting raw player input into log records.
//!
//! Input lines come straight off a socket, so they may carry control bytes or be
//! arbitrarily long. Everything logged from a player goes through [`escape_log`].

/// Longest preview written for a single input line.
pub const MAX_PREVIEW: usize = 160;

/// Render `s` on one line: common whitespace escapes become `\n`, `\r` and `\t`,
/// other control characters become `\xNN`, and anything past [MAX_PREVIEW]
/// characters is replaced with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 4);
    let mut chars = s.chars();
    for ch in chars.by_ref().take(MAX_PREVIEW) {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    if chars.next().is_some() {
        out.push('…');
    }
    out
}

/// Strip trailing CR/LF and telnet-style control bytes from a received line while
/// keeping printable text intact.
pub fn clean_input(line: &str) -> String {
    line.trim_end_matches(['\r', '\n'])
        .chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .collect()
}
