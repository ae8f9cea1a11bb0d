//! Response filtering
//!
//! Only a single letter A-G (natural) or a-g (flat) is a valid answer.
//! Everything else is dropped here and never reaches the session.

use regex::Regex;
use std::sync::LazyLock;

use crate::fretboard::NoteToken;

static RESPONSE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Ga-g]$").unwrap());

/// Accept one keystroke as an answer, case preserved
pub fn parse_response(raw: &str) -> Option<NoteToken> {
    if RESPONSE_PATTERN.is_match(raw) {
        Some(NoteToken::new(raw))
    } else {
        None
    }
}

/// Treat each character of a chunk of input as its own keystroke
pub fn tokens_in(chunk: &str) -> Vec<NoteToken> {
    let mut buf = [0u8; 4];
    chunk
        .chars()
        .filter_map(|c| parse_response(c.encode_utf8(&mut buf)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_note_letters() {
        for raw in ["A", "G", "a", "g", "E", "b"] {
            assert_eq!(parse_response(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_rejects_everything_else() {
        for raw in ["", "H", "h", "1", " ", "Ab", "a ", "#", "é"] {
            assert!(parse_response(raw).is_none(), "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_tokens_in_chunk() {
        let tokens: Vec<String> = tokens_in("E b, x G\n")
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect();
        assert_eq!(tokens, vec!["E", "b", "G"]);
    }
}
