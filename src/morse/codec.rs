//! Text → symbol string ([`encode`]) and symbol string → text ([`decode`]).

use thiserror::Error;

use super::table::SymbolTable;

/// Separator between the patterns of two letters in the same word.
pub const LETTER_SEPARATOR: &str = " ";

/// Separator between two words.
pub const WORD_SEPARATOR: &str = "   ";

/// Errors produced while decoding a symbol string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A dot/dash group has no character assigned to it.
    #[error("unknown Morse symbol group {0:?}")]
    UnknownSymbol(String),
}

/// Encode `text` as a Morse symbol string.
///
/// Input is uppercased first.  Characters without a pattern are dropped
/// without leaving a gap behind.
///
/// ```
/// use morse_messenger::morse::encode;
///
/// assert_eq!(encode("SOS"), "... --- ...");
/// assert_eq!(encode("cq de"), "-.-. --.-   -.. .");
/// assert_eq!(encode("s#o!s"), "... --- ...");
/// ```
pub fn encode(text: &str) -> String {
    let table = SymbolTable::global();
    text.to_uppercase()
        .chars()
        .filter_map(|ch| table.pattern(ch))
        .collect::<Vec<_>>()
        .join(LETTER_SEPARATOR)
}

/// Decode a symbol string back into uppercase text.
///
/// Words are split on [`WORD_SEPARATOR`], letters on single spaces (empty
/// groups are skipped), and words are rejoined with one space.  Runs of word
/// gaps collapse to one space and gaps at either end are dropped, matching
/// how the transmitter keys them.
///
/// # Errors
///
/// Returns [`CodecError::UnknownSymbol`] for the first group with no
/// matching character.  Nothing is returned for partially decoded input.
pub fn decode(morse: &str) -> Result<String, CodecError> {
    let table = SymbolTable::global();
    let words = morse
        .split(WORD_SEPARATOR)
        .map(|word| {
            word.split(LETTER_SEPARATOR)
                .filter(|group| !group.is_empty())
                .map(|group| {
                    table
                        .character(group)
                        .ok_or_else(|| CodecError::UnknownSymbol(group.to_string()))
                })
                .collect::<Result<String, _>>()
        })
        .filter(|word| !matches!(word, Ok(w) if w.is_empty()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(words.join(" "))
}

/// Normalise free-form input to what the sender may key.
///
/// Uppercases and keeps letters, digits, `.`, `,`, `?`, `-` and spaces.
pub fn sanitize(text: &str) -> String {
    let table = SymbolTable::global();
    text.to_uppercase()
        .chars()
        .filter(|&ch| ch.is_ascii() && table.contains(ch))
        .collect()
}
