//! Character ↔ pattern lookup tables.
//!
//! [`SymbolTable::global`] is built once on first use and shared for the
//! lifetime of the process.

use std::collections::HashMap;
use std::sync::OnceLock;

/// International Morse patterns for every character the codec understands.
///
/// The space entry is the inter-word separator, not a dot/dash pattern.
pub(crate) const PATTERNS: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('0', "-----"),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('-', "-....-"),
    (' ', " "),
];

/// Immutable forward and inverse Morse maps.
#[derive(Debug)]
pub struct SymbolTable {
    forward: HashMap<char, &'static str>,
    inverse: HashMap<&'static str, char>,
}

impl SymbolTable {
    fn build() -> Self {
        let forward: HashMap<char, &'static str> = PATTERNS.iter().copied().collect();
        let inverse: HashMap<&'static str, char> =
            PATTERNS.iter().map(|&(ch, pattern)| (pattern, ch)).collect();
        Self { forward, inverse }
    }

    /// The process-wide table.
    pub fn global() -> &'static SymbolTable {
        static TABLE: OnceLock<SymbolTable> = OnceLock::new();
        TABLE.get_or_init(Self::build)
    }

    /// Pattern for an uppercase character, or `None` if it has no encoding.
    pub fn pattern(&self, ch: char) -> Option<&'static str> {
        self.forward.get(&ch).copied()
    }

    /// Character for a dot/dash group, or `None` if the group is undefined.
    pub fn character(&self, pattern: &str) -> Option<char> {
        self.inverse.get(pattern).copied()
    }

    /// `true` when `ch` (already uppercased) can be encoded.
    pub fn contains(&self, ch: char) -> bool {
        self.forward.contains_key(&ch)
    }

    /// Number of encodable characters, the word separator included.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
