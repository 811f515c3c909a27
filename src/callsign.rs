//! Amateur-radio callsign recognition.
//!
//! A callsign here is one or two letters, one digit, then two or three
//! letters (`W2ASM`, `K1ABC`, `DL1AB`).  Matching is on uppercase ASCII only.

const QRZ_LOOKUP: &str = "https://www.qrz.com/db/";

/// `true` when the whole of `s` is a callsign.
///
/// ```
/// use morse_messenger::callsign::is_valid_callsign;
///
/// assert!(is_valid_callsign("W2ASM"));
/// assert!(!is_valid_callsign("w2asm"));
/// assert!(!is_valid_callsign("W2ASM/P"));
/// ```
pub fn is_valid_callsign(s: &str) -> bool {
    match_at(s.as_bytes(), 0) == Some(s.len())
}

/// Leftmost callsign inside `word`, if any.
///
/// Prefix and suffix letter runs are matched greedily, so `"DL1ABCD"` yields
/// `"DL1ABC"`.
pub fn find_callsign(word: &str) -> Option<&str> {
    let bytes = word.as_bytes();
    (0..bytes.len()).find_map(|start| match_at(bytes, start).map(|end| &word[start..end]))
}

/// The callsign found in each whitespace-separated word, in order.
pub fn callsigns_in(text: &str) -> Vec<&str> {
    text.split_whitespace().filter_map(find_callsign).collect()
}

/// QRZ.com lookup page for `callsign`.
pub fn lookup_url(callsign: &str) -> String {
    format!("{QRZ_LOOKUP}{callsign}")
}

/// End index of a callsign starting at `start`, trying the longer prefix and
/// suffix first.
fn match_at(bytes: &[u8], start: usize) -> Option<usize> {
    let rest = bytes.get(start..)?;
    [2, 1].into_iter().find_map(|prefix| {
        let letters = rest.get(..prefix)?;
        if !letters.iter().all(u8::is_ascii_uppercase) {
            return None;
        }
        if !rest.get(prefix)?.is_ascii_digit() {
            return None;
        }
        [3, 2].into_iter().find_map(|suffix| {
            let from = prefix + 1;
            let tail = rest.get(from..from + suffix)?;
            tail.iter()
                .all(u8::is_ascii_uppercase)
                .then_some(start + from + suffix)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_callsigns() {
        for call in ["W2ASM", "K1AB", "DL1ABC", "G4XY", "VE3ABC"] {
            assert!(is_valid_callsign(call), "{call}");
        }
    }

    #[test]
    fn invalid_callsigns() {
        for call in ["", "W2", "W2A", "ABC1DE", "W22ASM", "W2ASMXX", "k1abc", "2ABC"] {
            assert!(!is_valid_callsign(call), "{call:?}");
        }
    }

    #[test]
    fn finds_callsign_inside_word() {
        assert_eq!(find_callsign("DE:W2ASM,"), Some("W2ASM"));
        assert_eq!(find_callsign("W2ASM/P"), Some("W2ASM"));
        assert_eq!(find_callsign("DL1ABCD"), Some("DL1ABC"));
        assert_eq!(find_callsign("CQ"), None);
        assert_eq!(find_callsign(""), None);
    }

    #[test]
    fn one_match_per_word() {
        assert_eq!(
            callsigns_in("W2ASM DE K1ABC 599 TU"),
            vec!["W2ASM", "K1ABC"]
        );
        assert!(callsigns_in("CQ CQ CQ").is_empty());
    }

    #[test]
    fn qrz_url() {
        assert_eq!(lookup_url("W2ASM"), "https://www.qrz.com/db/W2ASM");
    }
}
