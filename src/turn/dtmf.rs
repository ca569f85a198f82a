//! DTMF digit strings as they travel through recognition results
//!
//! Platforms report DTMF recognition with the digits separated by spaces in
//! the utterance (`"4 0 6 9"`) and joined in the interpretation (`"4069"`).

/// Characters a telephone keypad can produce
pub fn is_dtmf_digit(c: char) -> bool {
    matches!(c, '0'..='9' | '*' | '#' | 'A'..='D' | 'a'..='d')
}

/// Space-separate a digit string the way a platform utterance carries it
pub fn encode_utterance(digits: &str) -> String {
    let mut utterance = String::with_capacity(digits.len() * 2);
    for (i, digit) in digits.chars().filter(|c| !c.is_whitespace()).enumerate() {
        if i > 0 {
            utterance.push(' ');
        }
        utterance.push(digit);
    }
    utterance
}

/// Join an utterance back into a digit string, dropping separators
pub fn decode_utterance(utterance: &str) -> String {
    utterance
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '-')
        .collect()
}

/// Remove a trailing termination digit, if present
pub fn strip_terminator(digits: &str, terminator: Option<char>) -> &str {
    match terminator {
        Some(t) => digits.strip_suffix(t).unwrap_or(digits),
        None => digits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utterance_round_trip() {
        for digits in ["4069", "#", "*", "12#", "0"] {
            let utterance = encode_utterance(digits);
            assert_eq!(decode_utterance(&utterance), digits);
        }
        assert_eq!(encode_utterance("4069"), "4 0 6 9");
    }

    #[test]
    fn terminator_only_stripped_at_end() {
        assert_eq!(strip_terminator("1234#", Some('#')), "1234");
        assert_eq!(strip_terminator("1234", Some('#')), "1234");
        assert_eq!(strip_terminator("#", None), "#");
    }

    #[test]
    fn keypad_characters() {
        assert!(is_dtmf_digit('7'));
        assert!(is_dtmf_digit('#'));
        assert!(is_dtmf_digit('*'));
        assert!(!is_dtmf_digit('x'));
    }
}
