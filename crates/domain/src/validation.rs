use once_cell::sync::Lazy;
use regex::Regex;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 20;

// Latin letters plus precomposed Hangul syllables.
static LETTERS_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z가-힣]+$").expect("letters-only pattern is valid"));

/// True when `value` is non-empty and made of letters only: no digits,
/// whitespace or punctuation.
pub fn is_letters_only(value: &str) -> bool {
    LETTERS_ONLY.is_match(value)
}
