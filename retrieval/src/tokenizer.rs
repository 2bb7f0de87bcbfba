//! Word tokenization.

use std::sync::LazyLock;

use regex_lite::Regex;

#[allow(clippy::expect_used)]
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern"));

/// Split `text` into lowercase word tokens.
///
/// A token is a maximal run of ASCII letters, digits and underscores.
/// Everything else is a separator. Tokens are yielded lazily, left to right.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD.find_iter(text).map(|m| m.as_str().to_lowercase())
}
