/// Lower-case the input and split it on every run of characters that is
/// not an ASCII letter or digit, dropping empty pieces. No stemming, no
/// stop words. Documents and queries go through this same function, so
/// the two sides always share a vocabulary.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
