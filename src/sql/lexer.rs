//! Statement tokenizer
//!
//! Splits a raw line on whitespace, strips `,` `(` `)` from every word and
//! upper-cases what remains. There is no quoting: punctuation inside what
//! looks like a string literal is stripped as well.

/// Characters removed from every word before it becomes a token
const STRIPPED: [char; 3] = [',', '(', ')'];

/// Tokenize a raw input line
pub fn tokenize(input: &str) -> Vec<String> {
    input
        .split_whitespace()
        .filter_map(|word| {
            let token: String = word
                .chars()
                .filter(|c| !STRIPPED.contains(c))
                .collect();
            (!token.is_empty()).then(|| token.to_uppercase())
        })
        .collect()
}
