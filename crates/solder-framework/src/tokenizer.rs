//! Shell-style tokenization for `execute_string`.

/// Which quoting context the tokenizer is currently inside.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Quoting {
    None,
    Single,
    Double,
}

/// Splits a command line into tokens.
///
/// Tokens separate on unquoted whitespace. A single- or double-quoted span
/// keeps its content as one token (an explicitly quoted empty span yields an
/// empty token), and a backslash inside double quotes escapes the character
/// after it.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    // `None` between tokens; `Some` once the current token has begun, even
    // when its accumulated text is still empty (e.g. `""`).
    let mut token: Option<String> = None;
    let mut quoting = Quoting::None;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match (quoting, ch) {
            (Quoting::None, '\'') => {
                quoting = Quoting::Single;
                token.get_or_insert_with(String::new);
            }
            (Quoting::None, '"') => {
                quoting = Quoting::Double;
                token.get_or_insert_with(String::new);
            }
            (Quoting::None, ch) if ch.is_whitespace() => {
                if let Some(done) = token.take() {
                    tokens.push(done);
                }
            }
            (Quoting::Single, '\'') | (Quoting::Double, '"') => {
                quoting = Quoting::None;
            }
            (Quoting::Double, '\\') => {
                if let Some(escaped) = chars.next() {
                    token.get_or_insert_with(String::new).push(escaped);
                }
            }
            (_, ch) => {
                token.get_or_insert_with(String::new).push(ch);
            }
        }
    }

    if let Some(done) = token {
        tokens.push(done);
    }
    tokens
}
