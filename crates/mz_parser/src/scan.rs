//! Token-level peeking around a byte offset.
//!
//! Used to decide whether a replacement expression can be dropped into the
//! slot of the node it replaces without parentheses. Only whitespace and
//! comments are skipped; anything unusual comes back as a token the caller
//! does not recognise, which callers treat as "wrap it".

/// The token adjacent to an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Start or end of the text.
    Boundary,
    /// Identifier, keyword or numeric literal.
    Word(&'a str),
    /// A bracket, separator, quote, or a run of operator characters.
    Punct(&'a str),
}

/// Words that end a statement prefix or start an operand, never end one.
const OPERATOR_KEYWORDS: &[&str] = &[
    "return", "typeof", "void", "delete", "in", "of", "instanceof", "new", "case", "throw",
    "yield", "await", "do", "else",
];

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_operator_byte(b: u8) -> bool {
    matches!(
        b,
        b'=' | b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'^' | b'!' | b'<' | b'>' | b'?'
            | b':' | b'.' | b'~'
    )
}

/// The token that ends right before `offset`.
pub fn prev_token(text: &str, offset: usize) -> Token<'_> {
    prev_token_at(text, offset).0
}

/// The token that ends right before `offset`, with its start offset.
pub fn prev_token_at(text: &str, offset: usize) -> (Token<'_>, usize) {
    let bytes = text.as_bytes();
    let mut pos = offset.min(bytes.len());
    loop {
        while pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
            pos -= 1;
        }
        if pos >= 2 && &bytes[pos - 2..pos] == b"*/" {
            match text[..pos - 2].rfind("/*") {
                Some(open) => {
                    pos = open;
                    continue;
                }
                None => break,
            }
        }
        let line_start = text[..pos].rfind('\n').map_or(0, |nl| nl + 1);
        if let Some(comment) = line_comment_start(&text[line_start..pos]) {
            pos = line_start + comment;
            continue;
        }
        break;
    }
    if pos == 0 {
        return (Token::Boundary, 0);
    }

    let last = bytes[pos - 1];
    if is_word_byte(last) {
        let mut start = pos - 1;
        while start > 0 && is_word_byte(bytes[start - 1]) {
            start -= 1;
        }
        return (Token::Word(&text[start..pos]), start);
    }
    if last == b'{' && pos >= 2 && bytes[pos - 2] == b'$' {
        return (Token::Punct(&text[pos - 2..pos]), pos - 2);
    }
    if is_operator_byte(last) {
        let mut start = pos - 1;
        while start > 0 && is_operator_byte(bytes[start - 1]) {
            start -= 1;
        }
        return (Token::Punct(&text[start..pos]), start);
    }
    (Token::Punct(&text[pos - 1..pos]), pos - 1)
}

/// Offset of a `//` comment in `line`, skipping quoted text and block
/// comments.
fn line_comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quote = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(open) if b == open => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'/' if bytes.get(i + 1) == Some(&b'/') => return Some(i),
                b'/' if bytes.get(i + 1) == Some(&b'*') => match line[i + 2..].find("*/") {
                    Some(close) => i += close + 3,
                    None => return None,
                },
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// The token that starts at or after `offset`.
pub fn next_token(text: &str, offset: usize) -> Token<'_> {
    let bytes = text.as_bytes();
    let mut pos = offset.min(bytes.len());
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if text[pos..].starts_with("//") {
            pos = text[pos..].find('\n').map_or(bytes.len(), |nl| pos + nl);
            continue;
        }
        if text[pos..].starts_with("/*") {
            pos = text[pos + 2..].find("*/").map_or(bytes.len(), |close| pos + 2 + close + 2);
            continue;
        }
        break;
    }
    if pos >= bytes.len() {
        return Token::Boundary;
    }

    let first = bytes[pos];
    if is_word_byte(first) {
        let mut end = pos + 1;
        while end < bytes.len() && is_word_byte(bytes[end]) {
            end += 1;
        }
        return Token::Word(&text[pos..end]);
    }
    if is_operator_byte(first) {
        let mut end = pos + 1;
        while end < bytes.len() && is_operator_byte(bytes[end]) {
            end += 1;
        }
        return Token::Punct(&text[pos..end]);
    }
    Token::Punct(&text[pos..pos + 1])
}

/// Whether the token right before `offset` ends an operand, i.e. an operator
/// starting at `offset` is binary rather than unary.
pub fn ends_operand(text: &str, offset: usize) -> bool {
    match prev_token(text, offset) {
        Token::Word(word) => !OPERATOR_KEYWORDS.contains(&word),
        Token::Punct(p) => matches!(p, ")" | "]" | "'" | "\"" | "`"),
        Token::Boundary => false,
    }
}

/// Whether `word` is a keyword that may directly precede an expression.
pub fn is_operator_keyword(word: &str) -> bool {
    OPERATOR_KEYWORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prev_token_skips_whitespace_and_block_comments() {
        let text = "x = /* note */ value";
        let at = text.find("value").unwrap();
        assert_eq!(prev_token(text, at), Token::Punct("="));
        assert_eq!(prev_token("return value", 7), Token::Word("return"));
        assert_eq!(prev_token("value", 0), Token::Boundary);
    }

    #[test]
    fn prev_token_skips_line_comments() {
        let text = "a;\n// note\nvalue";
        let at = text.find("value").unwrap();
        assert_eq!(prev_token(text, at), Token::Punct(";"));
        assert_eq!(prev_token("// c\nvalue", 5), Token::Boundary);
        let text = "x = // a /* b */ c\n  value";
        let at = text.find("value").unwrap();
        assert_eq!(prev_token(text, at), Token::Punct("="));
        let text = "f('http://a') \nvalue";
        let at = text.find("value").unwrap();
        assert_eq!(prev_token(text, at), Token::Punct(")"));
    }

    #[test]
    fn prev_token_groups_operator_runs() {
        let text = "items.map(x => value)";
        let at = text.find("value").unwrap();
        assert_eq!(prev_token(text, at), Token::Punct("=>"));
        assert_eq!(prev_token("`a${value}`", 4), Token::Punct("${"));
    }

    #[test]
    fn next_token_skips_comments() {
        let text = "value // trailing\n  .then(f)";
        assert_eq!(next_token(text, 5), Token::Punct("."));
        assert_eq!(next_token("value", 5), Token::Boundary);
        assert_eq!(next_token("a ** b", 1), Token::Punct("**"));
    }

    #[test]
    fn distinguishes_binary_from_unary_operators() {
        assert!(ends_operand("a - x", 2));
        assert!(ends_operand("f() - x", 4));
        assert!(!ends_operand("return -x", 7));
        assert!(!ends_operand("(-x)", 1));
    }
}
