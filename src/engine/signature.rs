//! Signature normalization
//!
//! Reduces a raw method declaration (`@Override public <T> List<T> find(final Map<K, V> m)`)
//! to a canonical `return-type name ( param-types )` string with generics,
//! annotations, modifiers and parameter names removed: `Listfind(Map)`.

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "abstract",
    "final",
    "synchronized",
    "native",
    "strictfp",
    "default",
    "transient",
    "volatile",
    "sealed",
    "non-sealed",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Open,
    Comma,
    Close,
    Less,
    Greater,
    Symbol(String),
}

impl Token {
    fn is_delimiter(&self) -> bool {
        matches!(self, Token::Open | Token::Comma | Token::Close)
    }
}

/// Normalize a raw declaration into its canonical signature.
///
/// When the text does not look like a declaration, its whitespace is removed
/// and the result is tried once more. Removing whitespace can merge modifiers
/// into a plain word, so only this second form is a fixed point.
pub fn normalize_signature(raw: &str) -> String {
    if let Some(signature) = canonical(raw) {
        return signature;
    }
    let stripped = strip_whitespace(raw);
    canonical(&stripped).unwrap_or(stripped)
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

fn canonical(raw: &str) -> Option<String> {
    let tokens = tokenize(raw);
    let tokens = drop_annotations(tokens);
    let tokens = drop_generics(tokens)?;
    let tokens: Vec<Token> = tokens
        .into_iter()
        .filter(|t| !matches!(t, Token::Word(w) if MODIFIERS.contains(&w.as_str())))
        .collect();
    let tokens = merge_qualifiers(tokens);

    let open = tokens.iter().position(|t| *t == Token::Open)?;

    // Return type and name: the last two words before the parameter list
    let head: Vec<&str> = tokens[..open]
        .iter()
        .filter_map(|t| match t {
            Token::Word(w) => Some(w.as_str()),
            _ => None,
        })
        .collect();
    if head.is_empty() {
        return None;
    }
    let mut out: String = head[head.len().saturating_sub(2)..].concat();

    // Parameter types: the word right after `(` or `,`
    let mut previous = &Token::Open;
    let mut closed = false;
    for token in &tokens[open..] {
        match token {
            Token::Open => out.push('('),
            Token::Comma => out.push(','),
            Token::Close => {
                out.push(')');
                closed = true;
                break;
            }
            Token::Word(w) if previous.is_delimiter() => out.push_str(w),
            _ => {}
        }
        previous = token;
    }

    closed.then_some(out)
}

fn tokenize(raw: &str) -> Vec<Token> {
    let chars: Vec<char> = raw.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if is_word_char(c) {
            let start = i;
            while i < chars.len() && (is_word_char(chars[i]) || chars[i] == '-' && is_sealed_dash(&chars, start, i)) {
                i += 1;
            }
            tokens.push(Token::Word(chars[start..i].iter().collect()));
            continue;
        }
        let token = match c {
            '(' => Token::Open,
            ',' => Token::Comma,
            ')' => Token::Close,
            '<' => Token::Less,
            '>' => Token::Greater,
            '.' if chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') => {
                i += 2;
                Token::Symbol("...".to_string())
            }
            other => Token::Symbol(other.to_string()),
        };
        tokens.push(token);
        i += 1;
    }

    tokens
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

// `non-sealed` is the only hyphenated Java keyword; any other dash ends the word
fn is_sealed_dash(chars: &[char], start: usize, at: usize) -> bool {
    let rest = &chars[at + 1..];
    chars[start..at].iter().copied().eq("non".chars())
        && rest.iter().copied().take(6).eq("sealed".chars())
        && !rest.get(6).is_some_and(|&c| is_word_char(c))
}

/// Remove `@Name`, `@a.b.Name` and an optional `( ... )` argument list
fn drop_annotations(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        if !matches!(&token, Token::Symbol(s) if s == "@") {
            out.push(token);
            continue;
        }
        if matches!(iter.peek(), Some(Token::Word(_))) {
            iter.next();
        }
        while matches!(iter.peek(), Some(Token::Symbol(s)) if s == ".") {
            iter.next();
            if matches!(iter.peek(), Some(Token::Word(_))) {
                iter.next();
            }
        }
        if iter.peek() == Some(&Token::Open) {
            let mut depth = 0usize;
            for t in iter.by_ref() {
                match t {
                    Token::Open => depth += 1,
                    Token::Close => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    out
}

/// Discard everything inside `<...>`, returning `None` on unbalanced brackets
fn drop_generics(tokens: Vec<Token>) -> Option<Vec<Token>> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut balance = 0usize;

    for token in tokens {
        match token {
            Token::Less => balance += 1,
            Token::Greater => balance = balance.checked_sub(1)?,
            _ if balance > 0 => {}
            other => out.push(other),
        }
    }

    (balance == 0).then_some(out)
}

/// Fold `[]`, `...` and `.Name` into the preceding word
fn merge_qualifiers(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        let suffix = match &token {
            Token::Symbol(s) if s == "[" || s == "]" || s == "..." => Some(s.clone()),
            Token::Symbol(s) if s == "." => match iter.peek() {
                Some(Token::Word(w)) => {
                    let joined = format!(".{}", w);
                    iter.next();
                    Some(joined)
                }
                _ => None,
            },
            _ => None,
        };

        match (suffix, out.last_mut()) {
            (Some(suffix), Some(Token::Word(prev))) => prev.push_str(&suffix),
            (Some(_), _) => {}
            (None, _) => out.push(token),
        }
    }

    out
}
