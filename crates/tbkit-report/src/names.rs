//! The extractor tokenizes a line of code and lists the dotted identifiers
//! (`a`, `a.b.c`) appearing on it, in first-appearance order and without
//! duplicates. The list is a superset of the names worth displaying: callers
//! decide which ones they actually resolve.
//!
//! Reserved words are never listed, and neither are identifiers appearing in
//! strings, comments or numeric literals.
//!
//! ```
//! use tbkit_report::names::extract_names;
//!
//! assert_eq!(
//!     extract_names("total = a.b.c + foo(bar) + bar"),
//!     ["total", "a.b.c", "foo", "bar"],
//! );
//! ```

use indexmap::IndexSet;

/// Reserved words of the language, never listed as names.
pub const KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

/// Returns whether the given identifier is a reserved word.
pub fn is_keyword(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
}

/// Lists the dotted names appearing on a single line of code.
pub fn extract_names(line: &str) -> Vec<String> {
    extract_statement([line])
}

/// Lists the dotted names appearing in the statement starting at the first
/// given line.
///
/// Following lines are consumed as long as the statement goes on (open
/// brackets, multi-line strings or explicit line continuations). If the lines
/// run out before the statement ends, the names found so far are returned.
pub fn extract_statement<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokenizer = Tokenizer::default();
    let mut collector = NameCollector::default();

    let mut complete = false;
    for line in lines {
        if let Step::Stop = tokenizer.feed(line.as_ref(), &mut collector) {
            complete = true;
            break;
        }
    }

    if !complete {
        tracing::warn!(
            "unexpected end of statement while tokenizing, listed names may be incomplete"
        );
    }

    collector.finish()
}

/// Whether tokenizing should go on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token<'a> {
    Name(&'a str),
    Dot,
    Newline,
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Pending {
    #[default]
    None,
    /// The next identifier is an attribute of the last listed name.
    Attribute,
    /// The next identifier is an attribute of an arbitrary expression.
    Skip,
}

/// Stateful token consumer building dotted names.
#[derive(Debug, Default)]
struct NameCollector {
    names: Vec<String>,
    after_name: bool,
    pending: Pending,
}

impl NameCollector {
    fn eat(&mut self, token: Token<'_>) -> Step {
        let after_name = std::mem::take(&mut self.after_name);
        let pending = std::mem::take(&mut self.pending);

        match token {
            Token::Newline => return Step::Stop,

            Token::Dot => match self.names.last_mut() {
                Some(last) if after_name => {
                    last.push('.');
                    self.pending = Pending::Attribute;
                }
                _ => self.pending = Pending::Skip,
            },

            Token::Name(ident) if !is_keyword(ident) => match pending {
                Pending::Attribute => {
                    if let Some(last) = self.names.last_mut() {
                        last.push_str(ident);
                    }
                    self.after_name = true;
                }
                Pending::Skip => (),
                Pending::None => {
                    self.names.push(ident.to_owned());
                    self.after_name = true;
                }
            },

            Token::Name(_) | Token::Other => (),
        }

        Step::Continue
    }

    fn finish(self) -> Vec<String> {
        self.names
            .iter()
            .map(|name| name.trim_end_matches('.'))
            .filter(|name| !name.is_empty())
            .collect::<IndexSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StringDelim {
    quote: u8,
    triple: bool,
}

/// Line-by-line tokenizer, tracking the state spanning lines.
#[derive(Debug, Default)]
struct Tokenizer {
    depth: usize,
    open_string: Option<StringDelim>,
}

impl Tokenizer {
    fn feed(&mut self, line: &str, collector: &mut NameCollector) -> Step {
        let mut cursor = Cursor { line, pos: 0 };
        let mut continued = false;

        if let Some(delim) = self.open_string.take() {
            if !cursor.skip_string(delim) {
                self.open_string = Some(delim);
                return Step::Continue;
            }
        }

        while let Some(b) = cursor.bump() {
            let start = cursor.pos - 1;

            let token = match b {
                b if b.is_ascii_whitespace() => continue,
                b'#' => break,
                b'\\' => {
                    if cursor.rest().trim().is_empty() {
                        continued = true;
                        break;
                    }
                    Token::Other
                }
                b'\'' | b'"' => {
                    self.string(&mut cursor, b);
                    Token::Other
                }
                b'.' if cursor.rest().starts_with("..") => {
                    cursor.pos += 2;
                    Token::Other
                }
                b'.' if cursor.peek().is_some_and(|b| b.is_ascii_digit()) => {
                    cursor.skip_number();
                    Token::Other
                }
                b'.' => Token::Dot,
                b if b.is_ascii_digit() => {
                    cursor.skip_number();
                    Token::Other
                }
                b if is_ident_start(b) => {
                    cursor.eat_while(is_ident_continue);
                    let ident = &line[start..cursor.pos];

                    match cursor.peek() {
                        Some(q @ (b'\'' | b'"')) if is_string_prefix(ident) => {
                            cursor.pos += 1;
                            self.string(&mut cursor, q);
                            Token::Other
                        }
                        _ => Token::Name(ident),
                    }
                }
                b'(' | b'[' | b'{' => {
                    self.depth += 1;
                    Token::Other
                }
                b')' | b']' | b'}' => {
                    self.depth = self.depth.saturating_sub(1);
                    Token::Other
                }
                _ => Token::Other,
            };

            collector.eat(token);

            if self.open_string.is_some() {
                return Step::Continue;
            }
        }

        if continued || self.depth > 0 {
            Step::Continue
        } else {
            collector.eat(Token::Newline)
        }
    }

    /// Skips a string literal whose opening quote was just consumed.
    fn string(&mut self, cursor: &mut Cursor<'_>, quote: u8) {
        let triple = cursor.rest().as_bytes().starts_with(&[quote, quote]);
        if triple {
            cursor.pos += 2;
        }

        let delim = StringDelim { quote, triple };

        // single-quoted strings can't span lines
        if !cursor.skip_string(delim) && triple {
            self.open_string = Some(delim);
        }
    }
}

struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn rest(&self) -> &str {
        self.line.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<u8> {
        self.line.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
    }

    fn skip_number(&mut self) {
        let mut prev = 0;
        while let Some(b) = self.peek() {
            let exponent_sign = matches!(b, b'+' | b'-') && matches!(prev, b'e' | b'E');
            if !(b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || exponent_sign) {
                break;
            }
            prev = b;
            self.pos += 1;
        }
    }

    /// Skips the content of a string literal, up to (and including) its
    /// closing quotes. Returns whether they were found on this line.
    fn skip_string(&mut self, delim: StringDelim) -> bool {
        while let Some(b) = self.bump() {
            if b == b'\\' {
                self.bump();
            } else if b == delim.quote {
                if !delim.triple {
                    return true;
                }
                if self.rest().as_bytes().starts_with(&[delim.quote, delim.quote]) {
                    self.pos += 2;
                    return true;
                }
            }
        }
        false
    }
}

// UTF-8 bytes of non-ASCII characters are always >= 0x80, so slicing at an
// ASCII byte never splits a character.
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn is_string_prefix(ident: &str) -> bool {
    matches!(
        ident.to_ascii_lowercase().as_str(),
        "r" | "b" | "u" | "f" | "br" | "rb" | "fr" | "rf"
    )
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::{extract_names, extract_statement};

    #[test]
    fn dotted_names_in_order() {
        let names = extract_names("a.b.c + foo(bar) + bar");
        assert_eq!(names, ["a.b.c", "foo", "bar"]);

        assert_eq!(extract_names("a.b.c + foo(bar) + bar"), names);
    }

    #[test]
    fn keywords_are_never_listed() {
        assert_eq!(
            extract_names("if x is not None and y.z:"),
            ["x", "y.z"]
        );
        assert_eq!(
            extract_names("return [v for v in values if v]"),
            ["v", "values"]
        );
    }

    #[test]
    fn literals_and_comments_are_skipped() {
        assert_eq!(extract_names("print('a.b', x)"), ["print", "x"]);
        assert_eq!(extract_names("sep = ''.join(items)"), ["sep", "items"]);
        assert_eq!(extract_names("total = 1.5 * rate + 2e-3"), ["total", "rate"]);
        assert_eq!(extract_names("x = y  # z.w"), ["x", "y"]);
        assert_eq!(extract_names(r#"r'\d' + b"raw" + z"#), ["z"]);
    }

    #[test]
    fn attributes_of_expressions_are_skipped() {
        assert_eq!(extract_names("a[0].b.c + d"), ["a", "d"]);
        assert_eq!(extract_names("f(x).y"), ["f", "x"]);
    }

    #[test]
    fn statement_spans_open_brackets() {
        let lines = ["result = compute(a,", "    b.c)", "other = d"];
        assert_eq!(
            extract_statement(lines),
            ["result", "compute", "a", "b.c"]
        );
    }

    #[test]
    fn statement_spans_continuations() {
        let lines = ["x = a + \\", "    b", "c"];
        assert_eq!(extract_statement(lines), ["x", "a", "b"]);

        let lines = [r#"s = """doc"#, r#"x.y """ + z"#, "w"];
        assert_eq!(extract_statement(lines), ["s", "z"]);
    }

    #[test]
    fn unterminated_statement_keeps_names() {
        let lines = ["call(a,", "  b"];
        assert_eq!(extract_statement(lines), ["call", "a", "b"]);
    }
}
