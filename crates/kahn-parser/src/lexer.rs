//! Lexer for ES5 JavaScript.
//!
//! Built on logos for the regular part of the grammar. Regular expression
//! literals are not regular in that sense: whether `/` starts a regex or
//! divides depends on the previous token, so the lexer scans them by hand
//! after logos reports a `/` or `/=` in a position where an operand is
//! expected.

use crate::token::{Span, Token};
use logos::Logos;
use unicode_xid::UnicodeXID;

/// Logos-based token enum for lexing.
///
/// Converted to [`Token`] after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    // Whitespace (skip)
    #[regex(r"[ \t\r\n\u{000B}\u{000C}\u{00A0}\u{FEFF}\u{2028}\u{2029}]+", logos::skip)]
    Whitespace,

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*", lex_block_comment)]
    BlockComment,

    // Keywords (must come before identifiers)
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("catch")]
    Catch,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("debugger")]
    Debugger,
    #[token("default")]
    Default,
    #[token("delete")]
    Delete,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("finally")]
    Finally,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("instanceof")]
    Instanceof,
    #[token("let")]
    Let,
    #[token("new")]
    New,
    #[token("return")]
    Return,
    #[token("switch")]
    Switch,
    #[token("this")]
    This,
    #[token("throw")]
    Throw,
    #[token("try")]
    Try,
    #[token("typeof")]
    Typeof,
    #[token("var")]
    Var,
    #[token("void")]
    Void,
    #[token("while")]
    While,
    #[token("with")]
    With,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Identifiers; non-ASCII letters and `\uXXXX` escapes are scanned by hand
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Numbers keep their source spelling
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| lex.slice().to_string())]
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    // Strings
    #[regex(r#""([^"\\\n]|\\(\r\n|.|\n))*""#, parse_string)]
    #[regex(r"'([^'\\\n]|\\(\r\n|.|\n))*'", parse_string)]
    String(String),

    // Multi-character operators (longest first)
    #[token(">>>=")]
    GreaterGreaterGreaterEqual,
    #[token("===")]
    EqualEqualEqual,
    #[token("!==")]
    BangEqualEqual,
    #[token(">>>")]
    GreaterGreaterGreater,
    #[token("<<=")]
    LessLessEqual,
    #[token(">>=")]
    GreaterGreaterEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("<<")]
    LessLess,
    #[token(">>")]
    GreaterGreater,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("&=")]
    AmpEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,

    // Single-character operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("=")]
    Equal,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,

    // Delimiters
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
}

fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> logos::Skip {
    // "/*" is already consumed
    let remainder = lex.remainder();

    if let Some(end) = remainder.find("*/") {
        lex.bump(end + 2);
    } else {
        lex.bump(remainder.len());
    }

    logos::Skip
}

fn parse_string(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let s = lex.slice();
    unescape_string(&s[1..s.len() - 1])
}

/// Decode the escape sequences of a string literal body.
///
/// Returns `None` for a malformed `\x` or `\u` escape.
fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('b') => result.push('\u{0008}'),
            Some('f') => result.push('\u{000C}'),
            Some('v') => result.push('\u{000B}'),
            Some('0') if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => result.push('\0'),
            Some('x') => result.push(read_hex_escape(&mut chars, 2)?),
            Some('u') => result.push(read_hex_escape(&mut chars, 4)?),
            // Line continuation
            Some('\n') | Some('\u{2028}') | Some('\u{2029}') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(other) => result.push(other),
            None => break,
        }
    }

    Some(result)
}

fn read_hex_escape(chars: &mut impl Iterator<Item = char>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    // Lone surrogates cannot be represented in a Rust string
    char::from_u32(value).or(Some('\u{FFFD}'))
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
    context: RegexContext,
}

/// What a `{` opened.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Brace {
    /// A block or a function declaration body; a `/` after its `}` starts
    /// a regex.
    Statement,
    /// An object literal or a function expression body; its `}` ends an
    /// operand.
    Expression,
}

/// Enough syntactic context to tell a regex `/` from a division when the
/// previous token alone cannot: `)`, `}` and `++`/`--`.
#[derive(Debug)]
struct RegexContext {
    regex_allowed: bool,
    /// Open braces, innermost last
    braces: Vec<Brace>,
    /// Open parens; true when the paren holds an `if`/`while`/`for`/`with` head
    parens: Vec<bool>,
    /// Set between `function` and its body: whether the function is an expression
    function: Option<bool>,
    /// Unmatched `?` per open brace, plus one for the top level
    ternaries: Vec<usize>,
    /// Whether the last `:` closed a conditional
    ternary_colon: bool,
}

impl RegexContext {
    fn new() -> Self {
        Self {
            regex_allowed: true,
            braces: Vec::new(),
            parens: Vec::new(),
            function: None,
            ternaries: vec![0],
            ternary_colon: false,
        }
    }

    /// Whether a `{` or `function` following `previous` starts a statement.
    fn statement_position(&self, previous: Option<&Token>) -> bool {
        match previous {
            None => true,
            Some(
                Token::Semicolon
                | Token::RightBrace
                | Token::RightParen
                | Token::Else
                | Token::Do
                | Token::Try
                | Token::Finally,
            ) => true,
            Some(Token::LeftBrace) => self.braces.last() != Some(&Brace::Expression),
            // A label or a `case` clause, unless it closes a conditional or
            // an object literal property name
            Some(Token::Colon) => {
                !self.ternary_colon && self.braces.last() != Some(&Brace::Expression)
            }
            _ => false,
        }
    }

    /// Update the context for `token`, which follows `previous`.
    fn advance(&mut self, previous: Option<&Token>, token: &Token, newline_before: bool) {
        self.regex_allowed = match token {
            Token::Function => {
                self.function = Some(!self.statement_position(previous));
                true
            }
            Token::LeftBrace => {
                let expression = match self.function.take() {
                    Some(expression) => expression,
                    None => !self.statement_position(previous),
                };
                self.braces.push(if expression {
                    Brace::Expression
                } else {
                    Brace::Statement
                });
                self.ternaries.push(0);
                true
            }
            Token::RightBrace => {
                if self.ternaries.len() > 1 {
                    self.ternaries.pop();
                }
                self.braces.pop() != Some(Brace::Expression)
            }
            Token::LeftParen => {
                let head = matches!(
                    previous,
                    Some(Token::If | Token::While | Token::For | Token::With)
                );
                self.parens.push(head);
                true
            }
            Token::RightParen => self.parens.pop().unwrap_or(false),
            // Postfix when it directly follows an operand on the same line
            Token::PlusPlus | Token::MinusMinus => self.regex_allowed || newline_before,
            Token::Question => {
                if let Some(open) = self.ternaries.last_mut() {
                    *open += 1;
                }
                true
            }
            Token::Colon => {
                self.ternary_colon = self.close_ternary();
                true
            }
            other => other.allows_regex_after(),
        };
    }

    fn close_ternary(&mut self) -> bool {
        match self.ternaries.last_mut() {
            Some(open) if *open > 0 => {
                *open -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedCharacter { char: char, span: Span },
    UnterminatedRegex { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. } | LexError::UnterminatedRegex { span } => *span,
        }
    }
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
            context: RegexContext::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut logos_lexer = LogosToken::lexer(self.source);
        let mut line = 1u32;
        let mut column = 1u32;
        let mut last_end = 0;

        while let Some(token_result) = logos_lexer.next() {
            let range = logos_lexer.span();
            advance_position(&self.source[last_end..range.start], &mut line, &mut column);

            let (token, end) = match token_result {
                Ok(LogosToken::Slash | LogosToken::SlashEqual) if self.regex_allowed() => {
                    match self.scan_regex(range.start, line, column) {
                        Ok((token, end)) => {
                            logos_lexer.bump(end - range.end);
                            (token, end)
                        }
                        Err(err) => {
                            self.errors.push(err);
                            advance_position(&self.source[range.clone()], &mut line, &mut column);
                            last_end = range.end;
                            continue;
                        }
                    }
                }
                Ok(logos_token) => {
                    let token = convert_token(logos_token);
                    let word = matches!(token, Token::Identifier(_)) || token.is_keyword();
                    let continued = word
                        && self.source[range.end..].starts_with(|c: char| c == '\\' || !c.is_ascii());
                    match continued.then(|| self.scan_identifier(range.start)).flatten() {
                        Some((name, end)) if end > range.end => {
                            logos_lexer.bump(end - range.end);
                            (Token::Identifier(name), end)
                        }
                        _ => (token, range.end),
                    }
                }
                Err(_) => match self.scan_identifier(range.start) {
                    Some((name, end)) if end >= range.end => {
                        logos_lexer.bump(end - range.end);
                        (Token::Identifier(name), end)
                    }
                    _ => {
                        let char = self.source[range.start..].chars().next().unwrap_or('\0');
                        let span = Span::new(range.start, range.end, line, column);
                        self.errors.push(LexError::UnexpectedCharacter { char, span });
                        advance_position(&self.source[range.clone()], &mut line, &mut column);
                        last_end = range.end;
                        continue;
                    }
                },
            };

            let newline_before = self.source[last_end..range.start]
                .contains(&['\n', '\r', '\u{2028}', '\u{2029}'][..]);
            self.track(&token, newline_before);

            let span = Span::new(range.start, end, line, column);
            self.tokens.push((token, span));
            advance_position(&self.source[range.start..end], &mut line, &mut column);
            last_end = end;
        }

        let eof_span = Span::new(self.source.len(), self.source.len(), line, column);
        self.tokens.push((Token::Eof, eof_span));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn regex_allowed(&self) -> bool {
        self.context.regex_allowed
    }

    fn track(&mut self, token: &Token, newline_before: bool) {
        let previous = self.tokens.last().map(|(token, _)| token);
        self.context.advance(previous, token, newline_before);
    }

    /// Scan an identifier starting at `start`, decoding `\uXXXX` escapes.
    ///
    /// Only called where logos stopped short: at a non-ASCII letter, at a
    /// backslash, or on a word followed by either. Returns `None` when no
    /// valid identifier starts there, including an escaped reserved word.
    fn scan_identifier(&self, start: usize) -> Option<(String, usize)> {
        let source = &self.source[start..];
        let mut name = String::new();
        let mut escaped = false;
        let mut offset = 0;

        while let Some(c) = source[offset..].chars().next() {
            let (c, len, escape) = if c == '\\' {
                let digits = source.get(offset + 1..offset + 6)?.strip_prefix('u')?;
                if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return None;
                }
                (char::from_u32(u32::from_str_radix(digits, 16).ok()?)?, 6, true)
            } else {
                (c, c.len_utf8(), false)
            };

            let valid = if name.is_empty() {
                is_identifier_start(c)
            } else {
                is_identifier_part(c)
            };
            match (valid, escape) {
                (true, _) => {}
                (false, true) => return None,
                (false, false) => break,
            }

            name.push(c);
            escaped |= escape;
            offset += len;
        }

        if name.is_empty() || (escaped && is_reserved_word(&name)) {
            return None;
        }
        Some((name, start + offset))
    }

    /// Scan a regular expression literal starting at the opening `/`.
    ///
    /// Returns the token and the byte offset just past its flags.
    fn scan_regex(&self, start: usize, line: u32, column: u32) -> Result<(Token, usize), LexError> {
        let body_start = start + 1;
        let mut chars = self.source[body_start..].char_indices();
        let mut in_class = false;

        let body_end = loop {
            let unterminated = || LexError::UnterminatedRegex {
                span: Span::new(start, body_start, line, column),
            };
            let (offset, c) = chars.next().ok_or_else(unterminated)?;
            match c {
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => return Err(unterminated()),
                '\\' => match chars.next() {
                    Some((_, '\n' | '\r' | '\u{2028}' | '\u{2029}')) | None => {
                        return Err(unterminated())
                    }
                    Some(_) => {}
                },
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break body_start + offset,
                _ => {}
            }
        };

        let flags_start = body_end + 1;
        let flags_len = self.source[flags_start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(self.source.len() - flags_start);
        let end = flags_start + flags_len;

        let token = Token::Regex {
            pattern: self.source[body_start..body_end].to_string(),
            flags: self.source[flags_start..end].to_string(),
        };
        Ok((token, end))
    }
}

/// Whether `c` may start an identifier.
pub(crate) fn is_identifier_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_xid_start()
}

/// Whether `c` may continue an identifier.
pub(crate) fn is_identifier_part(c: char) -> bool {
    c == '$' || c == '\u{200C}' || c == '\u{200D}' || c.is_xid_continue()
}

/// Whether `name`, spelled with escapes, is a reserved word.
fn is_reserved_word(name: &str) -> bool {
    let mut lexer = LogosToken::lexer(name);
    match (lexer.next(), lexer.next()) {
        (Some(Ok(token)), None) => convert_token(token).is_keyword(),
        _ => false,
    }
}

fn advance_position(text: &str, line: &mut u32, column: &mut u32) {
    for c in text.chars() {
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
}

fn convert_token(logos_token: LogosToken) -> Token {
    match logos_token {
        LogosToken::Break => Token::Break,
        LogosToken::Case => Token::Case,
        LogosToken::Catch => Token::Catch,
        LogosToken::Const => Token::Const,
        LogosToken::Continue => Token::Continue,
        LogosToken::Debugger => Token::Debugger,
        LogosToken::Default => Token::Default,
        LogosToken::Delete => Token::Delete,
        LogosToken::Do => Token::Do,
        LogosToken::Else => Token::Else,
        LogosToken::Finally => Token::Finally,
        LogosToken::For => Token::For,
        LogosToken::Function => Token::Function,
        LogosToken::If => Token::If,
        LogosToken::In => Token::In,
        LogosToken::Instanceof => Token::Instanceof,
        LogosToken::Let => Token::Let,
        LogosToken::New => Token::New,
        LogosToken::Return => Token::Return,
        LogosToken::Switch => Token::Switch,
        LogosToken::This => Token::This,
        LogosToken::Throw => Token::Throw,
        LogosToken::Try => Token::Try,
        LogosToken::Typeof => Token::Typeof,
        LogosToken::Var => Token::Var,
        LogosToken::Void => Token::Void,
        LogosToken::While => Token::While,
        LogosToken::With => Token::With,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::Null => Token::Null,
        LogosToken::Identifier(s) => Token::Identifier(s),
        LogosToken::Number(raw) => Token::Number(raw),
        LogosToken::String(s) => Token::String(s),
        LogosToken::GreaterGreaterGreaterEqual => Token::GreaterGreaterGreaterEqual,
        LogosToken::EqualEqualEqual => Token::EqualEqualEqual,
        LogosToken::BangEqualEqual => Token::BangEqualEqual,
        LogosToken::GreaterGreaterGreater => Token::GreaterGreaterGreater,
        LogosToken::LessLessEqual => Token::LessLessEqual,
        LogosToken::GreaterGreaterEqual => Token::GreaterGreaterEqual,
        LogosToken::EqualEqual => Token::EqualEqual,
        LogosToken::BangEqual => Token::BangEqual,
        LogosToken::LessEqual => Token::LessEqual,
        LogosToken::GreaterEqual => Token::GreaterEqual,
        LogosToken::AmpAmp => Token::AmpAmp,
        LogosToken::PipePipe => Token::PipePipe,
        LogosToken::PlusPlus => Token::PlusPlus,
        LogosToken::MinusMinus => Token::MinusMinus,
        LogosToken::LessLess => Token::LessLess,
        LogosToken::GreaterGreater => Token::GreaterGreater,
        LogosToken::PlusEqual => Token::PlusEqual,
        LogosToken::MinusEqual => Token::MinusEqual,
        LogosToken::StarEqual => Token::StarEqual,
        LogosToken::SlashEqual => Token::SlashEqual,
        LogosToken::PercentEqual => Token::PercentEqual,
        LogosToken::AmpEqual => Token::AmpEqual,
        LogosToken::PipeEqual => Token::PipeEqual,
        LogosToken::CaretEqual => Token::CaretEqual,
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::Slash => Token::Slash,
        LogosToken::Percent => Token::Percent,
        LogosToken::Bang => Token::Bang,
        LogosToken::Tilde => Token::Tilde,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Amp => Token::Amp,
        LogosToken::Pipe => Token::Pipe,
        LogosToken::Caret => Token::Caret,
        LogosToken::Equal => Token::Equal,
        LogosToken::Question => Token::Question,
        LogosToken::Dot => Token::Dot,
        LogosToken::Colon => Token::Colon,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::LeftBrace => Token::LeftBrace,
        LogosToken::RightBrace => Token::RightBrace,
        LogosToken::LeftBracket => Token::LeftBracket,
        LogosToken::RightBracket => Token::RightBracket,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::Comma => Token::Comma,
        LogosToken::Whitespace | LogosToken::LineComment | LogosToken::BlockComment => {
            unreachable!("Whitespace and comments should be skipped")
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedCharacter { char, span } => {
                write!(f, "Unexpected character '{}' at {}:{}", char, span.line, span.column)
            }
            LexError::UnterminatedRegex { span } => {
                write!(f, "Unterminated regular expression at {}:{}", span.line, span.column)
            }
        }
    }
}

impl std::error::Error for LexError {}
