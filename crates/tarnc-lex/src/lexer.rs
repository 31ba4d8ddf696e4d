//! The lexer proper: a loop over [`Cursor`] producing [`Token`]s.

use crate::cursor::Cursor;
use crate::Token;
use tarnc_util::{FxHashMap, Handler, Span};

/// Hand-written lexer for Tarn source text.
///
/// Construct one per compilation with the shared diagnostic handler;
/// call [`Lexer::next_token`] until it yields [`Token::Eof`], or use
/// [`tokenize`] to collect the whole stream.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    keywords: FxHashMap<&'static str, Token>,
    handler: &'a Handler,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over `source`, reporting through `handler`.
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        let keywords = FxHashMap::from_iter([
            ("int", Token::Int),
            ("bool", Token::Bool),
            ("void", Token::Void),
            ("struct", Token::Struct),
            ("tru", Token::Tru),
            ("fls", Token::Fls),
            ("receive", Token::Receive),
            ("print", Token::Print),
            ("if", Token::If),
            ("else", Token::Else),
            ("while", Token::While),
            ("repeat", Token::Repeat),
            ("return", Token::Return),
        ]);

        Self {
            cursor: Cursor::new(source),
            keywords,
            handler,
        }
    }

    /// Produce the next token and the span of its first character.
    ///
    /// Bad input (illegal characters, dropped string literals) is
    /// reported and skipped; the stream always ends with `Eof`.
    pub fn next_token(&mut self) -> (Token, Span) {
        loop {
            self.skip_trivia();

            let start = self.cursor.position();
            let line = self.cursor.line();
            let column = self.cursor.column();

            if self.cursor.is_at_end() {
                return (Token::Eof, Span::new(start, start, line, column));
            }

            let c = self.cursor.current_char();
            let token = if is_ident_start(c) {
                Some(self.scan_ident(start))
            } else if c.is_ascii_digit() {
                Some(self.scan_number(start, line, column))
            } else if c == '"' {
                self.scan_string(start, line, column)
            } else {
                self.scan_operator(line, column)
            };

            if let Some(token) = token {
                let span = Span::new(start, self.cursor.position(), line, column);
                return (token, span);
            }
            // The offending text was reported and consumed; keep scanning.
        }
    }

    /// Skip whitespace and line comments (`//` or `#` to end of line).
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.advance_while(|c| c.is_ascii_whitespace());

            let c = self.cursor.current_char();
            if c == '#' || (c == '/' && self.cursor.peek_char(1) == '/') {
                self.cursor.advance_while(|c| c != '\n');
                continue;
            }
            break;
        }
    }

    fn scan_ident(&mut self, start: usize) -> Token {
        self.cursor.advance_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.position());

        match self.keywords.get(text) {
            Some(keyword) => keyword.clone(),
            None => Token::Ident(text.to_string()),
        }
    }

    fn scan_number(&mut self, start: usize, line: u32, column: u32) -> Token {
        self.cursor.advance_while(|c| c.is_ascii_digit());
        let text = self.cursor.slice(start, self.cursor.position());

        match text.parse::<i32>() {
            Ok(value) => Token::IntLit(value),
            Err(_) => {
                self.handler.warn(
                    Span::new(start, self.cursor.position(), line, column),
                    "integer literal too large; using max value",
                );
                Token::IntLit(i32::MAX)
            }
        }
    }

    /// Scan a string literal, keeping its raw text (quotes included).
    ///
    /// Returns `None` when the literal is dropped: unterminated at
    /// newline or end of input, or containing a bad escape sequence.
    fn scan_string(&mut self, start: usize, line: u32, column: u32) -> Option<Token> {
        self.cursor.advance(); // opening quote
        let mut bad_escape = false;

        loop {
            match self.cursor.current_char() {
                '"' => {
                    self.cursor.advance();
                    if bad_escape {
                        self.handler.fatal(
                            Span::point(line, column),
                            "string literal with bad escaped character ignored",
                        );
                        return None;
                    }
                    let raw = self.cursor.slice(start, self.cursor.position());
                    return Some(Token::StrLit(raw.to_string()));
                }
                '\n' | '\0' => {
                    let message = if bad_escape {
                        "unterminated string literal with bad escaped character ignored"
                    } else {
                        "unterminated string literal ignored"
                    };
                    self.handler.fatal(Span::point(line, column), message);
                    return None;
                }
                '\\' => {
                    self.cursor.advance();
                    match self.cursor.current_char() {
                        'n' | 't' | '\'' | '"' | '?' | '\\' => self.cursor.advance(),
                        '\n' | '\0' => {
                            self.handler.fatal(
                                Span::point(line, column),
                                "unterminated string literal with bad escaped character ignored",
                            );
                            return None;
                        }
                        _ => {
                            bad_escape = true;
                            self.cursor.advance();
                        }
                    }
                }
                _ => self.cursor.advance(),
            }
        }
    }

    fn scan_operator(&mut self, line: u32, column: u32) -> Option<Token> {
        let c = self.cursor.current_char();
        let next = self.cursor.peek_char(1);
        self.cursor.advance();

        let two = |lexer: &mut Self, token: Token| {
            lexer.cursor.advance();
            Some(token)
        };

        match (c, next) {
            ('{', _) => Some(Token::LBrace),
            ('}', _) => Some(Token::RBrace),
            ('(', _) => Some(Token::LParen),
            (')', _) => Some(Token::RParen),
            (';', _) => Some(Token::Semicolon),
            (',', _) => Some(Token::Comma),
            ('.', _) => Some(Token::Dot),
            ('<', '<') => two(self, Token::Write),
            ('<', '=') => two(self, Token::LtEq),
            ('<', _) => Some(Token::Lt),
            ('>', '>') => two(self, Token::Read),
            ('>', '=') => two(self, Token::GtEq),
            ('>', _) => Some(Token::Gt),
            ('+', '+') => two(self, Token::PlusPlus),
            ('+', _) => Some(Token::Plus),
            ('-', '-') => two(self, Token::MinusMinus),
            ('-', _) => Some(Token::Minus),
            ('*', _) => Some(Token::Star),
            ('/', _) => Some(Token::Slash),
            ('&', '&') => two(self, Token::AndAnd),
            ('|', '|') => two(self, Token::OrOr),
            ('=', '=') => two(self, Token::EqEq),
            ('=', _) => Some(Token::Eq),
            ('!', '=') => two(self, Token::NotEq),
            ('!', _) => Some(Token::Not),
            _ => {
                self.handler.fatal(
                    Span::point(line, column),
                    format!("illegal character ignored: {}", c),
                );
                None
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lex an entire source into a token stream ending with `Eof`.
pub fn tokenize(source: &str, handler: &Handler) -> Vec<(Token, Span)> {
    let mut lexer = Lexer::new(source, handler);
    let mut tokens = Vec::new();

    loop {
        let (token, span) = lexer.next_token();
        let done = token == Token::Eof;
        tokens.push((token, span));
        if done {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        let handler = Handler::new();
        let tokens: Vec<_> = tokenize(source, &handler)
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert!(!handler.has_errors(), "unexpected lex errors");
        tokens
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            lex("int bool void struct tru fls receive print if else while repeat return"),
            vec![
                Token::Int,
                Token::Bool,
                Token::Void,
                Token::Struct,
                Token::Tru,
                Token::Fls,
                Token::Receive,
                Token::Print,
                Token::If,
                Token::Else,
                Token::While,
                Token::Repeat,
                Token::Return,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            lex("x foo_bar _tmp intx"),
            vec![
                Token::Ident("x".into()),
                Token::Ident("foo_bar".into()),
                Token::Ident("_tmp".into()),
                Token::Ident("intx".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_int_literals() {
        assert_eq!(
            lex("0 7 2147483647"),
            vec![
                Token::IntLit(0),
                Token::IntLit(7),
                Token::IntLit(i32::MAX),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literal_keeps_raw_text() {
        assert_eq!(
            lex(r#""hi" "a\nb""#),
            vec![
                Token::StrLit(r#""hi""#.into()),
                Token::StrLit(r#""a\nb""#.into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex("<< >> ++ -- + - * / ! && || = == != < > <= >="),
            vec![
                Token::Write,
                Token::Read,
                Token::PlusPlus,
                Token::MinusMinus,
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Not,
                Token::AndAnd,
                Token::OrOr,
                Token::Eq,
                Token::EqEq,
                Token::NotEq,
                Token::Lt,
                Token::Gt,
                Token::LtEq,
                Token::GtEq,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            lex("{ } ( ) ; , ."),
            vec![
                Token::LBrace,
                Token::RBrace,
                Token::LParen,
                Token::RParen,
                Token::Semicolon,
                Token::Comma,
                Token::Dot,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            lex("int x; // trailing\n# whole line\nbool y;"),
            vec![
                Token::Int,
                Token::Ident("x".into()),
                Token::Semicolon,
                Token::Bool,
                Token::Ident("y".into()),
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let handler = Handler::new();
        let tokens = tokenize("int x;\n  x = 3;", &handler);

        // "int" at 1:1, "x" at 1:5, ";" at 1:6
        assert_eq!((tokens[0].1.line, tokens[0].1.column), (1, 1));
        assert_eq!((tokens[1].1.line, tokens[1].1.column), (1, 5));
        assert_eq!((tokens[2].1.line, tokens[2].1.column), (1, 6));
        // second-line "x" at 2:3
        assert_eq!((tokens[3].1.line, tokens[3].1.column), (2, 3));
    }

    #[test]
    fn test_adjacent_operators() {
        // ">>=" lexes as ">>" "=", and "a.b" as three tokens
        assert_eq!(
            lex("a.b >>="),
            vec![
                Token::Ident("a".into()),
                Token::Dot,
                Token::Ident("b".into()),
                Token::Read,
                Token::Eq,
                Token::Eof,
            ]
        );
    }
}
