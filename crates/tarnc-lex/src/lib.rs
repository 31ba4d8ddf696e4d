//! tarnc-lex - Lexical Analyzer
//!
//! Turns Tarn source text into a stream of [`Token`]s, each paired with
//! the [`Span`](tarnc_util::Span) of its first character. The lexer never
//! stops on a bad input: illegal characters, unterminated strings, bad
//! escapes and oversized integer literals are reported through the shared
//! diagnostic handler and skipped, so the parser always receives a
//! well-formed stream ending in [`Token::Eof`].
//!
//! Lexical structure:
//!
//! - line comments start with `//` or `#` and run to end of line
//! - identifiers are `[a-zA-Z_][a-zA-Z0-9_]*`, minus the reserved words
//! - integer literals are decimal and must fit in an `i32`
//! - string literals are double-quoted and single-line; the token keeps
//!   the *raw* text, quotes and escapes included, because the code
//!   generator emits it verbatim after `.asciiz`

pub mod cursor;
mod lexer;

pub use cursor::Cursor;
pub use lexer::{tokenize, Lexer};

#[cfg(test)]
mod edge_cases;

use std::fmt;

/// Token represents a lexical unit in the source code
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    // =========================================================================
    // KEYWORDS
    // =========================================================================
    /// "int" - Integer type keyword
    Int,

    /// "bool" - Boolean type keyword
    Bool,

    /// "void" - Void return-type keyword
    Void,

    /// "struct" - Structure declaration keyword
    ///
    /// Usage: struct Pair { int a; int b; };
    Struct,

    /// "tru" - Boolean literal true
    Tru,

    /// "fls" - Boolean literal false
    Fls,

    /// "receive" - Input statement keyword
    ///
    /// Usage: receive >> x;
    Receive,

    /// "print" - Output statement keyword
    ///
    /// Usage: print << x + 1;
    Print,

    /// "if" - Conditional keyword
    If,

    /// "else" - Alternative branch keyword
    Else,

    /// "while" - Loop keyword
    While,

    /// "repeat" - Counted-loop keyword
    ///
    /// Usage: repeat (n) { ... }
    Repeat,

    /// "return" - Function return keyword
    Return,

    // =========================================================================
    // IDENTIFIERS AND LITERALS
    // =========================================================================
    /// Identifier (variable, function, struct or field name)
    Ident(String),

    /// Integer literal (decimal)
    IntLit(i32),

    /// String literal
    ///
    /// Holds the raw source text including the surrounding quotes and
    /// unprocessed escape sequences.
    StrLit(String),

    // =========================================================================
    // OPERATORS
    // =========================================================================
    /// "<<" - Print operator
    Write,

    /// ">>" - Receive operator
    Read,

    /// "++" - Pre-increment
    PlusPlus,

    /// "--" - Pre-decrement
    MinusMinus,

    /// "+" - Addition
    Plus,

    /// "-" - Subtraction or negation
    Minus,

    /// "*" - Multiplication
    Star,

    /// "/" - Division
    Slash,

    /// "!" - Logical NOT
    Not,

    /// "&&" - Logical AND
    AndAnd,

    /// "||" - Logical OR
    OrOr,

    /// "=" - Assignment
    Eq,

    /// "==" - Equality
    EqEq,

    /// "!=" - Inequality
    NotEq,

    /// "<" - Less than
    Lt,

    /// ">" - Greater than
    Gt,

    /// "<=" - Less than or equal
    LtEq,

    /// ">=" - Greater than or equal
    GtEq,

    // =========================================================================
    // PUNCTUATORS
    // =========================================================================
    /// "{" - Left brace
    LBrace,

    /// "}" - Right brace
    RBrace,

    /// "(" - Left parenthesis
    LParen,

    /// ")" - Right parenthesis
    RParen,

    /// ";" - Semicolon
    Semicolon,

    /// "," - Comma
    Comma,

    /// "." - Dot (struct field access)
    Dot,

    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int => write!(f, "int"),
            Token::Bool => write!(f, "bool"),
            Token::Void => write!(f, "void"),
            Token::Struct => write!(f, "struct"),
            Token::Tru => write!(f, "tru"),
            Token::Fls => write!(f, "fls"),
            Token::Receive => write!(f, "receive"),
            Token::Print => write!(f, "print"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::Repeat => write!(f, "repeat"),
            Token::Return => write!(f, "return"),
            Token::Ident(name) => write!(f, "{}", name),
            Token::IntLit(n) => write!(f, "{}", n),
            Token::StrLit(raw) => write!(f, "{}", raw),
            Token::Write => write!(f, "<<"),
            Token::Read => write!(f, ">>"),
            Token::PlusPlus => write!(f, "++"),
            Token::MinusMinus => write!(f, "--"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Not => write!(f, "!"),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Eq => write!(f, "="),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Eof => write!(f, "<eof>"),
        }
    }
}
