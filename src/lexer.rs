use std::error::Error;
use std::fmt;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::TrapCode;

////////////////////////////////////////////////////////////////////////////////
//// Token

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /* literal */
    Number,
    FloatNum,
    Str,

    /* keyword */
    If,
    Else,
    While,
    Print,
    Int,
    Float,
    StrType,
    Return,

    Id,

    /* operator, longer ones first */
    Eq,
    Neq,
    Lte,
    Gte,
    Assign,
    Lt,
    Gt,
    Add,
    Sub,
    Mul,
    Div,

    /* punctuation */
    Lparen,
    Rparen,
    Lbrace,
    Rbrace,
    Semi,

    /* discarded during tokenization */
    Comment,
    Whitespace,
    Newline,
}

#[derive(Debug, Clone)]
pub struct Token {
    kind: TokenKind,
    value: String,
    line: usize,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: '{}' (line {})", self.kind, self.value, self.line)
    }
}


////////////////////////////////////////////////////////////////////////////////
//// Token Matcher

/// Ordered token patterns, first match wins. The order is load-bearing:
/// float literal before integer, `==`/`!=`/`<=`/`>=` before their
/// single-char prefixes, whole-word keywords before plain identifier.
fn token_matcher_vec() -> Vec<(TokenKind, Regex)> {
    [
        (TokenKind::Comment, r"^//.*"),
        (TokenKind::FloatNum, r"^\d+\.\d+"),
        (TokenKind::Number, r"^\d+"),
        (TokenKind::Str, r#"^"[^"]*""#),
        (TokenKind::If, r"^if\b"),
        (TokenKind::Else, r"^else\b"),
        (TokenKind::While, r"^while\b"),
        (TokenKind::Print, r"^print\b"),
        (TokenKind::Int, r"^int\b"),
        (TokenKind::Float, r"^float\b"),
        (TokenKind::StrType, r"^string\b"),
        (TokenKind::Return, r"^return\b"),
        (TokenKind::Id, r"^[a-zA-Z_][a-zA-Z0-9_]*"),
        (TokenKind::Eq, r"^=="),
        (TokenKind::Neq, r"^!="),
        (TokenKind::Lte, r"^<="),
        (TokenKind::Gte, r"^>="),
        (TokenKind::Assign, r"^="),
        (TokenKind::Lt, r"^<"),
        (TokenKind::Gt, r"^>"),
        (TokenKind::Add, r"^\+"),
        (TokenKind::Sub, r"^-"),
        (TokenKind::Mul, r"^\*"),
        (TokenKind::Div, r"^/"),
        (TokenKind::Lparen, r"^\("),
        (TokenKind::Rparen, r"^\)"),
        (TokenKind::Lbrace, r"^\{"),
        (TokenKind::Rbrace, r"^\}"),
        (TokenKind::Semi, r"^;"),
        (TokenKind::Whitespace, r"^[ \t\r]+"),
        (TokenKind::Newline, r"^\n"),
    ]
    .iter()
    .map(|(kind, patstr)| (*kind, Regex::new(patstr).unwrap()))
    .collect_vec()
}

lazy_static! {
    static ref TOKEN_MATCHER_VEC: Vec<(TokenKind, Regex)> = token_matcher_vec();
}


////////////////////////////////////////////////////////////////////////////////
//// Lexer

pub fn tokenize(source: &str) -> Result<Vec<Token>, Box<dyn Error>> {
    let mut tokens = vec![];

    let mut pos = 0;
    let mut line = 1;

    while pos < source.len() {
        let rem = &source[pos..];

        let matched = TOKEN_MATCHER_VEC
            .iter()
            .find_map(|(kind, pat)| pat.find(rem).map(|m| (*kind, m.end())));

        match matched {
            Some((kind, end)) => {
                match kind {
                    TokenKind::Whitespace | TokenKind::Comment => (),
                    TokenKind::Newline => line += 1,
                    _ => tokens.push(Token {
                        kind,
                        value: rem[..end].to_owned(),
                        line,
                    }),
                }

                pos += end;
            }
            None => {
                return Err(TrapCode::UnmatchedCharacter {
                    character: rem.chars().next().unwrap(),
                    line,
                }
                .emit_box_err())
            }
        }
    }

    Ok(tokens)
}
