use std::error::Error;
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
//// Define Error

/// No token pattern matched at the current scan position.
#[derive(Debug)]
pub struct LexError {
    pub line: usize,
    pub character: char,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid character '{}' at line {}",
            self.character, self.line
        )
    }
}

impl Error for LexError {}


/// An expected token kind was absent.
#[derive(Debug)]
pub struct ParseError {
    pub expected: String,
    pub found: String,
    pub line: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected {}, found {} at line {}",
            self.expected, self.found, self.line
        )
    }
}

impl Error for ParseError {}


/// Redeclaration or undeclared-name reference.
#[derive(Debug)]
pub struct SemanticError {
    pub msg: String,
}

impl SemanticError {
    pub fn new_box_err(msg: &str) -> Box<dyn Error> {
        Box::new(Self {
            msg: msg.to_owned(),
        })
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl Error for SemanticError {}


////////////////////////////////////////////////////////////////////////////////
//// Trap Code

#[derive(Debug)]
pub enum TrapCode<'a> {
    /* LexError */
    UnmatchedCharacter {
        character: char,
        line: usize,
    },

    /* ParseError */
    UnexpectedToken {
        expected: &'a str,
        found: String,
        line: usize,
    },

    /* SemanticError */
    AlreadyDeclaredVar(&'a str),
    UndeclaredVar(&'a str),
}

impl<'a> TrapCode<'a> {
    pub fn emit_box_err(&self) -> Box<dyn Error> {
        match self {
            Self::UnmatchedCharacter { character, line } => Box::new(LexError {
                line: *line,
                character: *character,
            }),
            Self::UnexpectedToken {
                expected,
                found,
                line,
            } => Box::new(ParseError {
                expected: (*expected).to_owned(),
                found: found.clone(),
                line: *line,
            }),
            Self::AlreadyDeclaredVar(name) => SemanticError::new_box_err(
                format!("Variable '{}' already declared", name).as_str(),
            ),
            Self::UndeclaredVar(name) => SemanticError::new_box_err(
                format!("Variable '{}' not declared", name).as_str(),
            ),
        }
    }
}
