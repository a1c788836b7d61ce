//! IR data (middle end)

use std::fmt;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::lexer::TokenKind;

////////////////////////////////////////////////////////////////////////////////
//// PriType

/// Declared (primitive) type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriType {
    Int,
    Float,
    Str,
}

impl PriType {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Int => Some(Self::Int),
            TokenKind::Float => Some(Self::Float),
            TokenKind::StrType => Some(Self::Str),
            _ => None,
        }
    }
}

impl fmt::Display for PriType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "string"),
        }
    }
}


////////////////////////////////////////////////////////////////////////////////
//// BinOp

/// Binary operator tag, both expression tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,

    Lt,
    Gt,
    Eq,
    Neq,
    Lte,
    Gte,
}

impl BinOp {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Add => Some(Self::Add),
            TokenKind::Sub => Some(Self::Sub),
            TokenKind::Mul => Some(Self::Mul),
            TokenKind::Div => Some(Self::Div),
            TokenKind::Lt => Some(Self::Lt),
            TokenKind::Gt => Some(Self::Gt),
            TokenKind::Eq => Some(Self::Eq),
            TokenKind::Neq => Some(Self::Neq),
            TokenKind::Lte => Some(Self::Lte),
            TokenKind::Gte => Some(Self::Gte),
            _ => None,
        }
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::Lt | Self::Gt | Self::Eq | Self::Neq | Self::Lte | Self::Gte
        )
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Lte => "<=",
            Self::Gte => ">=",
        };

        write!(f, "{}", text)
    }
}


////////////////////////////////////////////////////////////////////////////////
//// Symbol Table

#[derive(Debug, Clone)]
pub struct SymItem {
    pub ty: PriType,
    pub initialized: bool,
}

/// Flat global symbol table, insertion ordered
pub type SymTbl = IndexMap<String, SymItem>;


////////////////////////////////////////////////////////////////////////////////
//// String Literal Table

/// literal text -> `str<N>` label, insertion ordered, deduplicated
pub type StrLitTbl = IndexMap<String, String>;


////////////////////////////////////////////////////////////////////////////////
//// TAC Instruction

/// Three-address code instruction. Operands are rendered text: a variable
/// name, a temporary `t<N>`, a literal numeral, or a string label `str<N>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TacInstr {
    Copy {
        dest: String,
        src: String,
    },
    Bin {
        dest: String,
        left: String,
        op: BinOp,
        right: String,
    },
    Print(String),
    IfFalse {
        cond: String,
        label: String,
    },
    Goto(String),
    Label(String),
}

impl TacInstr {
    /// All operand texts of the instruction (labels excluded).
    pub fn operands(&self) -> Vec<&str> {
        match self {
            Self::Copy { dest, src } => vec![dest.as_str(), src.as_str()],
            Self::Bin {
                dest, left, right, ..
            } => vec![dest.as_str(), left.as_str(), right.as_str()],
            Self::Print(operand) => vec![operand.as_str()],
            Self::IfFalse { cond, .. } => vec![cond.as_str()],
            Self::Goto(_) | Self::Label(_) => vec![],
        }
    }
}

impl fmt::Display for TacInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy { dest, src } => write!(f, "{} = {}", dest, src),
            Self::Bin {
                dest,
                left,
                op,
                right,
            } => write!(f, "{} = {} {} {}", dest, left, op, right),
            Self::Print(operand) => write!(f, "print {}", operand),
            Self::IfFalse { cond, label } => {
                write!(f, "if_false {} goto {}", cond, label)
            }
            Self::Goto(label) => write!(f, "goto {}", label),
            Self::Label(label) => write!(f, "{}:", label),
        }
    }
}


lazy_static! {
    static ref TEMP_OPERAND_PAT: Regex = Regex::new(r"^t(\d+)$").unwrap();
}

/// Numeric suffix of a temporary operand `t<N>`.
pub fn parse_temp_index(operand: &str) -> Option<usize> {
    TEMP_OPERAND_PAT
        .captures(operand)
        .and_then(|caps| caps[1].parse::<usize>().ok())
}

/// Highest temporary index referenced anywhere in the instruction list.
/// `None` when no temporary occurs at all.
pub fn max_temp_index(instrs: &[TacInstr]) -> Option<usize> {
    instrs
        .iter()
        .flat_map(|instr| instr.operands())
        .filter_map(parse_temp_index)
        .max()
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tac_display() {
        assert_eq!(
            TacInstr::Bin {
                dest: "t0".to_owned(),
                left: "x".to_owned(),
                op: BinOp::Add,
                right: "y".to_owned(),
            }
            .to_string(),
            "t0 = x + y"
        );

        assert_eq!(
            TacInstr::Copy {
                dest: "s".to_owned(),
                src: "t0".to_owned(),
            }
            .to_string(),
            "s = t0"
        );

        assert_eq!(
            TacInstr::IfFalse {
                cond: "t1".to_owned(),
                label: "L0".to_owned(),
            }
            .to_string(),
            "if_false t1 goto L0"
        );

        assert_eq!(TacInstr::Label("L1".to_owned()).to_string(), "L1:");
        assert_eq!(TacInstr::Print("t2".to_owned()).to_string(), "print t2");
        assert_eq!(TacInstr::Goto("L0".to_owned()).to_string(), "goto L0");
    }

    #[test]
    fn test_parse_temp_index() {
        assert_eq!(parse_temp_index("t0"), Some(0));
        assert_eq!(parse_temp_index("t12"), Some(12));

        // named variables that merely start with `t` are not temporaries
        assert_eq!(parse_temp_index("total"), None);
        assert_eq!(parse_temp_index("t"), None);
        assert_eq!(parse_temp_index("str0"), None);
    }

    #[test]
    fn test_max_temp_index() {
        assert_eq!(max_temp_index(&[]), None);

        let instrs = vec![
            TacInstr::Bin {
                dest: "t0".to_owned(),
                left: "x".to_owned(),
                op: BinOp::Add,
                right: "y".to_owned(),
            },
            TacInstr::Bin {
                dest: "t1".to_owned(),
                left: "t0".to_owned(),
                op: BinOp::Mul,
                right: "2".to_owned(),
            },
            TacInstr::Copy {
                dest: "s".to_owned(),
                src: "t1".to_owned(),
            },
        ];

        assert_eq!(max_temp_index(&instrs), Some(1));
    }
}
