//! Phase pipeline driver. Strictly linear: each phase consumes the previous
//! artifact; the first error aborts the run, and a compilation failing at
//! phase N never yields phase-N+1 artifacts.

use std::error::Error;

use itertools::Itertools;

use crate::codegen::codegen;
use crate::datair::{StrLitTbl, SymTbl, TacInstr};
use crate::datalsp::Program;
use crate::lexer::{tokenize, Token};
use crate::semantic_analyzer::analyze_semantic;
use crate::syntax_parser::Parser;
use crate::tacgen::gen_tac;

pub const PHASE_MAX: usize = 5;

/// Artifacts of one compilation, filled up to the requested phase.
#[derive(Debug, Default)]
pub struct Artifacts {
    pub tokens: Option<Vec<Token>>,
    pub ast: Option<Program>,
    pub symtbl: Option<SymTbl>,
    pub tac: Option<Vec<TacInstr>>,
    pub strlits: Option<StrLitTbl>,
    pub assembly: Option<Vec<String>>,
}

/// Run the whole pipeline, returning the assembly listing.
pub fn compile(source: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let tokens = tokenize(source)?;
    let ast = Parser::new(tokens).parse()?;
    let symtbl = analyze_semantic(&ast)?;
    let (tac, strlits) = gen_tac(&ast);

    Ok(codegen(&tac, &symtbl, &strlits))
}

/// Run phases `1..=phase` in order.
pub fn compile_to_phase(source: &str, phase: usize) -> Result<Artifacts, Box<dyn Error>> {
    let mut arts = Artifacts::default();

    let tokens = tokenize(source)?;
    arts.tokens = Some(tokens.clone());
    if phase <= 1 {
        return Ok(arts);
    }

    let ast = Parser::new(tokens).parse()?;
    if phase <= 2 {
        arts.ast = Some(ast);
        return Ok(arts);
    }

    let symtbl = analyze_semantic(&ast)?;
    if phase <= 3 {
        arts.ast = Some(ast);
        arts.symtbl = Some(symtbl);
        return Ok(arts);
    }

    let (tac, strlits) = gen_tac(&ast);
    if phase <= 4 {
        arts.ast = Some(ast);
        arts.symtbl = Some(symtbl);
        arts.tac = Some(tac);
        arts.strlits = Some(strlits);
        return Ok(arts);
    }

    let assembly = codegen(&tac, &symtbl, &strlits);

    arts.ast = Some(ast);
    arts.symtbl = Some(symtbl);
    arts.tac = Some(tac);
    arts.strlits = Some(strlits);
    arts.assembly = Some(assembly);

    Ok(arts)
}


////////////////////////////////////////////////////////////////////////////////
//// Listing renderers (used by the CLI driver)

pub fn render_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(|tok| format!("  {}", tok)).join("\n")
}

/// Numbered TAC listing.
pub fn render_tac(tac: &[TacInstr]) -> String {
    tac.iter()
        .enumerate()
        .map(|(i, instr)| format!("{:3}. {}", i + 1, instr))
        .join("\n")
}

pub fn render_strlits(strlits: &StrLitTbl) -> String {
    strlits
        .iter()
        .map(|(value, label)| format!("{}: \"{}\"", label, value))
        .join("\n")
}

pub fn render_assembly(assembly: &[String]) -> String {
    assembly.iter().join("\n")
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_compile_to_phase_stops_early() {
        let arts = compile_to_phase("int x = 1;", 1).unwrap();

        assert!(arts.tokens.is_some());
        assert!(arts.ast.is_none());
        assert!(arts.symtbl.is_none());
        assert!(arts.tac.is_none());
        assert!(arts.assembly.is_none());
    }

    #[test]
    fn test_compile_failure_yields_no_later_artifacts() {
        // semantic failure: phase 4/5 artifacts must not exist
        let res = compile_to_phase("x = 1;", 5);

        assert!(res.is_err());
    }

    #[test]
    fn test_compile_full_pipeline() {
        let asm = compile("int x = 1; print(x);").unwrap();

        assert!(asm.contains(&"section .data".to_owned()));
        assert!(asm.contains(&"section .bss".to_owned()));
        assert!(asm.contains(&"section .text".to_owned()));
    }

    #[test]
    fn test_render_tac_numbered() {
        let arts = compile_to_phase("int x = 1; print(x);", 4).unwrap();
        let listing = render_tac(arts.tac.as_ref().unwrap());

        assert!(listing.starts_with("  1. x = 1"));
        assert!(listing.contains("  2. print x"));
    }
}
