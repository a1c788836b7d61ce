use std::error::Error;
use std::fs;
use std::process::exit;

use clap::{App, Arg};

use minic::compiler::{
    compile_to_phase, render_assembly, render_strlits, render_tac, render_tokens, Artifacts,
    PHASE_MAX,
};
use minic::semantic_analyzer::fmt_symtbl;
use minic::syntax_parser::dump_ast;
use minic::VerboseLv;

fn main() {
    let matches = App::new("minic")
        .version("0.1.0")
        .about("Five phase compiler for the mini imperative language")
        .arg(
            Arg::with_name("FILE")
                .help("Source file to compile")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("phase")
                .short("p")
                .long("phase")
                .takes_value(true)
                .default_value("5")
                .help("Stop after phase N (1 lex, 2 parse, 3 semantic, 4 tac, 5 asm)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Print the intermediate listings of every phase run"),
        )
        .get_matches();

    let path = matches.value_of("FILE").unwrap();
    let phase = match matches.value_of("phase").unwrap().parse::<usize>() {
        Ok(n) if (1..=PHASE_MAX).contains(&n) => n,
        _ => {
            eprintln!("Error: --phase takes 1..={}", PHASE_MAX);
            exit(1);
        }
    };
    let verbose = VerboseLv::from(matches.occurrences_of("verbose") as usize);

    if let Err(err) = run(path, phase, verbose) {
        eprintln!("Error: {}", err);
        exit(1);
    }
}

fn run(path: &str, phase: usize, verbose: VerboseLv) -> Result<(), Box<dyn Error>> {
    let source = fs::read_to_string(path)?;
    let arts = compile_to_phase(&source, phase)?;

    print_artifacts(&arts, phase, verbose);

    Ok(())
}

/// At `V0` only the stop phase's listing is printed; at `V1` and above every
/// produced artifact is.
fn print_artifacts(arts: &Artifacts, phase: usize, verbose: VerboseLv) {
    let all = verbose >= VerboseLv::V1;

    if let Some(ref tokens) = arts.tokens {
        if all || phase == 1 {
            println!("{}", banner("PHASE 1: LEXICAL ANALYSIS"));
            println!("{}\n", render_tokens(tokens));
        }
    }

    if let Some(ref ast) = arts.ast {
        if all || phase == 2 {
            println!("{}", banner("PHASE 2: SYNTAX ANALYSIS"));
            println!("{}", dump_ast(ast));
        }
    }

    if let Some(ref symtbl) = arts.symtbl {
        if all || phase == 3 {
            println!("{}", banner("PHASE 3: SEMANTIC ANALYSIS"));
            println!("{}\n", fmt_symtbl(symtbl));
        }
    }

    if let Some(ref tac) = arts.tac {
        if all || phase == 4 {
            println!("{}", banner("PHASE 4: INTERMEDIATE CODE"));
            println!("{}\n", render_tac(tac));

            if let Some(ref strlits) = arts.strlits {
                if !strlits.is_empty() {
                    println!("String Literals:");
                    println!("{}\n", render_strlits(strlits));
                }
            }
        }
    }

    if let Some(ref assembly) = arts.assembly {
        if all || phase == 5 {
            println!("{}", banner("PHASE 5: ASSEMBLY"));
            println!("{}", render_assembly(assembly));
        }
    }
}

fn banner(title: &str) -> String {
    format!("{}\n{}\n{}", "=".repeat(50), title, "=".repeat(50))
}
