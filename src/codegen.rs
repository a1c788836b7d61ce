//! Assembly generator: renders the TAC list into a flat three-section
//! (data/bss/text) assembly listing.
//!
//! No register allocation: every operand is loaded from memory right before
//! use and every result is stored right after, so the two working registers
//! eax/ebx suffice for any binary operation.

use crate::datair::{max_temp_index, BinOp, PriType, StrLitTbl, SymTbl, TacInstr};

pub fn codegen(tac: &[TacInstr], symtbl: &SymTbl, strlits: &StrLitTbl) -> Vec<String> {
    let mut codegen = CodeGen::new(tac, symtbl, strlits);

    codegen.gen();
    codegen.asm
}


////////////////////////////////////////////////////////////////////////////////
//// CodeGen

struct CodeGen<'a> {
    tac: &'a [TacInstr],
    symtbl: &'a SymTbl,
    strlits: &'a StrLitTbl,

    asm: Vec<String>,
}

impl<'a> CodeGen<'a> {
    fn new(tac: &'a [TacInstr], symtbl: &'a SymTbl, strlits: &'a StrLitTbl) -> Self {
        Self {
            tac,
            symtbl,
            strlits,
            asm: vec![],
        }
    }

    fn push(&mut self, line: &str) {
        self.asm.push(line.to_owned());
    }

    fn is_strlit_label(&self, operand: &str) -> bool {
        self.strlits.values().any(|label| label == operand)
    }

    fn gen(&mut self) {
        self.gen_data_section();
        self.gen_bss_section();
        self.gen_text_section();
    }

    ////////////////////////////////////////////////////////////////////////////
    //// Sections

    fn gen_data_section(&mut self) {
        self.push("; Data Section");
        self.push("section .data");

        for (value, label) in self.strlits.iter() {
            self.asm.push(format!("    {} db \"{}\", 0", label, value));
        }
        if !self.strlits.is_empty() {
            self.push("");
        }

        // IndexMap preserves declaration order
        for (name, item) in self.symtbl.iter() {
            let line = match item.ty {
                PriType::Int => format!("    {} dd 0    ; int variable", name),
                PriType::Float => format!("    {} dq 0.0  ; float variable", name),
                PriType::Str => format!("    {} dd 0    ; string pointer", name),
            };
            self.asm.push(line);
        }
    }

    fn gen_bss_section(&mut self) {
        self.push("");
        self.push("; BSS Section (temporary variables)");
        self.push("section .bss");

        let temp_count = max_temp_index(self.tac).map_or(0, |idx| idx + 1);
        for i in 0..temp_count {
            self.asm.push(format!("    t{} resd 1", i));
        }
    }

    fn gen_text_section(&mut self) {
        self.push("");
        self.push("; Code Section");
        self.push("section .text");
        self.push("global _start");
        self.push("");
        self.push("_start:");

        for instr in self.tac {
            self.gen_instr(instr);
        }

        self.push("");
        self.push("    ; Exit program");
        self.push("    mov eax, 1      ; sys_exit");
        self.push("    xor ebx, ebx    ; exit code 0");
        self.push("    int 0x80");
    }

    ////////////////////////////////////////////////////////////////////////////
    //// Instruction lowering

    fn gen_instr(&mut self, instr: &TacInstr) {
        match instr {
            TacInstr::Copy { dest, src } => {
                if self.is_strlit_label(src) {
                    self.asm.push(format!("    lea eax, [{}]", src));
                } else {
                    self.asm.push(format!("    mov eax, [{}]", src));
                }
                self.asm.push(format!("    mov [{}], eax", dest));
            }
            TacInstr::Bin {
                dest,
                left,
                op,
                right,
            } => {
                self.asm.push(format!("    mov eax, [{}]", left));
                self.asm.push(format!("    mov ebx, [{}]", right));

                match op {
                    BinOp::Add => self.push("    add eax, ebx"),
                    BinOp::Sub => self.push("    sub eax, ebx"),
                    BinOp::Mul => self.push("    imul eax, ebx"),
                    BinOp::Div => {
                        self.push("    cdq");
                        self.push("    idiv ebx");
                    }
                    relational => {
                        // 0/1 integer result via compare + set-byte
                        self.push("    cmp eax, ebx");
                        let set = match relational {
                            BinOp::Lt => "setl",
                            BinOp::Gt => "setg",
                            BinOp::Eq => "sete",
                            BinOp::Neq => "setne",
                            BinOp::Lte => "setle",
                            BinOp::Gte => "setge",
                            _ => unreachable!(),
                        };
                        self.asm.push(format!("    {} al", set));
                        self.push("    movzx eax, al");
                    }
                }

                self.asm.push(format!("    mov [{}], eax", dest));
            }
            TacInstr::Print(operand) => {
                self.asm.push(format!("    ; Print {}", operand));
                if self.is_strlit_label(operand) {
                    self.asm.push(format!("    lea eax, [{}]", operand));
                } else {
                    self.asm.push(format!("    mov eax, [{}]", operand));
                }
                self.push("    ; (print syscall would go here)");
            }
            TacInstr::IfFalse { cond, label } => {
                self.asm.push(format!("    mov eax, [{}]", cond));
                self.push("    cmp eax, 0");
                self.asm.push(format!("    je {}", label));
            }
            TacInstr::Goto(label) => {
                self.asm.push(format!("    jmp {}", label));
            }
            TacInstr::Label(label) => {
                self.asm.push(format!("{}:", label));
            }
        }
    }
}


#[cfg(test)]
mod test {
    use std::error::Error;

    use super::*;
    use crate::lexer::tokenize;
    use crate::semantic_analyzer::analyze_semantic;
    use crate::syntax_parser::Parser;
    use crate::tacgen::gen_tac;

    fn asm_source(source: &str) -> Result<Vec<String>, Box<dyn Error>> {
        let ast = Parser::new(tokenize(source)?).parse()?;
        let symtbl = analyze_semantic(&ast)?;
        let (tac, strlits) = gen_tac(&ast);

        Ok(codegen(&tac, &symtbl, &strlits))
    }

    fn count_lines(asm: &[String], needle: &str) -> usize {
        asm.iter().filter(|line| line.trim() == needle).count()
    }

    #[test]
    fn test_codegen_data_section_per_declared_type() {
        let asm = asm_source(r#"int x = 1; float f; string s = "hi";"#).unwrap();

        assert!(asm.contains(&"    x dd 0    ; int variable".to_owned()));
        assert!(asm.contains(&"    f dq 0.0  ; float variable".to_owned()));
        assert!(asm.contains(&"    s dd 0    ; string pointer".to_owned()));
        assert!(asm.contains(&"    str0 db \"hi\", 0".to_owned()));
    }

    #[test]
    fn test_codegen_bss_temp_cells() {
        // two binary ops -> temps t0, t1 -> two reserved cells
        let asm = asm_source("int a = 1; int b = a + 2 * a;").unwrap();

        assert!(asm.contains(&"    t0 resd 1".to_owned()));
        assert!(asm.contains(&"    t1 resd 1".to_owned()));
        assert!(!asm.contains(&"    t2 resd 1".to_owned()));
    }

    #[test]
    fn test_codegen_bss_empty_without_temps() {
        let asm = asm_source("int a = 1;").unwrap();

        assert!(asm.iter().all(|line| !line.contains("resd")));
    }

    #[test]
    fn test_codegen_string_copy_loads_address() {
        let asm = asm_source(r#"string s = "hi";"#).unwrap();

        assert!(asm.contains(&"    lea eax, [str0]".to_owned()));
        assert!(asm.contains(&"    mov [s], eax".to_owned()));
    }

    #[test]
    fn test_codegen_relational_set_byte() {
        let asm = asm_source("int x = 1; int y = 2; int r = x <= y;").unwrap();

        assert!(asm.contains(&"    cmp eax, ebx".to_owned()));
        assert!(asm.contains(&"    setle al".to_owned()));
        assert!(asm.contains(&"    movzx eax, al".to_owned()));
    }

    #[test]
    fn test_codegen_division_sign_extends() {
        let asm = asm_source("int x = 6; int y = 2; int q = x / y;").unwrap();

        assert!(asm.contains(&"    cdq".to_owned()));
        assert!(asm.contains(&"    idiv ebx".to_owned()));
    }

    #[test]
    fn test_codegen_control_flow() {
        let asm = asm_source("int x = 1; if (x > 0) { print(x); }").unwrap();

        assert!(asm.contains(&"    je L0".to_owned()));
        assert!(asm.contains(&"    jmp L1".to_owned()));
        assert!(asm.contains(&"L0:".to_owned()));
        assert!(asm.contains(&"L1:".to_owned()));
    }

    #[test]
    fn test_codegen_epilogue_always_present() {
        let asm = asm_source("").unwrap();

        assert_eq!(count_lines(&asm, "mov eax, 1      ; sys_exit"), 1);
        assert_eq!(count_lines(&asm, "xor ebx, ebx    ; exit code 0"), 1);
        assert_eq!(count_lines(&asm, "int 0x80"), 1);
    }

    #[test]
    fn test_codegen_print_is_load_only() {
        let asm = asm_source("int x = 1; print(x);").unwrap();

        assert!(asm.contains(&"    ; Print x".to_owned()));
        assert!(asm.contains(&"    ; (print syscall would go here)".to_owned()));
    }

    #[test]
    fn test_codegen_variable_named_like_str_label() {
        // a variable called `str0` must not be confused with a string label
        let asm = asm_source("int str0 = 1; int y = str0;").unwrap();

        assert!(asm.contains(&"    mov eax, [str0]".to_owned()));
        assert!(asm.iter().all(|line| !line.contains("lea")));
    }
}
