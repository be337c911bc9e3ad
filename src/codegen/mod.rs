//! x86-64 code generation: lowers the simplified, bound AST into textual
//! GNU-assembler (AT&T syntax) output, targeting the System V AMD64 ABI
//! with a small macOS variant (different section names, underscore-
//! prefixed external symbols).
//!
//! Everything the original kept in module-scope globals — the current
//! function, the innermost loop's exit label, the label counters — is an
//! explicit value here instead: [`FunctionCtx`] and the `loop_exit`
//! parameter threaded through [`stmt::gen_stmt`] are per-call-stack-frame,
//! and the label counters live on [`Gen`], constructed fresh per
//! [`generate`] call.

mod emitter;
mod expr;
mod function;
mod layout;
mod main_wrapper;
mod stmt;

pub use emitter::AsmWriter;

use crate::ast::{Node, NodeKind};
use crate::error::GenError;
use crate::strings::StringTable;
use crate::symbols::{SymbolKind, SymbolTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Linux,
    MacOS,
}

impl Target {
    fn bss_section(self) -> &'static str {
        match self {
            Target::Linux => ".bss",
            Target::MacOS => "__DATA, __bss",
        }
    }

    fn rodata_section(self) -> &'static str {
        match self {
            Target::Linux => ".rodata",
            Target::MacOS => "__TEXT, __cstring",
        }
    }
}

/// Per-function context: the function's own symbol table and parameter
/// count, needed to compute local-variable addressing (see
/// `layout::operand_for`).
struct FunctionCtx<'s> {
    locals: &'s SymbolTable,
    param_count: usize,
}

struct Gen<'a> {
    globals: &'a SymbolTable,
    strings: &'a StringTable,
    target: Target,
    out: AsmWriter,
    if_counter: u32,
    while_counter: u32,
}

impl Gen<'_> {
    fn new_if_labels(&mut self) -> (String, String, String) {
        let n = self.if_counter;
        self.if_counter += 1;
        (format!("THEN{n}"), format!("ELSE{n}"), format!("ENDIF{n}"))
    }

    fn new_while_labels(&mut self) -> (String, String) {
        let n = self.while_counter;
        self.while_counter += 1;
        (format!("WHILE{n}"), format!("ENDWHILE{n}"))
    }
}

/// Generates a full assembly file for `program` on `target`. `program`
/// must already be simplified and bound: every identifier carries a
/// [`crate::ast::SymbolRef`] and no `StringLiteral` nodes remain.
pub fn generate(program: &Node, globals: &SymbolTable, strings: &StringTable, target: Target) -> Result<String, GenError> {
    let mut gen = Gen { globals, strings, target, out: AsmWriter::new(), if_counter: 0, while_counter: 0 };

    generate_string_table(&mut gen);
    generate_global_variables(&mut gen)?;

    gen.out.directive(".text");
    let mut first_function = None;
    for top in &program.children {
        let NodeKind::Function { name } = &top.kind else { continue };
        let id = gen.globals.lookup(name).expect("function header was bound before codegen");
        if first_function.is_none() {
            first_function = Some(id);
        }
        function::generate_function(&mut gen, name, top)?;
    }

    let first_function = first_function.ok_or(GenError::NoFunctions)?;
    let first = gen.globals.get(first_function);
    let first_name = first.name.clone();
    let first_param_count = first.locals.as_deref().map(|locals| locals.iter_kind(SymbolKind::Parameter).count()).unwrap_or(0);

    main_wrapper::generate_main(&mut gen, &first_name, first_param_count);
    main_wrapper::generate_safe_printf(&mut gen);
    main_wrapper::generate_symbol_aliases(&mut gen);

    Ok(gen.out.finish())
}

fn generate_string_table(gen: &mut Gen) {
    gen.out.directive(&format!(".section {}", gen.target.rodata_section()));
    gen.out.directive("intout: .asciz \"%ld\"");
    gen.out.directive("strout: .asciz \"%s\"");
    gen.out.directive("errout: .asciz \"Wrong number of arguments\"");
    for (i, literal) in gen.strings.iter().enumerate() {
        gen.out.directive(&format!("string{i}: \t.asciz {literal}"));
    }
}

fn generate_global_variables(gen: &mut Gen) -> Result<(), GenError> {
    gen.out.directive(&format!(".section {}", gen.target.bss_section()));
    gen.out.directive(".align 8");
    for symbol in gen.globals.iter() {
        match symbol.kind {
            SymbolKind::GlobalVar => gen.out.directive(&format!(".{}: \t.zero 8", symbol.name)),
            SymbolKind::GlobalArray => {
                let len = symbol
                    .array_len
                    .ok_or_else(|| GenError::NonConstantArrayLength { name: symbol.name.clone() })?;
                gen.out.directive(&format!(".{}: \t.zero {}", symbol.name, len * 8));
            }
            _ => {}
        }
    }
    Ok(())
}
