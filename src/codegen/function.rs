//! Function prologue/epilogue and per-function body generation.

use crate::ast::{Node, NodeKind};
use crate::error::GenError;
use crate::symbols::SymbolKind;

use super::layout::register_params;
use super::stmt::gen_stmt;
use super::{FunctionCtx, Gen};

pub fn generate_function(gen: &mut Gen, name: &str, node: &Node) -> Result<(), GenError> {
    let symbol_id = gen.globals.lookup(name).expect("function header was bound before codegen");
    let locals = gen
        .globals
        .get(symbol_id)
        .locals
        .as_deref()
        .expect("function symbol always owns a locals table");
    let param_count = locals.iter_kind(SymbolKind::Parameter).count();

    gen.out.label(&format!(".{name}"));
    gen.out.instr("pushq", &["%rbp"]);
    gen.out.instr("movq", &["%rsp", "%rbp"]);

    for reg in register_params().iter().take(param_count.min(6)) {
        gen.out.instr("pushq", &[reg]);
    }
    for _ in locals.iter_kind(SymbolKind::LocalVar) {
        gen.out.instr("pushq", &["$0"]);
    }

    let body = match &node.kind {
        NodeKind::Function { .. } => &node.children[1],
        other => unreachable!("expected a function node, got {other:?}"),
    };
    let func = FunctionCtx { locals, param_count };
    gen_stmt(gen, &func, body, None)?;

    // In case the function fell off the end of its body without an
    // explicit return.
    gen.out.instr("movq", &["$0", "%rax"]);
    gen.out.instr("movq", &["%rbp", "%rsp"]);
    gen.out.instr("popq", &["%rbp"]);
    gen.out.instr("ret", &[]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::StringTable;
    use crate::symbols::SymbolTable;

    #[test]
    fn prologue_spills_parameters_and_zeroes_locals() {
        let mut globals = SymbolTable::new();
        let mut locals = SymbolTable::new();
        locals.insert("a", SymbolKind::Parameter).unwrap();
        locals.insert("b", SymbolKind::Parameter).unwrap();
        locals.insert("x", SymbolKind::LocalVar).unwrap();
        let id = globals.insert("f", SymbolKind::Function).unwrap();
        globals.get_mut(id).locals = Some(Box::new(locals));

        let strings = StringTable::new();
        let mut gen = Gen {
            globals: &globals,
            strings: &strings,
            target: crate::codegen::Target::Linux,
            out: crate::codegen::AsmWriter::new(),
            if_counter: 0,
            while_counter: 0,
        };
        let body = Node::new(
            NodeKind::Block,
            vec![Node::list(vec![Node::new(NodeKind::ReturnStatement, vec![Node::number(0)])])],
        );
        let node = Node::new(NodeKind::Function { name: "f".to_owned() }, vec![Node::list(vec![]), body]);

        generate_function(&mut gen, "f", &node).unwrap();
        let asm = gen.out.finish();

        assert_eq!(asm.matches("pushq %rdi").count(), 1);
        assert_eq!(asm.matches("pushq %rsi").count(), 1);
        // one more pushq $0 for the local variable
        assert_eq!(asm.matches("pushq $0").count(), 1);
        assert!(asm.contains(".f:"));
    }
}
