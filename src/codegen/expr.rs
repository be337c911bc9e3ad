//! Expression and relation codegen: the `%rax`/`%rcx` evaluator-stack
//! discipline, array-element addressing, and calls.

use crate::ast::{BinOp, Node, NodeKind, SymbolRef, UnOp};
use crate::error::GenError;
use crate::symbols::{Symbol, SymbolKind};

use super::layout::{operand_for, register_params};
use super::{FunctionCtx, Gen};

fn resolve_symbol<'s>(gen: &'s Gen, func: &'s FunctionCtx, node: &Node) -> &'s Symbol {
    match node.symbol.expect("identifier must be bound before codegen") {
        SymbolRef::Global(id) => gen.globals.get(id),
        SymbolRef::Local(id) => func.locals.get(id),
    }
}

fn identifier_name(node: &Node) -> &str {
    match &node.kind {
        NodeKind::Identifier(name) => name,
        other => unreachable!("expected an identifier node, got {other:?}"),
    }
}

/// The memory operand for a bound identifier, after checking it isn't a
/// function or array used where a scalar is expected.
pub(super) fn variable_operand(gen: &Gen, func: &FunctionCtx, node: &Node) -> Result<String, GenError> {
    let name = identifier_name(node);
    let symbol = resolve_symbol(gen, func, node);
    match symbol.kind {
        SymbolKind::Function => return Err(GenError::FunctionUsedAsValue { name: name.to_owned() }),
        SymbolKind::GlobalArray => return Err(GenError::ArrayUsedAsScalar { name: name.to_owned() }),
        _ => {}
    }
    Ok(operand_for(symbol, func.param_count))
}

/// Evaluates `node` into `%rax`. `%rcx` is clobbered by every binary,
/// relational, array-indexing or call node; nothing downstream relies on
/// it surviving an expression's evaluation.
pub fn gen_expr(gen: &mut Gen, func: &FunctionCtx, node: &Node) -> Result<(), GenError> {
    match &node.kind {
        NodeKind::Number(value) => {
            gen.out.instr("movq", &[&format!("${value}"), "%rax"]);
            Ok(())
        }
        NodeKind::Identifier(_) => {
            let operand = variable_operand(gen, func, node)?;
            gen.out.instr("movq", &[&operand, "%rax"]);
            Ok(())
        }
        NodeKind::Unary(UnOp::Neg) => {
            gen_expr(gen, func, &node.children[0])?;
            gen.out.instr("negq", &["%rax"]);
            Ok(())
        }
        NodeKind::Binary(op) => gen_binary(gen, func, *op, &node.children[0], &node.children[1]),
        NodeKind::ArrayIndexing => {
            let addr = array_address(gen, func, node)?;
            gen.out.instr("movq", &[&addr, "%rax"]);
            Ok(())
        }
        NodeKind::FunctionCall => gen_call(gen, func, node),
        other => unreachable!("not a valid expression node: {other:?}"),
    }
}

/// `+`/`*` evaluate their left operand first; `-`, `/`, `<<` and `>>` all
/// evaluate their right operand first instead, so the value that needs to
/// round-trip through the stack is never the one whose register role
/// (divisor, shift count, subtrahend) the instruction fixes.
fn gen_binary(gen: &mut Gen, func: &FunctionCtx, op: BinOp, lhs: &Node, rhs: &Node) -> Result<(), GenError> {
    match op {
        BinOp::Add | BinOp::Mul => {
            gen_expr(gen, func, lhs)?;
            gen.out.instr("pushq", &["%rax"]);
            gen_expr(gen, func, rhs)?;
            gen.out.instr("popq", &["%rcx"]);
            gen.out.instr(if op == BinOp::Add { "addq" } else { "imulq" }, &["%rcx", "%rax"]);
        }
        BinOp::Sub => {
            gen_expr(gen, func, rhs)?;
            gen.out.instr("pushq", &["%rax"]);
            gen_expr(gen, func, lhs)?;
            gen.out.instr("popq", &["%rcx"]);
            gen.out.instr("subq", &["%rcx", "%rax"]);
        }
        BinOp::Div => {
            gen_expr(gen, func, rhs)?;
            gen.out.instr("pushq", &["%rax"]);
            gen_expr(gen, func, lhs)?;
            gen.out.instr("cqo", &[]);
            gen.out.instr("popq", &["%rcx"]);
            gen.out.instr("idivq", &["%rcx"]);
        }
        BinOp::Shl | BinOp::Shr => {
            gen_expr(gen, func, rhs)?;
            gen.out.instr("pushq", &["%rax"]);
            gen_expr(gen, func, lhs)?;
            gen.out.instr("popq", &["%rcx"]);
            gen.out.instr(if op == BinOp::Shl { "salq" } else { "sarq" }, &["%cl", "%rax"]);
        }
    }
    Ok(())
}

/// Computes the address of an array element into `%rcx`, returning the
/// `(%rcx)` operand. Evaluating the index clobbers every register, so a
/// value that must survive past this call (an assignment's right-hand
/// side) has to be saved by the caller first.
pub(super) fn array_address(gen: &mut Gen, func: &FunctionCtx, node: &Node) -> Result<String, GenError> {
    let array = &node.children[0];
    let name = identifier_name(array);
    let symbol = resolve_symbol(gen, func, array);
    if symbol.kind != SymbolKind::GlobalArray {
        return Err(GenError::IndexTargetNotArray { name: name.to_owned() });
    }
    let name = name.to_owned();

    gen_expr(gen, func, &node.children[1])?;
    gen.out.instr("leaq", &[&format!(".{name}(%rip)"), "%rcx"]);
    gen.out.instr("leaq", &["(%rcx, %rax, 8)", "%rcx"]);
    Ok("(%rcx)".to_owned())
}

pub(super) fn gen_call(gen: &mut Gen, func: &FunctionCtx, node: &Node) -> Result<(), GenError> {
    let callee = &node.children[0];
    let name = identifier_name(callee).to_owned();
    let symbol = resolve_symbol(gen, func, callee);
    if symbol.kind != SymbolKind::Function {
        return Err(GenError::CallTargetNotFunction { name });
    }
    let param_count = symbol
        .locals
        .as_deref()
        .map(|locals| locals.iter_kind(SymbolKind::Parameter).count())
        .unwrap_or(0);

    let args = &node.children[1].children;
    if args.len() != param_count {
        return Err(GenError::ArgumentCountMismatch { name, expected: param_count, got: args.len() });
    }

    for arg in args.iter().rev() {
        gen_expr(gen, func, arg)?;
        gen.out.instr("pushq", &["%rax"]);
    }
    for reg in register_params().iter().take(param_count.min(6)) {
        gen.out.instr("popq", &[reg]);
    }
    gen.out.instr("call", &[&format!(".{name}")]);
    if param_count > 6 {
        gen.out.instr("addq", &[&format!("${}", (param_count - 6) * 8), "%rsp"]);
    }
    Ok(())
}

/// Leaves the flags as if `cmp RHS, LHS` had run: evaluate RHS, save it,
/// evaluate LHS, then compare LHS against the saved RHS. The caller picks
/// the conditional jump.
pub(super) fn gen_relation(gen: &mut Gen, func: &FunctionCtx, relation: &Node) -> Result<(), GenError> {
    if !matches!(relation.kind, NodeKind::Relation(_)) {
        unreachable!("not a relation node: {:?}", relation.kind);
    }
    gen_expr(gen, func, &relation.children[1])?;
    gen.out.instr("pushq", &["%rax"]);
    gen_expr(gen, func, &relation.children[0])?;
    gen.out.instr("popq", &["%rcx"]);
    gen.out.instr("cmpq", &["%rcx", "%rax"]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::strings::StringTable;
    use crate::symbols::SymbolTable;

    fn new_gen(globals: &SymbolTable, strings: &StringTable) -> Gen<'_> {
        Gen {
            globals,
            strings,
            target: crate::codegen::Target::Linux,
            out: crate::codegen::AsmWriter::new(),
            if_counter: 0,
            while_counter: 0,
        }
    }

    fn func(locals: &SymbolTable) -> FunctionCtx<'_> {
        FunctionCtx { locals, param_count: 0 }
    }

    /// `<<`/`>>` must evaluate their right operand (the shift count) first,
    /// so the final shift instruction sees the count in `%cl`, not whatever
    /// the left operand's evaluation last left there.
    #[test]
    fn shift_evaluates_count_before_value_and_ends_in_salq() {
        let globals = SymbolTable::new();
        let strings = StringTable::new();
        let mut gen = new_gen(&globals, &strings);
        let locals = SymbolTable::new();
        let f = func(&locals);

        let node = Node::binary(BinOp::Shl, Node::number(5), Node::number(2));
        gen_expr(&mut gen, &f, &node).unwrap();
        let asm = gen.out.finish();

        assert!(asm.contains("salq %cl, %rax"));
        // the shift-count operand (2) is evaluated and pushed before the
        // value-to-shift operand (5) is evaluated.
        let count_pos = asm.find("$2").unwrap();
        let value_pos = asm.find("$5").unwrap();
        assert!(count_pos < value_pos);
    }

    #[test]
    fn division_evaluates_right_operand_first_and_sign_extends() {
        let globals = SymbolTable::new();
        let strings = StringTable::new();
        let mut gen = new_gen(&globals, &strings);
        let locals = SymbolTable::new();
        let f = func(&locals);

        let node = Node::binary(BinOp::Div, Node::number(10), Node::number(3));
        gen_expr(&mut gen, &f, &node).unwrap();
        let asm = gen.out.finish();

        assert!(asm.contains("cqo"));
        assert!(asm.contains("idivq %rcx"));
        let divisor_pos = asm.find("$3").unwrap();
        let dividend_pos = asm.find("$10").unwrap();
        assert!(divisor_pos < dividend_pos);
    }

    #[test]
    fn addition_evaluates_left_operand_first() {
        let globals = SymbolTable::new();
        let strings = StringTable::new();
        let mut gen = new_gen(&globals, &strings);
        let locals = SymbolTable::new();
        let f = func(&locals);

        let node = Node::binary(BinOp::Add, Node::number(1), Node::number(2));
        gen_expr(&mut gen, &f, &node).unwrap();
        let asm = gen.out.finish();

        assert!(asm.contains("addq %rcx, %rax"));
        let left_pos = asm.find("$1").unwrap();
        let right_pos = asm.find("$2").unwrap();
        assert!(left_pos < right_pos);
    }

    #[test]
    fn calling_a_non_function_symbol_is_an_error() {
        let mut globals = SymbolTable::new();
        globals.insert("x", SymbolKind::GlobalVar).unwrap();
        let strings = StringTable::new();
        let mut gen = new_gen(&globals, &strings);
        let locals = SymbolTable::new();
        let f = func(&locals);

        let mut callee = Node::identifier("x");
        callee.symbol = Some(crate::ast::SymbolRef::Global(globals.lookup("x").unwrap()));
        let call = Node::new(NodeKind::FunctionCall, vec![callee, Node::list(vec![])]);

        let err = gen_call(&mut gen, &f, &call).unwrap_err();
        assert_eq!(err, GenError::CallTargetNotFunction { name: "x".to_owned() });
    }
}
