//! Statement codegen. The innermost loop's exit label is threaded through
//! the recursion as a plain parameter instead of a module-global: entering
//! a `while` shadows it with a fresh label for that subtree, and the
//! previous one comes back for free when the call returns.

use crate::ast::{Node, NodeKind, RelOp};
use crate::error::GenError;

use super::expr::{array_address, gen_call, gen_expr, gen_relation, variable_operand};
use super::{FunctionCtx, Gen};

pub fn gen_stmt(gen: &mut Gen, func: &FunctionCtx, node: &Node, loop_exit: Option<&str>) -> Result<(), GenError> {
    match &node.kind {
        NodeKind::Block => gen_block(gen, func, node, loop_exit),
        NodeKind::AssignmentStatement => gen_assignment(gen, func, node),
        NodeKind::ReturnStatement => gen_return(gen, func, node),
        NodeKind::PrintStatement => gen_print(gen, func, node),
        NodeKind::BreakStatement => gen_break(gen, loop_exit),
        NodeKind::IfStatement => gen_if(gen, func, node, loop_exit),
        NodeKind::WhileStatement => gen_while(gen, func, node),
        NodeKind::FunctionCall => gen_call(gen, func, node),
        other => unreachable!("not a valid statement node: {other:?}"),
    }
}

fn gen_block(gen: &mut Gen, func: &FunctionCtx, node: &Node, loop_exit: Option<&str>) -> Result<(), GenError> {
    let statements = node.children.last().expect("block always ends in a statement list");
    for statement in &statements.children {
        gen_stmt(gen, func, statement, loop_exit)?;
    }
    Ok(())
}

fn gen_assignment(gen: &mut Gen, func: &FunctionCtx, node: &Node) -> Result<(), GenError> {
    let dest = &node.children[0];
    let rhs = &node.children[1];
    gen_expr(gen, func, rhs)?;
    match &dest.kind {
        NodeKind::Identifier(_) => {
            let operand = variable_operand(gen, func, dest)?;
            gen.out.instr("movq", &["%rax", &operand]);
        }
        NodeKind::ArrayIndexing => {
            // The address computation clobbers %rax, so the already
            // evaluated right-hand side has to survive it on the stack.
            gen.out.instr("pushq", &["%rax"]);
            let addr = array_address(gen, func, dest)?;
            gen.out.instr("popq", &["%rax"]);
            gen.out.instr("movq", &["%rax", &addr]);
        }
        other => unreachable!("assignment destination must be an identifier or array indexing, got {other:?}"),
    }
    Ok(())
}

fn gen_return(gen: &mut Gen, func: &FunctionCtx, node: &Node) -> Result<(), GenError> {
    gen_expr(gen, func, &node.children[0])?;
    gen.out.instr("movq", &["%rbp", "%rsp"]);
    gen.out.instr("popq", &["%rbp"]);
    gen.out.instr("ret", &[]);
    Ok(())
}

fn gen_print(gen: &mut Gen, func: &FunctionCtx, node: &Node) -> Result<(), GenError> {
    for item in &node.children[0].children {
        match &item.kind {
            NodeKind::StringRef(index) => {
                gen.out.instr("leaq", &["strout(%rip)", "%rdi"]);
                gen.out.instr("leaq", &[&format!("string{index}(%rip)"), "%rsi"]);
            }
            _ => {
                gen_expr(gen, func, item)?;
                gen.out.instr("movq", &["%rax", "%rsi"]);
                gen.out.instr("leaq", &["intout(%rip)", "%rdi"]);
            }
        }
        gen.out.instr("call", &["safe_printf"]);
    }
    gen.out.instr("movq", &["$'\\n'", "%rdi"]);
    gen.out.instr("call", &["putchar"]);
    Ok(())
}

fn gen_break(gen: &mut Gen, loop_exit: Option<&str>) -> Result<(), GenError> {
    let label = loop_exit.ok_or(GenError::BreakOutsideLoop)?;
    gen.out.instr("jmp", &[label]);
    Ok(())
}

fn then_jump(op: RelOp) -> &'static str {
    match op {
        RelOp::Eq => "je",
        RelOp::Ne => "jne",
        RelOp::Lt => "jl",
        RelOp::Gt => "jg",
        RelOp::Le => "jle",
        RelOp::Ge => "jge",
    }
}

fn inverted_jump(op: RelOp) -> &'static str {
    match op {
        RelOp::Eq => "jne",
        RelOp::Ne => "je",
        RelOp::Lt => "jge",
        RelOp::Gt => "jle",
        RelOp::Le => "jg",
        RelOp::Ge => "jl",
    }
}

fn relation_op(relation: &Node) -> RelOp {
    match relation.kind {
        NodeKind::Relation(op) => op,
        ref other => unreachable!("expected a relation node, got {other:?}"),
    }
}

fn gen_if(gen: &mut Gen, func: &FunctionCtx, node: &Node, loop_exit: Option<&str>) -> Result<(), GenError> {
    let relation = &node.children[0];
    let op = relation_op(relation);
    let then_stmt = &node.children[1];
    let else_stmt = node.children.get(2);

    gen_relation(gen, func, relation)?;
    let (then_label, else_label, end_label) = gen.new_if_labels();

    gen.out.instr(then_jump(op), &[&then_label]);
    gen.out.instr("jmp", &[if else_stmt.is_some() { else_label.as_str() } else { end_label.as_str() }]);

    gen.out.label(&then_label);
    gen_stmt(gen, func, then_stmt, loop_exit)?;
    gen.out.instr("jmp", &[end_label.as_str()]);

    if let Some(else_stmt) = else_stmt {
        gen.out.label(&else_label);
        gen_stmt(gen, func, else_stmt, loop_exit)?;
    }
    gen.out.label(&end_label);
    Ok(())
}

fn gen_while(gen: &mut Gen, func: &FunctionCtx, node: &Node) -> Result<(), GenError> {
    let relation = &node.children[0];
    let op = relation_op(relation);
    let body = &node.children[1];

    let (start_label, end_label) = gen.new_while_labels();
    gen.out.label(&start_label);
    gen_relation(gen, func, relation)?;
    gen.out.instr(inverted_jump(op), &[&end_label]);
    gen_stmt(gen, func, body, Some(&end_label))?;
    gen.out.instr("jmp", &[start_label.as_str()]);
    gen.out.label(&end_label);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RelOp;
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

    #[test]
    fn break_with_no_enclosing_loop_is_an_error() {
        let globals = SymbolTable::new();
        let strings = StringTable::new();
        let mut gen = new_gen(&globals, &strings);
        let locals = SymbolTable::new();
        let f = func(&locals);

        let err = gen_stmt(&mut gen, &f, &Node::leaf(NodeKind::BreakStatement), None).unwrap_err();
        assert_eq!(err, GenError::BreakOutsideLoop);
    }

    #[test]
    fn break_inside_while_jumps_to_its_end_label() {
        let globals = SymbolTable::new();
        let strings = StringTable::new();
        let mut gen = new_gen(&globals, &strings);
        let locals = SymbolTable::new();
        let f = func(&locals);

        let while_node = Node::new(
            NodeKind::WhileStatement,
            vec![
                Node::relation(RelOp::Lt, Node::number(1), Node::number(2)),
                Node::leaf(NodeKind::BreakStatement),
            ],
        );
        gen_stmt(&mut gen, &f, &while_node, None).unwrap();
        let asm = gen.out.finish();

        assert!(asm.contains("WHILE0:"));
        assert!(asm.contains("ENDWHILE0:"));
        assert!(asm.contains("jmp ENDWHILE0"));
    }

    #[test]
    fn if_without_else_has_no_else_label() {
        let globals = SymbolTable::new();
        let strings = StringTable::new();
        let mut gen = new_gen(&globals, &strings);
        let locals = SymbolTable::new();
        let f = func(&locals);

        let if_node = Node::new(
            NodeKind::IfStatement,
            vec![
                Node::relation(RelOp::Eq, Node::number(1), Node::number(1)),
                Node::new(NodeKind::ReturnStatement, vec![Node::number(0)]),
            ],
        );
        gen_stmt(&mut gen, &f, &if_node, None).unwrap();
        let asm = gen.out.finish();

        assert!(!asm.contains("ELSE0"));
        assert!(asm.contains("THEN0:"));
        assert!(asm.contains("ENDIF0:"));
    }
}
