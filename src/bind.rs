//! Name-binding pass: walks the simplified tree, builds the global symbol
//! table and each function's local one, attaches a [`SymbolRef`] to every
//! resolved identifier, and interns string literals.
//!
//! Globals and function headers (including parameters, which fixes their
//! sequence numbers to source order) are bound in one top-to-bottom pass
//! before any function body is walked, so a function may reference a
//! global or another function declared later in the source.

use crate::ast::{Node, NodeKind, SymbolRef};
use crate::error::BindError;
use crate::strings::StringTable;
use crate::symbols::{SymbolKind, SymbolTable};

pub struct Bound {
    pub globals: SymbolTable,
    pub strings: StringTable,
}

pub fn bind(program: &mut Node) -> Result<Bound, BindError> {
    let mut globals = SymbolTable::new();
    let mut strings = StringTable::new();

    for top in program.children.iter() {
        match &top.kind {
            NodeKind::GlobalDeclaration => bind_global_declaration(top, &mut globals)?,
            NodeKind::Function { name } => bind_function_header(name, top, &mut globals)?,
            other => unreachable!("top-level node must be a declaration or function, got {other:?}"),
        }
    }

    for top in program.children.iter_mut() {
        let NodeKind::Function { name } = &top.kind else { continue };
        let func_id = globals.lookup(name).expect("function header was just bound");
        let mut locals = globals
            .get_mut(func_id)
            .locals
            .take()
            .expect("function symbol always owns a locals table");
        let result = {
            let mut ctx = BindCtx { locals: &mut locals, globals: &globals, strings: &mut strings };
            ctx.bind_block(&mut top.children[1])
        };
        globals.get_mut(func_id).locals = Some(locals);
        result?;
    }

    Ok(Bound { globals, strings })
}

fn bind_global_declaration(node: &Node, globals: &mut SymbolTable) -> Result<(), BindError> {
    let declarators = &node.children[0];
    for declarator in &declarators.children {
        match &declarator.kind {
            NodeKind::Identifier(name) => {
                globals
                    .insert(name, SymbolKind::GlobalVar)
                    .map_err(|_| BindError::Collision { name: name.clone() })?;
            }
            NodeKind::ArrayIndexing => {
                let name = match &declarator.children[0].kind {
                    NodeKind::Identifier(name) => name,
                    other => unreachable!("array declarator's first child must be an identifier, got {other:?}"),
                };
                let id = globals
                    .insert(name, SymbolKind::GlobalArray)
                    .map_err(|_| BindError::Collision { name: name.clone() })?;
                globals.get_mut(id).array_len = declarator.children[1].as_number();
            }
            other => unreachable!("global declarator must be an identifier or array indexing, got {other:?}"),
        }
    }
    Ok(())
}

fn bind_function_header(name: &str, node: &Node, globals: &mut SymbolTable) -> Result<(), BindError> {
    let mut locals = SymbolTable::new();
    for param in &node.children[0].children {
        let param_name = match &param.kind {
            NodeKind::Identifier(name) => name,
            other => unreachable!("parameter must be an identifier, got {other:?}"),
        };
        locals
            .insert(param_name, SymbolKind::Parameter)
            .map_err(|_| BindError::Collision { name: param_name.clone() })?;
    }
    let id = globals
        .insert(name, SymbolKind::Function)
        .map_err(|_| BindError::Collision { name: name.to_owned() })?;
    globals.get_mut(id).locals = Some(Box::new(locals));
    Ok(())
}

struct BindCtx<'a> {
    locals: &'a mut SymbolTable,
    globals: &'a SymbolTable,
    strings: &'a mut StringTable,
}

impl BindCtx<'_> {
    fn bind_block(&mut self, node: &mut Node) -> Result<(), BindError> {
        match node.children.len() {
            1 => self.bind_node(&mut node.children[0]),
            2 => {
                self.locals.push_scope();
                let result = self.bind_block_declarations(node).and_then(|()| self.bind_node(&mut node.children[1]));
                self.locals.pop_scope();
                result
            }
            n => unreachable!("block must have 1 or 2 children, got {n}"),
        }
    }

    fn bind_block_declarations(&mut self, node: &Node) -> Result<(), BindError> {
        for declared in &node.children[0].children {
            let name = match &declared.kind {
                NodeKind::Identifier(name) => name,
                other => unreachable!("block declaration must be an identifier, got {other:?}"),
            };
            self.locals
                .insert(name, SymbolKind::LocalVar)
                .map_err(|_| BindError::Collision { name: name.clone() })?;
        }
        Ok(())
    }

    fn bind_node(&mut self, node: &mut Node) -> Result<(), BindError> {
        if matches!(node.kind, NodeKind::Block) {
            return self.bind_block(node);
        }
        if let NodeKind::Identifier(name) = &node.kind {
            let symbol = self
                .locals
                .lookup(name)
                .map(SymbolRef::Local)
                .or_else(|| self.globals.lookup(name).map(SymbolRef::Global))
                .ok_or_else(|| BindError::Unresolved { name: name.clone() })?;
            node.symbol = Some(symbol);
            return Ok(());
        }
        if matches!(node.kind, NodeKind::StringLiteral(_)) {
            let literal = match std::mem::replace(&mut node.kind, NodeKind::List) {
                NodeKind::StringLiteral(s) => s,
                _ => unreachable!(),
            };
            node.kind = NodeKind::StringRef(self.strings.intern(literal));
            return Ok(());
        }
        for child in node.children.iter_mut() {
            self.bind_node(child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, SymbolRef};
    use crate::symbols::SymbolKind;

    fn function(name: &str, params: Vec<&str>, body: Node) -> Node {
        Node::new(
            NodeKind::Function { name: name.to_owned() },
            vec![Node::list(params.into_iter().map(Node::identifier).collect()), body],
        )
    }

    fn block_no_decls(statements: Vec<Node>) -> Node {
        Node::new(NodeKind::Block, vec![Node::list(statements)])
    }

    #[test]
    fn parameters_get_contiguous_sequence_numbers() {
        let body = block_no_decls(vec![Node::new(NodeKind::ReturnStatement, vec![Node::number(0)])]);
        let mut program = Node::list(vec![function("f", vec!["a", "b"], body)]);
        let bound = bind(&mut program).unwrap();

        let f = bound.globals.lookup("f").unwrap();
        let locals = bound.globals.get(f).locals.as_ref().unwrap();
        let a = locals.lookup("a").unwrap();
        let b = locals.lookup("b").unwrap();
        assert_eq!(locals.get(a).seq, 0);
        assert_eq!(locals.get(b).seq, 1);
        assert_eq!(locals.get(a).kind, SymbolKind::Parameter);
    }

    #[test]
    fn local_declarations_continue_sequence_after_parameters() {
        let body = Node::new(
            NodeKind::Block,
            vec![
                Node::list(vec![Node::identifier("x")]),
                Node::list(vec![Node::new(NodeKind::ReturnStatement, vec![Node::identifier("x")])]),
            ],
        );
        let mut program = Node::list(vec![function("f", vec!["a"], body)]);
        let bound = bind(&mut program).unwrap();

        let f = bound.globals.lookup("f").unwrap();
        let locals = bound.globals.get(f).locals.as_ref().unwrap();
        let x = locals.lookup("x").unwrap();
        assert_eq!(locals.get(x).seq, 1);
        assert_eq!(locals.get(x).kind, SymbolKind::LocalVar);
    }

    #[test]
    fn identifier_falls_back_to_global_scope() {
        let global_decl = Node::new(NodeKind::GlobalDeclaration, vec![Node::list(vec![Node::identifier("g")])]);
        let body = block_no_decls(vec![Node::new(NodeKind::ReturnStatement, vec![Node::identifier("g")])]);
        let mut program = Node::list(vec![global_decl, function("f", vec![], body)]);
        let bound = bind(&mut program).unwrap();

        let return_expr = &program.children[1].children[1].children[0].children[0].children[0];
        assert_eq!(return_expr.kind, NodeKind::Identifier("g".to_owned()));
        let g = bound.globals.lookup("g").unwrap();
        assert_eq!(return_expr.symbol, Some(SymbolRef::Global(g)));
    }

    #[test]
    fn unresolved_identifier_is_an_error() {
        let body = block_no_decls(vec![Node::new(NodeKind::ReturnStatement, vec![Node::identifier("missing")])]);
        let mut program = Node::list(vec![function("f", vec![], body)]);
        assert_eq!(bind(&mut program), Err(BindError::Unresolved { name: "missing".to_owned() }));
    }

    #[test]
    fn duplicate_parameter_is_a_collision() {
        let body = block_no_decls(vec![]);
        let mut program = Node::list(vec![function("f", vec!["a", "a"], body)]);
        assert_eq!(bind(&mut program), Err(BindError::Collision { name: "a".to_owned() }));
    }

    #[test]
    fn string_literal_is_interned_and_rewritten() {
        let body = block_no_decls(vec![Node::new(
            NodeKind::PrintStatement,
            vec![Node::list(vec![Node::leaf(NodeKind::StringLiteral("\"hi\"".to_owned()))])],
        )]);
        let mut program = Node::list(vec![function("f", vec![], body)]);
        let bound = bind(&mut program).unwrap();

        assert_eq!(bound.strings.get(0), "\"hi\"");
        let item = &program.children[0].children[1].children[0].children[0].children[0].children[0];
        assert_eq!(item.kind, NodeKind::StringRef(0));
    }

    #[test]
    fn global_array_records_its_constant_length() {
        let declarator = Node::new(NodeKind::ArrayIndexing, vec![Node::identifier("a"), Node::number(3)]);
        let global_decl = Node::new(NodeKind::GlobalDeclaration, vec![Node::list(vec![declarator])]);
        let body = block_no_decls(vec![Node::new(NodeKind::ReturnStatement, vec![Node::number(0)])]);
        let mut program = Node::list(vec![global_decl, function("f", vec![], body)]);
        let bound = bind(&mut program).unwrap();

        let a = bound.globals.lookup("a").unwrap();
        assert_eq!(bound.globals.get(a).kind, SymbolKind::GlobalArray);
        assert_eq!(bound.globals.get(a).array_len, Some(3));
    }

    #[test]
    fn non_constant_array_length_is_recorded_as_unknown() {
        let declarator = Node::new(
            NodeKind::ArrayIndexing,
            vec![Node::identifier("a"), Node::binary(BinOp::Add, Node::number(1), Node::identifier("n"))],
        );
        let global_decl = Node::new(NodeKind::GlobalDeclaration, vec![Node::list(vec![declarator])]);
        let mut program = Node::list(vec![
            Node::new(NodeKind::GlobalDeclaration, vec![Node::list(vec![Node::identifier("n")])]),
            global_decl,
        ]);
        let bound = bind(&mut program).unwrap();
        let a = bound.globals.lookup("a").unwrap();
        assert_eq!(bound.globals.get(a).array_len, None);
    }
}
