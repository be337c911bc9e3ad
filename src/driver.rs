//! Sequences the phases and honors the CLI's debug-dump flags. A real tree
//! or graph pretty-printer is out of scope here (see [`crate`]'s docs), so
//! dumps fall back to `Debug` formatting of the internal structures.

use crate::ast::Node;
use crate::bind::{bind, Bound};
use crate::codegen::{self, Target};
use crate::error::CompileError;
use crate::raw::RawNode;

/// Which dumps the caller wants interleaved with (or instead of) assembly
/// output, mirroring the driver's `-t`/`-T`/`-s`/`-c` flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpFlags {
    pub tree_before_simplify: bool,
    pub tree_after_simplify: bool,
    pub tables: bool,
    pub assembly: bool,
}

/// Everything the driver produced, in the order it was asked to print it.
#[derive(Debug, Default)]
pub struct CompileOutput {
    pub sections: Vec<String>,
}

/// Runs `raw` through lowering, simplification, binding, and (if
/// `flags.assembly`) code generation, collecting whichever dumps `flags`
/// asked for along the way. Stops at the first phase that fails.
pub fn compile(raw: RawNode, target: Target, flags: DumpFlags) -> Result<CompileOutput, CompileError> {
    let mut out = CompileOutput::default();

    let mut program: Node = crate::lower::lower(raw)?;
    if flags.tree_before_simplify {
        out.sections.push(format!("{program:#?}"));
    }

    program = crate::simplify::simplify(program);
    if flags.tree_after_simplify {
        out.sections.push(format!("{program:#?}"));
    }

    let Bound { globals, strings } = bind(&mut program)?;
    if flags.tables {
        out.sections.push(format!("{globals:#?}"));
        out.sections.push(format!("{strings:#?}"));
    }

    if flags.assembly {
        let asm = codegen::generate(&program, &globals, &strings, target)?;
        out.sections.push(asm);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{RawKind, RawNode};

    fn trivial_program() -> RawNode {
        RawNode::new(
            RawKind::List,
            vec![RawNode::new(
                RawKind::Function,
                vec![
                    RawNode::identifier("main"),
                    RawNode::list(vec![]),
                    RawNode::new(
                        RawKind::Block,
                        vec![RawNode::list(vec![RawNode::new(
                            RawKind::ReturnStatement,
                            vec![RawNode::number(0)],
                        )])],
                    ),
                ],
            )],
        )
    }

    #[test]
    fn no_flags_produces_no_sections() {
        let out = compile(trivial_program(), Target::Linux, DumpFlags::default()).unwrap();
        assert!(out.sections.is_empty());
    }

    #[test]
    fn assembly_flag_emits_one_section() {
        let flags = DumpFlags { assembly: true, ..Default::default() };
        let out = compile(trivial_program(), Target::Linux, flags).unwrap();
        assert_eq!(out.sections.len(), 1);
        assert!(out.sections[0].contains(".main:"));
    }

    #[test]
    fn every_flag_produces_four_sections_in_order() {
        let flags = DumpFlags {
            tree_before_simplify: true,
            tree_after_simplify: true,
            tables: true,
            assembly: true,
        };
        let out = compile(trivial_program(), Target::Linux, flags).unwrap();
        // tree-before, tree-after, globals, strings, assembly
        assert_eq!(out.sections.len(), 5);
        assert!(out.sections[4].contains(".global main") || out.sections[4].contains(".global _main"));
    }
}
