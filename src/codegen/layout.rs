//! Effective-address computation for resolved symbols, per the fixed
//! stack layout the function prologue establishes, and the fixed register
//! order the System V ABI passes the first six integer arguments in.

use crate::symbols::{Symbol, SymbolKind};

pub const REGISTER_PARAMS: usize = 6;

pub fn register_params() -> &'static [&'static str] {
    &["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"]
}

/// The memory operand for a scalar symbol. Panics if called on a
/// `GlobalArray` or `Function` symbol; callers must check `symbol.kind`
/// and raise the appropriate [`crate::error::GenError`] first, since those
/// are user-facing fatal conditions, not internal bugs.
pub fn operand_for(symbol: &Symbol, param_count: usize) -> String {
    match symbol.kind {
        SymbolKind::GlobalVar => format!(".{}(%rip)", symbol.name),
        SymbolKind::Parameter => {
            let seq = symbol.seq as i64;
            if seq < REGISTER_PARAMS as i64 {
                format!("{}(%rbp)", -8 * (seq + 1))
            } else {
                format!("{}(%rbp)", 16 + 8 * (seq - REGISTER_PARAMS as i64))
            }
        }
        SymbolKind::LocalVar => {
            let mut seq = symbol.seq as i64;
            if param_count > REGISTER_PARAMS {
                seq -= (param_count - REGISTER_PARAMS) as i64;
            }
            format!("{}(%rbp)", -8 * (seq + 1))
        }
        SymbolKind::GlobalArray | SymbolKind::Function => {
            unreachable!("'{}' is not addressable as a scalar; callers must check kind first", symbol.name)
        }
    }
}
