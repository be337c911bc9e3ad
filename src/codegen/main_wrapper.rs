//! The synthesized `main` entry point, the `safe_printf` stack-alignment
//! trampoline, and the platform symbol-alias directives.

use super::layout::register_params;
use super::{Gen, Target};

pub fn generate_main(gen: &mut Gen, first_name: &str, param_count: usize) {
    gen.out.label("main");
    gen.out.instr("pushq", &["%rbp"]);
    gen.out.instr("movq", &["%rsp", "%rbp"]);

    // argc arrives in %rdi, argv in %rsi; subtract the program name from
    // argc before comparing it to the first function's parameter count.
    gen.out.instr("subq", &["$1", "%rdi"]);
    gen.out.instr("cmpq", &[&format!("${param_count}"), "%rdi"]);
    gen.out.instr("jne", &["ABORT"]);

    if param_count > 0 {
        gen.out.instr("addq", &[&format!("${}", param_count * 8), "%rsi"]);
        gen.out.instr("movq", &["%rdi", "%rcx"]);
        gen.out.label("PARSE_ARGV");
        gen.out.instr("pushq", &["%rsi"]);
        gen.out.instr("pushq", &["%rcx"]);
        gen.out.instr("movq", &["(%rsi)", "%rdi"]);
        gen.out.instr("movq", &["$0", "%rsi"]);
        gen.out.instr("movq", &["$10", "%rdx"]);
        gen.out.instr("call", &["strtol"]);
        gen.out.instr("popq", &["%rcx"]);
        gen.out.instr("popq", &["%rsi"]);
        gen.out.instr("pushq", &["%rax"]);
        gen.out.instr("subq", &["$8", "%rsi"]);
        // `loop` decrements %rcx and branches while it's non-zero; seeded
        // with %rcx = argc, this runs exactly `param_count` times.
        gen.out.instr("loop", &["PARSE_ARGV"]);

        for reg in register_params().iter().take(param_count.min(6)) {
            gen.out.instr("popq", &[reg]);
        }
    }

    gen.out.instr("call", &[&format!(".{first_name}")]);
    gen.out.instr("movq", &["%rax", "%rdi"]);
    gen.out.instr("call", &["exit"]);

    gen.out.label("ABORT");
    gen.out.instr("leaq", &["errout(%rip)", "%rdi"]);
    gen.out.instr("call", &["puts"]);
    gen.out.instr("movq", &["$1", "%rdi"]);
    gen.out.instr("call", &["exit"]);
}

pub fn generate_safe_printf(gen: &mut Gen) {
    gen.out.label("safe_printf");
    gen.out.instr("pushq", &["%rbp"]);
    gen.out.instr("movq", &["%rsp", "%rbp"]);
    gen.out.instr("andq", &["$-16", "%rsp"]);
    gen.out.instr("call", &["printf"]);
    gen.out.instr("movq", &["%rbp", "%rsp"]);
    gen.out.instr("popq", &["%rbp"]);
    gen.out.instr("ret", &[]);
}

pub fn generate_symbol_aliases(gen: &mut Gen) {
    match gen.target {
        Target::Linux => gen.out.directive(".global main"),
        Target::MacOS => {
            gen.out.directive(".set printf, _printf");
            gen.out.directive(".set putchar, _putchar");
            gen.out.directive(".set puts, _puts");
            gen.out.directive(".set strtol, _strtol");
            gen.out.directive(".set exit, _exit");
            gen.out.directive(".set _main, main");
            gen.out.directive(".global _main");
        }
    }
}
