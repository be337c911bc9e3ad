//! Thin formatted-output layer over a `String` buffer. Every mnemonic the
//! generator needs goes through [`AsmWriter::instr`], so indentation and
//! operand-list formatting live in exactly one place.

#[derive(Debug, Default)]
pub struct AsmWriter {
    buf: String,
}

impl AsmWriter {
    pub fn new() -> AsmWriter {
        AsmWriter::default()
    }

    /// A bare line: section directives, `.zero`/`.asciz` data, symbol
    /// alias declarations. Emitted with no leading indentation.
    pub fn directive(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn label(&mut self, name: &str) {
        self.buf.push_str(name);
        self.buf.push_str(":\n");
    }

    pub fn instr(&mut self, mnemonic: &str, operands: &[&str]) {
        self.buf.push('\t');
        self.buf.push_str(mnemonic);
        if !operands.is_empty() {
            self.buf.push(' ');
            self.buf.push_str(&operands.join(", "));
        }
        self.buf.push('\n');
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
