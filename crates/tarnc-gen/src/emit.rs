//! Textual assembly emitter.
//!
//! Owns the output buffer and everything about its surface form:
//! instruction formatting (tab-separated opcode and comma-separated
//! operands), label allocation (monotonic `L0, L1, ...`), the
//! deduplicating string-literal pool, the stack push/pop idioms, and
//! the register name constants the generator speaks in.

use indexmap::IndexMap;

/// Stack pointer
pub const SP: &str = "$sp";
/// Frame pointer
pub const FP: &str = "$fp";
/// Return address register
pub const RA: &str = "$ra";
/// Syscall code / return value register
pub const V0: &str = "$v0";
/// Syscall argument register
pub const A0: &str = "$a0";
/// Scratch register 0
pub const T0: &str = "$t0";
/// Scratch register 1
pub const T1: &str = "$t1";

/// Formatted assembly output with a label allocator and string pool.
pub struct Emitter {
    out: String,
    next_label: u32,
    /// Raw literal text (quotes included) to its emitted label
    strings: IndexMap<String, String>,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            next_label: 0,
            strings: IndexMap::new(),
        }
    }

    /// Consume the emitter, returning the assembly text.
    pub fn finish(self) -> String {
        self.out
    }

    /// Allocate a fresh label.
    pub fn fresh_label(&mut self) -> String {
        let label = format!("L{}", self.next_label);
        self.next_label += 1;
        label
    }

    /// Label for a string literal, interning on first use.
    ///
    /// The first occurrence of a literal emits its `.asciiz` definition
    /// in a data segment and switches back to text; later occurrences
    /// of the exact same raw text reuse the label.
    pub fn string_label(&mut self, raw: &str) -> String {
        if let Some(label) = self.strings.get(raw) {
            return label.clone();
        }
        let label = self.fresh_label();
        self.strings.insert(raw.to_string(), label.clone());
        self.directive(".data");
        self.labeled_directive(&label, ".asciiz", raw);
        self.directive(".text");
        label
    }

    /// Emit `op\targ1, arg2, ...`.
    pub fn generate(&mut self, op: &str, args: &[&str]) {
        self.out.push('\t');
        self.out.push_str(op);
        if !args.is_empty() {
            self.out.push('\t');
            self.out.push_str(&args.join(", "));
        }
        self.out.push('\n');
    }

    /// Emit `op\treg, offset(base)`.
    pub fn generate_indexed(&mut self, op: &str, reg: &str, base: &str, offset: i32) {
        let addr = format!("{}({})", offset, base);
        self.generate(op, &[reg, &addr]);
    }

    /// Emit a label line: `name:`.
    pub fn label(&mut self, name: &str) {
        self.out.push_str(name);
        self.out.push_str(":\n");
    }

    /// Emit an assembler directive on its own line.
    pub fn directive(&mut self, directive: &str) {
        self.out.push('\t');
        self.out.push_str(directive);
        self.out.push('\n');
    }

    /// Emit `name:\tdirective arg`.
    pub fn labeled_directive(&mut self, name: &str, directive: &str, arg: &str) {
        self.out.push_str(name);
        self.out.push_str(":\t");
        self.out.push_str(directive);
        self.out.push(' ');
        self.out.push_str(arg);
        self.out.push('\n');
    }

    /// Emit a comment line.
    pub fn comment(&mut self, text: &str) {
        self.out.push_str("\t\t# ");
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Push a register onto the stack.
    pub fn push(&mut self, reg: &str) {
        self.generate_indexed("sw", reg, SP, 0);
        self.generate("subu", &[SP, SP, "4"]);
    }

    /// Pop the top of stack into a register.
    pub fn pop(&mut self, reg: &str) {
        self.generate_indexed("lw", reg, SP, 4);
        self.generate("addu", &[SP, SP, "4"]);
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}
