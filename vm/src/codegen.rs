use arch::symbol::{ADDR_MAX, POINTER_SIZE, STACK_BASE, STATIC_SIZE, TEMP_SIZE};

use crate::error::Error;
use crate::parser::{ArithOp, Command, Segment};

/// Append assembly lines to the output buffer, one expression per line.
macro_rules! asm {
    ($out:expr; $($line:expr),* $(,)?) => {{
        $( $out.push($line.to_string()); )*
    }};
}

/// Monotonic id source for generated labels. Never reset, so every label
/// it numbers is unique across the whole run, directory mode included.
#[derive(Debug, Default)]
pub struct Counter(u32);

impl Counter {
    fn next(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

/// Lowers parsed VM commands to Hack assembly. Holds the per-run emitter
/// state: the static-segment prefix of the file being translated, the
/// enclosing function name for label mangling, and the branch/return
/// label counters.
pub struct CodeWriter {
    prefix: String,
    function: String,
    branch: Counter,
    ret: Counter,
}

impl CodeWriter {
    pub fn new() -> Self {
        CodeWriter {
            prefix: "_".to_string(),
            function: "_".to_string(),
            branch: Counter::default(),
            ret: Counter::default(),
        }
    }

    /// Switch to a new source file. Its basename (without `.vm`) becomes
    /// the namespace of `static` cells and comparison labels. The label
    /// counters deliberately keep counting.
    pub fn begin_file(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }

    /// SP = 256, then transfer control to `Sys.init`. Establishes the
    /// first frame before any user instruction runs.
    pub fn bootstrap(&mut self) -> Vec<String> {
        let mut out = vec![];
        asm!(out; "// bootstrap", format!("@{}", STACK_BASE), "D=A", "@SP", "M=D");
        self.call("Sys.init", 0, &mut out);
        out
    }

    /// Translate one command into a self-contained assembly sequence,
    /// prefixed with an annotation comment echoing the command. All
    /// validation happens before the first instruction is produced, so a
    /// failing command contributes nothing to the output.
    pub fn translate(&mut self, command: &Command) -> Result<Vec<String>, Error> {
        let mut out = vec![format!("// {}", command)];
        match command {
            Command::Arithmetic(op) => self.arithmetic(*op, &mut out),
            Command::Push(segment, index) => {
                check_range(*segment, *index)?;
                self.push(*segment, *index, &mut out);
            }
            Command::Pop(segment, index) => {
                check_range(*segment, *index)?;
                self.pop(*segment, *index, &mut out);
            }
            Command::Label(label) => {
                asm!(out; format!("({}${})", self.function, label));
            }
            Command::Goto(label) => {
                asm!(out; format!("@{}${}", self.function, label), "0;JMP");
            }
            Command::IfGoto(label) => {
                // Pop one value; any nonzero value counts as true.
                asm!(out;
                    "@SP", "A=M-1", "D=M", "@SP", "M=M-1",
                    format!("@{}${}", self.function, label),
                    "D;JNE",
                );
            }
            Command::Function(name, locals) => {
                asm!(out; format!("({})", name));
                self.function = name.clone();
                for _ in 0..*locals {
                    asm!(out; "@0", "D=A");
                    push_d(&mut out);
                }
            }
            Command::Call(name, args) => {
                self.call(name, *args, &mut out);
            }
            Command::Return => ret(&mut out),
        }
        Ok(out)
    }

    fn arithmetic(&mut self, op: ArithOp, out: &mut Vec<String>) {
        match op {
            ArithOp::Add => binary("M=D+M", out),
            ArithOp::Sub => binary("M=M-D", out),
            ArithOp::And => binary("M=D&M", out),
            ArithOp::Or => binary("M=D|M", out),
            ArithOp::Neg => asm!(out; "@SP", "A=M-1", "M=-M"),
            ArithOp::Not => asm!(out; "@SP", "A=M-1", "M=!M"),
            ArithOp::Eq => self.compare("JEQ", out),
            ArithOp::Gt => self.compare("JGT", out),
            ArithOp::Lt => self.compare("JLT", out),
        }
    }

    /// Pop two cells, compute their difference and branch on it. True is
    /// all-ones, false all-zeros.
    fn compare(&mut self, jump: &str, out: &mut Vec<String>) {
        let id = self.branch.next();
        let taken = format!("{}${}T", self.prefix, id);
        let end = format!("{}${}E", self.prefix, id);
        asm!(out;
            "@SP", "A=M-1", "D=M", "A=A-1", "D=M-D",
            format!("@{}", taken),
            format!("D;{}", jump),
            "@SP", "A=M-1", "A=A-1", "M=0",
            format!("@{}", end),
            "0;JMP",
            format!("({})", taken),
            "@SP", "A=M-1", "A=A-1", "M=-1",
            format!("({})", end),
            "@SP", "M=M-1",
        );
    }

    fn push(&self, segment: Segment, index: u16, out: &mut Vec<String>) {
        match segment {
            Segment::Constant => {
                asm!(out; format!("@{}", index), "D=A");
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                asm!(out;
                    format!("@{}", index), "D=A",
                    format!("@{}", base(segment)),
                    "A=M", "A=D+A", "D=M",
                );
            }
            Segment::Temp => {
                asm!(out; format!("@{}", index), "D=A", "@R5", "A=D+A", "D=M");
            }
            Segment::Pointer => {
                asm!(out; pointer(index), "D=M");
            }
            Segment::Static => {
                asm!(out; format!("@{}.{}", self.prefix, index), "D=M");
            }
        }
        push_d(out);
    }

    fn pop(&self, segment: Segment, index: u16, out: &mut Vec<String>) {
        match segment {
            // Popping a literal has no storage target; just drop the cell.
            Segment::Constant => {
                asm!(out; "@SP", "M=M-1");
            }
            Segment::Pointer => {
                asm!(out;
                    "@SP", "A=M-1", "D=M",
                    pointer(index),
                    "M=D", "@SP", "M=M-1",
                );
            }
            Segment::Static => {
                asm!(out;
                    "@SP", "A=M-1", "D=M",
                    format!("@{}.{}", self.prefix, index),
                    "M=D", "@SP", "M=M-1",
                );
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That | Segment::Temp => {
                // Stage the popped value in R13 and the target address in
                // R14; temp addresses from the literal base, the others
                // through their base pointer.
                asm!(out; "@SP", "A=M-1", "D=M", "@SP", "M=M-1", "@R13", "M=D");
                if segment == Segment::Temp {
                    asm!(out; format!("@{}", index), "D=A", "@R5", "D=D+A");
                } else {
                    asm!(out;
                        format!("@{}", index), "D=A",
                        format!("@{}", base(segment)),
                        "A=M", "D=D+A",
                    );
                }
                asm!(out; "@R14", "M=D", "@R13", "D=M", "@R14", "A=M", "M=D");
            }
        }
    }

    /// Save the caller's context, reposition ARG and LCL, jump to the
    /// callee, and plant the return label.
    fn call(&mut self, name: &str, args: u16, out: &mut Vec<String>) {
        let ret = format!("ret${}", self.ret.next());
        asm!(out; format!("@{}", ret), "D=A");
        push_d(out);
        for saved in ["LCL", "ARG", "THIS", "THAT"] {
            asm!(out; format!("@{}", saved), "D=M");
            push_d(out);
        }
        asm!(out;
            // ARG = SP - args - 5
            format!("@{}", args), "D=A", "@5", "D=D+A", "@SP", "D=M-D", "@ARG", "M=D",
            // LCL = SP
            "@SP", "D=M", "@LCL", "M=D",
            format!("@{}", name),
            "0;JMP",
            format!("({})", ret),
        );
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirror of `call`. The return address is read into R14 before the
/// return value lands at *ARG, which would clobber it in a frame with no
/// arguments.
fn ret(out: &mut Vec<String>) {
    asm!(out;
        // FRAME = LCL
        "@LCL", "D=M", "@R13", "M=D",
        // R14 = *(FRAME-5)
        "@R13", "D=M", "@5", "A=D-A", "D=M", "@R14", "M=D",
        // *ARG = pop()
        "@SP", "A=M-1", "D=M", "@SP", "M=M-1", "@ARG", "A=M", "M=D",
        // SP = ARG+1
        "@ARG", "D=M", "D=D+1", "@SP", "M=D",
        // THAT = *(FRAME-1)
        "@R13", "D=M", "@1", "A=D-A", "D=M", "@THAT", "M=D",
        // THIS = *(FRAME-2)
        "@R13", "D=M", "@2", "A=D-A", "D=M", "@THIS", "M=D",
        // ARG = *(FRAME-3)
        "@R13", "D=M", "@3", "A=D-A", "D=M", "@ARG", "M=D",
        // LCL = *(FRAME-4)
        "@R13", "D=M", "@4", "A=D-A", "D=M", "@LCL", "M=D",
        // goto *R14
        "@R14", "A=M", "0;JMP",
    );
}

/// Push D onto the stack.
fn push_d(out: &mut Vec<String>) {
    asm!(out; "@SP", "A=M", "M=D", "@SP", "M=M+1");
}

/// Pop two cells into one through the given `M=M?D` line.
fn binary(op: &str, out: &mut Vec<String>) {
    asm!(out; "@SP", "A=M-1", "D=M", "A=A-1", op, "@SP", "M=M-1");
}

fn base(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        Segment::That => "THAT",
        _ => unreachable!("segment has no base pointer"),
    }
}

fn pointer(index: u16) -> &'static str {
    if index == 0 {
        "@THIS"
    } else {
        "@THAT"
    }
}

fn check_range(segment: Segment, index: u16) -> Result<(), Error> {
    let max = match segment {
        Segment::Pointer => POINTER_SIZE - 1,
        Segment::Temp => TEMP_SIZE - 1,
        Segment::Static => STATIC_SIZE - 1,
        _ => ADDR_MAX,
    };
    if index > max {
        return Err(Error::SegmentRange {
            segment,
            index,
            max,
        });
    }
    Ok(())
}
