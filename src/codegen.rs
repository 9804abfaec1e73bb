use std::io::Write;

use tracing::{debug, trace};

use crate::command::{ArithOp, Command, Segment};
use crate::error::EmitError;
use crate::instructions::{is_symbol, MAX_ADDRESS, STATIC_SIZE, TEMP_BASE, TEMP_SIZE};

// Saved frame: return address, LCL, ARG, THIS, THAT.
const FRAME_WORDS: u16 = 5;
const FRAME_REG: &str = "R13";
const RET_REG: &str = "R14";
const ADDR_REG: &str = "R13";
// Leads every manufactured label and separates scope from label name.
const RESERVED: char = '$';

/// Lowers VM commands to Hack assembly, one self-contained block per command.
///
/// Owns all cross-command state: the label counter (never reset), the current
/// unit (scopes `static`) and the current function (scopes `label`/`goto`).
///
/// `$` is reserved: user function and label names may not contain it. Generated
/// labels start with it (`$EQ_TRUE_0`), labels inside a function are `F$name`
/// and labels outside any function are `$Unit$name`, so no two can coincide.
pub struct CodeWriter<W: Write> {
    out: W,
    unit: String,
    function: Option<String>,
    counter: usize,
    annotate: bool,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, unit: String::new(), function: None, counter: 0, annotate: true }
    }

    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Start a new source unit. Function scope does not carry over.
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = unit.into();
        self.function = None;
        debug!(unit = %self.unit, "begin unit");
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn current_function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Number of labels manufactured so far.
    pub fn label_count(&self) -> usize {
        self.counter
    }

    pub fn write(&mut self, cmd: &Command) -> Result<(), EmitError> {
        trace!(%cmd, "emit");
        if self.annotate {
            writeln!(self.out, "// {cmd}")?;
        }
        match cmd {
            Command::Arithmetic(op) => self.write_arithmetic(*op),
            Command::Push { segment, index } => self.write_push(*segment, *index),
            Command::Pop { segment, index } => self.write_pop(*segment, *index),
            Command::Label(name) => self.write_label(name),
            Command::Goto(name) => self.write_goto(name),
            Command::IfGoto(name) => self.write_if(name),
            Command::Function { name, num_locals } => self.write_function(name, *num_locals),
            Command::Call { name, num_args } => self.write_call(name, *num_args),
            Command::Return => self.write_return(),
        }
    }

    /// `SP = stack_base; call entry 0`
    pub fn write_bootstrap(&mut self, stack_base: u16, entry: &str) -> Result<(), EmitError> {
        if stack_base > MAX_ADDRESS {
            return Err(EmitError::operand(stack_base, "stack base exceeds address space"));
        }
        if self.annotate {
            writeln!(self.out, "// bootstrap")?;
        }
        self.emit(&[&format!("@{stack_base}"), "D=A", "@SP", "M=D"])?;
        self.write_call(entry, 0)
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> Result<W, EmitError> {
        self.out.flush()?;
        Ok(self.out)
    }

    pub fn write_arithmetic(&mut self, op: ArithOp) -> Result<(), EmitError> {
        match op {
            ArithOp::Add => self.binary("M=D+M"),
            ArithOp::Sub => self.binary("M=M-D"),
            ArithOp::And => self.binary("M=D&M"),
            ArithOp::Or => self.binary("M=D|M"),
            ArithOp::Neg => self.unary("M=-M"),
            ArithOp::Not => self.unary("M=!M"),
            ArithOp::Eq => self.compare("EQ", "JEQ"),
            ArithOp::Gt => self.compare("GT", "JGT"),
            ArithOp::Lt => self.compare("LT", "JLT"),
        }
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> Result<(), EmitError> {
        match segment {
            Segment::Constant => {
                check_max(segment, index, MAX_ADDRESS)?;
                self.emit(&[&format!("@{index}"), "D=A"])?;
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                check_max(segment, index, MAX_ADDRESS)?;
                let base = base_register(segment);
                self.emit(&[&format!("@{base}"), "D=M", &format!("@{index}"), "A=D+A", "D=M"])?;
            }
            Segment::Static | Segment::Temp | Segment::Pointer => {
                let cell = self.fixed_cell(segment, index)?;
                self.emit(&[&format!("@{cell}"), "D=M"])?;
            }
        }
        self.push_d()
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> Result<(), EmitError> {
        match segment {
            Segment::Constant => Err(EmitError::operand(
                format!("pop constant {index}"),
                "constant segment is push-only",
            )),
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                check_max(segment, index, MAX_ADDRESS)?;
                let base = base_register(segment);
                self.emit(&[
                    &format!("@{base}"),
                    "D=M",
                    &format!("@{index}"),
                    "D=D+A",
                    &format!("@{ADDR_REG}"),
                    "M=D",
                ])?;
                self.pop_d()?;
                self.emit(&[&format!("@{ADDR_REG}"), "A=M", "M=D"])
            }
            Segment::Static | Segment::Temp | Segment::Pointer => {
                let cell = self.fixed_cell(segment, index)?;
                self.pop_d()?;
                self.emit(&[&format!("@{cell}"), "M=D"])
            }
        }
    }

    pub fn write_label(&mut self, name: &str) -> Result<(), EmitError> {
        let label = self.scoped(name)?;
        self.emit(&[&format!("({label})")])
    }

    pub fn write_goto(&mut self, name: &str) -> Result<(), EmitError> {
        let label = self.scoped(name)?;
        self.emit(&[&format!("@{label}"), "0;JMP"])
    }

    /// Pop; jump when the value is nonzero.
    pub fn write_if(&mut self, name: &str) -> Result<(), EmitError> {
        let label = self.scoped(name)?;
        self.pop_d()?;
        self.emit(&[&format!("@{label}"), "D;JNE"])
    }

    pub fn write_function(&mut self, name: &str, num_locals: u16) -> Result<(), EmitError> {
        user_name(name)?;
        check_max(Segment::Local, num_locals, MAX_ADDRESS)?;
        debug!(function = name, num_locals, "function");
        self.function = Some(name.to_string());
        self.emit(&[&format!("({name})")])?;
        if num_locals == 0 {
            return Ok(());
        }
        // D counts down; the loop falls through once it reaches zero.
        let lp = self.fresh("INIT_LOCALS");
        self.emit(&[
            &format!("@{num_locals}"),
            "D=A",
            &format!("({lp})"),
            "@SP",
            "A=M",
            "M=0",
            "@SP",
            "M=M+1",
            "D=D-1",
            &format!("@{lp}"),
            "D;JGT",
        ])
    }

    pub fn write_call(&mut self, name: &str, num_args: u16) -> Result<(), EmitError> {
        user_name(name)?;
        let offset = u32::from(num_args) + u32::from(FRAME_WORDS);
        if offset > u32::from(MAX_ADDRESS) {
            return Err(EmitError::operand(format!("call {name} {num_args}"), "too many arguments"));
        }
        let ret = self.fresh(&format!("RETURN_{name}"));

        self.emit(&[&format!("@{ret}"), "D=A"])?;
        self.push_d()?;
        for reg in ["LCL", "ARG", "THIS", "THAT"] {
            self.emit(&[&format!("@{reg}"), "D=M"])?;
            self.push_d()?;
        }
        // ARG = SP - num_args - 5
        self.emit(&["@SP", "D=M", &format!("@{offset}"), "D=D-A", "@ARG", "M=D"])?;
        // LCL = SP
        self.emit(&["@SP", "D=M", "@LCL", "M=D"])?;
        self.emit(&[&format!("@{name}"), "0;JMP", &format!("({ret})")])
    }

    pub fn write_return(&mut self) -> Result<(), EmitError> {
        // frame = LCL; ret = *(frame - 5)
        self.emit(&["@LCL", "D=M", &format!("@{FRAME_REG}"), "M=D"])?;
        self.emit(&[&format!("@{FRAME_WORDS}"), "A=D-A", "D=M", &format!("@{RET_REG}"), "M=D"])?;
        // *ARG = pop(); SP = ARG + 1
        self.pop_d()?;
        self.emit(&["@ARG", "A=M", "M=D", "@ARG", "D=M+1", "@SP", "M=D"])?;
        // LCL last: it is the caller's value only after the restore
        for (reg, back) in [("THAT", 1), ("THIS", 2), ("ARG", 3), ("LCL", 4)] {
            self.emit(&[
                &format!("@{FRAME_REG}"),
                "D=M",
                &format!("@{back}"),
                "A=D-A",
                "D=M",
                &format!("@{reg}"),
                "M=D",
            ])?;
        }
        self.emit(&[&format!("@{RET_REG}"), "A=M", "0;JMP"])
    }

    fn binary(&mut self, op: &str) -> Result<(), EmitError> {
        self.emit(&["@SP", "AM=M-1", "D=M", "A=A-1", op])
    }

    fn unary(&mut self, op: &str) -> Result<(), EmitError> {
        self.emit(&["@SP", "A=M-1", op])
    }

    fn compare(&mut self, tag: &str, jump: &str) -> Result<(), EmitError> {
        let n = self.next_id();
        let yes = format!("{RESERVED}{tag}_TRUE_{n}");
        let done = format!("{RESERVED}{tag}_END_{n}");
        self.emit(&[
            "@SP",
            "AM=M-1",
            "D=M",
            "A=A-1",
            "D=M-D",
            &format!("@{yes}"),
            &format!("D;{jump}"),
            "@SP",
            "A=M-1",
            "M=0",
            &format!("@{done}"),
            "0;JMP",
            &format!("({yes})"),
            "@SP",
            "A=M-1",
            "M=-1",
            &format!("({done})"),
        ])
    }

    fn push_d(&mut self) -> Result<(), EmitError> {
        self.emit(&["@SP", "A=M", "M=D", "@SP", "M=M+1"])
    }

    fn pop_d(&mut self) -> Result<(), EmitError> {
        self.emit(&["@SP", "AM=M-1", "D=M"])
    }

    /// Symbol or address of a segment that does not move at run time.
    fn fixed_cell(&self, segment: Segment, index: u16) -> Result<String, EmitError> {
        match segment {
            Segment::Static => {
                check_max(segment, index, STATIC_SIZE - 1)?;
                let cell = format!("{}.{index}", self.unit);
                symbol(&cell)?;
                Ok(cell)
            }
            Segment::Temp => {
                check_max(segment, index, TEMP_SIZE - 1)?;
                Ok((TEMP_BASE + index).to_string())
            }
            Segment::Pointer => {
                check_max(segment, index, 1)?;
                Ok(if index == 0 { "THIS" } else { "THAT" }.to_string())
            }
            _ => Err(EmitError::operand(format!("{} {index}", segment.name()), "not a fixed segment")),
        }
    }

    fn scoped(&self, name: &str) -> Result<String, EmitError> {
        user_name(name)?;
        let label = match &self.function {
            Some(f) => format!("{f}{RESERVED}{name}"),
            None => format!("{RESERVED}{}{RESERVED}{name}", self.unit),
        };
        symbol(&label)?;
        Ok(label)
    }

    fn next_id(&mut self) -> usize {
        let n = self.counter;
        self.counter += 1;
        n
    }

    fn fresh(&mut self, prefix: &str) -> String {
        let n = self.next_id();
        format!("{RESERVED}{prefix}_{n}")
    }

    fn emit(&mut self, lines: &[&str]) -> Result<(), EmitError> {
        for l in lines {
            writeln!(self.out, "{l}")?;
        }
        Ok(())
    }
}

fn base_register(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        _ => "THAT",
    }
}

fn check_max(segment: Segment, index: u16, max: u16) -> Result<(), EmitError> {
    if index > max {
        return Err(EmitError::operand(format!("{} {index}", segment.name()), "index out of range"));
    }
    Ok(())
}

/// Function or label name as written in VM source.
fn user_name(s: &str) -> Result<(), EmitError> {
    symbol(s)?;
    if s.contains(RESERVED) {
        return Err(EmitError::operand(s, "`$` is reserved for generated labels"));
    }
    Ok(())
}

fn symbol(s: &str) -> Result<(), EmitError> {
    if is_symbol(s) {
        Ok(())
    } else {
        Err(EmitError::operand(s, "not a valid assembler symbol"))
    }
}
