use arch::field::{Comp, Dest, Jump};
use arch::inst::{Inst, Operand};
use arch::symbol::ADDR_MAX;

use crate::error::{Diag, Error};

// ----------------------------------------------------------------------------
// Line

/// One raw source line plus its classification. Blank and comment-only
/// lines keep `inst` empty so the listing can still show them.
#[derive(Debug, Clone)]
pub struct Line {
    pub path: String,
    /// 1-based line number.
    pub no: usize,
    pub raw: String,
    pub inst: Option<Inst>,
}

impl Line {
    pub fn parse(path: &str, idx: usize, raw: &str) -> Result<Line, Diag> {
        let mut line = Line {
            path: path.to_string(),
            no: idx + 1,
            raw: raw.to_string(),
            inst: None,
        };
        match classify(raw) {
            Ok(inst) => {
                line.inst = inst;
                Ok(line)
            }
            Err(err) => Err(err.at(&line)),
        }
    }
}

// ----------------------------------------------------------------------------
// Classification

fn classify(raw: &str) -> Result<Option<Inst>, Error> {
    let code = strip(raw);
    if code.is_empty() {
        return Ok(None);
    }

    // (LABEL)
    if let Some(body) = code.strip_prefix('(') {
        let name = body
            .strip_suffix(')')
            .ok_or_else(|| Error::Syntax(code.clone()))?;
        if !is_ident(name) {
            return Err(Error::BadSymbol(name.to_string()));
        }
        return Ok(Some(Inst::Label(name.to_string())));
    }

    // @SYMBOL-OR-LITERAL
    if let Some(operand) = code.strip_prefix('@') {
        if operand.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            let value: u16 = operand
                .parse()
                .ok()
                .filter(|v| *v <= ADDR_MAX)
                .ok_or_else(|| Error::AddressRange(operand.to_string()))?;
            return Ok(Some(Inst::Addr(Operand::Literal(value))));
        }
        if !is_ident(operand) {
            return Err(Error::BadSymbol(operand.to_string()));
        }
        return Ok(Some(Inst::Addr(Operand::Symbol(operand.to_string()))));
    }

    // [DEST=]COMP[;JUMP]
    let (dest, rest) = match code.split_once('=') {
        Some((dest, rest)) => (Some(dest), rest),
        None => (None, code.as_str()),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, Some(jump)),
        None => (rest, None),
    };
    let dest = dest
        .map(|d| d.parse::<Dest>().map_err(|_| Error::UnknownDest(d.to_string())))
        .transpose()?;
    let comp = comp
        .parse::<Comp>()
        .map_err(|_| Error::UnknownComp(comp.to_string()))?;
    let jump = jump
        .map(|j| j.parse::<Jump>().map_err(|_| Error::UnknownJump(j.to_string())))
        .transpose()?;
    Ok(Some(Inst::Comp { dest, comp, jump }))
}

/// Drop the `//` comment and every whitespace character. `D = M ; JEQ`
/// and `D=M;JEQ` are the same instruction.
fn strip(raw: &str) -> String {
    let code = raw.split_once("//").map_or(raw, |(code, _)| code);
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Symbols must not start with a digit and are composed of alphanumerics
/// plus `_ . $ :`.
pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(head) if ident_char(head) && !head.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(ident_char)
}

fn ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':')
}
