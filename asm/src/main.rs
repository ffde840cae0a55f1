use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use color_print::cformat;

use hackasm::error::{Diag, Error};
use hackasm::parser::Line;
use hackasm::resolve;

use arch::inst::{Inst, Operand, Word};
use arch::symbol::SymbolTable;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file (.asm)
    input: String,

    /// Output file (defaults to the input with a .hack extension)
    #[clap(short, long)]
    output: Option<String>,

    /// Dump the listing with resolved binary
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("Hack Assembler");

    if let Err(diag) = run(&args) {
        diag.report();
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Diag> {
    let stem = args
        .input
        .strip_suffix(".asm")
        .ok_or_else(|| Error::Extension(args.input.clone()))?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| format!("{}.hack", stem));

    println!("1. Read File and Parse Lines");
    println!("  < {}", args.input);
    let file = File::open(&args.input)
        .map_err(|err| Error::FileOpen(args.input.clone(), err))?;
    let mut lines = vec![];
    for (idx, raw) in BufReader::new(file).lines().enumerate() {
        let raw = raw.map_err(Error::FileRead)?;
        lines.push(Line::parse(&args.input, idx, &raw)?);
    }

    println!("2. Resolve Symbols and Generate Binary");
    let mut table = SymbolTable::new();
    resolve::first_pass(&lines, &mut table)?;
    let words = resolve::second_pass(&lines, &mut table);

    println!("  > {}", output);
    let mut file =
        File::create(&output).map_err(|err| Error::FileCreate(output.clone(), err))?;
    for word in &words {
        writeln!(file, "{}", word).map_err(|err| Error::FileWrite(output.clone(), err))?;
    }

    if args.dump {
        dump(&lines, &mut table);
    }
    Ok(())
}

fn dump(lines: &[Line], table: &mut SymbolTable) {
    println!("------+------+------------------+---------------------------");
    let mut pc: u16 = 0;
    for line in lines {
        let (addr, word) = match &line.inst {
            Some(Inst::Label(_)) | None => ("    ".to_string(), " ".repeat(16)),
            Some(inst) => {
                let word = match inst {
                    Inst::Addr(Operand::Literal(value)) => Word::a(*value),
                    Inst::Addr(Operand::Symbol(name)) => Word::a(table.resolve(name)),
                    Inst::Comp { dest, comp, jump } => Word::c(*dest, *comp, *jump),
                    Inst::Label(_) => unreachable!(),
                };
                pc += 1;
                (cformat!("<green>{:0>4X}</>", pc - 1), word.to_string())
            }
        };
        let inst = line.inst.as_ref().map(Inst::cformat).unwrap_or_default();
        println!("| {:>4} | {} | {} | {}", line.no, addr, word, inst);
    }
    println!("------+------+------------------+---------------------------");
}
