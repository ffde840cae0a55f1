use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use hackvm::codegen::CodeWriter;
use hackvm::error::{Diag, Error};
use hackvm::parser::Line;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input .vm file, or a directory of .vm files
    input: String,

    /// Output file (defaults to the input stem with a .asm extension)
    #[clap(short, long)]
    output: Option<String>,

    /// Emit the bootstrap sequence (always on in directory mode)
    #[clap(short, long)]
    bootstrap: bool,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("Hack VM Translator");

    let code = match run(&args) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(diag) => {
            diag.report();
            1
        }
    };
    std::process::exit(code);
}

/// Ok(false) means some input file failed but the output holds every
/// successfully translated file's contribution.
fn run(args: &Args) -> Result<bool, Diag> {
    let input = Path::new(&args.input);
    let (sources, default_output, bootstrap) = if input.is_dir() {
        (collect_sources(input)?, dir_output(input), true)
    } else {
        let stem = args
            .input
            .strip_suffix(".vm")
            .ok_or_else(|| Error::Extension(args.input.clone()))?;
        (
            vec![input.to_path_buf()],
            format!("{}.asm", stem),
            args.bootstrap,
        )
    };
    let output = args.output.clone().unwrap_or(default_output);

    println!("1. Translate Files");
    let mut writer = CodeWriter::new();
    let mut text = String::new();
    if bootstrap {
        for line in writer.bootstrap() {
            text.push_str(&line);
            text.push('\n');
        }
    }

    let mut clean = true;
    for source in &sources {
        println!("  < {}", source.display());
        match translate_file(source, &mut writer) {
            Ok(chunk) => text.push_str(&chunk),
            Err(diag) => {
                diag.report();
                clean = false;
            }
        }
    }

    println!("2. Write Assembly");
    println!("  > {}", output);
    let mut file = File::create(&output).map_err(|err| Error::FileCreate(output.clone(), err))?;
    file.write_all(text.as_bytes())
        .map_err(|err| Error::FileWrite(output.clone(), err))?;
    Ok(clean)
}

/// Translate one source file into its own buffer. On any error the whole
/// buffer is discarded, so a failing file never leaves a truncated
/// contribution in the shared output.
fn translate_file(path: &Path, writer: &mut CodeWriter) -> Result<String, Diag> {
    let display = path.display().to_string();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let prefix = name
        .strip_suffix(".vm")
        .ok_or_else(|| Error::Extension(display.clone()))?;
    writer.begin_file(prefix);

    let file = File::open(path).map_err(|err| Error::FileOpen(display.clone(), err))?;
    let mut text = format!("// {}:\n", name);
    for (idx, raw) in BufReader::new(file).lines().enumerate() {
        let raw = raw.map_err(Error::FileRead)?;
        let line = Line::parse(&display, idx, &raw)?;
        if let Some(command) = &line.command {
            for asm in writer.translate(command).map_err(|err| err.at(&line))? {
                text.push_str(&asm);
                text.push('\n');
            }
        }
    }
    Ok(text)
}

/// Every .vm file in the directory, in name order.
fn collect_sources(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let display = dir.display().to_string();
    let entries =
        std::fs::read_dir(dir).map_err(|err| Error::DirRead(display.clone(), err))?;
    let mut sources = vec![];
    for entry in entries {
        let path = entry
            .map_err(|err| Error::DirRead(display.clone(), err))?
            .path();
        if path.extension().is_some_and(|ext| ext == "vm") {
            sources.push(path);
        }
    }
    sources.sort();
    if sources.is_empty() {
        return Err(Error::NoInput(display));
    }
    Ok(sources)
}

/// `Prog/` translates to `Prog/Prog.asm`.
fn dir_output(dir: &Path) -> String {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "out".to_string());
    dir.join(format!("{}.asm", name)).display().to_string()
}
