use color_print::cformat;

use hackemu::machine::Machine;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input binary (.hack text format)
    input: String,

    /// Cycles to execute
    #[clap(short, long, default_value_t = 1_000_000)]
    tmax: u64,

    /// RAM cells to print after the run
    #[clap(short, long, default_value_t = 16)]
    dump: u16,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("Hack Emulator");

    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input);
    println!("+-----------------------------------------------+");

    let mut machine = Machine::new();
    if let Err(err) = machine.load_rom_file(&args.input) {
        eprintln!(
            "{}",
            cformat!("<red,bold>error</>: Failed to load ROM: {}", err)
        );
        std::process::exit(1);
    }

    machine.run(args.tmax);

    println!(
        "A={} D={} PC={}",
        machine.a, machine.d, machine.pc
    );
    for addr in 0..args.dump {
        println!("  RAM[{:>5}] = {}", addr, machine.ram[addr as usize]);
    }
}
