use std::path::PathBuf;
use std::process;

use clap::Parser;

use fob::invert::{CpuCaps, initial_stride, obfuscate_file};

#[derive(Parser)]
#[command(
    name = "fob",
    about = "Obfuscate FILE by complementing every bit, reversibly.",
    after_help = "With no -o, FILE is rewritten in place. Running fob twice on the\n\
        same file restores the original contents exactly.\n\n\
        This is plain bit-complement obfuscation, not encryption: there is\n\
        no key, no diffusion and no confidentiality guarantee.",
    version
)]
struct Cli {
    /// Write the transformed bytes to OUT instead of rewriting FILE in place
    #[arg(short = 'o', long = "output", value_name = "OUT")]
    output: Option<PathBuf>,

    /// Report detected CPU capabilities and the chosen stride on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// File to obfuscate
    file: PathBuf,
}

fn report_caps(caps: CpuCaps) {
    if caps.has_vec32() {
        eprintln!("fob: 32-byte vector blocks supported, using as optimization");
    }
    if caps.has_vec16() {
        eprintln!("fob: 16-byte vector blocks supported, using as optimization");
    }
    eprintln!("fob: initial stride: {} bytes", initial_stride(caps));
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // Probed once per process; the engine only ever consumes the result.
    let caps = CpuCaps::detect();

    if cli.verbose {
        report_caps(caps);
    }

    let bytes = obfuscate_file(&cli.file, cli.output.as_deref(), caps)?;

    if cli.verbose {
        eprintln!("fob: transformed {} bytes", bytes);
    }

    Ok(())
}

fn main() {
    fob::common::reset_sigpipe();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("fob: {e}");
        process::exit(1);
    }
}
