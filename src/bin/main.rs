use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_forest::ForestLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tiny::config::{Config, DEFAULT_MEMORY_CAPACITY};
use tiny::console::{Console, Stdio};
use tiny::vm::Vm;

/// Run a Tiny Machine program until it halts or faults
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
  /// Program source file
  program: PathBuf,

  /// Size of data and instruction memory, in words
  #[arg(long, env = "TM_MEM_SIZE", default_value_t = DEFAULT_MEMORY_CAPACITY)]
  mem_size: usize,

  /// Report each instruction as it executes
  #[arg(long)]
  trace: bool,
}

/// `RUST_LOG` overrides the default `warn` level.
fn init_logger() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::registry()
    .with(filter)
    .with(ForestLayer::default())
    .init();
}

fn main() -> anyhow::Result<()> {
  init_logger();
  let args = Args::parse();

  let config = Config::new(args.mem_size)?;
  let source = fs::read_to_string(&args.program)
    .with_context(|| format!("reading program from {}", args.program.display()))?;

  let mut vm = Vm::with_config(config);
  let mut console = Stdio::terminal();
  console.report_line(&format!("Reading program from {}", args.program.display()));
  vm.load_program(&source)
    .with_context(|| format!("loading program from {}", args.program.display()))?;
  vm.set_trace(args.trace);

  vm.run(&mut console);

  let registers = vm
    .registers()
    .iter()
    .enumerate()
    .map(|(i, value)| format!("{i}: {value:011}"))
    .collect::<Vec<_>>()
    .join("  ");
  console.report_line(&registers);
  Ok(())
}
