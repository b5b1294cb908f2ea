//! Serve a headless Amiga's debugger views over JSON-RPC on stdin/stdout.

use std::path::PathBuf;
use std::process;

use amiga_debugger::mcp::McpServer;
use amiga_debugger::{Debugger, DebuggerConfig, EngineHandle};
use machine_amiga::{Amiga, AmigaModel, MachineConfig};

struct CliArgs {
    rom_path: Option<PathBuf>,
    model: AmigaModel,
    slow_kb: Option<usize>,
    fast_kb: Option<usize>,
    rows: usize,
    pc: Option<u32>,
}

fn print_usage_and_exit(code: i32) -> ! {
    eprintln!("Usage: amiga-debugger [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --rom <file>     Kickstart ROM file (or use AMIGA_KS13_ROM env var)");
    eprintln!("  --model <name>   a1000, a500, a500plus or a2000 [default: a500]");
    eprintln!("  --slow <KB>      Slow (Ranger) RAM size");
    eprintln!("  --fast <KB>      Zorro II fast RAM size");
    eprintln!("  --rows <n>       Disassembly window rows [default: 256]");
    eprintln!("  --pc <hex>       Initial program counter [default: reset vector]");
    eprintln!("  -h, --help       Show this help");
    process::exit(code);
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: std::env::var_os("AMIGA_KS13_ROM").map(PathBuf::from),
        model: AmigaModel::A500,
        slow_kb: None,
        fast_kb: None,
        rows: DebuggerConfig::default().window_rows,
        pc: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--model" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Missing value for --model");
                    print_usage_and_exit(1);
                };
                cli.model = AmigaModel::from_name(value).unwrap_or_else(|| {
                    eprintln!("Unknown model: {value}");
                    print_usage_and_exit(1);
                });
            }
            "--slow" => {
                i += 1;
                cli.slow_kb = args.get(i).and_then(|v| v.parse().ok());
            }
            "--fast" => {
                i += 1;
                cli.fast_kb = args.get(i).and_then(|v| v.parse().ok());
            }
            "--rows" => {
                i += 1;
                if let Some(value) = args.get(i) {
                    cli.rows = value.parse().unwrap_or(cli.rows);
                }
            }
            "--pc" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Missing value for --pc");
                    print_usage_and_exit(1);
                };
                let digits = value.trim_start_matches('$').trim_start_matches("0x");
                cli.pc = Some(u32::from_str_radix(digits, 16).unwrap_or_else(|_| {
                    eprintln!("Invalid --pc value: {value}");
                    print_usage_and_exit(1);
                }));
            }
            "-h" | "--help" => print_usage_and_exit(0),
            other => {
                eprintln!("Unknown option: {other}");
                print_usage_and_exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn make_amiga(cli: &CliArgs) -> Amiga {
    let Some(rom_path) = &cli.rom_path else {
        eprintln!("No Kickstart ROM given");
        print_usage_and_exit(1);
    };
    let kickstart = match std::fs::read(rom_path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read Kickstart ROM {}: {e}", rom_path.display());
            process::exit(1);
        }
    };

    let mut config = MachineConfig::preset(cli.model, kickstart);
    if let Some(kb) = cli.slow_kb {
        config.slow_ram_size = kb * 1024;
    }
    if let Some(kb) = cli.fast_kb {
        config.fast_ram_size = kb * 1024;
    }

    let mut amiga = match Amiga::new(&config) {
        Ok(amiga) => amiga,
        Err(e) => {
            eprintln!("Invalid machine configuration: {e}");
            process::exit(1);
        }
    };
    amiga.reset();
    if let Some(pc) = cli.pc {
        amiga.set_pc(pc);
    }
    amiga
}

fn main() {
    let cli = parse_args();
    let amiga = make_amiga(&cli);
    let config = DebuggerConfig::default().with_window_rows(cli.rows);
    let mut debugger = Debugger::new(EngineHandle::new(amiga), config);
    if let Err(e) = debugger.apply(amiga_debugger::Command::Refresh) {
        eprintln!("Initial refresh failed: {e}");
    }
    McpServer::new(debugger).run();
}
