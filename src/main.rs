use std::{env, fs, path::Path};

use log::info;

use pcodegen::bytecode::disasm::{print_pcode, print_pcode_stats};
use pcodegen::lang::Program;
use pcodegen::{Options, Pcode, generate};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let show_pcode = args.contains(&"--pcode".to_string());
    let stats = args.contains(&"--stats".to_string());
    let options_file = flag_value(&args, "--options");
    let out_file = flag_value(&args, "--out");

    if args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        print_usage();
        return;
    }

    // first non-flag argument that is not a flag's value is the tree
    let filename = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(i, a)| {
            !a.starts_with('-') && !matches!(args[i - 1].as_str(), "--options" | "--out")
        })
        .map(|(_, a)| a);

    let Some(filename) = filename else {
        print_usage();
        std::process::exit(1);
    };

    ensure_extension(filename);

    let options = match options_file {
        Some(path) => {
            let source = read_or_exit(path);
            match Options::from_json(&source) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("Invalid options in '{}': {}", path, e);
                    std::process::exit(1);
                }
            }
        }
        None => Options::default(),
    };

    let source = read_or_exit(filename);
    let program: Program = match serde_json::from_str(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Invalid routine tree in '{}': {}", filename, e);
            std::process::exit(1);
        }
    };

    let pcode = match generate(&program, &options) {
        Ok(pcode) => pcode,
        Err(e) => {
            eprintln!("Generation error: {}", e);
            std::process::exit(1);
        }
    };
    info!("generated {} lines for '{}'", pcode.len(), program.name);

    if show_pcode {
        report(print_pcode(&pcode));
    }
    if stats {
        report(print_pcode_stats(&pcode));
    }

    match out_file {
        Some(path) => write_pcode(&pcode, path),
        None if !show_pcode && !stats => println!("{}", render_lines(&pcode)),
        None => {}
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
}

fn ensure_extension(filename: &str) {
    let path = Path::new(filename);
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        eprintln!("Error: expected a .json routine tree, got {}", filename);
        std::process::exit(1);
    }
}

fn read_or_exit(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", path, e);
            std::process::exit(1);
        }
    }
}

fn report(result: pcodegen::GeneratorResult<()>) {
    if let Err(e) = result {
        eprintln!("Disassembly error: {}", e);
        std::process::exit(1);
    }
}

fn write_pcode(pcode: &Pcode, path: &str) {
    let bytes = match pcode.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = fs::write(path, bytes) {
        eprintln!("Failed to write '{}': {}", path, e);
        std::process::exit(1);
    }
    info!("wrote {}", path);
}

/// One program line per text line, integers separated by spaces.
fn render_lines(pcode: &Pcode) -> String {
    pcode
        .lines
        .iter()
        .map(|line| {
            line.iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_usage() {
    println!("PCODEGEN - PCode generator for the Turtle System");
    println!();
    println!("Usage:");
    println!("  pcodegen <tree.json>                  Print linked PCode as integers");
    println!("  pcodegen <tree.json> --pcode          Show disassembly");
    println!("  pcodegen <tree.json> --stats          Show opcode statistics");
    println!("  pcodegen <tree.json> --out <file>     Write encoded PCode to a file");
    println!("  pcodegen <tree.json> --options <file> Read generator options (JSON)");
    println!("  pcodegen --help, -h                   Show this help");
    println!();
    println!("Set RUST_LOG=debug to trace assembly and linking.");
}
