use std::env;
use std::fs;
use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: keyroll <session.yaml> [output.yaml]");
        process::exit(1);
    }

    let input_path = &args[1];
    let output_path = args.get(2);

    // Read input file
    let source = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    let report = match keyroll::replay(&source) {
        Ok(yaml) => yaml,
        Err(e) => {
            eprintln!("Replay error: {}", e);
            process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &report) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote session report to {}", path);
        }
        None => {
            print!("{}", report);
        }
    }
}
