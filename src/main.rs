use rhk_sm4::Sm4File;
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <path-to-sm4-file>", args[0]);
        std::process::exit(1);
    }

    match Sm4File::open(&args[1]) {
        Ok(sm4) => print!("{}", sm4),
        Err(e) => {
            eprintln!("ERROR: Failed to read SM4 file {}", args[1]);
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
