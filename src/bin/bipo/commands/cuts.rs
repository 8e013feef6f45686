use bipo_rs::CutThresholds;

use crate::cli::CutsArgs;
use crate::exit_codes;
use crate::output;

pub fn execute(args: CutsArgs) -> i32 {
    let cuts = match args.cuts {
        Some(ref path) => match CutThresholds::from_json_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::INPUT_ERROR;
            }
        },
        None => CutThresholds::default(),
    };

    match output::to_json(&cuts, args.compact) {
        Ok(json) => {
            if let Err(e) = output::write_output(&json, None) {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}
