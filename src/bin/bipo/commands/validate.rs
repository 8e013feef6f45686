use serde::Serialize;

use bipo_rs::{extract_features, EventSource, JsonlEventSource};

use crate::cli::ValidateArgs;
use crate::exit_codes;
use crate::output;

#[derive(Serialize)]
struct ValidationReport {
    file_path: String,
    total_events: u64,
    valid_fit_events: u64,
    unparseable_lines: u64,
}

pub fn execute(args: ValidateArgs) -> i32 {
    let mut source = match JsonlEventSource::open(&args.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let mut total_events = 0u64;
    let mut valid_fit_events = 0u64;
    while let Some(event) = source.next_event() {
        total_events += 1;
        // Validity only depends on the fit flags, not on the data mode.
        if extract_features(&event, true).is_ok() {
            valid_fit_events += 1;
        }
    }

    let report = ValidationReport {
        file_path: args.file.clone(),
        total_events,
        valid_fit_events,
        unparseable_lines: source.parse_errors(),
    };

    if args.json {
        match output::to_json(&report, false) {
            Ok(json) => {
                if let Err(e) = output::write_output(&json, None) {
                    eprintln!("Error: {}", e);
                    return exit_codes::EXECUTION_ERROR;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    } else {
        println!("File: {}", report.file_path);
        println!("  Events:            {}", report.total_events);
        println!("  With valid fit:    {}", report.valid_fit_events);
        println!("  Unparseable lines: {}", report.unparseable_lines);
    }

    exit_codes::SUCCESS
}
