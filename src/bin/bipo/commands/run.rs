use std::path::Path;
use std::time::Instant;

use bipo_rs::{run_batch, CutThresholds, FileReport};

use crate::cli::RunArgs;
use crate::exit_codes;
use crate::output;

pub fn execute(args: RunArgs) -> i32 {
    let files = match resolve_files(&args) {
        Ok(f) => f,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    if files.is_empty() {
        eprintln!("Error: No matching input files found");
        return exit_codes::INPUT_ERROR;
    }

    if args.dry_run {
        for f in &files {
            println!("{}", f);
        }
        if !args.quiet {
            eprintln!("Found {} file(s)", files.len());
        }
        return exit_codes::SUCCESS;
    }

    let cuts = match load_cuts(&args) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    if let Some(ref dir) = args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Error: Failed to create output directory '{}': {}", dir, e);
            return exit_codes::EXECUTION_ERROR;
        }
    }

    if !args.quiet {
        eprintln!("Tagging {} file(s)...", files.len());
        if cuts.is_simulated {
            eprintln!("  Simulated data: data-cleaning cut disabled");
        }
    }

    let start_time = Instant::now();
    let (reports, summary) = match run_batch(&files, &cuts, args.parallel) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let mut write_failures = 0usize;
    for report in &reports {
        if !args.quiet {
            if let Some(ref err) = report.error {
                eprintln!("  {}: {}", report.file_path, err);
            } else {
                eprintln!(
                    "  {}: {} events examined, {} Bi candidates, {} coincidences",
                    report.file_path,
                    report.counters.events_examined,
                    report.counters.bi_candidates,
                    report.counters.coincidences
                );
            }
        }
        if let Err(msg) = emit_report(report, &args) {
            eprintln!("  Error: {}", msg);
            write_failures += 1;
        }
    }

    if !args.quiet {
        eprintln!(
            "Batch complete: {} file(s) tagged, {} failed, {} coincidence(s), {:.1}s",
            summary.files_processed,
            summary.files_failed,
            summary.totals.coincidences,
            start_time.elapsed().as_secs_f64()
        );
    }

    if summary.files_failed == 0 && write_failures == 0 {
        exit_codes::SUCCESS
    } else if summary.files_processed > 0 {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::EXECUTION_ERROR
    }
}

fn emit_report(report: &FileReport, args: &RunArgs) -> Result<(), String> {
    match args.output_dir {
        Some(ref dir) => {
            let stem = Path::new(&report.file_path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            let json = output::to_json(report, args.compact)?;
            let report_path = Path::new(dir).join(format!("{}_bipo214.json", stem));
            output::write_output(&json, report_path.to_str())?;

            if args.gtid_lists && report.error.is_none() {
                let ids: Vec<String> = report
                    .gtid_list()
                    .iter()
                    .map(|id| id.to_string())
                    .collect();
                let list_path = Path::new(dir).join(format!("{}_gtids.txt", stem));
                output::write_output(&ids.join("\n"), list_path.to_str())?;
            }
            Ok(())
        }
        None => {
            // JSONL to stdout, one report per line.
            let json = output::to_json(report, true)?;
            output::write_output(&json, None)
        }
    }
}

fn resolve_files(args: &RunArgs) -> Result<Vec<String>, String> {
    if let Some(ref pattern) = args.glob {
        resolve_glob(pattern)
    } else if let Some(ref files) = args.files {
        Ok(files.clone())
    } else {
        Err("One of --files or --glob must be specified".to_string())
    }
}

fn resolve_glob(pattern: &str) -> Result<Vec<String>, String> {
    let paths =
        glob::glob(pattern).map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

    let mut files: Vec<String> = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    if let Some(s) = path.to_str() {
                        files.push(s.to_string());
                    }
                }
            }
            Err(e) => {
                eprintln!("Warning: glob error: {}", e);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn load_cuts(args: &RunArgs) -> Result<CutThresholds, String> {
    let mut cuts = match args.cuts {
        Some(ref path) => CutThresholds::from_json_file(path).map_err(|e| e.to_string())?,
        None => CutThresholds::default(),
    };
    if args.simulated {
        cuts.is_simulated = true;
    }
    cuts.validate().map_err(|e| e.to_string())?;
    Ok(cuts)
}
