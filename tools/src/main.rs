//! ladder-runner: headless driver for the ladder engine.
//!
//! Usage:
//!   ladder-runner --db irus.db --process 20240301-bw ladder.txt
//!   ladder-runner --db irus.db --process-roster 20240301-bw roster.txt
//!   ladder-runner --db irus.db --report 20240301-bw [--csv]
//!   ladder-runner --db irus.db --delete-invasion 20240301-bw
//!   ladder-runner --db irus.db --month 3 2024 [--csv]
//!   ladder-runner --db irus.db --ipc-mode

use anyhow::{Context, Result};
use ladder_core::{
    config::EngineConfig,
    engine::LadderEngine,
    request::{LadderKind, Request},
    store::LadderStore,
};
use std::env;
use std::io::{self, BufRead, Write};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let csv = args.iter().any(|a| a == "--csv");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    let config = match EngineConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default engine config: {e}");
            EngineConfig::default()
        }
    };

    let store = LadderStore::open(db).with_context(|| format!("opening {db}"))?;
    store.migrate()?;
    let engine = LadderEngine::new(store, config);

    if ipc_mode {
        return run_ipc_loop(&engine);
    }

    if let Some([invasion, file]) = flag_values::<2>(&args, "--process") {
        process_file(&engine, invasion, file, LadderKind::Ladder)?;
    } else if let Some([invasion, file]) = flag_values::<2>(&args, "--process-roster") {
        process_file(&engine, invasion, file, LadderKind::Roster)?;
    } else if let Some([invasion]) = flag_values::<1>(&args, "--report") {
        let report = engine.invasion_report(invasion)?;
        if csv {
            print!("{}", report.csv);
        } else {
            print!("{report}");
        }
    } else if let Some([invasion]) = flag_values::<1>(&args, "--delete-invasion") {
        if !engine.delete_invasion(invasion)? {
            anyhow::bail!("no invasion {invasion}");
        }
        println!("deleted {invasion}");
    } else if let Some([month, year]) = flag_values::<2>(&args, "--month") {
        let month: u32 = month.parse().context("month must be a number")?;
        let year: i32 = year.parse().context("year must be a number")?;
        let report = engine.month_report(month, year)?;
        if csv {
            print!("{}", report.csv());
        } else {
            print!("{report}");
        }
    } else {
        let roster = engine.roster()?;
        println!("ladder-runner");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  roster:    {roster}");
        println!();
        println!(
            "Nothing to do: pass --process, --process-roster, --report, --month, \
             --delete-invasion or --ipc-mode."
        );
    }

    Ok(())
}

/// One JSON request per stdin line, one JSON response per stdout line.
fn run_ipc_loop(engine: &LadderEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match engine.dispatch(request) {
            Ok(response) => writeln!(stdout, "{}", serde_json::to_string(&response)?)?,
            Err(e) => {
                log::warn!("Request failed: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn process_file(engine: &LadderEngine, invasion: &str, file: &str, kind: LadderKind) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
    let report = engine.process_ladder(invasion, &text, kind)?;
    print!("{report}");
    if report.needs_attention() {
        eprintln!("{} warning(s): check the report above", report.warnings.len());
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    flag_values::<1>(args, flag).map(|[v]| v)
}

/// The `N` arguments following `flag`.
fn flag_values<'a, const N: usize>(args: &'a [String], flag: &str) -> Option<[&'a str; N]> {
    let pos = args.iter().position(|a| a == flag)?;
    let values = args.get(pos + 1..pos + 1 + N)?;
    let mut out = [""; N];
    for (slot, v) in out.iter_mut().zip(values) {
        *slot = v.as_str();
    }
    Some(out)
}
