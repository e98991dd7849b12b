//! alerts-desk: command-line front end for the alert desk.
//!
//! Usage:
//!   alerts-desk --db alerts.db seed
//!   alerts-desk --db alerts.db seed-synthetic --seed 7 --employees 200 --alerts 1000
//!   alerts-desk --db alerts.db list --manager MGR001 --scope subtree --severity high,medium
//!   alerts-desk --db alerts.db dismiss --alert ALT001
//!   alerts-desk --db alerts.db tree --manager MGR001
//!   alerts-desk --db alerts.db --ipc-mode

use anyhow::Result;
use orgalerts_core::{
    config::ServiceConfig,
    error::AlertError,
    hierarchy::OrgChart,
    seed::{seed_demo, seed_synthetic, SyntheticOrg},
    service::AlertService,
    store::AlertStore,
};
use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};

const COMMANDS: &[&str] = &["init", "seed", "seed-synthetic", "list", "dismiss", "tree"];

/// Flags forwarded verbatim to the listing request, as (flag, param).
const LIST_FLAGS: &[(&str, &str)] = &[
    ("--manager", "manager_id"),
    ("--scope", "scope"),
    ("--severity", "severity"),
    ("--status", "status"),
    ("--q", "q"),
    ("--page", "page"),
    ("--page-size", "page_size"),
    ("--offset", "offset"),
    ("--limit", "limit"),
];

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    List {
        #[serde(default)]
        params: HashMap<String, String>,
    },
    Dismiss {
        alert_id: String,
    },
    Tree {
        manager_id: String,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = flag_value(&args, "--db").unwrap_or("alerts.db");
    let config = match flag_value(&args, "--config") {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    let store = AlertStore::open(db)?;
    store.migrate()?;
    let service = AlertService::new(store, config)?;

    if ipc_mode {
        return run_ipc_loop(&service);
    }

    let Some(command) = args.iter().skip(1).find(|a| COMMANDS.contains(&a.as_str())) else {
        eprintln!("usage: alerts-desk [--db PATH] [--config PATH] <{}>", COMMANDS.join("|"));
        std::process::exit(2);
    };

    let outcome = match command.as_str() {
        "init" => {
            println!("schema ready in {db}");
            Ok(())
        }
        "seed" => seed_demo(service.store(), chrono::Utc::now()).and_then(print_json),
        "seed-synthetic" => {
            let defaults = SyntheticOrg::default();
            let org = SyntheticOrg {
                seed:      parse_arg(&args, "--seed", defaults.seed),
                employees: parse_arg(&args, "--employees", defaults.employees),
                alerts:    parse_arg(&args, "--alerts", defaults.alerts),
                span_days: parse_arg(&args, "--span-days", defaults.span_days),
            };
            seed_synthetic(service.store(), &org, chrono::Utc::now()).and_then(print_json)
        }
        "list" => service.list_params(&list_params(&args)).and_then(print_json),
        "dismiss" => required_flag(&args, "--alert")
            .and_then(|alert_id| service.dismiss(alert_id))
            .and_then(print_json),
        "tree" => required_flag(&args, "--manager")
            .and_then(|manager| render_tree(&service, manager))
            .map(|tree| print!("{tree}")),
        _ => unreachable!("command list and dispatch disagree"),
    };

    if let Err(e) = outcome {
        eprintln!("{}", error_json(&e));
        std::process::exit(match e.kind() {
            "validation" => 2,
            "not_found" => 3,
            _ => 1,
        });
    }
    Ok(())
}

fn run_ipc_loop(service: &AlertService) -> Result<()> {
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

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": "validation", "detail": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::List { params } => service
                .list_params(&params)
                .and_then(|page| Ok(serde_json::to_value(page)?)),
            IpcCommand::Dismiss { alert_id } => service
                .dismiss(&alert_id)
                .and_then(|alert| Ok(serde_json::to_value(alert)?)),
            IpcCommand::Tree { manager_id } => render_tree(service, &manager_id)
                .map(|tree| serde_json::json!({ "tree": tree })),
        };

        let line = match reply {
            Ok(value) => value,
            Err(e) => {
                log::debug!("IPC request failed: {e}");
                error_json(&e)
            }
        };
        writeln!(stdout, "{}", line)?;
        stdout.flush()?;
    }
    Ok(())
}

fn render_tree(service: &AlertService, manager_id: &str) -> Result<String, AlertError> {
    if manager_id.trim().is_empty() {
        return Err(AlertError::validation("manager_id is required"));
    }
    let chart = OrgChart::load(service.store())?;
    if chart.name(manager_id).is_none() {
        return Err(AlertError::not_found("employee", manager_id));
    }
    Ok(chart.render_tree(manager_id))
}

fn list_params(args: &[String]) -> HashMap<String, String> {
    LIST_FLAGS
        .iter()
        .filter_map(|(flag, param)| flag_value(args, flag).map(|v| (param.to_string(), v.to_string())))
        .collect()
}

fn error_json(e: &AlertError) -> serde_json::Value {
    serde_json::json!({ "error": e.kind(), "detail": e.to_string() })
}

fn print_json<T: serde::Serialize>(value: T) -> Result<(), AlertError> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn required_flag<'a>(args: &'a [String], flag: &str) -> Result<&'a str, AlertError> {
    flag_value(args, flag)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AlertError::validation(format!("{flag} is required")))
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
