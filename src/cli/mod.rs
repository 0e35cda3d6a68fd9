//! # CLI Module
//!
//! Command-line interface for the scan orchestrator.
//!
//! ## Usage
//! ```bash
//! # Find duplicates and large files in one session
//! scan-orch scan ~/Photos --module duplicates --module large-files
//!
//! # Per-module settings and a module deadline
//! scan-orch scan ~/Photos -m unorganized --settings settings.json --timeout-ms 60000
//!
//! # JSON output
//! scan-orch scan ~/Photos -m screenshots --output json
//!
//! # Scan history
//! scan-orch history list --limit 10
//! scan-orch history delete <id>
//! scan-orch history clear
//! ```

use chrono::DateTime;
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use scan_orchestrator::core::builtin;
use scan_orchestrator::core::history::{HistoryEntry, ScanStatus, SqliteHistory};
use scan_orchestrator::core::modules::{ModuleKind, ModuleResult, ModuleSettings};
use scan_orchestrator::core::session::{ScanConfig, SessionController, SessionState};
use scan_orchestrator::core::{AggregateResult, ModuleReport, ModuleStatus};
use scan_orchestrator::error::{ConfigError, Result};
use scan_orchestrator::events::{Event, ModuleEvent, SessionEvent};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Scan Orchestrator - run photo library checks as one session
#[derive(Parser, Debug)]
#[command(name = "scan-orch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// History database path
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scan session over one or more folders
    Scan {
        /// Folders to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Module to run (repeatable): duplicates, similar, large-files, screenshots, unorganized
        #[arg(short, long = "module", required = true)]
        modules: Vec<ModuleKind>,

        /// JSON file with per-module settings
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Give up on a module after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Inspect or edit the scan history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// List entries, newest first
    List {
        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[arg(long, default_value = "0")]
        offset: usize,
    },
    /// Delete one entry
    Delete { id: String },
    /// Delete every entry
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let history_path = cli.history.unwrap_or_else(default_history_path);
    let history = SqliteHistory::open(&history_path)?;
    let controller = SessionController::new(builtin::registry(), Arc::new(history));

    match cli.command {
        Commands::Scan {
            paths,
            modules,
            settings,
            timeout_ms,
            output,
        } => {
            let mut config = ScanConfig::new(paths, modules);
            if let Some(path) = settings {
                config.settings = load_settings(&path)?;
            }
            config.module_timeout_ms = timeout_ms;
            run_scan(&controller, config, output)
        }
        Commands::History { command } => run_history(&controller, command),
    }
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scan-orchestrator")
        .join("history.db")
}

fn load_settings(path: &Path) -> Result<ModuleSettings> {
    let settings_error = |reason: String| ConfigError::SettingsFile {
        path: path.to_path_buf(),
        reason,
    };
    let raw = fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;
    let settings = serde_json::from_str(&raw).map_err(|e| settings_error(e.to_string()))?;
    Ok(settings)
}

fn run_scan(controller: &SessionController, config: ScanConfig, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Scan Orchestrator").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(100);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let receiver = controller.subscribe();
    let session_id = match controller.start_session(config) {
        Ok(id) => id,
        Err(e) => {
            if let Some(pb) = &progress {
                pb.finish_and_clear();
            }
            return Err(e);
        }
    };

    let progress_clone = progress.clone();
    let watched = session_id.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Progress(p) => {
                    if let Some(pb) = &progress_clone {
                        pb.set_position(p.overall_percent as u64);
                        let label = p.current_module.map(|m| m.display_name()).unwrap_or("");
                        pb.set_message(format!("{} {}", label, p.message));
                    }
                }
                Event::Module(ModuleEvent::Errored { module, message }) => {
                    if let Some(pb) = &progress_clone {
                        pb.println(format!(
                            "  {} {}: {}",
                            style("✗").red(),
                            module.display_name(),
                            message
                        ));
                    }
                }
                Event::Session(SessionEvent::Finished { session_id, .. }) if session_id == watched => {
                    if let Some(pb) = &progress_clone {
                        pb.finish_and_clear();
                    }
                    break;
                }
                _ => {}
            }
        }
    });

    let result = controller.await_result(&session_id);
    event_thread.join().ok();
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let result = result?;
    match output {
        OutputFormat::Pretty => print_pretty_result(&term, &result),
        OutputFormat::Json => print_json(&result),
    }

    Ok(())
}

fn print_pretty_result(term: &Term, result: &AggregateResult) {
    let headline = match result.state {
        SessionState::Completed => format!("{} Scan Complete", style("✓").green().bold()),
        SessionState::Cancelled => format!("{} Scan Cancelled", style("!").yellow().bold()),
        other => format!("{} Scan {}", style("✗").red().bold(), other),
    };
    term.write_line(&headline).ok();
    term.write_line("").ok();

    for report in &result.modules {
        print_module_report(term, report);
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "  {} items found, {} potential space savings in {:.1}s",
        style(result.total_items_found).cyan(),
        style(format_bytes(result.total_savings_bytes)).yellow(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Remember: No files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

fn print_module_report(term: &Term, report: &ModuleReport) {
    let name = style(report.module.display_name()).bold();
    match (&report.status, &report.result) {
        (ModuleStatus::Completed, Some(result)) => {
            term.write_line(&format!("  {} {}", style("●").green(), name)).ok();
            for line in describe(result) {
                term.write_line(&format!("      {}", line)).ok();
            }
        }
        (ModuleStatus::Errored { message }, _) => {
            term.write_line(&format!("  {} {} {}", style("●").red(), name, style(message).red()))
                .ok();
        }
        (ModuleStatus::Cancelled, _) => {
            term.write_line(&format!("  {} {} {}", style("●").yellow(), name, style("cancelled").dim()))
                .ok();
        }
        _ => {
            term.write_line(&format!("  {} {} {}", style("○").dim(), name, style("not run").dim()))
                .ok();
        }
    }
}

fn describe(result: &ModuleResult) -> Vec<String> {
    match result {
        ModuleResult::Duplicates(r) => {
            let mut lines = vec![format!(
                "{} groups, {} duplicates among {} files ({})",
                r.groups.len(),
                result.summary().items_found,
                r.total_files_scanned,
                format_bytes(r.potential_savings_bytes)
            )];
            for group in r.groups.iter().take(5) {
                lines.push(format!("{} {}", style("★").green(), display_path(&group.representative)));
                for file in group.files.iter().filter(|f| **f != group.representative) {
                    lines.push(format!("{} {}", style("○").dim(), display_path(file)));
                }
            }
            lines
        }
        ModuleResult::Similar(r) => vec![format!(
            "{} groups among {} photos",
            r.groups.len(),
            r.total_photos_scanned
        )],
        ModuleResult::LargeFiles(r) => {
            let mut lines = vec![format!(
                "{} large files ({}) among {} scanned",
                r.files.len(),
                format_bytes(r.total_size_bytes),
                r.files_scanned
            )];
            lines.extend(r.files.iter().take(10).map(|f| {
                format!("{:>10}  {}", format_bytes(f.size_bytes), display_path(&f.path))
            }));
            lines
        }
        ModuleResult::Screenshots(r) => vec![format!(
            "{} screenshots ({}), {} identical groups",
            r.screenshots.len(),
            format_bytes(r.total_size_bytes),
            r.duplicate_groups.len()
        )],
        ModuleResult::Unorganized(r) => {
            let mut lines = vec![format!(
                "{} unorganized files ({}) among {} scanned",
                r.files.len(),
                format_bytes(r.total_size_bytes),
                r.total_files_scanned
            )];
            lines.extend(
                r.by_reason
                    .iter()
                    .map(|s| format!("{}: {}", s.reason.description(), s.count)),
            );
            lines
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn run_history(controller: &SessionController, command: HistoryCommand) -> Result<()> {
    let term = Term::stdout();

    match command {
        HistoryCommand::List { limit, offset } => {
            let page = controller.list_history(limit, offset)?;
            term.write_line(&format!(
                "{} of {} entries",
                style(page.entries.len()).cyan(),
                page.total_count
            ))
            .ok();
            for entry in &page.entries {
                term.write_line(&format_entry(entry)).ok();
            }
        }
        HistoryCommand::Delete { id } => {
            if controller.delete_history_entry(&id)? {
                term.write_line(&format!("{} Deleted {}", style("✓").green(), id)).ok();
            } else {
                term.write_line(&format!("{} No entry {}", style("!").yellow(), id)).ok();
            }
        }
        HistoryCommand::Clear => {
            let removed = controller.clear_history()?;
            term.write_line(&format!("{} Removed {} entries", style("✓").green(), removed))
                .ok();
        }
    }

    Ok(())
}

fn format_entry(entry: &HistoryEntry) -> String {
    let when = DateTime::from_timestamp(entry.scan_time, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| entry.scan_time.to_string());
    let status = match &entry.status {
        ScanStatus::Completed => style("completed".to_string()).green(),
        ScanStatus::Cancelled => style("cancelled".to_string()).yellow(),
        ScanStatus::Error(message) => style(format!("error: {}", message)).red(),
    };

    format!(
        "  {}  {}  {:<16} {:>6} files  {:>10}  {}",
        style(&entry.id).dim(),
        when,
        entry.module_type.display_name(),
        entry.total_files,
        format_bytes(entry.potential_savings.unwrap_or(0)),
        status
    )
}

fn display_path(path: &str) -> String {
    let path = Path::new(path);
    match dirs::home_dir().and_then(|home| path.strip_prefix(&home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.0 MB");
    }

    #[test]
    fn test_parses_repeated_modules() {
        let cli = Cli::parse_from([
            "scan-orch",
            "scan",
            "/photos",
            "--module",
            "duplicates",
            "-m",
            "large-files",
        ]);
        match cli.command {
            Commands::Scan { modules, .. } => {
                assert_eq!(modules, vec![ModuleKind::Duplicates, ModuleKind::LargeFiles]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_settings_file_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(matches!(
            err,
            scan_orchestrator::OrchestratorError::Config(ConfigError::SettingsFile { .. })
        ));
    }
}
