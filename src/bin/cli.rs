use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tabled::{Table, settings::Style};

use fsaudit::{AuditLog, AuditReport, Checklist, ChecklistLoader, ChecklistValidator, ComplianceAuditor, LogLocation, SystemProbe};
use fsaudit::{DirectoryAnalyzer, DirectoryStats, ElevatedPrivilege, RemediationEngine, RemediationOutcome, ScanOutcome, human_size};
use fsaudit::checklist::ChecklistTableRow;
use fsaudit::log::DEFAULT_LOG_PATH;
use fsaudit::stats::{ExtensionTableRow, LargestFileTableRow};

#[derive(Parser)]
#[command(name = "fsaudit")]
#[command(about = "Audit permissions and ownership of sensitive files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every checklist entry and scan the user database for plaintext passwords
    Audit {
        /// Fix mode and ownership drift in place (requires root)
        #[arg(short, long)]
        remediate: bool,

        /// Checklist file, or directory of *.yaml files. Defaults to the built-in checklist.
        #[arg(short, long, env = "FSAUDIT_CHECKLIST")]
        checklist: Option<PathBuf>,

        /// User database scanned for plaintext passwords (overrides the checklist)
        #[arg(long, env = "FSAUDIT_CREDENTIAL_FILE")]
        credential_file: Option<PathBuf>,

        /// Skip the plaintext password scan
        #[arg(long)]
        skip_credential_scan: bool,

        /// Audit log path
        #[arg(long, env = "FSAUDIT_LOG_FILE", default_value = DEFAULT_LOG_PATH)]
        log_file: PathBuf,

        /// Audit log path used when the primary cannot be created
        #[arg(long, env = "FSAUDIT_FALLBACK_LOG_FILE")]
        fallback_log_file: Option<PathBuf>,
    },

    /// Validate and show a checklist
    Checklist {
        /// Checklist file, or directory of *.yaml files. Defaults to the built-in checklist.
        #[arg(short, long, env = "FSAUDIT_CHECKLIST")]
        checklist: Option<PathBuf>,

        /// Output format: table, yaml, json
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },

    /// Report file counts, sizes and extensions for a directory tree
    Stats {
        /// Directory to analyze
        directory: PathBuf,

        /// Number of extensions and largest files to list
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Output format: table, yaml, json
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Yaml,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("fsaudit=debug,info")
    } else {
        EnvFilter::new("fsaudit=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "✗ Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Audit { remediate, checklist, credential_file, skip_credential_scan, log_file, fallback_log_file } => {
            let location = LogLocation::new(
                log_file,
                fallback_log_file.unwrap_or_else(LogLocation::default_fallback),
            );
            cmd_audit(remediate, checklist, credential_file, skip_credential_scan, &location, cli.verbose)?;
        }

        Commands::Checklist { checklist, output } => {
            cmd_checklist(checklist, output)?;
        }

        Commands::Stats { directory, top, output } => {
            cmd_stats(directory, top, output, cli.verbose)?;
        }
    }

    Ok(())
}

fn load_checklist(path: Option<PathBuf>) -> Result<Checklist, Box<dyn std::error::Error>> {
    let checklist = match path {
        Some(path) => {
            info!("Loading checklist from {}", path.display());
            ChecklistLoader::new().load(&path)?
        }
        None => Checklist::builtin()?,
    };
    Ok(checklist)
}

fn cmd_audit(
    remediate: bool,
    checklist_path: Option<PathBuf>,
    credential_file: Option<PathBuf>,
    skip_credential_scan: bool,
    location: &LogLocation,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Privilege is checked once, before any checklist work.
    let privilege = if remediate {
        Some(ElevatedPrivilege::verify()?)
    } else {
        None
    };

    let mut checklist = load_checklist(checklist_path)?;
    if let Some(path) = credential_file {
        checklist = checklist.with_credential_file(path);
    }

    let log = AuditLog::open(location)?;
    if log.used_fallback() {
        warn!("Audit log redirected to {}", log.path().display());
    }

    let probe = SystemProbe::new();
    let mut auditor = ComplianceAuditor::new(&checklist, &probe, &log);
    if let Some(privilege) = &privilege {
        auditor = auditor.with_remediation(RemediationEngine::new(privilege, &probe, &log));
    }
    if skip_credential_scan {
        auditor = auditor.without_credential_scan();
    }

    let report = auditor.run()?;
    print_audit_report(&report, &checklist, verbose);

    println!("  Log: {}", log.path().display());

    if !report.remediation_enabled && report.violations().any(|v| v.kind.is_remediable()) {
        println!();
        println!("Run again as root with {} to fix mode and ownership drift.", "--remediate".yellow());
    }

    Ok(())
}

fn print_audit_report(report: &AuditReport, checklist: &Checklist, verbose: bool) {
    for entry in &report.entries {
        let path = entry.path.display();

        if let Some(error) = &entry.error {
            println!("{} {}: {}", "?".yellow(), path, error);
            continue;
        }

        let Some(evaluation) = &entry.evaluation else {
            continue;
        };

        if verbose {
            if evaluation.is_compliant() {
                println!("{} {}", "✓".green(), path);
            } else {
                for violation in &evaluation.violations {
                    println!(
                        "{} {} [{}] observed {}, expected {}",
                        "✗".red(),
                        path,
                        violation.kind,
                        violation.observed,
                        violation.expected
                    );
                }
            }

            if let Some(true) = evaluation.immutable() {
                println!("    {} immutable attribute is set", "ℹ".cyan());
            }
        }

        match &entry.remediation {
            Some(RemediationOutcome::Applied) => {
                println!("    {} remediated {}", "✓".green(), path);
            }
            Some(RemediationOutcome::Failed(reason)) => {
                println!("    {} remediation of {} failed: {}", "✗".red(), path, reason);
            }
            Some(RemediationOutcome::AlreadyCompliant) => {
                println!("    {} {} already compliant", "✓".green(), path);
            }
            Some(RemediationOutcome::NotApplicable) | None => {}
        }
    }

    if verbose {
        let credential_file = checklist.credential_file().display();
        match &report.credential_scan {
            Some(ScanOutcome::Clean { records }) => {
                println!("{} {}: {} records, no plaintext passwords", "✓".green(), credential_file, records);
            }
            Some(ScanOutcome::Violation(violation)) => {
                println!(
                    "{} {} [{}] {}",
                    "✗".red(),
                    credential_file,
                    violation.kind,
                    violation.observed
                );
            }
            Some(ScanOutcome::Absent) => {
                println!("{} {}: not found, scan skipped", "○".dimmed(), credential_file);
            }
            None => {}
        }
    }

    let summary = &report.summary;
    println!();
    println!("Summary:");
    println!("  Checked: {}", summary.total_checked);

    let violations = format!("Violations: {}", summary.total_violations);
    if summary.total_violations > 0 {
        println!("  {}", violations.red());
    } else {
        println!("  {}", violations.green());
    }

    if report.remediation_enabled {
        println!("  Remediated: {}", summary.total_remediated);
        if summary.total_remediation_failures > 0 {
            println!("  {}", format!("Remediation failures: {}", summary.total_remediation_failures).red());
        }
    }

    if summary.total_probe_errors > 0 {
        println!("  {}", format!("Unreadable entries: {}", summary.total_probe_errors).yellow());
    }
}

fn cmd_checklist(
    checklist_path: Option<PathBuf>,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let checklist = load_checklist(checklist_path)?;
    let validation = ChecklistValidator::validate(&checklist);

    match output {
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&checklist)?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&checklist)?);
        }
        OutputFormat::Table => {
            let rows: Vec<ChecklistTableRow> = checklist.entries().iter().map(ChecklistTableRow::from).collect();
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
            println!();
            println!("Credential file: {}", checklist.credential_file().display());
        }
    }

    for warning in &validation.warnings {
        eprintln!("{} [{}] {}", "⚠".yellow(), warning.code, warning.message);
    }

    info!("{} entries validated", checklist.len());

    Ok(())
}

fn cmd_stats(
    directory: PathBuf,
    top: usize,
    output: OutputFormat,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = DirectoryAnalyzer::new(directory);
    info!("Analyzing {}", analyzer.root().display());

    let stats = analyzer.analyze()?;

    match output {
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&stats.report(top))?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats.report(top))?);
        }
        OutputFormat::Table => print_stats(&stats, top, verbose),
    }

    Ok(())
}

fn print_stats(stats: &DirectoryStats, top: usize, verbose: bool) {
    let root = std::fs::canonicalize(&stats.root).unwrap_or_else(|_| stats.root.clone());

    println!("{}", "Directory Report".bold());
    println!();
    println!("Directory:       {}", root.display());
    println!("Generated:       {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!();
    println!("Files:           {}", stats.total_files);
    println!("Subdirectories:  {}", stats.total_directories);
    println!("Total size:      {} ({} bytes)", human_size(stats.total_size as f64), stats.total_size);
    if let Some(average) = stats.average_file_size() {
        println!("Average size:    {}", human_size(average));
    }
    if stats.skipped > 0 {
        println!("Skipped:         {}", stats.skipped.to_string().yellow());
    }

    if verbose {
        let extensions = stats.top_extensions(top);
        if !extensions.is_empty() {
            println!();
            println!("{}", "Most common file types".bold());
            let rows: Vec<ExtensionTableRow> = extensions.iter().map(ExtensionTableRow::from).collect();
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }

        let largest = stats.top_files(top);
        if !largest.is_empty() {
            println!();
            println!("{}", format!("{} largest files", largest.len()).bold());
            let rows: Vec<LargestFileTableRow> = largest.into_iter().map(LargestFileTableRow::from).collect();
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
    }

    println!();
    if stats.is_empty() {
        println!("The directory is empty (no files found).");
    } else {
        println!(
            "{} file(s) across {} subdirectories, {} in total.",
            stats.total_files,
            stats.total_directories,
            human_size(stats.total_size as f64)
        );
    }
}
