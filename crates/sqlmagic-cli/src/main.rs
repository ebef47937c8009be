use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqlmagic_core::{Diagnostic, DisplayMode, RunReport, Settings, Severity, Value};
use sqlmagic_engine::{EngineEvent, ResultSet, ScriptedEngine};
use sqlmagic_preprocess::Bindings;
use sqlmagic_session::{help_text, parse_script, Outcome, Session};

/// Environment variables with this prefix become bindings
const ENV_PREFIX: &str = "SQLMAGIC_VAR_";

const DEFAULT_CONFIG: &str = "sqlmagic.toml";

/// sqlmagic - %sql statement preprocessing and dispatch
#[derive(Parser)]
#[command(name = "sqlmagic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sqlmagic.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra macro libraries to load
    #[arg(short, long = "macros", global = true)]
    macros: Vec<PathBuf>,

    /// Host variable as name=value (repeatable)
    #[arg(long = "var", global = true)]
    vars: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dry-run a notebook script against the scripted engine
    Run {
        /// Script of %sql lines and %%sql cells
        script: PathBuf,

        /// Output file for the JSON run report
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Print outcomes as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the macros defined by the loaded libraries
    Macros {
        /// Also print each macro body
        #[arg(long)]
        show: bool,
    },

    /// Print the option flags the dispatcher understands
    Flags,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // a missing .env is fine
    let _ = dotenvy::dotenv();

    let mut settings = if let Some(config_path) = &cli.config {
        Settings::from_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Settings::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Settings::default()
    };
    settings.macros.extend(cli.macros.iter().cloned());

    let mut env = environment_bindings(std::env::vars());
    for var in &cli.vars {
        let (name, value) = parse_var(var)?;
        env.insert(name, value);
    }

    if cli.verbose {
        eprintln!(
            "{} maxrows={} runtime={}s, {} binding(s)",
            "Using".cyan(),
            settings.maxrows,
            settings.runtime,
            env.len()
        );
    }

    match cli.command {
        Commands::Run { script, report, json } => {
            run_command(settings, &env, &script, report.as_deref(), json, cli.verbose)
        }
        Commands::Macros { show } => macros_command(settings, &env, show),
        Commands::Flags => {
            println!("{}", help_text());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Bindings from `SQLMAGIC_VAR_<NAME>` variables, named in lower case
fn environment_bindings<I>(vars: I) -> Bindings
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut bindings = Bindings::new();
    for (key, value) in vars {
        if let Some(name) = key.strip_prefix(ENV_PREFIX) {
            if !name.is_empty() {
                bindings.insert(name.to_lowercase(), Value::infer(&value));
            }
        }
    }
    bindings
}

/// Parse a `name=value` pair from the command line
fn parse_var(text: &str) -> Result<(String, Value)> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid --var '{}': expected name=value", text))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Invalid --var '{}': empty name", text);
    }
    Ok((name.to_string(), Value::infer(value)))
}

/// Session over a scripted engine with every configured library loaded
fn open_session(settings: Settings, env: &Bindings) -> Result<Session<ScriptedEngine>> {
    let libraries = settings.macros.clone();
    let mut session = Session::with_settings(ScriptedEngine::new().with_name("dry-run"), settings);

    for path in &libraries {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read macro library {}", path.display()))?;
        let count = session.load_macro_library(&text, env);
        tracing::info!(library = %path.display(), count, "loaded macro library");

        for diag in session.take_messages().iter().filter(|d| d.severity != Severity::Info) {
            print_diagnostic(diag);
        }
    }

    Ok(session)
}

/// Run command - replay a script through the dispatcher without a database
fn run_command(
    settings: Settings,
    env: &Bindings,
    script: &Path,
    report_path: Option<&Path>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let mut session = open_session(settings, env)?;
    let mut report = RunReport::new();

    let invocations = parse_script(&text);
    if verbose {
        eprintln!("{} {} invocation(s) from {}", "Running".cyan(), invocations.len(), script.display());
    }

    for invocation in invocations {
        report.add_invocation();
        let marker = if invocation.cell.is_some() { "%%sql" } else { "%sql" };
        println!(
            "{} {} {}",
            format!("[{}]", invocation.line_number).dimmed(),
            marker.bold(),
            invocation.line
        );

        let mark = EngineMark::take(session.engine());
        let outcomes = session.run(&invocation.line, invocation.cell.as_deref(), env);

        for statement in mark.activity(session.engine()) {
            println!("  {} {}", "->".bright_blue(), statement);
            report.add_statement(statement);
        }
        for outcome in &outcomes {
            print_outcome(outcome, json)?;
        }
        for diag in session.take_messages() {
            print_diagnostic(&diag);
            report.add_diagnostic(diag);
        }
    }

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    print_run_summary(&report);

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Macros command - show what the configured libraries define
fn macros_command(settings: Settings, env: &Bindings, show: bool) -> Result<()> {
    if settings.macros.is_empty() {
        println!("{}", "No macro libraries configured (use --macros or `macros` in sqlmagic.toml)".yellow());
        return Ok(());
    }

    let session = open_session(settings, env)?;
    let table = session.macros();
    println!("{} {}", "Macros:".bold(), table.len());

    for name in table.names() {
        println!("  {}", name.green());
        if show {
            if let Some(found) = table.get(name) {
                for line in found.body.lines() {
                    println!("      {}", line.dimmed());
                }
            }
        }
    }

    Ok(())
}

/// Position in the scripted engine's event log
struct EngineMark {
    len: usize,
    last_times: usize,
}

impl EngineMark {
    fn take(engine: &ScriptedEngine) -> Self {
        let last_times = match engine.events().last() {
            Some(EngineEvent::Execute { times, .. }) => *times,
            _ => 0,
        };
        Self {
            len: engine.events().len(),
            last_times,
        }
    }

    /// Describe everything the engine was asked to do since the mark
    fn activity(&self, engine: &ScriptedEngine) -> Vec<String> {
        let events = engine.events();
        let mut lines = Vec::new();

        // repeats of the last statement are merged into its event
        if let Some(EngineEvent::Execute { sql, times }) = self.len.checked_sub(1).and_then(|i| events.get(i)) {
            if *times > self.last_times {
                lines.push(describe_execute(sql, times - self.last_times));
            }
        }

        lines.extend(events.iter().skip(self.len).map(describe_event));
        lines
    }
}

fn describe_execute(sql: &str, times: usize) -> String {
    if times > 1 {
        format!("{} (x{})", sql, times)
    } else {
        sql.to_string()
    }
}

fn describe_event(event: &EngineEvent) -> String {
    match event {
        EngineEvent::Execute { sql, times } => describe_execute(sql, *times),
        EngineEvent::Prepare(sql) => format!("PREPARE {}", sql),
        EngineEvent::ExecutePrepared { sql, params } => {
            let values: Vec<String> = params.iter().map(|p| p.value.as_text()).collect();
            format!("{} USING {}", sql, values.join(", "))
        }
        EngineEvent::Call { name, args } => {
            let args: Vec<String> = args
                .iter()
                .map(|arg| arg.as_ref().map(Value::as_text).unwrap_or_else(|| "NULL".to_string()))
                .collect();
            format!("CALL {}({})", name, args.join(", "))
        }
        EngineEvent::Commit => "COMMIT".to_string(),
        EngineEvent::Rollback => "ROLLBACK".to_string(),
        EngineEvent::Autocommit(on) => format!("AUTOCOMMIT {}", if *on { "ON" } else { "OFF" }),
    }
}

fn print_outcome(outcome: &Outcome, json: bool) -> Result<()> {
    if json {
        if outcome.is_output() {
            println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
        }
        return Ok(());
    }

    match outcome {
        Outcome::Rows { result, display, truncated } => {
            print_table(result, *display);
            if *truncated {
                println!("    {}", "(more rows available, use -a to show all)".dimmed());
            }
        }
        Outcome::Array(_) | Outcome::Records(_) | Outcome::Documents(_) => {
            println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
        }
        Outcome::Prepared(id) => println!("    {} {}", "Prepared statement".cyan(), id),
        Outcome::Call(output) => {
            if let Some(result) = &output.result {
                print_table(result, DisplayMode::Table);
            }
            if !output.returned.is_empty() {
                let values: Vec<String> = output.returned.iter().map(Value::as_text).collect();
                println!("    {} {}", "Returned:".cyan(), values.join(", "));
            }
        }
        Outcome::Defined(name) => println!("    {} {}", "Defined macro".cyan(), name),
        Outcome::Settings(text) | Outcome::Help(text) => println!("{}", text),
        // reported through messages
        Outcome::Iterations { .. } | Outcome::Completed { .. } => {}
    }
    Ok(())
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn print_table(result: &ResultSet, display: DisplayMode) {
    let numbered = display == DisplayMode::Grid;
    let mut header: Vec<String> = result.columns.clone();
    let mut rows: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    if numbered {
        header.insert(0, String::new());
        for (i, row) in rows.iter_mut().enumerate() {
            row.insert(0, i.to_string());
        }
    }

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("    {}", format_row(&header).bold());
    for row in &rows {
        println!("    {}", format_row(row));
    }
}

fn print_diagnostic(diag: &Diagnostic) {
    let severity_str = match diag.severity {
        Severity::Error => "ERROR".red().bold(),
        Severity::Warn => "WARN".yellow().bold(),
        Severity::Info => "INFO".cyan(),
    };

    println!("  [{}] {}: {}", severity_str, diag.code, diag.message);
    if let Some(statement) = &diag.statement {
        println!("    in: {}", statement.dimmed());
    }
}

fn print_run_summary(report: &RunReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Dry Run Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Invocations: {}", report.summary.invocations);
    println!("  Statements:  {}", report.summary.statements);

    if report.summary.errors > 0 {
        println!("  Errors:      {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:      {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings:    {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings:    {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:        {}", report.summary.info);
    println!();
}
