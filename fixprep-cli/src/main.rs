mod config;
mod render;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{ConfigMerger, PrepareOverrides};
use fixprep_core::adapters::{FsWritePort, GlobSchemaProbe, ProcessCollaborator};
use fixprep_core::pipeline::{self, Ports};
use fixprep_core::ports::WritePort;
use fixprep_types::report::ToolInfo;
use render::{render_fixture_list, render_summary};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "fixprep",
    version,
    about = "Prepare database test fixtures from distribution templates."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prepare the test suite by building fixtures.
    #[command(name = "test:prepare")]
    TestPrepare(PrepareArgs),
    /// List the fixtures that test:prepare would build.
    ListFixtures(ListFixturesArgs),
}

#[derive(Debug, Parser)]
struct PrepareArgs {
    /// The database vendor (default: mysql).
    #[arg(long)]
    vendor: Option<String>,

    /// The data source name (default: mysql:host=127.0.0.1;dbname=test).
    #[arg(long)]
    dsn: Option<String>,

    /// The database user (default: root).
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// The database password (default: empty).
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Fixtures directory relative to the project root (default: tests/Fixtures).
    #[arg(long)]
    fixtures_dir: Option<Utf8PathBuf>,

    /// Program invoked for the build steps (default: propel).
    #[arg(long)]
    generator: Option<String>,

    /// Extra argument passed to the generator before the step name (repeatable).
    #[arg(long = "generator-arg", allow_hyphen_values = true)]
    generator_args: Vec<String>,

    /// Extension of the built runtime config file (default: php).
    #[arg(long)]
    config_format: Option<String>,

    /// Stop at the first fixture that does not complete and exit non-zero.
    #[arg(long, default_value_t = false)]
    fail_fast: bool,

    /// Write the JSON run report to this path.
    #[arg(long)]
    report: Option<Utf8PathBuf>,

    /// Verbose logging, passed through to the build steps.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Parser)]
struct ListFixturesArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.cmd, Command::TestPrepare(args) if args.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" })),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::TestPrepare(args) => cmd_prepare(args),
        Command::ListFixtures(args) => cmd_list_fixtures(args).map(|()| ExitCode::SUCCESS),
    }
}

fn cmd_prepare(args: PrepareArgs) -> anyhow::Result<ExitCode> {
    let file_config = config::load_or_default(&args.root).context("load fixprep.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_prepare_args(PrepareOverrides {
        project_root: args.root,
        vendor: args.vendor,
        dsn: args.dsn,
        user: args.user,
        password: args.password,
        fixtures_dir: args.fixtures_dir,
        generator: args.generator,
        generator_args: args.generator_args,
        config_format: args.config_format,
        fail_fast: args.fail_fast,
        verbose: args.verbose,
    });

    debug!(
        "merged config: options={:?}, settings={:?}, generator={} {:?}, fixtures={}",
        merged.options,
        merged.settings,
        merged.generator_program,
        merged.generator_args,
        merged.fixtures.len()
    );

    let collaborator = ProcessCollaborator::new(merged.generator_program, merged.generator_args);
    let schema_probe = GlobSchemaProbe::new(merged.schema_pattern);
    let writer = FsWritePort;
    let ports = Ports {
        collaborator: &collaborator,
        schema_probe: &schema_probe,
        writer: &writer,
    };

    let report = pipeline::run(
        &merged.settings,
        &merged.fixtures,
        &merged.options,
        ports,
        tool_info(),
    )
    .context("prepare fixtures")?;

    print!("{}", render_summary(&report));

    if let Some(path) = args.report {
        write_json(&writer, &path, &report)?;
        debug!("wrote report to {}", path);
    }

    if merged.settings.fail_fast && !report.is_clean() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_list_fixtures(args: ListFixturesArgs) -> anyhow::Result<()> {
    let file_config = config::load_or_default(&args.root).context("load fixprep.toml config")?;
    let fixtures = ConfigMerger::new(file_config).fixtures();

    match args.format {
        OutputFormat::Text => {
            println!("Fixtures:\n");
            print!("{}", render_fixture_list(&fixtures));
            println!();
            println!("Use 'fixprep test:prepare' to build them.");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&fixtures)?);
        }
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(
    writer: &dyn WritePort,
    path: &Utf8Path,
    v: &T,
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    writer.write_file(path, s.as_bytes())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "fixprep".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
