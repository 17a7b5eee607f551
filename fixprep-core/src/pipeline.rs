//! The fixture preparation pipeline.
//!
//! Per fixture: directory check, template materialization, schema probe,
//! optional SQL phase, optional config/model phase. Fixtures run strictly in
//! order and each one is isolated: its failures are recorded in the report
//! and the run moves on.

use crate::error::PrepareError;
use crate::invocation::Invocation;
use crate::ports::{Collaborator, SchemaProbe, WritePort};
use crate::settings::{CLASSES_OUTPUT_DIR, PrepareSettings, SQL_OUTPUT_DIR};
use crate::template::materialize_distribution_files;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use fixprep_types::fixture::FixtureSpec;
use fixprep_types::options::BuildOptions;
use fixprep_types::report::{
    FixtureOutcome, OutcomeStatus, RunReport, StepRecord, StepStatus, ToolInfo,
};
use tracing::{debug, info, warn};

/// Borrowed ports used by [`run`].
#[derive(Clone, Copy)]
pub struct Ports<'a> {
    pub collaborator: &'a dyn Collaborator,
    pub schema_probe: &'a dyn SchemaProbe,
    pub writer: &'a dyn WritePort,
}

/// Check run inputs before touching any fixture.
pub fn validate(fixtures: &[FixtureSpec], options: &BuildOptions) -> Result<(), PrepareError> {
    if fixtures.is_empty() {
        return Err(PrepareError::InvalidInput("no fixtures configured".to_string()));
    }
    if let Some(fixture) = fixtures.iter().find(|f| f.databases.is_empty()) {
        return Err(PrepareError::InvalidInput(format!(
            "fixture \"{}\" names no database",
            fixture.directory
        )));
    }
    if let Some(fixture) = fixtures
        .iter()
        .find(|f| f.databases.iter().any(|db| db.trim().is_empty()))
    {
        return Err(PrepareError::InvalidInput(format!(
            "fixture \"{}\" has a blank database name",
            fixture.directory
        )));
    }
    for (name, value) in [
        ("vendor", &options.vendor),
        ("dsn", &options.dsn),
        ("user", &options.user),
    ] {
        if value.trim().is_empty() {
            return Err(PrepareError::InvalidInput(format!("{} must not be empty", name)));
        }
    }
    Ok(())
}

/// Prepare every fixture in order and report the outcome of each.
///
/// Returns `Err` only for invalid input. With `settings.fail_fast` the run
/// stops after the first fixture that does not complete cleanly.
pub fn run(
    settings: &PrepareSettings,
    fixtures: &[FixtureSpec],
    options: &BuildOptions,
    ports: Ports<'_>,
    tool: ToolInfo,
) -> Result<RunReport, PrepareError> {
    validate(fixtures, options)?;

    let mut report = RunReport::new(tool);
    for fixture in fixtures {
        let outcome = prepare_fixture(settings, fixture, options, ports);
        let stop = settings.fail_fast && !outcome.status.is_completed();
        report.outcomes.push(outcome);
        if stop {
            warn!("fail-fast enabled, stopping after first failed fixture");
            break;
        }
    }
    report.ended_at = Some(Utc::now());

    let summary = report.summary();
    info!(
        completed = summary.completed,
        skipped = summary.skipped,
        failed = summary.failed,
        "fixture preparation finished"
    );
    Ok(report)
}

fn prepare_fixture(
    settings: &PrepareSettings,
    fixture: &FixtureSpec,
    options: &BuildOptions,
    ports: Ports<'_>,
) -> FixtureOutcome {
    let path = settings.display_path(fixture);
    let mut steps = Vec::new();

    let result = build_fixture(settings, fixture, options, ports, &mut steps);
    let (status, message) = match result {
        Ok(()) => (OutcomeStatus::Completed, None),
        Err(err) => {
            warn!(fixture = %path, "{}", err);
            (err.outcome_status(), Some(err.to_string()))
        }
    };

    FixtureOutcome {
        directory: path.into_string(),
        databases: fixture.databases.clone(),
        status,
        message,
        steps,
    }
}

fn build_fixture(
    settings: &PrepareSettings,
    fixture: &FixtureSpec,
    options: &BuildOptions,
    ports: Ports<'_>,
    steps: &mut Vec<StepRecord>,
) -> Result<(), PrepareError> {
    let dir = settings.fixture_dir(fixture);
    if !dir.is_dir() {
        return Err(PrepareError::DirectoryMissing(settings.display_path(fixture)));
    }

    info!("Building fixtures in {}", settings.display_path(fixture));

    materialize_distribution_files(&dir, options, ports.writer)?;

    let schemas = ports.schema_probe.count_schemas(&dir)?;
    let platform = options.platform();

    if schemas > 0 || !fixture.skips_sql_without_schema() {
        invoke(
            ports.collaborator,
            &dir,
            Invocation::BuildSql {
                input_dir: Utf8PathBuf::from("."),
                output_dir: Utf8PathBuf::from(SQL_OUTPUT_DIR),
                platform: platform.clone(),
                verbose: options.verbose,
            },
            steps,
        )?;

        let connections = fixture
            .databases
            .iter()
            .map(|db| options.connection_descriptor(db))
            .collect();
        invoke(
            ports.collaborator,
            &dir,
            Invocation::InsertSql {
                output_dir: Utf8PathBuf::from(SQL_OUTPUT_DIR),
                connections,
                verbose: options.verbose,
            },
            steps,
        )?;
    } else {
        debug!(fixture = %fixture.directory, "no schema file, skipping SQL phase");
    }

    if schemas > 0 {
        let primary = fixture.primary_database().ok_or_else(|| {
            PrepareError::InvalidInput(format!(
                "fixture \"{}\" names no database",
                fixture.directory
            ))
        })?;
        invoke(
            ports.collaborator,
            &dir,
            Invocation::BuildConfig {
                input_dir: Utf8PathBuf::from("."),
                output_file: settings.config_output_file(primary),
                verbose: options.verbose,
            },
            steps,
        )?;
        invoke(
            ports.collaborator,
            &dir,
            Invocation::BuildModel {
                input_dir: Utf8PathBuf::from("."),
                output_dir: Utf8PathBuf::from(CLASSES_OUTPUT_DIR),
                platform,
                verbose: options.verbose,
            },
            steps,
        )?;
    } else {
        debug!(fixture = %fixture.directory, "no schema file, skipping config and model build");
    }

    Ok(())
}

fn invoke(
    collaborator: &dyn Collaborator,
    dir: &Utf8Path,
    invocation: Invocation,
    steps: &mut Vec<StepRecord>,
) -> Result<(), PrepareError> {
    let step = invocation.step();
    match collaborator.invoke(dir, &invocation) {
        Ok(()) => {
            steps.push(StepRecord {
                step,
                status: StepStatus::Ok,
            });
            Ok(())
        }
        Err(err) => {
            steps.push(StepRecord {
                step,
                status: StepStatus::Failed,
            });
            Err(PrepareError::CollaboratorFailure {
                step,
                message: format!("{:#}", err),
            })
        }
    }
}
