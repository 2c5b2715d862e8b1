//! Command dispatch
//!
//! Each `database` subcommand maps onto exactly one [`DatabaseActions`]
//! call. The only transformation on the way is normalizing the
//! `add-column` type (`int` → `INTEGER`).

use std::io;

use chrono::NaiveDate;
use clap::CommandFactory;
use itertools::Itertools;
use tracing::{info, instrument};

use crate::application::DatabaseActions;
use crate::cli::args::{Cli, Commands, ConfigCommands, DatabaseCommands, TargetArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::ColumnType;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, actions: &dyn DatabaseActions) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Database { command }) => execute_database(command, actions),
        Some(Commands::Config { command }) => execute_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run with --help for usage".into(),
        )),
    }
}

pub fn execute_database(command: &DatabaseCommands, actions: &dyn DatabaseActions) -> CliResult<()> {
    match command {
        DatabaseCommands::Create { target } => create_database(target, actions),
        DatabaseCommands::DropDaily { target } => drop_daily(target, actions),
        DatabaseCommands::RebuildDaily {
            date,
            from_date,
            to_date,
            target,
        } => rebuild_daily(target, *date, *from_date, *to_date, actions),
        DatabaseCommands::AddColumn {
            column_name,
            column_type,
            target,
        } => add_column(target, column_name, column_type, actions),
        DatabaseCommands::RenameColumn {
            column_name,
            new_name,
            target,
        } => rename_column(target, column_name, new_name, actions),
        DatabaseCommands::DropColumns {
            column_names,
            target,
        } => drop_columns(target, column_names, actions),
    }
}

fn announce(target: &TargetArgs) {
    if target.dry_run {
        output::dry_run_notice();
    }
}

#[instrument(skip(actions))]
fn create_database(target: &TargetArgs, actions: &dyn DatabaseActions) -> CliResult<()> {
    announce(target);
    let report = actions.create_database(&target.to_target())?;
    output::outcome(
        report.dry_run,
        "Created",
        "create",
        &format!("database {}", report.database.display()),
    );
    output::detail(&format!(
        "table '{}' with {} observation columns, {} daily summaries",
        report.table, report.columns, report.summary_tables
    ));
    info!("create: binding={} dry_run={}", target.binding, report.dry_run);
    Ok(())
}

#[instrument(skip(actions))]
fn drop_daily(target: &TargetArgs, actions: &dyn DatabaseActions) -> CliResult<()> {
    announce(target);
    let report = actions.drop_daily(&target.to_target())?;
    if report.dropped.is_empty() {
        output::info(&format!(
            "No daily summaries in {}",
            report.database.display()
        ));
        return Ok(());
    }
    output::outcome(
        report.dry_run,
        "Dropped",
        "drop",
        &format!("{} daily summary tables", report.dropped.len()),
    );
    for table in &report.dropped {
        output::detail(table);
    }
    info!("drop-daily: binding={} tables={}", target.binding, report.dropped.len());
    Ok(())
}

#[instrument(skip(actions))]
fn rebuild_daily(
    target: &TargetArgs,
    date: Option<NaiveDate>,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    actions: &dyn DatabaseActions,
) -> CliResult<()> {
    announce(target);
    let report = actions.rebuild_daily(&target.to_target(), date, from_date, to_date)?;
    match report.span {
        Some((first, last)) => {
            output::outcome(
                report.dry_run,
                "Rebuilt",
                "rebuild",
                &format!(
                    "{} days ({} to {}) from {} records",
                    report.days, first, last, report.records
                ),
            );
        }
        None => output::info("No archive records in range; nothing to rebuild"),
    }
    info!(
        "rebuild-daily: binding={} days={} records={}",
        target.binding, report.days, report.records
    );
    Ok(())
}

#[instrument(skip(actions))]
fn add_column(
    target: &TargetArgs,
    column_name: &str,
    column_type: &str,
    actions: &dyn DatabaseActions,
) -> CliResult<()> {
    let column_type: ColumnType = column_type
        .parse()
        .map_err(|e| CliError::InvalidArgs(format!("{e}")))?;
    announce(target);
    let report = actions.add_column(&target.to_target(), column_name, column_type)?;
    output::outcome(
        report.dry_run,
        "Added",
        "add",
        &format!(
            "column {} of type {} to '{}'",
            report.column, report.column_type, report.table
        ),
    );
    if report.summary_added {
        output::success_detail(&format!("daily summary for {}", report.column));
    }
    info!("add-column: {} {}", report.column, report.column_type);
    Ok(())
}

#[instrument(skip(actions))]
fn rename_column(
    target: &TargetArgs,
    column_name: &str,
    new_name: &str,
    actions: &dyn DatabaseActions,
) -> CliResult<()> {
    announce(target);
    let report = actions.rename_column(&target.to_target(), column_name, new_name)?;
    output::outcome(
        report.dry_run,
        "Renamed",
        "rename",
        &format!("column {} to {} in '{}'", report.from, report.to, report.table),
    );
    if report.summary_renamed {
        output::success_detail("daily summary renamed");
    }
    info!("rename-column: {} -> {}", report.from, report.to);
    Ok(())
}

#[instrument(skip(actions))]
fn drop_columns(
    target: &TargetArgs,
    column_names: &[String],
    actions: &dyn DatabaseActions,
) -> CliResult<()> {
    announce(target);
    let report = actions.drop_columns(&target.to_target(), column_names)?;
    for name in &report.skipped {
        output::skipped(&format!("column {name} not present, skipped"));
    }
    if report.dropped.is_empty() {
        output::info("No columns to drop");
        return Ok(());
    }
    output::outcome(
        report.dry_run,
        "Dropped",
        "drop",
        &format!(
            "columns {} from '{}'",
            report.dropped.iter().join(", "),
            report.table
        ),
    );
    info!("drop-columns: {:?}", report.dropped);
    Ok(())
}

fn execute_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { config } => {
            let settings = match config {
                Some(path) => Settings::load(path)?,
                None => Settings::load_default(global_config_path().as_deref())?,
            };
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { config, force } => {
            let path = config
                .clone()
                .or_else(global_config_path)
                .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        InfraError::io(format!("create {}", parent.display()), e)
                    })?;
                }
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            output::header("Config file");
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "exists" } else { "not found" };
                    output::detail(&format!("{} ({})", path.display(), state));
                }
                None => output::warning("cannot determine config directory"),
            }
            Ok(())
        }
    }
}
