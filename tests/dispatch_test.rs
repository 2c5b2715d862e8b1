//! Tests that every `database` subcommand forwards its flags unchanged to
//! the action provider.

use std::cell::RefCell;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use rstest::rstest;

use wxctl::application::actions::{
    AddColumnReport, CreateReport, DropColumnsReport, DropDailyReport, RebuildReport,
    RenameColumnReport,
};
use wxctl::application::{ApplicationError, ApplicationResult, DatabaseActions, Target};
use wxctl::cli::commands::execute_command;
use wxctl::cli::{Cli, CliError};
use wxctl::domain::ColumnType;
use wxctl::util::testing::init_test_setup;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create(Target),
    DropDaily(Target),
    RebuildDaily {
        target: Target,
        date: Option<NaiveDate>,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    },
    AddColumn {
        target: Target,
        column_name: String,
        column_type: ColumnType,
    },
    RenameColumn {
        target: Target,
        column_name: String,
        new_name: String,
    },
    DropColumns {
        target: Target,
        column_names: Vec<String>,
    },
}

/// Provider that records calls and returns empty reports.
#[derive(Default)]
struct RecordingActions {
    calls: RefCell<Vec<Call>>,
    fail_create: bool,
}

impl RecordingActions {
    fn single_call(&self) -> Call {
        let calls = self.calls.borrow();
        assert_eq!(calls.len(), 1, "expected exactly one call, got {calls:?}");
        calls[0].clone()
    }
}

impl DatabaseActions for RecordingActions {
    fn create_database(&self, target: &Target) -> ApplicationResult<CreateReport> {
        self.calls.borrow_mut().push(Call::Create(target.clone()));
        if self.fail_create {
            return Err(ApplicationError::DatabaseExists(PathBuf::from("db.sdb")));
        }
        Ok(CreateReport {
            database: PathBuf::from("db.sdb"),
            table: "archive".into(),
            columns: 0,
            summary_tables: 0,
            dry_run: target.dry_run,
        })
    }

    fn drop_daily(&self, target: &Target) -> ApplicationResult<DropDailyReport> {
        self.calls.borrow_mut().push(Call::DropDaily(target.clone()));
        Ok(DropDailyReport {
            database: PathBuf::from("db.sdb"),
            dropped: vec![],
            dry_run: target.dry_run,
        })
    }

    fn rebuild_daily(
        &self,
        target: &Target,
        date: Option<NaiveDate>,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> ApplicationResult<RebuildReport> {
        self.calls.borrow_mut().push(Call::RebuildDaily {
            target: target.clone(),
            date,
            from_date,
            to_date,
        });
        Ok(RebuildReport {
            database: PathBuf::from("db.sdb"),
            span: None,
            days: 0,
            records: 0,
            dry_run: target.dry_run,
        })
    }

    fn add_column(
        &self,
        target: &Target,
        column_name: &str,
        column_type: ColumnType,
    ) -> ApplicationResult<AddColumnReport> {
        self.calls.borrow_mut().push(Call::AddColumn {
            target: target.clone(),
            column_name: column_name.into(),
            column_type,
        });
        Ok(AddColumnReport {
            table: "archive".into(),
            column: column_name.into(),
            column_type,
            summary_added: false,
            dry_run: target.dry_run,
        })
    }

    fn rename_column(
        &self,
        target: &Target,
        column_name: &str,
        new_name: &str,
    ) -> ApplicationResult<RenameColumnReport> {
        self.calls.borrow_mut().push(Call::RenameColumn {
            target: target.clone(),
            column_name: column_name.into(),
            new_name: new_name.into(),
        });
        Ok(RenameColumnReport {
            table: "archive".into(),
            from: column_name.into(),
            to: new_name.into(),
            summary_renamed: false,
            dry_run: target.dry_run,
        })
    }

    fn drop_columns(
        &self,
        target: &Target,
        column_names: &[String],
    ) -> ApplicationResult<DropColumnsReport> {
        self.calls.borrow_mut().push(Call::DropColumns {
            target: target.clone(),
            column_names: column_names.to_vec(),
        });
        Ok(DropColumnsReport {
            table: "archive".into(),
            dropped: column_names.to_vec(),
            skipped: vec![],
            dry_run: target.dry_run,
        })
    }
}

fn dispatch(argv: &[&str]) -> Call {
    init_test_setup();
    let cli = Cli::try_parse_from(argv).expect("parse args");
    let actions = RecordingActions::default();
    execute_command(&cli, &actions).expect("dispatch");
    actions.single_call()
}

fn target(config: &str, binding: &str, dry_run: bool) -> Target {
    Target::new(binding).with_config(config).dry_run(dry_run)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn given_create_with_all_flags_when_dispatching_then_forwards_target() {
    let call = dispatch(&[
        "wxctl", "database", "create", "--config", "/etc/wx.toml", "--binding", "alt",
        "--dry-run",
    ]);
    assert_eq!(call, Call::Create(target("/etc/wx.toml", "alt", true)));
}

#[test]
fn given_create_without_binding_when_dispatching_then_uses_wx_binding() {
    let call = dispatch(&["wxctl", "database", "create", "--config", "/etc/wx.toml"]);
    assert_eq!(call, Call::Create(target("/etc/wx.toml", "wx_binding", false)));
}

#[test]
fn given_drop_daily_when_dispatching_then_forwards_target() {
    let call = dispatch(&[
        "wxctl", "database", "drop-daily", "--config", "c.toml", "--dry-run",
    ]);
    assert_eq!(call, Call::DropDaily(target("c.toml", "wx_binding", true)));
}

#[test]
fn given_rebuild_with_single_date_when_dispatching_then_forwards_date_only() {
    let call = dispatch(&[
        "wxctl", "database", "rebuild-daily", "--config", "c.toml", "--date", "2024-03-01",
    ]);
    assert_eq!(
        call,
        Call::RebuildDaily {
            target: target("c.toml", "wx_binding", false),
            date: Some(date("2024-03-01")),
            from_date: None,
            to_date: None,
        }
    );
}

#[test]
fn given_rebuild_with_range_when_dispatching_then_forwards_from_and_to() {
    let call = dispatch(&[
        "wxctl", "database", "rebuild-daily", "--config", "c.toml", "--binding", "b",
        "--from", "2024-01-01", "--to", "2024-01-31", "--dry-run",
    ]);
    assert_eq!(
        call,
        Call::RebuildDaily {
            target: target("c.toml", "b", true),
            date: None,
            from_date: Some(date("2024-01-01")),
            to_date: Some(date("2024-01-31")),
        }
    );
}

#[test]
fn given_rebuild_without_dates_when_dispatching_then_forwards_none() {
    let call = dispatch(&["wxctl", "database", "rebuild-daily", "--config", "c.toml"]);
    assert_eq!(
        call,
        Call::RebuildDaily {
            target: target("c.toml", "wx_binding", false),
            date: None,
            from_date: None,
            to_date: None,
        }
    );
}

#[rstest]
#[case(None, ColumnType::Real)]
#[case(Some("REAL"), ColumnType::Real)]
#[case(Some("real"), ColumnType::Real)]
#[case(Some("INTEGER"), ColumnType::Integer)]
#[case(Some("integer"), ColumnType::Integer)]
#[case(Some("INT"), ColumnType::Integer)]
#[case(Some("int"), ColumnType::Integer)]
fn given_add_column_type_when_dispatching_then_normalizes_type(
    #[case] type_arg: Option<&str>,
    #[case] expected: ColumnType,
) {
    let mut argv = vec!["wxctl", "database", "add-column", "soilTemp1", "--config", "c.toml"];
    if let Some(t) = type_arg {
        argv.extend(["--type", t]);
    }
    let call = dispatch(&argv);
    assert_eq!(
        call,
        Call::AddColumn {
            target: target("c.toml", "wx_binding", false),
            column_name: "soilTemp1".into(),
            column_type: expected,
        }
    );
}

#[test]
fn given_rename_column_when_dispatching_then_forwards_old_and_new_name() {
    let call = dispatch(&[
        "wxctl", "database", "rename-column", "luminosity", "--to-name", "illuminance",
        "--config", "c.toml", "--dry-run",
    ]);
    assert_eq!(
        call,
        Call::RenameColumn {
            target: target("c.toml", "wx_binding", true),
            column_name: "luminosity".into(),
            new_name: "illuminance".into(),
        }
    );
}

#[test]
fn given_drop_columns_when_dispatching_then_forwards_all_names_in_order() {
    let call = dispatch(&[
        "wxctl", "database", "drop-columns", "soilTemp1", "batteryStatus5", "leafWet1",
        "--config", "c.toml",
    ]);
    assert_eq!(
        call,
        Call::DropColumns {
            target: target("c.toml", "wx_binding", false),
            column_names: vec!["soilTemp1".into(), "batteryStatus5".into(), "leafWet1".into()],
        }
    );
}

#[test]
fn given_provider_error_when_dispatching_then_surfaces_with_exit_code() {
    init_test_setup();
    let cli = Cli::try_parse_from(["wxctl", "database", "create", "--config", "c.toml"]).unwrap();
    let actions = RecordingActions {
        fail_create: true,
        ..Default::default()
    };
    let err = execute_command(&cli, &actions).unwrap_err();
    assert_eq!(err.exit_code(), wxctl::exitcode::CANTCREAT);
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn given_no_command_when_dispatching_then_usage_error() {
    let cli = Cli::try_parse_from(["wxctl"]).unwrap();
    let actions = RecordingActions::default();
    let err = execute_command(&cli, &actions).unwrap_err();
    assert!(matches!(err, CliError::Usage(_)));
    assert!(actions.calls.borrow().is_empty());
}
