//! Tests for the clap schema of the `database` command group

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use wxctl::cli::args::{Cli, Commands, DatabaseCommands, EPILOG};

fn parse(argv: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(argv)
}

fn database_command(argv: &[&str]) -> DatabaseCommands {
    match parse(argv).expect("parse").command {
        Some(Commands::Database { command }) => command,
        other => panic!("expected database command, got {other:?}"),
    }
}

#[test]
fn given_cli_definition_then_passes_clap_debug_assert() {
    Cli::command().debug_assert();
}

#[test]
fn given_date_with_from_when_parsing_then_conflict() {
    let err = parse(&[
        "wxctl", "database", "rebuild-daily", "--date", "2024-03-01", "--from", "2024-03-01",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn given_date_with_to_when_parsing_then_conflict() {
    let err = parse(&[
        "wxctl", "database", "rebuild-daily", "--to", "2024-03-01", "--date", "2024-03-01",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn given_malformed_date_when_parsing_then_value_error() {
    let err = parse(&["wxctl", "database", "rebuild-daily", "--date", "01/03/2024"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn given_rename_without_to_name_when_parsing_then_missing_argument() {
    let err = parse(&["wxctl", "database", "rename-column", "outTemp"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn given_drop_columns_without_names_when_parsing_then_missing_argument() {
    let err = parse(&["wxctl", "database", "drop-columns"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn given_unknown_column_type_when_parsing_then_invalid_value() {
    let err = parse(&["wxctl", "database", "add-column", "x", "--type", "TEXT"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn given_mixed_case_type_when_parsing_then_accepted_verbatim() {
    match database_command(&["wxctl", "database", "add-column", "x", "--type", "Int"]) {
        DatabaseCommands::AddColumn { column_type, .. } => assert_eq!(column_type, "Int"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn given_no_action_when_parsing_database_then_error() {
    assert!(parse(&["wxctl", "database"]).is_err());
}

#[test]
fn given_verbose_flags_after_subcommand_when_parsing_then_counted() {
    let cli = parse(&["wxctl", "database", "create", "-vv"]).unwrap();
    assert_eq!(cli.verbose, 2);
}

#[test]
fn given_database_help_then_shows_backup_epilog() {
    let mut cmd = Cli::command();
    let database = cmd.find_subcommand_mut("database").expect("database subcommand");
    let create = database.find_subcommand_mut("create").expect("create subcommand");
    let help = create.render_help().to_string();
    assert!(help.contains(EPILOG));
    assert!(help.contains("--binding <BINDING-NAME>"));
    assert!(help.contains("[default: wx_binding]"));
}

#[test]
fn given_database_group_then_has_six_actions() {
    let cmd = Cli::command();
    let database = cmd
        .get_subcommands()
        .find(|c| c.get_name() == "database")
        .expect("database subcommand");
    let mut names: Vec<&str> = database
        .get_subcommands()
        .map(|c| c.get_name())
        .filter(|name| *name != "help")
        .collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "add-column",
            "create",
            "drop-columns",
            "drop-daily",
            "rebuild-daily",
            "rename-column"
        ]
    );
}
