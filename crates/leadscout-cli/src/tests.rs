use super::*;

#[test]
fn parses_run_command_with_catalog() {
    let cli = Cli::try_parse_from([
        "leadscout-cli",
        "run",
        "--profile",
        "profile.json",
        "--catalog",
        "signals.yaml",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Run {
            ref profile,
            catalog: Some(ref catalog),
            json: false,
        } if profile == &PathBuf::from("profile.json") && catalog == &PathBuf::from("signals.yaml")
    ));
}

#[test]
fn run_requires_profile() {
    assert!(Cli::try_parse_from(["leadscout-cli", "run"]).is_err());
}

#[test]
fn parses_run_json_flag() {
    let cli = Cli::try_parse_from(["leadscout-cli", "run", "--profile", "p.json", "--json"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Run {
            catalog: None,
            json: true,
            ..
        }
    ));
}

#[test]
fn parses_catalog_command() {
    let cli = Cli::try_parse_from(["leadscout-cli", "catalog", "config/signals.yaml"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Catalog { .. }));
}

#[test]
fn parses_migrate_and_purge_commands() {
    let migrate = Cli::try_parse_from(["leadscout-cli", "migrate"]).expect("migrate");
    assert!(matches!(migrate.command, Commands::Migrate));

    let purge = Cli::try_parse_from(["leadscout-cli", "purge"]).expect("purge");
    assert!(matches!(purge.command, Commands::Purge));
}

#[test]
fn status_parses_job_id() {
    let id = Uuid::new_v4();
    let cli = Cli::try_parse_from(["leadscout-cli", "status", &id.to_string()])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Status { job_id } if job_id == id));
}

#[test]
fn status_rejects_malformed_job_id() {
    assert!(Cli::try_parse_from(["leadscout-cli", "status", "not-a-uuid"]).is_err());
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["leadscout-cli"]).is_err());
}
