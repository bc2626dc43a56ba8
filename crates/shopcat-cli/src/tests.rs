use std::path::PathBuf;

use super::*;
use crate::scrape::SinkKind;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["shopcat", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Ping
        }
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["shopcat", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Migrate
        }
    ));
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["shopcat"]).is_err());
}

#[test]
fn scrape_defaults_to_csv_sink() {
    let cli = Cli::try_parse_from(["shopcat", "scrape", "--store-url", "https://drinkcann.com"])
        .unwrap();
    let Commands::Scrape(args) = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(args.store_url, "https://drinkcann.com");
    assert_eq!(args.sink, SinkKind::Csv);
    assert!(args.limit.is_none());
    assert!(args.output.is_none());
    assert!(args.config.is_none());
}

#[test]
fn scrape_accepts_all_options() {
    let cli = Cli::try_parse_from([
        "shopcat",
        "scrape",
        "--store-url",
        "drinkcann.com",
        "--limit",
        "50",
        "--sink",
        "document",
        "--output",
        "out/products.csv",
        "--config",
        "profile.yaml",
    ])
    .unwrap();
    let Commands::Scrape(args) = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(args.limit, Some(50));
    assert_eq!(args.sink, SinkKind::Document);
    assert_eq!(args.output, Some(PathBuf::from("out/products.csv")));
    assert_eq!(args.config, Some(PathBuf::from("profile.yaml")));
}

#[test]
fn scrape_rejects_unknown_sink() {
    let result = Cli::try_parse_from([
        "shopcat",
        "scrape",
        "--store-url",
        "drinkcann.com",
        "--sink",
        "mongo",
    ]);
    assert!(result.is_err());
}

#[test]
fn scrape_requires_store_url() {
    assert!(Cli::try_parse_from(["shopcat", "scrape"]).is_err());
}

#[test]
fn parses_list_with_limit() {
    let cli = Cli::try_parse_from([
        "shopcat",
        "list",
        "--store-url",
        "https://drinkcann.com",
        "--limit",
        "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::List {
            ref store_url,
            limit: Some(5)
        } if store_url == "https://drinkcann.com"
    ));
}

#[test]
fn parses_check() {
    let cli = Cli::try_parse_from(["shopcat", "check"]).unwrap();
    assert!(matches!(cli.command, Commands::Check));
}
