//! A command-line front end for the election management API.
//! It owns the login flow (writing the token store) and renders what the
//! client fetches as election cards.

use std::io::IsTerminal;

use chrono::{Local, NaiveDate};
use clap::{Arg, ArgAction, ArgMatches, Command};
use thiserror::Error;

use election_client::{
    credentials::{StoreError, AUTH_TOKEN_KEY},
    error::ConfigError,
    model::Election,
    view::{ElectionCard, StatusCategory},
    ApiClient, ClientConfig, FileStore,
};

const PROGRAM_NAME: &str = "election-cli";

const ABOUT_TEXT: &str = "Manage elections through the election API.

The backend is configured via `Client.toml` or ELECTION_BASE_URL.

EXIT CODES:
     0: Success.
     1: Error.
     2: Not logged in; run `login` first.";

const LOG_CONFIG: &str = "log4rs.yaml";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../../Cargo.toml");

    let date = |name: &'static str, help: &'static str| {
        Arg::new(name)
            .long(name)
            .help(help)
            .value_name("YYYY-MM-DD")
            .value_parser(parse_date)
    };

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .subcommand_required(true)
        .subcommand(
            Command::new("login")
                .about("Store an API token for subsequent commands")
                .arg(Arg::new("token").action(ArgAction::Set).required(true)),
        )
        .subcommand(Command::new("logout").about("Forget the stored API token"))
        .subcommand(
            Command::new("elections")
                .about("List all elections")
                .arg(date("today", "Classify elections relative to this day")),
        )
        .subcommand(
            Command::new("create")
                .about("Create a new election")
                .arg(
                    Arg::new("title")
                        .long("title")
                        .action(ArgAction::Set)
                        .required(true),
                )
                .arg(date("start", "First day of voting").required(true))
                .arg(date("end", "Last day of voting").required(true))
                .arg(
                    Arg::new("position")
                        .long("position")
                        .help("A position being elected; repeat for several")
                        .action(ArgAction::Append)
                        .required(true),
                ),
        )
        .subcommand(Command::new("students").about("List all students as JSON lines"))
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
}

/// Errors that this program may produce.
#[derive(Debug, Error)]
enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Api(#[from] election_client::Error),
    #[error("Invalid input: {0}")]
    Input(String),
}

impl Error {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Api(err) if err.is_unauthenticated() => 2,
            _ => 1,
        }
    }
}

/// Build an `Election` from the `create` arguments.
fn election_from_args(args: &ArgMatches) -> Result<Election, Error> {
    // Required arguments are guaranteed to be present.
    let title: &String = args.get_one("title").unwrap();
    let start: NaiveDate = *args.get_one("start").unwrap();
    let end: NaiveDate = *args.get_one("end").unwrap();
    let positions: Vec<String> = args.get_many::<String>("position").unwrap().cloned().collect();

    if end < start {
        return Err(Error::Input(format!(
            "election ends ({end}) before it starts ({start})"
        )));
    }
    Ok(Election::new(title.clone(), start, end, positions))
}

async fn execute(args: &ArgMatches) -> Result<(), Error> {
    let config = ClientConfig::load()?;
    let store = FileStore::new(config.storage_path());

    match args.subcommand() {
        Some(("login", sub)) => {
            let token: &String = sub.get_one("token").unwrap();
            store.set(AUTH_TOKEN_KEY, token)?;
            println!("Logged in.");
        }
        Some(("logout", _)) => {
            if store.remove(AUTH_TOKEN_KEY)? {
                println!("Logged out.");
            } else {
                println!("Not logged in.");
            }
        }
        Some(("elections", sub)) => {
            let today = sub
                .get_one::<NaiveDate>("today")
                .copied()
                .unwrap_or_else(|| Local::now().date_naive());
            let client = ApiClient::new(config, store);
            let elections = client.elections().list().await?;

            let colour = std::io::stdout().is_terminal();
            for election in &elections {
                let status = StatusCategory::classify(election, today);
                let view = ElectionCard::new(election, |_: &Election| {}, status).render();
                if colour {
                    println!("{}", view.to_ansi_string());
                } else {
                    println!("{view}");
                }
            }
            if elections.is_empty() {
                println!("No elections.");
            }
        }
        Some(("create", sub)) => {
            let election = election_from_args(sub)?;
            let client = ApiClient::new(config, store);
            let confirmation = client.elections().create(&election).await?;
            println!("{confirmation:#}");
        }
        Some(("students", _)) => {
            let client = ApiClient::new(config, store);
            for student in client.students().list().await? {
                println!("{}", serde_json::Value::Object(student.into_attributes()));
            }
        }
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}

/// Run the requested command, report any failure, and return the exit code.
async fn run(args: &ArgMatches) -> u8 {
    match execute(args).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            if err.exit_code() == 2 {
                eprintln!("Run `{PROGRAM_NAME} login <TOKEN>` first.");
            }
            err.exit_code()
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = election_client::logging::init(LOG_CONFIG) {
        eprintln!("Failed to initialise logging: {err}");
    }

    let args = cli().get_matches();
    let exit_code = run(&args).await;
    std::process::exit(exit_code.into())
}
