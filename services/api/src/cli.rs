use crate::demo::{run_demo, DemoArgs};
use crate::infra::{parse_date, parse_kind, parse_venue, ClubGateway};
use crate::server;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clube_admin::access::{AccessEvaluator, PersonKind, Venue};
use clube_admin::config::AppConfig;
use clube_admin::elections::ElectionService;
use clube_admin::error::AppError;
use serde::Serialize;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "Club Administration",
    about = "Run the club administration API or query access and election decisions from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Check whether a person may enter a venue
    Access {
        #[command(subcommand)]
        command: AccessCommand,
    },
    /// Inspect election results
    Election {
        #[command(subcommand)]
        command: ElectionCommand,
    },
    /// Walk through front-desk, dues and election workflows on seeded data
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum AccessCommand {
    /// Evaluate eligibility without recording a passage
    Evaluate(EvaluateArgs),
}

#[derive(Subcommand, Debug)]
enum ElectionCommand {
    /// Print the vote tally for an election
    Result(ElectionResultArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Member or dependent id
    pub(crate) person_id: String,
    /// member or dependent (Portuguese names accepted)
    #[arg(long, value_parser = parse_kind, default_value = "member")]
    pub(crate) kind: PersonKind,
    /// club, pool or gym (Portuguese names accepted)
    #[arg(long, value_parser = parse_venue, default_value = "club")]
    pub(crate) venue: Venue,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ElectionResultArgs {
    pub(crate) election_id: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Access {
            command: AccessCommand::Evaluate(args),
        } => run_evaluate(args).await,
        Command::Election {
            command: ElectionCommand::Result(args),
        } => run_election_result(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

fn connect() -> Result<Arc<ClubGateway>, AppError> {
    let config = AppConfig::load()?;
    Ok(Arc::new(ClubGateway::connect(&config)?))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let evaluator = AccessEvaluator::new(connect()?);
    let decision = match args.today {
        Some(today) => {
            evaluator
                .evaluate_on(&args.person_id, args.kind, args.venue, today)
                .await?
        }
        None => {
            evaluator
                .evaluate(&args.person_id, args.kind, args.venue)
                .await?
        }
    };
    print_json(&decision)
}

async fn run_election_result(args: ElectionResultArgs) -> Result<(), AppError> {
    let tally = ElectionService::new(connect()?)
        .tally(&args.election_id)
        .await?;
    print_json(&tally)
}
