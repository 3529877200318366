use crate::commands::{
    run_contact, run_data, run_questions, run_schema, run_score, run_scores, run_subscribe,
    ContactArgs, DataCommand, SchemaCommand, ScoreArgs, ScoresArgs, SubscribeArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use econ_mood::error::AppError;
use econ_mood::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Economic Mood Checker",
    about = "Score everyday economic questions from indicator data, over HTTP or the command line",
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
    /// Score a single question
    Score(ScoreArgs),
    /// Score every question in the catalog
    Scores(ScoresArgs),
    /// List the question catalog and the series behind each question
    Questions,
    /// Inspect or reload the indicator dataset
    Data {
        #[command(subcommand)]
        command: DataCommand,
    },
    /// Work with the indicator metadata schema
    Schema {
        #[command(subcommand)]
        command: SchemaCommand,
    },
    /// Submit an email subscription to the configured endpoint
    Subscribe(SubscribeArgs),
    /// Submit a contact message to the configured endpoint
    Contact(ContactArgs),
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    if !matches!(command, Command::Serve(_)) {
        telemetry::init_for_cli()?;
    }

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args).await,
        Command::Scores(args) => run_scores(args).await,
        Command::Questions => run_questions(),
        Command::Data { command } => run_data(command).await,
        Command::Schema { command } => run_schema(command).await,
        Command::Subscribe(args) => run_subscribe(args).await,
        Command::Contact(args) => run_contact(args).await,
    }
}
