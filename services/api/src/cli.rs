use crate::demo::{run_demo, run_fitness_check, DemoArgs, FitnessArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use club_admission::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Club Admission",
    about = "Run the club admission service or exercise its rules from the command line",
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
    /// Walk a seeded family through gate entry, guest admission and birthday quota
    Demo(DemoArgs),
    /// Evaluate a medical fitness record as the gate would
    Fitness(FitnessArgs),
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

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Fitness(args) => run_fitness_check(args),
    }
}
