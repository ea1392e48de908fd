use crate::demo::{run_cv_directory, run_cv_score, run_demo, DemoArgs, DirectoryArgs, ScoreArgs};
use crate::server;
use affittochiaro::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Affittochiaro",
    about = "Serve and inspect tenant CVs and their completeness score",
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
    /// Score CV documents and browse the agency directory offline
    Cv {
        #[command(subcommand)]
        command: CvCommand,
    },
    /// Walk a tenant through filling in their CV and show the score after each step
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CvCommand {
    /// Score a CV stored as JSON
    Score(ScoreArgs),
    /// List tenant CVs the way agencies see them
    Directory(DirectoryArgs),
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
        Command::Cv {
            command: CvCommand::Score(args),
        } => run_cv_score(args),
        Command::Cv {
            command: CvCommand::Directory(args),
        } => run_cv_directory(args),
        Command::Demo(args) => run_demo(args),
    }
}
