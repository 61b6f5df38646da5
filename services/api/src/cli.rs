use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand, ValueEnum};
use shiftwise::error::AppError;
use shiftwise::scheduling::VacationOverlapPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "Shiftwise",
    about = "Run the shift scheduling service or walk through its rules from the command line",
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
    /// Seed a sample team and walk through assignment and vacation scenarios
    Demo(DemoArgs),
}

/// Command-line spelling of the vacation overlap policy.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OverlapPolicyArg {
    Record,
    Reject,
}

impl From<OverlapPolicyArg> for VacationOverlapPolicy {
    fn from(value: OverlapPolicyArg) -> Self {
        match value {
            OverlapPolicyArg::Record => VacationOverlapPolicy::Record,
            OverlapPolicyArg::Reject => VacationOverlapPolicy::Reject,
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override how approvals treat overlapping approved vacations
    #[arg(long, value_enum)]
    pub(crate) overlap_policy: Option<OverlapPolicyArg>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
    }
}
