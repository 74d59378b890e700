use crate::demo::{run_demo, run_price, DemoArgs, PriceArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rent_pricing::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Rent Pricing Engine",
    about = "Price multifamily units from a rent roll or serve the pricing API",
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
    /// Price every unit in a rent roll export
    Price(PriceArgs),
    /// Price a built-in three-tier sample community
    Demo(DemoArgs),
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
        Command::Price(args) => run_price(args),
        Command::Demo(args) => run_demo(args),
    }
}
