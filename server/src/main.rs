use clap::ArgAction;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::{error, warn};
use table_booking_server::cli;
use table_booking_server::cli_error::CliError;

fn main() {
    let args = CliArgs::parse();
    let dotenv_result = dotenv();

    let env = env_logger::Env::new().filter_or(
        "RUST_LOG",
        match args.global_opts.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    );
    env_logger::Builder::from_env(env).init();
    if let Err(e) = dotenv_result {
        warn!("Could not read .env file: {}", e);
    }

    if let Err(e) = run_command(args.command) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run_command(command: Command) -> Result<(), CliError> {
    match command {
        Command::Serve => table_booking_server::web::serve(),
        Command::MigrateDatabase => cli::database_migration::run_migrations(),
        Command::ListTables => cli::manage_bookings::print_table_list(),
        Command::ListReservations { table } => cli::manage_bookings::print_reservation_list(table),
    }
}

/// Restaurant table booking service
#[derive(Debug, Parser)]
#[clap(name = "table-booking", version)]
pub struct CliArgs {
    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the table booking HTTP API
    Serve,
    /// Migrate the database schema to the current version
    MigrateDatabase,
    /// List all tables
    ListTables,
    /// List reservations, in chronological order
    ListReservations {
        /// Only list the reservations of the table with this id
        #[clap(long)]
        table: Option<i32>,
    },
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Verbosity level (can be specified multiple times)
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,
}
