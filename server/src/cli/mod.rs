//! Implementations of the command line subcommands, apart from `serve`
pub mod database_migration;
pub mod manage_bookings;
