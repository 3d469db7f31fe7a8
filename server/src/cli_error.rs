use crate::data_store::StoreError;
use crate::setup::SetupError;
use diesel::ConnectionError;

/// Failure of a command line subcommand, terminating the process with [CliError::exit_code]
#[derive(Debug)]
pub enum CliError {
    /// A configuration variable is missing or malformed
    SetupError(String),
    /// The PostgreSQL server is unreachable or refused the connection
    CouldNotConnectToDatabase(String),
    /// A data store query failed for a reason the command cannot handle
    UnexpectedStoreError(String),
    /// The HTTP listener could not be bound to the configured address and port
    BindError(std::io::Error),
    /// The HTTP server stopped with an io error
    ServerError(std::io::Error),
    /// Applying the embedded schema migrations failed
    DatabaseMigrationError(String),
    /// The schema is outdated, so the booking service refuses to serve requests
    DatabaseMigrationRequired {
        missing_migrations: Vec<String>,
    },
    /// The requested table or reservation is missing, or a booking rule rejected the command
    DataError(String),
}

impl CliError {
    /// Process exit code: 1 for invalid input or configuration, 2 for store failures, 3 for the
    /// HTTP server, 4 for database availability or migration, 5 for an outdated schema
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SetupError(_) | CliError::DataError(_) => 1,
            CliError::UnexpectedStoreError(_) => 2,
            CliError::BindError(_) | CliError::ServerError(_) => 3,
            CliError::CouldNotConnectToDatabase(_) | CliError::DatabaseMigrationError(_) => 4,
            CliError::DatabaseMigrationRequired { .. } => 5,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::SetupError(e) => write!(f, "Configuration error: {}", e),
            CliError::CouldNotConnectToDatabase(e) => {
                write!(f, "PostgreSQL database is not available: {}", e)
            }
            CliError::DatabaseMigrationRequired { missing_migrations } => write!(
                f,
                "The booking database schema is outdated ({} pending). Run `table-booking \
                 migrate-database` before serving.",
                missing_migrations.join(", ")
            ),
            CliError::DataError(e) => write!(f, "Booking data rejected: {}", e),
            CliError::DatabaseMigrationError(e) => {
                write!(f, "Migrating the booking database failed: {}", e)
            }
            CliError::UnexpectedStoreError(e) => write!(f, "Booking store failure: {}", e),
            CliError::BindError(e) => write!(f, "Cannot listen for HTTP requests: {}", e),
            CliError::ServerError(e) => write!(f, "HTTP server stopped: {}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConnectionError(e) => Self::CouldNotConnectToDatabase(e),
            StoreError::QueryError(e) => Self::UnexpectedStoreError(e.to_string()),
            StoreError::TransactionConflict => {
                Self::UnexpectedStoreError("serialization conflict with another booking".to_owned())
            }
            StoreError::NotExisting => Self::DataError("no such table or reservation".to_owned()),
            e @ StoreError::ReferencedTableMissing(_)
            | e @ StoreError::SlotTaken
            | e @ StoreError::OverlapConstraintViolated
            | e @ StoreError::TableInUse(_) => Self::DataError(e.to_string()),
            StoreError::InvalidInputData(e) => Self::DataError(e),
            StoreError::InvalidDataInDatabase(e) => Self::UnexpectedStoreError(e),
        }
    }
}

impl From<SetupError> for CliError {
    fn from(e: SetupError) -> Self {
        Self::SetupError(e.to_string())
    }
}

impl From<ConnectionError> for CliError {
    fn from(e: ConnectionError) -> Self {
        Self::CouldNotConnectToDatabase(e.to_string())
    }
}
