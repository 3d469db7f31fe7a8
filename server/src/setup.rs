//! Application configuration from environment variables (optionally loaded from a `.env` file
//! by the main function).
use std::env;
use std::env::VarError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 8000;
pub const DEFAULT_DATABASE_POOL_SIZE: u32 = 10;

/// Get the database URL from the environment variable.
pub fn get_database_url_from_env() -> Result<String, SetupError> {
    env::var("DATABASE_URL").map_err(|e| SetupError::from_env_error(e, "DATABASE_URL"))
}

/// Get the maximum number of pooled database connections from the environment variable
pub fn get_database_pool_size_from_env() -> Result<u32, SetupError> {
    optional_env_value(
        "DATABASE_POOL_SIZE",
        DEFAULT_DATABASE_POOL_SIZE,
        "Not a valid uint32",
    )
}

/// Get the web server TCP listening port from the environment variable
pub fn get_listen_port_from_env() -> Result<u16, SetupError> {
    optional_env_value("LISTEN_PORT", DEFAULT_LISTEN_PORT, "Not a valid uint16")
}

/// Get the web server TCP listening interface address from the environment variable
pub fn get_listen_address_from_env() -> Result<String, SetupError> {
    optional_env_value(
        "LISTEN_ADDRESS",
        DEFAULT_LISTEN_ADDRESS.to_owned(),
        "no valid address",
    )
}

fn optional_env_value<T: FromStr>(
    variable_name: &'static str,
    default: T,
    problem: &'static str,
) -> Result<T, SetupError> {
    match env::var(variable_name) {
        Err(VarError::NotPresent) => Ok(default),
        Err(e) => Err(SetupError::from_env_error(e, variable_name)),
        Ok(value) => parse_env_value(variable_name, &value, problem),
    }
}

fn parse_env_value<T: FromStr>(
    variable_name: &'static str,
    value: &str,
    problem: &'static str,
) -> Result<T, SetupError> {
    value
        .trim()
        .parse()
        .map_err(|_| SetupError::EnvVariableInvalid {
            variable_name,
            problem,
        })
}

#[derive(Debug)]
pub enum SetupError {
    EnvVariableMissing {
        variable_name: &'static str,
    },
    EnvVariableInvalid {
        variable_name: &'static str,
        problem: &'static str,
    },
}

impl SetupError {
    fn from_env_error(error: VarError, variable_name: &'static str) -> Self {
        match error {
            VarError::NotPresent => Self::EnvVariableMissing { variable_name },
            VarError::NotUnicode(_) => Self::EnvVariableInvalid {
                variable_name,
                problem: "no valid unicode",
            },
        }
    }
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::EnvVariableMissing { variable_name } => {
                write!(f, "Environment variable {} must be defined", variable_name)
            }
            SetupError::EnvVariableInvalid {
                variable_name,
                problem,
            } => write!(
                f,
                "Value of environment variable {} is invalid: {}",
                variable_name, problem
            ),
        }
    }
}

impl std::error::Error for SetupError {}
