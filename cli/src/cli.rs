use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use pawever_core::config::{API_BASE_URL_ENV_VAR, DEFAULT_API_BASE_URL};
use pawever_core::{Envelope, LoginUser, PawEverClient, Query, RegisterUser, Role, Transport};

#[derive(Debug, Parser)]
#[command(name = "pawever", version, about = "PawEver clinic API client")]
pub struct Cli {
    /// Root address of the PawEver backend
    #[arg(long, global = true, env = API_BASE_URL_ENV_VAR, default_value = DEFAULT_API_BASE_URL)]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Role,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Role,
    },
    /// Appointment operations
    #[command(subcommand)]
    Appointments(AppointmentCommand),
    /// Pet operations
    #[command(subcommand)]
    Pets(PetCommand),
    /// User profile operations
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// List users
    Users(FilterArgs),
    /// Record a consultation
    Consult(DataArgs),
}

#[derive(Debug, Subcommand)]
pub enum AppointmentCommand {
    List(FilterArgs),
    Create(DataArgs),
    Update {
        id: String,
        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum PetCommand {
    List(FilterArgs),
    Create(DataArgs),
    Delete {
        id: String,
        /// Also remove the pet's appointments
        #[arg(long)]
        cascade: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Get {
        id: String,
    },
    Update {
        id: String,
        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Filter as key=value; repeatable
    #[arg(long = "filter", short = 'f', value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct DataArgs {
    /// Request body as a JSON object
    #[arg(long, value_parser = parse_json_object)]
    pub data: Value,
}

pub fn parse_filter(s: &str) -> Result<(String, String)> {
    let Some((key, value)) = s.split_once('=') else {
        bail!("expected key=value, got `{s}`");
    };
    if key.is_empty() {
        bail!("filter key is empty in `{s}`");
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn parse_json_object(s: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(s).context("--data is not valid JSON")?;
    if !value.is_object() {
        bail!("--data must be a JSON object");
    }
    Ok(value)
}

impl FilterArgs {
    fn query(&self) -> Query {
        self.filters.iter().cloned().collect()
    }
}

/// Execute one command against `client`.
pub fn run<T: Transport>(client: &PawEverClient<T>, command: Command) -> Result<Envelope> {
    debug!(?command, base_url = client.base_url(), "running command");
    let envelope = match command {
        Command::Register {
            name,
            email,
            password,
            role,
        } => client.register_user(&RegisterUser {
            name,
            email,
            password,
            role,
        })?,
        Command::Login {
            email,
            password,
            role,
        } => client.login_user(&LoginUser {
            email,
            password,
            role,
        })?,
        Command::Appointments(AppointmentCommand::List(filter)) => {
            client.list_appointments(&filter.query())?
        }
        Command::Appointments(AppointmentCommand::Create(data)) => {
            client.create_appointment(&data.data)?
        }
        Command::Appointments(AppointmentCommand::Update { id, data }) => {
            client.update_appointment_by_id(&id, &data.data)?
        }
        Command::Pets(PetCommand::List(filter)) => client.list_pets(&filter.query())?,
        Command::Pets(PetCommand::Create(data)) => client.create_pet(&data.data)?,
        Command::Pets(PetCommand::Delete { id, cascade }) => {
            let flags = if cascade {
                Query::new().param("cascade", true)
            } else {
                Query::new()
            };
            client.delete_pet_by_id(&id, &flags)?
        }
        Command::Profile(ProfileCommand::Get { id }) => client.get_user_profile(&id)?,
        Command::Profile(ProfileCommand::Update { id, data }) => {
            client.update_user_profile(&id, &data.data)?
        }
        Command::Users(filter) => client.list_users(&filter.query())?,
        Command::Consult(data) => client.create_consultation(&data.data)?,
    };
    Ok(envelope)
}
