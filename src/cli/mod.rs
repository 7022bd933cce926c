//! DSC-050: CLI subcommands — get, set, script.

use crate::codegen;
use crate::core::mapper::{should_to_resource, NAME_PROPERTY};
use crate::core::provider::DscProvider;
use crate::core::{parser, types};
use crate::error::BridgeError;
use crate::transport::local::LocalInterpreter;
use clap::{Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query the current state of one resource instance
    Get {
        /// Resource schema (YAML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Instance title
        #[arg(short, long)]
        name: String,

        /// Identity properties (YAML); defaults to just the title
        #[arg(short, long)]
        identity: Option<PathBuf>,

        /// Bridge configuration
        #[arg(short, long, default_value = "dscbridge.yaml")]
        config: PathBuf,
    },

    /// Converge one resource instance to its desired state
    Set {
        /// Resource schema (YAML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Desired state (YAML)
        #[arg(short, long)]
        resource: PathBuf,

        /// Bridge configuration
        #[arg(short, long, default_value = "dscbridge.yaml")]
        config: PathBuf,
    },

    /// Print the generated script (secrets redacted) without running it
    Script {
        /// Resource schema (YAML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Desired state or identity (YAML)
        #[arg(short, long)]
        resource: PathBuf,

        /// Invoke-DscResource method
        #[arg(short, long, value_enum, default_value_t = Method::Set)]
        method: Method,

        /// Bridge configuration
        #[arg(short, long, default_value = "dscbridge.yaml")]
        config: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Set,
}

impl From<Method> for types::InvokeMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => Self::Get,
            Method::Set => Self::Set,
        }
    }
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), BridgeError> {
    match cmd {
        Commands::Get {
            schema,
            name,
            identity,
            config,
        } => cmd_get(&schema, &name, identity.as_deref(), &config),
        Commands::Set {
            schema,
            resource,
            config,
        } => cmd_set(&schema, &resource, &config),
        Commands::Script {
            schema,
            resource,
            method,
            config,
        } => cmd_script(&schema, &resource, method, &config),
    }
}

fn load_provider(
    schema: &Path,
    config: &Path,
) -> Result<DscProvider<LocalInterpreter>, BridgeError> {
    let schema = parser::parse_schema_file(schema)?;
    let config = parser::parse_config_file(config)?;
    let interpreter = LocalInterpreter::from_config(&config.interpreter);
    Ok(DscProvider::new(
        schema,
        interpreter,
        config.vendored_modules_path(),
    ))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), BridgeError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_get(
    schema: &Path,
    name: &str,
    identity: Option<&Path>,
    config: &Path,
) -> Result<(), BridgeError> {
    let mut provider = load_provider(schema, config)?;
    let mut id = match identity {
        Some(path) => parser::parse_properties_file(path)?,
        None => types::Properties::new(),
    };
    id.insert(NAME_PROPERTY, types::PsValue::from(name));

    let results = provider.get(std::slice::from_ref(&id))?;
    for result in &results {
        print_json(&result.to_record())?;
    }
    Ok(())
}

fn cmd_set(schema: &Path, resource: &Path, config: &Path) -> Result<(), BridgeError> {
    let mut provider = load_provider(schema, config)?;
    let should = parser::parse_properties_file(resource)?;
    let result = provider.apply(&should)?;
    print_json(&result)
}

fn cmd_script(
    schema: &Path,
    resource: &Path,
    method: Method,
    config: &Path,
) -> Result<(), BridgeError> {
    let schema = parser::parse_schema_file(schema)?;
    let config = parser::parse_config_file(config)?;
    let should = parser::parse_properties_file(resource)?;
    let descriptor = should_to_resource(
        &should,
        &schema,
        method.into(),
        &config.vendored_modules_path(),
    )?;
    let script = codegen::assemble(&descriptor)?;
    print!("{}", script.redacted);
    Ok(())
}
