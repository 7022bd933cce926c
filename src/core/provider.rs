//! DSC-040: Reconciliation driver — get and set through Invoke-DscResource.
//!
//! get: identity → mapper → codegen → interpreter → canonical result
//! set: desired state → mapper → codegen → interpreter → set result
//!
//! Create, update and delete are the same set call. Which one applies is the
//! caller's decision; DSC only ever sees the desired state.

use super::mapper::{should_to_resource, NAME_PROPERTY};
use super::types::*;
use crate::codegen;
use crate::error::BridgeError;
use crate::transport::Interpreter;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Prefix of every canonical property key.
const CANONICAL_PREFIX: &str = "dsc_";

/// Payload key carrying the failure reported by Invoke-DscResource.
const ERROR_MESSAGE_KEY: &str = "errormessage";

/// Drives one DSC resource type through an interpreter.
pub struct DscProvider<I: Interpreter> {
    schema: ResourceSchema,
    interpreter: I,
    modules_path: PathBuf,
}

impl<I: Interpreter> DscProvider<I> {
    pub fn new(schema: ResourceSchema, interpreter: I, modules_path: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            interpreter,
            modules_path: modules_path.into(),
        }
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn modules_path(&self) -> &Path {
        &self.modules_path
    }

    /// Query the current state of each identity, in order.
    pub fn get(&mut self, names: &[Properties]) -> Result<Vec<CanonicalResult>, BridgeError> {
        names.iter().map(|identity| self.invoke_get(identity)).collect()
    }

    /// Query one instance. Only namevar properties are sent.
    pub fn invoke_get(&mut self, identity: &Properties) -> Result<CanonicalResult, BridgeError> {
        let namevars = self.schema.namevars();
        let mut query = Properties::new();
        for (key, value) in identity.iter() {
            if namevars.contains(&key.as_str()) {
                query.insert(key.clone(), value.clone());
            }
        }
        let descriptor =
            should_to_resource(&query, &self.schema, InvokeMethod::Get, &self.modules_path)?;

        let stdout = self.run(&descriptor)?;
        let data: Option<serde_json::Map<String, Value>> = serde_json::from_str(stdout.trim())
            .map_err(|source| BridgeError::Protocol { source })?;
        tracing::debug!(resource = %self.schema.name, data = ?data, "get returned");

        let result = self.canonicalize(identity, data.unwrap_or_default())?;
        tracing::debug!(
            resource = %self.schema.name,
            presence = %result.presence,
            record = ?result.to_record(),
            "canonical result"
        );
        Ok(result)
    }

    fn canonicalize(
        &self,
        identity: &Properties,
        mut data: serde_json::Map<String, Value>,
    ) -> Result<CanonicalResult, BridgeError> {
        if let Some(Value::String(message)) = data.remove(ERROR_MESSAGE_KEY) {
            if !message.is_empty() {
                return Err(BridgeError::Primitive(message));
            }
        }

        let mut properties = IndexMap::new();
        for (key, value) in data {
            let canonical = format!("{}{}", CANONICAL_PREFIX, key.to_lowercase());
            if self.schema.attribute(&canonical).is_some() {
                properties.insert(canonical, value);
            } else {
                tracing::trace!(key = %key, "dropping key not declared by the schema");
            }
        }

        let name = match identity.get(NAME_PROPERTY) {
            Some(PsValue::String(n)) => Some(n.clone()),
            _ => None,
        };
        let presence = if properties.is_empty() {
            Presence::Absent
        } else {
            Presence::Present
        };
        Ok(CanonicalResult {
            name,
            presence,
            properties,
        })
    }

    pub fn create(&mut self, name: &str, should: &Properties) -> Result<SetResult, BridgeError> {
        tracing::info!(resource = %self.schema.name, name, "creating");
        self.invoke_set(name, should)
    }

    pub fn update(&mut self, name: &str, should: &Properties) -> Result<SetResult, BridgeError> {
        tracing::info!(resource = %self.schema.name, name, "updating");
        self.invoke_set(name, should)
    }

    /// Delete is a set with the desired state the caller supplies (normally
    /// `ensure: absent` plus the identity).
    pub fn delete(&mut self, name: &str, should: &Properties) -> Result<SetResult, BridgeError> {
        tracing::info!(resource = %self.schema.name, name, "deleting");
        self.invoke_set(name, should)
    }

    /// Converge to `should` without naming a lifecycle step.
    pub fn apply(&mut self, should: &Properties) -> Result<SetResult, BridgeError> {
        let name = match should.get(NAME_PROPERTY) {
            Some(PsValue::String(n)) => n.clone(),
            _ => self.schema.name.clone(),
        };
        self.invoke_set(&name, should)
    }

    /// The single set primitive behind create, update and delete.
    pub fn invoke_set(&mut self, name: &str, should: &Properties) -> Result<SetResult, BridgeError> {
        let descriptor =
            should_to_resource(should, &self.schema, InvokeMethod::Set, &self.modules_path)?;
        let stdout = self.run(&descriptor)?;
        let result: SetResult = serde_json::from_str(stdout.trim())
            .map_err(|source| BridgeError::Protocol { source })?;
        tracing::debug!(resource = %self.schema.name, name, result = ?result, "set returned");

        if !result.error_message.is_empty() {
            return Err(BridgeError::Primitive(result.error_message));
        }
        if result.reboot_required {
            tracing::info!(resource = %self.schema.name, name, "reboot required");
        }
        Ok(result)
    }

    fn run(&mut self, descriptor: &InvocationDescriptor) -> Result<String, BridgeError> {
        let script = codegen::assemble(descriptor)?;
        tracing::debug!(
            resource = %descriptor.name,
            method = %descriptor.method,
            "script:\n{}",
            script.redacted
        );
        let out = self.interpreter.execute(&script.text)?;
        if out.stdout.trim().is_empty() {
            return Err(BridgeError::NothingReturned { stderr: out.stderr });
        }
        Ok(out.stdout)
    }
}
