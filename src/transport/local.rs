//! DSC-031: Local interpreter process.

use super::{ExecOutput, Interpreter};
use crate::core::types::InterpreterConfig;
use crate::error::BridgeError;
use std::io::Write;
use std::process::{Command, Stdio};

/// Runs each script in a fresh interpreter process, fed through stdin.
///
/// No process is kept between calls, so nothing defined by one script is
/// visible to the next. Generated scripts are self-contained and rely on that.
/// Callers that want one long-lived PowerShell session can supply their own
/// [`Interpreter`] that pools or reuses a process.
#[derive(Debug, Clone)]
pub struct LocalInterpreter {
    program: String,
    args: Vec<String>,
}

impl LocalInterpreter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &InterpreterConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Interpreter for LocalInterpreter {
    fn execute(&mut self, script: &str) -> Result<ExecOutput, BridgeError> {
        tracing::trace!(program = %self.program, bytes = script.len(), "spawning interpreter");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Dropped after writing so the interpreter sees end of input
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        let out = ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        if !out.success() {
            tracing::debug!(
                program = %self.program,
                exit_code = out.exit_code,
                stderr = %out.stderr.trim(),
                "interpreter exited with failure"
            );
        }
        Ok(out)
    }
}
