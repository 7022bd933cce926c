//! DSC-030: Interpreter transport.
//!
//! The provider talks to PowerShell only through [`Interpreter`], so tests can
//! answer with canned JSON instead of spawning a process.

pub mod local;

use crate::error::BridgeError;

/// Output from running one script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Something that runs a generated script and captures its output.
///
/// Calls block until the script finishes. There is no timeout at this layer.
pub trait Interpreter {
    fn execute(&mut self, script: &str) -> Result<ExecOutput, BridgeError>;
}

impl<T: Interpreter + ?Sized> Interpreter for Box<T> {
    fn execute(&mut self, script: &str) -> Result<ExecOutput, BridgeError> {
        (**self).execute(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Interpreter for Echo {
        fn execute(&mut self, script: &str) -> Result<ExecOutput, BridgeError> {
            Ok(ExecOutput {
                exit_code: 0,
                stdout: script.to_string(),
                stderr: String::new(),
            })
        }
    }

    #[test]
    fn test_dsc030_success_flag() {
        let ok = ExecOutput::default();
        assert!(ok.success());
        let failed = ExecOutput {
            exit_code: 1,
            ..Default::default()
        };
        assert!(!failed.success());
    }

    #[test]
    fn test_dsc030_boxed_interpreter_delegates() {
        let mut boxed: Box<dyn Interpreter> = Box::new(Echo);
        let out = boxed.execute("hello").unwrap();
        assert_eq!(out.stdout, "hello");
    }
}
