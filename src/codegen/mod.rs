//! DSC-016: Script generation for Invoke-DscResource.
//!
//! One [`Interner`] lives for exactly one [`assemble`] call. Builders register
//! the composites they declare, and the parameter block refers back to them.

pub mod credentials;
pub mod expr;
pub mod instances;
pub mod interner;
pub mod params;
pub mod redact;

#[cfg(test)]
mod testutil;

use crate::core::types::InvocationDescriptor;
use crate::error::BridgeError;
use interner::Interner;

/// Defines `New-PSCredential` and the `$Response` object.
pub const PREAMBLE: &str = include_str!("templates/invoke_preamble.ps1");

/// Calls `Invoke-DscResource @InvokeParams` and writes one JSON object.
pub const POSTSCRIPT: &str = include_str!("templates/invoke_postscript.ps1");

/// A generated script and its log-safe copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// Sent to the interpreter.
    pub text: String,
    /// Sensitive literals replaced; the only form that may be logged.
    pub redacted: String,
}

/// Build the full script for one invocation.
pub fn assemble(resource: &InvocationDescriptor) -> Result<Script, BridgeError> {
    assemble_with(resource, Interner::new())
}

fn assemble_with(
    resource: &InvocationDescriptor,
    mut interner: Interner,
) -> Result<Script, BridgeError> {
    let credentials = credentials::prepare_credentials(resource, &mut interner)?;
    let instances = instances::prepare_cim_instances(resource, &mut interner)?;
    let params = params::invoke_params(resource, &interner)?;

    let mut sections = vec![PREAMBLE.trim_end().to_string()];
    sections.extend(credentials);
    sections.extend(instances);
    sections.push(params);
    sections.push(POSTSCRIPT.trim_end().to_string());

    let mut text = sections.join("\n");
    text.push('\n');
    let redacted = redact::redact_secrets(&text);
    tracing::trace!(
        resource = %resource.name,
        method = %resource.method,
        variables = interner.len(),
        "assembled script"
    );
    Ok(Script { text, redacted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PsValue;
    use interner::sequential_names;
    use testutil::{credential, descriptor, instance, map, param};

    fn assemble_seq(resource: &InvocationDescriptor) -> Script {
        assemble_with(resource, Interner::with_name_source(sequential_names())).unwrap()
    }

    #[test]
    fn test_dsc016_section_order() {
        let d = descriptor(vec![
            ("dsc_credential", param(credential("u", "hunter2"), "PSCredential", false)),
            (
                "dsc_binding",
                param(map(vec![("Port", PsValue::Int(80))]), "MSFT_Binding", true),
            ),
        ]);
        let script = assemble_seq(&d);
        let text = &script.text;
        let preamble = text.find("function New-PSCredential").unwrap();
        let cred = text.find("$v1 = New-PSCredential").unwrap();
        let inst = text.find("$v2 = New-CimInstance").unwrap();
        let params = text.find("$InvokeParams = ").unwrap();
        let invoke = text.find("Invoke-DscResource @InvokeParams").unwrap();
        assert!(preamble < cred && cred < inst && inst < params && params < invoke);
        assert!(text.contains("Property = @{credential = $v1; binding = $v2}"));
    }

    #[test]
    fn test_dsc016_redacted_copy_hides_password() {
        let d = descriptor(vec![(
            "dsc_credential",
            param(credential("bob", "hunter2"), "PSCredential", false),
        )]);
        let script = assemble(&d).unwrap();
        assert!(script.text.contains("-Password 'hunter2' <# Sensitive #>"));
        assert!(!script.redacted.contains("hunter2"));
        assert!(script
            .redacted
            .contains("-Password '#<Sensitive [value redacted]>'"));
    }

    #[test]
    fn test_dsc016_no_composites_only_params() {
        let d = descriptor(vec![("dsc_name", param(PsValue::from("web"), "String", false))]);
        let script = assemble(&d).unwrap();
        assert!(!script.text.contains("New-CimInstance -ClientOnly"));
        assert_eq!(script.text, script.redacted);
        assert!(script.text.ends_with('\n'));
    }

    #[test]
    fn test_dsc016_fresh_names_per_call() {
        let d = descriptor(vec![(
            "dsc_binding",
            param(map(vec![("Port", PsValue::Int(80))]), "MSFT_Binding", true),
        )]);
        let first = assemble(&d).unwrap();
        let second = assemble(&d).unwrap();
        assert_ne!(first.text, second.text);
    }

    #[test]
    fn test_dsc016_variable_names_are_valid_identifiers() {
        let d = descriptor(vec![(
            "dsc_tree",
            param(
                map(vec![("leaf", instance("Leaf", vec![("n", PsValue::Int(1))]))]),
                "Tree",
                true,
            ),
        )]);
        let script = assemble(&d).unwrap();
        for line in script.text.lines().filter(|l| l.contains("New-CimInstance -ClientOnly")) {
            let name = line
                .strip_prefix('$')
                .and_then(|l| l.split(' ').next())
                .unwrap();
            assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
    }

    #[test]
    fn test_dsc016_errors_propagate() {
        let d = descriptor(vec![("dsc_credential", param(PsValue::Int(1), "PSCredential", false))]);
        assert!(matches!(
            assemble(&d),
            Err(BridgeError::InvalidCredential { .. })
        ));
    }
}
