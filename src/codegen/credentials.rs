//! DSC-012: PSCredential construction statements.

use super::expr::{quote, Expr, Key, SENSITIVE_MARKER};
use super::interner::Interner;
use crate::core::types::{InvocationDescriptor, PsValue};
use crate::error::BridgeError;

/// The `{user, password}` shape a credential property stands for.
///
/// The parameter block lowers credential properties through this same function,
/// so the interner can match them to the variables built here.
pub fn credential_shape(property: &str, value: &PsValue) -> Result<Expr, BridgeError> {
    let (user, password) = credential_parts(property, value)?;
    Ok(Expr::Hashtable(vec![
        (Key::Quoted("user".to_string()), Expr::Str(user)),
        (Key::Quoted("password".to_string()), Expr::Sensitive(password)),
    ]))
}

fn credential_parts(property: &str, value: &PsValue) -> Result<(String, String), BridgeError> {
    let invalid = || BridgeError::InvalidCredential {
        property: property.to_string(),
    };
    let user = match value.get("user") {
        Some(PsValue::String(u)) => u.clone(),
        _ => return Err(invalid()),
    };
    let password = match value.get("password") {
        Some(PsValue::Secret(s)) => s.unwrap_secret().to_string(),
        Some(PsValue::String(s)) => s.clone(),
        _ => return Err(invalid()),
    };
    Ok((user, password))
}

/// Emit one `New-PSCredential` statement per distinct credential value.
pub fn prepare_credentials(
    resource: &InvocationDescriptor,
    interner: &mut Interner,
) -> Result<Vec<String>, BridgeError> {
    let mut block = Vec::new();
    for (property, param) in &resource.parameters {
        if !param.mof_type.is_credential() || param.value.is_null() {
            continue;
        }
        let canonical = credential_shape(property, &param.value)?.render();
        let (variable, created) = interner.intern(canonical);
        if !created {
            continue;
        }
        let (user, password) = credential_parts(property, &param.value)?;
        block.push(format!(
            "${} = New-PSCredential -User {} -Password {} {}",
            variable,
            quote(&user),
            quote(&password),
            SENSITIVE_MARKER
        ));
    }
    Ok(block)
}
