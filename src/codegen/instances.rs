//! DSC-013: CIM instance construction statements.
//!
//! Embedded properties are walked depth-first. Every nested instance gets its
//! own `New-CimInstance` statement before the instance that contains it, so by
//! the time a statement is rendered all of its children already have variables.

use super::expr::{lower, lower_instance, quote, Expr, Key};
use super::interner::Interner;
use crate::core::types::{CimInstance, InvocationDescriptor, PropertyParam, PsValue};
use crate::error::BridgeError;

/// Emit `New-CimInstance` statements for every embedded property, innermost first.
pub fn prepare_cim_instances(
    resource: &InvocationDescriptor,
    interner: &mut Interner,
) -> Result<Vec<String>, BridgeError> {
    let mut block = Vec::new();
    for param in resource.parameters.values() {
        if !param.is_embedded || param.value.is_null() {
            continue;
        }
        let class_name = param.mof_type.element_type();
        for item in embedded_values(param) {
            let instance = embedded_instance(item, class_name)?;
            emit_with_nested(&instance, interner, &mut block)?;
        }
    }
    Ok(block)
}

/// The values of an embedded property, one per instance. A single value given
/// for an array type counts as a one-element array.
pub(crate) fn embedded_values(param: &PropertyParam) -> Vec<&PsValue> {
    match &param.value {
        PsValue::Array(items) if param.mof_type.is_array() => items.iter().collect(),
        single => vec![single],
    }
}

/// View an embedded value as an instance. Plain maps take the class the schema
/// declares; values that already carry a class keep it.
pub(crate) fn embedded_instance(
    value: &PsValue,
    class_name: &str,
) -> Result<CimInstance, BridgeError> {
    match value {
        PsValue::Instance(i) => Ok(i.clone()),
        PsValue::Map(m) => Ok(CimInstance {
            class_name: class_name.to_string(),
            properties: m.clone(),
        }),
        other => Err(BridgeError::unsupported(
            format!("embedded {}", class_name),
            format!("{:?}", other),
        )),
    }
}

fn emit_with_nested(
    instance: &CimInstance,
    interner: &mut Interner,
    block: &mut Vec<String>,
) -> Result<(), BridgeError> {
    for child in instance.properties.values() {
        discover(child, interner, block)?;
    }
    emit(instance, interner, block);
    Ok(())
}

/// Post-order walk: an instance is emitted only after everything inside it.
fn discover(
    value: &PsValue,
    interner: &mut Interner,
    block: &mut Vec<String>,
) -> Result<(), BridgeError> {
    match value {
        PsValue::Instance(i) => emit_with_nested(i, interner, block),
        other => {
            for child in other.children() {
                discover(child, interner, block)?;
            }
            Ok(())
        }
    }
}

fn emit(instance: &CimInstance, interner: &mut Interner, block: &mut Vec<String>) {
    let canonical = lower_instance(instance).render();
    if interner.lookup(&canonical).is_some() {
        return;
    }

    // Children only: the payload itself must never collapse to a variable
    let payload = Expr::Hashtable(
        instance
            .properties
            .iter()
            .map(|(k, v)| (Key::Quoted(k.clone()), interner.substitute(lower(v))))
            .collect(),
    );

    let (variable, _) = interner.intern(canonical);
    block.push(format!(
        "${} = New-CimInstance -ClientOnly -ClassName {} -Property {}",
        variable,
        quote(&instance.class_name),
        payload.render()
    ));
}
