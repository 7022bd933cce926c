//! DSC-014: The `$InvokeParams` hashtable splatted into Invoke-DscResource.

use super::credentials::credential_shape;
use super::expr::{lower, lower_instance, Expr, Key, CIM_ARRAY_CAST};
use super::instances::{embedded_instance, embedded_values};
use super::interner::Interner;
use crate::core::types::{InvocationDescriptor, PropertyParam};
use crate::error::BridgeError;

/// Name of the variable the postscript reads.
pub const INVOKE_PARAMS_VARIABLE: &str = "InvokeParams";

/// Prefix the host framework puts on every DSC property name.
pub const PROPERTY_PREFIX: &str = "dsc_";

/// Render `$InvokeParams = @{...}` with every constructed credential and
/// instance referenced by variable.
pub fn invoke_params(
    resource: &InvocationDescriptor,
    interner: &Interner,
) -> Result<String, BridgeError> {
    let mut properties = Vec::with_capacity(resource.parameters.len());
    for (property, param) in &resource.parameters {
        let name = property.strip_prefix(PROPERTY_PREFIX).unwrap_or(property);
        let expr = property_expr(property, param, interner)?;
        properties.push((Key::Bare(name.to_string()), expr));
    }

    let module = match resource.module_version {
        Some(ref version) => Expr::bare_table([
            (
                "ModuleName",
                Expr::Str(format!(
                    "{}/{}/{}.psd1",
                    resource.vendored_modules_path.display(),
                    resource.module_name,
                    resource.module_name
                )),
            ),
            ("RequiredVersion", Expr::Str(version.clone())),
        ]),
        None => Expr::Str(resource.module_name.clone()),
    };

    let params = Expr::bare_table([
        ("Name", Expr::Str(resource.friendly_name.clone())),
        ("Method", Expr::Str(resource.method.to_string())),
        ("Property", Expr::Hashtable(properties)),
        ("ModuleName", module),
    ]);
    Ok(format!("${} = {}", INVOKE_PARAMS_VARIABLE, params.render()))
}

/// Only credential and embedded positions may refer to constructed variables;
/// every other property is written out literally.
fn property_expr(
    property: &str,
    param: &PropertyParam,
    interner: &Interner,
) -> Result<Expr, BridgeError> {
    if param.value.is_null() {
        return Ok(Expr::Null);
    }
    if param.mof_type.is_credential() {
        return Ok(interner.substitute(credential_shape(property, &param.value)?));
    }
    if !param.is_embedded {
        return Ok(lower(&param.value));
    }

    // Lowered exactly as the instance builder keyed them, class included
    let class_name = param.mof_type.element_type();
    let mut instances = Vec::new();
    for item in embedded_values(param) {
        instances.push(lower_instance(&embedded_instance(item, class_name)?));
    }
    let expr = if param.mof_type.is_array() {
        // New-CimInstance only accepts arrays typed as CIM instance arrays
        Expr::cast(CIM_ARRAY_CAST, Expr::Array(instances))
    } else {
        instances.pop().unwrap_or(Expr::Null)
    };
    Ok(interner.substitute(expr))
}
