//! DSC-020: Desired state → invocation descriptor.

use super::types::{InvocationDescriptor, InvokeMethod, Properties, PropertyParam, ResourceSchema};
use crate::error::BridgeError;
use indexmap::IndexMap;
use std::path::Path;

/// Presence flag; never a resource property.
pub const ENSURE_PROPERTY: &str = "ensure";

/// Framework title; never sent to DSC.
pub const NAME_PROPERTY: &str = "name";

/// Optional run-as credential, dropped when unset so an empty value does not
/// show up as drift on every pass.
pub const RUN_AS_CREDENTIAL: &str = "dsc_psdscrunascredential";

/// Build the descriptor for one Invoke-DscResource call.
///
/// Properties keep the order they were given in. `ensure`, `name`, an unset
/// run-as credential, and attributes without a MOF type are left out.
pub fn should_to_resource(
    should: &Properties,
    schema: &ResourceSchema,
    method: InvokeMethod,
    modules_path: &Path,
) -> Result<InvocationDescriptor, BridgeError> {
    let mut parameters = IndexMap::new();
    for (property, value) in should.iter() {
        if property == ENSURE_PROPERTY || property == NAME_PROPERTY {
            continue;
        }
        if property == RUN_AS_CREDENTIAL && value.is_null() {
            continue;
        }
        let attribute = schema
            .attribute(property)
            .ok_or_else(|| BridgeError::UnknownProperty {
                property: property.clone(),
                resource: schema.name.clone(),
            })?;
        let Some(ref mof_type) = attribute.mof_type else {
            tracing::debug!(property = %property, "skipping attribute without MOF type");
            continue;
        };
        parameters.insert(
            property.clone(),
            PropertyParam {
                value: value.clone(),
                mof_type: mof_type.clone(),
                is_embedded: attribute.mof_is_embedded,
            },
        );
    }

    tracing::debug!(
        resource = %schema.name,
        method = %method,
        parameters = parameters.len(),
        "mapped desired state"
    );
    Ok(InvocationDescriptor {
        name: schema.name.clone(),
        friendly_name: schema.friendly_name.clone(),
        resource_name: schema.resource_name.clone(),
        module_name: schema.module_name.clone(),
        module_version: schema.module_version.clone(),
        method,
        parameters,
        vendored_modules_path: modules_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::{parse_properties, parse_schema};
    use crate::core::types::PsValue;

    const SCHEMA: &str = r#"
name: dsc_xwebsite
dscmeta_resource_friendly_name: xWebSite
dscmeta_resource_name: MSFT_xWebSite
dscmeta_module_name: xWebAdministration
dscmeta_module_version: 3.2.0
attributes:
  name:
    behaviour: namevar
  ensure: {}
  dsc_name:
    mof_type: String
    behaviour: namevar
  dsc_physicalpath:
    mof_type: String
  dsc_bindinginfo:
    mof_type: MSFT_xWebBindingInformation[]
    mof_is_embedded: true
  dsc_psdscrunascredential:
    mof_type: PSCredential
"#;

    fn schema() -> ResourceSchema {
        parse_schema(SCHEMA).unwrap()
    }

    #[test]
    fn test_dsc020_skips_ensure_and_unset_run_as() {
        let should = parse_properties(
            r#"
name: site
ensure: present
dsc_name: Default
dsc_psdscrunascredential: ~
dsc_physicalpath: C:\inetpub
"#,
        )
        .unwrap();
        let d = should_to_resource(&should, &schema(), InvokeMethod::Set, Path::new("/m")).unwrap();
        let keys: Vec<&str> = d.parameters.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["dsc_name", "dsc_physicalpath"]);
    }

    #[test]
    fn test_dsc020_metadata_copied() {
        let should = Properties::from_name("site");
        let d = should_to_resource(&should, &schema(), InvokeMethod::Get, Path::new("/m")).unwrap();
        assert_eq!(d.friendly_name, "xWebSite");
        assert_eq!(d.resource_name, "MSFT_xWebSite");
        assert_eq!(d.module_name, "xWebAdministration");
        assert_eq!(d.module_version.as_deref(), Some("3.2.0"));
        assert_eq!(d.method, InvokeMethod::Get);
        assert_eq!(d.vendored_modules_path, Path::new("/m"));
        assert!(d.parameters.is_empty());
    }

    #[test]
    fn test_dsc020_type_info_attached() {
        let mut should = Properties::new();
        should.insert("dsc_bindinginfo", PsValue::Array(vec![]));
        let d = should_to_resource(&should, &schema(), InvokeMethod::Set, Path::new("/m")).unwrap();
        let p = &d.parameters["dsc_bindinginfo"];
        assert!(p.is_embedded);
        assert_eq!(p.mof_type.as_str(), "MSFT_xWebBindingInformation[]");
    }

    #[test]
    fn test_dsc020_set_run_as_credential_kept() {
        let mut should = Properties::new();
        should.insert(
            "dsc_psdscrunascredential",
            PsValue::Map(IndexMap::from([
                ("user".to_string(), PsValue::from("u")),
                ("password".to_string(), PsValue::from("p")),
            ])),
        );
        let d = should_to_resource(&should, &schema(), InvokeMethod::Set, Path::new("/m")).unwrap();
        assert!(d.parameters["dsc_psdscrunascredential"].mof_type.is_credential());
    }

    #[test]
    fn test_dsc020_attribute_without_mof_type_skipped() {
        let mut s = schema();
        s.attributes.insert("dsc_note".to_string(), Default::default());
        let mut should = Properties::new();
        should.insert("dsc_note", PsValue::from("x"));
        let d = should_to_resource(&should, &s, InvokeMethod::Set, Path::new("/m")).unwrap();
        assert!(d.parameters.is_empty());
    }

    #[test]
    fn test_dsc020_unknown_property() {
        let mut should = Properties::new();
        should.insert("dsc_bogus", PsValue::Bool(true));
        let err = should_to_resource(&should, &schema(), InvokeMethod::Set, Path::new("/m"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnknownProperty { ref property, .. } if property == "dsc_bogus"));
    }
}
