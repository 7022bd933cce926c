//! Builders for code generation tests.

use crate::core::types::*;
use indexmap::IndexMap;
use std::path::PathBuf;

pub(crate) fn param(value: PsValue, mof_type: &str, is_embedded: bool) -> PropertyParam {
    PropertyParam {
        value,
        mof_type: MofType::new(mof_type),
        is_embedded,
    }
}

pub(crate) fn descriptor(params: Vec<(&str, PropertyParam)>) -> InvocationDescriptor {
    InvocationDescriptor {
        name: "dsc_test".to_string(),
        friendly_name: "Test".to_string(),
        resource_name: "MSFT_Test".to_string(),
        module_name: "TestDsc".to_string(),
        module_version: None,
        method: InvokeMethod::Set,
        parameters: params
            .into_iter()
            .map(|(k, p)| (k.to_string(), p))
            .collect(),
        vendored_modules_path: PathBuf::from("/opt/dsc"),
    }
}

pub(crate) fn map(props: Vec<(&str, PsValue)>) -> PsValue {
    PsValue::Map(
        props
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<IndexMap<_, _>>(),
    )
}

pub(crate) fn instance(class: &str, props: Vec<(&str, PsValue)>) -> PsValue {
    PsValue::Instance(CimInstance {
        class_name: class.to_string(),
        properties: props
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    })
}

pub(crate) fn credential(user: &str, password: &str) -> PsValue {
    map(vec![
        ("user", PsValue::from(user)),
        ("password", PsValue::Secret(Secret::new(password))),
    ])
}
