//! DSC-001: Types shared by the mapper, code generator and provider.
//!
//! Defines the resource schema as handed over by the host framework, the typed
//! property values that flow into script generation, the invocation descriptor,
//! and the canonical shapes of get/set results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Values
// ============================================================================

/// A sensitive string. Its plaintext never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the plaintext. Only the script formatter should need this.
    pub fn unwrap_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sensitive [value redacted]")
    }
}

/// A CIM instance value: a class name plus its ordered properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CimInstance {
    pub class_name: String,
    pub properties: IndexMap<String, PsValue>,
}

/// A desired-state value, closed over every kind the script formatter understands.
#[derive(Debug, Clone, PartialEq)]
pub enum PsValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Secret(Secret),
    Array(Vec<PsValue>),
    Map(IndexMap<String, PsValue>),
    Instance(CimInstance),
}

impl PsValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Look up a key in a map or instance value.
    pub fn get(&self, key: &str) -> Option<&PsValue> {
        match self {
            Self::Map(m) => m.get(key),
            Self::Instance(i) => i.properties.get(key),
            _ => None,
        }
    }

    /// Values directly contained in this one (array items, map/instance values).
    pub fn children(&self) -> Vec<&PsValue> {
        match self {
            Self::Array(items) => items.iter().collect(),
            Self::Map(m) => m.values().collect(),
            Self::Instance(i) => i.properties.values().collect(),
            _ => vec![],
        }
    }
}

impl From<&str> for PsValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// Ordered property-name → value record (a desired state or an identity).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(pub IndexMap<String, PsValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// An identity consisting only of the framework title.
    pub fn from_name(name: &str) -> Self {
        let mut p = Self::new();
        p.insert("name", PsValue::from(name));
        p
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PsValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&PsValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, PsValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Declared MOF type of a property, e.g. `String`, `UInt32[]`, `PSCredential`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MofType(pub String);

impl MofType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn is_credential(&self) -> bool {
        self.0.eq_ignore_ascii_case("PSCredential")
    }

    pub fn is_array(&self) -> bool {
        self.0.ends_with("[]")
    }

    /// The type with any trailing `[]` removed.
    pub fn element_type(&self) -> &str {
        self.0.strip_suffix("[]").unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the host framework treats an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behaviour {
    Namevar,
    Parameter,
    ReadOnly,
    InitOnly,
}

/// One attribute of the resource type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeDef {
    /// MOF type; `None` for framework-only attributes such as `name`
    #[serde(default)]
    pub mof_type: Option<MofType>,

    /// Whether values are embedded CIM instances
    #[serde(default)]
    pub mof_is_embedded: bool,

    #[serde(default)]
    pub behaviour: Option<Behaviour>,
}

/// Resource type definition supplied by the host framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Framework type name, e.g. `dsc_xwebsite`
    pub name: String,

    #[serde(rename = "dscmeta_resource_friendly_name")]
    pub friendly_name: String,

    #[serde(rename = "dscmeta_resource_name")]
    pub resource_name: String,

    #[serde(rename = "dscmeta_module_name")]
    pub module_name: String,

    #[serde(rename = "dscmeta_module_version", default)]
    pub module_version: Option<String>,

    /// Attributes in declaration order
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeDef>,
}

impl ResourceSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }

    /// Names of the attributes that identify an instance.
    pub fn namevars(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, a)| a.behaviour == Some(Behaviour::Namevar))
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

// ============================================================================
// Invocation
// ============================================================================

/// The Invoke-DscResource method to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokeMethod {
    Get,
    Set,
}

impl fmt::Display for InvokeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Set => write!(f, "set"),
        }
    }
}

/// A property value together with its schema type information.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyParam {
    pub value: PsValue,
    pub mof_type: MofType,
    pub is_embedded: bool,
}

/// Everything needed to generate one Invoke-DscResource script.
#[derive(Debug, Clone)]
pub struct InvocationDescriptor {
    /// Framework type name
    pub name: String,
    pub friendly_name: String,
    pub resource_name: String,
    pub module_name: String,
    pub module_version: Option<String>,
    pub method: InvokeMethod,

    /// Property name (with its `dsc_` prefix) → typed value
    pub parameters: IndexMap<String, PropertyParam>,

    /// Directory holding the vendored DSC resource modules
    pub vendored_modules_path: PathBuf,
}

// ============================================================================
// Results
// ============================================================================

/// Whether a queried instance exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Present,
    Absent,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Output of a get, reshaped to the schema's canonical keys.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalResult {
    /// The framework title used for the lookup
    pub name: Option<String>,
    pub presence: Presence,

    /// Canonical `dsc_*` key → value, schema attributes only
    pub properties: IndexMap<String, serde_json::Value>,
}

impl CanonicalResult {
    /// Render as a flat record: `ensure`, `name`, then the properties.
    pub fn to_record(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut record = serde_json::Map::new();
        record.insert(
            "ensure".to_string(),
            serde_json::Value::String(self.presence.to_string()),
        );
        if let Some(ref name) = self.name {
            record.insert("name".to_string(), serde_json::Value::String(name.clone()));
        }
        for (k, v) in &self.properties {
            record.insert(k.clone(), v.clone());
        }
        record
    }
}

/// Outcome of a set call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResult {
    /// Empty on success
    #[serde(rename = "errormessage", default)]
    pub error_message: String,

    /// Reported by DSC; not acted upon here
    #[serde(rename = "rebootrequired", default)]
    pub reboot_required: bool,

    #[serde(rename = "indesiredstate", default)]
    pub in_desired_state: Option<bool>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Bridge configuration (dscbridge.yaml).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Interpreter used to run generated scripts
    #[serde(default)]
    pub interpreter: InterpreterConfig,

    /// Override for the vendored DSC module directory
    #[serde(default)]
    pub modules_path: Option<PathBuf>,
}

/// How to launch the script interpreter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

fn default_program() -> String {
    "pwsh".to_string()
}

fn default_args() -> Vec<String> {
    ["-NoLogo", "-NoProfile", "-NonInteractive", "-Command", "-"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl BridgeConfig {
    /// Resolve the vendored module directory: explicit override, else
    /// `dsc_resources` next to the running executable.
    pub fn vendored_modules_path(&self) -> PathBuf {
        if let Some(ref p) = self.modules_path {
            return p.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|d| d.join("dsc_resources")))
            .unwrap_or_else(|| PathBuf::from("dsc_resources"))
    }
}

// ============================================================================
// Tests
// ============================================================================
