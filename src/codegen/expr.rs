//! DSC-010: PowerShell expression tree and value formatting.
//!
//! Values are lowered into an [`Expr`] tree first. Variable references are
//! spliced into the tree by the interner, and text is produced exactly once by
//! [`Expr::render`].

use crate::core::parser::CIM_INSTANCE_TYPE_KEY;
use crate::core::types::{CimInstance, PsValue};

/// Inline comment appended to every sensitive literal. Block comment syntax so
/// it is safe in the middle of a hashtable or array.
pub const SENSITIVE_MARKER: &str = "<# Sensitive #>";

/// Type annotation for arrays of CIM instances.
pub const CIM_ARRAY_CAST: &str = "CimInstance[]";

/// Hashtable key: bare identifier or quoted string.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Bare(String),
    Quoted(String),
}

impl Key {
    fn render(&self) -> String {
        match self {
            Self::Bare(k) => k.clone(),
            Self::Quoted(k) => quote(k),
        }
    }
}

/// A PowerShell expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A string literal tagged for redaction
    Sensitive(String),
    Array(Vec<Expr>),
    /// `[Type]expr`
    Cast { type_name: String, inner: Box<Expr> },
    Hashtable(Vec<(Key, Expr)>),
    /// `$name`
    Variable(String),
}

impl Expr {
    /// Hashtable with bare keys, as used for cmdlet parameter maps.
    pub fn bare_table<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Expr)>,
        K: Into<String>,
    {
        Self::Hashtable(
            entries
                .into_iter()
                .map(|(k, v)| (Key::Bare(k.into()), v))
                .collect(),
        )
    }

    pub fn cast(type_name: &str, inner: Expr) -> Self {
        Self::Cast {
            type_name: type_name.to_string(),
            inner: Box::new(inner),
        }
    }

    /// Whether the interner may stand a variable in for this node.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Cast { .. } | Self::Hashtable(_))
    }

    /// Serialize to PowerShell source text.
    pub fn render(&self) -> String {
        match self {
            Self::Null => "$null".to_string(),
            Self::Bool(b) => format!("${}", b),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => render_float(*f),
            Self::Str(s) => quote(s),
            Self::Sensitive(s) => format!("{} {}", quote(s), SENSITIVE_MARKER),
            Self::Array(items) => format!(
                "@({})",
                items.iter().map(Expr::render).collect::<Vec<_>>().join(", ")
            ),
            Self::Cast { type_name, inner } => format!("[{}]{}", type_name, inner.render()),
            Self::Hashtable(entries) => format!(
                "@{{{}}}",
                entries
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k.render(), v.render()))
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
            Self::Variable(name) => format!("${}", name),
        }
    }
}

/// Double embedded single quotes.
pub fn escape_quotes(text: &str) -> String {
    text.replace('\'', "''")
}

/// Single-quoted (verbatim) string literal.
pub fn quote(text: &str) -> String {
    format!("'{}'", escape_quotes(text))
}

fn render_float(f: f64) -> String {
    if f.is_nan() {
        "[double]::NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "[double]::PositiveInfinity".to_string()
        } else {
            "[double]::NegativeInfinity".to_string()
        }
    } else {
        // Debug keeps the decimal point, so 2.0 stays a double
        format!("{:?}", f)
    }
}

/// Lower a value into an expression tree.
pub fn lower(value: &PsValue) -> Expr {
    match value {
        PsValue::Null => Expr::Null,
        PsValue::Bool(b) => Expr::Bool(*b),
        PsValue::Int(i) => Expr::Int(*i),
        PsValue::Float(f) => Expr::Float(*f),
        PsValue::String(s) => Expr::Str(s.clone()),
        PsValue::Secret(s) => Expr::Sensitive(s.unwrap_secret().to_string()),
        PsValue::Array(items) => {
            let array = Expr::Array(items.iter().map(lower).collect());
            let all_instances =
                !items.is_empty() && items.iter().all(|v| matches!(v, PsValue::Instance(_)));
            if all_instances {
                Expr::cast(CIM_ARRAY_CAST, array)
            } else {
                array
            }
        }
        PsValue::Map(m) => lower_map(m),
        PsValue::Instance(i) => lower_instance(i),
    }
}

/// Lower an instance into a hashtable led by its class. This rendering is also
/// the interner key for the instance, so equal properties of different classes
/// never share a variable.
pub fn lower_instance(instance: &CimInstance) -> Expr {
    let mut entries = vec![(
        Key::Quoted(CIM_INSTANCE_TYPE_KEY.to_string()),
        Expr::Str(instance.class_name.clone()),
    )];
    entries.extend(
        instance
            .properties
            .iter()
            .map(|(k, v)| (Key::Quoted(k.clone()), lower(v))),
    );
    Expr::Hashtable(entries)
}

/// Lower an ordered map into a hashtable with quoted keys.
pub fn lower_map(map: &indexmap::IndexMap<String, PsValue>) -> Expr {
    Expr::Hashtable(
        map.iter()
            .map(|(k, v)| (Key::Quoted(k.clone()), lower(v)))
            .collect(),
    )
}

/// Format a value as a PowerShell literal.
pub fn format_value(value: &PsValue) -> String {
    lower(value).render()
}
