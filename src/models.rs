use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// A physical access zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub security_level: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl AreaRef {
    /// Scalar fields in transmission order, keyed by their wire names.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("id", self.id.clone()),
            ("name", self.name.clone()),
            ("securityLevel", self.security_level.to_string()),
        ];
        // No description field is sent for areas without one
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        fields
    }
}

impl fmt::Display for AreaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Scalar value of a model attribute whose key is not known ahead of time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ScalarValue {
    fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(v) => Some(Self::Bool(v)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Int(i)),
                None => n.as_f64().map(Self::Float),
            },
            serde_json::Value::String(s) => Some(Self::String(s)),
            // Null, arrays and objects are not scalar attributes
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// A segmentation or recognition model configuration.
///
/// Catalog records carry implementation-specific metadata besides `id`,
/// `name` and `accuracy`; those land in `extra` so every one of them can be
/// forwarded with a recognition request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawModelRef")]
pub struct ModelRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, ScalarValue>,
}

#[derive(Deserialize)]
struct RawModelRef {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl From<RawModelRef> for ModelRef {
    fn from(raw: RawModelRef) -> Self {
        let extra = raw
            .extra
            .into_iter()
            .filter_map(|(key, value)| ScalarValue::from_json(value).map(|v| (key, v)))
            .collect();
        Self {
            id: raw.id,
            name: raw.name,
            accuracy: raw.accuracy,
            extra,
        }
    }
}

impl ModelRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, accuracy: f64) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            accuracy: Some(accuracy),
            extra: BTreeMap::new(),
        }
    }

    /// Add an extra attribute
    pub fn with_field(mut self, key: impl Into<String>, value: ScalarValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Every scalar field the record carries: the fixed ones first, then the
    /// extras in key order. Absent fields are not emitted.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("id".to_string(), self.id.clone())];
        if let Some(name) = &self.name {
            fields.push(("name".to_string(), name.clone()));
        }
        if let Some(accuracy) = self.accuracy {
            fields.push(("accuracy".to_string(), accuracy.to_string()));
        }
        fields.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.to_string())));
        fields
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.extra.get(key) {
            Some(ScalarValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.extra.get(key) {
            Some(ScalarValue::Float(v)) => Some(*v),
            Some(ScalarValue::Int(v)) => Some(*v as f64),
            _ => None,
        }
    }

    /// Label shown in model pickers, e.g. `v2.1 (87.00%)` for `v2_1`.
    pub fn label(&self) -> String {
        let name = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.replacen('_', ".", 1),
            _ => self.id.clone(),
        };
        match self.accuracy {
            Some(accuracy) if accuracy != 0.0 => {
                format!("{} ({:.2}%)", name, accuracy * 100.0)
            }
            _ => name,
        }
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Physical movement tagged on a recognition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessDirection {
    #[default]
    Entry,
    Exit,
}

impl AccessDirection {
    pub const ALL: [AccessDirection; 2] = [AccessDirection::Entry, AccessDirection::Exit];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "ENTRY",
            Self::Exit => "EXIT",
        }
    }
}

impl fmt::Display for AccessDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ENTRY" => Ok(Self::Entry),
            "EXIT" => Ok(Self::Exit),
            _ => Err(anyhow::anyhow!("Invalid access direction: {}", s)),
        }
    }
}

/// Employee matched by the recognition service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRef {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogArea {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Access log entry written by the server for this attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub area: Option<LogArea>,
    #[serde(default)]
    pub access_type: Option<AccessDirection>,
    #[serde(default)]
    pub authorized: Option<bool>,
}

impl AccessLog {
    pub fn parsed_timestamp(&self) -> Option<PrimitiveDateTime> {
        let raw = self.timestamp.as_deref()?;
        if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
            return Some(PrimitiveDateTime::new(dt.date(), dt.time()));
        }
        PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).ok()
    }

    /// Timestamp as `YYYY-MM-DD HH:MM:SS`, or the raw value when it does not parse.
    pub fn display_timestamp(&self) -> Option<String> {
        let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        match self.parsed_timestamp() {
            Some(dt) => dt.format(&fmt).ok().or_else(|| self.timestamp.clone()),
            None => self.timestamp.clone(),
        }
    }

    pub fn area_name(&self) -> Option<&str> {
        self.area.as_ref().and_then(|a| a.name.as_deref())
    }
}

/// Decoded response of the recognition endpoint.
///
/// `accessable` and `authorized` only carry meaning when `matched` is true;
/// their absence on a failed match is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub matched: bool,
    pub confidence: f64,
    #[serde(default)]
    pub employee: Option<EmployeeRef>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub accessable: Option<bool>,
    #[serde(default)]
    pub authorized: Option<bool>,
    #[serde(default)]
    pub access_log: Option<AccessLog>,
}
