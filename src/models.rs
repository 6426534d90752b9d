use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker key used to persist non-finite numbers, which JSON cannot express.
const NON_FINITE_KEY: &str = "$nonfinite";

/// A scalar field value as found in the CBS typed dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Value::Number(n) => {
                let tag = if n.is_nan() {
                    "NaN"
                } else if n.is_sign_positive() {
                    "Infinity"
                } else {
                    "-Infinity"
                };
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(NON_FINITE_KEY, tag)?;
                map.end()
            }
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Serde helper: accept JSON scalars plus the non-finite marker object.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, Visitor};
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "null, a boolean, a number or a string")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                Value::deserialize(deserializer)
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Number(v as f64))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Number(v as f64))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Number(v))
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Text(s.to_string()))
            }

            fn visit_string<E>(self, s: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Value::Text(s))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let key: Option<String> = map.next_key()?;
                if key.as_deref() != Some(NON_FINITE_KEY) {
                    return Err(de::Error::custom("nested objects are not supported"));
                }
                let tag: String = map.next_value()?;
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("unexpected field after non-finite marker"));
                }
                match tag.as_str() {
                    "NaN" => Ok(Value::Number(f64::NAN)),
                    "Infinity" => Ok(Value::Number(f64::INFINITY)),
                    "-Infinity" => Ok(Value::Number(f64::NEG_INFINITY)),
                    other => Err(de::Error::custom(format!("unknown non-finite tag {other:?}"))),
                }
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Raw entry of `DataProperties.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataProperty {
    #[serde(rename = "odata.type")]
    pub odata_type: Option<String>,
    #[serde(rename = "Key")]
    pub key: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Unit")]
    pub unit: Option<String>,
    #[serde(rename = "Decimals")]
    pub decimals: Option<i64>,
}

/// Metadata of a single statistic, keyed by its full dataset key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub full_key: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub decimals: Option<i64>,
}

/// One untransformed row of `TypedDataSet.json`.
pub type RawRecord = BTreeMap<String, Value>;

/// Region code -> (full stat key -> value).
pub type CompactRegionData = BTreeMap<String, BTreeMap<String, Value>>;

/// Base name -> full key, in resolution order.
pub type KeyMap = IndexMap<String, String>;
