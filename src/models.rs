use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Inclusive year range used for API queries and dashboard selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// `date` query parameter form, e.g. `2000:2024`.
    pub fn to_query_param(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

/// Display form used for KPI range labels, e.g. `2000–2024`.
impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.start, self.end)
    }
}

/// Metadata section returned by the API (position 0).
///
/// Every field is optional: the API has been seen to encode numbers as strings,
/// and a malformed value must not sink the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "de_opt_u32_lenient")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_u32_lenient")]
    pub pages: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_u32_lenient")]
    pub per_page: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_u32_lenient")]
    pub total: Option<u32>,
}

impl Meta {
    /// Total page count, defaulting to 1 when absent or zero.
    pub fn page_count(&self) -> u32 {
        self.pages.filter(|p| *p >= 1).unwrap_or(1)
    }
}

/// Serde helper: parse `u32` from a JSON number or a numeric string; anything else is `None`.
fn de_opt_u32_lenient<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct LenientU32;

    impl<'de> Visitor<'de> for LenientU32 {
        type Value = Option<u32>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(u32::try_from(v).ok())
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(u32::try_from(v).ok())
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
                Ok(Some(v as u32))
            } else {
                Ok(None)
            }
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(s.trim().parse::<u32>().ok())
        }

        fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientU32)
}

/// Raw observation from the API (position 1 array), reduced to the fields the
/// pipeline keeps. Types are left loose; coercion happens per row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub countryiso3code: Option<String>,
    /// Usually `{"id": "DE", "value": "Germany"}`; a bare string is accepted too.
    #[serde(default)]
    pub country: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl RawRecord {
    pub fn iso3(&self) -> &str {
        self.countryiso3code.as_deref().map(str::trim).unwrap_or("")
    }

    /// Country name as reported by the API.
    pub fn api_country_name(&self) -> Option<&str> {
        match self.country.as_ref()? {
            Value::Object(map) => map.get("value").and_then(Value::as_str),
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Year coerced to an integer; `None` when it is not a whole number.
    pub fn year(&self) -> Option<i32> {
        let y = coerce_number(self.date.as_ref()?)?;
        if y.fract() != 0.0 || y < i32::MIN as f64 || y > i32::MAX as f64 {
            return None;
        }
        Some(y as i32)
    }

    /// Value coerced to a finite float.
    pub fn numeric_value(&self) -> Option<f64> {
        coerce_number(self.value.as_ref()?)
    }
}

/// JSON number or numeric string to a finite `f64`.
pub fn coerce_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|x| x.is_finite())
}

/// One row of the canonical long-form table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalRow {
    #[serde(rename = "ISO3Code")]
    pub iso3: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Value")]
    pub value: Option<f64>,
    /// Indicator display name.
    #[serde(rename = "Indicator")]
    pub indicator: String,
}
