use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MAJOR_CATEGORY_ARITY: usize = 6;

/// Raw configuration document (camelCase keys), merged from defaults, a config file and flags.
///
/// Validation happens once, in [`FishboneConfig::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct FishboneConfig(Value);

impl Default for FishboneConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl FishboneConfig {
    pub fn defaults() -> Self {
        Self(json!({
            "majorCategoryArity": DEFAULT_MAJOR_CATEGORY_ARITY,
            "dialect": "minimal",
            "canvas": {
                "width": 12.0,
                "height": 10.0,
                "pxPerUnit": 100.0
            },
            "embed": {
                "mermaidVersion": "11",
                "theme": "default"
            }
        }))
    }

    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| Error::ConfigDecode {
            message: e.to_string(),
        })?;
        Ok(Self(value))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| Error::ConfigDecode {
            message: e.to_string(),
        })?;
        Ok(Self(value))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)?.as_f64()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // Config files may hold any JSON value at the root; coerce to an object so this never
        // panics on user input.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// Validates the document and produces typed settings.
    ///
    /// Any invalid value is fatal: no partial settings are returned.
    pub fn resolve(&self) -> Result<RenderSettings> {
        if !self.0.is_object() {
            return Err(Error::invalid_config("configuration must be a mapping"));
        }
        let defaults = Self::defaults();

        let major_category_arity = match self.get("majorCategoryArity") {
            None | Some(Value::Null) => DEFAULT_MAJOR_CATEGORY_ARITY,
            Some(v) => parse_arity(v)?,
        };

        let dialect = match self.get("dialect") {
            None | Some(Value::Null) => Dialect::default(),
            Some(Value::String(s)) => s.parse::<Dialect>()?,
            Some(other) => {
                return Err(Error::invalid_config(format!(
                    "dialect must be a string, got {other}"
                )));
            }
        };

        let number = |key: &str| -> Result<f64> {
            match self.get(key) {
                None | Some(Value::Null) => Ok(defaults.get_f64(key).unwrap_or_default()),
                Some(v) => v
                    .as_f64()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| Error::invalid_config(format!("{key} must be a number, got {v}"))),
            }
        };
        let canvas = CanvasSettings {
            width: number("canvas.width")?,
            height: number("canvas.height")?,
            px_per_unit: number("canvas.pxPerUnit")?,
            background: match self.get("canvas.background") {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Some(v) => {
                    return Err(Error::invalid_config(format!(
                        "canvas.background must be a CSS color string, got {v}"
                    )));
                }
            },
        };
        if canvas.width < CanvasSettings::MIN_WIDTH || canvas.height < CanvasSettings::MIN_HEIGHT {
            return Err(Error::invalid_config(format!(
                "canvas must be at least {} x {} units, got {} x {}",
                CanvasSettings::MIN_WIDTH,
                CanvasSettings::MIN_HEIGHT,
                canvas.width,
                canvas.height
            )));
        }
        if canvas.px_per_unit <= 0.0 {
            return Err(Error::invalid_config(format!(
                "canvas.pxPerUnit must be positive, got {}",
                canvas.px_per_unit
            )));
        }

        let string = |key: &str| -> Result<String> {
            match self.get(key) {
                None | Some(Value::Null) => Ok(defaults.get_str(key).unwrap_or_default().to_string()),
                Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
                Some(v) => Err(Error::invalid_config(format!(
                    "{key} must be a non-empty string, got {v}"
                ))),
            }
        };
        let embed = EmbedSettings {
            mermaid_version: string("embed.mermaidVersion")?,
            theme: string("embed.theme")?,
        };

        Ok(RenderSettings {
            major_category_arity,
            dialect,
            canvas,
            embed,
        })
    }
}

fn parse_arity(v: &Value) -> Result<usize> {
    let n = if let Some(n) = v.as_i64() {
        n
    } else if let Some(f) = v.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0) {
        f as i64
    } else {
        return Err(Error::invalid_config(format!(
            "majorCategoryArity must be an integer, got {v}"
        )));
    };
    if n < 1 {
        return Err(Error::invalid_config(format!(
            "majorCategoryArity must be at least 1, got {n}"
        )));
    }
    usize::try_from(n)
        .map_err(|_| Error::invalid_config(format!("majorCategoryArity is out of range: {n}")))
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Dialect {
    /// `graph LR` with one captioned edge per node.
    #[default]
    Minimal,
    /// `flowchart LR` with per-role shapes and class styling.
    Styled,
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "styled" => Ok(Self::Styled),
            other => Err(Error::invalid_config(format!(
                "unknown dialect `{other}` (expected minimal or styled)"
            ))),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Minimal => "minimal",
            Self::Styled => "styled",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSettings {
    pub width: f64,
    pub height: f64,
    pub px_per_unit: f64,
    /// Fill behind the drawing; `None` leaves SVG/PNG transparent and JPG white.
    pub background: Option<String>,
}

impl CanvasSettings {
    pub const MIN_WIDTH: f64 = 6.0;
    pub const MIN_HEIGHT: f64 = 4.0;
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 12.0,
            height: 10.0,
            px_per_unit: 100.0,
            background: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSettings {
    pub mermaid_version: String,
    pub theme: String,
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self {
            mermaid_version: "11".to_string(),
            theme: "default".to_string(),
        }
    }
}

/// Validated settings consumed by the compile and layout stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSettings {
    pub major_category_arity: usize,
    pub dialect: Dialect,
    pub canvas: CanvasSettings,
    pub embed: EmbedSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            major_category_arity: DEFAULT_MAJOR_CATEGORY_ARITY,
            dialect: Dialect::default(),
            canvas: CanvasSettings::default(),
            embed: EmbedSettings::default(),
        }
    }
}
