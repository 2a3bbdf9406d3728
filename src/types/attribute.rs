use serde::{Deserialize, Serialize};

use super::wire;

/// One selectable token of an [`Attribute`], with its presentation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub has_sub_attributes: bool,
}

impl AttributeValue {
    /// A plain value whose label is the token itself.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            price_multiplier: None,
            image: None,
            has_sub_attributes: false,
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn price_multiplier(mut self, multiplier: f64) -> Self {
        self.price_multiplier = Some(multiplier);
        self
    }

    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_sub_attributes(mut self) -> Self {
        self.has_sub_attributes = true;
        self
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::new(v)
    }
}

/// A configurable product dimension with an ordered list of declared values.
///
/// Attributes are owned by a [`Catalog`](super::Catalog) and never change
/// during an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawAttribute")]
pub struct Attribute {
    pub id: String,
    pub name: String,
    pub values: Vec<AttributeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Wire shape of an attribute. Store documents may carry `_id`, `id` or
/// both; `_id` wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttribute {
    #[serde(rename = "_id", default, deserialize_with = "wire::optional")]
    underscore_id: Option<String>,
    #[serde(default, deserialize_with = "wire::optional")]
    id: Option<String>,
    #[serde(default, deserialize_with = "wire::or_default")]
    name: String,
    #[serde(default)]
    values: Vec<AttributeValue>,
    #[serde(default, deserialize_with = "wire::optional")]
    default_value: Option<String>,
}

impl TryFrom<RawAttribute> for Attribute {
    type Error = &'static str;

    fn try_from(raw: RawAttribute) -> Result<Self, Self::Error> {
        let id = wire::object_id(raw.underscore_id, raw.id)
            .ok_or("attribute has neither `_id` nor `id`")?;
        Ok(Attribute {
            id,
            name: raw.name,
            values: raw.values,
            default_value: raw.default_value,
        })
    }
}

impl Attribute {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            values: Vec::new(),
            default_value: None,
        }
    }

    /// Append plain values, in order.
    #[must_use]
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.extend(values.into_iter().map(AttributeValue::new));
        self
    }

    /// Append a fully described value.
    #[must_use]
    pub fn value(mut self, value: AttributeValue) -> Self {
        self.values.push(value);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// The declared value tokens in declaration order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.value.as_str())
    }

    /// Whether `token` is one of the declared values.
    #[must_use]
    pub fn declares(&self, token: &str) -> bool {
        self.values.iter().any(|v| v.value == token)
    }

    /// The declared value tokens as owned strings.
    #[must_use]
    pub fn declared_tokens(&self) -> Vec<String> {
        self.tokens().map(str::to_owned).collect()
    }
}
