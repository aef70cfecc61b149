// Pagecraft - A block-based page editor built with Rust
// Copyright (C) 2025 Pagecraft Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::models::block::{BlockType, ModelError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type-specific payload of a block.
///
/// Structured payloads default every missing field and keep unrecognised keys
/// in `extra`. Empty fields are left out when writing, so a sparse stored
/// object comes back out unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text(String),
    Hero(HeroContent),
    Cta(CtaContent),
    Features(FeaturesContent),
    Testimonials(TestimonialsContent),
    Faq(FaqContent),
    Pricing(PricingContent),
    Contact(ContactContent),
    Custom(Value),
    /// Payload whose type name is unrecognised or whose shape does not fit
    /// its declared type. Rendered as a raw dump.
    Unknown { type_name: String, raw: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeroContent {
    Headline(String),
    Banner(HeroBanner),
}

impl Default for HeroContent {
    fn default() -> Self {
        HeroContent::Headline(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroBanner {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub button_text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub button_link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaContent {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub button_text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub button_link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesContent {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<FeatureItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureItem {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialsContent {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Testimonial>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Testimonial {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub quote: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqContent {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<FaqItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub question: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub answer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingContent {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plans: Vec<PricingPlan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPlan {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub price: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactContent {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn decode<T: DeserializeOwned>(block_type: BlockType, value: Value) -> Result<T, ModelError> {
    if !value.is_object() {
        return Err(ModelError::InvalidContent {
            block_type,
            reason: "expected an object".to_string(),
        });
    }
    serde_json::from_value(value).map_err(|e| ModelError::InvalidContent {
        block_type,
        reason: e.to_string(),
    })
}

impl BlockContent {
    /// Empty payload of the given type
    pub fn empty(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Text => BlockContent::Text(String::new()),
            BlockType::Hero => BlockContent::Hero(HeroContent::default()),
            BlockType::Cta => BlockContent::Cta(CtaContent::default()),
            BlockType::Features => BlockContent::Features(FeaturesContent::default()),
            BlockType::Testimonials => BlockContent::Testimonials(TestimonialsContent::default()),
            BlockType::Faq => BlockContent::Faq(FaqContent::default()),
            BlockType::Pricing => BlockContent::Pricing(PricingContent::default()),
            BlockType::Contact => BlockContent::Contact(ContactContent::default()),
            BlockType::Custom => BlockContent::Custom(Value::String(String::new())),
        }
    }

    /// Build a payload, rejecting values whose shape does not fit the type.
    /// `null` yields the empty payload.
    pub fn try_from_value(block_type: BlockType, value: Value) -> Result<Self, ModelError> {
        if value.is_null() {
            return Ok(Self::empty(block_type));
        }

        let content = match block_type {
            BlockType::Text => match value {
                Value::String(text) => BlockContent::Text(text),
                _ => {
                    return Err(ModelError::InvalidContent {
                        block_type,
                        reason: "expected a string".to_string(),
                    })
                }
            },
            BlockType::Hero => match value {
                Value::String(headline) => BlockContent::Hero(HeroContent::Headline(headline)),
                other => BlockContent::Hero(HeroContent::Banner(decode(block_type, other)?)),
            },
            BlockType::Cta => BlockContent::Cta(decode(block_type, value)?),
            BlockType::Features => BlockContent::Features(decode(block_type, value)?),
            BlockType::Testimonials => BlockContent::Testimonials(decode(block_type, value)?),
            BlockType::Faq => BlockContent::Faq(decode(block_type, value)?),
            BlockType::Pricing => BlockContent::Pricing(decode(block_type, value)?),
            BlockType::Contact => BlockContent::Contact(decode(block_type, value)?),
            BlockType::Custom => BlockContent::Custom(value),
        };

        Ok(content)
    }

    /// Build a payload from stored data without ever failing; anything that
    /// does not fit becomes `Unknown` and keeps the raw value.
    pub fn from_value(type_name: &str, value: Value) -> Self {
        let Ok(block_type) = type_name.parse::<BlockType>() else {
            return BlockContent::Unknown {
                type_name: type_name.to_string(),
                raw: value,
            };
        };

        match Self::try_from_value(block_type, value.clone()) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(block_type = %block_type, error = %e, "Keeping block content as raw value");
                BlockContent::Unknown {
                    type_name: type_name.to_string(),
                    raw: value,
                }
            }
        }
    }

    pub fn to_value(&self) -> Value {
        let value = match self {
            BlockContent::Text(text) => Ok(Value::String(text.clone())),
            BlockContent::Hero(hero) => serde_json::to_value(hero),
            BlockContent::Cta(cta) => serde_json::to_value(cta),
            BlockContent::Features(features) => serde_json::to_value(features),
            BlockContent::Testimonials(testimonials) => serde_json::to_value(testimonials),
            BlockContent::Faq(faq) => serde_json::to_value(faq),
            BlockContent::Pricing(pricing) => serde_json::to_value(pricing),
            BlockContent::Contact(contact) => serde_json::to_value(contact),
            BlockContent::Custom(value) => Ok(value.clone()),
            BlockContent::Unknown { raw, .. } => Ok(raw.clone()),
        };
        value.unwrap_or_default()
    }

    pub fn block_type(&self) -> Option<BlockType> {
        match self {
            BlockContent::Text(_) => Some(BlockType::Text),
            BlockContent::Hero(_) => Some(BlockType::Hero),
            BlockContent::Cta(_) => Some(BlockType::Cta),
            BlockContent::Features(_) => Some(BlockType::Features),
            BlockContent::Testimonials(_) => Some(BlockType::Testimonials),
            BlockContent::Faq(_) => Some(BlockType::Faq),
            BlockContent::Pricing(_) => Some(BlockType::Pricing),
            BlockContent::Contact(_) => Some(BlockType::Contact),
            BlockContent::Custom(_) => Some(BlockType::Custom),
            BlockContent::Unknown { .. } => None,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            BlockContent::Unknown { type_name, .. } => type_name,
            other => other.block_type().map(|t| t.as_str()).unwrap_or_default(),
        }
    }

    /// True when the payload carries nothing worth publishing
    pub fn is_empty(&self) -> bool {
        match self {
            BlockContent::Text(text) => blank(text),
            BlockContent::Hero(HeroContent::Headline(headline)) => blank(headline),
            BlockContent::Hero(HeroContent::Banner(banner)) => {
                blank(&banner.title)
                    && blank(&banner.subtitle)
                    && blank(&banner.button_text)
                    && banner.extra.is_empty()
            }
            BlockContent::Cta(cta) => {
                blank(&cta.title) && blank(&cta.description) && blank(&cta.button_text)
            }
            BlockContent::Features(features) => blank(&features.title) && features.items.is_empty(),
            BlockContent::Testimonials(t) => blank(&t.title) && t.items.is_empty(),
            BlockContent::Faq(faq) => blank(&faq.title) && faq.items.is_empty(),
            BlockContent::Pricing(pricing) => blank(&pricing.title) && pricing.plans.is_empty(),
            BlockContent::Contact(contact) => {
                blank(&contact.title)
                    && blank(&contact.email)
                    && blank(&contact.phone)
                    && blank(&contact.address)
            }
            BlockContent::Custom(value) | BlockContent::Unknown { raw: value, .. } => match value {
                Value::Null => true,
                Value::String(text) => blank(text),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
                _ => false,
            },
        }
    }
}
