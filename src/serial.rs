//! Binary serialization and deserialization of compiled rule books.
//!
//! This module provides a stable binary format for persisting compiled
//! [`RuleBook`](crate::RuleBook) values together with the catalog they were
//! compiled against. The format consists of a 32-byte fixed header followed
//! by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"ATRF"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CompiledAction, CompiledRule, Effect};
use crate::{Attribute, AttributeValue, Catalog, Diagnostic, QuantityConstraints, RuleBook};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"ATRF";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`RuleBook`](crate::RuleBook) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode rule book: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`RuleBook`](crate::RuleBook) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not an attrflow binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRuleBook {
    metadata: RuleBookMetadata,
    attributes: Vec<SerializedAttribute>,
    rules: Vec<SerializedRule>,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleBookMetadata {
    rule_count: usize,
    attribute_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedAttribute {
    id: String,
    name: String,
    values: Vec<SerializedAttributeValue>,
    default_value: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedAttributeValue {
    value: String,
    label: String,
    price_multiplier: Option<f64>,
    image: Option<String>,
    has_sub_attributes: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRule {
    id: String,
    name: String,
    attribute_slot: usize,
    expected: String,
    actions: Vec<SerializedAction>,
    priority: i64,
    position: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedAction {
    target_slot: usize,
    effect: SerializedEffect,
}

#[derive(Debug, Serialize, Deserialize)]
enum SerializedEffect {
    Show,
    Hide,
    Restrict(Vec<String>),
    SetDefault(String),
    Quantity {
        min: Option<u32>,
        max: Option<u32>,
        step: Option<u32>,
    },
}

// ---------------------------------------------------------------------------
// Catalog conversion
// ---------------------------------------------------------------------------

fn serialize_attribute(attribute: &Attribute) -> SerializedAttribute {
    SerializedAttribute {
        id: attribute.id.clone(),
        name: attribute.name.clone(),
        values: attribute
            .values
            .iter()
            .map(|v| SerializedAttributeValue {
                value: v.value.clone(),
                label: v.label.clone(),
                price_multiplier: v.price_multiplier,
                image: v.image.clone(),
                has_sub_attributes: v.has_sub_attributes,
            })
            .collect(),
        default_value: attribute.default_value.clone(),
    }
}

fn deserialize_attribute(attribute: SerializedAttribute) -> Attribute {
    Attribute {
        id: attribute.id,
        name: attribute.name,
        values: attribute
            .values
            .into_iter()
            .map(|v| AttributeValue {
                value: v.value,
                label: v.label,
                price_multiplier: v.price_multiplier,
                image: v.image,
                has_sub_attributes: v.has_sub_attributes,
            })
            .collect(),
        default_value: attribute.default_value,
    }
}

// ---------------------------------------------------------------------------
// Effect conversion
// ---------------------------------------------------------------------------

fn serialize_effect(effect: &Effect) -> SerializedEffect {
    match effect {
        Effect::Show => SerializedEffect::Show,
        Effect::Hide => SerializedEffect::Hide,
        Effect::Restrict(values) => SerializedEffect::Restrict(values.clone()),
        Effect::SetDefault(value) => SerializedEffect::SetDefault(value.clone()),
        Effect::Quantity(q) => SerializedEffect::Quantity {
            min: q.min,
            max: q.max,
            step: q.step,
        },
    }
}

fn deserialize_effect(effect: SerializedEffect) -> Effect {
    match effect {
        SerializedEffect::Show => Effect::Show,
        SerializedEffect::Hide => Effect::Hide,
        SerializedEffect::Restrict(values) => Effect::Restrict(values),
        SerializedEffect::SetDefault(value) => Effect::SetDefault(value),
        SerializedEffect::Quantity { min, max, step } => {
            Effect::Quantity(QuantityConstraints::new(min, max, step))
        }
    }
}

// ---------------------------------------------------------------------------
// RuleBook -> SerializedRuleBook
// ---------------------------------------------------------------------------

fn rulebook_to_serialized(book: &RuleBook, source_text: Option<&str>) -> SerializedRuleBook {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());

    let rules = book
        .rules
        .iter()
        .map(|r| SerializedRule {
            id: r.id.clone(),
            name: r.name.clone(),
            attribute_slot: r.attribute,
            expected: r.expected.clone(),
            actions: r
                .actions
                .iter()
                .map(|a| SerializedAction {
                    target_slot: a.target,
                    effect: serialize_effect(&a.effect),
                })
                .collect(),
            priority: r.priority,
            position: r.position,
        })
        .collect();

    SerializedRuleBook {
        metadata: RuleBookMetadata {
            rule_count: book.rules.len(),
            attribute_count: book.catalog.len(),
            source_digest,
        },
        attributes: book.catalog.iter().map(serialize_attribute).collect(),
        rules,
        diagnostics: book.diagnostics.clone(),
    }
}

// ---------------------------------------------------------------------------
// SerializedRuleBook -> RuleBook
// ---------------------------------------------------------------------------

fn serialized_to_rulebook(ser: SerializedRuleBook) -> Result<RuleBook, DeserializeError> {
    validate(&ser)?;

    let catalog = Catalog::new(ser.attributes.into_iter().map(deserialize_attribute));

    let rules = ser
        .rules
        .into_iter()
        .map(|r| CompiledRule {
            id: r.id,
            name: r.name,
            attribute: r.attribute_slot,
            expected: r.expected,
            actions: r
                .actions
                .into_iter()
                .map(|a| CompiledAction {
                    target: a.target_slot,
                    effect: deserialize_effect(a.effect),
                })
                .collect(),
            priority: r.priority,
            position: r.position,
        })
        .collect();

    Ok(RuleBook {
        catalog,
        rules,
        diagnostics: ser.diagnostics,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(ser: &SerializedRuleBook) -> Result<(), DeserializeError> {
    let attribute_count = ser.attributes.len();
    let rule_count = ser.rules.len();

    // Metadata consistency
    if ser.metadata.rule_count != rule_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} rules but payload has {}",
            ser.metadata.rule_count, rule_count
        )));
    }
    if ser.metadata.attribute_count != attribute_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} attributes but payload has {}",
            ser.metadata.attribute_count, attribute_count
        )));
    }

    // Attribute ids unique
    let mut seen = std::collections::HashSet::with_capacity(attribute_count);
    for attribute in &ser.attributes {
        if !seen.insert(attribute.id.as_str()) {
            return Err(DeserializeError::Validation(format!(
                "duplicate attribute id '{}'",
                attribute.id
            )));
        }
    }

    // Slot bounds and restriction contents
    for rule in &ser.rules {
        if rule.attribute_slot >= attribute_count {
            return Err(DeserializeError::Validation(format!(
                "rule '{}' conditions on slot {} out of bounds (max {attribute_count})",
                rule.id, rule.attribute_slot
            )));
        }
        for action in &rule.actions {
            validate_action(action, &ser.attributes, &rule.id)?;
        }
    }

    // Execution order: priority descending, input order within a priority
    for window in ser.rules.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        if a.priority < b.priority {
            return Err(DeserializeError::Validation(
                "rules not sorted by descending priority".to_owned(),
            ));
        }
        if a.priority == b.priority && a.position >= b.position {
            return Err(DeserializeError::Validation(format!(
                "rules '{}' and '{}' share priority {} but are out of input order",
                a.id, b.id, a.priority
            )));
        }
    }

    Ok(())
}

fn validate_action(
    action: &SerializedAction,
    attributes: &[SerializedAttribute],
    rule_id: &str,
) -> Result<(), DeserializeError> {
    let Some(target) = attributes.get(action.target_slot) else {
        return Err(DeserializeError::Validation(format!(
            "rule '{rule_id}' targets slot {} out of bounds (max {})",
            action.target_slot,
            attributes.len()
        )));
    };
    if let SerializedEffect::Restrict(values) = &action.effect {
        if let Some(stray) = values
            .iter()
            .find(|v| !target.values.iter().any(|d| &d.value == *v))
        {
            return Err(DeserializeError::Validation(format!(
                "rule '{rule_id}' allows '{stray}' which attribute '{}' does not declare",
                target.id
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] engine version, bytes[8..12] flags
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(book: &RuleBook, source_text: Option<&str>) -> Result<Vec<u8>, SerializeError> {
    let serialized = rulebook_to_serialized(book, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<RuleBook, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_end = HEADER_SIZE + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[HEADER_SIZE..payload_end];

    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedRuleBook, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    tracing::debug!(
        rules = serialized.metadata.rule_count,
        attributes = serialized.metadata.attribute_count,
        "decoded rule book"
    );
    serialized_to_rulebook(serialized)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
