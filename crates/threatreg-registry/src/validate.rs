//! Input checks shared by the entity modules. All run before any write.

use threatreg_core::constants::RESERVED_LABEL_PREFIX;
use threatreg_core::errors::ValidationError;
use threatreg_core::types::{AttributeType, ComponentId};

/// Trimmed, non-empty text.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(value.to_string())
}

/// Empty, or `#RRGGBB`.
pub(crate) fn color(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(ValidationError::InvalidColor {
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Relationship label chosen by a caller. Reserved labels are refused.
pub(crate) fn user_label(label: &str) -> Result<String, ValidationError> {
    let label = required("label", label)?;
    if label.starts_with(RESERVED_LABEL_PREFIX) {
        return Err(ValidationError::ReservedLabel { label });
    }
    Ok(label)
}

pub(crate) fn distinct_endpoints(from: ComponentId, to: ComponentId) -> Result<(), ValidationError> {
    if from.is_nil() {
        return Err(ValidationError::Required { field: "from_id" });
    }
    if to.is_nil() {
        return Err(ValidationError::Required { field: "to_id" });
    }
    if from == to {
        return Err(ValidationError::SelfRelationship);
    }
    Ok(())
}

/// Shape check of an attribute value. A `component` value is returned as the
/// id it names so the caller can check that it exists.
pub(crate) fn attribute_value(
    attribute_type: AttributeType,
    value: &str,
) -> Result<Option<ComponentId>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required { field: "value" });
    }
    match attribute_type {
        AttributeType::String | AttributeType::Text => Ok(None),
        AttributeType::Number => {
            if value.parse::<i64>().is_ok() || value.parse::<f64>().is_ok() {
                Ok(None)
            } else {
                Err(ValidationError::InvalidAttributeValue {
                    attribute_type: "number",
                    message: format!("'{value}' is not a number"),
                })
            }
        }
        AttributeType::Component => value.parse::<ComponentId>().map(Some).map_err(|e| {
            ValidationError::InvalidAttributeValue {
                attribute_type: "component",
                message: e.to_string(),
            }
        }),
    }
}
