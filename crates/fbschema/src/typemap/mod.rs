//! Type mapping from engine type descriptors to portable DDL.
//!
//! Domains, columns and procedure parameters all resolve their DDL type
//! through [`map_type`]; nothing else in the crate interprets type codes.

use crate::core::schema::TypeDescriptor;

/// Sentinel returned for type codes (or incomplete descriptors) with no mapping.
pub const UNKNOWN_TYPE: &str = "UNKNOWN";

pub const SMALLINT: i32 = 7;
pub const INTEGER: i32 = 8;
pub const FLOAT: i32 = 10;
pub const DATE: i32 = 12;
pub const TIME: i32 = 13;
pub const CHAR: i32 = 14;
pub const INT64: i32 = 16;
pub const DOUBLE: i32 = 27;
pub const TIMESTAMP: i32 = 35;
pub const VARCHAR: i32 = 37;
pub const BLOB: i32 = 261;

/// INT64 subtype that marks a NUMERIC column.
const NUMERIC_SUB_TYPE: i32 = 1;

/// Map an engine type descriptor to a DDL type string.
///
/// Total: unknown codes, and CHAR/VARCHAR/NUMERIC descriptors missing the
/// length or precision they need, map to [`UNKNOWN_TYPE`].
pub fn map_type(desc: &TypeDescriptor) -> String {
    match desc.type_code {
        SMALLINT => "SMALLINT".to_string(),
        INTEGER => "INTEGER".to_string(),
        FLOAT => "FLOAT".to_string(),
        DATE => "DATE".to_string(),
        TIME => "TIME".to_string(),
        CHAR => match desc.character_length {
            Some(len) => format!("CHAR({})", len),
            None => UNKNOWN_TYPE.to_string(),
        },
        INT64 if desc.sub_type == Some(NUMERIC_SUB_TYPE) => match desc.precision {
            // Scale is stored negative (NUMERIC(10,2) has scale -2).
            Some(precision) => format!(
                "NUMERIC({}, {})",
                precision,
                desc.scale.unwrap_or(0).abs()
            ),
            None => UNKNOWN_TYPE.to_string(),
        },
        INT64 => "BIGINT".to_string(),
        DOUBLE => "DOUBLE PRECISION".to_string(),
        TIMESTAMP => "TIMESTAMP".to_string(),
        VARCHAR => match desc.character_length {
            Some(len) => format!("VARCHAR({})", len),
            None => UNKNOWN_TYPE.to_string(),
        },
        BLOB => "BLOB".to_string(),
        _ => UNKNOWN_TYPE.to_string(),
    }
}

/// Whether `map_type` yields a concrete type for this descriptor.
pub fn is_mapped(desc: &TypeDescriptor) -> bool {
    map_type(desc) != UNKNOWN_TYPE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_code_matrix() {
        let cases = [
            (TypeDescriptor::new(7), "SMALLINT"),
            (TypeDescriptor::new(8), "INTEGER"),
            (TypeDescriptor::new(10), "FLOAT"),
            (TypeDescriptor::new(12), "DATE"),
            (TypeDescriptor::new(13), "TIME"),
            (TypeDescriptor::new(14).with_character_length(10), "CHAR(10)"),
            (TypeDescriptor::new(16), "BIGINT"),
            (TypeDescriptor::new(16).with_sub_type(0), "BIGINT"),
            (
                TypeDescriptor::new(16)
                    .with_sub_type(1)
                    .with_precision(18)
                    .with_scale(-4),
                "NUMERIC(18, 4)",
            ),
            (TypeDescriptor::new(27), "DOUBLE PRECISION"),
            (TypeDescriptor::new(35), "TIMESTAMP"),
            (TypeDescriptor::new(37).with_character_length(50), "VARCHAR(50)"),
            (TypeDescriptor::new(261), "BLOB"),
            (TypeDescriptor::new(261).with_sub_type(1), "BLOB"),
        ];

        for (desc, expected) in cases {
            assert_eq!(map_type(&desc), expected, "type code {}", desc.type_code);
        }
    }

    #[test]
    fn test_unknown_codes_map_to_sentinel() {
        for code in [0, 9, 23, 40, 45, 260, 262, -1, i32::MAX] {
            assert_eq!(map_type(&TypeDescriptor::new(code)), UNKNOWN_TYPE);
        }
    }

    #[test]
    fn test_missing_required_attributes_map_to_sentinel() {
        assert_eq!(map_type(&TypeDescriptor::new(14)), UNKNOWN_TYPE);
        assert_eq!(map_type(&TypeDescriptor::new(37)), UNKNOWN_TYPE);
        assert_eq!(map_type(&TypeDescriptor::new(16).with_sub_type(1)), UNKNOWN_TYPE);
        assert!(!is_mapped(&TypeDescriptor::new(37)));
    }

    #[test]
    fn test_numeric_without_scale_defaults_to_zero() {
        let desc = TypeDescriptor::new(16).with_sub_type(1).with_precision(9);
        assert_eq!(map_type(&desc), "NUMERIC(9, 0)");
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let desc = TypeDescriptor::new(37).with_character_length(255);
        assert_eq!(map_type(&desc), map_type(&desc));
        assert_eq!(desc.ddl_type(), "VARCHAR(255)");
    }

    #[test]
    fn test_character_length_ignored_for_fixed_types() {
        let desc = TypeDescriptor::new(8).with_character_length(4);
        assert_eq!(map_type(&desc), "INTEGER");
    }
}
