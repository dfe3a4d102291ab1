//! Catalog descriptor types.
//!
//! Descriptors are read-only snapshots built once from catalog rows and
//! consumed by the DDL generator. Nothing mutates them after construction.

use serde::{Deserialize, Serialize};

use crate::typemap::map_type;

/// Engine-internal type description of a domain, column or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Engine type code (RDB$FIELD_TYPE).
    pub type_code: i32,

    /// Declared character length for CHAR/VARCHAR.
    pub character_length: Option<i32>,

    /// Numeric precision.
    pub precision: Option<i32>,

    /// Numeric scale as stored by the engine (zero or negative).
    pub scale: Option<i32>,

    /// Type subtype (RDB$FIELD_SUB_TYPE).
    pub sub_type: Option<i32>,
}

impl TypeDescriptor {
    /// Descriptor with only a type code set.
    pub fn new(type_code: i32) -> Self {
        Self {
            type_code,
            ..Self::default()
        }
    }

    pub fn with_character_length(mut self, length: i32) -> Self {
        self.character_length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_scale(mut self, scale: i32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_sub_type(mut self, sub_type: i32) -> Self {
        self.sub_type = Some(sub_type);
        self
    }

    /// Portable DDL type string for this descriptor.
    pub fn ddl_type(&self) -> String {
        map_type(self)
    }
}

/// A named, reusable column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainDescriptor {
    pub name: String,
    pub data_type: TypeDescriptor,

    /// Validation clause text, kept verbatim (e.g. `CHECK (VALUE > 0)`).
    pub validation_expression: Option<String>,

    pub not_null: bool,
}

/// Column metadata. Owned by exactly one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: TypeDescriptor,
    pub not_null: bool,

    /// Default clause text, kept verbatim (e.g. `DEFAULT 0`).
    pub default_expression: Option<String>,
}

/// Table-level constraint.
///
/// Column lists hold one entry per index segment, in segment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintDescriptor {
    PrimaryKey {
        name: String,
        columns: Vec<String>,
    },
    Unique {
        name: String,
        columns: Vec<String>,
    },
    ForeignKey {
        name: String,
        columns: Vec<String>,
        referenced_table: String,
        referenced_columns: Vec<String>,
    },
    Check {
        name: String,
        /// Check source from the catalog, usually `CHECK (...)`.
        source: Option<String>,
    },
}

impl ConstraintDescriptor {
    pub fn primary_key(name: impl Into<String>, column: impl Into<String>) -> Self {
        ConstraintDescriptor::PrimaryKey {
            name: name.into(),
            columns: vec![column.into()],
        }
    }

    pub fn unique(name: impl Into<String>, column: impl Into<String>) -> Self {
        ConstraintDescriptor::Unique {
            name: name.into(),
            columns: vec![column.into()],
        }
    }

    pub fn foreign_key(
        name: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        ConstraintDescriptor::ForeignKey {
            name: name.into(),
            columns: vec![column.into()],
            referenced_table: referenced_table.into(),
            referenced_columns: vec![referenced_column.into()],
        }
    }

    pub fn check(name: impl Into<String>, source: Option<String>) -> Self {
        ConstraintDescriptor::Check {
            name: name.into(),
            source,
        }
    }

    /// Constraint name.
    pub fn name(&self) -> &str {
        match self {
            ConstraintDescriptor::PrimaryKey { name, .. }
            | ConstraintDescriptor::Unique { name, .. }
            | ConstraintDescriptor::ForeignKey { name, .. }
            | ConstraintDescriptor::Check { name, .. } => name,
        }
    }
}

/// Table metadata, the unit of DDL emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,

    /// Columns in catalog position order.
    pub columns: Vec<ColumnDescriptor>,

    /// Constraints in catalog scan order.
    pub constraints: Vec<ConstraintDescriptor>,
}

/// Stored procedure parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureParameter {
    pub name: String,
    pub data_type: TypeDescriptor,
    pub is_output: bool,
}

/// Stored procedure metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDescriptor {
    pub name: String,

    /// Procedure body exactly as stored (RDB$PROCEDURE_SOURCE).
    pub body_source: String,

    /// Parameters ordered by catalog parameter number.
    pub parameters: Vec<ProcedureParameter>,
}

impl ProcedureDescriptor {
    pub fn inputs(&self) -> impl Iterator<Item = &ProcedureParameter> {
        self.parameters.iter().filter(|p| !p.is_output)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &ProcedureParameter> {
        self.parameters.iter().filter(|p| p.is_output)
    }
}
