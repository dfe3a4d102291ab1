//! System catalog queries.
//!
//! Type columns always appear in the same order (type code, character
//! length, precision, scale, subtype) so one decoder serves domains,
//! columns and parameters.

/// User domains. Implicit per-column domains (`RDB$nnn`) are excluded.
pub const DOMAINS: &str = r#"
    SELECT f.RDB$FIELD_NAME,
           f.RDB$FIELD_TYPE, f.RDB$CHARACTER_LENGTH, f.RDB$FIELD_PRECISION,
           f.RDB$FIELD_SCALE, f.RDB$FIELD_SUB_TYPE,
           f.RDB$VALIDATION_SOURCE, f.RDB$NULL_FLAG
    FROM RDB$FIELDS f
    WHERE f.RDB$SYSTEM_FLAG = 0
      AND f.RDB$FIELD_NAME NOT STARTING WITH 'RDB$'
    ORDER BY f.RDB$FIELD_NAME
"#;

/// User tables; relations with view BLR are views and are skipped.
pub const TABLES: &str = r#"
    SELECT r.RDB$RELATION_NAME
    FROM RDB$RELATIONS r
    WHERE r.RDB$SYSTEM_FLAG = 0
      AND r.RDB$VIEW_BLR IS NULL
    ORDER BY r.RDB$RELATION_NAME
"#;

/// Columns of one table in position order. Nullability and default fall
/// back to the column's domain.
pub const COLUMNS: &str = r#"
    SELECT rf.RDB$FIELD_NAME,
           f.RDB$FIELD_TYPE, f.RDB$CHARACTER_LENGTH, f.RDB$FIELD_PRECISION,
           f.RDB$FIELD_SCALE, f.RDB$FIELD_SUB_TYPE,
           COALESCE(rf.RDB$NULL_FLAG, f.RDB$NULL_FLAG),
           COALESCE(rf.RDB$DEFAULT_SOURCE, f.RDB$DEFAULT_SOURCE)
    FROM RDB$RELATION_FIELDS rf
    JOIN RDB$FIELDS f ON f.RDB$FIELD_NAME = rf.RDB$FIELD_SOURCE
    WHERE rf.RDB$RELATION_NAME = ?
    ORDER BY rf.RDB$FIELD_POSITION
"#;

/// Constraints of one table, one row per index segment.
///
/// Columns: name, type, segment column, referenced table, referenced
/// column, check source, segment position.
pub const CONSTRAINTS: &str = r#"
    SELECT rc.RDB$CONSTRAINT_NAME,
           rc.RDB$CONSTRAINT_TYPE,
           seg.RDB$FIELD_NAME,
           ref_rc.RDB$RELATION_NAME,
           ref_seg.RDB$FIELD_NAME,
           (SELECT FIRST 1 t.RDB$TRIGGER_SOURCE
              FROM RDB$CHECK_CONSTRAINTS cc
              JOIN RDB$TRIGGERS t ON t.RDB$TRIGGER_NAME = cc.RDB$TRIGGER_NAME
             WHERE cc.RDB$CONSTRAINT_NAME = rc.RDB$CONSTRAINT_NAME),
           seg.RDB$FIELD_POSITION
    FROM RDB$RELATION_CONSTRAINTS rc
    LEFT JOIN RDB$INDEX_SEGMENTS seg
           ON seg.RDB$INDEX_NAME = rc.RDB$INDEX_NAME
    LEFT JOIN RDB$REF_CONSTRAINTS ref
           ON ref.RDB$CONSTRAINT_NAME = rc.RDB$CONSTRAINT_NAME
    LEFT JOIN RDB$RELATION_CONSTRAINTS ref_rc
           ON ref_rc.RDB$CONSTRAINT_NAME = ref.RDB$CONST_NAME_UQ
    LEFT JOIN RDB$INDEX_SEGMENTS ref_seg
           ON ref_seg.RDB$INDEX_NAME = ref_rc.RDB$INDEX_NAME
          AND ref_seg.RDB$FIELD_POSITION = seg.RDB$FIELD_POSITION
    WHERE rc.RDB$RELATION_NAME = ?
"#;

/// User procedures with their stored source.
pub const PROCEDURES: &str = r#"
    SELECT p.RDB$PROCEDURE_NAME, p.RDB$PROCEDURE_SOURCE
    FROM RDB$PROCEDURES p
    WHERE p.RDB$SYSTEM_FLAG = 0
    ORDER BY p.RDB$PROCEDURE_NAME
"#;

/// Parameters of one procedure in parameter-number order
/// (RDB$PARAMETER_TYPE: 0 input, 1 output).
pub const PARAMETERS: &str = r#"
    SELECT pp.RDB$PARAMETER_NAME, pp.RDB$PARAMETER_TYPE,
           f.RDB$FIELD_TYPE, f.RDB$CHARACTER_LENGTH, f.RDB$FIELD_PRECISION,
           f.RDB$FIELD_SCALE, f.RDB$FIELD_SUB_TYPE
    FROM RDB$PROCEDURE_PARAMETERS pp
    JOIN RDB$FIELDS f ON f.RDB$FIELD_NAME = pp.RDB$FIELD_SOURCE
    WHERE pp.RDB$PROCEDURE_NAME = ?
    ORDER BY pp.RDB$PARAMETER_NUMBER
"#;
