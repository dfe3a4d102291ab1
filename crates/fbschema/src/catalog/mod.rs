//! Catalog reader: system tables to descriptors.
//!
//! One query lists each entity kind; tables and procedures then issue one
//! query per entity for their children (columns, constraints, parameters).
//! Any query or decode failure aborts the whole read with
//! [`SchemaError::CatalogRead`]; callers never see a partial result.

pub mod queries;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::core::schema::{
    ColumnDescriptor, ConstraintDescriptor, DomainDescriptor, ProcedureDescriptor,
    ProcedureParameter, TableDescriptor, TypeDescriptor,
};
use crate::core::traits::CatalogSource;
use crate::core::value::CatalogRow;
use crate::error::{Result, SchemaError};
use crate::typemap;

/// Reads domains, tables and procedures from a live catalog.
pub struct CatalogReader<'a, S: CatalogSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: CatalogSource + ?Sized> CatalogReader<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        Self { source }
    }

    /// Read all user domains, ordered by name.
    pub async fn read_domains(&mut self) -> Result<Vec<DomainDescriptor>> {
        let rows = self.run("domains", queries::DOMAINS, &[]).await?;

        let mut domains = Vec::with_capacity(rows.len());
        for row in rows {
            let domain = decode("domains", || {
                let name = row.text(0)?;
                let data_type = type_at(&row, 1)?;
                Ok(DomainDescriptor {
                    data_type,
                    validation_expression: row.raw_text(6)?.and_then(non_blank),
                    not_null: row.flag(7)?,
                    name,
                })
            })?;
            warn_unmapped("domain", &domain.name, &domain.data_type);
            debug!("Read domain {}", domain.name);
            domains.push(domain);
        }

        info!("Read {} domains", domains.len());
        Ok(domains)
    }

    /// Read all user tables (views excluded) with columns and constraints.
    pub async fn read_tables(&mut self) -> Result<Vec<TableDescriptor>> {
        let rows = self.run("tables", queries::TABLES, &[]).await?;

        let mut names = Vec::with_capacity(rows.len());
        let mut seen = HashSet::new();
        for row in rows {
            let name = decode("tables", || row.text(0))?;
            if !seen.insert(name.clone()) {
                return Err(SchemaError::catalog_read(
                    "tables",
                    format!("table {} listed more than once", name),
                ));
            }
            names.push(name);
        }

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let columns = self.read_columns(&name).await?;
            let constraints = self.read_constraints(&name).await?;
            debug!(
                "Read table {} ({} columns, {} constraints)",
                name,
                columns.len(),
                constraints.len()
            );
            tables.push(TableDescriptor {
                name,
                columns,
                constraints,
            });
        }

        info!("Read {} tables", tables.len());
        Ok(tables)
    }

    /// Read all user procedures with their parameters.
    pub async fn read_procedures(&mut self) -> Result<Vec<ProcedureDescriptor>> {
        let rows = self.run("procedures", queries::PROCEDURES, &[]).await?;

        let mut headers = Vec::with_capacity(rows.len());
        for row in rows {
            let header = decode("procedures", || Ok((row.text(0)?, row.raw_text(1)?)))?;
            headers.push(header);
        }

        let mut procedures = Vec::with_capacity(headers.len());
        for (name, source) in headers {
            let body_source = source.unwrap_or_else(|| {
                warn!("Procedure {} has no stored source; exporting an empty body", name);
                String::new()
            });
            let parameters = self.read_parameters(&name).await?;
            debug!("Read procedure {} ({} parameters)", name, parameters.len());
            procedures.push(ProcedureDescriptor {
                name,
                body_source,
                parameters,
            });
        }

        info!("Read {} procedures", procedures.len());
        Ok(procedures)
    }

    async fn read_columns(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let context = format!("columns of {}", table);
        let rows = self.run(&context, queries::COLUMNS, &[table]).await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let column = decode(&context, || {
                Ok(ColumnDescriptor {
                    name: row.text(0)?,
                    data_type: type_at(&row, 1)?,
                    not_null: row.flag(6)?,
                    default_expression: row.raw_text(7)?.and_then(non_blank),
                })
            })?;
            warn_unmapped("column", &format!("{}.{}", table, column.name), &column.data_type);
            columns.push(column);
        }
        Ok(columns)
    }

    async fn read_constraints(&mut self, table: &str) -> Result<Vec<ConstraintDescriptor>> {
        let context = format!("constraints of {}", table);
        let rows = self.run(&context, queries::CONSTRAINTS, &[table]).await?;

        // One row per index segment; group by constraint in first-seen order.
        let mut pending: Vec<PendingConstraint> = Vec::new();
        for row in rows {
            let (name, raw_kind) = decode(&context, || Ok((row.text(0)?, row.text(1)?)))?;

            let Some(kind) = ConstraintKind::parse(&raw_kind) else {
                if raw_kind.eq_ignore_ascii_case("NOT NULL") {
                    debug!("Skipping NOT NULL constraint {} on {}", name, table);
                } else {
                    warn!(
                        "Dropping constraint {} on {}: unrecognized type '{}'",
                        name, table, raw_kind
                    );
                }
                continue;
            };

            let segment = decode(&context, || {
                Ok(Segment {
                    position: row.opt_int(6)?.unwrap_or(0),
                    column: row.opt_text(2)?,
                    referenced_table: row.opt_text(3)?,
                    referenced_column: row.opt_text(4)?,
                })
            })?;
            let check_source = decode(&context, || row.raw_text(5))?.and_then(non_blank);

            match pending.iter_mut().find(|p| p.name == name) {
                Some(existing) => existing.segments.push(segment),
                None => pending.push(PendingConstraint {
                    name,
                    kind,
                    segments: vec![segment],
                    check_source,
                }),
            }
        }

        pending
            .into_iter()
            .map(|p| p.finish(table))
            .collect::<Result<Vec<_>>>()
    }

    async fn read_parameters(&mut self, procedure: &str) -> Result<Vec<ProcedureParameter>> {
        let context = format!("parameters of {}", procedure);
        let rows = self.run(&context, queries::PARAMETERS, &[procedure]).await?;

        let mut parameters = Vec::with_capacity(rows.len());
        for row in rows {
            let param = decode(&context, || {
                Ok(ProcedureParameter {
                    name: row.text(0)?,
                    is_output: row.int(1)? == 1,
                    data_type: type_at(&row, 2)?,
                })
            })?;
            warn_unmapped(
                "parameter",
                &format!("{}.{}", procedure, param.name),
                &param.data_type,
            );
            parameters.push(param);
        }
        Ok(parameters)
    }

    async fn run(&mut self, context: &str, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        self.source
            .query(sql, params)
            .await
            .map_err(|e| in_context(context, e))
    }
}

/// Constraint kinds the generator can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
}

impl ConstraintKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PRIMARY KEY" => Some(ConstraintKind::PrimaryKey),
            "UNIQUE" => Some(ConstraintKind::Unique),
            "FOREIGN KEY" => Some(ConstraintKind::ForeignKey),
            "CHECK" => Some(ConstraintKind::Check),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Segment {
    position: i32,
    column: Option<String>,
    referenced_table: Option<String>,
    referenced_column: Option<String>,
}

#[derive(Debug)]
struct PendingConstraint {
    name: String,
    kind: ConstraintKind,
    segments: Vec<Segment>,
    check_source: Option<String>,
}

impl PendingConstraint {
    fn finish(self, table: &str) -> Result<ConstraintDescriptor> {
        let context = format!("constraints of {}", table);
        match self.kind {
            ConstraintKind::Check => Ok(ConstraintDescriptor::Check {
                name: self.name,
                source: self.check_source,
            }),
            ConstraintKind::PrimaryKey => {
                let columns = self.columns(&context)?;
                Ok(ConstraintDescriptor::PrimaryKey {
                    name: self.name,
                    columns,
                })
            }
            ConstraintKind::Unique => {
                let columns = self.columns(&context)?;
                Ok(ConstraintDescriptor::Unique {
                    name: self.name,
                    columns,
                })
            }
            ConstraintKind::ForeignKey => {
                let columns = self.columns(&context)?;
                let (referenced_table, referenced_columns) = self.references(&context)?;
                Ok(ConstraintDescriptor::ForeignKey {
                    name: self.name,
                    columns,
                    referenced_table,
                    referenced_columns,
                })
            }
        }
    }

    fn ordered_segments(&self) -> Vec<&Segment> {
        let mut segments: Vec<&Segment> = self.segments.iter().collect();
        segments.sort_by_key(|s| s.position);
        segments
    }

    fn columns(&self, context: &str) -> Result<Vec<String>> {
        self.ordered_segments()
            .into_iter()
            .map(|s| {
                s.column.clone().ok_or_else(|| {
                    SchemaError::catalog_read(
                        context,
                        format!("constraint {} has no index segments", self.name),
                    )
                })
            })
            .collect()
    }

    fn references(&self, context: &str) -> Result<(String, Vec<String>)> {
        let missing = || {
            SchemaError::catalog_read(
                context,
                format!(
                    "foreign key {} is missing its referenced table or column",
                    self.name
                ),
            )
        };

        let mut table: Option<String> = None;
        let mut columns = Vec::with_capacity(self.segments.len());
        for segment in self.ordered_segments() {
            match (&segment.referenced_table, &segment.referenced_column) {
                (Some(t), Some(c)) => {
                    table.get_or_insert_with(|| t.clone());
                    columns.push(c.clone());
                }
                _ => return Err(missing()),
            }
        }
        Ok((table.ok_or_else(missing)?, columns))
    }
}

/// Decode the five type columns starting at `start`:
/// type code, character length, precision, scale, subtype.
fn type_at(row: &CatalogRow, start: usize) -> Result<TypeDescriptor> {
    Ok(TypeDescriptor {
        type_code: row.int(start)?,
        character_length: row.opt_int(start + 1)?,
        precision: row.opt_int(start + 2)?,
        scale: row.opt_int(start + 3)?,
        sub_type: row.opt_int(start + 4)?,
    })
}

fn decode<T>(context: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    f().map_err(|e| in_context(context, e))
}

/// Attach the read context to an error, turning driver errors into catalog failures.
fn in_context(context: &str, err: SchemaError) -> SchemaError {
    match err {
        SchemaError::CatalogRead { context: inner, message } => {
            SchemaError::catalog_read(format!("{}: {}", context, inner), message)
        }
        other => SchemaError::catalog_read(context, other.to_string()),
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.trim().to_string())
    }
}

fn warn_unmapped(kind: &str, name: &str, desc: &TypeDescriptor) {
    if !typemap::is_mapped(desc) {
        warn!(
            "{} {} has unmapped type (code {}); exporting as {}",
            kind,
            name,
            desc.type_code,
            typemap::UNKNOWN_TYPE
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::catalog_row;
    use crate::core::schema::ConstraintDescriptor as C;

    /// Catalog double answering queries from canned rows keyed by (sql, param).
    #[derive(Default)]
    struct ScriptedCatalog {
        rows: HashMap<(&'static str, String), Vec<CatalogRow>>,
        fail_on: Option<&'static str>,
        calls: Vec<(String, Vec<String>)>,
    }

    impl ScriptedCatalog {
        fn answer(mut self, sql: &'static str, param: &str, rows: Vec<CatalogRow>) -> Self {
            self.rows.insert((sql, param.to_string()), rows);
            self
        }
    }

    #[async_trait(?Send)]
    impl CatalogSource for ScriptedCatalog {
        async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
            self.calls
                .push((sql.to_string(), params.iter().map(|p| p.to_string()).collect()));
            if self.fail_on == Some(sql) {
                return Err(SchemaError::Driver("connection reset by peer".into()));
            }
            let key = params.first().copied().unwrap_or_default().to_string();
            Ok(self
                .rows
                .iter()
                .find(|((q, p), _)| *q == sql && *p == key)
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default())
        }
    }

    fn column(name: &str, code: i32, len: Option<i32>, not_null: bool) -> CatalogRow {
        catalog_row![
            name,
            code,
            len,
            None::<i32>,
            0,
            0,
            if not_null { Some(1) } else { None },
            None::<&str>
        ]
    }

    fn emp_catalog() -> ScriptedCatalog {
        ScriptedCatalog::default()
            .answer(queries::TABLES, "", vec![catalog_row!["EMP      "], catalog_row!["DEPT"]])
            .answer(
                queries::COLUMNS,
                "EMP",
                vec![
                    column("ID", 8, None, true),
                    column("NAME", 37, Some(50), false),
                    catalog_row![
                        "SALARY", 16, None::<i32>, 10, -2, 1, None::<i32>, "DEFAULT 0"
                    ],
                    column("DEPT_ID", 8, None, false),
                ],
            )
            .answer(
                queries::CONSTRAINTS,
                "EMP",
                vec![
                    catalog_row!["PK_EMP", "PRIMARY KEY", "ID", None::<&str>, None::<&str>, None::<&str>, 0],
                    catalog_row!["INTEG_1", "NOT NULL", None::<&str>, None::<&str>, None::<&str>, None::<&str>, None::<i32>],
                    catalog_row!["FK_EMP_DEPT", "FOREIGN KEY", "DEPT_ID", "DEPT", "ID", None::<&str>, 0],
                    catalog_row!["UQ_EMP_NAME", "UNIQUE", "NAME", None::<&str>, None::<&str>, None::<&str>, 0],
                    catalog_row!["CHK_SALARY", "CHECK", None::<&str>, None::<&str>, None::<&str>, "CHECK (SALARY >= 0)", None::<i32>],
                    catalog_row!["ODD_ONE", "EXCLUSION", "ID", None::<&str>, None::<&str>, None::<&str>, 0],
                ],
            )
            .answer(queries::COLUMNS, "DEPT", vec![column("ID", 8, None, true)])
            .answer(
                queries::CONSTRAINTS,
                "DEPT",
                vec![catalog_row!["PK_DEPT", "PRIMARY KEY", "ID", None::<&str>, None::<&str>, None::<&str>, 0]],
            )
    }

    #[tokio::test]
    async fn test_read_domains() {
        let mut catalog = ScriptedCatalog::default().answer(
            queries::DOMAINS,
            "",
            vec![
                catalog_row!["AGE", 7, None::<i32>, None::<i32>, 0, 0, "CHECK (VALUE > 0)  ", 1],
                catalog_row!["NAME", 37, 50, None::<i32>, 0, 0, None::<&str>, None::<i32>],
            ],
        );

        let domains = CatalogReader::new(&mut catalog).read_domains().await.unwrap();

        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].name, "AGE");
        assert_eq!(domains[0].data_type.ddl_type(), "SMALLINT");
        assert_eq!(domains[0].validation_expression.as_deref(), Some("CHECK (VALUE > 0)"));
        assert!(domains[0].not_null);
        assert_eq!(domains[1].data_type.ddl_type(), "VARCHAR(50)");
        assert!(!domains[1].not_null);
        assert!(domains[1].validation_expression.is_none());
    }

    #[tokio::test]
    async fn test_read_tables_preserves_column_order_and_classifies_constraints() {
        let mut catalog = emp_catalog();
        let tables = CatalogReader::new(&mut catalog).read_tables().await.unwrap();

        assert_eq!(tables.len(), 2);
        let emp = &tables[0];
        assert_eq!(emp.name, "EMP");

        let names: Vec<&str> = emp.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ID", "NAME", "SALARY", "DEPT_ID"]);
        assert!(emp.columns[0].not_null);
        assert_eq!(emp.columns[2].data_type.ddl_type(), "NUMERIC(10, 2)");
        assert_eq!(emp.columns[2].default_expression.as_deref(), Some("DEFAULT 0"));

        // NOT NULL and unknown kinds are dropped; the rest keep scan order.
        assert_eq!(
            emp.constraints,
            vec![
                C::primary_key("PK_EMP", "ID"),
                C::foreign_key("FK_EMP_DEPT", "DEPT_ID", "DEPT", "ID"),
                C::unique("UQ_EMP_NAME", "NAME"),
                C::check("CHK_SALARY", Some("CHECK (SALARY >= 0)".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_read_tables_issues_one_query_per_child_kind() {
        let mut catalog = emp_catalog();
        CatalogReader::new(&mut catalog).read_tables().await.unwrap();

        assert_eq!(catalog.calls.len(), 1 + 2 * 2);
        assert_eq!(catalog.calls[1].1, vec!["EMP".to_string()]);
        assert_eq!(catalog.calls[3].1, vec!["DEPT".to_string()]);
    }

    #[tokio::test]
    async fn test_composite_key_segments_are_merged_in_position_order() {
        let mut catalog = ScriptedCatalog::default()
            .answer(queries::TABLES, "", vec![catalog_row!["ORDER_LINE"]])
            .answer(
                queries::CONSTRAINTS,
                "ORDER_LINE",
                vec![
                    catalog_row!["PK_OL", "PRIMARY KEY", "LINE_NO", None::<&str>, None::<&str>, None::<&str>, 1],
                    catalog_row!["PK_OL", "PRIMARY KEY", "ORDER_ID", None::<&str>, None::<&str>, None::<&str>, 0],
                ],
            );

        let tables = CatalogReader::new(&mut catalog).read_tables().await.unwrap();
        assert_eq!(
            tables[0].constraints,
            vec![C::PrimaryKey {
                name: "PK_OL".into(),
                columns: vec!["ORDER_ID".into(), "LINE_NO".into()],
            }]
        );
    }

    #[tokio::test]
    async fn test_foreign_key_without_reference_is_an_error() {
        let mut catalog = ScriptedCatalog::default()
            .answer(queries::TABLES, "", vec![catalog_row!["EMP"]])
            .answer(
                queries::CONSTRAINTS,
                "EMP",
                vec![catalog_row!["FK_X", "FOREIGN KEY", "DEPT_ID", None::<&str>, None::<&str>, None::<&str>, 0]],
            );

        let err = CatalogReader::new(&mut catalog).read_tables().await.unwrap_err();
        match err {
            SchemaError::CatalogRead { context, message } => {
                assert_eq!(context, "constraints of EMP");
                assert!(message.contains("FK_X"));
            }
            other => panic!("expected CatalogRead, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_table_name_is_an_error() {
        let mut catalog = ScriptedCatalog::default()
            .answer(queries::TABLES, "", vec![catalog_row!["EMP"], catalog_row!["EMP "]]);
        assert!(CatalogReader::new(&mut catalog).read_tables().await.is_err());
    }

    #[tokio::test]
    async fn test_query_failure_aborts_with_context() {
        let mut catalog = emp_catalog();
        catalog.fail_on = Some(queries::CONSTRAINTS);

        let err = CatalogReader::new(&mut catalog).read_tables().await.unwrap_err();
        match err {
            SchemaError::CatalogRead { context, message } => {
                assert_eq!(context, "constraints of EMP");
                assert!(message.contains("connection reset"));
            }
            other => panic!("expected CatalogRead, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_row_is_an_error() {
        let mut catalog = ScriptedCatalog::default()
            .answer(queries::DOMAINS, "", vec![catalog_row!["AGE", "not-a-code"]]);
        let err = CatalogReader::new(&mut catalog).read_domains().await.unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CATALOG_ERROR);
    }

    #[tokio::test]
    async fn test_read_procedures_keeps_parameter_order() {
        let body = "\nBEGIN\n  SELECT NAME FROM EMP WHERE ID = :P_ID INTO :P_NAME;\n  SUSPEND;\nEND";
        let mut catalog = ScriptedCatalog::default()
            .answer(
                queries::PROCEDURES,
                "",
                vec![catalog_row!["GET_NAME", body], catalog_row!["NOOP", None::<&str>]],
            )
            .answer(
                queries::PARAMETERS,
                "GET_NAME",
                vec![
                    catalog_row!["P_ID", 0, 8, None::<i32>, None::<i32>, 0, 0],
                    catalog_row!["P_NAME", 1, 37, 50, None::<i32>, 0, 0],
                    catalog_row!["P_FLAG", 0, 7, None::<i32>, None::<i32>, 0, 0],
                ],
            );

        let procs = CatalogReader::new(&mut catalog).read_procedures().await.unwrap();

        assert_eq!(procs.len(), 2);
        assert_eq!(procs[0].body_source, body);
        let params: Vec<(&str, bool)> = procs[0]
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.is_output))
            .collect();
        assert_eq!(params, [("P_ID", false), ("P_NAME", true), ("P_FLAG", false)]);
        assert_eq!(procs[0].parameters[1].data_type.ddl_type(), "VARCHAR(50)");

        assert_eq!(procs[1].name, "NOOP");
        assert_eq!(procs[1].body_source, "");
        assert!(procs[1].parameters.is_empty());
    }

    #[test]
    fn test_constraint_kind_parse() {
        assert_eq!(ConstraintKind::parse("PRIMARY KEY"), Some(ConstraintKind::PrimaryKey));
        assert_eq!(ConstraintKind::parse("unique     "), Some(ConstraintKind::Unique));
        assert_eq!(ConstraintKind::parse("FOREIGN KEY"), Some(ConstraintKind::ForeignKey));
        assert_eq!(ConstraintKind::parse("CHECK"), Some(ConstraintKind::Check));
        assert_eq!(ConstraintKind::parse("NOT NULL"), None);
    }
}
