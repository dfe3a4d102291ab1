//! DDL generation from catalog descriptors.
//!
//! Pure text transcription: no validation is performed, and verbatim
//! catalog text (validation clauses, defaults, procedure bodies) is passed
//! through unchanged.

use crate::core::schema::{
    ColumnDescriptor, ConstraintDescriptor, DomainDescriptor, ProcedureDescriptor,
    ProcedureParameter, TableDescriptor,
};

const INDENT: &str = "    ";

/// `CREATE DOMAIN <name> AS <type> [NOT NULL] [<validation>];`
pub fn generate_domain_ddl(domain: &DomainDescriptor) -> String {
    let mut ddl = format!("CREATE DOMAIN {} AS {}", domain.name, domain.data_type.ddl_type());
    if domain.not_null {
        ddl.push_str(" NOT NULL");
    }
    if let Some(validation) = &domain.validation_expression {
        ddl.push(' ');
        ddl.push_str(validation);
    }
    ddl.push(';');
    ddl
}

/// `CREATE TABLE <name> (...);` with every column before every constraint,
/// one item per line.
pub fn generate_table_ddl(table: &TableDescriptor) -> String {
    let items: Vec<String> = table
        .columns
        .iter()
        .map(column_definition)
        .chain(table.constraints.iter().map(constraint_definition))
        .map(|item| format!("{}{}", INDENT, item))
        .collect();

    if items.is_empty() {
        return format!("CREATE TABLE {} (\n);", table.name);
    }
    format!("CREATE TABLE {} (\n{}\n);", table.name, items.join(",\n"))
}

/// `CREATE OR ALTER PROCEDURE <name> [(<inputs>)] [RETURNS (<outputs>)] AS`
/// followed by the stored body on the next line.
pub fn generate_procedure_ddl(procedure: &ProcedureDescriptor) -> String {
    format!("{}\n{}", procedure_header(procedure), procedure.body_source)
}

/// Header line of [`generate_procedure_ddl`].
pub fn procedure_header(procedure: &ProcedureDescriptor) -> String {
    let mut header = format!("CREATE OR ALTER PROCEDURE {}", procedure.name);

    let inputs: Vec<String> = procedure.inputs().map(parameter_definition).collect();
    if !inputs.is_empty() {
        header.push_str(&format!(" ({})", inputs.join(", ")));
    }

    let outputs: Vec<String> = procedure.outputs().map(parameter_definition).collect();
    if !outputs.is_empty() {
        header.push_str(&format!(" RETURNS ({})", outputs.join(", ")));
    }

    header.push_str(" AS");
    header
}

/// `<name> <type> [NOT NULL] [<default>]`
pub fn column_definition(column: &ColumnDescriptor) -> String {
    let mut def = format!("{} {}", column.name, column.data_type.ddl_type());
    if column.not_null {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default_expression {
        def.push(' ');
        def.push_str(default);
    }
    def
}

/// `CONSTRAINT <name> ...` for each constraint kind.
pub fn constraint_definition(constraint: &ConstraintDescriptor) -> String {
    match constraint {
        ConstraintDescriptor::PrimaryKey { name, columns } => {
            format!("CONSTRAINT {} PRIMARY KEY ({})", name, columns.join(", "))
        }
        ConstraintDescriptor::Unique { name, columns } => {
            format!("CONSTRAINT {} UNIQUE ({})", name, columns.join(", "))
        }
        ConstraintDescriptor::ForeignKey {
            name,
            columns,
            referenced_table,
            referenced_columns,
        } => format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            name,
            columns.join(", "),
            referenced_table,
            referenced_columns.join(", ")
        ),
        ConstraintDescriptor::Check { name, source } => match source {
            Some(source) => format!("CONSTRAINT {} {}", name, source),
            None => format!("CONSTRAINT {} CHECK", name),
        },
    }
}

fn parameter_definition(param: &ProcedureParameter) -> String {
    format!("{} {}", param.name, param.data_type.ddl_type())
}

/// Contents of `domains.sql`: one statement per line.
pub fn domains_script(domains: &[DomainDescriptor]) -> String {
    join_statements(domains.iter().map(generate_domain_ddl), "\n")
}

/// Contents of `tables.sql`: statements separated by a blank line.
pub fn tables_script(tables: &[TableDescriptor]) -> String {
    join_statements(tables.iter().map(generate_table_ddl), "\n\n")
}

fn join_statements(statements: impl Iterator<Item = String>, separator: &str) -> String {
    let mut script = statements.collect::<Vec<_>>().join(separator);
    if !script.is_empty() {
        script.push('\n');
    }
    script
}
