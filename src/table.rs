//! Entity schema to table specification and DDL rendering.

use indexmap::IndexMap;

use crate::column::{ColumnError, ColumnSpec, build_column};
use crate::names;
use crate::spec::{SchemaObject, SchemaRef};

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("entity {entity}: {source}")]
    Column {
        entity: String,
        #[source]
        source: ColumnError,
    },
    #[error("enum type {0} has no values")]
    EmptyEnum(String),
}

/// PostgreSQL reserved keywords; table names colliding with one of these
/// are double-quoted in rendered output.
const RESERVED_WORDS: &[&str] = &[
    "ALL", "ANALYSE", "ANALYZE", "AND", "ANY", "ARRAY", "AS", "ASC", "ASYMMETRIC",
    "AUTHORIZATION", "BINARY", "BOTH", "CASE", "CAST", "CHECK", "COLLATE", "COLLATION",
    "COLUMN", "CONCURRENTLY", "CONSTRAINT", "CREATE", "CROSS", "CURRENT_CATALOG",
    "CURRENT_DATE", "CURRENT_ROLE", "CURRENT_SCHEMA", "CURRENT_TIME", "CURRENT_TIMESTAMP",
    "CURRENT_USER", "DEFAULT", "DEFERRABLE", "DESC", "DISTINCT", "DO", "ELSE", "END",
    "EXCEPT", "FALSE", "FETCH", "FOR", "FOREIGN", "FREEZE", "FROM", "FULL", "GRANT", "GROUP",
    "HAVING", "ILIKE", "IN", "INITIALLY", "INNER", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "LATERAL", "LEADING", "LEFT", "LIKE", "LIMIT", "LOCALTIME", "LOCALTIMESTAMP", "NATURAL",
    "NOT", "NOTNULL", "NULL", "OFFSET", "ON", "ONLY", "OR", "ORDER", "OUTER", "OVERLAPS",
    "PLACING", "PRIMARY", "REFERENCES", "RETURNING", "RIGHT", "SELECT", "SESSION_USER",
    "SIMILAR", "SOME", "SYMMETRIC", "SYSTEM_USER", "TABLE", "TABLESAMPLE", "THEN", "TO",
    "TRAILING", "TRUE", "UNION", "UNIQUE", "USER", "USING", "VARIADIC", "VERBOSE", "WHEN",
    "WHERE", "WINDOW", "WITH",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// Target table of the inline `REFERENCES <table>(id)` clause.
    pub table: String,
    /// Column on the owning table that carries the clause.
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub values: Vec<String>,
}

/// One entity rendered as a table. An empty column list means no table
/// should be generated for the entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub foreign_keys: Vec<ForeignKey>,
    pub enums: Vec<EnumDecl>,
}

/// Build the table for one entity.
///
/// `schemas` is the document's full schema map, used only to resolve
/// `allOf` base references; a base that cannot be resolved contributes no
/// columns.
pub fn build_table(
    entity: &str,
    schema: &SchemaObject,
    schemas: &IndexMap<String, SchemaRef>,
) -> Result<TableSpec, TableError> {
    let name = names::pluralize(&names::to_snake_case(entity));
    let singular = names::singularize(&name);

    let mut table = TableSpec {
        name,
        ..TableSpec::default()
    };

    if schema.excluded() {
        return Ok(table);
    }

    if let Some(all_of) = &schema.all_of {
        let bases: Vec<&SchemaObject> = all_of
            .iter()
            .filter_map(|base| resolve(base, schemas))
            .collect();

        // One required set shared across all bases, regardless of which
        // base declared the field.
        let mut required = schema.required.clone();
        for base in &bases {
            required.extend_from_slice(&base.required);
        }

        for base in &bases {
            if let Some(properties) = &base.properties {
                push_columns(&mut table, entity, &singular, properties, &required)?;
            }
        }
    } else if let Some(properties) = &schema.properties {
        push_columns(&mut table, entity, &singular, properties, &schema.required)?;
    }

    Ok(table)
}

fn resolve<'a>(
    base: &'a SchemaRef,
    schemas: &'a IndexMap<String, SchemaRef>,
) -> Option<&'a SchemaObject> {
    match base.reference_target() {
        Some(target) => schemas.get(target).map(|s| &s.schema),
        None => Some(&base.schema),
    }
}

fn push_columns(
    table: &mut TableSpec,
    entity: &str,
    singular: &str,
    properties: &IndexMap<String, SchemaRef>,
    required: &[String],
) -> Result<(), TableError> {
    for (field_name, field) in properties {
        let column =
            build_column(singular, field_name, field, required).map_err(|source| {
                TableError::Column {
                    entity: entity.to_string(),
                    source,
                }
            })?;

        if let Some(target) = &column.references {
            table.foreign_keys.push(ForeignKey {
                table: target.clone(),
                column: column.name.clone(),
            });
        }
        if let Some(values) = &column.enum_values {
            table.enums.push(EnumDecl {
                name: column.sql_type.clone(),
                values: values.clone(),
            });
        }

        table.columns.push(column);
    }
    Ok(())
}

impl TableSpec {
    /// No columns: the entity exists only to be referenced, not persisted.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn quoted_name(&self) -> String {
        if RESERVED_WORDS.contains(&self.name.to_uppercase().as_str()) {
            format!("\"{}\"", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Render the entity's DDL fragment: one CREATE TYPE per enum column in
    /// column order, then the CREATE TABLE statement with inline foreign
    /// keys. No trailing newline.
    pub fn create_statement(&self) -> Result<String, TableError> {
        let mut sb = String::new();

        for decl in &self.enums {
            if decl.values.is_empty() {
                return Err(TableError::EmptyEnum(decl.name.clone()));
            }
            let values: Vec<String> = decl.values.iter().map(|v| format!("'{v}'")).collect();
            sb.push_str(&format!(
                "CREATE TYPE {} AS ENUM ({});\n",
                decl.name,
                values.join(", ")
            ));
        }

        let columns: Vec<String> = self.columns.iter().map(ColumnSpec::sql).collect();
        sb.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            self.quoted_name(),
            columns.join(", ")
        ));

        Ok(sb)
    }

    /// Deletion-first mode statement; placed ahead of all CREATE statements
    /// by the caller.
    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE;", self.quoted_name())
    }
}
