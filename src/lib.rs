pub mod column;
pub mod names;
pub mod queries;
pub mod spec;
pub mod table;
pub mod validate;

use spec::Document;
use table::TableSpec;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid specification document: {0}")]
    Spec(#[from] serde_yaml::Error),
    #[error(transparent)]
    Table(#[from] table::TableError),
    #[error("generated SQL failed validation: {0}")]
    Validate(#[from] validate::ValidateError),
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Emit a DROP TABLE statement per table, ahead of all CREATE statements.
    pub drop_tables: bool,
    /// Check the assembled text for syntactic well-formedness.
    pub validate: bool,
}

/// Generate the DDL script for a parsed document.
///
/// Entities are processed in declaration order; any builder error aborts
/// the whole run and no partial output is produced.
pub fn document_to_ddl(doc: &Document, options: &Options) -> Result<String, Error> {
    let mut tables: Vec<TableSpec> = Vec::new();

    if let Some(components) = &doc.components {
        for (entity, schema) in &components.schemas {
            let table = table::build_table(entity, &schema.schema, &components.schemas)?;
            if !table.is_empty() {
                tables.push(table);
            }
        }
    }

    let mut out = String::new();

    if options.drop_tables {
        for table in &tables {
            out.push_str(&table.drop_statement());
            out.push('\n');
        }
        if !tables.is_empty() {
            out.push('\n');
        }
    }

    for (i, table) in tables.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&table.create_statement()?);
        out.push('\n');
    }

    if options.validate && !out.is_empty() {
        validate::check(&out)?;
    }

    Ok(out)
}

/// Parse an OpenAPI document and generate its DDL script.
pub fn spec_to_ddl(source: &str, options: &Options) -> Result<String, Error> {
    let doc = Document::parse(source)?;
    document_to_ddl(&doc, options)
}
