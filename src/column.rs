//! Field schema to column specification.

use serde_json::Value;

use crate::names;
use crate::spec::{SchemaObject, SchemaRef};

#[derive(Debug, thiserror::Error)]
pub enum ColumnError {
    #[error("unknown data type: {tag} (column {column})")]
    UnknownType { column: String, tag: String },
    #[error("no data type found for property: {0}")]
    MissingType(String),
}

/// Fixed `(type, format)` to PostgreSQL type mapping. An absent format is
/// the empty string. Anything not listed here is a fatal error for the
/// field, never a silent default.
const TYPE_MAP: &[((&str, &str), &str)] = &[
    (("integer", ""), "INTEGER"),
    (("integer", "int32"), "INTEGER"),
    (("integer", "int64"), "BIGINT"),
    (("number", ""), "NUMERIC"),
    (("number", "float"), "REAL"),
    (("number", "double"), "DOUBLE PRECISION"),
    (("boolean", ""), "BOOLEAN"),
    (("string", ""), "TEXT"),
    (("string", "password"), "TEXT"),
    (("string", "byte"), "BYTEA"),
    (("string", "binary"), "BYTEA"),
    (("string", "date"), "DATE"),
    (("string", "date-time"), "TIMESTAMP"),
    (("file", ""), "BYTEA"),
    (("array", ""), "JSON"),
    (("object", ""), "JSON"),
];

fn lookup_sql_type(type_tag: &str, format_tag: &str) -> Option<&'static str> {
    TYPE_MAP
        .iter()
        .find(|((t, f), _)| *t == type_tag && *f == format_tag)
        .map(|(_, sql)| *sql)
}

/// One column of a table, fully resolved and ready to render.
///
/// A column is a reference, an enum, or a plain scalar: `references` and
/// `enum_values` are never both populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub sql_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub primary_key: bool,
    pub unique: bool,
    pub checks: Vec<String>,
    /// Target table for an inline `REFERENCES <table>(id)` clause.
    pub references: Option<String>,
    /// Values of the synthesized enum type named by `sql_type`.
    pub enum_values: Option<Vec<String>>,
}

/// Build the column for one field of an entity.
///
/// `table_singular` is the singular of the owning table name, used to
/// synthesize enum type names. `required` is the entity's required-field
/// list; membership forces NOT NULL just like an explicit `nullable: false`.
pub fn build_column(
    table_singular: &str,
    field_name: &str,
    field: &SchemaRef,
    required: &[String],
) -> Result<ColumnSpec, ColumnError> {
    let schema = &field.schema;
    let not_null =
        schema.nullable == Some(false) || required.iter().any(|r| r == field_name);

    // References become foreign-key columns and carry no scalar
    // constraints, enum, or default. Detected before the type lookup: a
    // bare `$ref` field has no inline type tag.
    if field.is_reference() || schema.is_embedded_collection() {
        return Ok(ColumnSpec {
            name: format!("{}_id", names::singularize(field_name)),
            sql_type: "INTEGER".to_string(),
            not_null,
            references: Some(names::pluralize(field_name)),
            ..ColumnSpec::default()
        });
    }

    let type_tag = schema
        .type_tag
        .as_deref()
        .ok_or_else(|| ColumnError::MissingType(field_name.to_string()))?;
    let format_tag = schema.format.as_deref().unwrap_or("");

    let mut sql_type = lookup_sql_type(type_tag, format_tag)
        .ok_or_else(|| ColumnError::UnknownType {
            column: field_name.to_string(),
            tag: if format_tag.is_empty() {
                type_tag.to_string()
            } else {
                format!("{type_tag}:{format_tag}")
            },
        })?
        .to_string();

    let mut not_null = not_null;
    let mut default = schema.default.as_ref().map(raw_text);

    // A field literally named `id` is the table's primary key whatever its
    // type; the auto-increment BIGSERIAL upgrade applies to integers only.
    let primary_key = field_name == "id";
    if primary_key && type_tag == "integer" {
        sql_type = "BIGSERIAL".to_string();
        not_null = true;
    }

    if field_name == "created_at" || field_name == "updated_at" {
        sql_type = "TIMESTAMP".to_string();
        not_null = true;
        default = Some("NOW()".to_string());
    }

    let enum_values = schema.enum_values.as_ref().map(|values| {
        sql_type = format!("{table_singular}_{field_name}");
        values.iter().map(raw_text).collect()
    });

    Ok(ColumnSpec {
        name: field_name.to_string(),
        sql_type,
        not_null,
        default,
        primary_key,
        unique: schema.unique_items == Some(true),
        checks: check_clauses(field_name, schema),
        references: None,
        enum_values,
    })
}

/// CHECK clause assembly: an ordered list of optional clause producers,
/// fixed order numeric min/max, length min/max, pattern.
fn check_clauses(name: &str, schema: &SchemaObject) -> Vec<String> {
    let producers = [
        schema.minimum.map(|min| format!("{name} >= {min:.6}")),
        schema.maximum.map(|max| format!("{name} <= {max:.6}")),
        schema
            .min_length
            .map(|min| format!("char_length({name}) >= {min}")),
        schema
            .max_length
            .map(|max| format!("char_length({name}) <= {max}")),
        schema.pattern.as_ref().map(|p| format!("{name} ~ '{p}'")),
    ];
    producers.into_iter().flatten().collect()
}

/// Raw literal text of a default or enum value.
fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ColumnSpec {
    /// Render the column for a CREATE TABLE column list.
    pub fn sql(&self) -> String {
        let mut sb = String::new();
        sb.push_str(&self.name);
        sb.push(' ');
        sb.push_str(&self.sql_type);

        if self.not_null {
            sb.push_str(" NOT NULL");
        }
        if self.primary_key {
            sb.push_str(" PRIMARY KEY");
        }
        if !self.checks.is_empty() {
            sb.push_str(" CHECK (");
            sb.push_str(&self.checks.join(" AND "));
            sb.push(')');
        }
        if let Some(default) = &self.default {
            if self.sql_type == "TEXT" {
                sb.push_str(&format!(" DEFAULT '{default}'"));
            } else {
                sb.push_str(&format!(" DEFAULT {default}"));
            }
        }
        if self.unique {
            sb.push_str(" UNIQUE");
        }
        if let Some(target) = &self.references {
            sb.push_str(&format!(" REFERENCES {target}(id)"));
        }

        sb
    }
}
