//! sqlc-style query templates generated from API paths.
//!
//! A thin companion to the DDL generator: each operation on a path becomes
//! a named query template against the resource the path addresses.

use crate::names;
use crate::spec::{Document, Operation};

/// Generate query templates for every path operation in the document,
/// in declaration order.
pub fn document_to_queries(doc: &Document) -> String {
    let mut out = String::new();
    let Some(paths) = &doc.paths else {
        return out;
    };

    for (path, item) in paths {
        let Some(resource) = resource_name(path) else {
            continue;
        };

        if let Some(op) = &item.get {
            push_query(&mut out, op, format!("SELECT * FROM {resource};"));
        }
        if let Some(op) = &item.post {
            if let Some(statement) = insert_statement(op, &resource) {
                push_query(&mut out, op, statement);
            }
        }
        if let Some(op) = &item.put {
            if let Some(statement) = update_statement(op, &resource) {
                push_query(&mut out, op, statement);
            }
        }
        if let Some(op) = &item.delete {
            push_query(&mut out, op, format!("DELETE FROM {resource} WHERE id = $1;"));
        }
    }

    out
}

/// Table addressed by a path: the last non-parameter segment, lowercased
/// and pluralized. `/users/{id}` -> `users`.
fn resource_name(path: &str) -> Option<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .next_back()
        .map(|segment| names::pluralize(&segment.to_lowercase()))
}

fn push_query(out: &mut String, op: &Operation, statement: String) {
    let name = op.operation_id.as_deref().unwrap_or("unnamed");
    let kind = if returns_many(op) { ":many" } else { ":one" };
    out.push_str(&format!("-- name: {name} {kind}\n{statement}\n\n"));
}

/// Whether the operation's 200 response is an array.
fn returns_many(op: &Operation) -> bool {
    op.responses
        .as_ref()
        .and_then(|responses| responses.get("200"))
        .and_then(|response| response.content.get("application/json"))
        .and_then(|media| media.schema.as_ref())
        .and_then(|schema| schema.schema.type_tag.as_deref())
        == Some("array")
}

/// Column names of the JSON request body schema, in declaration order.
fn body_columns(op: &Operation) -> Vec<String> {
    op.request_body
        .as_ref()
        .and_then(|body| body.content.get("application/json"))
        .and_then(|media| media.schema.as_ref())
        .and_then(|schema| schema.schema.properties.as_ref())
        .map(|properties| properties.keys().cloned().collect())
        .unwrap_or_default()
}

fn insert_statement(op: &Operation, resource: &str) -> Option<String> {
    let columns = body_columns(op);
    if columns.is_empty() {
        return None;
    }
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    Some(format!(
        "INSERT INTO {} ({}) VALUES ({});",
        resource,
        columns.join(", "),
        placeholders.join(", ")
    ))
}

fn update_statement(op: &Operation, resource: &str) -> Option<String> {
    let columns = body_columns(op);
    if columns.is_empty() {
        return None;
    }
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect();
    Some(format!(
        "UPDATE {} SET {} WHERE id = ${};",
        resource,
        assignments.join(", "),
        columns.len() + 1
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Document;

    #[test]
    fn test_resource_name() {
        assert_eq!(resource_name("/users"), Some("users".to_string()));
        assert_eq!(resource_name("/users/{id}"), Some("users".to_string()));
        assert_eq!(resource_name("/pet/{petId}/uploadImage"), Some("uploadimages".to_string()));
        assert_eq!(resource_name("/"), None);
    }

    #[test]
    fn test_crud_templates() {
        let input = "\
openapi: 3.0.0
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          content:
            application/json:
              schema:
                type: array
                items:
                  type: object
    post:
      operationId: createPet
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name:
                  type: string
                tag:
                  type: string
  /pets/{petId}:
    put:
      operationId: updatePet
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name:
                  type: string
    delete:
      operationId: deletePet
";
        let doc = Document::parse(input).unwrap();
        let queries = document_to_queries(&doc);

        assert!(queries.contains("-- name: listPets :many\nSELECT * FROM pets;"));
        assert!(queries.contains(
            "-- name: createPet :one\nINSERT INTO pets (name, tag) VALUES ($1, $2);"
        ));
        assert!(queries.contains(
            "-- name: updatePet :one\nUPDATE pets SET name = $1 WHERE id = $2;"
        ));
        assert!(queries.contains("-- name: deletePet :one\nDELETE FROM pets WHERE id = $1;"));
    }

    #[test]
    fn test_post_without_body_is_skipped() {
        let input = "\
paths:
  /pings:
    post:
      operationId: ping
";
        let doc = Document::parse(input).unwrap();
        assert_eq!(document_to_queries(&doc), "");
    }
}
