//! Serde model of the OpenAPI specification document.
//!
//! Only the surface the generator consumes is modeled; everything else in
//! the document is ignored during deserialization. Keyed collections use
//! `IndexMap` so declaration order survives parsing, which is what makes
//! the generated DDL deterministic.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub openapi: Option<String>,
    pub components: Option<Components>,
    pub paths: Option<IndexMap<String, PathItem>>,
}

impl Document {
    /// Parse a YAML or JSON OpenAPI document.
    pub fn parse(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    pub fn schema_count(&self) -> usize {
        self.components.as_ref().map_or(0, |c| c.schemas.len())
    }

    pub fn path_count(&self) -> usize {
        self.paths.as_ref().map_or(0, |p| p.len())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaRef>,
}

/// A schema position that may be a `$ref` or an inline schema object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(flatten)]
    pub schema: SchemaObject,
}

impl SchemaRef {
    /// Whether this position is a direct reference to another entity.
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Last segment of the `$ref` pointer, e.g. `#/components/schemas/Tag` -> `Tag`.
    pub fn reference_target(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(|r| r.rsplit('/').next().unwrap_or(r))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchemaObject {
    #[serde(rename = "type")]
    pub type_tag: Option<String>,
    pub format: Option<String>,
    pub nullable: Option<bool>,
    pub required: Vec<String>,
    pub properties: Option<IndexMap<String, SchemaRef>>,
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<SchemaRef>>,
    pub items: Option<Box<SchemaRef>>,
    pub default: Option<Value>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    #[serde(rename = "minLength")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength")]
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    #[serde(rename = "uniqueItems")]
    pub unique_items: Option<bool>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "x-database-exclude")]
    pub database_exclude: Option<Value>,
}

impl SchemaObject {
    /// An array whose items form another entity: either a `$ref` or an
    /// inline object schema with properties. Modeled relationally as a
    /// foreign key, not as a literal column.
    pub fn is_embedded_collection(&self) -> bool {
        self.type_tag.as_deref() == Some("array")
            && self
                .items
                .as_ref()
                .is_some_and(|items| items.is_reference() || items.schema.properties.is_some())
    }

    /// Whether the entity opted out of table generation via the
    /// `x-database-exclude` extension. Only true-like values count.
    pub fn excluded(&self) -> bool {
        match &self.database_exclude {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.as_str(), "true" | "yes" | "1"),
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub post: Option<Operation>,
    pub put: Option<Operation>,
    pub delete: Option<Operation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Operation {
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    pub responses: Option<IndexMap<String, Response>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestBody {
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaType {
    pub schema: Option<SchemaRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Response {
    pub content: IndexMap<String, MediaType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_schema_order() {
        let input = "\
openapi: 3.0.0
components:
  schemas:
    Zebra:
      type: object
      properties:
        name:
          type: string
    Apple:
      type: object
      properties:
        name:
          type: string
";
        let doc = Document::parse(input).unwrap();
        let names: Vec<&String> = doc.components.as_ref().unwrap().schemas.keys().collect();
        assert_eq!(names, ["Zebra", "Apple"]);
    }

    #[test]
    fn test_reference_target() {
        let input = "\
components:
  schemas:
    Pet:
      type: object
      properties:
        tag:
          $ref: '#/components/schemas/Tag'
";
        let doc = Document::parse(input).unwrap();
        let pet = &doc.components.as_ref().unwrap().schemas["Pet"];
        let tag = &pet.schema.properties.as_ref().unwrap()["tag"];
        assert!(tag.is_reference());
        assert_eq!(tag.reference_target(), Some("Tag"));
    }

    #[test]
    fn test_embedded_collection_detection() {
        let input = "\
components:
  schemas:
    Pet:
      type: object
      properties:
        tags:
          type: array
          items:
            $ref: '#/components/schemas/Tag'
        photo_urls:
          type: array
          items:
            type: string
";
        let doc = Document::parse(input).unwrap();
        let props = doc.components.as_ref().unwrap().schemas["Pet"]
            .schema
            .properties
            .clone()
            .unwrap();
        assert!(props["tags"].schema.is_embedded_collection());
        assert!(!props["photo_urls"].schema.is_embedded_collection());
    }

    #[test]
    fn test_exclusion_marker() {
        let mut schema = SchemaObject::default();
        assert!(!schema.excluded());

        schema.database_exclude = Some(Value::Bool(true));
        assert!(schema.excluded());

        schema.database_exclude = Some(Value::String("yes".into()));
        assert!(schema.excluded());

        schema.database_exclude = Some(Value::Bool(false));
        assert!(!schema.excluded());
    }
}
