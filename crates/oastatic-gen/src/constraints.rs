//! The validation-annotation mapper (C6): folds class-validator-style
//! annotations into the schema fragment C5 already produced for a
//! property, and derives whether a property counts as required.

use oastatic_core::Schema;
use serde_json::Value;

use crate::source::{Annotation, SourceFile, SourceProject};

/// Shallow-merges every recognized validation annotation in `annotations`
/// into `schema`, in place.
pub fn merge_constraints(schema: &mut Schema, annotations: &[Annotation<'_>], file: &SourceFile, project: &SourceProject) {
    for annotation in annotations {
        match annotation.name.as_str() {
            "MinLength" => schema.min_length = first_u64_arg(annotation, file),
            "MaxLength" => schema.max_length = first_u64_arg(annotation, file),
            "Length" => {
                let (min, max) = two_u64_args(annotation, file);
                schema.min_length = min;
                schema.max_length = max;
            }
            "Min" => schema.minimum = first_f64_arg(annotation, file),
            "Max" => schema.maximum = first_f64_arg(annotation, file),
            "IsPositive" => {
                schema.minimum = Some(0.0);
                schema.exclusive_minimum = Some(true);
            }
            "IsInt" => schema.schema_type = Some(oastatic_core::SchemaType::single("integer")),
            "IsEmail" => schema.format = Some("email".to_string()),
            "IsUUID" => schema.format = Some("uuid".to_string()),
            "IsUrl" => schema.format = Some("url".to_string()),
            "IsDateString" => schema.format = Some("date".to_string()),
            "IsDate" => schema.format = Some("date-time".to_string()),
            "Matches" => schema.pattern = first_regex_source(annotation, file),
            "ArrayMinSize" => schema.min_items = first_u64_arg(annotation, file),
            "ArrayMaxSize" => schema.max_items = first_u64_arg(annotation, file),
            "IsEnum" => {
                if let Some(values) = resolve_enum_values(annotation, file, project) {
                    schema.enum_values = values;
                }
            }
            _ => {}
        }
    }
}

/// `true` if any annotation marks the property optional
/// (class-validator's `@IsOptional`).
#[must_use]
pub fn is_optional(annotations: &[Annotation<'_>]) -> bool {
    annotations.iter().any(|a| a.name == "IsOptional")
}

fn first_u64_arg(annotation: &Annotation<'_>, file: &SourceFile) -> Option<u64> {
    let args = annotation.args?;
    let mut cursor = args.walk();
    let number = args.children(&mut cursor).find(|c| c.kind() == "number")?;
    file.node_text(number).parse().ok()
}

fn first_f64_arg(annotation: &Annotation<'_>, file: &SourceFile) -> Option<f64> {
    let args = annotation.args?;
    let mut cursor = args.walk();
    let number = args.children(&mut cursor).find(|c| c.kind() == "number")?;
    file.node_text(number).parse().ok()
}

fn two_u64_args(annotation: &Annotation<'_>, file: &SourceFile) -> (Option<u64>, Option<u64>) {
    let Some(args) = annotation.args else {
        return (None, None);
    };
    let mut cursor = args.walk();
    let numbers: Vec<u64> = args
        .children(&mut cursor)
        .filter(|c| c.kind() == "number")
        .filter_map(|n| file.node_text(n).parse().ok())
        .collect();
    (numbers.first().copied(), numbers.get(1).copied())
}

fn first_regex_source(annotation: &Annotation<'_>, file: &SourceFile) -> Option<String> {
    let args = annotation.args?;
    let mut cursor = args.walk();
    let regex = args.children(&mut cursor).find(|c| c.kind() == "regex")?;
    let text = file.node_text(regex);
    Some(text.trim_start_matches('/').trim_end_matches(|c: char| c == '/' || c.is_alphabetic()).to_string())
}

/// Resolves `@IsEnum(SomeEnum)`'s argument to the referenced enum
/// declaration (possibly in another file) and extracts its member values.
/// Returns `None` — never a partial/empty enum — when the reference can't
/// be resolved, per §4.6 ("if unresolvable, it emits no enum").
fn resolve_enum_values(annotation: &Annotation<'_>, file: &SourceFile, project: &SourceProject) -> Option<Vec<Value>> {
    let args = annotation.args?;
    let mut cursor = args.walk();
    let identifier = args.children(&mut cursor).find(|c| c.kind() == "identifier")?;
    let local_name = file.node_text(identifier);
    let aliases = crate::source::local_import_aliases(file);
    let canonical = crate::source::resolve_alias(local_name, &aliases);

    let (enum_file, decl_ref) = project.declaration(canonical)?;
    if decl_ref.kind != crate::source::DeclKind::Enum {
        return None;
    }
    let enum_node = project.declaration_node(decl_ref)?;
    let body = enum_node.child_by_field_name("body")?;
    let mut member_cursor = body.walk();
    let mut values = Vec::new();
    let mut next_ordinal: i64 = 0;
    for member in body.named_children(&mut member_cursor) {
        if member.kind() != "property_identifier" && member.kind() != "enum_assignment" {
            continue;
        }
        match member.kind() {
            "property_identifier" => {
                values.push(Value::Number(next_ordinal.into()));
                next_ordinal += 1;
            }
            "enum_assignment" => {
                let Some(value_node) = member.child_by_field_name("value") else {
                    continue;
                };
                let text = enum_file.node_text(value_node);
                match value_node.kind() {
                    "string" => values.push(Value::String(text.trim_matches(['\'', '"', '`']).to_string())),
                    "number" => {
                        let parsed: i64 = text.parse().unwrap_or(next_ordinal);
                        values.push(Value::Number(parsed.into()));
                        next_ordinal = parsed + 1;
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::loader::{load, LoadOptions};
    use std::path::PathBuf;

    struct TempProject {
        root: PathBuf,
    }

    impl TempProject {
        fn new(id: &str) -> Self {
            let root = std::env::temp_dir().join(format!("oastatic-constraints-test-{id}-{}", std::process::id()));
            std::fs::create_dir_all(root.join("src")).unwrap();
            std::fs::write(root.join("tsconfig.json"), "{}").unwrap();
            Self { root }
        }

        fn write(&self, relative: &str, contents: &str) -> &Self {
            let path = self.root.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, contents).unwrap();
            self
        }
    }

    impl Drop for TempProject {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.root).ok();
        }
    }

    #[test]
    fn resolves_enum_across_files() {
        let project = TempProject::new("enum");
        project.write(
            "src/order-status.enum.ts",
            "export enum OrderStatus {\n  Pending = 'pending',\n  Shipped = 'shipped',\n}\n",
        );
        project.write(
            "src/order.dto.ts",
            "import { OrderStatus } from './order-status.enum';\n\
             export class OrderDto {\n  @IsEnum(OrderStatus)\n  status: string;\n}\n",
        );

        let source_project = load(&LoadOptions {
            project_root: project.root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/order.dto.ts")],
            extra_globs: vec![],
        })
        .unwrap();

        let (file, decl_ref) = source_project.declaration("OrderDto").unwrap();
        let node = source_project.declaration_node(decl_ref).unwrap();
        let body = node.child_by_field_name("body").unwrap();
        let mut cursor = body.walk();
        let field = body.named_children(&mut cursor).find(|c| c.kind() == "public_field_definition").unwrap();
        let annotations = file.annotations_of(field);

        let values = resolve_enum_values(&annotations[0], file, &source_project).unwrap();
        assert_eq!(values, vec![Value::String("pending".to_string()), Value::String("shipped".to_string())]);
    }

    #[test]
    fn is_optional_detects_is_optional_annotation() {
        let project = TempProject::new("optional");
        project.write("src/dto.ts", "export class Dto {\n  @IsOptional()\n  name: string;\n}\n");
        let source_project = load(&LoadOptions {
            project_root: project.root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/dto.ts")],
            extra_globs: vec![],
        })
        .unwrap();
        let (file, decl_ref) = source_project.declaration("Dto").unwrap();
        let node = source_project.declaration_node(decl_ref).unwrap();
        let body = node.child_by_field_name("body").unwrap();
        let mut cursor = body.walk();
        let field = body.named_children(&mut cursor).find(|c| c.kind() == "public_field_definition").unwrap();
        let annotations = file.annotations_of(field);
        assert!(is_optional(&annotations));
    }
}
