//! The annotation reader (C2).
//!
//! Decorators attach to a declaration as preceding sibling `decorator`
//! nodes in the TypeScript grammar. This module normalizes the three
//! surface forms — bare identifier, zero-arg call, call with arguments —
//! into one [`Annotation`] shape, and reduces property-access decorator
//! names (`ns.Name`) to the bare `Name`.

use serde_json::Value;
use tree_sitter::Node;

use super::SourceFile;

/// One annotation attached to a declaration.
#[derive(Debug, Clone)]
pub struct Annotation<'tree> {
    /// The annotation's name, with any `ns.` prefix stripped.
    pub name: String,
    /// The `arguments` node of the decorator call, if it was a call form at
    /// all (bare-identifier decorators have no arguments node).
    pub args: Option<Node<'tree>>,
}

/// Reads every decorator attached to `node`, in source order.
///
/// Walks `node`'s preceding siblings while they are `decorator` nodes; the
/// TypeScript grammar emits decorators immediately before the declaration
/// they modify (and before any `export`/`export default` wrapper, which the
/// caller is expected to have already unwrapped).
#[must_use]
pub fn read_annotations<'tree>(node: Node<'tree>, file: &SourceFile) -> Vec<Annotation<'tree>> {
    let mut decorators = Vec::new();
    let mut cursor = node;
    while let Some(prev) = cursor.prev_sibling() {
        if prev.kind() != "decorator" {
            break;
        }
        decorators.push(prev);
        cursor = prev;
    }
    decorators.reverse();

    decorators
        .into_iter()
        .filter_map(|d| parse_decorator(d, file))
        .collect()
}

/// Reads the decorators attached directly as children of `node` — the
/// shape parameter decorators take in the grammar (`required_parameter`/
/// `optional_parameter` nodes hold their decorators as children, unlike
/// top-level declarations, where decorators are preceding siblings).
#[must_use]
pub fn read_child_annotations<'tree>(node: Node<'tree>, file: &SourceFile) -> Vec<Annotation<'tree>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .filter_map(|d| parse_decorator(d, file))
        .collect()
}

fn parse_decorator<'tree>(decorator: Node<'tree>, file: &SourceFile) -> Option<Annotation<'tree>> {
    // `decorator` := "@" <expression>, where <expression> is one of:
    //   identifier                         -- bare
    //   call_expression(identifier, args)  -- zero-or-more-arg call
    //   member_expression(ns, identifier)  -- property access, no call
    //   call_expression(member_expression, args)
    let mut cursor = decorator.walk();
    let expr = decorator.children(&mut cursor).find(|c| c.kind() != "@")?;

    match expr.kind() {
        "identifier" => Some(Annotation {
            name: file.node_text(expr).to_string(),
            args: None,
        }),
        "member_expression" => {
            let name = member_tail(expr, file)?;
            Some(Annotation { name, args: None })
        }
        "call_expression" => {
            let function = expr.child_by_field_name("function")?;
            let name = match function.kind() {
                "identifier" => file.node_text(function).to_string(),
                "member_expression" => member_tail(function, file)?,
                _ => return None,
            };
            let args = expr.child_by_field_name("arguments");
            Some(Annotation { name, args })
        }
        _ => None,
    }
}

/// The rightmost identifier of a (possibly chained) member expression:
/// `ns.Name` → `Name`, `a.b.Name` → `Name`.
fn member_tail(member_expr: Node<'_>, file: &SourceFile) -> Option<String> {
    let property = member_expr.child_by_field_name("property")?;
    Some(file.node_text(property).to_string())
}

impl<'tree> Annotation<'tree> {
    /// The first string-literal argument, if `args` is a call with at least
    /// one argument and that argument is a plain string literal.
    ///
    /// Never panics on shape mismatch — returns `None` instead (§4.2).
    #[must_use]
    pub fn first_string_arg(&self, file: &SourceFile) -> Option<String> {
        let args = self.args?;
        let mut cursor = args.walk();
        let first = args
            .children(&mut cursor)
            .find(|c| matches!(c.kind(), "string" | "template_string"))?;
        let text = file.node_text(first);
        Some(text.trim_matches(['\'', '"', '`']).to_string())
    }

    /// The first array-literal argument's string elements, if present.
    #[must_use]
    pub fn first_array_literal(&self, file: &SourceFile) -> Option<Vec<String>> {
        let args = self.args?;
        let mut cursor = args.walk();
        let array = args.children(&mut cursor).find(|c| c.kind() == "array")?;
        let mut inner = array.walk();
        Some(
            array
                .children(&mut inner)
                .filter(|c| matches!(c.kind(), "string" | "template_string"))
                .map(|n| file.node_text(n).trim_matches(['\'', '"', '`']).to_string())
                .collect(),
        )
    }

    /// The first object-literal argument, parsed into a JSON-like
    /// [`Value::Object`] of its statically-literal fields.
    ///
    /// Non-literal values (identifiers, function calls) are represented as
    /// `Value::Null` rather than causing the whole annotation to be
    /// dropped — partial literal extraction is still useful (e.g.
    /// `{required: false}` alongside a dynamic `example: buildExample()`).
    #[must_use]
    pub fn first_object_literal(&self, file: &SourceFile) -> Option<Value> {
        let args = self.args?;
        let mut cursor = args.walk();
        let object = args.children(&mut cursor).find(|c| c.kind() == "object")?;
        let mut map = serde_json::Map::new();
        let mut pair_cursor = object.walk();
        for pair in object
            .children(&mut pair_cursor)
            .filter(|c| c.kind() == "pair")
        {
            let Some(key_node) = pair.child_by_field_name("key") else {
                continue;
            };
            let key = file
                .node_text(key_node)
                .trim_matches(['\'', '"'])
                .to_string();
            let value = pair
                .child_by_field_name("value")
                .map(|v| literal_value(v, file))
                .unwrap_or(Value::Null);
            map.insert(key, value);
        }
        Some(Value::Object(map))
    }
}

fn literal_value(node: Node<'_>, file: &SourceFile) -> Value {
    match node.kind() {
        "string" | "template_string" => Value::String(
            file.node_text(node)
                .trim_matches(['\'', '"', '`'])
                .to_string(),
        ),
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "number" => file
            .node_text(node)
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or(Value::Null, Value::Number),
        "null" => Value::Null,
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_typescript;

    fn file_with(text: &str) -> SourceFile {
        SourceFile {
            path: "test.ts".to_string(),
            text: text.to_string(),
            tree: parse_typescript(text),
            imports: std::collections::HashMap::new(),
        }
    }

    fn class_node(file: &SourceFile) -> Node<'_> {
        let root = file.tree.root_node();
        fn find<'a>(node: Node<'a>) -> Option<Node<'a>> {
            if node.kind() == "class_declaration" {
                return Some(node);
            }
            let mut c = node.walk();
            for child in node.children(&mut c) {
                if let Some(found) = find(child) {
                    return Some(found);
                }
            }
            None
        }
        find(root).expect("class_declaration present")
    }

    #[test]
    fn bare_identifier_decorator_has_no_args() {
        let file = file_with("@Injectable\nclass Foo {}");
        let annotations = read_annotations(class_node(&file), &file);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].name, "Injectable");
        assert!(annotations[0].args.is_none());
    }

    #[test]
    fn call_decorator_with_string_arg() {
        let file = file_with("@Controller('users')\nclass UsersController {}");
        let annotations = read_annotations(class_node(&file), &file);
        assert_eq!(annotations[0].name, "Controller");
        assert_eq!(
            annotations[0].first_string_arg(&file),
            Some("users".to_string())
        );
    }

    #[test]
    fn namespaced_decorator_reduces_to_bare_name() {
        let file = file_with("@Nest.Controller('users')\nclass UsersController {}");
        let annotations = read_annotations(class_node(&file), &file);
        assert_eq!(annotations[0].name, "Controller");
    }

    #[test]
    fn multiple_decorators_preserve_source_order() {
        let file = file_with("@ApiTags('users')\n@Controller('users')\nclass UsersController {}");
        let annotations = read_annotations(class_node(&file), &file);
        let names: Vec<&str> = annotations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["ApiTags", "Controller"]);
    }

    #[test]
    fn object_literal_mixes_literal_and_null_fields() {
        let file = file_with("@ApiProperty({ required: false, example: buildExample() })\nclass Foo {}");
        let annotations = read_annotations(class_node(&file), &file);
        let obj = annotations[0].first_object_literal(&file).unwrap();
        assert_eq!(obj["required"], Value::Bool(false));
        assert_eq!(obj["example"], Value::Null);
    }
}
