//! The module walker (C3): follows the `@Module` graph from a root module
//! class and collects every reachable controller.

use std::collections::{HashMap, HashSet};

use oastatic_core::{Diagnostic, ModuleDecl};
use tree_sitter::Node;

use crate::source::{local_import_aliases, Annotation, SourceFile, SourceProject};

/// Walks the module graph rooted at `root_class`, returning every reachable
/// module (de-duplicated, cycle-broken) plus any non-fatal diagnostics.
#[must_use]
pub fn walk(root_class: &str, project: &SourceProject) -> (Vec<ModuleDecl>, Vec<Diagnostic>) {
    let mut modules = Vec::new();
    let mut diagnostics = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(root_class.to_string());

    while let Some(class_name) = queue.pop_front() {
        if !visited.insert(class_name.clone()) {
            continue;
        }

        let Some((file, decl_ref)) = project.declaration(&class_name) else {
            diagnostics.push(Diagnostic::warning(
                "unresolved-module-import",
                format!("module class `{class_name}` not found"),
            ));
            continue;
        };
        let Some(node) = project.declaration_node(decl_ref) else {
            continue;
        };
        let annotations = file.annotations_of(node);
        let Some(module_annotation) = annotations.iter().find(|a| a.name == "Module") else {
            diagnostics.push(
                Diagnostic::warning(
                    "unresolved-module-import",
                    format!("`{class_name}` has no @Module annotation, skipping"),
                )
                .with_file(file.path.clone()),
            );
            continue;
        };

        let aliases = local_import_aliases(file);
        let controllers = class_names_in_array_field(module_annotation, file, "controllers", &aliases);
        let imports = class_names_in_array_field(module_annotation, file, "imports", &aliases);

        for imported in &imports {
            queue.push_back(imported.clone());
        }

        modules.push(ModuleDecl {
            class_id: class_name,
            controllers,
            imports,
        });
    }

    (modules, diagnostics)
}

/// Resolves the named array property (`controllers` or `imports`) of a
/// `@Module({...})` object-literal argument into canonical class names.
fn class_names_in_array_field(
    annotation: &Annotation<'_>,
    file: &SourceFile,
    field: &str,
    aliases: &HashMap<String, String>,
) -> Vec<String> {
    let Some(args) = annotation.args else {
        return Vec::new();
    };
    let mut cursor = args.walk();
    let Some(object) = args.children(&mut cursor).find(|c| c.kind() == "object") else {
        return Vec::new();
    };
    let mut pair_cursor = object.walk();
    let Some(pair) = object.children(&mut pair_cursor).find(|c| {
        c.kind() == "pair"
            && c.child_by_field_name("key")
                .is_some_and(|k| file.node_text(k).trim_matches(['\'', '"']) == field)
    }) else {
        return Vec::new();
    };
    let Some(value) = pair.child_by_field_name("value") else {
        return Vec::new();
    };
    if value.kind() != "array" {
        return Vec::new();
    }

    let mut names = Vec::new();
    let mut element_cursor = value.walk();
    for element in value.children(&mut element_cursor) {
        if let Some(name) = resolve_class_reference(element, file, aliases) {
            names.push(name);
        }
    }
    names
}

/// Resolves one array element to a canonical class name: a bare identifier,
/// a `ns.Name` property access, or a `forwardRef(() => Name)` wrapper.
fn resolve_class_reference(
    node: Node<'_>,
    file: &SourceFile,
    aliases: &HashMap<String, String>,
) -> Option<String> {
    match node.kind() {
        "identifier" => {
            let local = file.node_text(node);
            Some(aliases.get(local).cloned().unwrap_or_else(|| local.to_string()))
        }
        "member_expression" => {
            let property = node.child_by_field_name("property")?;
            Some(file.node_text(property).to_string())
        }
        "call_expression" => {
            let function = node.child_by_field_name("function")?;
            if file.node_text(function) != "forwardRef" {
                return None;
            }
            let arguments = node.child_by_field_name("arguments")?;
            let mut cursor = arguments.walk();
            let arrow = arguments
                .children(&mut cursor)
                .find(|c| c.kind() == "arrow_function")?;
            let body = arrow.child_by_field_name("body")?;
            resolve_class_reference(body, file, aliases)
        }
        _ => None,
    }
}
