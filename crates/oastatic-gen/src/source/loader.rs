//! The source graph loader proper (C1): turns a project configuration into
//! a populated [`SourceProject`].

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use tree_sitter::Node;

use crate::error::{Error, Result};

use super::{parse_typescript, DeclKind, DeclRef, SourceFile, SourceProject};

/// Inputs to [`load`], mirroring the C1 contract
/// `load(tsconfigPath, entrypoints, extraGlobs)`.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Project root; import specifiers and globs resolve relative to this.
    pub project_root: PathBuf,
    /// Path to the TS-compiler-style project configuration, relative to
    /// `project_root`. Only its existence is required — this loader does
    /// not need `compilerOptions.paths` to resolve the relative imports
    /// every scenario in §8 exercises.
    pub tsconfig: PathBuf,
    /// One or more entry module files, relative to `project_root`.
    pub entrypoints: Vec<PathBuf>,
    /// Extra globs (relative to `project_root`) eagerly added so DTOs
    /// outside the module graph still resolve.
    pub extra_globs: Vec<String>,
}

/// Loads and parses a project's source graph (C1).
pub fn load(options: &LoadOptions) -> Result<SourceProject> {
    let tsconfig_path = options.project_root.join(&options.tsconfig);
    if !tsconfig_path.is_file() {
        return Err(Error::ProjectInit {
            path: tsconfig_path.display().to_string(),
            reason: "file does not exist".to_string(),
        });
    }

    for entry in &options.entrypoints {
        if !options.project_root.join(entry).is_file() {
            return Err(Error::EntryFileNotFound {
                path: entry.display().to_string(),
            });
        }
    }

    let mut files: Vec<SourceFile> = Vec::new();
    let mut file_indices: HashMap<PathBuf, usize> = HashMap::new();
    let mut queue: VecDeque<PathBuf> = options.entrypoints.iter().cloned().collect();

    for pattern in &options.extra_globs {
        let full_pattern = options.project_root.join(pattern);
        for entry in glob::glob(&full_pattern.to_string_lossy())? {
            if let Ok(path) = entry {
                if let Ok(relative) = path.strip_prefix(&options.project_root) {
                    queue.push_back(relative.to_path_buf());
                }
            }
        }
    }

    while let Some(relative_path) = queue.pop_front() {
        let normalized = normalize_path(&relative_path);
        if file_indices.contains_key(&normalized) {
            continue;
        }
        let absolute = options.project_root.join(&normalized);
        let Ok(text) = std::fs::read_to_string(&absolute) else {
            continue;
        };
        let tree = parse_typescript(&text);
        let imports = collect_imports(tree.root_node(), &text);

        let mut qualified_imports = HashMap::new();
        for import in &imports {
            let Some(target) = resolve_relative_import(&normalized, &import.specifier, &options.project_root) else {
                continue;
            };
            let target_path = target.to_string_lossy().to_string();
            for (local, original) in &import.named {
                qualified_imports.insert(local.clone(), format!("{target_path}#{original}"));
            }
        }

        let file_index = files.len();
        file_indices.insert(normalized.clone(), file_index);
        files.push(SourceFile {
            path: normalized.to_string_lossy().to_string(),
            text,
            tree,
            imports: qualified_imports,
        });

        for import in imports {
            if let Some(resolved) = resolve_relative_import(&normalized, &import.specifier, &options.project_root) {
                queue.push_back(resolved);
            }
        }
    }

    let (by_qualified_id, by_bare_name) = build_symbol_tables(&mut files);
    Ok(SourceProject::new(files, by_qualified_id, by_bare_name))
}

/// Builds a [`SourceProject`] directly from in-memory TypeScript sources
/// instead of walking the filesystem. A named import resolves only against
/// the other entries of `sources` (no transitive loading, no probing the
/// real filesystem) — enough to build fixtures for tests that want the same
/// qualified-id resolution [`load`] does, without writing temp files.
///
/// Test-only: gated behind the `test-support` feature, the same way the
/// teacher's own fixture-construction helpers are.
#[cfg(feature = "test-support")]
#[must_use]
pub fn from_sources(sources: &[(&str, &str)]) -> SourceProject {
    let known: Vec<PathBuf> = sources.iter().map(|(path, _)| normalize_path(Path::new(path))).collect();
    let mut files: Vec<SourceFile> = Vec::new();

    for (path, text) in sources {
        let normalized = normalize_path(Path::new(path));
        let tree = parse_typescript(text);
        let imports = collect_imports(tree.root_node(), text);

        let mut qualified_imports = HashMap::new();
        for import in &imports {
            let Some(target) = resolve_relative_import_among(&normalized, &import.specifier, &known) else {
                continue;
            };
            let target_path = target.to_string_lossy().to_string();
            for (local, original) in &import.named {
                qualified_imports.insert(local.clone(), format!("{target_path}#{original}"));
            }
        }

        files.push(SourceFile {
            path: normalized.to_string_lossy().to_string(),
            text: (*text).to_string(),
            tree,
            imports: qualified_imports,
        });
    }

    let (by_qualified_id, by_bare_name) = build_symbol_tables(&mut files);
    SourceProject::new(files, by_qualified_id, by_bare_name)
}

/// Collects every top-level declaration across `files`, keyed both by
/// `{file}#{Name}` `ClassId` (collision-free — §9 "deduplicate by class
/// identity, not by name") and by bare name (a last-write-wins convenience
/// index for callers with no file context). Also back-fills each file's own
/// `imports` map with a self-entry per declaration, so an in-file reference
/// to one of its own classes resolves the same way an imported one does.
fn build_symbol_tables(files: &mut [SourceFile]) -> (HashMap<String, DeclRef>, HashMap<String, DeclRef>) {
    let mut by_qualified_id: HashMap<String, DeclRef> = HashMap::new();
    let mut by_bare_name: HashMap<String, DeclRef> = HashMap::new();
    for (file_index, file) in files.iter_mut().enumerate() {
        let decls = collect_top_level_decls(file.tree.root_node(), &file.text, file_index);
        let path = file.path.clone();
        for (name, decl_ref) in decls {
            by_bare_name.insert(name.clone(), decl_ref);
            let qualified = format!("{path}#{name}");
            file.imports.insert(name, qualified.clone());
            by_qualified_id.insert(qualified, decl_ref);
        }
    }
    (by_qualified_id, by_bare_name)
}

/// Collapses `./a/../b` style segments and strips a leading `./`.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolves a relative import specifier against the importing file's
/// directory, probing `.ts`, `.tsx`, and `/index.ts` in that order. Bare
/// (non-relative) specifiers — third-party packages — are not part of the
/// project and return `None`.
fn resolve_relative_import(from_file: &Path, specifier: &str, project_root: &Path) -> Option<PathBuf> {
    resolve_relative_import_with(from_file, specifier, |candidate| project_root.join(candidate).is_file())
}

/// Same resolution rule as [`resolve_relative_import`], but against a
/// known in-memory file list rather than the filesystem — what
/// [`from_sources`] uses.
#[cfg(feature = "test-support")]
fn resolve_relative_import_among(from_file: &Path, specifier: &str, known: &[PathBuf]) -> Option<PathBuf> {
    resolve_relative_import_with(from_file, specifier, |candidate| known.contains(&normalize_path(candidate)))
}

/// Shared candidate-probing logic behind both relative-import resolvers:
/// builds the `.ts` / `.tsx` / `/index.ts` candidates and returns the first
/// one `exists` accepts.
fn resolve_relative_import_with(from_file: &Path, specifier: &str, exists: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return None;
    }
    let base = from_file.parent().unwrap_or_else(|| Path::new("")).join(specifier);
    for candidate in [
        base.with_extension("ts"),
        base.with_extension("tsx"),
        base.join("index.ts"),
    ] {
        if exists(&candidate) {
            return Some(normalize_path(&candidate));
        }
    }
    None
}

/// A single `import { ... } from "..."` statement: its source specifier,
/// plus every named import it brings in as `(local, original)` pairs — the
/// two differ only for an `as`-aliased import (`{ Foo as Bar }`).
struct Import {
    specifier: String,
    named: Vec<(String, String)>,
}

/// All `import ... from "..."` statements in a file, in source order, each
/// with its named-import bindings resolved to `(local, original)` pairs.
fn collect_imports(program: Node<'_>, text: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut cursor = program.walk();
    for child in program.children(&mut cursor) {
        if child.kind() != "import_statement" {
            continue;
        }
        let Some(source) = child.child_by_field_name("source") else {
            continue;
        };
        let raw = &text[source.byte_range()];
        let specifier = raw.trim_matches(['\'', '"', '`']).to_string();
        let named = child
            .child_by_field_name("import")
            .map(|clause| collect_named_imports(clause, text))
            .unwrap_or_default();
        imports.push(Import { specifier, named });
    }
    imports
}

/// The `(local, original)` pairs inside an `import_clause`'s
/// `named_imports` braces. `import { Foo }` yields `("Foo", "Foo")`;
/// `import { Foo as Bar }` yields `("Bar", "Foo")`.
fn collect_named_imports(clause: Node<'_>, text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut stack = vec![clause];
    while let Some(node) = stack.pop() {
        if node.kind() == "import_specifier" {
            let original = node
                .child_by_field_name("name")
                .map(|n| text[n.byte_range()].to_string());
            let local = node
                .child_by_field_name("alias")
                .map(|n| text[n.byte_range()].to_string())
                .or_else(|| original.clone());
            if let (Some(original), Some(local)) = (original, local) {
                pairs.push((local, original));
            }
            continue;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    pairs
}

/// Every class/interface/enum/type-alias declared at the top level of a
/// file, keyed by its own declared identifier — never a local import
/// alias, per the C1 contract.
///
/// `DeclRef` spans the declaration node itself (not its decorators, which
/// are siblings in the grammar, not children); [`SourceFile::annotations_of`]
/// finds decorators by walking backward from that same node, so recording
/// the bare declaration range here is what keeps the two in sync.
fn collect_top_level_decls(program: Node<'_>, text: &str, file_index: usize) -> Vec<(String, DeclRef)> {
    let mut decls = Vec::new();
    let mut cursor = program.walk();
    for child in program.children(&mut cursor) {
        let declaration = match child.kind() {
            "export_statement" => match child.child_by_field_name("declaration") {
                Some(d) => d,
                None => continue,
            },
            "class_declaration" | "interface_declaration" | "enum_declaration" | "type_alias_declaration" => child,
            _ => continue,
        };

        let kind = match declaration.kind() {
            "class_declaration" => DeclKind::Class,
            "interface_declaration" => DeclKind::Interface,
            "enum_declaration" => DeclKind::Enum,
            "type_alias_declaration" => DeclKind::TypeAlias,
            _ => continue,
        };
        let Some(name_node) = declaration.child_by_field_name("name") else {
            continue;
        };
        let name = text[name_node.byte_range()].to_string();

        decls.push((
            name,
            DeclRef {
                file_index,
                start_byte: declaration.start_byte(),
                end_byte: declaration.end_byte(),
                kind,
            },
        ));
    }
    decls
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempProject {
        root: PathBuf,
    }

    impl TempProject {
        fn new(id: &str) -> Self {
            let root = std::env::temp_dir().join(format!(
                "oastatic-loader-test-{id}-{}-{}",
                std::process::id(),
                id.len()
            ));
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
    fn loads_entry_and_transitively_imported_files() {
        let project = TempProject::new("transitive");
        project.write(
            "src/app.module.ts",
            "import { UsersController } from './users.controller';\n\
             @Module({ controllers: [UsersController] })\n\
             export class AppModule {}\n",
        );
        project.write(
            "src/users.controller.ts",
            "@Controller('users')\nexport class UsersController {}\n",
        );

        let result = load(&LoadOptions {
            project_root: project.root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/app.module.ts")],
            extra_globs: vec![],
        })
        .unwrap();

        assert_eq!(result.files.len(), 2);
        assert!(result.declaration("AppModule").is_some());
        assert!(result.declaration("UsersController").is_some());
    }

    #[test]
    fn extra_globs_add_files_outside_the_import_graph() {
        let project = TempProject::new("globs");
        project.write(
            "src/app.module.ts",
            "@Module({ controllers: [] })\nexport class AppModule {}\n",
        );
        project.write("src/users/users.dto.ts", "export class UserDto {}\n");

        let result = load(&LoadOptions {
            project_root: project.root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/app.module.ts")],
            extra_globs: vec!["src/**/*.dto.ts".to_string()],
        })
        .unwrap();

        assert!(result.declaration("UserDto").is_some());
    }

    #[test]
    fn missing_entry_file_is_an_error() {
        let project = TempProject::new("missing-entry");

        let result = load(&LoadOptions {
            project_root: project.root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/nope.ts")],
            extra_globs: vec![],
        });

        assert!(matches!(result, Err(Error::EntryFileNotFound { .. })));
    }

    #[test]
    fn missing_tsconfig_is_an_error() {
        let project = TempProject::new("missing-tsconfig");
        project.write("src/app.module.ts", "export class AppModule {}\n");
        std::fs::remove_file(project.root.join("tsconfig.json")).unwrap();

        let result = load(&LoadOptions {
            project_root: project.root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/app.module.ts")],
            extra_globs: vec![],
        });

        assert!(matches!(result, Err(Error::ProjectInit { .. })));
    }

    #[test]
    fn same_named_classes_in_different_files_do_not_collide() {
        let project = TempProject::new("collision");
        project.write(
            "src/app.module.ts",
            "import { CreateDto as CreateUserDto } from './users/create.dto';\n\
             import { CreateDto as CreateOrderDto } from './orders/create.dto';\n\
             @Module({ controllers: [] })\n\
             export class AppModule {}\n",
        );
        project.write("src/users/create.dto.ts", "export class CreateDto { name: string; }\n");
        project.write("src/orders/create.dto.ts", "export class CreateDto { total: number; }\n");

        let result = load(&LoadOptions {
            project_root: project.root.clone(),
            tsconfig: PathBuf::from("tsconfig.json"),
            entrypoints: vec![PathBuf::from("src/app.module.ts")],
            extra_globs: vec!["src/**/*.dto.ts".to_string()],
        })
        .unwrap();

        let (app_file, _) = result.declaration("AppModule").unwrap();
        let users_id = app_file.imports.get("CreateUserDto").unwrap();
        let orders_id = app_file.imports.get("CreateOrderDto").unwrap();
        assert_ne!(users_id, orders_id);

        let (users_file, _) = result.declaration(users_id).unwrap();
        let (orders_file, _) = result.declaration(orders_id).unwrap();
        assert!(users_file.text.contains("name: string"));
        assert!(orders_file.text.contains("total: number"));
    }

    #[cfg(feature = "test-support")]
    #[test]
    fn from_sources_resolves_relative_imports_without_touching_the_filesystem() {
        let project = from_sources(&[
            (
                "src/app.module.ts",
                "import { UsersController } from './users.controller';\n\
                 @Module({ controllers: [UsersController] })\n\
                 export class AppModule {}\n",
            ),
            (
                "src/users.controller.ts",
                "@Controller('users')\nexport class UsersController {}\n",
            ),
        ]);

        assert_eq!(project.files.len(), 2);
        let (app_file, _) = project.declaration("AppModule").unwrap();
        let controller_id = app_file.imports.get("UsersController").unwrap();
        assert_eq!(controller_id, "src/users.controller.ts#UsersController");
        assert!(project.declaration(controller_id).is_some());
    }
}
