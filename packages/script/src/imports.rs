//! Inline relative imports by splicing in the definitions they select.

use crate::ast::{ImportBinding, ImportDecl};
use crate::error::{ScriptError, ScriptResult};
use crate::exports::{resolve_in_module, ExportName, Resolution, Resolved, Unresolved};
use crate::parser::parse_module;
use liquify_common::{normalize_path, FileSystem};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Extensions tried, in order, for a specifier written without one
pub const EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Source with relative imports replaced by the definitions they select
#[derive(Debug, Clone, PartialEq)]
pub struct Inlined {
    pub source: String,
    pub warnings: Vec<ImportWarning>,
}

/// An import that contributed no text
#[derive(Error, Debug, Clone, PartialEq)]
#[error("`{specifier}` imported by {}: {kind}", importer.display())]
pub struct ImportWarning {
    pub importer: PathBuf,
    pub specifier: String,
    pub kind: ImportWarningKind,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportWarningKind {
    #[error("no such file")]
    NotFound,

    #[error("could not read {}: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    #[error("{0}")]
    Syntax(ScriptError),

    #[error("import cycle back to {}", .0.display())]
    Cycle(PathBuf),

    #[error("namespace import `* as {0}` is not supported")]
    Namespace(String),

    #[error("{0}")]
    Unresolved(Unresolved),
}

/// Replace every relative import in `source` with the definitions its
/// bindings select from the target file.
///
/// Targets' own relative imports are inlined first and placed before the
/// selected definitions. Package imports are left untouched. Imports that
/// cannot be inlined contribute nothing and are reported as warnings; only a
/// syntax error in `source` itself is an error.
#[instrument(skip(source, fs), fields(path = %path.display()))]
pub fn inline_imports(source: &str, path: &Path, fs: &dyn FileSystem) -> ScriptResult<Inlined> {
    let path = normalize_path(path);
    let mut inliner = Inliner {
        fs,
        warnings: Vec::new(),
    };
    let mut ancestry = vec![path.clone()];
    let source = inliner.inline(source, &path, &mut ancestry)?;

    Ok(Inlined {
        source,
        warnings: inliner.warnings,
    })
}

/// Resolve a relative specifier against the importing file: the path as
/// written, then with each of [`EXTENSIONS`], then an `index` file
pub fn resolve_import_path(specifier: &str, importer: &Path, fs: &dyn FileSystem) -> Option<PathBuf> {
    let base = normalize_path(&importer.parent().unwrap_or(Path::new("")).join(specifier));

    let with_extension = EXTENSIONS.iter().map(|extension| {
        let mut candidate = base.clone().into_os_string();
        candidate.push(".");
        candidate.push(extension);
        PathBuf::from(candidate)
    });
    let index = EXTENSIONS
        .iter()
        .map(|extension| base.join(format!("index.{}", extension)));

    std::iter::once(base.clone())
        .chain(with_extension)
        .chain(index)
        .find(|candidate| fs.exists(candidate))
}

struct Inliner<'fs> {
    fs: &'fs dyn FileSystem,
    warnings: Vec<ImportWarning>,
}

impl Inliner<'_> {
    fn inline(
        &mut self,
        source: &str,
        path: &Path,
        ancestry: &mut Vec<PathBuf>,
    ) -> ScriptResult<String> {
        let module = parse_module(source)?;
        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;

        for import in module.imports().filter(|import| import.is_relative()) {
            output.push_str(&source[cursor..import.span.start]);
            output.push_str(&self.splice(import, path, ancestry));
            cursor = import.span.end;
        }
        output.push_str(&source[cursor..]);

        Ok(output)
    }

    /// Text that replaces one import statement
    fn splice(&mut self, import: &ImportDecl, importer: &Path, ancestry: &mut Vec<PathBuf>) -> String {
        if import.bindings.is_empty() {
            debug!(specifier = %import.specifier, "Dropping side-effect import");
            return String::new();
        }

        let Some(target) = resolve_import_path(&import.specifier, importer, self.fs) else {
            self.warn(importer, import, ImportWarningKind::NotFound);
            return String::new();
        };
        if ancestry.contains(&target) {
            self.warn(importer, import, ImportWarningKind::Cycle(target));
            return String::new();
        }

        let source = match self.fs.read_to_string(&target) {
            Ok(source) => source,
            Err(error) => {
                let kind = ImportWarningKind::Unreadable {
                    path: target,
                    message: error.to_string(),
                };
                self.warn(importer, import, kind);
                return String::new();
            }
        };
        let module = match parse_module(&source) {
            Ok(module) => module,
            Err(error) => {
                self.warn(importer, import, ImportWarningKind::Syntax(error));
                return String::new();
            }
        };

        ancestry.push(target.clone());

        let mut parts = Vec::new();
        for nested in module.imports().filter(|nested| nested.is_relative()) {
            parts.push(self.splice(nested, &target, ancestry));
        }

        for binding in &import.bindings {
            let (export, local) = match binding {
                ImportBinding::Default { local } => (ExportName::Default, local),
                ImportBinding::Named { imported, local } if imported == "default" => {
                    (ExportName::Default, local)
                }
                ImportBinding::Named { imported, local } => {
                    (ExportName::named(imported.clone()), local)
                }
                ImportBinding::Namespace { local } => {
                    self.warn(importer, import, ImportWarningKind::Namespace(local.clone()));
                    continue;
                }
            };

            match resolve_in_module(&module, &source, &export) {
                Resolution::Resolved(resolved) => parts.push(definition(local, &resolved)),
                Resolution::Unresolved(reason) => {
                    self.warn(importer, import, ImportWarningKind::Unresolved(reason))
                }
            }
        }

        ancestry.pop();

        debug!(
            specifier = %import.specifier,
            target = %target.display(),
            "Inlined import"
        );
        parts.retain(|part| !part.is_empty());
        parts.join("\n")
    }

    fn warn(&mut self, importer: &Path, import: &ImportDecl, kind: ImportWarningKind) {
        let warning = ImportWarning {
            importer: importer.to_path_buf(),
            specifier: import.specifier.clone(),
            kind,
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Declaration binding `local` to a resolved definition
fn definition(local: &str, resolved: &Resolved) -> String {
    match resolved.function.as_deref() {
        Some(name) if name == local => resolved.source_text.clone(),
        Some(name) => format!("{}\nconst {} = {};", resolved.source_text, local, name),
        None => format!("const {} = {};", local, resolved.source_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquify_common::MockFileSystem;

    #[test]
    fn test_resolve_import_path_order() {
        let fs = MockFileSystem::new()
            .with_file("/src/util.ts", "")
            .with_file("/src/util.js", "")
            .with_file("/src/lib/index.jsx", "")
            .with_file("/src/data.json.js", "");
        let importer = Path::new("/src/sections/hero.jsx");

        assert_eq!(
            resolve_import_path("../util", importer, &fs),
            Some(PathBuf::from("/src/util.js"))
        );
        assert_eq!(
            resolve_import_path("../util.ts", importer, &fs),
            Some(PathBuf::from("/src/util.ts"))
        );
        assert_eq!(
            resolve_import_path("./../lib", importer, &fs),
            Some(PathBuf::from("/src/lib/index.jsx"))
        );
        assert_eq!(
            resolve_import_path("../data.json", importer, &fs),
            Some(PathBuf::from("/src/data.json.js"))
        );
        assert_eq!(resolve_import_path("./missing", importer, &fs), None);
    }

    #[test]
    fn test_function_spliced_verbatim() {
        let fs = MockFileSystem::new().with_file(
            "/src/format.js",
            "export function money(cents) {\n  return (cents / 100).toFixed(2);\n}\n",
        );
        let source = "import { money } from './format';\nconsole.log(money(100));";
        let inlined = inline_imports(source, Path::new("/src/main.js"), &fs).unwrap();
        assert_eq!(
            inlined.source,
            "function money(cents) {\n  return (cents / 100).toFixed(2);\n}\nconsole.log(money(100));"
        );
        assert!(inlined.warnings.is_empty());
    }

    #[test]
    fn test_renamed_bindings_get_const_aliases() {
        let fs = MockFileSystem::new().with_file(
            "/src/lib.js",
            "export function helper() {}\nexport const label = 'Buy';\nexport default () => null;",
        );
        let source = "import run, { helper as h, label as text } from './lib.js';";
        let inlined = inline_imports(source, Path::new("/src/main.js"), &fs).unwrap();
        assert_eq!(
            inlined.source,
            "const run = () => null;\nfunction helper() {}\nconst h = helper;\nconst text = 'Buy';"
        );
    }

    #[test]
    fn test_package_imports_are_kept() {
        let fs = MockFileSystem::new();
        let source = "import React from 'react';\nexport default () => null;";
        let inlined = inline_imports(source, Path::new("/src/main.js"), &fs).unwrap();
        assert_eq!(inlined.source, source);
    }

    #[test]
    fn test_missing_target_is_a_warning() {
        let fs = MockFileSystem::new();
        let source = "import Gone from './gone';\nconst x = 1;";
        let inlined = inline_imports(source, Path::new("/src/main.js"), &fs).unwrap();
        assert_eq!(inlined.source, "\nconst x = 1;");
        assert_eq!(inlined.warnings.len(), 1);
        assert_eq!(inlined.warnings[0].kind, ImportWarningKind::NotFound);
    }

    #[test]
    fn test_cycle_is_broken() {
        let fs = MockFileSystem::new()
            .with_file("/x/a.js", "import { b } from './b';\nexport const a = 'A';")
            .with_file("/x/b.js", "import { a } from './a';\nexport const b = 'B';");
        let source = "import { b } from './b';\nexport const a = 'A';";
        let inlined = inline_imports(source, Path::new("/x/a.js"), &fs).unwrap();

        assert_eq!(inlined.source, "const b = 'B';\nexport const a = 'A';");
        assert_eq!(inlined.warnings.len(), 1);
        assert_eq!(
            inlined.warnings[0].kind,
            ImportWarningKind::Cycle(PathBuf::from("/x/a.js"))
        );
    }

    #[test]
    fn test_namespace_binding_is_unsupported() {
        let fs = MockFileSystem::new().with_file("/src/icons.js", "export const star = '*';");
        let source = "import * as icons from './icons';";
        let inlined = inline_imports(source, Path::new("/src/main.js"), &fs).unwrap();
        assert_eq!(inlined.source, "");
        assert!(matches!(
            inlined.warnings[0].kind,
            ImportWarningKind::Namespace(ref local) if local == "icons"
        ));
    }

    #[test]
    fn test_unresolved_export_is_a_warning() {
        let fs = MockFileSystem::new().with_file("/src/lib.js", "export const a = 1;");
        let source = "import { b } from './lib';";
        let inlined = inline_imports(source, Path::new("/src/main.js"), &fs).unwrap();
        assert_eq!(inlined.source, "");
        assert!(matches!(
            inlined.warnings[0].kind,
            ImportWarningKind::Unresolved(Unresolved::NotExported(_))
        ));
    }

    #[test]
    fn test_side_effect_imports_are_dropped() {
        let fs = MockFileSystem::new();
        let inlined =
            inline_imports("import './polyfill';\nrun();", Path::new("/src/main.js"), &fs).unwrap();
        assert_eq!(inlined.source, "\nrun();");
        assert!(inlined.warnings.is_empty());
    }
}
