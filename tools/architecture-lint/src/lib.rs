//! Repo-local lint that keeps the idozer hexagon intact.
//!
//! `app/src` has two linted layers: `domain` (types, services and ports) and
//! `outbound` (adapters). The composition root (`app.rs`, `config.rs`,
//! `telemetry.rs`) may depend on both and is not linted. The rules:
//!
//! - `domain` must not reach into adapters or the composition root, and must
//!   not name transport or storage crates
//! - `outbound` must not reach into the composition root
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use syn::visit::Visit;

/// Name under which integration code refers to the linted crate.
const CRATE_NAME: &str = "idozer";

/// A single boundary violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `app/src`.
    pub file: Utf8PathBuf,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Failure modes returned by the lint.
#[derive(Debug)]
pub enum ArchitectureLintError {
    Io { path: Utf8PathBuf, source: io::Error },
    Parse { file: Utf8PathBuf, message: String },
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {path}: {source}"),
            Self::Parse { file, message } => write!(f, "cannot parse {file}: {message}"),
            Self::Violations(violations) => {
                writeln!(f, "hexagon boundary violations:")?;
                for violation in violations {
                    writeln!(f, "- {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `app/src`.
    pub file: Utf8PathBuf,
    pub contents: String,
}

impl LintSource {
    pub fn new(file: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Domain,
    Outbound,
}

impl Layer {
    const ALL: [Self; 2] = [Self::Domain, Self::Outbound];

    fn dir_name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Outbound => "outbound",
        }
    }

    fn of(file: &Utf8Path) -> Option<Self> {
        let Some(Utf8Component::Normal(first)) = file.components().next() else {
            return None;
        };
        Self::ALL.into_iter().find(|layer| layer.dir_name() == first)
    }

    fn forbidden_modules(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &["outbound", "app", "config", "telemetry"],
            Self::Outbound => &["app", "config", "telemetry"],
        }
    }

    fn forbidden_crates(self) -> &'static [&'static str] {
        match self {
            Self::Domain => &[
                "camino",
                "cap_std",
                "clap",
                "ortho_config",
                "reqwest",
                "tracing_subscriber",
                "url",
            ],
            Self::Outbound => &["clap", "ortho_config", "tracing_subscriber"],
        }
    }
}

/// Lint the crate rooted at `crate_dir` (the directory holding `src/`).
///
/// # Errors
///
/// Returns [`ArchitectureLintError`] when sources cannot be read or parsed,
/// or when any boundary is crossed.
pub fn lint_crate_sources(crate_dir: &Utf8Path) -> Result<(), ArchitectureLintError> {
    let src_dir = crate_dir.join("src");
    let root = Dir::open_ambient_dir(&src_dir, ambient_authority()).map_err(|source| {
        ArchitectureLintError::Io {
            path: src_dir.clone(),
            source,
        }
    })?;

    let mut sources = Vec::new();
    for layer in Layer::ALL {
        let name = Utf8Path::new(layer.dir_name());
        match root.open_dir(name) {
            Ok(dir) => collect_sources(&dir, name, &mut sources)?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ArchitectureLintError::Io {
                    path: src_dir.join(name),
                    source,
                });
            }
        }
    }
    lint_sources(&sources)
}

/// Lint in-memory sources.
///
/// # Errors
///
/// Returns [`ArchitectureLintError::Parse`] for files outside the linted
/// layers or with invalid syntax, and [`ArchitectureLintError::Violations`]
/// when any boundary is crossed.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let layer = Layer::of(&source.file).ok_or_else(|| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message: "file is not under domain/ or outbound/".to_owned(),
        })?;
        let parsed =
            syn::parse_file(&source.contents).map_err(|error| ArchitectureLintError::Parse {
                file: source.file.clone(),
                message: error.to_string(),
            })?;
        violations.extend(check_file(&source.file, layer, &parsed));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn check_file(file: &Utf8Path, layer: Layer, parsed: &syn::File) -> Vec<Violation> {
    let mut collector = PathCollector::default();
    collector.visit_file(parsed);

    let mut messages = BTreeSet::new();
    for segments in &collector.paths {
        if let Some(module) = internal_root(segments)
            .filter(|module| layer.forbidden_modules().contains(module))
        {
            messages.insert(format!(
                "{} code must not depend on crate::{module}",
                layer.dir_name()
            ));
        }
        if let Some(krate) =
            external_root(segments).filter(|krate| layer.forbidden_crates().contains(krate))
        {
            messages.insert(format!(
                "{} code must not depend on `{krate}`",
                layer.dir_name()
            ));
        }
    }

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_owned(),
            message,
        })
        .collect()
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// First module below `crate`/`idozer`, skipping `self` and `super`.
fn internal_root(segments: &[String]) -> Option<&str> {
    let first = segments.first()?.as_str();
    let index = if first == CRATE_NAME {
        1
    } else if is_relative(first) {
        segments.iter().position(|segment| !is_relative(segment))?
    } else {
        return None;
    };
    segments.get(index).map(String::as_str)
}

fn external_root(segments: &[String]) -> Option<&str> {
    let first = segments.first()?.as_str();
    (!is_relative(first) && first != CRATE_NAME).then_some(first)
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn record_use_tree(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                prefix.push(name.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, Vec::new());
    }
}

fn collect_sources(
    dir: &Dir,
    relative: &Utf8Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    let io_error = |source| ArchitectureLintError::Io {
        path: relative.to_owned(),
        source,
    };
    let mut entries = Vec::new();
    for entry in dir.entries().map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let name = entry.file_name().into_string().map_err(|raw| {
            ArchitectureLintError::Parse {
                file: relative.to_owned(),
                message: format!("non UTF-8 file name {raw:?}"),
            }
        })?;
        entries.push((name, entry.file_type().map_err(io_error)?.is_dir()));
    }
    entries.sort();

    for (name, is_dir) in entries {
        let path = relative.join(&name);
        if is_dir {
            let child = dir.open_dir(&name).map_err(io_error)?;
            collect_sources(&child, &path, sources)?;
        } else if path.extension() == Some("rs") {
            let contents = dir.read_to_string(&name).map_err(io_error)?;
            sources.push(LintSource::new(path, contents));
        }
    }
    Ok(())
}
