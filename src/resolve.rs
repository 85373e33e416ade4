//! Logical <-> physical path mapping.

use crate::roots::SourceRoots;
use crate::util;
use clap::ValueEnum;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Logical prefix reserved for paths under the system root.
pub const GOROOT_MARKER: &str = "/GOROOT";

/// Which root wins when a physical path lies under more than one.
#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TieBreak {
    /// Stop at the first matching root in registry order.
    #[default]
    #[value(alias = "first")]
    FirstMatch,
    /// Keep overwriting; the last matching root wins. Legacy behaviour of the
    /// logical direction only.
    #[value(alias = "last")]
    LastMatch,
}

/// A position as the frontend names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalPosition {
    pub path: String,
    pub offset: String,
    pub scope: String,
}

/// A position as the oracle tool expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalPosition {
    /// Empty when no root holds the file.
    pub file: PathBuf,
    pub offset: String,
    pub scope: String,
}

impl PhysicalPosition {
    /// `<file>:#<offset>`, the value of oracle's `-pos` flag.
    pub fn pos_arg(&self) -> String {
        format!("{}:#{}", self.file.display(), self.offset)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    roots: &'a SourceRoots,
    tie_break: TieBreak,
}

impl<'a> Resolver<'a> {
    pub fn new(roots: &'a SourceRoots, tie_break: TieBreak) -> Self {
        Self { roots, tie_break }
    }

    /// First root (registry order) under which `fragment` exists on disk.
    /// A leading `/GOROOT/` marker is dropped before searching.
    pub fn resolve_physical(&self, fragment: &str) -> Option<PathBuf> {
        let stripped = fragment
            .strip_prefix(GOROOT_MARKER)
            .filter(|rest| rest.starts_with('/'))
            .unwrap_or(fragment);
        let relative = Path::new(stripped.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return None;
        }
        if util::has_parent_dir(relative) {
            tracing::warn!(fragment, "rejected logical path with parent components");
            return None;
        }

        self.roots
            .iter()
            .map(|root| root.path.join(relative))
            .find(|candidate| candidate.exists())
    }

    /// Logical form of a physical path (or `path:line:col` position string).
    /// Paths outside every root come back unchanged.
    pub fn resolve_logical(&self, physical: &str) -> String {
        let mut resolved = None;
        for root in self.roots.iter() {
            let Some(root_str) = root.path.to_str() else {
                continue;
            };
            let rest = if root_str.ends_with(MAIN_SEPARATOR) {
                physical.strip_prefix(root_str)
            } else {
                physical
                    .strip_prefix(root_str)
                    .and_then(|rest| rest.strip_prefix(MAIN_SEPARATOR))
            };
            let Some(rest) = rest else {
                continue;
            };

            let mut logical = String::with_capacity(rest.len() + GOROOT_MARKER.len() + 1);
            if root.is_system {
                logical.push_str(GOROOT_MARKER);
            }
            logical.push('/');
            logical.push_str(&rest.replace('\\', "/"));
            resolved = Some(logical);

            if self.tie_break == TieBreak::FirstMatch {
                break;
            }
        }
        resolved.unwrap_or_else(|| physical.to_string())
    }

    pub fn to_physical(&self, logical: &LogicalPosition) -> PhysicalPosition {
        let file = self.resolve_physical(&logical.path).unwrap_or_else(|| {
            tracing::debug!(path = %logical.path, "no source root holds logical path");
            PathBuf::new()
        });
        PhysicalPosition {
            file,
            offset: logical.offset.clone(),
            scope: logical.scope.clone(),
        }
    }
}
