//! Source root registry.
//!
//! The ordered set of directories that may hold Go source, plus the one
//! system root holding the standard library. Built once at startup and only
//! read afterwards.

use crate::util;
use anyhow::Result;
use serde::Serialize;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRoots {
    roots: Vec<PathBuf>,
    system: PathBuf,
}

/// One registry entry as seen during resolution.
#[derive(Debug, Clone, Copy)]
pub struct Root<'a> {
    pub path: &'a Path,
    pub is_system: bool,
}

impl SourceRoots {
    /// Registry with an explicit resolution order. `roots` are searched in
    /// the given order, `system` always last.
    pub fn new(roots: Vec<PathBuf>, system: PathBuf) -> Self {
        Self { roots, system }
    }

    /// Apply the discovery rule to the source dirs reported by the
    /// environment: back-to-front, without anything under `goroot`, with the
    /// standard library source dir appended last.
    pub fn from_src_dirs(goroot: &Path, src_dirs: &[PathBuf]) -> Self {
        let roots = src_dirs
            .iter()
            .rev()
            .filter(|dir| !dir.starts_with(goroot))
            .cloned()
            .collect();
        Self {
            roots,
            system: system_src_dir(goroot),
        }
    }

    pub fn discover() -> Result<Self> {
        let goroot = match env::var("GOROOT") {
            Ok(value) if !value.trim().is_empty() => PathBuf::from(value.trim()),
            _ => match util::go_env("GOROOT") {
                Some(value) => PathBuf::from(value),
                None => anyhow::bail!("GOROOT is not set and `go env GOROOT` failed"),
            },
        };

        let gopath: Option<OsString> = match env::var_os("GOPATH") {
            Some(value) if !value.is_empty() => Some(value),
            _ => util::go_env("GOPATH")
                .map(Into::into)
                .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join("go").into())),
        };

        let mut src_dirs = vec![system_src_dir(&goroot)];
        if let Some(gopath) = gopath {
            src_dirs.extend(gopath_src_dirs(&gopath));
        }

        let roots = Self::from_src_dirs(&goroot, &src_dirs);
        tracing::debug!(
            goroot = %goroot.display(),
            roots = roots.roots.len(),
            "discovered source roots"
        );
        Ok(roots)
    }

    /// Roots in resolution order, the system root last.
    pub fn iter(&self) -> impl Iterator<Item = Root<'_>> {
        self.roots
            .iter()
            .map(|path| Root {
                path,
                is_system: false,
            })
            .chain(std::iter::once(Root {
                path: &self.system,
                is_system: true,
            }))
    }

    pub fn system(&self) -> &Path {
        &self.system
    }
}

/// Standard library source dir: `src/pkg` on old toolchains, `src` since.
fn system_src_dir(goroot: &Path) -> PathBuf {
    let legacy = goroot.join("src").join("pkg");
    if legacy.is_dir() {
        legacy
    } else {
        goroot.join("src")
    }
}

/// `<entry>/src` for every GOPATH entry that has one, in GOPATH order.
pub fn gopath_src_dirs(gopath: &OsStr) -> Vec<PathBuf> {
    env::split_paths(gopath)
        .filter(|entry| !entry.as_os_str().is_empty())
        .map(|entry| entry.join("src"))
        .filter(|src| src.is_dir())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn src_dirs_are_reversed_and_goroot_filtered() {
        let goroot = PathBuf::from("/usr/local/go");
        let dirs = vec![
            PathBuf::from("/usr/local/go/src/pkg"),
            PathBuf::from("/home/dev/go/src"),
            PathBuf::from("/home/dev/vendor/src"),
        ];
        let roots = SourceRoots::from_src_dirs(&goroot, &dirs);
        let order: Vec<_> = roots.iter().map(|root| root.path.to_path_buf()).collect();
        assert_eq!(
            order,
            vec![
                PathBuf::from("/home/dev/vendor/src"),
                PathBuf::from("/home/dev/go/src"),
                PathBuf::from("/usr/local/go/src"),
            ]
        );
        assert_eq!(roots.iter().count(), 3);
    }

    #[test]
    fn goroot_prefix_is_component_aware() {
        let goroot = PathBuf::from("/opt/go");
        let dirs = vec![PathBuf::from("/opt/gopath/src")];
        let roots = SourceRoots::from_src_dirs(&goroot, &dirs);
        assert_eq!(roots.iter().count(), 2);
    }

    #[test]
    fn system_root_is_last_and_flagged() {
        let roots = SourceRoots::new(
            vec![PathBuf::from("/a"), PathBuf::from("/b")],
            PathBuf::from("/go/src"),
        );
        let flags: Vec<_> = roots.iter().map(|root| root.is_system).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert_eq!(roots.system(), Path::new("/go/src"));
    }

    #[test]
    fn legacy_pkg_layout_is_preferred() {
        let goroot = TempDir::new().unwrap();
        std::fs::create_dir_all(goroot.path().join("src").join("pkg")).unwrap();
        let roots = SourceRoots::from_src_dirs(goroot.path(), &[]);
        assert_eq!(roots.system(), goroot.path().join("src").join("pkg"));
    }

    #[test]
    fn gopath_entries_without_src_are_skipped() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::create_dir_all(first.path().join("src")).unwrap();
        let joined = env::join_paths([first.path(), second.path()]).unwrap();
        let dirs = gopath_src_dirs(&joined);
        assert_eq!(dirs, vec![first.path().join("src")]);
    }
}
