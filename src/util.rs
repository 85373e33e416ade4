use std::path::{Component, Path};
use std::process::{Command, Stdio};

/// Query a single value from `go env`. `None` when the go tool is missing,
/// fails, or prints nothing.
pub fn go_env(var: &str) -> Option<String> {
    let output = Command::new("go")
        .arg("env")
        .arg(var)
        .stdin(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout);
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn has_parent_dir(path: &Path) -> bool {
    path.components()
        .any(|comp| matches!(comp, Component::ParentDir))
}

pub fn truncate_str_bytes(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes.min(value.len());
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// First non-blank line of a process stream, trimmed and capped for logging.
pub fn first_line(raw: &[u8], max_bytes: usize) -> String {
    let text = String::from_utf8_lossy(raw);
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    truncate_str_bytes(line, max_bytes)
}
