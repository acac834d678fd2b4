use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn format_mib(bytes: u64) -> String {
    let mib = (bytes / 1024 / 1024).to_string();
    let mut grouped = String::with_capacity(mib.len() + mib.len() / 3);
    for (idx, ch) in mib.chars().enumerate() {
        if idx > 0 && (mib.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Create `path` if missing and bump its modification time.
pub fn touch(path: &Path) -> Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.set_modified(SystemTime::now())
        .with_context(|| format!("set mtime {}", path.display()))?;
    Ok(())
}
