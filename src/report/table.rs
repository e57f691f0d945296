use std::fs;
use std::path::Path;

use crate::report::PersistError;

pub fn ensure_parent_dir(path: &Path) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Writes a comma-separated table, replacing any existing file. The header is
/// written even when `rows` is empty.
pub fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<(), PersistError> {
    ensure_parent_dir(path)?;
    let csv_err = |source| PersistError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut w = csv::Writer::from_path(path).map_err(csv_err)?;
    w.write_record(header).map_err(csv_err)?;
    for row in rows {
        w.write_record(row).map_err(csv_err)?;
    }
    w.flush().map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/table.rs"]
mod tests;
