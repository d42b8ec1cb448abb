use crate::error::{CasmError, Result};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes `path` by filling `<path>.tmp` and renaming it over the destination.
///
/// The temporary file is created exclusively: if it already exists the call fails
/// with [`CasmError::AlreadyExists`] and nothing is touched. If `write` fails the
/// temporary file is removed and the destination is left as it was.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp = temp_path(path);
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => CasmError::AlreadyExists { path: tmp.clone() },
            _ => CasmError::io(&tmp, e),
        })?;

    let mut writer = BufWriter::new(file);
    let written = write(&mut writer).and_then(|()| writer.flush().map_err(|e| CasmError::io(&tmp, e)));
    drop(writer);

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            debug!("Could not remove {:?} after failed write: {}", tmp, cleanup);
        }
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| CasmError::io(path, e))?;
    debug!("Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("/a/b/sel.json")),
            Path::new("/a/b/sel.json.tmp")
        );
    }

    #[test]
    fn write_replaces_destination_and_removes_temp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").unwrap();

        write_atomically(&path, |w| {
            w.write_all(b"new").map_err(|e| CasmError::io("out.txt", e))
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn existing_temp_file_is_never_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(temp_path(&path), "someone else's").unwrap();

        let result = write_atomically(&path, |_| Ok(()));

        assert!(matches!(result, Err(CasmError::AlreadyExists { .. })));
        assert_eq!(
            fs::read_to_string(temp_path(&path)).unwrap(),
            "someone else's"
        );
        assert!(!path.exists());
    }

    #[test]
    fn failed_write_leaves_destination_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").unwrap();

        let result = write_atomically(&path, |_| Err(CasmError::InvalidData("boom".into())));

        assert!(matches!(result, Err(CasmError::InvalidData(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert!(!temp_path(&path).exists());
    }
}
