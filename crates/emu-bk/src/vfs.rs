//! File access for ROMs and other assets.
//!
//! The provider is picked once when the session starts: the host's virtual
//! file system if it offers one, the native filesystem otherwise. Every
//! caller goes through [`FileAccess`] and never learns which one it got.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use emu_core::{AccessMode, FileHandle, FileSystem};

/// Files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileSystem;

impl FileSystem for NativeFileSystem {
    fn open(&self, path: &Path, mode: AccessMode) -> io::Result<Box<dyn FileHandle>> {
        let file = match mode {
            AccessMode::Read => File::open(path)?,
            AccessMode::Write => File::create(path)?,
        };
        Ok(Box::new(NativeFile { file }))
    }
}

struct NativeFile {
    file: File,
}

impl FileHandle for NativeFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    /// Seek to the end and back, so the read position is unchanged.
    fn size(&mut self) -> io::Result<u64> {
        let position = self.file.stream_position()?;
        let end = self.file.seek(SeekFrom::End(0))?;
        self.file.seek(SeekFrom::Start(position))?;
        Ok(end)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Which provider a session ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Native,
    Host,
}

/// The session's file provider.
pub struct FileAccess {
    provider: Box<dyn FileSystem>,
    kind: ProviderKind,
}

impl FileAccess {
    /// Use the host's provider when there is one, the native filesystem
    /// otherwise.
    #[must_use]
    pub fn select(host_provider: Option<Box<dyn FileSystem>>) -> Self {
        match host_provider {
            Some(provider) => Self {
                provider,
                kind: ProviderKind::Host,
            },
            None => Self::native(),
        }
    }

    #[must_use]
    pub fn native() -> Self {
        Self {
            provider: Box::new(NativeFileSystem),
            kind: ProviderKind::Native,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn open(&self, path: &Path, mode: AccessMode) -> io::Result<Box<dyn FileHandle>> {
        self.provider.open(path, mode)
    }

    /// Open with a mode string, which must be exactly `"r"` or `"w"`.
    pub fn open_with(&self, path: &Path, mode: &str) -> io::Result<Box<dyn FileHandle>> {
        self.open(path, mode.parse()?)
    }

    /// Open a read-only asset.
    ///
    /// Tries `path` as given, then once more with only the file name
    /// lowercased. Returns the path that worked alongside the handle. When
    /// both attempts fail the first error is returned. Each attempt is
    /// announced through `notice`.
    pub fn open_asset(
        &self,
        path: &Path,
        notice: &mut dyn FnMut(&str),
    ) -> io::Result<(PathBuf, Box<dyn FileHandle>)> {
        notice(&format!("Loading {}...", path.display()));
        let first = match self.open(path, AccessMode::Read) {
            Ok(handle) => return Ok((path.to_path_buf(), handle)),
            Err(err) => err,
        };

        let Some(fallback) = lowercase_file_name(path) else {
            return Err(first);
        };
        notice(&format!("Attempting to load {}...", fallback.display()));
        match self.open(&fallback, AccessMode::Read) {
            Ok(handle) => Ok((fallback, handle)),
            Err(_) => Err(first),
        }
    }
}

/// `path` with its final component lowercased, or `None` when that changes
/// nothing.
fn lowercase_file_name(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let lower = name.to_lowercase();
    if lower == name {
        return None;
    }
    Some(path.with_file_name(lower))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;

    /// In-memory provider standing in for a host VFS.
    #[derive(Clone, Default)]
    struct MemoryFileSystem {
        files: Rc<RefCell<HashMap<PathBuf, Vec<u8>>>>,
    }

    struct MemoryFile {
        files: Rc<RefCell<HashMap<PathBuf, Vec<u8>>>>,
        path: PathBuf,
        data: Vec<u8>,
        position: usize,
        mode: AccessMode,
    }

    impl FileSystem for MemoryFileSystem {
        fn open(&self, path: &Path, mode: AccessMode) -> io::Result<Box<dyn FileHandle>> {
            let data = match mode {
                AccessMode::Read => self
                    .files
                    .borrow()
                    .get(path)
                    .cloned()
                    .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?,
                AccessMode::Write => Vec::new(),
            };
            Ok(Box::new(MemoryFile {
                files: Rc::clone(&self.files),
                path: path.to_path_buf(),
                data,
                position: 0,
                mode,
            }))
        }
    }

    impl FileHandle for MemoryFile {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let rest = &self.data[self.position..];
            let n = rest.len().min(buf.len());
            buf[..n].copy_from_slice(&rest[..n]);
            self.position += n;
            Ok(n)
        }

        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn size(&mut self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn flush(&mut self) -> io::Result<()> {
            if self.mode == AccessMode::Write {
                self.files
                    .borrow_mut()
                    .insert(self.path.clone(), self.data.clone());
            }
            Ok(())
        }
    }

    fn read_all(handle: &mut dyn FileHandle) -> Vec<u8> {
        let size = handle.size().expect("size") as usize;
        let mut data = vec![0; size];
        handle.read_exact(&mut data).expect("read");
        data
    }

    #[test]
    fn native_size_keeps_position() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("MONIT10.ROM");
        std::fs::write(&path, [1u8, 2, 3, 4, 5]).expect("write");

        let files = FileAccess::native();
        let mut handle = files.open_with(&path, "r").expect("open");
        assert_eq!(handle.read_byte().expect("read"), Some(1));
        assert_eq!(handle.size().expect("size"), 5);
        assert_eq!(handle.read_byte().expect("read"), Some(2));
    }

    #[test]
    fn native_case_fallback_finds_lowercase_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("focal10.rom"), b"FOCAL").expect("write");

        let files = FileAccess::native();
        let mut notices = Vec::new();
        let (found, mut handle) = files
            .open_asset(&dir.path().join("FOCAL10.ROM"), &mut |m| {
                notices.push(m.to_string());
            })
            .expect("fallback");
        assert_eq!(found, dir.path().join("focal10.rom"));
        assert_eq!(
            notices,
            [
                format!("Loading {}...", dir.path().join("FOCAL10.ROM").display()),
                format!(
                    "Attempting to load {}...",
                    dir.path().join("focal10.rom").display()
                ),
            ]
        );

        let mut direct = files
            .open(&dir.path().join("focal10.rom"), AccessMode::Read)
            .expect("direct");
        assert_eq!(read_all(handle.as_mut()), read_all(direct.as_mut()));
    }

    #[test]
    fn fallback_keeps_directory_case() {
        let fs = MemoryFileSystem::default();
        fs.files
            .borrow_mut()
            .insert(PathBuf::from("/System/BK/basic10.rom"), b"BASIC".to_vec());
        let files = FileAccess::select(Some(Box::new(fs.clone())));
        assert_eq!(files.kind(), ProviderKind::Host);

        let (found, mut handle) = files
            .open_asset(Path::new("/System/BK/BASIC10.ROM"), &mut |_| {})
            .expect("fallback");
        assert_eq!(found, PathBuf::from("/System/BK/basic10.rom"));
        assert_eq!(read_all(handle.as_mut()), b"BASIC");

        // A lowercased directory is never tried.
        fs.files.borrow_mut().clear();
        fs.files
            .borrow_mut()
            .insert(PathBuf::from("/system/bk/basic10.rom"), b"BASIC".to_vec());
        assert!(
            files
                .open_asset(Path::new("/System/BK/BASIC10.ROM"), &mut |_| {})
                .is_err()
        );
    }

    #[test]
    fn missing_asset_reports_not_found() {
        let files = FileAccess::select(Some(Box::new(MemoryFileSystem::default())));
        let mut notices = 0;
        let err = files
            .open_asset(Path::new("DISK_327.ROM"), &mut |_| notices += 1)
            .err()
            .expect("missing");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        // "disk_327.rom" is announced too.
        assert_eq!(notices, 2);
    }

    #[test]
    fn host_provider_writes_on_close() {
        let fs = MemoryFileSystem::default();
        let files = FileAccess::select(Some(Box::new(fs.clone())));
        let mut handle = files.open_with(Path::new("tape.bin"), "w").expect("open");
        handle.write_byte(0o12).expect("write");
        handle.write_byte(0o34).expect("write");
        handle.close().expect("close");

        let mut back = files.open_with(Path::new("tape.bin"), "r").expect("open");
        assert_eq!(back.size().expect("size"), 2);
        assert_eq!(back.read_byte().expect("read"), Some(0o12));
        assert_eq!(back.read_byte().expect("read"), Some(0o34));
        assert_eq!(back.read_byte().expect("read"), None);
    }

    #[test]
    fn combined_modes_are_refused() {
        let files = FileAccess::native();
        let err = files
            .open_with(Path::new("anything"), "r+")
            .err()
            .expect("refused");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
