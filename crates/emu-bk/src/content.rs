//! Routing of host content into a session.

use std::path::Path;

/// Extensions loaded as floppy images. Anything else is a `.bin` program.
pub const DISK_EXTENSIONS: [&str; 3] = ["img", "dsk", "bkd"];

/// Everything the host handed over at load time.
#[derive(Debug, Clone, Default)]
pub struct LoadBundle<'a> {
    /// Path of the primary content, if it came from a file.
    pub path: Option<&'a Path>,
    /// `.bin` program injected shortly after boot.
    pub program: Option<&'a [u8]>,
    /// Floppy images for drive units 0 to 3, in order.
    pub media: Vec<Option<&'a [u8]>>,
}

impl<'a> LoadBundle<'a> {
    /// Boot the bare machine.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// One piece of content, routed by extension.
    #[must_use]
    pub fn from_content(path: Option<&'a Path>, data: &'a [u8]) -> Self {
        if path.is_some_and(is_disk_image) {
            Self {
                path,
                program: None,
                media: vec![Some(data)],
            }
        } else {
            Self {
                path,
                program: Some(data),
                media: Vec::new(),
            }
        }
    }

    /// Several floppies at once. `path` is the first image's path.
    #[must_use]
    pub fn floppies(path: Option<&'a Path>, images: &[&'a [u8]]) -> Self {
        Self {
            path,
            program: None,
            media: images.iter().map(|&image| Some(image)).collect(),
        }
    }

    /// Directory the tape emulation should resolve file names against.
    #[must_use]
    pub fn tape_directory(&self) -> Option<&'a Path> {
        self.path?.parent()
    }
}

/// Whether `path` names a floppy image. The extension match ignores case.
#[must_use]
pub fn is_disk_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            DISK_EXTENSIONS
                .iter()
                .any(|disk| ext.eq_ignore_ascii_case(disk))
        })
}
