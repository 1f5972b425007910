use std::borrow::Cow;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use memmap2::Mmap;

use crate::core::error::FileError;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Raw bytes of an input file, mapped or buffered depending on size.
#[derive(Debug)]
pub enum FileBytes {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl AsRef<[u8]> for FileBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            FileBytes::Mapped(mmap) => &mmap[..],
            FileBytes::Buffered(buf) => buf.as_slice(),
        }
    }
}

pub fn read_bytes_smart<P: AsRef<Path>>(path: P) -> std::io::Result<FileBytes> {
    let path = path.as_ref();
    let metadata = fs::metadata(path)?;

    if metadata.len() > MMAP_THRESHOLD {
        let file = File::open(path)?;

        // Safety: the mapping is read-only and dropped before the run writes anything
        let mmap = unsafe { Mmap::map(&file) }?;

        Ok(FileBytes::Mapped(mmap))
    } else {
        Ok(FileBytes::Buffered(fs::read(path)?))
    }
}

/// Text encoding resolved from a configuration label.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl std::fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TextEncoding").field(&self.0.name()).finish()
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self(UTF_8)
    }
}

impl TextEncoding {
    /// Resolve a label such as `utf-8`, `shift_jis`, `cp932`, or `euc-jp`.
    pub fn for_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();

        match label.as_str() {
            "cp932" | "ms932" | "mskanji" => return Some(Self(SHIFT_JIS)),
            "utf-8-sig" | "utf_8_sig" | "utf8-sig" => return Some(Self(UTF_8)),
            _ => {}
        }

        Encoding::for_label(label.as_bytes())
            .or_else(|| Encoding::for_label(label.replace('_', "-").as_bytes()))
            .map(Self)
    }

    /// Canonical WHATWG name (e.g. `UTF-8`, `Shift_JIS`).
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Strict decode. A byte-order mark takes precedence over the configured
    /// encoding and is stripped; malformed input yields `None`.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        let (encoding, body) = match Encoding::for_bom(bytes) {
            Some((enc, bom_len)) => (enc, &bytes[bom_len..]),
            None => (self.0, bytes),
        };

        encoding.decode_without_bom_handling_and_without_replacement(body)
    }

    /// Strict encode; `None` if a character has no mapping.
    pub fn encode<'a>(&self, text: &'a str) -> Option<Cow<'a, [u8]>> {
        let (bytes, _, had_errors) = self.0.encode(text);
        if had_errors { None } else { Some(bytes) }
    }
}

/// One decoded input file.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name as it is on disk; outputs and backups reuse it byte for byte
    pub file_name: OsString,
    /// Lossy rendering of `file_name` for logs and summaries
    pub name: String,
    pub path: PathBuf,
    pub text: String,
}

/// Read and strictly decode `path`. The raw bytes are returned as well so the
/// caller can back them up or fingerprint them without a second read.
pub fn read_document(
    path: &Path,
    encoding: TextEncoding,
) -> Result<(Document, FileBytes), FileError> {
    let bytes = read_bytes_smart(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let text = encoding
        .decode(bytes.as_ref())
        .ok_or_else(|| FileError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })?
        .into_owned();

    let file_name = path
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_default();
    let name = file_name.to_string_lossy().into_owned();

    Ok((
        Document {
            file_name,
            name,
            path: path.to_path_buf(),
            text,
        },
        bytes,
    ))
}

/// Encode `text` and write it atomically. Returns the number of bytes written.
pub fn write_output(
    path: &Path,
    text: &str,
    encoding: TextEncoding,
) -> Result<usize, FileError> {
    let bytes = encoding
        .encode(text)
        .ok_or_else(|| FileError::Encode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })?;

    write_atomic(path, &bytes).map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(bytes.len())
}

/// Write through a same-directory temp file, then rename into place.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    Ok(())
}
