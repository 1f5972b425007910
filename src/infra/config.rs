use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::error::ConfigError;
use crate::infra::io::TextEncoding;

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

/// Environment override prefix (`MAILTIDY_PATHS__OUTPUT_DIR=...`).
pub const ENV_PREFIX: &str = "MAILTIDY";

/// Written verbatim when the configuration file does not exist yet.
pub const DEFAULT_CONFIG_INI: &str = "\
; mailtidy configuration
; Relative paths are resolved against the working directory.

[paths]
; directory scanned for *.txt input files (not recursive)
input_dir = input
; directory receiving the cleaned files (same names as the inputs)
output_dir = output

[processing]
; text encoding used to read inputs and write outputs (utf-8, shift_jis, euc-jp, ...)
encoding = utf-8
; copy each original into <input_dir>/backup/ before writing its output
backup_original = true

[keywords]
; lines starting with one of these get a blank line before them
; separate entries with ',' or '、'
list = 記,件名,宛先,差出人
";

/// Run configuration, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Settings
{
    /// Directory scanned for input documents
    pub input_dir: PathBuf,

    /// Directory receiving cleaned documents
    pub output_dir: PathBuf,

    /// Encoding for both reading and writing
    pub encoding: TextEncoding,

    /// Copy originals into `<input_dir>/backup/` before writing
    pub backup_original: bool,

    /// Ordered, de-duplicated keyword list
    pub keywords: Vec<String>,
}

impl Default for Settings
{
    fn default() -> Self
    {
        let raw = RawConfig::default();
        Self {
            input_dir: raw.paths.input_dir,
            output_dir: raw.paths.output_dir,
            encoding: TextEncoding::default(),
            backup_original: raw.processing.backup_original,
            keywords: parse_keywords(&raw.keywords.list),
        }
    }
}

impl Settings
{
    /// `<input_dir>/backup`
    pub fn backup_dir(&self) -> PathBuf
    {
        self.input_dir.join("backup")
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig
{
    paths: PathsSection,
    processing: ProcessingSection,
    keywords: KeywordsSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PathsSection
{
    input_dir: PathBuf,
    output_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ProcessingSection
{
    encoding: String,
    backup_original: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct KeywordsSection
{
    list: String,
}

impl Default for RawConfig
{
    fn default() -> Self
    {
        Self {
            paths: PathsSection::default(),
            processing: ProcessingSection::default(),
            keywords: KeywordsSection::default(),
        }
    }
}

impl Default for PathsSection
{
    fn default() -> Self
    {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Default for ProcessingSection
{
    fn default() -> Self
    {
        Self {
            encoding: "utf-8".to_string(),
            backup_original: true,
        }
    }
}

impl Default for KeywordsSection
{
    fn default() -> Self
    {
        Self {
            list: "記,件名,宛先,差出人".to_string(),
        }
    }
}

/// Split a keyword list on `,` or `、`, trimming entries and dropping empty
/// and repeated ones while keeping the first occurrence's position.
pub fn parse_keywords(list: &str) -> Vec<String>
{
    list.split([',', '、'])
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Write the default configuration to `path`, creating parent directories.
pub fn create_default(path: &Path) -> Result<(), ConfigError>
{
    let create_err = |source: std::io::Error| ConfigError::Create {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent).map_err(create_err)?;
    }

    fs::write(path, DEFAULT_CONFIG_INI).map_err(create_err)?;

    info!("created default configuration file '{}'", path.display());
    Ok(())
}

/// Load settings from the INI file at `path` plus `MAILTIDY_*` environment
/// overrides. The file must exist; see [`load_or_create`].
pub fn load_config(path: &Path) -> Result<Settings, ConfigError>
{
    let load_err = |source: config::ConfigError| ConfigError::Load {
        path: path.to_path_buf(),
        source,
    };

    let cfg = config::Config::builder()
        .add_source(
            config::File::from(path)
                .format(config::FileFormat::Ini)
                .required(true),
        )
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(load_err)?;

    let raw: RawConfig = cfg
        .try_deserialize()
        .map_err(load_err)?;

    let encoding = TextEncoding::for_label(&raw.processing.encoding).ok_or_else(|| {
        ConfigError::UnknownEncoding {
            label: raw.processing.encoding.clone(),
            path: path.to_path_buf(),
        }
    })?;

    let settings = Settings {
        input_dir: raw.paths.input_dir,
        output_dir: raw.paths.output_dir,
        encoding,
        backup_original: raw.processing.backup_original,
        keywords: parse_keywords(&raw.keywords.list),
    };

    debug!(
        input = %settings.input_dir.display(),
        output = %settings.output_dir.display(),
        encoding = settings.encoding.name(),
        backup = settings.backup_original,
        keywords = ?settings.keywords,
        "configuration loaded"
    );

    Ok(settings)
}

/// Load `path`, writing the default configuration first if it is absent.
pub fn load_or_create(path: &Path) -> Result<Settings, ConfigError>
{
    if !path.exists()
    {
        create_default(path)?;
    }

    load_config(path)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_keywords_separators_and_dedupe()
    {
        assert_eq!(
            parse_keywords("記、件名, 宛先 ,,件名,差出人"),
            vec!["記", "件名", "宛先", "差出人"]
        );
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords(" , 、 ").is_empty());
    }

    #[test]
    fn test_load_or_create_writes_defaults()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("nested/config.ini");

        let settings = load_or_create(&path).unwrap();

        assert!(path.exists());
        assert_eq!(settings.input_dir, PathBuf::from("input"));
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.encoding.name(), "UTF-8");
        assert!(settings.backup_original);
        assert_eq!(settings.keywords, vec!["記", "件名", "宛先", "差出人"]);
        assert_eq!(settings.backup_dir(), PathBuf::from("input/backup"));
    }

    #[test]
    fn test_load_custom_values_and_missing_sections()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("custom.ini");
        fs::write(
            &path,
            "[paths]\ninput_dir = mails\n\n[processing]\nencoding = shift_jis\nbackup_original = no\n",
        )
        .unwrap();

        let settings = load_config(&path).unwrap();

        assert_eq!(settings.input_dir, PathBuf::from("mails"));
        // missing key falls back to the default
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.encoding.name(), "Shift_JIS");
        assert!(!settings.backup_original);
        // missing section falls back to the default keywords
        assert_eq!(settings.keywords.len(), 4);
    }

    #[test]
    fn test_unknown_encoding_is_rejected()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("bad.ini");
        fs::write(&path, "[processing]\nencoding = klingon\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEncoding { ref label, .. } if label == "klingon"));
    }

    #[test]
    fn test_invalid_boolean_is_a_load_error()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("bad.ini");
        fs::write(&path, "[processing]\nbackup_original = maybe\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }
}
