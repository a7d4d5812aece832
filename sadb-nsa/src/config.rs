use std::ffi::OsStr;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sadb_core::DataSourceVersion;
use sadb_core::consts::{DEFAULT_BLOCK_SIZE, MAX_UPSTREAM_LENGTH, SCHEMA_VERSION};

///
/// How a positional writer encodes and validates one data source.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WriterConfig {
    /// Key the source's annotations appear under in the final JSON output.
    pub json_key: String,
    /// Annotations belong to a specific `(ref, alt)` pair rather than to the coordinate.
    pub match_by_allele: bool,
    /// The source reports several values per allele on its own, so duplicates are expected.
    pub is_array: bool,
    /// One value per coordinate, chosen by arbitration.
    pub is_positional: bool,
    pub schema_version: u16,
    /// Uncompressed bytes buffered before a block is flushed.
    pub block_size: usize,
    /// Drop items whose reference allele disagrees with the reference sequence instead of failing.
    pub skip_incorrect_ref_entries: bool,
    /// Fail instead of dropping items that disagree about the same allele pair.
    pub throw_on_conflicts: bool,
    /// How far left of its arrival position trimming may move an item.
    pub upstream_slack: i32,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            json_key: String::new(),
            match_by_allele: true,
            is_array: false,
            is_positional: false,
            schema_version: SCHEMA_VERSION,
            block_size: DEFAULT_BLOCK_SIZE,
            skip_incorrect_ref_entries: true,
            throw_on_conflicts: false,
            upstream_slack: MAX_UPSTREAM_LENGTH,
        }
    }
}

impl WriterConfig {
    pub fn new(json_key: &str) -> Self {
        WriterConfig {
            json_key: json_key.to_string(),
            ..Default::default()
        }
    }

    /// Whether allele-level conflicts must be filtered before encoding.
    pub fn filters_conflicts(&self) -> bool {
        self.match_by_allele && !self.is_array
    }
}

///
/// Everything needed to build one database: where the data came from and how to write it.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub version: DataSourceVersion,
    #[serde(default)]
    pub writer: WriterConfig,
}

#[derive(Error, Debug)]
pub enum WriterConfigError {
    #[error("Missing or invalid file extension in writer config file. It must be `toml`")]
    InvalidFileType,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type WriterConfigResult<T> = std::result::Result<T, WriterConfigError>;

impl FromStr for DatabaseConfig {
    type Err = WriterConfigError;

    fn from_str(s: &str) -> WriterConfigResult<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl TryFrom<&Path> for DatabaseConfig {
    type Error = WriterConfigError;

    fn try_from(path: &Path) -> WriterConfigResult<Self> {
        if path.extension().and_then(OsStr::to_str) != Some("toml") {
            return Err(WriterConfigError::InvalidFileType);
        }
        let toml_str = read_to_string(path)?;
        toml_str.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    #[rstest]
    fn test_defaults() {
        let config = WriterConfig::default();
        assert_eq!(config.block_size, 8 * 1024 * 1024);
        assert_eq!(config.upstream_slack, 500);
        assert!(config.skip_incorrect_ref_entries);
        assert!(!config.throw_on_conflicts);
        assert!(config.filters_conflicts());
    }

    #[rstest]
    fn test_try_from_toml() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            file,
            r#"
[version]
name = "ClinVar"
version = "20240101"
release_date = 1704067200

[writer]
json_key = "clinvar"
is_array = true
block_size = 4096
throw_on_conflicts = true
"#
        )
        .unwrap();

        let config = DatabaseConfig::try_from(file.path()).unwrap();
        assert_eq!(config.version.name, "ClinVar");
        assert_eq!(config.version.description, "");
        assert_eq!(config.writer.json_key, "clinvar");
        assert_eq!(config.writer.block_size, 4096);
        assert!(config.writer.throw_on_conflicts);
        assert!(!config.writer.filters_conflicts());
        // untouched fields fall back to defaults
        assert_eq!(config.writer.upstream_slack, 500);
        assert!(config.writer.skip_incorrect_ref_entries);
    }

    #[rstest]
    fn test_invalid_extension() {
        let path = PathBuf::from("writer.yaml");
        let result = DatabaseConfig::try_from(path.as_path());
        assert!(matches!(result, Err(WriterConfigError::InvalidFileType)));
    }

    #[rstest]
    fn test_missing_version() {
        let result = "[writer]\njson_key = \"dbsnp\"\n".parse::<DatabaseConfig>();
        assert!(matches!(result, Err(WriterConfigError::Toml(_))));
    }
}
