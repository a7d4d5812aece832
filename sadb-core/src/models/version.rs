use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// Provenance of an annotation source, written into every store header.
///
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DataSourceVersion {
    pub name: String,
    pub version: String,
    /// Release date as seconds since the unix epoch.
    pub release_date: i64,
    #[serde(default)]
    pub description: String,
}

impl DataSourceVersion {
    pub fn new(name: &str, version: &str, release_date: i64, description: &str) -> Self {
        DataSourceVersion {
            name: name.to_string(),
            version: version.to_string(),
            release_date,
            description: description.to_string(),
        }
    }
}

impl Display for DataSourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dataSource={}, version:{}, release date:{}",
            self.name, self.version, self.release_date
        )
    }
}
