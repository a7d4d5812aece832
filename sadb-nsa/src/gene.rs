use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::info;

use sadb_core::consts::NGA_FILE_EXTENSION;
use sadb_core::{DataSourceVersion, JsonRender, Result};
use sadb_io::{ReadSaExt, SaHeader, StoreKind, WriteSaExt, checked_count};

///
/// Writes a gene-keyed store: the shared header followed by a single gzip stream holding
/// `count · (gene symbol · count · payload*)*`.
///
pub struct NgaWriter<W: Write> {
    writer: W,
}

impl NgaWriter<BufWriter<File>> {
    /// Create `<prefix>.nga` and write the header.
    pub fn create<T: AsRef<Path>>(
        prefix: T,
        version: DataSourceVersion,
        json_key: &str,
        is_array: bool,
        schema_version: u16,
    ) -> Result<Self> {
        let path = nga_path(prefix);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        Self::new(writer, version, json_key, is_array, schema_version)
    }
}

impl<W: Write> NgaWriter<W> {
    pub fn new(
        mut writer: W,
        version: DataSourceVersion,
        json_key: &str,
        is_array: bool,
        schema_version: u16,
    ) -> Result<Self> {
        let header = SaHeader {
            kind: StoreKind::Gene,
            version,
            json_key: json_key.to_string(),
            is_array,
            schema_version,
        };
        header.write(&mut writer)?;
        Ok(NgaWriter { writer })
    }

    ///
    /// Write every gene with its annotations and close the stream.
    ///
    /// Returns the number of annotations written.
    ///
    pub fn write<T: JsonRender>(self, genes: &BTreeMap<String, Vec<T>>) -> Result<usize> {
        let mut encoder = GzEncoder::new(self.writer, Compression::default());
        let mut written = 0;

        encoder.write_opt_usize(genes.len())?;
        for (gene, annotations) in genes {
            encoder.write_opt_string(gene)?;
            encoder.write_opt_usize(annotations.len())?;
            for annotation in annotations {
                encoder.write_opt_string(&annotation.json_string())?;
            }
            written += annotations.len();
        }

        let mut writer = encoder.finish()?;
        writer.flush()?;

        info!("Wrote {} annotations for {} genes", written, genes.len());
        Ok(written)
    }
}

pub fn nga_path<P: AsRef<Path>>(prefix: P) -> PathBuf {
    let mut path = prefix.as_ref().as_os_str().to_owned();
    path.push(NGA_FILE_EXTENSION);
    PathBuf::from(path)
}

/// Contents of a gene-keyed store.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneStore {
    pub header: SaHeader,
    pub genes: BTreeMap<String, Vec<String>>,
}

///
/// Read a whole gene-keyed store written by [`NgaWriter`].
///
pub fn read_gene_store<R: Read>(mut reader: R) -> Result<GeneStore> {
    let header = SaHeader::read_expecting(&mut reader, StoreKind::Gene)?;

    let mut body = Vec::new();
    GzDecoder::new(reader).read_to_end(&mut body)?;
    let mut body = body.as_slice();

    // a gene takes at least its name length and its annotation count
    let gene_count = checked_count(body.read_opt_usize()?, body.len(), 2)?;
    let mut genes = BTreeMap::new();
    for _ in 0..gene_count {
        let gene = body.read_opt_string()?;
        let count = checked_count(body.read_opt_usize()?, body.len(), 1)?;
        let annotations = (0..count)
            .map(|_| body.read_opt_string())
            .collect::<std::io::Result<Vec<_>>>()?;
        genes.insert(gene, annotations);
    }

    Ok(GeneStore { header, genes })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use sadb_core::SaError;
    use sadb_core::models::CustomAnnotation;

    #[fixture]
    fn genes() -> BTreeMap<String, Vec<CustomAnnotation>> {
        let mut genes = BTreeMap::new();
        genes.insert(
            "BRCA1".to_string(),
            vec![
                CustomAnnotation::new().with_field("mimNumber", 113705),
                CustomAnnotation::new().with_field("phenotype", "Breast-ovarian cancer"),
            ],
        );
        genes.insert(
            "TP53".to_string(),
            vec![CustomAnnotation::new().with_field("mimNumber", 191170)],
        );
        genes
    }

    #[rstest]
    fn test_write_read(genes: BTreeMap<String, Vec<CustomAnnotation>>) {
        let mut buffer = Vec::new();
        let writer = NgaWriter::new(
            &mut buffer,
            DataSourceVersion::new("OMIM", "2024", 0, "gene phenotypes"),
            "omim",
            true,
            22,
        )
        .unwrap();
        assert_eq!(writer.write(&genes).unwrap(), 3);

        let store = read_gene_store(Cursor::new(buffer)).unwrap();
        assert_eq!(store.header.kind, StoreKind::Gene);
        assert_eq!(store.header.json_key, "omim");
        assert_eq!(
            store.genes["BRCA1"],
            vec![
                r#"{"mimNumber":113705}"#.to_string(),
                r#"{"phenotype":"Breast-ovarian cancer"}"#.to_string(),
            ]
        );
        assert_eq!(store.genes["TP53"], vec![r#"{"mimNumber":191170}"#.to_string()]);
    }

    #[rstest]
    fn test_empty_store() {
        let mut buffer = Vec::new();
        let writer = NgaWriter::new(
            &mut buffer,
            DataSourceVersion::new("OMIM", "2024", 0, ""),
            "omim",
            true,
            22,
        )
        .unwrap();
        assert_eq!(writer.write::<String>(&BTreeMap::new()).unwrap(), 0);

        let store = read_gene_store(Cursor::new(buffer)).unwrap();
        assert!(store.genes.is_empty());
    }

    #[rstest]
    fn test_positional_store_is_rejected() {
        let mut buffer = Vec::new();
        SaHeader {
            kind: StoreKind::Positional,
            version: DataSourceVersion::new("x", "1", 0, ""),
            json_key: "x".to_string(),
            is_array: false,
            schema_version: 22,
        }
        .write(&mut buffer)
        .unwrap();

        let result = read_gene_store(Cursor::new(buffer));
        assert!(matches!(result, Err(SaError::InvalidHeader(_))));
    }

    fn gene_store_with_body(body: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::new();
        SaHeader {
            kind: StoreKind::Gene,
            version: DataSourceVersion::new("OMIM", "2024", 0, ""),
            json_key: "omim".to_string(),
            is_array: true,
            schema_version: 22,
        }
        .write(&mut buffer)
        .unwrap();

        let mut encoder = GzEncoder::new(buffer, Compression::default());
        encoder.write_all(body).unwrap();
        encoder.finish().unwrap()
    }

    #[rstest]
    fn test_huge_gene_count_is_corrupt() {
        let mut body = Vec::new();
        body.write_opt_u64(u64::MAX).unwrap();

        let result = read_gene_store(Cursor::new(gene_store_with_body(&body)));
        assert!(matches!(result, Err(SaError::CorruptRecord(_))));
    }

    #[rstest]
    fn test_huge_annotation_count_is_corrupt() {
        let mut body = Vec::new();
        body.write_opt_usize(1).unwrap();
        body.write_opt_string("BRCA1").unwrap();
        body.write_opt_u64(u64::MAX).unwrap();
        body.write_opt_string("{}").unwrap();

        let result = read_gene_store(Cursor::new(gene_store_with_body(&body)));
        assert!(matches!(result, Err(SaError::CorruptRecord(_))));
    }

    #[rstest]
    fn test_nga_path() {
        assert_eq!(nga_path("out/omim"), PathBuf::from("out/omim.nga"));
    }
}
