use std::collections::HashMap;
use std::io::{BufRead, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use sadb_core::{Result, SaError};

use crate::binary::{ReadSaExt, WriteSaExt};

///
/// Maps a tag (usually a chromosome name) to the byte offset of its first line in a text file
/// sorted by tag.
///
/// Layout: `u32 LE count · (string tag · u64 LE offset)*`, tags in insertion order.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: Vec<(String, u64)>,
    lookup: HashMap<String, usize>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Record where `tag` starts. Seeing a tag twice means the input is not sorted by tag.
    ///
    pub fn add(&mut self, tag: &str, offset: u64) -> Result<()> {
        if self.lookup.contains_key(tag) {
            return Err(SaError::DuplicateTag(tag.to_string()));
        }
        self.lookup.insert(tag.to_string(), self.tags.len());
        self.tags.push((tag.to_string(), offset));
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Option<u64> {
        self.lookup.get(tag).map(|&i| self.tags[i].1)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|(tag, _)| tag.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let count = u32::try_from(self.tags.len())
            .map_err(|_| SaError::CorruptRecord("too many tags for a tag index".to_string()))?;
        writer.write_u32::<LittleEndian>(count)?;
        for (tag, offset) in &self.tags {
            writer.write_opt_string(tag)?;
            writer.write_u64::<LittleEndian>(*offset)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let count = reader.read_u32::<LittleEndian>()?;
        let mut index = TagIndex::new();
        for _ in 0..count {
            let tag = reader.read_opt_string()?;
            let offset = reader.read_u64::<LittleEndian>()?;
            index.add(&tag, offset)?;
        }
        Ok(index)
    }
}

///
/// Build a [`TagIndex`] over tab-separated text whose first column is the tag.
///
/// Lines starting with `#` are skipped. The input must be grouped by tag.
///
pub fn index_sorted_text<R: BufRead>(mut reader: R) -> Result<TagIndex> {
    let mut index = TagIndex::new();
    let mut current_tag: Option<String> = None;
    let mut offset = 0u64;
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }

        if !line.starts_with('#') {
            let tag = line.split('\t').next().unwrap_or_default().trim_end();
            if current_tag.as_deref() != Some(tag) {
                debug!("Tag {tag} starts at byte {offset}");
                index.add(tag, offset)?;
                current_tag = Some(tag.to_string());
            }
        }
        offset += read as u64;
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_duplicate_tag() {
        let mut index = TagIndex::new();
        index.add("chr1", 0).unwrap();
        index.add("chr2", 100).unwrap();

        let result = index.add("chr1", 200);
        assert!(matches!(result, Err(SaError::DuplicateTag(tag)) if tag == "chr1"));
    }

    #[rstest]
    fn test_write_read() {
        let mut index = TagIndex::new();
        index.add("chr1", 12).unwrap();
        index.add("chrX", 4096).unwrap();

        let mut buffer = Vec::new();
        index.write(&mut buffer).unwrap();
        let read = TagIndex::read(&mut buffer.as_slice()).unwrap();

        assert_eq!(read, index);
        assert_eq!(read.get("chrX"), Some(4096));
        assert_eq!(read.get("chr2"), None);
        assert_eq!(read.tags().collect::<Vec<_>>(), vec!["chr1", "chrX"]);
    }

    #[rstest]
    fn test_index_sorted_text() {
        let text = "#header\nchr1\t100\tA\nchr1\t200\tC\nchr2\t50\tG\n";
        let index = index_sorted_text(Cursor::new(text)).unwrap();

        assert_eq!(index.get("chr1"), Some(8));
        assert_eq!(index.get("chr2"), Some(30));
    }

    #[rstest]
    fn test_index_unsorted_text() {
        let text = "chr1\t100\nchr2\t50\nchr1\t300\n";
        let result = index_sorted_text(Cursor::new(text));
        assert!(matches!(result, Err(SaError::DuplicateTag(_))));
    }
}
