//! Reference-sequence providers used to cross-validate reference alleles.
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use log::info;
use seq_io::fasta::{Reader, Record};

use crate::errors::{Result, SaError};
use crate::models::Chromosome;

///
/// Serves one chromosome's sequence at a time.
///
pub trait SequenceProvider {
    /// Make `chromosome` the active sequence.
    fn load_chromosome(&mut self, chromosome: &Chromosome) -> Result<()>;

    /// `length` bases of the active sequence starting at the 0-based offset `start`.
    /// Returns `None` when the range runs past the end of the sequence or nothing is loaded.
    fn substring(&self, start: usize, length: usize) -> Option<&str>;
}

impl<P: SequenceProvider + ?Sized> SequenceProvider for &mut P {
    fn load_chromosome(&mut self, chromosome: &Chromosome) -> Result<()> {
        (**self).load_chromosome(chromosome)
    }

    fn substring(&self, start: usize, length: usize) -> Option<&str> {
        (**self).substring(start, length)
    }
}

///
/// Sequences held in memory and keyed by name.
///
#[derive(Debug, Default, Clone)]
pub struct InMemorySequenceProvider {
    sequences: HashMap<String, String>,
    current: Option<String>,
}

impl InMemorySequenceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sequence(&mut self, name: &str, sequence: &str) {
        self.sequences.insert(name.to_string(), sequence.to_string());
    }

    pub fn with_sequence(mut self, name: &str, sequence: &str) -> Self {
        self.add_sequence(name, sequence);
        self
    }
}

impl SequenceProvider for InMemorySequenceProvider {
    fn load_chromosome(&mut self, chromosome: &Chromosome) -> Result<()> {
        let name = [&chromosome.ucsc_name, &chromosome.ensembl_name]
            .into_iter()
            .find(|name| self.sequences.contains_key(name.as_str()))
            .ok_or_else(|| SaError::UnknownChromosome(chromosome.ucsc_name.clone()))?;
        self.current = Some(name.clone());
        Ok(())
    }

    fn substring(&self, start: usize, length: usize) -> Option<&str> {
        let sequence = self.sequences.get(self.current.as_ref()?)?;
        sequence.get(start..start.checked_add(length)?)
    }
}

///
/// Reads one chromosome at a time out of a FASTA file (plain or gzipped).
///
/// Only the active chromosome is kept in memory; every load rescans the file.
///
#[derive(Debug)]
pub struct FastaSequenceProvider {
    path: PathBuf,
    sequence: Option<String>,
}

impl FastaSequenceProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FastaSequenceProvider {
            path: path.as_ref().to_path_buf(),
            sequence: None,
        }
    }

    fn open(&self) -> Result<Box<dyn Read>> {
        let file = File::open(&self.path)?;
        let reader: Box<dyn Read> = match self.path.extension() == Some(OsStr::new("gz")) {
            true => Box::new(MultiGzDecoder::new(file)),
            false => Box::new(file),
        };
        Ok(reader)
    }
}

impl SequenceProvider for FastaSequenceProvider {
    fn load_chromosome(&mut self, chromosome: &Chromosome) -> Result<()> {
        info!(
            "Loading {} from {}",
            chromosome.ucsc_name,
            self.path.display()
        );
        self.sequence = None;

        let mut reader = Reader::new(BufReader::new(self.open()?));
        while let Some(record) = reader.next() {
            let record = record.map_err(|e| SaError::Fasta(e.to_string()))?;
            let id = record.id().map_err(|e| SaError::Fasta(e.to_string()))?;
            if !chromosome.matches_name(id) {
                continue;
            }

            let sequence = record.full_seq();
            self.sequence = Some(String::from_utf8_lossy(&sequence).to_ascii_uppercase());
            return Ok(());
        }

        Err(SaError::UnknownChromosome(chromosome.ucsc_name.clone()))
    }

    fn substring(&self, start: usize, length: usize) -> Option<&str> {
        let sequence = self.sequence.as_ref()?;
        sequence.get(start..start.checked_add(length)?)
    }
}
