use std::fmt::{self, Display};

///
/// A reference sequence name together with its position in the assembly.
///
/// `index` gives chromosomes a stable order; every store sorts by it before position.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Chromosome {
    pub ucsc_name: String,
    pub ensembl_name: String,
    pub index: u16,
}

impl Chromosome {
    pub fn new(ucsc_name: &str, ensembl_name: &str, index: u16) -> Self {
        Chromosome {
            ucsc_name: ucsc_name.to_string(),
            ensembl_name: ensembl_name.to_string(),
            index,
        }
    }

    ///
    /// Whether the given name refers to this chromosome, in either naming style.
    ///
    pub fn matches_name(&self, name: &str) -> bool {
        self.ucsc_name == name || self.ensembl_name == name
    }
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ucsc_name)
    }
}
