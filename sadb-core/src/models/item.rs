use std::sync::Arc;

use super::chromosome::Chromosome;
use super::payload::{JsonRender, Payload, PayloadFamily};
use crate::trim::AlleleTrimmer;

///
/// The unit flowing from source readers into the database writers.
///
/// Position is 1-based. Position and alleles may be rewritten in place by [`AnnotationItem::trim`].
///
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationItem {
    pub chromosome: Arc<Chromosome>,
    pub position: i32,
    pub ref_allele: Option<String>,
    pub alt_allele: Option<String>,
    pub payload: Payload,
}

impl AnnotationItem {
    pub fn new(
        chromosome: Arc<Chromosome>,
        position: i32,
        ref_allele: Option<&str>,
        alt_allele: Option<&str>,
        payload: Payload,
    ) -> Self {
        AnnotationItem {
            chromosome,
            position,
            ref_allele: ref_allele.map(str::to_string),
            alt_allele: alt_allele.map(str::to_string),
            payload,
        }
    }

    pub fn ref_allele(&self) -> &str {
        self.ref_allele.as_deref().unwrap_or("")
    }

    pub fn alt_allele(&self) -> &str {
        self.alt_allele.as_deref().unwrap_or("")
    }

    pub fn family(&self) -> PayloadFamily {
        self.payload.family()
    }

    ///
    /// Normalize position and alleles with the given trimmer.
    ///
    /// Items missing either allele, or with a negative position, are left untouched.
    ///
    pub fn trim<T: AlleleTrimmer + ?Sized>(&mut self, trimmer: &T) {
        let (Some(ref_allele), Some(alt_allele)) = (&self.ref_allele, &self.alt_allele) else {
            return;
        };
        if self.position < 0 {
            return;
        }

        let (start, ref_allele, alt_allele) = trimmer.trim(self.position, ref_allele, alt_allele);
        self.position = start;
        self.ref_allele = Some(ref_allele);
        self.alt_allele = Some(alt_allele);
    }
}

impl JsonRender for AnnotationItem {
    fn json_string(&self) -> String {
        self.payload.json_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::payload::CustomAnnotation;
    use crate::trim::BiDirectionalTrimmer;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn chrom1() -> Arc<Chromosome> {
        Arc::new(Chromosome::new("chr1", "1", 0))
    }

    #[rstest]
    fn test_trim_moves_position_and_alleles(chrom1: Arc<Chromosome>) {
        let mut item = AnnotationItem::new(
            chrom1,
            100,
            Some("TA"),
            Some("T"),
            Payload::Custom(CustomAnnotation::new()),
        );
        item.trim(&BiDirectionalTrimmer);

        assert_eq!(item.position, 101);
        assert_eq!(item.ref_allele(), "A");
        assert_eq!(item.alt_allele(), "");
    }

    #[rstest]
    #[case(None, Some("A"), 100)]
    #[case(Some("CA"), None, 100)]
    #[case(Some("CA"), Some("C"), -1)]
    fn test_trim_is_noop(
        chrom1: Arc<Chromosome>,
        #[case] ref_allele: Option<&str>,
        #[case] alt_allele: Option<&str>,
        #[case] position: i32,
    ) {
        let mut item = AnnotationItem::new(
            chrom1,
            position,
            ref_allele,
            alt_allele,
            Payload::Raw("{}".to_string()),
        );
        let before = item.clone();
        item.trim(&BiDirectionalTrimmer);

        assert_eq!(item, before);
    }
}
