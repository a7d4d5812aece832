//! Allele normalization applied to items before they are merged into a store.

///
/// Rewrites `(position, ref, alt)` into a normalized representation.
///
/// Implementations may move the position to the left (left-alignment), but never by more than
/// the writer's upstream slack, otherwise the merge window cannot reorder the item correctly.
///
pub trait AlleleTrimmer {
    fn trim(&self, position: i32, ref_allele: &str, alt_allele: &str) -> (i32, String, String);
}

///
/// Strips the bases shared by both alleles, first from the start (advancing the position),
/// then from the end. Identical alleles are returned unchanged.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct BiDirectionalTrimmer;

impl AlleleTrimmer for BiDirectionalTrimmer {
    fn trim(&self, position: i32, ref_allele: &str, alt_allele: &str) -> (i32, String, String) {
        if ref_allele == alt_allele {
            return (position, ref_allele.to_string(), alt_allele.to_string());
        }

        let ref_bytes = ref_allele.as_bytes();
        let alt_bytes = alt_allele.as_bytes();

        let prefix = ref_bytes
            .iter()
            .zip(alt_bytes)
            .take_while(|(r, a)| r == a)
            .count();
        let (ref_rest, alt_rest) = (&ref_bytes[prefix..], &alt_bytes[prefix..]);

        let suffix = ref_rest
            .iter()
            .rev()
            .zip(alt_rest.iter().rev())
            .take_while(|(r, a)| r == a)
            .count();

        let ref_trimmed = &ref_rest[..ref_rest.len() - suffix];
        let alt_trimmed = &alt_rest[..alt_rest.len() - suffix];

        (
            position + prefix as i32,
            String::from_utf8_lossy(ref_trimmed).into_owned(),
            String::from_utf8_lossy(alt_trimmed).into_owned(),
        )
    }
}

impl<F> AlleleTrimmer for F
where
    F: Fn(i32, &str, &str) -> (i32, String, String),
{
    fn trim(&self, position: i32, ref_allele: &str, alt_allele: &str) -> (i32, String, String) {
        self(position, ref_allele, alt_allele)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(100, "A", "T", (100, "A", "T"))]
    #[case(100, "TA", "T", (101, "A", ""))]
    #[case(100, "T", "TCC", (101, "", "CC"))]
    #[case(100, "ACGT", "AGGT", (101, "C", "G"))]
    #[case(100, "CAT", "CAT", (100, "CAT", "CAT"))]
    #[case(100, "ATTT", "ATT", (103, "T", ""))]
    fn test_bidirectional_trim(
        #[case] position: i32,
        #[case] ref_allele: &str,
        #[case] alt_allele: &str,
        #[case] expected: (i32, &str, &str),
    ) {
        let (start, r, a) = BiDirectionalTrimmer.trim(position, ref_allele, alt_allele);
        assert_eq!((start, r.as_str(), a.as_str()), expected);
    }

    #[rstest]
    fn test_closure_trimmer() {
        let shift_left =
            |position: i32, r: &str, a: &str| (position - 3, r.to_string(), a.to_string());
        assert_eq!(
            shift_left.trim(10, "A", "C"),
            (7, "A".to_string(), "C".to_string())
        );
    }
}
