//! Rules that decide what survives when several items land on the same coordinate.
use std::collections::HashSet;

use log::debug;

use sadb_core::models::{GlobalMinorAllele, PayloadFamily};
use sadb_core::{AnnotationItem, JsonRender, Payload, Result, SaError};

fn allele_key(item: &AnnotationItem) -> (&str, &str) {
    (item.ref_allele(), item.alt_allele())
}

///
/// Drop items that disagree about the same `(ref, alt)` pair.
///
/// The first item seen for each pair is kept and exact repeats are collapsed into it. When a
/// later item for the pair renders a different payload, every item for that pair is removed, or
/// the call fails if `throw_on_conflicts` is set.
///
pub fn remove_conflicting_alleles(
    items: Vec<AnnotationItem>,
    throw_on_conflicts: bool,
) -> Result<Vec<AnnotationItem>> {
    let mut kept: Vec<AnnotationItem> = Vec::with_capacity(items.len());
    let mut conflicts: HashSet<(String, String)> = HashSet::new();

    for item in items {
        let Some(first) = kept.iter().find(|k| allele_key(k) == allele_key(&item)) else {
            kept.push(item);
            continue;
        };
        if first.json_string() == item.json_string() {
            continue;
        }

        if throw_on_conflicts {
            return Err(SaError::ConflictingAlleles {
                chromosome: item.chromosome.ucsc_name.clone(),
                position: item.position,
                ref_allele: item.ref_allele().to_string(),
                alt_allele: item.alt_allele().to_string(),
            });
        }
        debug!(
            "Conflicting entries at {}:{} for {} > {}",
            item.chromosome,
            item.position,
            item.ref_allele(),
            item.alt_allele()
        );
        conflicts.insert((item.ref_allele().to_string(), item.alt_allele().to_string()));
    }

    if !conflicts.is_empty() {
        kept.retain(|item| {
            !conflicts.contains(&(item.ref_allele().to_string(), item.alt_allele().to_string()))
        });
    }
    Ok(kept)
}

///
/// Pick the single value written for a coordinate in a positional store.
///
/// Items at one coordinate come from one source, so the first item's family decides the rule.
///
pub fn positional_annotation(items: &[AnnotationItem]) -> Option<AnnotationItem> {
    match items.first()?.family() {
        PayloadFamily::Frequency => global_minor(items),
        PayloadFamily::Consensus | PayloadFamily::Other => consensus(items),
    }
}

///
/// The first item, if every item renders the same payload.
///
pub fn consensus(items: &[AnnotationItem]) -> Option<AnnotationItem> {
    let first = items.first()?;
    let value = first.json_string();
    items
        .iter()
        .skip(1)
        .all(|item| item.json_string() == value)
        .then(|| first.clone())
}

///
/// Global minor allele across the frequency items at one coordinate.
///
/// The most frequent allele (the reference wins ties) is taken out as the global major; the most
/// frequent of the rest is the global minor. Items without a frequency are ignored.
///
pub fn global_minor(items: &[AnnotationItem]) -> Option<AnnotationItem> {
    let first = items.first()?;

    let mut frequencies: Vec<(String, f64)> = Vec::new();
    for item in items {
        let Payload::AlleleFrequency(payload) = &item.payload else {
            continue;
        };
        let Some(frequency) = payload.frequency else {
            continue;
        };
        match frequencies
            .iter_mut()
            .find(|(allele, _)| allele.as_str() == item.alt_allele())
        {
            Some(entry) => entry.1 = frequency,
            None => frequencies.push((item.alt_allele().to_string(), frequency)),
        }
    }

    let ref_allele = first.ref_allele();
    let major = most_frequent_allele(&frequencies, ref_allele, true)?.to_string();
    frequencies.retain(|(allele, _)| *allele != major);

    let minor = most_frequent_allele(&frequencies, ref_allele, false)?;
    let (allele, frequency) = frequencies.iter().find(|(allele, _)| allele == minor)?;

    Some(AnnotationItem {
        chromosome: first.chromosome.clone(),
        position: first.position,
        ref_allele: first.ref_allele.clone(),
        alt_allele: Some(allele.clone()),
        payload: Payload::GlobalMinorAllele(GlobalMinorAllele {
            allele: allele.clone(),
            frequency: *frequency,
        }),
    })
}

///
/// Allele with the highest frequency.
///
/// With several alleles at the maximum, the reference allele is returned when `prefer_ref` is
/// set and it is among them; otherwise the first non-reference allele at the maximum is.
///
pub fn most_frequent_allele<'a>(
    frequencies: &'a [(String, f64)],
    ref_allele: &str,
    prefer_ref: bool,
) -> Option<&'a str> {
    let max = frequencies
        .iter()
        .map(|(_, frequency)| *frequency)
        .reduce(f64::max)?;

    let tied: Vec<&str> = frequencies
        .iter()
        .filter(|(_, frequency)| (frequency - max).abs() < f64::EPSILON)
        .map(|(allele, _)| allele.as_str())
        .collect();

    match tied.as_slice() {
        [] => None,
        [single] => Some(*single),
        _ if prefer_ref && tied.contains(&ref_allele) => {
            tied.iter().copied().find(|allele| *allele == ref_allele)
        }
        _ => tied.iter().copied().find(|allele| *allele != ref_allele),
    }
}
