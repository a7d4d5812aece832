use std::cmp::Ordering;

use crate::models::AnnotationItem;

///
/// Ordering used everywhere items are merged: chromosome index, then position.
///
pub fn compare_items(item: &AnnotationItem, other: &AnnotationItem) -> Ordering {
    item.chromosome
        .index
        .cmp(&other.chromosome.index)
        .then(item.position.cmp(&other.position))
}

///
/// Number of bytes a value takes when written as a 7-bit variable length integer.
///
pub fn opt_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}
