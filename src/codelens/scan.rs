use crate::histogram::SymbolEntry;

/// Number of symbols that must be transmitted for an alphabet: one past the highest-indexed
/// symbol with a nonzero code length, or 0 if no symbol is used.
///
/// Unused symbols below that index still count; they are sent as zero lengths.
#[inline]
pub fn used_count(entries: &[SymbolEntry]) -> usize {
    used_count_by(entries, SymbolEntry::is_used)
}

/// [`used_count`] over any entry representation
#[inline]
pub fn used_count_by<T>(entries: &[T], is_used: impl Fn(&T) -> bool) -> usize {
    entries.iter().rposition(is_used).map_or(0, |last| last + 1)
}
