//! Levenshtein edit distance between candidate and query names.

/// Classic two-row Levenshtein over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings() {
        assert_eq!(levenshtein("Azadinium", "Azadinium"), 0);
        assert_eq!(levenshtein("", ""), 0);
    }

    #[test]
    fn empty_against_nonempty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn single_edits() {
        assert_eq!(levenshtein("Skeletonema", "Sceletonema"), 1); // substitution
        assert_eq!(levenshtein("Navicula", "Naviculaa"), 1); // insertion
        assert_eq!(levenshtein("Navicula", "Navicul"), 1); // deletion
    }

    #[test]
    fn species_typo() {
        assert_eq!(
            levenshtein(
                "Thalassiosira nitzschioides",
                "Thalassiothrix nitzschioides"
            ),
            4
        );
    }

    #[test]
    fn symmetric() {
        assert_eq!(
            levenshtein("Dinophysis", "Dinophysiss"),
            levenshtein("Dinophysiss", "Dinophysis")
        );
    }
}
