/// Drops every row whose key equals the key of the row before it.
///
/// The source allows several roles per person for the same parent while the
/// target stores one association per pair. Extracts are sorted by the pair,
/// so keeping the first row of each run keeps the first-listed role.
pub fn collapse_consecutive<T, K, F>(rows: Vec<T>, key: F) -> Vec<T>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut kept: Vec<T> = Vec::with_capacity(rows.len());
    let mut previous: Option<K> = None;
    for row in rows {
        let current = key(&row);
        if previous.as_ref() == Some(&current) {
            continue;
        }
        previous = Some(current);
        kept.push(row);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_role_per_pair_wins() {
        let rows = vec![
            ("P", "A", "roleX"),
            ("P", "A", "roleY"),
            ("P", "B", "roleZ"),
        ];
        let kept = collapse_consecutive(rows, |(parent, person, _)| (*parent, *person));
        assert_eq!(kept, vec![("P", "A", "roleX"), ("P", "B", "roleZ")]);
    }

    #[test]
    fn test_only_adjacent_duplicates_collapse() {
        let rows = vec![1, 1, 2, 1];
        assert_eq!(collapse_consecutive(rows, |v| *v), vec![1, 2, 1]);
    }

    #[test]
    fn test_empty() {
        let rows: Vec<u8> = Vec::new();
        assert!(collapse_consecutive(rows, |v| *v).is_empty());
    }
}
