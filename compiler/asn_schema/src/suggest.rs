//! "Did you mean" suggestions for unresolved names.

/// Levenshtein edit distance between two strings (by `char`).
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Dynamic threshold based on name length.
///
/// - 1-2 chars: distance ≤ 1
/// - 3-5 chars: distance ≤ 2
/// - 6+ chars: distance ≤ 3
fn threshold(len: usize) -> usize {
    match len {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        _ => 3,
    }
}

/// Up to `max` candidates close to `target`, best match first.
pub(crate) fn similar_names<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    max: usize,
) -> Vec<String> {
    let limit = threshold(target.chars().count());
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter(|c| *c != target && !c.is_empty())
        .filter_map(|c| {
            if target.len().abs_diff(c.len()) > limit {
                return None;
            }
            let distance = edit_distance(target, c);
            (distance <= limit).then_some((distance, c))
        })
        .collect();

    scored.sort_unstable();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(max)
        .map(|(_, c)| c.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_basics() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("Integer", "Integr"), 1);
        assert_eq!(edit_distance("type-id", "typeid"), 1);
    }

    #[test]
    fn finds_close_names_first() {
        let found = similar_names("Mesage", ["Message", "Massage", "Other"], 3);
        assert_eq!(found.first().map(String::as_str), Some("Message"));
        assert!(!found.iter().any(|s| s == "Other"));
    }

    #[test]
    fn ignores_exact_target_and_respects_max() {
        let found = similar_names("abc", ["abc", "abd", "abe", "abf"], 2);
        assert_eq!(found.len(), 2);
        assert!(!found.iter().any(|s| s == "abc"));
    }
}
