use crate::assertions::{format_message, AssertError, TestCase};
use crate::render::Render;
use similar::{ChangeTag, TextDiff};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};

/// Maps that can explain how they differ from one another.
pub trait Dict {
    type Key: Debug + Ord;
    type Value: Debug + PartialEq;

    fn sorted_entries(&self) -> Vec<(&Self::Key, &Self::Value)>;

    /// `None` when both maps hold the same entries.
    fn difference(&self, other: &Self) -> Option<String>
    where
        Self: Debug + Sized,
    {
        let ours: BTreeMap<_, _> = self.sorted_entries().into_iter().collect();
        let theirs: BTreeMap<_, _> = other.sorted_entries().into_iter().collect();
        if ours == theirs {
            return None;
        }

        let ours_keys: BTreeSet<_> = ours.keys().collect();
        let theirs_keys: BTreeSet<_> = theirs.keys().collect();
        let mut parts = Vec::new();

        let missing: Vec<_> = theirs_keys.difference(&ours_keys).collect();
        if !missing.is_empty() {
            parts.push(format!("missing keys {:?}", missing));
        }
        let extra: Vec<_> = ours_keys.difference(&theirs_keys).collect();
        if !extra.is_empty() {
            parts.push(format!("extra keys {:?}", extra));
        }
        let differing: Vec<_> = ours
            .iter()
            .filter(|(k, v)| theirs.get(*k).is_some_and(|other| other != *v))
            .map(|(k, _)| k)
            .collect();
        if !differing.is_empty() {
            parts.push(format!("differing keys {:?}", differing));
        }

        Some(format!(
            "Dicts differ ({})\n{}",
            parts.join(", "),
            pretty_diff(self, other)
        ))
    }
}

impl<K: Debug + Ord, V: Debug + PartialEq> Dict for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn sorted_entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
}

impl<K, V, S> Dict for HashMap<K, V, S>
where
    K: Debug + Ord + Hash,
    V: Debug + PartialEq,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;

    fn sorted_entries(&self) -> Vec<(&K, &V)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Describes the first difference between two sequences, or `None` when equal.
pub fn list_difference<T: PartialEq + Debug>(kind: &str, a: &[T], b: &[T]) -> Option<String> {
    if a == b {
        return None;
    }
    let kind = kind.to_lowercase();
    let detail = match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(i) => format!(
            "First differing element at index {} ({:?} != {:?})",
            i, a[i], b[i]
        ),
        None if a.len() > b.len() => format!(
            "First {} contains {} additional elements, first extra element at index {} is {:?}",
            kind,
            a.len() - b.len(),
            b.len(),
            a[b.len()]
        ),
        None => format!(
            "Second {} contains {} additional elements, first extra element at index {} is {:?}",
            kind,
            b.len() - a.len(),
            a.len(),
            b[a.len()]
        ),
    };
    Some(format!("{}\n{}", detail, pretty_diff(a, b)))
}

/// Line diff of the pretty `Debug` forms, `-` for the first value and `+` for the second.
pub fn pretty_diff<A: Debug + ?Sized, B: Debug + ?Sized>(a: &A, b: &B) -> String {
    let old = format!("{:#?}\n", a);
    let new = format!("{:#?}\n", b);
    let diff = TextDiff::from_lines(&old, &new);
    diff.iter_all_changes()
        .map(|change| {
            let sign = match change.tag() {
                ChangeTag::Delete => "- ",
                ChangeTag::Insert => "+ ",
                ChangeTag::Equal => "  ",
            };
            format!("{}{}", sign, change.value().trim_end_matches('\n'))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl TestCase {
    pub fn assert_list_equal<T>(&self, a: &[T], b: &[T], msg: Option<&str>) -> Result<(), AssertError>
    where
        T: PartialEq + Debug,
    {
        match list_difference("list", a, b) {
            None => Ok(()),
            Some(standard) => {
                let note = format_message(msg, &standard);
                Err(self.comparison_failure("!=", a, b, Some(&note)))
            }
        }
    }

    pub fn assert_tuple_equal<T>(&self, a: &T, b: &T, msg: Option<&str>) -> Result<(), AssertError>
    where
        T: Render + PartialEq,
    {
        if a == b {
            return Ok(());
        }
        let standard = format!("Tuples differ\n{}", pretty_diff(a, b));
        let note = format_message(msg, &standard);
        Err(self.comparison_failure("!=", a, b, Some(&note)))
    }

    pub fn assert_dict_equal<M>(&self, a: &M, b: &M, msg: Option<&str>) -> Result<(), AssertError>
    where
        M: Dict + Render,
    {
        match a.difference(b) {
            None => Ok(()),
            Some(standard) => {
                let note = format_message(msg, &standard);
                Err(self.comparison_failure("!=", a, b, Some(&note)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Styler;

    fn case() -> TestCase {
        TestCase::with_styler(Styler::plain())
    }

    #[test]
    fn test_list_difference_equal() {
        assert_eq!(list_difference("list", &[1, 2], &[1, 2]), None);
    }

    #[test]
    fn test_list_difference_first_differing() {
        let text = list_difference("list", &[1, 2, 3], &[1, 5, 3]).unwrap();
        assert!(text.starts_with("First differing element at index 1 (2 != 5)"));
        assert!(text.contains("-     2,"));
        assert!(text.contains("+     5,"));
    }

    #[test]
    fn test_list_difference_lengths() {
        let text = list_difference("list", &[1, 2, 3], &[1]).unwrap();
        assert!(text.starts_with(
            "First list contains 2 additional elements, first extra element at index 1 is 2"
        ));
        let text = list_difference("list", &[1], &[1, 9]).unwrap();
        assert!(text.starts_with("Second list contains 1 additional elements"));
    }

    #[test]
    fn test_dict_difference_kinds() {
        let a = BTreeMap::from([("a", 1), ("b", 2), ("c", 3)]);
        let b = BTreeMap::from([("a", 1), ("b", 5), ("d", 4)]);
        let text = a.difference(&b).unwrap();
        assert!(text.starts_with(
            "Dicts differ (missing keys [\"d\"], extra keys [\"c\"], differing keys [\"b\"])"
        ));
        assert_eq!(a.difference(&a.clone()), None);
    }

    #[test]
    fn test_hash_map_difference_is_sorted() {
        let a = HashMap::from([(2, "two"), (1, "one")]);
        let b = HashMap::from([(1, "one"), (2, "deux")]);
        let text = a.difference(&b).unwrap();
        assert!(text.starts_with("Dicts differ (differing keys [2])"));
    }

    #[test]
    fn test_assert_list_equal() {
        assert!(case().assert_list_equal(&[1, 2], &[1, 2], None).is_ok());
        let err = case().assert_list_equal(&[1, 2], &[1, 3], Some("ids")).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("[1, 2] !="));
        assert!(text.contains(" : ids"));
    }

    #[test]
    fn test_assert_tuple_equal() {
        assert!(case().assert_tuple_equal(&(1, "a"), &(1, "a"), None).is_ok());
        let text = case()
            .assert_tuple_equal(&(1, "a"), &(1, "b"), None)
            .unwrap_err()
            .to_string();
        assert!(text.contains("Tuples differ"));
        assert!(text.contains("(1, \"a\") !="));
    }

    #[test]
    fn test_assert_dict_equal() {
        let a = BTreeMap::from([("k", vec![1])]);
        let b = BTreeMap::from([("k", vec![2])]);
        assert!(case().assert_dict_equal(&a, &a.clone(), None).is_ok());
        let err = case().assert_dict_equal(&a, &b, None).unwrap_err();
        assert!(err.is_failure());
        assert!(err.to_string().contains("differing keys [\"k\"]"));
    }

    #[test]
    fn test_pretty_diff_marks_lines() {
        let diff = pretty_diff(&vec![1, 2], &vec![1, 3]);
        let lines: Vec<_> = diff.lines().collect();
        assert_eq!(
            lines,
            vec!["  [", "      1,", "-     2,", "+     3,", "  ]"]
        );
    }
}
