//! Splits a pre-sorted record stream into contiguous runs sharing a key.

use crate::error::Result;

/// Lazy iterator over groups of consecutive records with equal keys.
///
/// A group is emitted when the key changes; the last group is emitted when the
/// input ends. Empty input yields nothing. A read error is yielded once and
/// ends the sequence.
pub struct Groups<I, T, K, F> {
    items: I,
    key: F,
    current: Vec<T>,
    current_key: Option<K>,
    done: bool,
}

impl<I, T, K, F> Groups<I, T, K, F>
where
    I: Iterator<Item = Result<T>>,
    F: FnMut(&T) -> K,
    K: PartialEq,
{
    pub fn new(items: I, key: F) -> Self {
        Self {
            items,
            key,
            current: Vec::new(),
            current_key: None,
            done: false,
        }
    }
}

impl<I, T, K, F> Iterator for Groups<I, T, K, F>
where
    I: Iterator<Item = Result<T>>,
    F: FnMut(&T) -> K,
    K: PartialEq,
{
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.items.next() {
                Some(Ok(item)) => {
                    let k = (self.key)(&item);
                    let changed = self.current_key.as_ref().is_some_and(|c| *c != k);
                    self.current_key = Some(k);
                    if changed {
                        let finished = std::mem::replace(&mut self.current, vec![item]);
                        return Some(Ok(finished));
                    }
                    self.current.push(item);
                }
                Some(Err(e)) => {
                    self.done = true;
                    self.current.clear();
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    if self.current.is_empty() {
                        return None;
                    }
                    return Some(Ok(std::mem::take(&mut self.current)));
                }
            }
        }
    }
}

/// Group `items` by `key`.
pub fn group_by<I, T, K, F>(items: I, key: F) -> Groups<I::IntoIter, T, K, F>
where
    I: IntoIterator<Item = Result<T>>,
    F: FnMut(&T) -> K,
    K: PartialEq,
{
    Groups::new(items.into_iter(), key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconError;

    fn keys(input: &[&str]) -> Vec<Vec<String>> {
        group_by(input.iter().map(|s| Ok(s.to_string())), |s: &String| s.clone())
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(keys(&[]).is_empty());
    }

    #[test]
    fn test_tail_is_flushed() {
        let groups = keys(&["A", "A", "B"]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec!["A", "A"]);
        assert_eq!(groups[1], vec!["B"]);
    }

    #[test]
    fn test_single_group() {
        assert_eq!(keys(&["A", "A", "A"]), vec![vec!["A", "A", "A"]]);
    }

    #[test]
    fn test_non_contiguous_keys_form_separate_groups() {
        let groups = keys(&["A", "B", "A"]);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_second_group_emitted_only_after_stream_ends() {
        let mut pulled = 0usize;
        let source = ["A", "A", "B"].into_iter().map(|s| {
            pulled += 1;
            Ok::<_, ReconError>(s.to_string())
        });
        let mut groups = group_by(source, |s: &String| s.clone());
        assert_eq!(groups.next().unwrap().unwrap().len(), 2);
        assert_eq!(groups.next().unwrap().unwrap(), vec!["B"]);
        assert!(groups.next().is_none());
        drop(groups);
        assert_eq!(pulled, 3);
    }

    #[test]
    fn test_error_ends_sequence() {
        let source = vec![
            Ok("A".to_string()),
            Err(ReconError::Other("bad row".into())),
            Ok("B".to_string()),
        ];
        let mut groups = group_by(source, |s: &String| s.clone());
        assert!(matches!(groups.next(), Some(Err(ReconError::Other(_)))));
        assert!(groups.next().is_none());
    }
}
