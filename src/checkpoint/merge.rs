//! Resume Merge
//!
//! Combines checkpointed tasks with a fresh expansion. The result is a
//! set union on command strings: a command present in both lists runs
//! once. Checkpointed tasks come first, in file order, followed by fresh
//! tasks not already seen, in expansion order.

use std::collections::HashSet;

/// Merges checkpointed and fresh tasks, dropping duplicate commands.
///
/// ```
/// use multiplexer::checkpoint::merge_outstanding;
///
/// let checkpointed = vec!["cmdX".to_string()];
/// let fresh = vec!["cmdX".to_string(), "cmdY".to_string()];
/// assert_eq!(merge_outstanding(&checkpointed, &fresh), vec!["cmdX", "cmdY"]);
/// ```
pub fn merge_outstanding(checkpointed: &[String], fresh: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(checkpointed.len() + fresh.len());

    checkpointed
        .iter()
        .chain(fresh)
        .filter(|task| seen.insert(task.as_str()))
        .cloned()
        .collect()
}
