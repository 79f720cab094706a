//! Traversal over the activity forest.
//!
//! Works on an adjacency map loaded once from the store instead of live row
//! references, so a broken hierarchy (a cycle slipped in past the API) can
//! never hang a walk: the visited set refuses to re-enter a node.

use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct ActivityTree {
    children: HashMap<i32, Vec<i32>>,
}

impl ActivityTree {
    /// Builds the forest from `(id, parent_id)` pairs as stored.
    pub fn from_links<I>(links: I) -> Self
    where
        I: IntoIterator<Item = (i32, Option<i32>)>,
    {
        let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
        for (id, parent_id) in links {
            children.entry(id).or_default();
            if let Some(parent_id) = parent_id {
                children.entry(parent_id).or_default().push(id);
            }
        }
        ActivityTree { children }
    }

    /// The root plus every activity reachable through parent->child edges.
    pub fn descendant_ids(&self, root: i32) -> HashSet<i32> {
        self.walk(root, None)
    }

    /// Depth-bounded variant. The root sits at depth 1; children of a node
    /// are expanded only while its depth is below `max_depth`, so a bound of
    /// 3 covers the root, its children and its grandchildren.
    pub fn descendant_ids_bounded(&self, root: i32, max_depth: u32) -> HashSet<i32> {
        self.walk(root, Some(max_depth))
    }

    fn walk(&self, root: i32, max_depth: Option<u32>) -> HashSet<i32> {
        let mut visited = HashSet::new();
        visited.insert(root);

        let mut queue = VecDeque::new();
        queue.push_back((root, 1u32));
        while let Some((id, depth)) = queue.pop_front() {
            if let Some(limit) = max_depth {
                if depth >= limit {
                    continue;
                }
            }
            for &child in self.children.get(&id).into_iter().flatten() {
                if visited.insert(child) {
                    queue.push_back((child, depth + 1));
                }
            }
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_forest() -> ActivityTree {
        // 1 -> 2 -> 4
        //   -> 3 -> 5 -> 6
        // 7 (separate root)
        ActivityTree::from_links(vec![
            (1, None),
            (2, Some(1)),
            (3, Some(1)),
            (4, Some(2)),
            (5, Some(3)),
            (6, Some(5)),
            (7, None),
        ])
    }

    fn ids(values: &[i32]) -> HashSet<i32> {
        values.iter().copied().collect()
    }

    #[test]
    fn unbounded_walk_collects_whole_subtree() {
        let tree = sample_forest();
        assert_eq!(tree.descendant_ids(1), ids(&[1, 2, 3, 4, 5, 6]));
        assert_eq!(tree.descendant_ids(3), ids(&[3, 5, 6]));
        assert_eq!(tree.descendant_ids(7), ids(&[7]));
    }

    #[test]
    fn leaf_walk_returns_only_itself() {
        let tree = sample_forest();
        assert_eq!(tree.descendant_ids(6), ids(&[6]));
        assert_eq!(tree.descendant_ids_bounded(6, 3), ids(&[6]));
    }

    #[test]
    fn bounded_walk_depth_semantics() {
        let tree = sample_forest();
        // depth 1: root only
        assert_eq!(tree.descendant_ids_bounded(1, 1), ids(&[1]));
        // depth 2: root + children
        assert_eq!(tree.descendant_ids_bounded(1, 2), ids(&[1, 2, 3]));
        // depth 3: root + children + grandchildren, not deeper
        assert_eq!(tree.descendant_ids_bounded(1, 3), ids(&[1, 2, 3, 4, 5]));
        assert_eq!(tree.descendant_ids_bounded(1, 4), ids(&[1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn bounded_walk_is_subset_of_unbounded() {
        let tree = sample_forest();
        let full = tree.descendant_ids(1);
        for max_depth in 1..6 {
            let bounded = tree.descendant_ids_bounded(1, max_depth);
            assert!(bounded.is_subset(&full));
        }
        // equal once the bound reaches the subtree height
        assert_eq!(tree.descendant_ids_bounded(1, 4), full);
    }

    #[test]
    fn cyclic_links_terminate() {
        // 1 -> 2 -> 3 -> back to 1; possible only through direct store edits
        let tree = ActivityTree::from_links(vec![(1, Some(3)), (2, Some(1)), (3, Some(2))]);
        assert_eq!(tree.descendant_ids(1), ids(&[1, 2, 3]));
        assert_eq!(tree.descendant_ids_bounded(1, 2), ids(&[1, 2]));
    }

    #[test]
    fn unknown_root_yields_just_the_root() {
        let tree = sample_forest();
        assert_eq!(tree.descendant_ids(42), ids(&[42]));
    }
}
