// B+ Tree Implementation - Multiway Leaf-Chain Index
// Arena-of-handles representation: every node lives in a Vec owned by the
// tree and refers to children and leaf siblings by index. All entries live
// in leaves; internal nodes carry routing keys only. Leaves are linked into
// a chain so range scans walk siblings without re-descending.

use crate::types::{ValidatedDegree, ValidatedFileName, ValidatedPath};
use anyhow::{bail, Result};

/// Handle to a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct BpNode {
    is_leaf: bool,
    keys: Vec<ValidatedFileName>,
    /// Populated only for leaves, parallel to `keys`
    values: Vec<ValidatedPath>,
    /// Populated only for internal nodes, always `keys.len() + 1` long
    children: Vec<NodeId>,
    /// Leaf chain link; None for internal nodes and the rightmost leaf
    next_leaf: Option<NodeId>,
}

impl BpNode {
    fn new_leaf() -> Self {
        Self {
            is_leaf: true,
            keys: Vec::new(),
            values: Vec::new(),
            children: Vec::new(),
            next_leaf: None,
        }
    }

    fn new_internal() -> Self {
        Self {
            is_leaf: false,
            keys: Vec::new(),
            values: Vec::new(),
            children: Vec::new(),
            next_leaf: None,
        }
    }
}

/// Multiway leaf-chain index tree
///
/// The degree `t` fixes node capacity: non-root nodes hold between `t - 1`
/// and `2t - 1` keys. Splits are preemptive on the way down, so an insert
/// never has to propagate back up.
#[derive(Debug, Clone)]
pub struct BPlusTree {
    nodes: Vec<BpNode>,
    root: NodeId,
    degree: usize,
    free_list: Vec<NodeId>,
    len: usize,
}

/// Create an empty multiway index with the given degree
pub fn create_tree(degree: ValidatedDegree) -> BPlusTree {
    BPlusTree::new(degree)
}

/// Insert or overwrite a key; returns true if the key was new
pub fn insert_into_tree(tree: &mut BPlusTree, key: ValidatedFileName, value: ValidatedPath) -> bool {
    tree.insert(key, value)
}

/// Look up a key; absent keys yield None
pub fn search_in_tree(tree: &BPlusTree, key: &ValidatedFileName) -> Option<ValidatedPath> {
    tree.search(key)
}

/// Remove a key; returns true if it existed
pub fn delete_from_tree(tree: &mut BPlusTree, key: &ValidatedFileName) -> bool {
    tree.delete(key)
}

/// All entries with `start <= key <= end`, in ascending key order
pub fn range_scan(
    tree: &BPlusTree,
    start: &ValidatedFileName,
    end: &ValidatedFileName,
) -> Vec<(ValidatedFileName, ValidatedPath)> {
    tree.range(start, end)
}

/// All entries in ascending key order, via the leaf chain
pub fn extract_all_pairs(tree: &BPlusTree) -> Vec<(ValidatedFileName, ValidatedPath)> {
    tree.all_pairs()
}

/// Number of entries in the tree
pub fn entry_count(tree: &BPlusTree) -> usize {
    tree.len
}

impl BPlusTree {
    pub fn new(degree: ValidatedDegree) -> Self {
        let root = BpNode::new_leaf();
        Self {
            nodes: vec![root],
            root: NodeId(0),
            degree: degree.get(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    fn min_keys(&self) -> usize {
        self.degree - 1
    }

    fn max_keys(&self) -> usize {
        2 * self.degree - 1
    }

    // -- arena primitives --------------------------------------------------

    fn alloc(&mut self, node: BpNode) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            self.nodes[id.idx()] = node;
            id
        } else {
            let id = NodeId(self.nodes.len() as u32);
            self.nodes.push(node);
            id
        }
    }

    fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.idx()];
        node.keys.clear();
        node.values.clear();
        node.children.clear();
        node.next_leaf = None;
        self.free_list.push(id);
    }

    fn node(&self, id: NodeId) -> &BpNode {
        &self.nodes[id.idx()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut BpNode {
        &mut self.nodes[id.idx()]
    }

    /// Mutable access to two distinct nodes at once
    fn two_mut(&mut self, a: NodeId, b: NodeId) -> (&mut BpNode, &mut BpNode) {
        let (ai, bi) = (a.idx(), b.idx());
        debug_assert_ne!(ai, bi);
        if ai < bi {
            let (lo, hi) = self.nodes.split_at_mut(bi);
            (&mut lo[ai], &mut hi[0])
        } else {
            let (lo, hi) = self.nodes.split_at_mut(ai);
            (&mut hi[0], &mut lo[bi])
        }
    }

    /// Child slot for `key` within an internal node.
    ///
    /// Routing keys satisfy `children[i] < keys[i] <= children[i + 1]`, so
    /// an exact match descends to the right of the matched key.
    fn route(&self, id: NodeId, key: &ValidatedFileName) -> usize {
        match self.node(id).keys.binary_search(key) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    // -- insertion ---------------------------------------------------------

    /// Insert a key-value pair; an existing key has its value replaced in
    /// place with no structural change. Returns true for a new key.
    pub fn insert(&mut self, key: ValidatedFileName, value: ValidatedPath) -> bool {
        if self.node(self.root).keys.len() == self.max_keys() {
            let old_root = self.root;
            let mut new_root = BpNode::new_internal();
            new_root.children.push(old_root);
            self.root = self.alloc(new_root);
            self.split_child(self.root, 0);
        }

        let mut current = self.root;
        loop {
            if self.node(current).is_leaf {
                let node = self.node_mut(current);
                return match node.keys.binary_search(&key) {
                    Ok(i) => {
                        node.values[i] = value;
                        false
                    }
                    Err(i) => {
                        node.keys.insert(i, key);
                        node.values.insert(i, value);
                        self.len += 1;
                        true
                    }
                };
            }

            let mut slot = self.route(current, &key);
            let child = self.node(current).children[slot];
            if self.node(child).keys.len() == self.max_keys() {
                self.split_child(current, slot);
                // The split pushed a separator into `slot`; keys at or past
                // it now live in the new right sibling.
                if key >= self.node(current).keys[slot] {
                    slot += 1;
                }
            }
            current = self.node(current).children[slot];
        }
    }

    /// Split the full child at `child_slot` of `parent`, inserting the
    /// separator and the new right sibling into the parent.
    ///
    /// A leaf split keeps the middle entry in the right half and copies its
    /// key upward as the separator; both halves retain at least `t - 1`
    /// entries and the leaf chain is relinked through the new sibling. An
    /// internal split moves the middle key up without keeping a copy.
    fn split_child(&mut self, parent: NodeId, child_slot: usize) {
        let child = self.node(parent).children[child_slot];
        let mid = self.degree - 1;

        let (separator, right) = if self.node(child).is_leaf {
            let child_node = self.node_mut(child);
            let mut right = BpNode::new_leaf();
            right.keys = child_node.keys.split_off(mid);
            right.values = child_node.values.split_off(mid);
            right.next_leaf = child_node.next_leaf.take();
            let separator = right.keys[0].clone();
            let right_id = self.alloc(right);
            self.node_mut(child).next_leaf = Some(right_id);
            (separator, right_id)
        } else {
            let child_node = self.node_mut(child);
            let mut right = BpNode::new_internal();
            right.keys = child_node.keys.split_off(mid + 1);
            right.children = child_node.children.split_off(mid + 1);
            let separator = child_node
                .keys
                .pop()
                .expect("full internal node has a middle key");
            let right_id = self.alloc(right);
            (separator, right_id)
        };

        let parent_node = self.node_mut(parent);
        parent_node.keys.insert(child_slot, separator);
        parent_node.children.insert(child_slot + 1, right);
    }

    // -- lookup ------------------------------------------------------------

    pub fn search(&self, key: &ValidatedFileName) -> Option<ValidatedPath> {
        let leaf = self.descend_to_leaf(key);
        let node = self.node(leaf);
        match node.keys.binary_search(key) {
            Ok(i) => Some(node.values[i].clone()),
            Err(_) => None,
        }
    }

    fn descend_to_leaf(&self, key: &ValidatedFileName) -> NodeId {
        let mut current = self.root;
        while !self.node(current).is_leaf {
            let slot = self.route(current, key);
            current = self.node(current).children[slot];
        }
        current
    }

    /// Inclusive range scan along the leaf chain
    pub fn range(
        &self,
        start: &ValidatedFileName,
        end: &ValidatedFileName,
    ) -> Vec<(ValidatedFileName, ValidatedPath)> {
        let mut result = Vec::new();
        if start > end {
            return result;
        }

        let first = self.descend_to_leaf(start);
        let mut position = self
            .node(first)
            .keys
            .binary_search(start)
            .unwrap_or_else(|i| i);
        let mut leaf = Some(first);

        while let Some(id) = leaf {
            let node = self.node(id);
            for i in position..node.keys.len() {
                if node.keys[i] > *end {
                    return result;
                }
                result.push((node.keys[i].clone(), node.values[i].clone()));
            }
            leaf = node.next_leaf;
            position = 0;
        }

        result
    }

    pub fn all_pairs(&self) -> Vec<(ValidatedFileName, ValidatedPath)> {
        let mut result = Vec::with_capacity(self.len);
        let mut leaf = Some(self.leftmost_leaf());
        while let Some(id) = leaf {
            let node = self.node(id);
            for (key, value) in node.keys.iter().zip(node.values.iter()) {
                result.push((key.clone(), value.clone()));
            }
            leaf = node.next_leaf;
        }
        result
    }

    fn leftmost_leaf(&self) -> NodeId {
        let mut current = self.root;
        while !self.node(current).is_leaf {
            current = self.node(current).children[0];
        }
        current
    }

    // -- deletion ----------------------------------------------------------

    /// Remove a key if present; returns whether it existed.
    ///
    /// The descent records the path, then underflow repair walks back up:
    /// borrow from the left sibling, else borrow from the right, else merge
    /// (preferring the left sibling). A merge can underflow the parent, so
    /// repair continues until a node is within bounds or the root is hit.
    pub fn delete(&mut self, key: &ValidatedFileName) -> bool {
        // (node, slot taken in node.children) for every internal node passed
        let mut path: Vec<(NodeId, usize)> = Vec::new();
        let mut current = self.root;
        while !self.node(current).is_leaf {
            let slot = self.route(current, key);
            path.push((current, slot));
            current = self.node(current).children[slot];
        }

        {
            let leaf = self.node_mut(current);
            match leaf.keys.binary_search(key) {
                Ok(i) => {
                    leaf.keys.remove(i);
                    leaf.values.remove(i);
                }
                Err(_) => return false,
            }
        }
        self.len -= 1;

        let mut child = current;
        while child != self.root && self.node(child).keys.len() < self.min_keys() {
            let (parent, slot) = path.pop().expect("non-root node has a recorded parent");
            self.repair_underflow(parent, slot);
            child = parent;
        }

        self.collapse_root();
        true
    }

    /// Bring `parent.children[slot]` back within capacity bounds
    fn repair_underflow(&mut self, parent: NodeId, slot: usize) {
        let min_keys = self.min_keys();
        let has_left = slot > 0;
        let has_right = slot + 1 < self.node(parent).children.len();

        if has_left {
            let left = self.node(parent).children[slot - 1];
            if self.node(left).keys.len() > min_keys {
                self.borrow_from_left(parent, slot);
                return;
            }
        }
        if has_right {
            let right = self.node(parent).children[slot + 1];
            if self.node(right).keys.len() > min_keys {
                self.borrow_from_right(parent, slot);
                return;
            }
        }
        if has_left {
            self.merge_children(parent, slot - 1);
        } else {
            self.merge_children(parent, slot);
        }
    }

    /// Move one entry from the left sibling into `parent.children[slot]`
    fn borrow_from_left(&mut self, parent: NodeId, slot: usize) {
        let left_id = self.node(parent).children[slot - 1];
        let node_id = self.node(parent).children[slot];
        let separator = self.node(parent).keys[slot - 1].clone();

        let new_separator = {
            let (left, node) = self.two_mut(left_id, node_id);
            if node.is_leaf {
                let key = left.keys.pop().expect("donor leaf is above minimum");
                let value = left.values.pop().expect("leaf keys and values stay parallel");
                node.keys.insert(0, key.clone());
                node.values.insert(0, value);
                // Separator must name the first key of the right-hand leaf
                key
            } else {
                let key = left.keys.pop().expect("donor node is above minimum");
                let child = left.children.pop().expect("internal children track keys");
                node.keys.insert(0, separator);
                node.children.insert(0, child);
                key
            }
        };
        self.node_mut(parent).keys[slot - 1] = new_separator;
    }

    /// Move one entry from the right sibling into `parent.children[slot]`
    fn borrow_from_right(&mut self, parent: NodeId, slot: usize) {
        let node_id = self.node(parent).children[slot];
        let right_id = self.node(parent).children[slot + 1];
        let separator = self.node(parent).keys[slot].clone();

        let new_separator = {
            let (node, right) = self.two_mut(node_id, right_id);
            if node.is_leaf {
                let key = right.keys.remove(0);
                let value = right.values.remove(0);
                node.keys.push(key);
                node.values.push(value);
                right.keys[0].clone()
            } else {
                let key = right.keys.remove(0);
                let child = right.children.remove(0);
                node.keys.push(separator);
                node.children.push(child);
                key
            }
        };
        self.node_mut(parent).keys[slot] = new_separator;
    }

    /// Merge `parent.children[slot + 1]` into `parent.children[slot]`,
    /// dropping the separator between them.
    ///
    /// Leaf merges discard the separator (it was only a routing copy) and
    /// relink the chain past the absorbed sibling; internal merges fold the
    /// separator back down between the two key runs.
    fn merge_children(&mut self, parent: NodeId, slot: usize) {
        let left_id = self.node(parent).children[slot];
        let right_id = self.node(parent).children[slot + 1];
        let separator = {
            let parent_node = self.node_mut(parent);
            parent_node.children.remove(slot + 1);
            parent_node.keys.remove(slot)
        };

        let (left, right) = self.two_mut(left_id, right_id);
        if left.is_leaf {
            left.keys.append(&mut right.keys);
            left.values.append(&mut right.values);
            left.next_leaf = right.next_leaf.take();
        } else {
            left.keys.push(separator);
            left.keys.append(&mut right.keys);
            left.children.append(&mut right.children);
        }
        self.release(right_id);
    }

    /// An internal root left with a single child is replaced by that child
    fn collapse_root(&mut self) {
        let root = self.node(self.root);
        if !root.is_leaf && root.keys.is_empty() {
            let new_root = root.children[0];
            let old_root = self.root;
            self.root = new_root;
            self.release(old_root);
        }
    }
}

/// Check if the tree maintains all B+ invariants (for testing)
pub fn is_valid_btree(tree: &BPlusTree) -> bool {
    check_btree_invariants(tree).is_ok()
}

/// Check structural invariants, reporting the first violation
///
/// Verified: capacity bounds on every node (root exempt from the minimum),
/// internal fan-out of `keys + 1`, sorted keys within each node, uniform
/// leaf depth, separator bounds on every subtree, and a leaf chain whose
/// concatenation is strictly increasing and accounts for every entry.
pub fn check_btree_invariants(tree: &BPlusTree) -> Result<()> {
    let leaf_depth = check_node(tree, tree.root, None, None, 0, true)?;

    // Walk the chain and confirm it is the in-order leaf sequence
    let pairs = tree.all_pairs();
    for window in pairs.windows(2) {
        if window[0].0 >= window[1].0 {
            bail!(
                "Leaf chain not strictly increasing: {} >= {}",
                window[0].0,
                window[1].0
            );
        }
    }
    if pairs.len() != tree.len {
        bail!(
            "Entry count mismatch: chain found {}, tree records {}",
            pairs.len(),
            tree.len
        );
    }

    let _ = leaf_depth;
    Ok(())
}

/// Returns the depth at which leaves sit under `id`
fn check_node(
    tree: &BPlusTree,
    id: NodeId,
    lower: Option<&ValidatedFileName>,
    upper: Option<&ValidatedFileName>,
    depth: usize,
    is_root: bool,
) -> Result<usize> {
    let node = tree.node(id);
    let max_keys = tree.max_keys();
    let min_keys = tree.min_keys();

    if node.keys.len() > max_keys {
        bail!("Node exceeds {} keys: {}", max_keys, node.keys.len());
    }
    if !is_root && node.keys.len() < min_keys {
        bail!("Non-root node below {} keys: {}", min_keys, node.keys.len());
    }

    for window in node.keys.windows(2) {
        if window[0] >= window[1] {
            bail!("Node keys not strictly increasing");
        }
    }

    // Every key must fall inside the separator bounds inherited from above:
    // lower is inclusive (leaf routing keys exist in the right subtree),
    // upper is exclusive.
    for key in &node.keys {
        if let Some(lo) = lower {
            if key < lo {
                bail!("Key {} below subtree lower bound {}", key, lo);
            }
        }
        if let Some(hi) = upper {
            if key >= hi {
                bail!("Key {} at or above subtree upper bound {}", key, hi);
            }
        }
    }

    if node.is_leaf {
        if node.keys.len() != node.values.len() {
            bail!("Leaf keys and values out of parallel");
        }
        return Ok(depth);
    }

    if node.children.len() != node.keys.len() + 1 {
        bail!(
            "Internal node with {} keys has {} children",
            node.keys.len(),
            node.children.len()
        );
    }

    let mut leaf_depth = None;
    for (i, &child) in node.children.iter().enumerate() {
        let child_lower = if i == 0 { lower } else { Some(&node.keys[i - 1]) };
        let child_upper = if i == node.keys.len() {
            upper
        } else {
            Some(&node.keys[i])
        };
        let found = check_node(tree, child, child_lower, child_upper, depth + 1, false)?;
        match leaf_depth {
            None => leaf_depth = Some(found),
            Some(expected) if expected != found => {
                bail!("Leaves at unequal depths: {} vs {}", expected, found);
            }
            Some(_) => {}
        }
    }

    leaf_depth.ok_or_else(|| anyhow::anyhow!("Internal node with no children"))
}

/// Keys of each leaf in chain order (for testing)
pub fn collect_leaf_keys(tree: &BPlusTree) -> Vec<Vec<String>> {
    let mut result = Vec::new();
    let mut leaf = Some(tree.leftmost_leaf());
    while let Some(id) = leaf {
        let node = tree.node(id);
        result.push(node.keys.iter().map(|k| k.as_str().to_string()).collect());
        leaf = node.next_leaf;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ValidatedFileName {
        ValidatedFileName::new(s).expect("test filename should be valid")
    }

    fn path(s: &str) -> ValidatedPath {
        ValidatedPath::new(s).expect("test path should be valid")
    }

    fn degree(t: usize) -> ValidatedDegree {
        ValidatedDegree::new(t).expect("test degree should be valid")
    }

    fn tree_with(t: usize, names: &[&str]) -> BPlusTree {
        let mut tree = create_tree(degree(t));
        for n in names {
            insert_into_tree(&mut tree, name(n), path(&format!("/{n}")));
        }
        tree
    }

    #[test]
    fn test_empty_tree() {
        let tree = create_tree(degree(3));
        assert!(tree.is_empty());
        assert!(is_valid_btree(&tree));
        assert_eq!(search_in_tree(&tree, &name("a.txt")), None);
    }

    #[test]
    fn test_insert_within_single_leaf() {
        let tree = tree_with(3, &["c", "a", "b"]);
        assert_eq!(entry_count(&tree), 3);
        assert_eq!(collect_leaf_keys(&tree), vec![vec!["a", "b", "c"]]);
        assert!(is_valid_btree(&tree));
    }

    #[test]
    fn test_leaf_split_duplicates_routing_key() {
        // Degree 3: a leaf overflows past 5 keys; the middle key stays in
        // the right half and is copied up as the separator.
        let tree = tree_with(3, &["a", "b", "c", "d", "e", "f"]);
        assert!(is_valid_btree(&tree));

        let leaves = collect_leaf_keys(&tree);
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0], vec!["a", "b"]);
        assert_eq!(leaves[1], vec!["c", "d", "e", "f"]);
        // "c" is both the separator and the first key of the right leaf
        assert_eq!(search_in_tree(&tree, &name("c")), Some(path("/c")));
    }

    #[test]
    fn test_insert_overwrites_existing_key() {
        let mut tree = create_tree(degree(3));
        assert!(insert_into_tree(&mut tree, name("a.txt"), path("/old")));
        assert!(!insert_into_tree(&mut tree, name("a.txt"), path("/new")));

        assert_eq!(entry_count(&tree), 1);
        assert_eq!(search_in_tree(&tree, &name("a.txt")), Some(path("/new")));
    }

    #[test]
    fn test_minimum_degree_deep_tree() {
        let names: Vec<String> = (0..40).map(|i| format!("f{i:02}")).collect();
        let mut tree = create_tree(degree(2));
        for n in &names {
            insert_into_tree(&mut tree, name(n), path(&format!("/{n}")));
            check_btree_invariants(&tree).expect("invariants after every insert");
        }
        assert_eq!(entry_count(&tree), 40);

        let keys: Vec<String> = extract_all_pairs(&tree)
            .into_iter()
            .map(|(k, _)| k.as_str().to_string())
            .collect();
        assert_eq!(keys, names);
    }

    #[test]
    fn test_range_scan_inclusive_bounds() {
        let tree = tree_with(3, &["a", "b", "c", "d", "e", "f", "g"]);
        let found: Vec<String> = range_scan(&tree, &name("b"), &name("e"))
            .into_iter()
            .map(|(k, _)| k.as_str().to_string())
            .collect();
        assert_eq!(found, vec!["b", "c", "d", "e"]);
    }

    #[test]
    fn test_range_scan_bounds_need_not_exist() {
        let tree = tree_with(3, &["b", "d", "f", "h", "j", "l"]);
        let found: Vec<String> = range_scan(&tree, &name("c"), &name("i"))
            .into_iter()
            .map(|(k, _)| k.as_str().to_string())
            .collect();
        assert_eq!(found, vec!["d", "f", "h"]);
    }

    #[test]
    fn test_range_scan_inverted_is_empty() {
        let tree = tree_with(3, &["a", "b", "c"]);
        assert!(range_scan(&tree, &name("c"), &name("a")).is_empty());
    }

    #[test]
    fn test_delete_from_leaf_without_underflow() {
        let mut tree = tree_with(3, &["a", "b", "c", "d"]);
        assert!(delete_from_tree(&mut tree, &name("b")));
        assert_eq!(entry_count(&tree), 3);
        assert_eq!(search_in_tree(&tree, &name("b")), None);
        assert!(is_valid_btree(&tree));
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let mut tree = tree_with(3, &["a", "b", "c"]);
        assert!(!delete_from_tree(&mut tree, &name("zzz")));
        assert_eq!(entry_count(&tree), 3);
    }

    #[test]
    fn test_delete_triggers_borrow_and_merge() {
        let names: Vec<String> = (0..30).map(|i| format!("k{i:02}")).collect();
        let mut tree = create_tree(degree(2));
        for n in &names {
            insert_into_tree(&mut tree, name(n), path(&format!("/{n}")));
        }

        // Drain from the front so underflow repair runs repeatedly
        for n in &names {
            assert!(delete_from_tree(&mut tree, &name(n)));
            check_btree_invariants(&tree).expect("invariants after every delete");
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_root_collapses_after_merge() {
        let mut tree = tree_with(2, &["a", "b", "c", "d"]);
        for n in ["a", "b", "c"] {
            delete_from_tree(&mut tree, &name(n));
        }
        // One entry left; the root must be a leaf again
        assert!(tree.node(tree.root).is_leaf);
        assert_eq!(entry_count(&tree), 1);
        assert!(is_valid_btree(&tree));
    }

    #[test]
    fn test_leaf_chain_survives_merges() {
        let names: Vec<String> = (0..20).map(|i| format!("f{i:02}")).collect();
        let mut tree = create_tree(degree(2));
        for n in &names {
            insert_into_tree(&mut tree, name(n), path(&format!("/{n}")));
        }
        // Remove every other key; the chain must still cover the survivors
        for n in names.iter().step_by(2) {
            delete_from_tree(&mut tree, &name(n));
        }

        let keys: Vec<String> = extract_all_pairs(&tree)
            .into_iter()
            .map(|(k, _)| k.as_str().to_string())
            .collect();
        let expected: Vec<String> = names.iter().skip(1).step_by(2).cloned().collect();
        assert_eq!(keys, expected);
        check_btree_invariants(&tree).expect("invariants after interleaved deletes");
    }
}
