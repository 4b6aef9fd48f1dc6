// Red-Black Tree Implementation - Balanced Binary Index
// Arena-of-handles representation: nodes live in a Vec and reference each
// other by index, with slot 0 reserved as the per-tree NIL sentinel. The
// sentinel is always BLACK and carries no payload, so rotation and fix-up
// code never special-cases a missing child or parent.

use crate::types::{ValidatedFileName, ValidatedPath};
use anyhow::{bail, Result};
use std::cmp::Ordering;

/// Handle to a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(u32);

/// The reserved sentinel handle
pub const NIL: NodeId = NodeId(0);

impl NodeId {
    fn idx(self) -> usize {
        self.0 as usize
    }

    pub fn is_nil(self) -> bool {
        self == NIL
    }
}

/// Node color for the balance invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone)]
struct Payload {
    key: ValidatedFileName,
    value: ValidatedPath,
}

#[derive(Debug, Clone)]
struct RbNode {
    /// None only for the sentinel and freed slots
    payload: Option<Payload>,
    color: Color,
    left: NodeId,
    right: NodeId,
    parent: NodeId,
}

/// Balanced binary index tree
///
/// Owns its arena exclusively; handles never escape the module, so no node
/// is ever aliased between tree instances.
#[derive(Debug, Clone)]
pub struct RbTree {
    nodes: Vec<RbNode>,
    root: NodeId,
    free_list: Vec<NodeId>,
    len: usize,
}

/// Create an empty balanced binary index
pub fn create_empty_tree() -> RbTree {
    RbTree::new()
}

/// Insert or overwrite a key; returns true if the key was new
pub fn insert_into_tree(tree: &mut RbTree, key: ValidatedFileName, value: ValidatedPath) -> bool {
    tree.insert(key, value)
}

/// Look up a key; absent keys yield None
pub fn search_in_tree(tree: &RbTree, key: &ValidatedFileName) -> Option<ValidatedPath> {
    tree.search(key)
}

/// Remove a key; returns true if it existed
pub fn delete_from_tree(tree: &mut RbTree, key: &ValidatedFileName) -> bool {
    tree.delete(key)
}

/// All entries in ascending key order
pub fn extract_all_pairs(tree: &RbTree) -> Vec<(ValidatedFileName, ValidatedPath)> {
    tree.inorder_pairs()
}

/// Number of entries in the tree
pub fn entry_count(tree: &RbTree) -> usize {
    tree.len
}

impl RbTree {
    pub fn new() -> Self {
        // Slot 0 is the sentinel; it doubles as the parent of the root and
        // the child of every leaf.
        let sentinel = RbNode {
            payload: None,
            color: Color::Black,
            left: NIL,
            right: NIL,
            parent: NIL,
        };
        Self {
            nodes: vec![sentinel],
            root: NIL,
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

    // -- arena primitives --------------------------------------------------

    fn alloc(&mut self, key: ValidatedFileName, value: ValidatedPath) -> NodeId {
        let node = RbNode {
            payload: Some(Payload { key, value }),
            color: Color::Red,
            left: NIL,
            right: NIL,
            parent: NIL,
        };
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
        self.nodes[id.idx()].payload = None;
        self.free_list.push(id);
    }

    fn key(&self, id: NodeId) -> &ValidatedFileName {
        self.nodes[id.idx()]
            .payload
            .as_ref()
            .map(|p| &p.key)
            .expect("sentinel and freed nodes have no key")
    }

    fn color(&self, id: NodeId) -> Color {
        self.nodes[id.idx()].color
    }

    fn left(&self, id: NodeId) -> NodeId {
        self.nodes[id.idx()].left
    }

    fn right(&self, id: NodeId) -> NodeId {
        self.nodes[id.idx()].right
    }

    fn parent(&self, id: NodeId) -> NodeId {
        self.nodes[id.idx()].parent
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.nodes[id.idx()].color = color;
    }

    fn set_left(&mut self, id: NodeId, child: NodeId) {
        self.nodes[id.idx()].left = child;
    }

    fn set_right(&mut self, id: NodeId, child: NodeId) {
        self.nodes[id.idx()].right = child;
    }

    fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        self.nodes[id.idx()].parent = parent;
    }

    // -- public operations -------------------------------------------------

    /// Insert a key-value pair; an existing key has its value replaced in
    /// place with no structural change. Returns true for a new key.
    pub fn insert(&mut self, key: ValidatedFileName, value: ValidatedPath) -> bool {
        let mut parent = NIL;
        let mut current = self.root;

        while current != NIL {
            match key.cmp(self.key(current)) {
                Ordering::Equal => {
                    if let Some(payload) = self.nodes[current.idx()].payload.as_mut() {
                        payload.value = value;
                    }
                    return false;
                }
                Ordering::Less => {
                    parent = current;
                    current = self.left(current);
                }
                Ordering::Greater => {
                    parent = current;
                    current = self.right(current);
                }
            }
        }

        let node = self.alloc(key, value);
        self.set_parent(node, parent);

        if parent == NIL {
            self.root = node;
        } else if self.key(node) < self.key(parent) {
            self.set_left(parent, node);
        } else {
            self.set_right(parent, node);
        }

        self.len += 1;
        self.fix_insert(node);
        true
    }

    /// Restore the color invariants after insertion, walking parent handles
    /// upward while two RED nodes are adjacent.
    fn fix_insert(&mut self, mut node: NodeId) {
        while node != self.root && self.color(self.parent(node)) == Color::Red {
            let parent = self.parent(node);
            let grandparent = self.parent(parent);

            if parent == self.left(grandparent) {
                let uncle = self.right(grandparent);
                if self.color(uncle) == Color::Red {
                    // Case 1: red uncle, recolor and continue from grandparent
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.right(parent) {
                        // Case 2: inner child, rotate to the outer side first
                        node = parent;
                        self.left_rotate(node);
                    }
                    // Case 3: outer child, recolor and rotate the grandparent
                    let parent = self.parent(node);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.right_rotate(grandparent);
                }
            } else {
                // Mirror image of the three cases above
                let uncle = self.left(grandparent);
                if self.color(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.left(parent) {
                        node = parent;
                        self.right_rotate(node);
                    }
                    let parent = self.parent(node);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.left_rotate(grandparent);
                }
            }
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    fn left_rotate(&mut self, x: NodeId) {
        let y = self.right(x);
        let y_left = self.left(y);

        self.set_right(x, y_left);
        if y_left != NIL {
            self.set_parent(y_left, x);
        }

        let x_parent = self.parent(x);
        self.set_parent(y, x_parent);
        if x_parent == NIL {
            self.root = y;
        } else if x == self.left(x_parent) {
            self.set_left(x_parent, y);
        } else {
            self.set_right(x_parent, y);
        }

        self.set_left(y, x);
        self.set_parent(x, y);
    }

    fn right_rotate(&mut self, y: NodeId) {
        let x = self.left(y);
        let x_right = self.right(x);

        self.set_left(y, x_right);
        if x_right != NIL {
            self.set_parent(x_right, y);
        }

        let y_parent = self.parent(y);
        self.set_parent(x, y_parent);
        if y_parent == NIL {
            self.root = x;
        } else if y == self.right(y_parent) {
            self.set_right(y_parent, x);
        } else {
            self.set_left(y_parent, x);
        }

        self.set_right(x, y);
        self.set_parent(y, x);
    }

    /// Point lookup by key comparison
    pub fn search(&self, key: &ValidatedFileName) -> Option<ValidatedPath> {
        let node = self.find_node(key);
        if node == NIL {
            return None;
        }
        self.nodes[node.idx()]
            .payload
            .as_ref()
            .map(|p| p.value.clone())
    }

    fn find_node(&self, key: &ValidatedFileName) -> NodeId {
        let mut current = self.root;
        while current != NIL {
            match key.cmp(self.key(current)) {
                Ordering::Equal => return current,
                Ordering::Less => current = self.left(current),
                Ordering::Greater => current = self.right(current),
            }
        }
        NIL
    }

    fn minimum(&self, mut node: NodeId) -> NodeId {
        while self.left(node) != NIL {
            node = self.left(node);
        }
        node
    }

    /// Replace the subtree rooted at `u` with the subtree rooted at `v`
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let u_parent = self.parent(u);
        if u_parent == NIL {
            self.root = v;
        } else if u == self.left(u_parent) {
            self.set_left(u_parent, v);
        } else {
            self.set_right(u_parent, v);
        }
        // v may be the sentinel; its parent link is still recorded so the
        // delete fix-up can walk upward from it.
        self.set_parent(v, u_parent);
    }

    /// Remove a key if present; returns whether it existed.
    ///
    /// A node with two children is replaced by its in-order successor via
    /// transplant: the successor node itself moves, no payload is copied.
    pub fn delete(&mut self, key: &ValidatedFileName) -> bool {
        let z = self.find_node(key);
        if z == NIL {
            return false;
        }

        let mut removed_color = self.color(z);
        let x;

        if self.left(z) == NIL {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z) == NIL {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            let successor = self.minimum(self.right(z));
            removed_color = self.color(successor);
            x = self.right(successor);

            if self.parent(successor) == z {
                self.set_parent(x, successor);
            } else {
                self.transplant(successor, x);
                let z_right = self.right(z);
                self.set_right(successor, z_right);
                self.set_parent(z_right, successor);
            }

            self.transplant(z, successor);
            let z_left = self.left(z);
            self.set_left(successor, z_left);
            self.set_parent(z_left, successor);
            let z_color = self.color(z);
            self.set_color(successor, z_color);
        }

        self.release(z);
        self.len -= 1;

        if removed_color == Color::Black {
            self.fix_delete(x);
        }

        // Keep the sentinel pristine for the next operation
        self.nodes[NIL.idx()].parent = NIL;
        true
    }

    /// Absorb the double-black deficiency left by removing a BLACK node,
    /// walking upward until a RED node or the root is reached.
    fn fix_delete(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            let parent = self.parent(x);
            if x == self.left(parent) {
                let mut sibling = self.right(parent);
                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.left_rotate(parent);
                    sibling = self.right(self.parent(x));
                }

                if self.color(self.left(sibling)) == Color::Black
                    && self.color(self.right(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = self.parent(x);
                } else {
                    if self.color(self.right(sibling)) == Color::Black {
                        let sibling_left = self.left(sibling);
                        self.set_color(sibling_left, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.right_rotate(sibling);
                        sibling = self.right(self.parent(x));
                    }

                    let parent = self.parent(x);
                    let parent_color = self.color(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let sibling_right = self.right(sibling);
                    self.set_color(sibling_right, Color::Black);
                    self.left_rotate(parent);
                    x = self.root;
                }
            } else {
                let mut sibling = self.left(parent);
                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.right_rotate(parent);
                    sibling = self.left(self.parent(x));
                }

                if self.color(self.right(sibling)) == Color::Black
                    && self.color(self.left(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = self.parent(x);
                } else {
                    if self.color(self.left(sibling)) == Color::Black {
                        let sibling_right = self.right(sibling);
                        self.set_color(sibling_right, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.left_rotate(sibling);
                        sibling = self.left(self.parent(x));
                    }

                    let parent = self.parent(x);
                    let parent_color = self.color(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let sibling_left = self.left(sibling);
                    self.set_color(sibling_left, Color::Black);
                    self.right_rotate(parent);
                    x = self.root;
                }
            }
        }

        self.set_color(x, Color::Black);
        // The sentinel may have been recolored through x; it must stay BLACK.
        self.nodes[NIL.idx()].color = Color::Black;
    }

    /// In-order traversal with an explicit stack (no call-stack recursion)
    pub fn inorder_pairs(&self) -> Vec<(ValidatedFileName, ValidatedPath)> {
        let mut result = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeId> = Vec::new();
        let mut current = self.root;

        loop {
            while current != NIL {
                stack.push(current);
                current = self.left(current);
            }
            let Some(node) = stack.pop() else { break };
            if let Some(payload) = self.nodes[node.idx()].payload.as_ref() {
                result.push((payload.key.clone(), payload.value.clone()));
            }
            current = self.right(node);
        }

        result
    }
}

impl Default for RbTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if the tree maintains all red-black invariants (for testing)
pub fn is_valid_rb_tree(tree: &RbTree) -> bool {
    check_rb_invariants(tree).is_ok()
}

/// Check red-black invariants, reporting the first violation
///
/// Verified: root is BLACK, no RED node has a RED parent, every root-to-NIL
/// path carries the same number of BLACK nodes, and the in-order key
/// sequence is strictly increasing.
pub fn check_rb_invariants(tree: &RbTree) -> Result<()> {
    if tree.root != NIL && tree.color(tree.root) != Color::Black {
        bail!("Root is not BLACK");
    }
    if tree.nodes[NIL.idx()].color != Color::Black {
        bail!("Sentinel is not BLACK");
    }

    check_subtree(tree, tree.root)?;

    let pairs = tree.inorder_pairs();
    for window in pairs.windows(2) {
        if window[0].0 >= window[1].0 {
            bail!(
                "Keys not strictly increasing: {} >= {}",
                window[0].0,
                window[1].0
            );
        }
    }
    if pairs.len() != tree.len {
        bail!(
            "Entry count mismatch: traversal found {}, tree records {}",
            pairs.len(),
            tree.len
        );
    }

    Ok(())
}

/// Returns the black-height of the subtree, verifying color constraints
fn check_subtree(tree: &RbTree, node: NodeId) -> Result<usize> {
    if node == NIL {
        return Ok(1);
    }

    if tree.color(node) == Color::Red {
        if tree.color(tree.left(node)) == Color::Red
            || tree.color(tree.right(node)) == Color::Red
        {
            bail!("RED node has a RED child");
        }
    }

    let left_height = check_subtree(tree, tree.left(node))?;
    let right_height = check_subtree(tree, tree.right(node))?;
    if left_height != right_height {
        bail!(
            "Black-height mismatch: left {} vs right {}",
            left_height,
            right_height
        );
    }

    let own = if tree.color(node) == Color::Black {
        1
    } else {
        0
    };
    Ok(left_height + own)
}
