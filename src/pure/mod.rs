// Pure Functions Module
// Both index algorithms implemented free of I/O and logging; the index
// wrappers layer contract enforcement and observability on top.

pub mod btree;
pub mod rbtree;

pub use btree::{BPlusTree, check_btree_invariants, is_valid_btree};
pub use rbtree::{check_rb_invariants, is_valid_rb_tree, RbTree};
