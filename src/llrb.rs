//! Module provide ordered-map implemented by [Llrb] type.
//!
//! Llrb is implemented using [left-leaning-red-black][wiki-llrb].
//!
//! - Each entry in Llrb instance correspond to a {Key, Value} pair.
//! - Parametrised over `key-type` and `value-type`.
//! - CRUD operations, via insert(), get(), remove(), delete_min() api.
//! - Nodes live in an arena and carry a parent handle, so rebalancing after
//!   a mutation is a bottom-up loop instead of a recursion.
//! - No Durability guarantee.
//! - Not thread safe, wrap it in a lock to share across threads.
//!
//! Insert and lookup:
//! ```
//! use llrbt::Llrb;
//!
//! let mut index: Llrb<i32, &str> = Llrb::new();
//! for (key, value) in [(5, "e"), (3, "c"), (8, "h"), (1, "a")].iter() {
//!     index.insert(*key, *value);
//! }
//! assert_eq!(index.get(&3), Some(&"c"));
//! assert_eq!(index.find_min(), Some((&1, &"a")));
//! assert_eq!(index.find_max(), Some((&8, &"h")));
//! ```
//!
//! Delete in sorted order:
//! ```
//! use llrbt::Llrb;
//!
//! let mut index: Llrb<i32, i32> = vec![(2, 20), (1, 10), (3, 30)].into_iter().collect();
//! assert_eq!(index.delete_min(), Some((1, 10)));
//! assert_eq!(index.remove(&3), Some(30));
//! assert_eq!(index.remove(&3), None);
//! assert_eq!(index.len(), 1);
//! ```
//!
//! [wiki-llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree

use log::{debug, trace};

use std::{
    borrow::Borrow,
    cmp::{self, Ord, Ordering},
    fmt,
    iter::FromIterator,
    mem, thread,
};

use crate::{
    node::{Arena, Node, NodeId},
    Error, Result,
};

/// Llrb manage a single instance of in-memory ordered-map using
/// [left-leaning-red-black][llrb] tree.
///
/// [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
pub struct Llrb<K, V> {
    nodes: Arena<K, V>,
    root: Option<NodeId>,
    n_count: usize, // number of entries in the tree.
}

impl<K, V> Llrb<K, V> {
    /// Create an empty instance of Llrb.
    pub fn new() -> Llrb<K, V> {
        Llrb {
            nodes: Arena::new(),
            root: None,
            n_count: Default::default(),
        }
    }
}

impl<K, V> Default for Llrb<K, V> {
    fn default() -> Llrb<K, V> {
        Llrb::new()
    }
}

impl<K, V> Drop for Llrb<K, V> {
    fn drop(&mut self) {
        // the arena's own drop reclaims the slots while unwinding.
        if !thread::panicking() {
            self.clear()
        }
    }
}

impl<K, V> Extend<(K, V)> for Llrb<K, V>
where
    K: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        iter.into_iter().for_each(|(key, value)| {
            self.insert(key, value);
        });
    }
}

impl<K, V> FromIterator<(K, V)> for Llrb<K, V>
where
    K: Ord,
{
    fn from_iter<I>(iter: I) -> Llrb<K, V>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut index = Llrb::new();
        index.extend(iter);
        index
    }
}

impl<K, V> fmt::Debug for Llrb<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Maintenance API.
impl<K, V> Llrb<K, V> {
    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Release every entry in this instance. Nodes are visited through an
    /// explicit work-list, each node is freed exactly once and no recursion
    /// is involved, whatever the size of the tree.
    pub fn clear(&mut self) {
        let mut stack: Vec<NodeId> = self.root.take().into_iter().collect();
        let mut n_freed = 0_usize;

        while let Some(id) = stack.pop() {
            let node = self.nodes.free(id);
            stack.extend(node.left);
            stack.extend(node.right);
            n_freed += 1;
        }

        debug!("clear(): released {} nodes", n_freed);
        debug_assert_eq!(n_freed, self.n_count, "clear(): leaked nodes");

        self.nodes.reset();
        self.n_count = 0;
    }
}

impl<K, V> Llrb<K, V> {
    /// Insert value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        let (_, old_value) = self.do_insert(key, value);
        old_value
    }

    /// Return a mutable reference to the value for key. If key is not
    /// present, a default value is inserted first, hence this call can
    /// mutate the tree.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        K: Ord,
        V: Default,
    {
        let id = match self.find_node(&key) {
            Some(id) => id,
            None => self.do_insert(key, V::default()).0,
        };
        &mut self.nodes[id].value
    }

    /// Remove the entry with smallest key and return it. Return None
    /// if index is empty.
    pub fn delete_min(&mut self) -> Option<(K, V)> {
        let root = match self.root {
            Some(root) => root,
            None => {
                trace!("delete_min(): empty index");
                return None;
            }
        };

        let (node, parent) = self.detach_min(root);
        if let Some(parent) = parent {
            self.walkup_fixup(parent);
        }
        self.n_count -= 1;

        Some(node.into_entry())
    }

    /// Remove key from this instance and return its value. If key is
    /// not present, then remove is effectively a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.find_node(key).is_none() {
            trace!("remove(): key not found");
            return None;
        }

        let root = self.root?;
        let node = if self.nodes[root].is_leaf() {
            self.root = None;
            self.nodes.free(root)
        } else {
            self.do_remove(root, key)
        };
        self.n_count -= 1;

        Some(node.value)
    }

    /// Validate LLRB tree with following rules:
    ///
    /// * Root node is black.
    /// * Right links are never red.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Make sure keys are in sorted order.
    /// * Parent handles point back to the owning node.
    /// * Depth of the tree is within `2 * log2(n + 1)`.
    pub fn validate(&self) -> Result<()>
    where
        K: Ord + fmt::Debug,
    {
        let root = match self.root {
            Some(root) => root,
            None if self.n_count == 0 => return Ok(()),
            None => return err_at!(Fatal, msg: "empty tree, count {}", self.n_count),
        };

        if self.is_red(Some(root)) {
            return err_at!(Fatal, msg: "red root {:?}", self.nodes[root].key);
        }
        if let Some(parent) = self.parent_of(root) {
            return err_at!(Fatal, msg: "root has parent {:?}", parent);
        }

        let (n_count, _, depth) = self.validate_tree(root, 0 /*n_blacks*/, 1)?;
        if n_count != self.n_count {
            return err_at!(Fatal, msg: "mismatch in count {} != {}", n_count, self.n_count);
        }
        if self.nodes.live() != self.n_count {
            return err_at!(Fatal, msg: "leaked nodes {} != {}", self.nodes.live(), n_count);
        }

        let max_depth = 2 * (usize::BITS - (n_count + 1).leading_zeros()) as usize;
        if depth > max_depth {
            return err_at!(Fatal, msg: "depth {} exceeds {} for {}", depth, max_depth, n_count);
        }

        let mut prev: Option<&K> = None;
        for (key, _) in self.iter() {
            match prev {
                Some(prev) if prev >= key => {
                    return err_at!(Fatal, msg: "sort {:?} before {:?}", prev, key);
                }
                _ => prev = Some(key),
            }
        }

        Ok(())
    }
}

impl<K, V> Llrb<K, V> {
    /// Get the value for key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_node(key)?;
        Some(&self.nodes[id].value)
    }

    /// Get a mutable reference to the value for key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_node(key)?;
        Some(&mut self.nodes[id].value)
    }

    /// Get the entry for key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = &self.nodes[self.find_node(key)?];
        Some((&node.key, &node.value))
    }

    /// Check whether key is present in this instance.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Return the entry with smallest key.
    pub fn find_min(&self) -> Option<(&K, &V)> {
        let mut id = self.root?;
        while let Some(left) = self.left_of(id) {
            id = left;
        }
        let node = &self.nodes[id];
        Some((&node.key, &node.value))
    }

    /// Return the entry with largest key.
    pub fn find_max(&self) -> Option<(&K, &V)> {
        let mut id = self.root?;
        while let Some(right) = self.right_of(id) {
            id = right;
        }
        let node = &self.nodes[id];
        Some((&node.key, &node.value))
    }

    /// Return an iterator over all entries in this instance, in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut paths = Vec::default();
        build_iter(&self.nodes, self.root, &mut paths);

        Iter {
            nodes: &self.nodes,
            paths,
        }
    }
}

impl<K, V> Llrb<K, V> {
    fn find_node<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root;
        while let Some(id) = node {
            node = match self.cmp_key(id, key) {
                Ordering::Less => self.right_of(id),
                Ordering::Greater => self.left_of(id),
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    // Top-down walk to the insertion point, then bottom-up fixup to root.
    // Return the handle of the node that holds key.
    fn do_insert(&mut self, key: K, value: V) -> (NodeId, Option<V>)
    where
        K: Ord,
    {
        let mut node = match self.root {
            Some(root) => root,
            None => {
                let id = self.nodes.alloc(Node::new(key, value, None));
                self.nodes[id].set_black();
                self.root = Some(id);
                self.n_count += 1;
                return (id, None);
            }
        };

        loop {
            let cmp = self.nodes[node].key.cmp(&key);
            let next = match cmp {
                Ordering::Greater => self.left_of(node),
                Ordering::Less => self.right_of(node),
                Ordering::Equal => {
                    let old_value = mem::replace(&mut self.nodes[node].value, value);
                    return (node, Some(old_value));
                }
            };
            if let Some(next) = next {
                node = next;
                continue;
            }

            let id = self.nodes.alloc(Node::new(key, value, Some(node)));
            match cmp {
                Ordering::Greater => self.nodes[node].left = Some(id),
                _ => self.nodes[node].right = Some(id),
            }
            self.n_count += 1;
            // rotations relink nodes but never move entries, `id` stays valid.
            self.walkup_fixup(id);
            return (id, None);
        }
    }

    // Combined search and delete. Key must be present in the sub-tree and
    // `node` must not be a leaf root. Return the detached node carrying the
    // removed entry.
    fn do_remove<Q>(&mut self, mut node: NodeId, key: &Q) -> Node<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        loop {
            if self.cmp_key(node, key) == Ordering::Greater {
                if let Some(left) = self.left_of(node) {
                    if !self.is_red(Some(left)) && !self.is_red(self.left_of(left)) {
                        node = self.move_red_left(node);
                    }
                }
            } else {
                if self.is_red(self.left_of(node)) {
                    node = self.rotate_right(node);
                }

                if self.cmp_key(node, key) == Ordering::Equal && self.right_of(node).is_none() {
                    if self.left_of(node).is_some() {
                        self.rotate_right(node);
                    }
                    let parent = self.parent_of(node);
                    self.unlink(node);
                    let removed = self.nodes.free(node);
                    if let Some(parent) = parent {
                        self.walkup_fixup(parent);
                    }
                    return removed;
                }

                if let Some(right) = self.right_of(node) {
                    if !self.is_red(Some(right)) && !self.is_red(self.left_of(right)) {
                        node = self.move_red_right(node);
                    }
                }

                if self.cmp_key(node, key) == Ordering::Equal {
                    // node == key, swap in the entry of its successor and
                    // physically remove the successor node instead.
                    let right = match self.right_of(node) {
                        Some(right) => right,
                        None => panic!("do_remove(): no successor, call the programmer"),
                    };
                    let (mut successor, parent) = self.detach_min(right);
                    let target = &mut self.nodes[node];
                    mem::swap(&mut target.key, &mut successor.key);
                    mem::swap(&mut target.value, &mut successor.value);
                    if let Some(parent) = parent {
                        self.walkup_fixup(parent);
                    }
                    return successor;
                }
            }

            let next = match self.cmp_key(node, key) {
                Ordering::Greater => self.left_of(node),
                Ordering::Less | Ordering::Equal => self.right_of(node),
            };
            node = match next {
                Some(next) => next,
                None => panic!("do_remove(): key lost in descent, call the programmer"),
            };
        }
    }

    // Detach the smallest node under `top`, pushing a red link down the
    // left spine so that the final leaf can be unlinked without breaking
    // black balance. Return the detached node and its former parent; the
    // caller must walkup_fixup from that parent.
    fn detach_min(&mut self, top: NodeId) -> (Node<K, V>, Option<NodeId>) {
        let mut node = top;
        while let Some(left) = self.left_of(node) {
            if !self.is_red(Some(left)) && !self.is_red(self.left_of(left)) {
                node = self.move_red_left(node);
            }
            node = match self.left_of(node) {
                Some(left) => left,
                None => panic!("detach_min(): lost left spine, call the programmer"),
            };
        }
        debug_assert!(self.right_of(node).is_none(), "detach_min(): min has right");

        let parent = self.parent_of(node);
        self.unlink(node);
        (self.nodes.free(node), parent)
    }

    fn unlink(&mut self, node: NodeId) {
        match self.parent_of(node) {
            Some(parent) if self.left_of(parent) == Some(node) => {
                self.nodes[parent].left = None
            }
            Some(parent) => self.nodes[parent].right = None,
            None => self.root = None,
        }
    }

    // Apply fixup from `node` upto root, and paint the root black.
    fn walkup_fixup(&mut self, mut node: NodeId) {
        loop {
            node = self.fixup(node);
            match self.parent_of(node) {
                Some(parent) => node = parent,
                None => break,
            }
        }
        self.root = Some(node);
        self.nodes[node].set_black();
    }

    // Return (n_count, n_blacks, depth) for sub-tree under `id`.
    fn validate_tree(
        &self,
        id: NodeId,
        mut n_blacks: usize,
        depth: usize,
    ) -> Result<(usize, usize, usize)>
    where
        K: Ord + fmt::Debug,
    {
        let node = &self.nodes[id];

        if node.is_black() {
            n_blacks += 1;
        } else if self.is_red(node.left) {
            return err_at!(Fatal, msg: "consecutive reds at {:?}", node.key);
        }
        if self.is_red(node.right) {
            return err_at!(Fatal, msg: "red right link under {:?}", node.key);
        }

        let mut subtrees = [(0, n_blacks, depth); 2];
        let children = [(node.left, Ordering::Less), (node.right, Ordering::Greater)];
        for (i, (child, order)) in children.iter().enumerate() {
            let child = match child {
                Some(child) => *child,
                None => continue,
            };
            let cnode = &self.nodes[child];
            if cnode.parent != Some(id) {
                return err_at!(Fatal, msg: "parent of {:?} is not {:?}", cnode.key, node.key);
            }
            if cnode.key.cmp(&node.key) != *order {
                return err_at!(Fatal, msg: "sort key:{:?} parent:{:?}", cnode.key, node.key);
            }
            subtrees[i] = self.validate_tree(child, n_blacks, depth + 1)?;
        }

        let [(lcount, lblacks, ldepth), (rcount, rblacks, rdepth)] = subtrees;
        if lblacks != rblacks {
            return err_at!(Fatal, msg: "unbalanced blacks {} {}", lblacks, rblacks);
        }

        Ok((lcount + rcount + 1, lblacks, cmp::max(ldepth, rdepth)))
    }
}

//--------- rotation routines for 2-3 algorithm ----------------

impl<K, V> Llrb<K, V> {
    #[inline]
    fn left_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].left
    }

    #[inline]
    fn right_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].right
    }

    #[inline]
    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    #[inline]
    fn cmp_key<Q>(&self, id: NodeId, key: &Q) -> Ordering
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.nodes[id].key.borrow().cmp(key)
    }

    fn is_red(&self, node: Option<NodeId>) -> bool {
        node.map_or(false, |id| !self.nodes[id].is_black())
    }

    // Point parent's link, or root, from `old` to `new`.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            Some(parent) if self.left_of(parent) == Some(old) => {
                self.nodes[parent].left = Some(new)
            }
            Some(parent) => self.nodes[parent].right = Some(new),
            None => self.root = Some(new),
        }
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    (r)                 (r)  \
    //            /       \                 /     \
    //          left       x             node      xr
    //                    / \            /  \
    //                  xl   xr       left   xl
    //
    fn rotate_left(&mut self, node: NodeId) -> NodeId {
        let x = match self.right_of(node) {
            Some(x) => x,
            None => panic!("rotate_left(): no right child, call the programmer"),
        };
        let (xl, parent) = (self.left_of(x), self.parent_of(node));

        self.nodes[node].right = xl;
        if let Some(xl) = xl {
            self.nodes[xl].parent = Some(node);
        }

        let black = self.nodes[node].black;
        self.nodes[x].black = black;
        self.nodes[x].left = Some(node);
        self.nodes[x].parent = parent;
        self.nodes[node].set_red();
        self.nodes[node].parent = Some(x);

        self.replace_child(parent, node, x);
        x
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //            (r)   \                   (r)  \
    //           /       \                 /      \
    //          x       right             xl      node
    //         / \                                / \
    //       xl   xr                             xr  right
    //
    fn rotate_right(&mut self, node: NodeId) -> NodeId {
        let x = match self.left_of(node) {
            Some(x) => x,
            None => panic!("rotate_right(): no left child, call the programmer"),
        };
        let (xr, parent) = (self.right_of(x), self.parent_of(node));

        self.nodes[node].left = xr;
        if let Some(xr) = xr {
            self.nodes[xr].parent = Some(node);
        }

        let black = self.nodes[node].black;
        self.nodes[x].black = black;
        self.nodes[x].right = Some(node);
        self.nodes[x].parent = parent;
        self.nodes[node].set_red();
        self.nodes[node].parent = Some(x);

        self.replace_child(parent, node, x);
        x
    }

    //        (x)                   (!x)
    //         |                     |
    //        node                  node
    //        / \                   / \
    //      (y) (z)              (!y) (!z)
    //     /      \              /      \
    //   left    right         left    right
    //
    fn flip(&mut self, node: NodeId) {
        if let Some(left) = self.left_of(node) {
            self.nodes[left].toggle_link();
        }
        if let Some(right) = self.right_of(node) {
            self.nodes[right].toggle_link();
        }
        self.nodes[node].toggle_link();
    }

    // Order of the three repairs is significant.
    fn fixup(&mut self, mut node: NodeId) -> NodeId {
        if self.is_red(self.right_of(node)) {
            node = self.rotate_left(node);
        }

        if let Some(left) = self.left_of(node) {
            if self.is_red(Some(left)) && self.is_red(self.left_of(left)) {
                node = self.rotate_right(node);
            }
        }

        if self.is_red(self.left_of(node)) && self.is_red(self.right_of(node)) {
            self.flip(node);
        }
        node
    }

    fn move_red_left(&mut self, mut node: NodeId) -> NodeId {
        self.flip(node);

        if let Some(right) = self.right_of(node) {
            if self.is_red(self.left_of(right)) {
                self.rotate_right(right);
                node = self.rotate_left(node);
                self.flip(node);
            }
        }
        node
    }

    fn move_red_right(&mut self, mut node: NodeId) -> NodeId {
        self.flip(node);

        if let Some(left) = self.left_of(node) {
            if self.is_red(self.left_of(left)) {
                node = self.rotate_right(node);
                self.flip(node);
            }
        }
        node
    }
}

/// In-order iterator over [Llrb] entries.
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<K, V>,
    paths: Vec<NodeId>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.paths.pop()?];
        build_iter(nodes, node.right, &mut self.paths);
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V> IntoIterator for &'a Llrb<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

// Push `node` and its left spine.
fn build_iter<K, V>(nodes: &Arena<K, V>, mut node: Option<NodeId>, paths: &mut Vec<NodeId>) {
    while let Some(id) = node {
        paths.push(id);
        node = nodes[id].left;
    }
}

#[cfg(test)]
#[path = "llrb_test.rs"]
mod llrb_test;
