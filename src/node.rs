use std::{
    fmt,
    ops::{Index, IndexMut},
};

/// Handle to a [Node] stored in an [Arena].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Node corresponds to a single entry in Llrb instance. Children are owned
// through the arena, `parent` is only a lookup used by bottom-up walks.
#[derive(Clone, Debug)]
pub struct Node<K, V> {
    pub key: K,
    pub value: V,
    pub black: bool,            // store: black or red
    pub left: Option<NodeId>,   // store: left child
    pub right: Option<NodeId>,  // store: right child
    pub parent: Option<NodeId>, // lookup: parent node
}

impl<K, V> Node<K, V> {
    /// New nodes are always red.
    pub fn new(key: K, value: V, parent: Option<NodeId>) -> Node<K, V> {
        Node {
            key,
            value,
            black: false,
            left: None,
            right: None,
            parent,
        }
    }

    #[inline]
    pub fn set_red(&mut self) {
        self.black = false
    }

    #[inline]
    pub fn set_black(&mut self) {
        self.black = true
    }

    #[inline]
    pub fn toggle_link(&mut self) {
        self.black = !self.black
    }

    #[inline]
    pub fn is_black(&self) -> bool {
        self.black
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Arena owns every node of a tree, freed slots are recycled through a
/// free-list.
pub struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Arena<K, V> {
        Arena {
            slots: Vec::default(),
            free: Vec::default(),
        }
    }

    pub fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub fn free(&mut self, id: NodeId) -> Node<K, V> {
        match self.slots.get_mut(id.0).and_then(Option::take) {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => panic!("free(): node {:?} already freed, call the programmer", id),
        }
    }

    /// Number of occupied slots.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn reset(&mut self) {
        self.slots = Vec::default();
        self.free = Vec::default();
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        match self.slots.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("index(): dangling node {:?}, call the programmer", id),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("index_mut(): dangling node {:?}, call the programmer", id),
        }
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
