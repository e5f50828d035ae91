use core::{
    fmt, mem,
    ops::{Index, IndexMut, Not},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// A handle to a node stored in a [`Tree`](crate::Tree).
///
/// Handles are cheap to copy and stay valid until the node they point at is removed. Once the
/// node is gone the handle is stale: looking it up yields `None`, even if the underlying slot has
/// since been reused for another key.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    index: u32,
    generation: u32,
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({}v{})", self.index, self.generation)
    }
}

pub(crate) type Link = Option<NodeRef>;

/// A single vertex of a tree.
///
/// Nodes are owned by the tree's node store. Child links are owning in the sense that a node is
/// reachable only through its parent's child slot (or the tree root); the parent link is a plain
/// back-reference used for upward walks.
#[derive(Clone, Debug)]
pub struct Node<K> {
    key: K,
    height: usize,
    parent: Link,
    children: [Link; 2],
}

impl<K> Node<K> {
    pub(crate) fn new(key: K, parent: Link) -> Node<K> {
        Node {
            key,
            height: 1,
            parent,
            children: [None; 2],
        }
    }

    /// Returns the key stored in this node.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the cached height of the subtree rooted at this node. A leaf has height 1.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn left(&self) -> Option<NodeRef> {
        self.child(Dir::Left)
    }

    #[inline]
    pub fn right(&self) -> Option<NodeRef> {
        self.child(Dir::Right)
    }

    /// Returns the parent of this node, or `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Link) -> Link {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Link) -> Link {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_height(&mut self, height: usize) {
        self.height = height;
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }
}

#[derive(Clone, Debug)]
struct Slot<K> {
    generation: u32,
    node: Option<Node<K>>,
}

/// Growable storage for the nodes of one tree.
///
/// Freed slots are recycled. Every free bumps the slot's generation so that handles to the old
/// occupant no longer resolve.
#[derive(Clone, Debug)]
pub(crate) struct NodeStore<K> {
    slots: Vec<Slot<K>>,
    free: Vec<u32>,
    len: usize,
}

impl<K> NodeStore<K> {
    pub(crate) const fn new() -> NodeStore<K> {
        NodeStore {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Returns the number of live nodes.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn alloc(&mut self, node: Node<K>) -> NodeRef {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.node.is_none(), "free list points at a live slot");
            slot.node = Some(node);

            return NodeRef {
                index,
                generation: slot.generation,
            };
        }

        let index = u32::try_from(self.slots.len()).expect("node store exceeded u32::MAX slots");
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });

        NodeRef {
            index,
            generation: 0,
        }
    }

    /// Releases the node behind `node`, returning it. Returns `None` if the handle is stale.
    pub(crate) fn free(&mut self, node: NodeRef) -> Option<Node<K>> {
        let slot = self
            .slots
            .get_mut(node.index as usize)
            .filter(|slot| slot.generation == node.generation)?;

        let removed = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(node.index);
        self.len -= 1;

        Some(removed)
    }

    pub(crate) fn get(&self, node: NodeRef) -> Option<&Node<K>> {
        self.slots
            .get(node.index as usize)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, node: NodeRef) -> Option<&mut Node<K>> {
        self.slots
            .get_mut(node.index as usize)
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Frees every node. Outstanding handles become stale.
    pub(crate) fn clear(&mut self) {
        self.free.clear();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }

        self.len = 0;
    }
}

impl<K> Index<NodeRef> for NodeStore<K> {
    type Output = Node<K>;

    #[inline]
    fn index(&self, node: NodeRef) -> &Node<K> {
        self.get(node).expect("stale node handle")
    }
}

impl<K> IndexMut<NodeRef> for NodeStore<K> {
    #[inline]
    fn index_mut(&mut self, node: NodeRef) -> &mut Node<K> {
        self.get_mut(node).expect("stale node handle")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_get() {
        let mut store = NodeStore::new();
        let a = store.alloc(Node::new(1, None));
        let b = store.alloc(Node::new(2, Some(a)));

        assert_eq!(store.len(), 2);
        assert_eq!(store[a].key(), &1);
        assert_eq!(store[b].key(), &2);
        assert_eq!(store[b].parent(), Some(a));
        assert_eq!(store[b].height(), 1);
        assert!(store[b].is_leaf());
    }

    #[test]
    fn freed_handle_is_stale() {
        let mut store = NodeStore::new();
        let a = store.alloc(Node::new(1, None));

        assert_eq!(store.free(a).map(Node::into_key), Some(1));
        assert!(store.get(a).is_none());
        assert!(store.free(a).is_none());
        assert_eq!(store.len(), 0);

        // The slot is reused, but the old handle must not see the new occupant.
        let b = store.alloc(Node::new(2, None));
        assert_ne!(a, b);
        assert!(store.get(a).is_none());
        assert_eq!(store[b].key(), &2);
    }

    #[test]
    fn clear_invalidates_handles() {
        let mut store = NodeStore::new();
        let handles: Vec<_> = (0..4).map(|k| store.alloc(Node::new(k, None))).collect();

        store.clear();
        assert_eq!(store.len(), 0);
        assert!(handles.iter().all(|&h| store.get(h).is_none()));

        let fresh = store.alloc(Node::new(10, None));
        assert!(handles.iter().all(|&h| h != fresh));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn child_links() {
        let mut node = Node::new(5, None);
        let mut store = NodeStore::new();
        let child = store.alloc(Node::new(3, None));

        assert_eq!(node.set_left(Some(child)), None);
        assert_eq!(node.child(Dir::Left), Some(child));
        assert_eq!(node.child(!Dir::Left), None);
        assert_eq!(node.set_child(Dir::Left, None), Some(child));
        assert!(node.is_leaf());
    }
}
