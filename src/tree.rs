use crate::{
    alloc::{Heap, NodeAlloc},
    dump::Dump,
    error::{Error, Result},
    iter::{Cursor, Iter},
    node::{max_elems, max_kids, Node},
    remove::{remove, Target},
    DEFAULT_DEGREE, DEFAULT_DEPTH,
};
use std::{alloc::Layout, cmp::Ordering, fmt, mem};

/// B-tree of minimum degree `t`, ordered by the comparator `C`, with node memory from `A`.
///
/// Every node except the root holds between `t-1` and `2t-1` elements; internal nodes have one
/// more child than elements; all leaves are at the same depth.
///
/// General guide to implementation:
///
/// Nodes are held by value: the tree owns the root, and each internal node owns its children in a
/// fixed-capacity buffer. Insertion splits full nodes on the way down and deletion tops up
/// minimal nodes on the way down, so neither has to walk back up.
///
/// Elements comparing equal are allowed. A new element goes after the equal ones already present,
/// so iteration yields equal elements in insertion order. [`BTree::search`] and
/// [`BTree::delete`] act on the first equal element found on the way down from the root.
pub struct BTree<T, C = fn(&T, &T) -> Ordering, A: NodeAlloc = Heap> {
    root: Option<Node<T>>,
    degree: usize,
    len: usize,
    stamp: u64,
    cmp: C,
    alloc: A,
}

/// Check that nodes of degree `t` can be laid out.
fn check_degree<T>(degree: usize) -> Result<()> {
    let invalid = Error::InvalidDegree { degree };
    if degree < 2 || degree > isize::MAX as usize / 2 {
        return Err(invalid);
    }
    Layout::array::<T>(max_elems(degree)).map_err(|_| invalid.clone())?;
    Layout::array::<Node<T>>(max_kids(degree)).map_err(|_| invalid)?;
    Ok(())
}

impl<T, C> BTree<T, C, Heap>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Returns a new, empty tree with minimum degree `degree` (at least 2).
    pub fn new(degree: usize, cmp: C) -> Result<Self> {
        Self::with_allocator(degree, cmp, Heap)
    }
}

impl<T: Ord> BTree<T> {
    /// Returns a new, empty tree ordered by `T`'s [`Ord`] implementation.
    pub fn ordered(degree: usize) -> Result<Self> {
        Self::new(degree, <T as Ord>::cmp)
    }
}

impl<T: Ord> Default for BTree<T> {
    fn default() -> Self {
        Self {
            root: None,
            degree: DEFAULT_DEGREE,
            len: 0,
            stamp: 0,
            cmp: <T as Ord>::cmp,
            alloc: Heap,
        }
    }
}

impl<T, C, A: NodeAlloc> BTree<T, C, A> {
    /// Minimum degree `t`.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Size of one element in bytes.
    #[must_use]
    pub fn elem_size(&self) -> usize {
        mem::size_of::<T>()
    }

    /// Get number of elements in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the tree empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Edges from the root to any leaf. 0 for a single leaf or an empty tree.
    #[must_use]
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, Node::height)
    }

    /// Most elements a tree of the current height can hold, `(2t)^(height+1) - 1`.
    /// Saturates at `usize::MAX`.
    #[must_use]
    pub fn capacity(&self) -> usize {
        u32::try_from(self.height() + 1)
            .ok()
            .and_then(|exp| max_kids(self.degree).checked_pow(exp))
            .map_or(usize::MAX, |p| p - 1)
    }

    /// Smallest element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.root.as_ref().and_then(Node::first)
    }

    /// Largest element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.root.as_ref().and_then(Node::last)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            root.free(&self.alloc);
        }
        self.len = 0;
        self.stamp += 1;
    }

    /// Iterator over references to the elements, in order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_ref(), self.len, self.height())
    }

    /// Detached cursor positioned before the first element, see [`Cursor`].
    #[must_use]
    pub fn cursor(&self) -> Cursor<DEFAULT_DEPTH> {
        Cursor::new_from(self)
    }

    /// Printable rendering of the node structure.
    #[must_use]
    pub fn dump(&self) -> Dump<'_, T> {
        Dump::new(self.root.as_ref(), self.degree)
    }

    pub(crate) fn root(&self) -> Option<&Node<T>> {
        self.root.as_ref()
    }

    /// Changes whenever the tree's structure may have changed.
    pub(crate) fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Replace an empty root by its only child, or drop it if it is a leaf.
    fn shrink(&mut self) {
        if !self.root.as_ref().map_or(false, |r| r.elems.is_empty()) {
            return;
        }
        if let Some(mut old) = self.root.take() {
            let promoted = old.kids.as_mut().and_then(|k| k.pop());
            old.discard_shell(&self.alloc);
            self.root = promoted;
            tracing::trace!(height = self.height(), "root shrunk");
        }
    }

    /// Put a new root above the full one and split the old root.
    fn grow(&mut self) -> Result<()> {
        let t = self.degree;
        let internal = self.root.as_ref().map_or(false, |r| !r.is_leaf());
        let mut s = Node::new_node(t, true, &self.alloc)?;
        let z = match Node::new_node(t, internal, &self.alloc) {
            Ok(z) => z,
            Err(e) => {
                s.free(&self.alloc);
                return Err(e);
            }
        };
        if let Some(old) = self.root.take() {
            s.kids_mut().push(old);
        }
        s.split_child(0, t, z);
        self.root = Some(s);
        tracing::trace!(height = self.height(), "root split");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn check(&self)
    where
        C: Fn(&T, &T) -> Ordering,
    {
        match &self.root {
            Some(root) => {
                let mut leaf_depth = None;
                let count = root.check(self.degree, &self.cmp, 0, &mut leaf_depth, None, None);
                assert_eq!(count, self.len, "element count");
                assert_eq!(leaf_depth, Some(self.height()));
            }
            None => assert_eq!(self.len, 0, "element count of empty tree"),
        }
    }
}

impl<T, C, A> BTree<T, C, A>
where
    C: Fn(&T, &T) -> Ordering,
    A: NodeAlloc,
{
    /// Returns a new, empty tree whose node buffers come from `alloc`.
    pub fn with_allocator(degree: usize, cmp: C, alloc: A) -> Result<Self> {
        check_degree::<T>(degree)?;
        Ok(Self {
            root: None,
            degree,
            len: 0,
            stamp: 0,
            cmp,
            alloc,
        })
    }

    /// Insert an element. Elements equal to ones already present are kept, after them.
    ///
    /// If a node cannot be allocated the element is dropped and [`Error::Alloc`] returned;
    /// the tree still holds everything it held before.
    pub fn insert(&mut self, elem: T) -> Result<()> {
        let t = self.degree;
        if self.root.is_none() {
            self.root = Some(Node::new_leaf(t, &self.alloc)?);
        }
        if self.root.as_ref().map_or(false, |r| r.is_full(t)) {
            self.grow()?;
        }
        self.stamp += 1;
        let root = match self.root.as_mut() {
            Some(root) => root,
            None => unreachable!("root was just created"),
        };
        root.insert_nonfull(elem, t, &self.cmp, &self.alloc)?;
        self.len += 1;
        Ok(())
    }

    /// Get reference to an element equal to `key`.
    pub fn search(&self, key: &T) -> Option<&T> {
        self.root.as_ref()?.search(key, &self.cmp)
    }

    /// Does the tree hold an element equal to `key`?
    pub fn contains(&self, key: &T) -> bool {
        self.search(key).is_some()
    }

    /// Remove an element equal to `key`, returning it.
    pub fn delete(&mut self, key: &T) -> Option<T> {
        self.remove_target(Target::Key(key))
    }

    /// Remove the smallest element.
    pub fn pop_first(&mut self) -> Option<T> {
        self.remove_target(Target::Min)
    }

    /// Remove the largest element.
    pub fn pop_last(&mut self) -> Option<T> {
        self.remove_target(Target::Max)
    }

    /// Replace the element equal to `elem` by `elem`, returning the old one.
    /// If there is no such element `elem` is handed back unchanged.
    pub fn update(&mut self, elem: T) -> std::result::Result<T, T> {
        let slot = match self.root.as_mut() {
            Some(root) => root.search_mut(&elem, &self.cmp),
            None => None,
        };
        match slot {
            Some(slot) => Ok(mem::replace(slot, elem)),
            None => Err(elem),
        }
    }

    fn remove_target(&mut self, target: Target<'_, T>) -> Option<T> {
        let root = self.root.as_mut()?;
        self.stamp += 1;
        let result = remove(root, target, self.degree, &self.cmp, &self.alloc);
        if result.is_some() {
            self.len -= 1;
        }
        self.shrink();
        result
    }
}

impl<T, C, A: NodeAlloc> Drop for BTree<T, C, A> {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            root.free(&self.alloc);
        }
    }
}

impl<'a, T, C, A: NodeAlloc> IntoIterator for &'a BTree<T, C, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: fmt::Debug, C, A: NodeAlloc> fmt::Debug for BTree<T, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
use serde::{
    de::{SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize,
};

#[cfg(feature = "serde")]
impl<T, C, A> Serialize for BTree<T, C, A>
where
    T: Serialize,
    A: NodeAlloc,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for e in self {
            seq.serialize_element(e)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct BTreeVisitor<T> {
    marker: std::marker::PhantomData<fn() -> BTree<T>>,
}

#[cfg(feature = "serde")]
impl<'de, T> Visitor<'de> for BTreeVisitor<T>
where
    T: Deserialize<'de> + Ord,
{
    type Value = BTree<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of elements")
    }

    fn visit_seq<S>(self, mut access: S) -> std::result::Result<Self::Value, S::Error>
    where
        S: SeqAccess<'de>,
    {
        let mut tree = BTree::default();
        while let Some(e) = access.next_element()? {
            tree.insert(e).map_err(serde::de::Error::custom)?;
        }
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> Deserialize<'de> for BTree<T>
where
    T: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(BTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}
