//! In-order traversal with an explicit stack of (node, position) frames.
//!
//! On an internal node of `n` elements the position interleaves children and elements:
//! `2k` means child `k` is next, `2k + 1` means element `k` is next, and `2n + 1` means the node
//! is finished. On a leaf the position is just the index of the next element.

use crate::{
    alloc::NodeAlloc,
    error::{Error, Result},
    node::Node,
    tree::BTree,
};
use std::iter::FusedIterator;

// Vector types.
type StkVec<T, const D: usize> = arrayvec::ArrayVec<T, D>;

/// Iterator returned by [`BTree::iter`].
///
/// The tree cannot change while it is borrowed, so the stack is sized from its height once.
pub struct Iter<'a, T> {
    len: usize,
    stk: Vec<(&'a Node<T>, usize)>,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            len: self.len,
            stk: self.stk.clone(),
        }
    }
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(root: Option<&'a Node<T>>, len: usize, height: usize) -> Self {
        let mut stk = Vec::with_capacity(height + 1);
        if let Some(root) = root {
            stk.push((root, 0));
        }
        Self { len, stk }
    }

    fn pop(&mut self) {
        self.stk.pop();
        if let Some((_, pos)) = self.stk.last_mut() {
            *pos += 1;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, pos) = self.stk.last_mut()?;
            let node: &'a Node<T> = *node;
            match &node.kids {
                None => {
                    if *pos < node.len() {
                        *pos += 1;
                        self.len -= 1;
                        return Some(node.elems.ix(*pos - 1));
                    }
                    self.pop();
                }
                Some(kids) => {
                    if *pos > 2 * node.len() {
                        self.pop();
                    } else if *pos % 2 == 0 {
                        let kid = kids.ix(*pos / 2);
                        self.stk.push((kid, 0));
                    } else {
                        let e = node.elems.ix(*pos / 2);
                        *pos += 1;
                        self.len -= 1;
                        return Some(e);
                    }
                }
            }
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}
impl<'a, T> ExactSizeIterator for Iter<'a, T> {
    fn len(&self) -> usize {
        self.len
    }
}
impl<'a, T> FusedIterator for Iter<'a, T> {}

#[derive(Clone, Copy, Debug)]
struct Frame {
    /// Index of this node in its parent's children (0 for the root).
    slot: usize,
    pos: usize,
}

/// In-order cursor that does not borrow the tree.
///
/// Frames record child indices rather than references, so the tree may be modified while a
/// cursor exists. After any modification [`Cursor::advance`] reports [`Error::StaleCursor`]
/// until [`Cursor::reset`] is called. At most `D` frames are kept: a tree of height `h` needs
/// `h + 1`, and [`Error::DepthExceeded`] is returned for taller trees.
///
/// ```
/// use ordered_btree::{BTree, Cursor};
/// let mut tree = BTree::ordered(2).unwrap();
/// for i in 0..10 {
///     tree.insert(i).unwrap();
/// }
/// let mut c: Cursor = Cursor::new_from(&tree);
/// assert_eq!(c.advance(&tree), Ok(Some(&0)));
/// tree.delete(&0);
/// assert!(c.advance(&tree).is_err());
/// c.reset(&tree);
/// assert_eq!(c.advance(&tree), Ok(Some(&1)));
/// ```
#[derive(Clone, Debug)]
pub struct Cursor<const D: usize = { crate::DEFAULT_DEPTH }> {
    stk: StkVec<Frame, D>,
    stamp: u64,
}

impl<const D: usize> Cursor<D> {
    /// This should produce a compile-time error if D is zero.
    const CHECK_D: () = assert!(D > 0);

    /// Cursor positioned before the first element of `tree`.
    #[must_use]
    pub fn new_from<T, C, A: NodeAlloc>(tree: &BTree<T, C, A>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CHECK_D;
        let mut c = Self {
            stk: StkVec::new(),
            stamp: 0,
        };
        c.reset(tree);
        c
    }

    /// Go back to the start of `tree`. Required after `tree` has been modified.
    pub fn reset<T, C, A: NodeAlloc>(&mut self, tree: &BTree<T, C, A>) {
        self.stk.clear();
        self.stamp = tree.stamp();
        if tree.root().is_some() {
            self.stk.push(Frame { slot: 0, pos: 0 });
        }
    }

    /// Number of frames currently on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stk.len()
    }

    /// Next element in order, `Ok(None)` once the walk is exhausted (and on every later call).
    pub fn advance<'a, T, C, A: NodeAlloc>(
        &mut self,
        tree: &'a BTree<T, C, A>,
    ) -> Result<Option<&'a T>> {
        if self.stamp != tree.stamp() {
            return Err(Error::StaleCursor);
        }
        loop {
            let Some(top) = self.stk.last().copied() else {
                return Ok(None);
            };
            let node = self.resolve(tree)?;
            match &node.kids {
                None if top.pos < node.len() => {
                    self.bump();
                    return Ok(Some(node.elems.ix(top.pos)));
                }
                None => self.pop(),
                Some(_) if top.pos > 2 * node.len() => self.pop(),
                Some(_) if top.pos % 2 == 0 => {
                    let frame = Frame {
                        slot: top.pos / 2,
                        pos: 0,
                    };
                    if self.stk.try_push(frame).is_err() {
                        tracing::warn!(limit = D, "cursor frame stack exhausted");
                        return Err(Error::DepthExceeded { limit: D });
                    }
                }
                Some(_) => {
                    self.bump();
                    return Ok(Some(node.elems.ix(top.pos / 2)));
                }
            }
        }
    }

    /// Node addressed by the top frame.
    fn resolve<'a, T, C, A: NodeAlloc>(&self, tree: &'a BTree<T, C, A>) -> Result<&'a Node<T>> {
        let mut node = tree.root().ok_or(Error::StaleCursor)?;
        for f in self.stk.iter().skip(1) {
            node = node
                .kids
                .as_ref()
                .and_then(|k| k.get(f.slot))
                .ok_or(Error::StaleCursor)?;
        }
        Ok(node)
    }

    fn bump(&mut self) {
        if let Some(top) = self.stk.last_mut() {
            top.pos += 1;
        }
    }

    fn pop(&mut self) {
        self.stk.pop();
        self.bump();
    }
}
