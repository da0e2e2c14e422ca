use crate::{
    alloc::NodeAlloc,
    error::Result,
    vecs::{safe_assert, FixedCapVec},
};
use std::{cmp::Ordering, mem};

/// Most elements a node of minimum degree `t` can hold.
pub(crate) const fn max_elems(t: usize) -> usize {
    2 * t - 1
}

/// Most children an internal node of minimum degree `t` can hold.
pub(crate) const fn max_kids(t: usize) -> usize {
    2 * t
}

/// A B-tree node. Leaf if `kids` is `None`.
///
/// Children are held by value in the parent's buffer, so a node exclusively owns its subtree.
/// Buffers are sized once, when the node is created, and freed by [`Node::free`].
pub(crate) struct Node<T> {
    pub(crate) elems: FixedCapVec<T>,
    pub(crate) kids: Option<FixedCapVec<Node<T>>>,
}

impl<T> Node<T> {
    pub(crate) fn new_leaf<A: NodeAlloc + ?Sized>(t: usize, alloc: &A) -> Result<Self> {
        Ok(Self {
            elems: FixedCapVec::new(max_elems(t), alloc)?,
            kids: None,
        })
    }

    /// Give a leaf an (empty) child buffer.
    pub(crate) fn make_internal<A: NodeAlloc + ?Sized>(&mut self, t: usize, alloc: &A) -> Result<()> {
        safe_assert!(self.kids.is_none());
        self.kids = Some(FixedCapVec::new(max_kids(t), alloc)?);
        Ok(())
    }

    /// Empty node, internal if `internal`. Nothing is leaked if the second buffer cannot be had.
    pub(crate) fn new_node<A: NodeAlloc + ?Sized>(
        t: usize,
        internal: bool,
        alloc: &A,
    ) -> Result<Self> {
        let mut node = Self::new_leaf(t, alloc)?;
        if internal {
            if let Err(e) = node.make_internal(t, alloc) {
                node.free(alloc);
                return Err(e);
            }
        }
        Ok(node)
    }

    /// Release this node and its whole subtree.
    pub(crate) fn free<A: NodeAlloc + ?Sized>(mut self, alloc: &A) {
        if let Some(mut kids) = self.kids.take() {
            while let Some(kid) = kids.pop() {
                kid.free(alloc);
            }
            kids.free(alloc);
        }
        self.elems.free(alloc);
    }

    /// Release a node whose elements and children have been moved elsewhere.
    pub(crate) fn discard_shell<A: NodeAlloc + ?Sized>(self, alloc: &A) {
        safe_assert!(self.elems.is_empty());
        safe_assert!(self.kids.as_ref().map_or(true, |k| k.is_empty()));
        self.free(alloc);
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.kids.is_none()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub(crate) fn is_full(&self, t: usize) -> bool {
        self.elems.len() >= max_elems(t)
    }

    pub(crate) fn kids(&self) -> &FixedCapVec<Node<T>> {
        match &self.kids {
            Some(kids) => kids,
            None => unreachable!("leaf node has no children"),
        }
    }

    pub(crate) fn kids_mut(&mut self) -> &mut FixedCapVec<Node<T>> {
        match &mut self.kids {
            Some(kids) => kids,
            None => unreachable!("leaf node has no children"),
        }
    }

    #[inline]
    pub(crate) fn kid(&self, i: usize) -> &Node<T> {
        self.kids().ix(i)
    }

    #[inline]
    pub(crate) fn kid_mut(&mut self, i: usize) -> &mut Node<T> {
        self.kids_mut().ixm(i)
    }

    /// Split the full child `i` using `z` (an empty node of the same kind) as its new right sibling.
    /// The child keeps the lower `t-1` elements, `z` takes the upper `t-1`, and the median moves
    /// up to `elems[i]`.
    pub(crate) fn split_child(&mut self, i: usize, t: usize, mut z: Node<T>) {
        let med = {
            let y = self.kid_mut(i);
            safe_assert!(y.len() == max_elems(t));
            z.elems.append_from(&mut y.elems, t);
            if let (Some(zk), Some(yk)) = (z.kids.as_mut(), y.kids.as_mut()) {
                zk.append_from(yk, t);
            }
            y.elems.remove(t - 1)
        };
        self.elems.insert(i, med);
        self.kids_mut().insert(i + 1, z);
    }

    /// Allocate the sibling, then split child `i`. On failure nothing has changed.
    pub(crate) fn split_child_alloc<A: NodeAlloc + ?Sized>(
        &mut self,
        i: usize,
        t: usize,
        alloc: &A,
    ) -> Result<()> {
        let z = Self::new_node(t, !self.kid(i).is_leaf(), alloc)?;
        self.split_child(i, t, z);
        Ok(())
    }

    /// Insert into the subtree rooted here. This node must not be full.
    ///
    /// Full children are split on the way down, so a promoted median always has room.
    pub(crate) fn insert_nonfull<C, A>(&mut self, elem: T, t: usize, cmp: &C, alloc: &A) -> Result<()>
    where
        C: Fn(&T, &T) -> Ordering,
        A: NodeAlloc + ?Sized,
    {
        let mut x = self;
        loop {
            let mut i = x.len();
            while i > 0 && cmp(&elem, x.elems.ix(i - 1)) == Ordering::Less {
                i -= 1;
            }
            if x.is_leaf() {
                x.elems.insert(i, elem);
                return Ok(());
            }
            if x.kid(i).is_full(t) {
                x.split_child_alloc(i, t, alloc)?;
                if cmp(&elem, x.elems.ix(i)) != Ordering::Less {
                    i += 1;
                }
            }
            x = x.kid_mut(i);
        }
    }

    /// `Ok(i)` if `elems[i]` is the first element equal to `key`, otherwise `Err(i)` where child `i`
    /// is the one that would hold it.
    pub(crate) fn locate<C>(&self, key: &T, cmp: &C) -> std::result::Result<usize, usize>
    where
        C: Fn(&T, &T) -> Ordering,
    {
        for (i, e) in self.elems.iter().enumerate() {
            match cmp(key, e) {
                Ordering::Greater => {}
                Ordering::Equal => return Ok(i),
                Ordering::Less => return Err(i),
            }
        }
        Err(self.len())
    }

    pub(crate) fn search<C>(&self, key: &T, cmp: &C) -> Option<&T>
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut x = self;
        loop {
            match x.locate(key, cmp) {
                Ok(i) => return Some(x.elems.ix(i)),
                Err(_) if x.is_leaf() => return None,
                Err(i) => x = x.kid(i),
            }
        }
    }

    pub(crate) fn search_mut<C>(&mut self, key: &T, cmp: &C) -> Option<&mut T>
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let mut x = self;
        loop {
            match x.locate(key, cmp) {
                Ok(i) => return Some(x.elems.ixm(i)),
                Err(_) if x.is_leaf() => return None,
                Err(i) => x = x.kid_mut(i),
            }
        }
    }

    pub(crate) fn first(&self) -> Option<&T> {
        let mut x = self;
        while let Some(kid) = x.kids.as_ref().and_then(|k| k.first()) {
            x = kid;
        }
        x.elems.first()
    }

    pub(crate) fn last(&self) -> Option<&T> {
        let mut x = self;
        while let Some(kid) = x.kids.as_ref().and_then(|k| k.last()) {
            x = kid;
        }
        x.elems.last()
    }

    /// Edges from this node down to a leaf.
    pub(crate) fn height(&self) -> usize {
        let mut h = 0;
        let mut x = self;
        while let Some(kid) = x.kids.as_ref().and_then(|k| k.first()) {
            x = kid;
            h += 1;
        }
        h
    }

    /// Borrow from the left: the last element of child `i` goes up to `elems[i]`, whose previous
    /// value goes down to the front of child `i+1` (along with child `i`'s last child).
    pub(crate) fn shift_right(&mut self, i: usize) {
        let Node { elems, kids } = self;
        let kids = match kids {
            Some(kids) => kids,
            None => unreachable!("rotation in a leaf"),
        };
        let (left, right) = kids.split_at_mut(i + 1);
        let (y, z) = (&mut left[i], &mut right[0]);
        let up = y.elems.remove(y.len() - 1);
        let down = mem::replace(elems.ixm(i), up);
        z.elems.insert(0, down);
        if let (Some(yk), Some(zk)) = (y.kids.as_mut(), z.kids.as_mut()) {
            let kid = yk.remove(yk.len() - 1);
            zk.insert(0, kid);
        }
    }

    /// Borrow from the right: the first element of child `i+1` goes up to `elems[i]`, whose
    /// previous value goes down to the end of child `i` (along with child `i+1`'s first child).
    pub(crate) fn shift_left(&mut self, i: usize) {
        let Node { elems, kids } = self;
        let kids = match kids {
            Some(kids) => kids,
            None => unreachable!("rotation in a leaf"),
        };
        let (left, right) = kids.split_at_mut(i + 1);
        let (y, z) = (&mut left[i], &mut right[0]);
        let up = z.elems.remove(0);
        let down = mem::replace(elems.ixm(i), up);
        y.elems.push(down);
        if let (Some(yk), Some(zk)) = (y.kids.as_mut(), z.kids.as_mut()) {
            let kid = zk.remove(0);
            yk.push(kid);
        }
    }

    /// Merge child `i+1` and `elems[i]` into child `i`. Child `i+1`'s contents move, its empty
    /// shell is released.
    pub(crate) fn merge_children<A: NodeAlloc + ?Sized>(&mut self, i: usize, alloc: &A) {
        let sep = self.elems.remove(i);
        let mut z = self.kids_mut().remove(i + 1);
        let y = self.kid_mut(i);
        y.elems.push(sep);
        y.elems.append_from(&mut z.elems, 0);
        if let (Some(yk), Some(zk)) = (y.kids.as_mut(), z.kids.as_mut()) {
            yk.append_from(zk, 0);
        }
        z.discard_shell(alloc);
    }

    /// Walk the subtree asserting every structural invariant, returns the element count.
    #[cfg(test)]
    pub(crate) fn check<C>(
        &self,
        t: usize,
        cmp: &C,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        lo: Option<&T>,
        hi: Option<&T>,
    ) -> usize
    where
        C: Fn(&T, &T) -> Ordering,
    {
        let n = self.len();
        assert!(n <= max_elems(t), "node holds {n} elements");
        if depth == 0 {
            assert!(n >= 1, "empty root");
        } else {
            assert!(n >= t - 1, "non-root node holds {n} elements");
        }
        for w in self.elems.windows(2) {
            assert!(cmp(&w[0], &w[1]) != Ordering::Greater, "elements out of order");
        }
        for e in self.elems.iter() {
            if let Some(lo) = lo {
                assert!(cmp(lo, e) != Ordering::Greater, "element below parent bound");
            }
            if let Some(hi) = hi {
                assert!(cmp(e, hi) != Ordering::Greater, "element above parent bound");
            }
        }
        match &self.kids {
            None => {
                match leaf_depth {
                    Some(d) => assert_eq!(*d, depth, "leaves at different depths"),
                    None => *leaf_depth = Some(depth),
                }
                n
            }
            Some(kids) => {
                assert_eq!(kids.len(), n + 1, "child count");
                let mut count = n;
                for (i, kid) in kids.iter().enumerate() {
                    let lo = if i == 0 { lo } else { Some(self.elems.ix(i - 1)) };
                    let hi = if i == n { hi } else { Some(self.elems.ix(i)) };
                    count += kid.check(t, cmp, depth + 1, leaf_depth, lo, hi);
                }
                count
            }
        }
    }
}
