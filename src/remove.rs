//! Top-down deletion.
//!
//! Before descending into a child the child is given at least `t` elements (by borrowing from a
//! sibling or by merging with one), so removing an element from a leaf never leaves it
//! under-full and nothing has to be repaired on the way back up.

use crate::{alloc::NodeAlloc, node::Node};
use std::{cmp::Ordering, mem};

/// What to remove from a subtree.
pub(crate) enum Target<'k, T> {
    /// The first element equal to the key met on the way down.
    Key(&'k T),
    /// The smallest element.
    Min,
    /// The largest element.
    Max,
}

impl<T> Clone for Target<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Target<'_, T> {}

impl<T> Node<T> {
    fn find<C>(&self, target: Target<'_, T>, cmp: &C) -> Result<usize, usize>
    where
        C: Fn(&T, &T) -> Ordering,
    {
        match target {
            Target::Key(key) => self.locate(key, cmp),
            _ if self.elems.is_empty() => Err(0),
            Target::Min if self.is_leaf() => Ok(0),
            Target::Min => Err(0),
            Target::Max if self.is_leaf() => Ok(self.len() - 1),
            Target::Max => Err(self.len()),
        }
    }

    /// Make sure child `i` has at least `t` elements, preferring the left sibling.
    /// Returns the index of the child that now covers the same key range.
    fn fill_child<A: NodeAlloc + ?Sized>(&mut self, i: usize, t: usize, alloc: &A) -> usize {
        if self.kid(i).len() >= t {
            return i;
        }
        let n = self.len();
        if i > 0 && self.kid(i - 1).len() >= t {
            tracing::trace!(child = i, "borrow from left sibling");
            self.shift_right(i - 1);
            i
        } else if i < n && self.kid(i + 1).len() >= t {
            tracing::trace!(child = i, "borrow from right sibling");
            self.shift_left(i);
            i
        } else if i > 0 {
            tracing::trace!(child = i, "merge with left sibling");
            self.merge_children(i - 1, alloc);
            i - 1
        } else if i < n {
            tracing::trace!(child = i, "merge with right sibling");
            self.merge_children(i, alloc);
            i
        } else {
            unreachable!("child {i} of a node with {n} elements has no sibling to merge with")
        }
    }
}

/// Remove `target` from the subtree rooted at `node`.
///
/// `node` may be left with no elements only if it is the root; the caller shrinks the tree then.
pub(crate) fn remove<T, C, A>(
    node: &mut Node<T>,
    target: Target<'_, T>,
    t: usize,
    cmp: &C,
    alloc: &A,
) -> Option<T>
where
    C: Fn(&T, &T) -> Ordering,
    A: NodeAlloc + ?Sized,
{
    let mut x = node;
    loop {
        match x.find(target, cmp) {
            Ok(i) if x.is_leaf() => return Some(x.elems.remove(i)),
            Ok(i) => {
                if x.kid(i).len() >= t {
                    let pred = take(x.kid_mut(i), Target::Max, t, cmp, alloc);
                    return Some(mem::replace(x.elems.ixm(i), pred));
                }
                if x.kid(i + 1).len() >= t {
                    let succ = take(x.kid_mut(i + 1), Target::Min, t, cmp, alloc);
                    return Some(mem::replace(x.elems.ixm(i), succ));
                }
                x.merge_children(i, alloc);
                x = x.kid_mut(i);
            }
            Err(_) if x.is_leaf() => return None,
            Err(i) => {
                let i = x.fill_child(i, t, alloc);
                x = x.kid_mut(i);
            }
        }
    }
}

/// Remove the minimum or maximum of a subtree that is known to hold at least `t` elements.
fn take<T, C, A>(node: &mut Node<T>, target: Target<'_, T>, t: usize, cmp: &C, alloc: &A) -> T
where
    C: Fn(&T, &T) -> Ordering,
    A: NodeAlloc + ?Sized,
{
    match remove(node, target, t, cmp, alloc) {
        Some(e) => e,
        None => unreachable!("non-empty subtree yielded no extreme element"),
    }
}
