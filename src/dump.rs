use crate::node::Node;
use std::fmt;

/// Node-by-node rendering of a tree, returned by [`BTree::dump`](crate::BTree::dump).
///
/// Each node is printed as a header line (`node n=<elements> c=<children>`) followed by its
/// children and elements in order, indented one level per depth.
pub struct Dump<'a, T> {
    root: Option<&'a Node<T>>,
    degree: usize,
}

impl<'a, T> Dump<'a, T> {
    pub(crate) fn new(root: Option<&'a Node<T>>, degree: usize) -> Self {
        Self { root, degree }
    }
}

impl<T: fmt::Debug> fmt::Display for Dump<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "btree degree={}", self.degree)?;
        match self.root {
            Some(root) => write_node(f, root, 0),
            None => writeln!(f, "(empty)"),
        }
    }
}

fn write_node<T: fmt::Debug>(f: &mut fmt::Formatter<'_>, node: &Node<T>, depth: usize) -> fmt::Result {
    let w = depth * 2;
    let c = node.kids.as_ref().map_or(0, |k| k.len());
    writeln!(f, "{:w$}node n={} c={}", "", node.len(), c)?;
    match &node.kids {
        None => {
            for e in node.elems.iter() {
                writeln!(f, "{:w$}  {:?}", "", e)?;
            }
        }
        Some(kids) => {
            for (i, kid) in kids.iter().enumerate() {
                write_node(f, kid, depth + 1)?;
                if let Some(e) = node.elems.get(i) {
                    writeln!(f, "{:w$}  {:?}", "", e)?;
                }
            }
        }
    }
    Ok(())
}
