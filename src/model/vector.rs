//! Persistent vector with structural sharing.
//!
//! A 32-way trie of reference-counted nodes plus a tail buffer. Every
//! modifying operation returns a new vector and copies only the path from
//! the root to the touched leaf; the untouched nodes are shared with the
//! previous version, so old snapshots stay valid and cheap to keep around.

use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

const BITS: usize = 5;
const WIDTH: usize = 1 << BITS;
const MASK: usize = WIDTH - 1;

enum Node<T> {
    Branch(Vec<Arc<Node<T>>>),
    Leaf(Vec<T>),
}

impl<T> Node<T> {
    fn children(&self) -> &[Arc<Node<T>>] {
        match self {
            Node::Branch(children) => children,
            Node::Leaf(_) => unreachable!("leaf found above the bottom level of the trie"),
        }
    }

    fn values(&self) -> &[T] {
        match self {
            Node::Leaf(values) => values,
            Node::Branch(_) => unreachable!("branch found at the bottom level of the trie"),
        }
    }
}

/// Immutable, structurally shared vector.
///
/// `clone` is O(1). `get`, `set` and `push_back` are O(log32 n);
/// `insert`, `remove` and `push_front` rebuild the vector and are O(n).
pub struct Vector<T> {
    len: usize,
    shift: usize,
    root: Arc<Node<T>>,
    tail: Arc<Vec<T>>,
}

impl<T> Clone for Vector<T> {
    fn clone(&self) -> Self {
        Self {
            len: self.len,
            shift: self.shift,
            root: Arc::clone(&self.root),
            tail: Arc::clone(&self.tail),
        }
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Vector<T> {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self {
            len: 0,
            shift: BITS,
            root: Arc::new(Node::Branch(Vec::new())),
            tail: Arc::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn tail_offset(&self) -> usize {
        if self.len < WIDTH {
            0
        } else {
            ((self.len - 1) >> BITS) << BITS
        }
    }

    /// Leaf slice holding `index` and the absolute index of its first element.
    fn chunk_for(&self, index: usize) -> (&[T], usize) {
        let offset = self.tail_offset();
        if index >= offset {
            return (self.tail.as_slice(), offset);
        }
        let mut node = &self.root;
        let mut level = self.shift;
        while level > 0 {
            node = &node.children()[(index >> level) & MASK];
            level -= BITS;
        }
        (node.values(), index & !MASK)
    }

    /// Element at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let (chunk, start) = self.chunk_for(index);
        chunk.get(index - start)
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            vector: self,
            front: 0,
            back: self.len,
            chunk: &[],
            chunk_start: 0,
        }
    }
}

impl<T: Clone> Vector<T> {
    /// New vector with `value` appended.
    pub fn push_back(&self, value: T) -> Self {
        if self.len - self.tail_offset() < WIDTH {
            let mut tail = Vec::with_capacity(self.tail.len() + 1);
            tail.extend(self.tail.iter().cloned());
            tail.push(value);
            return Self {
                len: self.len + 1,
                shift: self.shift,
                root: Arc::clone(&self.root),
                tail: Arc::new(tail),
            };
        }

        // Tail is full: push it into the trie and start a fresh one.
        let tail_node = Arc::new(Node::Leaf(self.tail.as_ref().clone()));
        let (root, shift) = if (self.len >> BITS) > (1 << self.shift) {
            let grown = Node::Branch(vec![
                Arc::clone(&self.root),
                new_path(self.shift, tail_node),
            ]);
            (Arc::new(grown), self.shift + BITS)
        } else {
            (
                Arc::new(self.push_tail(self.shift, &self.root, tail_node)),
                self.shift,
            )
        };

        Self {
            len: self.len + 1,
            shift,
            root,
            tail: Arc::new(vec![value]),
        }
    }

    fn push_tail(&self, level: usize, parent: &Node<T>, tail_node: Arc<Node<T>>) -> Node<T> {
        let subidx = ((self.len - 1) >> level) & MASK;
        let mut children = parent.children().to_vec();
        let inserted = if level == BITS {
            tail_node
        } else if let Some(child) = children.get(subidx) {
            Arc::new(self.push_tail(level - BITS, child, tail_node))
        } else {
            new_path(level - BITS, tail_node)
        };
        if subidx < children.len() {
            children[subidx] = inserted;
        } else {
            children.push(inserted);
        }
        Node::Branch(children)
    }

    /// New vector without the last element, or `None` when empty.
    pub fn pop_back(&self) -> Option<Self> {
        match self.len {
            0 => None,
            1 => Some(Self::new()),
            len if len - self.tail_offset() > 1 => {
                let mut tail = self.tail.as_ref().clone();
                tail.pop();
                Some(Self {
                    len: len - 1,
                    shift: self.shift,
                    root: Arc::clone(&self.root),
                    tail: Arc::new(tail),
                })
            }
            len => {
                let (chunk, _) = self.chunk_for(len - 2);
                let tail = Arc::new(chunk.to_vec());
                let mut shift = self.shift;
                let mut root = self
                    .pop_tail(self.shift, &self.root)
                    .map(Arc::new)
                    .unwrap_or_else(|| Arc::new(Node::Branch(Vec::new())));
                if shift > BITS && root.children().len() == 1 {
                    root = Arc::clone(&root.children()[0]);
                    shift -= BITS;
                }
                Some(Self {
                    len: len - 1,
                    shift,
                    root,
                    tail,
                })
            }
        }
    }

    fn pop_tail(&self, level: usize, node: &Node<T>) -> Option<Node<T>> {
        let subidx = ((self.len - 2) >> level) & MASK;
        let children = node.children();
        if level > BITS {
            let child = self.pop_tail(level - BITS, &children[subidx]);
            if child.is_none() && subidx == 0 {
                return None;
            }
            let mut copy = children[..subidx].to_vec();
            if let Some(child) = child {
                copy.push(Arc::new(child));
            }
            Some(Node::Branch(copy))
        } else if subidx == 0 {
            None
        } else {
            Some(Node::Branch(children[..subidx].to_vec()))
        }
    }

    /// New vector with the element at `index` replaced.
    ///
    /// # Panics
    /// Panics when `index` is out of range, like slice indexing.
    pub fn set(&self, index: usize, value: T) -> Self {
        match self.try_set(index, value) {
            Some(updated) => updated,
            None => panic!(
                "index out of range: the len is {} but the index is {}",
                self.len, index
            ),
        }
    }

    /// Like [`Vector::set`], returning `None` when `index` is out of range.
    pub fn try_set(&self, index: usize, value: T) -> Option<Self> {
        if index >= self.len {
            return None;
        }
        let offset = self.tail_offset();
        if index >= offset {
            let mut tail = self.tail.as_ref().clone();
            tail[index - offset] = value;
            return Some(Self {
                tail: Arc::new(tail),
                ..self.clone()
            });
        }
        Some(Self {
            root: Arc::new(assoc(self.shift, &self.root, index, value)),
            ..self.clone()
        })
    }

    /// New vector with `f` applied to the element at `index`.
    /// Out-of-range indices leave the vector unchanged.
    pub fn update(&self, index: usize, f: impl FnOnce(T) -> T) -> Self {
        match self.get(index) {
            Some(current) => self.set(index, f(current.clone())),
            None => self.clone(),
        }
    }

    /// New vector with `value` inserted before `index` (`index == len` appends).
    pub fn insert(&self, index: usize, value: T) -> Self {
        if index >= self.len {
            return self.push_back(value);
        }
        let mut value = Some(value);
        let mut out = Self::new();
        for (i, item) in self.iter().enumerate() {
            if i == index {
                if let Some(v) = value.take() {
                    out = out.push_back(v);
                }
            }
            out = out.push_back(item.clone());
        }
        out
    }

    pub fn push_front(&self, value: T) -> Self {
        self.insert(0, value)
    }

    /// New vector without the element at `index`. Out-of-range indices
    /// leave the vector unchanged.
    pub fn remove(&self, index: usize) -> Self {
        if index >= self.len {
            return self.clone();
        }
        if index + 1 == self.len {
            return self.pop_back().unwrap_or_default();
        }
        self.iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, item)| item.clone())
            .collect()
    }

    /// True when both vectors share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.len == other.len
            && Arc::ptr_eq(&self.root, &other.root)
            && Arc::ptr_eq(&self.tail, &other.tail)
    }
}

fn new_path<T>(level: usize, node: Arc<Node<T>>) -> Arc<Node<T>> {
    if level == 0 {
        return node;
    }
    Arc::new(Node::Branch(vec![new_path(level - BITS, node)]))
}

fn assoc<T: Clone>(level: usize, node: &Node<T>, index: usize, value: T) -> Node<T> {
    if level == 0 {
        let mut values = node.values().to_vec();
        values[index & MASK] = value;
        return Node::Leaf(values);
    }
    let subidx = (index >> level) & MASK;
    let mut children = node.children().to_vec();
    children[subidx] = Arc::new(assoc(level - BITS, &children[subidx], index, value));
    Node::Branch(children)
}

pub struct Iter<'a, T> {
    vector: &'a Vector<T>,
    front: usize,
    back: usize,
    chunk: &'a [T],
    chunk_start: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let index = self.front;
        if index < self.chunk_start || index >= self.chunk_start + self.chunk.len() {
            let (chunk, start) = self.vector.chunk_for(index);
            self.chunk = chunk;
            self.chunk_start = start;
        }
        self.front += 1;
        self.chunk.get(index - self.chunk_start)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Vector::new(), |acc, item| acc.push_back(item))
    }
}

impl<T: Clone> From<Vec<T>> for Vector<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: PartialEq> PartialEq for Vector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Vector<T> {}

impl<T: fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Serialize> Serialize for Vector<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Deserialize<'de> + Clone> Deserialize<'de> for Vector<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Vector::from)
    }
}
