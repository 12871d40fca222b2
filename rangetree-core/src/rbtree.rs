//! Self-balancing red-black tree on an index arena.
//!
//! Nodes live in a `Vec` and link to each other through `u32` slot
//! indices instead of pointers, with a free list of reclaimed slots so
//! heavy merge workloads reuse memory instead of growing the arena.
//! Dropping the tree releases every node at once.
//!
//! Insertion and removal walk down from the root recording ancestors on
//! an explicit stack (the tree keeps no parent links), then restructure
//! or recolor upward. The comparator is caller-supplied, and a return of
//! `Ordering::Equal` means "colliding key": `add` rejects the new item
//! and `remove`/`find` accept any item the probe collides with, which is
//! exactly what interval overlap queries need.

use std::cmp::Ordering;

const NIL: u32 = u32::MAX;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

#[derive(Debug)]
struct Node<T> {
    /// `None` only while the slot sits on the free list.
    item: Option<T>,
    left: u32,
    right: u32,
    color: Color,
}

/// A red-black tree over items of type `T`, ordered by a comparator
/// function.
///
/// The key of an item must be unique under the comparator: inserting an
/// item that compares `Equal` to an existing one hands the new item back
/// instead of inserting it.
#[derive(Debug)]
pub struct RbTree<T> {
    nodes: Vec<Node<T>>,
    free: Vec<u32>,
    root: u32,
    n: usize,
    compare: fn(&T, &T) -> Ordering,
    /// Ancestor stack reused across insert/remove calls.
    stack: Vec<u32>,
}

impl<T> RbTree<T> {
    /// Create an empty tree ordered by `compare`.
    pub fn new(compare: fn(&T, &T) -> Ordering) -> Self {
        RbTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NIL,
            n: 0,
            compare,
            stack: Vec::new(),
        }
    }

    /// Number of items in the tree.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Remove every item but keep the arena's capacity for reuse.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = NIL;
        self.n = 0;
    }

    #[inline]
    fn item(&self, idx: u32) -> &T {
        // linked nodes always carry an item; only free-list slots are empty
        self.nodes[idx as usize]
            .item
            .as_ref()
            .expect("free slot reached from tree")
    }

    #[inline]
    fn left(&self, idx: u32) -> u32 {
        self.nodes[idx as usize].left
    }

    #[inline]
    fn right(&self, idx: u32) -> u32 {
        self.nodes[idx as usize].right
    }

    #[inline]
    fn color(&self, idx: u32) -> Color {
        self.nodes[idx as usize].color
    }

    #[inline]
    fn set_color(&mut self, idx: u32, color: Color) {
        self.nodes[idx as usize].color = color;
    }

    fn alloc(&mut self, item: T, color: Color) -> u32 {
        match self.free.pop() {
            Some(idx) => {
                let node = &mut self.nodes[idx as usize];
                node.item = Some(item);
                node.left = NIL;
                node.right = NIL;
                node.color = color;
                idx
            }
            None => {
                let idx = self.nodes.len() as u32;
                self.nodes.push(Node {
                    item: Some(item),
                    left: NIL,
                    right: NIL,
                    color,
                });
                idx
            }
        }
    }

    /// Insert `item`, rebalancing as needed. Returns `None` on success;
    /// when an item with a colliding key is already present the tree is
    /// left untouched and the rejected item is handed back.
    pub fn add(&mut self, item: T) -> Option<T> {
        if self.root == NIL {
            let x = self.alloc(item, Color::Black);
            self.root = x;
            self.n += 1;
            return None;
        }

        // Walk down to the attachment point, recording ancestors.
        self.stack.clear();
        let mut p = self.root;
        let went_left;
        loop {
            self.stack.push(p);
            match (self.compare)(&item, self.item(p)) {
                Ordering::Less => {
                    let l = self.left(p);
                    if l == NIL {
                        went_left = true;
                        break;
                    }
                    p = l;
                }
                Ordering::Greater => {
                    let r = self.right(p);
                    if r == NIL {
                        went_left = false;
                        break;
                    }
                    p = r;
                }
                Ordering::Equal => return Some(item),
            }
        }
        // Leave only the ancestors strictly above the parent on the stack.
        self.stack.pop();

        let mut x = self.alloc(item, Color::Red);
        if went_left {
            self.nodes[p as usize].left = x;
        } else {
            self.nodes[p as usize].right = x;
        }
        self.n += 1;

        // Restructuring or recoloring is needed while x and its parent
        // are both red.
        while self.color(p) == Color::Red {
            let m = match self.stack.pop() {
                Some(m) => m,
                None => break,
            };
            let q = if p == self.left(m) {
                self.right(m)
            } else {
                self.left(m)
            };

            if q == NIL || self.color(q) == Color::Black {
                // Black uncle: one restructuring fixes the double red.
                let mid = self.restructure(m, p, x);
                self.set_color(mid, Color::Black);
                let l = self.left(mid);
                let r = self.right(mid);
                self.set_color(l, Color::Red);
                self.set_color(r, Color::Red);
                break;
            }

            // Red uncle: recolor and continue checking higher up.
            self.set_color(p, Color::Black);
            self.set_color(q, Color::Black);
            match self.stack.pop() {
                // m is the root; it stays black.
                None => break,
                Some(next_p) => {
                    self.set_color(m, Color::Red);
                    x = m;
                    p = next_p;
                }
            }
        }
        None
    }

    /// Find the item colliding with `probe` under the comparator.
    pub fn find(&self, probe: &T) -> Option<&T> {
        let mut p = self.root;
        while p != NIL {
            match (self.compare)(probe, self.item(p)) {
                Ordering::Less => p = self.left(p),
                Ordering::Greater => p = self.right(p),
                Ordering::Equal => return Some(self.item(p)),
            }
        }
        None
    }

    /// Remove and return the item colliding with `probe`, or `None` if
    /// nothing collides.
    pub fn remove(&mut self, probe: &T) -> Option<T> {
        if self.root == NIL {
            return None;
        }

        // Locate the node to delete, recording the path including it.
        self.stack.clear();
        let mut p = self.root;
        loop {
            self.stack.push(p);
            match (self.compare)(probe, self.item(p)) {
                Ordering::Less => p = self.left(p),
                Ordering::Greater => p = self.right(p),
                Ordering::Equal => break,
            }
            if p == NIL {
                return None;
            }
        }

        // r: the node replacing the removed one; x: the parent of the
        // removed position; y: its sibling. remove_col is the color that
        // left the tree.
        let r;
        let x;
        let y;
        let remove_col;

        if self.left(p) == NIL {
            self.stack.pop();
            let pr = self.right(p);
            match self.stack.pop() {
                None => {
                    r = pr;
                    self.root = pr;
                    x = NIL;
                    y = NIL;
                }
                Some(parent) => {
                    x = parent;
                    if p == self.left(parent) {
                        self.nodes[parent as usize].left = pr;
                        y = self.right(parent);
                    } else {
                        self.nodes[parent as usize].right = pr;
                        y = self.left(parent);
                    }
                    r = pr;
                }
            }
            remove_col = self.color(p);
        } else if self.right(p) == NIL {
            self.stack.pop();
            let pl = self.left(p);
            match self.stack.pop() {
                None => {
                    r = pl;
                    self.root = pl;
                    x = NIL;
                    y = NIL;
                }
                Some(parent) => {
                    x = parent;
                    if p == self.left(parent) {
                        self.nodes[parent as usize].left = pl;
                        y = self.right(parent);
                    } else {
                        self.nodes[parent as usize].right = pl;
                        y = self.left(parent);
                    }
                    r = pl;
                }
            }
            remove_col = self.color(p);
        } else {
            // Both children: the minimum of the right subtree, m, takes
            // p's place.
            let i = self.stack.len() - 1;
            let mut m = self.right(p);
            loop {
                self.stack.push(m);
                let l = self.left(m);
                if l == NIL {
                    break;
                }
                m = l;
            }
            self.stack.pop();

            if i == 0 {
                self.root = m;
            } else {
                let parent = self.stack[i - 1];
                if p == self.left(parent) {
                    self.nodes[parent as usize].left = m;
                } else {
                    self.nodes[parent as usize].right = m;
                }
            }

            // m replaces p on the stack, then takes over p's children.
            self.stack[i] = m;
            x = match self.stack.pop() {
                Some(v) => v,
                None => NIL,
            };
            r = self.right(m);
            if self.stack.len() != i {
                // x is m's parent inside the right subtree.
                y = self.right(x);
                self.nodes[x as usize].left = r;
                let pr = self.right(p);
                self.nodes[m as usize].right = pr;
            } else {
                // m was p's right child; x is m itself.
                y = self.left(p);
            }
            let pl = self.left(p);
            self.nodes[m as usize].left = pl;

            remove_col = self.color(m);
            let pc = self.color(p);
            self.set_color(m, pc);
        }

        // Reclaim p's slot.
        let item = self.nodes[p as usize].item.take();
        self.free.push(p);
        self.n -= 1;

        if remove_col == Color::Black {
            if r != NIL && self.color(r) == Color::Red {
                // A red node replaced the deleted black node: recolor it.
                self.set_color(r, Color::Black);
            } else if x != NIL {
                self.remove_fixup(x, y);
            }
        }
        item
    }

    /// Resolve the double-black problem left by removing a black node.
    /// x is the parent of the short path and y its sibling; the stack
    /// holds the ancestors of x.
    fn remove_fixup(&mut self, mut x: u32, mut y: u32) {
        loop {
            if self.color(y) == Color::Black {
                let z = self.red_child(y);
                if z != NIL {
                    // Case 1: sibling is black with a red child.
                    let b = self.restructure(x, y, z);
                    let xc = self.color(x);
                    self.set_color(b, xc);
                    let l = self.left(b);
                    let rr = self.right(b);
                    self.set_color(l, Color::Black);
                    self.set_color(rr, Color::Black);
                    break;
                }
                // Case 2: sibling black with black children; recolor it.
                self.set_color(y, Color::Red);
                if self.color(x) == Color::Red {
                    self.set_color(x, Color::Black);
                    break;
                }
                match self.stack.pop() {
                    // Root level reached.
                    None => break,
                    Some(parent) => {
                        let short = x;
                        x = parent;
                        y = if self.left(x) == short {
                            self.right(x)
                        } else {
                            self.left(x)
                        };
                    }
                }
            } else {
                // Case 3: sibling is red. Rotate it above x, after which
                // the new sibling is black and case 1 or 2 applies
                // without the double black reappearing.
                let (new_y, z) = if self.left(x) == y {
                    (self.right(y), self.left(y))
                } else {
                    (self.left(y), self.right(y))
                };
                self.restructure(x, y, z);
                self.set_color(y, Color::Black);
                self.set_color(x, Color::Red);
                // y is now the parent of x.
                self.stack.push(y);

                y = new_y;
                let z = self.red_child(y);
                if z != NIL {
                    let b = self.restructure(x, y, z);
                    // x was red.
                    self.set_color(b, Color::Red);
                    let l = self.left(b);
                    let rr = self.right(b);
                    self.set_color(l, Color::Black);
                    self.set_color(rr, Color::Black);
                } else {
                    self.set_color(y, Color::Red);
                    self.set_color(x, Color::Black);
                }
                break;
            }
        }
    }

    /// First red child of `y` (left checked first), NIL if neither is red.
    #[inline]
    fn red_child(&self, y: u32) -> u32 {
        let l = self.left(y);
        if l != NIL && self.color(l) == Color::Red {
            return l;
        }
        let r = self.right(y);
        if r != NIL && self.color(r) == Color::Red {
            return r;
        }
        NIL
    }

    /// General restructuring: rotate the grandparent/parent/child triple
    /// (x, y, z) so their in-order middle takes x's place in the tree.
    /// The stack top must be x's parent. Returns the middle node.
    fn restructure(&mut self, x: u32, y: u32, z: u32) -> u32 {
        let mid;
        if y == self.left(x) {
            if z == self.left(y) {
                // in-order: z, y, x
                mid = y;
                let yr = self.right(y);
                self.nodes[x as usize].left = yr;
                self.nodes[y as usize].right = x;
            } else {
                // in-order: y, z, x
                mid = z;
                let zl = self.left(z);
                let zr = self.right(z);
                self.nodes[y as usize].right = zl;
                self.nodes[z as usize].left = y;
                self.nodes[x as usize].left = zr;
                self.nodes[z as usize].right = x;
            }
        } else if z == self.left(y) {
            // in-order: x, z, y
            mid = z;
            let zl = self.left(z);
            let zr = self.right(z);
            self.nodes[x as usize].right = zl;
            self.nodes[z as usize].left = x;
            self.nodes[y as usize].left = zr;
            self.nodes[z as usize].right = y;
        } else {
            // in-order: x, y, z
            mid = y;
            let yl = self.left(y);
            self.nodes[x as usize].right = yl;
            self.nodes[y as usize].left = x;
            self.nodes[y as usize].right = z;
        }

        match self.stack.last() {
            Some(&parent) => {
                if x == self.left(parent) {
                    self.nodes[parent as usize].left = mid;
                } else {
                    self.nodes[parent as usize].right = mid;
                }
            }
            None => self.root = mid,
        }
        mid
    }

    /// Apply `visit` to every item in key order.
    pub fn traverse<'a, F: FnMut(&'a T)>(&'a self, mut visit: F) {
        self.traverse_node(self.root, &mut visit);
    }

    fn traverse_node<'a, F: FnMut(&'a T)>(&'a self, idx: u32, visit: &mut F) {
        if idx == NIL {
            return;
        }
        self.traverse_node(self.left(idx), visit);
        if let Some(item) = self.nodes[idx as usize].item.as_ref() {
            visit(item);
        }
        self.traverse_node(self.right(idx), visit);
    }

    /// Apply `visit`, in key order, to every item t with
    /// `min <= t <= max` under the comparator. Subtrees that cannot
    /// contain such items are pruned.
    pub fn traverse_range<'a, F: FnMut(&'a T)>(&'a self, min: &T, max: &T, mut visit: F) {
        self.traverse_range_node(self.root, min, max, &mut visit);
    }

    fn traverse_range_node<'a, F: FnMut(&'a T)>(&'a self, idx: u32, min: &T, max: &T, visit: &mut F) {
        if idx == NIL {
            return;
        }
        let min_cmp = (self.compare)(self.item(idx), min);
        let max_cmp = (self.compare)(self.item(idx), max);
        if min_cmp != Ordering::Less {
            self.traverse_range_node(self.left(idx), min, max, visit);
        }
        if min_cmp != Ordering::Less && max_cmp != Ordering::Greater {
            visit(self.item(idx));
        }
        if max_cmp != Ordering::Greater {
            self.traverse_range_node(self.right(idx), min, max, visit);
        }
    }

    /// Lazy in-order iterator over the items.
    pub fn iter(&self) -> InOrder<'_, T> {
        let mut stack = Vec::new();
        let mut cur = self.root;
        while cur != NIL {
            stack.push(cur);
            cur = self.left(cur);
        }
        InOrder { tree: self, stack }
    }
}

/// In-order iterator with an explicit descent stack.
pub struct InOrder<'a, T> {
    tree: &'a RbTree<T>,
    stack: Vec<u32>,
}

impl<'a, T> Iterator for InOrder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let idx = self.stack.pop()?;
        let mut cur = self.tree.right(idx);
        while cur != NIL {
            self.stack.push(cur);
            cur = self.tree.left(cur);
        }
        self.tree.nodes[idx as usize].item.as_ref()
    }
}
