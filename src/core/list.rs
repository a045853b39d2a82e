//! # Ordered List
//!
//! An arena-backed doubly-linked chain. Values live in slots owned by the list and
//! are addressed through generation-checked [`NodeId`] handles, so a handle that
//! outlives its node can never reach a different value that later reused the slot.
//!
//! Besides the plain deque-style operations (`push`, `shove`, `pop`, `pull`,
//! `remove`) the list supports comparator-driven placement through
//! [`OrderedList::insert_by`] and a full re-sort through [`OrderedList::resort_by`].
//! The record store keeps its records sorted by hash with exactly these two.
//!
//! ## Example
//! ```rust
//! use voxel_core::core::list::OrderedList;
//!
//! let mut list = OrderedList::new();
//! list.insert_sorted(30);
//! list.insert_sorted(10);
//! list.insert_sorted(20);
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
//! ```

use std::cmp::Ordering;

/// Where a comparator wants a new value placed relative to the node being visited.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Insert immediately before the visited node.
    Before,
    /// Keep walking; insert somewhere after the visited node.
    After,
    /// Refuse the insertion altogether.
    Reject,
}

/// Stable handle to a node inside an [`OrderedList`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<u32>,
    next: Option<u32>,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

/// A doubly-linked list whose nodes are stored in an internal arena.
#[derive(Debug)]
pub struct OrderedList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of linked values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when nothing is linked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle of the first node.
    pub fn head(&self) -> Option<NodeId> {
        self.head.map(|index| self.id_of(index))
    }

    /// Handle of the last node.
    pub fn tail(&self) -> Option<NodeId> {
        self.tail.map(|index| self.id_of(index))
    }

    /// Handle of the node following `id`.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.next.map(|index| self.id_of(index))
    }

    /// Handle of the node preceding `id`.
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.prev.map(|index| self.id_of(index))
    }

    /// Returns the value behind `id`, or `None` if the handle is stale.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|node| &node.value)
    }

    /// Mutable access to the value behind `id`.
    ///
    /// Changing a value's ordering key through this reference leaves the chain
    /// out of order until [`OrderedList::resort_by`] is called.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut().map(|node| &mut node.value)
    }

    /// Appends `value` at the tail.
    pub fn push(&mut self, value: T) -> NodeId {
        let index = self.allocate(value);
        self.link_tail(index);
        self.id_of(index)
    }

    /// Alias of [`OrderedList::push`].
    pub fn append(&mut self, value: T) -> NodeId {
        self.push(value)
    }

    /// Inserts `value` at the head.
    pub fn shove(&mut self, value: T) -> NodeId {
        let index = self.allocate(value);
        match self.head {
            Some(head) => self.link_before(index, head),
            None => self.link_tail(index),
        }
        self.id_of(index)
    }

    /// Unlinks the node behind `id` and returns its value.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.node(id)?;
        self.unlink(id.index);
        self.release(id.index)
    }

    /// Removes and returns the tail value.
    pub fn pop(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.unlink(tail);
        self.release(tail)
    }

    /// Removes and returns the head value.
    pub fn pull(&mut self) -> Option<T> {
        let head = self.head?;
        self.unlink(head);
        self.release(head)
    }

    /// Drops every value. Slots are kept so outstanding handles stay stale.
    pub fn clear(&mut self) {
        while self.pull().is_some() {}
    }

    /// Places `value` according to `cmp`.
    ///
    /// Walks from the head while `cmp(&value, current)` answers [`Placement::After`]
    /// and splices the value in front of the first node that answers
    /// [`Placement::Before`]. If every node answers `After` the value lands at the
    /// tail. A [`Placement::Reject`] anywhere aborts and hands the value back.
    pub fn insert_by<F>(&mut self, value: T, mut cmp: F) -> Result<NodeId, T>
    where
        F: FnMut(&T, &T) -> Placement,
    {
        let target = match self.find_slot(&value, &mut cmp) {
            Ok(target) => target,
            Err(()) => return Err(value),
        };
        let index = self.allocate(value);
        match target {
            Some(before) => self.link_before(index, before),
            None => self.link_tail(index),
        }
        Ok(self.id_of(index))
    }

    /// Re-links every node through the same walk as [`OrderedList::insert_by`].
    ///
    /// Handles stay valid. Values the comparator rejects are removed and returned
    /// in their previous chain order.
    pub fn resort_by<F>(&mut self, mut cmp: F) -> Vec<T>
    where
        F: FnMut(&T, &T) -> Placement,
    {
        let order: Vec<u32> = self.indices().collect();
        self.head = None;
        self.tail = None;
        self.len = 0;
        for &index in &order {
            if let Some(node) = self.slots[index as usize].node.as_mut() {
                node.prev = None;
                node.next = None;
            }
        }

        let mut rejected = Vec::new();
        for index in order {
            let placement = match self.slots[index as usize].node.as_ref() {
                Some(node) => self.find_slot(&node.value, &mut cmp),
                None => continue,
            };
            match placement {
                Ok(Some(before)) => self.link_before(index, before),
                Ok(None) => self.link_tail(index),
                Err(()) => {
                    if let Some(value) = self.release(index) {
                        rejected.push(value);
                    }
                }
            }
        }
        rejected
    }

    /// Iterates values from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Iterates node handles from head to tail.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.indices().map(|index| self.id_of(index))
    }

    fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let index = cursor?;
            cursor = self.slots[index as usize].node.as_ref().and_then(|n| n.next);
            Some(index)
        })
    }

    fn find_slot<F>(&self, value: &T, cmp: &mut F) -> Result<Option<u32>, ()>
    where
        F: FnMut(&T, &T) -> Placement,
    {
        for index in self.indices() {
            let Some(node) = self.slots[index as usize].node.as_ref() else {
                continue;
            };
            match cmp(value, &node.value) {
                Placement::After => {}
                Placement::Before => return Ok(Some(index)),
                Placement::Reject => return Err(()),
            }
        }
        Ok(None)
    }

    fn id_of(&self, index: u32) -> NodeId {
        NodeId {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node<T>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, index: u32) -> &mut Node<T> {
        match self.slots[index as usize].node.as_mut() {
            Some(node) => node,
            None => unreachable!("linked index {index} has no node"),
        }
    }

    fn allocate(&mut self, value: T) -> u32 {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                (self.slots.len() - 1) as u32
            }
        }
    }

    fn release(&mut self, index: u32) -> Option<T> {
        let node = self.slots[index as usize].node.take()?;
        self.free.push(index);
        Some(node.value)
    }

    fn link_tail(&mut self, index: u32) {
        let old_tail = self.tail;
        {
            let node = self.node_mut(index);
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail) => self.node_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
    }

    fn link_before(&mut self, index: u32, before: u32) {
        let prev = self.node_mut(before).prev;
        {
            let node = self.node_mut(index);
            node.prev = prev;
            node.next = Some(before);
        }
        self.node_mut(before).prev = Some(index);
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(index),
            None => self.head = Some(index),
        }
        self.len += 1;
    }

    fn unlink(&mut self, index: u32) {
        let (prev, next) = {
            let node = self.node_mut(index);
            let links = (node.prev, node.next);
            node.prev = None;
            node.next = None;
            links
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }
}

impl<T: Ord> OrderedList<T> {
    /// Inserts `value` in ascending order, after any equal values.
    pub fn insert_sorted(&mut self, value: T) -> NodeId {
        match self.insert_by(value, ascending) {
            Ok(id) => id,
            Err(_) => unreachable!("ascending order never rejects"),
        }
    }

    /// Restores ascending order after values were mutated in place.
    pub fn resort(&mut self) {
        self.resort_by(ascending);
    }
}

fn ascending<T: Ord>(new: &T, current: &T) -> Placement {
    match new.cmp(current) {
        Ordering::Less => Placement::Before,
        Ordering::Equal | Ordering::Greater => Placement::After,
    }
}

/// Head-to-tail iterator over an [`OrderedList`].
pub struct Iter<'a, T> {
    list: &'a OrderedList<T>,
    cursor: Option<u32>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let node = self.list.slots[index as usize].node.as_ref()?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(list: &OrderedList<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn push_shove_pop_pull() {
        let mut list = OrderedList::new();
        list.push(2);
        list.append(3);
        list.shove(1);
        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.pop(), Some(3));
        assert_eq!(list.pull(), Some(1));
        assert_eq!(list.pull(), Some(2));
        assert_eq!(list.pop(), None);
        assert_eq!(list.pull(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn removing_head_promotes_next() {
        let mut list = OrderedList::new();
        let a = list.push(1);
        let b = list.push(2);
        let c = list.push(3);

        assert_eq!(list.remove(a), Some(1));
        assert_eq!(list.head(), Some(b));
        assert_eq!(list.prev(b), None);
        assert_eq!(list.remove(c), Some(3));
        assert_eq!(list.tail(), Some(b));
        assert_eq!(list.next(b), None);
    }

    #[test]
    fn removed_node_is_unreachable() {
        let mut list = OrderedList::new();
        let ids: Vec<_> = (0..5).map(|v| list.push(v)).collect();
        list.remove(ids[2]);

        assert!(list.ids().all(|id| id != ids[2]));
        assert_eq!(list.next(ids[1]), Some(ids[3]));
        assert_eq!(list.prev(ids[3]), Some(ids[1]));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn stale_handle_does_not_reach_reused_slot() {
        let mut list = OrderedList::new();
        let old = list.push(10);
        list.remove(old);
        let new = list.push(20);

        assert_ne!(old, new);
        assert_eq!(list.get(old), None);
        assert_eq!(list.remove(old), None);
        assert_eq!(list.get(new), Some(&20));
    }

    #[test]
    fn insert_sorted_places_equal_values_after() {
        let mut list = OrderedList::new();
        for v in [5, 1, 4, 1, 3] {
            list.insert_sorted(v);
        }
        assert_eq!(values(&list), vec![1, 1, 3, 4, 5]);
    }

    #[test]
    fn insert_by_reject_leaves_list_untouched() {
        let mut list = OrderedList::new();
        list.push(1);
        list.push(2);
        let result = list.insert_by(2, |new, current| {
            if new == current {
                Placement::Reject
            } else {
                Placement::After
            }
        });
        assert_eq!(result, Err(2));
        assert_eq!(values(&list), vec![1, 2]);
    }

    #[test]
    fn resort_keeps_handles_and_returns_rejects() {
        let mut list = OrderedList::new();
        let a = list.push(3);
        let b = list.push(1);
        let c = list.push(2);

        *list.get_mut(a).unwrap() = 0;
        list.resort();
        assert_eq!(values(&list), vec![0, 1, 2]);
        assert_eq!(list.head(), Some(a));
        assert_eq!(list.tail(), Some(c));

        let rejected = list.resort_by(|new, current| {
            if *new == 1 {
                Placement::Reject
            } else if new < current {
                Placement::Before
            } else {
                Placement::After
            }
        });
        assert_eq!(rejected, vec![1]);
        assert_eq!(list.get(b), None);
        assert_eq!(values(&list), vec![0, 2]);
    }

    #[test]
    fn random_inserts_stay_sorted() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut list = OrderedList::new();
        for _ in 0..500 {
            list.insert_sorted(rng.i32(-100..100));
        }
        let v = values(&list);
        assert_eq!(v.len(), 500);
        assert!(v.windows(2).all(|w| w[0] <= w[1]));
    }
}
