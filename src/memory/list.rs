/*!
 * Index-Linked List
 * Doubly-linked list whose links live inside the node records
 */

/// Prev/next pair embedded in every node record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<I> {
    pub prev: Option<I>,
    pub next: Option<I>,
}

impl<I> Default for Link<I> {
    fn default() -> Self {
        Self {
            prev: None,
            next: None,
        }
    }
}

/// Storage that owns the links of the nodes a [`List`] threads through.
///
/// A node id without a record (`None`) plays the role of a null node: list
/// operations given such an id leave the list untouched.
pub trait LinkStore<I> {
    fn link(&self, id: I) -> Option<&Link<I>>;
    fn link_mut(&mut self, id: I) -> Option<&mut Link<I>>;
}

/// Plain slab of links, indexed by position
impl LinkStore<usize> for Vec<Link<usize>> {
    fn link(&self, id: usize) -> Option<&Link<usize>> {
        self.get(id)
    }

    fn link_mut(&mut self, id: usize) -> Option<&mut Link<usize>> {
        self.get_mut(id)
    }
}

/// Doubly-linked list of node ids.
///
/// The list only knows its ends and its length:
///
/// ```text
///   head                                   tail
///    |                                      |
/// +--v---+  next  +------+  next  +------+  |
/// | id 3 | -----> | id 0 | -----> | id 7 | <+
/// |      | <----- |      | <----- |      |
/// +------+  prev  +------+  prev  +------+
/// ```
///
/// Every operation takes the [`LinkStore`] holding the nodes, so one store can
/// back several lists while each node sits in at most one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List<I> {
    head: Option<I>,
    tail: Option<I>,
    len: usize,
}

impl<I> Default for List<I> {
    fn default() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }
}

impl<I: Copy + Eq> List<I> {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn head(&self) -> Option<I> {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> Option<I> {
        self.tail
    }

    /// Forget every member without touching the store
    pub(crate) fn reset(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub fn next_of<S: LinkStore<I> + ?Sized>(&self, store: &S, id: I) -> Option<I> {
        store.link(id).and_then(|l| l.next)
    }

    pub fn prev_of<S: LinkStore<I> + ?Sized>(&self, store: &S, id: I) -> Option<I> {
        store.link(id).and_then(|l| l.prev)
    }

    pub fn insert_head<S: LinkStore<I> + ?Sized>(&mut self, store: &mut S, id: I) -> bool {
        let old_head = self.head;
        match store.link_mut(id) {
            Some(link) => {
                link.prev = None;
                link.next = old_head;
            }
            None => return false,
        }

        match old_head.and_then(|h| store.link_mut(h)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }

        self.head = Some(id);
        self.len += 1;
        true
    }

    pub fn insert_tail<S: LinkStore<I> + ?Sized>(&mut self, store: &mut S, id: I) -> bool {
        let old_tail = self.tail;
        match store.link_mut(id) {
            Some(link) => {
                link.prev = old_tail;
                link.next = None;
            }
            None => return false,
        }

        match old_tail.and_then(|t| store.link_mut(t)) {
            Some(tail) => tail.next = Some(id),
            None => self.head = Some(id),
        }

        self.tail = Some(id);
        self.len += 1;
        true
    }

    pub fn remove_head<S: LinkStore<I> + ?Sized>(&mut self, store: &mut S) -> Option<I> {
        let id = self.head?;
        let next = store.link(id).and_then(|l| l.next);

        match next.and_then(|n| store.link_mut(n)) {
            Some(link) => link.prev = None,
            None => self.tail = None,
        }

        self.head = next;
        self.len -= 1;
        if let Some(link) = store.link_mut(id) {
            *link = Link::default();
        }
        Some(id)
    }

    pub fn remove_tail<S: LinkStore<I> + ?Sized>(&mut self, store: &mut S) -> Option<I> {
        let id = self.tail?;
        let prev = store.link(id).and_then(|l| l.prev);

        match prev.and_then(|p| store.link_mut(p)) {
            Some(link) => link.next = None,
            None => self.head = None,
        }

        self.tail = prev;
        self.len -= 1;
        if let Some(link) = store.link_mut(id) {
            *link = Link::default();
        }
        Some(id)
    }

    /// Identity scan from head
    pub fn search<S: LinkStore<I> + ?Sized>(&self, store: &S, id: I) -> Option<I> {
        self.iter(store).find(|&current| current == id)
    }

    #[inline]
    pub fn contains<S: LinkStore<I> + ?Sized>(&self, store: &S, id: I) -> bool {
        self.search(store, id).is_some()
    }

    /// Splice `id` right after `anchor`; fails when `anchor` is not a member
    pub fn insert_after<S: LinkStore<I> + ?Sized>(
        &mut self,
        store: &mut S,
        anchor: I,
        id: I,
    ) -> bool {
        if self.search(store, anchor).is_none() || store.link(id).is_none() {
            return false;
        }

        let next = store.link(anchor).and_then(|l| l.next);
        if let Some(link) = store.link_mut(id) {
            link.prev = Some(anchor);
            link.next = next;
        }
        if let Some(link) = store.link_mut(anchor) {
            link.next = Some(id);
        }

        match next.and_then(|n| store.link_mut(n)) {
            Some(link) => link.prev = Some(id),
            None => self.tail = Some(id),
        }

        self.len += 1;
        true
    }

    /// Unlink `id`; fails when it is not a member of this list
    pub fn remove_node<S: LinkStore<I> + ?Sized>(&mut self, store: &mut S, id: I) -> bool {
        if self.head == Some(id) {
            return self.remove_head(store).is_some();
        }
        if self.tail == Some(id) {
            return self.remove_tail(store).is_some();
        }

        // Interior node: membership must be confirmed before relinking neighbours
        if self.search(store, id).is_none() {
            return false;
        }

        let Some(&Link { prev, next }) = store.link(id) else {
            return false;
        };
        let (Some(prev), Some(next)) = (prev, next) else {
            return false;
        };

        if let Some(link) = store.link_mut(prev) {
            link.next = Some(next);
        }
        if let Some(link) = store.link_mut(next) {
            link.prev = Some(prev);
        }
        if let Some(link) = store.link_mut(id) {
            *link = Link::default();
        }

        self.len -= 1;
        true
    }

    pub fn iter<'a, S: LinkStore<I> + ?Sized>(&self, store: &'a S) -> Iter<'a, I, S> {
        Iter {
            store,
            current: self.head,
            remaining: self.len,
        }
    }
}

/// Front-to-back iterator over the ids of a [`List`]
pub struct Iter<'a, I, S: ?Sized> {
    store: &'a S,
    current: Option<I>,
    remaining: usize,
}

impl<'a, I: Copy, S: LinkStore<I> + ?Sized> Iterator for Iter<'a, I, S> {
    type Item = I;

    fn next(&mut self) -> Option<Self::Item> {
        // Bounded by the recorded length so a corrupted cycle cannot spin forever
        if self.remaining == 0 {
            return None;
        }
        let id = self.current?;
        self.current = self.store.link(id).and_then(|l| l.next);
        self.remaining -= 1;
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
