//! Index-based intrusive doubly-linked list
//!
//! The list never owns its nodes. Each node is a [`Link`] embedded in a record
//! that lives somewhere else (a pool slot, a control block) and is named by a
//! [`NodeId`]. The list only relinks those fields, reaching them through the
//! [`LinkAccess`] trait, so insertion next to any node and removal of any node
//! are O(1) and never scan the list.
//!
//! A node is either [`Link::Detached`] or a member of exactly one list. The
//! detached state is an explicit variant rather than a pair of null
//! references, which is what lets a second removal of the same node be
//! detected instead of corrupting its former neighbours.

use core::fmt;

/// Index of a node in the storage reached through [`LinkAccess`]
pub type NodeId = u16;

/// Link fields embedded in a list node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Link {
    /// Not a member of any list
    #[default]
    Detached,
    /// Member of a list, with its neighbours
    Linked {
        prev: Option<NodeId>,
        next: Option<NodeId>,
    },
}

impl Link {
    /// Check if the node is a member of a list
    pub const fn is_linked(&self) -> bool {
        matches!(self, Link::Linked { .. })
    }

    /// Previous node, `None` at the head or when detached
    pub const fn prev(&self) -> Option<NodeId> {
        match self {
            Link::Linked { prev, .. } => *prev,
            Link::Detached => None,
        }
    }

    /// Next node, `None` at the tail or when detached
    pub const fn next(&self) -> Option<NodeId> {
        match self {
            Link::Linked { next, .. } => *next,
            Link::Detached => None,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Link {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Link::Detached => defmt::write!(fmt, "Detached"),
            Link::Linked { prev, next } => defmt::write!(fmt, "Linked({}, {})", prev, next),
        }
    }
}

/// Misuse of a list operation, detected before any link is modified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    /// The node to insert is already a member of a list
    AlreadyLinked,
    /// The anchor of an insertion is not a member of a list
    AnchorDetached,
    /// The node to remove is not a member of a list
    Detached,
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::AlreadyLinked => write!(f, "node is already linked"),
            ListError::AnchorDetached => write!(f, "anchor node is detached"),
            ListError::Detached => write!(f, "node is detached"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ListError {}

#[cfg(feature = "defmt")]
impl defmt::Format for ListError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ListError::AlreadyLinked => defmt::write!(fmt, "AlreadyLinked"),
            ListError::AnchorDetached => defmt::write!(fmt, "AnchorDetached"),
            ListError::Detached => defmt::write!(fmt, "Detached"),
        }
    }
}

/// Access to the link fields of caller-owned nodes
///
/// Implementations may panic on an out-of-range `node`; the list only passes
/// ids it was given or found in other links.
pub trait LinkAccess {
    /// Read the link of `node`
    fn link(&self, node: NodeId) -> Link;

    /// Overwrite the link of `node`
    fn set_link(&mut self, node: NodeId, link: Link);
}

impl LinkAccess for [Link] {
    fn link(&self, node: NodeId) -> Link {
        self[node as usize]
    }

    fn set_link(&mut self, node: NodeId, link: Link) {
        self[node as usize] = link;
    }
}

/// Head of an intrusive list
///
/// `head` is `None` exactly when the list is empty. Walking forward from
/// `head` and backward from `tail` visit the same `len` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct List {
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl List {
    /// Create an empty list
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// First node
    pub const fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Last node
    pub const fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    /// Number of linked nodes
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the list is empty
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Link `node` immediately before `anchor`, or at the tail when `anchor`
    /// is `None`
    pub fn insert_before<L>(
        &mut self,
        links: &mut L,
        anchor: Option<NodeId>,
        node: NodeId,
    ) -> Result<(), ListError>
    where
        L: LinkAccess + ?Sized,
    {
        if links.link(node).is_linked() {
            return Err(ListError::AlreadyLinked);
        }

        match anchor {
            None => {
                let prev = self.tail;
                links.set_link(node, Link::Linked { prev, next: None });
                match prev {
                    Some(prev) => set_next(links, prev, Some(node)),
                    None => self.head = Some(node),
                }
                self.tail = Some(node);
            }
            Some(anchor) => {
                let Link::Linked { prev, .. } = links.link(anchor) else {
                    return Err(ListError::AnchorDetached);
                };
                links.set_link(
                    node,
                    Link::Linked {
                        prev,
                        next: Some(anchor),
                    },
                );
                set_prev(links, anchor, Some(node));
                match prev {
                    Some(prev) => set_next(links, prev, Some(node)),
                    None => {
                        debug_assert_eq!(self.head, Some(anchor), "anchor is not in this list");
                        self.head = Some(node);
                    }
                }
            }
        }

        self.len += 1;
        Ok(())
    }

    /// Link `node` immediately after `anchor`, or at the head when `anchor`
    /// is `None`
    pub fn insert_after<L>(
        &mut self,
        links: &mut L,
        anchor: Option<NodeId>,
        node: NodeId,
    ) -> Result<(), ListError>
    where
        L: LinkAccess + ?Sized,
    {
        if links.link(node).is_linked() {
            return Err(ListError::AlreadyLinked);
        }

        match anchor {
            None => {
                let next = self.head;
                links.set_link(node, Link::Linked { prev: None, next });
                match next {
                    Some(next) => set_prev(links, next, Some(node)),
                    None => self.tail = Some(node),
                }
                self.head = Some(node);
            }
            Some(anchor) => {
                let Link::Linked { next, .. } = links.link(anchor) else {
                    return Err(ListError::AnchorDetached);
                };
                links.set_link(
                    node,
                    Link::Linked {
                        prev: Some(anchor),
                        next,
                    },
                );
                set_next(links, anchor, Some(node));
                match next {
                    Some(next) => set_prev(links, next, Some(node)),
                    None => {
                        debug_assert_eq!(self.tail, Some(anchor), "anchor is not in this list");
                        self.tail = Some(node);
                    }
                }
            }
        }

        self.len += 1;
        Ok(())
    }

    /// Link `node` at the head
    pub fn prepend<L>(&mut self, links: &mut L, node: NodeId) -> Result<(), ListError>
    where
        L: LinkAccess + ?Sized,
    {
        self.insert_after(links, None, node)
    }

    /// Link `node` at the tail
    pub fn append<L>(&mut self, links: &mut L, node: NodeId) -> Result<(), ListError>
    where
        L: LinkAccess + ?Sized,
    {
        self.insert_before(links, None, node)
    }

    /// Unlink `node` from this list and mark it detached
    ///
    /// `node` must be a member of this list. Removing a detached node returns
    /// [`ListError::Detached`] and leaves everything untouched.
    pub fn remove<L>(&mut self, links: &mut L, node: NodeId) -> Result<(), ListError>
    where
        L: LinkAccess + ?Sized,
    {
        let Link::Linked { prev, next } = links.link(node) else {
            return Err(ListError::Detached);
        };

        match prev {
            Some(prev) => set_next(links, prev, next),
            None => {
                debug_assert_eq!(self.head, Some(node), "node is not in this list");
                self.head = next;
            }
        }
        match next {
            Some(next) => set_prev(links, next, prev),
            None => {
                debug_assert_eq!(self.tail, Some(node), "node is not in this list");
                self.tail = prev;
            }
        }

        links.set_link(node, Link::Detached);
        debug_assert!(self.len > 0, "list length underflow");
        self.len -= 1;
        Ok(())
    }

    /// Unlink and return the head
    pub fn pop_front<L>(&mut self, links: &mut L) -> Option<NodeId>
    where
        L: LinkAccess + ?Sized,
    {
        let head = self.head?;
        self.remove(links, head).ok()?;
        Some(head)
    }

    /// Iterate from head to tail
    pub fn iter<'a, L>(&self, links: &'a L) -> Iter<'a, L>
    where
        L: LinkAccess + ?Sized,
    {
        Iter {
            links,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for List {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "List{{ head: {}, tail: {}, len: {} }}",
            self.head,
            self.tail,
            self.len
        );
    }
}

fn set_next<L: LinkAccess + ?Sized>(links: &mut L, node: NodeId, next: Option<NodeId>) {
    match links.link(node) {
        Link::Linked { prev, .. } => links.set_link(node, Link::Linked { prev, next }),
        Link::Detached => debug_assert!(false, "neighbour {} is detached", node),
    }
}

fn set_prev<L: LinkAccess + ?Sized>(links: &mut L, node: NodeId, prev: Option<NodeId>) {
    match links.link(node) {
        Link::Linked { next, .. } => links.set_link(node, Link::Linked { prev, next }),
        Link::Detached => debug_assert!(false, "neighbour {} is detached", node),
    }
}

/// Iterator over the nodes of a [`List`]
pub struct Iter<'a, L: ?Sized> {
    links: &'a L,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<L: LinkAccess + ?Sized> Iterator for Iter<'_, L> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front?;
        self.remaining -= 1;
        self.front = self.links.link(node).next();
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<L: LinkAccess + ?Sized> DoubleEndedIterator for Iter<'_, L> {
    fn next_back(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back?;
        self.remaining -= 1;
        self.back = self.links.link(node).prev();
        Some(node)
    }
}

impl<L: LinkAccess + ?Sized> ExactSizeIterator for Iter<'_, L> {}
