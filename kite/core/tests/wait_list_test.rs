//! Wait list tests for kite-core
//! Links are embedded in caller-owned records, the way kernel objects hold them

use kite_core::{Link, LinkAccess, List, ListError, NodeId};

/// A caller-owned record carrying its own link
#[derive(Debug, Default)]
struct Waiter {
    id: u32,
    link: Link,
}

struct Waiters(Vec<Waiter>);

impl LinkAccess for Waiters {
    fn link(&self, node: NodeId) -> Link {
        self.0[node as usize].link
    }

    fn set_link(&mut self, node: NodeId, link: Link) {
        self.0[node as usize].link = link;
    }
}

fn waiters(n: u32) -> Waiters {
    Waiters((0..n).map(|id| Waiter { id, link: Link::Detached }).collect())
}

#[test]
fn test_remove_from_middle_without_scan() {
    let mut store = waiters(5);
    let mut list = List::new();
    for node in 0..5 {
        list.append(&mut store, node).unwrap();
    }

    list.remove(&mut store, 2).unwrap();

    let order: Vec<u32> = list.iter(&store).map(|n| store.0[n as usize].id).collect();
    assert_eq!(order, vec![0, 1, 3, 4]);
    assert_eq!(store.0[1].link, Link::Linked { prev: Some(0), next: Some(3) });
    assert_eq!(store.0[3].link, Link::Linked { prev: Some(1), next: Some(4) });
    assert_eq!(store.0[2].link, Link::Detached);
}

#[test]
fn test_second_removal_reports_detached() {
    let mut store = waiters(3);
    let mut list = List::new();
    for node in 0..3 {
        list.append(&mut store, node).unwrap();
    }

    list.remove(&mut store, 1).unwrap();
    assert_eq!(list.remove(&mut store, 1), Err(ListError::Detached));

    assert_eq!(list.len(), 2);
    assert_eq!(list.iter(&store).collect::<Vec<_>>(), vec![0, 2]);
}

#[test]
fn test_null_anchor_positions() {
    let mut store = waiters(3);
    let mut list = List::new();

    list.insert_before(&mut store, None, 1).unwrap();
    list.insert_after(&mut store, None, 0).unwrap();
    list.insert_before(&mut store, None, 2).unwrap();

    assert_eq!(list.iter(&store).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(list.iter(&store).rev().collect::<Vec<_>>(), vec![2, 1, 0]);
}

#[test]
fn test_reinsert_after_removal() {
    let mut store = waiters(2);
    let mut list = List::new();
    list.append(&mut store, 0).unwrap();
    list.append(&mut store, 1).unwrap();

    list.remove(&mut store, 0).unwrap();
    list.append(&mut store, 0).unwrap();

    assert_eq!(list.iter(&store).collect::<Vec<_>>(), vec![1, 0]);
    assert_eq!(list.head(), Some(1));
    assert_eq!(list.tail(), Some(0));
}

#[test]
fn test_two_lists_share_storage() {
    let mut store = waiters(4);
    let mut odd = List::new();
    let mut even = List::new();

    for node in 0..4 {
        if node % 2 == 0 {
            even.append(&mut store, node).unwrap();
        } else {
            odd.append(&mut store, node).unwrap();
        }
    }

    assert_eq!(even.iter(&store).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(odd.iter(&store).collect::<Vec<_>>(), vec![1, 3]);

    // A member of one list cannot be linked into another
    assert_eq!(odd.append(&mut store, 0), Err(ListError::AlreadyLinked));
}
