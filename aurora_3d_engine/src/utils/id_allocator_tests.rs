use super::*;

#[test]
fn test_sequential_assignment() {
    let mut alloc = IdAllocator::new();
    assert_eq!(alloc.alloc(), Some(0));
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), Some(2));
    assert_eq!(alloc.len(), 3);
}

#[test]
fn test_new_is_empty() {
    let alloc = IdAllocator::new();
    assert!(alloc.is_empty());
    assert_eq!(alloc.len(), 0);
}

#[test]
fn test_ids_never_recycled() {
    // There is no free() — len only grows, ids stay unique forever
    let mut alloc = IdAllocator::new();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..1000 {
        assert!(seen.insert(alloc.alloc().unwrap()));
    }
}

#[test]
fn test_capacity_exhaustion() {
    let mut alloc = IdAllocator::with_capacity(2);
    assert_eq!(alloc.alloc(), Some(0));
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), None);
    // Still exhausted on retry
    assert_eq!(alloc.alloc(), None);
    assert_eq!(alloc.len(), 2);
}

#[test]
fn test_is_live() {
    let mut alloc = IdAllocator::new();
    assert!(!alloc.is_live(0));
    alloc.alloc();
    assert!(alloc.is_live(0));
    assert!(!alloc.is_live(1));
    // The sentinel is never live
    assert!(!alloc.is_live(u32::MAX));
}
