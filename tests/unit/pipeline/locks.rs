use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use super::*;

#[test]
fn same_slug_shares_one_lock() {
    let locks = SlugLocks::default();
    let a = locks.lock_for("post");
    let b = locks.lock_for("post");
    let c = locks.lock_for("other");
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn unused_entries_are_pruned() {
    let locks = SlugLocks::default();
    drop(locks.lock_for("one"));
    drop(locks.lock_for("two"));
    let _held = locks.lock_for("three");
    assert_eq!(locks.len(), 1);
}

#[test]
fn same_slug_requests_never_overlap() {
    let locks = Arc::new(SlugLocks::default());
    let inside = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_seen = Arc::clone(&max_seen);
            thread::spawn(move || {
                let lock = locks.lock_for("post");
                let _guard = lock.lock().unwrap();
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(5));
                inside.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
}
