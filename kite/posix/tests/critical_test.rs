//! Critical section tests for the POSIX port

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kite_kernel::critical::{self, CriticalSection};
use kite_posix::{is_masked, PosixPort};

type Section = CriticalSection<PosixPort>;

#[test]
fn test_critical_section_raii() {
    {
        let _guard = Section::enter();
        assert!(is_masked());
    }
    assert!(!is_masked());
}

#[test]
fn test_nested_sections_unmask_on_outermost_exit() {
    let depth = 4;
    let mut guards: Vec<Section> = (0..depth).map(|_| Section::enter()).collect();
    assert_eq!(critical::nesting(), depth);

    while guards.len() > 1 {
        guards.pop();
        assert!(is_masked(), "unmasked with {} guards left", guards.len());
        assert_eq!(critical::nesting(), guards.len() as u32);
    }

    guards.pop();
    assert!(!is_masked());
}

#[test]
fn test_with_runs_closure_masked() {
    let masked = critical::with::<PosixPort, _>(|_| is_masked());
    assert!(masked);
    assert!(!is_masked());
}

#[test]
fn test_critical_section_mutual_exclusion() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for _ in 0..10 {
        let counter = Arc::clone(&counter);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                let _guard = Section::enter();
                let current = counter.load(Ordering::Relaxed);
                thread::sleep(Duration::from_micros(1));
                counter.store(current + 1, Ordering::Relaxed);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(counter.load(Ordering::Relaxed), 1000);
}
