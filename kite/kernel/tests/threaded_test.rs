//! Event flags across real threads with the ticker running
//!
//! The kernel and the ticker are process-wide, so everything runs from one
//! test in sequence.

use std::thread;
use std::time::Duration;

use kite_kernel::{KError, Kernel, Timeout, WaitOptions};
use kite_posix::{register_tick_handler, stop_ticker, PosixPort, ThreadScheduler};

static KERNEL: Kernel<PosixPort, ThreadScheduler> = Kernel::new(ThreadScheduler::new());

const DATA_READY: u32 = 0b01;
const ACK: u32 = 0b10;

fn producer_consumer() {
    let flags = KERNEL.event_flags_create().unwrap();

    let consumer = thread::spawn(move || {
        let mut received = 0;
        for _ in 0..10 {
            let bits = KERNEL
                .event_flags_wait(flags, DATA_READY, WaitOptions::ANY.auto_reset())
                .unwrap();
            assert_eq!(bits, DATA_READY);
            received += 1;
            KERNEL.event_flags_set(flags, ACK).unwrap();
        }
        received
    });

    for _ in 0..10 {
        KERNEL.event_flags_set(flags, DATA_READY).unwrap();
        let take = WaitOptions::ANY.auto_reset();
        let bits = KERNEL
            .event_flags_timed_wait(flags, ACK, take, Timeout::from_ticks(1000))
            .unwrap();
        assert_eq!(bits, ACK);
    }

    assert_eq!(consumer.join().unwrap(), 10);
    assert_eq!(KERNEL.event_flags_waiters(flags), Ok(0));
    KERNEL.event_flags_delete(flags).unwrap();
}

fn timed_wait_expires_on_ticker() {
    let flags = KERNEL.event_flags_create().unwrap();
    let before = KERNEL.tick_count64();

    let woke = KERNEL.event_flags_timed_wait(flags, 0b1, WaitOptions::ALL, Timeout::from_ticks(20));
    assert_eq!(woke, Err(KError::Timeout));
    assert!(KERNEL.tick_count64() - before >= 20);

    KERNEL.event_flags_delete(flags).unwrap();
}

fn many_waiters_released_by_one_set() {
    let flags = KERNEL.event_flags_create().unwrap();

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(move || KERNEL.event_flags_wait(flags, 0b100, WaitOptions::ANY))
        })
        .collect();
    while KERNEL.event_flags_waiters(flags) != Ok(4) {
        thread::sleep(Duration::from_millis(1));
    }

    KERNEL.event_flags_set(flags, 0b100).unwrap();
    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), Ok(0b100));
    }
    KERNEL.event_flags_delete(flags).unwrap();
}

fn idle_accumulates_time() {
    for _ in 0..10 {
        KERNEL.idle_once();
    }
    assert!(KERNEL.idle_time() > 0);
}

#[test]
fn test_kernel_on_threads() {
    let _ = env_logger::builder().is_test(true).try_init();

    register_tick_handler(|| KERNEL.on_tick_interrupt());
    KERNEL.init().start();
    assert!(KERNEL.is_started());

    producer_consumer();
    timed_wait_expires_on_ticker();
    many_waiters_released_by_one_set();
    idle_accumulates_time();

    stop_ticker();
    assert_eq!(KERNEL.waiter_stats().used_blocks, 0);
}
