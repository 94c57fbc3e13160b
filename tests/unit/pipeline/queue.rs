use std::sync::mpsc;
use std::time::Instant;

use image::RgbImage;

use super::*;

fn entry(name: &str) -> QueueEntry {
    QueueEntry::new(
        Frame::new(RgbImage::new(1, 1), Instant::now()),
        PathBuf::from(name),
    )
}

fn opts(capacity: usize) -> QueueOpts {
    QueueOpts {
        capacity,
        poll_interval: Duration::from_millis(10),
    }
}

#[test]
fn defaults_match_documented_values() {
    let o = QueueOpts::default();
    assert_eq!(o.capacity, 200);
    assert_eq!(o.poll_interval, Duration::from_secs(1));
}

#[test]
fn zero_capacity_is_rejected() {
    assert!(WorkQueue::new(opts(0)).is_err());
}

#[test]
fn empty_get_times_out_with_none() {
    let q = WorkQueue::new(opts(2)).unwrap();
    let start = Instant::now();
    assert!(q.get().is_none());
    assert!(start.elapsed() >= Duration::from_millis(10));
}

#[test]
fn entries_come_out_in_fifo_order() {
    let q = WorkQueue::new(opts(4)).unwrap();
    q.put(entry("a")).unwrap();
    q.put(entry("b")).unwrap();
    assert_eq!(q.len(), 2);
    assert_eq!(q.get().unwrap().destination, PathBuf::from("a"));
    assert_eq!(q.get().unwrap().destination, PathBuf::from("b"));
    assert!(q.is_empty());
}

#[test]
fn never_holds_more_than_capacity() {
    let q = WorkQueue::new(opts(2)).unwrap();
    q.put(entry("a")).unwrap();
    q.put(entry("b")).unwrap();
    let rejected = q
        .put_timeout(entry("c"), Duration::from_millis(20))
        .unwrap_err();
    assert_eq!(rejected.destination, PathBuf::from("c"));
    assert_eq!(q.len(), q.capacity());
}

#[test]
fn put_blocks_until_a_consumer_dequeues() {
    let q = WorkQueue::new(opts(1)).unwrap();
    q.put(entry("first")).unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let producer = {
        let q = q.clone();
        std::thread::spawn(move || {
            q.put(entry("second")).unwrap();
            done_tx.send(()).unwrap();
        })
    };

    // Full queue: the producer must still be blocked.
    assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());

    assert_eq!(q.get().unwrap().destination, PathBuf::from("first"));
    done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    producer.join().unwrap();
    assert_eq!(q.get().unwrap().destination, PathBuf::from("second"));
}
