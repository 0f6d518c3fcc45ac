//! Thread-safe FIFO queues bridging caller threads and the master loop
//!
//! Both directions of the driver use the same shape: an unbounded
//! FIFO guarded by a lock that covers only the enqueue/dequeue
//! critical section. No I/O ever happens under these locks. Pushes
//! never block and never fail; the design applies no backpressure, so
//! sustained overload grows the outbound queue without bound.

use std::collections::VecDeque;

use parking_lot::Mutex;
use pinbus_core::{Event, SwitchState};

/// Unbounded multi-producer FIFO with a non-blocking consumer.
#[derive(Debug, Default)]
pub struct FifoQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> FifoQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Append one item. Never blocks beyond the lock, never drops.
    pub fn push(&self, item: T) {
        self.items.lock().push_back(item);
    }

    /// Remove the oldest item, or `None` if the queue is empty.
    /// An empty queue is a valid silent result, not an error.
    pub fn pop(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

/// Commands awaiting transmission. Any thread pushes; only the master
/// loop pops, one event per scheduling tick.
pub type EventQueue = FifoQueue<Event>;

/// Decoded switch reports awaiting client consumption.
pub type SwitchQueue = FifoQueue<SwitchState>;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use pinbus_core::Event;

    use super::*;

    #[test]
    fn preserves_fifo_order() {
        let queue = EventQueue::new();
        for i in 0..10u16 {
            queue.push(Event::solenoid(i, true));
        }
        for i in 0..10u16 {
            assert_eq!(queue.pop(), Some(Event::solenoid(i, true)));
        }
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let queue = SwitchQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn pushes_from_many_threads_all_arrive() {
        let queue = Arc::new(EventQueue::new());
        let mut handles = Vec::new();
        for t in 0..4u16 {
            let queue = queue.clone();
            handles.push(thread::spawn(move || {
                for i in 0..100u16 {
                    queue.push(Event::new(83, t * 100 + i, 1));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(queue.len(), 400);

        // Per producer, relative order must be preserved.
        let mut last_seen = [None::<u16>; 4];
        while let Some(event) = queue.pop() {
            let producer = (event.event_id / 100) as usize;
            let seq = event.event_id % 100;
            if let Some(prev) = last_seen[producer] {
                assert!(seq > prev);
            }
            last_seen[producer] = Some(seq);
        }
    }
}
