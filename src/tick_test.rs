use std::cell::RefCell;
use std::rc::Rc;

use super::*;

#[test]
fn run_pending_drains_in_fifo_order() {
    let queue = TickQueue::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    for i in 0..3 {
        let log = Rc::clone(&log);
        queue.defer(move || log.borrow_mut().push(i));
    }
    assert_eq!(queue.len(), 3);
    assert!(log.borrow().is_empty());

    assert_eq!(queue.run_pending(), 3);
    assert_eq!(*log.borrow(), vec![0, 1, 2]);
    assert!(queue.is_empty());
}

#[test]
fn tasks_deferred_while_draining_wait_for_next_tick() {
    let queue = Rc::new(TickQueue::new());
    let hits = Rc::new(RefCell::new(0));

    let inner_queue = Rc::clone(&queue);
    let inner_hits = Rc::clone(&hits);
    queue.defer(move || {
        *inner_hits.borrow_mut() += 1;
        let again = Rc::clone(&inner_hits);
        inner_queue.defer(move || *again.borrow_mut() += 10);
    });

    assert_eq!(queue.run_pending(), 1);
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(queue.run_pending(), 1);
    assert_eq!(*hits.borrow(), 11);
    assert_eq!(queue.run_pending(), 0);
}
