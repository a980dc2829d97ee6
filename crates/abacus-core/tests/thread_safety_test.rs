//! Thread safety tests for the evaluation service
//!
//! Many threads hammer one shared service with batches, single evaluations
//! and history reads; the history must end up with exactly one record per
//! evaluation and no duplicates.

use abacus_core::{EvaluationService, PageRequest};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_batches_record_every_expression() {
    let service = Arc::new(EvaluationService::new());
    let num_threads = 8;
    let batch_size = 25;
    let barrier = Arc::new(Barrier::new(num_threads));
    let mut handles = Vec::new();

    for thread_id in 0..num_threads {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);

        let handle = thread::spawn(move || {
            let expressions: Vec<String> = (0..batch_size)
                .map(|i| if i % 5 == 0 { format!("{i} / 0") } else { format!("{thread_id} + {i}") })
                .collect();

            barrier.wait();
            let records = service.evaluate_batch(&expressions).expect("batch evaluation");

            for (expression, record) in expressions.iter().zip(&records) {
                assert_eq!(record.expression(), expression);
            }
            records
        });

        handles.push(handle);
    }

    let mut ids = HashSet::new();
    for handle in handles {
        for record in handle.join().expect("Thread panicked") {
            assert!(ids.insert(record.id().to_string()), "duplicate record id");
        }
    }

    let snapshot = service.history_store().snapshot().unwrap();
    assert_eq!(snapshot.len(), num_threads * batch_size);

    let stored: HashSet<String> = snapshot.iter().map(|r| r.id().to_string()).collect();
    assert_eq!(stored, ids);
}

#[test]
fn test_readers_and_writers_interleave() {
    let service = Arc::new(EvaluationService::new());
    let writers = 4;
    let readers = 4;
    let evaluations_per_writer = 100;
    let barrier = Arc::new(Barrier::new(writers + readers));
    let mut handles = Vec::new();

    for writer in 0..writers {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..evaluations_per_writer {
                service.evaluate(&format!("{writer} * {i}")).expect("evaluation");
            }
        }));
    }

    for _ in 0..readers {
        let service = Arc::clone(&service);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut last_total = 0;
            for _ in 0..200 {
                let page = service.history(PageRequest::new(1, 20)).expect("history read");
                // The log only grows and a page never exceeds its size.
                assert!(page.total >= last_total);
                assert!(page.records.len() <= 20);
                assert!(page.records.len() <= page.total);
                last_total = page.total;
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(service.history_store().len().unwrap(), writers * evaluations_per_writer);
    assert_eq!(service.stats().total, (writers * evaluations_per_writer) as u64);
}
