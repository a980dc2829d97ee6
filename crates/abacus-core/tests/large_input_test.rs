//! Large and deeply structured inputs
//!
//! Long operator chains produce trees as deep as the chain is long. These
//! tests make sure such input is evaluated, recorded and dropped like any
//! other expression.

use abacus_core::calculator::parser::MAX_NESTING_DEPTH;
use abacus_core::{ErrorKind, EvaluationService, PageRequest};
use std::thread;

const CHAIN_TERMS: usize = 200_000;

fn addition_chain(terms: usize) -> String {
    format!("{}1", "1+".repeat(terms - 1))
}

#[test]
fn test_long_chain_without_parentheses() {
    let service = EvaluationService::new();

    let record = service.evaluate(&addition_chain(CHAIN_TERMS)).unwrap();
    assert_eq!(record.result(), Some(CHAIN_TERMS as f64));

    let page = service.history(PageRequest::default()).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.records[0].id(), record.id());
}

#[test]
fn test_long_mixed_precedence_chain() {
    let service = EvaluationService::new();

    // Each "+2*3-4/2" contributes 6 - 2.
    let source = format!("1{}", "+2*3-4/2".repeat(50_000));
    let record = service.evaluate(&source).unwrap();
    assert_eq!(record.result(), Some(200_001.0));
}

#[test]
fn test_failure_inside_long_chain_is_recorded() {
    let service = EvaluationService::new();

    let source = format!("{}+1/0", addition_chain(CHAIN_TERMS));
    let record = service.evaluate(&source).unwrap();
    assert_eq!(record.error(), Some("division by zero"));

    let truncated = format!("{}+", addition_chain(CHAIN_TERMS));
    let record = service.evaluate(&truncated).unwrap();
    assert_eq!(record.error(), Some("unexpected end of expression"));

    let stats = service.stats();
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.by_kind.get(&ErrorKind::DivisionByZero), Some(&1));
    assert_eq!(stats.by_kind.get(&ErrorKind::UnexpectedEnd), Some(&1));
}

#[test]
fn test_long_chains_inside_maximum_nesting() {
    let service = EvaluationService::new();
    let inner = addition_chain(10_000);

    let nested = format!(
        "{}{}{}",
        "(".repeat(MAX_NESTING_DEPTH),
        inner,
        ")".repeat(MAX_NESTING_DEPTH)
    );
    assert_eq!(service.evaluate(&nested).unwrap().result(), Some(10_000.0));

    let too_deep = format!(
        "{}{}{}",
        "(".repeat(MAX_NESTING_DEPTH + 1),
        inner,
        ")".repeat(MAX_NESTING_DEPTH + 1)
    );
    let record = service.evaluate(&too_deep).unwrap();
    assert_eq!(
        record.error().map(str::to_string),
        Some(format!("expression nesting exceeds maximum depth of {MAX_NESTING_DEPTH}"))
    );
}

#[test]
fn test_many_term_batch() {
    let service = EvaluationService::new();

    let mut expressions: Vec<String> = (1..=2_000).map(addition_chain).collect();
    expressions.push(addition_chain(CHAIN_TERMS));

    let records = service.evaluate_batch(&expressions).unwrap();
    assert_eq!(records.len(), expressions.len());
    for (terms, record) in (1..=2_000).chain([CHAIN_TERMS]).zip(&records) {
        assert_eq!(record.result(), Some(terms as f64));
    }

    assert_eq!(service.history_store().len().unwrap(), expressions.len());
}

#[test]
fn test_long_chain_on_small_stack_thread() {
    // Evaluation and teardown must not depend on the thread's stack size.
    let handle = thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(|| {
            let service = EvaluationService::new();
            service.evaluate(&addition_chain(CHAIN_TERMS)).map(|record| record.result())
        })
        .expect("Failed to spawn thread");

    assert_eq!(handle.join().expect("Thread panicked"), Ok(Some(CHAIN_TERMS as f64)));
}
