//! Integration tests for the prioritized scheduler: admission order,
//! stable tie-breaks, priority resolution, and retries under priority.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use workq::config::{SchedulerConfig, TaskOptions};
use workq::core::{EventKind, PriorityScheduler, SchedulerError};

fn single_worker() -> SchedulerConfig {
    // One worker makes start order fully observable through collect().
    SchedulerConfig::new().with_max_workers(1)
}

#[tokio::test]
async fn test_distinct_priorities_start_highest_first() {
    let q: PriorityScheduler<u32, u32> =
        PriorityScheduler::with_factory(single_worker(), |n| async move { Ok(n) });

    q.enqueue(1, TaskOptions::new().with_priority(-3)).unwrap();
    q.enqueue(2, TaskOptions::new().with_priority(8)).unwrap();
    q.enqueue(3, TaskOptions::new().with_priority(0)).unwrap();
    q.enqueue(4, TaskOptions::new().with_priority(20)).unwrap();

    let values: Vec<_> = q.collect().await.into_iter().map(|o| o.unwrap()).collect();
    assert_eq!(values, [4, 2, 3, 1]);
}

#[tokio::test]
async fn test_equal_priorities_keep_enqueue_order() {
    // A(1), B(1), C(5) must run as C, A, B.
    let q: PriorityScheduler<&str, &str> =
        PriorityScheduler::with_factory(single_worker(), |s| async move { Ok(s) });

    q.enqueue("a", TaskOptions::new().with_priority(1)).unwrap();
    q.enqueue("b", TaskOptions::new().with_priority(1)).unwrap();
    q.enqueue("c", TaskOptions::new().with_priority(5)).unwrap();

    let values: Vec<_> = q.collect().await.into_iter().map(|o| o.unwrap()).collect();
    assert_eq!(values, ["c", "a", "b"]);
}

#[tokio::test]
async fn test_priority_resolution_explicit_over_default() {
    let q: PriorityScheduler<u32, u32> = PriorityScheduler::with_factory(
        single_worker().with_default_priority(5),
        |n| async move { Ok(n) },
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let priorities = Arc::clone(&seen);
    q.on(EventKind::Start, move |event| {
        priorities.lock().push((event.order, event.priority));
    });

    q.enqueue(1, TaskOptions::new()).unwrap();
    q.enqueue(2, TaskOptions::new().with_priority(9)).unwrap();

    let values: Vec<_> = q.collect().await.into_iter().map(|o| o.unwrap()).collect();
    assert_eq!(values, [2, 1]);

    let seen = seen.lock();
    assert_eq!(*seen, vec![(2, 9), (1, 5)]);
}

#[tokio::test]
async fn test_batch_submission_uses_default_priority() {
    let q: PriorityScheduler<u32, u32> =
        PriorityScheduler::from_values([1, 2, 3], single_worker(), |n| async move { Ok(n) });
    assert_eq!(q.size(), 3);

    // All at the same (default) priority, so plain FIFO order.
    let values: Vec<_> = q.collect().await.into_iter().map(|o| o.unwrap()).collect();
    assert_eq!(values, [1, 2, 3]);
}

#[tokio::test]
async fn test_missing_factory_is_rejected() {
    let q: PriorityScheduler<u32, u32> = PriorityScheduler::new(SchedulerConfig::new());
    let err = q.enqueue(1, TaskOptions::new()).unwrap_err();
    assert!(matches!(err, SchedulerError::MissingFactory));

    q.enqueue_with(|| async { Ok(11) }, TaskOptions::new().with_priority(1));
    assert_eq!(q.dequeue().await.unwrap().unwrap(), 11);
}

#[tokio::test]
async fn test_retried_task_reenters_at_its_priority() {
    let q: PriorityScheduler<u32, &str> = PriorityScheduler::new(
        single_worker().with_backoff_base_ms(5),
    );

    let retry_priorities = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&retry_priorities);
    q.on(EventKind::Retry, move |event| {
        seen.lock().push(event.priority);
    });

    let tries = Arc::new(AtomicU32::new(0));
    q.enqueue_with(
        move || {
            let nth = tries.fetch_add(1, Ordering::SeqCst);
            async move {
                if nth == 0 {
                    Err(anyhow::anyhow!("transient"))
                } else {
                    Ok("recovered")
                }
            }
        },
        TaskOptions::new().with_priority(7).with_max_retries(1),
    );
    q.enqueue_with(|| async { Ok("low") }, TaskOptions::new().with_priority(-1));

    let outcomes = q.collect().await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(*outcomes[0].value().unwrap(), "recovered");
    assert_eq!(*outcomes[1].value().unwrap(), "low");
    assert_eq!(*retry_priorities.lock(), vec![7]);
}
