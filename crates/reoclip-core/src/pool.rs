//! Bounded worker pool over an indexed work list.
//!
//! At most `max_concurrent` items run at once, each on a scoped OS thread
//! pulling from a shared queue. With a limit of 1 everything runs inline on
//! the caller's thread. Results are handed to `on_result` in index order
//! regardless of completion order.

use std::collections::VecDeque;
use std::sync::{mpsc, Mutex};

/// Runs `work(index, item)` for every item until `should_stop` returns true.
/// Items never started because of a stop are `None` in the returned vec.
pub(crate) fn run_bounded<T, R, W, S, O>(
    items: Vec<T>,
    max_concurrent: usize,
    should_stop: S,
    work: W,
    mut on_result: O,
) -> Vec<Option<R>>
where
    T: Send,
    R: Send,
    W: Fn(usize, T) -> R + Sync,
    S: Fn() -> bool + Sync,
    O: FnMut(usize, &R),
{
    let count = items.len();
    let mut results: Vec<Option<R>> = (0..count).map(|_| None).collect();
    if count == 0 {
        return results;
    }

    let num_workers = max_concurrent.max(1).min(count);
    if num_workers == 1 {
        for (index, item) in items.into_iter().enumerate() {
            if should_stop() {
                break;
            }
            let r = work(index, item);
            on_result(index, &r);
            results[index] = Some(r);
        }
        return results;
    }

    let queue: Mutex<VecDeque<(usize, T)>> = Mutex::new(items.into_iter().enumerate().collect());
    let (tx, rx) = mpsc::channel::<(usize, R)>();
    std::thread::scope(|scope| {
        for _ in 0..num_workers {
            let tx = tx.clone();
            let queue = &queue;
            let work = &work;
            let should_stop = &should_stop;
            scope.spawn(move || loop {
                if should_stop() {
                    break;
                }
                let next = queue
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .pop_front();
                let Some((index, item)) = next else {
                    break;
                };
                let r = work(index, item);
                if tx.send((index, r)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut next_to_report = 0;
        for (index, r) in rx {
            results[index] = Some(r);
            while let Some(Some(r)) = results.get(next_to_report) {
                on_result(next_to_report, r);
                next_to_report += 1;
            }
        }
        // A stop leaves gaps; report whatever finished after the first gap.
        for (index, r) in results.iter().enumerate().skip(next_to_report) {
            if let Some(r) = r {
                on_result(index, r);
            }
        }
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn sequential_runs_inline_in_order() {
        let mut seen = Vec::new();
        let out = run_bounded(vec![10, 20, 30], 1, || false, |i, x| x + i, |i, r| seen.push((i, *r)));
        assert_eq!(out, vec![Some(10), Some(21), Some(32)]);
        assert_eq!(seen, vec![(0, 10), (1, 21), (2, 32)]);
    }

    #[test]
    fn concurrent_reports_in_index_order() {
        let items: Vec<u64> = (0..8).collect();
        let mut reported = Vec::new();
        let out = run_bounded(
            items,
            4,
            || false,
            |_, x| {
                // Later items finish first.
                std::thread::sleep(Duration::from_millis(5 * (8 - x)));
                x * 2
            },
            |i, _| reported.push(i),
        );
        assert_eq!(reported, (0..8).collect::<Vec<_>>());
        assert!(out.iter().all(Option::is_some));
        assert_eq!(out[7], Some(14));
    }

    #[test]
    fn stop_leaves_unstarted_items_empty() {
        let started = AtomicUsize::new(0);
        let out = run_bounded(
            vec![(); 5],
            1,
            || started.load(Ordering::SeqCst) >= 2,
            |i, _| {
                started.fetch_add(1, Ordering::SeqCst);
                i
            },
            |_, _| {},
        );
        assert_eq!(out, vec![Some(0), Some(1), None, None, None]);
    }

    #[test]
    fn respects_concurrency_limit() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        run_bounded(
            vec![(); 12],
            3,
            || false,
            |_, _| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                in_flight.fetch_sub(1, Ordering::SeqCst);
            },
            |_, _| {},
        );
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }
}
