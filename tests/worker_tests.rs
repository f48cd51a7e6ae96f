mod common;

use common::{engine_with_jobs, inside, job, mins, outside, t0};
use geotimer::core::outcome::Outcome;
use geotimer::core::worker::BatchQueue;
use geotimer::db::queries;
use geotimer::models::action_kind::ActionKind;

#[tokio::test]
async fn batches_are_processed_in_submission_order() {
    let (engine, sent) = engine_with_jobs("wrk_order", &[job("office", 0, 0)]);
    let (queue, consumer) = BatchQueue::spawn(engine);

    let first = queue.submit_at(vec![inside()], t0()).await.unwrap();
    assert_eq!(first.jobs[0].outcome, Outcome::Started);

    let second = queue.submit_at(vec![outside()], mins(60)).await.unwrap();
    assert!(matches!(second.jobs[0].outcome, Outcome::Stopped { hours, .. } if hours == 1.0));

    drop(queue);
    let engine = consumer.await.unwrap();
    assert_eq!(queries::load_work_records(engine.conn(), None).unwrap().len(), 1);
    assert_eq!(sent.lock().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_never_start_twice() {
    let (engine, _sent) = engine_with_jobs("wrk_concurrent", &[job("office", 0, 0)]);
    let (queue, consumer) = BatchQueue::spawn(engine);

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let q = queue.clone();
        tasks.push(tokio::spawn(async move { q.submit_at(vec![inside()], t0()).await }));
    }

    let mut started = 0;
    for t in tasks {
        let report = t.await.unwrap().unwrap();
        match &report.jobs[0].outcome {
            Outcome::Started => started += 1,
            Outcome::Unchanged { inside: true } => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(started, 1);

    drop(queue);
    let engine = consumer.await.unwrap();
    assert_eq!(queries::load_active_sessions(engine.conn()).unwrap().len(), 1);
}

#[tokio::test]
async fn sweep_goes_through_the_queue() {
    let (engine, _sent) = engine_with_jobs("wrk_sweep", &[job("office", 10, 0)]);
    let (queue, consumer) = BatchQueue::spawn(engine);

    let report = queue.submit_at(vec![inside()], t0()).await.unwrap();
    assert!(matches!(
        report.jobs[0].outcome,
        Outcome::Scheduled { kind: ActionKind::Start, .. }
    ));

    let done = queue.sweep(Some(mins(10))).await.unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].outcome, Outcome::Started);

    drop(queue);
    let engine = consumer.await.unwrap();
    let session = queries::load_active_session(engine.conn(), "office")
        .unwrap()
        .unwrap();
    assert_eq!(session.start_time, mins(10));
}
