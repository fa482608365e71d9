use std::thread;

use dse::policy::SoftmaxPolicy;
use dse::{DesignSpace, Dimension, GenerativeModel, ProbabilityEngine, Status};

fn space() -> DesignSpace {
    DesignSpace::builder()
        .dimension(
            Dimension::new("freq", 4.0, vec![1.0, 2.0, 3.0, 4.0]).model(GenerativeModel::bell(1.0)),
        )
        .dimension(Dimension::new("bus", 2.0, vec![0.0, 1.0, 2.0]))
        .build()
        .unwrap()
}

#[test]
fn concurrent_evaluations_match_sequential() {
    let space = space();
    let policy = SoftmaxPolicy::builder(&space).seed(5).init_scale(0.5).build();
    let engine = ProbabilityEngine::new(&policy, &space);
    let status: Status = [("freq", 3.0), ("bus", 1.0)].into_iter().collect();

    let sequential: Vec<_> = (0..4)
        .map(|i| engine.kl_div_and_log_prob(&status, i, 0).unwrap())
        .collect();

    let concurrent: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let status = &status;
                s.spawn(move || engine.kl_div_and_log_prob(status, i, 0).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

#[test]
fn updates_and_reads_interleave() {
    let space = space();
    let policy = SoftmaxPolicy::builder(&space).seed(9).build();
    let engine = ProbabilityEngine::new(&policy, &space);
    let status: Status = [("freq", 2.0), ("bus", 0.0)].into_iter().collect();
    let features = engine.features(&status).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..100 {
                policy
                    .apply_logit_gradient(1, &features, &[0.0, 1.0, 0.0], 0.01)
                    .unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..100 {
                let eval = engine.log_prob(&status, 1, 1).unwrap();
                assert!(eval.log_prob.is_finite());
                assert!(eval.entropy > 0.0);
            }
        });
    });

    let p = engine.distribution_for(&features, 1).unwrap();
    assert!(p.probs()[1] > p.probs()[0]);
}
