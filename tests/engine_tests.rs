use dse::features::one_hot;
use dse::normalize::{normalize_action_component, normalize_status};
use dse::policy::{SoftmaxPolicy, TabularPolicy, UniformPolicy};
use dse::target::target_distribution;
use dse::{
    Action, DesignSpace, Dimension, Distribution, Error, GenerativeModel, ProbabilityEngine,
    Status, get_kl_div_and_log_prob, get_log_prob,
};

fn single_dimension_space() -> DesignSpace {
    DesignSpace::builder()
        .dimension(Dimension::new("dim", 10.0, vec![1.0, 2.0, 3.0, 4.0, 5.0]))
        .build()
        .unwrap()
}

fn soc_space() -> DesignSpace {
    DesignSpace::builder()
        .dimension(
            Dimension::new("core", 16.0, vec![1.0, 2.0, 4.0, 8.0, 16.0])
                .model(GenerativeModel::bell(1.0)),
        )
        .dimension(
            Dimension::new("l1_kb", 64.0, vec![16.0, 32.0, 64.0])
                .model(GenerativeModel::bell(0.5)),
        )
        .dimension(Dimension::new("isa", 3.0, vec![0.0, 1.0, 2.0, 3.0]))
        .build()
        .unwrap()
}

#[test]
fn worked_example_single_dimension() {
    let space = single_dimension_space();
    let status: Status = [("dim", 4.0)].into_iter().collect();

    let normalized = normalize_status(&status, &space).unwrap();
    assert!((normalized.get("dim").unwrap() - 0.4).abs() < 1e-12);

    let component = normalize_action_component(2.0, &space, 0).unwrap();
    assert!((component - 0.5).abs() < 1e-12);

    let policy = TabularPolicy::new(vec![vec![0.2; 5]]);
    let eval = get_log_prob(&policy, &space, &status, 2, 0).unwrap();
    assert!((eval.entropy - 5f64.ln()).abs() < 1e-12);
    assert!((eval.log_prob - 0.2f64.ln()).abs() < 1e-12);

    // A uniform policy covers every candidate, so the divergence from a
    // one-hot target is -ln(0.2) rather than infinite.
    let eval = get_kl_div_and_log_prob(&policy, &space, &status, 2, 0).unwrap();
    assert!((eval.kl_divergence - 5f64.ln()).abs() < 1e-12);
}

#[test]
fn one_hot_target_against_policy_without_mass_diverges() {
    let space = single_dimension_space();
    let status: Status = [("dim", 4.0)].into_iter().collect();
    let policy = TabularPolicy::new(vec![vec![0.25, 0.25, 0.0, 0.25, 0.25]]);

    assert!(matches!(
        get_kl_div_and_log_prob(&policy, &space, &status, 2, 0),
        Err(Error::InfiniteDivergence { index: 2 })
    ));
    assert!(matches!(
        get_log_prob(&policy, &space, &status, 2, 0),
        Err(Error::ZeroProbability { index: 2 })
    ));
}

#[test]
fn subnormal_policy_mass_keeps_divergence_finite() {
    let space = DesignSpace::builder()
        .dimension(
            Dimension::new("width", 2.0, vec![1.0, 2.0]).model(GenerativeModel::bell(f64::MAX)),
        )
        .build()
        .unwrap();
    let status: Status = [("width", 1.0)].into_iter().collect();
    let probs = vec![1.0 - 1e-320, 1e-320];
    let policy = TabularPolicy::new(vec![probs.clone()]);

    let eval = get_kl_div_and_log_prob(&policy, &space, &status, 0, 0).unwrap();
    let target = target_distribution(GenerativeModel::bell(f64::MAX), 2, 0).unwrap();
    let expected: f64 = target
        .probs()
        .iter()
        .zip(&probs)
        .map(|(&t, &p)| t * (t.ln() - p.ln()))
        .sum();

    assert!(eval.kl_divergence.is_finite());
    assert!(
        (eval.kl_divergence - expected).abs() < 1e-9,
        "kl {}, expected {expected}",
        eval.kl_divergence
    );
    assert!(eval.log_prob.abs() < 1e-12);
}

#[test]
fn normalized_status_lies_in_unit_interval() {
    let space = soc_space();
    for (core, l1, isa) in [(0.0, 0.0, 0.0), (16.0, 64.0, 3.0), (3.0, 17.0, 1.0)] {
        let status: Status = [("isa", isa), ("core", core), ("l1_kb", l1)]
            .into_iter()
            .collect();
        let normalized = normalize_status(&status, &space).unwrap();
        assert_eq!(normalized.len(), 3);
        for (name, value) in normalized.iter() {
            assert!((0.0..=1.0).contains(&value), "{name} = {value}");
        }
    }
}

#[test]
fn normalizing_against_unit_bounds_is_idempotent() {
    let unit = DesignSpace::builder()
        .dimension(Dimension::new("a", 1.0, vec![0.0, 1.0]))
        .dimension(Dimension::new("b", 1.0, vec![0.0, 1.0]))
        .build()
        .unwrap();
    let status: Status = [("a", 0.3), ("b", 0.9)].into_iter().collect();

    let once = normalize_status(&status, &unit).unwrap();
    let twice = normalize_status(&once, &unit).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn distance_is_symmetric_and_zero_on_identity() {
    let space = soc_space();
    let a = Action::new(vec![4, 0, 2]);
    let b = Action::new(vec![1, 2, 3]);

    assert!(dse::distance::action_distance(&a, &a, &space).unwrap().abs() < f64::EPSILON);
    let ab = dse::distance::action_distance(&a, &b, &space).unwrap();
    let ba = dse::distance::action_distance(&b, &a, &space).unwrap();
    assert!(ab > 0.0);
    assert!((ab - ba).abs() < f64::EPSILON);
}

#[test]
fn one_hot_shape() {
    for n in 1..6 {
        for i in 0..n {
            let v = one_hot(n, i).unwrap();
            assert_eq!(v.iter().filter(|&&x| x == 1.0).count(), 1);
            assert_eq!(v.iter().filter(|&&x| x == 0.0).count(), n - 1);
            assert!((v[i] - 1.0).abs() < f64::EPSILON);
        }
    }
}

#[test]
fn self_divergence_is_zero() {
    let space = soc_space();
    for dimension in 0..space.len() {
        let cardinality = space.cardinality(dimension).unwrap();
        let target = target_distribution(space.model(dimension).unwrap(), cardinality, 1).unwrap();
        assert!(target.kl_divergence_from(&target).unwrap().abs() < 1e-12);
    }
}

#[test]
fn policy_matching_bell_target_has_zero_divergence() {
    let space = soc_space();
    let target = target_distribution(GenerativeModel::bell(1.0), 5, 3).unwrap();
    let policy = TabularPolicy::new(vec![target.into_probs()]);
    let status: Status = [("core", 8.0), ("l1_kb", 32.0), ("isa", 1.0)]
        .into_iter()
        .collect();

    let eval = get_kl_div_and_log_prob(&policy, &space, &status, 3, 0).unwrap();
    assert!(eval.kl_divergence.abs() < 1e-12);
}

#[test]
fn unknown_model_kind_fails_fast() {
    assert!(matches!(
        GenerativeModel::from_descriptor("triangle", Some(1.0)),
        Err(Error::UnknownGenerativeModel(kind)) if kind == "triangle"
    ));
}

#[test]
fn uniform_policy_over_whole_action() {
    let space = soc_space();
    let policy = UniformPolicy::new(&space);
    let engine = ProbabilityEngine::new(&policy, &space);
    let status: Status = [("core", 8.0), ("l1_kb", 32.0), ("isa", 1.0)]
        .into_iter()
        .collect();

    let eval = engine
        .evaluate_action(&status, &Action::new(vec![0, 1, 2]))
        .unwrap();
    let expected = -(5f64.ln() + 3f64.ln() + 4f64.ln());
    assert!((eval.log_prob() - expected).abs() < 1e-12);
    assert!((eval.entropy() + expected).abs() < 1e-12);
}

#[test]
fn policy_gradient_steps_reduce_divergence() {
    let space = soc_space();
    let policy = SoftmaxPolicy::builder(&space).seed(11).build();
    let engine = ProbabilityEngine::new(&policy, &space);
    let status: Status = [("core", 4.0), ("l1_kb", 16.0), ("isa", 2.0)]
        .into_iter()
        .collect();
    let features = engine.features(&status).unwrap();

    let before = engine.kl_div_and_log_prob(&status, 2, 0).unwrap();
    let target = target_distribution(space.model(0).unwrap(), 5, 2).unwrap();

    for _ in 0..50 {
        let probs = engine.distribution_for(&features, 0).unwrap();
        let grad = dse::gradient::kl_logit_grad(&probs, &target).unwrap();
        // Descend the divergence.
        policy
            .apply_logit_gradient(0, &features, &grad, -0.5)
            .unwrap();
    }

    let after = engine.kl_div_and_log_prob(&status, 2, 0).unwrap();
    assert!(
        after.kl_divergence < before.kl_divergence,
        "before {before:?}, after {after:?}"
    );
    assert!(after.log_prob > before.log_prob);
}

#[test]
fn missing_status_entry_propagates() {
    let space = soc_space();
    let policy = UniformPolicy::new(&space);
    let status: Status = [("core", 8.0)].into_iter().collect();
    assert!(matches!(
        get_log_prob(&policy, &space, &status, 0, 0),
        Err(Error::MissingStatus(name)) if name == "l1_kb"
    ));
}

#[test]
fn policy_emitting_negative_probability_is_rejected() {
    let space = single_dimension_space();
    let status: Status = [("dim", 1.0)].into_iter().collect();
    let policy = |_: &[f64], _: usize| vec![0.5, 0.5, -0.2, 0.1, 0.1];
    assert!(matches!(
        get_log_prob(&policy, &space, &status, 0, 0),
        Err(Error::InvalidProbability { index: 2, .. })
    ));
}

#[test]
fn distribution_entropy_bounds() {
    let d = Distribution::new(vec![0.7, 0.2, 0.1]).unwrap();
    assert!(d.entropy() > 0.0);
    assert!(d.entropy() < 3f64.ln());
}
