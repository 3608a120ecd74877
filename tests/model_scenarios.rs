use npisim::model::{Compartment, ContactMatrix, DiseaseParams, InterventionMatrices, SolverOptions, TimeSeries};
use npisim::{simulate, simulate_with, NamedInterval, SimError};

const N: f64 = 1_000_000.0;

fn single_cohort_params() -> DiseaseParams {
    DiseaseParams { beta: 0.5, alpha: 0.2, gamma: 0.1, delta: 0.1, kappa: vec![0.01] }
}

/// R0 = 5, so the epidemic is still growing through the first weeks.
fn slow_params() -> DiseaseParams {
    DiseaseParams { beta: 0.05, ..single_cohort_params() }
}

fn single_cohort_initial() -> Vec<f64> {
    vec![999_000.0, 500.0, 500.0, 0.0, 0.0, 0.0]
}

fn no_override() -> NamedInterval {
    NamedInterval::new("shelter_in_place", 0, 0)
}

fn assert_conserved(ts: &TimeSeries, pops: &[f64]) {
    for d in 0..ts.len() {
        for (a, n) in pops.iter().enumerate() {
            let total = ts.cohort_total(d, a);
            assert!((total - n).abs() / n < 1e-6, "day {} cohort {}: {} vs {}", ts.days[d], a, total, n);
        }
    }
}

fn assert_non_negative(ts: &TimeSeries) {
    for (d, y) in ts.states.iter().enumerate() {
        for (idx, v) in y.iter().enumerate() {
            assert!(*v >= 0.0, "day {} index {} = {}", ts.days[d], idx, v);
        }
    }
}

#[test]
fn single_cohort_epidemic_rises_peaks_and_burns_out() {
    let ts = simulate(
        &single_cohort_initial(),
        &ContactMatrix::uniform(1, 10.0),
        &InterventionMatrices::new(),
        &[],
        &no_override(),
        300,
        &single_cohort_params(),
    )
    .unwrap();

    assert_eq!(ts.len(), 301);
    assert_eq!(ts.days.first(), Some(&0));
    assert_eq!(ts.days.last(), Some(&300));

    let infectious = ts.compartment_total(Compartment::Infectious);
    let summary = ts.summary();
    assert!(summary.peak_infectious > infectious[0]);
    assert!(summary.peak_infectious_day > 0 && summary.peak_infectious_day < 100, "{summary:?}");
    assert!(infectious[300] < 1.0, "I(300) = {}", infectious[300]);

    let d_final = ts.value(300, 0, Compartment::Dead);
    let r_final = ts.value(300, 0, Compartment::Recovered);
    assert!(d_final > 0.0);
    // everyone who went through E split by kappa; the initial I all recover
    assert!((d_final / (r_final + d_final) - 0.01).abs() < 1e-4, "D={d_final} R={r_final}");

    assert_conserved(&ts, &[N]);
    assert_non_negative(&ts);
    assert!(summary.max_population_drift < 1e-9);
}

#[test]
fn fully_suppressive_intervention_freezes_transmission() {
    let mut interventions = InterventionMatrices::new();
    interventions.insert("lockdown".into(), ContactMatrix::zeros(1));
    let initial = single_cohort_initial();
    let params = slow_params();
    let baseline = ContactMatrix::uniform(1, 10.0);

    let frozen = simulate(
        &initial,
        &baseline,
        &interventions,
        &[NamedInterval::new("lockdown", 20, 40)],
        &no_override(),
        60,
        &params,
    )
    .unwrap();
    let free = simulate(&initial, &baseline, &interventions, &[], &no_override(), 60, &params).unwrap();

    // identical up to the start of the lockdown
    assert_eq!(frozen.states[..=20], free.states[..=20]);

    let s = frozen.cohort_series(0, Compartment::Susceptible);
    let e = frozen.cohort_series(0, Compartment::Exposed);
    for d in 20..40 {
        assert_eq!(s[d + 1], s[d], "S moved on day {d}");
        assert!(e[d + 1] < e[d], "E did not decay on day {d}");
    }
    let expected = e[20] * (-0.2f64 * 20.0).exp();
    assert!((e[40] - expected).abs() / expected < 1e-5, "E(40)={} expected {}", e[40], expected);

    assert!(free.value(40, 0, Compartment::Susceptible) < s[40]);
    assert!(frozen.value(40, 0, Compartment::Exposed) < free.value(40, 0, Compartment::Exposed));
    // transmission resumes afterwards
    assert!(s[41] < s[40]);
    assert_conserved(&frozen, &[N]);
}

#[test]
fn override_interval_uses_its_own_matrix() {
    let mut interventions = InterventionMatrices::new();
    interventions.insert("sip".into(), ContactMatrix::zeros(1));
    interventions.insert("masks".into(), ContactMatrix::uniform(1, 5.0));

    let ts = simulate(
        &single_cohort_initial(),
        &ContactMatrix::uniform(1, 10.0),
        &interventions,
        &[NamedInterval::new("masks", 5, 50)],
        &NamedInterval::new("sip", 10, 30),
        50,
        &single_cohort_params(),
    )
    .unwrap();

    let s = ts.cohort_series(0, Compartment::Susceptible);
    for d in 10..30 {
        assert_eq!(s[d + 1], s[d], "S moved under shelter-in-place on day {d}");
    }
    assert!(s[31] < s[30]);
}

#[test]
fn splitting_an_epoch_does_not_move_the_trajectory() {
    let baseline = ContactMatrix::uniform(1, 10.0);
    let mut interventions = InterventionMatrices::new();
    // no tighter than baseline, so only the epoch boundaries change
    interventions.insert("advisory".into(), baseline.clone());
    interventions.insert("notice".into(), ContactMatrix::uniform(1, 12.0));

    let params = single_cohort_params();
    let split = simulate(
        &single_cohort_initial(),
        &baseline,
        &interventions,
        &[NamedInterval::new("advisory", 15, 45), NamedInterval::new("notice", 30, 30)],
        &NamedInterval::new("notice", 70, 80),
        100,
        &params,
    )
    .unwrap();
    let plain = simulate(&single_cohort_initial(), &baseline, &interventions, &[], &no_override(), 100, &params).unwrap();

    assert_eq!(split.days, plain.days);
    assert_eq!(split.states, plain.states);
    // boundary days appear exactly once
    assert_eq!(split.days, (0..=100).collect::<Vec<u32>>());
}

#[test]
fn runs_are_reproducible() {
    let mut interventions = InterventionMatrices::new();
    interventions.insert("schools".into(), ContactMatrix::uniform(1, 4.0));
    let run = || {
        simulate(
            &single_cohort_initial(),
            &ContactMatrix::uniform(1, 10.0),
            &interventions,
            &[NamedInterval::new("schools", 10, 60)],
            &no_override(),
            120,
            &single_cohort_params(),
        )
        .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn multi_cohort_conservation_with_interventions() {
    let baseline = ContactMatrix::new(vec![
        vec![12.0, 4.0, 1.0],
        vec![4.0, 8.0, 2.0],
        vec![1.0, 2.0, 3.0],
    ]);
    let mut interventions = InterventionMatrices::new();
    interventions.insert(
        "schools".into(),
        ContactMatrix::new(vec![vec![2.0, 4.0, 1.0], vec![4.0, 8.0, 2.0], vec![1.0, 2.0, 3.0]]),
    );
    interventions.insert(
        "work".into(),
        ContactMatrix::new(vec![vec![12.0, 2.0, 1.0], vec![2.0, 3.0, 1.0], vec![1.0, 1.0, 3.0]]),
    );
    interventions.insert("sip".into(), ContactMatrix::uniform(3, 0.5));

    let pops = [2_000_000.0, 5_000_000.0, 1_500_000.0];
    let initial = npisim::seed_initial_state(8_500_000.0, &[4.0 / 17.0, 10.0 / 17.0, 3.0 / 17.0], &[10.0, 30.0, 5.0], &[10.0, 30.0, 5.0])
        .unwrap();
    let params = DiseaseParams { beta: 0.04, alpha: 1.0 / 5.2, gamma: 1.0 / 7.0, delta: 1.0 / 14.0, kappa: vec![0.0001, 0.005, 0.08] };

    let ts = simulate(
        &initial,
        &baseline,
        &interventions,
        &[NamedInterval::new("schools", 30, 200), NamedInterval::new("work", 45, 120)],
        &NamedInterval::new("sip", 60, 90),
        365,
        &params,
    )
    .unwrap();

    assert_eq!(ts.n_cohorts, 3);
    assert_conserved(&ts, &pops);
    assert_non_negative(&ts);
    // older cohort has the highest fatal share
    let dead: Vec<f64> = (0..3).map(|a| ts.value(365, a, Compartment::Dead) / pops[a]).collect();
    assert!(dead[2] > dead[1] && dead[1] > dead[0], "{dead:?}");
}

#[test]
fn invalid_inputs_fail_before_integration() {
    let baseline = ContactMatrix::uniform(1, 10.0);
    let none = InterventionMatrices::new();
    let init = single_cohort_initial();

    let neg = DiseaseParams { gamma: -0.1, ..single_cohort_params() };
    assert!(matches!(simulate(&init, &baseline, &none, &[], &no_override(), 10, &neg), Err(SimError::Configuration(_))));

    let bad_kappa = DiseaseParams { kappa: vec![1.2], ..single_cohort_params() };
    assert!(matches!(simulate(&init, &baseline, &none, &[], &no_override(), 10, &bad_kappa), Err(SimError::Configuration(_))));

    let mut wrong_shape = InterventionMatrices::new();
    wrong_shape.insert("x".into(), ContactMatrix::uniform(2, 1.0));
    assert!(matches!(
        simulate(&init, &baseline, &wrong_shape, &[], &no_override(), 10, &single_cohort_params()),
        Err(SimError::Configuration(_))
    ));

    assert!(matches!(
        simulate(&init[..5], &baseline, &none, &[], &no_override(), 10, &single_cohort_params()),
        Err(SimError::Configuration(_))
    ));

    assert!(matches!(
        simulate(&init, &baseline, &none, &[NamedInterval::new("x", 5, 20)], &no_override(), 10, &single_cohort_params()),
        Err(SimError::InputRange { .. })
    ));

    let tight = SolverOptions { substeps_per_day: 1000, max_steps: 5_000, ..SolverOptions::default() };
    assert!(matches!(
        simulate_with(&init, &baseline, &none, &[], &no_override(), 10, &single_cohort_params(), &tight),
        Err(SimError::Configuration(_))
    ));
}

#[test]
fn finer_steps_agree_with_default_solver() {
    let fine = SolverOptions { substeps_per_day: 16, ..SolverOptions::default() };
    let run = |solver: &SolverOptions| {
        simulate_with(
            &single_cohort_initial(),
            &ContactMatrix::uniform(1, 10.0),
            &InterventionMatrices::new(),
            &[],
            &no_override(),
            120,
            &single_cohort_params(),
            solver,
        )
        .unwrap()
    };
    let coarse = run(&SolverOptions::default());
    let fine = run(&fine);
    let (a, b) = (coarse.compartment_total(Compartment::Dead), fine.compartment_total(Compartment::Dead));
    assert!((a[120] - b[120]).abs() / b[120] < 1e-3, "{} vs {}", a[120], b[120]);
}
