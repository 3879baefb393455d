extern crate mixtime;
extern crate rand;
use mixtime::convergence::CouplingCriterion;
use mixtime::coupling::*;
use mixtime::state::{Alphabet, CoupledPair};
use mixtime::trial::*;
use rand::prelude::SmallRng;
use rand::SeedableRng;

fn true_diff(pair: &CoupledPair) -> usize {
    pair.x()
        .spins()
        .iter()
        .zip(pair.y().spins())
        .filter(|(a, b)| a != b)
        .count()
}

fn true_tallies(spins: &[usize], q: usize) -> Vec<usize> {
    let mut counts = vec![0; q];
    spins.iter().for_each(|s| counts[*s] += 1);
    counts
}

fn check_invariants<C: CouplingRule>(rule: &C, steps: usize, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut pair = rule.initial_pair().unwrap();
    for _ in 0..steps {
        rule.step(&mut pair, &mut rng).unwrap();
        assert_eq!(pair.diff_count(), true_diff(&pair));
        assert_eq!(pair.x().tallies(), true_tallies(pair.x().spins(), 2).as_slice());
        assert_eq!(pair.y().tallies(), true_tallies(pair.y().spins(), 2).as_slice());
        if pair.is_coupled() {
            break;
        }
    }
}

#[test]
fn diff_count_invariant_all_rules() {
    for seed in 0..5 {
        check_invariants(&CurieWeissHeatBath::new(12, 1.3).unwrap(), 2000, seed);
        check_invariants(&TorusHeatBath::new(5, 0.4).unwrap(), 2000, seed);
        check_invariants(
            &IndependentSetHeatBath::new(4, 1.5, ExclusionCheck::OpposingChain).unwrap(),
            2000,
            seed,
        );
        check_invariants(
            &IndependentSetHeatBath::new(4, 1.5, ExclusionCheck::OwnChain).unwrap(),
            2000,
            seed,
        );
        check_invariants(&CurieWeissMetropolis::new(12, 0.2).unwrap(), 2000, seed);
        check_invariants(&TorusMetropolis::new(5, 0.3).unwrap(), 2000, seed);
    }
}

/// With equal probabilities in both chains a site which agrees must keep agreeing.
fn check_absorbing<C: CouplingRule>(rule: &C, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut pair = rule.initial_pair().unwrap();
    let mut last_diff = pair.diff_count();
    while !pair.is_coupled() {
        let agreed: Vec<bool> = pair
            .x()
            .spins()
            .iter()
            .zip(pair.y().spins())
            .map(|(a, b)| a == b)
            .collect();
        rule.step(&mut pair, &mut rng).unwrap();
        for (site, was_same) in agreed.into_iter().enumerate() {
            if was_same {
                assert_eq!(pair.x().get(site), pair.y().get(site));
            }
        }
        assert!(pair.diff_count() <= last_diff);
        last_diff = pair.diff_count();
    }
}

#[test]
fn agreement_absorbing_at_zero_strength() {
    for seed in 0..20 {
        check_absorbing(&CurieWeissHeatBath::new(10, 0.0).unwrap(), seed);
        check_absorbing(&TorusHeatBath::new(4, 0.0).unwrap(), seed);
    }
}

/// Heat bath Ising couplings are monotone: X starts above Y and stays above.
fn check_ordered<C: CouplingRule>(rule: &C, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut pair = rule.initial_pair().unwrap();
    let mut steps = 0;
    while !pair.is_coupled() && steps < 100_000 {
        rule.step(&mut pair, &mut rng).unwrap();
        assert!(pair
            .x()
            .spins()
            .iter()
            .zip(pair.y().spins())
            .all(|(x, y)| x >= y));
        steps += 1;
    }
}

#[test]
fn heat_bath_preserves_order() {
    for seed in 0..10 {
        check_ordered(&CurieWeissHeatBath::new(15, 0.8).unwrap(), seed);
        check_ordered(&TorusHeatBath::new(4, 0.3).unwrap(), seed);
    }
}

#[test]
fn single_site_couples_in_one_step() {
    for seed in 0..50 {
        let mut rng = SmallRng::seed_from_u64(seed);
        for alpha in [0.0, 0.5, 3.0, 100.0] {
            let params = ModelParams::CurieWeiss { alpha };
            assert_eq!(run_trial(1, &params, Mode::Coupling, &mut rng).unwrap(), 1);
        }
        let params = ModelParams::TorusIsing { beta: 0.0 };
        assert_eq!(run_trial(1, &params, Mode::Coupling, &mut rng).unwrap(), 1);
    }
}

#[test]
fn independent_set_two_by_two() {
    let rule = IndependentSetHeatBath::new(2, 1.0, ExclusionCheck::OpposingChain).unwrap();
    let pair = rule.initial_pair().unwrap();
    assert_eq!(pair.diff_count(), 4);
    assert_eq!(pair.x().tally(Alphabet::OCCUPIED), 2);

    let params = ModelParams::IndependentSet {
        lambda: 1.0,
        check: ExclusionCheck::OpposingChain,
    };
    let options = TrialOptions::default().with_max_iterations(100_000);
    for seed in 0..50 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let outcome = run_trial_with_options(2, &params, Mode::Coupling, options, &mut rng).unwrap();
        assert!(outcome.converged());
        // Every site has to be touched at least once.
        assert!(outcome.iterations() >= 4);
    }
}

#[test]
fn curie_weiss_zero_alpha_is_coupon_collector() {
    // At alpha = 0 a site agrees forever once touched, so the coupling time is the coupon
    // collector time n * H_n.
    let n = 10;
    let expected: f64 = (1..=n).map(|i| n as f64 / i as f64).sum();
    let mut rng = SmallRng::seed_from_u64(1234);
    let params = ModelParams::CurieWeiss { alpha: 0.0 };
    let trials = 2000;
    let total: u64 = (0..trials)
        .map(|_| run_trial(n, &params, Mode::Coupling, &mut rng).unwrap())
        .sum();
    let mean = total as f64 / trials as f64;
    assert!((mean - expected).abs() < 2.5, "mean {} expected {}", mean, expected);
}

#[test]
fn seeded_trials_reproduce() {
    let params = ModelParams::TorusIsing { beta: 0.2 };
    let run = |seed| {
        let mut rng = SmallRng::seed_from_u64(seed);
        run_trial(6, &params, Mode::Coupling, &mut rng).unwrap()
    };
    assert_eq!(run(42), run(42));
    assert_eq!(run(7), run(7));
}

#[test]
fn matching_tallies_never_later_than_agreement() {
    let params = ModelParams::CurieWeiss { alpha: 0.9 };
    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let agree = run_trial(20, &params, Mode::Coupling, &mut rng).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        let options = TrialOptions::default().with_criterion(CouplingCriterion::MatchingTallies);
        let matched = run_trial_with_options(20, &params, Mode::Coupling, options, &mut rng)
            .unwrap()
            .iterations();
        assert!(matched <= agree);
    }
}

#[test]
fn metropolis_rules_couple() {
    for seed in 0..10 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let params = ModelParams::CurieWeissMetropolis { beta: 0.1 };
        assert!(run_trial(8, &params, Mode::Coupling, &mut rng).unwrap() >= 8);
        let params = ModelParams::TorusMetropolis { beta: 0.1 };
        assert!(run_trial(3, &params, Mode::Coupling, &mut rng).unwrap() >= 9);
    }
}

#[test]
fn extreme_strength_is_an_error() {
    let mut rng = SmallRng::seed_from_u64(1234);
    let params = ModelParams::TorusIsing { beta: 1e4 };
    assert!(run_trial(4, &params, Mode::Coupling, &mut rng).is_err());
    let params = ModelParams::CurieWeiss { alpha: f64::NAN };
    assert!(run_trial(4, &params, Mode::Coupling, &mut rng).is_err());
}
