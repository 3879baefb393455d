extern crate mixtime;
use mixtime::convergence::TypeVectorTarget;
use mixtime::sweep::*;
use mixtime::trial::*;
use std::fs;

fn outcomes(records: &[SweepRecord]) -> Vec<(f64, usize, u64, bool)> {
    records
        .iter()
        .map(|r| (r.parameter, r.repetition, r.iterations, r.converged))
        .collect()
}

fn curie_weiss_config(seed: u64) -> SweepConfig {
    let range = ParameterRange::new(0.0, 1.0, 0.25).unwrap();
    SweepConfig::new(12, 3, range, ModelParams::CurieWeiss { alpha: 0.0 }).with_seed(seed)
}

#[test]
fn records_in_sweep_order() {
    let config = curie_weiss_config(1234);
    let records = run_sweep(&config).unwrap();
    assert_eq!(records.len(), config.range.len() * config.k);
    assert_eq!(records.len(), 15);
    for (index, record) in records.iter().enumerate() {
        let expected = 0.25 * (index / 3) as f64;
        assert!((record.parameter - expected).abs() < 1e-12);
        assert_eq!(record.repetition, index % 3);
        assert!(record.converged);
        assert!(record.iterations >= 1);
    }
}

#[test]
fn sweeps_are_deterministic_in_seed() {
    let a = run_sweep(&curie_weiss_config(7)).unwrap();
    let b = run_sweep(&curie_weiss_config(7)).unwrap();
    assert_eq!(outcomes(&a), outcomes(&b));
    let c = run_sweep(&curie_weiss_config(8)).unwrap();
    assert_ne!(
        a.iter().map(|r| r.iterations).collect::<Vec<_>>(),
        c.iter().map(|r| r.iterations).collect::<Vec<_>>()
    );
}

#[test]
fn potts_sweep_uses_cluster_mode() {
    let range = ParameterRange::new(0.5, 1.5, 0.5).unwrap();
    let params = ModelParams::Potts {
        c: 0.0,
        q: 3,
        target: TypeVectorTarget::Balanced,
        lattice: Lattice::Complete,
    };
    let config = SweepConfig::new(9, 2, range, params).with_seed(3);
    assert_eq!(config.mode, Mode::Cluster);
    assert_eq!(config.label(), "swendsen-wang-3");
    let records = run_sweep(&config).unwrap();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.converged));
}

#[test]
fn capped_sweep_marks_records() {
    let range = ParameterRange::single(0.4).unwrap();
    let options = TrialOptions::default().with_max_iterations(3);
    let config = SweepConfig::new(10, 4, range, ModelParams::TorusIsing { beta: 0.4 })
        .with_options(options);
    let records = run_sweep(&config).unwrap();
    assert!(records.iter().all(|r| !r.converged && r.iterations == 3));
}

#[test]
fn sweep_errors_propagate() {
    let range = ParameterRange::new(0.0, 1.0, 0.5).unwrap();
    let config = SweepConfig::new(0, 2, range, ModelParams::TorusIsing { beta: 0.0 });
    assert!(run_sweep(&config).is_err());
}

#[test]
fn saved_results_have_a_line_per_record() {
    let config = curie_weiss_config(99);
    let records = run_sweep(&config).unwrap();
    let dir = std::env::temp_dir().join(format!("mixtime-sweep-test-{}", std::process::id()));
    let path = save_results(&dir, &config, &records).unwrap();
    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("curie-weiss-heat-bath:12:3:0.000000:1.000000:0.250000:"));
    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), records.len());
    for (line, record) in lines.iter().zip(&records) {
        let mut fields = line.split(' ');
        let parameter: f64 = fields.next().unwrap().parse().unwrap();
        let iterations: u64 = fields.next().unwrap().parse().unwrap();
        assert!((parameter - record.parameter).abs() < 1e-6);
        assert_eq!(iterations, record.iterations);
        assert!(fields.next().is_none());
    }
    fs::remove_dir_all(&dir).unwrap();
}
