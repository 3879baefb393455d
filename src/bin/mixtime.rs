use anyhow::{bail, Context};
use mixtime::convergence::{CouplingCriterion, TypeVectorTarget};
use mixtime::coupling::ExclusionCheck;
use mixtime::sweep::{
    run_sweep, save_results, write_results, write_timed_results, ParameterRange, SweepConfig,
};
use mixtime::trial::{Lattice, ModelParams, TrialOptions};
use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

#[derive(Debug, Clone, Copy)]
enum ModelKind {
    CurieWeiss,
    Torus,
    IndependentSet,
    CurieWeissMetropolis,
    TorusMetropolis,
    SwendsenWang,
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "curie-weiss" => Ok(ModelKind::CurieWeiss),
            "torus" => Ok(ModelKind::Torus),
            "independent-set" => Ok(ModelKind::IndependentSet),
            "curie-weiss-metropolis" => Ok(ModelKind::CurieWeissMetropolis),
            "torus-metropolis" => Ok(ModelKind::TorusMetropolis),
            "swendsen-wang" => Ok(ModelKind::SwendsenWang),
            _ => Err(format!("unknown model {}", s)),
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "mixtime",
    about = "Measure mixing times over a sweep of coupling strengths"
)]
struct Opt {
    /// curie-weiss, torus, independent-set, curie-weiss-metropolis, torus-metropolis or
    /// swendsen-wang
    model: ModelKind,
    /// Number of sites (complete graphs) or side length (tori and grids)
    n: usize,
    /// Trials per strength value
    k: usize,
    /// First strength value
    low: f64,
    /// Last strength value
    high: f64,
    /// Strength increment
    step: f64,

    /// Number of Potts colors
    #[structopt(long, default_value = "3")]
    q: usize,
    /// Type vector target for swendsen-wang: balanced or dominant
    #[structopt(long, default_value = "balanced")]
    target: String,
    /// Graph for swendsen-wang: complete or torus
    #[structopt(long, default_value = "complete")]
    lattice: String,
    /// Check occupation against each chain's own neighbors instead of the other chain's
    #[structopt(long)]
    own_chain: bool,
    /// Stop coupling when the type vectors match instead of every site
    #[structopt(long)]
    match_tallies: bool,
    /// Seed for the random streams
    #[structopt(long, default_value = "0")]
    seed: u64,
    /// Give up on a trial after this many iterations
    #[structopt(long)]
    max_iterations: Option<u64>,
    /// Directory for result files
    #[structopt(long, parse(from_os_str), default_value = "results")]
    out_dir: PathBuf,
    /// Print results instead of writing a file
    #[structopt(long)]
    stdout: bool,
    /// Add the wall clock seconds of each trial to printed results
    #[structopt(long)]
    timed: bool,
}

fn model_params(opt: &Opt) -> anyhow::Result<ModelParams> {
    let params = match opt.model {
        ModelKind::CurieWeiss => ModelParams::CurieWeiss { alpha: opt.low },
        ModelKind::Torus => ModelParams::TorusIsing { beta: opt.low },
        ModelKind::IndependentSet => ModelParams::IndependentSet {
            lambda: opt.low,
            check: if opt.own_chain {
                ExclusionCheck::OwnChain
            } else {
                ExclusionCheck::OpposingChain
            },
        },
        ModelKind::CurieWeissMetropolis => ModelParams::CurieWeissMetropolis { beta: opt.low },
        ModelKind::TorusMetropolis => ModelParams::TorusMetropolis { beta: opt.low },
        ModelKind::SwendsenWang => {
            let target = match opt.target.as_str() {
                "balanced" => TypeVectorTarget::Balanced,
                "dominant" => TypeVectorTarget::Dominant,
                other => bail!("unknown target {}", other),
            };
            let lattice = match opt.lattice.as_str() {
                "complete" => Lattice::Complete,
                "torus" => Lattice::Torus,
                other => bail!("unknown lattice {}", other),
            };
            ModelParams::Potts {
                c: opt.low,
                q: opt.q,
                target,
                lattice,
            }
        }
    };
    Ok(params)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();

    let range = ParameterRange::new(opt.low, opt.high, opt.step)?;
    let params = model_params(&opt)?;
    let mut options = TrialOptions::default();
    if let Some(max_iterations) = opt.max_iterations {
        options = options.with_max_iterations(max_iterations);
    }
    if opt.match_tallies {
        options = options.with_criterion(CouplingCriterion::MatchingTallies);
    }
    let config = SweepConfig::new(opt.n, opt.k, range, params)
        .with_seed(opt.seed)
        .with_options(options);

    let records = {
        measure_time::info_time!("{} sweep", config.label());
        run_sweep(&config)?
    };

    if opt.stdout && opt.timed {
        write_timed_results(std::io::stdout().lock(), &records)?;
    } else if opt.stdout {
        write_results(std::io::stdout().lock(), &records)?;
    } else {
        let path = save_results(&opt.out_dir, &config, &records)
            .with_context(|| format!("writing results to {}", opt.out_dir.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}
