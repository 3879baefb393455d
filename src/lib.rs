#![deny(
    missing_docs,
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

//! `mixtime` measures mixing times of discrete spin systems on complete graphs, tori and
//! general graphs.
//!
//! Two families of measurements are offered:
//! - coupling times: two chains started at extremal states are driven by one random stream
//!   until they agree. Heat bath rules exist for the Curie-Weiss model, the nearest neighbor
//!   Ising model on the torus and the hardcore model, plus Metropolis filtered versions of the
//!   two Ising variants.
//! - hitting times: a single Potts chain under Swendsen-Wang cluster updates is run from one
//!   reference type vector to another.
//!
//! The `sweep` module repeats trials over a range of strengths and writes result files, with
//! trials spread over a rayon pool under the `parallel` feature. The `serialize` feature adds
//! serde derives.
//!
//! # Coupling Example
//! ```
//! use mixtime::trial::*;
//! use rand::prelude::*;
//!
//! let mut rng = rand::thread_rng();
//! // Heat bath on K_50 with alpha = 0.5
//! let params = ModelParams::CurieWeiss { alpha: 0.5 };
//! let iterations = run_trial(50, &params, Mode::Coupling, &mut rng).unwrap();
//! assert!(iterations >= 50 / 2);
//! ```
//!
//! # Swendsen-Wang Example
//! ```
//! use mixtime::cluster::SwendsenWang;
//! use mixtime::convergence::TypeVectorTarget;
//! use mixtime::graph::Topology;
//! use rand::prelude::*;
//!
//! let mut rng = rand::thread_rng();
//! // 3 colors on K_18, from 12/3/3 to 6/6/6.
//! let target = TypeVectorTarget::Balanced;
//! let mut sw = SwendsenWang::for_target(Topology::Complete(18), 3, 1.0, target).unwrap();
//! let outcome = sw.run_to_target(target, None, &mut rng).unwrap();
//! assert!(outcome.converged());
//! assert_eq!(sw.current().tallies(), &[6, 6, 6]);
//! ```

/// Cluster updates and the edge sets they use.
pub mod cluster;
/// Stopping rules.
pub mod convergence;
/// Coupled single site update rules.
pub mod coupling;
/// Error types.
pub mod errors;
/// Graph topologies.
pub mod graph;
/// Configurations and coupled pairs.
pub mod state;
/// Parameter sweeps and result files.
pub mod sweep;
/// Single trials.
pub mod trial;

pub use errors::{MixError, MixResult};
pub use trial::{run_trial, run_trial_with_options, ModelParams, Mode, TrialOptions};
