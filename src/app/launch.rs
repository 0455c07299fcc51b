//! Run plan, confirmation and sampler hand-off.
//!
//! Sampling itself is an external concern. This module decides *whether* to
//! start (`Confirm`) and passes the posterior callback to whatever implements
//! `Sampler`. The shipped `HandoffSampler` writes the plan and the seeded
//! initial positions to disk for an external ensemble sampler.

use std::fs::File;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use chrono::Local;
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{FitSpec, Theta};
use crate::error::{AppError, FitError};
use crate::fit::{LogPosterior, initial_positions};
use crate::io::write_positions_csv;
use crate::models::extinction::ExtinctionLaw;

/// Everything a sampler needs to start.
#[derive(Debug, Clone, Serialize)]
pub struct RunPlan {
    pub extinction_law: ExtinctionLaw,
    pub walkers: usize,
    pub steps: usize,
    pub seed: u64,
    pub initial_positions: Vec<Theta>,
}

impl RunPlan {
    pub fn from_spec(spec: &FitSpec, law: ExtinctionLaw) -> Result<Self, FitError> {
        if spec.steps == 0 {
            return Err(FitError::InvalidConfiguration("chain length must be at least 1 step".into()));
        }
        Ok(Self {
            extinction_law: law,
            walkers: spec.walkers,
            steps: spec.steps,
            seed: spec.seed,
            initial_positions: initial_positions(&spec.initial_center, spec.walkers, spec.seed)?,
        })
    }

    pub fn describe(&self) -> String {
        format!(
            "Active extinction law = {}; Ensemble size = {}; Chain length = {}",
            self.extinction_law, self.walkers, self.steps
        )
    }
}

/// Decides whether a planned run should start.
pub trait Confirm {
    fn confirm(&mut self, plan: &RunPlan) -> Result<bool, AppError>;
}

/// Non-interactive confirmation (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, plan: &RunPlan) -> Result<bool, AppError> {
        log::info!("{}", plan.describe());
        Ok(true)
    }
}

/// Interactive y/n prompt.
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirm<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, plan: &RunPlan) -> Result<bool, AppError> {
        let io = |e: std::io::Error| AppError::new(4, format!("Confirmation prompt failed: {e}"));

        writeln!(self.output, "{}", plan.describe()).map_err(io)?;
        write!(self.output, "Begin a sesamme run with these parameters? (y/n)  ").map_err(io)?;
        self.output.flush().map_err(io)?;

        let mut answer = String::new();
        self.input.read_line(&mut answer).map_err(io)?;
        match answer.trim() {
            "y" | "Y" | "yes" | "YES" => Ok(true),
            "n" | "no" | "N" | "NO" => {
                writeln!(self.output, "Run canceled.").map_err(io)?;
                Ok(false)
            }
            _ => {
                writeln!(
                    self.output,
                    "Unknown response. Please use y / yes / Y / YES to begin or n / no / N / NO to change your mind."
                )
                .map_err(io)?;
                Ok(false)
            }
        }
    }
}

/// External sampler driving the posterior callback.
pub trait Sampler {
    type Output;

    fn run(&mut self, plan: &RunPlan, posterior: &dyn LogPosterior) -> Result<Self::Output, AppError>;
}

#[derive(Debug)]
pub enum LaunchOutcome<T> {
    Cancelled,
    Finished(T),
}

/// Confirm, then hand the posterior to the sampler.
pub fn launch<C, S>(
    plan: &RunPlan,
    confirm: &mut C,
    sampler: &mut S,
    posterior: &dyn LogPosterior,
) -> Result<LaunchOutcome<S::Output>, AppError>
where
    C: Confirm + ?Sized,
    S: Sampler,
{
    if !confirm.confirm(plan)? {
        return Ok(LaunchOutcome::Cancelled);
    }
    sampler.run(plan, posterior).map(LaunchOutcome::Finished)
}

/// Writes the run plan for an external ensemble sampler.
#[derive(Debug, Clone)]
pub struct HandoffSampler {
    out_dir: PathBuf,
}

/// Files written by `HandoffSampler` and a support check of the start ensemble.
#[derive(Debug, Clone)]
pub struct Handoff {
    pub plan_path: PathBuf,
    pub positions_path: PathBuf,
    pub walkers: usize,
    /// Initial walkers with a finite log posterior.
    pub in_support: usize,
}

#[derive(Serialize)]
struct PlanFile<'a> {
    created: String,
    #[serde(flatten)]
    plan: &'a RunPlan,
    /// `null` where the walker starts outside the prior support.
    initial_log_posterior: &'a [f64],
}

impl HandoffSampler {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

impl Sampler for HandoffSampler {
    type Output = Handoff;

    fn run(&mut self, plan: &RunPlan, posterior: &dyn LogPosterior) -> Result<Handoff, AppError> {
        std::fs::create_dir_all(&self.out_dir).map_err(|e| FitError::io(&self.out_dir, e))?;

        let log_post = plan
            .initial_positions
            .par_iter()
            .map(|t| posterior.log_posterior(t))
            .collect::<Result<Vec<f64>, FitError>>()?;
        let in_support = log_post.iter().filter(|v| v.is_finite()).count();
        if in_support < plan.walkers {
            log::warn!(
                "{} of {} initial walkers start outside the prior support",
                plan.walkers - in_support,
                plan.walkers
            );
        }

        let plan_path = self.out_dir.join("run_plan.json");
        let file = File::create(&plan_path).map_err(|e| FitError::io(&plan_path, e))?;
        let doc = PlanFile {
            created: Local::now().to_rfc3339(),
            plan,
            initial_log_posterior: &log_post,
        };
        serde_json::to_writer_pretty(file, &doc)
            .map_err(|e| AppError::new(4, format!("Failed to write '{}': {e}", plan_path.display())))?;

        let positions_path = self.out_dir.join("initial_positions.csv");
        write_positions_csv(&positions_path, &plan.initial_positions)?;

        Ok(Handoff {
            plan_path,
            positions_path,
            walkers: plan.walkers,
            in_support,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Flat;

    impl LogPosterior for Flat {
        fn log_posterior(&self, theta: &Theta) -> Result<f64, FitError> {
            Ok(if theta.ebv() > 0.0 { 0.0 } else { f64::NEG_INFINITY })
        }
    }

    /// Records whether it was started.
    #[derive(Default)]
    struct Recording {
        started: Cell<bool>,
    }

    impl Sampler for Recording {
        type Output = usize;

        fn run(&mut self, plan: &RunPlan, posterior: &dyn LogPosterior) -> Result<usize, AppError> {
            self.started.set(true);
            let mut n = 0;
            for t in &plan.initial_positions {
                if posterior.log_posterior(t)?.is_finite() {
                    n += 1;
                }
            }
            Ok(n)
        }
    }

    fn plan() -> RunPlan {
        let spec = FitSpec {
            walkers: 8,
            steps: 10,
            ..FitSpec::default()
        };
        RunPlan::from_spec(&spec, ExtinctionLaw::Ccm).unwrap()
    }

    fn prompt(answer: &str) -> (bool, String) {
        let mut out = Vec::new();
        let ok = PromptConfirm::new(answer.as_bytes(), &mut out).confirm(&plan()).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn prompt_accepts_the_usual_answers() {
        for yes in ["y\n", "Y\n", "yes\n", "YES\n"] {
            assert!(prompt(yes).0, "{yes:?}");
        }
        for no in ["n\n", "no\n", "N\n", "NO\n"] {
            let (ok, text) = prompt(no);
            assert!(!ok);
            assert!(text.contains("Run canceled."));
        }
    }

    #[test]
    fn unknown_answer_cancels_with_guidance() {
        let (ok, text) = prompt("maybe\n");
        assert!(!ok);
        assert!(text.contains("Unknown response"));
        assert!(text.contains("Ensemble size = 8; Chain length = 10"));
    }

    #[test]
    fn declined_launch_never_starts_the_sampler() {
        let mut sampler = Recording::default();
        let mut confirm = PromptConfirm::new("n\n".as_bytes(), std::io::sink());
        let outcome = launch(&plan(), &mut confirm, &mut sampler, &Flat).unwrap();
        assert!(matches!(outcome, LaunchOutcome::Cancelled));
        assert!(!sampler.started.get());
    }

    #[test]
    fn confirmed_launch_hands_over_the_posterior() {
        let mut sampler = Recording::default();
        let outcome = launch(&plan(), &mut AlwaysConfirm, &mut sampler, &Flat).unwrap();
        assert!(sampler.started.get());
        let LaunchOutcome::Finished(n) = outcome else {
            panic!("expected a finished run");
        };
        assert!(n <= 8);
    }

    #[test]
    fn handoff_writes_plan_and_positions() {
        let dir = std::env::temp_dir().join(format!("sesamme-handoff-{}", std::process::id()));
        let mut sampler = HandoffSampler::new(&dir);
        let handoff = sampler.run(&plan(), &Flat).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&handoff.plan_path).unwrap()).unwrap();
        assert_eq!(json["walkers"], 8);
        assert_eq!(json["extinction_law"], "CCM");
        assert_eq!(json["initial_positions"].as_array().unwrap().len(), 8);
        assert!(json["created"].is_string());

        let positions = crate::io::read_theta_csv(&handoff.positions_path).unwrap();
        assert_eq!(positions, plan().initial_positions);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn zero_steps_is_rejected() {
        let spec = FitSpec {
            steps: 0,
            ..FitSpec::default()
        };
        assert!(RunPlan::from_spec(&spec, ExtinctionLaw::Ccm).is_err());
    }
}
