//! Log-posterior evaluation.
//!
//! `log_posterior = log_prior + log_likelihood`, with the prior checked first:
//! a vector outside the support returns `-inf` without building a model.

use rayon::prelude::*;

use crate::domain::{Observation, PriorBounds, Theta};
use crate::error::FitError;
use crate::fit::{ForwardModel, Mask, likelihood, prior};

/// The callback an ensemble sampler drives.
pub trait LogPosterior: Sync {
    /// `Ok(-inf)` for statistical rejections; `Err` only for configuration problems.
    fn log_posterior(&self, theta: &Theta) -> Result<f64, FitError>;
}

/// Prior / likelihood / posterior breakdown for one parameter vector.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub theta: Theta,
    pub log_prior: f64,
    /// `None` when the prior rejected `theta` and no model was built.
    pub log_likelihood: Option<f64>,
    pub log_posterior: f64,
    pub grid_model: Option<String>,
}

pub struct PosteriorEvaluator<'a, M: ForwardModel + ?Sized> {
    bounds: &'a PriorBounds,
    observation: &'a Observation,
    mask: &'a Mask,
    model: &'a M,
}

impl<'a, M: ForwardModel + ?Sized> PosteriorEvaluator<'a, M> {
    pub fn new(bounds: &'a PriorBounds, observation: &'a Observation, mask: &'a Mask, model: &'a M) -> Self {
        Self {
            bounds,
            observation,
            mask,
            model,
        }
    }

    pub fn log_prior(&self, theta: &Theta) -> Result<f64, FitError> {
        prior::log_prior(self.bounds, theta)
    }

    /// Build the model for `theta` and score it against the observation.
    pub fn log_likelihood(&self, theta: &Theta) -> Result<f64, FitError> {
        let model = self.model.build_model(theta)?;
        if model.len() != self.observation.len() {
            return Err(FitError::InvalidConfiguration(format!(
                "model has {} bins but the observation has {}",
                model.len(),
                self.observation.len()
            )));
        }
        Ok(likelihood::log_likelihood(self.observation, &model, self.mask))
    }

    pub fn log_posterior(&self, theta: &Theta) -> Result<f64, FitError> {
        let lp = self.log_prior(theta)?;
        if !lp.is_finite() {
            return Ok(f64::NEG_INFINITY);
        }
        Ok(lp + self.log_likelihood(theta)?)
    }

    pub fn evaluate(&self, theta: &Theta) -> Result<Evaluation, FitError> {
        let log_prior = self.log_prior(theta)?;
        let log_likelihood = if log_prior.is_finite() {
            Some(self.log_likelihood(theta)?)
        } else {
            None
        };
        Ok(Evaluation {
            theta: *theta,
            log_prior,
            log_likelihood,
            log_posterior: log_likelihood.map_or(f64::NEG_INFINITY, |ll| log_prior + ll),
            grid_model: self.model.describe(theta),
        })
    }

    /// Evaluate a walker ensemble in parallel. Output order matches `thetas`.
    pub fn log_posterior_batch(&self, thetas: &[Theta]) -> Result<Vec<f64>, FitError> {
        thetas.par_iter().map(|t| self.log_posterior(t)).collect()
    }

    pub fn evaluate_batch(&self, thetas: &[Theta]) -> Result<Vec<Evaluation>, FitError> {
        thetas.par_iter().map(|t| self.evaluate(t)).collect()
    }
}

impl<M: ForwardModel + ?Sized> LogPosterior for PosteriorEvaluator<'_, M> {
    fn log_posterior(&self, theta: &Theta) -> Result<f64, FitError> {
        PosteriorEvaluator::log_posterior(self, theta)
    }
}
