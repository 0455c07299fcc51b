use crate::domain::Theta;
use crate::error::FitError;

/// Maps a parameter vector to a model spectrum on the observation's bins.
///
/// `FitContext` is the production implementation; tests substitute their own.
pub trait ForwardModel: Sync {
    fn build_model(&self, theta: &Theta) -> Result<Vec<f64>, FitError>;

    /// Short description of the grid model `theta` resolves to, for reports.
    fn describe(&self, _theta: &Theta) -> Option<String> {
        None
    }
}
