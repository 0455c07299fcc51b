//! CSV exports: model spectra, walker positions, evaluation tables.
//!
//! Every file starts with a `#` comment line carrying the creation time, which
//! the readers in this crate skip.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

use crate::domain::{Axis, Observation, Theta};
use crate::error::FitError;
use crate::fit::{Evaluation, Mask, ModelComponents};

/// Write the model spectrum for one parameter vector next to the observation.
pub fn write_model_csv(
    path: &Path,
    theta: &Theta,
    observation: &Observation,
    mask: &Mask,
    components: &ModelComponents,
) -> Result<(), FitError> {
    let mut out = create(path)?;
    let io = |e| FitError::io(path, e);

    writeln!(out, "# sesamme model, theta = {theta}, generated {}", timestamp()).map_err(io)?;
    writeln!(out, "wavelength,flux,error,included,stellar,nebular,model").map_err(io)?;
    for i in 0..observation.len() {
        writeln!(
            out,
            "{},{},{},{},{:.10e},{},{:.10e}",
            observation.wavelength()[i],
            observation.flux()[i],
            observation.error()[i],
            u8::from(mask.is_included(i)),
            components.stellar[i],
            components
                .nebular
                .as_ref()
                .map(|n| format!("{:.10e}", n[i]))
                .unwrap_or_default(),
            components.model[i],
        )
        .map_err(io)?;
    }
    out.flush().map_err(io)
}

/// Write walker positions, one row per walker.
pub fn write_positions_csv(path: &Path, positions: &[Theta]) -> Result<(), FitError> {
    let mut out = create(path)?;
    let io = |e| FitError::io(path, e);

    writeln!(out, "# sesamme initial positions, generated {}", timestamp()).map_err(io)?;
    let columns: Vec<&str> = Axis::ALL.iter().map(|a| a.column()).collect();
    writeln!(out, "walker,{}", columns.join(",")).map_err(io)?;
    for (i, p) in positions.iter().enumerate() {
        writeln!(out, "{i},{},{},{},{}", p.0[0], p.0[1], p.0[2], p.0[3]).map_err(io)?;
    }
    out.flush().map_err(io)
}

/// Write prior / likelihood / posterior per evaluated vector.
///
/// Rejected vectors have an empty `log_likelihood` and `-inf` posterior.
pub fn write_evaluations_csv(path: &Path, evaluations: &[Evaluation]) -> Result<(), FitError> {
    let mut out = create(path)?;
    let io = |e| FitError::io(path, e);

    writeln!(out, "# sesamme evaluations, generated {}", timestamp()).map_err(io)?;
    writeln!(out, "log_age,log_z,ebv,log_amp,log_prior,log_likelihood,log_posterior,grid_model").map_err(io)?;
    for e in evaluations {
        let t = &e.theta;
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            t.log_age(),
            t.log_z(),
            t.ebv(),
            t.log_amp(),
            e.log_prior,
            e.log_likelihood.map(|v| v.to_string()).unwrap_or_default(),
            e.log_posterior,
            e.grid_model.as_deref().unwrap_or(""),
        )
        .map_err(io)?;
    }
    out.flush().map_err(io)
}

fn create(path: &Path) -> Result<BufWriter<File>, FitError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| FitError::io(path, e))
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_theta_csv;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sesamme-{}-{name}", std::process::id()))
    }

    #[test]
    fn positions_round_trip_through_the_sample_reader() {
        let path = temp_path("positions.csv");
        let positions = vec![Theta::new(7.0, -2.0, 0.2, -2.0), Theta::new(6.9, -2.1, 0.25, -1.9)];
        write_positions_csv(&path, &positions).unwrap();
        let back = read_theta_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, positions);
    }

    #[test]
    fn evaluation_rows_leave_rejected_likelihood_blank() {
        let path = temp_path("evaluations.csv");
        let rows = [Evaluation {
            theta: Theta::new(9.0, -2.0, 0.2, -2.0),
            log_prior: f64::NEG_INFINITY,
            log_likelihood: None,
            log_posterior: f64::NEG_INFINITY,
            grid_model: None,
        }];
        write_evaluations_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let last = text.lines().last().unwrap();
        assert_eq!(last, "9,-2,0.2,-2,-inf,,-inf,");
    }
}
