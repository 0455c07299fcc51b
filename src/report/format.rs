//! Formatted terminal output.
//!
//! Formatting lives here so the fitting code stays free of presentation.

use crate::domain::Axis;
use crate::fit::{Evaluation, FitContext};
use crate::report::PosteriorSummary;

/// Describe a freshly built fit context.
pub fn format_context_summary(ctx: &FitContext) -> String {
    let mut out = String::new();
    let index = ctx.index();
    let obs = ctx.observation();
    let wl = obs.wavelength();

    out.push_str("=== sesamme - SSP fit context ===\n");

    let metals: Vec<&str> = index.metallicities().iter().map(|m| m.label.as_str()).collect();
    out.push_str(&format!(
        "Grid: {} metallicities [{}] x {} ages\n",
        metals.len(),
        metals.join(", "),
        index.ages().len()
    ));
    if let (Some(first), Some(last)) = (index.ages().first(), index.ages().last()) {
        out.push_str(&format!("Ages: log(age/yr) {} .. {}\n", first.label, last.label));
    }
    out.push_str(&format!(
        "Observation: n={} | wavelength=[{:.1}, {:.1}] A\n",
        obs.len(),
        wl.first().copied().unwrap_or(f64::NAN),
        wl.last().copied().unwrap_or(f64::NAN)
    ));
    out.push_str(&format!(
        "Mask: {} of {} bins used in the likelihood\n",
        ctx.mask().included(),
        ctx.mask().len()
    ));
    out.push_str(&format!("Extinction: {} (R_V = {:.2})\n", ctx.law(), ctx.r_v()));
    out.push_str(&format!(
        "Nebular continuum: {}\n",
        if ctx.nebular_enabled() { "on" } else { "off" }
    ));

    out.push_str("\nPrior support:\n");
    let bounds = ctx.bounds();
    for axis in Axis::ALL {
        let iv = bounds.get(axis);
        let (open, close) = match axis {
            Axis::Age | Axis::Metallicity => ('[', ']'),
            Axis::Ebv | Axis::Amplitude => ('(', ')'),
        };
        out.push_str(&format!("- {:<12} {open}{}, {}{close}\n", axis.label(), iv.lo, iv.hi));
    }

    out
}

/// Tabulate prior / likelihood / posterior for each evaluated vector.
pub fn format_evaluations(evaluations: &[Evaluation]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:>8} {:>8} {:>8} {:>8} {:>10} {:>14} {:>14}  {}\n",
        "log_age", "log_z", "ebv", "log_amp", "ln prior", "ln like", "ln post", "grid model"
    ));
    out.push_str(&format!(
        "{:-<8} {:-<8} {:-<8} {:-<8} {:-<10} {:-<14} {:-<14}  {:-<10}\n",
        "", "", "", "", "", "", "", ""
    ));

    for e in evaluations {
        let t = &e.theta;
        out.push_str(
            format!(
                "{:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>10} {:>14} {:>14}  {}\n",
                t.log_age(),
                t.log_z(),
                t.ebv(),
                t.log_amp(),
                fmt_ln(e.log_prior),
                e.log_likelihood.map(fmt_ln).unwrap_or_else(|| "-".to_string()),
                fmt_ln(e.log_posterior),
                e.grid_model.as_deref().unwrap_or(""),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// `label = median -minus +plus` per axis.
pub fn format_posterior_summary(summary: &PosteriorSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Posterior summary (n={} samples, 16/50/84%):\n", summary.n_samples));
    for a in &summary.axes {
        out.push_str(&format!(
            "{:<12} = {:.3} -{:.3} +{:.3}\n",
            a.axis.label(),
            a.median,
            a.minus(),
            a.plus()
        ));
    }
    out
}

fn fmt_ln(v: f64) -> String {
    if v == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{v:.4}")
    }
}
