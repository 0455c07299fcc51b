//! Immutable evaluation context.
//!
//! Everything that depends only on the configuration and the observation is
//! computed once here:
//!
//! - grid lookup tables (`GridIndex`)
//! - the `A(λ)/A(V)` profile of the active extinction curve
//! - the likelihood mask
//! - the unscaled nebular continuum and a dense log Q table
//!
//! After `build` nothing is mutated, so a context can be shared across threads
//! by reference.

use crate::domain::{FitSpec, Observation, PriorBounds, Theta};
use crate::error::FitError;
use crate::fit::{ForwardModel, Mask, PosteriorEvaluator};
use crate::grid::{GridIndex, GridPoint, IonizationTable, ModelGrid};
use crate::models::extinction::{ExtinctionLaw, attenuate};
use crate::models::nebular::{NebularContinuumModel, scale_factor};

/// Relative tolerance used when comparing grid and observation wavelengths.
const WAVELENGTH_RTOL: f64 = 1e-6;

#[derive(Debug, Clone)]
struct NebularTerm {
    model: NebularContinuumModel,
    table: IonizationTable,
    /// Unscaled continuum on the observation bins.
    continuum: Vec<f64>,
    /// `log_q[m][a]`, positions as in `GridIndex`; `None` where the table has no entry.
    log_q: Vec<Vec<Option<f64>>>,
}

/// Stellar, nebular and final (reddened) model spectra for one parameter vector.
#[derive(Debug, Clone)]
pub struct ModelComponents {
    pub stellar: Vec<f64>,
    pub nebular: Option<Vec<f64>>,
    pub model: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct FitContext {
    grid: ModelGrid,
    index: GridIndex,
    observation: Observation,
    bounds: PriorBounds,
    law: ExtinctionLaw,
    r_v: f64,
    profile: Vec<f64>,
    mask: Mask,
    nebular: Option<NebularTerm>,
}

impl FitContext {
    /// Validate the configuration against the inputs and precompute everything
    /// that does not depend on θ.
    pub fn build(
        grid: ModelGrid,
        ionization: Option<IonizationTable>,
        observation: Observation,
        spec: &FitSpec,
    ) -> Result<Self, FitError> {
        spec.prior_bounds.validate()?;
        for advisory in spec.prior_bounds.advisories() {
            log::warn!("{advisory}");
        }

        let law = spec.extinction_law.active_law()?;
        log::info!("{}", law.confirmation());
        let index = GridIndex::ingest(&grid)?;

        if grid.n_bins() != observation.len() {
            return Err(FitError::InvalidConfiguration(format!(
                "model grid has {} wavelength bins but the observation has {}; both must share the same binning",
                grid.n_bins(),
                observation.len()
            )));
        }
        if let Some(model_wl) = grid.wavelength() {
            let differs = model_wl
                .iter()
                .zip(observation.wavelength())
                .any(|(m, o)| (m - o).abs() > WAVELENGTH_RTOL * o.abs());
            if differs {
                log::warn!("model grid and observation wavelengths differ; bins are matched by position");
            }
        }

        let curve = law.curve();
        let profile = curve.profile(observation.wavelength())?;

        let mask = Mask::build(&spec.mask_windows, observation.wavelength());
        if mask.included() == 0 {
            return Err(FitError::InvalidConfiguration(
                "mask windows exclude every wavelength bin".into(),
            ));
        }

        let nebular = if spec.nebular {
            let table = ionization.ok_or_else(|| {
                FitError::InvalidConfiguration(
                    "nebular continuum is enabled but no ionization table was provided".into(),
                )
            })?;
            Some(NebularTerm::build(table, &index, observation.wavelength()))
        } else {
            None
        };

        log::debug!(
            "fit context: {} metallicities x {} ages, {} of {} bins unmasked, law {law}",
            index.metallicities().len(),
            index.ages().len(),
            mask.included(),
            mask.len()
        );

        Ok(Self {
            grid,
            index,
            observation,
            bounds: spec.prior_bounds,
            law,
            r_v: curve.r_v(),
            profile,
            mask,
            nebular,
        })
    }

    pub fn evaluator(&self) -> PosteriorEvaluator<'_, FitContext> {
        PosteriorEvaluator::new(&self.bounds, &self.observation, &self.mask, self)
    }

    pub fn index(&self) -> &GridIndex {
        &self.index
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn bounds(&self) -> &PriorBounds {
        &self.bounds
    }

    pub fn law(&self) -> ExtinctionLaw {
        self.law
    }

    pub fn r_v(&self) -> f64 {
        self.r_v
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn nebular_enabled(&self) -> bool {
        self.nebular.is_some()
    }

    /// Snapped grid point for `theta`.
    pub fn snap(&self, theta: &Theta) -> GridPoint {
        self.index.snap(theta.log_age(), theta.log_z())
    }

    /// Stellar flux of the snapped model scaled by `10^log_amp`.
    fn stellar(&self, point: GridPoint, log_amp: f64) -> Vec<f64> {
        let (ext, col) = self.index.locate(point);
        let amp = 10f64.powf(log_amp);
        self.grid.flux(ext, col).iter().map(|f| f * amp).collect()
    }

    /// Every model piece separately, for exports.
    pub fn components(&self, theta: &Theta) -> Result<ModelComponents, FitError> {
        let point = self.snap(theta);
        let stellar = self.stellar(point, theta.log_amp());
        let nebular = match &self.nebular {
            Some(term) => Some(term.model.scale(
                &term.continuum,
                &self.index.metallicity(point).label,
                &self.index.age(point).label,
                &term.table,
                theta.log_amp(),
            )?),
            None => None,
        };
        let model = self.build_model(theta)?;
        Ok(ModelComponents {
            stellar,
            nebular,
            model,
        })
    }
}

impl NebularTerm {
    fn build(table: IonizationTable, index: &GridIndex, wavelength: &[f64]) -> Self {
        let model = NebularContinuumModel::default();
        let continuum = model.continuum(wavelength);
        let log_q: Vec<Vec<Option<f64>>> = index
            .metallicities()
            .iter()
            .map(|m| {
                index
                    .ages()
                    .iter()
                    .map(|a| table.log_q(&m.label, &a.label).ok())
                    .collect()
            })
            .collect();

        let missing = log_q.iter().flatten().filter(|q| q.is_none()).count();
        if missing > 0 {
            log::warn!("ionization table is missing {missing} grid models; proposals snapping to them will fail");
        }

        Self {
            model,
            table,
            continuum,
            log_q,
        }
    }
}

impl ForwardModel for FitContext {
    /// Snap, scale, add the nebular continuum, then redden.
    fn build_model(&self, theta: &Theta) -> Result<Vec<f64>, FitError> {
        let point = self.snap(theta);
        let mut model = self.stellar(point, theta.log_amp());

        if let Some(term) = &self.nebular {
            let log_q = match term.log_q[point.metallicity][point.age] {
                Some(q) => q,
                None => term.table.log_q(
                    &self.index.metallicity(point).label,
                    &self.index.age(point).label,
                )?,
            };
            let factor = scale_factor(log_q, theta.log_amp());
            for (m, c) in model.iter_mut().zip(&term.continuum) {
                *m += c * factor;
            }
        }

        Ok(attenuate(&model, &self.profile, self.r_v * theta.ebv()))
    }

    fn describe(&self, theta: &Theta) -> Option<String> {
        let point = self.snap(theta);
        Some(format!(
            "{} / log age {}",
            self.index.metallicity(point).label,
            self.index.age(point).label
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::grid::GridExtension;
    use crate::models::extinction::{ExtinctionCurve, ExtinctionEngine};

    pub(crate) const WL: [f64; 5] = [4000.0, 4500.0, 5000.0, 5500.0, 6000.0];

    fn extension(name: &str, scale: f64) -> GridExtension {
        GridExtension::new(
            name,
            vec!["WL".into(), "6.0".into(), "6.5".into(), "7.0".into()],
            vec![
                WL.to_vec(),
                vec![1.0 * scale; 5],
                vec![2.0 * scale; 5],
                vec![3.0 * scale; 5],
            ],
        )
        .unwrap()
    }

    pub(crate) fn grid() -> ModelGrid {
        ModelGrid::new(vec![extension("Z002", 1.0), extension("Z020", 10.0)]).unwrap()
    }

    pub(crate) fn ion_table() -> IonizationTable {
        IonizationTable::new(
            vec!["6.0".into(), "6.5".into(), "7.0".into()],
            vec![
                ("Z002".into(), vec![52.0, 51.0, 50.0]),
                ("Z020".into(), vec![52.5, 51.5, 50.5]),
            ],
        )
        .unwrap()
    }

    pub(crate) fn observation() -> Observation {
        Observation::new(WL.to_vec(), vec![2.0; 5], vec![0.1; 5]).unwrap()
    }

    pub(crate) fn context(spec: &FitSpec) -> FitContext {
        FitContext::build(grid(), Some(ion_table()), observation(), spec).unwrap()
    }

    fn stellar_only() -> FitSpec {
        FitSpec {
            nebular: false,
            ..FitSpec::default()
        }
    }

    #[test]
    fn snaps_and_scales_stellar_flux() {
        let ctx = context(&stellar_only());
        // log Z = -1.75 -> Z = 0.0178, nearest Z020; log age 6.6 -> 6.5
        let model = ctx.build_model(&Theta::new(6.6, -1.75, 0.0, 0.5)).unwrap();
        let expected = 20.0 * 10f64.powf(0.5);
        for m in model {
            assert!((m - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn reddening_uses_the_active_curve() {
        let mut spec = stellar_only();
        spec.extinction_law = ExtinctionEngine::new(ExtinctionLaw::Calzetti);
        let ctx = context(&spec);
        let theta = Theta::new(6.0, -2.7, 0.3, 0.0);
        let model = ctx.build_model(&theta).unwrap();
        let direct = crate::models::extinction::Calzetti00
            .redden(&WL, 0.3, &[1.0; 5])
            .unwrap();
        assert_eq!(model, direct);
    }

    #[test]
    fn unreddened_model_adds_the_scaled_nebular_continuum() {
        let ctx = context(&FitSpec::default());
        let theta = Theta::new(6.0, -2.7, 0.0, -1.0);
        let model = ctx.build_model(&theta).unwrap();
        let continuum = NebularContinuumModel::default().continuum(&WL);
        let factor = scale_factor(52.0, -1.0);
        for (m, c) in model.iter().zip(continuum) {
            assert!((m - (0.1 + c * factor)).abs() < 1e-9 * m.abs());
        }
    }

    #[test]
    fn reddening_applies_to_the_nebular_continuum_too() {
        let spec = FitSpec {
            extinction_law: ExtinctionEngine::new(ExtinctionLaw::Calzetti),
            ..FitSpec::default()
        };
        let ctx = context(&spec);
        let parts = ctx.components(&Theta::new(6.0, -2.7, 0.3, -1.0)).unwrap();
        let nebular = parts.nebular.unwrap();

        let total: Vec<f64> = parts.stellar.iter().zip(&nebular).map(|(s, n)| s + n).collect();
        let expected = crate::models::extinction::Calzetti00.redden(&WL, 0.3, &total).unwrap();
        for (m, e) in parts.model.iter().zip(&expected) {
            assert!((m - e).abs() <= 1e-12 * e.abs(), "{m} != {e}");
        }

        let stellar_only_reddened = crate::models::extinction::Calzetti00
            .redden(&WL, 0.3, &parts.stellar)
            .unwrap();
        let reddened_after: Vec<f64> = stellar_only_reddened.iter().zip(&nebular).map(|(s, n)| s + n).collect();
        assert!(
            parts
                .model
                .iter()
                .zip(&reddened_after)
                .all(|(m, r)| (m - r).abs() > 1e-6 * r.abs()),
            "nebular light escaped reddening: {:?} vs {reddened_after:?}",
            parts.model
        );
    }

    #[test]
    fn components_sum_to_the_unreddened_model() {
        let ctx = context(&FitSpec::default());
        let parts = ctx.components(&Theta::new(6.5, -1.7, 0.0, 0.0)).unwrap();
        let nebular = parts.nebular.unwrap();
        for ((s, n), m) in parts.stellar.iter().zip(&nebular).zip(&parts.model) {
            assert!((s + n - m).abs() < 1e-9 * m.abs());
        }
    }

    #[test]
    fn missing_ionization_entry_is_a_lookup_error_at_evaluation() {
        let partial = IonizationTable::new(
            vec!["6.0".into(), "6.5".into(), "7.0".into()],
            vec![("Z002".into(), vec![52.0, 51.0, 50.0])],
        )
        .unwrap();
        let ctx = FitContext::build(grid(), Some(partial), observation(), &FitSpec::default()).unwrap();
        assert!(ctx.build_model(&Theta::new(6.0, -2.7, 0.1, 0.0)).is_ok());
        let err = ctx.build_model(&Theta::new(6.0, -1.7, 0.1, 0.0)).unwrap_err();
        assert!(matches!(err, FitError::Lookup(_)));
    }

    #[test]
    fn nebular_without_table_is_a_configuration_error() {
        let err = FitContext::build(grid(), None, observation(), &FitSpec::default()).unwrap_err();
        assert!(matches!(err, FitError::InvalidConfiguration(_)));
    }

    #[test]
    fn bin_count_mismatch_is_a_configuration_error() {
        let obs = Observation::new(vec![4000.0, 4500.0], vec![1.0, 1.0], vec![0.1, 0.1]).unwrap();
        let err = FitContext::build(grid(), None, obs, &stellar_only()).unwrap_err();
        assert!(matches!(err, FitError::InvalidConfiguration(_)));
    }

    #[test]
    fn fully_masked_observation_is_rejected() {
        let spec = FitSpec {
            mask_windows: vec![[4000.0, 6000.0]],
            ..stellar_only()
        };
        let err = FitContext::build(grid(), None, observation(), &spec).unwrap_err();
        assert!(matches!(err, FitError::InvalidConfiguration(_)));
    }

    #[test]
    fn describe_names_the_snapped_model() {
        let ctx = context(&stellar_only());
        let text = ctx.describe(&Theta::new(6.9, -2.7, 0.1, 0.0)).unwrap();
        assert_eq!(text, "Z002 / log age 7.0");
    }
}
