//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - initializes logging and `.env`
//! - parses CLI arguments
//! - builds the fit context
//! - evaluates, exports, summarizes, or launches a run

use clap::Parser;

use crate::app::launch::{AlwaysConfirm, Confirm, HandoffSampler, LaunchOutcome, PromptConfirm, RunPlan, launch};
use crate::cli::{Cli, Command, EvaluateArgs, InitArgs, InputArgs, ModelArgs, RunArgs, SummarizeArgs};
use crate::error::AppError;
use crate::fit::initial_positions;

pub mod launch;
pub mod pipeline;

/// Entry point for the `sesamme` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Check(args) => handle_check(args),
        Command::Evaluate(args) => handle_evaluate(args),
        Command::Model(args) => handle_model(args),
        Command::Init(args) => handle_init(args),
        Command::Summarize(args) => handle_summarize(args),
        Command::Run(args) => handle_run(args),
    }
}

fn handle_check(args: InputArgs) -> Result<(), AppError> {
    let loaded = pipeline::load_fit(&args)?;
    println!("{}", crate::report::format_context_summary(&loaded.context));
    Ok(())
}

fn handle_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let loaded = pipeline::load_fit(&args.input)?;

    let thetas = match (&args.theta, &args.thetas) {
        (Some(theta), _) => vec![*theta],
        (None, Some(path)) => crate::io::read_theta_csv(path)?,
        (None, None) => return Err(AppError::new(2, "Pass --theta or --thetas.")),
    };

    let evaluations = loaded.context.evaluator().evaluate_batch(&thetas)?;
    println!("{}", crate::report::format_evaluations(&evaluations));

    if let Some(path) = &args.export {
        crate::io::write_evaluations_csv(path, &evaluations)?;
        log::info!("Wrote {} evaluations to '{}'", evaluations.len(), path.display());
    }
    Ok(())
}

fn handle_model(args: ModelArgs) -> Result<(), AppError> {
    let loaded = pipeline::load_fit(&args.input)?;
    let ctx = &loaded.context;

    let components = ctx.components(&args.theta)?;
    crate::io::write_model_csv(&args.out, &args.theta, ctx.observation(), ctx.mask(), &components)?;
    log::info!("Wrote model spectrum for {} to '{}'", args.theta, args.out.display());
    Ok(())
}

fn handle_init(args: InitArgs) -> Result<(), AppError> {
    let mut spec = pipeline::load_spec(args.config.as_deref())?;
    if let Some(walkers) = args.walkers {
        spec.walkers = walkers;
    }
    if let Some(seed) = args.seed {
        spec.seed = seed;
    }

    let positions = initial_positions(&spec.initial_center, spec.walkers, spec.seed)?;
    crate::io::write_positions_csv(&args.out, &positions)?;
    println!(
        "Wrote {} walker positions around {} (seed {}) to '{}'",
        positions.len(),
        spec.initial_center,
        spec.seed,
        args.out.display()
    );
    Ok(())
}

fn handle_summarize(args: SummarizeArgs) -> Result<(), AppError> {
    let samples = crate::io::read_theta_csv(&args.samples)?;
    let summary = crate::report::summarize(&samples)?;
    println!("{}", crate::report::format_posterior_summary(&summary));
    Ok(())
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let loaded = pipeline::load_fit(&args.input)?;
    let plan = RunPlan::from_spec(&loaded.spec, loaded.context.law())?;

    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(PromptConfirm::stdio())
    };
    let mut sampler = HandoffSampler::new(&args.out_dir);
    let evaluator = loaded.context.evaluator();

    match launch(&plan, confirm.as_mut(), &mut sampler, &evaluator)? {
        LaunchOutcome::Cancelled => {}
        LaunchOutcome::Finished(handoff) => {
            println!(
                "Run plan written to '{}' ({} of {} walkers start inside the prior support)",
                handoff.plan_path.display(),
                handoff.in_support,
                handoff.walkers
            );
            println!("Initial positions written to '{}'", handoff.positions_path.display());
        }
    }
    Ok(())
}
