use std::{error::Error, process::exit, time::Duration};

extern crate nalgebra as na;

mod config;
mod display;
mod error;
mod field;
mod ingest;
mod logging;
mod numeric;
mod predictor;
mod production;
mod render;
mod runloop;
mod updater;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use na::DMatrix;
use tracing::{error, info};

use config::{CliArgs, HeadlessSettings, InterfaceMode};
use display::WindowDisplay;
use field::FieldState;
use predictor::Predictor;
use runloop::RenderLoop;
use updater::FieldUpdater;

type ScalarField = DMatrix<f32>;
type VectorField = [ScalarField; 2];

const WINDOW_TITLE: &str = "Haber Flow";

fn main() {
    let args = CliArgs::parse();

    let log_handle = match logging::init(args.log_file()) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Failed to open log file {:?}: {err}", args.log_file());
            exit(1);
        }
    };

    let input = args.create_input();
    input.log();

    // temperature sweep of the production model; reported, not fed back
    // into the flow
    let temperatures = production::temperature_range();
    let curve = production::production_curve(&temperatures)
        .inspect_err(|err| {
            error!("Ammonia production computation failed: {err}");
            fatal(&format!("{err}"));
        })
        .unwrap();

    let (peak_idx, peak_yield) = curve
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |(bi, bv), (i, v)| {
            if *v > bv { (i, *v) } else { (bi, bv) }
        });
    info!(
        "ammonia production sweep complete; peak yield {:.3} at {:.0} K",
        peak_yield, temperatures[peak_idx]
    );

    // ingest tabular data if a directory was given; the records have no
    // consumer yet and are dropped after counting
    if let Some(data_dir) = &input.data_dir {
        let records = ingest::load_directory(data_dir)
            .inspect_err(|err| fatal(&format!("{err}")))
            .unwrap();

        let total_rows: usize = records.iter().map(|set| set.rows.len()).sum();
        info!(
            "ingested {} record sets ({} rows total)",
            records.len(),
            total_rows
        );
    }

    let predictor: Box<dyn Predictor> = input
        .predictor
        .build()
        .inspect_err(|err| {
            error!("Failed to build predictor: {err}");
            fatal(&format!("{err}"));
        })
        .unwrap();

    let mut state = FieldState::new(input.grid_size, input.inflow);
    state.initialize();
    state.apply_boundary();

    let mut sim = RenderLoop::new(
        state,
        FieldUpdater::new(input.damping),
        predictor,
        Duration::from_millis(input.frame_interval_ms),
    );

    let result = match &input.mode {
        InterfaceMode::Window => run_window(&mut sim),
        InterfaceMode::Headless(settings) => run_headless(&mut sim, settings),
    };

    if let Err(err) = result {
        error!("Run failed: {err}");
        log_handle.flush();
        eprintln!("error: {err}");
        exit(1);
    }

    log_handle.flush();
}

fn fatal(message: &str) -> ! {
    eprintln!("error: {message}");
    exit(1);
}

/// Drive the loop against a live window until the user quits.
fn run_window(sim: &mut RenderLoop<Box<dyn Predictor>>) -> Result<(), Box<dyn Error>> {
    let window = WindowDisplay::new(WINDOW_TITLE)?;

    sim.run(window)?;

    Ok(())
}

/// Drive a fixed number of steps without a window, saving one heatmap
/// frame per step.
fn run_headless(
    sim: &mut RenderLoop<Box<dyn Predictor>>,
    settings: &HeadlessSettings,
) -> Result<(), Box<dyn Error>> {
    display::prepare_frames_dir(&settings.frames_dir)?;

    let bar = ProgressBar::new(settings.steps as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "[Elapsed: {elapsed_precise}] [{bar:40.cyan/blue}] {percent}% (Remaining: {eta_precise})"
        )
        .unwrap()
        .progress_chars("##-"),
    );

    for i in 0..settings.steps {
        sim.advance();

        display::frame_save(
            &sim.field().compute_speed(),
            format!("{i}.png").as_str(),
            &settings.frames_dir,
        )?;

        bar.inc(1);
    }
    bar.finish();

    info!(
        "saved {} frames to {:?}",
        settings.steps, settings.frames_dir
    );

    Ok(())
}
