// CLI arguments and run configuration

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    process::exit,
    sync::LazyLock,
};

use clap::{Parser, command};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    error::PredictorError,
    predictor::{IdentityPredictor, LearnedPredictor, Predictor, SmoothingPredictor},
};

static DEFAULT_FRAMES_PATH: LazyLock<&Path> = LazyLock::new(|| Path::new("sim-frames"));

// Raw, CLI input
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    #[arg(long, help = "An input file with pre-loaded parameters.")]
    input_json: Option<PathBuf>,

    #[arg(long, help = "Optional path to save the resolved input file to.")]
    input_json_savepath: Option<PathBuf>,

    #[arg(
        long,
        help = "The mode to run in: `window` or `headless`",
        default_value = "window"
    )]
    mode: String,

    #[arg(long, help = "Grid rows/columns (at least 2).", default_value = "20")]
    grid_size: usize,

    #[arg(long, help = "Inflow x velocity.", default_value = "0.1")]
    inflow_x: f32,

    #[arg(long, help = "Inflow y velocity.", default_value = "0.0")]
    inflow_y: f32,

    #[arg(long, help = "Damping factor in the velocity mix.", default_value = "0.1")]
    damping: f32,

    #[arg(long, help = "Frame interval in milliseconds.", default_value = "100")]
    frame_interval_ms: u64,

    #[arg(
        long,
        help = "Velocity predictor: `identity`, `smoothing`, or `learned`",
        default_value = "identity"
    )]
    predictor: String,

    #[arg(long, help = "Neighbor blend for the smoothing predictor.", default_value = "0.25")]
    smoothing_blend: f32,

    #[arg(long, help = "JSON weight file for the learned predictor.")]
    weights: Option<PathBuf>,

    #[arg(long, help = "Optional directory of CSV files to ingest.")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Path of the plain-text log file.", default_value = "haber-flow.log")]
    log_file: PathBuf,

    #[arg(long, help = "Number of steps to run in headless mode.", default_value = "100")]
    steps: usize,

    #[arg(
        long,
        help = "An optional directory pointing to where headless frames should be saved."
    )]
    frames_dir: Option<PathBuf>,
}

impl CliArgs {
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Resolve the CLI into a `SimulationInput`, preferring a supplied
    /// input file over the individual arguments.
    pub fn create_input(&self) -> SimulationInput {
        // if the input file is supplied, just use that
        if let Some(input_filepath) = &self.input_json {
            if !input_filepath.exists() {
                error!("Input file {:?} does not exist.", input_filepath);
                exit(1);
            }
            if input_filepath.is_dir() {
                error!("Input file {:?} is a directory.", input_filepath);
                exit(1);
            }

            info!(
                "Using input file {}",
                input_filepath.to_str().unwrap_or("<unknown>")
            );

            let input_file = File::open(input_filepath)
                .inspect_err(|err| {
                    error!("Failed to open input file: {:?}", err);
                    exit(1);
                })
                .unwrap();

            let reader = BufReader::new(input_file);
            let loaded_input: SimulationInput = serde_json::from_reader(reader)
                .inspect_err(|err| {
                    error!("Failed to deserialize input file: {:?}", err);
                    exit(1);
                })
                .unwrap();

            loaded_input.validate();
            return loaded_input;
        }

        // otherwise, build the input from the other arguments
        let mode = match self.mode.as_str() {
            "window" => InterfaceMode::Window,
            "headless" => {
                let frames_dir = self
                    .frames_dir
                    .as_ref()
                    .map(PathBuf::from)
                    .unwrap_or((*DEFAULT_FRAMES_PATH).into());

                InterfaceMode::Headless(HeadlessSettings {
                    steps: self.steps,
                    frames_dir,
                })
            }
            _ => {
                error!(
                    "'{}' is not a valid interface mode. Use --help for info.",
                    self.mode
                );
                exit(1);
            }
        };

        let predictor = match self.predictor.as_str() {
            "identity" => PredictorKind::Identity,
            "smoothing" => PredictorKind::Smoothing {
                blend: self.smoothing_blend,
            },
            "learned" => PredictorKind::Learned {
                weights: self.weights.clone(),
            },
            _ => {
                error!(
                    "'{}' is not a valid predictor. Use --help for info.",
                    self.predictor
                );
                exit(1);
            }
        };

        let input = SimulationInput {
            mode,
            grid_size: self.grid_size,
            inflow: (self.inflow_x, self.inflow_y),
            damping: self.damping,
            frame_interval_ms: self.frame_interval_ms,
            predictor,
            data_dir: self.data_dir.clone(),
        };

        input.validate();

        if let Some(savepath) = &self.input_json_savepath {
            input.save(savepath);
        }

        input
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HeadlessSettings {
    pub steps: usize,
    pub frames_dir: PathBuf,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum InterfaceMode {
    Window,
    Headless(HeadlessSettings),
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum PredictorKind {
    Identity,
    Smoothing { blend: f32 },
    Learned { weights: Option<PathBuf> },
}

impl PredictorKind {
    /// Construct the predictor this kind describes. Only the learned
    /// variant can fail (weight-file load).
    pub fn build(&self) -> Result<Box<dyn Predictor>, PredictorError> {
        match self {
            PredictorKind::Identity => Ok(Box::new(IdentityPredictor)),
            PredictorKind::Smoothing { blend } => Ok(Box::new(SmoothingPredictor::new(*blend))),
            PredictorKind::Learned { weights } => match weights {
                Some(path) => Ok(Box::new(LearnedPredictor::from_json_file(path)?)),
                None => Ok(Box::new(LearnedPredictor::new(Default::default()))),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SimulationInput {
    pub mode: InterfaceMode,
    pub grid_size: usize,
    pub inflow: (f32, f32),
    pub damping: f32,
    pub frame_interval_ms: u64,
    pub predictor: PredictorKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl SimulationInput {
    /// Reject inputs the simulation cannot represent.
    fn validate(&self) {
        if self.grid_size < 2 {
            error!("Grid size must be at least 2 (got {}).", self.grid_size);
            exit(1);
        }
        if !self.inflow.0.is_finite() || !self.inflow.1.is_finite() || !self.damping.is_finite() {
            error!("Inflow and damping must be finite.");
            exit(1);
        }
    }

    fn save(&self, savepath: &Path) {
        let file = File::create(savepath)
            .inspect_err(|err| {
                error!("Failed to create input save file: {:?}", err);
                exit(1);
            })
            .unwrap();

        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .inspect_err(|err| error!("Failed to serialize input file: {:?}", err))
            .ok();

        info!("Saved resolved input to {:?}", savepath);
    }

    pub fn log(&self) {
        info!(
            "Simulation input is shown below:\n\n\
        \t grid size:      {} x {}\n\
        \t inflow:         < {}, {} >\n\
        \t damping:        {}\n\
        \t frame interval: {} ms\n\
        \t predictor:      {:?}\n\
        \t data dir:       {:?}\n\n\
        ",
            self.grid_size,
            self.grid_size,
            self.inflow.0,
            self.inflow.1,
            self.damping,
            self.frame_interval_ms,
            self.predictor,
            self.data_dir,
        );

        let mode_str = serde_json::to_string_pretty(&self.mode).unwrap_or_default();

        info!("Mode parameters are:\n\n{}", mode_str);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_save_load_round_trip() {
        let input = SimulationInput {
            mode: InterfaceMode::Headless(HeadlessSettings {
                steps: 50,
                frames_dir: PathBuf::from("frames"),
            }),
            grid_size: 20,
            inflow: (0.1, 0.),
            damping: 0.1,
            frame_interval_ms: 100,
            predictor: PredictorKind::Smoothing { blend: 0.25 },
            data_dir: None,
        };

        let serialized = serde_json::to_string_pretty(&input).unwrap();

        println!("Serialized input:\n\n{serialized}");

        let loaded: SimulationInput = serde_json::from_str(&serialized).unwrap();

        assert_eq!(loaded.grid_size, input.grid_size);
        assert_eq!(loaded.inflow, input.inflow);
        assert!(matches!(loaded.mode, InterfaceMode::Headless(_)));
        assert!(matches!(
            loaded.predictor,
            PredictorKind::Smoothing { blend } if blend == 0.25
        ));
    }

    #[test]
    fn test_predictor_kind_builds() {
        assert!(PredictorKind::Identity.build().is_ok());
        assert!(PredictorKind::Smoothing { blend: 0.5 }.build().is_ok());
        assert!(PredictorKind::Learned { weights: None }.build().is_ok());

        let missing = PredictorKind::Learned {
            weights: Some(PathBuf::from("no-such-weights.json")),
        };
        assert!(missing.build().is_err());
    }
}
