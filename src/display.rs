// Window surface and headless frame export

use std::{error::Error, fs, path::Path};

use minifb::{Key, Window, WindowOptions};
use plotters::prelude::*;

use crate::{
    ScalarField,
    error::DisplayError,
    render::{self, DISPLAY_HEIGHT, DISPLAY_WIDTH},
    runloop::{ControlEvent, EventSource, FrameSink},
};

/// A fixed-size, double-buffered window. Implements both halves of the
/// render loop's backend: event polling and frame presentation.
pub struct WindowDisplay {
    window: Window,
}

impl WindowDisplay {
    pub fn new(title: &str) -> Result<Self, DisplayError> {
        let window = Window::new(
            title,
            DISPLAY_WIDTH,
            DISPLAY_HEIGHT,
            WindowOptions::default(),
        )
        .map_err(|err| DisplayError::Surface(err.to_string()))?;

        Ok(WindowDisplay { window })
    }
}

impl EventSource for WindowDisplay {
    fn poll(&mut self) -> Option<ControlEvent> {
        if !self.window.is_open() || self.window.is_key_down(Key::Escape) {
            Some(ControlEvent::Quit)
        } else {
            None
        }
    }
}

impl FrameSink for WindowDisplay {
    fn present(&mut self, frame: &[u32], width: usize, height: usize) -> Result<(), DisplayError> {
        self.window
            .update_with_buffer(frame, width, height)
            .map_err(|err| DisplayError::Present(err.to_string()))
    }
}

/// Recreate the frames directory, dropping any previous run's output.
pub fn prepare_frames_dir(frames_dir: &Path) -> Result<(), Box<dyn Error>> {
    if frames_dir.exists() {
        fs::remove_dir_all(frames_dir)?;
    }
    fs::create_dir_all(frames_dir)?;

    Ok(())
}

/// Save a speed field as a one-pixel-per-cell heatmap PNG, normalized
/// to the frame's own maximum (a zero maximum renders as all-still).
///
/// Parameters
/// - `speed` - The per-cell speed field to rasterize
/// - `filename` - The file name within `frames_dir`
/// - `frames_dir` - The directory receiving frames
pub fn frame_save(
    speed: &ScalarField,
    filename: &str,
    frames_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let (rows, cols) = speed.shape();

    let filename = frames_dir.join(filename);

    let root = BitMapBackend::new(&filename, (cols as u32, rows as u32)).into_drawing_area();
    root.fill(&BLACK)?;

    let max_speed = speed.max();
    let max_speed = if max_speed > 0. { max_speed } else { 1.0 };

    for i in 0..rows {
        for j in 0..cols {
            let normalized = speed.get((i, j)).ok_or("cell not on speed field")? / max_speed;
            let (r, g, b) = render::speed_color(normalized);
            let pixel_color = RGBColor((r * 255.) as u8, (g * 255.) as u8, (b * 255.) as u8);

            root.draw_pixel((j as i32, i as i32), &pixel_color)?;
        }
    }
    root.present()?;

    Ok(())
}
