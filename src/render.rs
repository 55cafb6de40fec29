// Software renderer for the velocity field

use crate::field::FieldState;

/// Fixed display surface size.
pub const DISPLAY_WIDTH: usize = 800;
pub const DISPLAY_HEIGHT: usize = 600;

/// Vertical field of view of the perspective camera, degrees.
const FOV_Y_DEGREES: f32 = 45.;

/// Distance from the camera to the grid plane.
const CAMERA_DISTANCE: f32 = 5.;

/// Fraction of the vertical view the grid should span.
const GRID_VIEW_FILL: f32 = 0.9;

/// Heatmap quad half-extent as a fraction of the cell span.
const QUAD_HALF_RATIO: f32 = 0.2;

/// Velocity glyph length per unit speed, as a fraction of the cell span.
const GLYPH_SCALE_RATIO: f32 = 0.2;

/// Map a frame-normalized speed in [0, 1] to an RGB triple:
/// red saturates at s=0.5, green fades out by s=0.5, blue is constant.
pub fn speed_color(normalized_speed: f32) -> (f32, f32, f32) {
    let r = (normalized_speed * 2.).min(1.);
    let g = (1. - normalized_speed * 2.).clamp(0., 1.);
    let b = 0.5;
    (r, g, b)
}

/// Glyph color for a raw (unnormalized) cell speed.
fn glyph_color(speed: f32) -> (f32, f32, f32) {
    (0., speed.clamp(0., 1.), 0.5)
}

/// Pack an RGB triple of [0, 1] floats into an opaque 0xAARRGGBB pixel.
pub fn pack_color((r, g, b): (f32, f32, f32)) -> u32 {
    let to_byte = |c: f32| (c.clamp(0., 1.) * 255.) as u32;
    0xFF00_0000 | (to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b)
}

/// Draws vector glyphs and a speed heatmap for a `FieldState` into an
/// owned 0xAARRGGBB framebuffer. The grid plane sits at a fixed depth
/// in front of a 45-degree perspective camera, which for a single
/// plane reduces to one pixels-per-world scale factor.
pub struct Renderer {
    width: usize,
    height: usize,
    frame: Vec<u32>,

    /// World-units width of one grid cell
    cell_span: f32,

    /// Pixels per world unit at the grid plane
    scale: f32,
}

impl Renderer {
    pub fn new(grid_size: usize) -> Self {
        Self::with_surface(grid_size, DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }

    pub fn with_surface(grid_size: usize, width: usize, height: usize) -> Self {
        let half_fov = (FOV_Y_DEGREES / 2.).to_radians();

        // visible half-height of the frustum at the grid plane
        let view_half_height = CAMERA_DISTANCE * half_fov.tan();
        let cell_span = 2. * view_half_height * GRID_VIEW_FILL / (grid_size as f32);
        let scale = (height as f32 / 2.) / (half_fov.tan() * CAMERA_DISTANCE);

        Renderer {
            width,
            height,
            frame: vec![0; width * height],
            cell_span,
            scale,
        }
    }

    pub fn frame(&self) -> &[u32] {
        &self.frame
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Clear the framebuffer to opaque black.
    pub fn clear(&mut self) {
        self.frame.fill(0xFF00_0000);
    }

    /// World position of the center of cell (i, j) on an n-cell grid.
    fn cell_world(&self, i: usize, j: usize, n: usize) -> (f32, f32) {
        let half = n as f32 / 2.;
        (
            (i as f32 - half) * self.cell_span,
            (j as f32 - half) * self.cell_span,
        )
    }

    /// Project a world position on the grid plane to screen pixels.
    fn project(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.width as f32 / 2. + self.scale * x,
            self.height as f32 / 2. - self.scale * y,
        )
    }

    fn put_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height {
            self.frame[y as usize * self.width + x as usize] = color;
        }
    }

    /// Bresenham line between two screen positions.
    fn draw_line(&mut self, (x0, y0): (f32, f32), (x1, y1): (f32, f32), color: u32) {
        let (mut cx, mut cy) = (x0.round() as isize, y0.round() as isize);
        let (ex, ey) = (x1.round() as isize, y1.round() as isize);

        let dx = (ex - cx).abs();
        let dy = -(ey - cy).abs();
        let sx: isize = if cx < ex { 1 } else { -1 };
        let sy: isize = if cy < ey { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put_pixel(cx, cy, color);
            if cx == ex && cy == ey {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                cx += sx;
            }
            if e2 <= dx {
                err += dx;
                cy += sy;
            }
        }
    }

    /// Filled axis-aligned rectangle, clipped to the surface.
    fn fill_rect(&mut self, (x0, y0): (f32, f32), (x1, y1): (f32, f32), color: u32) {
        let left = x0.min(x1).round().max(0.) as usize;
        let right = (x0.max(x1).round() as isize).min(self.width as isize - 1);
        let top = y0.min(y1).round().max(0.) as usize;
        let bottom = (y0.max(y1).round() as isize).min(self.height as isize - 1);

        if right < 0 || bottom < 0 {
            return;
        }

        for y in top..=(bottom as usize) {
            for x in left..=(right as usize) {
                self.frame[y * self.width + x] = color;
            }
        }
    }

    /// Draw a short line segment per cell from the cell position along
    /// its velocity, colored by the local (unnormalized) speed.
    pub fn draw_vectors(&mut self, state: &FieldState) {
        let n = state.grid_size();
        let glyph_scale = self.cell_span * GLYPH_SCALE_RATIO;

        for i in 0..n {
            for j in 0..n {
                let vx = *state.velocity()[0].index((i, j));
                let vy = *state.velocity()[1].index((i, j));
                let speed = (vx * vx + vy * vy).sqrt();

                let (wx, wy) = self.cell_world(i, j, n);
                let start = self.project(wx, wy);
                let end = self.project(wx + vx * glyph_scale, wy + vy * glyph_scale);

                self.draw_line(start, end, pack_color(glyph_color(speed)));
            }
        }
    }

    /// Draw a filled quad per cell colored by speed normalized to the
    /// current frame's maximum. A zero maximum is replaced by 1.0 so an
    /// all-still field renders at normalized speed 0 instead of dividing
    /// by zero.
    pub fn draw_heatmap(&mut self, state: &FieldState) {
        let n = state.grid_size();
        let speed = state.compute_speed();

        let max_speed = speed.max();
        let max_speed = if max_speed > 0. { max_speed } else { 1.0 };

        let quad_half = self.cell_span * QUAD_HALF_RATIO;

        for i in 0..n {
            for j in 0..n {
                let normalized = *speed.index((i, j)) / max_speed;
                let color = pack_color(speed_color(normalized));

                let (wx, wy) = self.cell_world(i, j, n);
                let corner_a = self.project(wx - quad_half, wy - quad_half);
                let corner_b = self.project(wx + quad_half, wy + quad_half);

                self.fill_rect(corner_a, corner_b, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use na::DMatrix;

    use super::*;
    use crate::field::FieldState;

    #[test]
    fn test_speed_color_ramp() {
        assert_eq!(speed_color(0.), (0., 1., 0.5));
        assert_eq!(speed_color(0.25), (0.5, 0.5, 0.5));
        assert_eq!(speed_color(0.5), (1., 0., 0.5));

        // green stays clamped at zero past the midpoint
        assert_eq!(speed_color(0.75), (1., 0., 0.5));
        assert_eq!(speed_color(1.), (1., 0., 0.5));
    }

    #[test]
    fn test_pack_color() {
        assert_eq!(pack_color((0., 0., 0.)), 0xFF000000);
        assert_eq!(pack_color((1., 0., 0.)), 0xFFFF0000);
        assert_eq!(pack_color((0., 1., 0.)), 0xFF00FF00);
        assert_eq!(pack_color((1., 1., 1.)), 0xFFFFFFFF);

        // out-of-range channels clamp instead of wrapping
        assert_eq!(pack_color((2., -1., 0.5)), pack_color((1., 0., 0.5)));
    }

    #[test]
    fn test_project_centers_origin() {
        let renderer = Renderer::new(8);
        let (sx, sy) = renderer.project(0., 0.);

        assert_eq!(sx, DISPLAY_WIDTH as f32 / 2.);
        assert_eq!(sy, DISPLAY_HEIGHT as f32 / 2.);
    }

    #[test]
    fn test_zero_max_heatmap_renders_as_still() {
        let state = FieldState::new(4, (0., 0.));

        let mut renderer = Renderer::new(4);
        renderer.clear();
        renderer.draw_heatmap(&state);

        let still = pack_color(speed_color(0.));
        let background = 0xFF00_0000;

        // every painted pixel carries the normalized-zero color
        assert!(
            renderer
                .frame()
                .iter()
                .all(|px| *px == still || *px == background)
        );
        assert!(renderer.frame().iter().any(|px| *px == still));
    }

    #[test]
    fn test_heatmap_colors_fastest_cell_red() {
        let mut state = FieldState::new(6, (0., 0.));

        // one fast interior cell; everything else still
        let mut ux: DMatrix<f32> = DMatrix::zeros(6, 6);
        *(ux.index_mut((2, 3))) = 4.0;
        state.replace_velocity([ux, DMatrix::zeros(6, 6)]).unwrap();

        let mut renderer = Renderer::new(6);
        renderer.clear();
        renderer.draw_heatmap(&state);

        // sample the quad center of the fast cell: normalized speed 1
        let (wx, wy) = renderer.cell_world(2, 3, 6);
        let (sx, sy) = renderer.project(wx, wy);
        let px = renderer.frame()[sy as usize * DISPLAY_WIDTH + sx as usize];

        assert_eq!(px, pack_color(speed_color(1.)));
    }

    #[test]
    fn test_draw_vectors_marks_cell_position() {
        let mut state = FieldState::new(6, (0., 0.));
        let mut ux: DMatrix<f32> = DMatrix::zeros(6, 6);
        *(ux.index_mut((2, 2))) = 1.0;
        state.replace_velocity([ux, DMatrix::zeros(6, 6)]).unwrap();

        let mut renderer = Renderer::new(6);
        renderer.clear();
        renderer.draw_vectors(&state);

        let (wx, wy) = renderer.cell_world(2, 2, 6);
        let (sx, sy) = renderer.project(wx, wy);
        let px = renderer.frame()[sy.round() as usize * DISPLAY_WIDTH + sx.round() as usize];

        assert_eq!(px, pack_color(glyph_color(1.0)));
    }
}
