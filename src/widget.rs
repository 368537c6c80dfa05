use crate::graphics::{Canvas, Vertex};
use crate::math::{calculate_normal, multiply_matrices, multiply_matrix_vector, normalize, rotation_x, rotation_y, Vec3};
use crate::state::Palette;
use crate::tilt::{PointerTiltController, SurfaceBounds, TiltConfig, TiltState};
use crate::ui::Rect;
use std::time::{Duration, Instant};
use tracing::trace;

/// Pixel size of one terminal cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f64,
    pub height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        CellMetrics {
            width: 8.0,
            height: 16.0,
        }
    }
}

impl CellMetrics {
    /// Pixel position of the centre of a cell
    pub fn cell_center(&self, column: u16, row: u16) -> (f64, f64) {
        (
            (f64::from(column) + 0.5) * self.width,
            (f64::from(row) + 0.5) * self.height,
        )
    }

    pub fn bounds(&self, area: Rect) -> SurfaceBounds {
        SurfaceBounds {
            left: f64::from(area.x) * self.width,
            top: f64::from(area.y) * self.height,
            width: f64::from(area.width) * self.width,
            height: f64::from(area.height) * self.height,
        }
    }
}

/// CSS perspective of the hero card, in pixels
const PERSPECTIVE: f64 = 1200.0;
/// Half-depth of the card slab relative to its half-width
const CARD_DEPTH: f64 = 0.04;
/// Share of the surface the card covers at rest
const CARD_FILL: f64 = 0.9;

const FACES: [(usize, usize, usize, usize); 6] = [
    (0, 1, 2, 3),
    (5, 4, 7, 6),
    (4, 0, 3, 7),
    (1, 5, 6, 2),
    (4, 5, 1, 0),
    (3, 2, 6, 7),
];

/// Front face corners, in order around the rim
const FRONT_RIM: [usize; 4] = [0, 1, 2, 3];

/// Hero card that tilts toward the pointer
pub struct CardWidget {
    controller: PointerTiltController,
    cell: CellMetrics,
    hovered: bool,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl CardWidget {
    pub fn new(tilt: TiltConfig, cell: CellMetrics) -> Self {
        CardWidget {
            controller: PointerTiltController::new(tilt),
            cell,
            hovered: false,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    pub fn controller(&self) -> &PointerTiltController {
        &self.controller
    }

    pub fn tilt(&self) -> TiltState {
        self.controller.tilt()
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Routes a pointer move. `area` is the card's current cell rectangle,
    /// `None` when the layout has no room for the card.
    ///
    /// Returns whether the card needs repainting.
    pub fn pointer_moved(&mut self, column: u16, row: u16, area: Option<Rect>) -> bool {
        let inside = area.is_some_and(|area| area.contains(column, row));
        if inside {
            self.hovered = true;
            let pointer = self.cell.cell_center(column, row);
            self.controller.on_pointer_move(pointer, area.map(|area| self.cell.bounds(area)));
            return true;
        }
        if self.hovered {
            self.pointer_left();
            return true;
        }
        false
    }

    pub fn pointer_left(&mut self) {
        if !self.hovered {
            return;
        }
        trace!("pointer left the card");
        self.hovered = false;
        self.controller.on_pointer_leave();
    }

    /// Advances the relaxation. Returns whether the card moved.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let was_relaxing = self.controller.is_relaxing();
        self.controller.tick(dt);
        was_relaxing
    }

    /// Projects the card slab into the cell grid of `area`.
    fn compute_projected_vertices(&self, area: Rect) -> Vec<Vertex> {
        let bounds = self.cell.bounds(area);
        let half_width_px = bounds.width / 2.0 * CARD_FILL;
        let aspect = bounds.height / bounds.width;
        let center = (f64::from(area.width) / 2.0, f64::from(area.height) / 2.0);

        let vertices: [Vec3; 8] = [
            [-1.0, -aspect, -CARD_DEPTH],
            [1.0, -aspect, -CARD_DEPTH],
            [1.0, aspect, -CARD_DEPTH],
            [-1.0, aspect, -CARD_DEPTH],
            [-1.0, -aspect, CARD_DEPTH],
            [1.0, -aspect, CARD_DEPTH],
            [1.0, aspect, CARD_DEPTH],
            [-1.0, aspect, CARD_DEPTH],
        ];

        // CSS rotations, with z pointing away from the viewer
        let tilt = self.tilt();
        let rotation = multiply_matrices(&rotation_x(-tilt.rotate_x), &rotation_y(-tilt.rotate_y));
        let transformed: Vec<Vec3> = vertices
            .iter()
            .map(|vertex| multiply_matrix_vector(&rotation, vertex))
            .collect();

        let mut normals = vec![[0.0; 3]; vertices.len()];
        for &(a, b, c, d) in FACES.iter() {
            let normal = calculate_normal(&transformed[a], &transformed[b], &transformed[c]);
            for index in [a, b, c, d] {
                for axis in 0..3 {
                    normals[index][axis] += normal[axis];
                }
            }
        }

        transformed
            .iter()
            .zip(normals)
            .map(|(&position, normal)| {
                let depth_px = position[2] * half_width_px;
                let perspective = PERSPECTIVE / (PERSPECTIVE + depth_px);
                let x_px = position[0] * half_width_px * perspective;
                let y_px = position[1] * half_width_px * perspective;
                Vertex {
                    position,
                    screen_position: [center.0 + x_px / self.cell.width, center.1 + y_px / self.cell.height],
                    normal: normalize(normal),
                }
            })
            .collect()
    }

    /// Rasterizes the card into a canvas the size of `area`.
    pub fn rasterize(&mut self, area: Rect, palette: &Palette) -> Canvas {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        let mut canvas = Canvas::new(usize::from(area.width), usize::from(area.height));
        if area.width == 0 || area.height == 0 {
            return canvas;
        }
        let vertices = self.compute_projected_vertices(area);
        let light_pos = [1.5, -2.0, -4.0];

        for (face_index, &(a, b, c, d)) in FACES.iter().enumerate() {
            let color = if face_index == 0 {
                palette.card_front
            } else {
                palette.card_side
            };
            canvas.draw_triangle(&vertices[a], &vertices[b], &vertices[c], &light_pos, color);
            canvas.draw_triangle(&vertices[a], &vertices[c], &vertices[d], &light_pos, color);
        }

        for i in 0..FRONT_RIM.len() {
            let from = vertices[FRONT_RIM[i]].screen_position;
            let to = vertices[FRONT_RIM[(i + 1) % FRONT_RIM.len()]].screen_position;
            canvas.draw_line(from, to, palette.ring);
        }
        canvas
    }
}
