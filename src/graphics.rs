use crate::math::{apply_lighting, calculate_light_intensity, edge_function, normalize, Vec3};
use crossterm::style::Color;

/// Vertex with world position, projected cell position, and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Vec3,
    pub screen_position: [f64; 2],
    pub normal: Vec3,
}

/// Grid of terminal cells with a depth buffer
///
/// Each cell holds the background colour it should be painted with, or
/// `None` when nothing was rasterized there.
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Option<Color>>,
    depth: Vec<f64>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            cells: vec![None; width * height],
            depth: vec![f64::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }

    /// Rasterizes a triangle with per-cell lighting.
    ///
    /// Both windings are accepted; the barycentric weights are normalized by
    /// the signed area.
    pub fn draw_triangle(
        &mut self,
        v0: &Vertex,
        v1: &Vertex,
        v2: &Vertex,
        light_pos: &Vec3,
        base_color: (u8, u8, u8),
    ) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
        if area.abs() < f64::EPSILON {
            return;
        }

        let xs = [v0.screen_position[0], v1.screen_position[0], v2.screen_position[0]];
        let ys = [v0.screen_position[1], v1.screen_position[1], v2.screen_position[1]];
        let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min).floor().max(0.0) as usize;
        let max_x = xs
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max)
            .ceil()
            .min(self.width as f64 - 1.0);
        let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min).floor().max(0.0) as usize;
        let max_y = ys
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max)
            .ceil()
            .min(self.height as f64 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as usize, max_y as usize);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f64 + 0.5, y as f64 + 0.5];

                let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
                let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
                let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let interpolate = |i: usize, a: &Vec3, b: &Vec3, c: &Vec3| a[i] * w0 + b[i] * w1 + c[i] * w2;
                let position = [
                    interpolate(0, &v0.position, &v1.position, &v2.position),
                    interpolate(1, &v0.position, &v1.position, &v2.position),
                    interpolate(2, &v0.position, &v1.position, &v2.position),
                ];

                // Depth test, smaller z is closer to the viewer
                let offset = y * self.width + x;
                if position[2] >= self.depth[offset] {
                    continue;
                }
                self.depth[offset] = position[2];

                let normal = normalize([
                    interpolate(0, &v0.normal, &v1.normal, &v2.normal),
                    interpolate(1, &v0.normal, &v1.normal, &v2.normal),
                    interpolate(2, &v0.normal, &v1.normal, &v2.normal),
                ]);
                let intensity = calculate_light_intensity(&normal, &position, light_pos);
                self.cells[offset] = Some(apply_lighting(base_color, intensity));
            }
        }
    }

    /// Draws a line over everything already rasterized (Bresenham).
    pub fn draw_line(&mut self, from: [f64; 2], to: [f64; 2], color: Color) {
        let (mut x0, mut y0) = (from[0].round() as isize, from[1].round() as isize);
        let (x1, y1) = (to[0].round() as isize, to[1].round() as isize);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if x0 >= 0 && y0 >= 0 && (x0 as usize) < self.width && (y0 as usize) < self.height {
                self.cells[y0 as usize * self.width + x0 as usize] = Some(color);
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f64, y: f64, z: f64) -> Vertex {
        Vertex {
            position: [x, y, z],
            screen_position: [x, y],
            normal: [0.0, 0.0, -1.0],
        }
    }

    #[test]
    fn triangle_fills_cells_regardless_of_winding() {
        let light = [0.0, 0.0, -10.0];
        for flip in [false, true] {
            let mut canvas = Canvas::new(10, 10);
            let (a, b, c) = (vertex(0.0, 0.0, 0.0), vertex(10.0, 0.0, 0.0), vertex(0.0, 10.0, 0.0));
            if flip {
                canvas.draw_triangle(&a, &c, &b, &light, (200, 200, 200));
            } else {
                canvas.draw_triangle(&a, &b, &c, &light, (200, 200, 200));
            }
            assert!(canvas.get(1, 1).is_some());
            assert!(canvas.get(9, 9).is_none());
        }
    }

    #[test]
    fn nearer_triangle_wins_the_depth_test() {
        let light = [0.0, 0.0, -10.0];
        let mut canvas = Canvas::new(4, 4);
        let far = [vertex(0.0, 0.0, 5.0), vertex(8.0, 0.0, 5.0), vertex(0.0, 8.0, 5.0)];
        let near = [vertex(0.0, 0.0, 1.0), vertex(8.0, 0.0, 1.0), vertex(0.0, 8.0, 1.0)];
        canvas.draw_triangle(&near[0], &near[1], &near[2], &light, (0, 0, 255));
        canvas.draw_triangle(&far[0], &far[1], &far[2], &light, (255, 0, 0));
        match canvas.get(0, 0) {
            Some(Color::Rgb { r, b, .. }) => {
                assert_eq!(r, 0);
                assert!(b > 0);
            }
            other => panic!("unexpected cell {other:?}"),
        }
    }

    #[test]
    fn line_is_clipped_to_the_canvas() {
        let mut canvas = Canvas::new(5, 3);
        canvas.draw_line([-4.0, 1.0], [20.0, 1.0], Color::White);
        assert!((0..5).all(|x| canvas.get(x, 1) == Some(Color::White)));
        assert!(canvas.get(0, 0).is_none());
    }
}
