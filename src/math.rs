use crossterm::style::Color;

pub type Vec3 = [f64; 3];
pub type Mat3 = [[f64; 3]; 3];

/// Linearly maps `value` from `domain` onto `range`.
///
/// Values outside the domain are extrapolated, callers clamp when they need
/// a bounded result.
pub fn map_range(value: f64, domain: (f64, f64), range: (f64, f64)) -> f64 {
    let (d0, d1) = domain;
    let (r0, r1) = range;
    if d1 == d0 {
        return r0;
    }
    r0 + (value - d0) * (r1 - r0) / (d1 - d0)
}

/// Rotation about the X axis
pub fn rotation_x(degrees: f64) -> Mat3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Rotation about the Y axis
pub fn rotation_y(degrees: f64) -> Mat3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [[cos, 0.0, sin], [0.0, 1.0, 0.0], [-sin, 0.0, cos]]
}

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

pub fn multiply_matrix_vector(matrix: &Mat3, vector: &Vec3) -> Vec3 {
    let mut result = [0.0; 3];
    for (row, out) in matrix.iter().zip(result.iter_mut()) {
        *out = row[0] * vector[0] + row[1] * vector[1] + row[2] * vector[2];
    }
    result
}

pub fn multiply_matrices(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    result
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Scales `v` to unit length; the zero vector is returned unchanged.
pub fn normalize(v: Vec3) -> Vec3 {
    let length = dot(&v, &v).sqrt();
    if length == 0.0 {
        return v;
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

/// Unit normal of the triangle `abc`
pub fn calculate_normal(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    let u = sub(b, a);
    let v = sub(c, a);
    normalize([
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ])
}

/// Diffuse light intensity at `position`, never darker than the ambient floor
pub fn calculate_light_intensity(normal: &Vec3, position: &Vec3, light_pos: &Vec3) -> f64 {
    let light_dir = normalize(sub(light_pos, position));
    dot(normal, &light_dir).max(AMBIENT_LIGHT)
}

pub const AMBIENT_LIGHT: f64 = 0.15;

/// Shades an RGB triple by `intensity`
pub fn apply_lighting(rgb: (u8, u8, u8), intensity: f64) -> Color {
    let channel = |c: u8| (c as f64 * intensity).clamp(0.0, 255.0) as u8;
    Color::Rgb {
        r: channel(rgb.0),
        g: channel(rgb.1),
        b: channel(rgb.2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_range_extrapolates_past_the_domain() {
        assert_eq!(map_range(0.0, (-50.0, 50.0), (-10.0, 10.0)), 0.0);
        assert_eq!(map_range(50.0, (-50.0, 50.0), (-10.0, 10.0)), 10.0);
        assert_eq!(map_range(100.0, (-50.0, 50.0), (-10.0, 10.0)), 20.0);
        assert_eq!(map_range(-25.0, (-50.0, 50.0), (10.0, -10.0)), 5.0);
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        assert_eq!(map_range(3.0, (1.0, 1.0), (4.0, 8.0)), 4.0);
    }

    #[test]
    fn rotations_compose_to_identity_at_zero() {
        let m = multiply_matrices(&rotation_x(0.0), &rotation_y(0.0));
        let v = multiply_matrix_vector(&m, &[1.0, 2.0, 3.0]);
        assert_eq!(v, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn quarter_turn_about_y_moves_x_into_z() {
        let v = multiply_matrix_vector(&rotation_y(90.0), &[1.0, 0.0, 0.0]);
        assert!(v[0].abs() < 1e-12);
        assert!((v[2] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn light_never_drops_below_ambient() {
        let facing_away = calculate_light_intensity(&[0.0, 0.0, 1.0], &[0.0; 3], &[0.0, 0.0, -5.0]);
        assert_eq!(facing_away, AMBIENT_LIGHT);
        let facing = calculate_light_intensity(&[0.0, 0.0, -1.0], &[0.0; 3], &[0.0, 0.0, -5.0]);
        assert!((facing - 1.0).abs() < 1e-12);
    }
}
