//! Math utilities and types
//!
//! Provides the 2D math types used by the scene graph, the camera and the
//! render command stream. Vectors come straight from nalgebra; affine
//! transforms wrap a homogeneous 3x3 matrix and expose the canvas-style
//! `(a, b, c, d, e, f)` view of it.

pub use nalgebra::{Matrix3, Point2 as NPoint2, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3x3 matrix type (homogeneous 2D)
pub type Mat3 = Matrix3<f32>;

/// 2D point type
pub type Point2 = NPoint2<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Signed angular distance from `from` to `to` in degrees, wrapped to (-180, 180]
    pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
        let delta = (to - from).rem_euclid(360.0);
        if delta > 180.0 { delta - 360.0 } else { delta }
    }
}

/// Extension trait for Vec2 with 2D-specific helpers
pub trait Vec2Ext {
    /// Rotate around the origin by an angle in degrees (y-down, clockwise positive)
    fn rotate_degrees(&self, degrees: f32) -> Vec2;

    /// Rotate around the origin by an angle in radians
    fn rotate_radians(&self, radians: f32) -> Vec2;
}

impl Vec2Ext for Vec2 {
    fn rotate_degrees(&self, degrees: f32) -> Vec2 {
        self.rotate_radians(utils::deg_to_rad(degrees))
    }

    fn rotate_radians(&self, radians: f32) -> Vec2 {
        let (sin, cos) = radians.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// 2D affine transform
///
/// Stored as a homogeneous 3x3 matrix. In canvas terms the matrix is
///
/// ```text
/// | a  c  e |
/// | b  d  f |
/// | 0  0  1 |
/// ```
///
/// so a point maps as `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2D {
    matrix: Mat3,
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2D {
    /// Identity transform
    pub fn identity() -> Self {
        Self { matrix: Mat3::identity() }
    }

    /// Create from the six canvas coefficients
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self {
            matrix: Mat3::new(
                a, c, e,
                b, d, f,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// Create from a homogeneous matrix (the bottom row is ignored)
    pub fn from_matrix(matrix: Mat3) -> Self {
        let mut matrix = matrix;
        matrix[(2, 0)] = 0.0;
        matrix[(2, 1)] = 0.0;
        matrix[(2, 2)] = 1.0;
        Self { matrix }
    }

    /// Pure translation
    pub fn translation(offset: Vec2) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, offset.x, offset.y)
    }

    /// Pure rotation in degrees
    pub fn rotation_degrees(degrees: f32) -> Self {
        let (sin, cos) = utils::deg_to_rad(degrees).sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Pure (possibly non-uniform) scale
    pub fn scale(scale: Vec2) -> Self {
        Self::new(scale.x, 0.0, 0.0, scale.y, 0.0, 0.0)
    }

    /// translate ∘ rotate ∘ scale
    pub fn from_trs(position: Vec2, rotation_degrees: f32, scale: Vec2) -> Self {
        // Expanded form of T * R * S, avoids two matrix products per entity
        let (sin, cos) = utils::deg_to_rad(rotation_degrees).sin_cos();
        Self::new(
            cos * scale.x,
            sin * scale.x,
            -sin * scale.y,
            cos * scale.y,
            position.x,
            position.y,
        )
    }

    /// `self ∘ other`: apply `other` first, then `self`
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        Self { matrix: self.matrix * other.matrix }
    }

    /// Inverse transform, `None` when the matrix is singular
    pub fn try_inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(Self::from_matrix)
    }

    /// Transform a point (translation applied)
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        self.matrix.transform_point(&Point2::new(point.x, point.y)).coords
    }

    /// Transform a direction (translation ignored)
    pub fn transform_vector(&self, vector: Vec2) -> Vec2 {
        self.matrix.transform_vector(&vector)
    }

    /// Determinant of the linear part
    pub fn determinant(&self) -> f32 {
        self.a() * self.d() - self.b() * self.c()
    }

    /// Uniform scale factor, the geometric mean of the axis scales
    pub fn uniform_scale(&self) -> f32 {
        self.determinant().abs().sqrt()
    }

    /// Exact identity check
    pub fn is_identity(&self) -> bool {
        self.matrix == Mat3::identity()
    }

    /// Translation component
    pub fn translation_part(&self) -> Vec2 {
        Vec2::new(self.e(), self.f())
    }

    /// Canvas coefficients `[a, b, c, d, e, f]`
    pub fn to_array(&self) -> [f32; 6] {
        [self.a(), self.b(), self.c(), self.d(), self.e(), self.f()]
    }

    /// Build from canvas coefficients `[a, b, c, d, e, f]`
    pub fn from_array(values: [f32; 6]) -> Self {
        let [a, b, c, d, e, f] = values;
        Self::new(a, b, c, d, e, f)
    }

    /// Underlying homogeneous matrix
    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    /// Horizontal scaling / rotation coefficient
    pub fn a(&self) -> f32 { self.matrix[(0, 0)] }
    /// Vertical skew / rotation coefficient
    pub fn b(&self) -> f32 { self.matrix[(1, 0)] }
    /// Horizontal skew / rotation coefficient
    pub fn c(&self) -> f32 { self.matrix[(0, 1)] }
    /// Vertical scaling / rotation coefficient
    pub fn d(&self) -> f32 { self.matrix[(1, 1)] }
    /// Horizontal translation
    pub fn e(&self) -> f32 { self.matrix[(0, 2)] }
    /// Vertical translation
    pub fn f(&self) -> f32 { self.matrix[(1, 2)] }
}

impl std::ops::Mul for Affine2D {
    type Output = Affine2D;

    fn mul(self, rhs: Affine2D) -> Affine2D {
        self.multiply(&rhs)
    }
}

impl approx::AbsDiffEq for Affine2D {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.matrix.abs_diff_eq(&other.matrix, epsilon)
    }
}

impl approx::RelativeEq for Affine2D {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.matrix.relative_eq(&other.matrix, epsilon, max_relative)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Rect {
    /// Create from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest rect containing every point; `None` for an empty slice
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut rect = Self::new(*first, *first);
        for point in rest {
            rect.min = rect.min.inf(point);
            rect.max = rect.max.sup(point);
        }
        Some(rect)
    }

    /// Rect spanning two arbitrary corners (e.g. a drag start and end)
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self::new(a.inf(&b), a.sup(&b))
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive point containment
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }

    /// Inclusive overlap test
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_rotate_degrees_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotate_degrees(90.0);
        assert_relative_eq!(v, Vec2::new(0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_shortest_angle_delta_wraps() {
        assert_relative_eq!(utils::shortest_angle_delta(170.0, -170.0), 20.0, epsilon = EPSILON);
        assert_relative_eq!(utils::shortest_angle_delta(-170.0, 170.0), -20.0, epsilon = EPSILON);
        assert_relative_eq!(utils::shortest_angle_delta(0.0, 180.0), 180.0, epsilon = EPSILON);
        assert_relative_eq!(utils::shortest_angle_delta(10.0, 10.0), 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_from_trs_matches_product() {
        let position = Vec2::new(10.0, -4.0);
        let scale = Vec2::new(2.0, 0.5);
        let expanded = Affine2D::from_trs(position, 30.0, scale);
        let product = Affine2D::translation(position)
            * Affine2D::rotation_degrees(30.0)
            * Affine2D::scale(scale);
        assert_relative_eq!(expanded, product, epsilon = EPSILON);
    }

    #[test]
    fn test_canvas_coefficients() {
        let m = Affine2D::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_eq!(m.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        // x' = a*x + c*y + e, y' = b*x + d*y + f
        let p = m.transform_point(Vec2::new(1.0, 1.0));
        assert_relative_eq!(p, Vec2::new(9.0, 12.0), epsilon = EPSILON);
        let v = m.transform_vector(Vec2::new(1.0, 1.0));
        assert_relative_eq!(v, Vec2::new(4.0, 6.0), epsilon = EPSILON);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let m = Affine2D::from_trs(Vec2::new(3.0, 7.0), 45.0, Vec2::new(2.0, 3.0));
        let inverse = m.try_inverse().unwrap();
        let p = Vec2::new(-2.5, 11.0);
        assert_relative_eq!(inverse.transform_point(m.transform_point(p)), p, epsilon = 1e-4);
        assert_relative_eq!(m * inverse, Affine2D::identity(), epsilon = 1e-5);
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = Affine2D::scale(Vec2::new(0.0, 1.0));
        assert!(m.try_inverse().is_none());
    }

    #[test]
    fn test_uniform_scale() {
        let m = Affine2D::from_trs(Vec2::zeros(), 33.0, Vec2::new(4.0, 4.0));
        assert_relative_eq!(m.uniform_scale(), 4.0, epsilon = EPSILON);
        let non_uniform = Affine2D::scale(Vec2::new(2.0, 8.0));
        assert_relative_eq!(non_uniform.uniform_scale(), 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_rect_from_points_and_intersects() {
        let rect = Rect::from_points(&[
            Vec2::new(3.0, -1.0),
            Vec2::new(-2.0, 4.0),
            Vec2::new(0.0, 0.0),
        ]).unwrap();
        assert_eq!(rect.min, Vec2::new(-2.0, -1.0));
        assert_eq!(rect.max, Vec2::new(3.0, 4.0));
        assert!(rect.contains(Vec2::new(0.0, 3.0)));
        assert!(rect.intersects(&Rect::from_corners(Vec2::new(5.0, 5.0), Vec2::new(3.0, 4.0))));
        assert!(!rect.intersects(&Rect::new(Vec2::new(3.5, 0.0), Vec2::new(6.0, 1.0))));
        assert!(Rect::from_points(&[]).is_none());
    }
}
