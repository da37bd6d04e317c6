use glam::{Affine2, Mat2, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn offset(self, by: Vec2) -> Self {
        Self {
            left: self.left + by.x,
            top: self.top + by.y,
            ..self
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.y >= self.top
            && point.x <= self.left + self.width
            && point.y <= self.top + self.height
    }
}

/// Encodes a transform as a CSS `matrix(a,b,c,d,tx,ty)` value. Negative
/// zero is written as `0`.
pub fn css_matrix(transform: &Affine2) -> String {
    let [a, b, c, d, tx, ty] = transform.to_cols_array().map(|value| value + 0.0);
    format!("matrix({a},{b},{c},{d},{tx},{ty})")
}

/// Inverse of [`css_matrix`]. Also accepts `none` as identity.
pub fn parse_css_matrix(raw: &str) -> Option<Affine2> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "none" {
        return Some(Affine2::IDENTITY);
    }
    let args = raw.strip_prefix("matrix(")?.strip_suffix(')')?;
    let values = args
        .split(',')
        .map(|part| part.trim().parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()?;
    let [a, b, c, d, tx, ty] = values.as_slice() else {
        return None;
    };
    Some(Affine2::from_mat2_translation(
        Mat2::from_cols(Vec2::new(*a, *b), Vec2::new(*c, *d)),
        Vec2::new(*tx, *ty),
    ))
}

/// Transform that maps the overlay element onto the scene node.
///
/// The node's world transform is in render-target pixels; dividing by the
/// render-target size and multiplying by the displayed CSS size keeps the
/// overlay aligned when the canvas is scaled by the page, independent of
/// the device pixel ratio.
pub fn overlay_transform(
    world: &Affine2,
    resolution: f32,
    css_size: Size,
    render_size: Size,
) -> Affine2 {
    let ratio = Vec2::new(
        scale_ratio(css_size.width, render_size.width),
        scale_ratio(css_size.height, render_size.height),
    );
    Affine2::from_scale(ratio) * Affine2::from_scale(Vec2::splat(resolution)) * *world
}

fn scale_ratio(css: f32, render: f32) -> f32 {
    if render > 0.0 { css / render } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_matrix_lists_columns_then_translation() {
        let transform = Affine2::from_scale_angle_translation(
            Vec2::new(2.0, 3.0),
            0.0,
            Vec2::new(10.0, 20.0),
        );
        assert_eq!(css_matrix(&transform), "matrix(2,0,0,3,10,20)");
    }

    #[test]
    fn css_matrix_never_prints_negative_zero() {
        let transform = Affine2::from_cols_array(&[-0.0, -0.0, -0.0, 1.0, -0.0, 0.0]);
        assert_eq!(css_matrix(&transform), "matrix(0,0,0,1,0,0)");
    }

    #[test]
    fn parse_css_matrix_round_trips() {
        let transform = Affine2::from_cols_array(&[1.0, 0.5, -0.5, 1.0, 4.0, 8.0]);
        let parsed = parse_css_matrix(&css_matrix(&transform)).expect("valid matrix");
        assert!(parsed.abs_diff_eq(transform, 1e-6));
        assert_eq!(parse_css_matrix("none"), Some(Affine2::IDENTITY));
        assert_eq!(parse_css_matrix("matrix(1,2,3)"), None);
        assert_eq!(parse_css_matrix("rotate(4deg)"), None);
    }

    #[test]
    fn overlay_transform_compensates_for_css_scaling() {
        let world = Affine2::from_translation(Vec2::new(100.0, 50.0));
        let transform = overlay_transform(
            &world,
            1.0,
            Size::new(400.0, 300.0),
            Size::new(800.0, 600.0),
        );
        assert_eq!(css_matrix(&transform), "matrix(0.5,0,0,0.5,50,25)");
    }

    #[test]
    fn overlay_transform_applies_resolution() {
        let world = Affine2::from_translation(Vec2::new(10.0, 10.0));
        let transform = overlay_transform(
            &world,
            2.0,
            Size::new(400.0, 300.0),
            Size::new(800.0, 600.0),
        );
        assert_eq!(css_matrix(&transform), "matrix(1,0,0,1,10,10)");
    }

    #[test]
    fn zero_render_size_does_not_divide_by_zero() {
        let transform = overlay_transform(
            &Affine2::IDENTITY,
            1.0,
            Size::new(400.0, 300.0),
            Size::default(),
        );
        assert_eq!(transform, Affine2::IDENTITY);
    }

    #[test]
    fn bounds_offset_and_contains() {
        let bounds = Bounds::new(10.0, 20.0, 100.0, 30.0).offset(Vec2::new(5.0, -5.0));
        assert_eq!(bounds, Bounds::new(15.0, 15.0, 100.0, 30.0));
        assert!(bounds.contains(Vec2::new(15.0, 15.0)));
        assert!(!bounds.contains(Vec2::new(14.0, 15.0)));
    }
}
