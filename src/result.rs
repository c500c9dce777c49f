use geo::{coord, Intersects, Rect};

/// Axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.x as f64, y: self.y as f64 },
            coord! {
                x: self.x.saturating_add(self.width) as f64,
                y: self.y.saturating_add(self.height) as f64,
            },
        )
    }

    /// Edges count as inside.
    pub fn contains(&self, point: ImagePoint) -> bool {
        self.rect().intersects(&coord! { x: point.x, y: point.y })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedWord {
    pub bounds: BoundingBox,
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPoint {
    pub x: f64,
    pub y: f64,
}

impl ViewportPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

impl RotateDirection {
    pub fn degrees(self) -> i32 {
        match self {
            RotateDirection::Clockwise => 90,
            RotateDirection::CounterClockwise => -90,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Semicolon,
    Newline,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Semicolon => ";",
            Separator::Newline => "\n",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Separator::Semicolon => Separator::Newline,
            Separator::Newline => Separator::Semicolon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_includes_edges() {
        let bounds = BoundingBox::new(10, 20, 30, 40);
        assert!(bounds.contains(ImagePoint::new(10.0, 20.0)));
        assert!(bounds.contains(ImagePoint::new(40.0, 60.0)));
        assert!(bounds.contains(ImagePoint::new(25.5, 33.0)));
        assert!(!bounds.contains(ImagePoint::new(9.9, 30.0)));
        assert!(!bounds.contains(ImagePoint::new(20.0, 60.1)));
    }

    #[test]
    fn boxes_at_the_edge_of_u32_do_not_overflow() {
        let bounds = BoundingBox::new(u32::MAX - 5, u32::MAX - 5, 100, 100);
        let rect = bounds.rect();
        assert_eq!(rect.max().x, u32::MAX as f64);
        assert!(bounds.contains(ImagePoint::new(u32::MAX as f64 - 1.0, u32::MAX as f64)));
        assert!(!bounds.contains(ImagePoint::new(0.0, 0.0)));
    }

    #[test]
    fn separator_alternates() {
        let first = Separator::Semicolon;
        assert_eq!(first.toggled(), Separator::Newline);
        assert_eq!(first.toggled().toggled(), Separator::Semicolon);
    }
}
