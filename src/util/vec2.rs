use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

/// Epsilon added to lengths before dividing, so coincident points never produce NaN
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// 2D vector in world units (y grows downward, like screen space)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle` radians measured from +x (orbit/split layout)
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    /// Forward direction of a ship with the given heading.
    ///
    /// Heading 0 points up the screen: `(sin θ, −cos θ)`.
    #[inline]
    pub fn heading(rotation: f32) -> Self {
        Self {
            x: rotation.sin(),
            y: -rotation.cos(),
        }
    }

    /// Starboard direction of a ship with the given heading: `(cos θ, sin θ)`
    #[inline]
    pub fn starboard(rotation: f32) -> Self {
        Self::from_angle(rotation)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Normal and length, with the epsilon-guarded divide used by collision code
    pub fn normal_and_length(&self) -> (Self, f32) {
        let len = self.length();
        let inv = 1.0 / (len + NORMALIZE_EPSILON);
        (Self::new(self.x * inv, self.y * inv), len)
    }

    #[inline]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        (*self - other).length()
    }

    #[inline]
    pub fn distance_sq_to(&self, other: Vec2) -> f32 {
        (*self - other).length_sq()
    }

    /// Clamp each axis independently to `[-limit, limit]`
    pub fn clamp_axes(&self, limit: f32) -> Self {
        Self {
            x: self.x.clamp(-limit, limit),
            y: self.y.clamp(-limit, limit),
        }
    }

    /// Elastic reflection across a unit normal: `v - 2(v·n)n`
    pub fn reflect(&self, normal: Vec2) -> Self {
        *self - normal * (2.0 * self.dot(normal))
    }

    /// Remove the component along a unit normal: `v - (v·n)n`
    pub fn without_component(&self, normal: Vec2) -> Self {
        *self - normal * self.dot(normal)
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}
