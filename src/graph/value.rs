//! Typed constant values flowing through a render graph.

use glam::{Vec2, Vec3, Vec4};

use crate::errors::{Result, StrataError};

/// Width of a value: a scalar or a 2/3/4-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl ValueType {
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }

    /// Inverse of [`width`](Self::width); `None` outside `1..=4`.
    #[must_use]
    pub const fn from_width(width: usize) -> Option<Self> {
        match width {
            1 => Some(Self::Float),
            2 => Some(Self::Vec2),
            3 => Some(Self::Vec3),
            4 => Some(Self::Vec4),
            _ => None,
        }
    }

    /// Result type of a component-wise binary operation.
    ///
    /// Scalars broadcast against vectors; two vectors must match in width.
    pub fn broadcast(self, other: Self) -> Result<Self> {
        match (self, other) {
            (a, b) if a == b => Ok(a),
            (Self::Float, b) => Ok(b),
            (a, Self::Float) => Ok(a),
            (a, b) => Err(StrataError::TypeMismatch(format!(
                "cannot combine {a:?} with {b:?}"
            ))),
        }
    }
}

/// A scalar or vector constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl Value {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Float(_) => ValueType::Float,
            Self::Vec2(_) => ValueType::Vec2,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Vec4(_) => ValueType::Vec4,
        }
    }

    /// Components padded with zeros.
    #[must_use]
    pub fn components(&self) -> [f32; 4] {
        match *self {
            Self::Float(x) => [x, 0.0, 0.0, 0.0],
            Self::Vec2(v) => [v.x, v.y, 0.0, 0.0],
            Self::Vec3(v) => [v.x, v.y, v.z, 0.0],
            Self::Vec4(v) => v.to_array(),
        }
    }

    /// Builds a value from the first `width` components.
    pub fn from_components(components: &[f32]) -> Result<Self> {
        Ok(match *components {
            [x] => Self::Float(x),
            [x, y] => Self::Vec2(Vec2::new(x, y)),
            [x, y, z] => Self::Vec3(Vec3::new(x, y, z)),
            [x, y, z, w] => Self::Vec4(Vec4::new(x, y, z, w)),
            _ => {
                return Err(StrataError::TypeMismatch(format!(
                    "a value has 1 to 4 components, got {}",
                    components.len()
                )));
            }
        })
    }

    /// Scalar view; `None` for vectors.
    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Self::Float(x) => Some(x),
            _ => None,
        }
    }

    /// Widens to a `Vec4`: scalars splat, `Vec3` gets `w = 1`.
    #[must_use]
    pub fn to_vec4(&self) -> Vec4 {
        match *self {
            Self::Float(x) => Vec4::splat(x),
            Self::Vec2(v) => v.extend(0.0).extend(1.0),
            Self::Vec3(v) => v.extend(1.0),
            Self::Vec4(v) => v,
        }
    }

    /// Component-wise `f(self, other)` with scalar broadcasting.
    pub fn zip_with(&self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Result<Self> {
        let ty = self.value_type().broadcast(other.value_type())?;
        let (a, b) = (self.broadcast_to(ty), other.broadcast_to(ty));
        let mut out = [0.0; 4];
        for i in 0..ty.width() {
            out[i] = f(a[i], b[i]);
        }
        Self::from_components(&out[..ty.width()])
    }

    /// Component-wise `f(self)`.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        let width = self.value_type().width();
        let mut out = self.components();
        for c in &mut out[..width] {
            *c = f(*c);
        }
        // Width is preserved, so this cannot fail
        Self::from_components(&out[..width]).unwrap_or(*self)
    }

    fn broadcast_to(&self, ty: ValueType) -> [f32; 4] {
        match *self {
            Self::Float(x) => [x; 4],
            _ => {
                debug_assert_eq!(self.value_type(), ty);
                self.components()
            }
        }
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Self::Float(x)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for Value {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}
