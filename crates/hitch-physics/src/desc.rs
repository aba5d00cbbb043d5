//! Plain descriptions of bodies and shapes, validated before they reach the engine.

use bevy_math::Vec2;
use hitch_core::error::PhysicsError;

use crate::collision::CollisionCategory;

// ---------------------------------------------------------------------------
// BodyDesc
// ---------------------------------------------------------------------------

/// How the engine moves a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// Moved by forces and contacts.
    #[default]
    Dynamic,
    /// Moved only by its velocity; pushes dynamic bodies without reacting.
    Kinematic,
    /// Never moves.
    Static,
}

/// Initial state of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    /// Mass of a dynamic body. Ignored for other kinds.
    pub mass: f32,
    /// Moment of inertia. `f32::INFINITY` prevents the body from rotating.
    pub moment: f32,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl BodyDesc {
    /// A dynamic body with the given mass and moment of inertia.
    #[must_use]
    pub const fn dynamic(mass: f32, moment: f32) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            mass,
            moment,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
        }
    }

    #[must_use]
    pub const fn kinematic() -> Self {
        Self {
            kind: BodyKind::Kinematic,
            ..Self::dynamic(1.0, f32::INFINITY)
        }
    }

    #[must_use]
    pub const fn fixed() -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::dynamic(1.0, f32::INFINITY)
        }
    }

    #[must_use]
    pub const fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub const fn moving(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.kind == BodyKind::Dynamic && (!self.mass.is_finite() || self.mass <= 0.0) {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        if self.kind == BodyKind::Dynamic && (self.moment.is_nan() || self.moment <= 0.0) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "moment of inertia must be > 0, got {}",
                self.moment
            )));
        }
        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err(PhysicsError::InvalidGeometry(
                "position and velocity must be finite".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Collision geometry, expressed in the owning body's frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Circle of `radius` centred at `offset`.
    Circle { radius: f32, offset: Vec2 },
    /// `width` x `height` box whose corners are inflated by `radius`.
    Box { width: f32, height: f32, radius: f32 },
    /// Segment from `a` to `b`, thickened into a capsule when `radius > 0`.
    Segment { a: Vec2, b: Vec2, radius: f32 },
}

impl Geometry {
    fn validate(&self) -> Result<(), PhysicsError> {
        match *self {
            Self::Circle { radius, offset } => {
                if !(radius.is_finite() && radius > 0.0) || !offset.is_finite() {
                    return Err(PhysicsError::InvalidGeometry(format!(
                        "circle radius must be > 0, got {radius}"
                    )));
                }
            }
            Self::Box {
                width,
                height,
                radius,
            } => {
                if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
                    return Err(PhysicsError::InvalidGeometry(format!(
                        "box extents must be > 0, got {width}x{height}"
                    )));
                }
                if !(radius.is_finite() && radius >= 0.0) {
                    return Err(PhysicsError::InvalidGeometry(format!(
                        "box radius must be >= 0, got {radius}"
                    )));
                }
            }
            Self::Segment { a, b, radius } => {
                if !a.is_finite() || !b.is_finite() || a == b {
                    return Err(PhysicsError::InvalidGeometry(
                        "segment endpoints must be finite and distinct".into(),
                    ));
                }
                if !(radius.is_finite() && radius >= 0.0) {
                    return Err(PhysicsError::InvalidGeometry(format!(
                        "segment radius must be >= 0, got {radius}"
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ShapeDesc
// ---------------------------------------------------------------------------

/// Geometry plus collision material and category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeDesc {
    pub geometry: Geometry,
    pub category: CollisionCategory,
    pub friction: f32,
    pub elasticity: f32,
    /// Sensors report pair-begin but never receive a collision response.
    pub sensor: bool,
}

impl ShapeDesc {
    #[must_use]
    pub const fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            category: CollisionCategory::DEFAULT,
            friction: 0.0,
            elasticity: 0.0,
            sensor: false,
        }
    }

    #[must_use]
    pub const fn circle(radius: f32) -> Self {
        Self::new(Geometry::Circle {
            radius,
            offset: Vec2::ZERO,
        })
    }

    /// Box with sharp corners.
    #[must_use]
    pub const fn rect(width: f32, height: f32) -> Self {
        Self::rounded_box(width, height, 0.0)
    }

    #[must_use]
    pub const fn rounded_box(width: f32, height: f32, radius: f32) -> Self {
        Self::new(Geometry::Box {
            width,
            height,
            radius,
        })
    }

    #[must_use]
    pub const fn segment(a: Vec2, b: Vec2) -> Self {
        Self::new(Geometry::Segment { a, b, radius: 0.0 })
    }

    #[must_use]
    pub const fn with_category(mut self, category: CollisionCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub const fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    #[must_use]
    pub const fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    #[must_use]
    pub const fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        self.geometry.validate()?;
        if !(self.friction.is_finite() && self.friction >= 0.0) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "friction must be >= 0, got {}",
                self.friction
            )));
        }
        if !(self.elasticity.is_finite() && self.elasticity >= 0.0) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "elasticity must be >= 0, got {}",
                self.elasticity
            )));
        }
        Ok(())
    }
}
