use std::collections::VecDeque;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// World-space position or extent in meters. `z` is optional on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &Vec3) -> f64 {
        (*other - *self).length()
    }

    pub fn normalize_or_zero(&self) -> Vec3 {
        let len = self.length();
        if len > 1e-9 {
            *self * (1.0 / len)
        } else {
            Vec3::ZERO
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Axis-aligned box obstacle. `size` holds full widths, not half-extents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub center: Vec3,
    pub size: Vec3,
}

/// The simulated volume: `[0, W] x [0, H] x [0, Ceiling]` plus its buildings.
///
/// Immutable across a planning pass; replaced atomically between passes.
/// Obstacles outside the 2-D footprint simply never rasterize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub size: (f64, f64, f64),
    #[serde(default)]
    pub obstacles: Vec<Building>,
}

impl Default for World {
    fn default() -> Self {
        Self { size: (1000.0, 1000.0, 100.0), obstacles: vec![] }
    }
}

/// Wire-level drone snapshot. Inside the engine the same fields live as ECS
/// components; this form is what `set_drones` carries in and state ticks
/// carry out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub id: String,
    pub pos: Vec3,
    #[serde(default)]
    pub vel: Vec3,
    #[serde(default)]
    pub path: VecDeque<Vec3>,
    #[serde(default)]
    pub target: Option<Vec3>,
}
