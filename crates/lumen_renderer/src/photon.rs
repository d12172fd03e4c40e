//! Photon records.
//!
//! A photon's incoming direction is stored as two bytes (θ, φ) and decoded
//! through 256-entry sine/cosine tables, keeping the record small at the
//! cost of roughly a degree of angular precision.

use crate::Color;
use lumen_math::Vec3;
use std::f32::consts::PI;
use std::sync::OnceLock;

/// A light sample deposited on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub position: Vec3,
    pub power: Color,
    theta: u8,
    phi: u8,
}

struct DirectionTables {
    cos_theta: [f32; 256],
    sin_theta: [f32; 256],
    cos_phi: [f32; 256],
    sin_phi: [f32; 256],
}

impl DirectionTables {
    fn build() -> Self {
        let mut tables = Self {
            cos_theta: [0.0; 256],
            sin_theta: [0.0; 256],
            cos_phi: [0.0; 256],
            sin_phi: [0.0; 256],
        };
        for i in 0..256 {
            let angle = i as f32 * (1.0 / 256.0) * PI;
            tables.cos_theta[i] = angle.cos();
            tables.sin_theta[i] = angle.sin();
            tables.cos_phi[i] = (2.0 * angle).cos();
            tables.sin_phi[i] = (2.0 * angle).sin();
        }
        tables
    }
}

fn tables() -> &'static DirectionTables {
    static TABLES: OnceLock<DirectionTables> = OnceLock::new();
    TABLES.get_or_init(DirectionTables::build)
}

impl Photon {
    /// Create a photon, quantizing `direction` (need not be unit length).
    pub fn new(position: Vec3, power: Color, direction: Vec3) -> Self {
        let (theta, phi) = quantize_direction(direction);
        Self {
            position,
            power,
            theta,
            phi,
        }
    }

    /// Quantized polar angle index.
    pub fn theta(&self) -> u8 {
        self.theta
    }

    /// Quantized azimuth index.
    pub fn phi(&self) -> u8 {
        self.phi
    }

    /// Direction the photon was travelling when it was stored.
    pub fn direction(&self) -> Vec3 {
        let t = tables();
        let (theta, phi) = (self.theta as usize, self.phi as usize);
        Vec3::new(
            t.sin_theta[theta] * t.cos_phi[phi],
            t.sin_theta[theta] * t.sin_phi[phi],
            t.cos_theta[theta],
        )
    }
}

/// Map a direction to (θ, φ) table indices.
fn quantize_direction(direction: Vec3) -> (u8, u8) {
    let d = direction.normalize_or_zero();

    let theta = (d.z.clamp(-1.0, 1.0).acos() * (256.0 / PI)) as i32;
    let theta = theta.clamp(0, 255) as u8;

    let mut phi = (d.y.atan2(d.x) * (256.0 / (2.0 * PI))) as i32;
    if phi < 0 {
        phi += 256;
    }
    let phi = phi.clamp(0, 255) as u8;

    (theta, phi)
}
