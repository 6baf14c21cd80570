//! Synthetic map coordinates for hosts
//!
//! Hosts carry no location, so the map places each one at a uniformly
//! random point inside a disk around a configured center.

use std::f64::consts::PI;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude, the approximation used for the radius
pub const METERS_PER_DEGREE: f64 = 111_300.0;

/// Decimal places kept on generated coordinates
const COORDINATE_DECIMALS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A generated point, rounded to five decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeneratedCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Longitude stretched by `1 / cos(center.lat)`. Nothing reads it.
    pub longitude2: f64,
}

/// Draw a point uniformly from the disk of `radius_meters` around `center`
pub fn random_geo<R: Rng + ?Sized>(rng: &mut R, center: LatLng, radius_meters: f64) -> GeneratedCoordinate {
    let radius_degrees = radius_meters / METERS_PER_DEGREE;

    let u: f64 = rng.gen();
    let v: f64 = rng.gen();

    let w = radius_degrees * u.sqrt();
    let t = 2.0 * PI * v;
    let x = w * t.cos();
    let y = w * t.sin();

    // `cos` of the raw degree value; kept as-is for existing longitude2 consumers
    let x_adjusted = x / center.lat.cos();

    GeneratedCoordinate {
        latitude: round_coordinate(y + center.lat),
        longitude: round_coordinate(x + center.lng),
        longitude2: round_coordinate(x_adjusted + center.lng),
    }
}

fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_DECIMALS);
    (value * scale).round() / scale
}

/// Where the marker cache gets its coordinates from.
///
/// Implementations are expected to be random; results must never be memoized.
pub trait CoordinateSource: Send + Sync {
    fn next_coordinate(&self) -> GeneratedCoordinate;
}

/// Thread-local RNG backed generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoGenerator {
    pub center: LatLng,
    pub radius_meters: f64,
}

impl GeoGenerator {
    pub fn new(center: LatLng, radius_meters: f64) -> Self {
        Self { center, radius_meters }
    }

    pub fn generate(&self) -> GeneratedCoordinate {
        random_geo(&mut rand::thread_rng(), self.center, self.radius_meters)
    }
}

impl CoordinateSource for GeoGenerator {
    fn next_coordinate(&self) -> GeneratedCoordinate {
        self.generate()
    }
}

/// Seeded generator for reproducible layouts and tests
pub struct SeededCoordinates {
    generator: GeoGenerator,
    rng: Mutex<StdRng>,
}

impl SeededCoordinates {
    pub fn new(generator: GeoGenerator, seed: u64) -> Self {
        Self {
            generator,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CoordinateSource for SeededCoordinates {
    fn next_coordinate(&self) -> GeneratedCoordinate {
        let mut rng = self.rng.lock();
        random_geo(&mut *rng, self.generator.center, self.generator.radius_meters)
    }
}
