//! WGS84 geodetic math: ECEF conversion, straight-line distance, bearing
//! and elevation between two points on (or above) the ellipsoid.

// WGS-84 ellipsoid parameters (NIMA TR8350.2)
pub const SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
pub const ECCENTRICITY_SQUARED: f64 = 6.69437999014e-3;

/// A geodetic position: latitude/longitude in degrees, altitude in meters
/// above the WGS84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl GeoPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }
}

/// Azimuth, elevation and range from an observer to a target.
#[derive(Debug, Clone, Copy)]
pub struct AzElRange {
    /// Degrees clockwise from true north, `[0, 360)`.
    pub azimuth_deg: f64,
    /// Degrees above (+) or below (-) the local horizon, `[-90, 90]`.
    pub elevation_deg: f64,
    /// Straight-line distance in meters.
    pub range_m: f64,
}

/// Convert a geodetic position to ECEF Cartesian coordinates in meters.
///
/// N = a / sqrt(1 - e² sin²φ); X = (N + h) cosφ cosλ; Y = (N + h) cosφ sinλ;
/// Z = (N(1 - e²) + h) sinφ.
pub fn geodetic_to_ecef(p: &GeoPoint) -> [f64; 3] {
    let lat = p.lat_rad();
    let lon = p.lon_rad();
    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let sin_lon = lon.sin();
    let cos_lon = lon.cos();

    // Radius of curvature in the prime vertical
    let n = SEMI_MAJOR_AXIS_M / (1.0 - ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt();

    let x = (n + p.altitude_m) * cos_lat * cos_lon;
    let y = (n + p.altitude_m) * cos_lat * sin_lon;
    let z = (n * (1.0 - ECCENTRICITY_SQUARED) + p.altitude_m) * sin_lat;
    [x, y, z]
}

/// Straight-line (Euclidean) distance in meters between two points, computed
/// as the norm of the ECEF difference. Symmetric in its arguments.
pub fn distance_3d(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let pa = geodetic_to_ecef(a);
    let pb = geodetic_to_ecef(b);
    let dx = pb[0] - pa[0];
    let dy = pb[1] - pa[1];
    let dz = pb[2] - pa[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Forward azimuth from `a` to `b` in degrees, `[0, 360)`, measured clockwise
/// from true north. Spherical approximation: ignores altitude and the
/// ellipsoidal flattening, so it is not exactly the reverse of `bearing(b, a)`.
pub fn bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat_rad();
    let lat2 = b.lat_rad();
    let delta_lon = (b.longitude_deg - a.longitude_deg).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Great-circle distance in meters on a sphere of radius `SEMI_MAJOR_AXIS_M`,
/// ignoring altitude. Used as the horizontal leg for the elevation angle.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat_rad();
    let lat2 = b.lat_rad();
    let delta_lat = (b.latitude_deg - a.latitude_deg).to_radians();
    let delta_lon = (b.longitude_deg - a.longitude_deg).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    SEMI_MAJOR_AXIS_M * c
}

/// Elevation angle from `a` to `b` in degrees: positive above the horizon at
/// `a`, negative below. Horizontal leg uses the haversine distance.
pub fn elevation(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let horizontal = haversine_distance(a, b);
    (b.altitude_m - a.altitude_m).atan2(horizontal).to_degrees()
}

/// Azimuth, elevation and range from `a` to `b`. Range is the ellipsoidal
/// 3-D distance; the angles use the spherical approximations above. The mix
/// is deliberate and adequate for short-range tracking.
pub fn solve(a: &GeoPoint, b: &GeoPoint) -> AzElRange {
    AzElRange {
        azimuth_deg: bearing(a, b),
        elevation_deg: elevation(a, b),
        range_m: distance_3d(a, b),
    }
}
