//! Core units, constants, and shared primitives for the NEO deflection workspace.

/// Physical constants. Units are stated per constant.
pub mod constants {
    /// Heliocentric gravitational parameter (km³/s²).
    pub const MU_SUN_KM3_S2: f64 = 1.327_124_400_18e11;
    /// Newtonian constant of gravitation (km³/(kg·s²)).
    pub const G_KM3_KG_S2: f64 = 6.674_30e-20;
    /// Kilometres per astronomical unit.
    pub const AU_KM: f64 = 149_597_870.7;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Julian Date anchoring the `d` day count used by the propagator.
    pub const REFERENCE_EPOCH_JD: f64 = 2_451_543.5;
    /// Julian Date of the J2000.0 epoch.
    pub const J2000_JD: f64 = 2_451_545.0;
    /// Sidereal year used by Kepler's third law in AU/day form.
    pub const KEPLER_YEAR_DAYS: f64 = 365.256_898_326;
    /// Julian Date of the Unix epoch (1970-01-01T00:00:00Z).
    pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
}

/// Unit and angle conversion helpers.
pub mod units {
    use std::f64::consts::TAU;

    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert metres per second to kilometres per second.
    #[inline]
    pub fn ms_to_kms(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert kilometres per second to metres per second.
    #[inline]
    pub fn kms_to_ms(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert astronomical units to kilometres.
    #[inline]
    pub fn au_to_km(v: f64) -> f64 {
        v * super::constants::AU_KM
    }

    /// Convert kilometres to astronomical units.
    #[inline]
    pub fn km_to_au(v: f64) -> f64 {
        v / super::constants::AU_KM
    }

    /// Convert megawatts to watts.
    #[inline]
    pub fn mw_to_w(v: f64) -> f64 {
        v * 1.0e6
    }

    #[inline]
    pub fn deg_to_rad(deg: f64) -> f64 {
        deg.to_radians()
    }

    #[inline]
    pub fn rad_to_deg(rad: f64) -> f64 {
        rad.to_degrees()
    }

    /// Wrap an angle in degrees into `[0, 360)`.
    #[inline]
    pub fn wrap_degrees(deg: f64) -> f64 {
        let wrapped = deg.rem_euclid(360.0);
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    }

    /// Wrap an angle in radians into `[0, 2π)`.
    #[inline]
    pub fn wrap_two_pi(rad: f64) -> f64 {
        let wrapped = rad.rem_euclid(TAU);
        if wrapped >= TAU { 0.0 } else { wrapped }
    }
}

/// Day, second and Julian Date offsets.
pub mod time {
    use super::constants::{REFERENCE_EPOCH_JD, SECONDS_PER_DAY};

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }

    /// Days elapsed since the propagator's reference epoch for a Julian Date.
    #[inline]
    pub fn jd_to_day_offset(jd: f64) -> f64 {
        jd - REFERENCE_EPOCH_JD
    }

    /// Inverse of [`jd_to_day_offset`].
    #[inline]
    pub fn day_offset_to_jd(d: f64) -> f64 {
        d + REFERENCE_EPOCH_JD
    }
}

/// Heliocentric 3-vectors as plain `[f64; 3]` arrays.
pub mod vector {
    /// Alias for a 3D vector in AU, km or km/s depending on context.
    pub type Vector3 = [f64; 3];

    /// The zero vector.
    pub const ZERO: Vector3 = [0.0; 3];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Right-handed cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector along `v`, or `None` when the norm is zero or not finite.
    #[inline]
    pub fn unit(v: &Vector3) -> Option<Vector3> {
        let n = norm(v);
        if n > 0.0 && n.is_finite() {
            Some(scale(v, 1.0 / n))
        } else {
            None
        }
    }

    /// Distance between two points.
    #[inline]
    pub fn distance(a: &Vector3, b: &Vector3) -> f64 {
        norm(&sub(a, b))
    }
}

/// 3×3 rotation matrices stored row-major.
pub mod matrix {
    use super::vector::Vector3;

    pub type Matrix3 = [[f64; 3]; 3];

    pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    /// Active rotation about the x axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Matrix3 {
        let (s, c) = angle.sin_cos();
        [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
    }

    /// Active rotation about the z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Matrix3 {
        let (s, c) = angle.sin_cos();
        [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
    }

    /// Matrix product `a · b`.
    pub fn mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        out
    }

    /// Apply a matrix to a column vector.
    pub fn mul_vec(m: &Matrix3, v: &Vector3) -> Vector3 {
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    pub fn transpose(m: &Matrix3) -> Matrix3 {
        [
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ]
    }

    /// Perifocal → heliocentric ecliptic rotation `Rz(Ω) · Rx(i) · Rz(ω)`.
    ///
    /// All angles are in radians.
    pub fn perifocal_to_inertial(raan: f64, inclination: f64, arg_perihelion: f64) -> Matrix3 {
        mul(
            &mul(&rotation_z(raan), &rotation_x(inclination)),
            &rotation_z(arg_perihelion),
        )
    }
}
