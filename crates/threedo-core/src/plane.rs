//! Split-plane coefficients for BSP records.
//!
//! A BSP record stores the plane `a·x + b·y + c·z + d = 0` through three
//! points. The normal is the integer cross product `(p2 - p1) × (p3 - p1)` and
//! `d = -n·p1`. The four coefficients are reduced by their common divisor and,
//! when a coefficient still does not fit a signed 32-bit field, shifted right
//! together until all of them do.
//!
//! Coordinates are widened to `i128` before any arithmetic. Points far enough
//! apart that the normal or `d` would not fit even there have no plane.

/// An integer point in model space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point3 {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Point3 {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Builds a point from the first three numbers of a slice.
    ///
    /// Returns `None` if fewer than three numbers are available.
    pub fn from_slice(values: &[i64]) -> Option<Self> {
        match values {
            [x, y, z, ..] => Some(Self::new(*x, *y, *z)),
            _ => None,
        }
    }

    fn wide(self) -> [i128; 3] {
        [self.x.into(), self.y.into(), self.z.into()]
    }
}

/// `a - b`. Differences of `i64` coordinates always fit.
fn sub([ax, ay, az]: [i128; 3], [bx, by, bz]: [i128; 3]) -> [i128; 3] {
    [ax - bx, ay - by, az - bz]
}

/// `p·q - r·s`
fn det2(p: i128, q: i128, r: i128, s: i128) -> Option<i128> {
    p.checked_mul(q)?.checked_sub(r.checked_mul(s)?)
}

fn cross([ax, ay, az]: [i128; 3], [bx, by, bz]: [i128; 3]) -> Option<[i128; 3]> {
    Some([
        det2(ay, bz, az, by)?,
        det2(az, bx, ax, bz)?,
        det2(ax, by, ay, bx)?,
    ])
}

fn dot([ax, ay, az]: [i128; 3], [bx, by, bz]: [i128; 3]) -> Option<i128> {
    ax.checked_mul(bx)?
        .checked_add(ay.checked_mul(by)?)?
        .checked_add(az.checked_mul(bz)?)
}

/// Computes the split-plane coefficients `[a, b, c, d]` through three points.
///
/// Collinear points produce the degenerate plane `[0, 0, 0, 0]`. Returns
/// `None` when the coefficients overflow before they can be reduced.
///
/// # Examples
///
/// ```
/// use threedo_core::plane::{Point3, coefficients};
///
/// // The plane z = 5, normal pointing up.
/// let plane = coefficients([
///     Point3::new(0, 0, 5),
///     Point3::new(10, 0, 5),
///     Point3::new(0, 10, 5),
/// ]);
/// assert_eq!(plane, Some([0, 0, 1, -5]));
/// ```
pub fn coefficients(points: [Point3; 3]) -> Option<[i64; 4]> {
    let [p1, p2, p3] = points.map(Point3::wide);
    let normal = cross(sub(p2, p1), sub(p3, p1))?;
    let d = dot(normal, p1)?.checked_neg()?;
    let mut plane = [normal[0], normal[1], normal[2], d];

    let divisor = plane
        .iter()
        .try_fold(0, |acc, value| Some(gcd(acc, value.checked_abs()?)))?;
    if divisor > 1 {
        plane.iter_mut().for_each(|value| *value /= divisor);
    }

    let limit = i128::from(i32::MAX);
    while plane.iter().any(|value| value.abs() > limit) {
        plane.iter_mut().for_each(|value| *value >>= 1);
    }
    // Every coefficient now fits in 32 bits.
    Some(plane.map(|value| value as i64))
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_aligned_planes() {
        let plane = coefficients([
            Point3::new(3, 0, 0),
            Point3::new(3, 1, 0),
            Point3::new(3, 0, 1),
        ]);
        assert_eq!(plane, Some([1, 0, 0, -3]));
    }

    #[test]
    fn test_winding_flips_normal() {
        let plane = coefficients([
            Point3::new(0, 0, 5),
            Point3::new(0, 10, 5),
            Point3::new(10, 0, 5),
        ]);
        assert_eq!(plane, Some([0, 0, -1, 5]));
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let plane = coefficients([
            Point3::new(0, 0, 0),
            Point3::new(1, 1, 1),
            Point3::new(2, 2, 2),
        ]);
        assert_eq!(plane, Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_points_stay_on_the_plane() {
        let points = [
            Point3::new(120, -40, 7),
            Point3::new(-33, 18, 91),
            Point3::new(5, 600, -12),
        ];
        let [a, b, c, d] = coefficients(points).unwrap();
        for p in points {
            assert_eq!(a * p.x + b * p.y + c * p.z + d, 0);
        }
    }

    #[test]
    fn test_large_coordinates_fit_32_bits() {
        let plane = coefficients([
            Point3::new(-3_000_000, 0, 1),
            Point3::new(3_000_000, 1, 0),
            Point3::new(0, 3_000_000, 7),
        ])
        .unwrap();
        assert!(plane.iter().all(|v| v.abs() <= i64::from(i32::MAX)));
    }

    #[test]
    fn test_coordinates_far_apart_are_widened() {
        let plane = coefficients([
            Point3::new(9_000_000_000_000_000_000, 0, 0),
            Point3::new(-9_000_000_000_000_000_000, 0, 0),
            Point3::new(0, 9_000_000_000_000_000_000, 0),
        ]);
        assert_eq!(plane, Some([0, 0, -1, 0]));
    }

    #[test]
    fn test_overflowing_normal_has_no_plane() {
        let plane = coefficients([
            Point3::new(i64::MIN, i64::MIN, 0),
            Point3::new(i64::MAX, i64::MIN, 0),
            Point3::new(i64::MIN, i64::MAX, 0),
        ]);
        assert_eq!(plane, None);
    }

    #[test]
    fn test_from_slice() {
        assert_eq!(Point3::from_slice(&[1, 2, 3, 4]), Some(Point3::new(1, 2, 3)));
        assert_eq!(Point3::from_slice(&[1, 2]), None);
    }
}
