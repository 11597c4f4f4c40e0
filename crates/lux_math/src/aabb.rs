use crate::{Interval, Ray, Vec3};

/// Minimum extent along any axis. Flat primitives such as quads get padded
/// to this so the slab test never sees a zero-width box.
const MIN_EXTENT: f32 = 0.0001;

/// Axis-aligned bounding box, one [`Interval`] per axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Build from per-axis intervals, padding any degenerate axis.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let pad = |i: Interval| if i.size() < MIN_EXTENT { i.padded(MIN_EXTENT) } else { i };
        Self {
            x: pad(x),
            y: pad(y),
            z: pad(z),
        }
    }

    /// Box spanning two corners given in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        Self::new(
            Interval::new(lo.x, hi.x),
            Interval::new(lo.y, hi.y),
            Interval::new(lo.z, hi.z),
        )
    }

    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(a.x, b.x),
            y: Interval::surrounding(a.y, b.y),
            z: Interval::surrounding(a.z, b.z),
        }
    }

    /// Interval along axis `n` (0 = x, 1 = y, anything else = z).
    pub fn axis(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    pub fn centroid(&self) -> Vec3 {
        0.5 * (self.min() + self.max())
    }

    /// Slab test against `ray_t`, narrowed axis by axis.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let origin = r.origin();
        let inv_dir = r.direction().recip();

        for axis in 0..3 {
            let slab = self.axis(axis);
            let t0 = (slab.min - origin[axis]) * inv_dir[axis];
            let t1 = (slab.max - origin[axis]) * inv_dir[axis];
            let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };

            ray_t.min = ray_t.min.max(near);
            ray_t.max = ray_t.max.min(far);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }

    pub fn contains(&self, other: &Aabb) -> bool {
        self.x.encloses(other.x) && self.y.encloses(other.y) && self.z.encloses(other.z)
    }

    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb::new(
            self.x.shifted(offset.x),
            self.y.shifted(offset.y),
            self.z.shifted(offset.z),
        )
    }

    /// Index of the widest axis; ties prefer the later axis.
    pub fn longest_axis(&self) -> usize {
        let size = Vec3::new(self.x.size(), self.y.size(), self.z.size());
        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Aabb {
        Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_from_points_any_order() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::splat(10.0));
        assert_eq!(aabb.centroid(), Vec3::splat(5.0));
    }

    #[test]
    fn test_flat_axis_is_padded() {
        let flat = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));

        assert!(flat.y.size() >= MIN_EXTENT);
        assert!(flat.y.contains(0.0));
        assert_eq!(flat.x, Interval::new(0.0, 1.0));
    }

    #[test]
    fn test_surrounding_encloses_inputs() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let b = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(10.0));
        let both = Aabb::surrounding(&a, &b);

        assert_eq!(both.min(), Vec3::ZERO);
        assert_eq!(both.max(), Vec3::splat(10.0));
        assert!(both.contains(&a) && both.contains(&b));
        assert!(!a.contains(&both));
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &a), a);
    }

    #[test]
    fn test_slab_hit() {
        let cube = unit_cube();
        let t = Interval::new(0.0, 100.0);

        let toward = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0);
        assert!(cube.hit(&toward, t));
        assert!(!cube.hit(&toward, Interval::new(0.0, 3.0)));

        let away = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z, 0.0);
        assert!(!cube.hit(&away, t));

        let beside = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z, 0.0);
        assert!(!cube.hit(&beside, t));

        // Axis-parallel ray inside the x slab: zero direction components give infinities.
        let grazing = Ray::new(Vec3::new(0.5, 0.5, -5.0), Vec3::Z, 0.0);
        assert!(cube.hit(&grazing, t));
    }

    #[test]
    fn test_longest_axis() {
        for (axis, extent) in [(0, Vec3::new(10.0, 1.0, 1.0)), (1, Vec3::new(1.0, 10.0, 1.0)), (2, Vec3::new(1.0, 1.0, 10.0))] {
            assert_eq!(Aabb::from_points(Vec3::ZERO, extent).longest_axis(), axis);
        }
    }

    #[test]
    fn test_translate() {
        let moved = Aabb::from_points(Vec3::ZERO, Vec3::ONE).translate(Vec3::new(5.0, 0.0, -1.0));

        assert_eq!(moved.min(), Vec3::new(5.0, 0.0, -1.0));
        assert_eq!(moved.max(), Vec3::new(6.0, 1.0, 0.0));
    }
}
