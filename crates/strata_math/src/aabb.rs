use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box used for ray pruning and spatial partitioning.
///
/// `bounds[0]` is the minimum corner, `bounds[1]` the maximum corner. The
/// two-element layout lets the slab test pick the near/far bound straight
/// from the ray's direction signs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub bounds: [Vec3; 2],
}

impl Aabb {
    /// Create an AABB from its minimum and maximum corners.
    ///
    /// # Panics
    /// If `min` is greater than `max` on any axis.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        assert!(
            min.cmple(max).all(),
            "malformed Aabb: min {min:?} exceeds max {max:?}"
        );
        Self { bounds: [min, max] }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            bounds: [a.min(b), a.max(b)],
        }
    }

    /// Smallest box enclosing all the given points, or `EMPTY` for none.
    pub fn enclosing<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points.into_iter().fold(Aabb::EMPTY, |acc, p| Aabb {
            bounds: [acc.bounds[0].min(p), acc.bounds[1].max(p)],
        })
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            bounds: [
                box0.bounds[0].min(box1.bounds[0]),
                box0.bounds[1].max(box1.bounds[1]),
            ],
        }
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.bounds[0]
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.bounds[1]
    }

    /// True for the `EMPTY` box and anything else enclosing no point.
    pub fn is_empty(&self) -> bool {
        self.bounds[0].cmpgt(self.bounds[1]).any()
    }

    /// Returns the center point of the bounding box.
    pub fn centre(&self) -> Vec3 {
        self.bounds[0] + (self.bounds[1] - self.bounds[0]) * 0.5
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method using the ray's cached inverse direction. The direction
    /// sign selects which bound is entered first, so no per-axis swap is
    /// needed. Infinite inverse components compare correctly; the NaN produced
    /// by an origin lying exactly on the slab of a parallel ray leaves the
    /// interval unchanged.
    pub fn intersects(&self, ray: &Ray, ray_t: Interval) -> bool {
        let origin = ray.origin();
        let inv = ray.inverse_direction();
        let signs = ray.direction_signs();
        let mut interval_min = ray_t.min;
        let mut interval_max = ray_t.max;

        for axis in 0..3 {
            let near = (self.bounds[signs[axis]][axis] - origin[axis]) * inv[axis];
            let far = (self.bounds[1 - signs[axis]][axis] - origin[axis]) * inv[axis];
            if near > interval_min {
                interval_min = near;
            }
            if far < interval_max {
                interval_max = far;
            }
            if interval_min > interval_max {
                return false;
            }
        }
        true
    }

    /// Inclusive point containment test.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.bounds[0]).all() && point.cmple(self.bounds[1]).all()
    }

    /// Index (0..8) of the octant around `centre` that `point` falls into.
    ///
    /// Bit 0 is set for x, bit 1 for y, bit 2 for z when the coordinate is
    /// `>=` the centre, so a point on a split plane always lands in the upper
    /// octant.
    pub fn octant_index(centre: Vec3, point: Vec3) -> usize {
        (point.x >= centre.x) as usize
            | ((point.y >= centre.y) as usize) << 1
            | ((point.z >= centre.z) as usize) << 2
    }

    /// Box of the octant `index` around this box's centre.
    pub fn octant(&self, index: usize) -> Aabb {
        let centre = self.centre();
        let pick = |bit: usize, axis: usize| {
            if index & bit == 0 {
                (self.bounds[0][axis], centre[axis])
            } else {
                (centre[axis], self.bounds[1][axis])
            }
        };
        let (x0, x1) = pick(1, 0);
        let (y0, y1) = pick(2, 1);
        let (z0, z1) = pick(4, 2);
        Aabb::new(Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1))
    }

    /// Box containing nothing; the identity for `surrounding`.
    pub const EMPTY: Aabb = Aabb {
        bounds: [Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 3.0), Vec3::new(0.0, 10.0, -3.0));

        assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, -3.0));
        assert_eq!(aabb.max(), Vec3::new(10.0, 10.0, 3.0));
    }

    #[test]
    #[should_panic(expected = "malformed Aabb")]
    fn test_aabb_new_rejects_inverted_corners() {
        Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::new(Vec3::ZERO, Vec3::splat(5.0));
        let box2 = Aabb::new(Vec3::splat(3.0), Vec3::splat(10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.min(), Vec3::ZERO);
        assert_eq!(surrounding.max(), Vec3::splat(10.0));
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &box1), box1);
    }

    #[test]
    fn test_ray_along_axis_hits() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        assert!(unit_box().intersects(&ray, Interval::new(0.0, 100.0)));
        // Window ending before the box is entered at t = 4
        assert!(!unit_box().intersects(&ray, Interval::new(0.0, 3.9)));
        // Window starting after the box is left at t = 6
        assert!(!unit_box().intersects(&ray, Interval::new(6.1, 100.0)));
        assert!(unit_box().intersects(&ray, Interval::new(4.0, 6.0)));
    }

    #[test]
    fn test_ray_missing_box() {
        let ray = Ray::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!unit_box().intersects(&ray, Interval::new(0.0, 100.0)));

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!unit_box().intersects(&away, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_flat_box_is_hit() {
        let slab = Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        let ray = Ray::new(Vec3::new(0.2, 3.0, 0.1), Vec3::new(0.0, -1.0, 0.0));

        assert!(slab.intersects(&ray, Interval::new(0.0, 10.0)));
    }

    #[test]
    fn test_contains_inclusive() {
        let aabb = unit_box();

        assert!(aabb.contains(Vec3::ZERO));
        assert!(aabb.contains(Vec3::splat(1.0)));
        assert!(aabb.contains(Vec3::new(-1.0, 0.5, 1.0)));
        assert!(!aabb.contains(Vec3::new(1.01, 0.0, 0.0)));
        assert!(!Aabb::EMPTY.contains(Vec3::ZERO));
    }

    #[test]
    fn test_aabb_centre() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        assert_eq!(aabb.centre(), Vec3::splat(5.0));
    }

    #[test]
    fn test_octants_partition_box() {
        let aabb = Aabb::new(Vec3::splat(-5.0), Vec3::splat(5.0));

        for index in 0..8 {
            let octant = aabb.octant(index);
            let probe = octant.centre();
            assert_eq!(Aabb::octant_index(aabb.centre(), probe), index);
            assert!(octant.contains(probe));
        }
        // Split planes go to the upper octant
        assert_eq!(Aabb::octant_index(Vec3::ZERO, Vec3::ZERO), 7);
        assert_eq!(Aabb::octant_index(Vec3::ZERO, Vec3::new(-1.0, 0.0, -1.0)), 2);
    }

    #[test]
    fn test_enclosing_points() {
        let aabb = Aabb::enclosing([Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 4.0, 3.0)]);

        assert_eq!(aabb.min(), Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max(), Vec3::new(1.0, 4.0, 3.0));
        assert!(Aabb::enclosing(std::iter::empty()).is_empty());
    }
}
