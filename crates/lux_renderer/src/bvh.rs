//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree: every branch has exactly two children and every leaf owns
//! one object. Built once, read-only afterwards.

use crate::{
    error::{RenderError, RenderResult},
    HitRecord, Hittable, Object,
};
use lux_math::{Aabb, Interval, Ray};
use rand::RngCore;

/// BVH node - either a branch with two children or a leaf with one object.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a single object.
    Leaf { object: Object, bbox: Aabb },
}

/// Order `items` for a median split and return their union box plus the
/// split index.
///
/// Items are stably sorted by box minimum along the longest axis of the
/// union box, so equal inputs always produce the same tree.
pub fn split_items<T>(items: &mut [T], bbox_of: impl Fn(&T) -> Aabb) -> (Aabb, usize) {
    let bounds = items
        .iter()
        .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &bbox_of(item)));

    let axis = bounds.longest_axis();
    items.sort_by(|a, b| {
        let a_min = bbox_of(a).axis(axis).min;
        let b_min = bbox_of(b).axis(axis).min;
        a_min.total_cmp(&b_min)
    });

    (bounds, items.len() / 2)
}

impl BvhNode {
    /// Create a BVH over a list of objects.
    pub fn new(objects: Vec<Object>) -> RenderResult<Self> {
        if objects.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let count = objects.len();
        let bvh = Self::build(objects);
        log::debug!(
            "BVH built: {} objects, {} leaves, depth {}",
            count,
            bvh.leaf_count(),
            bvh.depth()
        );
        Ok(bvh)
    }

    /// Recursive median-split construction.
    fn build(mut objects: Vec<Object>) -> Self {
        if objects.len() == 1 {
            if let Some(object) = objects.pop() {
                let bbox = object.bounding_box();
                return BvhNode::Leaf { object, bbox };
            }
        }

        let (bbox, mid) = split_items(&mut objects, |o| o.bounding_box());
        let right_objects = objects.split_off(mid);

        BvhNode::Branch {
            left: Box::new(Self::build(objects)),
            right: Box::new(Self::build(right_objects)),
            bbox,
        }
    }

    /// Number of levels from this node down to the deepest leaf.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord, rng: &mut dyn RngCore) -> bool {
        match self {
            BvhNode::Leaf { object, bbox } => {
                bbox.hit(ray, ray_t) && object.hit(ray, ray_t, rec, rng)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = left.hit(ray, ray_t, rec, rng);

                // Only check right up to closest hit
                let right_max = if hit_left { rec.t } else { ray_t.max };
                let hit_right = right.hit(ray, Interval::new(ray_t.min, right_max), rec, rng);

                hit_left || hit_right
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MaterialId, Sphere};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere_at(x: f32) -> Object {
        Sphere::new(Vec3::new(x, 0.0, -5.0), 0.5, MaterialId(0)).into()
    }

    fn check_boxes(node: &BvhNode) {
        if let BvhNode::Branch { left, right, bbox } = node {
            let union = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());
            assert_eq!(*bbox, union);
            check_boxes(left);
            check_boxes(right);
        }
    }

    #[test]
    fn test_bvh_empty() {
        assert!(matches!(BvhNode::new(vec![]), Err(RenderError::EmptyScene)));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BvhNode::new(vec![sphere_at(0.0)]).unwrap();

        // Should create a leaf
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_bvh_two_objects_ordered_by_min() {
        let bvh = BvhNode::new(vec![sphere_at(4.0), sphere_at(-4.0)]).unwrap();

        match &bvh {
            BvhNode::Branch { left, right, .. } => {
                assert!(matches!(**left, BvhNode::Leaf { .. }));
                assert!(left.bounding_box().x.min < right.bounding_box().x.min);
            }
            BvhNode::Leaf { .. } => panic!("two objects must produce a branch"),
        }
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let bvh = BvhNode::new((0..10).map(|i| sphere_at(i as f32)).collect()).unwrap();
        assert_eq!(bvh.leaf_count(), 10);
        assert!(bvh.depth() <= 5);
        check_boxes(&bvh);

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec, &mut rng));

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);
    }

    #[test]
    fn test_split_items_is_stable() {
        let mut items = vec![(3, 0.0_f32), (1, 0.0), (2, 5.0), (0, -5.0)];
        let (_, mid) = split_items(&mut items, |&(_, x)| {
            Aabb::from_points(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 0.1, 0.1))
        });

        assert_eq!(mid, 2);
        let order: Vec<_> = items.iter().map(|&(id, _)| id).collect();
        assert_eq!(order, vec![0, 3, 1, 2]);
    }
}
