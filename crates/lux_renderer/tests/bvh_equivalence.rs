//! The BVH must return exactly what a linear scan over the same objects does.

use lux_renderer::rng::gen_range;
use lux_renderer::{
    make_box, Aabb, BvhNode, HitRecord, Hittable, HittableList, Interval, MaterialId, Object,
    Quad, Ray, RotateY, Sphere, Translate, Triangle, Vec3,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        gen_range(rng, -extent, extent),
        gen_range(rng, -extent, extent),
        gen_range(rng, -extent, extent),
    )
}

fn random_objects(rng: &mut StdRng, count: usize) -> Vec<Object> {
    (0..count)
        .map(|i| {
            let material = MaterialId(i as u32);
            let p = random_point(rng, 10.0);
            match i % 5 {
                0 => Sphere::new(p, gen_range(rng, 0.2, 1.0), material).into(),
                1 => Sphere::moving(p, p + random_point(rng, 1.0), 0.5, material).into(),
                2 => Quad::new(p, random_point(rng, 1.5), random_point(rng, 1.5), material).into(),
                3 => Triangle::new(p, p + random_point(rng, 1.0), p + random_point(rng, 1.0), material)
                    .into(),
                _ => Translate::new(
                    RotateY::new(make_box(Vec3::ZERO, Vec3::splat(0.7), material), gen_range(rng, 0.0, 360.0)),
                    p,
                )
                .into(),
            }
        })
        .collect()
}

#[test]
fn bvh_matches_linear_scan_for_shuffled_inputs() {
    let mut rng = StdRng::seed_from_u64(2024);
    let objects = random_objects(&mut rng, 120);

    let linear: HittableList = objects.iter().cloned().collect();

    for trial in 0..3 {
        let mut shuffled = objects.clone();
        shuffled.shuffle(&mut rng);
        let bvh = BvhNode::new(shuffled).unwrap();
        assert_eq!(bvh.leaf_count(), objects.len());

        for _ in 0..2000 {
            let origin = random_point(&mut rng, 15.0);
            let direction = random_point(&mut rng, 1.0);
            if direction.length_squared() < 1e-4 {
                continue;
            }
            let ray = Ray::new(origin, direction, gen_range(&mut rng, 0.0, 1.0));
            let interval = Interval::new(0.001, f32::INFINITY);

            let mut expected = HitRecord::default();
            let mut actual = HitRecord::default();
            let hit_linear = linear.hit(&ray, interval, &mut expected, &mut rng);
            let hit_bvh = bvh.hit(&ray, interval, &mut actual, &mut rng);

            assert_eq!(hit_linear, hit_bvh, "trial {trial}: hit mismatch for {ray:?}");
            if hit_linear {
                assert!((expected.t - actual.t).abs() < 1e-4, "trial {trial}: t mismatch");
                assert_eq!(expected.material, actual.material);
            }
        }
    }
}

fn check_node(node: &BvhNode) -> Aabb {
    match node {
        BvhNode::Leaf { object, bbox } => {
            assert_eq!(*bbox, object.bounding_box());
            *bbox
        }
        BvhNode::Branch { left, right, bbox } => {
            let union = Aabb::surrounding(&check_node(left), &check_node(right));
            assert_eq!(*bbox, union, "branch box must equal the union of its children");
            *bbox
        }
    }
}

#[test]
fn node_boxes_are_unions_and_leaves_bound_motion() {
    let mut rng = StdRng::seed_from_u64(77);
    let bvh = BvhNode::new(random_objects(&mut rng, 64)).unwrap();
    check_node(&bvh);

    // A moving sphere is inside its leaf box at every shutter time
    let start = Vec3::new(-3.0, 0.0, 0.0);
    let end = Vec3::new(3.0, 1.0, 0.0);
    let sphere = Sphere::moving(start, end, 0.5, MaterialId(0));
    let bbox = sphere.bounding_box();
    for i in 0..=10 {
        let t = i as f32 / 10.0;
        let c = sphere.center(t);
        let at_t = Aabb::from_points(c - Vec3::splat(0.5), c + Vec3::splat(0.5));
        assert!(bbox.contains(&at_t), "sphere escapes its box at t={t}");
    }
}
