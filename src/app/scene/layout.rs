use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

pub(in crate::app) const SPHERE_RADIUS: f32 = 90.0;
pub(in crate::app) const CUBE_EXTENT: f32 = 90.0;

const LINK_FLOOR_DISTANCE: f32 = 5.0;
const REPULSION_DISTANCE: f32 = 10.0;
const ATTRACTION_STEP: f32 = 0.25;

/// Uniform-density placement inside a sphere volume: radius sampled with the
/// cube-root transform, direction from spherical angles.
pub(in crate::app) fn scatter_sphere(rng: &mut impl Rng, count: usize, radius: f32) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let r = radius * rng.r#gen::<f32>().cbrt();
            let theta = (2.0 * rng.r#gen::<f32>() - 1.0).acos();
            let phi = TAU * rng.r#gen::<f32>();
            Vec3::new(
                r * theta.sin() * phi.cos(),
                r * theta.sin() * phi.sin(),
                r * theta.cos(),
            )
        })
        .collect()
}

/// Uniform placement inside a cube volume.
pub(in crate::app) fn scatter_cube(rng: &mut impl Rng, count: usize, extent: f32) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
            )
        })
        .collect()
}

fn separation_axis(first: usize, second: usize) -> Vec3 {
    let angle = ((first as f32) * 0.618_034 + (second as f32) * 0.414_214) * TAU;
    Vec3::new(angle.cos(), angle.sin(), 0.0)
}

/// One relaxation pass over a scattered placement, not iterated to
/// convergence: connected pairs pull together down to a 5-unit floor, then
/// every pair closer than 10 units is pushed out to the threshold.
pub(in crate::app) fn relax_once(positions: &mut [Vec3], edges: &[(usize, usize)]) {
    let count = positions.len();

    for &(source, target) in edges {
        if source == target || source >= count || target >= count {
            continue;
        }

        let delta = positions[target] - positions[source];
        let distance = delta.length();
        if distance <= LINK_FLOOR_DISTANCE {
            continue;
        }

        let direction = delta / distance;
        let pull = (distance - LINK_FLOOR_DISTANCE) * ATTRACTION_STEP * 0.5;
        positions[source] += direction * pull;
        positions[target] -= direction * pull;
    }

    for first in 0..count {
        for second in (first + 1)..count {
            let delta = positions[second] - positions[first];
            let distance_sq = delta.length_squared();
            if distance_sq >= REPULSION_DISTANCE * REPULSION_DISTANCE {
                continue;
            }

            let distance = distance_sq.sqrt();
            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                separation_axis(first, second)
            };

            let push = (REPULSION_DISTANCE - distance) * 0.5;
            positions[first] -= direction * push;
            positions[second] += direction * push;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sphere_samples_stay_within_radius() {
        let mut rng = StdRng::seed_from_u64(1);
        let positions = scatter_sphere(&mut rng, 2048, SPHERE_RADIUS);

        for position in &positions {
            assert!(position.length() <= SPHERE_RADIUS + 0.001);
        }
    }

    // Uniform density in a ball puts the median sample radius at
    // R * 0.5^(1/3) ~= 0.794 R; plain radius-uniform sampling would land at
    // 0.5 R instead.
    #[test]
    fn sphere_sampling_is_volume_uniform() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut radii = scatter_sphere(&mut rng, 4096, SPHERE_RADIUS)
            .iter()
            .map(|position| position.length())
            .collect::<Vec<_>>();
        radii.sort_by(f32::total_cmp);

        let median = radii[radii.len() / 2];
        let expected = SPHERE_RADIUS * 0.5f32.cbrt();
        assert!(
            (median - expected).abs() < SPHERE_RADIUS * 0.03,
            "median {median} vs expected {expected}"
        );
    }

    #[test]
    fn cube_samples_stay_within_extent() {
        let mut rng = StdRng::seed_from_u64(3);
        let positions = scatter_cube(&mut rng, 1024, CUBE_EXTENT);

        for position in &positions {
            assert!(position.x.abs() <= CUBE_EXTENT);
            assert!(position.y.abs() <= CUBE_EXTENT);
            assert!(position.z.abs() <= CUBE_EXTENT);
        }
    }

    #[test]
    fn attraction_pulls_connected_pair_without_crossing_floor() {
        let mut positions = vec![Vec3::ZERO, Vec3::new(40.0, 0.0, 0.0)];
        relax_once(&mut positions, &[(0, 1)]);

        let distance = positions[0].distance(positions[1]);
        assert!((distance - 31.25).abs() < 0.001, "distance {distance}");
        assert!(distance >= LINK_FLOOR_DISTANCE);
    }

    #[test]
    fn close_pairs_are_pushed_to_the_repulsion_threshold() {
        let mut positions = vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)];
        relax_once(&mut positions, &[]);

        let distance = positions[0].distance(positions[1]);
        assert!((distance - REPULSION_DISTANCE).abs() < 0.001, "distance {distance}");
    }

    #[test]
    fn coincident_pairs_are_separated() {
        let mut positions = vec![Vec3::ZERO, Vec3::ZERO];
        relax_once(&mut positions, &[]);

        let distance = positions[0].distance(positions[1]);
        assert!((distance - REPULSION_DISTANCE).abs() < 0.001);
    }

    #[test]
    fn distant_unconnected_pairs_do_not_move() {
        let mut positions = vec![Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)];
        relax_once(&mut positions, &[]);

        assert_eq!(positions[0], Vec3::ZERO);
        assert_eq!(positions[1], Vec3::new(50.0, 0.0, 0.0));
    }

    #[test]
    fn relaxation_is_a_single_pass() {
        // Two pulls of the same pair from the same start must drift further
        // than one; a converging loop would settle near the floor instead.
        let mut once = vec![Vec3::ZERO, Vec3::new(40.0, 0.0, 0.0)];
        relax_once(&mut once, &[(0, 1)]);
        let first = once[0].distance(once[1]);

        relax_once(&mut once, &[(0, 1)]);
        let second = once[0].distance(once[1]);

        assert!(second < first);
        assert!(second > LINK_FLOOR_DISTANCE);
    }
}
