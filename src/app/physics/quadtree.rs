use eframe::egui::{vec2, Vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy)]
pub(super) struct Region {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Region {
    fn covering(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let span = (max.x - min.x).max(max.y - min.y).max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        ((point.x >= self.center.x) as usize) | (((point.y >= self.center.y) as usize) << 1)
    }

    fn subregion(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let dx = if quadrant & 1 == 0 { -quarter } else { quarter };
        let dy = if quadrant & 2 == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(dx, dy),
            half_extent: quarter,
        }
    }
}

/// Point-region quadtree over node positions; interior cells carry the
/// aggregate mass and barycenter the Barnes-Hut approximation reads.
pub(super) struct ChargeTree {
    pub(super) region: Region,
    pub(super) barycenter: Vec2,
    pub(super) mass: f32,
    pub(super) points: Vec<usize>,
    pub(super) children: [Option<Box<ChargeTree>>; 4],
}

impl ChargeTree {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let region = Region::covering(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_cell(region, indices, positions, 0))
    }

    fn build_cell(region: Region, indices: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mass = indices.len() as f32;
        let mut barycenter = Vec2::ZERO;
        for &index in &indices {
            barycenter += positions[index];
        }
        if mass > 0.0 {
            barycenter /= mass;
        }

        let mut cell = Self {
            region,
            barycenter,
            mass,
            points: indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || cell.points.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &cell.points {
            buckets[region.quadrant_of(positions[index])].push(index);
        }

        // Coincident clusters collapse into one bucket; splitting further
        // recurses without progress.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            cell.children[quadrant] = Some(Box::new(Self::build_cell(
                region.subregion(quadrant),
                bucket,
                positions,
                depth + 1,
            )));
        }
        cell.points.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cluster_stays_a_leaf() {
        let positions = vec![vec2(1.0, 1.0); 30];
        let tree = ChargeTree::build(&positions).expect("tree builds");

        assert!(tree.is_leaf());
        assert_eq!(tree.points.len(), 30);
        assert!((tree.barycenter - vec2(1.0, 1.0)).length() < 0.001);
    }

    #[test]
    fn spread_points_split_and_conserve_mass() {
        let positions = (0..64)
            .map(|index| vec2((index % 8) as f32 * 10.0, (index / 8) as f32 * 10.0))
            .collect::<Vec<_>>();
        let tree = ChargeTree::build(&positions).expect("tree builds");

        assert!(!tree.is_leaf());
        assert_eq!(tree.mass, 64.0);

        let child_mass: f32 = tree.children.iter().flatten().map(|child| child.mass).sum();
        assert_eq!(child_mass, 64.0);
    }

    #[test]
    fn empty_input_has_no_tree() {
        assert!(ChargeTree::build(&[]).is_none());
    }
}
