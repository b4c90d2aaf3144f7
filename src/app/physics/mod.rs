mod quadtree;

use std::f32::consts::TAU;

use eframe::egui::{vec2, Vec2};

use quadtree::ChargeTree;

use super::RenderGraph;

pub(in crate::app) const DEFAULT_LINK_DISTANCE: f32 = 100.0;
pub(in crate::app) const DEFAULT_CHARGE_STRENGTH: f32 = -200.0;

const ALPHA_MIN: f32 = 0.001;
// 1 - ALPHA_MIN^(1/300): cools from 1.0 to the sleep threshold in ~300 ticks.
const ALPHA_DECAY: f32 = 0.022_763_9;
const THETA_SQ: f32 = 0.81;
const MIN_DISTANCE_SQ: f32 = 1.0;

#[derive(Clone, Copy)]
pub(in crate::app) struct ForceParams {
    pub link_distance: f32,
    pub charge_strength: f32,
    pub center_strength: f32,
    pub velocity_decay: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            link_distance: DEFAULT_LINK_DISTANCE,
            charge_strength: DEFAULT_CHARGE_STRENGTH,
            center_strength: 1.0,
            velocity_decay: 0.4,
        }
    }
}

/// Cooling schedule of the layout. The simulation runs while alpha sits
/// above the sleep threshold and chases `alpha_target`, so interactions can
/// reheat a settled layout by raising the target.
pub(in crate::app) struct Simulation {
    alpha: f32,
    alpha_target: f32,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn awake(&self) -> bool {
        self.alpha >= ALPHA_MIN || self.alpha_target >= ALPHA_MIN
    }

    pub fn reheat(&mut self) {
        self.alpha = 1.0;
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    fn advance(&mut self) -> f32 {
        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;
        self.alpha
    }
}

fn jiggle(first: usize, second: usize) -> Vec2 {
    let angle = ((first as f32) * 0.618_034 + (second as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin()) * 1e-4
}

/// One simulation tick: centering, link springs, many-body charge, then
/// velocity integration. Returns whether the layout advanced.
pub(in crate::app) fn step_simulation(
    cache: &mut RenderGraph,
    simulation: &mut Simulation,
    params: &ForceParams,
) -> bool {
    if cache.nodes.len() < 2 || !simulation.awake() {
        return false;
    }

    let alpha = simulation.advance();
    apply_center_force(cache, params.center_strength);
    apply_link_force(cache, alpha, params.link_distance);
    apply_charge_force(cache, alpha, params.charge_strength);
    integrate(cache, params.velocity_decay);
    true
}

/// Rigid shift that keeps the layout's centroid on the origin.
fn apply_center_force(cache: &mut RenderGraph, strength: f32) {
    let count = cache.nodes.len();
    if count == 0 || strength <= 0.0 {
        return;
    }

    let mut centroid = Vec2::ZERO;
    for node in &cache.nodes {
        centroid += node.pos2;
    }
    centroid = centroid / count as f32 * strength.clamp(0.0, 1.0);

    for node in &mut cache.nodes {
        node.pos2 -= centroid;
    }
}

/// Spring along every edge toward the ideal link distance. Strength is the
/// reciprocal of the smaller endpoint degree and the correction is split by
/// the degree bias, so heavily linked hubs move less than their leaves.
fn apply_link_force(cache: &mut RenderGraph, alpha: f32, link_distance: f32) {
    let count = cache.nodes.len();
    let mut link_degree = vec![0usize; count];
    for &(source, target) in &cache.edges {
        if source == target || source >= count || target >= count {
            continue;
        }
        link_degree[source] += 1;
        link_degree[target] += 1;
    }

    for &(source, target) in &cache.edges {
        if source == target || source >= count || target >= count {
            continue;
        }

        let mut delta = (cache.nodes[target].pos2 + cache.nodes[target].vel2)
            - (cache.nodes[source].pos2 + cache.nodes[source].vel2);
        if delta.length_sq() < 1e-12 {
            delta = jiggle(source, target);
        }

        let distance = delta.length();
        let strength = 1.0 / link_degree[source].min(link_degree[target]).max(1) as f32;
        let correction = delta * ((distance - link_distance) / distance * alpha * strength);

        let bias =
            link_degree[source] as f32 / (link_degree[source] + link_degree[target]).max(1) as f32;
        cache.nodes[target].vel2 -= correction * bias;
        cache.nodes[source].vel2 += correction * (1.0 - bias);
    }
}

fn apply_charge_force(cache: &mut RenderGraph, alpha: f32, strength: f32) {
    let scratch = &mut cache.physics_scratch;
    scratch.positions.clear();
    scratch.positions.extend(cache.nodes.iter().map(|node| node.pos2));

    let Some(tree) = ChargeTree::build(&scratch.positions) else {
        return;
    };

    for (index, node) in cache.nodes.iter_mut().enumerate() {
        let mut push = Vec2::ZERO;
        accumulate_charge(
            &tree,
            index,
            &scratch.positions,
            alpha * strength,
            &mut push,
        );
        node.vel2 += push;
    }
}

fn accumulate_charge(
    cell: &ChargeTree,
    index: usize,
    positions: &[Vec2],
    scaled_strength: f32,
    push: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.points {
            if other == index {
                continue;
            }

            let mut delta = positions[other] - point;
            if delta.length_sq() < 1e-12 {
                delta = jiggle(index, other);
            }
            let distance_sq = delta.length_sq().max(MIN_DISTANCE_SQ);
            *push += delta * (scaled_strength / distance_sq);
        }
        return;
    }

    let delta = cell.barycenter - point;
    let distance_sq = delta.length_sq().max(MIN_DISTANCE_SQ);
    let side = cell.region.side_length();
    if !cell.region.contains(point) && (side * side) < THETA_SQ * distance_sq {
        *push += delta * (scaled_strength * cell.mass / distance_sq);
        return;
    }

    for child in cell.children.iter().flatten() {
        accumulate_charge(child, index, positions, scaled_strength, push);
    }
}

fn integrate(cache: &mut RenderGraph, velocity_decay: f32) {
    let retain = (1.0 - velocity_decay).clamp(0.0, 1.0);
    for node in &mut cache.nodes {
        if let Some(pin) = node.pinned {
            node.pos2 = pin;
            node.vel2 = Vec2::ZERO;
            continue;
        }

        node.vel2 *= retain;
        node.pos2 += node.vel2;
    }
}

/// Rigid rotation of every node position around the layout centroid; the
/// cosmetic spin animation applies this once per second.
pub(in crate::app) fn rotate_about_centroid(cache: &mut RenderGraph, angle_radians: f32) {
    let count = cache.nodes.len();
    if count == 0 {
        return;
    }

    let mut centroid = Vec2::ZERO;
    for node in &cache.nodes {
        centroid += node.pos2;
    }
    centroid /= count as f32;

    let (sin, cos) = angle_radians.sin_cos();
    for node in &mut cache.nodes {
        let offset = node.pos2 - centroid;
        node.pos2 = centroid + vec2(offset.x * cos - offset.y * sin, offset.x * sin + offset.y * cos);
    }
}
