use eframe::egui::{Pos2, Rect, Vec2};
use glam::{Mat4, Vec3, Vec4};

const FOV_Y_RADIANS: f32 = 1.308_997; // 75 degrees
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 2000.0;

const ROTATE_SPEED: f32 = 0.008;
const PAN_SPEED: f32 = 0.0012;
const DOLLY_SPEED: f32 = 0.0016;
const PITCH_LIMIT: f32 = 1.45;
const MIN_DISTANCE: f32 = 20.0;
const MAX_DISTANCE: f32 = 900.0;
const INERTIA_DAMPING: f32 = 0.86;
const INERTIA_SLEEP: f32 = 0.0002;

/// Damped orbit camera: rotate around a focus point, dolly with the wheel,
/// optionally pan the focus point sideways.
pub(in crate::app) struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: Vec3,
    pub pan_enabled: bool,
    yaw_velocity: f32,
    pitch_velocity: f32,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.35,
            distance: 260.0,
            target: Vec3::ZERO,
            pan_enabled: true,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
        }
    }

    pub fn orbit(&mut self, drag_delta: Vec2) {
        let yaw_step = -drag_delta.x * ROTATE_SPEED;
        let pitch_step = drag_delta.y * ROTATE_SPEED;

        self.yaw += yaw_step;
        self.pitch = (self.pitch + pitch_step).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw_velocity = yaw_step;
        self.pitch_velocity = pitch_step;
    }

    pub fn dolly(&mut self, scroll: f32) {
        self.distance = (self.distance * (1.0 - scroll * DOLLY_SPEED))
            .clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn pan(&mut self, drag_delta: Vec2) {
        if !self.pan_enabled {
            return;
        }

        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let scale = self.distance * PAN_SPEED;
        self.target += right * (-drag_delta.x * scale) + up * (drag_delta.y * scale);
    }

    /// Continues the last orbit gesture with decaying speed; returns whether
    /// the camera is still coasting and needs another frame.
    pub fn apply_inertia(&mut self, delta_seconds: f32) -> bool {
        let time_step_scale = (delta_seconds * 60.0).clamp(0.25, 3.0);
        let damping = INERTIA_DAMPING.powf(time_step_scale);

        self.yaw_velocity *= damping;
        self.pitch_velocity *= damping;
        if self.yaw_velocity.abs() < INERTIA_SLEEP && self.pitch_velocity.abs() < INERTIA_SLEEP {
            self.yaw_velocity = 0.0;
            self.pitch_velocity = 0.0;
            return false;
        }

        self.yaw += self.yaw_velocity * time_step_scale;
        self.pitch = (self.pitch + self.pitch_velocity * time_step_scale)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        true
    }

    pub fn halt_inertia(&mut self) {
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
    }

    pub fn eye(&self) -> Vec3 {
        let direction = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        );
        self.target + direction * self.distance
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let projection =
            Mat4::perspective_rh(FOV_Y_RADIANS, aspect.max(0.001), NEAR_PLANE, FAR_PLANE);
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        projection * view
    }
}

/// Projects a world point into screen space. Returns the screen position and
/// the view depth, or None when the point falls outside the clip volume.
pub(in crate::app) fn project_point(
    view_projection: &Mat4,
    rect: Rect,
    world: Vec3,
) -> Option<(Pos2, f32)> {
    let clip = *view_projection * world.extend(1.0);
    if clip.w <= 0.0001 {
        return None;
    }

    let ndc = clip.truncate() / clip.w;
    // perspective_rh maps the near..far range onto 0..1.
    if !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }

    let x = rect.left() + (ndc.x + 1.0) * 0.5 * rect.width();
    let y = rect.top() + (1.0 - (ndc.y + 1.0) * 0.5) * rect.height();
    Some((Pos2::new(x, y), clip.w))
}

/// Pixels per world unit at the given view depth.
pub(in crate::app) fn perspective_scale(rect: Rect, depth: f32) -> f32 {
    let focal = (rect.height() * 0.5) / (FOV_Y_RADIANS * 0.5).tan();
    focal / depth.max(NEAR_PLANE)
}

pub(in crate::app) struct PickRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Unprojects a pointer position into a world-space ray through the camera.
pub(in crate::app) fn pointer_ray(
    view_projection: &Mat4,
    rect: Rect,
    pointer: Pos2,
) -> Option<PickRay> {
    let ndc_x = ((pointer.x - rect.left()) / rect.width()) * 2.0 - 1.0;
    let ndc_y = 1.0 - ((pointer.y - rect.top()) / rect.height()) * 2.0;

    let inverse = view_projection.inverse();
    let near = inverse * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
    let far = inverse * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    if near.w.abs() <= f32::EPSILON || far.w.abs() <= f32::EPSILON {
        return None;
    }

    let origin = near.truncate() / near.w;
    let direction = ((far.truncate() / far.w) - origin).normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }

    Some(PickRay { origin, direction })
}

/// Nearest non-negative ray/sphere intersection distance.
pub(in crate::app) fn ray_sphere_distance(ray: &PickRay, center: Vec3, radius: f32) -> Option<f32> {
    let offset = ray.origin - center;
    let b = offset.dot(ray.direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt = discriminant.sqrt();
    let entry = -b - sqrt;
    if entry >= 0.0 {
        return Some(entry);
    }

    let exit = -b + sqrt;
    (exit >= 0.0).then_some(exit)
}

/// Closest sphere hit under the ray, if any.
pub(in crate::app) fn pick_node(
    ray: &PickRay,
    positions: &[Vec3],
    radii: &[f32],
) -> Option<(usize, f32)> {
    positions
        .iter()
        .zip(radii.iter())
        .enumerate()
        .filter_map(|(index, (&center, &radius))| {
            ray_sphere_distance(ray, center, radius).map(|distance| (index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), eframe::egui::vec2(800.0, 600.0))
    }

    #[test]
    fn camera_target_projects_to_viewport_center() {
        let camera = OrbitCamera::new();
        let rect = viewport();
        let view_projection = camera.view_projection(rect.aspect_ratio());

        let (screen, depth) = project_point(&view_projection, rect, camera.target)
            .expect("focus point is visible");

        assert!((screen.x - rect.center().x).abs() < 0.5);
        assert!((screen.y - rect.center().y).abs() < 0.5);
        assert!((depth - camera.distance).abs() < 0.5);
    }

    #[test]
    fn points_behind_the_camera_do_not_project() {
        let camera = OrbitCamera::new();
        let rect = viewport();
        let view_projection = camera.view_projection(rect.aspect_ratio());

        let behind = camera.eye() + (camera.eye() - camera.target);
        assert!(project_point(&view_projection, rect, behind).is_none());
    }

    #[test]
    fn center_ray_hits_sphere_at_focus() {
        let camera = OrbitCamera::new();
        let rect = viewport();
        let view_projection = camera.view_projection(rect.aspect_ratio());

        let ray = pointer_ray(&view_projection, rect, rect.center()).expect("ray exists");
        let hit = pick_node(&ray, &[camera.target], &[5.0]);

        let (index, distance) = hit.expect("center ray hits the focus sphere");
        assert_eq!(index, 0);
        assert!((distance - (camera.distance - 5.0)).abs() < 1.0);
    }

    #[test]
    fn corner_ray_misses_small_sphere() {
        let camera = OrbitCamera::new();
        let rect = viewport();
        let view_projection = camera.view_projection(rect.aspect_ratio());

        let ray = pointer_ray(&view_projection, rect, rect.left_top()).expect("ray exists");
        assert!(pick_node(&ray, &[camera.target], &[5.0]).is_none());
    }

    #[test]
    fn ray_from_inside_a_sphere_still_hits() {
        let ray = PickRay {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
        };
        let distance = ray_sphere_distance(&ray, Vec3::ZERO, 3.0).expect("exit hit");
        assert!((distance - 3.0).abs() < 0.001);
    }

    #[test]
    fn pick_prefers_the_nearest_sphere() {
        let ray = PickRay {
            origin: Vec3::new(0.0, 0.0, 100.0),
            direction: -Vec3::Z,
        };
        let positions = [Vec3::new(0.0, 0.0, 50.0), Vec3::new(0.0, 0.0, -20.0)];
        let radii = [4.0, 4.0];

        let (index, _) = pick_node(&ray, &positions, &radii).expect("hit");
        assert_eq!(index, 0);
    }

    #[test]
    fn pan_is_ignored_when_disabled() {
        let mut camera = OrbitCamera::new();
        camera.pan_enabled = false;
        let before = camera.target;

        camera.pan(eframe::egui::vec2(40.0, -25.0));
        assert_eq!(camera.target, before);
    }

    #[test]
    fn inertia_decays_to_rest() {
        let mut camera = OrbitCamera::new();
        camera.orbit(eframe::egui::vec2(30.0, 10.0));

        let mut frames = 0usize;
        while camera.apply_inertia(1.0 / 60.0) {
            frames += 1;
            assert!(frames < 1000, "inertia never settles");
        }
        assert!(frames > 0);
    }
}
