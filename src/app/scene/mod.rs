mod camera;
mod layout;

pub(in crate::app) use camera::{
    perspective_scale, pick_node, pointer_ray, project_point, OrbitCamera, PickRay,
};
pub(in crate::app) use layout::{relax_once, scatter_cube, scatter_sphere, CUBE_EXTENT, SPHERE_RADIUS};
