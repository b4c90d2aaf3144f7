mod build;
mod interaction;
mod view2d;
mod view3d;
