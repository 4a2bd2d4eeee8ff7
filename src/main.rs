//! Garden Designer: place, move and remove garden items on a bounded plot.
//!
//! Runs a winit window hosting the editor over a headless scene mirror.
//! Pass a JSON config path as the first argument (or set `GARDEN_CONFIG`).

fn main() {
    garden_designer::app::run();
}
