/// Build script for FlightHeading
///
/// # Shader Strategy:
/// - WGSL shaders are read from `res/shaders` at runtime and reflected with naga,
///   so they are not embedded; rebuild is only triggered to keep `cargo run`
///   in sync with edited sources during development.
fn main() {
    println!("cargo:rerun-if-changed=res/shaders/DrawRect.vert");
    println!("cargo:rerun-if-changed=res/shaders/DrawRect.frag");
}
