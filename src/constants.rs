// Browser-facing tuning for the backdrop front-end.
//
// Field, marching and driver constants live in `backdrop_core::constants`;
// this file only carries what the page wiring and the GPU passes need.

// ---------------- DOM ----------------
pub const MOUNT_ELEMENT_ID: &str = "hero-backdrop"; // positioned behind the hero text
pub const CANVAS_ELEMENT_ID: &str = "hero-backdrop-canvas"; // child of the mount element
pub const THEME_DARK_CLASS: &str = "dark"; // class on <html> toggled by the page theme switch
pub const THEME_ATTRIBUTE: &str = "class";
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
pub const VARIANT_DATA_ATTRIBUTE: &str = "data-variant"; // optional override on the mount element

// ---------------- Observers ----------------
pub const VISIBILITY_THRESHOLD: f64 = 0.1; // fraction of the mount that must be on screen
pub const VISIBILITY_ROOT_MARGIN: &str = "0px";

// ---------------- Pointer ----------------
pub const POINTER_THROTTLE_MS: f64 = 40.0; // at most 25 raw samples per second

// ---------------- Post-processing ----------------
pub const BLOOM_THRESHOLD: f32 = 0.65; // luminance where the bright pass starts
pub const BLOOM_STRENGTH: f32 = 0.55;
pub const BLOOM_STRENGTH_MOBILE: f32 = 0.4;
pub const CHROMATIC_OFFSET: f32 = 0.0025; // uv offset at the screen corners

// ---------------- Environment ----------------
pub const ENV_PLACEHOLDER_TEXEL: [u8; 4] = [0, 0, 0, 255]; // 1x1 cube bound until capture lands

// ---------------- Surface ----------------
pub const FRAME_LATENCY: u32 = 2;
