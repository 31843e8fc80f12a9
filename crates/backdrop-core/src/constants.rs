// Shared tuning constants for the backdrop fields, renderers and driver.
//
// These are presentation parameters; the invariants the code relies on are
// stated next to the values that carry them.

// ---------------- Metaball field ----------------
pub const METABALL_COUNT: usize = 5;
pub const METABALL_TIME_SCALE: f32 = 0.6; // field time runs slower than wall clock
pub const METABALL_EPSILON: f32 = 0.1; // keeps r / (d + eps) finite at the centre
pub const METABALL_THRESHOLD: f32 = 1.5; // surface where threshold / value - offset == 0
pub const METABALL_OFFSET: f32 = 0.6;

// ---------------- Ray marching ----------------
pub const MAX_DIST: f32 = 50.0;
pub const MARCH_STEPS_MIN: u32 = 24;
pub const MARCH_STEPS_MAX: u32 = 64;
pub const SURF_DIST_LOOSE: f32 = 0.04; // quality 0
pub const SURF_DIST_TIGHT: f32 = 0.01; // quality 1
pub const NORMAL_EPS_LOOSE: f32 = 0.004;
pub const NORMAL_EPS_TIGHT: f32 = 0.001;
// The metaball distance estimate is not Lipschitz-1 near small balls, so steps
// are scaled down and halved again whenever the sign of the estimate flips.
pub const MARCH_STEP_SCALE: f32 = 0.6;
pub const FOCAL_LENGTH: f32 = 1.0;
pub const VIEW_SHIFT_X: f32 = 0.25; // moves the blobs right of the hero text
pub const GLASS_IOR: f32 = 1.5;
pub const FLOW_WEIGHT: f32 = 0.3;
pub const RIM_STRENGTH: f32 = 0.4;
pub const GLOW_FALLOFF: f32 = 0.2;
pub const GLOW_STRENGTH: f32 = 0.5;

// ---------------- Morph field ----------------
pub const MORPH_GRID_SIZE: usize = 40; // cells per side, (n + 1)^2 vertices
pub const MORPH_GRID_SPACING: f32 = 0.06;
pub const MORPH_CYCLE_SEC: f32 = 30.0;
pub const KNOT_P: f32 = 2.0;
pub const KNOT_Q: f32 = 3.0;
pub const KNOT_RADIUS: f32 = 0.8;
pub const KNOT_TUBE: f32 = 0.35;
pub const HELIX_RADIUS: f32 = 0.5;
pub const HELIX_HEIGHT: f32 = 2.5;
pub const HELIX_TURNS: f32 = 3.0;
pub const TERRAIN_AMPLITUDE: f32 = 0.25;
pub const KNOT_NOISE_AMPLITUDE: f32 = 0.08; // relative to the knot radius vector
pub const HELIX_PULSE_AMPLITUDE: f32 = 0.05;
pub const FLOATING_ELEMENT_COUNT: usize = 25;
pub const FLOATING_SEED: u64 = 0x5EED_F10A;

// ---------------- Gradient field ----------------
pub const BLOB_COUNT: usize = 4;
pub const GRADIENT_SPEED: f32 = 0.3;
pub const GRADIENT_NOISE_SCALE: f32 = 3.0;
pub const GRADIENT_POINTER_GAIN: f32 = 0.05;
pub const GRADIENT_DISTORTION: f32 = 0.08;
pub const GRADIENT_GRAIN: f32 = 0.01;
pub const GRADIENT_ALPHA_RAMP: f32 = 0.25;
pub const GRADIENT_WEIGHT_FLOOR: f32 = 0.001;

// ---------------- Driver ----------------
pub const STALL_THRESHOLD_SEC: f32 = 0.1;
pub const POINTER_LERP_DEFAULT: f32 = 0.1;
pub const POINTER_LERP_LOW_END: f32 = 0.05;
pub const POINTER_THROTTLE_MS: f64 = 40.0; // 25 updates per second

// ---------------- Camera ----------------
pub const RAYMARCH_CAMERA_Z: f32 = 5.0;
pub const RAYMARCH_FOV_DEG: f32 = 65.0;
pub const MORPH_CAMERA_Z: f32 = 4.0;
pub const MORPH_FOV_DEG: f32 = 50.0;
