// Host-side tests for the front-end constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
#[path = "../src/constants.rs"]
mod constants;

use constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn constants_are_within_reasonable_bounds() {
    // 20-30 pointer updates per second
    assert!((1000.0 / POINTER_THROTTLE_MS) >= 20.0);
    assert!((1000.0 / POINTER_THROTTLE_MS) <= 30.0);

    assert!(VISIBILITY_THRESHOLD > 0.0 && VISIBILITY_THRESHOLD < 0.5);
    assert!(BLOOM_THRESHOLD > 0.0 && BLOOM_THRESHOLD < 1.0);
    assert!(BLOOM_STRENGTH_MOBILE > 0.0 && BLOOM_STRENGTH_MOBILE <= BLOOM_STRENGTH);
    assert!(CHROMATIC_OFFSET > 0.0 && CHROMATIC_OFFSET < 0.01);
    assert!(FRAME_LATENCY >= 1);
}

#[test]
fn web_and_core_agree_on_shared_tuning() {
    assert_eq!(POINTER_THROTTLE_MS, backdrop_core::constants::POINTER_THROTTLE_MS);
    assert_eq!(VISIBILITY_THRESHOLD as f32, backdrop_core::VISIBILITY_THRESHOLD);
}

#[test]
fn dom_ids_are_distinct_and_query_targets_reduce() {
    assert_ne!(MOUNT_ELEMENT_ID, CANVAS_ELEMENT_ID);
    assert!(CANVAS_ELEMENT_ID.starts_with(MOUNT_ELEMENT_ID));
    assert!(REDUCED_MOTION_QUERY.contains("prefers-reduced-motion"));
    assert!(REDUCED_MOTION_QUERY.contains("reduce"));
    assert!(VARIANT_DATA_ATTRIBUTE.starts_with("data-"));
}

#[test]
fn placeholder_texel_is_opaque_black() {
    assert_eq!(ENV_PLACEHOLDER_TEXEL, [0, 0, 0, 255]);
}
