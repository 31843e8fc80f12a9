use backdrop_core::{assess, is_mobile_user_agent, DeviceInfo, EnvironmentAsset, PerformanceTier};

const DESKTOP_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko)";
const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

#[test]
fn two_cores_without_memory_api_is_low_end() {
    let tier = assess(&DeviceInfo {
        logical_cores: Some(2),
        device_memory_gb: None,
        user_agent: DESKTOP_UA.to_string(),
    });
    assert!(tier.is_low_end);
    assert!(!tier.is_mobile);
    assert_eq!(tier.max_pixel_ratio, 0.5);
    assert!(!tier.post_processing_enabled);
}

#[test]
fn low_memory_alone_is_low_end() {
    let tier = assess(&DeviceInfo {
        logical_cores: Some(16),
        device_memory_gb: Some(4.0),
        user_agent: DESKTOP_UA.to_string(),
    });
    assert!(tier.is_low_end);
}

#[test]
fn missing_signals_are_not_low_end() {
    let tier = assess(&DeviceInfo::default());
    assert!(!tier.is_low_end);
    assert!(!tier.is_mobile);
    assert_eq!(tier.max_pixel_ratio, 1.0);
    assert!(tier.post_processing_enabled);
}

#[test]
fn capable_desktop() {
    let tier = assess(&DeviceInfo {
        logical_cores: Some(12),
        device_memory_gb: Some(8.0),
        user_agent: DESKTOP_UA.to_string(),
    });
    assert_eq!(tier, PerformanceTier::DESKTOP);
    assert_eq!(tier.quality(), 1.0);
    assert_eq!(tier.environment_asset(), Some(EnvironmentAsset::Full));
    assert!(tier.chromatic_aberration_enabled());
}

#[test]
fn capable_phone_gets_mobile_ratio_and_small_asset() {
    let tier = assess(&DeviceInfo {
        logical_cores: Some(6),
        device_memory_gb: None,
        user_agent: IPHONE_UA.to_string(),
    });
    assert!(tier.is_mobile);
    assert!(!tier.is_low_end);
    assert_eq!(tier.max_pixel_ratio, 0.75);
    assert!(tier.post_processing_enabled);
    assert!(!tier.chromatic_aberration_enabled());
    assert_eq!(tier.environment_asset(), Some(EnvironmentAsset::Small));
}

#[test]
fn low_end_wins_over_mobile() {
    let tier = assess(&DeviceInfo {
        logical_cores: Some(4),
        device_memory_gb: Some(2.0),
        user_agent: IPHONE_UA.to_string(),
    });
    assert!(tier.is_low_end && tier.is_mobile);
    assert_eq!(tier.max_pixel_ratio, 0.5);
    assert_eq!(tier.quality(), 0.0);
    assert_eq!(tier.environment_asset(), None);
}

#[test]
fn mobile_patterns_are_case_insensitive() {
    assert!(is_mobile_user_agent("Mozilla/5.0 (Linux; ANDROID 14; Pixel 8)"));
    assert!(is_mobile_user_agent("Opera Mini/8.0"));
    assert!(!is_mobile_user_agent(DESKTOP_UA));
    assert!(!is_mobile_user_agent(""));
}

#[test]
fn effective_pixel_ratio_applies_both_caps() {
    let desktop = PerformanceTier::DESKTOP;
    assert_eq!(desktop.effective_pixel_ratio(2.0), 0.8);
    assert_eq!(desktop.effective_pixel_ratio(0.5), 0.5);
    assert_eq!(desktop.effective_pixel_ratio(f32::NAN), 0.8);

    let low = assess(&DeviceInfo {
        logical_cores: Some(2),
        ..Default::default()
    });
    assert_eq!(low.effective_pixel_ratio(3.0), 0.4);
}
