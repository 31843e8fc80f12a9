use backdrop_core::{pack_rgba8, CaptureError, CubeFace, EnvironmentMap, EquirectImage};
use glam::Vec3;
use image::codecs::hdr::HdrEncoder;
use image::Rgb;

/// Panorama whose upper half (sky) is bright and lower half dark.
fn sky_ground(width: u32, height: u32) -> EquirectImage {
    let texels = (0..height)
        .flat_map(|y| {
            let v = if y < height / 2 { Vec3::splat(8.0) } else { Vec3::splat(0.05) };
            std::iter::repeat(v).take(width as usize)
        })
        .collect();
    EquirectImage::new(width, height, texels).expect("valid panorama")
}

fn encode_hdr(width: usize, height: usize, color: [f32; 3]) -> Vec<u8> {
    let pixels = vec![Rgb(color); width * height];
    let mut bytes = Vec::new();
    HdrEncoder::new(&mut bytes)
        .encode(&pixels, width, height)
        .expect("encode hdr");
    bytes
}

#[test]
fn locate_inverts_direction() {
    for face in CubeFace::ALL {
        for (u, v) in [(0.5, 0.5), (0.1, 0.2), (0.8, 0.3), (0.25, 0.9)] {
            let dir = face.direction(u, v);
            let (f, lu, lv) = CubeFace::locate(dir);
            assert_eq!(f, face);
            assert!((lu - u).abs() < 1e-4 && (lv - v).abs() < 1e-4, "{face:?} {u} {v}");
        }
    }
}

#[test]
fn face_bases_are_orthonormal() {
    for face in CubeFace::ALL {
        let (centre, s_axis, t_axis) = face.basis();
        for axis in [centre, s_axis, t_axis] {
            assert!((axis.length() - 1.0).abs() < 1e-6, "{face:?}");
        }
        assert_eq!(centre.dot(s_axis), 0.0, "{face:?}");
        assert_eq!(centre.dot(t_axis), 0.0, "{face:?}");
        assert_eq!(s_axis.dot(t_axis), 0.0, "{face:?}");
    }
}

#[test]
fn face_centres_look_down_their_axes() {
    let axes = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
    for (face, axis) in CubeFace::ALL.into_iter().zip(axes) {
        assert!(face.direction(0.5, 0.5).distance(axis) < 1e-6, "{face:?}");
    }
}

#[test]
fn uniform_panorama_gives_uniform_map() {
    let panorama = EquirectImage::new(16, 8, vec![Vec3::new(2.0, 1.0, 0.5); 128]).expect("valid");
    let map = EnvironmentMap::from_equirect(&panorama, 8);
    assert_eq!(map.face_size(), 8);
    for face in CubeFace::ALL {
        assert!(map
            .face(face)
            .iter()
            .all(|c| c.distance(Vec3::new(2.0, 1.0, 0.5)) < 1e-5));
    }
    assert!(map.sample(Vec3::new(0.3, -0.7, 0.2)).distance(Vec3::new(2.0, 1.0, 0.5)) < 1e-5);
}

#[test]
fn sky_lands_on_the_up_face() {
    let map = EnvironmentMap::from_equirect(&sky_ground(64, 32), 16);
    assert!(map.sample(Vec3::Y).x > 4.0);
    assert!(map.sample(-Vec3::Y).x < 0.1);
    let up = map.face(CubeFace::PosY);
    let down = map.face(CubeFace::NegY);
    assert!(up.iter().all(|c| c.x > 4.0));
    assert!(down.iter().all(|c| c.x < 0.1));
    // Side faces: top rows are sky, bottom rows ground.
    let side = map.face(CubeFace::PosZ);
    assert!(side[0].x > 4.0);
    assert!(side[side.len() - 1].x < 0.1);
}

#[test]
fn degenerate_directions_sample_black() {
    let map = EnvironmentMap::from_equirect(&sky_ground(8, 4), 2);
    assert_eq!(map.sample(Vec3::ZERO), Vec3::ZERO);
    assert_eq!(map.sample(Vec3::new(f32::NAN, 0.0, 1.0)), Vec3::ZERO);
}

#[test]
fn cube_faces_pack_compressed_hdr() {
    let panorama = EquirectImage::new(4, 2, vec![Vec3::new(0.25, 0.0, 3.0); 8]).expect("valid");
    let map = EnvironmentMap::from_equirect(&panorama, 2);
    let bytes = pack_rgba8(map.face(CubeFace::NegZ));
    assert_eq!(bytes.len(), 2 * 2 * 4);
    // 0.25 / 1.25 = 0.2 and 3 / 4 = 0.75
    assert_eq!(&bytes[..4], &[51, 0, 191, 255]);
}

#[test]
fn panorama_packs_for_gpu_projection() {
    let mut texels = vec![Vec3::splat(1.0); 8];
    texels[7] = Vec3::new(-2.0, 0.0, f32::MAX);
    let panorama = EquirectImage::new(4, 2, texels).expect("valid");
    let bytes = panorama.rgba8();
    assert_eq!(bytes.len(), 4 * 2 * 4);
    assert_eq!(&bytes[..4], &[128, 128, 128, 255]);
    // Negative light clamps to black; huge values saturate.
    assert_eq!(&bytes[28..], &[0, 0, 255, 255]);
}

#[test]
fn decodes_radiance_hdr() {
    let bytes = encode_hdr(8, 4, [0.5, 1.0, 2.0]);
    let image = EquirectImage::decode_hdr(&bytes).expect("decode");
    assert_eq!((image.width, image.height), (8, 4));
    assert_eq!(image.texels.len(), 32);
    let c = image.texels[5];
    assert!((c.x - 0.5).abs() < 0.02 && (c.y - 1.0).abs() < 0.02 && (c.z - 2.0).abs() < 0.04);
}

#[test]
fn rejects_garbage_and_empty_images() {
    assert!(matches!(
        EquirectImage::decode_hdr(b"definitely not radiance"),
        Err(CaptureError::Decode(_))
    ));
    assert_eq!(
        EquirectImage::new(0, 4, Vec::new()).err(),
        Some(CaptureError::EmptyImage)
    );
    assert_eq!(
        EquirectImage::new(2, 2, vec![Vec3::ZERO; 3]).err(),
        Some(CaptureError::EmptyImage)
    );
}
