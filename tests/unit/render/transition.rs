use super::*;
use crate::foundation::core::{Canvas, PixelPos};

fn red() -> Rgba8 {
    Rgba8::opaque(Rgb8::new(200, 10, 10))
}

fn params(fill: f64, dissolve: f64) -> TransitionParams {
    TransitionParams {
        fill_probability: fill,
        dissolve_probability: dissolve,
        color_variability: 10.0,
    }
}

#[test]
fn opaque_pixels_never_regress_when_painting() {
    let n = [Rgba8::TRANSPARENT; 8];
    for seed in 0..64 {
        assert_eq!(paint_pixel(red(), &n, seed, 1, 1, &params(1.0, 0.0)), red());
    }
}

#[test]
fn isolated_transparent_pixel_stays_transparent() {
    let n = [Rgba8::TRANSPARENT; 8];
    for seed in 0..64 {
        let out = paint_pixel(Rgba8::TRANSPARENT, &n, seed, 3, 4, &params(1.0, 0.0));
        assert_eq!(out, Rgba8::TRANSPARENT);
    }
}

#[test]
fn certain_fill_copies_neighbor_within_band() {
    let mut n = [Rgba8::TRANSPARENT; 8];
    n[4] = red();
    for seed in 0..64 {
        let out = paint_pixel(Rgba8::TRANSPARENT, &n, seed, 3, 4, &params(1.0, 0.0));
        assert!(out.is_opaque());
        assert!((i16::from(out.r) - 200).abs() <= 5);
        assert!(out.g <= 15);
        assert!(out.b <= 15);
    }
}

#[test]
fn zero_probabilities_are_fixed_points() {
    let mut n = [Rgba8::TRANSPARENT; 8];
    n[0] = red();
    for seed in 0..64 {
        let p = params(0.0, 0.0);
        assert_eq!(paint_pixel(Rgba8::TRANSPARENT, &n, seed, 0, 0, &p), Rgba8::TRANSPARENT);
        assert_eq!(dissolve_pixel(red(), seed, 0, 0, &p), red());
    }
}

#[test]
fn dissolved_pixels_are_fully_zero_and_never_return() {
    let p = params(0.0, 1.0);
    assert_eq!(dissolve_pixel(red(), 5, 0, 0, &p), Rgba8::TRANSPARENT);
    let partial = Rgba8::from_bytes([0, 0, 0, 1]);
    assert_eq!(dissolve_pixel(partial, 5, 0, 0, &p), Rgba8::TRANSPARENT);
    for seed in 0..64 {
        assert_eq!(
            dissolve_pixel(Rgba8::TRANSPARENT, seed, 0, 0, &params(0.0, 0.0)),
            Rgba8::TRANSPARENT
        );
    }
}

#[test]
fn apply_transition_spreads_one_ring_at_certain_fill() {
    let c = Canvas::new(5, 5);
    let mut src = PixelBuffer::new(c);
    src.set(PixelPos::new(2, 2), red());
    let mut dst = PixelBuffer::new(c);

    apply_transition(&src, &mut dst, Direction::Paint, 11, &params(1.0, 0.0));
    assert_eq!(dst.count_opaque(), 9);
    assert_eq!(dst.get(PixelPos::new(0, 0)), Some(Rgba8::TRANSPARENT));
    assert_eq!(dst.get(PixelPos::new(2, 2)), Some(red()));
}

#[test]
fn apply_transition_is_deterministic_per_seed() {
    let c = Canvas::new(16, 9);
    let mut src = PixelBuffer::new(c);
    src.set(PixelPos::new(8, 4), red());
    let mut a = PixelBuffer::new(c);
    let mut b = PixelBuffer::new(c);
    apply_transition(&src, &mut a, Direction::Paint, 99, &params(0.5, 0.0));
    apply_transition(&src, &mut b, Direction::Paint, 99, &params(0.5, 0.0));
    assert_eq!(a, b);
}

#[test]
fn params_validation_rejects_out_of_range() {
    assert!(TransitionParams::default().validate().is_ok());
    assert!(params(1.5, 0.0).validate().is_err());
    assert!(params(0.1, f64::NAN).validate().is_err());
    let mut p = TransitionParams::default();
    p.color_variability = -1.0;
    assert!(p.validate().is_err());
}
