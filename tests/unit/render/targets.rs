use super::*;
use crate::foundation::core::{PixelPos, Rgb8, Rgba8};

#[test]
fn split_never_aliases_display() {
    let mut t = RenderTargetPair::new(Canvas::new(2, 2));
    let px = Rgba8::opaque(Rgb8::new(1, 2, 3));
    {
        let (_display, back) = t.split();
        back.set(PixelPos::new(0, 0), px);
    }
    assert_eq!(t.display().get(PixelPos::new(0, 0)), Some(Rgba8::TRANSPARENT));
    t.swap();
    assert_eq!(t.display().get(PixelPos::new(0, 0)), Some(px));
    assert_eq!(t.display_index(), 1);
    assert_eq!(t.swap_count(), 1);
}

#[test]
fn resize_carries_display_content() {
    let mut t = RenderTargetPair::new(Canvas::new(4, 4));
    let px = Rgba8::opaque(Rgb8::new(9, 9, 9));
    t.display_mut().set(PixelPos::new(1, 1), px);
    t.display_mut().set(PixelPos::new(3, 3), px);

    assert!(t.resize(Canvas::new(2, 6)));
    assert_eq!(t.canvas(), Canvas::new(2, 6));
    assert_eq!(t.display().get(PixelPos::new(1, 1)), Some(px));
    assert_eq!(t.display().count_opaque(), 1);

    let (display, back) = t.split();
    assert_eq!(display.canvas(), back.canvas());
    assert_eq!(back.count_opaque(), 0);
}

#[test]
fn resize_to_same_size_is_noop() {
    let mut t = RenderTargetPair::new(Canvas::new(4, 4));
    assert!(!t.resize(Canvas::new(4, 4)));
    assert_eq!(t.swap_count(), 0);
}
