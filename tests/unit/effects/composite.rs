use super::*;
use crate::foundation::core::{BLACK, Size, TRANSPARENT, WHITE};
use crate::render::frame::FrameFactory;

fn size(w: u32, h: u32) -> Size {
    Size::new(w, h).unwrap()
}

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_half_opacity_white_on_black_is_mid_gray() {
    let out = over(BLACK, WHITE, 0.5);
    assert_eq!(out[3], 255);
    assert!((127..=129).contains(&out[0]), "{out:?}");
}

#[test]
fn fill_region_only_touches_the_region() {
    let factory = FrameFactory::new();
    let mut f = factory.filled(size(4, 4), BLACK);
    fill_region(
        &mut f,
        Region {
            x: 1,
            y: 1,
            width: 2,
            height: 10,
        },
        WHITE,
    );
    assert_eq!(f.pixel(0, 0), Some(BLACK));
    assert_eq!(f.pixel(1, 1), Some(WHITE));
    assert_eq!(f.pixel(2, 3), Some(WHITE));
    assert_eq!(f.pixel(3, 3), Some(BLACK));
}

#[test]
fn draw_places_source_at_region_offset() {
    let factory = FrameFactory::new();
    let mut dst = factory.filled(size(4, 6), BLACK);
    let src = factory.filled(size(4, 2), WHITE);
    draw(
        &mut dst,
        &src,
        Region {
            x: 0,
            y: 2,
            width: 4,
            height: 2,
        },
        1.0,
    );
    assert_eq!(dst.pixel(0, 1), Some(BLACK));
    assert_eq!(dst.pixel(0, 2), Some(WHITE));
    assert_eq!(dst.pixel(3, 3), Some(WHITE));
    assert_eq!(dst.pixel(3, 4), Some(BLACK));
}

#[test]
fn draw_scales_with_nearest_neighbour() {
    let factory = FrameFactory::new();
    let mut src = factory.filled(size(2, 1), BLACK);
    src.data_mut()[4..8].copy_from_slice(&WHITE);
    let mut dst = factory.filled(size(4, 2), TRANSPARENT);
    let full = Region::full(dst.size());
    draw(&mut dst, &src, full, 1.0);
    assert_eq!(dst.pixel(0, 0), Some(BLACK));
    assert_eq!(dst.pixel(1, 1), Some(BLACK));
    assert_eq!(dst.pixel(2, 0), Some(WHITE));
    assert_eq!(dst.pixel(3, 1), Some(WHITE));
}

#[test]
fn draw_transparent_source_keeps_destination() {
    let factory = FrameFactory::new();
    let mut dst = factory.filled(size(2, 2), [10, 20, 30, 255]);
    let src = factory.filled(size(2, 2), TRANSPARENT);
    let full = Region::full(dst.size());
    draw(&mut dst, &src, full, 1.0);
    assert_eq!(dst.pixel(1, 1), Some([10, 20, 30, 255]));
}

#[test]
fn draw_outside_destination_is_ignored() {
    let factory = FrameFactory::new();
    let mut dst = factory.filled(size(2, 2), BLACK);
    let src = factory.filled(size(1, 1), WHITE);
    draw(
        &mut dst,
        &src,
        Region {
            x: 5,
            y: 5,
            width: 1,
            height: 1,
        },
        1.0,
    );
    assert!(dst.data().chunks_exact(4).all(|px| px == BLACK));
}
