use super::*;

fn write_png(dir: &Path, name: &str, w: u32, h: u32, rgba: [u8; 4]) -> std::path::PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(w, h, image::Rgba(rgba))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn wide_image_is_letterboxed_with_opaque_bars() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "wide.png", 40, 10, [200, 10, 10, 255]);
    let loader = ImageFileLoader::new(FrameFactory::new());

    let frame = loader
        .load(&path, Fit::letterbox(Size::new(20, 20).unwrap()))
        .unwrap();
    assert_eq!(frame.size(), Size::new(20, 20).unwrap());
    // 40x10 fits as 20x5 at y=7.
    assert_eq!(frame.pixel(10, 0), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(10, 19), Some([0, 0, 0, 255]));
    let center = frame.pixel(10, 9).unwrap();
    assert_eq!(center[3], 255);
    assert!(center[0] > 150, "{center:?}");
}

#[test]
fn overlay_keeps_alpha_and_pads_transparent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "overlay.png", 10, 40, [255, 255, 255, 128]);
    let loader = ImageFileLoader::new(FrameFactory::new());

    let frame = loader
        .load(&path, Fit::overlay(Size::new(20, 20).unwrap()))
        .unwrap();
    assert_eq!(frame.pixel(0, 10), Some([0, 0, 0, 0]));
    let center = frame.pixel(10, 10).unwrap();
    assert!((127..=129).contains(&center[3]), "{center:?}");
    // Premultiplied: color never exceeds alpha.
    assert!(center[0] <= center[3]);
}

#[test]
fn opaque_fit_discards_source_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "half.png", 8, 8, [255, 0, 0, 0]);
    let loader = ImageFileLoader::new(FrameFactory::new());
    let frame = loader
        .load(&path, Fit::letterbox(Size::new(8, 8).unwrap()))
        .unwrap();
    assert_eq!(frame.pixel(4, 4), Some([255, 0, 0, 255]));
}

#[test]
fn stretch_fills_target_without_bars() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "wide.png", 40, 10, [0, 200, 0, 255]);
    let loader = ImageFileLoader::new(FrameFactory::new());
    let fit = Fit {
        size: Size::new(20, 20).unwrap(),
        keep_aspect: false,
        padding: Padding::Opaque,
    };
    let frame = loader.load(&path, fit).unwrap();
    assert!(frame.pixel(10, 0).unwrap()[1] > 150);
}

#[test]
fn missing_and_corrupt_files_yield_none() {
    let dir = tempfile::tempdir().unwrap();
    let factory = FrameFactory::new();
    let loader = ImageFileLoader::new(factory.clone());
    let fit = Fit::letterbox(Size::new(4, 4).unwrap());

    assert!(loader.load(&dir.path().join("000000001.jpg"), fit).is_none());

    let corrupt = dir.path().join("000000002.jpg");
    std::fs::write(&corrupt, b"not an image").unwrap();
    assert!(loader.load(&corrupt, fit).is_none());
    assert!(loader.decode_fitted(&corrupt, fit).is_err());
    assert_eq!(factory.ledger().stats().allocated, 0);
}
