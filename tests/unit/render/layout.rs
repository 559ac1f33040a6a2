use super::*;

fn installation() -> ScreenLayout {
    ScreenLayout::new(
        Size::new(3840, 2160).unwrap(),
        Size::new(3840, 1280).unwrap(),
        40,
    )
    .unwrap()
}

#[test]
fn working_band_is_vertically_centered() {
    let layout = installation();
    assert_eq!(
        layout.working_region(),
        Region {
            x: 0,
            y: 440,
            width: 3840,
            height: 1280
        }
    );
}

#[test]
fn white_panel_leaves_bars_top_and_bottom() {
    let layout = installation();
    assert_eq!(
        layout.white_panel(),
        Region {
            x: 0,
            y: 40,
            width: 3840,
            height: 1200
        }
    );
}

#[test]
fn rejects_oversized_working_area_and_bars() {
    let out = Size::new(100, 100).unwrap();
    assert!(ScreenLayout::new(out, Size::new(100, 101).unwrap(), 0).is_err());
    assert!(ScreenLayout::new(out, Size::new(100, 50).unwrap(), 25).is_err());
    assert!(ScreenLayout::new(out, Size::new(100, 50).unwrap(), 24).is_ok());
}
