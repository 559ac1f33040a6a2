use super::*;

fn size(w: u32, h: u32) -> Size {
    Size::new(w, h).unwrap()
}

#[test]
fn ledger_counts_allocations_and_drops() {
    let factory = FrameFactory::new();
    let a = factory.filled(size(2, 2), [1, 2, 3, 255]);
    let b = factory.duplicate(&a);
    assert_eq!(factory.ledger().stats().live(), 2);

    drop(a);
    assert_eq!(factory.ledger().stats().live(), 1);
    drop(b);

    let stats = factory.ledger().stats();
    assert_eq!(stats.allocated, 2);
    assert_eq!(stats.released, 2);
    assert_eq!(stats.live(), 0);
}

#[test]
fn clones_of_a_factory_share_the_ledger() {
    let factory = FrameFactory::new();
    let other = factory.clone();
    let frame = other.filled(size(1, 1), [0, 0, 0, 255]);
    assert_eq!(factory.ledger().stats().live(), 1);
    drop(frame);
    assert_eq!(factory.ledger().stats().live(), 0);
}

#[test]
fn filled_writes_every_pixel() {
    let factory = FrameFactory::new();
    let f = factory.filled(size(3, 2), [9, 8, 7, 255]);
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(f.pixel(x, y), Some([9, 8, 7, 255]));
        }
    }
    assert_eq!(f.pixel(3, 0), None);
}

#[test]
fn from_premul_rejects_wrong_length() {
    let factory = FrameFactory::new();
    assert!(factory.from_premul(size(2, 2), vec![0; 15]).is_err());
    assert_eq!(factory.ledger().stats().allocated, 0);
    let ok = factory.from_premul(size(2, 2), vec![0; 16]).unwrap();
    assert_eq!(ok.size(), size(2, 2));
}
