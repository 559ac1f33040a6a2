use crate::animation::ease::Ease;
use crate::effects::composite::draw;
use crate::foundation::core::Region;
use crate::foundation::math::unit_to_alpha_u8;
use crate::render::frame::{Frame, FrameFactory};

/// Positions of the `count` interior frames between two source frames: `(i + 1) / (count + 1)`.
///
/// Every value lies strictly inside `(0, 1)`, so neither endpoint is ever synthesized.
pub fn interpolation_alphas(count: usize) -> Vec<f64> {
    let denom = (count + 1) as f64;
    (0..count).map(|i| (i + 1) as f64 / denom).collect()
}

/// Synthesize the frame at position `alpha` between `a` and `b`.
///
/// `a` is copied at full opacity and `b` is drawn over it at the ease-in-out weight of `alpha`.
/// The result has `a`'s size and belongs to the caller.
pub fn interpolate(factory: &FrameFactory, a: &Frame, b: &Frame, alpha: f64) -> Frame {
    let mut out = factory.duplicate(a);
    let weight = unit_to_alpha_u8(Ease::InOutQuad.apply(alpha));
    let full = Region::full(out.size());
    draw(&mut out, b, full, f32::from(weight) / 255.0);
    out
}

/// Build the full interior set between `a` and `b`, in display order.
pub fn interpolate_between(
    factory: &FrameFactory,
    a: &Frame,
    b: &Frame,
    count: usize,
) -> Vec<Frame> {
    interpolation_alphas(count)
        .into_iter()
        .map(|alpha| interpolate(factory, a, b, alpha))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/interpolate.rs"]
mod tests;
