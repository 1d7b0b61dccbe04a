const HASH_X: i32 = 374_761_393;
const HASH_Y: i32 = 668_265_263;
const HASH_MIX: i32 = 1_274_126_177;

/// Deterministic per-cell noise in `[0, 1)`.
///
/// Integer hash of `(x + 1, y + 1)` folded twice xorshift-style. Negative inputs are valid;
/// jitter generators call this with coordinate offsets to decorrelate axes.
///
/// The final fold uses an arithmetic shift, which always clears bit 31, so values actually fall
/// in `[0, 0.5)`. A dissolve keyed on this threshold has revealed every cell by progress 0.5.
pub fn hash01(x: i64, y: i64) -> f64 {
    let xi = (x as i32).wrapping_add(1);
    let yi = (y as i32).wrapping_add(1);
    let seed = xi.wrapping_mul(HASH_X).wrapping_add(yi.wrapping_mul(HASH_Y));
    let mangled = (seed ^ (seed >> 13)).wrapping_mul(HASH_MIX);
    let folded = (mangled ^ (mangled >> 16)) as u32;
    f64::from(folded) / 4_294_967_296.0
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
