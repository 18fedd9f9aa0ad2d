pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator` rounded to 2 decimals, undefined on a zero denominator.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then(|| round2(value))
}

/// Share of `part` in `whole` as a percentage; an empty whole reads as 0%.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

/// Cricket over notation: 7 legal balls is "1.1", not 1.1667.
pub fn balls_to_overs(balls: u32) -> f64 {
    (balls / 6) as f64 + (balls % 6) as f64 / 10.0
}
