use rand::Rng;

use crate::random::SeededRandom;

const PREFIXES: [&str; 8] = ["North", "South", "East", "West", "New", "Old", "Great", "High"];
const ROOTS: [&str; 12] = [
    "Aria", "Thal", "Dor", "Kal", "Mer", "Val", "Tor", "Lan", "Fel", "Bor", "Eth", "Mor",
];
const SUFFIXES: [&str; 10] = ["ia", "and", "or", "en", "is", "os", "um", "ar", "ia", "land"];

/// Название государства из слогов: корень + окончание, иногда с приставкой ("Great Thalor").
pub fn state_name(rng: &mut SeededRandom) -> String {
    let use_prefix = rng.gen_bool(0.3);
    let root = ROOTS[rng.gen_range(0..ROOTS.len())];
    let suffix = SUFFIXES[rng.gen_range(0..SUFFIXES.len())];

    if use_prefix {
        let prefix = PREFIXES[rng.gen_range(0..PREFIXES.len())];
        format!("{prefix} {root}{suffix}")
    } else {
        format!("{root}{suffix}")
    }
}

/// Различимый цвет государства: оттенки разнесены золотым углом, насыщенность и светлота
/// немного варьируются. Результат в формате `#rrggbb`.
pub fn state_color(id: usize, rng: &mut SeededRandom) -> String {
    let hue = (id as f64 * 137.5 + rng.gen_range(0.0..30.0)) % 360.0;
    let saturation = 50.0 + rng.gen_range(0.0..20.0);
    let lightness = 55.0 + rng.gen_range(0.0..15.0);
    let [r, g, b] = hsl_to_rgb(hue, saturation / 100.0, lightness / 100.0);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// HSL (оттенок в градусах, насыщенность и светлота в `[0, 1]`) в RGB.
#[must_use]
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [u8; 3] {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}
