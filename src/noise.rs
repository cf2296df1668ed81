//! Когерентный 2D-шум для рельефа и климата
//!
//! Конкретный алгоритм скрыт за трейтом [`Noise2D`]: стадиям нужен только гладкий,
//! воспроизводимый по сиду сигнал примерно в диапазоне `[-1, 1]`.

use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::random::SeededRandom;

/// Источник гладкого двумерного шума.
pub trait Noise2D {
    fn noise2d(&self, x: f64, y: f64) -> f64;
}

/// OpenSimplex2 с единичной частотой: масштаб задаётся координатами вызывающего кода.
pub struct SimplexNoise {
    inner: FastNoiseLite,
}

impl SimplexNoise {
    #[must_use]
    pub fn new(seed: i32) -> Self {
        let mut inner = FastNoiseLite::new();
        inner.set_seed(Some(seed));
        inner.set_noise_type(Some(NoiseType::OpenSimplex2));
        inner.set_frequency(Some(1.0));
        Self { inner }
    }

    /// Забирает ровно одно значение из потока, чтобы получить сид шума.
    #[must_use]
    pub fn from_rng(rng: &mut SeededRandom) -> Self {
        Self::new(rand::RngCore::next_u32(rng) as i32)
    }
}

impl Noise2D for SimplexNoise {
    fn noise2d(&self, x: f64, y: f64) -> f64 {
        f64::from(self.inner.get_noise_2d(x as f32, y as f32))
    }
}

/// Одна октава: частота, амплитуда и индекс поля шума в наборе.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Octave {
    pub frequency: f64,
    pub amplitude: f64,
    pub field: usize,
}

/// Взвешенная сумма октав по нескольким полям шума.
pub fn layered<N: Noise2D>(fields: &[&N], octaves: &[Octave], x: f64, y: f64) -> f64 {
    octaves
        .iter()
        .filter_map(|o| {
            fields
                .get(o.field)
                .map(|n| n.noise2d(x * o.frequency, y * o.frequency) * o.amplitude)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        let a = SimplexNoise::new(1234);
        let b = SimplexNoise::new(1234);
        for i in 0..50 {
            let x = f64::from(i) * 0.37;
            assert_eq!(a.noise2d(x, -x), b.noise2d(x, -x));
        }
    }

    #[test]
    fn values_are_bounded_and_smooth() {
        let n = SimplexNoise::new(77);
        let mut prev = n.noise2d(0.0, 0.5);
        for i in 1..500 {
            let v = n.noise2d(f64::from(i) * 0.001, 0.5);
            assert!(v.abs() <= 1.05);
            assert!((v - prev).abs() < 0.1);
            prev = v;
        }
    }

    #[test]
    fn layered_skips_missing_fields() {
        let n = SimplexNoise::new(5);
        let octaves = [
            Octave { frequency: 1.0, amplitude: 0.5, field: 0 },
            Octave { frequency: 2.0, amplitude: 0.5, field: 3 },
        ];
        let v = layered(&[&n], &octaves, 0.3, 0.7);
        assert!((v - n.noise2d(0.3, 0.7) * 0.5).abs() < 1e-12);
    }

    #[test]
    fn rng_seeding_consumes_one_draw() {
        let mut a = SeededRandom::from_seed_str("noise");
        let mut b = a.clone();
        let _ = SimplexNoise::from_rng(&mut a);
        let _ = rand::RngCore::next_u32(&mut b);
        assert_eq!(a, b);
    }
}
