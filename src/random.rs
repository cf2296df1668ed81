//! Детерминированный генератор случайных чисел на основе строкового сида
//!
//! Строка хешируется (`hash = hash * 31 + code_unit`, усечение до 32 бит, модуль),
//! затем поток строится смешиванием семейства multiply-xorshift (Mulberry32).
//! Один и тот же сид всегда даёт одну и ту же бесконечную последовательность.
//!
//! Генератор передаётся явно во все стадии, которым нужна случайность,
//! поэтому несколько карт можно генерировать независимо и параллельно.

use rand::RngCore;

/// Поток псевдослучайных чисел одной генерации.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    /// Создаёт генератор из произвольной строки.
    ///
    /// # Примеры
    /// ```
    /// use atlasgen::random::SeededRandom;
    /// let mut a = SeededRandom::from_seed_str("abc");
    /// let mut b = SeededRandom::from_seed_str("abc");
    /// assert_eq!(a.next_f64(), b.next_f64());
    /// ```
    #[must_use]
    pub fn from_seed_str(seed: &str) -> Self {
        Self::from_state(hash_seed(seed))
    }

    #[must_use]
    pub fn from_state(state: u32) -> Self {
        Self { state }
    }

    /// Следующее число в диапазоне `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / 4_294_967_296.0
    }

    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let s = self.state;
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }
}

/// Хеш строки по кодовым единицам UTF-16 (как `charCodeAt`), модуль 32-битного значения.
#[must_use]
pub fn hash_seed(seed: &str) -> u32 {
    let hash = seed
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(i32::from(c)));
    hash.unsigned_abs()
}

impl RngCore for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.step());
        let lo = u64::from(self.step());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
