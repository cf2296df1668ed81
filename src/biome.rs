use serde::{Deserialize, Serialize};

use crate::config::BiomeSettings;
use crate::map::{Cell, neighbor_cells};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    #[default]
    Ocean,
    Lake,
    Beach,
    Desert,
    Grassland,
    Forest,
    Taiga,
    Tundra,
    Snow,
    Mountain,
}

impl Biome {
    pub const ALL: [Biome; 10] = [
        Biome::Ocean,
        Biome::Lake,
        Biome::Beach,
        Biome::Desert,
        Biome::Grassland,
        Biome::Forest,
        Biome::Taiga,
        Biome::Tundra,
        Biome::Snow,
        Biome::Mountain,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Biome::Ocean => "ocean",
            Biome::Lake => "lake",
            Biome::Beach => "beach",
            Biome::Desert => "desert",
            Biome::Grassland => "grassland",
            Biome::Forest => "forest",
            Biome::Taiga => "taiga",
            Biome::Tundra => "tundra",
            Biome::Snow => "snow",
            Biome::Mountain => "mountain",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Biome> {
        Biome::ALL.into_iter().find(|b| b.label() == label)
    }

    /// Приглушённая природная палитра для векторной отрисовки
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Biome::Ocean => "#85b3d1",
            Biome::Lake => "#a3c4d9",
            Biome::Beach => "#eddcbb",
            Biome::Desert => "#e0c9a0",
            Biome::Grassland => "#c5d99e",
            Biome::Forest => "#8ba888",
            Biome::Taiga => "#9ba896",
            Biome::Tundra => "#bac4ba",
            Biome::Snow => "#f0f0f0",
            Biome::Mountain => "#b5a895",
        }
    }

    #[must_use]
    pub fn to_rgb(self) -> [u8; 3] {
        hex_to_rgb(self.color()).unwrap_or([208, 208, 208])
    }

    /// Пары, которые не должны соприкасаться на карте
    fn clashes_with(self, other: Biome) -> bool {
        let clash = |a: Biome, b: Biome| {
            matches!(
                (a, b),
                (Biome::Snow, Biome::Desert | Biome::Forest | Biome::Grassland)
                    | (Biome::Desert, Biome::Tundra | Biome::Taiga)
                    | (Biome::Tundra, Biome::Forest)
            )
        };
        clash(self, other) || clash(other, self)
    }
}

/// Цвет биома по его текстовой метке; неизвестные метки получают нейтральный серый.
#[must_use]
pub fn biome_color(label: &str) -> &'static str {
    Biome::from_label(label).map_or("#d0d0d0", Biome::color)
}

/// Разбирает `#rrggbb`.
#[must_use]
pub fn hex_to_rgb(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Таблица температура × влажность с приоритетом флагов воды и гор.
#[must_use]
pub fn classify(temperature: f64, moisture: f64, is_mountain: bool, is_ocean: bool, is_lake: bool) -> Biome {
    if is_ocean {
        return Biome::Ocean;
    }
    if is_lake {
        return Biome::Lake;
    }

    let (t, m) = (temperature, moisture);

    // Холодный пояс: температура решает раньше высоты
    if t < -0.7 {
        return Biome::Snow;
    }
    if t < -0.3 {
        return Biome::Tundra;
    }
    if t < 0.0 {
        return if m < -0.2 { Biome::Tundra } else { Biome::Taiga };
    }

    if is_mountain {
        return Biome::Mountain;
    }

    // Умеренный пояс
    if t < 0.5 {
        return if m < -0.4 {
            Biome::Desert
        } else if m < 0.3 {
            Biome::Grassland
        } else {
            Biome::Forest
        };
    }

    // Тёплый пояс
    if m < -0.3 {
        Biome::Desert
    } else if m < 0.0 {
        Biome::Grassland
    } else {
        Biome::Forest
    }
}

/// Промежуточный биом для сглаживания резких переходов
#[must_use]
pub fn intermediate(temperature: f64) -> Biome {
    if temperature < -0.5 {
        Biome::Tundra
    } else if temperature < 0.0 {
        Biome::Taiga
    } else {
        Biome::Grassland
    }
}

/// Назначает биомы всем ячейкам: таблица, сглаживание, затем пляжи.
pub fn assign_biomes(cells: &mut [Cell], settings: &BiomeSettings) {
    for cell in cells.iter_mut() {
        cell.biome = classify(
            cell.temperature,
            cell.moisture,
            cell.is_mountain,
            cell.is_ocean,
            cell.is_lake,
        );
    }

    for _ in 0..settings.smoothing_passes {
        smooth_biomes(cells);
    }

    place_beaches(cells, settings);
}

/// Один проход сглаживания. Ячейка меняет биом, если он несовместим
/// со строгим большинством её соседей-суши.
pub fn smooth_biomes(cells: &mut [Cell]) {
    for i in 0..cells.len() {
        let cell = &cells[i];
        if !cell.is_land() {
            continue;
        }

        let (land, clashing) = neighbor_cells(cells, cell)
            .filter(|n| n.is_land())
            .fold((0usize, 0usize), |(land, clashing), n| {
                (land + 1, clashing + usize::from(cell.biome.clashes_with(n.biome)))
            });

        if land > 0 && clashing * 2 > land {
            cells[i].biome = intermediate(cells[i].temperature);
        }
    }
}

/// Низкая тёплая суша у океана становится пляжем независимо от таблицы.
pub fn place_beaches(cells: &mut [Cell], settings: &BiomeSettings) {
    let beaches: Vec<usize> = cells
        .iter()
        .filter(|c| {
            c.is_land()
                && c.elevation < settings.beach_elevation
                && c.temperature > settings.beach_min_temperature
                && neighbor_cells(cells, c).any(|n| n.is_ocean)
        })
        .map(|c| c.id)
        .collect();

    for id in beaches {
        cells[id].biome = Biome::Beach;
    }
}
