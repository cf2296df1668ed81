//! Синтез рельефа на ячейках
//!
//! Высота = сумма октав когерентного шума − смещение материка (спад от центра холста,
//! искажённый низкочастотным шумом). Затем:
//! 1. Порог уровня воды отделяет сушу от океана
//! 2. Одиночные островки без соседей-суши уходят под воду
//! 3. Низины, не касающиеся океана, становятся озёрами; касающиеся — поднимаются над водой
//! 4. Горы: начальные пики по отдельному шуму, затем расширение в хребты

use crate::config::TerrainSettings;
use crate::map::{Cell, neighbor_cells};
use crate::noise::{Noise2D, Octave, layered};

/// Поля шума рельефа. Порядок полей задаёт порядок извлечения сидов из потока.
pub struct TerrainNoise<N> {
    pub elevation: N,
    pub mountain: N,
    pub detail: N,
}

/// Октавы высоты: крупные формы, регионы, холмы и две детальные октавы.
const ELEVATION_OCTAVES: [Octave; 5] = [
    Octave { frequency: 0.0015, amplitude: 0.4, field: 0 },
    Octave { frequency: 0.005, amplitude: 0.25, field: 0 },
    Octave { frequency: 0.015, amplitude: 0.15, field: 0 },
    Octave { frequency: 0.04, amplitude: 0.1, field: 1 },
    Octave { frequency: 0.08, amplitude: 0.05, field: 1 },
];

const MOUNTAIN_OCTAVES: [Octave; 2] = [
    Octave { frequency: 0.005, amplitude: 0.7, field: 0 },
    Octave { frequency: 0.015, amplitude: 0.3, field: 0 },
];

/// Смещение материка для нормированных координат с центром в нуле (`nx, ny ∈ [-0.5, 0.5]`).
///
/// Непрерывно растёт с расстоянием от центра, поэтому суша в центре вероятнее, чем в углах.
#[must_use]
pub fn landmass_bias<N: Noise2D>(nx: f64, ny: f64, settings: &TerrainSettings, noise: &N) -> f64 {
    let distance = nx.hypot(ny);
    let coastal = noise.noise2d(nx * settings.coast_noise_scale, ny * settings.coast_noise_scale)
        * settings.coast_noise_amplitude;
    (distance * settings.falloff_scale).powf(settings.falloff_exponent) - coastal
}

/// Высота одной точки холста до постобработки.
#[must_use]
pub fn sample_elevation<N: Noise2D>(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    settings: &TerrainSettings,
    noise: &TerrainNoise<N>,
) -> f64 {
    let (nx, ny) = normalized(x, y, width, height);
    let bias = landmass_bias(nx, ny, settings, &noise.elevation);
    layered(&[&noise.elevation, &noise.detail], &ELEVATION_OCTAVES, x, y) - bias * settings.bias_weight
}

fn normalized(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    let nx = if width > 0.0 { x / width - 0.5 } else { 0.0 };
    let ny = if height > 0.0 { y / height - 0.5 } else { 0.0 };
    (nx, ny)
}

/// Назначает высоты и флаги океана, озёр и гор всем ячейкам.
pub fn synthesize_terrain<N: Noise2D + Sync>(
    cells: &mut [Cell],
    width: f64,
    height: f64,
    settings: &TerrainSettings,
    noise: &TerrainNoise<N>,
) {
    let sample = |cell: &Cell| sample_elevation(cell.x, cell.y, width, height, settings, noise);

    #[cfg(feature = "parallel")]
    let elevations: Vec<f64> = {
        use rayon::prelude::*;
        cells.par_iter().map(sample).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let elevations: Vec<f64> = cells.iter().map(sample).collect();

    for (cell, elevation) in cells.iter_mut().zip(elevations) {
        cell.elevation = elevation;
        cell.is_ocean = elevation < settings.water_level;
    }

    drown_islets(cells, settings);
    classify_lakes(cells, settings);
    raise_mountains(cells, settings, &noise.mountain);

    log::debug!(
        "Рельеф: {} ячеек, океан {}, озёра {}, горы {}",
        cells.len(),
        cells.iter().filter(|c| c.is_ocean).count(),
        cells.iter().filter(|c| c.is_lake).count(),
        cells.iter().filter(|c| c.is_mountain).count()
    );
}

/// Суша, у которой все соседи — океан (или соседей нет), уходит под воду.
/// Проход последовательный: утопленная ячейка сразу влияет на следующие.
pub fn drown_islets(cells: &mut [Cell], settings: &TerrainSettings) {
    for i in 0..cells.len() {
        if cells[i].is_ocean {
            continue;
        }
        let has_land_neighbor = neighbor_cells(cells, &cells[i]).any(|n| !n.is_ocean);
        if !has_land_neighbor {
            cells[i].is_ocean = true;
            cells[i].elevation = settings.water_level - settings.islet_depth;
        }
    }
}

/// Низины в `[water_level, 0)` без выхода к океану становятся озёрами.
/// Низина у океана поднимается над водой, чтобы озеро не сливалось с океаном.
pub fn classify_lakes(cells: &mut [Cell], settings: &TerrainSettings) {
    for i in 0..cells.len() {
        let cell = &cells[i];
        if cell.is_ocean || cell.elevation >= 0.0 || cell.elevation < settings.water_level {
            continue;
        }
        let touches_ocean = neighbor_cells(cells, cell).any(|n| n.is_ocean);
        if touches_ocean {
            cells[i].elevation = settings.lake_shore_elevation;
        } else {
            cells[i].is_lake = true;
        }
    }
}

/// Отмечает начальные пики и расширяет их в связные хребты.
pub fn raise_mountains<N: Noise2D>(cells: &mut [Cell], settings: &TerrainSettings, noise: &N) {
    for cell in cells.iter_mut() {
        if !cell.is_land() {
            continue;
        }
        let value = layered(&[noise], &MOUNTAIN_OCTAVES, cell.x, cell.y);
        if cell.elevation > settings.mountain_threshold && value > settings.mountain_noise_threshold {
            cell.is_mountain = true;
            cell.elevation = cell.elevation.max(settings.mountain_peak_floor);
        }
    }

    for _ in 0..settings.range_passes {
        for i in 0..cells.len() {
            let cell = &cells[i];
            if !cell.is_land() || cell.is_mountain {
                continue;
            }
            let mountain_neighbors = neighbor_cells(cells, cell).filter(|n| n.is_mountain).count();
            if mountain_neighbors >= settings.range_min_neighbors
                && cell.elevation > settings.range_threshold
            {
                cells[i].is_mountain = true;
                cells[i].elevation = cells[i].elevation.max(settings.range_floor);
            }
        }
    }
}
