//! Альтернативный конвейер: регулярная сетка высот вместо ячеек
//!
//! Каждая точка сетки покрывает `resolution × resolution` пикселей холста. Рельеф, влажность
//! и температура считаются шумом прямо в точках, государства растут тем же разбиением,
//! что и в ячеечном конвейере, только по 4-связной сетке.

use std::path::Path;

use image::{ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

use crate::config::GridParams;
use crate::error::MapgenError;
use crate::noise::{Noise2D, Octave, SimplexNoise, layered};
use crate::random::SeededRandom;
use crate::territory::{Topology, build_territories, partition};

/// Октавы сетки в нормированных координатах: материки, регионы, холмы, детали.
const GRID_OCTAVES: [Octave; 4] = [
    Octave { frequency: 3.0, amplitude: 0.5, field: 0 },
    Octave { frequency: 6.0, amplitude: 0.25, field: 0 },
    Octave { frequency: 12.0, amplitude: 0.125, field: 0 },
    Octave { frequency: 24.0, amplitude: 0.0625, field: 0 },
];

/// Двумерное поле значений по строкам (`y * width + x`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heightmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Heightmap {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Оттенки серого: минимум поля — чёрный, максимум — белый.
    #[must_use]
    pub fn to_grayscale_image(&self) -> Vec<u8> {
        let min = self.data.iter().copied().fold(f32::INFINITY, f32::min);
        let max = self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let span = if max > min { max - min } else { 1.0 };
        self.data
            .iter()
            .map(|&v| ((v - min) / span * 255.0).clamp(0.0, 255.0) as u8)
            .collect()
    }

    pub fn save_as_png(&self, path: impl AsRef<Path>) -> Result<(), MapgenError> {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.to_grayscale_image()).ok_or_else(
                || MapgenError::Invariant("размер буфера не совпадает с картой высот".into()),
            )?;
        img.save(path)?;
        Ok(())
    }
}

/// Точка сетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: u32,
    pub y: u32,
}

/// Государство на сетке; принадлежность точек хранится в [`GridWorld::owners`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridState {
    pub id: usize,
    pub name: String,
    pub color: String,
    pub capital: GridPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridWorld {
    pub seed: String,
    /// Размеры холста в пикселях
    pub width: u32,
    pub height: u32,
    pub resolution: u32,
    pub map_width: u32,
    pub map_height: u32,
    pub elevation: Heightmap,
    pub moisture: Heightmap,
    pub temperature: Heightmap,
    pub water_level: f64,
    pub states: Vec<GridState>,
    /// Владелец каждой точки сетки; у воды `None`
    pub owners: Vec<Option<usize>>,
}

impl GridWorld {
    #[must_use]
    pub fn is_land(&self, x: u32, y: u32) -> bool {
        f64::from(self.elevation.get(x, y)) > self.water_level
    }

    #[must_use]
    pub fn owner(&self, x: u32, y: u32) -> Option<usize> {
        self.owners
            .get(y as usize * self.map_width as usize + x as usize)
            .copied()
            .flatten()
    }

    /// Цвет рельефа точки сетки, `#rrggbb`.
    #[must_use]
    pub fn color_at(&self, x: u32, y: u32) -> &'static str {
        terrain_color(
            f64::from(self.elevation.get(x, y)),
            f64::from(self.moisture.get(x, y)),
            f64::from(self.temperature.get(x, y)),
            self.water_level,
        )
    }
}

/// Сетка как граф для разбиения: 4-связность, суша выше уровня воды.
struct GridTopology<'a> {
    elevation: &'a Heightmap,
    water_level: f64,
}

impl Topology for GridTopology<'_> {
    fn node_count(&self) -> usize {
        self.elevation.data.len()
    }

    fn is_land(&self, node: usize) -> bool {
        self.elevation
            .data
            .get(node)
            .is_some_and(|&h| f64::from(h) > self.water_level)
    }

    fn neighbors(&self, node: usize, out: &mut Vec<usize>) {
        let width = self.elevation.width as usize;
        let height = self.elevation.height as usize;
        if width == 0 {
            return;
        }
        let (x, y) = (node % width, node / width);
        if x > 0 {
            out.push(node - 1);
        }
        if x + 1 < width {
            out.push(node + 1);
        }
        if y > 0 {
            out.push(node - width);
        }
        if y + 1 < height {
            out.push(node + width);
        }
    }

    fn position(&self, node: usize) -> (f64, f64) {
        let width = (self.elevation.width as usize).max(1);
        ((node % width) as f64, (node / width) as f64)
    }
}

/// Сетка с параметрами по умолчанию.
#[must_use]
pub fn generate_grid_world(seed: &str, width: u32, height: u32) -> GridWorld {
    generate_grid_world_with(&GridParams::new(seed, width, height))
}

/// Из потока по порядку: сиды шумов высоты, влажности и температуры, затем разбиение
/// на государства, затем цвет и имя каждого государства.
#[must_use]
pub fn generate_grid_world_with(params: &GridParams) -> GridWorld {
    let mut rng = SeededRandom::from_seed_str(&params.seed);
    let elevation_noise = SimplexNoise::from_rng(&mut rng);
    let moisture_noise = SimplexNoise::from_rng(&mut rng);
    let temperature_noise = SimplexNoise::from_rng(&mut rng);

    let resolution = params.resolution.max(1);
    let map_width = params.width / resolution;
    let map_height = params.height / resolution;

    let sample = |i: usize| {
        let x = i % map_width as usize;
        let y = i / map_width as usize;
        let nx = x as f64 / f64::from(map_width);
        let ny = y as f64 / f64::from(map_height);
        sample_point(nx, ny, &elevation_noise, &moisture_noise, &temperature_noise)
    };

    let count = map_width as usize * map_height as usize;
    #[cfg(feature = "parallel")]
    let samples: Vec<[f32; 3]> = {
        use rayon::prelude::*;
        (0..count).into_par_iter().map(sample).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let samples: Vec<[f32; 3]> = (0..count).map(sample).collect();

    let mut elevation = Heightmap::new(map_width, map_height);
    let mut moisture = Heightmap::new(map_width, map_height);
    let mut temperature = Heightmap::new(map_width, map_height);
    for (i, [e, m, t]) in samples.into_iter().enumerate() {
        elevation.data[i] = e;
        moisture.data[i] = m;
        temperature.data[i] = t;
    }

    let topology = GridTopology {
        elevation: &elevation,
        water_level: params.water_level,
    };
    let partition = partition(&topology, &params.territories, &mut rng);
    let states = build_territories(&partition, &mut rng)
        .into_iter()
        .map(|t| GridState {
            id: t.id,
            name: t.name,
            color: t.color,
            capital: GridPoint {
                x: (t.capital % map_width.max(1) as usize) as u32,
                y: (t.capital / map_width.max(1) as usize) as u32,
            },
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Сетка {map_width}×{map_height}: суша {}, государств {}",
        partition.owners.iter().filter(|o| o.is_some()).count(),
        states.len()
    );

    GridWorld {
        seed: params.seed.clone(),
        width: params.width,
        height: params.height,
        resolution,
        map_width,
        map_height,
        elevation,
        moisture,
        temperature,
        water_level: params.water_level,
        states,
        owners: partition.owners,
    }
}

/// Высота, влажность и температура в нормированной точке `nx, ny ∈ [0, 1)`.
fn sample_point<N: Noise2D>(nx: f64, ny: f64, elevation: &N, moisture: &N, temperature: &N) -> [f32; 3] {
    let distance = (nx - 0.5).hypot(ny - 0.5) * 2.0;
    let coastal = elevation.noise2d(nx * 5.0, ny * 5.0) * 0.2;
    let e = layered(&[elevation], &GRID_OCTAVES, nx, ny) - (distance.powf(2.5) * 0.8 - coastal);

    let m = moisture.noise2d(nx * 8.0, ny * 8.0);

    let latitude = (ny - 0.5).abs() * 2.0;
    let t = 1.0 - latitude + temperature.noise2d(nx * 6.0, ny * 6.0) * 0.3;

    [e as f32, m as f32, t as f32]
}

/// Цвет рельефа точки сетки по высоте, влажности и температуре.
#[must_use]
pub fn terrain_color(elevation: f64, moisture: f64, temperature: f64, water_level: f64) -> &'static str {
    if elevation <= water_level {
        let depth = water_level - elevation;
        return if depth > 0.3 {
            "#3a5f7d" // глубокий океан
        } else if depth > 0.15 {
            "#4a7ba7"
        } else {
            "#5a8db8" // мелководье
        };
    }

    let height = elevation - water_level;
    if height > 0.6 || (temperature < 0.2 && height > 0.3) {
        return "#f0f0f0"; // снег
    }
    if height > 0.45 {
        return "#8b7355"; // горы
    }

    if temperature < 0.3 {
        if moisture > 0.3 { "#a8b5a5" } else { "#bac4ba" } // тайга / тундра
    } else if temperature < 0.6 {
        if moisture > 0.4 {
            "#7a9b6f" // лес
        } else if moisture > 0.0 {
            "#b8c795" // луга
        } else {
            "#d4c4a0" // сухие равнины
        }
    } else if moisture > 0.5 {
        "#6b8e5f" // джунгли
    } else if moisture > 0.1 {
        "#a8b878" // саванна
    } else {
        "#d4b896" // пустыня
    }
}
