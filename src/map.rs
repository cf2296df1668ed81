//! Карта — корневой агрегат генерации
//!
//! Конвейер строго однонаправленный: точки → разбиение → рельеф → климат → реки →
//! биомы → государства → границы. Каждая следующая стадия только дописывает
//! атрибуты уже существующих ячеек.
//!
//! Порядок извлечения значений из потока случайных чисел фиксирован:
//! 1. сиды шумов: высота, влажность, горы, детали
//! 2. по две координаты на каждую начальную точку
//! 3. разбиение на государства и их цвета/имена (см. [`crate::territory::partition`])
//! 4. дробление рёбер побережий

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::biome::{Biome, assign_biomes};
use crate::boundary::{Polyline, TerritoryBorder, trace_borders, trace_coastlines};
use crate::climate::apply_climate;
use crate::config::{GenerationParams, read_file};
use crate::error::MapgenError;
use crate::mesh::{Point, relaxed_points, tessellate};
use crate::noise::SimplexNoise;
use crate::random::SeededRandom;
use crate::rivers::{River, apply_river_moisture, trace_rivers};
use crate::terrain::{TerrainNoise, synthesize_terrain};
use crate::territory::{Territory, build_territory_graph, partition_territories};

/// Одна ячейка разбиения. Индекс в массиве ячеек карты и есть её идентичность.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    /// Вершины многоугольника; пустой, если ячейка вырождена
    pub polygon: Vec<Point>,
    pub neighbors: Vec<usize>,
    /// Ниже нуля — под уровнем моря (примерно `-1..1`)
    pub elevation: f64,
    /// `-1` холодно .. `+1` жарко
    pub temperature: f64,
    pub moisture: f64,
    pub biome: Biome,
    pub is_ocean: bool,
    pub is_lake: bool,
    pub is_mountain: bool,
}

impl Cell {
    #[must_use]
    pub fn new(id: usize, site: Point, polygon: Vec<Point>, neighbors: Vec<usize>) -> Self {
        Self {
            id,
            x: site.x,
            y: site.y,
            polygon,
            neighbors,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn is_water(&self) -> bool {
        self.is_ocean || self.is_lake
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        !self.is_water()
    }
}

/// Соседи ячейки; устаревшие индексы просто пропускаются.
pub fn neighbor_cells<'a>(cells: &'a [Cell], cell: &'a Cell) -> impl Iterator<Item = &'a Cell> + 'a {
    cell.neighbors.iter().filter_map(move |&n| cells.get(n))
}

/// Сгенерированная карта: размеры, сид, ячейки, реки, государства и их контуры.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Map {
    pub width: u32,
    pub height: u32,
    pub seed: String,
    pub num_cells: usize,
    pub cells: Vec<Cell>,
    pub rivers: Vec<River>,
    #[serde(rename = "states")]
    pub territories: Vec<Territory>,
    #[serde(default)]
    pub coastlines: Vec<Polyline>,
    #[serde(default)]
    pub borders: Vec<TerritoryBorder>,
}

/// Генерирует карту с параметрами по умолчанию.
///
/// # Пример
/// ```
/// let a = atlasgen::generate_map("abc", 300, 200, 60);
/// let b = atlasgen::generate_map("abc", 300, 200, 60);
/// assert_eq!(a, b);
/// ```
#[must_use]
pub fn generate_map(seed: &str, width: u32, height: u32, num_cells: usize) -> Map {
    generate_map_with(&GenerationParams::new(seed, width, height, num_cells))
}

/// Полный конвейер генерации. Не падает: вырожденные входы дают пустую, но корректную карту.
#[must_use]
pub fn generate_map_with(params: &GenerationParams) -> Map {
    let mut rng = SeededRandom::from_seed_str(&params.seed);
    let width = f64::from(params.width);
    let height = f64::from(params.height);

    let elevation_noise = SimplexNoise::from_rng(&mut rng);
    let moisture_noise = SimplexNoise::from_rng(&mut rng);
    let mountain_noise = SimplexNoise::from_rng(&mut rng);
    let detail_noise = SimplexNoise::from_rng(&mut rng);

    let points = relaxed_points(
        params.num_cells,
        width,
        height,
        &mut rng,
        params.relax_iterations,
    );
    let tessellation = tessellate(&points, width, height);

    let mut cells: Vec<Cell> = points
        .iter()
        .zip(tessellation.polygons)
        .zip(tessellation.neighbors)
        .enumerate()
        .map(|(id, ((&site, polygon), neighbors))| Cell::new(id, site, polygon, neighbors))
        .collect();

    let terrain_noise = TerrainNoise {
        elevation: elevation_noise,
        mountain: mountain_noise,
        detail: detail_noise,
    };
    synthesize_terrain(&mut cells, width, height, &params.terrain, &terrain_noise);
    apply_climate(&mut cells, height, &params.climate, &moisture_noise);

    let rivers = trace_rivers(&cells, &params.rivers);
    apply_river_moisture(&mut cells, &rivers, params.rivers.moisture_bonus);

    assign_biomes(&mut cells, &params.biomes);

    let territories = partition_territories(&cells, &params.territories, &mut rng);

    let coastlines = trace_coastlines(&cells, &params.boundaries, &mut rng, &terrain_noise.detail);
    let borders = trace_borders(&cells, &territories, &params.boundaries);

    log::info!(
        "Карта '{}' {}×{}: {} ячеек, {} рек, {} государств",
        params.seed,
        params.width,
        params.height,
        cells.len(),
        rivers.len(),
        territories.len()
    );

    Map {
        width: params.width,
        height: params.height,
        seed: params.seed.clone(),
        num_cells: params.num_cells,
        cells,
        rivers,
        territories,
        coastlines,
        borders,
    }
}

impl Map {
    pub fn land_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.is_land())
    }

    /// Граф соседства государств (узлы — id государств).
    #[must_use]
    pub fn territory_graph(&self) -> petgraph::graph::UnGraph<u32, ()> {
        build_territory_graph(&self.cells, &self.territories)
    }

    pub fn to_json(&self) -> Result<String, MapgenError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, MapgenError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), MapgenError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| MapgenError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MapgenError> {
        Self::from_json(&read_file(path.as_ref())?)
    }

    /// Проверяет инварианты сгенерированной карты.
    pub fn validate(&self) -> Result<(), MapgenError> {
        let fail = |msg: String| Err(MapgenError::Invariant(msg));

        for (i, cell) in self.cells.iter().enumerate() {
            if cell.id != i {
                return fail(format!("ячейка {i} имеет id {}", cell.id));
            }
            if cell.is_ocean && cell.is_lake {
                return fail(format!("ячейка {i} одновременно океан и озеро"));
            }
            for &n in &cell.neighbors {
                let symmetric = self.cells.get(n).is_some_and(|o| o.neighbors.contains(&i));
                if !symmetric {
                    return fail(format!("соседство {i} → {n} несимметрично"));
                }
                if cell.is_lake && self.cells[n].is_ocean {
                    return fail(format!("озеро {i} касается океана {n}"));
                }
            }
            if cell.is_ocean && cell.biome != Biome::Ocean {
                return fail(format!("океан {i} с биомом {:?}", cell.biome));
            }
            if cell.is_lake && cell.biome != Biome::Lake {
                return fail(format!("озеро {i} с биомом {:?}", cell.biome));
            }
        }

        for river in &self.rivers {
            let Some(&last) = river.path.last() else {
                return fail(format!("река {} пуста", river.id));
            };
            let cell = |id: usize| self.cells.get(id);
            if river.delta && !cell(last).is_some_and(|c| c.is_ocean) {
                return fail(format!("дельта реки {} не в океане", river.id));
            }
            for (step, pair) in river.path.windows(2).enumerate() {
                let (Some(a), Some(b)) = (cell(pair[0]), cell(pair[1])) else {
                    return fail(format!("река {} ссылается на несуществующую ячейку", river.id));
                };
                let terminal = river.delta && step + 2 == river.path.len();
                if b.elevation > a.elevation && !terminal {
                    return fail(format!("река {} течёт вверх в ячейке {}", river.id, b.id));
                }
            }
        }

        let mut owner = vec![None; self.cells.len()];
        for territory in &self.territories {
            for &id in &territory.cells {
                let Some(cell) = self.cells.get(id) else {
                    return fail(format!("государство {} ссылается на {id}", territory.id));
                };
                if !cell.is_land() {
                    return fail(format!("государство {} владеет водой {id}", territory.id));
                }
                if let Some(other) = owner[id].replace(territory.id) {
                    return fail(format!("ячейка {id} у государств {other} и {}", territory.id));
                }
            }
        }
        if let Some(orphan) = self.land_cells().find(|c| owner[c.id].is_none()) {
            return fail(format!("суша {} без государства", orphan.id));
        }

        Ok(())
    }
}
