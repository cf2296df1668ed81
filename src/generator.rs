//! Взаимозаменяемые стратегии генерации: сид → модель местности

use crate::config::{GenerationParams, GridParams};
use crate::heightmap::{GridWorld, generate_grid_world_with};
use crate::map::{Map, generate_map_with};

/// Стратегия генерации. Один и тот же сид с одними и теми же параметрами
/// всегда даёт один и тот же результат.
pub trait TerrainGenerator {
    type Output;

    fn generate(&self, seed: &str) -> Self::Output;
}

/// Ячеечный конвейер; сид из параметров подменяется переданным.
#[derive(Debug, Clone, Default)]
pub struct CellGenerator {
    pub params: GenerationParams,
}

impl TerrainGenerator for CellGenerator {
    type Output = Map;

    fn generate(&self, seed: &str) -> Map {
        let params = GenerationParams {
            seed: seed.to_owned(),
            ..self.params.clone()
        };
        generate_map_with(&params)
    }
}

/// Сеточный конвейер
#[derive(Debug, Clone, Default)]
pub struct GridGenerator {
    pub params: GridParams,
}

impl TerrainGenerator for GridGenerator {
    type Output = GridWorld;

    fn generate(&self, seed: &str) -> GridWorld {
        let params = GridParams {
            seed: seed.to_owned(),
            ..self.params.clone()
        };
        generate_grid_world_with(&params)
    }
}
