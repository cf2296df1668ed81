pub mod biome;
pub mod boundary;
pub mod climate;
pub mod config;
pub mod error;
pub mod generator;
pub mod heightmap;
pub mod map;
pub mod mesh;
pub mod noise;
pub mod random;
pub mod render;
pub mod rivers;
pub mod terrain;
pub mod territory;

pub use biome::{Biome, biome_color};
pub use boundary::{Polyline, TerritoryBorder};
pub use config::{GenerationParams, GridParams};
pub use error::MapgenError;
pub use generator::{CellGenerator, GridGenerator, TerrainGenerator};
pub use heightmap::{GridWorld, Heightmap, generate_grid_world, generate_grid_world_with, terrain_color};
pub use map::{Cell, Map, generate_map, generate_map_with};
pub use mesh::Point;
pub use random::SeededRandom;
pub use rivers::River;
pub use territory::Territory;
