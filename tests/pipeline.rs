use std::collections::HashSet;

use atlasgen::config::TerrainSettings;
use atlasgen::noise::SimplexNoise;
use atlasgen::terrain::landmass_bias;
use atlasgen::{Biome, GenerationParams, Map, MapgenError, generate_map, generate_map_with};

const SEEDS: [&str; 4] = ["abc", "hello world", "Ærø", "42"];

fn maps() -> impl Iterator<Item = Map> {
    SEEDS.into_iter().map(|seed| generate_map(seed, 600, 400, 300))
}

#[test]
fn generation_is_deterministic() {
    for seed in SEEDS {
        let a = generate_map(seed, 600, 400, 300);
        let b = generate_map(seed, 600, 400, 300);
        for (x, y) in a.cells.iter().zip(&b.cells) {
            assert_eq!(x.elevation.to_bits(), y.elevation.to_bits());
            assert_eq!(x.temperature.to_bits(), y.temperature.to_bits());
            assert_eq!(x.moisture.to_bits(), y.moisture.to_bits());
            assert_eq!(x.biome, y.biome);
        }
        assert_eq!(a, b);
    }
}

#[test]
fn different_seeds_differ() {
    let a = generate_map("one", 600, 400, 300);
    let b = generate_map("two", 600, 400, 300);
    assert_ne!(a.cells, b.cells);
}

#[test]
fn adjacency_is_symmetric() {
    for map in maps() {
        for (i, cell) in map.cells.iter().enumerate() {
            for &n in &cell.neighbors {
                assert!(map.cells[n].neighbors.contains(&i), "{} → {n}", cell.id);
            }
        }
    }
}

#[test]
fn territories_partition_land() {
    for map in maps() {
        let land: HashSet<usize> = map.land_cells().map(|c| c.id).collect();
        let mut claimed = HashSet::new();
        for territory in &map.territories {
            for &id in &territory.cells {
                assert!(claimed.insert(id), "ячейка {id} у двух государств");
            }
            assert!(territory.cells.contains(&territory.capital));
        }
        assert_eq!(claimed, land);
    }
}

/// Параметры с короткими реками: при стандартной минимальной длине (9) реки на картах
/// такого размера встречаются редко, а инварианты нужно проверять на настоящих путях.
fn river_params(seed: &str) -> GenerationParams {
    let mut params = GenerationParams::new(seed, 1200, 800, 800);
    params.rivers.min_length = 3;
    params
}

#[test]
fn rivers_flow_downhill_into_the_ocean() {
    let mut total = 0;
    for seed in SEEDS {
        let map = generate_map_with(&river_params(seed));
        total += map.rivers.len();
        for river in &map.rivers {
            assert!(river.delta);
            assert!(river.path.len() >= 3);
            let last = *river.path.last().unwrap();
            assert!(map.cells[last].is_ocean);
            let inland = &river.path[..river.path.len() - 1];
            assert!(inland.iter().all(|&id| map.cells[id].is_land()));
            for pair in inland.windows(2) {
                assert!(map.cells[pair[1]].elevation <= map.cells[pair[0]].elevation);
            }
        }
        map.validate().unwrap();
    }
    assert!(total > 0, "ни одной реки на {} картах", SEEDS.len());
}

#[test]
fn validation_rejects_an_uphill_river() {
    let map = SEEDS
        .into_iter()
        .map(|seed| generate_map_with(&river_params(seed)))
        .find(|m| !m.rivers.is_empty())
        .expect("нужна карта с рекой");
    let mut broken = map.clone();
    broken.rivers[0].path.reverse();
    assert!(matches!(broken.validate(), Err(MapgenError::Invariant(_))));
}

#[test]
fn biomes_match_water_flags() {
    for map in maps() {
        for cell in &map.cells {
            assert!(!(cell.is_ocean && cell.is_lake));
            assert!(Biome::ALL.contains(&cell.biome));
            if cell.is_ocean {
                assert_eq!(cell.biome, Biome::Ocean);
            }
            if cell.is_lake {
                assert_eq!(cell.biome, Biome::Lake);
            }
        }
    }
}

/// Низкий уровень моря расширяет полосу низин `[water_level, 0)`, из которой получаются озёра.
fn lake_params(seed: &str) -> GenerationParams {
    let mut params = GenerationParams::new(seed, 1200, 800, 800);
    params.terrain.water_level = -0.3;
    params
}

#[test]
fn lakes_never_touch_the_ocean() {
    let mut lakes = 0;
    for seed in SEEDS {
        let map = generate_map_with(&lake_params(seed));
        for cell in map.cells.iter().filter(|c| c.is_lake) {
            lakes += 1;
            assert!(!cell.is_ocean);
            assert_eq!(cell.biome, Biome::Lake);
            assert!(cell.neighbors.iter().all(|&n| !map.cells[n].is_ocean));
        }
        map.validate().unwrap();
    }
    assert!(lakes > 0, "ни одного озера на {} картах", SEEDS.len());
}

#[test]
fn generated_maps_validate() {
    for map in maps() {
        map.validate().unwrap();
    }
}

#[test]
fn default_abc_map_is_reproducible() {
    let a = generate_map("abc", 1200, 800, 800);
    let b = generate_map("abc", 1200, 800, 800);
    assert_eq!(a.cells.len(), 800);
    assert_eq!(a.cells[0].elevation.to_bits(), b.cells[0].elevation.to_bits());
    assert_eq!(a.territories.len(), b.territories.len());
    a.validate().unwrap();
}

#[test]
fn center_is_favoured_over_corners() {
    let settings = TerrainSettings::default();
    let noise = SimplexNoise::new(7);
    let center = landmass_bias(0.0, 0.0, &settings, &noise);
    for (nx, ny) in [(-0.5, -0.5), (0.5, -0.5), (-0.5, 0.5), (0.5, 0.5)] {
        assert!(center < landmass_bias(nx, ny, &settings, &noise));
    }
}

#[test]
fn tiny_requests_do_not_fail() {
    for n in [0, 1] {
        let map = generate_map("tiny", 1200, 800, n);
        assert_eq!(map.cells.len(), n);
        assert!(map.rivers.is_empty());
        map.validate().unwrap();
    }
}

#[test]
fn maps_with_land_have_coastlines_and_borders() {
    let mut with_land = 0;
    for i in 0..12 {
        let map = generate_map(&format!("coast-{i}"), 400, 300, 150);
        if map.land_cells().next().is_none() {
            continue;
        }
        with_land += 1;
        assert!(!map.coastlines.is_empty());
        assert!(!map.territories.is_empty());
        for border in &map.borders {
            assert!(!border.paths.is_empty(), "у государства {} нет контура", border.territory);
        }
    }
    assert!(with_land > 0);
}

#[test]
fn borders_and_coastlines_are_finite_paths() {
    for map in maps() {
        assert_eq!(map.borders.len(), map.territories.len());
        let paths = map
            .coastlines
            .iter()
            .chain(map.borders.iter().flat_map(|b| &b.paths));
        for path in paths {
            assert!(path.points.len() >= 2);
            assert!(path.points.iter().all(|p| p.is_finite()));
        }
    }
}

#[test]
fn territory_graph_has_a_node_per_state() {
    for map in maps() {
        let graph = map.territory_graph();
        assert_eq!(graph.node_count(), map.territories.len());
    }
}
