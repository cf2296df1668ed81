use std::collections::VecDeque;

use crate::config::ClimateSettings;
use crate::map::{Cell, neighbor_cells};
use crate::noise::Noise2D;

/// Температура и влажность для всех ячеек.
///
/// Север (y = 0) холодный, юг тёплый. Ветер дует строго с запада на восток,
/// поэтому дождевая тень проверяется только у соседей с меньшим `x`.
pub fn apply_climate<N: Noise2D>(
    cells: &mut [Cell],
    height: f64,
    settings: &ClimateSettings,
    moisture_noise: &N,
) {
    for cell in cells.iter_mut() {
        cell.temperature = temperature(cell, height, settings);
    }

    let coast = coast_distances(cells, settings.coast_hop_cap);
    let moisture: Vec<f64> = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let mut m = moisture_noise.noise2d(
                cell.x * settings.moisture_noise_scale,
                cell.y * settings.moisture_noise_scale,
            );

            let hops = coast[i];
            if hops < settings.coastal_reach {
                m += settings.coastal_bonus - f64::from(hops) * settings.coastal_decay;
            }

            if neighbor_cells(cells, cell).any(|n| n.is_lake) {
                m += settings.lake_bonus;
            }

            if cell.is_land() && in_rain_shadow(cells, cell) {
                m -= settings.rain_shadow;
            }
            m
        })
        .collect();

    for (cell, m) in cells.iter_mut().zip(moisture) {
        cell.moisture = m;
    }
}

/// Линейный градиент широты от `-1` до `+1` минус охлаждение высотой и горами.
#[must_use]
pub fn temperature(cell: &Cell, height: f64, settings: &ClimateSettings) -> f64 {
    let latitude = if height > 0.0 { cell.y / height } else { 0.5 };
    let mut t = -1.0 + latitude * 2.0;
    t -= cell.elevation * settings.elevation_cooling;
    if cell.is_mountain {
        t -= settings.mountain_cooling;
    }
    t
}

fn in_rain_shadow(cells: &[Cell], cell: &Cell) -> bool {
    neighbor_cells(cells, cell).any(|n| n.x < cell.x && n.is_mountain)
}

/// Расстояние (в переходах) от каждой ячейки до ближайшей ячейки, касающейся океана.
///
/// Путь может начинаться в любой ячейке, но дальше идёт только через не-океан.
/// Результат ограничен `cap`: всё, что дальше, получает `cap`.
#[must_use]
pub fn coast_distances(cells: &[Cell], cap: u32) -> Vec<u32> {
    let mut distance = vec![cap; cells.len()];
    let mut queue = VecDeque::new();

    for (i, cell) in cells.iter().enumerate() {
        if neighbor_cells(cells, cell).any(|n| n.is_ocean) {
            distance[i] = 0;
            queue.push_back(i);
        }
    }

    // Обратный поиск в ширину: из ячейки `u` шаг возможен, только если `u` не океан
    while let Some(u) = queue.pop_front() {
        let cell = &cells[u];
        if cell.is_ocean {
            continue;
        }
        let next = distance[u] + 1;
        if next >= cap {
            continue;
        }
        for n in neighbor_cells(cells, cell) {
            if next < distance[n.id] {
                distance[n.id] = next;
                queue.push_back(n.id);
            }
        }
    }

    distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::test_support::chain;

    struct Zero;

    impl Noise2D for Zero {
        fn noise2d(&self, _x: f64, _y: f64) -> f64 {
            0.0
        }
    }

    #[test]
    fn north_is_colder_than_south() {
        let settings = ClimateSettings::default();
        let mut north = chain(&[0.1]).remove(0);
        let mut south = north.clone();
        north.y = 0.0;
        south.y = 800.0;
        assert!((temperature(&north, 800.0, &settings) + 1.0 + 0.015).abs() < 1e-12);
        assert!((temperature(&south, 800.0, &settings) - 1.0 + 0.015).abs() < 1e-12);
    }

    #[test]
    fn mountains_and_altitude_cool_down() {
        let settings = ClimateSettings::default();
        let mut low = chain(&[0.0]).remove(0);
        low.y = 400.0;
        let mut peak = low.clone();
        peak.elevation = 0.8;
        peak.is_mountain = true;
        let dt = temperature(&low, 800.0, &settings) - temperature(&peak, 800.0, &settings);
        assert!((dt - (0.8 * 0.15 + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn coast_distance_counts_land_hops() {
        // океан, затем пять клеток суши
        let mut cells = chain(&[-0.5, 0.1, 0.1, 0.1, 0.1, 0.1]);
        cells[0].is_ocean = true;
        let d = coast_distances(&cells, 10);
        assert_eq!(d, vec![1, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn coast_distance_is_capped() {
        let mut elevations = vec![-0.5];
        elevations.extend(std::iter::repeat_n(0.2, 15));
        let mut cells = chain(&elevations);
        cells[0].is_ocean = true;
        let d = coast_distances(&cells, 10);
        assert_eq!(d[10], 9);
        assert_eq!(d[11], 10);
        assert_eq!(d[15], 10);
    }

    #[test]
    fn landlocked_map_has_no_coast() {
        let cells = chain(&[0.1, 0.2, 0.3]);
        assert_eq!(coast_distances(&cells, 10), vec![10, 10, 10]);
    }

    #[test]
    fn moisture_bonuses_and_rain_shadow() {
        let settings = ClimateSettings::default();
        // океан | берег | гора | тень | озеро
        let mut cells = chain(&[-0.5, 0.1, 0.7, 0.1, -0.02]);
        cells[0].is_ocean = true;
        cells[2].is_mountain = true;
        cells[4].is_lake = true;
        apply_climate(&mut cells, 800.0, &settings, &Zero);

        // берег: 0.5 за кромку
        assert!((cells[1].moisture - 0.5).abs() < 1e-12);
        // за горой: 0.5 - 2 * 0.1 + 0.3 (озеро) - 0.4 (тень)
        assert!((cells[3].moisture - 0.2).abs() < 1e-12);
        // гора: 0.5 - 0.1, тени нет (с запада — берег, не гора)
        assert!((cells[2].moisture - 0.4).abs() < 1e-12);
    }
}
