use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::RiverSettings;
use crate::map::Cell;

/// Река: путь по индексам ячеек от истока в высокогорье до океана.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct River {
    pub id: usize,
    pub path: Vec<usize>,
    /// `true`, только если путь закончился в ячейке океана
    pub delta: bool,
}

/// Чем закончился спуск из истока
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// Дошли до океана
    Delta,
    /// Влились в уже найденную реку: нижнее течение не дублируется
    Merged,
    /// Локальный минимум, тупик или предел длины
    DeadEnd,
}

/// Прокладывает реки от самых высоких ячеек суши вниз по склону.
///
/// На каждом шаге река переходит в самую низкую ещё не посещённую соседнюю ячейку.
/// Сохраняются только пути, дошедшие до океана и длиннее `min_length - 1`.
#[must_use]
pub fn trace_rivers(cells: &[Cell], settings: &RiverSettings) -> Vec<River> {
    let mut sources: Vec<&Cell> = cells
        .iter()
        .filter(|c| c.is_land() && c.elevation > settings.source_elevation)
        .collect();
    sources.sort_by(|a, b| {
        b.elevation
            .partial_cmp(&a.elevation)
            .unwrap_or(Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    sources.truncate(settings.count * settings.candidate_factor);

    let mut rivers: Vec<River> = Vec::new();
    // ячейка → река, которой она принадлежит
    let mut claimed: HashMap<usize, usize> = HashMap::new();
    let mut merged = 0;

    for source in sources {
        let (path, outcome) = walk_downhill(cells, source.id, &claimed, settings.max_steps);
        match outcome {
            Walk::Delta if path.len() >= settings.min_length => {
                let id = rivers.len();
                for &cell in &path {
                    claimed.insert(cell, id);
                }
                rivers.push(River {
                    id,
                    path,
                    delta: true,
                });
            }
            Walk::Merged => merged += 1,
            _ => {}
        }
    }

    log::debug!("Реки: {} сохранено, {} влилось в другие", rivers.len(), merged);
    rivers
}

fn walk_downhill(
    cells: &[Cell],
    source: usize,
    claimed: &HashMap<usize, usize>,
    max_steps: usize,
) -> (Vec<usize>, Walk) {
    let mut path = vec![source];
    let mut visited = HashSet::from([source]);
    let mut current = &cells[source];

    for _ in 0..max_steps {
        if current.is_ocean {
            return (path, Walk::Delta);
        }
        if claimed.contains_key(&current.id) {
            return (path, Walk::Merged);
        }

        let next = current
            .neighbors
            .iter()
            .filter(|n| !visited.contains(*n))
            .filter_map(|&n| cells.get(n))
            .reduce(|lowest, n| if n.elevation < lowest.elevation { n } else { lowest });

        let Some(next) = next else {
            return (path, Walk::DeadEnd);
        };

        // Вверх по склону реки не текут; исключение — впадение в океан
        if next.elevation >= current.elevation && !next.is_ocean {
            return (path, Walk::DeadEnd);
        }

        path.push(next.id);
        visited.insert(next.id);
        current = next;
    }

    // Последний шаг мог привести прямо в океан
    if current.is_ocean {
        (path, Walk::Delta)
    } else {
        (path, Walk::DeadEnd)
    }
}

/// Каждая ячейка русла получает фиксированную прибавку влажности.
pub fn apply_river_moisture(cells: &mut [Cell], rivers: &[River], bonus: f64) {
    for river in rivers {
        for &id in &river.path {
            if let Some(cell) = cells.get_mut(id) {
                cell.moisture += bonus;
            }
        }
    }
}
