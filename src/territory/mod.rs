pub mod graph;
pub mod names;
pub mod partition;

use serde::{Deserialize, Serialize};

use crate::config::TerritorySettings;
use crate::map::Cell;
use crate::random::SeededRandom;

pub use graph::build_territory_graph;
pub use partition::{Partition, Topology, partition};

/// Государство: связная (в основном) группа ячеек суши.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    pub id: usize,
    pub name: String,
    pub color: String, // "#rrggbb"
    /// Индексы ячеек по возрастанию
    pub cells: Vec<usize>,
    pub capital: usize,
}

/// Ячейки разбиения как граф для заливки: суша — всё, кроме океана и озёр.
pub struct CellTopology<'a>(pub &'a [Cell]);

impl Topology for CellTopology<'_> {
    fn node_count(&self) -> usize {
        self.0.len()
    }

    fn is_land(&self, node: usize) -> bool {
        self.0.get(node).is_some_and(Cell::is_land)
    }

    fn neighbors(&self, node: usize, out: &mut Vec<usize>) {
        if let Some(cell) = self.0.get(node) {
            out.extend(cell.neighbors.iter().copied().filter(|&n| n < self.0.len()));
        }
    }

    fn position(&self, node: usize) -> (f64, f64) {
        self.0.get(node).map_or((0.0, 0.0), |c| (c.x, c.y))
    }
}

/// Разбивает сушу на государства и раздаёт им имена и цвета.
///
/// После заливки для каждого государства по порядку извлекаются цвет, затем имя.
pub fn partition_territories(
    cells: &[Cell],
    settings: &TerritorySettings,
    rng: &mut SeededRandom,
) -> Vec<Territory> {
    let partition = partition(&CellTopology(cells), settings, rng);
    build_territories(&partition, rng)
}

pub(crate) fn build_territories(partition: &Partition, rng: &mut SeededRandom) -> Vec<Territory> {
    partition
        .members()
        .into_iter()
        .zip(&partition.capitals)
        .enumerate()
        .map(|(id, (cells, &capital))| {
            let color = names::state_color(id, rng);
            let name = names::state_name(rng);
            Territory {
                id,
                name,
                color,
                cells,
                capital,
            }
        })
        .collect()
}

/// Владелец каждой ячейки по списку государств.
#[must_use]
pub fn cell_owners(cell_count: usize, territories: &[Territory]) -> Vec<Option<usize>> {
    let mut owners = vec![None; cell_count];
    for territory in territories {
        for &cell in &territory.cells {
            if let Some(slot) = owners.get_mut(cell) {
                *slot = Some(territory.id);
            }
        }
    }
    owners
}
