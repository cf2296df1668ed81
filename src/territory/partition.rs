// src/territory/partition.rs
use std::collections::{HashSet, VecDeque};

use rand::Rng;

use crate::config::TerritorySettings;
use crate::random::SeededRandom;

/// Граф, по которому растут государства: ячейки разбиения или точки сетки.
pub trait Topology {
    fn node_count(&self) -> usize;
    fn is_land(&self, node: usize) -> bool;
    /// Дописывает соседей узла в `out` (буфер очищается вызывающим кодом).
    fn neighbors(&self, node: usize, out: &mut Vec<usize>);
    fn position(&self, node: usize) -> (f64, f64);
}

/// Результат разбиения суши на государства.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Столица каждого государства (индекс узла)
    pub capitals: Vec<usize>,
    /// Владелец каждого узла; у воды всегда `None`
    pub owners: Vec<Option<usize>>,
}

impl Partition {
    /// Узлы каждого государства в порядке возрастания индексов.
    #[must_use]
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.capitals.len()];
        for (node, owner) in self.owners.iter().enumerate() {
            if let Some(t) = *owner {
                members[t].push(node);
            }
        }
        members
    }
}

/// Делит всю сушу на государства.
///
/// Порядок извлечения из потока:
/// 1. число государств в `[min_states, max_states]`
/// 2. по одному значению на каждую столицу (выбор без возвращения)
/// 3. по одному броску на каждое предложение соседнего узла при заливке
///
/// Заливка идёт одновременно из всех столиц через общую очередь; соседний свободный узел суши
/// присоединяется с вероятностью `expansion_chance`, что даёт неровные границы.
/// Оставшиеся узлы получают владельца ближайшего занятого узла суши, поэтому в итоге
/// каждая клетка суши принадлежит ровно одному государству.
pub fn partition<T: Topology>(
    topology: &T,
    settings: &TerritorySettings,
    rng: &mut SeededRandom,
) -> Partition {
    let count = topology.node_count();
    let mut land: Vec<usize> = (0..count).filter(|&n| topology.is_land(n)).collect();
    let mut owners = vec![None; count];

    if land.is_empty() {
        return Partition {
            capitals: Vec::new(),
            owners,
        };
    }

    let (lo, hi) = (
        settings.min_states.min(settings.max_states),
        settings.min_states.max(settings.max_states),
    );
    let wanted = rng.gen_range(lo..=hi).max(1);

    let mut capitals = Vec::with_capacity(wanted);
    while capitals.len() < wanted && !land.is_empty() {
        let idx = rng.gen_range(0..land.len());
        capitals.push(land.remove(idx));
    }

    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    for (territory, &capital) in capitals.iter().enumerate() {
        owners[capital] = Some(territory);
        queue.push_back((capital, territory));
    }

    let chance = settings.expansion_chance.clamp(0.0, 1.0);
    let mut buffer = Vec::new();
    while let Some((node, territory)) = queue.pop_front() {
        buffer.clear();
        topology.neighbors(node, &mut buffer);
        for &n in &buffer {
            if n >= count || !topology.is_land(n) || owners[n].is_some() {
                continue;
            }
            if rng.gen_bool(chance) {
                owners[n] = Some(territory);
                queue.push_back((n, territory));
            }
        }
    }

    let unclaimed = fill_unclaimed(topology, &capitals, &mut owners);
    log::debug!(
        "Государства: {}, дозаполнено узлов: {}",
        capitals.len(),
        unclaimed
    );

    Partition { capitals, owners }
}

/// Дозаполняет свободную сушу: поиск в ширину по суше до ближайшего занятого узла.
/// Если занятых узлов на этом участке суши нет (остров без столицы),
/// узел отходит государству с ближайшей по прямой столицей.
fn fill_unclaimed<T: Topology>(
    topology: &T,
    capitals: &[usize],
    owners: &mut [Option<usize>],
) -> usize {
    let mut filled = 0;
    let mut buffer = Vec::new();

    for start in 0..owners.len() {
        if owners[start].is_some() || !topology.is_land(start) {
            continue;
        }

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut found = None;

        'search: while let Some(node) = queue.pop_front() {
            buffer.clear();
            topology.neighbors(node, &mut buffer);
            for &n in &buffer {
                if n >= owners.len() || !topology.is_land(n) || !visited.insert(n) {
                    continue;
                }
                if let Some(t) = owners[n] {
                    found = Some(t);
                    break 'search;
                }
                queue.push_back(n);
            }
        }

        if found.is_some() {
            owners[start] = found;
            filled += 1;
            continue;
        }

        // поиск обошёл весь участок суши: занятых узлов там нет ни для одного из них
        for node in visited {
            owners[node] = nearest_capital(topology, capitals, node);
            filled += 1;
        }
    }

    filled
}

fn nearest_capital<T: Topology>(topology: &T, capitals: &[usize], node: usize) -> Option<usize> {
    let (x, y) = topology.position(node);
    capitals
        .iter()
        .enumerate()
        .map(|(t, &c)| {
            let (cx, cy) = topology.position(c);
            (t, (cx - x).hypot(cy - y))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(t, _)| t)
}
