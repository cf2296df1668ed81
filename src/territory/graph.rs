use crate::map::Cell;
use crate::territory::{Territory, cell_owners};
use petgraph::graph::UnGraph;
use std::collections::HashSet;

/// Граф соседства государств: узел на каждое государство (вес — его id),
/// ребро — если хотя бы одна пара их ячеек соседствует.
#[must_use]
pub fn build_territory_graph(cells: &[Cell], territories: &[Territory]) -> UnGraph<u32, ()> {
    let mut graph = UnGraph::new_undirected();
    let nodes: Vec<_> = territories
        .iter()
        .map(|t| graph.add_node(t.id as u32))
        .collect();

    let owners = cell_owners(cells.len(), territories);
    let mut edges = HashSet::new();

    for (i, cell) in cells.iter().enumerate() {
        let Some(a) = owners[i] else { continue };
        for &n in &cell.neighbors {
            let Some(b) = owners.get(n).copied().flatten() else {
                continue;
            };
            if a == b {
                continue;
            }
            let (a, b) = if a < b { (a, b) } else { (b, a) };
            if edges.insert((a, b)) {
                graph.add_edge(nodes[a], nodes[b], ());
            }
        }
    }
    graph
}
