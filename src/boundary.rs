//! Трассировка побережий и границ государств
//!
//! Рёбра многоугольников ячеек собираются в непрерывные ломаные для векторной отрисовки.
//! Побережья дополнительно дробятся и слегка смещаются шумом, чтобы линия не повторяла
//! прямые рёбра разбиения. Сам модуль ничего не рисует.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::BoundarySettings;
use crate::map::Cell;
use crate::mesh::{CellEdge, Point, polygon_edges};
use crate::noise::Noise2D;
use crate::random::SeededRandom;
use crate::territory::{Territory, cell_owners};

/// Шаг квантования координат при сопоставлении концов рёбер
const KEY_QUANTUM: f64 = 1e-4;

/// Ломаная; у замкнутой последняя точка совпадает с первой (с точностью допуска).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Контуры одного государства
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryBorder {
    pub territory: usize,
    pub paths: Vec<Polyline>,
}

fn edges_of(cells: &[Cell], cell: &Cell) -> Vec<CellEdge> {
    polygon_edges(cell.position(), &cell.polygon, &cell.neighbors, |n| {
        cells.get(n).map(Cell::position)
    })
}

/// Побережья: каждое ребро суши, граничащее с океаном или озером.
///
/// На каждое ребро из потока извлекается число промежуточных точек
/// (`min_subdivisions..=max_subdivisions`); ячейки и рёбра обходятся по порядку индексов.
/// Смещение точек поперёк ребра задаётся шумом, поэтому концы рёбер остаются общими.
pub fn trace_coastlines<N: Noise2D>(
    cells: &[Cell],
    settings: &BoundarySettings,
    rng: &mut SeededRandom,
    noise: &N,
) -> Vec<Polyline> {
    let (lo, hi) = (
        settings.min_subdivisions.min(settings.max_subdivisions),
        settings.min_subdivisions.max(settings.max_subdivisions),
    );

    let mut segments = Vec::new();
    for cell in cells.iter().filter(|c| c.is_land()) {
        for edge in edges_of(cells, cell) {
            let faces_water = edge
                .neighbor
                .and_then(|n| cells.get(n))
                .is_some_and(Cell::is_water);
            if !faces_water {
                continue;
            }
            let pieces = rng.gen_range(lo..=hi);
            segments.push(subdivide(edge.a, edge.b, pieces, settings, noise));
        }
    }

    let lines = stitch(segments, settings.loop_tolerance, settings.max_iterations);
    log::debug!("Побережья: {} линий", lines.len());
    lines
}

/// Ребро `a → b` с `pieces` промежуточными точками, смещёнными по нормали.
fn subdivide<N: Noise2D>(
    a: Point,
    b: Point,
    pieces: usize,
    settings: &BoundarySettings,
    noise: &N,
) -> Vec<Point> {
    let length = a.distance(b);
    let mut points = Vec::with_capacity(pieces + 2);
    points.push(a);

    if length > f64::EPSILON {
        let normal = Point::new(-(b.y - a.y) / length, (b.x - a.x) / length);
        for j in 1..=pieces {
            let p = a.lerp(b, j as f64 / (pieces + 1) as f64);
            let offset = noise.noise2d(p.x * settings.jitter_frequency, p.y * settings.jitter_frequency)
                * settings.jitter
                * length;
            points.push(Point::new(p.x + normal.x * offset, p.y + normal.y * offset));
        }
    }

    points.push(b);
    points
}

/// Контуры государств: рёбра ячеек, за которыми другое государство, вода или край холста.
#[must_use]
pub fn trace_borders(
    cells: &[Cell],
    territories: &[Territory],
    settings: &BoundarySettings,
) -> Vec<TerritoryBorder> {
    let owners = cell_owners(cells.len(), territories);

    territories
        .iter()
        .map(|territory| {
            let segments: Vec<Vec<Point>> = territory
                .cells
                .iter()
                .filter_map(|&id| cells.get(id))
                .flat_map(|cell| edges_of(cells, cell))
                .filter(|edge| {
                    let other = edge.neighbor.and_then(|n| owners.get(n).copied().flatten());
                    other != Some(territory.id)
                })
                .map(|edge| vec![edge.a, edge.b])
                .collect();

            TerritoryBorder {
                territory: territory.id,
                paths: stitch(segments, settings.loop_tolerance, settings.max_iterations),
            }
        })
        .collect()
}

fn key(p: Point) -> (i64, i64) {
    (
        (p.x / KEY_QUANTUM).round() as i64,
        (p.y / KEY_QUANTUM).round() as i64,
    )
}

/// Сшивает отрезки-ломаные в максимальные связные пути по общим концам.
///
/// Путь растёт от произвольного (первого свободного) отрезка сначала вперёд, затем назад,
/// пока есть продолжение, пока путь не замкнётся (возврат к началу ближе `tolerance`)
/// или пока не исчерпан предел `max_iterations`. Предел превращает испорченные данные
/// смежности в укороченный результат вместо бесконечного обхода.
#[must_use]
pub fn stitch(segments: Vec<Vec<Point>>, tolerance: f64, max_iterations: usize) -> Vec<Polyline> {
    let segments: Vec<Vec<Point>> = segments
        .into_iter()
        .filter(|s| s.len() >= 2 && s.iter().all(|p| p.is_finite()))
        .collect();

    let by_endpoint = index_endpoints(&segments);
    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let (line, capped) = grow_path(&segments, &by_endpoint, &mut used, start, tolerance, max_iterations);
        if capped {
            log::warn!("Сшивание пути остановлено пределом в {max_iterations} шагов");
        }
        lines.push(line);
    }

    lines
}

/// Наращивает путь от отрезка `start`. Второе значение — `true`, если путь оборвал
/// предел шагов, а продолжение ещё оставалось.
fn grow_path(
    segments: &[Vec<Point>],
    by_endpoint: &HashMap<(i64, i64), Vec<usize>>,
    used: &mut [bool],
    start: usize,
    tolerance: f64,
    max_iterations: usize,
) -> (Polyline, bool) {
    let mut points = segments[start].clone();
    let mut joined = 1;
    let mut closed = false;
    let mut capped = false;
    let mut steps = 0;

    // вперёд от конца
    loop {
        let Some(tail) = points.last().copied() else { break };
        if !has_continuation(by_endpoint, used, tail) {
            break;
        }
        if steps >= max_iterations {
            capped = true;
            break;
        }
        let Some(next) = take_continuation(segments, by_endpoint, used, tail) else {
            break;
        };
        steps += 1;
        points.extend(next.into_iter().skip(1));
        joined += 1;
        if joined >= 3 && closes(&points, tolerance) {
            closed = true;
            break;
        }
    }

    // назад от начала
    while !closed && !capped {
        let head = points[0];
        if !has_continuation(by_endpoint, used, head) {
            break;
        }
        if steps >= max_iterations {
            capped = true;
            break;
        }
        let Some(prev) = take_continuation(segments, by_endpoint, used, head) else {
            break;
        };
        steps += 1;
        let mut extended: Vec<Point> = prev.into_iter().rev().collect();
        extended.pop();
        extended.append(&mut points);
        points = extended;
        joined += 1;
        if joined >= 3 && closes(&points, tolerance) {
            closed = true;
        }
    }

    (Polyline { points, closed }, capped)
}

/// Концы отрезков → индексы отрезков. Отрезки должны содержать хотя бы две точки.
fn index_endpoints(segments: &[Vec<Point>]) -> HashMap<(i64, i64), Vec<usize>> {
    let mut by_endpoint: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, segment) in segments.iter().enumerate() {
        by_endpoint.entry(key(segment[0])).or_default().push(i);
        by_endpoint
            .entry(key(segment[segment.len() - 1]))
            .or_default()
            .push(i);
    }
    by_endpoint
}

fn has_continuation(by_endpoint: &HashMap<(i64, i64), Vec<usize>>, used: &[bool], at: Point) -> bool {
    by_endpoint
        .get(&key(at))
        .is_some_and(|ids| ids.iter().any(|&i| !used[i]))
}

/// Первый свободный отрезок, касающийся `at`, развёрнутый так, чтобы начинаться в `at`.
fn take_continuation(
    segments: &[Vec<Point>],
    by_endpoint: &HashMap<(i64, i64), Vec<usize>>,
    used: &mut [bool],
    at: Point,
) -> Option<Vec<Point>> {
    let at_key = key(at);
    let candidate = by_endpoint
        .get(&at_key)?
        .iter()
        .copied()
        .find(|&i| !used[i])?;
    used[candidate] = true;

    let segment = &segments[candidate];
    if key(segment[0]) == at_key {
        Some(segment.clone())
    } else {
        Some(segment.iter().rev().copied().collect())
    }
}

fn closes(points: &[Point], tolerance: f64) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => first.distance(*last) < tolerance,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: (f64, f64), b: (f64, f64)) -> Vec<Point> {
        vec![Point::new(a.0, a.1), Point::new(b.0, b.1)]
    }

    #[test]
    fn square_edges_close_into_a_loop() {
        // Отрезки в перемешанном порядке и с разной ориентацией
        let segments = vec![
            seg((0.0, 0.0), (10.0, 0.0)),
            seg((10.0, 10.0), (0.0, 10.0)),
            seg((10.0, 10.0), (10.0, 0.0)),
            seg((0.0, 10.0), (0.0, 0.0)),
        ];
        let lines = stitch(segments, 1.0, 100);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].closed);
        assert_eq!(lines[0].points.len(), 5);
        assert_eq!(lines[0].points.first(), lines[0].points.last());
    }

    #[test]
    fn open_chain_extends_both_ways() {
        let segments = vec![
            seg((1.0, 0.0), (2.0, 0.0)),
            seg((0.0, 0.0), (1.0, 0.0)),
            seg((2.0, 0.0), (3.0, 0.0)),
        ];
        let lines = stitch(segments, 0.1, 100);
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].closed);
        let xs: Vec<f64> = lines[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn disjoint_pieces_stay_separate() {
        let segments = vec![seg((0.0, 0.0), (1.0, 0.0)), seg((5.0, 5.0), (6.0, 5.0))];
        assert_eq!(stitch(segments, 0.1, 100).len(), 2);
    }

    #[test]
    fn iteration_cap_truncates_instead_of_hanging() {
        let segments: Vec<_> = (0..50)
            .map(|i| seg((f64::from(i), 0.0), (f64::from(i + 1), 0.0)))
            .collect();
        let lines = stitch(segments, 0.1, 5);
        assert!(lines.len() > 1);
        let total: usize = lines.iter().map(|l| l.points.len() - 1).sum();
        assert_eq!(total, 50);
    }

    fn line_of(count: u32) -> Vec<Vec<Point>> {
        (0..count)
            .map(|i| seg((f64::from(i), 0.0), (f64::from(i + 1), 0.0)))
            .collect()
    }

    fn grow_from_first(segments: &[Vec<Point>], max_iterations: usize) -> (Polyline, bool) {
        let by_endpoint = index_endpoints(segments);
        let mut used = vec![false; segments.len()];
        used[0] = true;
        grow_path(segments, &by_endpoint, &mut used, 0, 0.1, max_iterations)
    }

    #[test]
    fn path_ending_on_the_last_allowed_step_is_not_capped() {
        // первый отрезок + ровно 5 присоединений
        let (line, capped) = grow_from_first(&line_of(6), 5);
        assert!(!capped);
        assert_eq!(line.points.len(), 7);
    }

    #[test]
    fn path_with_remaining_segments_is_capped() {
        let (line, capped) = grow_from_first(&line_of(7), 5);
        assert!(capped);
        assert_eq!(line.points.len(), 7);
    }

    #[test]
    fn malformed_segments_are_skipped() {
        let segments = vec![
            vec![Point::new(0.0, 0.0)],
            vec![Point::new(f64::NAN, 0.0), Point::new(1.0, 1.0)],
            seg((0.0, 0.0), (1.0, 0.0)),
        ];
        assert_eq!(stitch(segments, 0.1, 100).len(), 1);
    }

    struct Constant(f64);

    impl Noise2D for Constant {
        fn noise2d(&self, _x: f64, _y: f64) -> f64 {
            self.0
        }
    }

    #[test]
    fn subdivision_keeps_endpoints_and_offsets_interior() {
        let settings = BoundarySettings::default();
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let points = subdivide(a, b, 3, &settings, &Constant(1.0));
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], a);
        assert_eq!(points[4], b);
        for p in &points[1..4] {
            assert!((p.y - settings.jitter * 10.0).abs() < 1e-9);
        }
    }

    /// Сетка 3×3 квадратов 10×10 (индекс = строка * 3 + столбец), соседство по сторонам.
    fn square_grid(water: &[usize]) -> Vec<Cell> {
        (0..9)
            .map(|i| {
                let (col, row) = (i % 3, i / 3);
                let (x0, y0) = (col as f64 * 10.0, row as f64 * 10.0);
                let polygon = vec![
                    Point::new(x0, y0),
                    Point::new(x0 + 10.0, y0),
                    Point::new(x0 + 10.0, y0 + 10.0),
                    Point::new(x0, y0 + 10.0),
                ];
                let mut neighbors = Vec::new();
                if col > 0 {
                    neighbors.push(i - 1);
                }
                if col < 2 {
                    neighbors.push(i + 1);
                }
                if row > 0 {
                    neighbors.push(i - 3);
                }
                if row < 2 {
                    neighbors.push(i + 3);
                }
                let mut cell = Cell::new(i, Point::new(x0 + 5.0, y0 + 5.0), polygon, neighbors);
                cell.is_ocean = water.contains(&i);
                cell.elevation = if cell.is_ocean { -0.5 } else { 0.2 };
                cell
            })
            .collect()
    }

    fn coastlines_of(cells: &[Cell]) -> Vec<Polyline> {
        let mut rng = SeededRandom::from_seed_str("coast");
        trace_coastlines(cells, &BoundarySettings::default(), &mut rng, &Constant(0.0))
    }

    fn on_segment(p: Point, a: Point, b: Point) -> bool {
        (a.distance(p) + p.distance(b) - a.distance(b)).abs() < 1e-9
    }

    /// Рёбра между сушей и водой, найденные прямо по многоугольникам
    fn land_water_edges(cells: &[Cell]) -> Vec<(Point, Point)> {
        cells
            .iter()
            .filter(|c| c.is_land())
            .flat_map(|c| edges_of(cells, c))
            .filter(|e| e.neighbor.is_some_and(|n| cells[n].is_water()))
            .map(|e| (e.a, e.b))
            .collect()
    }

    fn assert_follows_coast(cells: &[Cell], lines: &[Polyline]) {
        let edges = land_water_edges(cells);
        assert!(!edges.is_empty());
        let points: Vec<Point> = lines.iter().flat_map(|l| l.points.iter().copied()).collect();
        for p in &points {
            assert!(edges.iter().any(|&(a, b)| on_segment(*p, a, b)), "{p:?} не на побережье");
        }
        for (a, b) in edges {
            assert!(points.contains(&a) && points.contains(&b), "ребро {a:?}–{b:?} потеряно");
        }
    }

    #[test]
    fn island_coast_is_one_closed_loop() {
        let water: Vec<usize> = (0..9).filter(|&i| i != 4).collect();
        let cells = square_grid(&water);
        let lines = coastlines_of(&cells);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].closed);
        assert_follows_coast(&cells, &lines);
    }

    #[test]
    fn bay_coast_is_an_open_line_along_the_water() {
        let cells = square_grid(&[0]);
        let lines = coastlines_of(&cells);
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].closed);
        assert_follows_coast(&cells, &lines);
        // по 2–3 промежуточные точки на каждое из двух рёбер
        assert!((7..=9).contains(&lines[0].points.len()));
    }

    #[test]
    fn no_water_no_coast() {
        assert!(coastlines_of(&square_grid(&[])).is_empty());
    }

    fn territory(id: usize, cells: Vec<usize>) -> Territory {
        Territory {
            id,
            name: format!("T{id}"),
            color: "#808080".into(),
            capital: cells[0],
            cells,
        }
    }

    fn unordered(a: Point, b: Point) -> ((f64, f64), (f64, f64)) {
        let (a, b) = ((a.x, a.y), (b.x, b.y));
        if a <= b { (a, b) } else { (b, a) }
    }

    fn path_edges(border: &TerritoryBorder) -> Vec<((f64, f64), (f64, f64))> {
        border
            .paths
            .iter()
            .flat_map(|path| path.points.windows(2).map(|w| unordered(w[0], w[1])))
            .collect()
    }

    #[test]
    fn borders_follow_owner_changes_only() {
        let cells = square_grid(&[0]);
        let territories = vec![territory(0, vec![1, 2]), territory(1, vec![3, 4, 5, 6, 7, 8])];
        let borders = trace_borders(&cells, &territories, &BoundarySettings::default());
        assert_eq!(borders.len(), 2);

        let p = Point::new;
        let mut expected = vec![
            unordered(p(10.0, 0.0), p(20.0, 0.0)),
            unordered(p(20.0, 0.0), p(30.0, 0.0)),
            unordered(p(30.0, 0.0), p(30.0, 10.0)),
            unordered(p(30.0, 10.0), p(20.0, 10.0)),
            unordered(p(20.0, 10.0), p(10.0, 10.0)),
            unordered(p(10.0, 10.0), p(10.0, 0.0)),
        ];
        let mut actual = path_edges(&borders[0]);
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        actual.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(actual, expected);
        assert_eq!(borders[0].paths.len(), 1);
        assert!(borders[0].paths[0].closed);

        // внутреннее ребро государства 1 не попадает в контур, общее с государством 0 — попадает
        let second = path_edges(&borders[1]);
        assert!(!second.contains(&unordered(p(10.0, 20.0), p(20.0, 20.0))));
        assert!(second.contains(&unordered(p(10.0, 10.0), p(20.0, 10.0))));
    }
}

