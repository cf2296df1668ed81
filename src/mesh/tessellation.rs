use std::collections::BTreeSet;

use voronoice::{BoundingBox, VoronoiBuilder};

use crate::mesh::Point;

/// Многоугольник Вороного и список соседей для каждой точки.
#[derive(Debug, Clone, Default)]
pub struct Tessellation {
    pub polygons: Vec<Vec<Point>>,
    pub neighbors: Vec<Vec<usize>>,
}

impl Tessellation {
    /// Разбиение без триангуляции: одна точка занимает весь холст, у остальных нет области.
    fn disconnected(count: usize, width: f64, height: f64) -> Self {
        let mut polygons = vec![Vec::new(); count];
        if count == 1 && width > 0.0 && height > 0.0 {
            polygons[0] = canvas_rect(width, height);
        }
        Self {
            polygons,
            neighbors: vec![Vec::new(); count],
        }
    }

    /// Две точки делят холст серединным перпендикуляром.
    fn split_pair(a: Point, b: Point, width: f64, height: f64) -> Self {
        if width <= 0.0 || height <= 0.0 || a.distance(b) <= f64::EPSILON {
            return Self::disconnected(2, width, height);
        }
        let rect = canvas_rect(width, height);
        let polygons = vec![clip_nearer(&rect, a, b), clip_nearer(&rect, b, a)];
        let neighbors = if polygons.iter().all(|p| !p.is_empty()) {
            vec![vec![1], vec![0]]
        } else {
            vec![Vec::new(), Vec::new()]
        };
        Self { polygons, neighbors }
    }
}

fn canvas_rect(width: f64, height: f64) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(width, height),
        Point::new(0.0, height),
    ]
}

/// Часть выпуклого многоугольника, которая ближе к `near`, чем к `far`.
///
/// Разность квадратов расстояний до двух точек аффинна, поэтому точка пересечения
/// ребра с перпендикуляром находится линейной интерполяцией.
fn clip_nearer(polygon: &[Point], near: Point, far: Point) -> Vec<Point> {
    let side = |p: Point| p.distance(far).powi(2) - p.distance(near).powi(2);
    let mut clipped = Vec::with_capacity(polygon.len() + 1);
    for (i, &current) in polygon.iter().enumerate() {
        let next = polygon[(i + 1) % polygon.len()];
        let (sc, sn) = (side(current), side(next));
        if sc >= 0.0 {
            clipped.push(current);
        }
        if (sc > 0.0 && sn < 0.0) || (sc < 0.0 && sn > 0.0) {
            clipped.push(current.lerp(next, sc / (sc - sn)));
        }
    }
    if clipped.len() < 3 { Vec::new() } else { clipped }
}

/// Строит диаграмму Вороного, обрезанную по прямоугольнику `[0, width] × [0, height]`.
///
/// Соседство берётся из рёбер триангуляции Делоне, поэтому оно симметрично по построению.
/// Многоугольники с менее чем тремя корректными вершинами остаются пустыми.
#[must_use]
pub fn tessellate(points: &[Point], width: f64, height: f64) -> Tessellation {
    if let [a, b] = points {
        return Tessellation::split_pair(*a, *b, width, height);
    }
    if points.len() < 3 || width <= 0.0 || height <= 0.0 {
        return Tessellation::disconnected(points.len(), width, height);
    }

    let sites: Vec<voronoice::Point> = points
        .iter()
        .map(|p| voronoice::Point { x: p.x, y: p.y })
        .collect();

    let center = voronoice::Point {
        x: width / 2.0,
        y: height / 2.0,
    };
    let Some(voronoi) = VoronoiBuilder::default()
        .set_sites(sites)
        .set_bounding_box(BoundingBox::new(center, width, height))
        .set_lloyd_relaxation_iterations(0)
        .build()
    else {
        log::warn!(
            "Триангуляция {} точек не удалась, ячейки останутся без соседей",
            points.len()
        );
        return Tessellation::disconnected(points.len(), width, height);
    };

    let mut neighbor_sets = vec![BTreeSet::new(); points.len()];
    for triangle in voronoi.triangulation().triangles.chunks_exact(3) {
        for (a, b) in [
            (triangle[0], triangle[1]),
            (triangle[1], triangle[2]),
            (triangle[2], triangle[0]),
        ] {
            if a != b && a < points.len() && b < points.len() {
                neighbor_sets[a].insert(b);
                neighbor_sets[b].insert(a);
            }
        }
    }

    let site_count = voronoi.sites().len();
    let polygons = (0..points.len())
        .map(|i| {
            if i >= site_count {
                return Vec::new();
            }
            let polygon: Vec<Point> = voronoi
                .cell(i)
                .iter_vertices()
                .map(|v| Point::new(v.x, v.y))
                .filter(|p| in_bounds(*p, width, height))
                .collect();
            if polygon.len() < 3 { Vec::new() } else { polygon }
        })
        .collect();

    Tessellation {
        polygons,
        neighbors: neighbor_sets
            .into_iter()
            .map(|s| s.into_iter().collect())
            .collect(),
    }
}

fn in_bounds(p: Point, width: f64, height: f64) -> bool {
    const SLACK: f64 = 1e-6;
    p.is_finite()
        && p.x >= -SLACK
        && p.y >= -SLACK
        && p.x <= width + SLACK
        && p.y <= height + SLACK
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points(n: usize, step: f64) -> Vec<Point> {
        let mut points = Vec::new();
        for y in 0..n {
            for x in 0..n {
                // Лёгкий сдвиг, чтобы избежать вырожденных четвёрок на одной окружности
                let jitter = ((x * 7 + y * 13) % 5) as f64 * 0.01;
                points.push(Point::new(
                    (x as f64 + 0.5) * step + jitter,
                    (y as f64 + 0.5) * step - jitter,
                ));
            }
        }
        points
    }

    #[test]
    fn adjacency_is_symmetric() {
        let points = grid_points(6, 10.0);
        let t = tessellate(&points, 60.0, 60.0);
        assert_eq!(t.neighbors.len(), points.len());
        for (a, list) in t.neighbors.iter().enumerate() {
            assert!(!list.contains(&a));
            for &b in list {
                assert!(t.neighbors[b].contains(&a), "{a} -> {b} без обратного ребра");
            }
        }
    }

    #[test]
    fn polygons_are_clipped_to_canvas() {
        let points = grid_points(5, 20.0);
        let t = tessellate(&points, 100.0, 100.0);
        for polygon in &t.polygons {
            assert!(polygon.len() >= 3);
            for p in polygon {
                assert!(in_bounds(*p, 100.0, 100.0));
            }
        }
    }

    #[test]
    fn tiny_inputs_do_not_panic() {
        assert!(tessellate(&[], 100.0, 100.0).polygons.is_empty());

        let single = tessellate(&[Point::new(5.0, 5.0)], 10.0, 10.0);
        assert_eq!(single.polygons[0].len(), 4);
        assert!(single.neighbors[0].is_empty());

        let same = tessellate(&[Point::new(1.0, 1.0), Point::new(1.0, 1.0)], 10.0, 10.0);
        assert!(same.polygons.iter().all(Vec::is_empty));
        assert!(same.neighbors.iter().all(Vec::is_empty));

        let flat = tessellate(&grid_points(3, 1.0), 0.0, 10.0);
        assert!(flat.polygons.iter().all(Vec::is_empty));
    }

    #[test]
    fn two_points_split_the_canvas_in_half() {
        let pair = tessellate(&[Point::new(25.0, 40.0), Point::new(75.0, 60.0)], 100.0, 100.0);
        assert_eq!(pair.neighbors, vec![vec![1], vec![0]]);

        let area = |polygon: &[Point]| {
            polygon
                .iter()
                .zip(polygon.iter().cycle().skip(1))
                .map(|(a, b)| a.x * b.y - b.x * a.y)
                .sum::<f64>()
                .abs()
                / 2.0
        };
        let (left, right) = (&pair.polygons[0], &pair.polygons[1]);
        assert!(left.len() >= 3 && right.len() >= 3);
        assert!((area(left) + area(right) - 10_000.0).abs() < 1e-6);

        let a = Point::new(25.0, 40.0);
        let b = Point::new(75.0, 60.0);
        for p in left {
            assert!(p.distance(a) <= p.distance(b) + 1e-9);
        }
        for p in right {
            assert!(p.distance(b) <= p.distance(a) + 1e-9);
        }
    }
}
