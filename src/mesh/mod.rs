//! Пространственное разбиение холста на ячейки
//!
//! - [`points`] — почти равномерная выборка точек с релаксацией Ллойда
//! - [`tessellation`] — диаграмма Вороного с обрезкой по холсту и граф соседства
//!
//! Ячейки адресуются только индексами: списки соседей, пути рек и состав
//! государств хранят индексы в массиве ячеек карты.

pub mod points;
pub mod tessellation;

use serde::{Deserialize, Serialize};

pub use points::relaxed_points;
pub use tessellation::{Tessellation, tessellate};

/// Точка на холсте (пиксельные координаты).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Центроид многоугольника по площади; для вырожденных — среднее вершин.
#[must_use]
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    if polygon.is_empty() {
        return None;
    }

    let mut area2 = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        let cross = a.x * b.y - b.x * a.y;
        area2 += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }

    if area2.abs() > 1e-9 {
        return Some(Point::new(cx / (3.0 * area2), cy / (3.0 * area2)));
    }

    let n = polygon.len() as f64;
    let (sx, sy) = polygon
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Ребро многоугольника ячейки и ячейка по другую сторону (если есть).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellEdge {
    pub a: Point,
    pub b: Point,
    /// `None` — ребро лежит на границе холста.
    pub neighbor: Option<usize>,
}

/// Рёбра многоугольника ячейки с определением соседа через серединный перпендикуляр:
/// середина общего ребра равноудалена от центров обеих ячеек.
pub fn polygon_edges(
    site: Point,
    polygon: &[Point],
    neighbors: &[usize],
    site_of: impl Fn(usize) -> Option<Point>,
) -> Vec<CellEdge> {
    if polygon.len() < 3 {
        return Vec::new();
    }

    (0..polygon.len())
        .map(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % polygon.len()];
            let mid = a.lerp(b, 0.5);
            let own = mid.distance(site);
            let tolerance = 1e-6 * own.max(1.0);

            let neighbor = neighbors
                .iter()
                .filter_map(|&n| site_of(n).map(|p| (n, (mid.distance(p) - own).abs())))
                .filter(|&(_, diff)| diff < tolerance)
                .min_by(|x, y| x.1.total_cmp(&y.1))
                .map(|(n, _)| n);

            CellEdge { a, b, neighbor }
        })
        .collect()
}
