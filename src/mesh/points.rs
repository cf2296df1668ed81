use crate::mesh::{Point, polygon_centroid, tessellate};
use crate::random::SeededRandom;

/// Отступ от края холста: центроиды прижимаются внутрь, а не на границу.
const EDGE_INSET: f64 = 1e-3;

/// Генерирует `count` точек, почти равномерно распределённых по холсту.
///
/// Сначала `count` равномерно случайных точек (по два значения из потока на точку: x, затем y),
/// затем `iterations` раундов релаксации Ллойда: каждая точка переносится в центроид своей
/// ячейки Вороного. Два раунда дают равномерность, сохраняя органическую неровность.
#[must_use]
pub fn relaxed_points(
    count: usize,
    width: f64,
    height: f64,
    rng: &mut SeededRandom,
    iterations: usize,
) -> Vec<Point> {
    let mut points: Vec<Point> = (0..count)
        .map(|_| {
            let x = rng.next_f64() * width;
            let y = rng.next_f64() * height;
            Point::new(x, y)
        })
        .collect();

    if width <= 0.0 || height <= 0.0 {
        return points;
    }

    for _ in 0..iterations {
        let tessellation = tessellate(&points, width, height);
        points = points
            .iter()
            .zip(&tessellation.polygons)
            .map(|(&p, polygon)| match polygon_centroid(polygon) {
                Some(c) if c.is_finite() => clamp_to_canvas(c, width, height),
                _ => p,
            })
            .collect();
    }

    points
}

fn clamp_to_canvas(p: Point, width: f64, height: f64) -> Point {
    let inset_x = EDGE_INSET.min(width / 2.0);
    let inset_y = EDGE_INSET.min(height / 2.0);
    Point::new(
        p.x.clamp(inset_x, width - inset_x),
        p.y.clamp(inset_y, height - inset_y),
    )
}
