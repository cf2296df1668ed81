//! Растровое превью карты
//!
//! Основной потребитель карты рисует её векторно; здесь только быстрый просмотр результата:
//! - ячейки заливаются цветом биома
//! - реки рисуются отрезками между центрами ячеек
//! - поверх кладутся границы государств и побережья

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;

use crate::biome::hex_to_rgb;
use crate::boundary::Polyline;
use crate::error::MapgenError;
use crate::heightmap::GridWorld;
use crate::map::Map;
use crate::mesh::Point;

const BACKGROUND: Rgb<u8> = Rgb([0x85, 0xb3, 0xd1]);
const RIVER: Rgb<u8> = Rgb([0x4a, 0x7b, 0xa7]);
const COAST: Rgb<u8> = Rgb([0x3a, 0x5f, 0x7d]);

/// Рисует карту ячеек в изображение размером с холст.
#[must_use]
pub fn render_map(map: &Map) -> RgbImage {
    let mut img = ImageBuffer::from_pixel(map.width.max(1), map.height.max(1), BACKGROUND);

    for cell in &map.cells {
        let vertices = pixel_polygon(&cell.polygon);
        if vertices.len() < 3 {
            continue;
        }
        draw_polygon_mut(&mut img, &vertices, Rgb(cell.biome.to_rgb()));
    }

    for river in &map.rivers {
        for pair in river.path.windows(2) {
            let (Some(a), Some(b)) = (map.cells.get(pair[0]), map.cells.get(pair[1])) else {
                continue;
            };
            draw_line_segment_mut(
                &mut img,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                RIVER,
            );
        }
    }

    for border in &map.borders {
        let color = map
            .territories
            .iter()
            .find(|t| t.id == border.territory)
            .and_then(|t| hex_to_rgb(&t.color))
            .map_or(Rgb([0, 0, 0]), |[r, g, b]| Rgb([r / 2, g / 2, b / 2]));
        for path in &border.paths {
            draw_polyline(&mut img, path, color);
        }
    }

    for coast in &map.coastlines {
        draw_polyline(&mut img, coast, COAST);
    }

    for territory in &map.territories {
        if let Some(capital) = map.cells.get(territory.capital) {
            draw_filled_circle_mut(&mut img, (capital.x as i32, capital.y as i32), 3, Rgb([0, 0, 0]));
        }
    }

    img
}

/// Рисует сетку: каждая точка закрашивает свой квадрат `resolution × resolution`.
#[must_use]
pub fn render_grid(world: &GridWorld) -> RgbImage {
    let resolution = world.resolution.max(1);
    ImageBuffer::from_fn(world.width.max(1), world.height.max(1), |x, y| {
        let (gx, gy) = (x / resolution, y / resolution);
        if gx >= world.map_width || gy >= world.map_height {
            return BACKGROUND;
        }
        hex_to_rgb(world.color_at(gx, gy)).map_or(BACKGROUND, Rgb)
    })
}

pub fn save_png(img: &RgbImage, path: impl AsRef<Path>) -> Result<(), MapgenError> {
    img.save(path)?;
    Ok(())
}

/// Вершины в пикселях без повторов подряд и без замыкающей копии первой точки:
/// `draw_polygon_mut` не принимает совпадающие первую и последнюю вершины.
fn pixel_polygon(polygon: &[Point]) -> Vec<PixelPoint<i32>> {
    let mut vertices: Vec<PixelPoint<i32>> = Vec::with_capacity(polygon.len());
    for p in polygon.iter().filter(|p| p.is_finite()) {
        let v = PixelPoint::new(p.x.round() as i32, p.y.round() as i32);
        if vertices.last() != Some(&v) {
            vertices.push(v);
        }
    }
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}

fn draw_polyline(img: &mut RgbImage, line: &Polyline, color: Rgb<u8>) {
    for pair in line.points.windows(2) {
        draw_line_segment_mut(
            img,
            (pair[0].x as f32, pair[0].y as f32),
            (pair[1].x as f32, pair[1].y as f32),
            color,
        );
    }
}
