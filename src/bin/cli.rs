use atlasgen::render::{render_grid, render_map, save_png};
use atlasgen::{GenerationParams, GridParams, generate_grid_world_with, generate_map_with};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Ячейки Вороного
    Cells,
    /// Регулярная сетка высот
    Grid,
}

/// Генератор фэнтезийных карт
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Сид (перекрывает значение из конфигурации)
    #[arg(short, long)]
    seed: Option<String>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Число ячеек (только для режима cells)
    #[arg(long)]
    cells: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = Mode::Cells)]
    mode: Mode,

    /// Путь для сохранения JSON с картой
    #[arg(short, long, default_value = "map.json")]
    output: PathBuf,

    /// Путь для PNG-превью (по умолчанию не сохраняется)
    #[arg(long)]
    png: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.mode {
        Mode::Cells => run_cells(&cli),
        Mode::Grid => run_grid(&cli),
    }
}

fn run_cells(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut params = match &cli.config {
        Some(path) => {
            println!("🔍 Загрузка конфигурации...");
            GenerationParams::from_toml_file(path)?
        }
        None => GenerationParams::default(),
    };
    if let Some(seed) = &cli.seed {
        params.seed.clone_from(seed);
    }
    params.width = cli.width.unwrap_or(params.width);
    params.height = cli.height.unwrap_or(params.height);
    params.num_cells = cli.cells.unwrap_or(params.num_cells);

    println!(
        "🗺️ Генерация карты '{}' ({}×{}, {} ячеек)...",
        params.seed, params.width, params.height, params.num_cells
    );
    let map = generate_map_with(&params);
    map.validate()?;

    println!("💾 Сохранение в {}", cli.output.display());
    map.save_json(&cli.output)?;

    if let Some(png) = &cli.png {
        println!("🖼️ Превью в {}", png.display());
        save_png(&render_map(&map), png)?;
    }

    let graph = map.territory_graph();
    println!("\n✅ Готово!");
    println!("   Ячеек: {}", map.cells.len());
    println!("   Суша: {}", map.land_cells().count());
    println!("   Рек: {}", map.rivers.len());
    println!("   Государств: {}", map.territories.len());
    println!("   Соседств государств: {}", graph.edge_count());
    Ok(())
}

fn run_grid(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut params = match &cli.config {
        Some(path) => {
            println!("🔍 Загрузка конфигурации...");
            GridParams::from_toml_file(path)?
        }
        None => GridParams::default(),
    };
    if let Some(seed) = &cli.seed {
        params.seed.clone_from(seed);
    }
    params.width = cli.width.unwrap_or(params.width);
    params.height = cli.height.unwrap_or(params.height);

    println!(
        "🗺️ Генерация сетки '{}' ({}×{}, шаг {})...",
        params.seed, params.width, params.height, params.resolution
    );
    let world = generate_grid_world_with(&params);

    println!("💾 Сохранение в {}", cli.output.display());
    fs::write(&cli.output, serde_json::to_string(&world)?)?;

    if let Some(png) = &cli.png {
        println!("🖼️ Превью в {}", png.display());
        save_png(&render_grid(&world), png)?;
    }

    println!("\n✅ Готово!");
    println!("   Сетка: {}×{}", world.map_width, world.map_height);
    println!("   Суша: {}", world.owners.iter().filter(|o| o.is_some()).count());
    println!("   Государств: {}", world.states.len());
    Ok(())
}
