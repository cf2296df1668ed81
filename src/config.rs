// src/config.rs
//! Конфигурация генерации карты
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Размер холста, число ячеек и строковый сид
//! - Рельеф: форма материка, уровень воды, озёра и горные хребты
//! - Климат: температура по широте, влажность, дождевая тень
//! - Реки, биомы, государства и трассировка границ
//!
//! Значения по умолчанию воспроизводят эталонный генератор. Все структуры поддерживают
//! сериализацию в TOML/JSON, частично заполненный файл дополняется значениями по умолчанию.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MapgenError;

/// Параметры рельефа
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainSettings {
    /// Порог уровня моря: ниже него ячейка становится океаном
    pub water_level: f64,
    /// Масштаб расстояния от центра в функции спада материка
    pub falloff_scale: f64,
    /// Показатель степени спада (больше — круче обрыв к краям)
    pub falloff_exponent: f64,
    /// Частота шума, искажающего береговую линию
    pub coast_noise_scale: f64,
    /// Амплитуда шума береговой линии
    pub coast_noise_amplitude: f64,
    /// Вес смещения материка в итоговой высоте
    pub bias_weight: f64,
    /// Насколько ниже уровня воды опускается удалённый одиночный островок
    pub islet_depth: f64,
    /// Высота, до которой поднимается низина, касающаяся океана
    pub lake_shore_elevation: f64,
    /// Минимальная высота начального пика
    pub mountain_threshold: f64,
    /// Порог отдельного горного шума для начального пика
    pub mountain_noise_threshold: f64,
    /// Нижняя граница высоты пика после отметки
    pub mountain_peak_floor: f64,
    /// Минимальная высота ячейки, присоединяемой к хребту
    pub range_threshold: f64,
    /// Нижняя граница высоты присоединённой ячейки
    pub range_floor: f64,
    /// Минимум соседей-гор для присоединения к хребту
    pub range_min_neighbors: usize,
    /// Число проходов расширения хребтов
    pub range_passes: usize,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            water_level: -0.05,
            falloff_scale: 1.8,
            falloff_exponent: 1.5,
            coast_noise_scale: 3.0,
            coast_noise_amplitude: 0.3,
            bias_weight: 0.7,
            islet_depth: 0.1,
            lake_shore_elevation: 0.02,
            mountain_threshold: 0.4,
            mountain_noise_threshold: 0.3,
            mountain_peak_floor: 0.6,
            range_threshold: 0.35,
            range_floor: 0.5,
            range_min_neighbors: 2,
            range_passes: 2,
        }
    }
}

/// Климатические параметры
///
/// Температура: `-1` на северном краю, `+1` на южном, с поправками на высоту и горы.
/// Влажность: шум + близость к побережью + соседство озёр − дождевая тень.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClimateSettings {
    /// Охлаждение на единицу высоты
    pub elevation_cooling: f64,
    /// Дополнительное охлаждение горных ячеек
    pub mountain_cooling: f64,
    /// Частота шума влажности
    pub moisture_noise_scale: f64,
    /// Предел поиска расстояния до берега (в переходах между ячейками)
    pub coast_hop_cap: u32,
    /// Ячейки ближе этого расстояния получают прибрежный бонус
    pub coastal_reach: u32,
    /// Бонус влажности у самой кромки берега
    pub coastal_bonus: f64,
    /// Убывание бонуса на каждый переход от берега
    pub coastal_decay: f64,
    /// Бонус влажности при соседстве с озером
    pub lake_bonus: f64,
    /// Потеря влажности за горой с наветренной (западной) стороны
    pub rain_shadow: f64,
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            elevation_cooling: 0.15,
            mountain_cooling: 0.3,
            moisture_noise_scale: 0.004,
            coast_hop_cap: 10,
            coastal_reach: 5,
            coastal_bonus: 0.5,
            coastal_decay: 0.1,
            lake_bonus: 0.3,
            rain_shadow: 0.4,
        }
    }
}

/// Параметры рек
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiverSettings {
    /// Желаемое число рек (истоков-кандидатов берётся `count * candidate_factor`)
    pub count: usize,
    pub candidate_factor: usize,
    /// Минимальная высота истока
    pub source_elevation: f64,
    /// Предел длины пути
    pub max_steps: usize,
    /// Минимальная длина сохраняемой реки (в ячейках)
    pub min_length: usize,
    /// Прибавка влажности каждой ячейке русла
    pub moisture_bonus: f64,
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            count: 20,
            candidate_factor: 2,
            source_elevation: 0.5,
            max_steps: 300,
            min_length: 9,
            moisture_bonus: 0.2,
        }
    }
}

/// Параметры классификации биомов
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomeSettings {
    /// Число проходов сглаживания несовместимых соседств
    pub smoothing_passes: usize,
    /// Ячейки ниже этой высоты у океана становятся пляжем
    pub beach_elevation: f64,
    /// Пляжей нет там, где температура ниже этого порога
    pub beach_min_temperature: f64,
}

impl Default for BiomeSettings {
    fn default() -> Self {
        Self {
            smoothing_passes: 2,
            beach_elevation: 0.1,
            beach_min_temperature: -0.3,
        }
    }
}

/// Параметры государств
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerritorySettings {
    /// Диапазон числа государств (выбирается случайно, включительно)
    pub min_states: usize,
    pub max_states: usize,
    /// Вероятность присоединить соседнюю ячейку при заливке
    pub expansion_chance: f64,
}

impl Default for TerritorySettings {
    fn default() -> Self {
        Self {
            min_states: 8,
            max_states: 15,
            expansion_chance: 0.75,
        }
    }
}

/// Параметры трассировки побережий и границ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoundarySettings {
    /// Промежуточных точек на каждом ребре побережья (диапазон, включительно)
    pub min_subdivisions: usize,
    pub max_subdivisions: usize,
    /// Амплитуда смещения промежуточных точек в долях длины ребра
    pub jitter: f64,
    /// Частота шума смещения
    pub jitter_frequency: f64,
    /// Расстояние до начала пути, при котором путь считается замкнутым
    pub loop_tolerance: f64,
    /// Жёсткий предел шагов при сшивании одного пути
    pub max_iterations: usize,
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            min_subdivisions: 2,
            max_subdivisions: 3,
            jitter: 0.15,
            jitter_frequency: 0.05,
            loop_tolerance: 1.0,
            max_iterations: 10_000,
        }
    }
}

/// Основные параметры генерации карты
///
/// Полная конфигурация конвейера на ячейках. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationParams {
    /// Строковый сид (детерминированная генерация)
    pub seed: String,

    /// Ширина холста в пикселях (по умолчанию 1200)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота холста в пикселях (по умолчанию 800)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Число ячеек разбиения (по умолчанию 800)
    #[serde(default = "default_num_cells")]
    pub num_cells: usize,

    /// Раундов релаксации Ллойда (по умолчанию 2)
    #[serde(default = "default_relax_iterations")]
    pub relax_iterations: usize,

    #[serde(default)]
    pub terrain: TerrainSettings,

    #[serde(default)]
    pub climate: ClimateSettings,

    #[serde(default)]
    pub rivers: RiverSettings,

    #[serde(default)]
    pub biomes: BiomeSettings,

    #[serde(default)]
    pub territories: TerritorySettings,

    #[serde(default)]
    pub boundaries: BoundarySettings,
}

impl GenerationParams {
    #[must_use]
    pub fn new(seed: impl Into<String>, width: u32, height: u32, num_cells: usize) -> Self {
        Self {
            seed: seed.into(),
            width,
            height,
            num_cells,
            ..Self::default()
        }
    }

    /// Загружает параметры из TOML-файла
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден или содержит недопустимый формат.
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = "abc"
    /// width = 1200
    /// height = 800
    ///
    /// [territories]
    /// min_states = 4
    /// max_states = 6
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MapgenError> {
        let contents = read_file(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, MapgenError> {
        Ok(toml::from_str(contents)?)
    }
}

fn default_width() -> u32 {
    1200
}
fn default_height() -> u32 {
    800
}
fn default_num_cells() -> usize {
    800
}
fn default_relax_iterations() -> usize {
    2
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: String::new(),
            width: 1200,
            height: 800,
            num_cells: 800,
            relax_iterations: 2,
            terrain: TerrainSettings::default(),
            climate: ClimateSettings::default(),
            rivers: RiverSettings::default(),
            biomes: BiomeSettings::default(),
            territories: TerritorySettings::default(),
            boundaries: BoundarySettings::default(),
        }
    }
}

/// Параметры альтернативного конвейера на регулярной сетке
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridParams {
    pub seed: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Пикселей холста на одну точку сетки (меньше — детальнее)
    #[serde(default = "default_resolution")]
    pub resolution: u32,

    /// Уровень воды сетки
    #[serde(default)]
    pub water_level: f64,

    #[serde(default)]
    pub territories: TerritorySettings,
}

impl GridParams {
    #[must_use]
    pub fn new(seed: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            seed: seed.into(),
            width,
            height,
            resolution: default_resolution(),
            water_level: 0.0,
            territories: TerritorySettings::default(),
        }
    }

    /// Загружает параметры сетки из TOML-файла
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MapgenError> {
        Ok(toml::from_str(&read_file(path.as_ref())?)?)
    }
}

impl Default for GridParams {
    fn default() -> Self {
        Self::new(String::new(), default_width(), default_height())
    }
}

fn default_resolution() -> u32 {
    2
}

pub(crate) fn read_file(path: &Path) -> Result<String, MapgenError> {
    fs::read_to_string(path).map_err(|source| MapgenError::Io {
        path: path.to_path_buf(),
        source,
    })
}
