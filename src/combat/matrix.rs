//! Damage class × armor class multiplier table.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{MAX_TYPE_MULTIPLIER, UNKNOWN_COMBINATION_MULTIPLIER};
use crate::error::DataError;
use crate::stats::{ArmorClass, DamageClass};

const ROWS: usize = DamageClass::ALL.len();
const COLS: usize = ArmorClass::ALL.len();

/// Standard table, rows in [`DamageClass::ALL`] order, columns in
/// [`ArmorClass::ALL`] order (Unarmored, Light, Medium, Heavy, Fortified,
/// Hero, Divine).
const STANDARD: [[f32; COLS]; ROWS] = [
    // Normal
    [1.00, 1.00, 1.00, 1.00, 0.70, 1.00, 0.05],
    // Piercing
    [1.50, 2.00, 0.75, 1.00, 0.35, 0.50, 0.05],
    // Siege
    [1.50, 1.00, 0.50, 1.00, 1.50, 0.50, 0.05],
    // Magic
    [1.00, 1.25, 0.75, 2.00, 0.35, 0.50, 0.05],
    // Chaos
    [1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00],
    // Hero
    [1.00, 1.00, 1.00, 1.00, 0.50, 1.00, 0.05],
];

/// One row of a data-loaded table; missing cells are allowed and fall back
/// to a neutral multiplier at lookup time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub damage: DamageClass,
    pub armor: ArmorClass,
    pub multiplier: f32,
}

/// Immutable multiplier table, built once and shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageMatrix {
    cells: [[Option<f32>; COLS]; ROWS],
}

impl Default for DamageMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

impl DamageMatrix {
    pub fn standard() -> Self {
        let mut cells = [[None; COLS]; ROWS];
        for (row, values) in STANDARD.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                cells[row][col] = Some(*value);
            }
        }
        Self { cells }
    }

    /// Build from explicit entries. Every value must lie in `[0, 2]`.
    pub fn from_entries(entries: &[MatrixEntry]) -> Result<Self, DataError> {
        let mut cells = [[None; COLS]; ROWS];
        for entry in entries {
            if !(0.0..=MAX_TYPE_MULTIPLIER).contains(&entry.multiplier) {
                return Err(DataError::MultiplierOutOfRange {
                    damage: entry.damage,
                    armor: entry.armor,
                    value: entry.multiplier,
                });
            }
            cells[entry.damage.index()][entry.armor.index()] = Some(entry.multiplier);
        }
        Ok(Self { cells })
    }

    /// Parse a RON list of [`MatrixEntry`]
    pub fn from_ron_str(source: &str) -> Result<Self, DataError> {
        let entries: Vec<MatrixEntry> = ron::from_str(source)?;
        Self::from_entries(&entries)
    }

    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// Raw cell, `None` if the table has no entry for the pair
    pub fn get(&self, damage: DamageClass, armor: ArmorClass) -> Option<f32> {
        self.cells[damage.index()][armor.index()]
    }

    /// Cell value, or 1.0 with a warning when the pair is missing
    pub fn multiplier(&self, damage: DamageClass, armor: ArmorClass) -> f32 {
        match self.get(damage, armor) {
            Some(value) => value,
            None => {
                tracing::warn!(
                    ?damage,
                    ?armor,
                    "unknown damage/armor combination, using neutral multiplier"
                );
                UNKNOWN_COMBINATION_MULTIPLIER
            }
        }
    }

    pub fn entries(&self) -> Vec<MatrixEntry> {
        let mut out = Vec::with_capacity(ROWS * COLS);
        for damage in DamageClass::ALL {
            for armor in ArmorClass::ALL {
                if let Some(multiplier) = self.get(damage, armor) {
                    out.push(MatrixEntry {
                        damage,
                        armor,
                        multiplier,
                    });
                }
            }
        }
        out
    }
}
