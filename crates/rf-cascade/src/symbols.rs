//! Symbol definitions

use serde::{Deserialize, Serialize};

use crate::Money;
use crate::grid::WIDTH;

/// Symbol id as stored in grids and reel strips
pub type Symbol = u8;

/// Museum wild
pub const SYMBOL_W: Symbol = 0;
/// Museum scatter
pub const SYMBOL_S: Symbol = 1;
pub const SYMBOL_H1: Symbol = 2;
pub const SYMBOL_H2: Symbol = 3;
pub const SYMBOL_H3: Symbol = 4;
pub const SYMBOL_H4: Symbol = 5;
pub const SYMBOL_L1: Symbol = 6;
pub const SYMBOL_L2: Symbol = 7;
pub const SYMBOL_L3: Symbol = 8;
pub const SYMBOL_L4: Symbol = 9;
pub const SYMBOL_L5: Symbol = 10;

/// Symbol type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SymbolType {
    /// Regular paying symbol
    Regular = 0,
    /// Wild - substitutes for regular symbols
    Wild = 1,
    /// Scatter - triggers the free game regardless of position
    Scatter = 2,
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDef {
    /// Unique symbol id
    pub id: Symbol,
    /// Display name (e.g., "H1", "L3", "W", "S")
    pub name: String,
    /// Symbol type
    pub symbol_type: SymbolType,
    /// Pay per run length, index 0 = 1 of a kind … index 4 = 5 of a kind.
    /// Regular symbols pay per ways unit of bet, the scatter per total bet.
    #[serde(default)]
    pub pays: Vec<Money>,
}

impl SymbolDef {
    /// Create a regular symbol
    pub fn regular(id: Symbol, name: impl Into<String>, pays: [Money; WIDTH]) -> Self {
        Self {
            id,
            name: name.into(),
            symbol_type: SymbolType::Regular,
            pays: pays.to_vec(),
        }
    }

    /// Create a wild symbol
    pub fn wild(id: Symbol, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            symbol_type: SymbolType::Wild,
            pays: Vec::new(),
        }
    }

    /// Create a scatter symbol
    pub fn scatter(id: Symbol, name: impl Into<String>, pays: [Money; WIDTH]) -> Self {
        Self {
            id,
            name: name.into(),
            symbol_type: SymbolType::Scatter,
            pays: pays.to_vec(),
        }
    }

    /// Pay value for a run length / count (0 when not paid)
    pub fn pay(&self, count: usize) -> Money {
        if count == 0 {
            return 0;
        }
        self.pays.get(count - 1).copied().unwrap_or(0)
    }
}

/// The full symbol set of a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSet {
    pub symbols: Vec<SymbolDef>,
}

impl SymbolSet {
    /// The Museum symbol set
    pub fn museum() -> Self {
        let symbols = vec![
            SymbolDef::wild(SYMBOL_W, "W"),
            SymbolDef::scatter(SYMBOL_S, "S", [0, 0, 2, 10, 50]),
            SymbolDef::regular(SYMBOL_H1, "H1", [0, 0, 10, 25, 50]),
            SymbolDef::regular(SYMBOL_H2, "H2", [0, 0, 8, 20, 40]),
            SymbolDef::regular(SYMBOL_H3, "H3", [0, 0, 6, 15, 30]),
            SymbolDef::regular(SYMBOL_H4, "H4", [0, 0, 5, 12, 25]),
            SymbolDef::regular(SYMBOL_L1, "L1", [0, 0, 3, 6, 12]),
            SymbolDef::regular(SYMBOL_L2, "L2", [0, 0, 2, 5, 10]),
            SymbolDef::regular(SYMBOL_L3, "L3", [0, 0, 2, 4, 8]),
            SymbolDef::regular(SYMBOL_L4, "L4", [0, 0, 1, 3, 6]),
            SymbolDef::regular(SYMBOL_L5, "L5", [0, 0, 1, 2, 5]),
        ];

        Self { symbols }
    }

    /// Get symbol by id
    pub fn get(&self, id: Symbol) -> Option<&SymbolDef> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Display name of a symbol, `"?"` when unknown
    pub fn name_of(&self, id: Symbol) -> &str {
        self.get(id).map(|s| s.name.as_str()).unwrap_or("?")
    }

    /// Ids of all regular (paying) symbols
    pub fn regular_ids(&self) -> Vec<Symbol> {
        self.symbols
            .iter()
            .filter(|s| s.symbol_type == SymbolType::Regular)
            .map(|s| s.id)
            .collect()
    }

    /// Wild symbol id
    pub fn wild_id(&self) -> Option<Symbol> {
        self.find_type(SymbolType::Wild)
    }

    /// Scatter symbol id
    pub fn scatter_id(&self) -> Option<Symbol> {
        self.find_type(SymbolType::Scatter)
    }

    fn find_type(&self, symbol_type: SymbolType) -> Option<Symbol> {
        self.symbols
            .iter()
            .find(|s| s.symbol_type == symbol_type)
            .map(|s| s.id)
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::museum()
    }
}
