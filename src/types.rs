//! Elemental types and the multiplicative effectiveness chart.
//!
//! The chart only ever yields 0.5, 1.0 or 2.0 per attacking/defending pair;
//! there are no immunities, so every product is strictly positive.

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum ElementType {
    Normal = 0,
    Fire = 1,
    Water = 2,
    Electric = 3,
    Grass = 4,
    Ice = 5,
    Fighting = 6,
    Poison = 7,
    Ground = 8,
    Flying = 9,
    Psychic = 10,
    Bug = 11,
    Rock = 12,
    Ghost = 13,
    Dragon = 14,
    Dark = 15,
    Steel = 16,
    Fairy = 17,
}

static TYPE_NAMES: phf::Map<&'static str, ElementType> = phf_map! {
    "normal" => ElementType::Normal,
    "fuego" => ElementType::Fire,
    "fire" => ElementType::Fire,
    "agua" => ElementType::Water,
    "water" => ElementType::Water,
    "eléctrico" => ElementType::Electric,
    "electrico" => ElementType::Electric,
    "electric" => ElementType::Electric,
    "planta" => ElementType::Grass,
    "grass" => ElementType::Grass,
    "hielo" => ElementType::Ice,
    "ice" => ElementType::Ice,
    "lucha" => ElementType::Fighting,
    "fighting" => ElementType::Fighting,
    "veneno" => ElementType::Poison,
    "poison" => ElementType::Poison,
    "tierra" => ElementType::Ground,
    "ground" => ElementType::Ground,
    "volador" => ElementType::Flying,
    "flying" => ElementType::Flying,
    "psíquico" => ElementType::Psychic,
    "psiquico" => ElementType::Psychic,
    "psychic" => ElementType::Psychic,
    "bicho" => ElementType::Bug,
    "bug" => ElementType::Bug,
    "roca" => ElementType::Rock,
    "rock" => ElementType::Rock,
    "fantasma" => ElementType::Ghost,
    "ghost" => ElementType::Ghost,
    "dragón" => ElementType::Dragon,
    "dragon" => ElementType::Dragon,
    "siniestro" => ElementType::Dark,
    "dark" => ElementType::Dark,
    "acero" => ElementType::Steel,
    "steel" => ElementType::Steel,
    "hada" => ElementType::Fairy,
    "fairy" => ElementType::Fairy,
};

impl ElementType {
    pub const ALL: [ElementType; 18] = [
        ElementType::Normal,
        ElementType::Fire,
        ElementType::Water,
        ElementType::Electric,
        ElementType::Grass,
        ElementType::Ice,
        ElementType::Fighting,
        ElementType::Poison,
        ElementType::Ground,
        ElementType::Flying,
        ElementType::Psychic,
        ElementType::Bug,
        ElementType::Rock,
        ElementType::Ghost,
        ElementType::Dragon,
        ElementType::Dark,
        ElementType::Steel,
        ElementType::Fairy,
    ];

    /// Case-insensitive lookup accepting Spanish (with or without accents)
    /// and English names.
    pub fn from_name(name: &str) -> Option<ElementType> {
        let key = name.trim().to_lowercase();
        TYPE_NAMES.get(key.as_str()).copied()
    }

    /// Canonical display name used when serializing.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Normal => "Normal",
            ElementType::Fire => "Fuego",
            ElementType::Water => "Agua",
            ElementType::Electric => "Eléctrico",
            ElementType::Grass => "Planta",
            ElementType::Ice => "Hielo",
            ElementType::Fighting => "Lucha",
            ElementType::Poison => "Veneno",
            ElementType::Ground => "Tierra",
            ElementType::Flying => "Volador",
            ElementType::Psychic => "Psíquico",
            ElementType::Bug => "Bicho",
            ElementType::Rock => "Roca",
            ElementType::Ghost => "Fantasma",
            ElementType::Dragon => "Dragón",
            ElementType::Dark => "Siniestro",
            ElementType::Steel => "Acero",
            ElementType::Fairy => "Hada",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u8)
    }

    /// Single attacking type against a single defending type.
    pub fn effectiveness(self, defending: ElementType) -> f64 {
        use ElementType::*;
        match self {
            Normal => match defending {
                Rock | Steel | Ghost => 0.5,
                _ => 1.0,
            },
            Fire => match defending {
                Fire | Water | Rock | Dragon => 0.5,
                Grass | Ice | Bug | Steel => 2.0,
                _ => 1.0,
            },
            Water => match defending {
                Water | Grass | Dragon => 0.5,
                Fire | Ground | Rock => 2.0,
                _ => 1.0,
            },
            Electric => match defending {
                Electric | Grass | Dragon | Ground => 0.5,
                Water | Flying => 2.0,
                _ => 1.0,
            },
            Grass => match defending {
                Fire | Grass | Poison | Flying | Bug | Dragon | Steel => 0.5,
                Water | Ground | Rock => 2.0,
                _ => 1.0,
            },
            Ice => match defending {
                Fire | Water | Ice | Steel => 0.5,
                Grass | Ground | Flying | Dragon => 2.0,
                _ => 1.0,
            },
            Fighting => match defending {
                Normal | Ice | Rock | Dark | Steel => 2.0,
                Poison | Flying | Psychic | Bug | Fairy | Ghost => 0.5,
                _ => 1.0,
            },
            Poison => match defending {
                Grass | Fairy => 2.0,
                Poison | Ground | Rock | Ghost | Steel => 0.5,
                _ => 1.0,
            },
            Ground => match defending {
                Fire | Electric | Poison | Rock | Steel => 2.0,
                Grass | Bug | Flying => 0.5,
                _ => 1.0,
            },
            Flying => match defending {
                Grass | Fighting | Bug => 2.0,
                Electric | Rock | Steel => 0.5,
                _ => 1.0,
            },
            Psychic => match defending {
                Fighting | Poison => 2.0,
                Psychic | Steel | Dark => 0.5,
                _ => 1.0,
            },
            Bug => match defending {
                Grass | Psychic | Dark => 2.0,
                Fire | Fighting | Poison | Flying | Ghost | Steel | Fairy => 0.5,
                _ => 1.0,
            },
            Rock => match defending {
                Fire | Ice | Flying | Bug => 2.0,
                Fighting | Ground | Steel => 0.5,
                _ => 1.0,
            },
            Ghost => match defending {
                Ghost | Psychic => 2.0,
                Dark | Normal => 0.5,
                _ => 1.0,
            },
            Dragon => match defending {
                Dragon => 2.0,
                Steel | Fairy => 0.5,
                _ => 1.0,
            },
            Dark => match defending {
                Psychic | Ghost => 2.0,
                Fighting | Dark | Fairy => 0.5,
                _ => 1.0,
            },
            Steel => match defending {
                Rock | Ice | Fairy => 2.0,
                Fire | Water | Electric | Steel => 0.5,
                _ => 1.0,
            },
            Fairy => match defending {
                Fighting | Dragon | Dark => 2.0,
                Fire | Poison | Steel => 0.5,
                _ => 1.0,
            },
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One or two element types, stored as a bitmask so `Fuego/Volador` and
/// `Volador/Fuego` are the same set.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub struct TypeSet(u32);

impl TypeSet {
    pub const MAX_TYPES: usize = 2;

    pub fn single(element: ElementType) -> Self {
        TypeSet(element.bit())
    }

    pub fn dual(first: ElementType, second: ElementType) -> Self {
        TypeSet(first.bit() | second.bit())
    }

    /// Parses `"Fuego/Volador"`-style strings. Unknown segments are skipped,
    /// only the first two distinct known types are kept, and an empty result
    /// falls back to Normal.
    pub fn parse(raw: &str) -> Self {
        let mut mask = 0u32;
        let mut count = 0usize;
        for segment in raw.split(|c| c == '/' || c == ',') {
            if count == Self::MAX_TYPES {
                break;
            }
            if let Some(element) = ElementType::from_name(segment) {
                if mask & element.bit() == 0 {
                    mask |= element.bit();
                    count += 1;
                }
            }
        }
        TypeSet(mask)
    }

    pub fn contains(self, element: ElementType) -> bool {
        self.effective_mask() & element.bit() != 0
    }

    pub fn len(self) -> usize {
        self.effective_mask().count_ones() as usize
    }

    /// Member types in chart order. A blank set reads as Normal.
    pub fn iter(self) -> impl Iterator<Item = ElementType> {
        let mask = self.effective_mask();
        ElementType::ALL
            .into_iter()
            .filter(move |element| mask & element.bit() != 0)
    }

    fn effective_mask(self) -> u32 {
        if self.0 == 0 {
            ElementType::Normal.bit()
        } else {
            self.0
        }
    }
}

impl From<ElementType> for TypeSet {
    fn from(element: ElementType) -> Self {
        TypeSet::single(element)
    }
}

impl From<Option<String>> for TypeSet {
    fn from(raw: Option<String>) -> Self {
        raw.map(|r| TypeSet::parse(&r)).unwrap_or_default()
    }
}

impl From<TypeSet> for String {
    fn from(set: TypeSet) -> Self {
        set.to_string()
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(ElementType::name).collect();
        f.write_str(&names.join("/"))
    }
}

/// Product of every pairwise factor across both sets. Dual types can reach
/// 4.0 or 0.25 (and 16.0 / 0.0625 for dual against dual); nothing is clamped.
pub fn type_multiplier(attacker: TypeSet, defender: TypeSet) -> f64 {
    let mut multiplier = 1.0;
    for atk in attacker.iter() {
        for def in defender.iter() {
            multiplier *= atk.effectiveness(def);
        }
    }
    multiplier
}

/// Convenience form over raw element strings (`"Fuego"`, `"Planta/Veneno"`).
pub fn type_multiplier_by_name(attacker: &str, defender: &str) -> f64 {
    type_multiplier(TypeSet::parse(attacker), TypeSet::parse(defender))
}
