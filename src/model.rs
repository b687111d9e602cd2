use crate::rules::Rules;
use crate::types::TypeSet;
use phf::phf_set;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

pub type CreatureId = u64;
pub type TrainerId = u64;

/// Moves used when a creature's own list is empty.
pub const DEFAULT_MOVES: [&str; 2] = ["Placaje", "Arañazo"];

// Normalized (lowercase) names of moves resolved against special attack and
// special defense. Anything else is physical.
static SPECIAL_MOVES: phf::Set<&'static str> = phf_set! {
    "ascuas",
    "lanzallamas",
    "llamarada",
    "pistola agua",
    "hidrobomba",
    "surf",
    "rayo",
    "trueno",
    "impactrueno",
    "rayo hielo",
    "ventisca",
    "psíquico",
    "psiquico",
    "confusión",
    "confusion",
    "bola sombra",
    "pulso dragón",
    "pulso dragon",
    "rayo solar",
    "energibola",
    "pulso umbrío",
    "pulso umbrio",
    "fuerza lunar",
    "bomba lodo",
    "ember",
    "flamethrower",
    "fire blast",
    "water gun",
    "hydro pump",
    "thunderbolt",
    "thunder",
    "thunder shock",
    "ice beam",
    "blizzard",
    "psychic",
    "shadow ball",
    "dragon pulse",
    "solar beam",
    "energy ball",
    "dark pulse",
    "moonblast",
    "sludge bomb",
};

pub fn is_special_move(name: &str) -> bool {
    SPECIAL_MOVES.contains(name.trim().to_lowercase().as_str())
}

/// Splits the packed array literal used by the roster store
/// (`{Placaje,"Ascuas"}`) into individual move names.
pub fn parse_moves(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .map(|m| m.trim().trim_matches('"').trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MovesField {
    List(Vec<String>),
    Packed(String),
}

fn deserialize_moves<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let field: Option<MovesField> = Option::deserialize(deserializer)?;
    Ok(match field {
        Some(MovesField::List(list)) => list
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect(),
        Some(MovesField::Packed(raw)) => parse_moves(&raw),
        None => Vec::new(),
    })
}

fn default_level() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Base stats. Any of them may be unset in stored records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub hp: Option<u32>,
    pub attack: Option<u32>,
    pub defense: Option<u32>,
    pub special_attack: Option<u32>,
    pub special_defense: Option<u32>,
    pub speed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    #[serde(rename = "element", default)]
    pub types: TypeSet,
    #[serde(flatten)]
    pub stats: Stats,
    #[serde(default, deserialize_with = "deserialize_moves")]
    pub moves: Vec<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Carried HP; `None` means the creature enters at full `hp`.
    #[serde(default)]
    pub current_hp: Option<i32>,
}

impl Creature {
    pub fn new(id: CreatureId, name: impl Into<String>, types: TypeSet) -> Self {
        Creature {
            id,
            name: name.into(),
            types,
            stats: Stats::default(),
            moves: Vec::new(),
            level: 1,
            current_hp: None,
        }
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves = moves.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_current_hp(mut self, hp: i32) -> Self {
        self.current_hp = Some(hp);
        self
    }

    /// Level clamped into the legal range.
    pub fn effective_level(&self, rules: &Rules) -> u32 {
        rules.clamp_level(self.level)
    }

    pub fn max_hp(&self, rules: &Rules) -> i32 {
        self.stats.hp.unwrap_or(rules.default_hp).min(i32::MAX as u32) as i32
    }

    /// HP the creature starts a non-retained appearance with.
    pub fn starting_hp(&self, rules: &Rules) -> i32 {
        self.current_hp.unwrap_or_else(|| self.max_hp(rules))
    }

    /// Attack plus special attack, unset stats counted as zero.
    pub fn offense(&self) -> u32 {
        self.stats
            .attack
            .unwrap_or(0)
            .saturating_add(self.stats.special_attack.unwrap_or(0))
    }

    /// Uniform pick from the move list, or from [`DEFAULT_MOVES`] when empty.
    pub fn choose_move<'a, R: Rng + ?Sized>(&'a self, rng: &mut R) -> &'a str {
        match self.moves.choose(rng) {
            Some(name) => name.as_str(),
            None => DEFAULT_MOVES.choose(rng).copied().unwrap_or(DEFAULT_MOVES[0]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trainer {
    pub id: TrainerId,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub roster: Vec<Creature>,
}

impl Trainer {
    pub fn new(id: TrainerId, name: impl Into<String>, roster: Vec<Creature>) -> Self {
        Trainer {
            id,
            name: name.into(),
            level: 1,
            roster,
        }
    }

    /// Roster with repeated creature ids dropped (first occurrence wins).
    pub fn unique_roster(&self) -> Vec<&Creature> {
        let mut seen = std::collections::HashSet::new();
        self.roster.iter().filter(|c| seen.insert(c.id)).collect()
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.roster.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub trainer_id: TrainerId,
    pub opponent_id: TrainerId,
    /// A round winner stays in, with its remaining HP, for the next round.
    #[serde(default = "default_true")]
    pub retain_winner: bool,
    /// Counter-pick heuristic instead of uniform random roster choice.
    #[serde(default = "default_true")]
    pub smart_selection: bool,
}

impl MatchConfig {
    pub fn new(trainer_id: TrainerId, opponent_id: TrainerId) -> Self {
        MatchConfig {
            trainer_id,
            opponent_id,
            retain_winner: true,
            smart_selection: true,
        }
    }

    pub fn for_trainers(a: &Trainer, b: &Trainer) -> Self {
        MatchConfig::new(a.id, b.id)
    }

    pub fn retain_winner(mut self, retain: bool) -> Self {
        self.retain_winner = retain;
        self
    }

    pub fn smart_selection(mut self, smart: bool) -> Self {
        self.smart_selection = smart;
        self
    }
}
