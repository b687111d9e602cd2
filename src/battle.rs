use crate::damage::resolve_attack;
use crate::error::{MatchError, Result};
use crate::events::{BattleEvent, RoundWinner, Side};
use crate::model::{is_special_move, Creature};
use crate::rules::Rules;
use rand::Rng;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DuelState {
    Ongoing,
    SideAFainted,
    SideBFainted,
    Draw,
}

impl DuelState {
    pub fn round_winner(self) -> Option<RoundWinner> {
        match self {
            DuelState::Ongoing => None,
            DuelState::SideAFainted => Some(RoundWinner::Side(Side::B)),
            DuelState::SideBFainted => Some(RoundWinner::Side(Side::A)),
            DuelState::Draw => Some(RoundWinner::Draw),
        }
    }
}

/// A creature entering a duel together with the HP it enters with.
#[derive(Clone, Copy, Debug)]
pub struct Entrant<'a> {
    pub creature: &'a Creature,
    pub hp: i32,
}

impl<'a> Entrant<'a> {
    /// Fresh appearance: carried `current_hp`, else max HP.
    pub fn fresh(creature: &'a Creature, rules: &Rules) -> Self {
        Entrant {
            creature,
            hp: creature.starting_hp(rules),
        }
    }

    pub fn with_hp(creature: &'a Creature, hp: i32) -> Self {
        Entrant { creature, hp }
    }
}

#[derive(Clone, Debug)]
pub struct DuelReport {
    pub outcome: DuelState,
    pub final_hp: [i32; 2],
    pub damage_dealt: [u64; 2],
    /// Number of attacks made, counter-attacks included.
    pub turns: u32,
    pub events: Vec<BattleEvent>,
}

impl DuelReport {
    pub fn winner(&self) -> RoundWinner {
        self.outcome.round_winner().unwrap_or(RoundWinner::Draw)
    }
}

/// `speed * (1 + level * bonus)`, unset speed read as the default.
pub fn effective_speed(creature: &Creature, level: u32, rules: &Rules) -> f64 {
    let speed = creature.stats.speed.unwrap_or(rules.default_speed) as f64;
    speed * (1.0 + level as f64 * rules.speed_bonus_per_level)
}

/// Returns `(first, second)`. Faster side first; exact ties are a coin flip,
/// which is the only draw from `rng` here.
pub fn turn_order<R: Rng + ?Sized>(
    a: &Creature,
    level_a: u32,
    b: &Creature,
    level_b: u32,
    rules: &Rules,
    rng: &mut R,
) -> (Side, Side) {
    let speed_a = effective_speed(a, level_a, rules);
    let speed_b = effective_speed(b, level_b, rules);
    let a_first = if speed_a > speed_b {
        true
    } else if speed_b > speed_a {
        false
    } else {
        rng.gen_bool(0.5)
    };
    if a_first {
        (Side::A, Side::B)
    } else {
        (Side::B, Side::A)
    }
}

struct Battler<'a> {
    creature: &'a Creature,
    level: u32,
    hp: i32,
    damage_dealt: u64,
}

impl Battler<'_> {
    fn is_fainted(&self) -> bool {
        self.hp <= 0
    }
}

struct Duel<'a, 'r> {
    battlers: [Battler<'a>; 2],
    round: u32,
    turns: u32,
    events: Vec<BattleEvent>,
    rules: &'r Rules,
}

impl<'a, 'r> Duel<'a, 'r> {
    fn new(a: Entrant<'a>, b: Entrant<'a>, round: u32, rules: &'r Rules) -> Result<Self> {
        for entrant in [&a, &b] {
            if entrant.hp <= 0 {
                return Err(MatchError::InvalidCreatureState {
                    creature_id: entrant.creature.id,
                    hp: entrant.hp,
                });
            }
        }
        let battler = |entrant: Entrant<'a>| Battler {
            creature: entrant.creature,
            level: entrant.creature.effective_level(rules),
            hp: entrant.hp,
            damage_dealt: 0,
        };
        Ok(Duel {
            battlers: [battler(a), battler(b)],
            round,
            turns: 0,
            events: Vec::new(),
            rules,
        })
    }

    fn battler(&self, side: Side) -> &Battler<'a> {
        &self.battlers[side.index()]
    }

    fn battler_mut(&mut self, side: Side) -> &mut Battler<'a> {
        &mut self.battlers[side.index()]
    }

    fn state(&self) -> DuelState {
        match (self.battler(Side::A).is_fainted(), self.battler(Side::B).is_fainted()) {
            (false, false) => DuelState::Ongoing,
            (true, false) => DuelState::SideAFainted,
            (false, true) => DuelState::SideBFainted,
            (true, true) => DuelState::Draw,
        }
    }

    fn strike<R: Rng + ?Sized>(&mut self, side: Side, counter: bool, rng: &mut R) {
        let attacker = self.battler(side);
        let defender = self.battler(side.opponent());
        let (attacker_creature, defender_creature) = (attacker.creature, defender.creature);
        let (attacker_level, defender_level) = (attacker.level, defender.level);

        let move_name = attacker_creature.choose_move(rng);
        let special = is_special_move(move_name);
        let roll = resolve_attack(
            attacker_creature,
            defender_creature,
            attacker_level,
            defender_level,
            special,
            self.rules,
            rng,
        );

        self.turns += 1;
        self.battler_mut(side).damage_dealt += roll.damage as u64;
        let target = self.battler_mut(side.opponent());
        target.hp = (target.hp as i64 - roll.damage as i64).max(0) as i32;
        let remaining_hp = target.hp;

        self.events.push(BattleEvent::Attack {
            round: self.round,
            turn: self.turns,
            side,
            attacker: attacker_creature.id,
            defender: defender_creature.id,
            move_name: move_name.to_string(),
            damage: roll.damage,
            critical: roll.critical,
            resisted: roll.resisted,
            special,
            multiplier: roll.multiplier,
            remaining_hp,
            counter,
        });
        if remaining_hp == 0 {
            self.events.push(BattleEvent::Faint {
                round: self.round,
                side: side.opponent(),
                creature: defender_creature.id,
            });
        }
    }

    /// One exchange: order is resolved afresh, then each side attacks once
    /// unless the duel ends in between.
    fn exchange<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let a = self.battler(Side::A);
        let b = self.battler(Side::B);
        let (first, second) = turn_order(a.creature, a.level, b.creature, b.level, self.rules, rng);
        for side in [first, second] {
            self.strike(side, false, rng);
            let fainted = side.opponent();
            if self.battler(fainted).is_fainted() {
                let chance = self.rules.counter_chance(self.battler(fainted).level);
                if rng.gen_bool(chance) {
                    self.strike(fainted, true, rng);
                }
                return;
            }
        }
    }
}

/// Runs one creature-vs-creature duel until a faint (or a double faint).
///
/// Fails only when an entrant starts at or below 0 HP. Every attack removes
/// at least 1 HP, so the number of turns is bounded by the combined
/// starting HP.
pub fn simulate_duel<R: Rng + ?Sized>(
    a: Entrant<'_>,
    b: Entrant<'_>,
    round: u32,
    rules: &Rules,
    rng: &mut R,
) -> Result<DuelReport> {
    let mut duel = Duel::new(a, b, round, rules)?;
    while duel.state() == DuelState::Ongoing {
        duel.exchange(rng);
    }
    let outcome = duel.state();
    let turns = duel.turns;
    if let Some(winner) = outcome.round_winner() {
        duel.events.push(BattleEvent::RoundResult {
            round,
            winner,
            turns,
        });
    }
    let [battler_a, battler_b] = duel.battlers;
    Ok(DuelReport {
        outcome,
        final_hp: [battler_a.hp, battler_b.hp],
        damage_dealt: [battler_a.damage_dealt, battler_b.damage_dealt],
        turns,
        events: duel.events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stats;
    use crate::types::{ElementType, TypeSet};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn mon(id: u64, speed: Option<u32>, hp: u32) -> Creature {
        Creature::new(id, format!("mon{id}"), TypeSet::single(ElementType::Normal)).with_stats(
            Stats {
                hp: Some(hp),
                attack: Some(40),
                defense: Some(40),
                speed,
                ..Stats::default()
            },
        )
    }

    #[test]
    fn faster_side_moves_first_without_consuming_rng() {
        let rules = Rules::default();
        let fast = mon(1, Some(90), 50);
        let slow = mon(2, Some(30), 50);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(turn_order(&fast, 1, &slow, 1, &rules, &mut rng), (Side::A, Side::B));
        assert_eq!(turn_order(&slow, 1, &fast, 1, &rules, &mut rng), (Side::B, Side::A));
    }

    #[test]
    fn level_scales_effective_speed() {
        let rules = Rules::default();
        let a = mon(1, Some(100), 50);
        let b = mon(2, Some(105), 50);
        // 100 * 1.5 > 105 * 1.01
        let mut rng = SmallRng::seed_from_u64(2);
        assert_eq!(turn_order(&a, 50, &b, 1, &rules, &mut rng), (Side::A, Side::B));
        assert!((effective_speed(&mon(3, None, 1), 1, &rules) - 50.5).abs() < 1e-9);
    }

    #[test]
    fn speed_ties_go_either_way() {
        let rules = Rules::default();
        let a = mon(1, Some(70), 50);
        let b = mon(2, Some(70), 50);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a_first = 0;
        for _ in 0..200 {
            if turn_order(&a, 5, &b, 5, &rules, &mut rng).0 == Side::A {
                a_first += 1;
            }
        }
        assert!(a_first > 60 && a_first < 140, "a moved first {a_first}/200");
    }

    #[test]
    fn non_positive_entry_hp_is_rejected() {
        let rules = Rules::default();
        let a = mon(1, Some(50), 50);
        let b = mon(2, Some(50), 50);
        let mut rng = SmallRng::seed_from_u64(0);
        let err = simulate_duel(
            Entrant::with_hp(&a, 0),
            Entrant::fresh(&b, &rules),
            1,
            &rules,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, MatchError::InvalidCreatureState { creature_id: 1, hp: 0 });
    }

    #[test]
    fn duel_ends_with_a_fainted_side_and_consistent_log() {
        let rules = Rules::default();
        let a = mon(1, Some(60), 80);
        let b = mon(2, Some(40), 80);
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let report = simulate_duel(
                Entrant::fresh(&a, &rules),
                Entrant::fresh(&b, &rules),
                1,
                &rules,
                &mut rng,
            )
            .unwrap();
            assert_ne!(report.outcome, DuelState::Ongoing);
            assert!(report.turns as i32 <= 160);
            let attacks = report
                .events
                .iter()
                .filter(|e| matches!(e, BattleEvent::Attack { .. }))
                .count();
            assert_eq!(attacks as u32, report.turns);
            assert!(matches!(report.events.last(), Some(BattleEvent::RoundResult { .. })));
            match report.outcome {
                DuelState::SideAFainted => assert!(report.final_hp[0] == 0 && report.final_hp[1] > 0),
                DuelState::SideBFainted => assert!(report.final_hp[1] == 0 && report.final_hp[0] > 0),
                DuelState::Draw => assert!(report.final_hp == [0, 0]),
                DuelState::Ongoing => unreachable!(),
            }
        }
    }

    #[test]
    fn guaranteed_counter_can_force_a_draw() {
        let rules = Rules {
            counter_base_chance: 1.0,
            ..Rules::default()
        };
        let a = mon(1, Some(80), 1);
        let b = mon(2, Some(10), 1);
        let mut rng = SmallRng::seed_from_u64(7);
        let report = simulate_duel(
            Entrant::fresh(&a, &rules),
            Entrant::fresh(&b, &rules),
            1,
            &rules,
            &mut rng,
        )
        .unwrap();
        assert_eq!(report.outcome, DuelState::Draw);
        assert_eq!(report.turns, 2);
        assert!(report.events.iter().any(|e| matches!(e, BattleEvent::Attack { counter: true, .. })));
    }
}
