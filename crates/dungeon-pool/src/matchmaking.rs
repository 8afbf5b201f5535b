//! Groups queued players into standard parties.

use rand::Rng;
use serde::{Deserialize, Serialize};

use dungeon_core::config::RosterConfig;
use dungeon_core::types::{Party, Player, Role};

use crate::name;

/// Queued players per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    /// Queued tanks.
    pub tanks: u32,
    /// Queued healers.
    pub healers: u32,
    /// Queued DPS.
    pub dps: u32,
}

/// Outcome of grouping a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchmaking {
    /// Parties ready to launch, in formation order.
    pub parties: Vec<Party>,
    /// Players that could not be placed in a full party.
    pub leftovers: Roster,
}

impl Roster {
    /// Create a roster.
    pub fn new(tanks: u32, healers: u32, dps: u32) -> Self {
        Self {
            tanks,
            healers,
            dps,
        }
    }

    /// How many standard parties the roster can fill.
    pub fn party_count(&self) -> u32 {
        (self.tanks / Party::TANKS)
            .min(self.healers / Party::HEALERS)
            .min(self.dps / Party::DPS)
    }

    /// Total queued players.
    pub fn total(&self) -> u64 {
        u64::from(self.tanks) + u64::from(self.healers) + u64::from(self.dps)
    }

    /// Form parties with names from the thread-local generator.
    pub fn form_parties(&self) -> Matchmaking {
        self.form_parties_with(&mut rand::thread_rng())
    }

    /// Form as many standard parties as possible, naming every player.
    pub fn form_parties_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Matchmaking {
        let count = self.party_count();
        let slots = [
            (Role::Tank, Party::TANKS),
            (Role::Healer, Party::HEALERS),
            (Role::Dps, Party::DPS),
        ];

        let mut parties = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut members = Vec::new();
            for (role, n) in slots {
                for _ in 0..n {
                    members.push(Player::new(name::generate_name_with(rng), role));
                }
            }
            parties.push(Party::new(members));
        }

        let leftovers = Roster {
            tanks: self.tanks - count * Party::TANKS,
            healers: self.healers - count * Party::HEALERS,
            dps: self.dps - count * Party::DPS,
        };

        tracing::debug!(parties = count, leftover_players = leftovers.total(), "Roster grouped");

        Matchmaking { parties, leftovers }
    }
}

impl From<&RosterConfig> for Roster {
    fn from(config: &RosterConfig) -> Self {
        Self::new(config.tanks, config.healers, config.dps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_party_count_limited_by_scarcest_role() {
        assert_eq!(Roster::new(5, 5, 15).party_count(), 5);
        assert_eq!(Roster::new(2, 9, 30).party_count(), 2);
        assert_eq!(Roster::new(9, 1, 30).party_count(), 1);
        assert_eq!(Roster::new(9, 9, 8).party_count(), 2);
        assert_eq!(Roster::new(0, 0, 0).party_count(), 0);
    }

    #[test]
    fn test_parties_have_standard_composition() {
        let mut rng = StdRng::seed_from_u64(5);
        let result = Roster::new(3, 4, 10).form_parties_with(&mut rng);

        assert_eq!(result.parties.len(), 3);
        for party in &result.parties {
            assert_eq!(party.size(), 5);
            assert_eq!(party.count(Role::Tank), 1);
            assert_eq!(party.count(Role::Healer), 1);
            assert_eq!(party.count(Role::Dps), 3);
        }
        assert_eq!(result.leftovers, Roster::new(0, 1, 1));
    }

    #[test]
    fn test_empty_roster_forms_nothing() {
        let result = Roster::default().form_parties();
        assert!(result.parties.is_empty());
        assert_eq!(result.leftovers.total(), 0);
    }

    #[test]
    fn test_players_are_conserved() {
        let roster = Roster::new(7, 3, 20);
        let result = roster.form_parties();
        let placed: usize = result.parties.iter().map(Party::size).sum();
        assert_eq!(placed as u64 + result.leftovers.total(), roster.total());
    }

    #[test]
    fn test_total_does_not_overflow_on_huge_roster() {
        let roster = Roster::new(u32::MAX, 0, 1);
        assert_eq!(roster.total(), u64::from(u32::MAX) + 1);

        let result = roster.form_parties();
        assert!(result.parties.is_empty());
        assert_eq!(result.leftovers.total(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_from_config() {
        let roster = Roster::from(&RosterConfig::default());
        assert_eq!(roster, Roster::new(5, 5, 15));
    }
}
