use crate::types::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub placement: u32,
    pub entrant_id: EntrantId,
    pub label: String,
    /// Match that knocked the entrant out; `None` for the champion.
    pub eliminated_in: Option<MatchKey>,
}

/// Final placements, best first. Entrants knocked out in the same losers
/// round share a placement (e.g. 5th, 5th, 7th, 7th). Empty until the
/// tournament is completed.
pub fn standings(tournament: &Tournament) -> Vec<Standing> {
    if !tournament.is_completed() {
        return Vec::new();
    }
    let Some(champion) = tournament.champion() else {
        return Vec::new();
    };
    let losers_rounds = tournament.losers_rounds();

    // Lower tier finishes higher.
    let mut tiers = tournament
        .entrants()
        .iter()
        .map(|entrant| {
            let eliminated_in = final_loss(tournament, entrant.id);
            let tier = if entrant.id == champion {
                0
            } else if tournament.runner_up() == Some(entrant.id) {
                1
            } else {
                match eliminated_in {
                    Some(key) if key.bracket == Bracket::Losers => 2 + losers_rounds - key.round,
                    _ => u32::MAX,
                }
            };
            (tier, entrant, eliminated_in)
        })
        .collect::<Vec<_>>();
    tiers.sort_by_key(|(tier, entrant, _)| (*tier, entrant.seed, entrant.id));

    tiers
        .iter()
        .map(|(tier, entrant, eliminated_in)| {
            let better = tiers.iter().filter(|(other, _, _)| other < tier).count() as u32;
            Standing {
                placement: better + 1,
                entrant_id: entrant.id,
                label: entrant.label.clone(),
                eliminated_in: if entrant.id == champion { None } else { *eliminated_in },
            }
        })
        .collect()
}

fn final_loss(tournament: &Tournament, entrant: EntrantId) -> Option<MatchKey> {
    tournament
        .matches()
        .iter()
        .filter(|m| m.is_completed() && m.loser == Some(entrant))
        .map(|m| m.key)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::generate;
    use crate::resolver::SlotAWins;
    use crate::scheduler::run;

    fn roster(n: u32) -> Vec<Entrant> {
        (1..=n).map(|i| Entrant::new(i, format!("P{i}"), i)).collect()
    }

    #[test]
    fn test_empty_until_completed() {
        let t = generate(roster(4)).unwrap();
        assert!(standings(&t).is_empty());
    }

    #[test]
    fn test_placement_blocks_for_sixteen() {
        let done = run(generate(roster(16)).unwrap(), &mut SlotAWins).unwrap();
        let table = standings(&done);
        assert_eq!(table.len(), 16);
        let placements = table.iter().map(|s| s.placement).collect::<Vec<_>>();
        assert_eq!(
            placements,
            vec![1, 2, 3, 4, 5, 5, 7, 7, 9, 9, 9, 9, 13, 13, 13, 13]
        );
        assert_eq!(table[0].entrant_id, done.champion().unwrap());
        assert_eq!(table[0].eliminated_in, None);
        assert_eq!(table[1].entrant_id, done.runner_up().unwrap());
        assert_eq!(table[2].entrant_id, done.third_place().unwrap());
        assert_eq!(table[2].eliminated_in, Some(MatchKey::losers(6, 1)));
    }

    #[test]
    fn test_four_entrant_standings() {
        let done = run(generate(roster(4)).unwrap(), &mut SlotAWins).unwrap();
        let table = standings(&done);
        let order = table.iter().map(|s| (s.placement, s.entrant_id)).collect::<Vec<_>>();
        assert_eq!(order, vec![(1, 1), (2, 2), (3, 3), (4, 4)]);
    }
}
