//! Genetic operators on whole timetables.
//!
//! The chromosome is the session list itself: gene `i` is the assignment of
//! session `i`. Parents must therefore share the same session ids in the same
//! order; crossover rejects anything else instead of guessing.

use rand::Rng;

use super::Individual;
use crate::error::OptimizeError;
use crate::models::Solution;
use crate::moves::random_move;

/// Tournament selection: the lowest-energy of `size` uniform draws.
///
/// Draws are with replacement. Returns `None` for an empty population.
pub fn tournament_select<'a, R: Rng + ?Sized>(
    population: &'a [Individual],
    size: usize,
    rng: &mut R,
) -> Option<&'a Individual> {
    if population.is_empty() {
        return None;
    }
    let mut winner = &population[rng.random_range(0..population.len())];
    for _ in 1..size {
        let challenger = &population[rng.random_range(0..population.len())];
        if challenger.energy < winner.energy {
            winner = challenger;
        }
    }
    Some(winner)
}

/// Single-point crossover over the session list.
///
/// The child takes sessions `[0, point)` from `first` and `[point, n)` from
/// `second`, with `point` uniform in `[0, n)`.
///
/// # Errors
/// [`OptimizeError::ShapeMismatch`] if the parents' session lists differ.
pub fn single_point_crossover<R: Rng + ?Sized>(
    first: &Solution,
    second: &Solution,
    rng: &mut R,
) -> Result<Solution, OptimizeError> {
    if !first.same_shape(second) {
        return Err(OptimizeError::ShapeMismatch {
            expected: first.len(),
            found: second.len(),
        });
    }
    let mut child = first.clone();
    child.score = None;
    if first.is_empty() {
        return Ok(child);
    }
    let point = rng.random_range(0..first.len());
    child.sessions[point..].clone_from_slice(&second.sessions[point..]);
    Ok(child)
}

/// Applies one random neighbor move. Returns `false` if nothing could move.
pub fn mutate<R: Rng + ?Sized>(solution: &mut Solution, rng: &mut R) -> bool {
    match random_move(solution, rng) {
        Some(mv) => {
            let _ = mv.apply(solution);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::toy;
    use crate::models::{Session, TimeSlotId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn individual(energy: f64) -> Individual {
        Individual {
            solution: toy(),
            energy,
        }
    }

    #[test]
    fn test_tournament_prefers_lower_energy() {
        let population: Vec<_> = [50.0, 10.0, 30.0, 40.0].into_iter().map(individual).collect();
        let mut rng = StdRng::seed_from_u64(42);

        // A tournament as large as the population almost always finds the best
        let mut hits = 0;
        for _ in 0..100 {
            let w = tournament_select(&population, 16, &mut rng).unwrap();
            if w.energy == 10.0 {
                hits += 1;
            }
        }
        assert!(hits > 90);

        // Size 1 is uniform selection
        let mut seen_worst = false;
        for _ in 0..200 {
            if tournament_select(&population, 1, &mut rng).unwrap().energy == 50.0 {
                seen_worst = true;
            }
        }
        assert!(seen_worst);
    }

    #[test]
    fn test_tournament_empty_population() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(tournament_select(&[], 3, &mut rng).is_none());
    }

    #[test]
    fn test_crossover_takes_prefix_and_suffix() {
        let a = toy();
        let mut b = toy();
        for s in &mut b.sessions {
            s.assignment.time_slot = Some(TimeSlotId(7));
        }
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let child = single_point_crossover(&a, &b, &mut rng).unwrap();
            let point = child
                .sessions
                .iter()
                .position(|s| s.assignment.time_slot == Some(TimeSlotId(7)))
                .unwrap();
            assert!(child.sessions[..point]
                .iter()
                .all(|s| s.assignment.time_slot == Some(TimeSlotId(0))));
            assert!(child.sessions[point..]
                .iter()
                .all(|s| s.assignment.time_slot == Some(TimeSlotId(7))));
            assert!(child.same_shape(&a));
        }
    }

    #[test]
    fn test_crossover_shape_mismatch() {
        let a = toy();
        let mut b = toy();
        b.sessions.push(Session::orphan("extra"));
        let mut rng = StdRng::seed_from_u64(1);
        let err = single_point_crossover(&a, &b, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::ShapeMismatch {
                expected: 8,
                found: 9
            }
        ));

        let mut c = toy();
        c.sessions[3].id = "renamed".into();
        assert!(single_point_crossover(&a, &c, &mut rng).is_err());
    }

    #[test]
    fn test_mutate_changes_one_session_time() {
        let original = toy();
        let mut mutated = original.clone();
        let mut rng = StdRng::seed_from_u64(8);
        assert!(mutate(&mut mutated, &mut rng));
        let changed = original
            .sessions
            .iter()
            .zip(&mutated.sessions)
            .filter(|(a, b)| a != b)
            .count();
        // A swap of two equal slots changes nothing; otherwise one or two
        assert!(changed <= 2);
    }
}
