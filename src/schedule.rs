use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::Rng;

/// The default preset mode table: three (red, green) splits of a four tick
/// cycle, from red heavy to green heavy.
pub static DEFAULT_MODE_TABLE: Lazy<Vec<(u32, u32)>> = Lazy::new(|| vec![(3, 1), (2, 2), (1, 3)]);

/// A junction's signal policy: decides each tick which incoming road may
/// release one car across the junction.
///
/// One schedule is active per junction and is swapped wholesale between
/// simulation runs, never mutated mid-run. The periodic variants are pure
/// functions of the elapsed tick count.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Schedule {
    /// Sample uniformly over the incoming roads each tick. The baseline
    /// policy, installed by default on every new junction.
    Random,
    /// A fixed cycle: entry `i` of `durations` is the number of consecutive
    /// ticks for which incoming road `i` releases. The list is aligned with
    /// the junction's incoming road ordering.
    Periodic { durations: Vec<u32> },
    /// A mode from a shared table of (red, green) splits: the junction's
    /// first incoming road releases for `red` ticks of the cycle, then the
    /// second for `green`. Keeping the table shared makes the search space
    /// one small integer per junction.
    Preset { table: Vec<(u32, u32)>, mode: usize },
}

/// An error raised when a schedule cannot be installed at a junction.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("schedule has {got} durations but the junction has {expected} incoming roads")]
    DurationMismatch { expected: usize, got: usize },
    #[error("schedule durations must sum to at least one tick")]
    EmptyCycle,
    #[error("mode {mode} is out of range for a table of {table_len} modes")]
    ModeOutOfRange { mode: usize, table_len: usize },
    #[error("preset schedules require exactly two incoming roads, found {num_in}")]
    NotTwoPhase { num_in: usize },
    #[error("parameter vector length {got} does not match the expected {expected}")]
    ArityMismatch { expected: usize, got: usize },
}

impl Schedule {
    /// Checks the schedule against the number of incoming roads at the
    /// junction it is being installed at. Runs at installation time so that
    /// a mismatch can never surface as an out of range lookup mid-run.
    pub fn validate(&self, num_in: usize) -> Result<(), ScheduleError> {
        match self {
            Schedule::Random => Ok(()),
            Schedule::Periodic { durations } => {
                if durations.len() != num_in {
                    return Err(ScheduleError::DurationMismatch {
                        expected: num_in,
                        got: durations.len(),
                    });
                }
                if durations.iter().sum::<u32>() == 0 {
                    return Err(ScheduleError::EmptyCycle);
                }
                Ok(())
            }
            Schedule::Preset { table, mode } => {
                let (red, green) = match table.get(*mode) {
                    Some(&entry) => entry,
                    None => {
                        return Err(ScheduleError::ModeOutOfRange {
                            mode: *mode,
                            table_len: table.len(),
                        })
                    }
                };
                if num_in != 2 {
                    return Err(ScheduleError::NotTwoPhase { num_in });
                }
                if red == 0 && green == 0 {
                    return Err(ScheduleError::EmptyCycle);
                }
                Ok(())
            }
        }
    }

    /// Resolves the index of the incoming road allowed to release one car at
    /// tick `t`, or `None` for a junction with no incoming roads.
    ///
    /// The periodic variants are pure in `t` (the schedule must have passed
    /// [validate](Self::validate), which rules out a zero length cycle);
    /// only [Random](Self::Random) consumes the generator.
    pub fn resolve(&self, t: usize, num_in: usize, rng: &mut StdRng) -> Option<usize> {
        if num_in == 0 {
            return None;
        }
        match self {
            Schedule::Random => Some(rng.gen_range(0..num_in)),
            Schedule::Periodic { durations } => Some(cumulative_bin(durations, t)),
            Schedule::Preset { table, mode } => {
                let (red, green) = table[*mode];
                Some(cumulative_bin(&[red, green], t))
            }
        }
    }
}

/// Finds the phase a tick falls into, cumulatively. Bins are half open:
/// phase `i` covers residuals from the sum of the durations before it up to
/// but not including the sum through it, so the final tick of a phase still
/// belongs to that phase and a residual equal to a cumulative sum starts
/// the next phase. Zero length phases are skipped.
fn cumulative_bin(durations: &[u32], t: usize) -> usize {
    let cycle: u32 = durations.iter().sum();
    let mut residual = (t % cycle as usize) as u32;
    for (idx, &duration) in durations.iter().enumerate() {
        if residual < duration {
            return idx;
        }
        residual -= duration;
    }
    unreachable!("the residual is always below the cycle length")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn phase_boundaries_are_half_open() {
        let durations = [3, 2];
        // Phase 0 holds residuals 0..=2, phase 1 holds 3..=4.
        assert_eq!(cumulative_bin(&durations, 0), 0);
        assert_eq!(cumulative_bin(&durations, 2), 0);
        assert_eq!(cumulative_bin(&durations, 3), 1);
        assert_eq!(cumulative_bin(&durations, 4), 1);
        // The tick at the full cycle sum wraps to the first phase.
        assert_eq!(cumulative_bin(&durations, 5), 0);
    }

    #[test]
    fn zero_length_phases_are_skipped() {
        assert_eq!(cumulative_bin(&[0, 5], 0), 1);
        assert_eq!(cumulative_bin(&[2, 0, 3], 2), 2);
    }

    #[test]
    fn periodic_depends_only_on_the_residual() {
        let schedule = Schedule::Periodic {
            durations: vec![4, 7],
        };
        let mut rng = StdRng::from_seed(*b"a long red light on a short day.");
        let cycle = 11;
        for t in 0..cycle {
            let base = schedule.resolve(t, 2, &mut rng);
            assert_eq!(schedule.resolve(t + cycle, 2, &mut rng), base);
            assert_eq!(schedule.resolve(t + 5 * cycle, 2, &mut rng), base);
        }
    }

    #[test]
    fn preset_resolves_like_the_equivalent_periodic() {
        let preset = Schedule::Preset {
            table: DEFAULT_MODE_TABLE.clone(),
            mode: 0,
        };
        let periodic = Schedule::Periodic {
            durations: vec![3, 1],
        };
        let mut rng = StdRng::from_seed(*b"a long red light on a short day.");
        for t in 0..12 {
            assert_eq!(
                preset.resolve(t, 2, &mut rng),
                periodic.resolve(t, 2, &mut rng)
            );
        }
    }

    #[test]
    fn random_stays_in_range() {
        let mut rng = StdRng::from_seed(*b"thirty two bytes of traffic jam!");
        for t in 0..100 {
            let idx = Schedule::Random.resolve(t, 3, &mut rng).unwrap();
            assert!(idx < 3);
        }
    }

    #[test]
    fn no_incoming_roads_resolves_to_none() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Schedule::Random.resolve(0, 0, &mut rng), None);
    }

    #[test]
    fn validation_rejects_misaligned_durations() {
        let schedule = Schedule::Periodic {
            durations: vec![1, 2, 3],
        };
        assert_eq!(
            schedule.validate(2),
            Err(ScheduleError::DurationMismatch {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn validation_rejects_an_empty_cycle() {
        let schedule = Schedule::Periodic {
            durations: vec![0, 0],
        };
        assert_eq!(schedule.validate(2), Err(ScheduleError::EmptyCycle));
    }

    #[test]
    fn validation_rejects_a_mode_outside_the_table() {
        let schedule = Schedule::Preset {
            table: DEFAULT_MODE_TABLE.clone(),
            mode: 3,
        };
        assert_eq!(
            schedule.validate(2),
            Err(ScheduleError::ModeOutOfRange {
                mode: 3,
                table_len: 3
            })
        );
    }

    #[test]
    fn validation_rejects_presets_away_from_two_roads() {
        let schedule = Schedule::Preset {
            table: DEFAULT_MODE_TABLE.clone(),
            mode: 1,
        };
        assert_eq!(
            schedule.validate(3),
            Err(ScheduleError::NotTwoPhase { num_in: 3 })
        );
    }
}
