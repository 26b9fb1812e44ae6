use crate::config::SessionConfig;
use rand::Rng;
use rand::seq::SliceRandom;
use stroop_core::{Color, Stimulus};

/// Generates one balanced, shuffled block of stimuli.
///
/// Words cycle through the color table for both halves. Incongruent inks
/// are drawn uniformly from the three non-matching colors by redrawing
/// until the ink differs from the word. The concatenation is shuffled
/// with Fisher-Yates, so every permutation is equally likely.
pub fn generate_block<R: Rng>(rng: &mut R, config: &SessionConfig) -> Vec<Stimulus> {
    let mut stimuli = Vec::with_capacity(config.block_len());

    for i in 0..config.congruent_trials {
        stimuli.push(Stimulus::congruent(Color::ALL[i % Color::ALL.len()]));
    }

    for i in 0..config.incongruent_trials {
        let word = Color::ALL[i % Color::ALL.len()];
        let ink = loop {
            let candidate = Color::ALL[rng.random_range(0..Color::ALL.len())];
            if candidate != word {
                break candidate;
            }
        };
        stimuli.push(Stimulus::incongruent(word, ink));
    }

    stimuli.shuffle(rng);
    stimuli
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn block_is_balanced() {
        let config = SessionConfig::default();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let block = generate_block(&mut rng, &config);
            assert_eq!(block.len(), 60);
            assert_eq!(block.iter().filter(|s| s.congruent).count(), 30);
            assert_eq!(block.iter().filter(|s| !s.congruent).count(), 30);
        }
    }

    #[test]
    fn congruent_entries_match_word_and_ink() {
        let mut rng = StdRng::seed_from_u64(1);
        let block = generate_block(&mut rng, &SessionConfig::default());
        for stimulus in block.iter().filter(|s| s.congruent) {
            assert_eq!(stimulus.word, stimulus.ink_color());
        }
    }

    #[test]
    fn incongruent_entries_never_match() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let block = generate_block(&mut rng, &SessionConfig::default());
            for stimulus in block.iter().filter(|s| !s.congruent) {
                assert!(stimulus.word.is_some());
                assert!(stimulus.ink_color().is_some());
                assert_ne!(stimulus.word, stimulus.ink_color());
            }
        }
    }

    #[test]
    fn words_cover_the_table_evenly() {
        let mut rng = StdRng::seed_from_u64(3);
        let block = generate_block(&mut rng, &SessionConfig::default());
        for color in Color::ALL {
            let congruent = block
                .iter()
                .filter(|s| s.congruent && s.word == Some(color))
                .count();
            let incongruent = block
                .iter()
                .filter(|s| !s.congruent && s.word == Some(color))
                .count();
            // 30 words cycling over 4 colors: 8 for the first two, 7 after.
            assert!(congruent == 7 || congruent == 8);
            assert!(incongruent == 7 || incongruent == 8);
        }
    }

    #[test]
    fn respects_custom_counts() {
        let config = SessionConfig {
            congruent_trials: 4,
            incongruent_trials: 2,
            ..SessionConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let block = generate_block(&mut rng, &config);
        assert_eq!(block.len(), 6);
        assert_eq!(block.iter().filter(|s| s.congruent).count(), 4);
    }
}
