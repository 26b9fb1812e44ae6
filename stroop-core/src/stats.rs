use crate::trial::Response;

/// Accuracy and latency summary of one response list, split by congruency.
///
/// Derived on demand from accumulated responses; never stored in session
/// state. All quantities are sums and counts, so the summary is invariant
/// under reordering of the input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockStats {
    pub congruent_correct: usize,
    pub congruent_total: usize,
    pub incongruent_correct: usize,
    pub incongruent_total: usize,
    /// Mean response time of correct congruent responses; 0.0 if none.
    pub congruent_avg_ms: f64,
    /// Mean response time of correct incongruent responses; 0.0 if none.
    pub incongruent_avg_ms: f64,
}

impl BlockStats {
    pub fn summarize(responses: &[Response]) -> BlockStats {
        let mut stats = BlockStats::default();
        let mut congruent_sum = 0.0;
        let mut incongruent_sum = 0.0;

        for response in responses {
            if response.stimulus.congruent {
                stats.congruent_total += 1;
                if response.correct {
                    stats.congruent_correct += 1;
                    congruent_sum += response.response_time_ms;
                }
            } else {
                stats.incongruent_total += 1;
                if response.correct {
                    stats.incongruent_correct += 1;
                    incongruent_sum += response.response_time_ms;
                }
            }
        }

        if stats.congruent_correct > 0 {
            stats.congruent_avg_ms = congruent_sum / stats.congruent_correct as f64;
        }
        if stats.incongruent_correct > 0 {
            stats.incongruent_avg_ms = incongruent_sum / stats.incongruent_correct as f64;
        }
        stats
    }

    /// Latency cost of incongruent over congruent trials.
    pub fn stroop_effect_ms(&self) -> f64 {
        self.incongruent_avg_ms - self.congruent_avg_ms
    }
}
