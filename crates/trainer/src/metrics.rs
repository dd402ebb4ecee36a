//! Binary classification metrics for the positive class

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(labels: &[f64], predictions: &[u8]) -> Self {
        let mut matrix = Self::default();
        for (&y, &p) in labels.iter().zip(predictions) {
            match (y == 1.0, p == 1) {
                (true, true) => matrix.true_positive += 1,
                (false, true) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
                (true, false) => matrix.false_negative += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }
}

/// Accuracy, precision, recall and F1. Every value lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// `numerator / denominator`, or 0 when nothing was counted
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl Metrics {
    pub fn from_confusion(m: &ConfusionMatrix) -> Self {
        let accuracy = ratio(m.true_positive + m.true_negative, m.total());
        let precision = ratio(m.true_positive, m.true_positive + m.false_positive);
        let recall = ratio(m.true_positive, m.true_positive + m.false_negative);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy,
            precision,
            recall,
            f1,
        }
    }

    pub fn evaluate(labels: &[f64], predictions: &[u8]) -> Self {
        Self::from_confusion(&ConfusionMatrix::from_predictions(labels, predictions))
    }
}
