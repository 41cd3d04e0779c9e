//! Dirichlet-Multinomial posterior for genes with more than two alleles
//! (three naming styles, four logging shapes, ...). Uniform prior.

#[derive(Debug, Clone)]
pub struct DirichletMultinomial {
    labels: Vec<String>,
    counts: Vec<u64>,
}

impl DirichletMultinomial {
    pub fn new(labels: Vec<String>) -> Self {
        let k = labels.len();
        Self {
            labels,
            counts: vec![0; k],
        }
    }

    pub fn observe(&mut self, allele: usize, count: u64) {
        if let Some(slot) = self.counts.get_mut(allele) {
            *slot += count;
        }
    }

    /// Posterior mean per allele: (1 + nₖ) / (K + N).
    pub fn posterior_means(&self) -> Vec<f64> {
        let k = self.labels.len() as f64;
        let total: u64 = self.counts.iter().sum();
        let denom = k + total as f64;
        if denom <= 0.0 {
            return vec![0.0; self.labels.len()];
        }
        self.counts
            .iter()
            .map(|&n| (1.0 + n as f64) / denom)
            .collect()
    }

    /// The dominant allele: (index, label, posterior mean).
    pub fn dominant(&self) -> Option<(usize, &str, f64)> {
        let means = self.posterior_means();
        means
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(index, &mean)| (index, self.labels[index].as_str(), mean))
    }

    /// The gap between the top two posterior means. Genes under the
    /// contested threshold flag no deviations.
    pub fn top_two_gap(&self) -> f64 {
        let mut means = self.posterior_means();
        means.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        match (means.first(), means.get(1)) {
            (Some(first), Some(second)) => first - second,
            _ => 1.0,
        }
    }

    /// Relative gap: (top − second) / (top + second). A 45/55 split has a
    /// relative gap of 10%; 20/80 has 60%.
    pub fn relative_gap(&self) -> f64 {
        let mut means = self.posterior_means();
        means.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        match (means.first(), means.get(1)) {
            (Some(&first), Some(&second)) if first + second > 0.0 => {
                (first - second) / (first + second)
            }
            _ => 1.0,
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene(counts: &[u64]) -> DirichletMultinomial {
        let labels = (0..counts.len()).map(|i| format!("a{i}")).collect();
        let mut d = DirichletMultinomial::new(labels);
        for (i, &c) in counts.iter().enumerate() {
            d.observe(i, c);
        }
        d
    }

    #[test]
    fn uniform_prior_with_no_data() {
        let d = gene(&[0, 0, 0]);
        for mean in d.posterior_means() {
            assert!((mean - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn dominant_allele_wins() {
        let d = gene(&[80, 15, 5]);
        let (index, _, mean) = d.dominant().unwrap();
        assert_eq!(index, 0);
        assert!(mean > 0.7);
    }

    #[test]
    fn forty_five_fifty_five_is_contested() {
        // 45/55: relative gap 10% < 20% → contested.
        let d = gene(&[45, 55]);
        assert!(d.relative_gap() < 0.20);
    }

    #[test]
    fn twenty_eighty_is_not_contested() {
        // 20/80: relative gap 60% ≥ 20% → a clear winner.
        let d = gene(&[20, 80]);
        assert!(d.relative_gap() >= 0.20);
    }
}
