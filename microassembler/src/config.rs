use crate::align::AlignParams;
use crate::error::AssemblyError;
use crate::tandem::TandemParams;
use serde::{Deserialize, Serialize};

/// The knobs of one locus. They are fixed before the graph is built
/// and never change while the locus is processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssemblyConfig {
    /// The k-mer size to start with.
    pub k: usize,
    /// The largest k-mer size tried when the locus looks repetitive.
    pub max_k: usize,
    pub k_step: usize,
    /// Dead-end nodes with fewer k-mers than this are tips.
    pub max_tip_len: usize,
    /// Nodes with at most this many k-mers can be short links. `k/2` if absent.
    pub max_link_len: Option<usize>,
    pub max_indel_len: usize,
    /// Nodes with a mean k-mer coverage below this are removed.
    pub cov_threshold: f64,
    /// Nodes whose coverage ratio against their heaviest neighbour is below this are removed.
    pub min_cov_ratio: f64,
    /// Short links with a mean coverage at most this are removed.
    pub low_cov_threshold: f64,
    /// Maximum number of search steps per component.
    pub dfs_limit: usize,
    pub min_qual_trim: u8,
    pub min_qual_call: u8,
    pub min_read_len: usize,
    pub max_ambiguous_bases: usize,
    /// Paths with a node supported by fewer reads are not reported.
    pub min_thread_reads: usize,
    pub scaffold_contigs: bool,
    pub insert_size: usize,
    pub insert_stdev: usize,
    pub max_mismatch: usize,
    pub max_unit_len: usize,
    pub min_report_units: usize,
    pub min_report_len: usize,
    pub dist_from_str: usize,
    pub align: AlignParams,
}

impl std::default::Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            k: 11,
            max_k: 61,
            k_step: 2,
            max_tip_len: 11,
            max_link_len: None,
            max_indel_len: 500,
            cov_threshold: 2f64,
            min_cov_ratio: 0.01,
            low_cov_threshold: 1f64,
            dfs_limit: 1_000_000,
            min_qual_trim: 10,
            min_qual_call: 17,
            min_read_len: 0,
            max_ambiguous_bases: 4,
            min_thread_reads: 0,
            scaffold_contigs: false,
            insert_size: 300,
            insert_stdev: 100,
            max_mismatch: 2,
            max_unit_len: 4,
            min_report_units: 3,
            min_report_len: 7,
            dist_from_str: 1,
            align: AlignParams::default(),
        }
    }
}

impl AssemblyConfig {
    pub fn validate(&self) -> Result<(), AssemblyError> {
        if self.k < 3 {
            let why = format!("k should be at least 3, but it is {}", self.k);
            return Err(AssemblyError::InvalidConfig(why));
        }
        if self.k % 2 == 0 {
            let why = format!("k should be odd, but it is {}", self.k);
            return Err(AssemblyError::InvalidConfig(why));
        }
        if self.max_k < self.k {
            let why = format!("max_k({}) is smaller than k({})", self.max_k, self.k);
            return Err(AssemblyError::InvalidConfig(why));
        }
        // Odd k-mers are never their own reverse complement.
        if (self.k_step == 0 || self.k_step % 2 == 1) && self.max_k > self.k {
            let why = format!("k_step should be positive and even, but it is {}", self.k_step);
            return Err(AssemblyError::InvalidConfig(why));
        }
        if !(0f64..=1f64).contains(&self.min_cov_ratio) {
            let why = format!("min_cov_ratio({}) is not in [0,1]", self.min_cov_ratio);
            return Err(AssemblyError::InvalidConfig(why));
        }
        if self.dfs_limit == 0 {
            return Err(AssemblyError::InvalidConfig("dfs_limit is zero".to_string()));
        }
        Ok(())
    }
    /// The same configuration with another k-mer size.
    pub fn with_k(&self, k: usize) -> Self {
        Self {
            k,
            ..self.clone()
        }
    }
    pub fn max_link_len(&self) -> usize {
        self.max_link_len.unwrap_or(self.k / 2)
    }
    /// The k-mer sizes to try, in order.
    pub fn k_values(&self) -> impl Iterator<Item = usize> {
        let step = self.k_step.max(1);
        (self.k..=self.max_k).step_by(step)
    }
    pub fn tandem_params(&self) -> TandemParams {
        TandemParams {
            max_unit_len: self.max_unit_len,
            min_report_units: self.min_report_units,
            min_report_len: self.min_report_len,
            dist_from_str: self.dist_from_str,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults_are_valid() {
        let config = AssemblyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_link_len(), 5);
        let ks: Vec<_> = config.with_k(57).k_values().collect();
        assert_eq!(ks, vec![57, 59, 61]);
    }
    #[test]
    fn invalid_configs() {
        let config = AssemblyConfig {
            k: 2,
            ..AssemblyConfig::default()
        };
        assert!(config.validate().is_err());
        let config = AssemblyConfig {
            k: 31,
            max_k: 21,
            ..AssemblyConfig::default()
        };
        assert!(config.validate().is_err());
        let config = AssemblyConfig {
            min_cov_ratio: 1.5,
            ..AssemblyConfig::default()
        };
        assert!(config.validate().is_err());
    }
    #[test]
    fn k_stays_odd() {
        let config = AssemblyConfig {
            k: 20,
            ..AssemblyConfig::default()
        };
        assert!(config.validate().is_err());
        let config = AssemblyConfig {
            k_step: 3,
            ..AssemblyConfig::default()
        };
        assert!(config.validate().is_err());
        let config = AssemblyConfig {
            k: 21,
            max_k: 21,
            k_step: 3,
            ..AssemblyConfig::default()
        };
        assert!(config.validate().is_ok());
        let config = AssemblyConfig {
            k: 21,
            max_k: 32,
            ..AssemblyConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.k_values().all(|k| k % 2 == 1));
    }
}
