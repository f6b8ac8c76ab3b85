//! Serializable scenario configuration.
//!
//! A [`ScenarioConfig`] mirrors [`Scenario`] field for field but holds plain
//! parameter values instead of live sampling streams, so it round-trips
//! through JSON. Building a scenario constructs fresh distribution instances
//! on every call; two scenarios built from one config never share a stream
//! (though they repeat the same draw sequences when seeded).

use crate::distribution::{Distribution, Normal, Uniform};
use crate::error::DialysisError;
use crate::hashing::hash_str;
use crate::scenario::{
    DEFAULT_AUDIT_INTERVAL, DEFAULT_MORTALITY, DEFAULT_PROP_DROP_TO_TWO_SESSIONS,
    DEFAULT_PROP_NEG_COV_QUERY, DEFAULT_PROP_POS_REQUIRING_INPATIENT,
    DEFAULT_RANDOM_POSITIVE_RATE_AT_START, DEFAULT_RUN_LENGTH, DEFAULT_TOTAL_PROPORTION_INFECTED,
    Scenario, ScenarioBuilder, default_mortality_rand, default_requiring_inpatient_random,
    default_time_inpatient, default_time_pos_before_inpatient, default_time_positive,
    default_time_to_infection, default_will_be_infected_rand,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters of a single distribution, as written in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionSpec {
    Normal {
        mean: f64,
        std: f64,
        #[serde(default)]
        minimum: Option<f64>,
        #[serde(default)]
        random_state: Option<u64>,
    },
    Uniform {
        minimum: f64,
        maximum: f64,
        #[serde(default)]
        random_state: Option<u64>,
    },
}

impl DistributionSpec {
    /// Constructs a live distribution with its own fresh stream.
    ///
    /// An explicit `random_state` in the spec wins over `fallback_seed`.
    ///
    /// # Errors
    /// Propagates the distribution's construction-time validation.
    pub fn realize(
        &self,
        fallback_seed: Option<u64>,
    ) -> Result<Box<dyn Distribution>, DialysisError> {
        match *self {
            Self::Normal {
                mean,
                std,
                minimum,
                random_state,
            } => Ok(Box::new(Normal::new(
                mean,
                std,
                minimum,
                random_state.or(fallback_seed),
            )?)),
            Self::Uniform {
                minimum,
                maximum,
                random_state,
            } => Ok(Box::new(Uniform::new(
                minimum,
                maximum,
                random_state.or(fallback_seed),
            )?)),
        }
    }
}

/// Scenario parameters in serializable form.
///
/// Absent scalar fields fall back to the scenario defaults; absent
/// distribution fields fall back to the default law for that role. A
/// top-level `random_state` seeds every stream deterministically, each field
/// deriving its own seed from the hashed field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Base seed for all streams; absent means entropy-seeded.
    pub random_state: Option<u64>,
    pub run_length: f64,
    pub audit_interval: u32,
    pub total_proportion_people_infected: f64,
    pub prop_neg_patients_cov_query: f64,
    pub time_to_infection: Option<DistributionSpec>,
    pub time_positive: Option<DistributionSpec>,
    pub proportion_pos_requiring_inpatient: f64,
    pub requiring_inpatient_random: Option<DistributionSpec>,
    pub time_pos_before_inpatient: Option<DistributionSpec>,
    pub time_inpatient: Option<DistributionSpec>,
    pub mortality: f64,
    pub mortality_rand: Option<DistributionSpec>,
    pub random_positive_rate_at_start: f64,
    pub will_be_infected_rand: Option<DistributionSpec>,
    pub open_all_sessions: bool,
    pub drop_to_two_sessions: bool,
    pub prop_patients_drop_to_two_sessions: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            random_state: None,
            run_length: DEFAULT_RUN_LENGTH,
            audit_interval: DEFAULT_AUDIT_INTERVAL,
            total_proportion_people_infected: DEFAULT_TOTAL_PROPORTION_INFECTED,
            prop_neg_patients_cov_query: DEFAULT_PROP_NEG_COV_QUERY,
            time_to_infection: None,
            time_positive: None,
            proportion_pos_requiring_inpatient: DEFAULT_PROP_POS_REQUIRING_INPATIENT,
            requiring_inpatient_random: None,
            time_pos_before_inpatient: None,
            time_inpatient: None,
            mortality: DEFAULT_MORTALITY,
            mortality_rand: None,
            random_positive_rate_at_start: DEFAULT_RANDOM_POSITIVE_RATE_AT_START,
            will_be_infected_rand: None,
            open_all_sessions: false,
            drop_to_two_sessions: false,
            prop_patients_drop_to_two_sessions: DEFAULT_PROP_DROP_TO_TWO_SESSIONS,
        }
    }
}

fn realize_or(
    spec: &Option<DistributionSpec>,
    fallback: fn(Option<u64>) -> Box<dyn Distribution>,
    seed: Option<u64>,
) -> Result<Box<dyn Distribution>, DialysisError> {
    match spec {
        Some(spec) => spec.realize(seed),
        None => Ok(fallback(seed)),
    }
}

impl ScenarioConfig {
    /// Parses a configuration from a JSON document. Unknown fields are
    /// rejected so that a typo fails loudly instead of silently running the
    /// default.
    ///
    /// # Errors
    /// Returns [`DialysisError::JsonError`] on malformed input.
    pub fn from_json(text: &str) -> Result<Self, DialysisError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`DialysisError::IoError`] if the file cannot be read, or
    /// [`DialysisError::JsonError`] if it does not parse.
    pub fn from_json_file(path: &Path) -> Result<Self, DialysisError> {
        info!("loading scenario configuration from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Builds a validated [`Scenario`], constructing fresh distribution
    /// instances for every call.
    ///
    /// # Errors
    /// Returns [`DialysisError::InvalidParameter`] when a scalar is out of
    /// range or a distribution spec fails its own validation.
    pub fn build(&self) -> Result<Scenario, DialysisError> {
        debug!("building scenario from configuration");
        let stream = |name: &str| {
            self.random_state
                .map(|base| base.wrapping_add(hash_str(name)))
        };
        ScenarioBuilder::default()
            .run_length(self.run_length)
            .audit_interval(self.audit_interval)
            .total_proportion_people_infected(self.total_proportion_people_infected)
            .prop_neg_patients_cov_query(self.prop_neg_patients_cov_query)
            .proportion_pos_requiring_inpatient(self.proportion_pos_requiring_inpatient)
            .mortality(self.mortality)
            .random_positive_rate_at_start(self.random_positive_rate_at_start)
            .open_all_sessions(self.open_all_sessions)
            .drop_to_two_sessions(self.drop_to_two_sessions)
            .prop_patients_drop_to_two_sessions(self.prop_patients_drop_to_two_sessions)
            .time_to_infection(realize_or(
                &self.time_to_infection,
                default_time_to_infection,
                stream("time_to_infection"),
            )?)
            .time_positive(realize_or(
                &self.time_positive,
                default_time_positive,
                stream("time_positive"),
            )?)
            .requiring_inpatient_random(realize_or(
                &self.requiring_inpatient_random,
                default_requiring_inpatient_random,
                stream("requiring_inpatient_random"),
            )?)
            .time_pos_before_inpatient(realize_or(
                &self.time_pos_before_inpatient,
                default_time_pos_before_inpatient,
                stream("time_pos_before_inpatient"),
            )?)
            .time_inpatient(realize_or(
                &self.time_inpatient,
                default_time_inpatient,
                stream("time_inpatient"),
            )?)
            .mortality_rand(realize_or(
                &self.mortality_rand,
                default_mortality_rand,
                stream("mortality_rand"),
            )?)
            .will_be_infected_rand(realize_or(
                &self.will_be_infected_rand,
                default_will_be_infected_rand,
                stream("will_be_infected_rand"),
            )?)
            .build()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ScenarioConfig::from_json("{}").unwrap();
        assert_eq!(config, ScenarioConfig::default());
        let scenario = config.build().unwrap();
        assert_eq!(scenario.run_length(), 200.0);
        assert_eq!(scenario.mortality(), 0.15);
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = ScenarioConfig::from_json(
            r#"{
                "run_length": 100.0,
                "mortality": 0.3,
                "drop_to_two_sessions": true,
                "time_to_infection": {"kind": "normal", "mean": 30.0, "std": 5.0, "minimum": 0.0}
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.time_to_infection,
            Some(DistributionSpec::Normal {
                mean: 30.0,
                std: 5.0,
                minimum: Some(0.0),
                random_state: None,
            })
        );
        let scenario = config.build().unwrap();
        assert_eq!(scenario.run_length(), 100.0);
        assert_eq!(scenario.mortality(), 0.3);
        assert!(scenario.drop_to_two_sessions());
    }

    #[test]
    fn base_seed_makes_builds_reproducible() {
        let config = ScenarioConfig {
            random_state: Some(42),
            ..Default::default()
        };
        let mut first = config.build().unwrap();
        let mut second = config.build().unwrap();
        assert_eq!(
            first.time_to_infection().sample_n(5),
            second.time_to_infection().sample_n(5)
        );
        // Fresh instances each build: draining one leaves the other alone.
        first.mortality_rand().sample_n(100);
        let mut third = config.build().unwrap();
        assert_eq!(second.mortality_rand().sample(), third.mortality_rand().sample());
    }

    #[test]
    fn base_seed_matches_seeded_scenario() {
        let config = ScenarioConfig {
            random_state: Some(42),
            ..Default::default()
        };
        let mut from_config = config.build().unwrap();
        let mut seeded = Scenario::seeded(42);
        assert_eq!(
            from_config.time_positive().sample_n(5),
            seeded.time_positive().sample_n(5)
        );
    }

    #[test]
    fn explicit_stream_seed_wins_over_base_seed() {
        let spec = DistributionSpec::Uniform {
            minimum: 0.0,
            maximum: 1.0,
            random_state: Some(7),
        };
        let mut with_fallback = spec.realize(Some(1234)).unwrap();
        let mut without = spec.realize(None).unwrap();
        assert_eq!(with_fallback.sample(), without.sample());
    }

    #[test]
    fn invalid_distribution_parameters_fail_at_build() {
        let config = ScenarioConfig::from_json(
            r#"{"time_positive": {"kind": "uniform", "minimum": 14.0, "maximum": 7.0}}"#,
        )
        .unwrap();
        assert!(config.build().is_err());
    }

    #[test]
    fn out_of_range_scalars_fail_at_build() {
        let config = ScenarioConfig::from_json(r#"{"mortality": 1.5}"#).unwrap();
        assert!(config.build().is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ScenarioConfig::from_json(r#"{"run_lenth": 10.0}"#).is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let config = ScenarioConfig {
            mortality: 0.2,
            time_inpatient: Some(DistributionSpec::Uniform {
                minimum: 5.0,
                maximum: 10.0,
                random_state: Some(3),
            }),
            ..Default::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(ScenarioConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"run_length": 50.0}}"#).unwrap();
        let config = ScenarioConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.run_length, 50.0);
    }
}
