//! The immutable parameter bundle one simulation replication runs against.

use crate::distribution::{Distribution, Normal, Uniform};
use crate::error::DialysisError;
use crate::hashing::hash_str;
use derive_builder::Builder;
use log::trace;

pub(crate) const DEFAULT_RUN_LENGTH: f64 = 200.0;
pub(crate) const DEFAULT_AUDIT_INTERVAL: u32 = 1;
pub(crate) const DEFAULT_TOTAL_PROPORTION_INFECTED: f64 = 0.8;
pub(crate) const DEFAULT_PROP_NEG_COV_QUERY: f64 = 0.02;
pub(crate) const DEFAULT_PROP_POS_REQUIRING_INPATIENT: f64 = 0.4;
pub(crate) const DEFAULT_MORTALITY: f64 = 0.15;
pub(crate) const DEFAULT_RANDOM_POSITIVE_RATE_AT_START: f64 = 0.0;
pub(crate) const DEFAULT_PROP_DROP_TO_TWO_SESSIONS: f64 = 0.9;

// Default stream factories, invoked once per scenario construction. Every
// scenario owns fresh instances; no default value is shared at the type
// level.

pub(crate) fn default_time_to_infection(random_state: Option<u64>) -> Box<dyn Distribution> {
    Box::new(
        Normal::new(60.0, 15.0, Some(0.0), random_state)
            .expect("default infection timing parameters are valid"),
    )
}

pub(crate) fn default_time_positive(random_state: Option<u64>) -> Box<dyn Distribution> {
    Box::new(
        Uniform::new(7.0, 14.0, random_state).expect("default positive duration bounds are valid"),
    )
}

pub(crate) fn default_requiring_inpatient_random(
    random_state: Option<u64>,
) -> Box<dyn Distribution> {
    Box::new(Uniform::new(0.0, 1.0, random_state).expect("unit interval bounds are valid"))
}

pub(crate) fn default_time_pos_before_inpatient(random_state: Option<u64>) -> Box<dyn Distribution> {
    Box::new(Uniform::new(3.0, 7.0, random_state).expect("default admission delay bounds are valid"))
}

pub(crate) fn default_time_inpatient(random_state: Option<u64>) -> Box<dyn Distribution> {
    Box::new(Uniform::new(7.0, 14.0, random_state).expect("default inpatient stay bounds are valid"))
}

pub(crate) fn default_mortality_rand(random_state: Option<u64>) -> Box<dyn Distribution> {
    Box::new(Uniform::new(0.0, 1.0, random_state).expect("unit interval bounds are valid"))
}

pub(crate) fn default_will_be_infected_rand(random_state: Option<u64>) -> Box<dyn Distribution> {
    Box::new(Uniform::new(0.0, 1.0, random_state).expect("unit interval bounds are valid"))
}

/// Every parameter of one dialysis-clinic outbreak replication.
///
/// A scenario is built once, handed to the simulation engine, and read for
/// the whole run. Fields are private with no setters, so bindings can never
/// change after construction; "updating" a scenario means building a new one
/// through [`ScenarioBuilder`]. The distribution accessors take `&mut self`
/// because sampling advances the owned stream, but they expose the stream
/// only behind `&mut dyn Distribution`; the binding itself stays fixed.
///
/// Every construction runs the default factories anew, so two scenarios never
/// share a stream even when both are all-default.
#[derive(Debug, Builder)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate", error = "DialysisError"))]
pub struct Scenario {
    /// Simulated time units covered by one replication.
    #[builder(default = "DEFAULT_RUN_LENGTH")]
    run_length: f64,

    /// Simulated time units between audits of the clinic population.
    #[builder(default = "DEFAULT_AUDIT_INTERVAL")]
    audit_interval: u32,

    /// Proportion of all people who will get infected, capped by herd
    /// immunity.
    #[builder(default = "DEFAULT_TOTAL_PROPORTION_INFECTED")]
    total_proportion_people_infected: f64,

    /// Proportion of negative patients who present as possible cases.
    #[builder(default = "DEFAULT_PROP_NEG_COV_QUERY")]
    prop_neg_patients_cov_query: f64,

    /// Time from exposure to infection, floored at zero.
    #[builder(default = "default_time_to_infection(None)")]
    time_to_infection: Box<dyn Distribution>,

    /// How long a patient stays positive.
    #[builder(default = "default_time_positive(None)")]
    time_positive: Box<dyn Distribution>,

    /// Proportion of positive patients requiring inpatient care.
    #[builder(default = "DEFAULT_PROP_POS_REQUIRING_INPATIENT")]
    proportion_pos_requiring_inpatient: f64,

    /// Unit-interval draw gating inpatient admission.
    #[builder(default = "default_requiring_inpatient_random(None)")]
    requiring_inpatient_random: Box<dyn Distribution>,

    /// Time spent positive before inpatient admission.
    #[builder(default = "default_time_pos_before_inpatient(None)")]
    time_pos_before_inpatient: Box<dyn Distribution>,

    /// Length of an inpatient stay.
    #[builder(default = "default_time_inpatient(None)")]
    time_inpatient: Box<dyn Distribution>,

    /// Mortality rate among positive patients.
    #[builder(default = "DEFAULT_MORTALITY")]
    mortality: f64,

    /// Unit-interval draw deciding death against `mortality`.
    #[builder(default = "default_mortality_rand(None)")]
    mortality_rand: Box<dyn Distribution>,

    /// Rate of positives randomly injected among negative patients at start.
    #[builder(default = "DEFAULT_RANDOM_POSITIVE_RATE_AT_START")]
    random_positive_rate_at_start: f64,

    /// Unit-interval draw deciding whether a patient can ever be infected,
    /// judged against `total_proportion_people_infected`.
    #[builder(default = "default_will_be_infected_rand(None)")]
    will_be_infected_rand: Box<dyn Distribution>,

    /// Strategy: open all dialysis sessions to positive patients.
    #[builder(default)]
    open_all_sessions: bool,

    /// Strategy: move patients from three weekly sessions to two.
    #[builder(default)]
    drop_to_two_sessions: bool,

    /// Proportion of patients who actually drop to two sessions when the
    /// strategy is active.
    #[builder(default = "DEFAULT_PROP_DROP_TO_TWO_SESSIONS")]
    prop_patients_drop_to_two_sessions: f64,
}

impl Scenario {
    /// Builds an all-default scenario whose streams are seeded
    /// deterministically from `base_seed`.
    ///
    /// Each field derives its own seed by hashing the field name, so the
    /// streams stay mutually independent while the scenario as a whole
    /// reproduces across runs.
    pub fn seeded(base_seed: u64) -> Self {
        trace!("seeding scenario distributions from base seed {base_seed}");
        let stream = |name: &str| Some(base_seed.wrapping_add(hash_str(name)));
        ScenarioBuilder::default()
            .time_to_infection(default_time_to_infection(stream("time_to_infection")))
            .time_positive(default_time_positive(stream("time_positive")))
            .requiring_inpatient_random(default_requiring_inpatient_random(stream(
                "requiring_inpatient_random",
            )))
            .time_pos_before_inpatient(default_time_pos_before_inpatient(stream(
                "time_pos_before_inpatient",
            )))
            .time_inpatient(default_time_inpatient(stream("time_inpatient")))
            .mortality_rand(default_mortality_rand(stream("mortality_rand")))
            .will_be_infected_rand(default_will_be_infected_rand(stream("will_be_infected_rand")))
            .build()
            .expect("default scenario parameters are valid")
    }

    pub fn run_length(&self) -> f64 {
        self.run_length
    }

    pub fn audit_interval(&self) -> u32 {
        self.audit_interval
    }

    pub fn total_proportion_people_infected(&self) -> f64 {
        self.total_proportion_people_infected
    }

    pub fn prop_neg_patients_cov_query(&self) -> f64 {
        self.prop_neg_patients_cov_query
    }

    pub fn proportion_pos_requiring_inpatient(&self) -> f64 {
        self.proportion_pos_requiring_inpatient
    }

    pub fn mortality(&self) -> f64 {
        self.mortality
    }

    pub fn random_positive_rate_at_start(&self) -> f64 {
        self.random_positive_rate_at_start
    }

    pub fn open_all_sessions(&self) -> bool {
        self.open_all_sessions
    }

    pub fn drop_to_two_sessions(&self) -> bool {
        self.drop_to_two_sessions
    }

    pub fn prop_patients_drop_to_two_sessions(&self) -> f64 {
        self.prop_patients_drop_to_two_sessions
    }

    pub fn time_to_infection(&mut self) -> &mut dyn Distribution {
        self.time_to_infection.as_mut()
    }

    pub fn time_positive(&mut self) -> &mut dyn Distribution {
        self.time_positive.as_mut()
    }

    pub fn requiring_inpatient_random(&mut self) -> &mut dyn Distribution {
        self.requiring_inpatient_random.as_mut()
    }

    pub fn time_pos_before_inpatient(&mut self) -> &mut dyn Distribution {
        self.time_pos_before_inpatient.as_mut()
    }

    pub fn time_inpatient(&mut self) -> &mut dyn Distribution {
        self.time_inpatient.as_mut()
    }

    pub fn mortality_rand(&mut self) -> &mut dyn Distribution {
        self.mortality_rand.as_mut()
    }

    pub fn will_be_infected_rand(&mut self) -> &mut dyn Distribution {
        self.will_be_infected_rand.as_mut()
    }
}

impl Default for Scenario {
    fn default() -> Self {
        ScenarioBuilder::default().build().unwrap()
    }
}

impl ScenarioBuilder {
    fn validate(&self) -> Result<(), DialysisError> {
        for (name, value) in [
            (
                "total_proportion_people_infected",
                self.total_proportion_people_infected,
            ),
            ("prop_neg_patients_cov_query", self.prop_neg_patients_cov_query),
            (
                "proportion_pos_requiring_inpatient",
                self.proportion_pos_requiring_inpatient,
            ),
            ("mortality", self.mortality),
            (
                "random_positive_rate_at_start",
                self.random_positive_rate_at_start,
            ),
            (
                "prop_patients_drop_to_two_sessions",
                self.prop_patients_drop_to_two_sessions,
            ),
        ] {
            if let Some(proportion) = value {
                if !(0.0..=1.0).contains(&proportion) {
                    return Err(DialysisError::InvalidParameter(format!(
                        "{name} must lie in [0, 1], got {proportion}"
                    )));
                }
            }
        }
        if let Some(run_length) = self.run_length {
            if !run_length.is_finite() || run_length <= 0.0 {
                return Err(DialysisError::InvalidParameter(format!(
                    "run_length must be positive and finite, got {run_length}"
                )));
            }
        }
        if self.audit_interval == Some(0) {
            return Err(DialysisError::InvalidParameter(
                "audit_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
