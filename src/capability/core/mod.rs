//! core — shared capability data, link, transition, parameters and forecasts.
//!
//! Purpose
//! -------
//! Collect the building blocks of the latent capability model: validated
//! observation series, the logistic observation link, the random-walk
//! transition, hyperparameters and estimation options, per-index filter
//! states, and open-loop forecasting. The filters in
//! [`crate::capability::filters`] and the estimator in
//! [`crate::capability::models`] are written against these types.
//!
//! Key behaviors
//! -------------
//! - [`Observations`] validates time order and score range once, at the
//!   boundary.
//! - [`LogisticLink`] / [`observe`] map capability to an expected score and
//!   expose the partials the analytic EKF gradient needs.
//! - [`RandomWalkDrift`] propagates Gaussian moments over any `dt > 0`.
//! - [`ModelParameters`], [`ParamBounds`], [`FitOptions`] and
//!   [`FitStrategy`] describe what is fitted and how.
//! - [`FilterState`] / [`FilterResult`] hold the output of one filter pass;
//!   [`forecast`] extrapolates from the final posterior.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; index 0 is the earliest observation.
//! - Hyperparameter vectors use the layout
//!   `[mu, sigma_omega, g, sigma_nu, initial_c, initial_variance]`.
//! - This module performs no I/O and no logging. Errors are reported as
//!   [`crate::capability::errors::CapabilityError`].

pub mod data;
pub mod forecasts;
pub mod link;
pub mod options;
pub mod params;
pub mod state;
pub mod transition;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{Observation, Observations};
pub use self::forecasts::{ForecastPoint, ForecastResult, forecast, two_sided_z};
pub use self::link::{LinkPartials, LogisticLink, observe, observe_derivative};
pub use self::options::{FitOptions, FitStrategy, MAX_RESTARTS, ParamBounds};
pub use self::params::{ModelParameters, N_PARAMS, PARAM_NAMES};
pub use self::state::{FilterResult, FilterState};
pub use self::transition::RandomWalkDrift;
pub use self::validation::{validate_confidence, validate_forecast_times, validate_series};

pub mod prelude {
    pub use super::data::{Observation, Observations};
    pub use super::forecasts::{ForecastResult, forecast};
    pub use super::link::LogisticLink;
    pub use super::options::{FitOptions, FitStrategy, ParamBounds};
    pub use super::params::ModelParameters;
    pub use super::state::{FilterResult, FilterState};
    pub use super::transition::RandomWalkDrift;
}
