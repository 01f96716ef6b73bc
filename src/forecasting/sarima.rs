//! Seasonal ARIMA, `SARIMA(p, d, q)(P, D, Q, s)`, fitted by conditional sum of squares.
//!
//! The model is written as
//!
//! ```text
//! φ(B) Φ(B^s) (1 - B)^d (1 - B^s)^D y_t = θ(B) Θ(B^s) ε_t
//! ```
//!
//! All autoregressive and differencing factors are multiplied into a single lag polynomial
//! over the raw series, so residuals and forecasts are computed directly on the original scale
//! without an explicit undifferencing pass. There is no constant term.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::forecasting::optimization::{NelderMeadConfig, nelder_mead};

/// Coefficient bound used during estimation
const COEFF_BOUND: f64 = 0.99;
const MAX_ORDER: usize = 5;
const MAX_DIFF: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("invalid model order: {0}")]
    InvalidOrder(String),

    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("series contains NaN or infinite values")]
    NonFinite,

    #[error("optimizer diverged: objective is not finite at the optimum")]
    Diverged,
}

/// Model order `(p, d, q)(P, D, Q, s)`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl Default for SarimaOrder {
    fn default() -> Self {
        Self {
            p: 0,
            d: 0,
            q: 1,
            seasonal_p: 0,
            seasonal_d: 1,
            seasonal_q: 1,
            period: 12,
        }
    }
}

impl SarimaOrder {
    pub fn new(
        (p, d, q): (usize, usize, usize),
        (seasonal_p, seasonal_d, seasonal_q, period): (usize, usize, usize, usize),
    ) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            period,
        }
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn has_seasonal_terms(&self) -> bool {
        self.seasonal_p + self.seasonal_d + self.seasonal_q > 0
    }

    pub fn validate(&self) -> Result<(), FitError> {
        for (name, value) in [
            ("p", self.p),
            ("q", self.q),
            ("P", self.seasonal_p),
            ("Q", self.seasonal_q),
        ] {
            if value > MAX_ORDER {
                return Err(FitError::InvalidOrder(format!(
                    "{} must be <= {}, got {}",
                    name, MAX_ORDER, value
                )));
            }
        }
        if self.d > MAX_DIFF || self.seasonal_d > MAX_DIFF {
            return Err(FitError::InvalidOrder(format!(
                "differencing orders must be <= {}",
                MAX_DIFF
            )));
        }
        if self.has_seasonal_terms() && self.period < 2 {
            return Err(FitError::InvalidOrder(
                "seasonal period must be >= 2 when seasonal terms are present".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of estimated coefficients
    pub fn n_params(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    fn seasonal_period(&self) -> usize {
        if self.has_seasonal_terms() { self.period } else { 0 }
    }

    /// Number of leading observations consumed by the AR and differencing lags
    pub fn burn_in(&self) -> usize {
        self.p + self.d + self.seasonal_period() * (self.seasonal_p + self.seasonal_d)
    }

    /// Smallest series length that leaves enough residuals to estimate every coefficient
    pub fn min_observations(&self) -> usize {
        self.burn_in() + self.n_params() + 2
    }

    /// Full lag polynomial for the AR side, differencing included, with `poly[0] == 1`
    fn ar_polynomial(&self, params: &[f64]) -> Vec<f64> {
        let s = self.seasonal_period();
        let (phi, rest) = params.split_at(self.p);
        let seasonal_phi = &rest[self.q..self.q + self.seasonal_p];

        let mut poly = lag_polynomial(phi, 1, -1.0);
        poly = poly_mul(&poly, &lag_polynomial(seasonal_phi, s, -1.0));
        for _ in 0..self.d {
            poly = poly_mul(&poly, &[1.0, -1.0]);
        }
        for _ in 0..self.seasonal_d {
            let mut seasonal_diff = vec![0.0; s + 1];
            seasonal_diff[0] = 1.0;
            seasonal_diff[s] = -1.0;
            poly = poly_mul(&poly, &seasonal_diff);
        }
        poly
    }

    /// Lag polynomial for the MA side, with `poly[0] == 1`
    fn ma_polynomial(&self, params: &[f64]) -> Vec<f64> {
        let s = self.seasonal_period();
        let theta = &params[self.p..self.p + self.q];
        let seasonal_theta = &params[self.p + self.q + self.seasonal_p..];

        poly_mul(
            &lag_polynomial(theta, 1, 1.0),
            &lag_polynomial(seasonal_theta, s, 1.0),
        )
    }
}

/// Builds `1 + sign * (c_1 B^stride + c_2 B^{2 stride} + ...)`
fn lag_polynomial(coeffs: &[f64], stride: usize, sign: f64) -> Vec<f64> {
    if coeffs.is_empty() {
        return vec![1.0];
    }
    let mut poly = vec![0.0; coeffs.len() * stride + 1];
    poly[0] = 1.0;
    for (i, c) in coeffs.iter().enumerate() {
        poly[(i + 1) * stride] = sign * c;
    }
    poly
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// One-step-ahead residuals, conditional on zero residuals before the burn-in.
/// Returns the residual vector (same length as `values`) and its sum of squares.
fn conditional_residuals(values: &[f64], ar: &[f64], ma: &[f64]) -> (Vec<f64>, f64) {
    let start = ar.len() - 1;
    let mut residuals = vec![0.0; values.len()];
    let mut css = 0.0;

    for t in start..values.len() {
        let mut e = values[t];
        for (k, a) in ar.iter().enumerate().skip(1) {
            e += a * values[t - k];
        }
        for (k, m) in ma.iter().enumerate().skip(1) {
            if t >= k {
                e -= m * residuals[t - k];
            }
        }
        residuals[t] = e;
        css += e * e;
    }

    (residuals, css)
}

/// Unfitted model specification
#[derive(Debug, Clone)]
pub struct Sarima {
    order: SarimaOrder,
    optimizer: NelderMeadConfig,
}

impl Sarima {
    pub fn new(order: SarimaOrder) -> Result<Self, FitError> {
        order.validate()?;
        Ok(Self {
            order,
            optimizer: NelderMeadConfig {
                max_iter: 2000,
                tolerance: 1e-12,
                ..Default::default()
            },
        })
    }

    pub fn fit(&self, values: &[f64]) -> Result<FittedSarima, FitError> {
        let order = self.order;
        let required = order.min_observations();
        if values.len() < required {
            return Err(FitError::InsufficientData {
                required,
                actual: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite);
        }

        let k = order.n_params();
        let bounds = vec![(-COEFF_BOUND, COEFF_BOUND); k];
        let objective = |params: &[f64]| {
            let ar = order.ar_polynomial(params);
            let ma = order.ma_polynomial(params);
            conditional_residuals(values, &ar, &ma).1
        };

        let result = nelder_mead(objective, &vec![0.0; k], Some(&bounds), self.optimizer.clone());
        if !result.optimal_value.is_finite() {
            return Err(FitError::Diverged);
        }

        let coefficients = result.optimal_point;
        let ar_poly = order.ar_polynomial(&coefficients);
        let ma_poly = order.ma_polynomial(&coefficients);
        let (residuals, css) = conditional_residuals(values, &ar_poly, &ma_poly);
        let effective = (values.len() - order.burn_in()).max(1);

        if !result.converged {
            tracing::warn!(
                iterations = result.iterations,
                "SARIMA optimizer stopped at the iteration cap without converging"
            );
        }
        tracing::debug!(?coefficients, css, iterations = result.iterations, "SARIMA fit complete");

        Ok(FittedSarima {
            order,
            coefficients,
            ar_poly,
            ma_poly,
            values: values.to_vec(),
            residuals,
            css,
            sigma2: css / effective as f64,
            converged: result.converged,
            iterations: result.iterations,
        })
    }
}

/// A fitted model: coefficients plus the state needed to forecast from the end of the
/// training series
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FittedSarima {
    pub order: SarimaOrder,
    /// Estimated coefficients, laid out as `[φ.., θ.., Φ.., Θ..]`
    pub coefficients: Vec<f64>,
    ar_poly: Vec<f64>,
    ma_poly: Vec<f64>,
    values: Vec<f64>,
    residuals: Vec<f64>,
    pub css: f64,
    pub sigma2: f64,
    pub converged: bool,
    pub iterations: usize,
}

impl FittedSarima {
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.coefficients[..self.order.p]
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.coefficients[self.order.p..self.order.p + self.order.q]
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.coefficients[self.order.p + self.order.q + self.order.seasonal_p..]
    }

    /// Structural checks for a model that came from outside this process
    pub fn check_consistency(&self) -> Result<(), String> {
        self.order.validate().map_err(|e| e.to_string())?;
        if self.coefficients.len() != self.order.n_params() {
            return Err(format!(
                "expected {} coefficients, found {}",
                self.order.n_params(),
                self.coefficients.len()
            ));
        }
        if self.ar_poly.first() != Some(&1.0) || self.ma_poly.first() != Some(&1.0) {
            return Err("lag polynomials must start with 1".to_string());
        }
        if self.values.len() < self.ar_poly.len() {
            return Err("training series is shorter than the AR lag polynomial".to_string());
        }
        if self.residuals.len() != self.values.len() {
            return Err("residual and training series lengths differ".to_string());
        }
        if self.coefficients.iter().chain(&self.values).any(|v| !v.is_finite()) {
            return Err("model contains non-finite values".to_string());
        }
        Ok(())
    }

    /// Point forecasts for the next `steps` periods
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut values = self.values.clone();
        let mut residuals = self.residuals.clone();
        let n = values.len();

        for _ in 0..steps {
            let t = values.len();
            let mut next = 0.0;
            for (k, a) in self.ar_poly.iter().enumerate().skip(1) {
                next -= a * values[t - k];
            }
            for (k, m) in self.ma_poly.iter().enumerate().skip(1) {
                if t >= k {
                    next += m * residuals[t - k];
                }
            }
            values.push(next);
            residuals.push(0.0);
        }

        values.split_off(n)
    }
}
