/// Configuration for the Nelder-Mead simplex search
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Stop once the spread of objective values across the simplex falls below this
    pub tolerance: f64,
    /// Offset applied to each coordinate when building the initial simplex
    pub initial_step: f64,
    pub alpha: f64,
    pub gamma: f64,
    pub rho: f64,
    pub sigma: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-10,
            initial_step: 0.1,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub optimal_point: Vec<f64>,
    pub optimal_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

fn clamp_point(point: &mut [f64], bounds: Option<&[(f64, f64)]>) {
    if let Some(bounds) = bounds {
        for (x, (lo, hi)) in point.iter_mut().zip(bounds.iter()) {
            *x = x.clamp(*lo, *hi);
        }
    }
}

/// Minimise `objective` starting from `initial`.
///
/// Points are clamped into `bounds` (one `(low, high)` pair per coordinate) before every
/// evaluation. Non-finite objective values are treated as `+inf` so the simplex moves away
/// from them. The search is fully deterministic.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |p: &[f64]| {
        let v = objective(p);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let mut start = initial.to_vec();
    clamp_point(&mut start, bounds);

    if n == 0 {
        let value = eval(&start);
        return NelderMeadResult {
            optimal_point: start,
            optimal_value: value,
            iterations: 0,
            converged: true,
        };
    }

    // Simplex of n + 1 vertices
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.clone());
    for i in 0..n {
        let mut vertex = start.clone();
        let step = if vertex[i].abs() > 1e-8 {
            vertex[i] * config.initial_step
        } else {
            config.initial_step
        };
        vertex[i] += step;
        clamp_point(&mut vertex, bounds);
        if vertex[i] == start[i] {
            // Clamped back onto the start point, step the other way
            vertex[i] -= 2.0 * step;
            clamp_point(&mut vertex, bounds);
        }
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        // Order vertices by objective value
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));
        simplex = order.iter().map(|i| simplex[*i].clone()).collect();
        values = order.iter().map(|i| values[*i]).collect();

        let best = values[0];
        let worst = values[n];
        if (worst - best).abs() <= config.tolerance * (1.0 + best.abs()) {
            converged = true;
            break;
        }
        iterations += 1;

        let mut centroid = vec![0.0; n];
        for vertex in simplex.iter().take(n) {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / n as f64;
            }
        }

        let towards = |coeff: f64, from: &[f64]| -> Vec<f64> {
            let mut p: Vec<f64> = centroid
                .iter()
                .zip(from)
                .map(|(c, x)| c + coeff * (c - x))
                .collect();
            clamp_point(&mut p, bounds);
            p
        };

        let reflected = towards(config.alpha, &simplex[n]);
        let reflected_value = eval(&reflected);

        if reflected_value < values[0] {
            let expanded = towards(config.alpha * config.gamma, &simplex[n]);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[n] = expanded;
                values[n] = expanded_value;
            } else {
                simplex[n] = reflected;
                values[n] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[n - 1] {
            simplex[n] = reflected;
            values[n] = reflected_value;
            continue;
        }

        let contracted = towards(-config.rho, &simplex[n]);
        let contracted_value = eval(&contracted);
        if contracted_value < values[n] {
            simplex[n] = contracted;
            values[n] = contracted_value;
            continue;
        }

        // Shrink towards the best vertex
        let best_vertex = simplex[0].clone();
        for i in 1..=n {
            let mut p: Vec<f64> = best_vertex
                .iter()
                .zip(&simplex[i])
                .map(|(b, x)| b + config.sigma * (x - b))
                .collect();
            clamp_point(&mut p, bounds);
            values[i] = eval(&p);
            simplex[i] = p;
        }
    }

    let (best_idx, _) = values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .unwrap_or((0, &values[0]));

    NelderMeadResult {
        optimal_point: simplex[best_idx].clone(),
        optimal_value: values[best_idx],
        iterations,
        converged,
    }
}
