//! Nelder–Mead downhill simplex (translates `ql/math/optimization/simplex.hpp`).

use super::{EndCriteria, EndCriteriaType, OptimizationMethod, Problem};
use crate::array::Array;
use sr_core::{ensure, errors::Result, Real};
use tracing::{debug, trace};

const MAX_START_HALVINGS: usize = 50;

/// Derivative-free Nelder–Mead minimizer.
///
/// The starting simplex is the current value plus one vertex per
/// coordinate displaced by `lambda`. Points violating the constraint cost
/// `+∞`, so the simplex never settles outside the feasible region.
/// Deterministic: the same problem always yields the same path.
///
/// Stops when the simplex is smaller than `root_epsilon`, or when the best
/// value has moved by less than `function_epsilon` for more than
/// `max_stationary_state_iterations` iterations in a row.
///
/// Corresponds to `QuantLib::Simplex`.
#[derive(Debug, Clone)]
pub struct Simplex {
    lambda: Real,
}

impl Simplex {
    /// Create a simplex optimizer with initial vertex offset `lambda`.
    pub fn new(lambda: Real) -> Self {
        Self { lambda }
    }

    /// Initial vertex offset.
    pub fn lambda(&self) -> Real {
        self.lambda
    }
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new(0.1)
    }
}

fn penalized_value(problem: &mut Problem<'_>, x: &Array) -> Result<Real> {
    if !problem.constraint().test(x.as_slice()) {
        return Ok(Real::INFINITY);
    }
    let v = problem.value(x)?;
    Ok(if v.is_nan() { Real::INFINITY } else { v })
}

impl OptimizationMethod for Simplex {
    fn minimize(
        &self,
        problem: &mut Problem<'_>,
        end_criteria: &EndCriteria,
    ) -> Result<EndCriteriaType> {
        let x0 = problem.current_value().clone();
        let n = x0.size();
        ensure!(n > 0, "simplex: empty parameter vector");
        ensure!(self.lambda > 0.0, "simplex: lambda must be positive");
        ensure!(
            problem.constraint().test(x0.as_slice()),
            "simplex: initial guess {x0} violates the constraint"
        );

        // starting simplex, shrinking the offset until every vertex is feasible
        let mut vertices = Vec::with_capacity(n + 1);
        vertices.push(x0.clone());
        for i in 0..n {
            let mut step = self.lambda;
            let mut vertex = None;
            for _ in 0..MAX_START_HALVINGS {
                for sign in [1.0, -1.0] {
                    let mut v = x0.clone();
                    v[i] += sign * step;
                    if problem.constraint().test(v.as_slice()) {
                        vertex = Some(v);
                        break;
                    }
                }
                if vertex.is_some() {
                    break;
                }
                step *= 0.5;
            }
            match vertex {
                Some(v) => vertices.push(v),
                None => sr_core::fail!("simplex: no feasible starting vertex along coordinate {i}"),
            }
        }
        let mut values = Vec::with_capacity(n + 1);
        for v in &vertices {
            values.push(penalized_value(problem, v)?);
        }

        let mut iteration = 0;
        let mut stationary = 0;
        let mut previous_best: Option<Real> = None;
        let outcome = loop {
            // order vertices by value, best first
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            vertices = order.iter().map(|&k| vertices[k].clone()).collect();
            values = order.iter().map(|&k| values[k]).collect();

            let size = vertices[1..]
                .iter()
                .map(|v| (v - &vertices[0]).norm())
                .fold(0.0, Real::max);
            trace!(iteration, best = values[0], size, "simplex iteration");
            if size < end_criteria.root_epsilon {
                break EndCriteriaType::StationaryPoint;
            }
            if let Some(f_old) = previous_best {
                if let Some(ec) =
                    end_criteria.check_stationary_function_value(f_old, values[0], &mut stationary)
                {
                    break ec;
                }
            }
            previous_best = Some(values[0]);
            if let Some(ec) = end_criteria.check_max_iterations(iteration) {
                break ec;
            }
            iteration += 1;

            let mut centroid = Array::zeros(n);
            for v in &vertices[..n] {
                centroid = &centroid + v;
            }
            let centroid = &centroid * (1.0 / n as Real);
            let worst = vertices[n].clone();
            let f_worst = values[n];

            let reflected = &(&centroid * 2.0) - &worst;
            let f_reflected = penalized_value(problem, &reflected)?;

            if f_reflected < values[0] {
                let expanded = &(&reflected * 2.0) - &centroid;
                let f_expanded = penalized_value(problem, &expanded)?;
                if f_expanded < f_reflected {
                    vertices[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    vertices[n] = reflected;
                    values[n] = f_reflected;
                }
                continue;
            }
            if f_reflected < values[n - 1] {
                vertices[n] = reflected;
                values[n] = f_reflected;
                continue;
            }

            let (contracted, bound) = if f_reflected < f_worst {
                (&(&centroid + &reflected) * 0.5, f_reflected)
            } else {
                (&(&centroid + &worst) * 0.5, f_worst)
            };
            let f_contracted = penalized_value(problem, &contracted)?;
            if f_contracted < bound {
                vertices[n] = contracted;
                values[n] = f_contracted;
                continue;
            }

            // shrink towards the best vertex
            let best = vertices[0].clone();
            for k in 1..=n {
                vertices[k] = &(&best + &vertices[k]) * 0.5;
                values[k] = penalized_value(problem, &vertices[k])?;
            }
        };

        debug!(
            iterations = iteration,
            value = values[0],
            evaluations = problem.function_evaluations(),
            outcome = %outcome,
            "simplex finished"
        );
        problem.set_current_value(vertices[0].clone());
        problem.set_function_value(values[0]);
        Ok(outcome)
    }
}
