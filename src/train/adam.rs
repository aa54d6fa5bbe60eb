//! Adaptive per-parameter gradient descent (Adam).
//!
//! Kept separate from the encoder's forward contract so update behavior
//! and forward correctness can be tested independently. First and second
//! moment estimates are bias-corrected.

use ndarray::{Array2, Zip};

pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    step_count: i32,
    first_moment: Vec<Array2<f32>>,
    second_moment: Vec<Array2<f32>>,
}

impl Adam {
    /// Optimizer over a fixed set of parameter matrices, identified by
    /// position. `shapes` must match the parameter shapes passed to
    /// every `step` call.
    pub fn new(learning_rate: f32, shapes: &[(usize, usize)]) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            step_count: 0,
            first_moment: shapes.iter().map(|&s| Array2::zeros(s)).collect(),
            second_moment: shapes.iter().map(|&s| Array2::zeros(s)).collect(),
        }
    }

    /// Apply one update to every parameter matrix from its gradient.
    pub fn step(&mut self, params: &mut [&mut Array2<f32>], grads: &[&Array2<f32>]) {
        debug_assert_eq!(params.len(), self.first_moment.len());
        debug_assert_eq!(grads.len(), self.first_moment.len());

        self.step_count += 1;
        let bias1 = 1.0 - self.beta1.powi(self.step_count);
        let bias2 = 1.0 - self.beta2.powi(self.step_count);
        let lr = self.learning_rate;
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        for (grad, (m, v)) in grads
            .iter()
            .zip(self.first_moment.iter_mut().zip(self.second_moment.iter_mut()))
        {
            Zip::from(m)
                .and(*grad)
                .for_each(|m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
            Zip::from(v)
                .and(*grad)
                .for_each(|v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
        }

        for (param, (m, v)) in params
            .iter_mut()
            .zip(self.first_moment.iter().zip(self.second_moment.iter()))
        {
            Zip::from(&mut **param).and(m).and(v).for_each(|p, &m, &v| {
                let m_hat = m / bias1;
                let v_hat = v / bias2;
                *p -= lr * m_hat / (v_hat.sqrt() + epsilon);
            });
        }
    }
}
