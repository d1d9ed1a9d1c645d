//! LSTM cell and stacked recurrence

use ndarray::{s, Array1, Array2, Array3};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

/// Single LSTM cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmCell {
    /// Input size
    pub input_size: usize,
    /// Hidden state size
    pub hidden_size: usize,

    // Input gate
    w_ii: Array2<f32>,
    w_hi: Array2<f32>,
    b_i: Array1<f32>,

    // Forget gate
    w_if: Array2<f32>,
    w_hf: Array2<f32>,
    b_f: Array1<f32>,

    // Cell candidate
    w_ig: Array2<f32>,
    w_hg: Array2<f32>,
    b_g: Array1<f32>,

    // Output gate
    w_io: Array2<f32>,
    w_ho: Array2<f32>,
    b_o: Array1<f32>,
}

impl LstmCell {
    /// Create a new LSTM cell
    ///
    /// Weights are drawn uniformly from ±1/sqrt(hidden_size); the forget
    /// gate bias starts at 1 so early gradients pass through.
    pub fn new(input_size: usize, hidden_size: usize) -> Self {
        let limit = (1.0 / hidden_size as f32).sqrt();
        let dist = Uniform::new(-limit, limit);

        Self {
            input_size,
            hidden_size,
            w_ii: Array2::random((hidden_size, input_size), dist),
            w_hi: Array2::random((hidden_size, hidden_size), dist),
            b_i: Array1::zeros(hidden_size),
            w_if: Array2::random((hidden_size, input_size), dist),
            w_hf: Array2::random((hidden_size, hidden_size), dist),
            b_f: Array1::from_elem(hidden_size, 1.0),
            w_ig: Array2::random((hidden_size, input_size), dist),
            w_hg: Array2::random((hidden_size, hidden_size), dist),
            b_g: Array1::zeros(hidden_size),
            w_io: Array2::random((hidden_size, input_size), dist),
            w_ho: Array2::random((hidden_size, hidden_size), dist),
            b_o: Array1::zeros(hidden_size),
        }
    }

    /// Advance one timestep
    ///
    /// # Arguments
    ///
    /// * `x` - Input vector [input_size]
    /// * `h_prev` - Previous hidden state [hidden_size]
    /// * `c_prev` - Previous cell state [hidden_size]
    ///
    /// # Returns
    ///
    /// (h_next, c_next)
    pub fn step(
        &self,
        x: &Array1<f32>,
        h_prev: &Array1<f32>,
        c_prev: &Array1<f32>,
    ) -> (Array1<f32>, Array1<f32>) {
        // i = σ(W_ii x + W_hi h + b_i)
        let i_gate = sigmoid(&(self.w_ii.dot(x) + self.w_hi.dot(h_prev) + &self.b_i));

        // f = σ(W_if x + W_hf h + b_f)
        let f_gate = sigmoid(&(self.w_if.dot(x) + self.w_hf.dot(h_prev) + &self.b_f));

        // g = tanh(W_ig x + W_hg h + b_g)
        let g = tanh(&(self.w_ig.dot(x) + self.w_hg.dot(h_prev) + &self.b_g));

        // o = σ(W_io x + W_ho h + b_o)
        let o_gate = sigmoid(&(self.w_io.dot(x) + self.w_ho.dot(h_prev) + &self.b_o));

        // c = f * c_prev + i * g
        let c_next = &f_gate * c_prev + &i_gate * &g;

        // h = o * tanh(c)
        let h_next = &o_gate * &tanh(&c_next);

        (h_next, c_next)
    }

    /// Zero-initialized (hidden, cell) state
    pub fn init_state(&self) -> (Array1<f32>, Array1<f32>) {
        (
            Array1::zeros(self.hidden_size),
            Array1::zeros(self.hidden_size),
        )
    }

    /// Get number of parameters
    pub fn num_params(&self) -> usize {
        4 * (self.hidden_size * self.input_size + self.hidden_size * self.hidden_size
            + self.hidden_size)
    }
}

/// Stacked LSTM over batch-first sequences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lstm {
    /// Input size
    pub input_size: usize,
    /// Hidden state size
    pub hidden_size: usize,
    /// One cell per layer
    cells: Vec<LstmCell>,
}

impl Lstm {
    /// Create a stacked LSTM
    pub fn new(input_size: usize, hidden_size: usize, num_layers: usize) -> Self {
        let mut cells = Vec::with_capacity(num_layers);

        // First layer consumes the input features
        cells.push(LstmCell::new(input_size, hidden_size));

        // Later layers consume the hidden state of the layer below
        for _ in 1..num_layers {
            cells.push(LstmCell::new(hidden_size, hidden_size));
        }

        Self {
            input_size,
            hidden_size,
            cells,
        }
    }

    /// Number of stacked layers
    pub fn num_layers(&self) -> usize {
        self.cells.len()
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `x` - Input sequence [batch, seq_len, input_size]
    ///
    /// # Returns
    ///
    /// The top layer's hidden state at the final timestep, [batch, hidden_size]
    pub fn forward(&self, x: &Array3<f32>) -> Array2<f32> {
        let (batch_size, seq_len, features) = x.dim();
        assert_eq!(features, self.input_size, "input feature count mismatch");

        let mut output = Array2::zeros((batch_size, self.hidden_size));

        for b in 0..batch_size {
            let mut states: Vec<(Array1<f32>, Array1<f32>)> =
                self.cells.iter().map(|cell| cell.init_state()).collect();

            for t in 0..seq_len {
                let mut layer_input: Array1<f32> = x.slice(s![b, t, ..]).to_owned();

                for (layer_idx, cell) in self.cells.iter().enumerate() {
                    let (h_prev, c_prev) = &states[layer_idx];
                    let (h_next, c_next) = cell.step(&layer_input, h_prev, c_prev);

                    layer_input = h_next.clone();
                    states[layer_idx] = (h_next, c_next);
                }
            }

            output.row_mut(b).assign(&states[self.cells.len() - 1].0);
        }

        output
    }

    /// Get number of parameters
    pub fn num_params(&self) -> usize {
        self.cells.iter().map(|cell| cell.num_params()).sum()
    }
}

fn sigmoid(x: &Array1<f32>) -> Array1<f32> {
    x.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

fn tanh(x: &Array1<f32>) -> Array1<f32> {
    x.mapv(|v| v.tanh())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_step_shapes() {
        let cell = LstmCell::new(5, 10);
        let x = Array1::zeros(5);
        let (h, c) = cell.init_state();

        let (h_next, c_next) = cell.step(&x, &h, &c);

        assert_eq!(h_next.len(), 10);
        assert_eq!(c_next.len(), 10);
    }

    #[test]
    fn test_forget_gate_bias_starts_at_one() {
        let cell = LstmCell::new(3, 7);
        assert!(cell.b_f.iter().all(|&b| b == 1.0));
        assert!(cell.b_i.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_stacked_forward_shape() {
        let lstm = Lstm::new(3, 8, 2);
        assert_eq!(lstm.num_layers(), 2);

        let x = Array3::zeros((2, 10, 3));
        let output = lstm.forward(&x);

        assert_eq!(output.shape(), &[2, 8]);
    }

    #[test]
    fn test_cell_param_count() {
        let cell = LstmCell::new(1, 25);
        // 4 gates, each with input weights, recurrent weights and a bias
        assert_eq!(cell.num_params(), 4 * (25 * 1 + 25 * 25 + 25));
    }
}
