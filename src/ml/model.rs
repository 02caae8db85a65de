use burn::{
    module::Param,
    nn::{
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig,
    },
    prelude::*,
    tensor::activation::{relu, sigmoid},
};

/// Clamp for log() in the loss so p = 0 or 1 never yields -inf.
const LOSS_EPS: f32 = 1e-7;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct SiameseLstmConfig {
    /// Rows in the embedding table (vocabulary size + 1 for padding)
    pub table_size: usize,
    #[config(default = 300)]
    pub embedding_dim: usize,
    #[config(default = 225)]
    pub lstm_units: usize,
    #[config(default = 125)]
    pub dense_units: usize,
    #[config(default = 0.25)]
    pub dropout: f64,
}

impl SiameseLstmConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SiameseLstm<B> {
        SiameseLstm {
            left:    self.build_tower(device),
            right:   self.build_tower(device),
            dense:   LinearConfig::new(2 * self.lstm_units, self.dense_units).init(device),
            head:    LinearConfig::new(self.dense_units, 1).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }

    /// Like [`init`](Self::init) but both towers start from the same
    /// pretrained table (row-major `[table_size, embedding_dim]`),
    /// frozen for the whole run.
    pub fn init_with_embeddings<B: Backend>(&self, table: &[f32], device: &B::Device) -> SiameseLstm<B> {
        let mut model = self.init::<B>(device);
        model.left.embedding  = self.frozen_embedding(table, device);
        model.right.embedding = self.frozen_embedding(table, device);
        model
    }

    fn build_tower<B: Backend>(&self, device: &B::Device) -> Tower<B> {
        Tower {
            embedding: EmbeddingConfig::new(self.table_size, self.embedding_dim).init(device),
            lstm:      LstmConfig::new(self.embedding_dim, self.lstm_units, true).init(device),
        }
    }

    fn frozen_embedding<B: Backend>(&self, table: &[f32], device: &B::Device) -> Embedding<B> {
        let weight = Tensor::<B, 1>::from_floats(table, device)
            .reshape([self.table_size, self.embedding_dim]);
        Embedding { weight: Param::from_tensor(weight) }.no_grad()
    }
}

/// Embedding → LSTM, summarised by the final hidden state.
#[derive(Module, Debug)]
pub struct Tower<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Lstm<B>,
}

impl<B: Backend> Tower<B> {
    /// ids: [batch, seq_len] → [batch, lstm_units]
    pub fn forward(&self, ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let embedded  = self.embedding.forward(ids);
        let (_, state) = self.lstm.forward(embedded, None);
        state.hidden
    }
}

#[derive(Module, Debug)]
pub struct SiameseLstm<B: Backend> {
    pub left:    Tower<B>,
    pub right:   Tower<B>,
    pub dense:   Linear<B>,
    pub head:    Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> SiameseLstm<B> {
    /// seq1, seq2: [batch, seq_len] → duplicate probability [batch]
    pub fn forward(&self, seq1: Tensor<B, 2, Int>, seq2: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        let [batch_size, _] = seq1.dims();

        let merged = Tensor::cat(vec![self.left.forward(seq1), self.right.forward(seq2)], 1);
        let x = self.dropout.forward(merged);
        let x = self.dropout.forward(relu(self.dense.forward(x)));

        sigmoid(self.head.forward(x)).reshape([batch_size])
    }

    pub fn forward_loss(
        &self,
        seq1:    Tensor<B, 2, Int>,
        seq2:    Tensor<B, 2, Int>,
        labels:  Tensor<B, 1>,
        weights: Tensor<B, 1>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let probs = self.forward(seq1, seq2);
        let loss  = weighted_bce(probs.clone(), labels, weights);
        (loss, probs)
    }
}

/// Mean of  -w * (y·ln p + (1-y)·ln(1-p))  over the batch.
pub fn weighted_bce<B: Backend>(probs: Tensor<B, 1>, labels: Tensor<B, 1>, weights: Tensor<B, 1>) -> Tensor<B, 1> {
    let p   = probs.clamp(LOSS_EPS, 1.0 - LOSS_EPS);
    let pos = labels.clone() * p.clone().log();
    let neg = labels.neg().add_scalar(1.0) * p.neg().add_scalar(1.0).log();
    ((pos + neg) * weights).neg().mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny() -> SiameseLstmConfig {
        SiameseLstmConfig::new(6)
            .with_embedding_dim(4)
            .with_lstm_units(3)
            .with_dense_units(2)
    }

    #[test]
    fn test_forward_shape_and_range() {
        let device = Default::default();
        let model  = tiny().init::<TestBackend>(&device);
        let seq1   = Tensor::<TestBackend, 1, Int>::from_ints([0, 1, 2, 3, 4, 5].as_slice(), &device).reshape([2, 3]);
        let seq2   = Tensor::<TestBackend, 1, Int>::from_ints([5, 4, 3, 0, 0, 1].as_slice(), &device).reshape([2, 3]);

        let probs: Vec<f32> = model.forward(seq1, seq2).into_data().iter::<f32>().collect();
        assert_eq!(probs.len(), 2);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_weighted_bce_matches_hand_computation() {
        let device  = Default::default();
        let probs   = Tensor::<TestBackend, 1>::from_floats([0.8, 0.4].as_slice(), &device);
        let labels  = Tensor::<TestBackend, 1>::from_floats([1.0, 0.0].as_slice(), &device);
        let weights = Tensor::<TestBackend, 1>::from_floats([2.0, 0.5].as_slice(), &device);

        let loss: f32 = weighted_bce(probs, labels, weights).into_scalar();
        let expected  = (-(2.0 * 0.8f32.ln()) - 0.5 * 0.6f32.ln()) / 2.0;
        assert!((loss - expected).abs() < 1e-5, "{loss} vs {expected}");
    }

    #[test]
    fn test_pretrained_embeddings_are_used() {
        let device = Default::default();
        let cfg    = tiny();
        let table: Vec<f32> = (0..cfg.table_size * cfg.embedding_dim).map(|i| i as f32).collect();
        let model  = cfg.init_with_embeddings::<TestBackend>(&table, &device);

        let got: Vec<f32> = model.left.embedding.weight.val().into_data().iter::<f32>().collect();
        assert_eq!(got, table);
    }
}
