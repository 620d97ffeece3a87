use std::{fs, path::Path};

use log::debug;
use safetensors::{Dtype, SafeTensors, serialize, tensor::TensorView};

use crate::{MlErr, Result, specs::TrainerSpec, training::CompiledModel};

/// The file holding the serialized `TrainerSpec`.
pub const MODEL_FILE: &str = "model.json";

/// The file holding the model's parameters.
pub const PARAMS_FILE: &str = "params.safetensors";

/// The name of the flat parameter tensor inside `PARAMS_FILE`.
pub const PARAMS_TENSOR: &str = "params";

/// Safetensors stores every value little endian.
fn to_le_bytes(params: &[f32]) -> Vec<u8> {
    params.iter().flat_map(|p| p.to_le_bytes()).collect()
}

fn from_le_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(size_of::<f32>())
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

impl CompiledModel {
    /// Writes this model to the directory `dir`, creating it if needed.
    ///
    /// The directory ends up with the model's spec as JSON and its parameters as a single
    /// one dimensional `f32` safetensors tensor. The optimizer state is not saved.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let spec = serde_json::to_vec_pretty(self.spec())?;
        fs::write(dir.join(MODEL_FILE), spec)?;

        let params = self.params();
        let data = to_le_bytes(params);
        let view = TensorView::new(Dtype::F32, vec![params.len()], &data)?;
        let bytes = serialize([(PARAMS_TENSOR, &view)], &None)?;
        fs::write(dir.join(PARAMS_FILE), bytes)?;

        debug!("saved {} parameters to {}", params.len(), dir.display());
        Ok(())
    }

    /// Reads a model previously written with `save` from the directory `dir`.
    ///
    /// # Returns
    /// An error if a file is missing or corrupt, or the parameters don't fit the model.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let spec: TrainerSpec = serde_json::from_slice(&fs::read(dir.join(MODEL_FILE))?)?;
        let bytes = fs::read(dir.join(PARAMS_FILE))?;
        let tensors = SafeTensors::deserialize(&bytes)?;
        let tensor = tensors.tensor(PARAMS_TENSOR)?;

        if tensor.dtype() != Dtype::F32 || tensor.shape().len() != 1 {
            return Err(MlErr::InvalidModel(format!(
                "expected a one dimensional F32 tensor, got {:?} with shape {:?}",
                tensor.dtype(),
                tensor.shape()
            )));
        }

        let params = from_le_bytes(tensor.data());
        debug!("loaded {} parameters from {}", params.len(), dir.display());

        Self::new(spec, params)
    }
}
