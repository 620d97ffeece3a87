mod builder;
mod compiled;
mod cross_validation;
mod model_trainer;
mod trainer;

pub use builder::TrainerBuilder;
pub use compiled::CompiledModel;
pub use cross_validation::{Fold, LeaveOneOut};
pub use model_trainer::ModelTrainer;
pub use trainer::{Evaluation, Trainer};
