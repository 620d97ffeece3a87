mod chained;
mod constant;
mod param_gen;
mod random;

pub use chained::ChainedParamGen;
pub use constant::ConstParamGen;
pub use param_gen::{ParamGen, generate};
pub use random::{RandParamGen, TruncatedNormal};
