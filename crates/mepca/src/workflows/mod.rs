pub mod mepca;
pub mod ospar;
