//! Helpers shared by the codec and the validation model

pub mod validation;
