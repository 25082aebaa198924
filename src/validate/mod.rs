pub mod validation_model;
pub mod validator;
