// MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
pub mod equation;
pub mod errors;
pub mod numerical;
pub mod symbolic;
pub mod utils;
