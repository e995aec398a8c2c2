
pub mod image;
pub mod sensors;
pub mod numerics;
pub mod matching;
pub mod tracker;
pub mod sfm;

macro_rules! define_float {
    ($f:tt) => {
        pub use std::$f as float;
        pub type Float = $f;
    }
}

define_float!(f64);
