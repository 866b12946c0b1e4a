pub mod brightness;
pub mod consts;
pub mod cube;
pub mod deprojection;
pub mod detection;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod rotate;
