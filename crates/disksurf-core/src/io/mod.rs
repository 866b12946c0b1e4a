pub mod fits;
pub mod fits_writer;

pub use fits::{read_cube, FitsHeader, FitsReader, HeaderValue};
pub use fits_writer::{cube_cards, write_cube, FitsWriter};
