mod line_input;
mod overlay;

pub use line_input::{InputOutcome, LineInput};
pub use overlay::draw_input_overlay;
