pub mod fallback;

pub use fallback::{border_type, fallback_lines, render_content, render_details};
