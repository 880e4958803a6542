//! HTML templates and styling for PM Codex.
//!
//! ## Module Structure
//!
//! - `styles` - CSS constants and theme definitions
//! - `components` - Shared HTML components (nav bar, base template, charts)
//! - `viewer` - PDF viewer page
//! - `auth` - Login, sign-up, and password reset forms

mod auth;
mod components;
mod styles;
mod viewer;

pub use auth::{forgot_password_form, login_form, signup_form, NETWORK_ERROR_MESSAGE};
pub use components::{bar_chart, bar_row, base_html, nav_bar};
pub use styles::STYLE;
pub use viewer::{render_viewer, ViewerPage, LOAD_FAILED_MESSAGE};
