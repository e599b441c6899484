mod format;
mod json;
mod table;

pub(crate) use json::snapshot_json;
pub(crate) use table::{DashboardOptions, render_dashboard};
