//! Log corpus access
//!
//! Everything that touches files under the Claude home directory: agent log
//! discovery and parsing, incremental tailing, and the todo/credentials side files.

mod parser;
mod record;
mod sidefiles;
mod tailer;

pub(crate) use parser::{
    discover_agent_logs, extract_usage_data, get_agent_info, is_agent_log,
    is_waiting_for_user, parse_log_file,
};
pub(crate) use record::Record;
pub(crate) use sidefiles::{has_empty_todo_list, load_subscription_type};
pub(crate) use tailer::LogTailer;
