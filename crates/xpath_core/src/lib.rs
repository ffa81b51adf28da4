//! XPath browser core: pure job state machine, result tree and view-model helpers.
mod effect;
mod msg;
mod render;
mod request;
mod state;
mod stream;
mod tree;
mod update;
mod view_model;

pub use effect::{Effect, Severity};
pub use msg::Msg;
pub use render::{render, RenderedRow, RenderedView};
pub use request::{JobRequest, ValidationError};
pub use state::{AppState, JobId, JobState, Phase, SearchForm};
pub use stream::{StreamEvent, StreamFailure, StreamStatus};
pub use tree::{parse_result_tree, PayloadError, ResultTree, TreeNode};
pub use update::update;
pub use view_model::AppViewModel;
