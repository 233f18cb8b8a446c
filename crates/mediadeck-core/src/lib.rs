pub mod query;
pub mod record;
pub mod status;
pub mod title_id;

pub use query::{ListQuery, PageSize};
pub use record::{Record, RecordPage};
pub use status::{CmValue, Label, PipelineStatus, RejectionStatus, SortOrder};
pub use title_id::is_valid_title_id;
