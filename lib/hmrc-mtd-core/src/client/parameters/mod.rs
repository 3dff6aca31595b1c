mod body;
mod headers;
mod path;
mod query;

pub use self::body::CallBody;
pub use self::headers::{CallHeaders, GOV_TEST_SCENARIO};
pub use self::path::CallPath;
pub use self::query::CallQuery;
