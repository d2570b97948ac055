// doc constants
pub const DOC_ID: &str = "_id";

// collaborator error codes, aligned with the wire protocol the
// collaborator speaks so callers can match on familiar values
pub const DUPLICATE_KEY_ERROR: i32 = 11000;
pub const TIMEOUT_ERROR: i32 = 50;
pub const VALIDATION_ERROR: i32 = 121;

// object id constants
pub const OBJECT_ID_LENGTH: usize = 12;
pub const OBJECT_ID_HEX_LENGTH: usize = 24;
