//! Policy document builders for the key, the bucket and the notification topic.
//!
//! Each builder is a pure function of the facts it is handed: identifiers
//! are passed in explicitly, never looked up.

mod key;
mod notification;
mod storage;

pub use key::{
    SID_ACCOUNT_DECRYPT, SID_ROOT_PERMISSIONS, SID_TRAIL_DESCRIBE_KEY, SID_TRAIL_ENCRYPT,
    TRAIL_ENCRYPTION_CONTEXT_KEY, build_key_policy,
};
pub use notification::{SID_TRAIL_PUBLISH, SOURCE_ACCOUNT_KEY, build_notification_policy};
pub use storage::{
    BUCKET_OWNER_FULL_CONTROL, SID_ACL_CHECK, SID_DENY_INSECURE_TRANSPORT, SID_TRAIL_WRITE,
    build_storage_policy,
};
