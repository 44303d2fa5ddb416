pub mod notify;
pub mod users;

pub use notify::{LogNotifier, Notification, Notifier, NotifyError, RecordingNotifier};
pub use users::{verify_student_id, Redemption, TradeIn, User, UserDirectory, UserError};
