pub mod bloat;
pub mod cancel;
pub mod categories;
pub mod cleaner;
pub mod config;
pub mod deleter;
pub mod disk_info;
pub mod error;
pub mod health;
pub mod privilege;
pub mod progress;
pub mod scanner;
pub mod size;
pub mod trash;
pub mod utils;
pub mod whitelist;

pub use cancel::CancelToken;
pub use categories::{BaseDirs, Category};
pub use cleaner::{CategoryTotal, Cleaner, ScanItem, ScanSnapshot};
pub use config::{Config, ConfigProvider, JsonConfigProvider};
pub use deleter::{CleanReport, Deleter, ItemOutcome, SkipReason, TrashFailurePolicy};
pub use error::{ConfigError, TrashError};
pub use health::health_score;
pub use privilege::{FixedPrivilege, PrivilegeProbe, ProcessPrivilege};
pub use progress::{ChannelSink, NullSink, ProgressSink, TracingSink};
pub use trash::{SystemTrash, TrashService};
pub use whitelist::Whitelist;
