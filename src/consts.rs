/// Backup timestamp format, one-minute granularity: "2025-01-15_03-00"
pub(crate) const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Number of most recent compressed backups kept by default
pub(crate) const DEFAULT_RETENTION: usize = 7;

pub(crate) const DEFAULT_BACKUP_DIR: &str = "db_backups";

pub(crate) const DEFAULT_ENV_FILE: &str = ".env";

pub(crate) const DEFAULT_API_CONTAINER: &str = "api";

pub(crate) const DEFAULT_HEALTH_URL: &str = "http://localhost:8000/healthcheck/";

/// Port the application process binds inside the container
pub(crate) const APP_PORT: u16 = 8000;

pub(crate) const SQL_EXT: &str = "sql";
pub(crate) const SQL_GZ_EXT: &str = "sql.gz";
