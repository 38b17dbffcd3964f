pub mod db;
pub mod system;

use crate::config::DatabaseConfig;
use crate::report::Report;

/// Builds one complete report: every metric is read fresh and the database is
/// probed through a connection scoped to this call. Nothing is cached between
/// invocations.
pub async fn collect_report(db: &DatabaseConfig) -> Report {
    let mut report = system::collect_host();
    report.database = db::probe_database(db).await;
    report
}
