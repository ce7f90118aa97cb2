/// Version Module
///
/// Build-time version metadata, surfaced via `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD_TIME: &str = "unknown";
pub const GIT_COMMIT: &str = "unknown";

pub fn version_info() -> String {
    format!("Version: {VERSION}\nBuild Time: {BUILD_TIME}\nGit Commit: {GIT_COMMIT}")
}
