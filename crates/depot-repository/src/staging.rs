//! Derivation of the staging sibling of a managed repository.

use depot_config::repository::ManagedRepositoryConfiguration;
use tracing::{debug, error};
use url::Url;

use crate::features::STAGING_REPO_POSTFIX;

const FILE_PREFIX: &str = "file://";

/// Configuration of the staging repository for `base`.
///
/// The staging repository lives next to the base repository: its id, name and the last
/// segment of its location get the `-stage` postfix. Absolute index directories are moved
/// to a `-stage` sibling as well, relative ones stay relative to the staging repository.
pub fn get_stage_repo_config(
    base: &ManagedRepositoryConfiguration,
) -> ManagedRepositoryConfiguration {
    let id = format!("{}{STAGING_REPO_POSTFIX}", base.id);
    let name = format!("{}{STAGING_REPO_POSTFIX}", base.name);
    let location = sibling_location(&base.location, &id);
    let index_dir = stage_index_dir(&base.index_dir);
    let packed_index_dir = stage_index_dir(&base.packed_index_dir);

    ManagedRepositoryConfiguration {
        id,
        repository_type: base.repository_type.clone(),
        name,
        description: String::new(),
        layout: base.layout.clone(),
        location,
        index_dir,
        packed_index_dir,
        refresh_cron_expression: base.refresh_cron_expression.clone(),
        releases: base.releases,
        snapshots: base.snapshots,
        scanned: base.scanned,
        block_redeployments: base.block_redeployments,
        stage_repo_needed: false,
        skip_packed_index_creation: base.skip_packed_index_creation,
        delete_released_snapshots: base.delete_released_snapshots,
        retention_count: base.retention_count,
        retention_period: base.retention_period,
    }
}

/// Replaces the last segment of `location` with `staging_id`. Trailing separators are
/// ignored, so `a/b/` and `a/b` have the same sibling.
fn sibling_location(location: &str, staging_id: &str) -> String {
    let normalized = location.replace('\\', "/");
    let trimmed = normalized.trim_end_matches('/');
    let normalized = if trimmed.is_empty() { normalized.as_str() } else { trimmed };
    match normalized.rfind('/') {
        Some(idx) => format!("{}/{staging_id}", &normalized[..idx]),
        None => staging_id.to_string(),
    }
}

fn stage_index_dir(dir: &str) -> String {
    if dir.trim().is_empty() {
        return dir.to_string();
    }

    let raw = if dir.starts_with(FILE_PREFIX) {
        dir.to_string()
    } else {
        format!("{FILE_PREFIX}{dir}")
    };

    let url = match Url::parse(&raw) {
        Ok(url) => url,
        Err(err) => {
            error!("Could not parse index path as uri {}: {}", dir, err);
            return String::new();
        }
    };

    let path = match url.to_file_path() {
        Ok(path) if path.is_absolute() => path,
        _ => {
            debug!("Keeping index directory {}", dir);
            return dir.to_string();
        }
    };

    match (path.parent(), path.file_name()) {
        (Some(parent), Some(file_name)) => {
            let new_dir = parent.join(format!(
                "{}{STAGING_REPO_POSTFIX}",
                file_name.to_string_lossy()
            ));
            debug!(
                "Changing index directory {} -> {}",
                path.display(),
                new_dir.display()
            );
            new_dir.to_string_lossy().into_owned()
        }
        _ => {
            debug!("Keeping index directory {}", dir);
            dir.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ManagedRepositoryConfiguration {
        ManagedRepositoryConfiguration {
            description: "Internal releases".to_string(),
            location: "/data/repos/internal".to_string(),
            index_dir: "/data/idx/internal".to_string(),
            packed_index_dir: "index/packed".to_string(),
            block_redeployments: true,
            stage_repo_needed: true,
            delete_released_snapshots: true,
            retention_count: 5,
            retention_period: 30,
            refresh_cron_expression: "0 0 4 * * ?".to_string(),
            ..ManagedRepositoryConfiguration::new("internal", "Internal Repository")
        }
    }

    #[test]
    fn test_stage_id_and_name() {
        let stage = get_stage_repo_config(&base());
        assert_eq!(stage.id, "internal-stage");
        assert_eq!(stage.name, "Internal Repository-stage");
        assert_eq!(stage.description, "");
        assert!(!stage.stage_repo_needed);
    }

    #[test]
    fn test_stage_location_is_sibling() {
        let stage = get_stage_repo_config(&base());
        assert_eq!(stage.location, "/data/repos/internal-stage");
    }

    #[test]
    fn test_stage_location_trailing_separator() {
        let cfg = ManagedRepositoryConfiguration {
            location: "/data/repos/internal/".to_string(),
            ..base()
        };
        assert_eq!(get_stage_repo_config(&cfg).location, "/data/repos/internal-stage");

        let cfg = ManagedRepositoryConfiguration {
            location: "C:\\repos\\internal\\".to_string(),
            ..base()
        };
        assert_eq!(get_stage_repo_config(&cfg).location, "C:/repos/internal-stage");

        let cfg = ManagedRepositoryConfiguration {
            location: "/".to_string(),
            ..base()
        };
        assert_eq!(get_stage_repo_config(&cfg).location, "/internal-stage");
    }

    #[test]
    fn test_stage_location_backslashes() {
        let cfg = ManagedRepositoryConfiguration {
            location: "C:\\repos\\internal".to_string(),
            ..base()
        };
        assert_eq!(get_stage_repo_config(&cfg).location, "C:/repos/internal-stage");
    }

    #[test]
    fn test_stage_location_without_separator() {
        let cfg = ManagedRepositoryConfiguration {
            location: "internal".to_string(),
            ..base()
        };
        assert_eq!(get_stage_repo_config(&cfg).location, "internal-stage");

        let cfg = ManagedRepositoryConfiguration {
            location: String::new(),
            ..base()
        };
        assert_eq!(get_stage_repo_config(&cfg).location, "internal-stage");
    }

    #[test]
    fn test_stage_index_dirs() {
        let stage = get_stage_repo_config(&base());
        assert_eq!(stage.index_dir, "/data/idx/internal-stage");
        assert_eq!(stage.packed_index_dir, "index/packed");
    }

    #[test]
    fn test_stage_index_dir_relative_kept() {
        let cfg = ManagedRepositoryConfiguration {
            index_dir: "idx".to_string(),
            ..base()
        };
        assert_eq!(get_stage_repo_config(&cfg).index_dir, "idx");
    }

    #[test]
    fn test_stage_index_dir_file_uri() {
        let cfg = ManagedRepositoryConfiguration {
            packed_index_dir: "file:///data/packed/internal".to_string(),
            ..base()
        };
        assert_eq!(
            get_stage_repo_config(&cfg).packed_index_dir,
            "/data/packed/internal-stage"
        );
    }

    #[test]
    fn test_stage_index_dir_unparseable_cleared() {
        let cfg = ManagedRepositoryConfiguration {
            index_dir: "[broken".to_string(),
            ..base()
        };
        assert_eq!(get_stage_repo_config(&cfg).index_dir, "");
    }

    #[test]
    fn test_stage_index_dir_blank_kept() {
        let cfg = ManagedRepositoryConfiguration {
            index_dir: String::new(),
            ..base()
        };
        assert_eq!(get_stage_repo_config(&cfg).index_dir, "");
    }

    #[test]
    fn test_stage_copies_scalars() {
        let stage = get_stage_repo_config(&base());
        assert!(stage.block_redeployments);
        assert!(stage.delete_released_snapshots);
        assert_eq!(stage.retention_count, 5);
        assert_eq!(stage.retention_period, 30);
        assert_eq!(stage.refresh_cron_expression, "0 0 4 * * ?");
        assert_eq!(stage.layout, "default");
        assert_eq!(stage.repository_type, "MAVEN");
        assert!(stage.releases);
        assert!(!stage.snapshots);
    }
}
