//! Version arithmetic for deploys.

use crate::error::DeployError;
use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

static LOOSE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])")
        .expect("loose version pattern compiles")
});

/// Which component a deploy bumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReleaseType {
    #[default]
    Patch,
    Minor,
    Major,
}

impl ReleaseType {
    /// `--major` wins over `--minor`; neither means patch.
    pub fn from_flags(major: bool, minor: bool) -> Self {
        if major {
            ReleaseType::Major
        } else if minor {
            ReleaseType::Minor
        } else {
            ReleaseType::Patch
        }
    }
}

/// Pulls the first `major[.minor[.patch]]` out of `input`.
///
/// Missing components are zero, so `"v2.1"` becomes `2.1.0`.
pub fn coerce(input: &str) -> Option<Version> {
    let captures = LOOSE_VERSION.captures(input)?;
    let part = |i: usize| -> Option<u64> {
        match captures.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Increments `version` by `release`, resetting lower components.
pub fn bump(version: &Version, release: ReleaseType) -> Version {
    match release {
        ReleaseType::Major => Version::new(version.major + 1, 0, 0),
        ReleaseType::Minor => Version::new(version.major, version.minor + 1, 0),
        ReleaseType::Patch => Version::new(version.major, version.minor, version.patch + 1),
    }
}

/// Inputs for picking the version of the next deploy.
#[derive(Debug, Clone, Default)]
pub struct VersionPlan {
    pub requested: Option<Version>,
    pub release: ReleaseType,
    pub skip_version_checks: bool,
}

impl VersionPlan {
    /// Picks the next version.
    ///
    /// An explicit version wins. Otherwise the deployed version is bumped
    /// (unless checks are skipped), falling back to bumping the local
    /// build version, or `0.0.0` when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::VersionNotGreater`] when checks are on and the
    /// result is below the deployed version.
    pub fn next_version(&self, deployed: &str, local: Option<&str>) -> Result<Version, DeployError> {
        let deployed_version = coerce(deployed);

        let next = match &self.requested {
            Some(requested) => requested.clone(),
            None => {
                let from_deployed = deployed_version
                    .as_ref()
                    .filter(|_| !self.skip_version_checks)
                    .map(|v| bump(v, self.release));
                match from_deployed {
                    Some(version) => version,
                    None => {
                        let local = local.and_then(coerce).unwrap_or(Version::new(0, 0, 0));
                        bump(&local, self.release)
                    }
                }
            }
        };

        if !self.skip_version_checks {
            if let Some(deployed_version) = deployed_version {
                if next < deployed_version {
                    return Err(DeployError::VersionNotGreater {
                        new: next.to_string(),
                        deployed: deployed.to_string(),
                    });
                }
            }
        }

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(release: ReleaseType) -> VersionPlan {
        VersionPlan {
            release,
            ..Default::default()
        }
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("2.1"), Some(Version::new(2, 1, 0)));
        assert_eq!(coerce("v3"), Some(Version::new(3, 0, 0)));
        assert_eq!(coerce("1.2.3-beta.1"), Some(Version::new(1, 2, 3)));
        assert_eq!(coerce("release 4.5.6 final"), Some(Version::new(4, 5, 6)));
        assert_eq!(coerce("latest"), None);
        assert_eq!(coerce(""), None);
    }

    #[test]
    fn test_bump() {
        let v = Version::new(1, 2, 3);
        assert_eq!(bump(&v, ReleaseType::Patch), Version::new(1, 2, 4));
        assert_eq!(bump(&v, ReleaseType::Minor), Version::new(1, 3, 0));
        assert_eq!(bump(&v, ReleaseType::Major), Version::new(2, 0, 0));
    }

    #[test]
    fn test_release_type_from_flags() {
        assert_eq!(ReleaseType::from_flags(false, false), ReleaseType::Patch);
        assert_eq!(ReleaseType::from_flags(false, true), ReleaseType::Minor);
        assert_eq!(ReleaseType::from_flags(true, true), ReleaseType::Major);
    }

    #[test]
    fn test_bumps_deployed_version() {
        let next = plan(ReleaseType::Minor).next_version("1.2.3", Some("0.0.1")).unwrap();
        assert_eq!(next, Version::new(1, 3, 0));
    }

    #[test]
    fn test_skip_checks_bumps_local_version() {
        let plan = VersionPlan {
            skip_version_checks: true,
            ..plan(ReleaseType::Patch)
        };
        assert_eq!(plan.next_version("5.0.0", Some("1.0.0")).unwrap(), Version::new(1, 0, 1));
        assert_eq!(plan.next_version("5.0.0", None).unwrap(), Version::new(0, 0, 1));
    }

    #[test]
    fn test_unparseable_deployed_falls_back_to_local() {
        let next = plan(ReleaseType::Patch).next_version("", Some("2.0.0")).unwrap();
        assert_eq!(next, Version::new(2, 0, 1));
    }

    #[test]
    fn test_requested_version_must_not_go_backwards() {
        let plan = VersionPlan {
            requested: Some(Version::new(1, 0, 0)),
            ..Default::default()
        };
        let err = plan.next_version("1.2.3", None).unwrap_err();
        assert!(matches!(err, DeployError::VersionNotGreater { .. }));

        // equal is allowed
        let plan = VersionPlan {
            requested: Some(Version::new(1, 2, 3)),
            ..Default::default()
        };
        assert_eq!(plan.next_version("1.2.3", None).unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_skip_checks_allows_downgrade() {
        let plan = VersionPlan {
            requested: Some(Version::new(0, 1, 0)),
            skip_version_checks: true,
            ..Default::default()
        };
        assert_eq!(plan.next_version("1.2.3", None).unwrap(), Version::new(0, 1, 0));
    }
}
