//! Licenses a new project can be created under.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum License {
    Mit,
    Apache2,
    Gpl3,
    Gpl2,
    Lgpl21,
    Bsd2Clause,
    Bsd3Clause,
    Bsl1,
    Cc0,
    Epl2,
    Agpl3,
    Mpl2,
    Unlicense,
    Proprietary,
}

impl License {
    pub const ALL: [License; 14] = [
        Self::Mit,
        Self::Apache2,
        Self::Gpl3,
        Self::Gpl2,
        Self::Lgpl21,
        Self::Bsd2Clause,
        Self::Bsd3Clause,
        Self::Bsl1,
        Self::Cc0,
        Self::Epl2,
        Self::Agpl3,
        Self::Mpl2,
        Self::Unlicense,
        Self::Proprietary,
    ];

    pub fn spdx_id(self) -> &'static str {
        match self {
            Self::Mit => "MIT",
            Self::Apache2 => "Apache-2.0",
            Self::Gpl3 => "GPL-3.0",
            Self::Gpl2 => "GPL-2.0",
            Self::Lgpl21 => "LGPL-2.1",
            Self::Bsd2Clause => "BSD-2-Clause",
            Self::Bsd3Clause => "BSD-3-Clause",
            Self::Bsl1 => "BSL-1.0",
            Self::Cc0 => "CC0-1.0",
            Self::Epl2 => "EPL-2.0",
            Self::Agpl3 => "AGPL-3.0",
            Self::Mpl2 => "MPL-2.0",
            Self::Unlicense => "Unlicense",
            Self::Proprietary => "Proprietary",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Self::Mit => "MIT License",
            Self::Apache2 => "Apache License 2.0",
            Self::Gpl3 => "GNU General Public License v3.0",
            Self::Gpl2 => "GNU General Public License v2.0",
            Self::Lgpl21 => "GNU Lesser General Public License v2.1",
            Self::Bsd2Clause => "BSD 2-Clause \"Simplified\" License",
            Self::Bsd3Clause => "BSD 3-Clause \"New\" or \"Revised\" License",
            Self::Bsl1 => "Boost Software License 1.0",
            Self::Cc0 => "Creative Commons Zero v1.0 Universal",
            Self::Epl2 => "Eclipse Public License 2.0",
            Self::Agpl3 => "GNU Affero General Public License v3.0",
            Self::Mpl2 => "Mozilla Public License 2.0",
            Self::Unlicense => "The Unlicense",
            Self::Proprietary => "Proprietary",
        }
    }

    /// Value for `[project].license` in `pyproject.toml`.
    pub fn pyproject_expression(self) -> &'static str {
        match self {
            Self::Proprietary => "LicenseRef-Proprietary",
            other => other.spdx_id(),
        }
    }

    /// Canonical text location, `None` for proprietary code.
    pub fn url(self) -> Option<String> {
        match self {
            Self::Proprietary => None,
            other => Some(format!("https://spdx.org/licenses/{}.html", other.spdx_id())),
        }
    }

    /// Template rendered into `LICENSE`.
    ///
    /// Short permissive licenses ship their full text; the long copyleft ones
    /// get a notice pointing at the canonical text.
    pub fn template_id(self) -> &'static str {
        match self {
            Self::Mit => "license/mit",
            Self::Bsd2Clause => "license/bsd-2-clause",
            Self::Bsd3Clause => "license/bsd-3-clause",
            Self::Unlicense => "license/unlicense",
            Self::Proprietary => "license/proprietary",
            _ => "license/notice",
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spdx_id())
    }
}

impl FromStr for License {
    type Err = DomainError;

    /// Case-insensitive match against the SPDX ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.spdx_id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::UnknownLicense {
                license: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("mit".parse::<License>().unwrap(), License::Mit);
        assert_eq!("apache-2.0".parse::<License>().unwrap(), License::Apache2);
        assert_eq!(" Unlicense ".parse::<License>().unwrap(), License::Unlicense);
    }

    #[test]
    fn rejects_unknown() {
        assert!(matches!(
            "WTFPL".parse::<License>(),
            Err(DomainError::UnknownLicense { .. })
        ));
    }

    #[test]
    fn every_license_round_trips_and_has_template() {
        for license in License::ALL {
            assert_eq!(license.spdx_id().parse::<License>().unwrap(), license);
            assert!(license.template_id().starts_with("license/"));
        }
        assert!(License::Proprietary.url().is_none());
        assert_eq!(
            License::Gpl3.url().as_deref(),
            Some("https://spdx.org/licenses/GPL-3.0.html")
        );
    }
}
