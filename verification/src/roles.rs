//! Role configuration.

use serde::{Deserialize, Serialize};

use peerlink_types::RoleId;

use crate::GroupCategory;

/// Role ids granted on verification. `0` means "not configured".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Granted to every verified member.
    #[serde(default)]
    pub peer: u64,
    #[serde(default)]
    pub phoenix: u64,
    #[serde(default)]
    pub dragon: u64,
    #[serde(default)]
    pub minotaur: u64,
    #[serde(default)]
    pub pegasus: u64,
}

impl RoleConfig {
    pub fn base_role(&self) -> Option<RoleId> {
        RoleId::from_config(self.peer)
    }

    pub fn group_role(&self, category: GroupCategory) -> Option<RoleId> {
        let id = match category {
            GroupCategory::Phoenix => self.phoenix,
            GroupCategory::Dragon => self.dragon,
            GroupCategory::Minotaur => self.minotaur,
            GroupCategory::Pegasus => self.pegasus,
        };
        RoleId::from_config(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_roles_resolve_to_none() {
        let roles = RoleConfig {
            dragon: 55,
            ..Default::default()
        };
        assert_eq!(roles.base_role(), None);
        assert_eq!(roles.group_role(GroupCategory::Dragon), Some(RoleId::new(55)));
        assert_eq!(roles.group_role(GroupCategory::Phoenix), None);
    }

    #[test]
    fn partial_toml_defaults_missing_roles() {
        let roles: RoleConfig = toml::from_str("peer = 10\npegasus = 14").unwrap();
        assert_eq!(roles.base_role(), Some(RoleId::new(10)));
        assert_eq!(roles.group_role(GroupCategory::Pegasus), Some(RoleId::new(14)));
        assert_eq!(roles.minotaur, 0);
    }
}
