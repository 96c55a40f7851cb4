//! Historical migration steps, oldest first
//!
//! Each step owns the legacy shape it reads. Legacy shapes are decoded from
//! the raw blob on demand and never outlive the step.

mod category_moves;
mod collections;
mod flat;
mod groups;
mod normalize;
mod simple;
mod spam;

pub use category_moves::CategoryMoves;
pub use collections::{Collections, ImportCollections};
pub use flat::{FlatLayout, SilenceRole};
pub use groups::GroupsToRoles;
pub use normalize::Normalize;
pub use simple::{CommandPrefix, CommandThrottle, Lockdown, RaidCommands, RestrictCommands, SetupDone};
pub use spam::{SpamLegacyLimits, SpamPressure};

use crate::error::MigrationError;
use crate::pipeline::MigrationStep;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode the legacy shape a step reads from the raw blob
pub(crate) fn decode_legacy<T: DeserializeOwned>(step: &'static str, raw: &Value) -> Result<T, MigrationError> {
    T::deserialize(raw).map_err(|source| MigrationError::legacy(step, source))
}

/// All steps in run order
pub(crate) fn standard() -> Vec<Box<dyn MigrationStep>> {
    vec![
        Box::new(FlatLayout),
        Box::new(SilenceRole),
        Box::new(CommandThrottle),
        Box::new(RestrictCommands::new("restrict-getaudit", 12, &["getaudit"])),
        Box::new(SpamPressure),
        Box::new(SpamLegacyLimits),
        Box::new(GroupsToRoles),
        Box::new(RestrictCommands::new(
            "restrict-role-commands",
            15,
            &["addrole", "removerole", "deleterole"],
        )),
        Box::new(Lockdown),
        Box::new(CommandPrefix),
        Box::new(SetupDone),
        Box::new(RaidCommands),
        Box::new(Collections),
        Box::new(ImportCollections),
        Box::new(RestrictCommands::new(
            "restrict-set-commands",
            20,
            &["addset", "removeset", "searchset"],
        )),
        Box::new(CategoryMoves),
        Box::new(Normalize),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared harness for step tests

    use crate::env::{MigrationEnv, OfflineEffects};
    use crate::error::MigrationError;
    use crate::pipeline::MigrationStep;
    use guildcfg_core::{GuildConfig, StaticDirectory, TenantId};
    use serde::Deserialize;
    use serde_json::Value;

    /// Apply one step offline to a raw blob
    pub(crate) async fn apply_offline(step: &dyn MigrationStep, raw: &Value) -> Result<GuildConfig, MigrationError> {
        let mut config = GuildConfig::deserialize(raw).unwrap();
        let tenant = TenantId::new("1");
        let dir = StaticDirectory::new();
        let env = MigrationEnv::new(&tenant, &dir, &OfflineEffects, &OfflineEffects);
        step.apply(raw, &mut config, &env).await?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildcfg_core::CURRENT_VERSION;

    #[test]
    fn standard_order_follows_gates() {
        let steps = standard();
        let belows: Vec<i64> = steps.iter().map(|s| s.gate().below).collect();
        assert!(belows.windows(2).all(|w| w[0] <= w[1]), "{belows:?}");
        assert!(belows.iter().all(|b| *b <= CURRENT_VERSION));
    }

    #[test]
    fn names_are_unique() {
        let steps = standard();
        let mut names: Vec<&str> = steps.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), steps.len());
    }

    #[test]
    fn side_effecting_steps() {
        let names: Vec<&str> = standard()
            .iter()
            .filter(|s| s.side_effects())
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["silence-role", "groups-to-roles", "import-collections"]);
    }
}
