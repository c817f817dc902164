//! The declarative authorization rule table.
//!
//! One row per collection, one access requirement per operation. The
//! public-dashboard flag is the single cross-cutting conditional and is
//! threaded in explicitly; nothing here reads ambient state.

use crate::actor::ActorClass;
use crate::collection::{Collection, Operation};

/// What a rule row demands of the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AccessRule {
    /// Unconditional deny.
    Never,
    /// Every actor class, unauthenticated included.
    Anyone,
    /// Any actor with a uid, anonymous included.
    Authenticated,
    /// Writers, plus anonymous/unauthenticated viewers while the public
    /// dashboard flag is on.
    DashboardReader,
    /// Password actors, and OAuth actors with a verified email and an
    /// allowed domain.
    Writer,
    /// Any actor whose uid equals the target document id.
    Owner,
}

impl AccessRule {
    pub(crate) fn is_satisfied_by(
        self,
        class: &ActorClass<'_>,
        public_dashboard_enabled: bool,
        target_doc_id: Option<&str>,
    ) -> bool {
        match self {
            AccessRule::Never => false,
            AccessRule::Anyone => true,
            AccessRule::Authenticated => class.is_authenticated(),
            AccessRule::Writer => class.is_writer(),
            AccessRule::DashboardReader => {
                class.is_writer()
                    || (public_dashboard_enabled
                        && matches!(
                            class,
                            ActorClass::Anonymous { .. } | ActorClass::Unauthenticated
                        ))
            }
            AccessRule::Owner => {
                class.uid().is_some() && class.uid() == target_doc_id
            }
        }
    }
}

/// Access requirements for every operation on one collection.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CollectionRules {
    pub create: AccessRule,
    pub get: AccessRule,
    pub list: AccessRule,
    pub update: AccessRule,
    pub delete: AccessRule,
}

impl CollectionRules {
    pub(crate) fn rule_for(&self, operation: Operation) -> AccessRule {
        match operation {
            Operation::Create => self.create,
            Operation::Get => self.get,
            Operation::List => self.list,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

/// Dashboard data: writers mutate, dashboard viewers read, nobody deletes.
const DASHBOARD_DATA: CollectionRules = CollectionRules {
    create: AccessRule::Writer,
    get: AccessRule::DashboardReader,
    list: AccessRule::DashboardReader,
    update: AccessRule::Writer,
    delete: AccessRule::Never,
};

/// Reference data mutated only by administrative tooling.
const REFERENCE_DATA: CollectionRules = CollectionRules {
    create: AccessRule::Never,
    get: AccessRule::Authenticated,
    list: AccessRule::Authenticated,
    update: AccessRule::Never,
    delete: AccessRule::Never,
};

pub(crate) const fn rules_for(collection: Collection) -> CollectionRules {
    match collection {
        Collection::Projects | Collection::Builds | Collection::BuildDays => DASHBOARD_DATA,
        // The one collection whose documents may be deleted.
        Collection::ProjectGroups => CollectionRules {
            delete: AccessRule::Writer,
            ..DASHBOARD_DATA
        },
        Collection::UserProfiles => CollectionRules {
            create: AccessRule::Owner,
            get: AccessRule::Owner,
            list: AccessRule::Never,
            update: AccessRule::Owner,
            delete: AccessRule::Never,
        },
        Collection::FeatureConfig | Collection::AllowedEmailDomains => REFERENCE_DATA,
        Collection::InstantConfig => CollectionRules {
            get: AccessRule::Anyone,
            list: AccessRule::Anyone,
            ..REFERENCE_DATA
        },
        // Written exclusively by privileged backend processes.
        Collection::Tasks => CollectionRules {
            create: AccessRule::Never,
            get: AccessRule::Never,
            list: AccessRule::Never,
            update: AccessRule::Never,
            delete: AccessRule::Never,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Operation;

    const OPERATIONS: [Operation; 5] = [
        Operation::Create,
        Operation::Get,
        Operation::List,
        Operation::Update,
        Operation::Delete,
    ];

    #[test]
    fn tasks_deny_everything() {
        let rules = rules_for(Collection::Tasks);
        for operation in OPERATIONS {
            assert_eq!(rules.rule_for(operation), AccessRule::Never);
        }
    }

    #[test]
    fn only_project_groups_permit_delete() {
        for collection in Collection::ALL {
            let expected = if collection == Collection::ProjectGroups {
                AccessRule::Writer
            } else {
                AccessRule::Never
            };
            assert_eq!(
                rules_for(collection).rule_for(Operation::Delete),
                expected,
                "{collection}"
            );
        }
    }

    #[test]
    fn user_profiles_never_allow_collection_reads() {
        assert_eq!(
            rules_for(Collection::UserProfiles).rule_for(Operation::List),
            AccessRule::Never
        );
    }

    #[test]
    fn owner_rule_compares_uid_against_target_doc() {
        let class = ActorClass::Anonymous { uid: "2" };
        assert!(AccessRule::Owner.is_satisfied_by(&class, false, Some("2")));
        assert!(!AccessRule::Owner.is_satisfied_by(&class, false, Some("1")));
        assert!(!AccessRule::Owner.is_satisfied_by(&class, false, None));
        assert!(!AccessRule::Owner.is_satisfied_by(&ActorClass::Unauthenticated, true, Some("2")));
    }

    #[test]
    fn dashboard_reads_track_the_flag_for_viewers_only() {
        let anonymous = ActorClass::Anonymous { uid: "uid" };
        assert!(AccessRule::DashboardReader.is_satisfied_by(&anonymous, true, None));
        assert!(!AccessRule::DashboardReader.is_satisfied_by(&anonymous, false, None));

        assert!(AccessRule::DashboardReader.is_satisfied_by(&ActorClass::Unauthenticated, true, None));
        assert!(!AccessRule::DashboardReader.is_satisfied_by(
            &ActorClass::Unauthenticated,
            false,
            None
        ));

        // Writers read regardless of the flag; unverified OAuth never does.
        let password = ActorClass::Password {
            uid: "uid",
            verified: false,
            domain_allowed: false,
        };
        assert!(AccessRule::DashboardReader.is_satisfied_by(&password, false, None));

        let unverified_oauth = ActorClass::OAuth {
            uid: "uid",
            verified: false,
            domain_allowed: true,
        };
        assert!(!AccessRule::DashboardReader.is_satisfied_by(&unverified_oauth, true, None));
    }
}
