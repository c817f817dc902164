//! Requester identity and its classification for the rule table.

use serde::{Deserialize, Serialize};

use crate::snapshot::StoreSnapshot;

/// The credential provider that authenticated the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignInProvider {
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "google.com")]
    Google,
    #[serde(rename = "anonymous")]
    Anonymous,
}

impl SignInProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            SignInProvider::Password => "password",
            SignInProvider::Google => "google.com",
            SignInProvider::Anonymous => "anonymous",
        }
    }
}

/// An already-verified identity supplied by the identity provider.
///
/// The evaluator never authenticates; it only classifies what it is given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub uid: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub sign_in_provider: Option<SignInProvider>,
}

impl Actor {
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    pub fn anonymous(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            email: None,
            email_verified: false,
            sign_in_provider: Some(SignInProvider::Anonymous),
        }
    }

    pub fn password(uid: impl Into<String>, email: impl Into<String>, verified: bool) -> Self {
        Self {
            uid: Some(uid.into()),
            email: Some(email.into()),
            email_verified: verified,
            sign_in_provider: Some(SignInProvider::Password),
        }
    }

    pub fn google(uid: impl Into<String>, email: impl Into<String>, verified: bool) -> Self {
        Self {
            uid: Some(uid.into()),
            email: Some(email.into()),
            email_verified: verified,
            sign_in_provider: Some(SignInProvider::Google),
        }
    }

    /// The domain part of the actor's email, if any.
    pub fn email_domain(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|email| email.split_once('@'))
            .map(|(_, domain)| domain)
    }
}

/// Actor classification used by every rule-table branch.
///
/// A tagged variant rather than loose boolean flags: first match wins and
/// the verified/domain facts travel with the provider they apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorClass<'a> {
    Unauthenticated,
    Anonymous {
        uid: &'a str,
    },
    Password {
        uid: &'a str,
        verified: bool,
        domain_allowed: bool,
    },
    OAuth {
        uid: &'a str,
        verified: bool,
        domain_allowed: bool,
    },
}

impl<'a> ActorClass<'a> {
    pub fn classify(actor: &'a Actor, snapshot: &dyn StoreSnapshot) -> Self {
        let Some(uid) = actor.uid.as_deref() else {
            return ActorClass::Unauthenticated;
        };
        let domain_allowed = actor
            .email_domain()
            .is_some_and(|domain| snapshot.is_email_domain_allowed(domain));
        match actor.sign_in_provider {
            None => ActorClass::Unauthenticated,
            Some(SignInProvider::Anonymous) => ActorClass::Anonymous { uid },
            Some(SignInProvider::Password) => ActorClass::Password {
                uid,
                verified: actor.email_verified,
                domain_allowed,
            },
            Some(SignInProvider::Google) => ActorClass::OAuth {
                uid,
                verified: actor.email_verified,
                domain_allowed,
            },
        }
    }

    pub fn uid(&self) -> Option<&'a str> {
        match self {
            ActorClass::Unauthenticated => None,
            ActorClass::Anonymous { uid }
            | ActorClass::Password { uid, .. }
            | ActorClass::OAuth { uid, .. } => Some(uid),
        }
    }

    /// True for the classes granted full write access to dashboard data.
    ///
    /// Password actors qualify regardless of email verification or domain;
    /// OAuth actors must have a verified email AND an allowed domain.
    pub fn is_writer(&self) -> bool {
        match self {
            ActorClass::Password { .. } => true,
            ActorClass::OAuth {
                verified,
                domain_allowed,
                ..
            } => *verified && *domain_allowed,
            _ => false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.uid().is_some()
    }

    /// Stable label for logs and denial reasons.
    pub const fn label(&self) -> &'static str {
        match self {
            ActorClass::Unauthenticated => "unauthenticated",
            ActorClass::Anonymous { .. } => "anonymous",
            ActorClass::Password { .. } => "password",
            ActorClass::OAuth { .. } => "oauth",
        }
    }
}
